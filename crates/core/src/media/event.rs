//! Transfer-complete payload as posted by the media manager.
//!
//! Field names follow the manager's own objects (`mediainfo`, `meta`,
//! `transferinfo`). Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::LooseValue;

/// One "transfer complete" event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferCompleteEvent {
    #[serde(default)]
    pub mediainfo: Option<MediaInfo>,
    #[serde(default)]
    pub transferinfo: Option<TransferInfo>,
    #[serde(default)]
    pub meta: Option<MetaInfo>,
}

/// Recognized media (TMDB-sourced).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub year: Option<LooseValue>,
    /// "电影" / "电视剧" from the manager, or a slug.
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<LooseValue>,
    #[serde(default)]
    pub vote_average: Option<LooseValue>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub number_of_episodes: Option<LooseValue>,
    #[serde(default)]
    pub number_of_seasons: Option<LooseValue>,
    #[serde(default)]
    pub season: Option<LooseValue>,
    /// Season number → episode numbers.
    #[serde(default)]
    pub seasons: BTreeMap<String, Vec<serde_json::Value>>,
}

/// Metadata parsed from the release name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(default)]
    pub begin_season: Option<LooseValue>,
    #[serde(default)]
    pub resource_pix: Option<String>,
    #[serde(default)]
    pub video_encode: Option<String>,
    #[serde(default)]
    pub audio_encode: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_team: Option<String>,
    #[serde(default)]
    pub episode_list: Vec<LooseValue>,
}

/// Outcome of the file move itself. Logged only, so every field is lenient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferInfo {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub target_path: Option<String>,
    #[serde(default)]
    pub file_count: Option<LooseValue>,
    /// Bytes; the manager sends a float.
    #[serde(default)]
    pub total_size: Option<LooseValue>,
}
