//! Turns a transfer-complete payload into a [`MediaRecord`].

use super::event::{MediaInfo, MetaInfo, TransferCompleteEvent};
use super::types::{LooseValue, MediaRecord};

/// Provider tag written when the payload does not name one.
pub const DEFAULT_SOURCE: &str = "TMDB";

impl MediaRecord {
    /// Build a record from an event. `None` when the event has no `mediainfo`.
    pub fn from_event(event: &TransferCompleteEvent) -> Option<Self> {
        let media = event.mediainfo.as_ref()?;
        Some(Self::from_parts(media, event.meta.as_ref()))
    }

    fn from_parts(media: &MediaInfo, meta: Option<&MetaInfo>) -> Self {
        let season = meta
            .and_then(|m| m.begin_season.clone())
            .filter(|s| !s.is_blank())
            .or_else(|| media.season.clone().filter(|s| !s.is_blank()));

        let episode_count = season
            .as_ref()
            .and_then(LooseValue::as_i64)
            .and_then(|s| media.seasons.get(&s.to_string()))
            .filter(|episodes| !episodes.is_empty())
            .map(|episodes| LooseValue::Int(episodes.len() as i64))
            .or_else(|| media.number_of_episodes.clone());

        Self {
            title: non_empty(&media.title),
            original_title: non_empty(&media.original_title),
            year: media.year.clone(),
            media_type: non_empty(&media.media_type),
            external_id: media.tmdb_id.as_ref().and_then(external_id),
            rating: media.vote_average.clone(),
            overview: non_empty(&media.overview),
            poster: non_empty(&media.poster_path),
            season,
            episode_count,
            resolution: meta.and_then(|m| non_empty(&m.resource_pix)),
            video_codec: meta.and_then(|m| non_empty(&m.video_encode)),
            audio_codec: meta.and_then(|m| non_empty(&m.audio_encode)),
            release_source: meta.and_then(|m| non_empty(&m.resource_type)),
            release_group: meta.and_then(|m| non_empty(&m.resource_team)),
            source: Some(DEFAULT_SOURCE.to_string()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn external_id(value: &LooseValue) -> Option<String> {
    if value.is_blank() {
        return None;
    }
    match value {
        LooseValue::Text(s) => Some(s.trim().to_string()),
        other => other.as_i64().map(|id| id.to_string()),
    }
}
