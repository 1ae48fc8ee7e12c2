//! Media record built from one transfer-complete event.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar as delivered by the media manager.
///
/// Years, seasons and ratings arrive as numbers or as strings depending on
/// the metadata source, so they are kept as-is and coerced by the mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseValue {
    /// Integer view. Floats are truncated, text must parse as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseValue::Int(i) => Some(*i),
            LooseValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            LooseValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float view. Text must parse as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseValue::Int(i) => Some(*i as f64),
            LooseValue::Float(f) if f.is_finite() => Some(*f),
            LooseValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Zero, empty text, null and non-scalars count as "no value".
    pub fn is_blank(&self) -> bool {
        match self {
            LooseValue::Int(i) => *i == 0,
            LooseValue::Float(f) => *f == 0.0,
            LooseValue::Text(s) => s.trim().is_empty(),
            LooseValue::Other(_) => true,
        }
    }
}

impl fmt::Display for LooseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LooseValue::Int(i) => write!(f, "{}", i),
            LooseValue::Float(v) => write!(f, "{}", v),
            LooseValue::Text(s) => write!(f, "{}", s.trim()),
            LooseValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for LooseValue {
    fn from(value: i64) -> Self {
        LooseValue::Int(value)
    }
}

impl From<f64> for LooseValue {
    fn from(value: f64) -> Self {
        LooseValue::Float(value)
    }
}

impl From<&str> for LooseValue {
    fn from(value: &str) -> Self {
        LooseValue::Text(value.to_string())
    }
}

/// Canonical media kinds used by the type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Tv,
    Anime,
    Other,
}

impl MediaKind {
    /// Parse either a slug ("movie") or the manager's localized name ("电影").
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "movie" | "电影" => MediaKind::Movie,
            "tv" | "tv_series" | "电视剧" => MediaKind::Tv,
            "anime" | "动漫" => MediaKind::Anime,
            _ => MediaKind::Other,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
            MediaKind::Anime => "anime",
            MediaKind::Other => "other",
        }
    }
}

/// Everything known about one organized media item.
///
/// Every field is optional; the mapper omits what is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub year: Option<LooseValue>,
    /// Type string as delivered ("电影", "movie", ...).
    pub media_type: Option<String>,
    /// TMDB id.
    pub external_id: Option<String>,
    pub rating: Option<LooseValue>,
    pub overview: Option<String>,
    /// Absolute URL or TMDB-relative path ("/abc.jpg").
    pub poster: Option<String>,
    pub season: Option<LooseValue>,
    pub episode_count: Option<LooseValue>,
    pub resolution: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    /// Release source (BluRay, WEB-DL, ...).
    pub release_source: Option<String>,
    pub release_group: Option<String>,
    /// Metadata provider tag, "TMDB" unless told otherwise.
    pub source: Option<String>,
}

impl MediaRecord {
    /// Title for logs and history; never empty.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.original_title.as_deref().filter(|t| !t.trim().is_empty()))
            .unwrap_or("未知")
    }

    pub fn kind(&self) -> MediaKind {
        self.media_type
            .as_deref()
            .map(MediaKind::parse)
            .unwrap_or(MediaKind::Other)
    }

    /// Season as an integer when one is known and non-zero.
    pub fn season_number(&self) -> Option<i64> {
        self.season
            .as_ref()
            .filter(|s| !s.is_blank())
            .and_then(LooseValue::as_i64)
    }
}
