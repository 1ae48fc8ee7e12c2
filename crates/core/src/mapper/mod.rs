//! Maps a [`MediaRecord`] onto Notion page properties.
//!
//! Each property is independent: a missing source value, or one that does
//! not coerce to the property's type, leaves the property out entirely.
//! Nothing is ever emitted as `null`.

use serde_json::{json, Map, Value};

use crate::media::{LooseValue, MediaRecord};

/// Property name → Notion property value, ready for `pages.create`.
pub type PropertyMap = Map<String, Value>;

/// Notion rejects rich text longer than this.
pub const MAX_TEXT_LEN: usize = 2000;
const ELLIPSIS: &str = "...";

pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Catch-all category for unknown media types.
pub const OTHER_CATEGORY: &str = "其他";

/// Type tag (lowercased) → category shown in Notion.
const CATEGORY_TABLE: &[(&str, &str)] = &[
    ("movie", "电影"),
    ("tv", "剧集"),
    ("tv_series", "剧集"),
    ("anime", "动画"),
    ("电影", "电影"),
    ("电视剧", "剧集"),
];

pub mod props {
    pub const TITLE: &str = "标题";
    pub const ORIGINAL_TITLE: &str = "原始标题";
    pub const CATEGORY: &str = "类型";
    pub const YEAR: &str = "年份";
    pub const SEASON: &str = "季数";
    pub const EPISODES: &str = "集数";
    pub const RATING: &str = "评分";
    pub const POSTER: &str = "封面";
    pub const OVERVIEW: &str = "简介";
    pub const TMDB_ID: &str = "TMDB ID";
    pub const SOURCE: &str = "数据源";
    pub const RESOLUTION: &str = "分辨率";
    pub const VIDEO_CODEC: &str = "视频编码";
    pub const AUDIO_CODEC: &str = "音频编码";
    pub const RELEASE_SOURCE: &str = "片源";
    pub const RELEASE_GROUP: &str = "制作组";
}

/// Build the property map for one record.
pub fn build_properties(record: &MediaRecord) -> PropertyMap {
    let mut properties = PropertyMap::new();

    if let Some(title) = text(&record.title) {
        properties.insert(props::TITLE.into(), title_value(title));
    }
    if let Some(original) = text(&record.original_title) {
        properties.insert(props::ORIGINAL_TITLE.into(), rich_text_value(original));
    }
    if let Some(media_type) = text(&record.media_type) {
        properties.insert(props::CATEGORY.into(), select_value(category_for(media_type)));
    }
    if let Some(year) = int(&record.year) {
        properties.insert(props::YEAR.into(), json!({ "number": year }));
    }
    if let Some(season) = int(&record.season) {
        properties.insert(props::SEASON.into(), json!({ "number": season }));
    }
    if let Some(episodes) = record.episode_count.as_ref().filter(|e| !e.is_blank()) {
        properties.insert(props::EPISODES.into(), rich_text_value(&episodes.to_string()));
    }
    if let Some(rating) = record
        .rating
        .as_ref()
        .filter(|r| !r.is_blank())
        .and_then(LooseValue::as_f64)
    {
        properties.insert(props::RATING.into(), json!({ "number": rating }));
    }
    if let Some(poster) = text(&record.poster) {
        let url = poster_url(poster);
        properties.insert(
            props::POSTER.into(),
            json!({ "files": [{ "name": props::POSTER, "external": { "url": url } }] }),
        );
    }
    if let Some(overview) = text(&record.overview) {
        properties.insert(
            props::OVERVIEW.into(),
            rich_text_value(&truncate_text(overview, MAX_TEXT_LEN)),
        );
    }
    if let Some(id) = text(&record.external_id) {
        properties.insert(props::TMDB_ID.into(), rich_text_value(id));
    }
    if let Some(source) = text(&record.source) {
        properties.insert(props::SOURCE.into(), select_value(source));
    }

    let selects = [
        (props::RESOLUTION, &record.resolution),
        (props::VIDEO_CODEC, &record.video_codec),
        (props::AUDIO_CODEC, &record.audio_codec),
        (props::RELEASE_SOURCE, &record.release_source),
    ];
    for (name, value) in selects {
        if let Some(v) = text(value) {
            properties.insert(name.into(), select_value(v));
        }
    }
    if let Some(group) = text(&record.release_group) {
        properties.insert(props::RELEASE_GROUP.into(), rich_text_value(group));
    }

    properties
}

/// Category for a type tag, `其他` when unknown.
pub fn category_for(media_type: &str) -> &'static str {
    let key = media_type.trim().to_lowercase();
    CATEGORY_TABLE
        .iter()
        .find(|(tag, _)| *tag == key)
        .map(|(_, category)| *category)
        .unwrap_or(OTHER_CATEGORY)
}

/// Root-relative TMDB paths become absolute image URLs.
pub fn poster_url(poster: &str) -> String {
    if poster.starts_with('/') {
        format!("{}{}", TMDB_IMAGE_BASE, poster)
    } else {
        poster.to_string()
    }
}

/// Cut `text` to at most `max` characters, ending in `...` when cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn int(value: &Option<LooseValue>) -> Option<i64> {
    value
        .as_ref()
        .filter(|v| !v.is_blank())
        .and_then(LooseValue::as_i64)
}

fn title_value(content: &str) -> Value {
    json!({ "title": [{ "text": { "content": truncate_text(content, MAX_TEXT_LEN) } }] })
}

fn rich_text_value(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": truncate_text(content, MAX_TEXT_LEN) } }] })
}

// Select option names may not contain commas.
fn select_value(name: &str) -> Value {
    json!({ "select": { "name": name.replace(',', " ") } })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inception() -> MediaRecord {
        MediaRecord {
            title: Some("Inception".to_string()),
            media_type: Some("movie".to_string()),
            year: Some(LooseValue::Int(2010)),
            external_id: Some("27205".to_string()),
            ..Default::default()
        }
    }

    fn rich_text_content(value: &Value) -> &str {
        value["rich_text"][0]["text"]["content"].as_str().unwrap()
    }

    #[test]
    fn test_inception_example() {
        let properties = build_properties(&inception());

        assert_eq!(
            properties[props::TITLE]["title"][0]["text"]["content"],
            "Inception"
        );
        assert_eq!(properties[props::CATEGORY]["select"]["name"], "电影");
        assert_eq!(properties[props::YEAR]["number"], 2010);
        assert_eq!(rich_text_content(&properties[props::TMDB_ID]), "27205");
        assert!(!properties.contains_key(props::SEASON));
    }

    #[test]
    fn test_missing_fields_are_omitted_not_null() {
        let properties = build_properties(&MediaRecord::default());
        assert!(properties.is_empty());

        let properties = build_properties(&inception());
        for name in [
            props::ORIGINAL_TITLE,
            props::SEASON,
            props::EPISODES,
            props::RATING,
            props::POSTER,
            props::OVERVIEW,
            props::SOURCE,
            props::RESOLUTION,
            props::RELEASE_GROUP,
        ] {
            assert!(!properties.contains_key(name), "{} should be absent", name);
        }
        assert!(properties.values().all(|v| !v.is_null()));
    }

    #[test]
    fn test_coercion_failures_omit_property() {
        let record = MediaRecord {
            year: Some(LooseValue::from("unknown")),
            season: Some(LooseValue::from("S1")),
            rating: Some(LooseValue::from("N/A")),
            ..Default::default()
        };
        let properties = build_properties(&record);
        assert!(!properties.contains_key(props::YEAR));
        assert!(!properties.contains_key(props::SEASON));
        assert!(!properties.contains_key(props::RATING));
    }

    #[test]
    fn test_numeric_text_is_coerced() {
        let record = MediaRecord {
            year: Some(LooseValue::from("1999")),
            season: Some(LooseValue::from("2")),
            rating: Some(LooseValue::from("8.7")),
            episode_count: Some(LooseValue::Int(10)),
            ..Default::default()
        };
        let properties = build_properties(&record);
        assert_eq!(properties[props::YEAR]["number"], 1999);
        assert_eq!(properties[props::SEASON]["number"], 2);
        assert_eq!(properties[props::RATING]["number"], 8.7);
        assert_eq!(rich_text_content(&properties[props::EPISODES]), "10");
    }

    #[test]
    fn test_zero_rating_omitted() {
        let record = MediaRecord {
            rating: Some(LooseValue::Float(0.0)),
            ..Default::default()
        };
        assert!(!build_properties(&record).contains_key(props::RATING));
    }

    #[test]
    fn test_overview_truncation() {
        let long: String = "好".repeat(MAX_TEXT_LEN + 1);
        let record = MediaRecord {
            overview: Some(long),
            ..Default::default()
        };
        let properties = build_properties(&record);
        let content = rich_text_content(&properties[props::OVERVIEW]);
        assert_eq!(content.chars().count(), MAX_TEXT_LEN);
        assert!(content.ends_with("..."));

        let exact: String = "a".repeat(MAX_TEXT_LEN);
        assert_eq!(truncate_text(&exact, MAX_TEXT_LEN), exact);
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghijk", 10), "abcdefg...");
    }

    #[test]
    fn test_category_lookup() {
        assert_eq!(category_for("movie"), "电影");
        assert_eq!(category_for("TV"), "剧集");
        assert_eq!(category_for("tv_series"), "剧集");
        assert_eq!(category_for("anime"), "动画");
        assert_eq!(category_for("电影"), "电影");
        assert_eq!(category_for("电视剧"), "剧集");
        assert_eq!(category_for("documentary"), "其他");
    }

    #[test]
    fn test_poster_url_rewrite() {
        assert_eq!(
            poster_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            poster_url("https://example.com/p.jpg"),
            "https://example.com/p.jpg"
        );

        let record = MediaRecord {
            poster: Some("/abc.jpg".to_string()),
            ..Default::default()
        };
        let properties = build_properties(&record);
        assert_eq!(
            properties[props::POSTER]["files"][0]["external"]["url"],
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn test_technical_tags() {
        let record = MediaRecord {
            resolution: Some("2160p".to_string()),
            video_codec: Some("x265".to_string()),
            audio_codec: Some("TrueHD 7.1, Atmos".to_string()),
            release_source: Some("WEB-DL".to_string()),
            release_group: Some("FRDS".to_string()),
            source: Some("TMDB".to_string()),
            ..Default::default()
        };
        let properties = build_properties(&record);
        assert_eq!(properties[props::RESOLUTION]["select"]["name"], "2160p");
        assert_eq!(properties[props::VIDEO_CODEC]["select"]["name"], "x265");
        assert_eq!(
            properties[props::AUDIO_CODEC]["select"]["name"],
            "TrueHD 7.1  Atmos"
        );
        assert_eq!(properties[props::RELEASE_SOURCE]["select"]["name"], "WEB-DL");
        assert_eq!(rich_text_content(&properties[props::RELEASE_GROUP]), "FRDS");
        assert_eq!(properties[props::SOURCE]["select"]["name"], "TMDB");
    }
}
