//! Testing utilities and mock implementations.
//!
//! Mocks for the external seams ([`NotionGateway`](crate::notion::NotionGateway)
//! and [`Notifier`](crate::notify::Notifier)) so the sync flow and the HTTP
//! API can be exercised without Notion or a webhook endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use notionsync_core::testing::{fixtures, MockNotionGateway};
//!
//! let gateway = MockNotionGateway::new();
//! gateway.add_existing("Inception", "page-1").await;
//! gateway.set_fail_creates(true).await;
//!
//! // Use in SyncService...
//! let created = gateway.created_pages().await;
//! ```

mod mock_notifier;
mod mock_notion;

pub use mock_notifier::MockNotifier;
pub use mock_notion::MockNotionGateway;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use serde_json::json;

    use crate::media::{LooseValue, MediaInfo, MetaInfo, TransferCompleteEvent, TransferInfo};

    /// A movie event as the media manager posts it.
    pub fn movie_event(title: &str, tmdb_id: i64) -> TransferCompleteEvent {
        TransferCompleteEvent {
            mediainfo: Some(MediaInfo {
                title: Some(title.to_string()),
                original_title: Some(title.to_string()),
                year: Some(LooseValue::Int(2010)),
                media_type: Some("电影".to_string()),
                tmdb_id: Some(LooseValue::Int(tmdb_id)),
                vote_average: Some(LooseValue::Float(8.4)),
                overview: Some(format!("{} overview", title)),
                poster_path: Some("/poster.jpg".to_string()),
                ..Default::default()
            }),
            transferinfo: Some(transfer_info()),
            meta: Some(MetaInfo {
                resource_pix: Some("1080p".to_string()),
                video_encode: Some("x265".to_string()),
                resource_type: Some("BluRay".to_string()),
                ..Default::default()
            }),
        }
    }

    /// A TV event for one season with a known episode list.
    pub fn tv_event(title: &str, tmdb_id: i64, season: i64) -> TransferCompleteEvent {
        let mut seasons = BTreeMap::new();
        seasons.insert(
            season.to_string(),
            (1..=8).map(|e| json!(e)).collect::<Vec<_>>(),
        );

        TransferCompleteEvent {
            mediainfo: Some(MediaInfo {
                title: Some(title.to_string()),
                year: Some(LooseValue::Text("2017".to_string())),
                media_type: Some("电视剧".to_string()),
                tmdb_id: Some(LooseValue::Int(tmdb_id)),
                number_of_episodes: Some(LooseValue::Int(26)),
                number_of_seasons: Some(LooseValue::Int(3)),
                seasons,
                ..Default::default()
            }),
            transferinfo: Some(transfer_info()),
            meta: Some(MetaInfo {
                begin_season: Some(LooseValue::Int(season)),
                episode_list: vec![LooseValue::Int(1), LooseValue::Int(2)],
                ..Default::default()
            }),
        }
    }

    fn transfer_info() -> TransferInfo {
        TransferInfo {
            success: Some(true),
            target_path: Some("/media/library".to_string()),
            file_count: Some(LooseValue::Int(1)),
            total_size: Some(LooseValue::Float(4_294_967_296.0)),
        }
    }
}
