use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of catalog item a list entry points at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    pub fn parse(s: &str) -> Option<MediaKind> {
        match s {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

/// Status bucket of a list entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    Watchlist,
    Watching,
    Completed,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watchlist => "watchlist",
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<WatchStatus> {
        match s {
            "watchlist" => Some(WatchStatus::Watchlist),
            "watching" => Some(WatchStatus::Watching),
            "completed" => Some(WatchStatus::Completed),
            _ => None,
        }
    }
}

/// One (user, media item) membership in a status bucket
///
/// The triple (user_id, media_id, media_kind) is unique: changing status
/// mutates the existing record, never inserts a second one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub media_id: i64,
    pub media_kind: MediaKind,
    pub status: WatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WatchEntry {
    pub fn new(user_id: Uuid, media_id: i64, media_kind: MediaKind, status: WatchStatus) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            media_id,
            media_kind,
            status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A list entry enriched with catalog metadata for display
///
/// Built from a [`WatchEntry`] plus the gateway's summary; when the lookup
/// fails the metadata half degrades to placeholder fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchItem {
    pub media_id: i64,
    pub media_kind: MediaKind,
    pub status: WatchStatus,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub added_at: DateTime<Utc>,
}

impl WatchItem {
    pub fn new(entry: &WatchEntry, summary: super::MediaSummary) -> Self {
        Self {
            media_id: entry.media_id,
            media_kind: entry.media_kind,
            status: entry.status,
            title: summary.title,
            poster_path: summary.poster_path,
            release_date: summary.release_date,
            vote_average: summary.vote_average,
            added_at: entry.created_at,
        }
    }
}
