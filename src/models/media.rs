use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MediaKind;

/// Normalized catalog fields returned to clients and used for list enrichment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaSummary {
    pub media_id: i64,
    pub media_kind: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub overview: String,
    pub genres: Vec<Genre>,
}

impl MediaSummary {
    /// Placeholder used when enrichment fails for a single item: the list
    /// degrades that item instead of aborting the batch.
    pub fn placeholder(media_id: i64, media_kind: MediaKind) -> Self {
        Self {
            media_id,
            media_kind,
            title: String::new(),
            poster_path: None,
            release_date: None,
            vote_average: 0.0,
            overview: String::new(),
            genres: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Movie and TV genre lists with the fetch timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenreCatalog {
    pub movies: Vec<Genre>,
    pub tv: Vec<Genre>,
    pub fetched_at: DateTime<Utc>,
}

// ============================================================================
// Raw TMDB payloads
// ============================================================================

/// Raw details payload from GET /movie/{id} and GET /tv/{id}
///
/// Movies carry `title`/`release_date`, TV carries `name`/`first_air_date`;
/// everything is optional so partial upstream responses never fail
/// deserialization. Search result items parse with the same shape.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDetails {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl TmdbDetails {
    /// Normalizes a raw payload, coalescing missing fields to safe defaults
    pub fn into_summary(self, media_kind: MediaKind) -> MediaSummary {
        let title = match media_kind {
            MediaKind::Movie => self.title.or(self.name),
            MediaKind::Tv => self.name.or(self.title),
        };
        let release_date = match media_kind {
            MediaKind::Movie => self.release_date.or(self.first_air_date),
            MediaKind::Tv => self.first_air_date.or(self.release_date),
        };

        MediaSummary {
            media_id: self.id,
            media_kind,
            title: title.unwrap_or_default(),
            poster_path: self.poster_path,
            release_date: release_date.filter(|d| !d.is_empty()),
            vote_average: self.vote_average.unwrap_or(0.0),
            overview: self.overview.unwrap_or_default(),
            genres: self.genres,
        }
    }
}

/// Raw search payload from GET /search/movie and GET /search/tv
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbDetails>,
}

/// Raw payload from GET /genre/{kind}/list
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_details_normalization() {
        let json = r#"{
            "id": 550,
            "title": "Fight Club",
            "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
            "release_date": "1999-10-15",
            "vote_average": 8.4,
            "overview": "A ticking-time-bomb insomniac...",
            "genres": [{"id": 18, "name": "Drama"}]
        }"#;

        let details: TmdbDetails = serde_json::from_str(json).unwrap();
        let summary = details.into_summary(MediaKind::Movie);

        assert_eq!(summary.media_id, 550);
        assert_eq!(summary.title, "Fight Club");
        assert_eq!(summary.release_date.as_deref(), Some("1999-10-15"));
        assert_eq!(summary.vote_average, 8.4);
        assert_eq!(summary.genres.len(), 1);
    }

    #[test]
    fn test_tv_details_use_name_and_first_air_date() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "first_air_date": "2008-01-20"
        }"#;

        let details: TmdbDetails = serde_json::from_str(json).unwrap();
        let summary = details.into_summary(MediaKind::Tv);

        assert_eq!(summary.title, "Breaking Bad");
        assert_eq!(summary.release_date.as_deref(), Some("2008-01-20"));
    }

    #[test]
    fn test_partial_payload_coalesces_to_defaults() {
        // Upstream shape errors must not reach rendering code
        let details: TmdbDetails = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        let summary = details.into_summary(MediaKind::Movie);

        assert_eq!(summary.title, "");
        assert_eq!(summary.poster_path, None);
        assert_eq!(summary.release_date, None);
        assert_eq!(summary.vote_average, 0.0);
        assert!(summary.genres.is_empty());
    }

    #[test]
    fn test_empty_release_date_becomes_none() {
        let details: TmdbDetails =
            serde_json::from_str(r#"{"id": 42, "title": "X", "release_date": ""}"#).unwrap();
        let summary = details.into_summary(MediaKind::Movie);
        assert_eq!(summary.release_date, None);
    }

    #[test]
    fn test_placeholder_fields() {
        let summary = MediaSummary::placeholder(7, MediaKind::Tv);
        assert_eq!(summary.media_id, 7);
        assert_eq!(summary.title, "");
        assert_eq!(summary.vote_average, 0.0);
    }
}
