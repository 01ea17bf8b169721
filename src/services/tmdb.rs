//! Read-through gateway to the TMDB catalog.
//!
//! Every call site treats the upstream as fallible: requests carry an
//! explicit client timeout, payloads normalize missing fields to safe
//! defaults, and list enrichment degrades per item instead of failing a
//! batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        Genre, GenreCatalog, MediaKind, MediaSummary, TmdbDetails, TmdbGenreList,
        TmdbSearchResponse, WatchEntry, WatchItem,
    },
};

const DETAILS_CACHE_TTL: u64 = 86_400; // 1 day
const SEARCH_CACHE_TTL: u64 = 3_600; // 1 hour
const GENRES_CACHE_TTL: u64 = 86_400; // 1 day

/// Trait for catalog metadata providers
///
/// The production implementation talks to TMDB; tests substitute a stub.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Normalized catalog fields for one media item
    async fn media_summary(&self, media_kind: MediaKind, media_id: i64)
        -> AppResult<MediaSummary>;

    /// Title search within one media kind
    async fn search(&self, media_kind: MediaKind, query: &str) -> AppResult<Vec<MediaSummary>>;

    /// Movie and TV genre lists
    async fn genres(&self) -> AppResult<GenreCatalog>;
}

/// TMDB client with a Redis read-through cache
#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    cache: Cache,
    api_key: String,
    api_url: String,
}

impl TmdbClient {
    pub fn new(cache: Cache, api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http_client,
            cache,
            api_key,
            api_url,
        })
    }

    /// Issues a GET against the TMDB API and deserializes the response
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(AppError::Upstream(format!(
                "TMDB returned status {}",
                status
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_genre_list(&self, media_kind: MediaKind) -> AppResult<Vec<Genre>> {
        let list: TmdbGenreList = self
            .get_json(&format!("/genre/{}/list", media_kind.as_str()), &[])
            .await?;
        Ok(list.genres)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbClient {
    async fn media_summary(
        &self,
        media_kind: MediaKind,
        media_id: i64,
    ) -> AppResult<MediaSummary> {
        cached!(
            self.cache,
            CacheKey::MediaDetails(media_kind, media_id),
            DETAILS_CACHE_TTL,
            async move {
                let raw: TmdbDetails = self
                    .get_json(&format!("/{}/{}", media_kind.as_str(), media_id), &[])
                    .await?;
                Ok::<_, AppError>(raw.into_summary(media_kind))
            }
        )
    }

    async fn search(&self, media_kind: MediaKind, query: &str) -> AppResult<Vec<MediaSummary>> {
        cached!(
            self.cache,
            CacheKey::MediaSearch(media_kind, query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let raw: TmdbSearchResponse = self
                    .get_json(&format!("/search/{}", media_kind.as_str()), &[("query", query)])
                    .await?;

                let results: Vec<MediaSummary> = raw
                    .results
                    .into_iter()
                    .map(|details| details.into_summary(media_kind))
                    .collect();

                tracing::info!(
                    query = %query,
                    kind = media_kind.as_str(),
                    results = results.len(),
                    "Catalog search completed"
                );

                Ok::<_, AppError>(results)
            }
        )
    }

    async fn genres(&self) -> AppResult<GenreCatalog> {
        cached!(self.cache, CacheKey::Genres, GENRES_CACHE_TTL, async move {
            let (movies, tv) = tokio::try_join!(
                self.fetch_genre_list(MediaKind::Movie),
                self.fetch_genre_list(MediaKind::Tv)
            )?;

            Ok::<_, AppError>(GenreCatalog {
                movies,
                tv,
                fetched_at: Utc::now(),
            })
        })
    }
}

/// Enriches list entries with catalog metadata, fetching in parallel.
///
/// A failed lookup degrades that single item to placeholder fields; the
/// batch itself never fails.
pub async fn enrich_entries(
    metadata: Arc<dyn MetadataProvider>,
    entries: Vec<WatchEntry>,
) -> Vec<WatchItem> {
    let mut tasks = Vec::with_capacity(entries.len());

    for entry in entries {
        let provider = metadata.clone();
        tasks.push(tokio::spawn(async move {
            let summary = match provider.media_summary(entry.media_kind, entry.media_id).await {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::warn!(
                        media_id = entry.media_id,
                        kind = entry.media_kind.as_str(),
                        error = %e,
                        "Enrichment failed, degrading to placeholder"
                    );
                    MediaSummary::placeholder(entry.media_id, entry.media_kind)
                }
            };
            WatchItem::new(&entry, summary)
        }));
    }

    let mut items = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(item) => items.push(item),
            Err(e) => tracing::error!(error = %e, "Enrichment task join error"),
        }
    }

    items
}
