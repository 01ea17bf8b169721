use redis::{AsyncCommands, Client};
use std::fmt::Display;

use crate::error::{AppError, AppResult};
use crate::models::MediaKind;

/// Keys for the metadata read-through cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MediaDetails(MediaKind, i64),
    MediaSearch(MediaKind, String),
    Genres,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MediaDetails(kind, id) => write!(f, "media:{}:{}", kind.as_str(), id),
            CacheKey::MediaSearch(kind, query) => {
                write!(f, "search:{}:{}", kind.as_str(), query.to_lowercase())
            }
            CacheKey::Genres => write!(f, "genres"),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Cache handler for storing and retrieving metadata from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
}

impl Cache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Retrieves a cached value by key, `None` on miss
    pub async fn get<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let value = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Stores a value with a TTL in seconds
    pub async fn set<T: serde::Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: u64,
    ) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(format!("{}", key), json, ttl).await?;

        tracing::debug!(key = %key, ttl = ttl, "Cached value");

        Ok(())
    }
}

/// Read-through caching: returns the cached value when present, otherwise
/// computes it with the given block and stores the result.
///
/// Cache reads propagate their error; cache writes are logged and swallowed
/// so a failed write never fails the request that computed the value.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get(&key).await? {
            tracing::debug!(key = %key, "Cache hit");
            Ok(cached)
        } else {
            tracing::debug!(key = %key, "Cache miss");
            let value = $block.await?;
            if let Err(e) = $cache.set(&key, &value, $ttl).await {
                tracing::warn!(key = %key, error = %e, "Cache write failed");
            }
            Ok(value)
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_details() {
        let key = CacheKey::MediaDetails(MediaKind::Movie, 550);
        assert_eq!(format!("{}", key), "media:movie:550");
    }

    #[test]
    fn test_cache_key_display_search_lowercases() {
        let key = CacheKey::MediaSearch(MediaKind::Tv, "Breaking Bad".to_string());
        assert_eq!(format!("{}", key), "search:tv:breaking bad");
    }

    #[test]
    fn test_cache_key_display_genres() {
        assert_eq!(format!("{}", CacheKey::Genres), "genres");
    }
}
