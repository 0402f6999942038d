use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use super::{Coordinates, GeocodeError, Geocoder};
use crate::validation::normalize_text;

/// Memoizes a [`Geocoder`] by normalized query, so listings in the same
/// city/state share one upstream request. Answered misses are cached too;
/// upstream errors never are.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Arc<Cache<String, Option<Coordinates>>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, ttl: Duration, capacity: u64) -> Self {
        let cache = Arc::new(
            Cache::builder()
                .time_to_live(ttl)
                .max_capacity(capacity)
                .build(),
        );
        Self { inner, cache }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let key = normalize_text(query);
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let result = self.inner.geocode(query).await?;
        self.cache.insert(key, result).await;
        Ok(result)
    }
}
