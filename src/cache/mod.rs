use redis::{Client, RedisError, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get a JSON value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> redis::RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        match value {
            Some(v) => {
                let deserialized = serde_json::from_str(&v).map_err(|e| {
                    RedisError::from((
                        redis::ErrorKind::TypeError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Store a value as JSON with a TTL
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        redis::cmd("SET")
            .arg(key)
            .arg(serialized)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut self.connection.clone())
            .await
    }

    pub async fn delete(&self, key: &str) -> redis::RedisResult<()> {
        redis::cmd("DEL")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await
    }
}

/// Response cache shared by the handlers. Without Redis every lookup misses
/// and every write is dropped; Redis errors are logged, never returned.
#[derive(Clone, Default)]
pub struct ResponseCache {
    redis: Option<RedisCache>,
}

impl ResponseCache {
    pub fn new(redis: Option<RedisCache>) -> Self {
        Self { redis }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let redis = self.redis.as_ref()?;
        match redis.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "cache read failed: {e}");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        if let Some(redis) = &self.redis {
            if let Err(e) = redis.set(key, value, ttl).await {
                tracing::warn!(key, "cache write failed: {e}");
            }
        }
    }

    pub async fn invalidate(&self, key: &str) {
        if let Some(redis) = &self.redis {
            if let Err(e) = redis.delete(key).await {
                tracing::warn!(key, "cache invalidation failed: {e}");
            }
        }
    }
}

/// Cache key generators
pub mod keys {
    /// Public provider page
    pub fn provider(id: i32) -> String {
        format!("provider:{id}")
    }

    pub fn categories() -> String {
        "categories:all".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = ResponseCache::disabled();
        cache.set(&keys::provider(1), &"x", Duration::from_secs(60)).await;
        assert_eq!(cache.get::<String>(&keys::provider(1)).await, None);
        cache.invalidate(&keys::provider(1)).await;
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(keys::provider(42), "provider:42");
        assert_eq!(keys::categories(), "categories:all");
    }
}
