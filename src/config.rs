use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Process-wide settings, read once at startup from the environment
/// (after `dotenv()` has loaded any `.env` file).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub redis_url: Option<String>,
    pub static_dir: Option<String>,
    pub run_migrations: bool,
    pub geocoding: GeocodingConfig,
    pub enrichment: EnrichmentConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: env::var("PORT").unwrap_or_else(|_| "8080".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl: parse_duration_secs("JWT_TTL_SECS", 7 * 24 * 3600),
            redis_url: optional("REDIS_URL"),
            static_dir: optional("STATIC_DIR"),
            run_migrations: parse_bool("RUN_MIGRATIONS"),
            geocoding: GeocodingConfig::from_env(),
            enrichment: EnrichmentConfig::from_env(),
            cache: CacheConfig::from_env(),
        })
    }
}

/// Outbound ViaCEP / Nominatim settings.
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub viacep_base_url: String,
    pub nominatim_base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Minimum gap between Nominatim requests. Their policy allows 1 req/s.
    pub min_interval: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            viacep_base_url: "https://viacep.com.br/ws".to_string(),
            nominatim_base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "Antly/1.0 (contato@antly.com.br)".to_string(),
            timeout: Duration::from_secs(10),
            min_interval: Duration::from_millis(1100),
            cache_ttl: Duration::from_secs(24 * 3600),
            cache_capacity: 10_000,
        }
    }
}

impl GeocodingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            viacep_base_url: optional("VIACEP_BASE_URL").unwrap_or(defaults.viacep_base_url),
            nominatim_base_url: optional("NOMINATIM_BASE_URL")
                .unwrap_or(defaults.nominatim_base_url),
            user_agent: optional("GEOCODER_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout: parse_duration_secs("GEOCODER_TIMEOUT_SECS", 10),
            min_interval: Duration::from_millis(parse_number("NOMINATIM_MIN_INTERVAL_MS", 1100)),
            cache_ttl: parse_duration_secs("GEOCODER_CACHE_TTL_SECS", 24 * 3600),
            cache_capacity: parse_number("GEOCODER_CACHE_CAPACITY", 10_000),
        }
    }
}

/// Background coordinate backfill settings.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub interval: Duration,
    pub batch_size: u64,
    pub max_attempts: i32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            batch_size: 25,
            max_attempts: 5,
            backoff_base: Duration::from_secs(300),
            backoff_max: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

impl EnrichmentConfig {
    pub fn from_env() -> Self {
        Self {
            interval: parse_duration_secs("ENRICHMENT_INTERVAL_SECS", 60),
            batch_size: parse_number("ENRICHMENT_BATCH_SIZE", 25),
            max_attempts: parse_number("ENRICHMENT_MAX_ATTEMPTS", 5),
            backoff_base: parse_duration_secs("ENRICHMENT_BACKOFF_BASE_SECS", 300),
            backoff_max: parse_duration_secs("ENRICHMENT_BACKOFF_MAX_SECS", 7 * 24 * 3600),
        }
    }
}

/// Response cache TTLs.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub provider_ttl: Duration,
    pub categories_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider_ttl: Duration::from_secs(600),    // 10 minutes
            categories_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            provider_ttl: parse_duration_secs("CACHE_TTL_PROVIDER_SECS", 600),
            categories_ttl: parse_duration_secs("CACHE_TTL_CATEGORIES_SECS", 3600),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Unset, unparsable or out-of-range values fall back to `default`.
fn parse_number<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_duration_secs(env_var: &str, default: u64) -> Duration {
    Duration::from_secs(parse_number(env_var, default))
}
