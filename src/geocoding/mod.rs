//! Address enrichment: CEP lookup (ViaCEP), free-text geocoding (Nominatim),
//! and the background job that fills in missing listing coordinates.
//!
//! CEP lookups never fail loudly: bad input, HTTP errors and "not found" all
//! come back as `None`. Geocoding keeps "no match" (`Ok(None)`) apart from
//! upstream trouble (`Err`), so only the former is ever cached.

pub mod cache;
pub mod enrichment;
pub mod nominatim;
pub mod viacep;
pub mod worker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::validation::geo::Coordinates;
pub use cache::CachedGeocoder;
pub use enrichment::{EnrichOutcome, Enricher};
pub use nominatim::NominatimClient;
pub use viacep::ViaCepClient;
pub use worker::{BatchReport, EnrichmentHandle, EnrichmentWorker};

use crate::config::GeocodingConfig;

/// Address parts resolved from a CEP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub cep: String,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[async_trait]
pub trait PostalLookup: Send + Sync {
    /// `cep` may contain punctuation.
    async fn lookup(&self, cep: &str) -> Option<PostalAddress>;
}

/// Upstream trouble; the same query may succeed later.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("geocoder returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the upstream answered and found nothing.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Shared HTTP client for both upstreams: explicit timeout, descriptive
/// User-Agent (required by the Nominatim usage policy), no redirects to
/// surprise hosts.
pub fn http_client(config: &GeocodingConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(3))
        .build()
}
