use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{Coordinates, GeocodeError, Geocoder};

/// Client for the Nominatim `/search` endpoint, restricted to Brazil.
///
/// Requests are serialized and spaced at least `min_interval` apart across
/// every clone of the client.
#[derive(Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

fn first_coordinates(results: &[SearchResult]) -> Option<Coordinates> {
    let first = results.first()?;
    let latitude = first.lat.trim().parse::<f64>().ok()?;
    let longitude = first.lon.trim().parse::<f64>().ok()?;
    (latitude.is_finite() && longitude.is_finite()).then(|| Coordinates::new(latitude, longitude))
}

impl NominatimClient {
    pub fn new(client: reqwest::Client, base_url: &str, min_interval: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait for our slot. The lock is held until the request has been sent.
    async fn send(&self, query: &str) -> reqwest::Result<reqwest::Response> {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }

        let result = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", "br"),
                ("q", query),
            ])
            .send()
            .await;

        *last = Some(Instant::now());
        result
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        debug!("Nominatim search {query:?}");
        let response = self.send(query).await.map_err(|e| {
            warn!("Nominatim request failed for {query:?}: {e}");
            GeocodeError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Nominatim returned HTTP {status} for {query:?}");
            return Err(GeocodeError::Status(status));
        }

        let results = response.json::<Vec<SearchResult>>().await.map_err(|e| {
            warn!("Nominatim body for {query:?} could not be parsed: {e}");
            GeocodeError::from(e)
        })?;
        Ok(first_coordinates(&results))
    }
}
