use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectionTrait, DbErr};
use tracing::{debug, warn};

use super::{Coordinates, Geocoder, PostalLookup};
use crate::config::EnrichmentConfig;
use crate::db;
use crate::models::ads;
use crate::validation::non_blank;

/// Location parts worked out for one listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLocation {
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnrichOutcome {
    /// Both coordinates were already stored. Nothing was fetched or written.
    AlreadyGeocoded,
    Geocoded(Coordinates),
    /// No coordinates found. `attempts` is the new failure count.
    Failed { attempts: i32 },
}

/// Fills in neighborhood and coordinates for listings that lack them.
pub struct Enricher {
    postal: Arc<dyn PostalLookup>,
    geocoder: Arc<dyn Geocoder>,
    backoff_base: Duration,
    backoff_max: Duration,
}

impl Enricher {
    pub fn new(
        postal: Arc<dyn PostalLookup>,
        geocoder: Arc<dyn Geocoder>,
        config: &EnrichmentConfig,
    ) -> Self {
        Self {
            postal,
            geocoder,
            backoff_base: config.backoff_base,
            backoff_max: config.backoff_max,
        }
    }

    /// Look up the address by CEP when the listing is missing parts of it,
    /// then try the geocoder from the most to the least specific query.
    pub async fn resolve(&self, ad: &ads::Model) -> ResolvedLocation {
        let mut location = ResolvedLocation {
            neighborhood: owned(ad.neighborhood.as_deref()),
            city: owned(ad.city.as_deref()),
            state: owned(ad.state.as_deref()),
            coordinates: None,
        };

        let incomplete =
            location.neighborhood.is_none() || location.city.is_none() || location.state.is_none();
        if incomplete {
            if let Some(cep) = non_blank(ad.cep.as_deref()) {
                if let Some(address) = self.postal.lookup(cep).await {
                    location.neighborhood = location.neighborhood.or(address.neighborhood);
                    location.city = location.city.or(address.city);
                    location.state = location.state.or(address.state);
                }
            }
        }

        for query in geocode_queries(&location) {
            match self.geocoder.geocode(&query).await {
                Ok(Some(coordinates)) => {
                    debug!(ad_id = ad.id, %query, "geocoded listing");
                    location.coordinates = Some(coordinates);
                    break;
                }
                Ok(None) => {}
                // Counted as a failed attempt and retried after the backoff.
                Err(e) => warn!(ad_id = ad.id, %query, "geocoder unavailable: {e}"),
            }
        }

        location
    }

    /// Resolve and persist one listing.
    ///
    /// Stored values are never overwritten: coordinates are only written while
    /// missing, and the neighborhood only while null.
    pub async fn enrich_listing<C>(&self, db: &C, ad: &ads::Model) -> Result<EnrichOutcome, DbErr>
    where
        C: ConnectionTrait,
    {
        if ad.has_coordinates() {
            return Ok(EnrichOutcome::AlreadyGeocoded);
        }

        let location = self.resolve(ad).await;
        match location.coordinates {
            Some(coordinates) => {
                db::ads::store_coordinates(db, ad.id, coordinates, location.neighborhood.as_deref())
                    .await?;
                Ok(EnrichOutcome::Geocoded(coordinates))
            }
            None => {
                let attempts = ad.geocode_attempts.saturating_add(1);
                let delay = next_backoff(attempts, self.backoff_base, self.backoff_max);
                let next_attempt_at = chrono::Utc::now()
                    + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::weeks(1));
                warn!(ad_id = ad.id, attempts, ?delay, "could not geocode listing");
                db::ads::record_geocode_failure(db, ad.id, attempts, next_attempt_at).await?;
                Ok(EnrichOutcome::Failed { attempts })
            }
        }
    }
}

/// Queries to try, most specific first. Empty when city or state is unknown.
pub fn geocode_queries(location: &ResolvedLocation) -> Vec<String> {
    let (Some(city), Some(state)) = (location.city.as_deref(), location.state.as_deref()) else {
        return Vec::new();
    };

    let mut queries = Vec::with_capacity(2);
    if let Some(neighborhood) = location.neighborhood.as_deref() {
        queries.push(format!("{neighborhood}, {city}, {state}, Brasil"));
    }
    queries.push(format!("{city}, {state}, Brasil"));
    queries
}

/// Delay before retry number `attempts + 1`: `base * 2^(attempts - 1)`,
/// capped at `max`.
pub fn next_backoff(attempts: i32, base: Duration, max: Duration) -> Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 31) as u32;
    base.checked_mul(2u32.saturating_pow(exponent))
        .map_or(max, |delay| delay.min(max))
}

fn owned(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::{GeocodeError, PostalAddress};
    use crate::models::ads::AdStatus;
    use async_trait::async_trait;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakePostal {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PostalLookup for FakePostal {
        async fn lookup(&self, cep: &str) -> Option<PostalAddress> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(PostalAddress {
                cep: cep.to_string(),
                street: Some("Avenida Paulista".into()),
                neighborhood: Some("Bela Vista".into()),
                city: Some("São Paulo".into()),
                state: Some("SP".into()),
            })
        }
    }

    /// Answers only for queries listed in `known`, recording every query.
    /// While `down` is set every call fails with a 503.
    struct FakeGeocoder {
        known: Vec<&'static str>,
        down: bool,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
            self.seen.lock().unwrap().push(query.to_string());
            if self.down {
                return Err(GeocodeError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            Ok(self
                .known
                .iter()
                .any(|known| *known == query)
                .then(|| Coordinates::new(-23.561, -46.656)))
        }
    }

    fn enricher(known: Vec<&'static str>) -> (Enricher, Arc<FakePostal>, Arc<FakeGeocoder>) {
        build_enricher(known, false)
    }

    fn build_enricher(
        known: Vec<&'static str>,
        down: bool,
    ) -> (Enricher, Arc<FakePostal>, Arc<FakeGeocoder>) {
        let postal = Arc::new(FakePostal {
            calls: AtomicUsize::new(0),
        });
        let geocoder = Arc::new(FakeGeocoder {
            known,
            down,
            seen: Mutex::new(Vec::new()),
        });
        let enricher = Enricher::new(postal.clone(), geocoder.clone(), &EnrichmentConfig::default());
        (enricher, postal, geocoder)
    }

    fn listing() -> ads::Model {
        ads::Model {
            id: 7,
            user_id: 3,
            title: "Instalação elétrica residencial".into(),
            description: "Tomadas, chuveiros e quadros".into(),
            category: "Eletricista".into(),
            service_function: "Eletricista".into(),
            status: AdStatus::Postado,
            rejection_reason: None,
            city: Some("São Paulo".into()),
            state: Some("SP".into()),
            neighborhood: Some("Bela Vista".into()),
            cep: Some("01310-100".into()),
            latitude: None,
            longitude: None,
            service_radius_km: Some(15),
            payment_methods: serde_json::json!(["pix"]),
            has_warranty: true,
            attends_24h: false,
            own_equipment: true,
            specialized_team: false,
            photos: serde_json::json!([]),
            views: 0,
            ratings_count: 0,
            ratings_avg: 0.0,
            geocode_attempts: 0,
            geocode_next_attempt_at: None,
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[tokio::test]
    async fn geocoded_listing_is_neither_queried_nor_rewritten() {
        let (enricher, postal, geocoder) = enricher(vec!["Bela Vista, São Paulo, SP, Brasil"]);
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let mut ad = listing();
        ad.latitude = Some(-23.5);
        ad.longitude = Some(-46.6);

        let outcome = enricher.enrich_listing(&db, &ad).await.unwrap();
        assert_eq!(outcome, EnrichOutcome::AlreadyGeocoded);
        assert_eq!(postal.calls.load(Ordering::SeqCst), 0);
        assert!(geocoder.seen.lock().unwrap().is_empty());
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn missing_coordinates_are_stored_once_found() {
        let (enricher, postal, _) = enricher(vec!["Bela Vista, São Paulo, SP, Brasil"]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok(), exec_ok()])
            .into_connection();

        let outcome = enricher.enrich_listing(&db, &listing()).await.unwrap();
        assert_eq!(outcome, EnrichOutcome::Geocoded(Coordinates::new(-23.561, -46.656)));
        // Address was complete, so no CEP lookup.
        assert_eq!(postal.calls.load(Ordering::SeqCst), 0);
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn falls_back_to_city_and_fills_address_from_cep() {
        let (enricher, postal, geocoder) = enricher(vec!["São Paulo, SP, Brasil"]);
        let mut ad = listing();
        ad.neighborhood = None;
        ad.city = None;

        let location = enricher.resolve(&ad).await;
        assert_eq!(postal.calls.load(Ordering::SeqCst), 1);
        assert_eq!(location.neighborhood.as_deref(), Some("Bela Vista"));
        assert_eq!(location.city.as_deref(), Some("São Paulo"));
        assert!(location.coordinates.is_some());
        assert_eq!(
            *geocoder.seen.lock().unwrap(),
            vec![
                "Bela Vista, São Paulo, SP, Brasil".to_string(),
                "São Paulo, SP, Brasil".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn failure_records_attempt() {
        let (enricher, _, _) = enricher(vec![]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok()])
            .into_connection();

        let mut ad = listing();
        ad.geocode_attempts = 2;

        let outcome = enricher.enrich_listing(&db, &ad).await.unwrap();
        assert_eq!(outcome, EnrichOutcome::Failed { attempts: 3 });
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn geocoder_outage_counts_as_a_retryable_failure() {
        let (enricher, _, geocoder) = build_enricher(vec!["Bela Vista, São Paulo, SP, Brasil"], true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok()])
            .into_connection();

        let outcome = enricher.enrich_listing(&db, &listing()).await.unwrap();
        assert_eq!(outcome, EnrichOutcome::Failed { attempts: 1 });
        assert_eq!(geocoder.seen.lock().unwrap().len(), 2);
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[test]
    fn no_queries_without_city_and_state() {
        let location = ResolvedLocation {
            neighborhood: Some("Centro".into()),
            city: Some("Campinas".into()),
            ..Default::default()
        };
        assert!(geocode_queries(&location).is_empty());
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let base = Duration::from_secs(300);
        let max = Duration::from_secs(3600);
        assert_eq!(next_backoff(1, base, max), Duration::from_secs(300));
        assert_eq!(next_backoff(2, base, max), Duration::from_secs(600));
        assert_eq!(next_backoff(3, base, max), Duration::from_secs(1200));
        assert_eq!(next_backoff(5, base, max), max);
        assert_eq!(next_backoff(40, base, max), max);
        assert_eq!(next_backoff(0, base, max), base);
    }
}
