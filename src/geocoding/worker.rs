use std::sync::Arc;
use std::time::Duration;

use sea_orm::{DatabaseConnection, DbErr};
use serde::Serialize;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::{EnrichOutcome, Enricher};
use crate::config::EnrichmentConfig;
use crate::db;

/// Counts from one pass over the due listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub scanned: usize,
    pub geocoded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: EnrichOutcome) {
        match outcome {
            EnrichOutcome::AlreadyGeocoded => self.skipped += 1,
            EnrichOutcome::Geocoded(_) => self.geocoded += 1,
            EnrichOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Cloneable handle shared with the HTTP layer: wake the worker after a new
/// listing, or run a batch on demand from the admin endpoint.
#[derive(Clone)]
pub struct EnrichmentHandle {
    enricher: Arc<Enricher>,
    config: EnrichmentConfig,
    wake: Arc<Notify>,
    batch_lock: Arc<Mutex<()>>,
}

impl EnrichmentHandle {
    pub fn new(enricher: Enricher, config: EnrichmentConfig) -> Self {
        Self {
            enricher: Arc::new(enricher),
            config,
            wake: Arc::new(Notify::new()),
            batch_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn wake(&self) {
        self.wake.notify_one();
    }

    /// Process up to `batch_size` due listings. Batches never overlap, so a
    /// manual run waits for the worker's current pass to finish.
    pub async fn run_batch(&self, db: &DatabaseConnection) -> Result<BatchReport, DbErr> {
        let _guard = self.batch_lock.lock().await;

        let due = db::ads::find_due_for_enrichment(
            db,
            chrono::Utc::now(),
            self.config.max_attempts,
            self.config.batch_size,
        )
        .await?;

        let mut report = BatchReport {
            scanned: due.len(),
            ..Default::default()
        };

        for ad in &due {
            match self.enricher.enrich_listing(db, ad).await {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    error!(ad_id = ad.id, "failed to save enrichment result: {e}");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Background task that backfills coordinates on a fixed interval, or sooner
/// when woken.
pub struct EnrichmentWorker {
    db: DatabaseConnection,
    handle: EnrichmentHandle,
}

impl EnrichmentWorker {
    pub fn new(db: DatabaseConnection, handle: EnrichmentHandle) -> Self {
        Self { db, handle }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let period = self.handle.config.interval.max(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(?period, "enrichment worker started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.handle.wake.notified() => {}
            }

            match self.handle.run_batch(&self.db).await {
                Ok(report) if report.scanned > 0 => info!(
                    scanned = report.scanned,
                    geocoded = report.geocoded,
                    failed = report.failed,
                    skipped = report.skipped,
                    "enrichment batch finished"
                ),
                Ok(_) => {}
                Err(e) => error!("enrichment batch failed: {e}"),
            }
        }
    }
}
