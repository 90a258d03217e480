//! The ingestion batch: gate on the scheduler log, poll each provider,
//! dedup and insert in bounded batches, then record a run log.
//!
//! Nothing escapes `Ingestor::run`. Every failure below the run is turned
//! into a warning string and the run carries on.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ingest::client::ListingClient;
use crate::ingest::normalize::NormalizedJob;
use crate::ingest::providers::{fetch_provider, Provider, ProviderEndpoints};
use crate::store::{InsertOutcome, JobBoardStore};

/// Synthetic `SourceFetchLog` row that gates whole runs.
pub const SCHEDULER_SOURCE: &str = "scheduler";
/// Recorded as `insertingUserId` when no authenticated subject is given.
pub const SYSTEM_ACTOR: &str = "system";
pub const MAX_JOBS_PER_SOURCE: usize = 50;
pub const INSERT_BATCH_SIZE: usize = 5;
pub const FETCH_INTERVAL_HOURS: i64 = 6;

pub fn min_fetch_interval() -> Duration {
    Duration::hours(FETCH_INTERVAL_HOURS)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestOutcome {
    #[serde(rename_all = "camelCase")]
    Ok {
        inserted_count: usize,
        warnings: Vec<String>,
    },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Inserted,
    SkippedDuplicate,
    Failed(String),
}

pub struct Ingestor {
    store: Arc<dyn JobBoardStore>,
    client: Arc<dyn ListingClient>,
    endpoints: ProviderEndpoints,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn JobBoardStore>,
        client: Arc<dyn ListingClient>,
        endpoints: ProviderEndpoints,
    ) -> Self {
        Self {
            store,
            client,
            endpoints,
        }
    }

    pub async fn run(&self, actor: Option<String>) -> IngestOutcome {
        self.run_at(actor, Utc::now()).await
    }

    pub async fn run_at(&self, actor: Option<String>, now: DateTime<Utc>) -> IngestOutcome {
        if self.fetched_recently(SCHEDULER_SOURCE, now).await {
            info!("Skipping ingestion: last run was under {FETCH_INTERVAL_HOURS}h ago");
            return IngestOutcome::Skipped {
                reason: "recent run".to_string(),
            };
        }

        let mut warnings = Vec::new();

        // Optimistic claim, not a lock. Two runs that both read a stale row
        // both proceed; the per-record dedup keeps that harmless.
        if let Err(e) = self.store.upsert_source_log(SCHEDULER_SOURCE, now, 0).await {
            warn!("Failed to record run claim: {e}");
            warnings.push(format!("{SCHEDULER_SOURCE}: failed to record run claim: {e}"));
        }

        let actor = actor.unwrap_or_else(|| SYSTEM_ACTOR.to_string());
        info!("Starting job ingestion as '{actor}'");

        let mut inserted_count = 0;
        for provider in Provider::ALL {
            inserted_count += self
                .ingest_provider(provider, &actor, now, &mut warnings)
                .await;
        }

        if let Err(e) = self
            .store
            .insert_run_log(inserted_count as i32, &warnings, now)
            .await
        {
            warn!("Failed to write fetch run log: {e}");
        }

        info!(
            "Job ingestion finished. Inserted: {}, Warnings: {}",
            inserted_count,
            warnings.len()
        );

        IngestOutcome::Ok {
            inserted_count,
            warnings,
        }
    }

    /// Unreadable logs count as "never fetched".
    async fn fetched_recently(&self, source: &str, now: DateTime<Utc>) -> bool {
        match self.store.get_source_log(source).await {
            Ok(Some(log)) => now - log.last_fetched_at < min_fetch_interval(),
            Ok(None) => false,
            Err(e) => {
                warn!("Could not read fetch log for '{source}': {e}");
                false
            }
        }
    }

    async fn ingest_provider(
        &self,
        provider: Provider,
        actor: &str,
        now: DateTime<Utc>,
        warnings: &mut Vec<String>,
    ) -> usize {
        let source = provider.source_name();
        if self.fetched_recently(source, now).await {
            debug!("Skipping {source}: fetched within the last {FETCH_INTERVAL_HOURS}h");
            return 0;
        }

        let fetched = match fetch_provider(
            provider,
            self.client.as_ref(),
            self.store.as_ref(),
            &self.endpoints,
        )
        .await
        {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Fetching {source} failed: {e}");
                warnings.push(format!("{source}: {e}"));
                return 0;
            }
        };
        warnings.extend(fetched.warnings);

        let seen = fetched.records.len();
        let records: Vec<NormalizedJob> = fetched
            .records
            .into_iter()
            .take(MAX_JOBS_PER_SOURCE)
            .collect();

        let mut inserted = 0;
        let mut duplicates = 0;
        for batch in records.chunks(INSERT_BATCH_SIZE) {
            let outcomes = join_all(batch.iter().map(|job| self.ingest_record(job, actor, now))).await;
            for (job, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    RecordOutcome::Inserted => inserted += 1,
                    RecordOutcome::SkippedDuplicate => duplicates += 1,
                    RecordOutcome::Failed(e) => {
                        warn!("Insert failed for '{}' from {source}: {e}", job.title);
                        warnings.push(format!("{source}: failed to insert \"{}\": {e}", job.title));
                    }
                }
            }
        }

        if let Err(e) = self.store.upsert_source_log(source, now, seen as i32).await {
            warn!("Failed to update fetch log for {source}: {e}");
            warnings.push(format!("{source}: failed to update fetch log: {e}"));
        }

        info!(
            "{source}: seen {}, processed {}, inserted {}, duplicates {}",
            seen,
            records.len(),
            inserted,
            duplicates
        );
        inserted
    }

    /// Exact `(title, company, location)` dedup, then insert.
    pub async fn ingest_record(
        &self,
        job: &NormalizedJob,
        actor: &str,
        now: DateTime<Utc>,
    ) -> RecordOutcome {
        match self
            .store
            .find_job_by_key(&job.title, &job.company, &job.location)
            .await
        {
            Ok(Some(_)) => return RecordOutcome::SkippedDuplicate,
            Ok(None) => {}
            Err(e) => return RecordOutcome::Failed(e.to_string()),
        }

        match self
            .store
            .insert_job(job.clone().into_new_posting(actor), now)
            .await
        {
            Ok(InsertOutcome::Inserted(_)) => RecordOutcome::Inserted,
            Ok(InsertOutcome::Duplicate) => RecordOutcome::SkippedDuplicate,
            Err(e) => RecordOutcome::Failed(e.to_string()),
        }
    }
}
