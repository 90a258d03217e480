use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::ingest::runner::{IngestOutcome, Ingestor, FETCH_INTERVAL_HOURS};

pub const SCHEDULE_PERIOD: Duration = Duration::from_secs(FETCH_INTERVAL_HOURS as u64 * 60 * 60);

/// Runs ingestion every `period` as the system actor. The first tick fires
/// immediately; the scheduler log gate turns it into a no-op after a
/// recent run.
pub fn spawn_ingest_scheduler(ingestor: Arc<Ingestor>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Ingestion scheduler started; running every {}s", period.as_secs());
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match ingestor.run(None).await {
                IngestOutcome::Ok {
                    inserted_count,
                    warnings,
                } => info!(
                    "Scheduled ingestion inserted {} jobs ({} warnings)",
                    inserted_count,
                    warnings.len()
                ),
                IngestOutcome::Skipped { reason } => {
                    info!("Scheduled ingestion skipped: {reason}")
                }
            }
        }
    })
}
