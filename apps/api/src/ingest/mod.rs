//! Job ingestion: polls the external listing providers on a timer or on
//! demand, normalizes and dedups their postings, and logs each run.

pub mod client;
pub mod handlers;
pub mod normalize;
pub mod providers;
pub mod runner;
pub mod scheduler;
#[cfg(test)]
pub mod testing;

pub use runner::{IngestOutcome, Ingestor};
