//! Producer/consumer pipeline that measures residence-amenity pairs against a
//! routing matrix API and writes the results to a sink.
//!
//! A [`reader::ReaderBatch`] spawns one producer per batch of work, each
//! pushing onto a bounded [`queue::WorkQueue`]. A pool of consumers drains the
//! queue into a [`writer::WriterBatch`]. [`manager::BatchManager`] links the two
//! and [`pages::run_pages`] repeats that for every page of a large result set.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use model::Costing;

pub mod client;
pub mod database;
pub mod grouping;
pub mod item;
pub mod manager;
pub mod pages;
pub mod queue;
pub mod reader;
pub mod writer;
pub mod writers;

pub use client::{MatrixClient, MatrixError};
pub use item::MatrixItem;
pub use manager::{BatchManager, BatchReport};
pub use queue::WorkQueue;
pub use reader::{MatrixReaderBatch, ReaderBatch, ReaderBatchError};
pub use writer::{WriteOutcome, WriterBatch, WriterBatchError};

/// Where measured distances end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Db,
    Csv,
    Stdout,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Db => f.write_str("db"),
            Self::Csv => f.write_str("csv"),
            Self::Stdout => f.write_str("stdout"),
        }
    }
}

impl FromStr for Output {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "db" => Ok(Self::Db),
            "csv" => Ok(Self::Csv),
            "stdout" => Ok(Self::Stdout),
            other => Err(format!(
                "\"{other}\" is not a valid output. Choices are db, csv, stdout"
            )),
        }
    }
}

/// Immutable per-run configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub costing: Costing,
    pub output: Output,
    pub file_name: Option<PathBuf>,
}

/// Named concurrency presets for the `--parallel` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallel {
    Low,
    High,
}

/// Concurrency and backpressure knobs of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Number of consumer tasks draining the queue.
    pub consumers: usize,
    /// Items the queue holds before producers suspend.
    pub queue_capacity: usize,
    /// Matrix requests allowed in flight at once.
    pub http_concurrency: usize,
    /// Targets per matrix request.
    pub batch_size: usize,
    /// Retries for transient transport errors, per batch.
    pub max_retries: u32,
    /// First retry delay; every further retry waits this much longer.
    pub retry_backoff: Duration,
}

impl PipelineSettings {
    pub fn for_parallel(parallel: Parallel) -> Self {
        let (http_concurrency, consumers) = match parallel {
            Parallel::High => (40, 20),
            Parallel::Low => (5, 5),
        };
        Self {
            consumers,
            http_concurrency,
            ..Self::default()
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            consumers: 10,
            queue_capacity: 1_000,
            http_concurrency: 40,
            batch_size: grouping::VALHALLA_BATCH_LIMIT,
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_profiles() {
        let high = PipelineSettings::for_parallel(Parallel::High);
        assert_eq!((high.http_concurrency, high.consumers), (40, 20));
        let low = PipelineSettings::for_parallel(Parallel::Low);
        assert_eq!((low.http_concurrency, low.consumers), (5, 5));
        assert_eq!(low.batch_size, 50);
    }

    #[test]
    fn output_from_str() {
        assert_eq!("csv".parse::<Output>(), Ok(Output::Csv));
        assert!("parquet".parse::<Output>().is_err());
    }
}
