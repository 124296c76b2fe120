//! Resumable swap-trace persistence.
//!
//! The store keeps one append-only CSV per pool and brings it up to the
//! chain head in bounded windows. Every batch is flushed through to disk
//! before the window advances, so a crash or ^C costs at most the
//! in-flight batch, and the resume watermark starts one block past the
//! newest persisted row rather than refetching it.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Duration;

use primitive_types::U256;
use thiserror::Error;
use tracing::{info, warn};

use rangesim_domain::{PoolConfig, SwapObservation};

use crate::events::{PoolEvent, SWAP_TOPIC, decode_event};
use crate::provider::{LogProvider, LogQuery, ProviderError};

/// Initial width of a fetch window, in blocks.
pub const DEFAULT_LOG_BATCH: u64 = 20_000;

/// Pause before retrying a transient provider failure.
const RETRY_DELAY: Duration = Duration::from_secs(60);

const HEADER: [&str; 5] = ["block", "sqrtPriceX96", "liquidity", "amount0", "amount1"];

/// Failures while reading or extending the persisted trace.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("trace I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("trace write failure: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Decode(#[from] crate::events::DecodeError),
    #[error("malformed trace row: {0}")]
    Malformed(String),
}

/// Persisted trace plus the block the next fetch should start from.
#[derive(Debug)]
pub struct TraceLoad {
    /// Observations sorted by composite block key.
    pub observations: Vec<SwapObservation>,
    pub resume_block: u64,
}

/// Append-only store for one pool's swap trace.
#[derive(Debug)]
pub struct TraceStore {
    path: PathBuf,
    pool: PoolConfig,
    log_batch: u64,
}

impl TraceStore {
    /// Creates a store backed by the given CSV path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, pool: PoolConfig) -> Self {
        Self {
            path: path.into(),
            pool,
            log_batch: DEFAULT_LOG_BATCH,
        }
    }

    /// Overrides the initial fetch window width.
    #[must_use]
    pub fn with_log_batch(mut self, log_batch: u64) -> Self {
        self.log_batch = log_batch.max(1);
        self
    }

    /// Current fetch window width in blocks.
    #[must_use]
    pub fn log_batch(&self) -> u64 {
        self.log_batch
    }

    /// Loads the persisted trace, sorted by block key.
    ///
    /// A missing, empty, or unreadable file falls back to an empty trace
    /// starting at the pool's configured start block; corruption costs a
    /// refetch, not the run.
    pub fn load(&self) -> TraceLoad {
        match self.read_rows() {
            Ok(mut observations) if !observations.is_empty() => {
                observations.sort_by_key(|o| o.block);
                let resume_block = observations
                    .last()
                    .map_or(self.pool.start_block, |o| o.block / 1000 + 1);
                TraceLoad {
                    observations,
                    resume_block,
                }
            }
            Ok(_) => TraceLoad {
                observations: Vec::new(),
                resume_block: self.pool.start_block,
            },
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    %error,
                    "Persisted trace unreadable, starting from scratch"
                );
                TraceLoad {
                    observations: Vec::new(),
                    resume_block: self.pool.start_block,
                }
            }
        }
    }

    /// Appends observations and flushes them all the way to disk.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if the file cannot be written or synced.
    pub fn append(&self, observations: &[SwapObservation]) -> Result<(), StoreError> {
        if observations.is_empty() {
            return Ok(());
        }
        // An interrupted run can leave the file created but empty; it still
        // needs the header, or the first row gets read back as one.
        let fresh = self.path.metadata().map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let handle = file.try_clone()?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(handle);
        if fresh {
            writer.write_record(HEADER)?;
        }
        for observation in observations {
            writer.write_record(&[
                observation.block.to_string(),
                observation.sqrt_price_x96.to_string(),
                observation.liquidity.to_string(),
                observation.amount0.to_string(),
                observation.amount1.to_string(),
            ])?;
        }
        writer.flush()?;
        file.sync_data()?;
        Ok(())
    }

    /// Brings the trace up to the chain head and returns it in full,
    /// sorted by block key.
    ///
    /// Provider failures never abort a sync: an oversized-window rejection
    /// shrinks the fetch window to nine tenths and retries the same start
    /// block, anything else sleeps and retries the same window until the
    /// provider recovers.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if a fetched log cannot be decoded or a
    /// batch cannot be persisted.
    pub async fn sync<P: LogProvider>(
        &mut self,
        provider: &P,
    ) -> Result<Vec<SwapObservation>, StoreError> {
        let TraceLoad {
            mut observations,
            resume_block,
        } = self.load();

        let head = loop {
            match provider.latest_block().await {
                Ok(head) => break head,
                Err(error) => {
                    warn!(%error, "Chain head query failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        };

        let mut from = resume_block;
        if from > head {
            info!(resume = from, head, "Trace already covers the chain head");
            return Ok(observations);
        }

        while from <= head {
            let to = head.min(from + self.log_batch - 1);
            let query = LogQuery {
                from_block: from,
                to_block: to,
                address: self.pool.address.clone(),
                topics: vec![SWAP_TOPIC],
            };
            let logs = match provider.get_logs(&query).await {
                Ok(logs) => logs,
                Err(ProviderError::RangeTooLarge) if self.log_batch > 1 => {
                    let shrunk = (self.log_batch * 9 / 10).max(1);
                    warn!(
                        batch = self.log_batch,
                        shrunk, "Provider rejected window, shrinking batch"
                    );
                    self.log_batch = shrunk;
                    continue;
                }
                Err(error) => {
                    warn!(%error, from, to, "Log query failed, sleeping before retry");
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            let mut batch = Vec::new();
            for log in &logs {
                if let PoolEvent::Swap(observation) = decode_event(log)? {
                    batch.push(observation);
                }
            }
            info!(from, to, swaps = batch.len(), "Fetched batch");
            self.append(&batch)?;
            observations.extend(batch);
            from = to + 1;
        }

        observations.sort_by_key(|o| o.block);
        Ok(observations)
    }

    fn read_rows(&self) -> Result<Vec<SwapObservation>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(parse_row(&record?)?);
        }
        Ok(rows)
    }
}

fn parse_row(record: &csv::StringRecord) -> Result<SwapObservation, StoreError> {
    if record.len() != HEADER.len() {
        return Err(StoreError::Malformed(format!(
            "expected {} columns, got {}",
            HEADER.len(),
            record.len()
        )));
    }
    Ok(SwapObservation {
        block: parse_column(record, 0, "block")?,
        sqrt_price_x96: U256::from_dec_str(column(record, 1)?)
            .map_err(|e| StoreError::Malformed(format!("bad sqrtPriceX96: {e}")))?,
        liquidity: parse_column(record, 2, "liquidity")?,
        amount0: parse_column(record, 3, "amount0")?,
        amount1: parse_column(record, 4, "amount1")?,
    })
}

fn column<'a>(record: &'a csv::StringRecord, index: usize) -> Result<&'a str, StoreError> {
    record
        .get(index)
        .ok_or_else(|| StoreError::Malformed(format!("missing column {index}")))
}

fn parse_column<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    column(record, index)?
        .parse()
        .map_err(|e| StoreError::Malformed(format!("bad {name}: {e}")))
}
