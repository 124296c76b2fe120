//! Trace ingestion and persistence: raw event decoding, the JSON-RPC log
//! provider, the resumable swap-trace store, and CSV snapshot output.

pub mod events;
pub mod provider;
pub mod rpc;
pub mod snapshots;
pub mod store;

// Re-export for easier access
pub use events::{DecodeError, LiquidityChange, PoolEvent, RawLog, decode_event};
pub use provider::{LogProvider, LogQuery, ProviderError};
pub use rpc::RpcLogProvider;
pub use snapshots::CsvSnapshotWriter;
pub use store::{DEFAULT_LOG_BATCH, StoreError, TraceLoad, TraceStore};
