//! Core domain model for the range backtesting simulator: fixed-point
//! tick/price conversions, concentrated-range accounting, and the value
//! objects shared by trace ingestion and replay.

pub mod error;
pub mod math;
pub mod metrics;
pub mod observation;
pub mod pool;
pub mod position;
pub mod snapshot;
pub mod value_objects;

// Re-export for easier access
pub use error::MathError;
pub use observation::SwapObservation;
pub use pool::PoolConfig;
pub use position::RangePosition;
pub use snapshot::{MemorySink, PositionSnapshot, SnapshotSink};
pub use value_objects::sqrt_price::SqrtPrice;
pub use value_objects::tick_range::TickRange;
