//! Errors that stop a backtest run.

use thiserror::Error;

use rangesim_domain::MathError;

/// Reasons a run cannot start or continue. All of them abort the replay;
/// snapshots already flushed by the sink stay written.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("trace is empty, nothing to seed a position from")]
    EmptyTrace,

    #[error("trace is not block-ordered: key {next} follows {prev}")]
    NonMonotonicTrace { prev: u64, next: u64 },

    #[error("range width {width} must be a positive multiple of the tick spacing {spacing}")]
    InvalidPolicyWidth { width: i32, spacing: i32 },

    #[error(transparent)]
    Math(#[from] MathError),

    #[error("snapshot output failure: {0}")]
    Snapshot(#[from] std::io::Error),
}
