//! # Errors
//!
//! $$
//! \text{input} \mapsto \text{Ok}(\cdot) \;|\; \text{Err}(\text{QuantError})
//! $$
//!
//! Error type shared by the frontier and screener pipelines.

use thiserror::Error;

/// Error type for frontier simulation and screening.
#[derive(Debug, Error)]
pub enum QuantError {
  /// Not enough aligned observations to estimate returns or fit levels.
  #[error("insufficient data for `{instrument}`: {observations} observations, need at least {required}")]
  InsufficientData {
    /// Instrument (or series) that is too short.
    instrument: String,
    /// Number of usable observations found.
    observations: usize,
    /// Minimum number of observations required.
    required: usize,
  },

  /// A sampled portfolio has zero volatility, so its Sharpe ratio is undefined.
  #[error("degenerate sample at trial {trial}: portfolio volatility is zero")]
  DegenerateSample {
    /// Zero-based trial index.
    trial: usize,
  },

  /// Every sampled portfolio has the same volatility.
  #[error("degenerate volatility range: every sample has volatility {volatility}")]
  DegenerateRange {
    /// The shared volatility.
    volatility: f64,
  },

  /// The portfolio table has no rows.
  #[error("portfolio table is empty")]
  EmptyTable,

  /// Vector or matrix dimensions disagree.
  #[error("dimension mismatch: expected {expected}, got {actual}")]
  DimensionMismatch {
    /// Expected dimension.
    expected: usize,
    /// Dimension actually supplied.
    actual: usize,
  },

  /// The same instrument was supplied twice.
  #[error("duplicate instrument `{0}`")]
  DuplicateInstrument(String),

  /// A requested instrument is not present.
  #[error("unknown instrument `{0}`")]
  UnknownInstrument(String),

  /// Configuration value out of range.
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  /// Malformed price file.
  #[error("failed to parse price data at line {line}: {message}")]
  Parse {
    /// One-based line number.
    line: usize,
    /// What went wrong.
    message: String,
  },

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, QuantError>;
