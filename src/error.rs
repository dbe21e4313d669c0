//! Error taxonomy for instance construction and search runs.
//!
//! Every failure is fatal to the run that produced it. The caller decides
//! whether to restart with a fresh seed.

use thiserror::Error;

/// Result type alias for fallible crate operations.
pub type Result<T> = std::result::Result<T, QapError>;

/// Errors raised by the QAP core.
#[derive(Error, Debug)]
pub enum QapError {
    /// Malformed problem instance or invalid run parameters.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A solution is not a permutation of `0..n`.
    ///
    /// Raised by fitness evaluation. During a search this means a
    /// neighborhood transform emitted a corrupt candidate.
    #[error("invalid permutation: {reason}")]
    InvalidPermutation {
        /// What is wrong with the assignment.
        reason: String,
    },

    /// The cost of an assignment does not fit in `u64`.
    #[error("fitness overflows u64")]
    Overflow,

    /// Instance text could not be parsed.
    #[error("parse error at token {token}: {message}")]
    Parse {
        /// Zero-based index of the offending whitespace-separated token.
        token: usize,
        /// Description of the problem.
        message: String,
    },

    /// Instance file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A step was requested from an engine that already terminated.
    #[error("search engine already terminated")]
    Terminated,
}

/// Invalid instance shape or run parameter, detected before any iteration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("instance size must be positive")]
    EmptyInstance,

    #[error("{matrix} matrix has {rows} rows, expected {expected}")]
    RowCount {
        matrix: &'static str,
        rows: usize,
        expected: usize,
    },

    #[error("{matrix} matrix row {row} has {len} columns, expected {expected}")]
    NotSquare {
        matrix: &'static str,
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("instance of size {0} has no pair of distinct positions to move")]
    TooSmall(usize),

    #[error("tenure must be at least 1")]
    ZeroTenure,

    #[error("max_iterations must be at least 1")]
    ZeroIterations,

    #[error("batch_size must be at least 1")]
    ZeroBatchSize,

    #[error("batch_size {batch_size} exceeds the {pairs} distinct pairs of a size-{n} instance")]
    BatchTooLarge {
        batch_size: usize,
        pairs: usize,
        n: usize,
    },

    #[error("swap_probability must be in [0, 1], got {0}")]
    SwapProbability(f64),

    #[error("time_limit_ms must be positive or None")]
    ZeroTimeLimit,

    #[error("max_redraws must be positive or None")]
    ZeroRedraws,
}
