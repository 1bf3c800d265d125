use thiserror::Error;

/// Canonical txcube error taxonomy used across crates.
///
/// Classification guidance:
/// - [`TxcError::InvalidConfig`]: config/shard-layout/artifact-path contract violations
/// - [`TxcError::Analysis`]: column/name/shape issues discovered before execution
/// - [`TxcError::Execution`]: runtime operator evaluation, parse, or decode failures
/// - [`TxcError::Io`]: raw filesystem IO failures from std APIs
/// - [`TxcError::Unsupported`]: well-formed input outside the supported shape
#[derive(Debug, Error)]
pub enum TxcError {
    /// Invalid or inconsistent configuration or on-disk layout.
    ///
    /// Examples:
    /// - month range with start after end
    /// - shard file whose date suffix is not a calendar month
    /// - artifact read before any build
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Name/shape resolution failures before any rows are touched.
    ///
    /// Examples:
    /// - unknown column name
    /// - wrong column type for an ordered-window key
    #[error("analysis error: {0}")]
    Analysis(String),

    /// Runtime failures after analysis succeeded.
    ///
    /// Examples:
    /// - unparseable amount string or impossible calendar date in a raw record
    /// - parquet decode failures
    /// - duplicate month in the materialized aggregate
    #[error("execution error: {0}")]
    Execution(String),

    /// Transparent std IO failures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Valid request for a data shape not handled by this pipeline.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Standard txcube result alias.
pub type Result<T> = std::result::Result<T, TxcError>;
