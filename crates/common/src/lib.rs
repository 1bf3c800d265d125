//! Shared configuration and error types for txcube crates.
//!
//! Architecture role:
//! - defines the pipeline configuration surface passed across layers
//! - provides common [`TxcError`] / [`Result`] contracts
//!
//! Key modules:
//! - [`config`]
//! - [`error`]

pub mod config;
pub mod error;

pub use config::{
    ArtifactConfig, CompareConfig, MonthKey, MonthRange, ReportConfig, SourceConfig,
};
pub use error::{Result, TxcError};
