//! Sequential analytical walkthrough over month-sharded transaction data.
//!
//! Architecture role:
//! - wires configuration, storage, and operators into four stages
//! - stage 1: grouped top-N aggregation
//! - stage 2: cross-channel full outer comparison
//! - stage 3: materialized monthly aggregate (atomic replace)
//! - stage 4: ordered-window growth analysis over the artifact

pub mod stages;

pub use stages::{build_monthly_artifact, compare_channels, monthly_growth, top_groups};
