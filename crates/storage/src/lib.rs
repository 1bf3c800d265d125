//! Storage layer: month-sharded raw sources and materialized artifacts.
//!
//! Architecture role:
//! - shard discovery and month-range pruning
//! - parquet reading for shards and artifacts
//! - the artifact catalog with atomic replace semantics
//!
//! Key modules:
//! - [`shards`]
//! - [`parquet`]
//! - [`catalog`]

pub mod catalog;
pub mod parquet;
pub mod shards;

pub use catalog::ArtifactCatalog;
pub use parquet::{read_file, scan_shards};
pub use shards::{Shard, ShardSet};
