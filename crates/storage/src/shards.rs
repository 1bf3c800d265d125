//! Discovery and range pruning of month-sharded raw sources.
//!
//! A raw source is a directory of parquet files named
//! `{prefix}_{YYYYMM}.parquet`. The month suffix is the partition key: range
//! selection decides which files are opened without touching their contents.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use txc_common::{MonthKey, MonthRange, Result, TxcError};

/// One physical partition of the raw source.
#[derive(Debug, Clone)]
pub struct Shard {
    pub month: MonthKey,
    pub path: PathBuf,
}

/// All shards of one source directory, sorted by month.
#[derive(Debug, Clone, Default)]
pub struct ShardSet {
    shards: Vec<Shard>,
}

impl ShardSet {
    /// Scans `dir` for files named `{prefix}_{YYYYMM}.parquet`.
    ///
    /// Files that do not carry the prefix are ignored; a prefix-matching file
    /// whose suffix is not a valid calendar month is a configuration error
    /// rather than a silently skipped shard.
    pub fn discover(dir: &Path, prefix: &str) -> Result<Self> {
        let mut shards = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(rest) = name
                .strip_prefix(prefix)
                .and_then(|s| s.strip_prefix('_'))
                .and_then(|s| s.strip_suffix(".parquet"))
            else {
                continue;
            };
            let month = MonthKey::parse_suffix(rest).ok_or_else(|| {
                TxcError::InvalidConfig(format!(
                    "shard '{name}' does not encode a calendar month"
                ))
            })?;
            shards.push(Shard {
                month,
                path: entry.path(),
            });
        }
        shards.sort_by_key(|s| s.month);
        info!(dir = %dir.display(), prefix, shards = shards.len(), "discovered raw shards");
        Ok(Self { shards })
    }

    /// Shards whose month falls inside the inclusive range.
    pub fn select(&self, range: &MonthRange) -> Vec<&Shard> {
        let selected: Vec<&Shard> = self
            .shards
            .iter()
            .filter(|s| range.contains(s.month))
            .collect();
        info!(
            start = %range.start.suffix(),
            end = %range.end.suffix(),
            selected = selected.len(),
            total = self.shards.len(),
            "pruned shards by month range"
        );
        selected
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}
