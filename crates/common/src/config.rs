use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TxcError};

/// A calendar month, the partition key of the raw source.
///
/// Orders chronologically via the derived `(year, month)` ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(TxcError::InvalidConfig(format!(
                "month out of range: {year}-{month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Shard filename suffix, e.g. `202301` for January 2023.
    pub fn suffix(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// Parses a six-digit `YYYYMM` suffix. Returns `None` for anything that
    /// is not six ASCII digits or encodes an impossible month.
    pub fn parse_suffix(s: &str) -> Option<Self> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = s[..4].parse::<i32>().ok()?;
        let month = s[4..].parse::<u32>().ok()?;
        Self::new(year, month).ok()
    }
}

/// Inclusive month range used to prune raw shards before any file is opened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: MonthKey,
    pub end: MonthKey,
}

impl MonthRange {
    pub fn contains(&self, month: MonthKey) -> bool {
        self.start <= month && month <= self.end
    }
}

/// Raw source location: a directory of month-sharded parquet files named
/// `{shard_prefix}_{YYYYMM}.parquet`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub dir: String,
    pub shard_prefix: String,
}

/// Two independently filtered sides of the cross-source comparison, selected
/// by equality on `column`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    pub column: String,
    pub left_value: String,
    pub right_value: String,
    /// Output column names for each side's summed measure.
    pub left_label: String,
    pub right_label: String,
}

/// Where the materialized monthly aggregate lives and what it is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub dir: String,
    pub name: String,
}

/// Full configuration surface of the walkthrough. Nothing here is hard-coded
/// in the operator layer; stages read all knobs from this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub source: SourceConfig,
    pub range: MonthRange,
    /// Equality filter applied before the monthly rollup.
    pub user: i64,
    /// Grouping key for the top-N and comparison stages.
    pub group_column: String,
    pub compare: CompareConfig,
    /// Post-aggregation filter: keep groups whose summed amount reaches this.
    pub min_group_total: f64,
    pub top_n: usize,
    pub artifact: ArtifactConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                dir: "data/shards".to_string(),
                shard_prefix: "txn".to_string(),
            },
            range: MonthRange {
                start: MonthKey { year: 2023, month: 1 },
                end: MonthKey { year: 2023, month: 12 },
            },
            user: 0,
            group_column: "merchant_state".to_string(),
            compare: CompareConfig {
                column: "use_chip".to_string(),
                left_value: "Chip Transaction".to_string(),
                right_value: "Swipe Transaction".to_string(),
                left_label: "chip_total".to_string(),
                right_label: "swipe_total".to_string(),
            },
            min_group_total: 10_000.0,
            top_n: 10,
            artifact: ArtifactConfig {
                dir: "data/artifacts".to_string(),
                name: "monthly_spend".to_string(),
            },
        }
    }
}

impl ReportConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: Self =
            serde_json::from_str(&s).map_err(|e| TxcError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        MonthKey::new(self.range.start.year, self.range.start.month)?;
        MonthKey::new(self.range.end.year, self.range.end.month)?;
        if self.range.start > self.range.end {
            return Err(TxcError::InvalidConfig(format!(
                "month range start {} is after end {}",
                self.range.start.suffix(),
                self.range.end.suffix()
            )));
        }
        if self.source.shard_prefix.is_empty() {
            return Err(TxcError::InvalidConfig("empty shard prefix".to_string()));
        }
        if self.artifact.name.is_empty() {
            return Err(TxcError::InvalidConfig("empty artifact name".to_string()));
        }
        Ok(())
    }
}
