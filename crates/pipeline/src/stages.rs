//! The walkthrough stages: top-N aggregation, cross-channel comparison,
//! monthly materialization, and the ordered growth analysis.
//!
//! Each stage is a pure function of the [`ReportConfig`]; re-running a stage
//! with identical inputs produces identical output (the materialize stage by
//! atomic replace, the rest by construction).

use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use tracing::info;
use txc_common::{ReportConfig, Result};
use txc_ops::aggregate::{filter_min_total, hash_group_sum, top_n_by, AggExpr};
use txc_ops::join::full_outer_join;
use txc_ops::normalize::{normalize, raw_schema};
use txc_ops::rollup::monthly_rollup;
use txc_ops::window::monthly_sequence;
use txc_ops::{RowSet, ScalarValue};
use txc_storage::{scan_shards, ArtifactCatalog, ShardSet};

/// Scans the configured month range and normalizes the raw records.
fn scan_normalized(cfg: &ReportConfig) -> Result<RowSet> {
    let shards = ShardSet::discover(Path::new(&cfg.source.dir), &cfg.source.shard_prefix)?;
    let selected = shards.select(&cfg.range);
    let stream = scan_shards(&selected, raw_schema());
    let batches: Vec<RecordBatch> = futures::executor::block_on(stream.try_collect())?;
    let raw = RowSet::from_batches(raw_schema(), &batches)?;
    normalize(&raw)
}

/// Stage 1: per-key transaction counts and amount totals, having-filtered and
/// ranked descending by total (ties break by ascending key).
pub fn top_groups(cfg: &ReportConfig) -> Result<RowSet> {
    cfg.validate()?;
    let data = scan_normalized(cfg)?;
    let group = data.column_index(&cfg.group_column)?;
    let amount = data.column_index("amount")?;
    let grouped = hash_group_sum(
        &data,
        &[group],
        &[
            (AggExpr::Count, "txn_count"),
            (AggExpr::SumFloat(amount), "total_amount"),
        ],
    )?;
    let filtered = filter_min_total(grouped, 2, cfg.min_group_total);
    let ranked = top_n_by(filtered, 2, 0, cfg.top_n);
    info!(groups = ranked.num_rows(), "top groups ready");
    Ok(ranked)
}

/// Stage 2: two independently filtered per-key aggregates, full-outer-joined
/// on the group key. Keys present on only one side keep nulls for the other.
pub fn compare_channels(cfg: &ReportConfig) -> Result<RowSet> {
    cfg.validate()?;
    let data = scan_normalized(cfg)?;
    let left = channel_aggregate(&data, cfg, &cfg.compare.left_value, &cfg.compare.left_label)?;
    let right = channel_aggregate(&data, cfg, &cfg.compare.right_value, &cfg.compare.right_label)?;
    let joined = full_outer_join(&left, &right, 0, 0)?;
    info!(keys = joined.num_rows(), "channel comparison ready");
    Ok(joined)
}

fn channel_aggregate(
    data: &RowSet,
    cfg: &ReportConfig,
    value: &str,
    label: &str,
) -> Result<RowSet> {
    let channel = data.column_index(&cfg.compare.column)?;
    let group = data.column_index(&cfg.group_column)?;
    let amount = data.column_index("amount")?;
    let filtered = data
        .clone()
        .filter_eq(channel, &ScalarValue::Utf8(value.to_string()));
    let grouped = hash_group_sum(&filtered, &[group], &[(AggExpr::SumFloat(amount), label)])?;
    Ok(filter_min_total(grouped, 1, cfg.min_group_total))
}

/// Stage 3: materializes the monthly aggregate for the configured user,
/// atomically replacing any prior artifact of the same name. A user with no
/// matching records materializes a valid zero-row artifact.
pub fn build_monthly_artifact(cfg: &ReportConfig) -> Result<PathBuf> {
    cfg.validate()?;
    let data = scan_normalized(cfg)?;
    let user = data.column_index("user")?;
    let date = data.column_index("date")?;
    let amount = data.column_index("amount")?;
    let mine = data.filter_eq(user, &ScalarValue::Int64(cfg.user));
    let monthly = monthly_rollup(&mine, date, amount)?;
    let batch = monthly.to_batch()?;
    let catalog = ArtifactCatalog::new(cfg.artifact.dir.clone());
    catalog.write_replace(&cfg.artifact.name, monthly.schema.clone(), &[batch])
}

/// Stage 4 (CORE): reads the materialized aggregate back and appends the
/// 1-based month index and the period-over-period growth of `total_amount`.
pub fn monthly_growth(cfg: &ReportConfig) -> Result<RowSet> {
    cfg.validate()?;
    let catalog = ArtifactCatalog::new(cfg.artifact.dir.clone());
    let (schema, batches) = catalog.read(&cfg.artifact.name)?;
    let monthly = RowSet::from_batches(schema, &batches)?;
    let month = monthly.column_index("month")?;
    let amount = monthly.column_index("total_amount")?;
    monthly_sequence(&monthly, month, &[amount])
}
