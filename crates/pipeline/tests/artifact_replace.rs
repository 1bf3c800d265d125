mod support;

use support::*;
use txc_ops::{RowSet, ScalarValue};
use txc_pipeline::{build_monthly_artifact, monthly_growth};
use txc_storage::ArtifactCatalog;

fn read_artifact_rows(cfg: &txc_common::ReportConfig) -> RowSet {
    let catalog = ArtifactCatalog::new(cfg.artifact.dir.clone());
    let (schema, batches) = catalog.read(&cfg.artifact.name).expect("read artifact");
    RowSet::from_batches(schema, &batches).expect("decode artifact")
}

#[test]
fn rebuilding_with_identical_inputs_is_idempotent() {
    let root = unique_dir("txc_idempotent");
    let cfg = base_config(&root);
    seed_walkthrough(&cfg);

    build_monthly_artifact(&cfg).expect("first build");
    let first = read_artifact_rows(&cfg);
    build_monthly_artifact(&cfg).expect("second build");
    let second = read_artifact_rows(&cfg);

    assert_eq!(first.rows, second.rows);
    assert_eq!(first.schema, second.schema);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn rebuild_fully_supersedes_the_previous_artifact() {
    let root = unique_dir("txc_replace");
    let mut cfg = base_config(&root);
    seed_walkthrough(&cfg);

    build_monthly_artifact(&cfg).expect("build for user 7");
    assert_eq!(read_artifact_rows(&cfg).num_rows(), 3);

    // Same artifact name, different filter: old rows must be gone.
    cfg.user = 8;
    build_monthly_artifact(&cfg).expect("build for user 8");
    let rows = read_artifact_rows(&cfg);
    assert_eq!(rows.num_rows(), 3);
    // User 8 spends: Jan 70, Feb 40, Mar 55.
    assert_eq!(rows.rows[0][1], ScalarValue::float(70.0));
    assert_eq!(rows.rows[1][1], ScalarValue::float(40.0));
    assert_eq!(rows.rows[2][1], ScalarValue::float(55.0));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn unmatched_filter_materializes_a_valid_zero_row_artifact() {
    let root = unique_dir("txc_zero_rows");
    let mut cfg = base_config(&root);
    seed_walkthrough(&cfg);
    cfg.user = 999;

    build_monthly_artifact(&cfg).expect("empty build is not an error");
    let rows = read_artifact_rows(&cfg);
    assert!(rows.is_empty());
    assert_eq!(
        rows.schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect::<Vec<_>>(),
        vec!["month", "total_amount", "txn_count"]
    );

    // The window stage over an empty artifact is an empty result, not an error.
    let growth = monthly_growth(&cfg).expect("empty growth");
    assert!(growth.is_empty());

    let _ = std::fs::remove_dir_all(root);
}
