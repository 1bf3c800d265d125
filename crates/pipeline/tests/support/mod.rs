#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::sync::Arc;
use txc_common::{ArtifactConfig, MonthKey, MonthRange, ReportConfig, SourceConfig};
use txc_ops::normalize::raw_schema;

pub fn unique_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    fs::create_dir_all(&dir).expect("create test dir");
    dir
}

#[derive(Debug, Clone)]
pub struct RawTxn {
    pub user: i64,
    pub card: i64,
    pub state: Option<&'static str>,
    pub chip: &'static str,
    pub amount: &'static str,
    pub day: i64,
    pub fraud: &'static str,
}

pub fn txn(
    user: i64,
    state: Option<&'static str>,
    chip: &'static str,
    amount: &'static str,
    day: i64,
) -> RawTxn {
    RawTxn {
        user,
        card: 1,
        state,
        chip,
        amount,
        day,
        fraud: "No",
    }
}

pub fn write_shard(dir: &Path, prefix: &str, month: MonthKey, rows: &[RawTxn]) -> PathBuf {
    let schema = raw_schema();
    let cols: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(rows.iter().map(|r| r.user).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.card).collect::<Vec<_>>())),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.state).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.chip).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.amount).collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(vec![i64::from(month.year); rows.len()])),
        Arc::new(Int64Array::from(vec![i64::from(month.month); rows.len()])),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.day).collect::<Vec<_>>())),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.fraud).collect::<Vec<_>>(),
        )),
    ];
    let batch = RecordBatch::try_new(schema.clone(), cols).expect("build shard batch");
    let path = dir.join(format!("{prefix}_{}.parquet", month.suffix()));
    let file = File::create(&path).expect("create shard");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("create shard writer");
    writer.write(&batch).expect("write shard");
    writer.close().expect("close shard writer");
    path
}

/// Config rooted in a fresh temp directory: shards under `shards/`, artifacts
/// under `artifacts/`, range 2023-01..2023-03, user 7, threshold 50, top 2.
pub fn base_config(root: &Path) -> ReportConfig {
    let shards = root.join("shards");
    fs::create_dir_all(&shards).expect("create shards dir");
    let mut cfg = ReportConfig::default();
    cfg.source = SourceConfig {
        dir: shards.to_string_lossy().into_owned(),
        shard_prefix: "txn".to_string(),
    };
    cfg.range = MonthRange {
        start: MonthKey { year: 2023, month: 1 },
        end: MonthKey { year: 2023, month: 3 },
    };
    cfg.user = 7;
    cfg.min_group_total = 50.0;
    cfg.top_n = 2;
    cfg.artifact = ArtifactConfig {
        dir: root.join("artifacts").to_string_lossy().into_owned(),
        name: "monthly_spend".to_string(),
    };
    cfg
}

/// Three months of fixture data.
///
/// User 7 monthly totals: Jan 100.00, Feb 150.00, Mar 150.00.
/// Per-state totals over everything: CA 174.75, NV 190.00, TX 145.25, NY 55.00.
pub fn seed_walkthrough(cfg: &ReportConfig) {
    let dir = PathBuf::from(&cfg.source.dir);
    let prefix = cfg.source.shard_prefix.as_str();
    write_shard(
        &dir,
        prefix,
        MonthKey { year: 2023, month: 1 },
        &[
            txn(7, Some("CA"), "Chip Transaction", "$60.00", 5),
            txn(7, Some("CA"), "Chip Transaction", "$40.00", 20),
            txn(8, Some("TX"), "Swipe Transaction", "$70.00", 9),
        ],
    );
    write_shard(
        &dir,
        prefix,
        MonthKey { year: 2023, month: 2 },
        &[
            txn(7, Some("NV"), "Chip Transaction", "$150.00", 14),
            txn(8, Some("NV"), "Swipe Transaction", "$40.00", 2),
        ],
    );
    write_shard(
        &dir,
        prefix,
        MonthKey { year: 2023, month: 3 },
        &[
            txn(7, Some("TX"), "Chip Transaction", "$75.25", 3),
            txn(7, Some("CA"), "Chip Transaction", "$74.75", 28),
            txn(8, Some("NY"), "Swipe Transaction", "$55.00", 15),
        ],
    );
}

pub fn date32(y: i32, m: u32, d: u32) -> i32 {
    let date = chrono::NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
    let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");
    date.signed_duration_since(epoch).num_days() as i32
}
