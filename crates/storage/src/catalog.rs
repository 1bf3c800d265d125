//! Named materialized artifacts with atomic replace semantics.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::ArrowWriter;
use tracing::info;
use txc_common::{Result, TxcError};

use crate::parquet::read_file;

/// Maps artifact names to parquet files under one directory.
///
/// A build writes to a staged sibling file and renames it over the target, so
/// readers never observe a partially written artifact and a rebuild fully
/// supersedes the previous one.
#[derive(Debug, Clone)]
pub struct ArtifactCatalog {
    dir: PathBuf,
}

impl ArtifactCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.parquet"))
    }

    /// Writes `batches` as artifact `name`, replacing any prior artifact of
    /// that name. Zero batches still produce a valid schema-only artifact.
    pub fn write_replace(
        &self,
        name: &str,
        schema: SchemaRef,
        batches: &[RecordBatch],
    ) -> Result<PathBuf> {
        let target = self.path_of(name);
        let staged = temp_sibling_path(&target, "staged");
        if let Some(parent) = staged.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&staged)?;
        let mut writer = ArrowWriter::try_new(file, schema, None)
            .map_err(|e| TxcError::Execution(format!("parquet writer init failed: {e}")))?;
        for batch in batches {
            writer
                .write(batch)
                .map_err(|e| TxcError::Execution(format!("parquet write failed: {e}")))?;
        }
        writer
            .close()
            .map_err(|e| TxcError::Execution(format!("parquet writer close failed: {e}")))?;

        if let Err(err) = replace_file_atomically(&staged, &target) {
            let _ = fs::remove_file(&staged);
            return Err(err);
        }
        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        info!(artifact = name, rows, path = %target.display(), "materialized artifact replaced");
        Ok(target)
    }

    /// Reads artifact `name` back, schema included so zero-row artifacts stay
    /// fully typed.
    pub fn read(&self, name: &str) -> Result<(SchemaRef, Vec<RecordBatch>)> {
        let path = self.path_of(name);
        if !path.exists() {
            return Err(TxcError::InvalidConfig(format!(
                "artifact '{name}' has not been built (expected {})",
                path.display()
            )));
        }
        read_file(&path)
    }
}

fn temp_sibling_path(path: &Path, label: &str) -> PathBuf {
    let parent = path
        .parent()
        .map(std::borrow::ToOwned::to_owned)
        .unwrap_or_else(|| PathBuf::from("."));
    let stem = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("target");
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    parent.join(format!(".txc_{label}_{stem}_{nanos}.tmp"))
}

fn replace_file_atomically(staged: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    if !target.exists() {
        fs::rename(staged, target).map_err(|e| {
            TxcError::Execution(format!(
                "artifact commit failed: {} -> {} ({e})",
                staged.display(),
                target.display()
            ))
        })?;
        return Ok(());
    }

    let backup = temp_sibling_path(target, "backup");
    fs::rename(target, &backup).map_err(|e| {
        TxcError::Execution(format!(
            "artifact backup rename failed: {} -> {} ({e})",
            target.display(),
            backup.display()
        ))
    })?;

    match fs::rename(staged, target) {
        Ok(_) => {
            let _ = fs::remove_file(backup);
            Ok(())
        }
        Err(e) => {
            let _ = fs::rename(&backup, target);
            Err(TxcError::Execution(format!(
                "artifact commit failed: {} -> {} ({e})",
                staged.display(),
                target.display()
            )))
        }
    }
}
