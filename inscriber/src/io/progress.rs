//! Per-batch progress records (`<batch_key>.json`).
//!
//! Each file maps an image file name to the txid that minted it and the
//! address-list entry it was sent to. Files are read at the moment a success is
//! recorded, merged, and replaced atomically. One writer per batch file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// One minted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub txid: String,
    /// Copy of the address-list entry, or `null` if none matched.
    pub details: Option<Value>,
}

/// Progress files for one output directory.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn batch_path(&self, batch_key: &str) -> PathBuf {
        self.dir.join(format!("{batch_key}.json"))
    }

    /// Insert or overwrite `image_file_name` in the batch file and write it back.
    ///
    /// An existing file that is not a JSON object is an error and is left
    /// untouched. Other keys are preserved as-is.
    pub fn record(
        &self,
        batch_key: &str,
        image_file_name: &str,
        entry: &ProgressEntry,
    ) -> Result<PathBuf> {
        let path = self.batch_path(batch_key);
        let mut records = read_records(&path)?;
        let value = serde_json::to_value(entry).context("serialize progress entry")?;
        records.insert(image_file_name.to_string(), value);
        write_records(&path, &records)?;
        debug!(
            path = %path.display(),
            key = image_file_name,
            txid = %entry.txid,
            "progress recorded"
        );
        Ok(path)
    }

    /// Look up a previously recorded file. Missing batch files yield `None`.
    pub fn lookup(
        &self,
        batch_key: &str,
        image_file_name: &str,
    ) -> Result<Option<ProgressEntry>> {
        let path = self.batch_path(batch_key);
        let records = read_records(&path)?;
        records
            .get(image_file_name)
            .map(|value| {
                serde_json::from_value(value.clone()).with_context(|| {
                    format!("parse entry {image_file_name} in {}", path.display())
                })
            })
            .transpose()
    }
}

fn read_records(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read progress {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse progress {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!(
            "progress file {} is not a JSON object",
            path.display()
        )),
    }
}

fn write_records(path: &Path, records: &Map<String, Value>) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(records).context("serialize progress")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp progress {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace progress {}", path.display()))?;
    Ok(())
}
