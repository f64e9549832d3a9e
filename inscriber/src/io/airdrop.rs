//! Address list loading (`airDropList.json`) with schema validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::core::address::{AddressMap, Recipient, range_entry};
use crate::core::types::AddressRangeEntry;

const AIRDROP_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/airdrop_list.schema.json"
));

#[derive(Debug, Deserialize)]
struct AirdropDocument {
    #[serde(rename = "airDropList")]
    air_drop_list: Vec<AirdropEntry>,
}

#[derive(Debug, Deserialize)]
struct AirdropEntry {
    #[serde(default)]
    note: String,
    #[serde(default)]
    dogecoin_address: Option<String>,
}

/// The parsed address list: raw entries plus the derived index map.
#[derive(Debug, Clone)]
pub struct AddressBook {
    /// Entries exactly as they appear in the document, extra fields included.
    entries: Vec<Value>,
    map: AddressMap,
}

impl AddressBook {
    /// Parse an address list document from a string.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).context("parse address list json")?;
        validate_schema(&value)?;
        let entries = value
            .get("airDropList")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let doc: AirdropDocument =
            serde_json::from_value(value).context("deserialize address list")?;

        let ranges: Vec<Option<AddressRangeEntry>> = doc
            .air_drop_list
            .iter()
            .map(|entry| {
                range_entry(&entry.note, entry.dogecoin_address.as_deref().unwrap_or(""))
            })
            .collect();
        let skipped = ranges.iter().filter(|r| r.is_none()).count();
        if skipped > 0 {
            debug!(skipped, "address list entries without a valid NR range");
        }
        let map = AddressMap::build(ranges.iter().map(Option::as_ref));
        Ok(Self { entries, map })
    }

    pub fn recipient(&self, index: u32) -> Option<&Recipient> {
        self.map.get(index)
    }

    /// The raw entry that supplied `recipient`, as stored in progress `details`.
    pub fn details(&self, recipient: &Recipient) -> Option<&Value> {
        self.entries.get(recipient.source)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn range_count(&self) -> usize {
        self.map.range_count()
    }
}

/// Load and validate the address list at `path`.
///
/// Any failure here is a configuration error and aborts the run.
pub fn load_address_book(path: &Path) -> Result<AddressBook> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read address list {}", path.display()))?;
    let book =
        AddressBook::from_json(&raw).with_context(|| format!("load {}", path.display()))?;
    info!(
        path = %path.display(),
        entries = book.entry_count(),
        ranges = book.range_count(),
        "address list loaded"
    );
    Ok(book)
}

fn validate_schema(value: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(AIRDROP_SCHEMA).context("parse address list schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(value) {
        let messages = compiled
            .iter_errors(value)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "address list schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}
