//! Dry-run planning for `inscriber plan`.
//!
//! Applies the same lookups as the batch loop (address, progress file, image
//! file) without invoking the mint tool or touching any file.

use std::path::PathBuf;

use crate::core::naming::{batch_key, image_file_name, image_path};
use crate::io::airdrop::AddressBook;
use crate::io::config::InscriberConfig;
use crate::io::progress::ProgressStore;

/// What `run` would do for one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Mint { address: String, path: PathBuf },
    AlreadyRecorded { txid: String },
    SkipNoAddress,
    SkipMissingFile { path: PathBuf },
    ProgressUnreadable { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedIndex {
    pub index: u32,
    pub action: PlannedAction,
}

impl PlannedIndex {
    /// One-line human summary, e.g. `00003 mint D1 ./img00003.png`.
    pub fn render(&self) -> String {
        let index = self.index;
        match &self.action {
            PlannedAction::Mint { address, path } => {
                format!("{index:05} mint {address} {}", path.display())
            }
            PlannedAction::AlreadyRecorded { txid } => format!("{index:05} done {txid}"),
            PlannedAction::SkipNoAddress => format!("{index:05} skip no-address"),
            PlannedAction::SkipMissingFile { path } => {
                format!("{index:05} skip missing-file {}", path.display())
            }
            PlannedAction::ProgressUnreadable { error } => {
                format!("{index:05} blocked progress-unreadable {error}")
            }
        }
    }
}

/// Plan every index in `config.start..=config.end`.
pub fn plan_batch(
    config: &InscriberConfig,
    book: &AddressBook,
    store: &ProgressStore,
) -> Vec<PlannedIndex> {
    (config.start..=config.end)
        .map(|index| PlannedIndex {
            index,
            action: plan_index(config, book, store, index),
        })
        .collect()
}

fn plan_index(
    config: &InscriberConfig,
    book: &AddressBook,
    store: &ProgressStore,
    index: u32,
) -> PlannedAction {
    let Some(recipient) = book.recipient(index) else {
        return PlannedAction::SkipNoAddress;
    };
    let file_name = image_file_name(&config.file_prefix, index, &config.file_extension);
    if config.skip_recorded {
        match store.lookup(&batch_key(&file_name), &file_name) {
            Ok(Some(entry)) => return PlannedAction::AlreadyRecorded { txid: entry.txid },
            Ok(None) => {}
            Err(err) => {
                return PlannedAction::ProgressUnreadable {
                    error: format!("{err:#}"),
                };
            }
        }
    }
    let path = image_path(
        &config.directory,
        &config.file_prefix,
        index,
        &config.file_extension,
    );
    if !path.is_file() {
        return PlannedAction::SkipMissingFile { path };
    }
    PlannedAction::Mint {
        address: recipient.address.clone(),
        path,
    }
}
