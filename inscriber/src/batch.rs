//! The minting loop for `inscriber run`.
//!
//! Walks the configured index range in order. Each index is resolved fully,
//! including any wallet sync retries, before the next one starts:
//!
//! ```text
//! Pending ─┬─ no address ──────────────► SkippedNoAddress
//!          ├─ already in progress file ► AlreadyRecorded
//!          ├─ image missing ───────────► SkippedMissingFile
//!          └─ mint ─┬─ txid ───────────► Recorded (cooldown)
//!                   ├─ unknown ────────► Unclassified
//!                   └─ mempool chain ──► sync loop ─┬─ txid ─────► Recorded
//!                                                   ├─ mempool ──► delay, sync again
//!                                                   └─ unknown / limit ► Abandoned
//! ```
//!
//! Per-index problems never stop the batch. Only a tool that cannot be spawned
//! at all is returned as an error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, info_span, warn};

use crate::core::classifier::classify_output;
use crate::core::naming::{batch_key, image_file_name, image_path};
use crate::core::types::{AttemptResult, Outcome, Pause, PauseKind};
use crate::io::airdrop::AddressBook;
use crate::io::config::InscriberConfig;
use crate::io::mint_tool::MintTool;
use crate::io::pacer::Pacer;
use crate::io::progress::{ProgressEntry, ProgressStore};

/// Why the sync loop gave up on an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// Wallet sync printed neither a txid nor the mempool chain marker.
    UnknownOutput,
    /// `max_sync_attempts` was reached while the mempool chain stayed full.
    RetriesExhausted,
}

/// Terminal state reached for one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    Recorded { txid: String, via_sync: bool },
    AlreadyRecorded { txid: String },
    SkippedNoAddress,
    SkippedMissingFile { path: PathBuf },
    /// The first mint printed output we do not recognize. Nothing was recorded.
    Unclassified,
    Abandoned {
        sync_attempts: u32,
        reason: AbandonReason,
    },
    /// A txid was obtained but could not be written to the progress file.
    RecordFailed { txid: String, error: String },
    /// The progress file could not be read before minting.
    ProgressUnreadable { error: String },
}

impl IndexOutcome {
    /// Outcomes an operator has to look at before rerunning.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            Self::Unclassified
                | Self::Abandoned { .. }
                | Self::RecordFailed { .. }
                | Self::ProgressUnreadable { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Recorded { .. } => "recorded",
            Self::AlreadyRecorded { .. } => "already-recorded",
            Self::SkippedNoAddress => "skip-no-address",
            Self::SkippedMissingFile { .. } => "skip-missing-file",
            Self::Unclassified => "unclassified",
            Self::Abandoned { .. } => "abandoned",
            Self::RecordFailed { .. } => "record-failed",
            Self::ProgressUnreadable { .. } => "progress-unreadable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub index: u32,
    pub outcome: IndexOutcome,
}

/// Summary of a batch invocation, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub reports: Vec<IndexReport>,
}

impl BatchSummary {
    pub fn recorded(&self) -> usize {
        self.count(|o| matches!(o, IndexOutcome::Recorded { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                IndexOutcome::SkippedNoAddress
                    | IndexOutcome::SkippedMissingFile { .. }
                    | IndexOutcome::AlreadyRecorded { .. }
            )
        })
    }

    pub fn attention(&self) -> usize {
        self.count(IndexOutcome::needs_attention)
    }

    pub fn outcome(&self, index: u32) -> Option<&IndexOutcome> {
        self.reports
            .iter()
            .find(|r| r.index == index)
            .map(|r| &r.outcome)
    }

    fn count(&self, pred: impl Fn(&IndexOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Collaborators for one batch run.
pub struct Batch<'a, T: MintTool, P: Pacer> {
    pub config: &'a InscriberConfig,
    pub book: &'a AddressBook,
    pub tool: &'a T,
    pub pacer: &'a P,
    pub store: &'a ProgressStore,
}

/// Process `config.start..=config.end`, calling `on_index` after each index.
pub fn run_batch<T: MintTool, P: Pacer, F: FnMut(&IndexReport)>(
    batch: &Batch<'_, T, P>,
    mut on_index: F,
) -> Result<BatchSummary> {
    let cfg = batch.config;
    info!(
        start = cfg.start,
        end = cfg.end,
        directory = %cfg.directory.display(),
        "batch starting"
    );

    let mut summary = BatchSummary::default();
    for index in cfg.start..=cfg.end {
        let span = info_span!("index", index);
        let _guard = span.enter();

        let outcome = process_index(batch, index)?;
        let report = IndexReport { index, outcome };
        on_index(&report);
        summary.reports.push(report);
    }

    info!(
        recorded = summary.recorded(),
        skipped = summary.skipped(),
        attention = summary.attention(),
        "batch finished"
    );
    Ok(summary)
}

fn process_index<T: MintTool, P: Pacer>(
    batch: &Batch<'_, T, P>,
    index: u32,
) -> Result<IndexOutcome> {
    let cfg = batch.config;
    let Some(recipient) = batch.book.recipient(index) else {
        info!(index, "no address mapped for file number, skipping");
        return Ok(IndexOutcome::SkippedNoAddress);
    };

    let file_name = image_file_name(&cfg.file_prefix, index, &cfg.file_extension);
    let key = batch_key(&file_name);
    let path = image_path(&cfg.directory, &cfg.file_prefix, index, &cfg.file_extension);

    if cfg.skip_recorded {
        match batch.store.lookup(&key, &file_name) {
            Ok(Some(entry)) => {
                info!(
                    index,
                    file = %file_name,
                    txid = %entry.txid,
                    "already recorded, skipping"
                );
                return Ok(IndexOutcome::AlreadyRecorded { txid: entry.txid });
            }
            Ok(None) => {}
            Err(err) => {
                let error = format!("{err:#}");
                error!(
                    index,
                    batch_key = %key,
                    err = %error,
                    "cannot read progress file, not minting"
                );
                return Ok(IndexOutcome::ProgressUnreadable { error });
            }
        }
    }

    if !path.is_file() {
        info!(index, path = %path.display(), "file not found, skipping");
        return Ok(IndexOutcome::SkippedMissingFile { path });
    }

    info!(index, address = %recipient.address, path = %path.display(), "minting");
    let result = batch
        .tool
        .mint(&recipient.address, &path)
        .with_context(|| format!("mint index {index}"))?;
    log_attempt("mint", &result);

    let details = batch.book.details(recipient).cloned();
    let is_last = index == cfg.end;
    match classify_output(&result.stdout) {
        Outcome::Success { txid } => {
            info!(index, txid = %txid, "successful mint, updating progress");
            let outcome = record(batch.store, &key, &file_name, txid, details, false);
            if !is_last {
                batch.pacer.pause(Pause {
                    kind: PauseKind::Cooldown,
                    duration: cfg.cooldown(),
                });
            }
            Ok(outcome)
        }
        Outcome::Unknown => {
            error!(
                index,
                exit_status = ?result.exit_status,
                timed_out = result.timed_out,
                stdout = %result.stdout.trim_end(),
                "unclassified mint output, nothing recorded"
            );
            Ok(IndexOutcome::Unclassified)
        }
        Outcome::RetryableFailure => {
            warn!(index, "mempool chain limit hit, switching to wallet sync");
            match sync_until_settled(batch, index)? {
                SyncOutcome::Recovered { txid, attempts } => {
                    info!(
                        index,
                        txid = %txid,
                        sync_attempts = attempts,
                        "successful inscription after wallet sync, updating progress"
                    );
                    let outcome = record(batch.store, &key, &file_name, txid, details, true);
                    if cfg.cooldown_after_sync && !is_last {
                        batch.pacer.pause(Pause {
                            kind: PauseKind::Cooldown,
                            duration: cfg.cooldown(),
                        });
                    }
                    Ok(outcome)
                }
                SyncOutcome::GaveUp { attempts, reason } => Ok(IndexOutcome::Abandoned {
                    sync_attempts: attempts,
                    reason,
                }),
            }
        }
    }
}

enum SyncOutcome {
    Recovered { txid: String, attempts: u32 },
    GaveUp { attempts: u32, reason: AbandonReason },
}

fn sync_until_settled<T: MintTool, P: Pacer>(
    batch: &Batch<'_, T, P>,
    index: u32,
) -> Result<SyncOutcome> {
    let cfg = batch.config;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let result = batch
            .tool
            .wallet_sync()
            .with_context(|| format!("wallet sync for index {index}"))?;
        log_attempt("wallet sync", &result);

        match classify_output(&result.stdout) {
            Outcome::Success { txid } => return Ok(SyncOutcome::Recovered { txid, attempts }),
            Outcome::Unknown => {
                error!(
                    index,
                    sync_attempts = attempts,
                    stdout = %result.stdout.trim_end(),
                    "unknown wallet sync response, abandoning index"
                );
                return Ok(SyncOutcome::GaveUp {
                    attempts,
                    reason: AbandonReason::UnknownOutput,
                });
            }
            Outcome::RetryableFailure => {
                if cfg.max_sync_attempts.is_some_and(|max| attempts >= max) {
                    error!(
                        index,
                        sync_attempts = attempts,
                        "mempool chain still full after max_sync_attempts, abandoning index"
                    );
                    return Ok(SyncOutcome::GaveUp {
                        attempts,
                        reason: AbandonReason::RetriesExhausted,
                    });
                }
                info!(
                    index,
                    sync_attempts = attempts,
                    delay_secs = cfg.retry_delay_secs,
                    "mempool chain still full, retrying wallet sync"
                );
                batch.pacer.pause(Pause {
                    kind: PauseKind::RetryDelay,
                    duration: cfg.retry_delay(),
                });
            }
        }
    }
}

fn record(
    store: &ProgressStore,
    key: &str,
    file_name: &str,
    txid: String,
    details: Option<serde_json::Value>,
    via_sync: bool,
) -> IndexOutcome {
    let entry = ProgressEntry {
        txid: txid.clone(),
        details,
    };
    match store.record(key, file_name, &entry) {
        Ok(path) => {
            info!(file = %file_name, progress = %path.display(), "progress updated");
            IndexOutcome::Recorded { txid, via_sync }
        }
        Err(err) => {
            let error = format!("{err:#}");
            error!(
                file = %file_name,
                txid = %txid,
                err = %error,
                "failed to record minted file"
            );
            IndexOutcome::RecordFailed { txid, error }
        }
    }
}

fn log_attempt(label: &str, result: &AttemptResult) {
    info!(
        exit_status = ?result.exit_status,
        stdout = %result.stdout.trim_end(),
        "output from {label}"
    );
    if !result.stderr.trim().is_empty() {
        warn!(stderr = %result.stderr.trim_end(), "error output from {label}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(index: u32, outcome: IndexOutcome) -> IndexReport {
        IndexReport { index, outcome }
    }

    #[test]
    fn attention_covers_unrecorded_failures_only() {
        assert!(IndexOutcome::Unclassified.needs_attention());
        assert!(
            IndexOutcome::Abandoned {
                sync_attempts: 3,
                reason: AbandonReason::RetriesExhausted,
            }
            .needs_attention()
        );
        assert!(
            IndexOutcome::RecordFailed {
                txid: "abc".to_string(),
                error: "disk full".to_string(),
            }
            .needs_attention()
        );
        assert!(!IndexOutcome::SkippedNoAddress.needs_attention());
        assert!(
            !IndexOutcome::SkippedMissingFile {
                path: PathBuf::from("img00001.png"),
            }
            .needs_attention()
        );
    }

    #[test]
    fn summary_counts_by_category() {
        let summary = BatchSummary {
            reports: vec![
                report(
                    1,
                    IndexOutcome::Recorded {
                        txid: "a".to_string(),
                        via_sync: false,
                    },
                ),
                report(2, IndexOutcome::SkippedNoAddress),
                report(
                    3,
                    IndexOutcome::AlreadyRecorded {
                        txid: "c".to_string(),
                    },
                ),
                report(4, IndexOutcome::Unclassified),
                report(
                    5,
                    IndexOutcome::Recorded {
                        txid: "e".to_string(),
                        via_sync: true,
                    },
                ),
            ],
        };
        assert_eq!(summary.recorded(), 2);
        assert_eq!(summary.skipped(), 2);
        assert_eq!(summary.attention(), 1);
        assert_eq!(summary.outcome(4), Some(&IndexOutcome::Unclassified));
        assert_eq!(summary.outcome(9), None);
    }

    #[test]
    fn labels_distinguish_missing_file_from_unclassified() {
        let missing = IndexOutcome::SkippedMissingFile {
            path: PathBuf::from("x"),
        };
        assert_ne!(missing.label(), IndexOutcome::Unclassified.label());
    }
}
