//! Shared deterministic types for the minting core.
//!
//! These types define the contracts between the address resolver, the
//! classifier and the batch loop. They carry no I/O handles.

use std::time::Duration;

/// One `NR<start>-<end>` range from the address list, already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRangeEntry {
    pub range_start: u32,
    /// Inclusive.
    pub range_end: u32,
    pub recipient_address: String,
}

/// Captured result of one external tool invocation.
///
/// A non-zero exit status is not an error; callers classify `stdout`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptResult {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the child was killed by a signal or timed out.
    pub exit_status: Option<i32>,
    pub timed_out: bool,
}

impl AttemptResult {
    /// Convenience constructor for a clean exit with the given stdout.
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_status: Some(0),
            ..Self::default()
        }
    }
}

/// Classification of a single attempt's stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The tool printed `inscription txid: <id>`.
    Success { txid: String },
    /// The tool hit the mempool chain limit; a wallet sync may clear it.
    RetryableFailure,
    /// Neither marker was present.
    Unknown,
}

/// Why the batch loop is pausing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseKind {
    /// Pacing after a recorded mint.
    Cooldown,
    /// Delay between wallet sync retries.
    RetryDelay,
}

/// A pause request handed to the pacer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pause {
    pub kind: PauseKind,
    pub duration: Duration,
}
