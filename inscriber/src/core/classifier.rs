//! Deterministic classification of mint tool output.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::Outcome;

/// Substring the tool prints when the wallet hit the mempool chain limit.
pub const MEMPOOL_CHAIN_MARKER: &str = "64: too-long-mempool-chain";

static TXID_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"inscription txid: (\w+)").unwrap());

/// Classify the stdout of a `mint` or `wallet sync` invocation.
///
/// - `Success` if stdout contains `inscription txid: <id>` (first match wins).
/// - `RetryableFailure` if stdout contains the mempool chain marker.
/// - `Unknown` otherwise.
///
/// Only stdout is inspected; stderr never changes the result.
pub fn classify_output(stdout: &str) -> Outcome {
    if let Some(caps) = TXID_MARKER.captures(stdout) {
        return Outcome::Success {
            txid: caps[1].to_string(),
        };
    }
    if stdout.contains(MEMPOOL_CHAIN_MARKER) {
        return Outcome::RetryableFailure;
    }
    Outcome::Unknown
}
