//! Batch airdrop minting orchestrator.
//!
//! For a numbered range of image files this crate resolves each file's
//! recipient from an address list, invokes an external mint tool, classifies
//! its output, retries through wallet sync on the mempool chain limit, and
//! records every minted file in a per-batch JSON progress file.
//!
//! - **[`core`]**: Pure, deterministic logic (range expansion, output
//!   classification, file naming). No I/O.
//! - **[`io`]**: Side-effecting adapters (config, address list, process
//!   execution, progress files, pacing). Traits at the process and pacing seams
//!   let tests run without spawning the tool or sleeping.
//!
//! [`batch`] and [`plan`] coordinate the two to implement the CLI commands.

pub mod batch;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod plan;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
