//! Stable exit codes for inscriber CLI commands.

/// Command succeeded; every index reached a settled state.
pub const OK: i32 = 0;
/// Invalid config or address list, or the mint tool could not be run.
pub const INVALID: i32 = 1;
/// `inscriber run` finished but some indices need operator attention
/// (unclassified output, abandoned sync, or progress write failures).
pub const ATTENTION: i32 = 2;
