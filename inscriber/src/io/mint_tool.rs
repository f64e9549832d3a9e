//! Mint tool abstraction.
//!
//! The [`MintTool`] trait decouples the batch loop from the actual external
//! binary (`node . mint` by default). Tests use scripted tools that return
//! predetermined output without spawning processes.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::core::types::AttemptResult;
use crate::io::config::ToolConfig;
use crate::io::process::{CommandOutput, run_command_with_timeout};

/// The two operations the batch loop needs from the external tool.
///
/// Implementations return `Err` only when the tool could not be run at all.
/// Any output, including a failing exit status, is an `AttemptResult`.
pub trait MintTool {
    fn mint(&self, address: &str, file: &Path) -> Result<AttemptResult>;
    fn wallet_sync(&self) -> Result<AttemptResult>;
}

/// Spawns the configured program with an argument array.
pub struct CommandMintTool {
    config: ToolConfig,
}

impl CommandMintTool {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Build the base command: program, working directory and `base_args`.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.base_args);
        if let Some(workdir) = &self.config.workdir {
            cmd.current_dir(workdir);
        }
        cmd
    }

    fn run(&self, cmd: Command, label: &str) -> Result<AttemptResult> {
        let output = run_command_with_timeout(
            cmd,
            self.config.timeout(),
            self.config.output_limit_bytes,
        )
        .with_context(|| format!("run {label}"))?;
        if output.timed_out {
            warn!(
                timeout_secs = self.config.timeout_secs,
                "{label} timed out"
            );
        }
        Ok(attempt_from_output(&output))
    }
}

impl MintTool for CommandMintTool {
    #[instrument(skip_all, fields(address = %address, file = %file.display()))]
    fn mint(&self, address: &str, file: &Path) -> Result<AttemptResult> {
        let mut cmd = self.command();
        cmd.args(&self.config.mint_args).arg(address).arg(file);
        debug!(cmd = ?cmd, "invoking mint");
        self.run(cmd, "mint")
    }

    #[instrument(skip_all)]
    fn wallet_sync(&self) -> Result<AttemptResult> {
        let mut cmd = self.command();
        cmd.args(&self.config.sync_args);
        debug!(cmd = ?cmd, "invoking wallet sync");
        self.run(cmd, "wallet sync")
    }
}

fn attempt_from_output(output: &CommandOutput) -> AttemptResult {
    AttemptResult {
        stdout: output.stdout_lossy(),
        stderr: output.stderr_lossy(),
        exit_status: output.status.code(),
        timed_out: output.timed_out,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// A tool that echoes its arguments, one per line, through `sh`.
    fn echo_tool() -> CommandMintTool {
        CommandMintTool::new(ToolConfig {
            program: "sh".to_string(),
            base_args: vec![
                "-c".to_string(),
                r#"for a in "$@"; do echo "$a"; done"#.to_string(),
                "fake-tool".to_string(),
            ],
            ..ToolConfig::default()
        })
    }

    #[test]
    fn mint_passes_address_and_file_as_separate_args() {
        let tool = echo_tool();
        let result = tool
            .mint("D1; rm -rf /", Path::new("/tmp/img 00001.png"))
            .expect("mint");
        assert_eq!(result.stdout, "mint\nD1; rm -rf /\n/tmp/img 00001.png\n");
        assert_eq!(result.exit_status, Some(0));
    }

    #[test]
    fn wallet_sync_uses_sync_args() {
        let tool = echo_tool();
        let result = tool.wallet_sync().expect("sync");
        assert_eq!(result.stdout, "wallet\nsync\n");
    }

    #[test]
    fn failing_tool_still_returns_output() {
        let tool = CommandMintTool::new(ToolConfig {
            program: "sh".to_string(),
            base_args: vec![
                "-c".to_string(),
                "echo partial; echo boom >&2; exit 1".to_string(),
            ],
            ..ToolConfig::default()
        });
        let result = tool.wallet_sync().expect("sync");
        assert_eq!(result.stdout, "partial\n");
        assert_eq!(result.stderr, "boom\n");
        assert_eq!(result.exit_status, Some(1));
    }

    #[test]
    fn missing_program_is_an_error() {
        let tool = CommandMintTool::new(ToolConfig {
            program: "inscriber-missing-tool-7f3a".to_string(),
            ..ToolConfig::default()
        });
        let err = tool.wallet_sync().unwrap_err();
        assert!(format!("{err:#}").contains("run wallet sync"));
    }
}
