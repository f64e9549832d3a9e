//! Inscriber configuration stored in `inscriber.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "inscriber.toml";

/// Batch configuration (TOML).
///
/// Edited by humans before a run. Missing fields fall back to the defaults
/// below, which mirror the pacing the mint tool has been run with so far.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InscriberConfig {
    /// JSON document holding the `airDropList` array.
    pub address_list: PathBuf,

    /// Directory containing the numbered image files.
    pub directory: PathBuf,
    pub file_prefix: String,
    pub file_extension: String,

    /// First index to process (inclusive, >= 1).
    pub start: u32,
    /// Last index to process (inclusive).
    pub end: u32,

    /// Where `<batch_key>.json` progress files are written.
    pub progress_dir: PathBuf,

    /// Pause after each recorded mint.
    pub cooldown_secs: u64,
    /// Pause between wallet sync attempts while the mempool chain is full.
    pub retry_delay_secs: u64,
    /// Give up on an index after this many wallet syncs. Unset retries forever.
    pub max_sync_attempts: Option<u32>,
    /// Also apply the cooldown after a mint recovered through wallet sync.
    pub cooldown_after_sync: bool,
    /// Skip indices whose file name is already in the progress file.
    pub skip_recorded: bool,

    pub tool: ToolConfig,
}

/// How to invoke the external mint tool.
///
/// Arguments are passed as a discrete array; nothing goes through a shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    pub program: String,
    /// Arguments placed before every subcommand (e.g. `["."]` for `node .`).
    pub base_args: Vec<String>,
    /// Mint subcommand; the address and file path are appended.
    pub mint_args: Vec<String>,
    pub sync_args: Vec<String>,
    /// Working directory for the tool. Defaults to the current directory.
    pub workdir: Option<PathBuf>,
    /// Kill an invocation that runs longer than this.
    pub timeout_secs: u64,
    /// Keep at most this many bytes of stdout and of stderr per invocation.
    pub output_limit_bytes: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            base_args: vec![".".to_string()],
            mint_args: vec!["mint".to_string()],
            sync_args: vec!["wallet".to_string(), "sync".to_string()],
            workdir: None,
            timeout_secs: 15 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl Default for InscriberConfig {
    fn default() -> Self {
        Self {
            address_list: PathBuf::from("airDropList.json"),
            directory: PathBuf::from("."),
            file_prefix: "image_".to_string(),
            file_extension: "png".to_string(),
            start: 1,
            end: 1,
            progress_dir: PathBuf::from("."),
            cooldown_secs: 100,
            retry_delay_secs: 100,
            max_sync_attempts: None,
            cooldown_after_sync: false,
            skip_recorded: true,
            tool: ToolConfig::default(),
        }
    }
}

impl InscriberConfig {
    pub fn validate(&self) -> Result<()> {
        if self.start == 0 {
            return Err(anyhow!("start must be >= 1"));
        }
        if self.start > self.end {
            return Err(anyhow!(
                "start ({}) must not exceed end ({})",
                self.start,
                self.end
            ));
        }
        if self.file_prefix.is_empty() {
            return Err(anyhow!("file_prefix must not be empty"));
        }
        if self.file_extension.is_empty() || self.file_extension.starts_with('.') {
            return Err(anyhow!("file_extension must be non-empty and without a leading dot"));
        }
        if self.max_sync_attempts == Some(0) {
            return Err(anyhow!("max_sync_attempts must be > 0 when set"));
        }
        self.tool.validate()
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl ToolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(anyhow!("tool.program must be non-empty"));
        }
        if self.mint_args.is_empty() {
            return Err(anyhow!("tool.mint_args must be a non-empty array"));
        }
        if self.sync_args.is_empty() {
            return Err(anyhow!("tool.sync_args must be a non-empty array"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("tool.timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("tool.output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `InscriberConfig::default()`.
pub fn load_config(path: &Path) -> Result<InscriberConfig> {
    if !path.exists() {
        return Ok(InscriberConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: InscriberConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &InscriberConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, InscriberConfig::default());
        cfg.validate().expect("default config is valid");
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("inscriber.toml");
        let cfg = InscriberConfig {
            start: 327,
            end: 337,
            file_prefix: "smallCert_c".to_string(),
            max_sync_attempts: Some(12),
            ..InscriberConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("inscriber.toml");
        fs::write(
            &path,
            "start = 5\nend = 9\n\n[tool]\nprogram = \"doginals\"\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!((cfg.start, cfg.end), (5, 9));
        assert_eq!(cfg.tool.program, "doginals");
        assert_eq!(cfg.tool.sync_args, vec!["wallet", "sync"]);
        assert_eq!(cfg.cooldown_secs, 100);
    }

    #[test]
    fn validate_rejects_bad_ranges_and_tool() {
        let reversed = InscriberConfig {
            start: 10,
            end: 2,
            ..InscriberConfig::default()
        };
        assert!(reversed.validate().is_err());

        let zero = InscriberConfig {
            start: 0,
            ..InscriberConfig::default()
        };
        assert!(zero.validate().is_err());

        let dotted = InscriberConfig {
            file_extension: ".png".to_string(),
            ..InscriberConfig::default()
        };
        assert!(dotted.validate().is_err());

        let mut no_program = InscriberConfig::default();
        no_program.tool.program = " ".to_string();
        let err = no_program.validate().unwrap_err();
        assert!(err.to_string().contains("tool.program"));
    }
}
