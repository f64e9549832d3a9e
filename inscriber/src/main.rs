//! Batch airdrop minting CLI.
//!
//! Reads `inscriber.toml`, resolves recipients from the address list, and
//! mints each numbered image through the configured external tool, recording
//! txids in per-batch progress files so reruns resume where they stopped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use inscriber::batch::{Batch, IndexOutcome, run_batch};
use inscriber::exit_codes;
use inscriber::io::airdrop::load_address_book;
use inscriber::io::config::{DEFAULT_CONFIG_PATH, InscriberConfig, load_config, write_config};
use inscriber::io::mint_tool::CommandMintTool;
use inscriber::io::pacer::ThreadPacer;
use inscriber::io::progress::ProgressStore;
use inscriber::logging;
use inscriber::plan::plan_batch;

#[derive(Parser)]
#[command(
    name = "inscriber",
    version,
    about = "Mint a numbered range of images to airdrop recipients"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file if missing.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
    /// Show what `run` would do for each index without invoking the tool.
    Plan(RangeArgs),
    /// Mint every index in the range and record the results.
    Run(RangeArgs),
}

/// Per-invocation overrides for the batch range.
#[derive(Args, Debug, Default)]
struct RangeArgs {
    /// First index (inclusive).
    #[arg(long)]
    start: Option<u32>,
    /// Last index (inclusive).
    #[arg(long)]
    end: Option<u32>,
    /// Directory containing the numbered images.
    #[arg(long)]
    directory: Option<PathBuf>,
    /// File name prefix before the zero-padded index.
    #[arg(long)]
    prefix: Option<String>,
    /// File extension without the dot.
    #[arg(long)]
    extension: Option<String>,
}

impl RangeArgs {
    fn apply(self, cfg: &mut InscriberConfig) {
        if let Some(start) = self.start {
            cfg.start = start;
        }
        if let Some(end) = self.end {
            cfg.end = end;
        }
        if let Some(directory) = self.directory {
            cfg.directory = directory;
        }
        if let Some(prefix) = self.prefix {
            cfg.file_prefix = prefix;
        }
        if let Some(extension) = self.extension {
            cfg.file_extension = extension;
        }
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Plan(range) => cmd_plan(&cli.config, range),
        Command::Run(range) => cmd_run(&cli.config, range),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    write_config(config_path, &InscriberConfig::default())
        .with_context(|| format!("write {}", config_path.display()))?;
    println!("init: wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

fn cmd_plan(config_path: &Path, range: RangeArgs) -> Result<i32> {
    let cfg = resolve_config(config_path, range)?;
    let book = load_address_book(&cfg.address_list)?;
    let store = ProgressStore::new(&cfg.progress_dir);
    for planned in plan_batch(&cfg, &book, &store) {
        println!("{}", planned.render());
    }
    Ok(exit_codes::OK)
}

fn cmd_run(config_path: &Path, range: RangeArgs) -> Result<i32> {
    let cfg = resolve_config(config_path, range)?;
    let book = load_address_book(&cfg.address_list)?;
    let store = ProgressStore::new(&cfg.progress_dir);
    let tool = CommandMintTool::new(cfg.tool.clone());
    let batch = Batch {
        config: &cfg,
        book: &book,
        tool: &tool,
        pacer: &ThreadPacer,
        store: &store,
    };

    let summary = run_batch(&batch, |report| {
        let detail = match &report.outcome {
            IndexOutcome::Recorded { txid, .. } | IndexOutcome::AlreadyRecorded { txid } => {
                format!(" txid={txid}")
            }
            IndexOutcome::SkippedMissingFile { path } => format!(" path={}", path.display()),
            IndexOutcome::Abandoned {
                sync_attempts,
                reason,
            } => format!(" sync_attempts={sync_attempts} reason={reason:?}"),
            IndexOutcome::RecordFailed { txid, error } => format!(" txid={txid} error={error}"),
            IndexOutcome::ProgressUnreadable { error } => format!(" error={error}"),
            IndexOutcome::SkippedNoAddress | IndexOutcome::Unclassified => String::new(),
        };
        println!("index: {:05} {}{}", report.index, report.outcome.label(), detail);
    })?;

    println!(
        "run: indices={} recorded={} skipped={} attention={}",
        summary.reports.len(),
        summary.recorded(),
        summary.skipped(),
        summary.attention()
    );
    if summary.attention() > 0 {
        return Ok(exit_codes::ATTENTION);
    }
    Ok(exit_codes::OK)
}

fn resolve_config(config_path: &Path, range: RangeArgs) -> Result<InscriberConfig> {
    let mut cfg = load_config(config_path)?;
    range.apply(&mut cfg);
    cfg.validate()
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    debug!(?cfg, "config resolved");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["inscriber", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn parse_run_with_overrides() {
        let cli = Cli::parse_from([
            "inscriber",
            "run",
            "--start",
            "327",
            "--end",
            "337",
            "--prefix",
            "smallCert_c",
            "--config",
            "batch.toml",
        ]);
        assert_eq!(cli.config, PathBuf::from("batch.toml"));
        let Command::Run(range) = cli.command else {
            panic!("expected run");
        };
        let mut cfg = InscriberConfig::default();
        range.apply(&mut cfg);
        assert_eq!((cfg.start, cfg.end), (327, 337));
        assert_eq!(cfg.file_prefix, "smallCert_c");
        assert_eq!(cfg.file_extension, "png");
    }

    #[test]
    fn empty_overrides_keep_config() {
        let mut cfg = InscriberConfig {
            start: 4,
            end: 8,
            ..InscriberConfig::default()
        };
        RangeArgs::default().apply(&mut cfg);
        assert_eq!((cfg.start, cfg.end), (4, 8));
    }
}
