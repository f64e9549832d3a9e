//! Test-only doubles for the mint tool and pacer, plus a batch fixture.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::types::{AttemptResult, Pause, PauseKind};
use crate::io::airdrop::AddressBook;
use crate::io::config::InscriberConfig;
use crate::io::mint_tool::MintTool;
use crate::io::pacer::Pacer;
use crate::io::progress::ProgressStore;

/// A call observed by [`ScriptedMintTool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Mint { address: String, file: PathBuf },
    WalletSync,
}

/// Mint tool that replays queued stdout per operation.
///
/// Running out of scripted responses is an error, which surfaces as a fatal
/// tool failure in the batch loop.
#[derive(Default)]
pub struct ScriptedMintTool {
    mint: RefCell<VecDeque<AttemptResult>>,
    sync: RefCell<VecDeque<AttemptResult>>,
    calls: RefCell<Vec<ToolCall>>,
}

impl ScriptedMintTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mint(self, stdout: &str) -> Self {
        self.mint
            .borrow_mut()
            .push_back(AttemptResult::from_stdout(stdout));
        self
    }

    pub fn with_mint_result(self, result: AttemptResult) -> Self {
        self.mint.borrow_mut().push_back(result);
        self
    }

    pub fn with_sync(self, stdout: &str) -> Self {
        self.sync
            .borrow_mut()
            .push_back(AttemptResult::from_stdout(stdout));
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.borrow().clone()
    }

    pub fn mint_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, ToolCall::Mint { .. }))
            .count()
    }

    pub fn sync_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, ToolCall::WalletSync))
            .count()
    }
}

impl MintTool for ScriptedMintTool {
    fn mint(&self, address: &str, file: &Path) -> Result<AttemptResult> {
        self.calls.borrow_mut().push(ToolCall::Mint {
            address: address.to_string(),
            file: file.to_path_buf(),
        });
        self.mint
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted mint response left"))
    }

    fn wallet_sync(&self) -> Result<AttemptResult> {
        self.calls.borrow_mut().push(ToolCall::WalletSync);
        self.sync
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted wallet sync response left"))
    }
}

/// Pacer that records pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: RefCell<Vec<Pause>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Pause> {
        self.pauses.borrow().clone()
    }

    pub fn count(&self, kind: PauseKind) -> usize {
        self.pauses.borrow().iter().filter(|p| p.kind == kind).count()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, pause: Pause) {
        self.pauses.borrow_mut().push(pause);
    }
}

/// Temporary workspace with an image directory and a progress directory.
pub struct BatchFixture {
    _temp: TempDir,
    pub root: PathBuf,
    pub images: PathBuf,
    pub progress: PathBuf,
}

impl BatchFixture {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let root = temp.path().to_path_buf();
        let images = root.join("images");
        let progress = root.join("progress");
        fs::create_dir_all(&images)?;
        Ok(Self {
            _temp: temp,
            root,
            images,
            progress,
        })
    }

    /// Create `<prefix><index:05>.png` files in the image directory.
    pub fn touch_images(&self, prefix: &str, indices: &[u32]) -> Result<()> {
        for index in indices {
            fs::write(self.images.join(format!("{prefix}{index:05}.png")), b"png")?;
        }
        Ok(())
    }

    /// Write the address list document and return its path.
    pub fn write_address_list(&self, json: &str) -> Result<PathBuf> {
        let path = self.root.join("airDropList.json");
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Config pointing at this fixture with 1s pacing (recorded, never slept).
    pub fn config(&self, prefix: &str, start: u32, end: u32) -> InscriberConfig {
        InscriberConfig {
            address_list: self.root.join("airDropList.json"),
            directory: self.images.clone(),
            file_prefix: prefix.to_string(),
            file_extension: "png".to_string(),
            start,
            end,
            progress_dir: self.progress.clone(),
            cooldown_secs: 1,
            retry_delay_secs: 1,
            ..InscriberConfig::default()
        }
    }

    pub fn store(&self) -> ProgressStore {
        ProgressStore::new(&self.progress)
    }

    pub fn read_progress(&self, batch_key: &str) -> Result<serde_json::Value> {
        let raw = fs::read_to_string(self.progress.join(format!("{batch_key}.json")))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Parse an address list, panicking on invalid fixtures.
pub fn address_book(json: &str) -> AddressBook {
    AddressBook::from_json(json).expect("fixture address list")
}
