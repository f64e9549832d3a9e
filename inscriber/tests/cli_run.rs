//! CLI tests for `inscriber plan` and `inscriber run`.
//!
//! Spawns the inscriber binary against a temp workspace whose config points at
//! a `sh` script standing in for the mint tool, and checks exit codes, stdout
//! and the progress files left behind.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use inscriber::exit_codes;
use inscriber::io::config::{InscriberConfig, ToolConfig, write_config};
use inscriber::test_support::BatchFixture;

/// Prints a txid derived from the file name for `mint`, nothing for anything else.
const FAKE_TOOL: &str = r#"
if [ "$1" = mint ]; then
  echo "minting $3 for $2"
  echo "inscription txid: tx$(basename "$3" .png)"
fi
"#;

fn write_fixture_config(fixture: &BatchFixture, script: &str, start: u32, end: u32) {
    let cfg = InscriberConfig {
        cooldown_secs: 0,
        retry_delay_secs: 0,
        tool: ToolConfig {
            program: "sh".to_string(),
            base_args: vec![
                "-c".to_string(),
                script.to_string(),
                "fake-tool".to_string(),
            ],
            timeout_secs: 30,
            ..ToolConfig::default()
        },
        ..fixture.config("img", start, end)
    };
    write_config(&fixture.root.join("inscriber.toml"), &cfg).expect("write config");
}

fn inscriber(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_inscriber"))
        .current_dir(root)
        .args(args)
        .output()
        .expect("spawn inscriber")
}

#[test]
fn run_mints_range_and_writes_progress() {
    let fixture = BatchFixture::new().expect("fixture");
    fixture.touch_images("img", &[1, 2]).expect("images");
    fixture
        .write_address_list(r#"{"airDropList":[{"note":"NR1-3","dogecoin_address":"D1"}]}"#)
        .expect("address list");
    write_fixture_config(&fixture, FAKE_TOOL, 1, 3);

    let output = inscriber(&fixture.root, &["run"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{stdout}");
    assert!(stdout.contains("index: 00001 recorded txid=tximg00001"), "{stdout}");
    assert!(stdout.contains("index: 00003 skip-missing-file"), "{stdout}");
    assert!(stdout.contains("run: indices=3 recorded=2 skipped=1 attention=0"), "{stdout}");

    let progress: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(fixture.progress.join("img.json")).expect("progress"),
    )
    .expect("parse progress");
    assert_eq!(progress["img00002.png"]["txid"], "tximg00002");
    assert_eq!(progress["img00002.png"]["details"]["dogecoin_address"], "D1");
}

#[test]
fn run_with_unclassified_output_exits_with_attention() {
    let fixture = BatchFixture::new().expect("fixture");
    fixture.touch_images("img", &[1]).expect("images");
    fixture
        .write_address_list(r#"{"airDropList":[{"note":"NR1-1","dogecoin_address":"D1"}]}"#)
        .expect("address list");
    write_fixture_config(&fixture, "echo 'Error: insufficient funds'", 1, 1);

    let output = inscriber(&fixture.root, &["run"]);
    assert_eq!(output.status.code(), Some(exit_codes::ATTENTION));
    assert!(String::from_utf8_lossy(&output.stdout).contains("index: 00001 unclassified"));
    assert!(!fixture.progress.join("img.json").exists());
}

#[test]
fn plan_does_not_invoke_tool() {
    let fixture = BatchFixture::new().expect("fixture");
    fixture.touch_images("img", &[2]).expect("images");
    fixture
        .write_address_list(r#"{"airDropList":[{"note":"NR2-3","dogecoin_address":"D7"}]}"#)
        .expect("address list");
    // A tool that would leave a marker file if it were ever run.
    write_fixture_config(&fixture, "touch invoked", 1, 3);

    let output = inscriber(&fixture.root, &["plan"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3, "{stdout}");
    assert_eq!(lines[0], "00001 skip no-address");
    assert!(lines[1].starts_with("00002 mint D7 "), "{stdout}");
    assert!(lines[2].starts_with("00003 skip missing-file "), "{stdout}");
    assert!(!fixture.root.join("invoked").exists());
}

#[test]
fn missing_address_list_is_invalid() {
    let fixture = BatchFixture::new().expect("fixture");
    write_fixture_config(&fixture, FAKE_TOOL, 1, 1);

    let output = inscriber(&fixture.root, &["run"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("read address list"));
}

#[test]
fn reversed_range_override_is_invalid() {
    let fixture = BatchFixture::new().expect("fixture");
    fixture
        .write_address_list(r#"{"airDropList":[]}"#)
        .expect("address list");
    write_fixture_config(&fixture, FAKE_TOOL, 1, 1);

    let output = inscriber(&fixture.root, &["plan", "--start", "9", "--end", "2"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("must not exceed end"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let fixture = BatchFixture::new().expect("fixture");

    let first = inscriber(&fixture.root, &["init"]);
    assert_eq!(first.status.code(), Some(exit_codes::OK));
    assert!(fixture.root.join("inscriber.toml").exists());

    let second = inscriber(&fixture.root, &["init"]);
    assert_eq!(second.status.code(), Some(exit_codes::INVALID));

    let forced = inscriber(&fixture.root, &["init", "--force"]);
    assert_eq!(forced.status.code(), Some(exit_codes::OK));
}
