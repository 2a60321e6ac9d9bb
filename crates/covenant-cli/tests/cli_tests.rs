//! CLI integration tests for covenant
//!
//! Only offline commands; nothing here needs a node.

use std::process::Command;

fn run_covenant(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_covenant"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_cli_help() {
    let output = run_covenant(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["selector", "encode", "decode", "call", "send", "deploy"] {
        assert!(text.contains(command), "missing {}", command);
    }
}

#[test]
fn test_selector() {
    let output = run_covenant(&["selector", "transfer(address,uint256)"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "0xa9059cbb");
}

#[test]
fn test_event_topic() {
    let output = run_covenant(&["selector", "--event", "Transfer(address,address,uint256)"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
    );
}

#[test]
fn test_selector_json() {
    let output = run_covenant(&["--json", "selector", "balanceOf(address)"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["selector"], "0x70a08231");
    assert_eq!(value["signature"], "balanceOf(address)");
}

#[test]
fn test_encode() {
    let output = run_covenant(&[
        "encode",
        "transfer(address,uint256)",
        "0x1111111111111111111111111111111111111111",
        "1000",
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "0xa9059cbb\
         0000000000000000000000001111111111111111111111111111111111111111\
         00000000000000000000000000000000000000000000000000000000000003e8"
    );
}

#[test]
fn test_decode() {
    let output = run_covenant(&[
        "decode",
        "uint256,bool",
        "0x00000000000000000000000000000000000000000000000000000000000003e8\
         0000000000000000000000000000000000000000000000000000000000000001",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1000\ntrue");
}

#[test]
fn test_decode_truncated_fails() {
    let output = run_covenant(&["decode", "uint256", "0x1234"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let output = run_covenant(&["--config", missing.to_str().unwrap(), "config"]);
    assert!(!output.status.success());
}

#[test]
fn test_config_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "rpc_url = \"http://10.1.2.3:8545\"\nchain_id = 1337\n").unwrap();

    let output = run_covenant(&["--json", "--config", path.to_str().unwrap(), "config"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["config"]["rpc_url"], "http://10.1.2.3:8545");
    assert_eq!(value["config"]["chain_id"], 1337);
}
