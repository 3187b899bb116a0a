// Exit status and stderr of the solana-mcp binary

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_solana-mcp");

fn env_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn command(env_file: &Path) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.env_clear()
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "info")
        .arg("--env-file")
        .arg(env_file)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

fn run(mut cmd: Command, stdin: &[u8]) -> Output {
    let mut child = cmd.stdin(Stdio::piped()).spawn().unwrap();
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_missing_rpc_url_exits_with_failure() {
    let file = env_file("");
    let mut cmd = command(file.path());
    cmd.env("SOLANA_PRIVATE_KEY", "key");

    let output = run(cmd, b"");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr.matches("Failed to start MCP server").count(), 1);
    assert!(stderr.contains("RPC_URL"));
    assert!(!stderr.contains("SOLANA_PRIVATE_KEY"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_closed_stdin_exits_cleanly() {
    let file = env_file("");
    let mut cmd = command(file.path());
    cmd.env("SOLANA_PRIVATE_KEY", "key").env("RPC_URL", "https://rpc");

    let output = run(cmd, b"");

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_env_file_configures_server_and_serves_requests() {
    let file = env_file("SOLANA_PRIVATE_KEY=key\nRPC_URL=https://rpc # devnet\n");
    let cmd = command(file.path());

    let output = run(cmd, b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n\xff\n");
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let responses: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 2);
    assert!(responses
        .iter()
        .any(|r| r["id"] == 1 && r["result"] == serde_json::json!({})));
    assert!(responses
        .iter()
        .any(|r| r["id"].is_null() && r["error"]["code"] == -32700));
}

#[test]
fn test_malformed_env_file_exits_with_failure() {
    let file = env_file("not a pair\n");

    let output = run(command(file.path()), b"");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr.matches("Failed to start MCP server").count(), 1);
}
