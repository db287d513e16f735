use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY_VARS: &[&str] = &[
    "ANTHROPIC_API_KEY",
    "CLAUDE_API_KEY",
    "OPENAI_API_KEY",
    "CHATGPT_API_KEY",
    "GEMINI_API_KEY",
];

/// cmdfy with an isolated home directory and no API keys in the environment
fn cmdfy(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cmdfy").unwrap();
    cmd.env("HOME", home)
        .env("SHELL", "/bin/sh")
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("RUST_LOG");
    for var in API_KEY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_config(home: &Path, body: &str) -> PathBuf {
    let path = home.join("cmdfy.toml");
    fs::write(&path, body).unwrap();
    path
}

fn ollama_config(home: &Path, server: &MockServer) -> PathBuf {
    write_config(
        home,
        &format!(
            "default_provider = \"ollama\"\n\n[providers.ollama]\nbase_url = \"{}\"\n",
            server.uri()
        ),
    )
}

async fn mock_ollama(steps: serde_json::Value, explanation: &str, dangerous: bool) -> MockServer {
    let reply = json!({
        "steps": steps,
        "explanation": explanation,
        "dangerous": dangerous,
    });

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "message": {"role": "assistant", "content": reply.to_string()},
            "prompt_eval_count": 10,
            "eval_count": 5
        })))
        .mount(&server)
        .await;
    server
}

#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    cmdfy(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Turn natural language into shell commands"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    cmdfy(home.path()).arg("--version").assert().success();
}

#[test]
fn test_missing_query() {
    let home = TempDir::new().unwrap();
    cmdfy(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("required arguments were not provided"));
}

#[test]
fn test_unknown_provider_fails() {
    let home = TempDir::new().unwrap();
    cmdfy(home.path())
        .args(["-p", "mystery", "list", "files"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Provider not found"));
}

#[test]
fn test_missing_api_key_fails() {
    let home = TempDir::new().unwrap();
    cmdfy(home.path())
        .args(["-p", "openai", "list", "files"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_config_set_and_show() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("nested").join("config.toml");

    cmdfy(home.path())
        .args(["config", "set", "--provider", "claude", "--key", "sk-ant-verysecret-4321"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Current provider: claude"));

    cmdfy(home.path())
        .args(["config", "show"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Default provider: claude"))
        .stdout(predicate::str::contains("****4321"))
        .stdout(predicate::str::contains("verysecret").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_prints_command_and_records_history() {
    let home = TempDir::new().unwrap();
    let server = mock_ollama(
        json!([{"tool": "ls", "args": ["-la"], "op": ""}]),
        "list all files",
        false,
    )
    .await;
    let config = ollama_config(home.path(), &server);

    cmdfy(home.path())
        .args(["list", "all", "files", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("COMMAND:"))
        .stdout(predicate::str::contains("ls -la"))
        .stdout(predicate::str::contains("list all files"));

    let brain = fs::read_to_string(home.path().join(".cmdfy").join("brain.jsonl")).unwrap();
    assert!(brain.contains("\"command\":\"ls -la\""));
    assert!(brain.contains("\"provider\":\"ollama\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dangerous_command_aborted() {
    let home = TempDir::new().unwrap();
    let marker = home.path().join("should-survive");
    fs::write(&marker, "").unwrap();

    let server = mock_ollama(
        json!([{"tool": "rm", "args": [marker.to_str().unwrap()], "op": ""}]),
        "delete the marker",
        true,
    )
    .await;
    let config = ollama_config(home.path(), &server);

    cmdfy(home.path())
        .args(["-y", "delete", "it", "--config"])
        .arg(&config)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborted."))
        .stderr(predicate::str::contains("[WARNING] This command is marked as dangerous"));

    assert!(marker.exists());
    assert!(!home.path().join(".cmdfy").join("brain.jsonl").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dangerous_command_confirmed() {
    let home = TempDir::new().unwrap();
    let marker = home.path().join("to-delete");
    fs::write(&marker, "").unwrap();

    let server = mock_ollama(
        json!([{"tool": "rm", "args": [marker.to_str().unwrap()], "op": ""}]),
        "delete the marker",
        true,
    )
    .await;
    let config = ollama_config(home.path(), &server);

    cmdfy(home.path())
        .args(["-y", "delete", "it", "--config"])
        .arg(&config)
        .write_stdin("y\n")
        .assert()
        .success();

    assert!(!marker.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_execute_safe_pipeline() {
    let home = TempDir::new().unwrap();
    let server = mock_ollama(
        json!([
            {"tool": "echo", "args": ["cmdfy ran"], "op": "|"},
            {"tool": "tr", "args": ["a-z", "A-Z"], "op": ""}
        ]),
        "shout",
        false,
    )
    .await;
    let config = ollama_config(home.path(), &server);

    cmdfy(home.path())
        .args(["-y", "shout", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("CMDFY RAN"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_command_exits_nonzero() {
    let home = TempDir::new().unwrap();
    let server = mock_ollama(json!([{"tool": "false", "args": [], "op": ""}]), "fail", false).await;
    let config = ollama_config(home.path(), &server);

    cmdfy(home.path())
        .args(["-y", "fail", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Command execution failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_provider_error_is_fatal_in_single_mode() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;
    let config = ollama_config(home.path(), &server);

    cmdfy(home.path())
        .args(["list", "files", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ollama failed to generate a command"));
}

#[test]
fn test_compare_without_eligible_providers() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "default_provider = \"gemini\"\n");

    cmdfy(home.path())
        .args(["--compare", "list", "files", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No eligible providers"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_compare_lists_results_when_not_interactive() {
    let home = TempDir::new().unwrap();
    let server = mock_ollama(
        json!([{"tool": "df", "args": ["-h"], "op": ""}]),
        "disk usage",
        false,
    )
    .await;
    let config = ollama_config(home.path(), &server);

    cmdfy(home.path())
        .args(["--compare", "disk", "usage", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("ollama"))
        .stdout(predicate::str::contains("COMMAND: df -h"));
}

#[tokio::test]
async fn test_compare_execute_without_terminal_runs_nothing() {
    let home = TempDir::new().unwrap();
    let marker = home.path().join("ran");
    let server = mock_ollama(
        json!([{"tool": "touch", "args": [marker.to_str().unwrap()], "op": ""}]),
        "create a file",
        false,
    )
    .await;
    let config = ollama_config(home.path(), &server);

    cmdfy(home.path())
        .args(["--compare", "-y", "make", "a", "file", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("COMMAND: touch"))
        .stderr(predicate::str::contains("Nothing was executed"));

    assert!(!marker.exists());
}
