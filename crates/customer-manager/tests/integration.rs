use customer_manager::config::Config;
use customer_manager::run_server;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn custmgr_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("custmgr");
    path
}

fn write_config(tmp: &TempDir, content: &str) -> PathBuf {
    let path = tmp.path().join("custmgr.toml");
    fs::write(&path, content).unwrap();
    path
}

fn run_custmgr(config_path: Option<&Path>, args: &[&str]) -> (String, String, bool) {
    let binary = custmgr_binary();
    let mut cmd = Command::new(&binary);
    if let Some(path) = config_path {
        cmd.arg("--config").arg(path);
    }
    let output = cmd
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run custmgr binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

// ─── CLI ────────────────────────────────────────────────────────────

#[test]
fn test_tool_list() {
    let (stdout, stderr, success) = run_custmgr(None, &["tool", "list"]);
    assert!(success, "tool list failed: {}", stderr);
    assert!(stdout.contains("6 tools"));
    for name in [
        "list_customers",
        "get_customer",
        "search_customer",
        "create_customer",
        "update_customer",
        "delete_customer",
    ] {
        assert!(stdout.contains(name), "missing {} in:\n{}", name, stdout);
    }
}

#[test]
fn test_tool_call_get_customer() {
    let (stdout, stderr, success) =
        run_custmgr(None, &["tool", "call", "get_customer", "--param", "id=1"]);
    assert!(success, "tool call failed: {}", stderr);
    let value: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["name"], "John Doe");
    assert_eq!(value["email"], "john@example.com");
}

#[test]
fn test_tool_call_inline_error() {
    let (stdout, _, success) = run_custmgr(
        None,
        &["tool", "call", "search_customer", "--param", "name=nobody"],
    );
    assert!(success);
    let value: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value, json!({ "error": "Customer 'nobody' not found" }));
}

#[test]
fn test_tool_call_unknown_tool_fails() {
    let (_, stderr, success) = run_custmgr(None, &["tool", "call", "drop_tables"]);
    assert!(!success);
    assert!(stderr.contains("no tool registered"));
}

#[test]
fn test_tool_call_without_seed() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "[seed]\nenabled = false\n");
    let (stdout, stderr, success) = run_custmgr(
        Some(&config),
        &[
            "tool",
            "call",
            "create_customer",
            "--param",
            "name=Ann Lee",
            "--param",
            "email=ann@x.com",
        ],
    );
    assert!(success, "create failed: {}", stderr);
    let value: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["id"], 1);
}

#[test]
fn test_tool_call_keeps_numeric_looking_names() {
    let (stdout, stderr, success) = run_custmgr(
        None,
        &[
            "tool",
            "call",
            "create_customer",
            "--param",
            "name=2024",
            "--param",
            "email=a@x.com",
        ],
    );
    assert!(success, "create failed: {}", stderr);
    let value: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["id"], 4);
    assert_eq!(value["name"], "2024");
}

#[test]
fn test_chat_without_credential_fails() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(
        &tmp,
        "[agent]\napi_key_env = \"CUSTMGR_INTEGRATION_KEY_NEVER_SET\"\n",
    );
    let (_, stderr, success) = run_custmgr(Some(&config), &["chat", "hello"]);
    assert!(!success);
    assert!(stderr.contains("CUSTMGR_INTEGRATION_KEY_NEVER_SET"));
}

#[test]
fn test_invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "[server]\nbind = \"not an address\"\n");
    let (_, stderr, success) = run_custmgr(Some(&config), &["tool", "list"]);
    assert!(!success);
    assert!(stderr.contains("server.bind"));
}

// ─── Live server ────────────────────────────────────────────────────

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

#[tokio::test]
async fn test_live_server_crud() {
    let port = find_free_port();
    let mut cfg = Config::default();
    cfg.server.bind = format!("127.0.0.1:{}", port);
    cfg.agent.api_key_env = "CUSTMGR_INTEGRATION_KEY_NEVER_SET".into();

    let server_handle = tokio::spawn(async move {
        run_server(&cfg).await.unwrap();
    });
    wait_for_server(port).await;

    let client = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{}", port);

    let resp = client
        .post(format!("{}/api/customers", base))
        .json(&json!({ "name": "Ann Lee", "email": "ann@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    assert_eq!(
        resp.headers()["location"].to_str().unwrap(),
        "/api/customers/4"
    );

    let found: Value = client
        .get(format!("{}/api/customers/search?name=ann", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found["id"], 4);

    let resp = client
        .delete(format!("{}/api/customers/4", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = client
        .post(format!("{}/api/chat", base))
        .json(&json!({ "message": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "agent_not_configured");

    server_handle.abort();
}
