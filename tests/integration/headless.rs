//! `medq ask` end to end: the compiled binary against the stub backend.

use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;

use crate::fixtures::{kawasaki_reply, Reply, StubBackend};

/// Run the binary with an isolated HOME so no user config or log is touched.
async fn run_medq(args: Vec<String>) -> (Output, TempDir) {
    let home = TempDir::new().expect("Failed to create temp home");
    let home_path = home.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_medq"))
            .args(&args)
            .env("HOME", &home_path)
            .env_remove("MEDQ_DEBUG")
            .output()
            .expect("Failed to run medq")
    })
    .await
    .expect("spawn_blocking join");
    (output, home)
}

fn ask(stub: &StubBackend, query: &str, extra: &[&str]) -> Vec<String> {
    let mut args = vec![
        "--endpoint".to_string(),
        stub.base_url.clone(),
        "ask".to_string(),
        query.to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    args
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ask_prints_rendered_fields() {
    let stub = StubBackend::start(kawasaki_reply()).await;

    let (output, _home) = run_medq(ask(&stub, " kawasaki ", &[])).await;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Medical Q&A Database"));
    assert!(stdout.contains("router → retrieve_qna → grade_documents"));
    assert!(stdout.contains("IVIG"));
    assert_eq!(stub.bodies(), vec![json!({ "query": "kawasaki" })]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ask_json_passes_response_through() {
    let stub = StubBackend::start(kawasaki_reply()).await;

    let (output, _home) = run_medq(ask(&stub, "kawasaki", &["--json"])).await;

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["route"], "Retrieve_QnA");
    assert_eq!(value["success"], true);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ask_failure_exits_nonzero_with_message() {
    let stub = StubBackend::start(Reply::json(
        500,
        json!({ "success": false, "error": "Graph execution failed" }),
    ))
    .await;

    let (output, _home) = run_medq(ask(&stub, "fever", &[])).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Graph execution failed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ask_blank_query_never_reaches_backend() {
    let stub = StubBackend::start(kawasaki_reply()).await;

    let (output, _home) = run_medq(ask(&stub, "   ", &[])).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Please enter a query"));
    assert!(stub.requests().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_examples_reads_config_file() {
    let home = TempDir::new().expect("Failed to create temp home");
    let dir = home.path().join(".medq");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("medq.toml"),
        "examples = [\"What is sepsis?\", \"Dose of amoxicillin for otitis?\"]\n",
    )
    .unwrap();

    let home_path = home.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_medq"))
            .arg("examples")
            .env("HOME", &home_path)
            .output()
            .expect("Failed to run medq")
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["What is sepsis?", "Dose of amoxicillin for otitis?"]
    );
}
