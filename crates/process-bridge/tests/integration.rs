// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: the bridge against real child processes.
//!
//! Each test writes a small `/bin/sh` worker into a temporary directory
//! and drives it through [`ProcessBridge`], covering the success path,
//! every failure classification, timeout, cancellation, single-flight
//! rejection and progress forwarding.

#![cfg(unix)]

use error_taxonomy::{ErrorCategory, Severity};
use process_bridge::{
    BridgeConfig, BridgeError, BridgeState, Command, DownloadModelParams, ListModelsParams,
    OutputFormat, ProcessBridge, TranscribeParams,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

// ── Helpers ────────────────────────────────────────────────────

const OK_RESPONSE: &str =
    r#"{"success":true,"data":{"models":[]},"error":null,"code":null,"timestamp":"2024-01-01T00:00:00Z"}"#;

/// Writes an executable `/bin/sh` worker script and returns its path.
fn worker(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn bridge_for(program: &Path) -> ProcessBridge {
    ProcessBridge::new(BridgeConfig::for_program(program))
}

fn list_models() -> Command {
    Command::ListModels(ListModelsParams::default())
}

fn transcribe(input: &str) -> Command {
    Command::Transcribe(TranscribeParams {
        input_path: PathBuf::from(input),
        model: "base".into(),
        output_format: OutputFormat::Txt,
        language: None,
        output_path: None,
        srt_max_chars: None,
        srt_max_duration: Some(3.5),
    })
}

/// A worker that answers `list_models` instantly and hangs on anything else.
fn selective_worker(dir: &TempDir) -> PathBuf {
    worker(
        dir,
        "selective.sh",
        &format!(
            r#"input=$(cat)
case "$input" in
  *list_models*) echo '{OK_RESPONSE}' ;;
  *) exec sleep 30 ;;
esac"#
        ),
    )
}

// ── Success path ───────────────────────────────────────────────

#[tokio::test]
async fn test_successful_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let received = dir.path().join("received.json");
    let program = worker(
        &dir,
        "echo.sh",
        &format!(
            "[ \"$1\" = bridge ] || exit 64\ncat > '{}'\necho '{OK_RESPONSE}'",
            received.display()
        ),
    );

    let bridge = bridge_for(&program);
    let command = transcribe("/media/talk.mp3");
    let response = bridge.execute(&command).await.unwrap();

    assert!(response.success);
    assert!(response.error.is_none());
    assert_eq!(bridge.state(), BridgeState::Idle);

    // The worker saw exactly the command we sent.
    let wire = std::fs::read_to_string(&received).unwrap();
    let seen: Command = serde_json::from_str(wire.trim()).unwrap();
    assert_eq!(seen, command);
}

#[tokio::test]
async fn test_worker_ignoring_stdin_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    let program = worker(&dir, "deaf.sh", &format!("echo '{OK_RESPONSE}'"));
    let response = bridge_for(&program).execute(&list_models()).await.unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn test_large_stderr_does_not_deadlock() {
    let dir = tempfile::tempdir().unwrap();
    let program = worker(
        &dir,
        "noisy.sh",
        &format!(
            "i=0\nwhile [ $i -lt 4000 ]; do echo \"whisper_log line $i padding padding padding\" >&2; i=$((i+1)); done\ncat > /dev/null\necho '{OK_RESPONSE}'"
        ),
    );
    let bridge = ProcessBridge::new(
        BridgeConfig::for_program(&program).with_timeout(Duration::from_secs(30)),
    );
    let response = bridge.execute(&list_models()).await.unwrap();
    assert!(response.success);
}

// ── Failure classification ─────────────────────────────────────

#[tokio::test]
async fn test_exit_zero_with_garbage_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let program = worker(&dir, "garbage.sh", "cat > /dev/null\necho 'this is not json'");

    let err = bridge_for(&program).execute(&list_models()).await.unwrap_err();
    let BridgeError::MalformedResponse(domain) = err else {
        panic!("expected MalformedResponse, got {err:?}");
    };
    assert_eq!(domain.category(), ErrorCategory::ProcessBridge);
    assert_eq!(domain.severity(), Severity::High);
    assert!(!domain.is_recoverable());
}

#[tokio::test]
async fn test_invariant_violation_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let program = worker(
        &dir,
        "liar.sh",
        r#"cat > /dev/null
echo '{"success":false,"data":null,"error":null,"code":"X","timestamp":""}'"#,
    );
    let err = bridge_for(&program).execute(&list_models()).await.unwrap_err();
    assert!(matches!(err, BridgeError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_nonzero_exit_without_response() {
    let dir = tempfile::tempdir().unwrap();
    let program = worker(
        &dir,
        "crash.sh",
        "cat > /dev/null\necho 'ERROR FILE_NOT_FOUND: /media/missing.wav' >&2\nexit 2",
    );

    let err = bridge_for(&program).execute(&list_models()).await.unwrap_err();
    match &err {
        BridgeError::ProcessTerminatedWithError { exit_code, stderr } => {
            assert_eq!(*exit_code, Some(2));
            assert!(stderr.contains("FILE_NOT_FOUND"));
        }
        other => panic!("expected ProcessTerminatedWithError, got {other:?}"),
    }
    let domain = err.into_domain_error();
    assert_eq!(domain.code(), "FILE_NOT_FOUND");
    assert_eq!(domain.category(), ErrorCategory::FileProcessing);
}

#[tokio::test]
async fn test_domain_failure_is_not_a_bridge_failure() {
    let dir = tempfile::tempdir().unwrap();
    let program = worker(
        &dir,
        "refuse.sh",
        r#"cat > /dev/null
echo '{"success":false,"data":null,"error":"model tiny.en is not installed","code":"MODEL_NOT_FOUND","timestamp":"t"}'
exit 1"#,
    );

    let command = Command::DownloadModel(DownloadModelParams {
        model: "tiny.en".into(),
        models_dir: None,
    });
    let err = bridge_for(&program).execute(&command).await.unwrap_err();
    let BridgeError::Operation(domain) = err else {
        panic!("expected Operation, got {err:?}");
    };
    assert_eq!(domain.code(), "MODEL_NOT_FOUND");
    assert_eq!(domain.category(), ErrorCategory::ModelManagement);
    assert_eq!(domain.context(), Some("model tiny.en is not installed"));
}

#[tokio::test]
async fn test_missing_binary() {
    let bridge = bridge_for(Path::new("/nonexistent/whisper-worker"));
    let err = bridge.execute(&list_models()).await.unwrap_err();
    assert!(matches!(err, BridgeError::SpawnFailed { .. }));
    assert_eq!(err.into_domain_error().code(), "BINARY_NOT_FOUND");
    assert_eq!(bridge.state(), BridgeState::Idle);
}

// ── Timeout, cancellation, single flight ───────────────────────

#[tokio::test]
async fn test_timeout_then_recovery() {
    let dir = tempfile::tempdir().unwrap();
    let program = selective_worker(&dir);
    let bridge = ProcessBridge::new(
        BridgeConfig::for_program(&program).with_timeout(Duration::from_millis(300)),
    );

    let started = Instant::now();
    let err = bridge.execute(&transcribe("/media/long.wav")).await.unwrap_err();
    assert!(matches!(err, BridgeError::Timeout { .. }), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(bridge.state(), BridgeState::Idle);

    // A subsequent command sees a clean Idle bridge.
    let response = bridge.execute(&list_models()).await.unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn test_second_execute_rejected_while_busy() {
    let dir = tempfile::tempdir().unwrap();
    let program = selective_worker(&dir);
    let bridge = ProcessBridge::new(
        BridgeConfig::for_program(&program).with_timeout(Duration::from_secs(1)),
    );

    let long_request = transcribe("/media/long.wav");
    let (first, second) = tokio::join!(bridge.execute(&long_request), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let state = bridge.state();
        (state, bridge.execute(&list_models()).await)
    });

    let (state_during, second) = second;
    assert_eq!(state_during, BridgeState::AwaitingResponse);
    assert!(matches!(second, Err(BridgeError::AlreadyRunning)));
    // The in-flight call ran to its own conclusion.
    assert!(matches!(first, Err(BridgeError::Timeout { .. })));
    assert_eq!(bridge.state(), BridgeState::Idle);
}

#[tokio::test]
async fn test_cancel_kills_worker() {
    let dir = tempfile::tempdir().unwrap();
    let program = selective_worker(&dir);
    let bridge = bridge_for(&program);

    let started = Instant::now();
    let long_request = transcribe("/media/long.wav");
    let (result, ()) = tokio::join!(bridge.execute(&long_request), async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        bridge.cancel();
        bridge.cancel();
    });

    assert!(matches!(result, Err(BridgeError::Cancelled)), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(bridge.state(), BridgeState::Idle);

    // Cancel on an idle bridge is a no-op.
    bridge.cancel();
    assert!(bridge.execute(&list_models()).await.is_ok());
}

// ── Progress ───────────────────────────────────────────────────

#[tokio::test]
async fn test_progress_forwarded_and_not_captured() {
    let dir = tempfile::tempdir().unwrap();
    let program = worker(
        &dir,
        "progress.sh",
        r#"cat > /dev/null
echo 'PROGRESS: 0.25' >&2
echo 'PROGRESS: 50%' >&2
echo 'some diagnostic' >&2
echo 'PROGRESS: 1.0' >&2
echo 'no json'
exit 3"#,
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let err = bridge_for(&program)
        .execute_with_progress(&list_models(), Some(tx))
        .await
        .unwrap_err();

    let mut seen = Vec::new();
    while let Ok(p) = rx.try_recv() {
        seen.push(p.fraction);
    }
    assert_eq!(seen, vec![0.25, 0.5, 1.0]);

    let BridgeError::ProcessTerminatedWithError { stderr, .. } = err else {
        panic!("expected ProcessTerminatedWithError");
    };
    assert_eq!(stderr.trim(), "some diagnostic");
}
