// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Single-flight command execution against the worker process.
//!
//! # Lifecycle of one command
//!
//! ```text
//! Idle ──execute──▶ Dispatching ──spawned──▶ AwaitingResponse ──exit/timeout/cancel──▶ Idle
//! ```
//!
//! 1. The in-flight slot is claimed under the mutex; a second caller gets
//!    [`BridgeError::AlreadyRunning`] immediately.
//! 2. A fresh worker is spawned (one retry on a transient spawn failure).
//! 3. The JSON command is written to stdin and stdin is closed.
//! 4. stdout and stderr are drained concurrently; `PROGRESS:` lines on
//!    stderr are forwarded to the optional progress channel.
//! 5. The bridge waits for exit, the timeout, or [`ProcessBridge::cancel`],
//!    whichever comes first. Timeout and cancel kill the worker.
//! 6. A [`FlightGuard`] returns the bridge to `Idle` on every exit path,
//!    including a dropped future.

use crate::{BridgeConfig, BridgeError, Command, Response};
use error_taxonomy::ErrorFactory;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// `ETXTBSY`: the executable is still open for writing elsewhere.
const ETXTBSY: i32 = 26;

/// How long to wait for pipe readers once the worker is gone.
const READER_GRACE: Duration = Duration::from_secs(2);

/// Upper bound on captured stderr; older text is dropped first.
const MAX_STDERR_BYTES: usize = 64 * 1024;

/// Where the bridge is in its single-command lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Dispatching,
    AwaitingResponse,
}

/// Incremental progress reported by the worker, as a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub fraction: f64,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

/// Launches one worker process.
type Spawner = Arc<dyn Fn(&BridgeConfig) -> io::Result<Child> + Send + Sync>;

struct Flight {
    state: BridgeState,
    cancel: Option<oneshot::Sender<()>>,
}

/// Owns the worker channel and enforces one outstanding command.
pub struct ProcessBridge {
    config: BridgeConfig,
    flight: Mutex<Flight>,
    spawner: Spawner,
}

enum Outcome {
    Exited(io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

impl ProcessBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_spawner(config, Arc::new(spawn_worker))
    }

    fn with_spawner(config: BridgeConfig, spawner: Spawner) -> Self {
        Self {
            config,
            flight: Mutex::new(Flight {
                state: BridgeState::Idle,
                cancel: None,
            }),
            spawner,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> BridgeState {
        self.lock().state
    }

    /// Runs one command and returns the worker's successful response.
    pub async fn execute(&self, command: &Command) -> Result<Response, BridgeError> {
        self.execute_with_progress(command, None).await
    }

    /// Like [`execute`](Self::execute), forwarding worker progress to `progress`.
    pub async fn execute_with_progress(
        &self,
        command: &Command,
        progress: Option<mpsc::UnboundedSender<Progress>>,
    ) -> Result<Response, BridgeError> {
        let (guard, mut cancel_rx) = self.begin()?;
        let operation = command.operation();
        let payload = command.to_json()?;

        tracing::info!(operation, "dispatching command to worker");
        let started = Instant::now();

        let mut child = self.spawn_with_retry().await?;
        guard.set(BridgeState::AwaitingResponse);

        let stdin = child.stdin.take();
        let stdout_task = child.stdout.take().map(|out| tokio::spawn(read_stdout(out)));
        let stderr_task = child
            .stderr
            .take()
            .map(|err| tokio::spawn(read_stderr(err, progress)));

        let timeout = self.config.timeout();
        let outcome = tokio::select! {
            status = write_and_wait(&mut child, stdin, payload) => Outcome::Exited(status),
            _ = tokio::time::sleep(timeout) => Outcome::TimedOut,
            Ok(()) = &mut cancel_rx => Outcome::Cancelled,
        };

        if matches!(outcome, Outcome::TimedOut | Outcome::Cancelled) {
            terminate(&mut child).await;
        }

        let stdout = join_reader(stdout_task).await;
        let stderr = join_reader(stderr_task).await;
        let elapsed = started.elapsed();

        match outcome {
            Outcome::TimedOut => {
                tracing::warn!(operation, ?timeout, "worker timed out and was killed");
                Err(BridgeError::Timeout { after: timeout })
            }
            Outcome::Cancelled => {
                tracing::info!(operation, ?elapsed, "command cancelled");
                Err(BridgeError::Cancelled)
            }
            Outcome::Exited(Err(e)) => Err(BridgeError::Io(e)),
            Outcome::Exited(Ok(status)) => {
                tracing::debug!(operation, ?status, ?elapsed, "worker exited");
                interpret(status, &stdout, stderr)
            }
        }
    }

    /// Kills the in-flight worker, if any. Idempotent; a no-op when idle.
    ///
    /// The bridge returns to [`BridgeState::Idle`] once the killed worker
    /// has been reaped by the executing task.
    pub fn cancel(&self) {
        let mut flight = self.lock();
        if let Some(tx) = flight.cancel.take() {
            tracing::info!(state = ?flight.state, "cancelling in-flight command");
            let _ = tx.send(());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Flight> {
        self.flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the in-flight slot.
    fn begin(&self) -> Result<(FlightGuard<'_>, oneshot::Receiver<()>), BridgeError> {
        let mut flight = self.lock();
        if flight.state != BridgeState::Idle {
            return Err(BridgeError::AlreadyRunning);
        }
        let (tx, rx) = oneshot::channel();
        flight.state = BridgeState::Dispatching;
        flight.cancel = Some(tx);
        Ok((FlightGuard { bridge: self }, rx))
    }

    async fn spawn_with_retry(&self) -> Result<Child, BridgeError> {
        match self.spawn_once() {
            Ok(child) => Ok(child),
            Err(e) if is_transient(&e) => {
                tracing::warn!("transient spawn failure, retrying once: {e}");
                tokio::time::sleep(self.config.spawn_retry_delay()).await;
                self.spawn_once().map_err(|source| self.spawn_failed(source))
            }
            Err(source) => Err(self.spawn_failed(source)),
        }
    }

    fn spawn_once(&self) -> io::Result<Child> {
        (self.spawner)(&self.config)
    }

    fn spawn_failed(&self, source: io::Error) -> BridgeError {
        BridgeError::SpawnFailed {
            program: self.config.program.display().to_string(),
            source,
        }
    }
}

impl std::fmt::Debug for ProcessBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessBridge")
            .field("program", &self.config.program)
            .field("state", &self.state())
            .finish()
    }
}

/// Returns the bridge to `Idle` when the executing future ends or is dropped.
struct FlightGuard<'a> {
    bridge: &'a ProcessBridge,
}

impl FlightGuard<'_> {
    fn set(&self, state: BridgeState) {
        self.bridge.lock().state = state;
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut flight = self.bridge.lock();
        flight.state = BridgeState::Idle;
        flight.cancel = None;
    }
}

/// Starts `<program> <entry_argument> [extra_args...]` with piped stdio.
fn spawn_worker(config: &BridgeConfig) -> io::Result<Child> {
    let mut cmd = tokio::process::Command::new(&config.program);
    cmd.arg(&config.entry_argument)
        .args(&config.extra_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &config.working_dir {
        cmd.current_dir(dir);
    }
    cmd.spawn()
}

fn is_transient(e: &io::Error) -> bool {
    e.raw_os_error() == Some(ETXTBSY)
        || matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
}

/// Writes the command, closes stdin, and waits for the worker to exit.
///
/// A worker that exits without reading its input closes the pipe early;
/// that is not an error here, the exit status tells the real story.
async fn write_and_wait(
    child: &mut Child,
    stdin: Option<ChildStdin>,
    payload: String,
) -> io::Result<ExitStatus> {
    if let Some(mut stdin) = stdin {
        let written = async {
            stdin.write_all(payload.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await
        }
        .await;
        match written {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("worker closed stdin before reading the command");
            }
            other => other?,
        }
        drop(stdin);
    }
    child.wait().await
}

async fn terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        tracing::debug!("kill failed, worker probably already exited: {e}");
    }
    if let Err(e) = child.wait().await {
        tracing::warn!("failed to reap killed worker: {e}");
    }
}

async fn read_stdout<R: AsyncRead + Unpin>(mut out: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = out.read_to_end(&mut buf).await {
        tracing::debug!("stdout read ended early: {e}");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn read_stderr<R: AsyncRead + Unpin>(
    err: R,
    progress: Option<mpsc::UnboundedSender<Progress>>,
) -> String {
    let mut reader = BufReader::new(err);
    let mut line = Vec::new();
    let mut captured = String::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let text = text.trim_end();
                if let Some(p) = parse_progress(text) {
                    if let Some(tx) = &progress {
                        let _ = tx.send(p);
                    }
                    continue;
                }
                captured.push_str(text);
                captured.push('\n');
                keep_tail(&mut captured, MAX_STDERR_BYTES);
            }
            Err(e) => {
                tracing::debug!("stderr read ended early: {e}");
                break;
            }
        }
    }
    captured
}

/// Waits briefly for a pipe reader; a grandchild holding the pipe open
/// must not stall the bridge.
async fn join_reader(task: Option<JoinHandle<String>>) -> String {
    let Some(mut handle) = task else {
        return String::new();
    };
    match tokio::time::timeout(READER_GRACE, &mut handle).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::warn!("pipe reader failed: {e}");
            String::new()
        }
        Err(_) => {
            tracing::warn!("pipe still open after worker exit, abandoning reader");
            handle.abort();
            String::new()
        }
    }
}

/// Parses `PROGRESS: 0.42`, `PROGRESS: 42` or `PROGRESS: 42%`.
/// Values above 1 are percentages.
fn parse_progress(line: &str) -> Option<Progress> {
    let value = line.strip_prefix("PROGRESS:")?.trim().trim_end_matches('%');
    let mut v: f64 = value.parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    if v > 1.0 {
        v /= 100.0;
    }
    Some(Progress {
        fraction: v.clamp(0.0, 1.0),
    })
}

fn keep_tail(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut cut = text.len() - max;
    while !text.is_char_boundary(cut) {
        cut += 1;
    }
    text.drain(..cut);
}

/// Turns a finished worker into a response or a classified error.
///
/// A parseable response is authoritative regardless of the exit status.
fn interpret(status: ExitStatus, stdout: &str, stderr: String) -> Result<Response, BridgeError> {
    match Response::parse(stdout) {
        Some(response) => {
            if let Err(detail) = response.validate() {
                return Err(BridgeError::MalformedResponse(
                    ErrorFactory::from_malformed_response(&format!("{detail}: {}", stdout.trim())),
                ));
            }
            if !status.success() {
                tracing::warn!(?status, "worker exited non-zero after a valid response");
            }
            if response.success {
                Ok(response)
            } else {
                Err(BridgeError::Operation(ErrorFactory::from_response_code(
                    response.code.as_deref(),
                    response.error.as_deref(),
                )))
            }
        }
        None if !status.success() => Err(BridgeError::ProcessTerminatedWithError {
            exit_code: status.code(),
            stderr,
        }),
        None => Err(BridgeError::MalformedResponse(
            ErrorFactory::from_malformed_response(stdout),
        )),
    }
}
