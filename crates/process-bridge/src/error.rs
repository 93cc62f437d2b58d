// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the process bridge.
//!
//! Bridge errors mean "the channel itself broke". A worker that replied
//! `success:false` is reported as [`BridgeError::Operation`], which wraps
//! the already-classified [`DomainError`].

use error_taxonomy::{catalog, DomainError, ErrorFactory};
use std::time::Duration;

/// Errors raised by [`ProcessBridge::execute`](crate::ProcessBridge::execute).
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A previous command has not completed yet.
    #[error("a command is already in flight")]
    AlreadyRunning,

    /// The worker did not reply in time and was killed.
    #[error("worker timed out after {after:?}")]
    Timeout { after: Duration },

    /// [`ProcessBridge::cancel`](crate::ProcessBridge::cancel) killed the worker.
    #[error("command cancelled")]
    Cancelled,

    /// The worker exited non-zero without a parseable response.
    #[error("worker exited with {exit_code:?}: {stderr}")]
    ProcessTerminatedWithError {
        /// `None` when the worker was killed by a signal.
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The worker could not be launched.
    #[error("failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Pipe I/O with the worker failed.
    #[error("worker I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command could not be serialized.
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    /// The worker exited cleanly but its output was not a valid response.
    #[error("malformed worker response: {0}")]
    MalformedResponse(DomainError),

    /// The worker replied `success:false`.
    #[error("operation failed: {0}")]
    Operation(DomainError),
}

impl BridgeError {
    /// Converts into exactly one [`DomainError`].
    ///
    /// Errors that already carry a `DomainError` pass it through unchanged.
    pub fn into_domain_error(self) -> DomainError {
        match self {
            Self::MalformedResponse(err) | Self::Operation(err) => err,
            Self::AlreadyRunning => ErrorFactory::from_code(catalog::ALREADY_RUNNING, ""),
            Self::Timeout { after } => ErrorFactory::from_code(
                catalog::TIMEOUT,
                format!("no response after {}s", after.as_secs_f64()),
            ),
            Self::Cancelled => ErrorFactory::from_code(catalog::CANCELLED, ""),
            Self::ProcessTerminatedWithError { exit_code, stderr } => {
                ErrorFactory::from_process_failure(exit_code, &stderr)
            }
            Self::SpawnFailed { program, source } => {
                let code = match source.kind() {
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                        catalog::BINARY_NOT_FOUND
                    }
                    _ => catalog::SPAWN_FAILED,
                };
                ErrorFactory::from_code(code, format!("{program}: {source}"))
            }
            Self::Io(e) => ErrorFactory::from_code(catalog::PROCESS_CRASHED, e.to_string()),
            Self::Encode(e) => ErrorFactory::from_code(catalog::INVALID_PARAMETER, e.to_string()),
        }
    }
}

impl From<BridgeError> for DomainError {
    fn from(err: BridgeError) -> Self {
        err.into_domain_error()
    }
}
