// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The single conversion point from raw failure signals to [`DomainError`].
//!
//! | Source | Entry point |
//! |---|---|
//! | Worker exit code + stderr | [`ErrorFactory::from_process_failure`] |
//! | Telemetry threshold violated | [`ErrorFactory::from_resource_violation`] |
//! | Unparseable worker output | [`ErrorFactory::from_malformed_response`] |
//! | `success:false` response | [`ErrorFactory::from_response_code`] |
//! | Host-side validation | [`ErrorFactory::from_code`] |

use crate::catalog::{self, CatalogEntry};
use crate::DomainError;
use std::fmt;

/// Exit status a POSIX shell uses for "command not found".
const EXIT_NOT_FOUND: i32 = 127;
/// Exit status a POSIX shell uses for "found but not executable".
const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Maximum characters of raw worker output kept as context.
const MAX_CONTEXT_CHARS: usize = 512;

/// Which resource a violation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Quantities in bytes.
    Memory,
    /// Quantities in bytes.
    Disk,
    /// Quantities are pressure levels (0 = nominal … 3 = critical).
    Thermal,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Disk => f.write_str("disk"),
            Self::Thermal => f.write_str("thermal"),
        }
    }
}

/// Stateless constructor of [`DomainError`] values.
pub struct ErrorFactory;

impl ErrorFactory {
    /// Classifies a worker that exited without a usable response.
    ///
    /// A known machine code embedded in stderr wins. Otherwise shell exit
    /// statuses 126/127 mean the executable is missing, and anything else
    /// is a `process-bridge` crash.
    pub fn from_process_failure(exit_code: Option<i32>, stderr: &str) -> DomainError {
        let status = match exit_code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };
        let context = join_context(&status, stderr);

        if let Some(entry) = scan_for_code(stderr) {
            tracing::debug!(code = entry.code, "classified process failure from stderr");
            return DomainError::from_entry(entry).with_context(context);
        }

        let code = match exit_code {
            Some(EXIT_NOT_FOUND | EXIT_NOT_EXECUTABLE) => catalog::BINARY_NOT_FOUND,
            _ => catalog::PROCESS_CRASHED,
        };
        tracing::debug!(code, "classified process failure from exit status");
        Self::from_code(code, context)
    }

    /// Builds a `system-resource` error for a violated threshold.
    pub fn from_resource_violation(
        kind: ResourceKind,
        required: u64,
        available: u64,
    ) -> DomainError {
        let (code, context) = match kind {
            ResourceKind::Memory => (
                catalog::INSUFFICIENT_MEMORY,
                format!(
                    "memory required {} MB, available {} MB",
                    to_mb(required),
                    to_mb(available)
                ),
            ),
            ResourceKind::Disk => (
                catalog::INSUFFICIENT_DISK_SPACE,
                format!(
                    "disk required {} MB, available {} MB",
                    to_mb(required),
                    to_mb(available)
                ),
            ),
            ResourceKind::Thermal => (
                catalog::THERMAL_THROTTLING,
                format!("thermal pressure level {available} exceeds limit {required}"),
            ),
        };
        Self::from_code(code, context)
    }

    /// Builds the error for worker output that is not a valid response.
    /// Never recoverable by retrying.
    pub fn from_malformed_response(raw: &str) -> DomainError {
        let excerpt = truncate(raw.trim(), MAX_CONTEXT_CHARS);
        let context = if excerpt.is_empty() {
            "worker produced no output".to_string()
        } else {
            format!("worker output: {excerpt}")
        };
        Self::from_code(catalog::INVALID_RESPONSE, context).with_recoverable(false)
    }

    /// Classifies a `success:false` response purely from its `code` field.
    ///
    /// Unknown codes, and codes only the host may raise, become
    /// `UNKNOWN_ERROR` with the raw code kept in the context.
    pub fn from_response_code(code: Option<&str>, message: Option<&str>) -> DomainError {
        let entry = code
            .and_then(catalog::lookup_reported)
            .unwrap_or_else(|| catalog::resolve(None));
        let mut context = message.unwrap_or_default().to_string();
        if entry.code == catalog::UNKNOWN_ERROR {
            if let Some(raw) = code.filter(|c| *c != catalog::UNKNOWN_ERROR) {
                context = join_context(&format!("worker code {raw}"), &context);
            }
        }
        DomainError::from_entry(entry).with_context(context)
    }

    /// Builds the catalog error for `code` with free-text context.
    /// Unknown codes resolve to `UNKNOWN_ERROR`.
    pub fn from_code(code: &str, context: impl Into<String>) -> DomainError {
        DomainError::from_entry(catalog::resolve(Some(code))).with_context(context)
    }
}

/// Finds the first worker-reportable code appearing as a whole token in
/// `text`. Host-only codes such as `CANCELLED` are skipped.
fn scan_for_code(text: &str) -> Option<&'static CatalogEntry> {
    text.split(|c: char| !(c.is_ascii_uppercase() || c == '_'))
        .filter(|token| token.len() > 3)
        .find_map(catalog::lookup_reported)
}

fn join_context(head: &str, tail: &str) -> String {
    let tail = truncate(tail.trim(), MAX_CONTEXT_CHARS);
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{head}: {tail}")
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn to_mb(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorCategory, Severity};

    #[test]
    fn test_process_failure_known_code() {
        let err = ErrorFactory::from_process_failure(
            Some(1),
            "Traceback...\nERROR FILE_NOT_FOUND: /tmp/a.wav\n",
        );
        assert_eq!(err.code(), "FILE_NOT_FOUND");
        assert_eq!(err.category(), ErrorCategory::FileProcessing);
        assert!(err.context().unwrap().starts_with("exit code 1"));
    }

    #[test]
    fn test_process_failure_unknown_defaults_to_bridge_high() {
        let err = ErrorFactory::from_process_failure(Some(3), "segmentation fault");
        assert_eq!(err.code(), "PROCESS_CRASHED");
        assert_eq!(err.category(), ErrorCategory::ProcessBridge);
        assert_eq!(err.severity(), Severity::High);
        assert_eq!(err.context(), Some("exit code 3: segmentation fault"));
    }

    #[test]
    fn test_process_failure_missing_binary() {
        let err = ErrorFactory::from_process_failure(Some(127), "sh: whisper: not found");
        assert_eq!(err.code(), "BINARY_NOT_FOUND");
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_process_failure_signal() {
        let err = ErrorFactory::from_process_failure(None, "");
        assert_eq!(err.code(), "PROCESS_CRASHED");
        assert_eq!(err.context(), Some("terminated by signal"));
    }

    #[test]
    fn test_code_must_be_whole_token() {
        assert!(scan_for_code("XFILE_NOT_FOUNDX").is_none());
        assert!(scan_for_code("lowercase file_not_found").is_none());
        assert_eq!(scan_for_code("[MODEL_CORRUPTED]").unwrap().code, "MODEL_CORRUPTED");
    }

    #[test]
    fn test_stderr_cannot_claim_host_only_codes() {
        let stderr = "ffmpeg: stream CANCELLED by decoder";
        let err = ErrorFactory::from_process_failure(Some(1), stderr);
        assert_eq!(err.code(), "PROCESS_CRASHED");

        let err = ErrorFactory::from_process_failure(Some(1), "TIMEOUT reading input");
        assert_eq!(err.code(), "PROCESS_CRASHED");

        // A reportable code later in the text still wins.
        let err = ErrorFactory::from_process_failure(Some(1), "CANCELLED: MODEL_CORRUPTED");
        assert_eq!(err.code(), "MODEL_CORRUPTED");
    }

    #[test]
    fn test_response_cannot_claim_host_only_codes() {
        for code in ["CANCELLED", "TIMEOUT", "ALREADY_RUNNING", "SPAWN_FAILED"] {
            let err = ErrorFactory::from_response_code(Some(code), Some("stopped"));
            assert_eq!(err.code(), "UNKNOWN_ERROR", "{code}");
            assert_eq!(err.context(), Some(format!("worker code {code}: stopped").as_str()));
        }
    }

    #[test]
    fn test_resource_violation_severity() {
        let mem = ErrorFactory::from_resource_violation(ResourceKind::Memory, 4 << 30, 1 << 30);
        assert_eq!(mem.category(), ErrorCategory::SystemResource);
        assert_eq!(mem.severity(), Severity::Critical);
        assert_eq!(mem.context(), Some("memory required 4096 MB, available 1024 MB"));

        let disk = ErrorFactory::from_resource_violation(ResourceKind::Disk, 20 << 20, 15 << 20);
        assert_eq!(disk.code(), "INSUFFICIENT_DISK_SPACE");
        assert_eq!(disk.severity(), Severity::Critical);

        let thermal = ErrorFactory::from_resource_violation(ResourceKind::Thermal, 2, 3);
        assert_eq!(thermal.severity(), Severity::High);
    }

    #[test]
    fn test_malformed_response() {
        let err = ErrorFactory::from_malformed_response("hello, not json");
        assert_eq!(err.category(), ErrorCategory::ProcessBridge);
        assert_eq!(err.severity(), Severity::High);
        assert!(!err.is_recoverable());
        assert!(err.context().unwrap().contains("hello, not json"));
    }

    #[test]
    fn test_malformed_response_truncated() {
        let raw = "é".repeat(2000);
        let err = ErrorFactory::from_malformed_response(&raw);
        assert!(err.context().unwrap().chars().count() < 600);
    }

    #[test]
    fn test_response_code_total_mapping() {
        let cases = [
            (Some("FILE_NOT_FOUND"), ErrorCategory::FileProcessing),
            (Some("MODEL_NOT_FOUND"), ErrorCategory::ModelManagement),
            (Some("INSUFFICIENT_MEMORY"), ErrorCategory::SystemResource),
            (Some("INVALID_PARAMETER"), ErrorCategory::UserInput),
            (Some("DEPENDENCY_MISSING"), ErrorCategory::Configuration),
            (Some("SOMETHING_NEW"), ErrorCategory::ProcessBridge),
            (None, ErrorCategory::ProcessBridge),
        ];
        for (code, category) in cases {
            let err = ErrorFactory::from_response_code(code, Some("message"));
            assert_eq!(err.category(), category, "{code:?}");
        }
    }

    #[test]
    fn test_response_code_unknown_keeps_raw_code() {
        let err = ErrorFactory::from_response_code(Some("GPU_ON_FIRE"), Some("boom"));
        assert_eq!(err.code(), "UNKNOWN_ERROR");
        assert_eq!(err.context(), Some("worker code GPU_ON_FIRE: boom"));
    }
}
