// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Static catalog of machine-readable error codes.
//!
//! Every code the worker or the host can emit has exactly one entry here,
//! which fixes its category, severity, recoverability and user text. The
//! mapping from code to category is total: unknown codes resolve to
//! [`UNKNOWN_ERROR`] in the `process-bridge` category.

use crate::{ErrorCategory, Severity};

/// One row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: &'static str,
    pub category: ErrorCategory,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recovery: &'static str,
}

pub const FILE_NOT_FOUND: &str = "FILE_NOT_FOUND";
pub const UNSUPPORTED_FORMAT: &str = "UNSUPPORTED_FORMAT";
pub const FILE_READ_ERROR: &str = "FILE_READ_ERROR";
pub const FILE_WRITE_ERROR: &str = "FILE_WRITE_ERROR";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const TRANSCRIPTION_FAILED: &str = "TRANSCRIPTION_FAILED";
pub const AUDIO_EXTRACTION_FAILED: &str = "AUDIO_EXTRACTION_FAILED";
pub const MODEL_NOT_FOUND: &str = "MODEL_NOT_FOUND";
pub const MODEL_DOWNLOAD_FAILED: &str = "MODEL_DOWNLOAD_FAILED";
pub const MODEL_CORRUPTED: &str = "MODEL_CORRUPTED";
pub const MODEL_LOAD_FAILED: &str = "MODEL_LOAD_FAILED";
pub const INSUFFICIENT_MEMORY: &str = "INSUFFICIENT_MEMORY";
pub const INSUFFICIENT_DISK_SPACE: &str = "INSUFFICIENT_DISK_SPACE";
pub const THERMAL_THROTTLING: &str = "THERMAL_THROTTLING";
pub const PROCESS_CRASHED: &str = "PROCESS_CRASHED";
pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
pub const TIMEOUT: &str = "TIMEOUT";
pub const CANCELLED: &str = "CANCELLED";
pub const ALREADY_RUNNING: &str = "ALREADY_RUNNING";
pub const SPAWN_FAILED: &str = "SPAWN_FAILED";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
pub const INVALID_INPUT: &str = "INVALID_INPUT";
pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
pub const UNSUPPORTED_LANGUAGE: &str = "UNSUPPORTED_LANGUAGE";
pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
pub const DEPENDENCY_MISSING: &str = "DEPENDENCY_MISSING";
pub const BINARY_NOT_FOUND: &str = "BINARY_NOT_FOUND";

const fn entry(
    code: &'static str,
    category: ErrorCategory,
    severity: Severity,
    recoverable: bool,
    description: &'static str,
    recovery: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        code,
        category,
        severity,
        recoverable,
        description,
        recovery,
    }
}

use ErrorCategory::*;
use Severity::*;

#[rustfmt::skip]
pub static CATALOG: &[CatalogEntry] = &[
    // file-processing
    entry(FILE_NOT_FOUND, FileProcessing, Medium, true,
        "The input file could not be found.",
        "Check that the file exists and the path is spelled correctly."),
    entry(UNSUPPORTED_FORMAT, FileProcessing, Medium, true,
        "The file format is not supported.",
        "Convert the file to a supported audio (wav, mp3, flac, ogg, opus, m4a) or video (mp4, mov, mkv, avi, webm) format."),
    entry(FILE_READ_ERROR, FileProcessing, High, true,
        "The input file could not be read.",
        "Make sure the file is not open in another application and is not damaged."),
    entry(FILE_WRITE_ERROR, FileProcessing, High, true,
        "The output file could not be written.",
        "Choose a different output directory or free up disk space."),
    entry(PERMISSION_DENIED, FileProcessing, High, true,
        "Access to the file was denied.",
        "Grant read access to the input and write access to the output directory."),
    entry(TRANSCRIPTION_FAILED, FileProcessing, High, true,
        "Transcription of the file failed.",
        "Try again with a smaller model or check that the audio track is not empty."),
    entry(AUDIO_EXTRACTION_FAILED, FileProcessing, High, true,
        "The audio track could not be extracted from the video.",
        "Check that the video contains an audio track and that ffmpeg is installed."),
    // model-management
    entry(MODEL_NOT_FOUND, ModelManagement, Medium, true,
        "The requested model is not available.",
        "Download the model first or pick one from the list of installed models."),
    entry(MODEL_DOWNLOAD_FAILED, ModelManagement, Medium, true,
        "The model download failed.",
        "Check the network connection and retry the download."),
    entry(MODEL_CORRUPTED, ModelManagement, High, true,
        "The model file is corrupted.",
        "Delete the model file and download it again."),
    entry(MODEL_LOAD_FAILED, ModelManagement, High, true,
        "The model could not be loaded.",
        "Free up memory or choose a smaller model."),
    // system-resource
    entry(INSUFFICIENT_MEMORY, SystemResource, Critical, false,
        "There is not enough free memory for this operation.",
        "Close other applications or choose a smaller model."),
    entry(INSUFFICIENT_DISK_SPACE, SystemResource, Critical, false,
        "There is not enough free disk space for this operation.",
        "Free up space on the output volume or choose another output directory."),
    entry(THERMAL_THROTTLING, SystemResource, High, true,
        "The system is too hot to start this operation.",
        "Let the machine cool down for a few minutes and try again."),
    // process-bridge
    entry(PROCESS_CRASHED, ProcessBridge, High, true,
        "The worker process terminated unexpectedly.",
        "Retry the operation; if it keeps failing, reinstall the worker."),
    entry(INVALID_RESPONSE, ProcessBridge, High, false,
        "The worker process returned a response that could not be understood.",
        "Update the application so that host and worker versions match."),
    entry(TIMEOUT, ProcessBridge, High, true,
        "The operation did not finish within the time limit.",
        "Split the file into shorter parts or raise the timeout in the configuration."),
    entry(CANCELLED, ProcessBridge, Low, true,
        "The operation was cancelled.",
        "Start the operation again when ready."),
    entry(ALREADY_RUNNING, ProcessBridge, Low, true,
        "Another operation is already running.",
        "Wait for the current operation to finish or cancel it."),
    entry(SPAWN_FAILED, ProcessBridge, High, true,
        "The worker process could not be started.",
        "Check that the worker executable exists and is executable."),
    entry(UNKNOWN_ERROR, ProcessBridge, High, true,
        "An unexpected error occurred in the worker process.",
        "Retry the operation and check the logs if the problem persists."),
    // user-input
    entry(INVALID_INPUT, UserInput, Low, true,
        "The input is not valid.",
        "Correct the input and try again."),
    entry(INVALID_PARAMETER, UserInput, Medium, true,
        "A parameter value is out of range.",
        "Adjust the parameter to a valid value and try again."),
    entry(UNSUPPORTED_LANGUAGE, UserInput, Low, true,
        "The requested language is not supported.",
        "Choose a supported language code or let the language be detected automatically."),
    // configuration
    entry(CONFIG_INVALID, Configuration, High, true,
        "The configuration is invalid.",
        "Fix the configuration file or delete it to restore defaults."),
    entry(DEPENDENCY_MISSING, Configuration, High, true,
        "A required dependency is missing.",
        "Install the missing dependency (for example ffmpeg or whisper.cpp)."),
    entry(BINARY_NOT_FOUND, Configuration, High, true,
        "The worker executable could not be found.",
        "Set worker.program in the configuration to the installed worker path."),
];

/// Looks up a code. Matching is exact and case-sensitive.
pub fn lookup(code: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.code == code)
}

/// Codes only the host raises. The bridge observes these conditions
/// itself, so a worker naming one is never taken at its word.
pub const HOST_ONLY: &[&str] = &[TIMEOUT, CANCELLED, ALREADY_RUNNING, SPAWN_FAILED];

pub fn is_host_only(code: &str) -> bool {
    HOST_ONLY.contains(&code)
}

/// Like [`lookup`], but ignores [`HOST_ONLY`] codes. Used for anything
/// the worker reports.
pub fn lookup_reported(code: &str) -> Option<&'static CatalogEntry> {
    lookup(code).filter(|e| !is_host_only(e.code))
}

/// Looks up a code, falling back to [`UNKNOWN_ERROR`].
pub fn resolve(code: Option<&str>) -> &'static CatalogEntry {
    code.and_then(lookup)
        .or_else(|| lookup(UNKNOWN_ERROR))
        .unwrap_or(&CATALOG[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;
    use std::collections::HashSet;

    #[test]
    fn test_every_entry_validates() {
        for e in CATALOG {
            DomainError::new(e.category, e.severity, e.code, e.description, e.recovery)
                .unwrap_or_else(|err| panic!("catalog entry invalid: {err}"));
        }
    }

    #[test]
    fn test_codes_unique() {
        let codes: HashSet<_> = CATALOG.iter().map(|e| e.code).collect();
        assert_eq!(codes.len(), CATALOG.len());
    }

    #[test]
    fn test_every_category_represented() {
        for category in ErrorCategory::ALL {
            assert!(CATALOG.iter().any(|e| e.category == category), "{category}");
        }
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(resolve(Some("NO_SUCH_CODE")).code, UNKNOWN_ERROR);
        assert_eq!(resolve(None).category, ErrorCategory::ProcessBridge);
        assert_eq!(resolve(Some(FILE_NOT_FOUND)).category, ErrorCategory::FileProcessing);
    }

    #[test]
    fn test_host_only_codes_not_reported() {
        for code in HOST_ONLY {
            assert!(lookup(code).is_some(), "{code}");
            assert!(lookup_reported(code).is_none(), "{code}");
        }
        assert_eq!(lookup_reported(PROCESS_CRASHED).unwrap().code, PROCESS_CRASHED);
        assert_eq!(lookup_reported(FILE_NOT_FOUND).unwrap().code, FILE_NOT_FOUND);
    }

    #[test]
    fn test_resource_exhaustion_is_critical() {
        assert_eq!(lookup(INSUFFICIENT_MEMORY).unwrap().severity, Severity::Critical);
        assert_eq!(lookup(INSUFFICIENT_DISK_SPACE).unwrap().severity, Severity::Critical);
        assert_eq!(lookup(THERMAL_THROTTLING).unwrap().severity, Severity::High);
    }
}
