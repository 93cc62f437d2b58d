// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for resource monitoring.
//!
//! These never escape [`TelemetryProvider::sample`](crate::TelemetryProvider::sample):
//! the provider logs them and falls back to the last good snapshot.

/// Errors that can occur when reading system resources.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Failed to read a sysfs or procfs file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse a numeric value from a system file.
    #[error("failed to parse value from {path}: {detail}")]
    ParseError { path: String, detail: String },

    /// The expected sysfs/procfs path does not exist on this platform.
    #[error("system path not found: {path}")]
    NotAvailable { path: String },

    /// No mounted volume contains the requested path.
    #[error("no mounted volume found for {path}")]
    VolumeNotFound { path: String },

    /// A read did not complete within the sampling budget.
    #[error("telemetry read exceeded {budget_ms} ms")]
    Timeout { budget_ms: u64 },

    /// An earlier read that overran its budget has not finished yet.
    #[error("previous telemetry read still outstanding")]
    Busy,
}
