// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for admission configuration.
//!
//! Admission *decisions* never fail; a rejection is a
//! [`Decision::Reject`](crate::Decision::Reject). These errors only cover
//! invalid configuration.

/// Errors in admission configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdmissionError {
    /// A size string could not be parsed.
    #[error("invalid size '{input}': expected a number with an optional K, M, G or T suffix")]
    InvalidSize { input: String },

    /// A size overflowed 64 bits.
    #[error("size overflow: '{input}'")]
    SizeOverflow { input: String },

    /// Thresholds are inconsistent with each other.
    #[error("invalid admission thresholds: {0}")]
    InvalidThresholds(String),
}
