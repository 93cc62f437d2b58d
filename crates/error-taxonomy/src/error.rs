// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Construction errors for [`DomainError`](crate::DomainError).

/// A [`DomainError`](crate::DomainError) failed validation.
///
/// This is a programming error: every user-facing error must be
/// presentable without further lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDomainError {
    #[error("domain error '{code}' has an empty description")]
    EmptyDescription { code: String },

    #[error("domain error '{code}' has an empty recovery suggestion")]
    EmptyRecoverySuggestion { code: String },

    #[error("domain error code must not be empty")]
    EmptyCode,
}
