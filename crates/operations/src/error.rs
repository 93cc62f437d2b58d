// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tool configuration.
//!
//! Operations themselves fail with [`DomainError`]; only loading and
//! validating a [`ToolConfig`](crate::ToolConfig) uses [`ConfigError`].

use error_taxonomy::{catalog, DomainError, ErrorFactory};

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The TOML was malformed or had wrong types.
    #[error("TOML parse error: {0}")]
    Parse(String),

    /// The configuration could not be serialised.
    #[error("TOML serialise error: {0}")]
    Serialize(String),

    /// Values parsed but are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Admission(#[from] admission::AdmissionError),
}

impl From<ConfigError> for DomainError {
    fn from(err: ConfigError) -> Self {
        ErrorFactory::from_code(catalog::CONFIG_INVALID, err.to_string())
    }
}
