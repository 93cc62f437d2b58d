// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The worker's reply.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One structured reply read from the worker's stdout.
///
/// Invariant: `success == false` implies `error` is present and `data`
/// absent; `success == true` implies `error` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

impl Response {
    /// A successful reply carrying `data`.
    pub fn ok(data: Map<String, Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// A failed reply with a machine code and message.
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: Some(code.into()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Parses worker stdout.
    ///
    /// The whole output is tried first. If the worker printed log noise
    /// before its reply, the last line that parses as a response wins.
    pub fn parse(stdout: &str) -> Option<Self> {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(response) = serde_json::from_str(trimmed) {
            return Some(response);
        }
        trimmed
            .lines()
            .rev()
            .map(str::trim)
            .filter(|line| line.starts_with('{'))
            .find_map(|line| serde_json::from_str(line).ok())
    }

    /// Checks the success/error/data invariant.
    pub fn validate(&self) -> Result<(), String> {
        match (self.success, &self.error, &self.data) {
            (false, None, _) => Err("failed response without an error message".into()),
            (false, Some(_), Some(_)) => Err("failed response carries data".into()),
            (true, Some(_), _) => Err("successful response carries an error".into()),
            _ => Ok(()),
        }
    }

    /// Returns `data[key]`, if present.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}
