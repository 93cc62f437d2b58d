// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Worker invocation settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How to launch the worker and how long to wait for it.
///
/// The worker is invoked as `<program> <entry_argument> [extra_args...]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Worker executable.
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Fixed argument naming the command entry point.
    #[serde(default = "default_entry_argument")]
    pub entry_argument: String,
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Working directory for the worker; inherits the host's when `None`.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Seconds to wait for a response before killing the worker.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay before the single retry of a transiently failed spawn.
    #[serde(default = "default_spawn_retry_delay_ms")]
    pub spawn_retry_delay_ms: u64,
    /// Finer-grained timeout set programmatically; takes precedence over `timeout_secs`.
    #[serde(skip)]
    timeout_override: Option<Duration>,
}

fn default_program() -> PathBuf {
    PathBuf::from("whisper-worker")
}

fn default_entry_argument() -> String {
    "bridge".to_string()
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_spawn_retry_delay_ms() -> u64 {
    250
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            entry_argument: default_entry_argument(),
            extra_args: Vec::new(),
            working_dir: None,
            timeout_secs: default_timeout_secs(),
            spawn_retry_delay_ms: default_spawn_retry_delay_ms(),
            timeout_override: None,
        }
    }
}

impl BridgeConfig {
    /// Config for a given worker program with every other field defaulted.
    pub fn for_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Sets the timeout exactly. `timeout_secs` keeps a whole-second value
    /// rounded up, so a serialized config never holds a zero timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let whole = timeout.as_secs();
        self.timeout_secs = if timeout.subsec_nanos() > 0 { whole + 1 } else { whole };
        self.timeout_override = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_override
            .unwrap_or_else(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn spawn_retry_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_retry_delay_ms)
    }
}
