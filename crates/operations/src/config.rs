// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tool configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! [worker]
//! program = "/usr/local/bin/whisper-worker"
//! entry_argument = "bridge"
//! timeout_secs = 3600
//!
//! [admission]
//! memory_warning_percent = 80.0
//! memory_critical_percent = 90.0
//! disk_warning = "5G"
//! disk_critical = "2G"
//!
//! [telemetry]
//! volume = "/home/me/transcriptions"
//! sample_timeout_ms = 500
//!
//! [models]
//! dir = "/home/me/whisper_models"
//! default = "large-v3-turbo"
//!
//! [output]
//! dir = "/home/me/transcriptions"
//! ```
//!
//! Every section and field is optional.

use crate::models::{self, DEFAULT_MODEL};
use crate::ConfigError;
use admission::AdmissionConfig;
use process_bridge::BridgeConfig;
use resource_monitor::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the whole tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub worker: BridgeConfig,
    pub admission: AdmissionConfig,
    pub telemetry: TelemetryConfig,
    pub models: ModelsConfig,
    pub output: OutputConfig,
}

/// Where models live and which one is used by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub dir: PathBuf,
    #[serde(rename = "default")]
    pub default_model: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: home_dir().join("whisper_models"),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Where derived output files are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: home_dir().join("transcriptions"),
        }
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

impl ToolConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.admission.validate()?;
        if models::lookup(&self.models.default_model).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown default model '{}'",
                self.models.default_model
            )));
        }
        if self.worker.timeout().is_zero() {
            return Err(ConfigError::Invalid("worker.timeout_secs must be positive".into()));
        }
        if self.worker.entry_argument.trim().is_empty() {
            return Err(ConfigError::Invalid("worker.entry_argument must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admission::ByteSize;

    #[test]
    fn test_default() {
        let c = ToolConfig::default();
        assert_eq!(c.models.default_model, "large-v3-turbo");
        assert_eq!(c.worker.timeout_secs, 3600);
        assert_eq!(c.admission.memory_critical_percent, 90.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
[worker]
program = "/opt/whisper/worker"
extra_args = ["--threads", "4"]
timeout_secs = 120

[admission]
disk_warning = "10G"

[models]
dir = "/srv/models"
default = "base"
"#;
        let c = ToolConfig::from_toml(toml).unwrap();
        assert_eq!(c.worker.program, PathBuf::from("/opt/whisper/worker"));
        assert_eq!(c.worker.extra_args, vec!["--threads", "4"]);
        assert_eq!(c.worker.entry_argument, "bridge");
        assert_eq!(c.admission.disk_warning, ByteSize::from_gb(10));
        assert_eq!(c.admission.disk_critical, ByteSize::from_gb(2));
        assert_eq!(c.models.dir, PathBuf::from("/srv/models"));
        assert_eq!(c.models.default_model, "base");
        assert_eq!(c.telemetry.sample_timeout_ms, 500);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let c = ToolConfig::from_toml("").unwrap();
        assert_eq!(c.models.default_model, DEFAULT_MODEL);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = ToolConfig::default();
        let toml = c.to_toml().unwrap();
        let back = ToolConfig::from_toml(&toml).unwrap();
        assert_eq!(back.admission, c.admission);
        assert_eq!(back.models.dir, c.models.dir);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ToolConfig::from_toml("[models]\ndefault = \"enormous\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ToolConfig::from_toml("[worker]\ntimeout_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ToolConfig::from_toml("[admission]\nmemory_warning_percent = 99.0"),
            Err(ConfigError::Admission(_))
        ));
        assert!(matches!(
            ToolConfig::from_toml("[worker]\ntimeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wbridge.toml");
        std::fs::write(&path, "[output]\ndir = \"/data/out\"\n").unwrap();
        let c = ToolConfig::from_file(&path).unwrap();
        assert_eq!(c.output.dir, PathBuf::from("/data/out"));

        assert!(matches!(
            ToolConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
