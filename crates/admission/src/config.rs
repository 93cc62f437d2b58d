// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Admission thresholds.

use crate::{AdmissionError, ByteSize};
use serde::{Deserialize, Serialize};

/// Thresholds and safety multipliers for admission decisions.
///
/// Memory percentages gate admission directly. The absolute disk
/// thresholds only drive the qualitative [`ResourceStatus`](crate::ResourceStatus);
/// disk admission compares free space against the operation's estimated
/// output times the safety multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Memory usage (percent) at which a warning is attached.
    pub memory_warning_percent: f64,
    /// Memory usage (percent) at which commands are rejected.
    pub memory_critical_percent: f64,
    /// Free disk below which the status display shows a warning.
    pub disk_warning: ByteSize,
    /// Free disk below which the status display shows critical.
    pub disk_critical: ByteSize,
    /// Disk safety multiplier for single-file operations.
    pub single_file_multiplier: f64,
    /// Disk safety multiplier for batch operations.
    pub batch_multiplier: f64,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            memory_warning_percent: 80.0,
            memory_critical_percent: 90.0,
            disk_warning: ByteSize::from_gb(5),
            disk_critical: ByteSize::from_gb(2),
            single_file_multiplier: 2.0,
            batch_multiplier: 3.0,
        }
    }
}

impl AdmissionConfig {
    /// Checks that thresholds are in range and consistently ordered.
    pub fn validate(&self) -> Result<(), AdmissionError> {
        let in_range = |p: f64| p.is_finite() && p > 0.0 && p <= 100.0;
        if !in_range(self.memory_warning_percent) || !in_range(self.memory_critical_percent) {
            return Err(AdmissionError::InvalidThresholds(
                "memory percentages must be within (0, 100]".into(),
            ));
        }
        if self.memory_warning_percent > self.memory_critical_percent {
            return Err(AdmissionError::InvalidThresholds(format!(
                "memory warning {}% is above critical {}%",
                self.memory_warning_percent, self.memory_critical_percent
            )));
        }
        if self.disk_critical > self.disk_warning {
            return Err(AdmissionError::InvalidThresholds(format!(
                "disk critical {} is above warning {}",
                self.disk_critical, self.disk_warning
            )));
        }
        for (name, m) in [
            ("single_file_multiplier", self.single_file_multiplier),
            ("batch_multiplier", self.batch_multiplier),
        ] {
            if !m.is_finite() || m < 1.0 {
                return Err(AdmissionError::InvalidThresholds(format!(
                    "{name} must be at least 1.0, got {m}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let cfg = AdmissionConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.disk_warning, ByteSize::from_gb(5));
    }

    #[test]
    fn test_from_toml_fragment() {
        let cfg: AdmissionConfig = toml::from_str(
            r#"
            memory_critical_percent = 95.0
            disk_warning = "10G"
            disk_critical = 1073741824
            "#,
        )
        .unwrap();
        assert_eq!(cfg.memory_critical_percent, 95.0);
        assert_eq!(cfg.memory_warning_percent, 80.0);
        assert_eq!(cfg.disk_warning, ByteSize::from_gb(10));
        assert_eq!(cfg.disk_critical, ByteSize::from_gb(1));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let cfg = AdmissionConfig {
            memory_warning_percent: 95.0,
            ..AdmissionConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AdmissionConfig {
            disk_critical: ByteSize::from_gb(10),
            ..AdmissionConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AdmissionConfig {
            batch_multiplier: 0.5,
            ..AdmissionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
