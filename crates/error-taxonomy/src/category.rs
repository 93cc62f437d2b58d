// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error categories and severities.

use std::fmt;

/// The subsystem a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    FileProcessing,
    ModelManagement,
    SystemResource,
    ProcessBridge,
    UserInput,
    Configuration,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 6] = [
        Self::FileProcessing,
        Self::ModelManagement,
        Self::SystemResource,
        Self::ProcessBridge,
        Self::UserInput,
        Self::Configuration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileProcessing => "file-processing",
            Self::ModelManagement => "model-management",
            Self::SystemResource => "system-resource",
            Self::ProcessBridge => "process-bridge",
            Self::UserInput => "user-input",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a failure is. Totally ordered: `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        let mut levels = vec![
            Severity::Critical,
            Severity::Low,
            Severity::High,
            Severity::Medium,
        ];
        levels.sort();
        assert_eq!(
            levels,
            vec![
                Severity::Low,
                Severity::Medium,
                Severity::High,
                Severity::Critical
            ]
        );
        assert_eq!(levels.iter().max(), Some(&Severity::Critical));
    }

    #[test]
    fn test_category_serde_matches_display() {
        for category in ErrorCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{category}\""));
        }
    }
}
