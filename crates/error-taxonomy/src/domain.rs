// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The normalized error value surfaced to callers.
//!
//! A [`DomainError`] is built once where the failure is detected and is
//! immutable afterwards: fields are private and the only "modifiers"
//! consume `self` during construction.

use crate::catalog::CatalogEntry;
use crate::{ErrorCategory, InvalidDomainError, Severity};

/// A categorized, severity-ranked, user-presentable error.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
#[error("[{code}] {description}")]
pub struct DomainError {
    category: ErrorCategory,
    severity: Severity,
    code: String,
    description: String,
    recovery_suggestion: String,
    help_anchor: String,
    recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

impl DomainError {
    /// Builds a validated error.
    ///
    /// The help anchor is derived from category and code; recoverability
    /// defaults to `true` for severities below `Critical`.
    pub fn new(
        category: ErrorCategory,
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
        recovery_suggestion: impl Into<String>,
    ) -> Result<Self, InvalidDomainError> {
        let code = code.into();
        let description = description.into();
        let recovery_suggestion = recovery_suggestion.into();

        if code.trim().is_empty() {
            return Err(InvalidDomainError::EmptyCode);
        }
        if description.trim().is_empty() {
            return Err(InvalidDomainError::EmptyDescription { code });
        }
        if recovery_suggestion.trim().is_empty() {
            return Err(InvalidDomainError::EmptyRecoverySuggestion { code });
        }

        Ok(Self {
            help_anchor: help_anchor(category, &code),
            category,
            severity,
            code,
            description,
            recovery_suggestion,
            recoverable: severity < Severity::Critical,
            context: None,
        })
    }

    /// Builds an error from a catalog entry. Entries are validated by tests.
    pub(crate) fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            category: entry.category,
            severity: entry.severity,
            code: entry.code.to_string(),
            description: entry.description.to_string(),
            recovery_suggestion: entry.recovery.to_string(),
            help_anchor: help_anchor(entry.category, entry.code),
            recoverable: entry.recoverable,
            context: None,
        }
    }

    /// Attaches free-text context such as captured stderr or a file path.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        if !context.trim().is_empty() {
            self.context = Some(context);
        }
        self
    }

    pub fn with_recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Machine-readable code, e.g. `FILE_NOT_FOUND`.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn recovery_suggestion(&self) -> &str {
        &self.recovery_suggestion
    }

    /// Stable anchor into user documentation, e.g. `file-processing#file-not-found`.
    pub fn help_anchor(&self) -> &str {
        &self.help_anchor
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// True for critical `system-resource` errors, the ones that feed
    /// restart escalation.
    pub fn is_critical_resource(&self) -> bool {
        self.category == ErrorCategory::SystemResource && self.severity == Severity::Critical
    }

    /// Multi-line text for terminal display.
    pub fn user_message(&self) -> String {
        let mut out = format!(
            "{} ({}, {})\n  Suggestion: {}",
            self.description, self.category, self.severity, self.recovery_suggestion
        );
        if let Some(ctx) = &self.context {
            out.push_str("\n  Details: ");
            out.push_str(ctx);
        }
        out
    }
}

fn help_anchor(category: ErrorCategory, code: &str) -> String {
    format!(
        "{}#{}",
        category.as_str(),
        code.to_ascii_lowercase().replace('_', "-")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_description() {
        let err = DomainError::new(
            ErrorCategory::UserInput,
            Severity::Low,
            "INVALID_INPUT",
            "  ",
            "Fix it",
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidDomainError::EmptyDescription {
                code: "INVALID_INPUT".into()
            }
        );
    }

    #[test]
    fn test_new_validates_recovery() {
        let err = DomainError::new(
            ErrorCategory::UserInput,
            Severity::Low,
            "INVALID_INPUT",
            "Bad input",
            "",
        )
        .unwrap_err();
        assert!(matches!(err, InvalidDomainError::EmptyRecoverySuggestion { .. }));
    }

    #[test]
    fn test_new_validates_code() {
        let err = DomainError::new(ErrorCategory::UserInput, Severity::Low, "", "a", "b");
        assert_eq!(err.unwrap_err(), InvalidDomainError::EmptyCode);
    }

    #[test]
    fn test_help_anchor_and_display() {
        let err = DomainError::new(
            ErrorCategory::FileProcessing,
            Severity::Medium,
            "FILE_NOT_FOUND",
            "The file could not be found.",
            "Check the path.",
        )
        .unwrap();
        assert_eq!(err.help_anchor(), "file-processing#file-not-found");
        assert_eq!(err.to_string(), "[FILE_NOT_FOUND] The file could not be found.");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_critical_defaults_unrecoverable() {
        let err = DomainError::new(
            ErrorCategory::SystemResource,
            Severity::Critical,
            "INSUFFICIENT_MEMORY",
            "Not enough memory.",
            "Close other applications.",
        )
        .unwrap();
        assert!(!err.is_recoverable());
        assert!(err.is_critical_resource());
    }

    #[test]
    fn test_blank_context_ignored() {
        let err = DomainError::new(ErrorCategory::UserInput, Severity::Low, "X", "a", "b")
            .unwrap()
            .with_context("   ");
        assert_eq!(err.context(), None);
    }

    #[test]
    fn test_serializes_for_reporting() {
        let err = DomainError::new(ErrorCategory::Configuration, Severity::High, "X", "a", "b")
            .unwrap()
            .with_context("stderr text");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["category"], "configuration");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["context"], "stderr text");
    }
}
