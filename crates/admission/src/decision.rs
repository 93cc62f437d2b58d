// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Admission outcomes.

use error_taxonomy::{DomainError, ErrorFactory, ResourceKind};
use std::fmt;

/// Which signal produced a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Memory,
    Disk,
    Thermal,
    /// The telemetry itself is stale or unavailable.
    Telemetry,
}

/// One finding behind a warning or rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionReason {
    pub signal: Signal,
    /// Amount required, or the allowed limit (bytes, or a thermal level).
    pub required: u64,
    /// Amount available, or the observed value (bytes, or a thermal level).
    pub available: u64,
    pub message: String,
}

impl AdmissionReason {
    pub(crate) fn new(signal: Signal, required: u64, available: u64, message: String) -> Self {
        Self {
            signal,
            required,
            available,
            message,
        }
    }

    /// The classified error for this reason, if it concerns a resource.
    pub fn to_domain_error(&self) -> Option<DomainError> {
        let kind = match self.signal {
            Signal::Memory => ResourceKind::Memory,
            Signal::Disk => ResourceKind::Disk,
            Signal::Thermal => ResourceKind::Thermal,
            Signal::Telemetry => return None,
        };
        Some(ErrorFactory::from_resource_violation(kind, self.required, self.available))
    }
}

impl fmt::Display for AdmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Whether a command may be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    /// Dispatch, but surface these warnings to the user.
    ProceedWithWarning(Vec<AdmissionReason>),
    /// Do not dispatch.
    Reject(Vec<AdmissionReason>),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Reject(_))
    }

    pub fn reasons(&self) -> &[AdmissionReason] {
        match self {
            Self::Proceed => &[],
            Self::ProceedWithWarning(r) | Self::Reject(r) => r,
        }
    }

    /// Converts into the enforcement form: warnings on success, the most
    /// severe reason's error on rejection.
    pub fn into_result(self) -> Result<Vec<AdmissionReason>, DomainError> {
        match self {
            Self::Proceed => Ok(Vec::new()),
            Self::ProceedWithWarning(warnings) => Ok(warnings),
            Self::Reject(reasons) => Err(most_severe(&reasons)),
        }
    }
}

/// Picks the highest-severity error; the first reason wins ties.
fn most_severe(reasons: &[AdmissionReason]) -> DomainError {
    let mut best: Option<DomainError> = None;
    for err in reasons.iter().filter_map(AdmissionReason::to_domain_error) {
        if best.as_ref().map_or(true, |b| err.severity() > b.severity()) {
            best = Some(err);
        }
    }
    best.unwrap_or_else(|| {
        ErrorFactory::from_code(
            error_taxonomy::catalog::UNKNOWN_ERROR,
            "admission rejected without a resource reason",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_taxonomy::Severity;

    fn reason(signal: Signal) -> AdmissionReason {
        AdmissionReason::new(signal, 2, 3, format!("{signal:?}"))
    }

    #[test]
    fn test_reject_picks_most_severe() {
        let decision = Decision::Reject(vec![reason(Signal::Thermal), reason(Signal::Disk)]);
        let err = decision.into_result().unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_DISK_SPACE");
        assert_eq!(err.severity(), Severity::Critical);
    }

    #[test]
    fn test_first_wins_ties() {
        let decision = Decision::Reject(vec![reason(Signal::Memory), reason(Signal::Disk)]);
        assert_eq!(decision.into_result().unwrap_err().code(), "INSUFFICIENT_MEMORY");
    }

    #[test]
    fn test_warnings_pass_through() {
        let decision = Decision::ProceedWithWarning(vec![reason(Signal::Telemetry)]);
        assert!(decision.is_allowed());
        assert_eq!(decision.into_result().unwrap().len(), 1);
        assert!(Decision::Proceed.into_result().unwrap().is_empty());
    }
}
