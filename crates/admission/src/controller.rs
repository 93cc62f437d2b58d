// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The admission controller.
//!
//! # Policy
//!
//! | Signal | Reject when | Warn when |
//! |---|---|---|
//! | Disk | free < output × multiplier (2× single, 3× batch) | — |
//! | Memory | used ≥ critical %, or free < estimated need | used ≥ warning % |
//! | Thermal | pressure is critical | pressure is serious |
//! | Telemetry | never | snapshot is stale or unavailable |
//!
//! The disk comparison is inclusive: free space exactly equal to the
//! requirement proceeds. When telemetry is unavailable no resource check
//! can be made and the command proceeds with a warning.

use crate::{
    AdmissionConfig, AdmissionReason, CostKind, Decision, ResourceCost, ResourceReport, Signal,
};
use error_taxonomy::DomainError;
use resource_monitor::{Freshness, ResourceSnapshot, TelemetryProvider, ThermalPressure};
use std::sync::Arc;

const MB: u64 = 1024 * 1024;

/// Decides whether commands may reach the bridge, from fresh telemetry.
///
/// Holds no mutable state: every check takes a new sample. Clones share
/// the same telemetry provider.
#[derive(Clone)]
pub struct AdmissionController {
    config: AdmissionConfig,
    telemetry: Arc<dyn TelemetryProvider>,
}

impl AdmissionController {
    pub fn new(config: AdmissionConfig, telemetry: Arc<dyn TelemetryProvider>) -> Self {
        Self { config, telemetry }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Samples telemetry and decides on `cost`.
    pub fn check_before_dispatch(&self, cost: &ResourceCost) -> Decision {
        let snapshot = self.telemetry.sample();
        let decision = evaluate(&self.config, &snapshot, cost);
        match &decision {
            Decision::Proceed => tracing::debug!(summary = %snapshot.summary(), "admitted"),
            Decision::ProceedWithWarning(reasons) => {
                tracing::info!(
                    warnings = reasons.len(),
                    summary = %snapshot.summary(),
                    "admitted with warnings"
                )
            }
            Decision::Reject(reasons) => {
                let messages: Vec<&str> = reasons.iter().map(|r| r.message.as_str()).collect();
                tracing::warn!(reasons = ?messages, "rejected")
            }
        }
        decision
    }

    /// Enforcing form of [`check_before_dispatch`](Self::check_before_dispatch):
    /// returns warnings to surface, or the error that blocks dispatch.
    pub fn admit(&self, cost: &ResourceCost) -> Result<Vec<AdmissionReason>, DomainError> {
        self.check_before_dispatch(cost).into_result()
    }

    /// Current snapshot with qualitative status, for display.
    pub fn status(&self) -> ResourceReport {
        ResourceReport::classify(self.telemetry.sample(), &self.config)
    }
}

/// The pure admission policy over one snapshot.
pub fn evaluate(
    config: &AdmissionConfig,
    snapshot: &ResourceSnapshot,
    cost: &ResourceCost,
) -> Decision {
    let mut rejections = Vec::new();
    let mut warnings = Vec::new();

    match snapshot.freshness {
        Freshness::Unavailable => {
            return Decision::ProceedWithWarning(vec![AdmissionReason::new(
                Signal::Telemetry,
                0,
                0,
                "resource telemetry unavailable; proceeding without checks".to_string(),
            )]);
        }
        Freshness::Stale { age_ms } => warnings.push(AdmissionReason::new(
            Signal::Telemetry,
            0,
            age_ms,
            format!("resource readings are {age_ms} ms old"),
        )),
        Freshness::Live => {}
    }

    check_disk(config, snapshot, cost, &mut rejections);
    check_memory(config, snapshot, cost, &mut rejections, &mut warnings);
    check_thermal(snapshot, &mut rejections, &mut warnings);

    if !rejections.is_empty() {
        Decision::Reject(rejections)
    } else if !warnings.is_empty() {
        Decision::ProceedWithWarning(warnings)
    } else {
        Decision::Proceed
    }
}

fn check_disk(
    config: &AdmissionConfig,
    snapshot: &ResourceSnapshot,
    cost: &ResourceCost,
    rejections: &mut Vec<AdmissionReason>,
) {
    let multiplier = match cost.kind {
        CostKind::SingleFile => config.single_file_multiplier,
        CostKind::Batch => config.batch_multiplier,
    };
    let required = cost.required_disk(multiplier);
    let available = snapshot.disk_available_bytes();
    if available < required {
        rejections.push(AdmissionReason::new(
            Signal::Disk,
            required,
            available,
            format!(
                "{} MB free on {}, {} MB required",
                available / MB,
                snapshot.disk.mount_point.display(),
                required / MB
            ),
        ));
    }
}

fn check_memory(
    config: &AdmissionConfig,
    snapshot: &ResourceSnapshot,
    cost: &ResourceCost,
    rejections: &mut Vec<AdmissionReason>,
    warnings: &mut Vec<AdmissionReason>,
) {
    let used = snapshot.memory_used_percent();
    let available = snapshot.memory.available_bytes;

    if used >= config.memory_critical_percent {
        rejections.push(AdmissionReason::new(
            Signal::Memory,
            cost.memory_bytes,
            available,
            format!(
                "memory usage {used:.0}% is at or above the critical {:.0}%",
                config.memory_critical_percent
            ),
        ));
    } else if cost.memory_bytes > available {
        rejections.push(AdmissionReason::new(
            Signal::Memory,
            cost.memory_bytes,
            available,
            format!(
                "{} MB memory available, {} MB required",
                available / MB,
                cost.memory_bytes / MB
            ),
        ));
    } else if used >= config.memory_warning_percent {
        warnings.push(AdmissionReason::new(
            Signal::Memory,
            cost.memory_bytes,
            available,
            format!(
                "memory usage {used:.0}% is above the warning {:.0}%",
                config.memory_warning_percent
            ),
        ));
    }
}

fn check_thermal(
    snapshot: &ResourceSnapshot,
    rejections: &mut Vec<AdmissionReason>,
    warnings: &mut Vec<AdmissionReason>,
) {
    let pressure = snapshot.thermal_pressure();
    let observed = level(pressure);
    match pressure {
        ThermalPressure::Critical => rejections.push(AdmissionReason::new(
            Signal::Thermal,
            level(ThermalPressure::Serious),
            observed,
            "thermal pressure is critical".to_string(),
        )),
        ThermalPressure::Serious => warnings.push(AdmissionReason::new(
            Signal::Thermal,
            level(ThermalPressure::Serious),
            observed,
            "thermal pressure is serious; processing may be throttled".to_string(),
        )),
        ThermalPressure::Fair | ThermalPressure::Nominal => {}
    }
}

fn level(pressure: ThermalPressure) -> u64 {
    match pressure {
        ThermalPressure::Nominal => 0,
        ThermalPressure::Fair => 1,
        ThermalPressure::Serious => 2,
        ThermalPressure::Critical => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_taxonomy::{ErrorCategory, Severity};
    use resource_monitor::{DiskInfo, MemoryInfo, StaticTelemetry, ThermalInfo};
    use std::path::PathBuf;

    const GB: u64 = 1024 * MB;

    fn snapshot(mem_total: u64, mem_avail: u64, disk_free: u64, temp: f32) -> ResourceSnapshot {
        ResourceSnapshot::live(
            MemoryInfo::from_totals(mem_total, mem_avail),
            DiskInfo {
                mount_point: PathBuf::from("/"),
                available_bytes: disk_free,
                total_bytes: 100 * GB,
            },
            ThermalInfo::from_celsius(temp),
        )
    }

    fn healthy(disk_free: u64) -> ResourceSnapshot {
        snapshot(16 * GB, 12 * GB, disk_free, 45.0)
    }

    fn controller(snap: ResourceSnapshot) -> AdmissionController {
        AdmissionController::new(AdmissionConfig::default(), Arc::new(StaticTelemetry::new(snap)))
    }

    #[test]
    fn test_ten_mb_file_with_fifty_mb_free_proceeds() {
        let c = controller(healthy(50 * MB));
        let cost = ResourceCost::single(10 * MB, 0);
        assert_eq!(c.check_before_dispatch(&cost), Decision::Proceed);
    }

    #[test]
    fn test_ten_mb_file_with_fifteen_mb_free_rejects() {
        let c = controller(healthy(15 * MB));
        let cost = ResourceCost::single(10 * MB, 0);
        let decision = c.check_before_dispatch(&cost);
        assert!(matches!(decision, Decision::Reject(_)));

        let err = c.admit(&cost).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::SystemResource);
        assert_eq!(err.severity(), Severity::Critical);
        assert_eq!(err.code(), "INSUFFICIENT_DISK_SPACE");
    }

    #[test]
    fn test_disk_boundary_inclusive() {
        let cfg = AdmissionConfig::default();
        let cost = ResourceCost::single(10 * MB + 7, 0);
        let required = 2 * (10 * MB + 7);

        assert_eq!(evaluate(&cfg, &healthy(required), &cost), Decision::Proceed);
        assert!(matches!(
            evaluate(&cfg, &healthy(required - 1), &cost),
            Decision::Reject(_)
        ));
    }

    #[test]
    fn test_batch_uses_larger_multiplier() {
        let cfg = AdmissionConfig::default();
        let snap = healthy(25 * MB);
        assert_eq!(evaluate(&cfg, &snap, &ResourceCost::single(10 * MB, 0)), Decision::Proceed);
        assert!(matches!(
            evaluate(&cfg, &snap, &ResourceCost::batch(10 * MB, 0)),
            Decision::Reject(_)
        ));
    }

    #[test]
    fn test_memory_critical_rejects() {
        let cfg = AdmissionConfig::default();
        // 91% used.
        let snap = snapshot(100 * GB, 9 * GB, 100 * GB, 40.0);
        let decision = evaluate(&cfg, &snap, &ResourceCost::default());
        let Decision::Reject(reasons) = decision else {
            panic!("expected reject");
        };
        assert_eq!(reasons[0].signal, Signal::Memory);
    }

    #[test]
    fn test_memory_at_critical_boundary_rejects() {
        let cfg = AdmissionConfig::default();
        let snap = snapshot(100 * GB, 10 * GB, 100 * GB, 40.0);
        assert!(matches!(evaluate(&cfg, &snap, &ResourceCost::default()), Decision::Reject(_)));
    }

    #[test]
    fn test_memory_warning_band() {
        let cfg = AdmissionConfig::default();
        let snap = snapshot(100 * GB, 15 * GB, 100 * GB, 40.0);
        let decision = evaluate(&cfg, &snap, &ResourceCost::default());
        assert!(matches!(
            decision,
            Decision::ProceedWithWarning(ref r) if r[0].signal == Signal::Memory
        ));
    }

    #[test]
    fn test_memory_need_exceeds_available() {
        let cfg = AdmissionConfig::default();
        let snap = snapshot(16 * GB, 4 * GB, 100 * GB, 40.0);
        let cost = ResourceCost::single(0, 5 * GB);
        let err = evaluate(&cfg, &snap, &cost).into_result().unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_MEMORY");
    }

    #[test]
    fn test_thermal() {
        let cfg = AdmissionConfig::default();
        let cost = ResourceCost::default();
        let hot = snapshot(16 * GB, 12 * GB, 100 * GB, 90.0);
        let err = evaluate(&cfg, &hot, &cost).into_result().unwrap_err();
        assert_eq!(err.code(), "THERMAL_THROTTLING");
        assert_eq!(err.severity(), Severity::High);

        let warm = snapshot(16 * GB, 12 * GB, 100 * GB, 82.0);
        assert!(matches!(evaluate(&cfg, &warm, &cost), Decision::ProceedWithWarning(_)));

        let fair = snapshot(16 * GB, 12 * GB, 100 * GB, 72.0);
        assert_eq!(evaluate(&cfg, &fair, &cost), Decision::Proceed);
    }

    #[test]
    fn test_multiple_rejections_collected() {
        let cfg = AdmissionConfig::default();
        let snap = snapshot(100 * GB, 5 * GB, MB, 95.0);
        let decision = evaluate(&cfg, &snap, &ResourceCost::single(10 * MB, 0));
        assert_eq!(decision.reasons().len(), 3);
    }

    #[test]
    fn test_stale_adds_warning() {
        let cfg = AdmissionConfig::default();
        let stale = healthy(GB).into_stale();
        let decision = evaluate(&cfg, &stale, &ResourceCost::single(MB, 0));
        let Decision::ProceedWithWarning(reasons) = decision else {
            panic!("expected warning");
        };
        assert_eq!(reasons[0].signal, Signal::Telemetry);
    }

    #[test]
    fn test_stale_still_rejects() {
        let cfg = AdmissionConfig::default();
        let stale = healthy(MB).into_stale();
        assert!(matches!(
            evaluate(&cfg, &stale, &ResourceCost::single(10 * MB, 0)),
            Decision::Reject(_)
        ));
    }

    #[test]
    fn test_unavailable_degrades_to_warning() {
        let c = controller(ResourceSnapshot::unavailable());
        let decision = c.check_before_dispatch(&ResourceCost::single(10 * GB, 10 * GB));
        assert!(matches!(decision, Decision::ProceedWithWarning(_)));
        assert_eq!(c.admit(&ResourceCost::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_each_check_samples_fresh() {
        let telemetry = Arc::new(StaticTelemetry::new(healthy(GB)));
        let c = AdmissionController::new(AdmissionConfig::default(), telemetry.clone());
        let cost = ResourceCost::single(100 * MB, 0);
        assert_eq!(c.check_before_dispatch(&cost), Decision::Proceed);

        telemetry.set(healthy(10 * MB));
        assert!(matches!(c.check_before_dispatch(&cost), Decision::Reject(_)));
    }

    #[test]
    fn test_status() {
        let c = controller(healthy(GB));
        let report = c.status();
        assert_eq!(report.disk, crate::ResourceStatus::Critical);
        assert_eq!(report.memory, crate::ResourceStatus::Optimal);
    }
}
