// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Qualitative resource status for display.

use crate::AdmissionConfig;
use resource_monitor::{ResourceSnapshot, ThermalPressure};
use std::fmt;

/// Overall host condition, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Optimal,
    Warning,
    Critical,
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optimal => "optimal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        })
    }
}

/// Per-signal and overall status derived from one snapshot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResourceReport {
    pub snapshot: ResourceSnapshot,
    pub memory: ResourceStatus,
    pub disk: ResourceStatus,
    pub thermal: ResourceStatus,
    /// Worst of the three; `Warning` when telemetry is unavailable.
    pub overall: ResourceStatus,
}

impl ResourceReport {
    pub fn classify(snapshot: ResourceSnapshot, config: &AdmissionConfig) -> Self {
        if !snapshot.is_available() {
            return Self {
                snapshot,
                memory: ResourceStatus::Warning,
                disk: ResourceStatus::Warning,
                thermal: ResourceStatus::Warning,
                overall: ResourceStatus::Warning,
            };
        }

        let used = snapshot.memory_used_percent();
        let memory = if used >= config.memory_critical_percent {
            ResourceStatus::Critical
        } else if used >= config.memory_warning_percent {
            ResourceStatus::Warning
        } else {
            ResourceStatus::Optimal
        };

        let free = snapshot.disk_available_bytes();
        let disk = if free < config.disk_critical.as_bytes() {
            ResourceStatus::Critical
        } else if free < config.disk_warning.as_bytes() {
            ResourceStatus::Warning
        } else {
            ResourceStatus::Optimal
        };

        let thermal = match snapshot.thermal_pressure() {
            ThermalPressure::Critical => ResourceStatus::Critical,
            ThermalPressure::Serious => ResourceStatus::Warning,
            ThermalPressure::Fair | ThermalPressure::Nominal => ResourceStatus::Optimal,
        };

        Self {
            snapshot,
            memory,
            disk,
            thermal,
            overall: memory.max(disk).max(thermal),
        }
    }
}
