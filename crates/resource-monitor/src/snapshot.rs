// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Aggregated point-in-time resource snapshot.
//!
//! A [`ResourceSnapshot`] combines memory, disk, and thermal readings into
//! a single value. It is the input to every admission decision and is
//! never reused across decisions.

use crate::{DiskInfo, MemoryInfo, ThermalInfo, ThermalPressure};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// How current a snapshot's readings are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Freshness {
    /// Read during this sample.
    Live,
    /// The live read failed; these are the last good readings.
    Stale { age_ms: u64 },
    /// No reading has ever succeeded. Metric fields are placeholders.
    Unavailable,
}

/// A complete point-in-time reading of the monitored resources.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResourceSnapshot {
    pub memory: MemoryInfo,
    pub disk: DiskInfo,
    pub thermal: ThermalInfo,
    /// Unix timestamp in milliseconds when the readings were taken.
    pub captured_at_ms: u64,
    pub freshness: Freshness,
}

impl ResourceSnapshot {
    /// Creates a live snapshot stamped with the current time.
    pub fn live(memory: MemoryInfo, disk: DiskInfo, thermal: ThermalInfo) -> Self {
        Self {
            memory,
            disk,
            thermal,
            captured_at_ms: now_ms(),
            freshness: Freshness::Live,
        }
    }

    /// Placeholder returned when telemetry has never been readable.
    pub fn unavailable() -> Self {
        Self {
            memory: MemoryInfo::from_totals(0, 0),
            disk: DiskInfo {
                mount_point: PathBuf::new(),
                available_bytes: 0,
                total_bytes: 0,
            },
            thermal: ThermalInfo::nominal(),
            captured_at_ms: now_ms(),
            freshness: Freshness::Unavailable,
        }
    }

    /// Re-labels these readings as stale, recording their age.
    pub fn into_stale(mut self) -> Self {
        let age_ms = now_ms().saturating_sub(self.captured_at_ms);
        self.freshness = Freshness::Stale { age_ms };
        self
    }

    pub fn is_live(&self) -> bool {
        self.freshness == Freshness::Live
    }

    pub fn is_available(&self) -> bool {
        self.freshness != Freshness::Unavailable
    }

    /// Memory utilisation in percent.
    pub fn memory_used_percent(&self) -> f64 {
        self.memory.used_percent()
    }

    pub fn disk_available_bytes(&self) -> u64 {
        self.disk.available_bytes
    }

    pub fn thermal_pressure(&self) -> ThermalPressure {
        self.thermal.pressure
    }

    /// Returns a one-line summary suitable for logging or CLI display.
    ///
    /// ```text
    /// Mem 4000/16000 MB avail (75% used), Disk 51200 MB free on /, Thermal nominal [live]
    /// ```
    pub fn summary(&self) -> String {
        let freshness = match self.freshness {
            Freshness::Live => "live".to_string(),
            Freshness::Stale { age_ms } => format!("stale {age_ms} ms"),
            Freshness::Unavailable => "unavailable".to_string(),
        };
        format!(
            "Mem {}/{} MB avail ({:.0}% used), Disk {} MB free on {}, Thermal {} [{freshness}]",
            self.memory.available_mb(),
            self.memory.total_mb(),
            self.memory.used_percent(),
            self.disk.available_mb(),
            self.disk.mount_point.display(),
            self.thermal.pressure,
        )
    }
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(avail_mb: u64, total_mb: u64, disk_mb: u64, temp: f32) -> ResourceSnapshot {
        ResourceSnapshot::live(
            MemoryInfo::from_totals(total_mb * 1024 * 1024, avail_mb * 1024 * 1024),
            DiskInfo {
                mount_point: PathBuf::from("/"),
                available_bytes: disk_mb * 1024 * 1024,
                total_bytes: disk_mb * 4 * 1024 * 1024,
            },
            ThermalInfo::from_celsius(temp),
        )
    }

    #[test]
    fn test_summary_format() {
        let snap = sample(4000, 16000, 51200, 50.0);
        let summary = snap.summary();
        assert!(summary.contains("4000/16000 MB"));
        assert!(summary.contains("75% used"));
        assert!(summary.contains("51200 MB free"));
        assert!(summary.contains("nominal"));
        assert!(summary.contains("[live]"));
    }

    #[test]
    fn test_into_stale() {
        let mut snap = sample(1, 2, 3, 40.0);
        snap.captured_at_ms = now_ms().saturating_sub(1500);
        let stale = snap.into_stale();
        match stale.freshness {
            Freshness::Stale { age_ms } => assert!(age_ms >= 1500),
            other => panic!("expected stale, got {other:?}"),
        }
        assert!(!stale.is_live());
        assert!(stale.is_available());
    }

    #[test]
    fn test_unavailable() {
        let snap = ResourceSnapshot::unavailable();
        assert!(!snap.is_available());
        assert!(snap.summary().contains("unavailable"));
    }

    #[test]
    fn test_accessors() {
        let snap = sample(1000, 4000, 20, 86.0);
        assert!((snap.memory_used_percent() - 75.0).abs() < 1e-9);
        assert_eq!(snap.disk_available_bytes(), 20 * 1024 * 1024);
        assert_eq!(snap.thermal_pressure(), ThermalPressure::Critical);
    }
}
