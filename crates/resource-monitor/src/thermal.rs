// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Thermal pressure via `/sys/class/thermal/`.
//!
//! Each `thermal_zone*/temp` file reports millidegrees Celsius. The hottest
//! zone decides the pressure level. Hosts without thermal zones (macOS,
//! containers) report [`ThermalPressure::Nominal`].

use crate::MonitorError;
use std::fmt;
use std::path::Path;

/// Directory holding the kernel thermal zones.
const THERMAL_CLASS_DIR: &str = "/sys/class/thermal";

const FAIR_C: f32 = 70.0;
const SERIOUS_C: f32 = 80.0;
const CRITICAL_C: f32 = 85.0;

/// Qualitative system heat level, ordered from coolest to hottest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ThermalPressure {
    Nominal,
    Fair,
    Serious,
    Critical,
}

impl ThermalPressure {
    /// Maps a temperature in degrees Celsius to a pressure level.
    pub fn from_celsius(celsius: f32) -> Self {
        if celsius >= CRITICAL_C {
            Self::Critical
        } else if celsius >= SERIOUS_C {
            Self::Serious
        } else if celsius >= FAIR_C {
            Self::Fair
        } else {
            Self::Nominal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nominal => "nominal",
            Self::Fair => "fair",
            Self::Serious => "serious",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ThermalPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thermal state of the host.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ThermalInfo {
    /// Hottest zone temperature, if any zone could be read.
    pub max_temp_celsius: Option<f32>,
    /// Derived pressure level.
    pub pressure: ThermalPressure,
}

impl ThermalInfo {
    /// A reading for hosts that expose no thermal zones.
    pub fn nominal() -> Self {
        Self {
            max_temp_celsius: None,
            pressure: ThermalPressure::Nominal,
        }
    }

    /// Builds a reading from a known temperature.
    pub fn from_celsius(celsius: f32) -> Self {
        Self {
            max_temp_celsius: Some(celsius),
            pressure: ThermalPressure::from_celsius(celsius),
        }
    }

    /// Reads the hottest thermal zone on this host.
    pub fn read() -> Result<Self, MonitorError> {
        Self::read_dir(Path::new(THERMAL_CLASS_DIR))
    }

    /// Reads every `thermal_zone*/temp` under `dir` and keeps the hottest.
    pub(crate) fn read_dir(dir: &Path) -> Result<Self, MonitorError> {
        if !dir.exists() {
            return Err(MonitorError::NotAvailable {
                path: dir.display().to_string(),
            });
        }
        let entries = std::fs::read_dir(dir).map_err(|e| MonitorError::ReadError {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut hottest: Option<f32> = None;
        for entry in entries.filter_map(|e| e.ok()) {
            if !entry.file_name().to_string_lossy().starts_with("thermal_zone") {
                continue;
            }
            match read_zone(&entry.path().join("temp")) {
                Ok(c) => hottest = Some(hottest.map_or(c, |h| h.max(c))),
                Err(e) => tracing::debug!("skipping thermal zone: {e}"),
            }
        }

        Ok(hottest.map_or_else(Self::nominal, Self::from_celsius))
    }
}

/// Reads one zone's `temp` file and converts millidegrees to degrees.
fn read_zone(path: &Path) -> Result<f32, MonitorError> {
    let content = read_sysfs_file(path)?;
    let millidegrees: i64 = content.parse::<i64>().map_err(|_| MonitorError::ParseError {
        path: path.display().to_string(),
        detail: format!("expected integer millidegrees, got '{content}'"),
    })?;
    Ok(millidegrees as f32 / 1000.0)
}

/// Reads a sysfs/procfs file and returns its trimmed content.
pub(crate) fn read_sysfs_file(path: &Path) -> Result<String, MonitorError> {
    if !path.exists() {
        return Err(MonitorError::NotAvailable {
            path: path.display().to_string(),
        });
    }
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| MonitorError::ReadError {
            path: path.display().to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_zone(root: &Path, name: &str, content: &str) {
        let zone = root.join(name);
        std::fs::create_dir_all(&zone).unwrap();
        std::fs::write(zone.join("temp"), content).unwrap();
    }

    #[test]
    fn test_pressure_thresholds() {
        assert_eq!(ThermalPressure::from_celsius(45.0), ThermalPressure::Nominal);
        assert_eq!(ThermalPressure::from_celsius(70.0), ThermalPressure::Fair);
        assert_eq!(ThermalPressure::from_celsius(79.9), ThermalPressure::Fair);
        assert_eq!(ThermalPressure::from_celsius(80.0), ThermalPressure::Serious);
        assert_eq!(ThermalPressure::from_celsius(85.0), ThermalPressure::Critical);
    }

    #[test]
    fn test_pressure_ordering() {
        assert!(ThermalPressure::Nominal < ThermalPressure::Fair);
        assert!(ThermalPressure::Serious < ThermalPressure::Critical);
    }

    #[test]
    fn test_hottest_zone_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_zone(dir.path(), "thermal_zone0", "54321\n");
        write_zone(dir.path(), "thermal_zone1", "81000\n");
        write_zone(dir.path(), "cooling_device0", "99000\n");

        let info = ThermalInfo::read_dir(dir.path()).unwrap();
        assert!((info.max_temp_celsius.unwrap() - 81.0).abs() < 0.001);
        assert_eq!(info.pressure, ThermalPressure::Serious);
    }

    #[test]
    fn test_unreadable_zone_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_zone(dir.path(), "thermal_zone0", "not_a_number");
        write_zone(dir.path(), "thermal_zone1", "60000");

        let info = ThermalInfo::read_dir(dir.path()).unwrap();
        assert_eq!(info.pressure, ThermalPressure::Nominal);
        assert!((info.max_temp_celsius.unwrap() - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_no_zones_is_nominal() {
        let dir = tempfile::tempdir().unwrap();
        let info = ThermalInfo::read_dir(dir.path()).unwrap();
        assert_eq!(info, ThermalInfo::nominal());
    }

    #[test]
    fn test_missing_dir() {
        let result = ThermalInfo::read_dir(Path::new("/nonexistent/thermal"));
        assert!(matches!(result, Err(MonitorError::NotAvailable { .. })));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ThermalPressure::Serious).unwrap();
        assert_eq!(json, "\"serious\"");
    }
}
