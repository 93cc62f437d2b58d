// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! System memory monitoring.
//!
//! On Linux the kernel's own estimate in `/proc/meminfo` (`MemAvailable`)
//! is used, since it accounts for reclaimable cache. Elsewhere (macOS in
//! particular) the reading comes from `sysinfo`.

use crate::MonitorError;
use std::path::Path;

/// Default path to the kernel memory info file.
const MEMINFO_PATH: &str = "/proc/meminfo";

/// System memory state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MemoryInfo {
    /// Total physical memory in bytes.
    pub total_bytes: u64,
    /// Memory a new workload can use without swapping, in bytes.
    pub available_bytes: u64,
    /// Memory actively used in bytes (`total - available`).
    pub used_bytes: u64,
}

impl MemoryInfo {
    /// Builds a reading from total and available byte counts.
    pub fn from_totals(total_bytes: u64, available_bytes: u64) -> Self {
        let available_bytes = available_bytes.min(total_bytes);
        Self {
            total_bytes,
            available_bytes,
            used_bytes: total_bytes - available_bytes,
        }
    }

    /// Reads current memory information for this platform.
    pub fn read() -> Result<Self, MonitorError> {
        match Self::read_from(Path::new(MEMINFO_PATH)) {
            Err(MonitorError::NotAvailable { .. }) => Self::read_sysinfo(),
            other => other,
        }
    }

    /// Reads memory information from a specific meminfo-formatted file.
    pub(crate) fn read_from(path: &Path) -> Result<Self, MonitorError> {
        if !path.exists() {
            return Err(MonitorError::NotAvailable {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| MonitorError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Reads memory through `sysinfo` (non-Linux hosts).
    fn read_sysinfo() -> Result<Self, MonitorError> {
        let mut sys = sysinfo::System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return Err(MonitorError::NotAvailable {
                path: "sysinfo::System::total_memory".to_string(),
            });
        }
        Ok(Self::from_totals(total, sys.available_memory()))
    }

    /// Parses the content of a `/proc/meminfo`-formatted string.
    pub(crate) fn parse(content: &str, source_path: &Path) -> Result<Self, MonitorError> {
        let mut total_kb: Option<u64> = None;
        let mut available_kb: Option<u64> = None;

        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            match key {
                "MemTotal:" => total_kb = Some(parse_kb_value(value, source_path)?),
                "MemAvailable:" => available_kb = Some(parse_kb_value(value, source_path)?),
                _ => {}
            }

            if total_kb.is_some() && available_kb.is_some() {
                break;
            }
        }

        let total_kb = total_kb.ok_or_else(|| MonitorError::ParseError {
            path: source_path.display().to_string(),
            detail: "MemTotal not found".to_string(),
        })?;
        let available_kb = available_kb.ok_or_else(|| MonitorError::ParseError {
            path: source_path.display().to_string(),
            detail: "MemAvailable not found".to_string(),
        })?;

        Ok(Self::from_totals(total_kb * 1024, available_kb * 1024))
    }

    /// Returns memory utilisation as a percentage in `[0.0, 100.0]`.
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.total_bytes as f64 * 100.0
    }

    /// Returns available memory in megabytes.
    pub fn available_mb(&self) -> u64 {
        self.available_bytes / (1024 * 1024)
    }

    /// Returns total memory in megabytes.
    pub fn total_mb(&self) -> u64 {
        self.total_bytes / (1024 * 1024)
    }
}

/// Parses a numeric string from `/proc/meminfo` (values are in kB).
fn parse_kb_value(s: &str, source_path: &Path) -> Result<u64, MonitorError> {
    s.parse::<u64>().map_err(|_| MonitorError::ParseError {
        path: source_path.display().to_string(),
        detail: format!("expected integer kB value, got '{s}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MEMINFO: &str = "\
MemTotal:       16384000 kB
MemFree:          218456 kB
MemAvailable:    4096000 kB
Buffers:          123456 kB
Cached:          1987654 kB
";

    #[test]
    fn test_parse_meminfo() {
        let info = MemoryInfo::parse(SAMPLE_MEMINFO, Path::new(MEMINFO_PATH)).unwrap();
        assert_eq!(info.total_bytes, 16384000 * 1024);
        assert_eq!(info.available_bytes, 4096000 * 1024);
        assert_eq!(info.used_bytes, (16384000 - 4096000) * 1024);
    }

    #[test]
    fn test_used_percent() {
        let info = MemoryInfo::from_totals(1000, 250);
        assert!((info.used_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_used_percent_zero_total() {
        let info = MemoryInfo::from_totals(0, 0);
        assert_eq!(info.used_percent(), 0.0);
    }

    #[test]
    fn test_from_totals_clamps_available() {
        let info = MemoryInfo::from_totals(100, 500);
        assert_eq!(info.available_bytes, 100);
        assert_eq!(info.used_bytes, 0);
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        std::fs::write(&path, SAMPLE_MEMINFO).unwrap();
        let info = MemoryInfo::read_from(&path).unwrap();
        assert_eq!(info.total_mb(), 16000);
    }

    #[test]
    fn test_missing_mem_available() {
        let incomplete = "MemTotal:        3884292 kB\nMemFree:          218456 kB\n";
        let result = MemoryInfo::parse(incomplete, Path::new(MEMINFO_PATH));
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_garbage_value() {
        let bad = "MemTotal: lots kB\nMemAvailable: 1 kB\n";
        let result = MemoryInfo::parse(bad, Path::new(MEMINFO_PATH));
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_missing_file_is_not_available() {
        let result = MemoryInfo::read_from(Path::new("/nonexistent/meminfo"));
        assert!(matches!(result, Err(MonitorError::NotAvailable { .. })));
    }

    #[test]
    fn test_read_host_memory() {
        let info = MemoryInfo::read().unwrap();
        assert!(info.total_bytes > 0);
        assert!(info.available_bytes <= info.total_bytes);
    }
}
