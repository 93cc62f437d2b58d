// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Telemetry providers.
//!
//! [`SystemTelemetry`] is constructed once at the composition root and
//! shared by reference (`Arc<dyn TelemetryProvider>`) with whatever needs
//! readings. Each [`TelemetryProvider::sample`] performs a fresh read; the
//! only retained state is the last good snapshot, used when a read fails
//! or overruns its time budget.
//!
//! At most one reader thread exists per provider. While a read that
//! overran its budget is still running, further samples fall back
//! immediately instead of piling up threads behind a hung filesystem.

use crate::snapshot::now_ms;
use crate::{DiskInfo, MemoryInfo, MonitorError, ResourceSnapshot, ThermalInfo};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

/// Something that can produce a fresh [`ResourceSnapshot`] on demand.
///
/// Implementations must be cheap to call concurrently and must never
/// return an error: degraded readings are expressed through
/// [`Freshness`](crate::Freshness).
pub trait TelemetryProvider: Send + Sync {
    fn sample(&self) -> ResourceSnapshot;
}

/// Telemetry settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetryConfig {
    /// Path whose volume is watched for free space (normally the output directory).
    #[serde(default = "default_volume")]
    pub volume: PathBuf,
    /// Upper bound for one sample, in milliseconds.
    #[serde(default = "default_sample_timeout_ms")]
    pub sample_timeout_ms: u64,
}

fn default_volume() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
        .join("transcriptions")
}

fn default_sample_timeout_ms() -> u64 {
    500
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            sample_timeout_ms: default_sample_timeout_ms(),
        }
    }
}

type Reader = Arc<dyn Fn(&Path) -> Result<ResourceSnapshot, MonitorError> + Send + Sync>;

/// Reads live host telemetry with a bounded sampling time.
pub struct SystemTelemetry {
    config: TelemetryConfig,
    reader: Reader,
    last_good: Mutex<Option<ResourceSnapshot>>,
    reading: Arc<AtomicBool>,
}

impl SystemTelemetry {
    pub fn new(config: TelemetryConfig) -> Self {
        Self::with_reader(config, Arc::new(read_live))
    }

    fn with_reader(config: TelemetryConfig, reader: Reader) -> Self {
        Self {
            config,
            reader,
            last_good: Mutex::new(None),
            reading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Runs the reader off-thread and waits at most `sample_timeout_ms`.
    fn read_bounded(&self) -> Result<ResourceSnapshot, MonitorError> {
        if self.reading.swap(true, Ordering::AcqRel) {
            return Err(MonitorError::Busy);
        }
        let budget_ms = self.config.sample_timeout_ms;
        let (tx, rx) = mpsc::channel();
        let reader = Arc::clone(&self.reader);
        let volume = self.config.volume.clone();
        let reading = Arc::clone(&self.reading);

        let spawned = std::thread::Builder::new()
            .name("telemetry-sample".into())
            .spawn(move || {
                let _done = ClearOnDrop(reading);
                // The receiver may be gone if we overran the budget.
                let _ = tx.send(reader(&volume));
            });
        if let Err(e) = spawned {
            self.reading.store(false, Ordering::Release);
            return Err(MonitorError::ReadError {
                path: "telemetry-sample thread".to_string(),
                source: e,
            });
        }

        rx.recv_timeout(Duration::from_millis(budget_ms))
            .map_err(|_| MonitorError::Timeout { budget_ms })?
    }

    fn fallback(&self) -> ResourceSnapshot {
        let last = self.last_good.lock().ok().and_then(|guard| guard.clone());
        match last {
            Some(snapshot) => snapshot.into_stale(),
            None => ResourceSnapshot::unavailable(),
        }
    }
}

/// Clears the in-flight flag even if the reader panics.
struct ClearOnDrop(Arc<AtomicBool>);

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TelemetryProvider for SystemTelemetry {
    fn sample(&self) -> ResourceSnapshot {
        match self.read_bounded() {
            Ok(snapshot) => {
                if let Ok(mut guard) = self.last_good.lock() {
                    *guard = Some(snapshot.clone());
                }
                snapshot
            }
            Err(e) => {
                tracing::warn!("telemetry read failed, using fallback: {e}");
                self.fallback()
            }
        }
    }
}

/// Performs one live read of memory, disk, and thermal state.
///
/// Memory and disk are required. Thermal degrades to nominal when the
/// host exposes no thermal zones.
fn read_live(volume: &Path) -> Result<ResourceSnapshot, MonitorError> {
    let memory = MemoryInfo::read()?;
    let disk = DiskInfo::read_for(volume)?;
    let thermal = ThermalInfo::read().unwrap_or_else(|e| {
        tracing::debug!("thermal zones unavailable: {e}");
        ThermalInfo::nominal()
    });
    Ok(ResourceSnapshot {
        memory,
        disk,
        thermal,
        captured_at_ms: now_ms(),
        freshness: crate::Freshness::Live,
    })
}

/// A provider that returns a caller-controlled snapshot.
///
/// Used by tests and by hosts that source telemetry elsewhere.
pub struct StaticTelemetry {
    snapshot: Mutex<ResourceSnapshot>,
}

impl StaticTelemetry {
    pub fn new(snapshot: ResourceSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Replaces the snapshot returned by subsequent samples.
    pub fn set(&self, snapshot: ResourceSnapshot) {
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = snapshot;
        }
    }
}

impl TelemetryProvider for StaticTelemetry {
    fn sample(&self) -> ResourceSnapshot {
        self.snapshot
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|_| ResourceSnapshot::unavailable())
    }
}
