// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # resource-monitor
//!
//! Samples live host resources so that admission control can decide
//! whether a worker command may run.
//!
//! # Monitored Metrics
//! - **Memory**: total / available / used, from `/proc/meminfo` or `sysinfo`.
//! - **Disk**: free space on the volume that receives output.
//! - **Thermal pressure**: nominal, fair, serious, critical.
//!
//! # Graceful Degradation
//! [`TelemetryProvider::sample`] never fails. When a read fails or takes
//! longer than the configured budget, the last good snapshot is returned
//! marked [`Freshness::Stale`]; before any read has succeeded the result
//! is [`Freshness::Unavailable`].
//!
//! # Example
//! ```no_run
//! use resource_monitor::{SystemTelemetry, TelemetryConfig, TelemetryProvider};
//! use std::sync::Arc;
//!
//! let telemetry: Arc<dyn TelemetryProvider> =
//!     Arc::new(SystemTelemetry::new(TelemetryConfig::default()));
//! println!("{}", telemetry.sample().summary());
//! ```

mod disk;
mod error;
mod memory;
mod provider;
mod snapshot;
pub(crate) mod thermal;

pub use disk::DiskInfo;
pub use error::MonitorError;
pub use memory::MemoryInfo;
pub use provider::{StaticTelemetry, SystemTelemetry, TelemetryConfig, TelemetryProvider};
pub use snapshot::{Freshness, ResourceSnapshot};
pub use thermal::{ThermalInfo, ThermalPressure};
