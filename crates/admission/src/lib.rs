// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # admission
//!
//! Gates every worker command on live resource telemetry.
//!
//! [`AdmissionController::check_before_dispatch`] samples a fresh
//! [`ResourceSnapshot`](resource_monitor::ResourceSnapshot) and returns a
//! [`Decision`]: proceed, proceed with warnings, or reject. A rejection
//! must prevent dispatch; [`AdmissionController::admit`] turns it into the
//! matching [`DomainError`](error_taxonomy::DomainError).
//!
//! Thresholds live in [`AdmissionConfig`] and accept human-readable sizes
//! through [`ByteSize`].

mod config;
mod controller;
mod cost;
mod decision;
mod error;
mod size;
mod status;

pub use config::AdmissionConfig;
pub use controller::{evaluate, AdmissionController};
pub use cost::{CostKind, ResourceCost};
pub use decision::{AdmissionReason, Decision, Signal};
pub use error::AdmissionError;
pub use size::ByteSize;
pub use status::{ResourceReport, ResourceStatus};
