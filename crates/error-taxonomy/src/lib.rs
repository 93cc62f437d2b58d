// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # error-taxonomy
//!
//! One error vocabulary for every layer of the worker bridge.
//!
//! Raw failure signals (worker exit codes, stderr text, unparseable output,
//! violated resource thresholds, `success:false` responses) are converted by
//! [`ErrorFactory`] into a single [`DomainError`] type carrying:
//!
//! - a [`ErrorCategory`] (six fixed categories),
//! - a [`Severity`] (`low < medium < high < critical`),
//! - a machine code from the [`catalog`],
//! - a description and recovery suggestion (never empty),
//! - a help anchor and a recoverability flag.
//!
//! [`EscalationMonitor`] watches for repeated critical resource errors
//! and signals when a restart should be suggested.

pub mod catalog;
mod category;
mod domain;
mod error;
mod escalation;
mod factory;

pub use category::{ErrorCategory, Severity};
pub use domain::DomainError;
pub use error::InvalidDomainError;
pub use escalation::EscalationMonitor;
pub use factory::{ErrorFactory, ResourceKind};
