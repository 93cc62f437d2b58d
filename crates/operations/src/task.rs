// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Caller-owned handle tracking one operation from submission to completion.
//!
//! Status moves `Pending → Processing → {Completed | Failed | Cancelled}`.
//! Terminal states absorb: once reached, every further transition is
//! refused and the handle keeps its final status, timestamps and error.

use chrono::{DateTime, Utc};
use error_taxonomy::{catalog, DomainError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationTask {
    id: u64,
    input: PathBuf,
    output: Option<PathBuf>,
    status: TaskStatus,
    progress: f64,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    error: Option<DomainError>,
}

impl OperationTask {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            input: input.into(),
            output: None,
            status: TaskStatus::Pending,
            progress: 0.0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Completion fraction in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn error(&self) -> Option<&DomainError> {
        self.error.as_ref()
    }

    /// Wall time between start and completion, once both are known.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        Some(self.completed_at? - self.started_at?)
    }

    /// `Pending → Processing`.
    pub fn start(&mut self) -> bool {
        if self.status != TaskStatus::Pending {
            return false;
        }
        self.status = TaskStatus::Processing;
        self.started_at = Some(Utc::now());
        true
    }

    /// Updates progress while processing; values are clamped to `[0, 1]`
    /// and NaN is ignored.
    pub fn set_progress(&mut self, fraction: f64) -> bool {
        if self.status != TaskStatus::Processing || fraction.is_nan() {
            return false;
        }
        self.progress = fraction.clamp(0.0, 1.0);
        true
    }

    pub fn complete(&mut self, output: Option<PathBuf>) -> bool {
        if self.status != TaskStatus::Processing {
            return false;
        }
        if output.is_some() {
            self.output = output;
        }
        self.progress = 1.0;
        self.finish(TaskStatus::Completed);
        true
    }

    /// Marks the task failed, or cancelled when `error` is `CANCELLED`.
    pub fn fail(&mut self, error: DomainError) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let status = if error.code() == catalog::CANCELLED {
            TaskStatus::Cancelled
        } else {
            TaskStatus::Failed
        };
        self.error = Some(error);
        self.finish(status);
        true
    }

    pub fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.finish(TaskStatus::Cancelled);
        true
    }

    fn finish(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
    }
}
