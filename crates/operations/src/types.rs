// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Request and result types for the operation façade.

use crate::task::{OperationTask, TaskStatus};
use admission::AdmissionReason;
use process_bridge::OutputFormat;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

// ── Requests ───────────────────────────────────────────────────────────

/// A request to transcribe one audio or video file.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeRequest {
    pub input: PathBuf,
    /// Model name; the configured default when `None`.
    pub model: Option<String>,
    pub output_format: OutputFormat,
    /// ISO 639-1 code or `"auto"`; worker auto-detects when `None`.
    pub language: Option<String>,
    /// Destination file; `<output dir>/<input stem>.<format>` when `None`.
    pub output_path: Option<PathBuf>,
    pub srt_max_chars: Option<u32>,
    pub srt_max_duration: Option<f64>,
}

impl TranscribeRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            model: None,
            output_format: OutputFormat::default(),
            language: None,
            output_path: None,
            srt_max_chars: None,
            srt_max_duration: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

/// A request to extract the audio track of a video file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    pub input: PathBuf,
    pub output_path: Option<PathBuf>,
}

impl ExtractRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_path: None,
        }
    }
}

/// A question answered against stored transcriptions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    pub question: String,
    /// Restricts the search to one transcription.
    pub transcription_path: Option<PathBuf>,
    pub max_results: Option<u32>,
    /// Passed through to the worker untouched.
    pub options: Map<String, Value>,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }
}

// ── Results ────────────────────────────────────────────────────────────

/// Speed of a transcription run. Fields the worker omits take their
/// [`BASELINE`](Self::BASELINE) values.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PerformanceMetrics {
    /// Audio seconds processed per wall-clock second.
    pub realtime_factor: f64,
    pub processing_seconds: f64,
}

impl PerformanceMetrics {
    /// Reported when the worker omits performance data.
    pub const BASELINE: Self = Self {
        realtime_factor: 1.0,
        processing_seconds: 0.0,
    };
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::BASELINE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub output_path: Option<PathBuf>,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
    pub model: String,
    pub metrics: PerformanceMetrics,
    /// Admission warnings raised before dispatch.
    pub warnings: Vec<AdmissionReason>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedAudio {
    pub output_path: PathBuf,
    pub duration_seconds: Option<f64>,
    pub warnings: Vec<AdmissionReason>,
}

/// One model as reported by the worker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedModel {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatSource {
    pub path: PathBuf,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatAnswer {
    pub answer: String,
    pub sources: Vec<ChatSource>,
}

// ── Batches ────────────────────────────────────────────────────────────

/// Outcome of one batch item; the task carries status, timestamps and error.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub task: OperationTask,
    pub result: Option<Transcription>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    fn count(&self, status: TaskStatus) -> usize {
        self.items.iter().filter(|i| i.task.status() == status).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(TaskStatus::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(TaskStatus::Failed)
    }

    pub fn cancelled(&self) -> usize {
        self.count(TaskStatus::Cancelled)
    }

    pub fn is_complete_success(&self) -> bool {
        self.items.iter().all(|i| i.task.status() == TaskStatus::Completed)
    }
}
