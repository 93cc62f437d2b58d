// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # operations
//!
//! Typed entry points for transcription, audio extraction, model management
//! and transcript chat. Each call validates its request, is admitted
//! against live resource telemetry, and runs as one command through the
//! worker bridge.
//!
//! ```no_run
//! use operations::{Operations, ToolConfig, TranscribeRequest};
//! use resource_monitor::SystemTelemetry;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), error_taxonomy::DomainError> {
//! let config = ToolConfig::default();
//! let telemetry = Arc::new(SystemTelemetry::new(config.telemetry.clone()));
//! let ops = Operations::new(config, telemetry);
//! let result = ops.transcribe_file(TranscribeRequest::new("talk.wav")).await?;
//! println!("{}", result.text);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod estimate;
mod facade;
pub mod media;
pub mod models;
mod parse;
mod task;
mod types;

pub use config::{ModelsConfig, OutputConfig, ToolConfig};
pub use error::ConfigError;
pub use facade::Operations;
pub use task::{OperationTask, TaskStatus};
pub use types::{
    BatchItem, BatchReport, ChatAnswer, ChatRequest, ChatSource, DownloadedModel,
    ExtractRequest, ExtractedAudio, ModelInfo, PerformanceMetrics, TranscribeRequest,
    Transcription,
};
