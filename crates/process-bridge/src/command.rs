// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Worker commands.
//!
//! The in-process representation is a closed enum with one strongly typed
//! parameter record per operation. It becomes JSON only at the transport
//! boundary:
//!
//! ```json
//! {"operation": "transcribe", "params": {"input_path": "a.wav", "model": "base", ...}}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// One request to the worker process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "snake_case")]
pub enum Command {
    Transcribe(TranscribeParams),
    ExtractAudio(ExtractAudioParams),
    ListModels(ListModelsParams),
    DownloadModel(DownloadModelParams),
    ChatbotQuery(ChatbotQueryParams),
}

impl Command {
    /// The wire name of the operation.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Transcribe(_) => "transcribe",
            Self::ExtractAudio(_) => "extract_audio",
            Self::ListModels(_) => "list_models",
            Self::DownloadModel(_) => "download_model",
            Self::ChatbotQuery(_) => "chatbot_query",
        }
    }

    /// Serializes the command as a single JSON message.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Transcript output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Srt,
    Vtt,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected txt, srt, vtt, json)")),
        }
    }
}

/// Parameters for [`Command::Transcribe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribeParams {
    pub input_path: PathBuf,
    pub model: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Language code; `None` lets the worker detect it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Maximum characters per subtitle segment (SRT/VTT only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt_max_chars: Option<u32>,
    /// Maximum seconds per subtitle segment (SRT/VTT only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt_max_duration: Option<f64>,
}

/// Parameters for [`Command::ExtractAudio`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractAudioParams {
    pub input_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

/// Parameters for [`Command::ListModels`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListModelsParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models_dir: Option<PathBuf>,
}

/// Parameters for [`Command::DownloadModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadModelParams {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models_dir: Option<PathBuf>,
}

/// Parameters for [`Command::ChatbotQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotQueryParams {
    pub question: String,
    /// Transcript the question refers to; `None` searches all indexed transcripts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// Free-form options forwarded verbatim to the worker.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: serde_json::Map<String, serde_json::Value>,
}
