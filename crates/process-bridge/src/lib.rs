// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # process-bridge
//!
//! Drives the external transcription worker through a narrow channel:
//! one JSON [`Command`] on stdin, one JSON [`Response`] on stdout, free
//! text on stderr.
//!
//! [`ProcessBridge`] guarantees that at most one command is in flight.
//! A second [`execute`](ProcessBridge::execute) while busy fails with
//! [`BridgeError::AlreadyRunning`] rather than queuing.
//!
//! # Example
//! ```no_run
//! use process_bridge::{BridgeConfig, Command, ListModelsParams, ProcessBridge};
//!
//! # async fn demo() -> Result<(), process_bridge::BridgeError> {
//! let bridge = ProcessBridge::new(BridgeConfig::for_program("/usr/local/bin/whisper-worker"));
//! let response = bridge
//!     .execute(&Command::ListModels(ListModelsParams::default()))
//!     .await?;
//! println!("{:?}", response.data);
//! # Ok(())
//! # }
//! ```

mod bridge;
mod command;
mod config;
mod error;
mod response;

pub use bridge::{BridgeState, ProcessBridge, Progress};
pub use command::{
    ChatbotQueryParams, Command, DownloadModelParams, ExtractAudioParams, ListModelsParams,
    OutputFormat, TranscribeParams,
};
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use response::Response;
