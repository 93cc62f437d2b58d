// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # wbridge
//!
//! Command-line host for the whisper worker bridge.
//!
//! ## Usage
//! ```bash
//! # Transcribe a recording to SRT
//! wbridge transcribe talk.mp3 --model base --output-format srt --srt-max-chars 42
//!
//! # Extract the audio track of a video
//! wbridge extract lecture.mp4
//!
//! # Manage models
//! wbridge models list
//! wbridge models download small
//!
//! # Transcribe several files, continuing past failures
//! wbridge batch a.wav b.mp3 c.mp4
//!
//! # Show resource status as seen by admission control
//! wbridge status
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wbridge",
    about = "Resource-aware transcription through a whisper worker process",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by `transcribe` and `batch`.
#[derive(clap::Args, Clone)]
struct TranscribeOptions {
    /// Model name (tiny, base, small, medium, large-v3, large-v3-turbo, ...).
    #[arg(short, long)]
    model: Option<String>,

    /// Language code, or "auto" to detect.
    #[arg(short, long)]
    language: Option<String>,

    /// Output format: txt, srt, vtt, json.
    #[arg(short = 'f', long, default_value = "txt")]
    output_format: process_bridge::OutputFormat,

    /// Maximum characters per SRT cue.
    #[arg(long)]
    srt_max_chars: Option<u32>,

    /// Maximum seconds per SRT cue.
    #[arg(long)]
    srt_max_duration: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe one audio or video file.
    Transcribe {
        input: PathBuf,

        /// Output file; defaults to <output dir>/<input stem>.<format>.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: TranscribeOptions,
    },

    /// Extract the audio track of a video file to WAV.
    Extract {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List or download models.
    Models {
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// Transcribe several files one after another.
    Batch {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        options: TranscribeOptions,
    },

    /// Ask a question about stored transcriptions.
    Chat {
        question: String,

        /// Restrict the search to one transcription file.
        #[arg(short, long)]
        transcription: Option<PathBuf>,

        #[arg(long)]
        max_results: Option<u32>,
    },

    /// Display current system resource status.
    Status,
}

#[derive(Subcommand)]
enum ModelsAction {
    /// List known models and whether they are installed.
    List,
    /// Download a model into the models directory.
    Download { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Transcribe {
            input,
            output,
            options,
        } => {
            let mut request = options.into_request(input);
            request.output_path = output;
            commands::transcribe::execute(config, request).await
        }
        Commands::Extract { input, output } => {
            commands::extract::execute(config, input, output).await
        }
        Commands::Models { action } => match action {
            ModelsAction::List => commands::models::list(config).await,
            ModelsAction::Download { name } => commands::models::download(config, name).await,
        },
        Commands::Batch { inputs, options } => {
            let requests = inputs
                .into_iter()
                .map(|input| options.clone().into_request(input))
                .collect();
            commands::batch::execute(config, requests).await
        }
        Commands::Chat {
            question,
            transcription,
            max_results,
        } => commands::chat::execute(config, question, transcription, max_results).await,
        Commands::Status => commands::status::execute(config).await,
    }
}

impl TranscribeOptions {
    fn into_request(self, input: PathBuf) -> operations::TranscribeRequest {
        let mut request = operations::TranscribeRequest::new(input).with_format(self.output_format);
        request.model = self.model;
        request.language = self.language;
        request.srt_max_chars = self.srt_max_chars;
        request.srt_max_duration = self.srt_max_duration;
        request
    }
}
