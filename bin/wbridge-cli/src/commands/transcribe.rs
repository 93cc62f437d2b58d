// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `wbridge transcribe` command.

use operations::{OperationTask, ToolConfig, TranscribeRequest};

pub async fn execute(config: ToolConfig, request: TranscribeRequest) -> anyhow::Result<()> {
    super::banner("Transcription");

    let ops = super::operations(config);
    let model = request
        .model
        .clone()
        .unwrap_or_else(|| ops.config().models.default_model.clone());

    println!("  Input:    {}", request.input.display());
    println!("  Model:    {model}");
    println!("  Format:   {}", request.output_format);
    if let Some(language) = &request.language {
        println!("  Language: {language}");
    }
    println!();

    let mut task = OperationTask::new(request.input.clone());
    let result = ops.transcribe_tracked(request, &mut task).await;
    let transcription = match result {
        Ok(t) => t,
        Err(err) => {
            super::suggest_restart(&ops);
            return Err(super::fail(err));
        }
    };

    for warning in &transcription.warnings {
        println!("  Warning:  {warning}");
    }
    if let Some(path) = &transcription.output_path {
        println!("  Output:   {}", path.display());
    }
    if let Some(language) = &transcription.language {
        println!("  Detected: {language}");
    }
    if let Some(duration) = transcription.duration_seconds {
        println!("  Audio:    {duration:.1} s");
    }
    println!(
        "  Speed:    {:.2}x realtime ({:.1} s)",
        transcription.metrics.realtime_factor, transcription.metrics.processing_seconds
    );
    if let Some(elapsed) = task.elapsed() {
        println!("  Elapsed:  {:.1} s", elapsed.num_milliseconds() as f64 / 1000.0);
    }
    println!();
    println!("{}", preview(&transcription.text, 400));

    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
