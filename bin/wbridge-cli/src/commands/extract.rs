// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `wbridge extract` command: pull the audio track out of a video.

use operations::{ExtractRequest, ToolConfig};
use std::path::PathBuf;

pub async fn execute(
    config: ToolConfig,
    input: PathBuf,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    super::banner("Audio Extraction");

    let ops = super::operations(config);
    let request = ExtractRequest {
        input,
        output_path: output,
    };
    println!("  Input:    {}", request.input.display());

    let audio = ops.extract_audio(request).await.map_err(|err| {
        super::suggest_restart(&ops);
        super::fail(err)
    })?;

    for warning in &audio.warnings {
        println!("  Warning:  {warning}");
    }
    println!("  Output:   {}", audio.output_path.display());
    if let Some(duration) = audio.duration_seconds {
        println!("  Duration: {duration:.1} s");
    }
    Ok(())
}
