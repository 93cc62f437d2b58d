// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `wbridge chat` command.

use operations::{ChatRequest, ToolConfig};
use std::path::PathBuf;

pub async fn execute(
    config: ToolConfig,
    question: String,
    transcription: Option<PathBuf>,
    max_results: Option<u32>,
) -> anyhow::Result<()> {
    let ops = super::operations(config);
    let mut request = ChatRequest::new(question);
    request.transcription_path = transcription;
    request.max_results = max_results;

    let answer = ops.chatbot_query(request).await.map_err(super::fail)?;

    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &answer.sources {
            match source.score {
                Some(score) => println!("  {} ({score:.2})", source.path.display()),
                None => println!("  {}", source.path.display()),
            }
        }
    }
    Ok(())
}
