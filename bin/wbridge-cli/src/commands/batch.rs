// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `wbridge batch` command: sequential transcription with partial failure.

use operations::{TaskStatus, ToolConfig, TranscribeRequest};

pub async fn execute(config: ToolConfig, requests: Vec<TranscribeRequest>) -> anyhow::Result<()> {
    super::banner("Batch Transcription");

    let ops = super::operations(config);
    let total = requests.len();
    println!("  Files:    {total}");
    println!();

    let report = ops.process_batch(requests).await;

    for (index, item) in report.items.iter().enumerate() {
        let task = &item.task;
        let outcome = match task.status() {
            TaskStatus::Completed => task
                .output()
                .map_or_else(|| "done".to_string(), |p| format!("-> {}", p.display())),
            TaskStatus::Failed | TaskStatus::Cancelled => task
                .error()
                .map_or_else(
                    || "cancelled".to_string(),
                    |e| format!("{}: {}", e.code(), e.description()),
                ),
            TaskStatus::Pending | TaskStatus::Processing => "not run".to_string(),
        };
        println!(
            "  [{}/{total}] {:<10} {}  {outcome}",
            index + 1,
            format!("{:?}", task.status()).to_lowercase(),
            task.input().display(),
        );
    }

    println!();
    println!(
        "  Summary:  {} succeeded, {} failed, {} cancelled",
        report.succeeded(),
        report.failed(),
        report.cancelled()
    );
    super::suggest_restart(&ops);

    if report.succeeded() == 0 && total > 0 {
        anyhow::bail!("no file in the batch was transcribed");
    }
    Ok(())
}
