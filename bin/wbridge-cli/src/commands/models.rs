// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `wbridge models` commands.

use operations::ToolConfig;

pub async fn list(config: ToolConfig) -> anyhow::Result<()> {
    super::banner("Models");

    let ops = super::operations(config);
    println!("  Directory: {}", ops.config().models.dir.display());
    println!();

    let models = ops.list_models().await.map_err(super::fail)?;
    let default = ops.config().models.default_model.as_str();

    println!("  {:<16} {:>10} {:>10}  {}", "Name", "Disk", "RAM", "Status");
    println!("  {}", "-".repeat(52));
    for model in &models {
        let footprint = operations::models::lookup(&model.name);
        let disk = footprint.map_or_else(|| "?".to_string(), |m| format!("{} MB", m.disk_mb));
        let ram = footprint.map_or_else(|| "?".to_string(), |m| format!("{} MB", m.ram_mb));
        let mut status = if model.installed { "installed" } else { "-" }.to_string();
        if model.name == default {
            status.push_str(" (default)");
        }
        println!("  {:<16} {disk:>10} {ram:>10}  {status}", model.name);
    }
    Ok(())
}

pub async fn download(config: ToolConfig, name: String) -> anyhow::Result<()> {
    super::banner("Model Download");

    let ops = super::operations(config);
    println!("  Model:    {name}");

    let model = ops.download_model(&name).await.map_err(|err| {
        super::suggest_restart(&ops);
        super::fail(err)
    })?;

    println!("  Saved:    {}", model.path.display());
    if let Some(bytes) = model.size_bytes {
        println!("  Size:     {} MB", bytes / (1024 * 1024));
    }
    Ok(())
}
