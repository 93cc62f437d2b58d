// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `wbridge status` command: display resource state as admission control sees it.
//!
//! Memory and disk come from the system; thermal pressure from the hottest
//! sensor when one is readable. Where a reading is unavailable the command
//! still works and says so.

use admission::ResourceStatus;
use operations::ToolConfig;
use resource_monitor::Freshness;

const MB: u64 = 1024 * 1024;

pub async fn execute(config: ToolConfig) -> anyhow::Result<()> {
    super::banner("System Resource Status");

    let admission = config.admission.clone();
    let ops = super::operations(config);
    let report = ops.status().await;
    let snapshot = &report.snapshot;

    match snapshot.freshness {
        Freshness::Live => {}
        Freshness::Stale { age_ms } => println!("  Note: readings are {age_ms} ms old\n"),
        Freshness::Unavailable => {
            println!("  Resource telemetry is unavailable on this system.");
            println!("  Operations will proceed without resource checks.");
            return Ok(());
        }
    }

    // ── Memory ─────────────────────────────────────────────────
    println!("  Memory                                      [{}]", report.memory);
    let pct = snapshot.memory.used_percent();
    println!("   Total:        {} MB", snapshot.memory.total_mb());
    println!("   Available:    {} MB", snapshot.memory.available_mb());
    println!("   Used:         {pct:.1}%  {}", usage_bar(pct / 100.0));
    println!(
        "   Thresholds:   warn {:.0}%, critical {:.0}%",
        admission.memory_warning_percent, admission.memory_critical_percent
    );
    println!();

    // ── Disk ───────────────────────────────────────────────────
    println!("  Disk                                        [{}]", report.disk);
    let disk = &snapshot.disk;
    println!("   Volume:       {}", disk.mount_point.display());
    println!("   Free:         {} MB", disk.available_bytes / MB);
    if disk.total_bytes > 0 {
        let used = 1.0 - disk.available_bytes as f64 / disk.total_bytes as f64;
        println!("   Used:         {:.1}%  {}", used * 100.0, usage_bar(used));
    }
    println!(
        "   Thresholds:   warn below {}, critical below {}",
        admission.disk_warning, admission.disk_critical
    );
    println!();

    // ── Thermal ────────────────────────────────────────────────
    println!("  Thermal                                     [{}]", report.thermal);
    match snapshot.thermal.max_temp_celsius {
        Some(temp) => println!("   Temperature:  {temp:.1} C  {}", temp_bar(temp as f64)),
        None => println!("   Temperature:  not readable"),
    }
    println!("   Pressure:     {}", snapshot.thermal.pressure.as_str());
    println!();

    // ── Overall ────────────────────────────────────────────────
    println!("  Assessment");
    let verdict = match report.overall {
        ResourceStatus::Optimal => "System healthy",
        ResourceStatus::Warning => "Resources are getting low; large models may be rejected",
        ResourceStatus::Critical => "RESOURCE CRITICAL; operations are likely to be rejected",
    };
    println!("   Status:       {verdict}");
    println!();
    println!("{}", snapshot.summary());

    Ok(())
}

/// Creates a visual temperature bar (0-100 C scale).
fn temp_bar(celsius: f64) -> String {
    let filled = (((celsius / 100.0) * 20.0).round() as usize).min(20);
    let symbol = if celsius >= 80.0 {
        "#"
    } else if celsius >= 70.0 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(20 - filled))
}

/// Creates a visual usage bar (0.0-1.0 scale).
fn usage_bar(ratio: f64) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * 20.0).round() as usize).min(20);
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.8 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(20 - filled))
}
