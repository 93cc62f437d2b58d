// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared setup.

pub mod batch;
pub mod chat;
pub mod extract;
pub mod models;
pub mod status;
pub mod transcribe;

use anyhow::Context;
use error_taxonomy::DomainError;
use operations::{Operations, ToolConfig};
use resource_monitor::SystemTelemetry;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads `path`, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ToolConfig> {
    match path {
        Some(path) => {
            let config = ToolConfig::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        None => {
            tracing::debug!("no configuration file given, using defaults");
            Ok(ToolConfig::default())
        }
    }
}

/// Builds the façade over live system telemetry.
pub fn operations(config: ToolConfig) -> Operations {
    let telemetry = Arc::new(SystemTelemetry::new(config.telemetry.clone()));
    Operations::new(config, telemetry)
}

/// Prints a classified error with its recovery suggestion.
pub fn report(err: &DomainError) {
    eprintln!("  Error [{}]: {}", err.code(), err.user_message());
    eprintln!("  Help: {}", err.help_anchor());
}

/// Prints the restart hint once critical resource errors pile up.
pub fn suggest_restart(ops: &Operations) {
    if ops.should_suggest_restart() {
        eprintln!();
        eprintln!("  Resources have been critically low several times in a row.");
        eprintln!("  Consider closing other applications or restarting.");
    }
}

/// Fails the command with the domain error after printing it.
pub fn fail(err: DomainError) -> anyhow::Error {
    report(&err);
    anyhow::Error::new(err)
}

pub fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║ {:^52} ║", format!("wbridge · {title}"));
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}
