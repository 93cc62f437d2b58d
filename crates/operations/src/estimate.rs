// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Resource cost estimation per command.
//!
//! Output bytes are the input file size for transcription and extraction
//! and the model file size for downloads. Memory is the model's resident
//! footprint for transcription, which loads it, and a flat allowance for
//! everything else. A download only writes the model to disk.

use crate::models;
use admission::{ByteSize, ResourceCost};
use process_bridge::Command;

/// Memory reserved for commands that do not load a model.
pub const FLAT_MEMORY: ByteSize = ByteSize::from_mb(512);

/// Estimated cost of `command`; `input_size` is the size of its input file.
pub fn estimate(command: &Command, input_size: u64) -> ResourceCost {
    let flat = FLAT_MEMORY.as_bytes();
    match command {
        Command::Transcribe(p) => ResourceCost::single(input_size, model_ram(&p.model, flat)),
        Command::ExtractAudio(_) => ResourceCost::single(input_size, flat),
        Command::DownloadModel(p) => {
            let disk = models::lookup(&p.model).map_or(0, |m| m.disk_bytes());
            ResourceCost::single(disk, flat)
        }
        Command::ListModels(_) | Command::ChatbotQuery(_) => ResourceCost::single(0, flat),
    }
}

/// Cost of a batch: summed output, largest single memory need.
pub fn estimate_batch(costs: &[ResourceCost]) -> ResourceCost {
    let output = costs.iter().map(|c| c.output_bytes).sum();
    let memory = costs.iter().map(|c| c.memory_bytes).max().unwrap_or(0);
    ResourceCost::batch(output, memory)
}

fn model_ram(name: &str, fallback: u64) -> u64 {
    models::lookup(name).map_or(fallback, |m| m.ram_bytes())
}
