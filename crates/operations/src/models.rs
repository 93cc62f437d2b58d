// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Known whisper.cpp models and their resource footprints.
//!
//! Sizes are approximate and in megabytes: `disk_mb` is the model file,
//! `ram_mb` the resident memory while transcribing.

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "large-v3-turbo";

/// Footprint of one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub disk_mb: u64,
    pub ram_mb: u64,
}

impl ModelSpec {
    /// The on-disk file name, e.g. `ggml-base.bin`.
    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self.name)
    }

    pub fn disk_bytes(&self) -> u64 {
        self.disk_mb * 1024 * 1024
    }

    pub fn ram_bytes(&self) -> u64 {
        self.ram_mb * 1024 * 1024
    }
}

const fn spec(name: &'static str, disk_mb: u64, ram_mb: u64) -> ModelSpec {
    ModelSpec {
        name,
        disk_mb,
        ram_mb,
    }
}

pub static MODELS: &[ModelSpec] = &[
    spec("tiny", 75, 300),
    spec("base", 140, 500),
    spec("small", 450, 1024),
    spec("medium", 1500, 2500),
    spec("large", 3000, 4500),
    spec("large-v1", 3000, 4500),
    spec("large-v2", 3000, 4500),
    spec("large-v3", 3000, 4500),
    spec("large-v3-turbo", 1500, 3000),
];

/// Looks up a model by exact name.
pub fn lookup(name: &str) -> Option<&'static ModelSpec> {
    MODELS.iter().find(|m| m.name == name)
}
