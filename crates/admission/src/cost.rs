// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Estimated resource cost of one command.

/// Whether a command is a standalone operation or part of a batch.
/// Batches use a larger disk safety multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostKind {
    #[default]
    SingleFile,
    Batch,
}

/// What an operation is expected to consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceCost {
    /// Bytes the operation is expected to write.
    pub output_bytes: u64,
    /// Memory the worker is expected to need while running.
    pub memory_bytes: u64,
    pub kind: CostKind,
}

impl ResourceCost {
    pub fn single(output_bytes: u64, memory_bytes: u64) -> Self {
        Self {
            output_bytes,
            memory_bytes,
            kind: CostKind::SingleFile,
        }
    }

    pub fn batch(output_bytes: u64, memory_bytes: u64) -> Self {
        Self {
            output_bytes,
            memory_bytes,
            kind: CostKind::Batch,
        }
    }

    /// Disk space required: output size times `multiplier`, rounded up.
    pub fn required_disk(&self, multiplier: f64) -> u64 {
        if multiplier.fract() == 0.0 && multiplier >= 0.0 && multiplier <= u64::MAX as f64 {
            self.output_bytes.saturating_mul(multiplier as u64)
        } else {
            (self.output_bytes as f64 * multiplier).ceil() as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_disk_exact_for_integer_multipliers() {
        let cost = ResourceCost::single(10 * 1024 * 1024, 0);
        assert_eq!(cost.required_disk(2.0), 20 * 1024 * 1024);
        assert_eq!(ResourceCost::single(u64::MAX / 2 + 1, 0).required_disk(3.0), u64::MAX);
    }

    #[test]
    fn test_required_disk_rounds_up() {
        assert_eq!(ResourceCost::single(3, 0).required_disk(1.5), 5);
    }
}
