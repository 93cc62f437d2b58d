// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Human-readable byte sizes for thresholds.

use crate::AdmissionError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;
const TIB: u64 = 1024 * GIB;

/// A byte count that reads and writes as `"5G"`, `"512 MB"`, `"2048K"`.
///
/// Suffixes are binary (`1K = 1024`). In configuration files either a
/// string or a plain integer byte count is accepted.
///
/// ```
/// use admission::ByteSize;
///
/// assert_eq!(ByteSize::parse("2G").unwrap(), ByteSize::from_gb(2));
/// assert_eq!(ByteSize::from_mb(512).to_string(), "512 MB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn from_mb(mb: u64) -> Self {
        Self(mb * MIB)
    }

    pub const fn from_gb(gb: u64) -> Self {
        Self(gb * GIB)
    }

    pub const fn as_bytes(&self) -> u64 {
        self.0
    }

    /// Megabytes, truncated.
    pub const fn as_mb(&self) -> u64 {
        self.0 / MIB
    }

    /// Parses `"512M"`, `"512MB"`, `"1G"`, `"1 GB"`, `"2048K"`, `"1T"` or a
    /// plain byte count. Case-insensitive; zero is allowed.
    pub fn parse(s: &str) -> Result<Self, AdmissionError> {
        let input = s.trim();
        let upper = input.to_ascii_uppercase();
        let invalid = || AdmissionError::InvalidSize {
            input: s.to_string(),
        };

        let digits_end = upper
            .find(|c: char| !(c.is_ascii_digit()))
            .unwrap_or(upper.len());
        let (number, suffix) = upper.split_at(digits_end);
        if number.is_empty() {
            return Err(invalid());
        }

        let multiplier = match suffix.trim() {
            "" | "B" => 1,
            "K" | "KB" => KIB,
            "M" | "MB" => MIB,
            "G" | "GB" => GIB,
            "T" | "TB" => TIB,
            _ => return Err(invalid()),
        };

        let value: u64 = number.parse().map_err(|_| invalid())?;
        value
            .checked_mul(multiplier)
            .map(Self)
            .ok_or_else(|| AdmissionError::SizeOverflow {
                input: s.to_string(),
            })
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        if b >= TIB && b % TIB == 0 {
            write!(f, "{} TB", b / TIB)
        } else if b >= GIB && b % GIB == 0 {
            write!(f, "{} GB", b / GIB)
        } else if b >= MIB && b % MIB == 0 {
            write!(f, "{} MB", b / MIB)
        } else if b >= KIB && b % KIB == 0 {
            write!(f, "{} KB", b / KIB)
        } else {
            write!(f, "{b} B")
        }
    }
}

impl Serialize for ByteSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ByteSizeVisitor;

        impl Visitor<'_> for ByteSizeVisitor {
            type Value = ByteSize;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte count or a size string like \"5G\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ByteSize, E> {
                Ok(ByteSize(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ByteSize, E> {
                u64::try_from(v)
                    .map(ByteSize)
                    .map_err(|_| E::custom("size must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ByteSize, E> {
                ByteSize::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ByteSizeVisitor)
    }
}
