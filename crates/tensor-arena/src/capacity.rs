// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arena capacity configuration and parsing.
//!
//! An [`ArenaCapacity`] fixes the size of an arena region up front. It
//! supports human-readable string parsing for configuration ergonomics.

use crate::ArenaError;
use std::fmt;

/// The fixed byte capacity of an [`crate::Arena`] region.
///
/// # Parsing
/// Supports human-readable strings with binary-unit suffixes:
/// - `"512K"`, `"512KB"` or `"512KiB"` → 512 × 1024 bytes
/// - `"64M"`, `"64MB"` or `"64MiB"` → 64 × 1024² bytes
/// - `"1G"`, `"1GB"` or `"1GiB"` → 1 × 1024³ bytes
/// - `"4096"` → raw byte count
///
/// # Examples
/// ```
/// use tensor_arena::ArenaCapacity;
///
/// let c = ArenaCapacity::from_mib(64);
/// assert_eq!(c.as_mib(), 64);
///
/// let c = ArenaCapacity::parse("1G").unwrap();
/// assert_eq!(c.as_mib(), 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArenaCapacity {
    /// Capacity in bytes.
    bytes: usize,
}

impl ArenaCapacity {
    /// Creates a capacity from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a capacity from kibibytes.
    pub fn from_kib(kib: usize) -> Self {
        Self { bytes: kib << 10 }
    }

    /// Creates a capacity from mebibytes.
    pub fn from_mib(mib: usize) -> Self {
        Self { bytes: mib << 20 }
    }

    /// Creates a capacity from gibibytes.
    pub fn from_gib(gib: usize) -> Self {
        Self { bytes: gib << 30 }
    }

    /// Returns the capacity in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the capacity in kibibytes (truncated).
    pub fn as_kib(&self) -> usize {
        self.bytes >> 10
    }

    /// Returns the capacity in mebibytes (truncated).
    pub fn as_mib(&self) -> usize {
        self.bytes >> 20
    }

    /// Parses a human-readable capacity string.
    ///
    /// Accepted formats: `"512K"`, `"64M"`, `"1G"` (optionally with a `B` or
    /// `iB` tail), or a plain byte count like `"4096"`. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, ArenaError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ArenaError::InvalidCapacity {
                input: s.to_string(),
                detail: "empty capacity string".to_string(),
            });
        }

        let upper = trimmed.to_uppercase();
        let (num_str, shift) = if let Some(prefix) = strip_unit(&upper, 'G') {
            (prefix, 30)
        } else if let Some(prefix) = strip_unit(&upper, 'M') {
            (prefix, 20)
        } else if let Some(prefix) = strip_unit(&upper, 'K') {
            (prefix, 10)
        } else if let Some(prefix) = upper.strip_suffix('B') {
            (prefix.to_string(), 0)
        } else {
            (upper.clone(), 0)
        };

        let value: usize = num_str.trim().parse().map_err(|_| ArenaError::InvalidCapacity {
            input: s.to_string(),
            detail: "expected a number followed by an optional K/M/G suffix".to_string(),
        })?;

        let bytes = value
            .checked_mul(1usize << shift)
            .ok_or_else(|| ArenaError::InvalidCapacity {
                input: s.to_string(),
                detail: "capacity overflows usize".to_string(),
            })?;

        if bytes == 0 {
            return Err(ArenaError::InvalidCapacity {
                input: s.to_string(),
                detail: "capacity must be non-zero".to_string(),
            });
        }

        Ok(Self { bytes })
    }
}

/// Strips a unit suffix (`G`, `GB`, `GiB`, …) from an upper-cased string.
fn strip_unit(upper: &str, unit: char) -> Option<String> {
    for tail in [format!("{unit}IB"), format!("{unit}B"), format!("{unit}")] {
        if let Some(prefix) = upper.strip_suffix(&tail) {
            return Some(prefix.to_string());
        }
    }
    None
}

impl fmt::Display for ArenaCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= 1 << 30 && self.bytes % (1 << 30) == 0 {
            write!(f, "{} GiB", self.bytes >> 30)
        } else if self.bytes >= 1 << 20 && self.bytes % (1 << 20) == 0 {
            write!(f, "{} MiB", self.bytes >> 20)
        } else if self.bytes >= 1 << 10 && self.bytes % (1 << 10) == 0 {
            write!(f, "{} KiB", self.bytes >> 10)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}
