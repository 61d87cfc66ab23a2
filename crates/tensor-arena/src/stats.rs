// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arena usage counters for profiling and diagnostics.

/// A point-in-time snapshot of an arena's usage counters.
///
/// Useful for sizing the capacity of an isolate: allocate the working set
/// once, read the stats, round up.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct ArenaStats {
    /// Fixed capacity of the region in bytes.
    pub capacity_bytes: usize,
    /// Bytes consumed so far, alignment padding included.
    pub bytes_allocated: usize,
    /// Number of allocations served.
    pub num_allocations: usize,
}

impl ArenaStats {
    /// Returns the consumed fraction of the region in `[0.0, 1.0]`.
    pub fn utilization(&self) -> f64 {
        if self.capacity_bytes == 0 {
            return 0.0;
        }
        self.bytes_allocated as f64 / self.capacity_bytes as f64
    }

    /// Returns a human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{:.3}/{:.1} MiB used ({:.1}%), {} allocations",
            self.bytes_allocated as f64 / (1024.0 * 1024.0),
            self.capacity_bytes as f64 / (1024.0 * 1024.0),
            self.utilization() * 100.0,
            self.num_allocations,
        )
    }
}
