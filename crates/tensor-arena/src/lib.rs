// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-arena
//!
//! A fixed-capacity bump-pointer arena that owns all tensor storage for one
//! isolate.
//!
//! # Key Components
//!
//! - [`ArenaCapacity`] — the fixed region size, with human-readable parsing
//!   (`"64M"`, `"1G"`, …).
//! - [`Arena`] — the allocator: a single downward-moving watermark over a
//!   zero-initialized region, no individual free, fatal on exhaustion.
//! - [`ArenaStats`] — usage counters for capacity tuning.
//!
//! # Ownership Model
//!
//! ```text
//! Isolate ──owns──► Arena ──serves──► raw byte ranges
//!                     │
//!                     └── dropped with the isolate; every range dies with it
//! ```
//!
//! There is deliberately no per-allocation free and no failure value on the
//! allocation path: tensor storage that does not fit the configured region is
//! a configuration error, and the arena aborts with a diagnostic instead of
//! asking callers to handle it.
//!
//! # Example
//! ```
//! use tensor_arena::{Arena, ArenaCapacity};
//!
//! let arena = Arena::new(ArenaCapacity::parse("4K").unwrap());
//! let a = arena.alloc_raw(1024);
//! let b = arena.alloc_aligned(512, 32);
//! assert_eq!(b.as_ptr() as usize % 32, 0);
//! assert_eq!(arena.num_allocations(), 2);
//! assert!(arena.bytes_allocated() >= 1024 + 512);
//! # let _ = a;
//! ```

mod arena;
mod capacity;
mod error;
mod stats;

pub use arena::Arena;
pub use capacity::ArenaCapacity;
pub use error::ArenaError;
pub use stats::ArenaStats;
