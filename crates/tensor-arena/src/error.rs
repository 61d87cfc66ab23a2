// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for arena configuration.
//!
//! Only the configuration-time surface is fallible. Allocation failure is a
//! programming error and aborts instead of surfacing here.

/// Errors that can occur while configuring an arena.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// The capacity string could not be parsed.
    #[error("invalid arena capacity '{input}': {detail}")]
    InvalidCapacity { input: String, detail: String },
}
