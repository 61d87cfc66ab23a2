// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the runtime's recoverable surface.
//!
//! Only configuration-time failures are recoverable; the evaluation path
//! treats every violated precondition as fatal (see the crate docs).

/// Errors from the runtime's configuration surface.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A configuration value could not be parsed or applied.
    #[error("configuration error: {0}")]
    Config(String),

    /// The arena capacity string was invalid.
    #[error("capacity error: {0}")]
    Capacity(#[from] tensor_arena::ArenaError),

    /// A validator predicate failed on caller-constructed tensors.
    #[error("validation error: {0}")]
    Validation(#[from] crate::validate::ValidationError),
}
