// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration, constructed programmatically or parsed from TOML.
//!
//! # TOML Format
//! ```toml
//! isolate_name = "training"
//! device = "Cpu"
//! arena_capacity = "64M"
//! eval_order = "left-to-right"
//! ```
//!
//! The core itself reads no files and no environment; this type exists so
//! embedding applications can describe an isolate in their own config and
//! hand the parsing here.

use crate::{EvalOrder, RuntimeError};
use tensor_arena::ArenaCapacity;
use tensor_core::{ComputeDevice, Isolate, IsolateRef};

/// Describes an isolate and how to evaluate graphs in it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Name of the isolate to create.
    pub isolate_name: String,
    /// Target compute device.
    #[serde(default = "default_device")]
    pub device: ComputeDevice,
    /// Arena capacity, human-readable (e.g. `"64M"`).
    pub arena_capacity: String,
    /// Sibling visit order for graph evaluation.
    #[serde(default)]
    pub eval_order: EvalOrder,
}

fn default_device() -> ComputeDevice {
    ComputeDevice::AutoSelect
}

impl RuntimeConfig {
    /// Parses a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        toml::from_str(toml_str).map_err(|e| RuntimeError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the arena capacity string.
    pub fn parse_capacity(&self) -> Result<ArenaCapacity, RuntimeError> {
        Ok(ArenaCapacity::parse(&self.arena_capacity)?)
    }

    /// Creates the isolate this configuration describes.
    ///
    /// The runtime must already be initialized; a bad capacity string is a
    /// recoverable error, everything past that follows the fatal rules of
    /// [`Isolate::create`].
    pub fn build_isolate(&self) -> Result<IsolateRef, RuntimeError> {
        let capacity = self.parse_capacity()?;
        Ok(Isolate::create(
            self.isolate_name.clone(),
            self.device,
            capacity,
        ))
    }
}
