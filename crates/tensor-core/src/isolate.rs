// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Isolates: independent tensor-allocation contexts.
//!
//! An [`Isolate`] owns one [`Arena`] and is the only factory for tensors;
//! every tensor it creates stores its data in that arena and holds the
//! isolate alive through its handle, so tensor storage can never dangle.
//! Isolates are independent — nothing is shared between two isolates — but
//! at most one *live* isolate may carry a given name within the process.
//!
//! Process-wide, a single atomic flag gates the runtime: [`init_runtime`]
//! must run before the first isolate is created, and [`shutdown_runtime`]
//! after the last one is gone.

use crate::tensor::{Tensor, TensorRef};
use crate::{OpCode, Shape};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tensor_arena::{Arena, ArenaCapacity};

/// Shared handle to an isolate.
pub type IsolateRef = Rc<Isolate>;

/// The compute device an isolate targets.
///
/// Only the CPU backend is functional; `AutoSelect` resolves to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ComputeDevice {
    /// Pick the best available device (currently always the CPU).
    AutoSelect,
    /// The host CPU.
    Cpu,
}

impl ComputeDevice {
    /// Resolves `AutoSelect` to a concrete device.
    pub fn resolve(self) -> ComputeDevice {
        match self {
            ComputeDevice::AutoSelect | ComputeDevice::Cpu => ComputeDevice::Cpu,
        }
    }

    /// Returns a human-readable label.
    pub fn name(self) -> &'static str {
        match self {
            ComputeDevice::AutoSelect => "Auto Select",
            ComputeDevice::Cpu => "CPU",
        }
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gate for the process-wide runtime state.
static RUNTIME_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Names of all live isolates in this process.
static ISOLATE_NAMES: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Initializes the process-wide runtime.
///
/// Installs the tracing subscriber on first use and sets the runtime flag.
/// Idempotent: a repeated call warns and succeeds.
pub fn init_runtime() -> bool {
    if RUNTIME_INITIALIZED.load(Ordering::SeqCst) {
        tracing::warn!("runtime already initialized");
        return true;
    }
    // try_init tolerates an ambient subscriber (tests, embedding hosts).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    RUNTIME_INITIALIZED.store(true, Ordering::SeqCst);
    tracing::info!("runtime initialized");
    true
}

/// Shuts the process-wide runtime down.
///
/// Idempotent: a repeated call warns and returns.
pub fn shutdown_runtime() {
    if !RUNTIME_INITIALIZED.load(Ordering::SeqCst) {
        tracing::warn!("runtime not initialized");
        return;
    }
    tracing::info!("runtime shutdown");
    RUNTIME_INITIALIZED.store(false, Ordering::SeqCst);
}

/// Returns the state of the runtime gate.
pub fn runtime_initialized() -> bool {
    RUNTIME_INITIALIZED.load(Ordering::SeqCst)
}

/// An independent tensor-allocation context with its own arena.
///
/// # Example
/// ```
/// use tensor_arena::ArenaCapacity;
/// use tensor_core::{init_runtime, ComputeDevice, Isolate};
///
/// init_runtime();
/// let iso = Isolate::create("doc", ComputeDevice::Cpu, ArenaCapacity::from_kib(4));
/// let t = iso.new_tensor(&[2, 2]);
/// assert_eq!(t.elem_count(), 4);
/// ```
pub struct Isolate {
    name: String,
    device: ComputeDevice,
    arena: Arena,
}

impl Isolate {
    /// Creates an isolate with its own arena of the given capacity.
    ///
    /// # Panics
    /// Panics when the runtime is not initialized or a live isolate already
    /// carries `name`. Both are programming errors.
    pub fn create(
        name: impl Into<String>,
        device: ComputeDevice,
        capacity: ArenaCapacity,
    ) -> IsolateRef {
        let name = name.into();
        if !runtime_initialized() {
            tracing::error!("isolate '{name}' created before runtime initialization");
            panic!("isolate '{name}' created before runtime initialization");
        }
        let duplicate = {
            let mut names = ISOLATE_NAMES.lock().unwrap_or_else(|e| e.into_inner());
            if names.iter().any(|n| n == &name) {
                true
            } else {
                names.push(name.clone());
                false
            }
        };
        if duplicate {
            tracing::error!("isolate '{name}' already exists in this process");
            panic!("isolate '{name}' already exists in this process");
        }
        let device = device.resolve();
        tracing::info!("creating isolate '{name}', device '{device}', arena {capacity}");
        Rc::new(Self {
            name,
            device,
            arena: Arena::new(capacity),
        })
    }

    /// Returns the isolate's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resolved compute device.
    pub fn device(&self) -> ComputeDevice {
        self.device
    }

    /// Returns the arena backing this isolate's tensors.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Allocates a zeroed leaf tensor of the given dimensions.
    pub fn new_tensor(self: &Rc<Self>, dims: &[usize]) -> TensorRef {
        Tensor::alloc(self, Shape::new(dims), None, OpCode::Nop, SmallVec::new())
    }

    /// Allocates a leaf tensor and copies `data` into its storage.
    ///
    /// # Panics
    /// Panics when `data.len()` differs from the product of `dims`.
    pub fn new_tensor_with_data(self: &Rc<Self>, dims: &[usize], data: &[f32]) -> TensorRef {
        let t = self.new_tensor(dims);
        t.copy_from(data);
        t
    }

    /// Allocates a tensor aliasing `parent`'s storage at byte `offset`.
    ///
    /// A slice of a slice is flattened to reference the ultimate base with
    /// the offsets summed.
    ///
    /// # Panics
    /// Panics when the slice extent does not fit inside the parent.
    pub fn new_tensor_slice(
        self: &Rc<Self>,
        dims: &[usize],
        parent: &TensorRef,
        offset: usize,
    ) -> TensorRef {
        Tensor::alloc(
            self,
            Shape::new(dims),
            Some((parent, offset)),
            OpCode::Nop,
            SmallVec::new(),
        )
    }

    /// Allocates a tensor recording an operation node of the DAG.
    pub(crate) fn new_node(
        self: &Rc<Self>,
        shape: Shape,
        op: OpCode,
        operands: SmallVec<[TensorRef; 2]>,
    ) -> TensorRef {
        Tensor::alloc(self, shape, None, op, operands)
    }
}

impl Drop for Isolate {
    fn drop(&mut self) {
        let mut names = ISOLATE_NAMES.lock().unwrap_or_else(|e| e.into_inner());
        names.retain(|n| n != &self.name);
        drop(names);
        tracing::info!(
            "destroying isolate '{}' ({} allocations, {} bytes)",
            self.name,
            self.arena.num_allocations(),
            self.arena.bytes_allocated()
        );
    }
}

impl fmt::Debug for Isolate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Isolate")
            .field("name", &self.name)
            .field("device", &self.device)
            .field("arena", &self.arena)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create() {
        init_runtime();
        let iso = Isolate::create("isolate-create", ComputeDevice::Cpu, ArenaCapacity::from_bytes(4096));
        assert_eq!(iso.name(), "isolate-create");
        assert_eq!(iso.device(), ComputeDevice::Cpu);
        assert_eq!(iso.arena().capacity(), 4096);
    }

    #[test]
    fn test_auto_select_resolves_to_cpu() {
        init_runtime();
        let iso = Isolate::create(
            "isolate-auto",
            ComputeDevice::AutoSelect,
            ArenaCapacity::from_kib(4),
        );
        assert_eq!(iso.device(), ComputeDevice::Cpu);
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn test_duplicate_name_is_fatal() {
        init_runtime();
        let _a = Isolate::create("isolate-dup", ComputeDevice::Cpu, ArenaCapacity::from_kib(4));
        let _b = Isolate::create("isolate-dup", ComputeDevice::Cpu, ArenaCapacity::from_kib(4));
    }

    #[test]
    fn test_name_released_on_drop() {
        init_runtime();
        {
            let _a = Isolate::create("isolate-reuse", ComputeDevice::Cpu, ArenaCapacity::from_kib(4));
        }
        // The first isolate is gone; the name is free again.
        let _b = Isolate::create("isolate-reuse", ComputeDevice::Cpu, ArenaCapacity::from_kib(4));
    }

    #[test]
    fn test_isolates_are_independent() {
        init_runtime();
        let a = Isolate::create("isolate-ind-a", ComputeDevice::Cpu, ArenaCapacity::from_kib(4));
        let b = Isolate::create("isolate-ind-b", ComputeDevice::Cpu, ArenaCapacity::from_kib(4));
        let _t = a.new_tensor(&[8]);
        assert_eq!(a.arena().num_allocations(), 1);
        assert_eq!(b.arena().num_allocations(), 0);
    }

    #[test]
    fn test_device_display() {
        assert_eq!(ComputeDevice::Cpu.to_string(), "CPU");
        assert_eq!(ComputeDevice::AutoSelect.to_string(), "Auto Select");
    }
}
