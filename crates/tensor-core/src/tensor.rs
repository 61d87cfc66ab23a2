// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type: an n-dimensional f32 array backed by arena memory,
//! doubling as a vertex of the computation DAG.
//!
//! A [`Tensor`] is created only through its isolate's factory methods and is
//! never resized or restored after construction. The handle type
//! [`TensorRef`] is a cheap clone; the tensor (and transitively its isolate
//! and arena) lives for as long as any handle does.
//!
//! # Graph building
//! Arithmetic on handles is *lazy*: `&a + &b` allocates a result tensor that
//! records [`OpCode::Add`] and its two operands without computing anything.
//! The graph evaluator or an eager kernel call fills the storage later.
//!
//! # Memory discipline
//! Storage bytes live in the isolate's arena and are reached through raw
//! pointers. Metadata is immutable after construction; the bytes of a tensor
//! are written only by fills, bulk copies, and kernels that target it as
//! their result. Kernel threads write disjoint row ranges, so no two writers
//! ever alias.

use crate::isolate::IsolateRef;
use crate::shape::{ELEM_SIZE, MAX_DIMS};
use crate::{OpCode, Shape};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::{smallvec, SmallVec};
use std::cell::RefCell;
use std::fmt;
use std::ops::{Add, Deref, Div, Mul, Sub};
use std::ptr::NonNull;
use std::rc::Rc;

/// Maximum number of operands a DAG node can record.
pub const MAX_OPERANDS: usize = 2;

/// Maximum stored length of a tensor name, in bytes.
pub const MAX_NAME: usize = 128;

/// Shared handle to a [`Tensor`].
///
/// Handles are reference-counted; cloning one is two pointer bumps. All
/// graph-building operators live on the handle because a new node must hold
/// handles to its operands.
#[derive(Clone)]
pub struct TensorRef(Rc<Tensor>);

/// An n-dimensional array of f32 values inside an isolate's arena, and a
/// vertex in the computation DAG.
pub struct Tensor {
    /// Owning back-reference; keeps the arena alive while handles exist.
    isolate: IsolateRef,
    /// Diagnostic name, truncated to [`MAX_NAME`] bytes.
    name: RefCell<String>,
    /// Dimensions and byte strides.
    shape: Shape,
    /// First element, inside the arena region.
    data: NonNull<u8>,
    /// Total payload size in bytes.
    size_bytes: usize,
    /// Ultimate base tensor when this is a slice view.
    base: Option<TensorRef>,
    /// Byte offset into the base tensor's storage.
    base_offset: usize,
    /// The operation producing this tensor; `Nop` for leaves.
    op: OpCode,
    /// DAG children; empty for leaves.
    operands: SmallVec<[TensorRef; MAX_OPERANDS]>,
}

impl Tensor {
    /// Allocates a tensor inside `isolate`'s arena, or diverts its storage
    /// into `slice`'s parent when given.
    ///
    /// # Panics
    /// Panics when a slice extent overflows its parent's storage, or when
    /// more than [`MAX_OPERANDS`] operands are recorded.
    pub(crate) fn alloc(
        isolate: &IsolateRef,
        shape: Shape,
        slice: Option<(&TensorRef, usize)>,
        op: OpCode,
        operands: SmallVec<[TensorRef; MAX_OPERANDS]>,
    ) -> TensorRef {
        assert!(
            operands.len() <= MAX_OPERANDS,
            "a tensor records at most {MAX_OPERANDS} operands"
        );
        let size_bytes = ELEM_SIZE * shape.elem_count();
        let (data, base, base_offset) = match slice {
            Some((parent, offset)) => {
                // A slice of a slice references the ultimate base directly.
                let (base, offset) = match parent.slice_base() {
                    Some(root) => (root.clone(), parent.slice_offset() + offset),
                    None => (parent.clone(), offset),
                };
                if offset + size_bytes > base.size_bytes() {
                    tracing::error!(
                        "slice of {size_bytes} bytes at offset {offset} overflows base tensor ({} bytes)",
                        base.size_bytes()
                    );
                    panic!("slice extent out of range of its base tensor");
                }
                // SAFETY: offset + size_bytes lies inside the base tensor's
                // allocation, checked above.
                let ptr = unsafe { NonNull::new_unchecked(base.ptr().add(offset)) };
                (ptr, Some(base), offset)
            }
            None => {
                let ptr = isolate.arena().alloc_aligned(size_bytes, ELEM_SIZE);
                (ptr, None, 0)
            }
        };
        TensorRef(Rc::new(Tensor {
            isolate: Rc::clone(isolate),
            name: RefCell::new(String::new()),
            shape,
            data,
            size_bytes,
            base,
            base_offset,
            op,
            operands,
        }))
    }

    /// Returns the isolate that owns this tensor's storage.
    pub fn isolate(&self) -> &IsolateRef {
        &self.isolate
    }

    /// Returns the shape descriptor.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the number of semantically used axes.
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Returns all four dimensions; unused trailing entries are 1.
    pub fn dims(&self) -> &[usize; MAX_DIMS] {
        self.shape.dims()
    }

    /// Returns all four byte strides.
    pub fn strides(&self) -> &[usize; MAX_DIMS] {
        self.shape.strides()
    }

    /// Returns the total number of elements.
    pub fn elem_count(&self) -> usize {
        self.shape.elem_count()
    }

    /// Returns the number of rows (product of axes 1..=3).
    pub fn row_count(&self) -> usize {
        self.shape.row_count()
    }

    /// Returns the number of columns (`dims[0]`).
    pub fn col_count(&self) -> usize {
        self.shape.col_count()
    }

    /// Returns the payload size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Returns the raw byte pointer to the first element.
    pub fn ptr(&self) -> *mut u8 {
        self.data.as_ptr()
    }

    /// Returns the storage as a typed span.
    pub fn data(&self) -> &[f32] {
        // SAFETY: the storage is an arena range of exactly elem_count()
        // f32 slots, 4-byte aligned at allocation; see the module notes on
        // write discipline.
        unsafe { std::slice::from_raw_parts(self.data.as_ptr() as *const f32, self.elem_count()) }
    }

    /// Returns the storage as a mutable typed span.
    ///
    /// The caller must be the sole writer for the duration of the borrow;
    /// the validators guarantee this for kernel result tensors.
    #[allow(clippy::mut_from_ref)]
    pub fn data_mut(&self) -> &mut [f32] {
        // SAFETY: as in `data`; writers target disjoint tensors (or disjoint
        // row ranges of one result tensor) by construction.
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr() as *mut f32, self.elem_count()) }
    }

    /// Returns the ultimate base tensor when this tensor is a slice view.
    pub fn slice_base(&self) -> Option<&TensorRef> {
        self.base.as_ref()
    }

    /// Returns the byte offset into the base tensor's storage.
    pub fn slice_offset(&self) -> usize {
        self.base_offset
    }

    /// Returns the opcode recorded for this tensor (`Nop` for leaves).
    pub fn opcode(&self) -> OpCode {
        self.op
    }

    /// Returns the DAG children of this tensor.
    pub fn operands(&self) -> &[TensorRef] {
        &self.operands
    }

    /// Returns the diagnostic name (empty by default).
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// Sets the diagnostic name, truncating to [`MAX_NAME`] bytes.
    pub fn set_name(&self, name: &str) {
        let mut truncated = name.to_string();
        if truncated.len() > MAX_NAME {
            let mut cut = MAX_NAME;
            while !truncated.is_char_boundary(cut) {
                cut -= 1;
            }
            truncated.truncate(cut);
        }
        *self.name.borrow_mut() = truncated;
    }

    /// Reads the element at the 4-tuple `idx`, honouring strides.
    pub fn get(&self, idx: [usize; MAX_DIMS]) -> f32 {
        let off = self.shape.offset(idx);
        debug_assert!(off + ELEM_SIZE <= self.size_bytes.max(self.base_extent()));
        // SAFETY: the offset stays inside this tensor's (or its base's)
        // storage for every valid index tuple.
        unsafe { (self.data.as_ptr().add(off) as *const f32).read() }
    }

    /// Writes the element at the 4-tuple `idx`, honouring strides.
    pub fn set(&self, idx: [usize; MAX_DIMS], value: f32) {
        let off = self.shape.offset(idx);
        debug_assert!(off + ELEM_SIZE <= self.size_bytes.max(self.base_extent()));
        // SAFETY: as in `get`.
        unsafe { (self.data.as_ptr().add(off) as *mut f32).write(value) }
    }

    /// Reads the element at flat index `i`.
    ///
    /// Dense tensors take the contiguous fast path; any other layout
    /// unrolls the index against the shape.
    pub fn get_flat(&self, i: usize) -> f32 {
        if self.shape.is_dense() {
            self.data()[i]
        } else {
            self.get(self.shape.unroll_index(i))
        }
    }

    /// Writes the element at flat index `i`.
    pub fn set_flat(&self, i: usize, value: f32) {
        if self.shape.is_dense() {
            self.data_mut()[i] = value;
        } else {
            self.set(self.shape.unroll_index(i), value);
        }
    }

    /// Zeroes the storage.
    pub fn fill_zero(&self) {
        // SAFETY: writes exactly the tensor's own extent.
        unsafe { std::ptr::write_bytes(self.data.as_ptr(), 0, self.size_bytes) };
    }

    /// Fills the storage with a constant.
    pub fn fill(&self, value: f32) {
        self.data_mut().fill(value);
    }

    /// Fills the storage with 1.0.
    pub fn fill_one(&self) {
        self.fill(1.0);
    }

    /// Fills the storage with uniform random values in `[min, max]`.
    pub fn fill_random(&self, min: f32, max: f32) {
        let mut rng = rand::thread_rng();
        let dist = Uniform::new_inclusive(min, max);
        for x in self.data_mut() {
            *x = dist.sample(&mut rng);
        }
    }

    /// Fills the storage with uniform random values in `[min, max]` from a
    /// deterministic generator.
    pub fn fill_random_seeded(&self, min: f32, max: f32, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Uniform::new_inclusive(min, max);
        for x in self.data_mut() {
            *x = dist.sample(&mut rng);
        }
    }

    /// Copies `values` into the storage.
    ///
    /// # Panics
    /// Panics when the length differs from the element count.
    pub fn copy_from(&self, values: &[f32]) {
        assert_eq!(
            values.len(),
            self.elem_count(),
            "initializer length {} does not match element count {}",
            values.len(),
            self.elem_count()
        );
        self.data_mut().copy_from_slice(values);
    }

    /// Copies the storage out into a vector.
    pub fn to_vec(&self) -> Vec<f32> {
        self.data().to_vec()
    }

    /// Byte extent of the base tensor, or 0 when this is not a slice.
    fn base_extent(&self) -> usize {
        self.base.as_ref().map_or(0, |b| b.size_bytes())
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.borrow();
        if !name.is_empty() {
            write!(f, "Tensor '{name}': ")?;
        } else {
            write!(f, "Tensor ")?;
        }
        let d = self.shape.dims();
        let s = self.shape.strides();
        write!(
            f,
            "f32 {}D, shape [{} X {} X {} X {}], strides [{}B X {}B X {}B X {}B], {}",
            self.shape.rank(),
            d[0],
            d[1],
            d[2],
            d[3],
            s[0],
            s[1],
            s[2],
            s[3],
            format_size(self.size_bytes),
        )
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("name", &*self.name.borrow())
            .field("shape", &self.shape)
            .field("op", &self.op)
            .field("operands", &self.operands.len())
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

/// Formats a byte count with the largest fitting binary unit.
fn format_size(bytes: usize) -> String {
    if bytes >= 1 << 30 {
        format!("{:.1} GiB", bytes as f64 / (1u64 << 30) as f64)
    } else if bytes >= 1 << 20 {
        format!("{:.1} MiB", bytes as f64 / (1 << 20) as f64)
    } else if bytes >= 1 << 10 {
        format!("{:.1} KiB", bytes as f64 / (1 << 10) as f64)
    } else {
        format!("{bytes} B")
    }
}

impl Deref for TensorRef {
    type Target = Tensor;

    fn deref(&self) -> &Tensor {
        &self.0
    }
}

impl fmt::Debug for TensorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for TensorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl TensorRef {
    /// Returns `true` when two handles point at the same tensor.
    pub fn same_tensor(&self, other: &TensorRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Stable identity of the underlying tensor, for visited sets.
    pub fn node_id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Creates a tensor of the same shape with fresh zeroed storage.
    pub fn isomorphic_clone(&self) -> TensorRef {
        Tensor::alloc(
            self.isolate(),
            Shape::new(self.shape().used_dims()),
            None,
            OpCode::Nop,
            SmallVec::new(),
        )
    }

    /// Creates a tensor of the same shape with the contents copied.
    pub fn deep_clone(&self) -> TensorRef {
        let clone = self.isomorphic_clone();
        clone.copy_from(self.data());
        clone
    }

    /// Creates a view sharing this tensor's storage, strides included.
    pub fn sliced_clone(&self) -> TensorRef {
        Tensor::alloc(
            self.isolate(),
            self.shape().clone(),
            Some((self, 0)),
            OpCode::Nop,
            SmallVec::new(),
        )
    }

    /// Creates a view with axes 0 and 1 swapped in both dims and strides.
    ///
    /// The view shares this tensor's storage; no data moves.
    pub fn transposed_clone(&self) -> TensorRef {
        Tensor::alloc(
            self.isolate(),
            self.shape().transposed(),
            Some((self, 0)),
            OpCode::Nop,
            SmallVec::new(),
        )
    }

    /// Records a unary DAG node over this tensor.
    fn unary_node(&self, op: OpCode) -> TensorRef {
        self.isolate().new_node(
            Shape::new(self.shape().used_dims()),
            op,
            smallvec![self.clone()],
        )
    }

    /// Records a binary element-wise DAG node over this tensor and `rhs`.
    fn binary_node(&self, op: OpCode, rhs: &TensorRef) -> TensorRef {
        self.isolate().new_node(
            Shape::new(self.shape().used_dims()),
            op,
            smallvec![self.clone(), rhs.clone()],
        )
    }

    /// Records a softmax (exponential numerator) node.
    pub fn softmax(&self) -> TensorRef {
        self.unary_node(OpCode::Softmax)
    }

    /// Records a sigmoid node.
    pub fn sigmoid(&self) -> TensorRef {
        self.unary_node(OpCode::Sigmoid)
    }

    /// Records a hyperbolic-tangent node.
    pub fn tanh(&self) -> TensorRef {
        self.unary_node(OpCode::Tanh)
    }

    /// Records a ReLU node.
    pub fn relu(&self) -> TensorRef {
        self.unary_node(OpCode::Relu)
    }

    /// Records a GELU node.
    pub fn gelu(&self) -> TensorRef {
        self.unary_node(OpCode::Gelu)
    }

    /// Records a SiLU node.
    pub fn silu(&self) -> TensorRef {
        self.unary_node(OpCode::Silu)
    }

    /// Records a matrix-multiply node.
    ///
    /// Both operands carry the reduction axis K as their leading axis:
    /// `self` is `[K, M, …]`, `rhs` is `[K, N, …]`, and the result is
    /// `[N, M, …]` with `rhs`'s outer axes.
    pub fn matmul(&self, rhs: &TensorRef) -> TensorRef {
        let x = self.shape().dims();
        let y = rhs.shape().dims();
        let dims = [y[1], x[1], y[2], y[3]];
        let rank = self.rank().max(rhs.rank()).max(2);
        self.isolate().new_node(
            Shape::new(&dims[..rank]),
            OpCode::MatMul,
            smallvec![self.clone(), rhs.clone()],
        )
    }
}

impl Add for &TensorRef {
    type Output = TensorRef;

    fn add(self, rhs: &TensorRef) -> TensorRef {
        self.binary_node(OpCode::Add, rhs)
    }
}

impl Sub for &TensorRef {
    type Output = TensorRef;

    fn sub(self, rhs: &TensorRef) -> TensorRef {
        self.binary_node(OpCode::Sub, rhs)
    }
}

impl Mul for &TensorRef {
    type Output = TensorRef;

    fn mul(self, rhs: &TensorRef) -> TensorRef {
        self.binary_node(OpCode::Mul, rhs)
    }
}

impl Div for &TensorRef {
    type Output = TensorRef;

    fn div(self, rhs: &TensorRef) -> TensorRef {
        self.binary_node(OpCode::Div, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isolate::{init_runtime, ComputeDevice, Isolate};
    use tensor_arena::ArenaCapacity;

    fn isolate(name: &str) -> IsolateRef {
        init_runtime();
        Isolate::create(name, ComputeDevice::Cpu, ArenaCapacity::from_kib(64))
    }

    #[test]
    fn test_create_1d() {
        let iso = isolate("tensor-1d");
        let t = iso.new_tensor(&[25]);
        assert_eq!(t.rank(), 1);
        assert_eq!(t.size_bytes(), 25 * ELEM_SIZE);
        assert_eq!(t.data().len(), 25);
        assert_eq!(t.dims(), &[25, 1, 1, 1]);
        assert_eq!(t.strides(), &[4, 100, 100, 100]);
        assert_eq!(t.opcode(), OpCode::Nop);
        assert!(t.operands().is_empty());
    }

    #[test]
    fn test_create_4d() {
        let iso = isolate("tensor-4d");
        let t = iso.new_tensor(&[4, 4, 8, 3]);
        assert_eq!(t.rank(), 4);
        assert_eq!(t.elem_count(), 4 * 4 * 8 * 3);
        assert_eq!(t.strides(), &[4, 16, 64, 512]);
        assert_eq!(t.row_count(), 4 * 8 * 3);
        assert_eq!(t.col_count(), 4);
    }

    #[test]
    fn test_new_tensor_is_zeroed() {
        let iso = isolate("tensor-zeroed");
        let t = iso.new_tensor(&[16, 4]);
        assert!(t.data().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_with_data() {
        let iso = isolate("tensor-with-data");
        let t = iso.new_tensor_with_data(&[2, 2], &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(t.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    #[should_panic(expected = "initializer length")]
    fn test_with_data_length_mismatch() {
        let iso = isolate("tensor-data-mismatch");
        let _ = iso.new_tensor_with_data(&[2, 2], &[1.0, 2.0]);
    }

    #[test]
    fn test_fills() {
        let iso = isolate("tensor-fills");
        let t = iso.new_tensor(&[8]);
        t.fill(3.5);
        assert!(t.data().iter().all(|&x| x == 3.5));
        t.fill_one();
        assert!(t.data().iter().all(|&x| x == 1.0));
        t.fill_zero();
        assert!(t.data().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_fill_random_seeded_is_deterministic() {
        let iso = isolate("tensor-random");
        let a = iso.new_tensor(&[64]);
        let b = iso.new_tensor(&[64]);
        a.fill_random_seeded(-1.0, 1.0, 42);
        b.fill_random_seeded(-1.0, 1.0, 42);
        assert_eq!(a.data(), b.data());
        assert!(a.data().iter().all(|&x| (-1.0..=1.0).contains(&x)));
    }

    #[test]
    fn test_scalar_indexing() {
        let iso = isolate("tensor-indexing");
        let t = iso.new_tensor(&[3, 2]);
        t.copy_from(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(t.get([0, 0, 0, 0]), 0.0);
        assert_eq!(t.get([2, 0, 0, 0]), 2.0);
        assert_eq!(t.get([0, 1, 0, 0]), 3.0);
        assert_eq!(t.get_flat(4), 4.0);
        t.set([1, 1, 0, 0], 9.0);
        assert_eq!(t.get_flat(4), 9.0);
        t.set_flat(5, 7.0);
        assert_eq!(t.get([2, 1, 0, 0]), 7.0);
    }

    #[test]
    fn test_flat_indexing_on_transposed_view() {
        let iso = isolate("tensor-flat-transposed");
        let t = iso.new_tensor_with_data(&[3, 2], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let tt = t.transposed_clone();
        // tt is [2, 3] over the same bytes: tt(i, j) == t(j, i).
        assert_eq!(tt.get([0, 2, 0, 0]), 2.0);
        assert_eq!(tt.get([1, 0, 0, 0]), 3.0);
        // Flat indexing walks the logical (transposed) order.
        assert_eq!(tt.get_flat(1), 3.0);
        assert_eq!(tt.get_flat(2), 1.0);
    }

    #[test]
    fn test_deep_clone() {
        let iso = isolate("tensor-deep-clone");
        let t = iso.new_tensor_with_data(&[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let c = t.deep_clone();
        assert_eq!(c.shape(), t.shape());
        assert_eq!(c.data(), t.data());
        assert_ne!(c.ptr(), t.ptr());
        // Writes do not leak back.
        c.fill(0.0);
        assert_eq!(t.get_flat(0), 1.0);
    }

    #[test]
    fn test_isomorphic_clone() {
        let iso = isolate("tensor-iso-clone");
        let t = iso.new_tensor_with_data(&[4], &[1.0, 2.0, 3.0, 4.0]);
        let c = t.isomorphic_clone();
        assert_eq!(c.shape(), t.shape());
        assert_ne!(c.ptr(), t.ptr());
        assert!(c.data().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_sliced_clone_shares_storage() {
        let iso = isolate("tensor-slice-clone");
        let t = iso.new_tensor_with_data(&[4], &[1.0, 2.0, 3.0, 4.0]);
        let s = t.sliced_clone();
        assert_eq!(s.data(), t.data());
        assert_eq!(s.ptr(), t.ptr());
        assert!(s.slice_base().unwrap().same_tensor(&t));
        // Writing through the slice is visible in the base.
        s.set_flat(0, 9.0);
        assert_eq!(t.get_flat(0), 9.0);
    }

    #[test]
    fn test_slice_with_offset() {
        let iso = isolate("tensor-slice-offset");
        let t = iso.new_tensor_with_data(&[8], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let s = iso.new_tensor_slice(&[4], &t, 4 * ELEM_SIZE);
        assert_eq!(s.data(), &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(s.slice_offset(), 4 * ELEM_SIZE);
    }

    #[test]
    fn test_slice_of_slice_flattens() {
        let iso = isolate("tensor-slice-slice");
        let t = iso.new_tensor_with_data(&[8], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let s1 = iso.new_tensor_slice(&[6], &t, 2 * ELEM_SIZE);
        let s2 = iso.new_tensor_slice(&[2], &s1, 2 * ELEM_SIZE);
        assert!(s2.slice_base().unwrap().same_tensor(&t));
        assert_eq!(s2.slice_offset(), 4 * ELEM_SIZE);
        assert_eq!(s2.data(), &[4.0, 5.0]);
    }

    #[test]
    #[should_panic(expected = "slice extent out of range")]
    fn test_slice_overflow_is_fatal() {
        let iso = isolate("tensor-slice-overflow");
        let t = iso.new_tensor(&[4]);
        let _ = iso.new_tensor_slice(&[4], &t, ELEM_SIZE);
    }

    #[test]
    fn test_transposed_clone() {
        let iso = isolate("tensor-transposed");
        let t = iso.new_tensor_with_data(&[3, 2], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let tt = t.transposed_clone();
        assert_eq!(tt.dims(), &[2, 3, 1, 1]);
        assert_eq!(tt.strides(), &[12, 4, 24, 24]);
        assert!(tt.shape().is_transposed());
        assert_eq!(tt.ptr(), t.ptr());
        // Element (i0=1, i1=2) of the view is element (2, 1) of the base.
        assert_eq!(tt.get([1, 2, 0, 0]), t.get([2, 1, 0, 0]));
    }

    #[test]
    fn test_lazy_operators_record_nodes() {
        let iso = isolate("tensor-lazy");
        let a = iso.new_tensor(&[4, 4]);
        let b = iso.new_tensor(&[4, 4]);
        let c = &a + &b;
        assert_eq!(c.opcode(), OpCode::Add);
        assert_eq!(c.operands().len(), 2);
        assert!(c.operands()[0].same_tensor(&a));
        assert!(c.operands()[1].same_tensor(&b));
        assert_eq!(c.shape(), a.shape());
        // Nothing was computed.
        assert!(c.data().iter().all(|&x| x == 0.0));

        let d = &c - &b;
        let e = &d * &c;
        let f = &e / &a;
        assert_eq!(d.opcode(), OpCode::Sub);
        assert_eq!(e.opcode(), OpCode::Mul);
        assert_eq!(f.opcode(), OpCode::Div);
    }

    #[test]
    fn test_unary_nodes() {
        let iso = isolate("tensor-unary-nodes");
        let a = iso.new_tensor(&[4]);
        for (node, op) in [
            (a.softmax(), OpCode::Softmax),
            (a.sigmoid(), OpCode::Sigmoid),
            (a.tanh(), OpCode::Tanh),
            (a.relu(), OpCode::Relu),
            (a.gelu(), OpCode::Gelu),
            (a.silu(), OpCode::Silu),
        ] {
            assert_eq!(node.opcode(), op);
            assert_eq!(node.operands().len(), 1);
            assert_eq!(node.shape(), a.shape());
        }
    }

    #[test]
    fn test_matmul_node_shape() {
        let iso = isolate("tensor-matmul-node");
        // X: 3 rows of length 5; Y: 4 rows of length 5; R: 3 rows of length 4.
        let x = iso.new_tensor(&[5, 3]);
        let y = iso.new_tensor(&[5, 4]);
        let r = x.matmul(&y);
        assert_eq!(r.opcode(), OpCode::MatMul);
        assert_eq!(r.dims(), &[4, 3, 1, 1]);
        assert_eq!(r.rank(), 2);
    }

    #[test]
    fn test_name_truncation() {
        let iso = isolate("tensor-name");
        let t = iso.new_tensor(&[1]);
        assert_eq!(t.name(), "");
        t.set_name("activations");
        assert_eq!(t.name(), "activations");
        t.set_name(&"x".repeat(300));
        assert_eq!(t.name().len(), MAX_NAME);
    }

    #[test]
    fn test_display() {
        let iso = isolate("tensor-display");
        let t = iso.new_tensor(&[4, 4]);
        t.set_name("weights");
        let s = t.to_string();
        assert!(s.contains("'weights'"));
        assert!(s.contains("f32 2D"));
        assert!(s.contains("[4 X 4 X 1 X 1]"));
        assert!(s.contains("64 B"));
    }
}
