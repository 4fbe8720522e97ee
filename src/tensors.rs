//! Core tensor data structures.
//!
//! # Tensor Handles
//!
//! A [`Tensor`] describes one graph-level array value: its shape, element
//! type, memory layout, and an owned flat buffer in row-major order. The
//! execution core never allocates or frees tensor storage after
//! construction — it only reads and writes within the declared extent,
//! through slice views.
//!
//! ## Design Highlights
//!
//! - Shape is a `Vec<usize>`; the element count is always its product and is
//!   enforced against the buffer length at construction.
//! - Storage is a [`TensorData`] enum over typed `Vec`s, so the runtime
//!   element type ([`DType`]) travels with the buffer and kernels view it
//!   through checked accessors instead of raw pointer casts.
//! - The partitioner hands kernels disjoint sub-slices of these views; no
//!   two tasks ever alias an output range.
//!
//! ## Limitations
//!
//! - Row-major only; no broadcasting, strides, or shape inference.
//! - F16 storage holds raw IEEE 754 half bits (`u16`); no F16 arithmetic is
//!   provided here.

use crate::error::{Error, Result};

/// Runtime element type of a tensor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    /// 32-bit IEEE float.
    F32,
    /// 16-bit IEEE half, stored as raw bits.
    F16,
}

/// Memory layout of a tensor's dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Batch, channel, height, width (the default for this runtime).
    Nchw,
    /// Batch, height, width, channel.
    Nhwc,
}

/// Owned, typed tensor storage.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    F16(Vec<u16>),
}

impl TensorData {
    fn len(&self) -> usize {
        match self {
            TensorData::F32(v) => v.len(),
            TensorData::F16(v) => v.len(),
        }
    }

    fn dtype(&self) -> DType {
        match self {
            TensorData::F32(_) => DType::F32,
            TensorData::F16(_) => DType::F16,
        }
    }
}

/// An N-dimensional tensor with shape, layout, and owned row-major data.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    layout: Layout,
    data: TensorData,
}

impl Tensor {
    /// Creates a tensor from a shape and typed storage.
    ///
    /// # Panics
    /// Panics if the buffer length does not match the shape product.
    pub fn new(shape: impl Into<Vec<usize>>, layout: Layout, data: TensorData) -> Self {
        let shape = shape.into();
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "shape {:?} is incompatible with {} data elements",
            shape,
            data.len()
        );
        Self { shape, layout, data }
    }

    /// Creates an F32 tensor in NCHW layout.
    ///
    /// # Panics
    /// Panics if the buffer length does not match the shape product.
    pub fn from_f32(shape: impl Into<Vec<usize>>, data: Vec<f32>) -> Self {
        Self::new(shape, Layout::Nchw, TensorData::F32(data))
    }

    /// Creates a zero-filled F32 tensor in NCHW layout.
    pub fn zeros_f32(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let n = shape.iter().product();
        Self::new(shape, Layout::Nchw, TensorData::F32(vec![0.0; n]))
    }

    /// The tensor's shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of elements (product of the shape).
    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    /// Runtime element type.
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// Memory layout.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Read-only F32 view of the whole buffer.
    ///
    /// # Errors
    /// [`Error::DTypeMismatch`] if the tensor does not hold F32 data.
    pub fn as_f32(&self) -> Result<&[f32]> {
        match &self.data {
            TensorData::F32(v) => Ok(v),
            other => Err(Error::DTypeMismatch { expected: DType::F32, got: other.dtype() }),
        }
    }

    /// Mutable F32 view of the whole buffer.
    ///
    /// # Errors
    /// [`Error::DTypeMismatch`] if the tensor does not hold F32 data.
    pub fn as_f32_mut(&mut self) -> Result<&mut [f32]> {
        match &mut self.data {
            TensorData::F32(v) => Ok(v),
            other => Err(Error::DTypeMismatch { expected: DType::F32, got: other.dtype() }),
        }
    }
}
