//! Error kinds for dispatch, partitioning, and kernel execution.
//!
//! A single enum covers every failure mode the runtime can report: a node no
//! registered kernel accepts, malformed operator parameters, dtype mismatches
//! when a kernel views tensor storage, executing a node that was never bound,
//! and the defensive partition-accounting check. Using one error type across
//! the crate keeps propagation to a plain `?`.
//!
//! None of these are recoverable at this layer. The only "retry" the design
//! admits is trying a lower-priority registry entry, and multi-entry
//! resolution already does that before any error is produced.

use crate::graph::OpKind;
use crate::registry::Arch;
use crate::tensors::DType;

/// All errors reported by the dispatch/execution core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No registry entry accepted the node's (dtype, layout, architecture)
    /// combination. The graph cannot run this node.
    #[error("no kernel for {op:?} on {arch:?}: every selector rejected the node")]
    UnsupportedConfiguration { op: OpKind, arch: Arch },

    /// An operator parameter violates a kernel precondition.
    #[error("invalid parameter for {op:?}: {reason}")]
    InvalidParameter { op: OpKind, reason: &'static str },

    /// Chunk accounting failed to cover the element count exactly. This is a
    /// partitioner bug, never a data-dependent condition.
    #[error(
        "partition invariant violated: {task_count} tasks x {chunk_size} + {remainder} != {element_count}"
    )]
    PartitionInvariant {
        task_count: usize,
        chunk_size: usize,
        remainder: usize,
        element_count: usize,
    },

    /// A node was executed without a bound kernel implementation.
    #[error("node {node} ({op:?}) executed while unresolved")]
    Unresolved { node: usize, op: OpKind },

    /// A kernel viewed tensor storage as the wrong element type.
    #[error("dtype mismatch: expected {expected:?}, got {got:?}")]
    DTypeMismatch { expected: DType, got: DType },

    /// Input and output extents of a node disagree.
    #[error("shape mismatch: input has {input} elements, output has {output}")]
    ShapeMismatch { input: usize, output: usize },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
