//! Operator graph: nodes, parameters, and the node lifecycle.
//!
//! A [`Graph`] owns every [`Tensor`] and every [`Node`]; nodes refer to their
//! input and output tensors by [`TensorId`] index rather than ownership.
//! Graph *construction* is an external concern — the executor consumes an
//! already-populated graph — so this module only provides the plain builders
//! the executor and tests need.
//!
//! Each node moves through [`NodeState`] exactly once per graph instance:
//! `Unresolved → Bound` when the registry selects a kernel for it, and
//! `Bound → Executed` on every run thereafter. A binding is stable for the
//! life of the graph; re-binding only happens if the graph is rebuilt.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ops::Kernel;
use crate::tensors::Tensor;

/// Index of a tensor inside its owning [`Graph`].
pub type TensorId = usize;

/// Index of a node inside its owning [`Graph`].
pub type NodeId = usize;

/// Operator type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Scaled exponential linear unit.
    Selu,
    /// Rectified linear unit.
    Relu,
}

/// Operator-specific parameters, validated by selectors before binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpParams {
    /// No parameters.
    None,
    /// SELU scale/shift pair.
    Selu { alpha: f32, lambda: f32 },
}

impl OpParams {
    /// Extracts the SELU parameter pair.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if the node does not carry SELU params.
    pub fn selu(&self) -> Result<(f32, f32)> {
        match *self {
            OpParams::Selu { alpha, lambda } => Ok((alpha, lambda)),
            _ => Err(Error::InvalidParameter {
                op: OpKind::Selu,
                reason: "expected SELU alpha/lambda parameters",
            }),
        }
    }
}

/// Resolution/execution lifecycle of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// No kernel bound yet; executing in this state is a fatal error.
    #[default]
    Unresolved,
    /// A kernel implementation is bound and stable.
    Bound,
    /// The node has executed at least once. Re-execution is allowed.
    Executed,
}

/// One computation in the graph: an operator with bound tensors and params.
#[derive(Clone)]
pub struct Node {
    pub op: OpKind,
    pub params: OpParams,
    pub input: TensorId,
    pub output: TensorId,
    pub(crate) binding: Option<Arc<dyn Kernel>>,
    pub(crate) state: NodeState,
}

impl Node {
    /// Current lifecycle state.
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Name of the bound kernel implementation, if any.
    pub fn kernel_name(&self) -> Option<&'static str> {
        self.binding.as_deref().map(Kernel::name)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("op", &self.op)
            .field("params", &self.params)
            .field("input", &self.input)
            .field("output", &self.output)
            .field("kernel", &self.kernel_name())
            .field("state", &self.state)
            .finish()
    }
}

/// Owner of all tensors and nodes for one model instance.
#[derive(Debug, Default)]
pub struct Graph {
    tensors: Vec<Tensor>,
    nodes: Vec<Node>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves a tensor into the graph, returning its id.
    pub fn add_tensor(&mut self, tensor: Tensor) -> TensorId {
        self.tensors.push(tensor);
        self.tensors.len() - 1
    }

    /// Adds a node over existing tensors, returning its id.
    ///
    /// # Panics
    /// Panics if either tensor id is out of bounds.
    pub fn add_node(
        &mut self,
        op: OpKind,
        params: OpParams,
        input: TensorId,
        output: TensorId,
    ) -> NodeId {
        assert!(input < self.tensors.len(), "input tensor {input} out of bounds");
        assert!(output < self.tensors.len(), "output tensor {output} out of bounds");
        self.nodes.push(Node {
            op,
            params,
            input,
            output,
            binding: None,
            state: NodeState::Unresolved,
        });
        self.nodes.len() - 1
    }

    /// Shared view of a tensor.
    pub fn tensor(&self, id: TensorId) -> &Tensor {
        &self.tensors[id]
    }

    /// Mutable view of a tensor.
    pub fn tensor_mut(&mut self, id: TensorId) -> &mut Tensor {
        &mut self.tensors[id]
    }

    /// Shared view of a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Ids of all nodes in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        0..self.nodes.len()
    }

    /// Borrows a node's input tensor immutably and its output tensor mutably
    /// at the same time.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] when the node reads and writes the same
    /// tensor; in-place execution would alias the partitioned write ranges.
    pub(crate) fn io_pair(
        &mut self,
        op: OpKind,
        input: TensorId,
        output: TensorId,
    ) -> Result<(&Tensor, &mut Tensor)> {
        if input == output {
            return Err(Error::InvalidParameter {
                op,
                reason: "in-place nodes (input == output) are not supported",
            });
        }
        if input < output {
            let (lo, hi) = self.tensors.split_at_mut(output);
            Ok((&lo[input], &mut hi[0]))
        } else {
            let (lo, hi) = self.tensors.split_at_mut(input);
            Ok((&hi[0], &mut lo[output]))
        }
    }
}
