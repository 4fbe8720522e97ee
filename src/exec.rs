//! Execution frontend.
//!
//! # Node Resolution and Execution
//!
//! An [`Executor`] drives the two operations a graph runner needs:
//!
//! - [`Executor::bind`] — resolve a node against the registry once and cache
//!   the winning kernel on the node (`Unresolved → Bound`). Resolution
//!   failure is a fatal configuration error for the node, never a skip.
//! - [`Executor::run_node`] — partition the node's element range, fan the
//!   parallel chunks out over rayon, join, then run the remainder tail on
//!   the calling thread (`Bound → Executed`; re-execution is allowed).
//!
//! Operators run sequentially; only element ranges within one operator
//! parallelize. Tasks write disjoint output chunks, so no locking guards
//! tensor data and the result is independent of task completion order.
//!
//! There is no cancellation at this layer: a kernel call runs to completion,
//! since stopping mid-kernel would leave output ranges partially written.

use log::{debug, error};
use rayon::prelude::*;

use crate::cpu::{self, CpuInfo};
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId, NodeState};
use crate::partition::Partition;
use crate::registry::{self, Arch, Registry};

/// Binds kernels to nodes and executes them with intra-operator parallelism.
pub struct Executor<'r> {
    registry: &'r Registry,
    arch: Arch,
    cpu: CpuInfo,
}

impl Executor<'static> {
    /// Executor over the process-wide registry and the probed CPU.
    pub fn new() -> Self {
        Self::with_registry(registry::global())
    }
}

impl Default for Executor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Executor<'r> {
    /// Executor over a custom registry, native arch tag, probed CPU.
    pub fn with_registry(registry: &'r Registry) -> Self {
        Self { registry, arch: Arch::native(), cpu: *cpu::cpu_info() }
    }

    /// Replaces the CPU descriptor (for tests pinning core counts).
    pub fn with_cpu(mut self, cpu: CpuInfo) -> Self {
        self.cpu = cpu;
        self
    }

    /// Replaces the architecture tag used for registry lookups.
    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }

    /// The CPU descriptor this executor partitions against.
    pub fn cpu(&self) -> &CpuInfo {
        &self.cpu
    }

    /// Resolves and caches a kernel for `id`. Idempotent: a node that is
    /// already bound keeps its binding for the life of the graph.
    ///
    /// # Errors
    /// [`Error::UnsupportedConfiguration`] when every selector rejects the
    /// node; the graph cannot execute.
    pub fn bind(&self, graph: &mut Graph, id: NodeId) -> Result<()> {
        let node = graph.node(id);
        if node.binding.is_some() {
            return Ok(());
        }
        match self.registry.resolve(self.arch, node.op, &self.cpu, graph, node) {
            Ok(kernel) => {
                debug!("node {id}: bound {:?} to {}", node.op, kernel.name());
                let node = graph.node_mut(id);
                node.binding = Some(kernel);
                node.state = NodeState::Bound;
                Ok(())
            }
            Err(err) => {
                error!("node {id}: resolution failed: {err}");
                Err(err)
            }
        }
    }

    /// Executes a bound node once.
    ///
    /// # Errors
    /// - [`Error::Unresolved`] if the node was never bound.
    /// - [`Error::ShapeMismatch`] if input and output extents differ.
    /// - [`Error::PartitionInvariant`] if chunk accounting fails (fatal,
    ///   indicates a partitioner bug).
    /// - Any error the kernel itself reports.
    pub fn run_node(&self, graph: &mut Graph, id: NodeId) -> Result<()> {
        let node = graph.node(id).clone();
        let Some(kernel) = node.binding else {
            let err = Error::Unresolved { node: id, op: node.op };
            error!("node {id}: {err}");
            return Err(err);
        };

        let element_count = graph.tensor(node.input).element_count();
        let out_count = graph.tensor(node.output).element_count();
        if element_count != out_count {
            return Err(Error::ShapeMismatch { input: element_count, output: out_count });
        }
        if element_count == 0 {
            graph.node_mut(id).state = NodeState::Executed;
            return Ok(());
        }

        let plan = Partition::plan(element_count, self.cpu.core_count());
        plan.verify(element_count)?;

        let (input_t, output_t) = graph.io_pair(node.op, node.input, node.output)?;
        let input = input_t.as_f32()?;
        let output = output_t.as_f32_mut()?;

        let result = if plan.task_count == 1 {
            // Small or indivisible workload: one synchronous call over the
            // full range (chunk_size == element_count, remainder == 0).
            kernel.run(input, output, &node.params)
        } else {
            let body = plan.tail_start();
            output[..body]
                .par_chunks_mut(plan.chunk_size)
                .zip(input[..body].par_chunks(plan.chunk_size))
                .try_for_each(|(out_chunk, in_chunk)| kernel.run(in_chunk, out_chunk, &node.params))
                .and_then(|()| {
                    if plan.remainder > 0 {
                        // Tail runs on the calling thread, after the join.
                        kernel.run(&input[body..], &mut output[body..], &node.params)
                    } else {
                        Ok(())
                    }
                })
        };

        match result {
            Ok(()) => {
                graph.node_mut(id).state = NodeState::Executed;
                Ok(())
            }
            Err(err) => {
                error!("node {id}: kernel {} failed: {err}", kernel.name());
                Err(err)
            }
        }
    }

    /// Binds and executes every node in insertion order.
    ///
    /// # Errors
    /// Stops at and returns the first node failure.
    pub fn run(&self, graph: &mut Graph) -> Result<()> {
        for id in graph.node_ids() {
            self.bind(graph, id)?;
        }
        for id in graph.node_ids() {
            self.run_node(graph, id)?;
        }
        Ok(())
    }
}
