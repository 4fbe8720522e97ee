//! opflow: CPU operator dispatch and parallel kernel execution for
//! neural-network graphs.
//!
//! Given an already-built graph of typed tensors and operator nodes, this
//! crate picks the fastest correct kernel implementation for the current
//! hardware and data type, executes it with bounded intra-operator
//! parallelism, and produces deterministic, bit-stable numeric results
//! regardless of thread count.
//!
//! # Features
//!
//! - Priority-ranked kernel registry keyed by architecture and operator,
//!   resolved once per node and cached.
//! - Scalar, NEON, and AVX2 kernel families with a shared numeric core, so
//!   vector and scalar paths agree bitwise.
//! - Deterministic work partitioning: bounded equal chunks plus a remainder
//!   tail that always runs on the calling thread after the join.
//!
//! # Non-goals
//!
//! Graph construction, model-format import, and non-CPU device backends are
//! external concerns; this crate only consumes a populated [`graph::Graph`].
//!
//! # Modules
//!
//! - [`tensors`] — tensor handles: shape, dtype, layout, owned buffers.
//! - [`graph`] — operator nodes, parameters, and the node lifecycle.
//! - [`registry`] — the operator dispatch registry and architecture tags.
//! - [`partition`] — the work-partitioning heuristic.
//! - [`exec`] — the execution frontend (bind + run).
//! - [`ops`] — kernel implementations and builtin registration.
//! - [`cpu`] — CPU capability probing.
//! - [`approx`] — tolerance comparison helpers for tests.
//!
//! # Example
//!
//! ```rust
//! use opflow::exec::Executor;
//! use opflow::graph::{Graph, OpKind, OpParams};
//! use opflow::tensors::Tensor;
//!
//! let mut graph = Graph::new();
//! let input = graph.add_tensor(Tensor::from_f32(vec![4], vec![-2.0, 0.0, 1.0, 3.0]));
//! let output = graph.add_tensor(Tensor::zeros_f32(vec![4]));
//! graph.add_node(
//!     OpKind::Selu,
//!     OpParams::Selu { alpha: 1.0, lambda: 1.0507 },
//!     input,
//!     output,
//! );
//!
//! Executor::new().run(&mut graph).unwrap();
//! let result = graph.tensor(output).as_f32().unwrap();
//! assert!((result[3] - 3.1521).abs() < 1e-3);
//! ```

pub mod approx;
pub mod cpu;
pub mod error;
pub mod exec;
pub mod graph;
pub mod ops;
pub mod partition;
pub mod registry;
pub mod tensors;

pub use error::{Error, Result};
