//! Kernel implementations and the builtin operator set.
//!
//! # Kernel Layer
//!
//! Each operator family lives in its own submodule and ships one or more
//! [`Kernel`] implementations: a scalar reference form plus SIMD fast paths
//! where the architecture has them. The submodule also owns the selector
//! functions that decide, per node, whether an implementation applies, and a
//! `register` function that enters them into a [`Registry`] at the priorities
//! the dispatcher expects.
//!
//! ## Submodules
//!
//! - [`math`] — the shared exponential primitive and its accuracy contract
//! - [`selu`] — scaled exponential linear unit (scalar / NEON / AVX2)
//! - [`relu`] — rectified linear unit (scalar / NEON / AVX2)
//!
//! ## Adding an operator family
//!
//! 1. Implement [`Kernel`] for each specialization.
//! 2. Write one selector per specialization; selectors are pure `fn`
//!    predicates over the CPU descriptor and node properties.
//! 3. Register them from the family's `register` function and call it from
//!    [`register_builtin_ops`].

pub mod math;
pub mod relu;
pub mod selu;

use crate::error::Result;
use crate::graph::OpParams;
use crate::registry::Registry;

/// Priority for architecture-specific SIMD implementations.
pub const SIMD_PRIORITY: i32 = 300;

/// Priority for the portable scalar reference implementations.
pub const SCALAR_PRIORITY: i32 = 100;

/// A concrete, architecture/data-type-specialized operator implementation.
///
/// # Contract
///
/// `run` receives the input and output views for one partition range and
/// must write every element of `output` exactly once from the corresponding
/// element of `input`. Implementations are invoked concurrently by
/// independent tasks on disjoint ranges of the same tensors, so they must
/// hold no mutable state.
///
/// Vectorized implementations process fixed-width groups and finish the
/// in-range tail (`len % width`) with a scalar path computing the identical
/// formula, so the value of an element never depends on where the
/// partitioner placed a chunk boundary.
pub trait Kernel: Send + Sync {
    /// Implementation name, e.g. `"neon_selu_fp32"`.
    fn name(&self) -> &'static str;

    /// Computes the operator over one range.
    ///
    /// `input` and `output` have equal length (the executor guarantees it).
    ///
    /// # Errors
    /// [`crate::error::Error::InvalidParameter`] if `params` does not match
    /// the operator; defensive, since selectors reject such nodes earlier.
    fn run(&self, input: &[f32], output: &mut [f32], params: &OpParams) -> Result<()>;
}

/// Registers every builtin operator family for the native architecture.
///
/// Must run to completion before the first `resolve` call against the
/// registry; the process-wide registry calls this from its initializer,
/// which makes the two-phase discipline automatic.
pub fn register_builtin_ops(registry: &mut Registry) {
    selu::register(registry);
    relu::register(registry);
}
