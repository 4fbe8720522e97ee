//! Work partitioning for intra-operator parallelism.
//!
//! Splits an elementwise operator's `element_count` into a bounded number of
//! equal chunks plus a deterministic remainder tail:
//!
//! 1. `block = max(1, element_count >> PARALLEL_BLOCK_SHIFT)` — at least 256
//!    elements per candidate task before multithreading is worth the
//!    fan-out cost.
//! 2. `task_count = min(core_count, block)`.
//! 3. `chunk_size = element_count / task_count` (floor).
//! 4. Task `i` owns `[i * chunk_size, (i + 1) * chunk_size)`; whatever is
//!    left of `element_count` is the remainder tail, run synchronously on
//!    the calling thread after all tasks join.
//!
//! The same plan is produced for the same `(element_count, core_count)` on
//! every run, so the split — and therefore which elements land in a kernel's
//! vector groups versus its scalar tail — is fully deterministic. Tensors
//! under 256 elements never parallelize (`block = 1` forces one task).
//!
//! Note: `remainder < chunk_size` is NOT an invariant; only the exact
//! accounting `task_count * chunk_size + remainder == element_count` is.

use crate::error::{Error, Result};

/// Granularity shift for the parallelism heuristic. `1 << 8` elements is the
/// minimum work per candidate task. Tunable; changing it shifts the
/// parallelize-vs-stay-serial threshold, not correctness.
pub const PARALLEL_BLOCK_SHIFT: u32 = 8;

/// How one operator invocation is split across worker tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Number of parallel tasks, always ≥ 1.
    pub task_count: usize,
    /// Elements owned by each task.
    pub chunk_size: usize,
    /// Elements left for the post-join tail on the calling thread.
    pub remainder: usize,
}

impl Partition {
    /// Plans the split of `element_count` elements over `core_count` cores.
    ///
    /// # Panics
    /// Panics if `element_count` or `core_count` is zero; zero-element
    /// operators are the caller's early-out, and a capability descriptor
    /// always reports at least one core.
    pub fn plan(element_count: usize, core_count: usize) -> Self {
        assert!(element_count > 0, "cannot partition an empty range");
        assert!(core_count > 0, "core_count must be at least 1");

        let block = (element_count >> PARALLEL_BLOCK_SHIFT).max(1);
        let task_count = core_count.min(block);
        let chunk_size = element_count / task_count;
        let remainder = element_count - task_count * chunk_size;

        Self { task_count, chunk_size, remainder }
    }

    /// Start of the remainder tail, equal to the end of the last task range.
    pub fn tail_start(&self) -> usize {
        self.task_count * self.chunk_size
    }

    /// Checks the exact-coverage invariant against `element_count`.
    ///
    /// # Errors
    /// [`Error::PartitionInvariant`] if the accounting does not cover
    /// `element_count` exactly. This indicates a partitioner bug and must be
    /// treated as fatal by the caller — it implies missed or duplicated
    /// output elements.
    pub fn verify(&self, element_count: usize) -> Result<()> {
        if self.task_count == 0
            || self.chunk_size == 0
            || self.task_count * self.chunk_size + self.remainder != element_count
        {
            return Err(Error::PartitionInvariant {
                task_count: self.task_count,
                chunk_size: self.chunk_size,
                remainder: self.remainder,
                element_count,
            });
        }
        Ok(())
    }
}
