//! Operator dispatch registry.
//!
//! # Kernel Selection
//!
//! The registry maps `(architecture tag, operator type)` to an ordered list
//! of `(priority, selector)` entries. At graph-load time each node is
//! resolved once: selectors run from highest to lowest priority, and the
//! first one to return a kernel wins. Ties keep registration order.
//!
//! Selectors are plain `fn` pointers — pure predicates over the CPU
//! descriptor and the node's static properties (dtype, layout, parameter
//! validity). They must not mutate anything and must return the same answer
//! for the same inputs, because callers memoize the result on the node.
//!
//! ## Lifecycle
//!
//! Registration is a distinct phase that completes before the first
//! resolution. The process-wide registry enforces this by construction: its
//! `lazy_static` initializer runs [`crate::ops::register_builtin_ops`] and
//! the registry is immutable afterwards. Code that needs a custom operator
//! set builds its own [`Registry`] and hands it to an executor instead.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cpu::CpuInfo;
use crate::error::{Error, Result};
use crate::graph::{Graph, Node, OpKind};
use crate::ops::Kernel;

/// Target-architecture tag a kernel set is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit ARM.
    Aarch64,
    /// 64-bit x86.
    X86_64,
    /// Portable fallback tag for architecture-independent kernel sets.
    Generic,
}

impl Arch {
    /// Tag of the architecture this binary was compiled for.
    pub const fn native() -> Self {
        #[cfg(target_arch = "aarch64")]
        {
            Arch::Aarch64
        }
        #[cfg(target_arch = "x86_64")]
        {
            Arch::X86_64
        }
        #[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
        {
            Arch::Generic
        }
    }
}

/// A capability predicate plus factory: inspects the CPU and the node, and
/// returns a kernel if this implementation can service it.
pub type Selector = fn(&CpuInfo, &Graph, &Node) -> Option<Arc<dyn Kernel>>;

#[derive(Clone, Copy)]
struct Entry {
    priority: i32,
    selector: Selector,
}

/// Ordered mapping from `(arch, operator)` to candidate implementations.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<(Arch, OpKind), Vec<Entry>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a selector for `(arch, op)` at the given priority.
    ///
    /// Entries are kept in descending priority order; equal priorities keep
    /// registration order. Re-registering an identical entry (same key,
    /// priority, and selector) is a no-op.
    pub fn register(&mut self, arch: Arch, op: OpKind, selector: Selector, priority: i32) {
        let list = self.entries.entry((arch, op)).or_default();
        if list
            .iter()
            .any(|e| e.priority == priority && std::ptr::fn_addr_eq(e.selector, selector))
        {
            return;
        }
        // Insert after every entry with priority >= ours: descending order,
        // stable for ties.
        let at = list.partition_point(|e| e.priority >= priority);
        list.insert(at, Entry { priority, selector });
    }

    /// Resolves a kernel implementation for `node` under the given tag.
    ///
    /// Runs each registered selector in descending priority order and
    /// returns the first accepted kernel.
    ///
    /// # Errors
    /// [`Error::UnsupportedConfiguration`] when no entry exists for the key
    /// or every selector rejects the node. The caller must treat this as a
    /// fatal configuration error for the node, not a skip.
    pub fn resolve(
        &self,
        arch: Arch,
        op: OpKind,
        cpu: &CpuInfo,
        graph: &Graph,
        node: &Node,
    ) -> Result<Arc<dyn Kernel>> {
        if let Some(list) = self.entries.get(&(arch, op)) {
            for entry in list {
                if let Some(kernel) = (entry.selector)(cpu, graph, node) {
                    return Ok(kernel);
                }
            }
        }
        Err(Error::UnsupportedConfiguration { op, arch })
    }

    /// Number of entries registered for `(arch, op)`.
    pub fn entry_count(&self, arch: Arch, op: OpKind) -> usize {
        self.entries.get(&(arch, op)).map_or(0, Vec::len)
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL: Registry = {
        let mut registry = Registry::new();
        crate::ops::register_builtin_ops(&mut registry);
        registry
    };
}

/// Process-wide registry with the builtin operator set, built on first use.
///
/// The builtin registration phase runs inside the initializer; by the time a
/// reference escapes, the registry is read-only.
pub fn global() -> &'static Registry {
    &GLOBAL
}
