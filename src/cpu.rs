//! CPU capability probing.
//!
//! # CPU Capability Descriptor
//!
//! A [`CpuInfo`] is an immutable snapshot of what the current processor can
//! do: how many logical cores are available and which SIMD instruction sets
//! are present. Kernels never probe the hardware themselves; selectors read
//! the descriptor they are handed, which makes selection decisions
//! reproducible and testable with synthetic descriptors.
//!
//! ## Design Highlights
//!
//! - Probing never fails: if detection is unavailable the descriptor reports
//!   a conservative baseline (one core, no optional features).
//! - [`cpu_info()`] returns a process-wide snapshot taken once, via
//!   `lazy_static`; the descriptor is read-only thereafter.
//! - `with_core_count` builds derived descriptors for tests that need to
//!   exercise specific partitioning shapes.

/// An optional instruction-set feature the dispatcher may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Feature {
    /// ARM Advanced SIMD (always present on aarch64).
    Neon = 1 << 0,
    /// ARMv8.2 half-precision arithmetic.
    Fp16 = 1 << 1,
    /// x86_64 AVX2.
    Avx2 = 1 << 2,
    /// x86_64 AVX-512 foundation.
    Avx512 = 1 << 3,
}

/// Immutable per-process snapshot of CPU parallelism and SIMD capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuInfo {
    core_count: usize,
    features: u32,
}

impl CpuInfo {
    /// Detects the current CPU.
    ///
    /// Core count comes from [`std::thread::available_parallelism`]; SIMD
    /// flags from runtime feature detection on x86_64 and aarch64. On any
    /// other architecture, or if detection fails, the result is the
    /// conservative baseline rather than an error.
    pub fn probe() -> Self {
        let core_count = std::thread::available_parallelism()
            .map(std::num::NonZero::get)
            .unwrap_or(1);

        let mut features = 0u32;

        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") {
                features |= Feature::Avx2 as u32;
            }
            if is_x86_feature_detected!("avx512f") {
                features |= Feature::Avx512 as u32;
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            features |= Feature::Neon as u32;
            if std::arch::is_aarch64_feature_detected!("fp16") {
                features |= Feature::Fp16 as u32;
            }
        }

        Self { core_count, features }
    }

    /// The conservative baseline: one core, no optional features.
    pub const fn baseline() -> Self {
        Self { core_count: 1, features: 0 }
    }

    /// Number of logical cores, always ≥ 1.
    pub fn core_count(&self) -> usize {
        self.core_count
    }

    /// Whether the given instruction-set feature is available.
    pub fn supports(&self, feature: Feature) -> bool {
        self.features & feature as u32 != 0
    }

    /// Returns a copy of this descriptor with a different core count.
    ///
    /// Feature flags are preserved. Intended for tests that pin the
    /// partitioner to a specific degree of parallelism.
    ///
    /// # Panics
    /// Panics if `core_count` is zero.
    pub fn with_core_count(mut self, core_count: usize) -> Self {
        assert!(core_count >= 1, "core_count must be at least 1");
        self.core_count = core_count;
        self
    }

    /// Returns a copy of this descriptor with `feature` forced on.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features |= feature as u32;
        self
    }
}

lazy_static::lazy_static! {
    static ref CPU_INFO: CpuInfo = CpuInfo::probe();
}

/// Process-wide CPU snapshot, probed once on first use.
pub fn cpu_info() -> &'static CpuInfo {
    &CPU_INFO
}
