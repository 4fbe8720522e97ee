//! SELU kernel family.
//!
//! Computes `f(x) = λ·x` for `x > 0` and `f(x) = α·λ·(exp(x) - 1)` for
//! `x ≤ 0`, elementwise. Three implementations: a portable scalar form, a
//! 4-lane NEON form on aarch64, and an 8-lane AVX2 form on x86_64 behind the
//! `simd` feature. All three route the exponential through
//! [`math::exp_approx`] and its lane-identical SIMD twins, so their outputs
//! are bit-equal element for element.

use std::sync::Arc;

use crate::cpu::CpuInfo;
use crate::error::Result;
use crate::graph::{Graph, Node, OpKind, OpParams};
use crate::ops::{math, Kernel, SCALAR_PRIORITY};
use crate::registry::{Arch, Registry};
use crate::tensors::DType;

#[inline]
fn selu_one(x: f32, alpha_lambda: f32, lambda: f32) -> f32 {
    if x <= 0.0 {
        (math::exp_approx(x) - 1.0) * alpha_lambda
    } else {
        x * lambda
    }
}

/// Portable scalar SELU.
struct SeluScalar;

impl Kernel for SeluScalar {
    fn name(&self) -> &'static str {
        "scalar_selu_fp32"
    }

    fn run(&self, input: &[f32], output: &mut [f32], params: &OpParams) -> Result<()> {
        let (alpha, lambda) = params.selu()?;
        let alpha_lambda = alpha * lambda;
        for (y, &x) in output.iter_mut().zip(input) {
            *y = selu_one(x, alpha_lambda, lambda);
        }
        Ok(())
    }
}

/// 4-lane NEON SELU.
#[cfg(target_arch = "aarch64")]
struct SeluNeon;

#[cfg(target_arch = "aarch64")]
impl Kernel for SeluNeon {
    fn name(&self) -> &'static str {
        "neon_selu_fp32"
    }

    fn run(&self, input: &[f32], output: &mut [f32], params: &OpParams) -> Result<()> {
        use core::arch::aarch64::*;

        let (alpha, lambda) = params.selu()?;
        let alpha_lambda = alpha * lambda;
        debug_assert_eq!(input.len(), output.len());
        let len = output.len();
        let vec_len = len & !3;

        unsafe {
            let one = vdupq_n_f32(1.0);
            let zero = vdupq_n_f32(0.0);
            let al = vdupq_n_f32(alpha_lambda);
            let lam = vdupq_n_f32(lambda);
            for i in (0..vec_len).step_by(4) {
                let p = vld1q_f32(input.as_ptr().add(i));
                let lemask = vcleq_f32(p, zero);

                let mut nps = math::exp_ps(p);
                nps = vsubq_f32(nps, one);
                nps = vmulq_f32(nps, al);

                let pos = vmulq_f32(p, lam);
                vst1q_f32(output.as_mut_ptr().add(i), vbslq_f32(lemask, nps, pos));
            }
        }
        for i in vec_len..len {
            output[i] = selu_one(input[i], alpha_lambda, lambda);
        }
        Ok(())
    }
}

/// 8-lane AVX2 SELU.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
struct SeluAvx2;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
impl Kernel for SeluAvx2 {
    fn name(&self) -> &'static str {
        "avx2_selu_fp32"
    }

    fn run(&self, input: &[f32], output: &mut [f32], params: &OpParams) -> Result<()> {
        let (alpha, lambda) = params.selu()?;
        // Selector admitted this node only after verifying AVX2+FMA support.
        unsafe { run_avx2(input, output, alpha * lambda, lambda) }
        Ok(())
    }
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[target_feature(enable = "avx2,fma")]
unsafe fn run_avx2(input: &[f32], output: &mut [f32], alpha_lambda: f32, lambda: f32) {
    use core::arch::x86_64::*;

    debug_assert_eq!(input.len(), output.len());
    let len = output.len();
    let vec_len = len & !7;

    unsafe {
        let one = _mm256_set1_ps(1.0);
        let zero = _mm256_setzero_ps();
        let al = _mm256_set1_ps(alpha_lambda);
        let lam = _mm256_set1_ps(lambda);
        for i in (0..vec_len).step_by(8) {
            let p = _mm256_loadu_ps(input.as_ptr().add(i));
            let lemask = _mm256_cmp_ps::<_CMP_LE_OQ>(p, zero);

            let mut nps = math::exp256_ps(p);
            nps = _mm256_sub_ps(nps, one);
            nps = _mm256_mul_ps(nps, al);

            let pos = _mm256_mul_ps(p, lam);
            _mm256_storeu_ps(output.as_mut_ptr().add(i), _mm256_blendv_ps(pos, nps, lemask));
        }
    }
    for i in vec_len..len {
        output[i] = selu_one(input[i], alpha_lambda, lambda);
    }
}

fn valid_node(graph: &Graph, node: &Node) -> bool {
    let input = graph.tensor(node.input);
    let output = graph.tensor(node.output);
    if input.dtype() != DType::F32 || output.dtype() != DType::F32 {
        return false;
    }
    if input.element_count() != output.element_count() {
        return false;
    }
    match node.params {
        OpParams::Selu { alpha, lambda } => alpha.is_finite() && lambda.is_finite(),
        _ => false,
    }
}

/// Accepts any F32 SELU node with valid parameters. Elementwise, so the
/// layout does not matter.
fn select_scalar(_cpu: &CpuInfo, graph: &Graph, node: &Node) -> Option<Arc<dyn Kernel>> {
    valid_node(graph, node).then(|| Arc::new(SeluScalar) as Arc<dyn Kernel>)
}

/// Accepts F32/NCHW SELU nodes when NEON is available.
#[cfg(target_arch = "aarch64")]
fn select_neon(cpu: &CpuInfo, graph: &Graph, node: &Node) -> Option<Arc<dyn Kernel>> {
    if !cpu.supports(crate::cpu::Feature::Neon) {
        return None;
    }
    if graph.tensor(node.input).layout() != crate::tensors::Layout::Nchw {
        return None;
    }
    valid_node(graph, node).then(|| Arc::new(SeluNeon) as Arc<dyn Kernel>)
}

/// Accepts F32/NCHW SELU nodes when the CPU reports AVX2.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
fn select_avx2(cpu: &CpuInfo, graph: &Graph, node: &Node) -> Option<Arc<dyn Kernel>> {
    if !cpu.supports(crate::cpu::Feature::Avx2) {
        return None;
    }
    if graph.tensor(node.input).layout() != crate::tensors::Layout::Nchw {
        return None;
    }
    valid_node(graph, node).then(|| Arc::new(SeluAvx2) as Arc<dyn Kernel>)
}

/// Registers the SELU selectors for the native architecture.
pub fn register(registry: &mut Registry) {
    let arch = Arch::native();
    registry.register(arch, OpKind::Selu, select_scalar, SCALAR_PRIORITY);

    #[cfg(target_arch = "aarch64")]
    registry.register(arch, OpKind::Selu, select_neon, crate::ops::SIMD_PRIORITY);

    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    registry.register(arch, OpKind::Selu, select_avx2, crate::ops::SIMD_PRIORITY);
}
