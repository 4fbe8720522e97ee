//! ReLU kernel family.
//!
//! Computes `f(x) = max(0, x)` elementwise. Max against zero is a single
//! IEEE operation in every width, so the scalar, NEON, and AVX2 forms agree
//! bitwise without any shared-primitive machinery.

use std::sync::Arc;

use crate::cpu::CpuInfo;
use crate::error::{Error, Result};
use crate::graph::{Graph, Node, OpKind, OpParams};
use crate::ops::{Kernel, SCALAR_PRIORITY};
use crate::registry::{Arch, Registry};
use crate::tensors::DType;

/// Portable scalar ReLU.
struct ReluScalar;

impl Kernel for ReluScalar {
    fn name(&self) -> &'static str {
        "scalar_relu_fp32"
    }

    fn run(&self, input: &[f32], output: &mut [f32], params: &OpParams) -> Result<()> {
        check_params(params)?;
        for (y, &x) in output.iter_mut().zip(input) {
            *y = if x > 0.0 { x } else { 0.0 };
        }
        Ok(())
    }
}

/// 4-lane NEON ReLU.
#[cfg(target_arch = "aarch64")]
struct ReluNeon;

#[cfg(target_arch = "aarch64")]
impl Kernel for ReluNeon {
    fn name(&self) -> &'static str {
        "neon_relu_fp32"
    }

    fn run(&self, input: &[f32], output: &mut [f32], params: &OpParams) -> Result<()> {
        use core::arch::aarch64::*;

        check_params(params)?;
        debug_assert_eq!(input.len(), output.len());
        let len = output.len();
        let vec_len = len & !3;

        unsafe {
            let zero = vdupq_n_f32(0.0);
            for i in (0..vec_len).step_by(4) {
                let p = vld1q_f32(input.as_ptr().add(i));
                vst1q_f32(output.as_mut_ptr().add(i), vmaxq_f32(p, zero));
            }
        }
        for i in vec_len..len {
            output[i] = if input[i] > 0.0 { input[i] } else { 0.0 };
        }
        Ok(())
    }
}

/// 8-lane AVX2 ReLU.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
struct ReluAvx2;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
impl Kernel for ReluAvx2 {
    fn name(&self) -> &'static str {
        "avx2_relu_fp32"
    }

    fn run(&self, input: &[f32], output: &mut [f32], params: &OpParams) -> Result<()> {
        check_params(params)?;
        unsafe { run_avx2(input, output) }
        Ok(())
    }
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[target_feature(enable = "avx2")]
unsafe fn run_avx2(input: &[f32], output: &mut [f32]) {
    use core::arch::x86_64::*;

    debug_assert_eq!(input.len(), output.len());
    let len = output.len();
    let vec_len = len & !7;

    unsafe {
        let zero = _mm256_setzero_ps();
        for i in (0..vec_len).step_by(8) {
            let p = _mm256_loadu_ps(input.as_ptr().add(i));
            _mm256_storeu_ps(output.as_mut_ptr().add(i), _mm256_max_ps(p, zero));
        }
    }
    for i in vec_len..len {
        output[i] = if input[i] > 0.0 { input[i] } else { 0.0 };
    }
}

fn check_params(params: &OpParams) -> Result<()> {
    match params {
        OpParams::None => Ok(()),
        _ => Err(Error::InvalidParameter { op: OpKind::Relu, reason: "ReLU takes no parameters" }),
    }
}

fn valid_node(graph: &Graph, node: &Node) -> bool {
    let input = graph.tensor(node.input);
    let output = graph.tensor(node.output);
    input.dtype() == DType::F32
        && output.dtype() == DType::F32
        && input.element_count() == output.element_count()
        && node.params == OpParams::None
}

fn select_scalar(_cpu: &CpuInfo, graph: &Graph, node: &Node) -> Option<Arc<dyn Kernel>> {
    valid_node(graph, node).then(|| Arc::new(ReluScalar) as Arc<dyn Kernel>)
}

#[cfg(target_arch = "aarch64")]
fn select_neon(cpu: &CpuInfo, graph: &Graph, node: &Node) -> Option<Arc<dyn Kernel>> {
    if !cpu.supports(crate::cpu::Feature::Neon) {
        return None;
    }
    valid_node(graph, node).then(|| Arc::new(ReluNeon) as Arc<dyn Kernel>)
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
fn select_avx2(cpu: &CpuInfo, graph: &Graph, node: &Node) -> Option<Arc<dyn Kernel>> {
    if !cpu.supports(crate::cpu::Feature::Avx2) {
        return None;
    }
    valid_node(graph, node).then(|| Arc::new(ReluAvx2) as Arc<dyn Kernel>)
}

/// Registers the ReLU selectors for the native architecture.
pub fn register(registry: &mut Registry) {
    let arch = Arch::native();
    registry.register(arch, OpKind::Relu, select_scalar, SCALAR_PRIORITY);

    #[cfg(target_arch = "aarch64")]
    registry.register(arch, OpKind::Relu, select_neon, crate::ops::SIMD_PRIORITY);

    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    registry.register(arch, OpKind::Relu, select_avx2, crate::ops::SIMD_PRIORITY);
}
