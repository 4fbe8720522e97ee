//! Vectorizable exponential primitive.
//!
//! One Cephes-style polynomial, three evaluations: scalar, NEON (4 lanes),
//! and AVX2 (8 lanes). Every form performs the identical sequence of IEEE
//! single-precision operations — fused multiply-adds for the polynomial,
//! single-rounded mul/sub elsewhere — so a lane of [`exp_ps`] or
//! [`exp256_ps`] is bit-identical to [`exp_approx`] of the same input. That
//! equality is what lets a kernel's vector body and scalar tail agree no
//! matter where the partitioner draws its chunk boundaries.
//!
//! # Accuracy contract
//!
//! Relative error ≤ 1e-6 against the true exponential for finite inputs in
//! `[-87.3, 88.37]`. Inputs outside that range are clamped first, so the
//! result saturates instead of overflowing to infinity or denormal noise.
//! NaN inputs are unspecified.

const EXP_HI: f32 = 88.376_26;
const EXP_LO: f32 = -88.376_26;

const LOG2EF: f32 = 1.442_695_04;
const C1: f32 = 0.693_359_375;
const C2: f32 = -2.121_944_4e-4;

const P0: f32 = 1.987_569_1e-4;
const P1: f32 = 1.398_199_9e-3;
const P2: f32 = 8.333_452e-3;
const P3: f32 = 4.166_579_6e-2;
const P4: f32 = 1.666_666_5e-1;
const P5: f32 = 5.000_000_2e-1;

/// Scalar exponential. The reference form of the shared polynomial; the SIMD
/// forms below are lane-wise bit-identical to it.
#[inline]
pub fn exp_approx(x: f32) -> f32 {
    let x = x.min(EXP_HI).max(EXP_LO);

    // Split exp(x) = 2^n * exp(r) with n = floor(x * log2(e) + 0.5).
    let fx = x.mul_add(LOG2EF, 0.5).floor();
    let x = x - fx * C1;
    let x = x - fx * C2;

    let z = x * x;
    let mut y = P0;
    y = y.mul_add(x, P1);
    y = y.mul_add(x, P2);
    y = y.mul_add(x, P3);
    y = y.mul_add(x, P4);
    y = y.mul_add(x, P5);
    y = y.mul_add(z, x);
    y += 1.0;

    let n = fx as i32;
    let pow2n = f32::from_bits(((n + 0x7f) << 23) as u32);
    y * pow2n
}

/// NEON exponential over 4 lanes. Lane-wise bit-identical to [`exp_approx`].
///
/// # Safety
/// Caller must be on aarch64 (NEON is baseline there).
#[cfg(target_arch = "aarch64")]
#[inline]
pub unsafe fn exp_ps(
    x: core::arch::aarch64::float32x4_t,
) -> core::arch::aarch64::float32x4_t {
    use core::arch::aarch64::*;

    unsafe {
        let x = vminq_f32(x, vdupq_n_f32(EXP_HI));
        let mut x = vmaxq_f32(x, vdupq_n_f32(EXP_LO));

        let fx = vrndmq_f32(vfmaq_f32(vdupq_n_f32(0.5), x, vdupq_n_f32(LOG2EF)));
        x = vsubq_f32(x, vmulq_f32(fx, vdupq_n_f32(C1)));
        x = vsubq_f32(x, vmulq_f32(fx, vdupq_n_f32(C2)));

        let z = vmulq_f32(x, x);
        let mut y = vdupq_n_f32(P0);
        y = vfmaq_f32(vdupq_n_f32(P1), y, x);
        y = vfmaq_f32(vdupq_n_f32(P2), y, x);
        y = vfmaq_f32(vdupq_n_f32(P3), y, x);
        y = vfmaq_f32(vdupq_n_f32(P4), y, x);
        y = vfmaq_f32(vdupq_n_f32(P5), y, x);
        y = vfmaq_f32(x, y, z);
        y = vaddq_f32(y, vdupq_n_f32(1.0));

        let n = vcvtq_s32_f32(fx);
        let pow2n = vreinterpretq_f32_s32(vshlq_n_s32::<23>(vaddq_s32(n, vdupq_n_s32(0x7f))));
        vmulq_f32(y, pow2n)
    }
}

/// AVX2 exponential over 8 lanes. Lane-wise bit-identical to [`exp_approx`].
///
/// # Safety
/// Caller must have verified AVX2 and FMA support at runtime.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[target_feature(enable = "avx2,fma")]
#[inline]
pub unsafe fn exp256_ps(x: core::arch::x86_64::__m256) -> core::arch::x86_64::__m256 {
    use core::arch::x86_64::*;

    unsafe {
        let x = _mm256_min_ps(x, _mm256_set1_ps(EXP_HI));
        let mut x = _mm256_max_ps(x, _mm256_set1_ps(EXP_LO));

        let fx = _mm256_floor_ps(_mm256_fmadd_ps(
            x,
            _mm256_set1_ps(LOG2EF),
            _mm256_set1_ps(0.5),
        ));
        x = _mm256_sub_ps(x, _mm256_mul_ps(fx, _mm256_set1_ps(C1)));
        x = _mm256_sub_ps(x, _mm256_mul_ps(fx, _mm256_set1_ps(C2)));

        let z = _mm256_mul_ps(x, x);
        let mut y = _mm256_set1_ps(P0);
        y = _mm256_fmadd_ps(y, x, _mm256_set1_ps(P1));
        y = _mm256_fmadd_ps(y, x, _mm256_set1_ps(P2));
        y = _mm256_fmadd_ps(y, x, _mm256_set1_ps(P3));
        y = _mm256_fmadd_ps(y, x, _mm256_set1_ps(P4));
        y = _mm256_fmadd_ps(y, x, _mm256_set1_ps(P5));
        y = _mm256_fmadd_ps(y, z, x);
        y = _mm256_add_ps(y, _mm256_set1_ps(1.0));

        let n = _mm256_cvttps_epi32(fx);
        let pow2n = _mm256_castsi256_ps(_mm256_slli_epi32::<23>(_mm256_add_epi32(
            n,
            _mm256_set1_epi32(0x7f),
        )));
        _mm256_mul_ps(y, pow2n)
    }
}
