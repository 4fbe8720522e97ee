//! Utilities to approximate equality of floating point values.
//!
//! Vectorized kernels are only contractually accurate to a relative
//! tolerance (the exponential primitive documents ≤ 1e-6), so tests compare
//! against reference values with [`approx_eq`] rather than `==`.

/// Tolerance matching the vectorized-kernel accuracy contract.
pub const KERNEL_REL_ERROR: f32 = 1e-4;

/// Tolerance matching the exponential primitive's accuracy contract.
pub const EXP_REL_ERROR: f32 = 1e-6;

/// Relative error of `got` against `want`, using absolute error near zero.
pub fn relative_error(got: f32, want: f32) -> f32 {
    let diff = (got - want).abs();
    if want.abs() < 1e-10 { diff } else { diff / want.abs() }
}

/// Whether `got` is within relative tolerance `tol` of `want`.
pub fn approx_eq(got: f32, want: f32, tol: f32) -> bool {
    relative_error(got, want) <= tol
}

/// Whether every element of `got` is within `tol` of its counterpart.
///
/// # Panics
/// Panics if the slices have different lengths.
pub fn approx_eq_slice(got: &[f32], want: &[f32], tol: f32) -> bool {
    assert_eq!(got.len(), want.len(), "length mismatch");
    got.iter().zip(want).all(|(&g, &w)| approx_eq(g, w, tol))
}
