use opflow::approx::{relative_error, EXP_REL_ERROR};
use opflow::ops::math::exp_approx;

#[test]
fn test_exp_accuracy_sweep() {
    // 0.05-wide steps across the full supported domain.
    let mut worst = 0.0f32;
    for i in -1746..=1746 {
        let x = i as f32 * 0.05;
        let err = relative_error(exp_approx(x), x.exp());
        if err > worst {
            worst = err;
        }
    }
    assert!(worst <= EXP_REL_ERROR, "worst relative error {worst:e} exceeds contract");
}

#[test]
fn test_exp_exact_at_zero() {
    assert_eq!(exp_approx(0.0), 1.0);
}

#[test]
fn test_exp_saturates_outside_domain() {
    // Out-of-range inputs clamp rather than overflow or collapse.
    let hi = exp_approx(1000.0);
    assert!(hi.is_finite());
    assert_eq!(hi, exp_approx(88.4));

    let lo = exp_approx(-1000.0);
    assert!(lo >= 0.0 && lo < 1e-37);
    assert_eq!(lo, exp_approx(-88.4));
}

#[test]
fn test_exp_monotonic_on_grid() {
    let mut prev = exp_approx(-10.0);
    for i in -199..=200 {
        let x = i as f32 * 0.05;
        let y = exp_approx(x);
        assert!(y >= prev, "exp_approx not monotonic at x={x}");
        prev = y;
    }
}
