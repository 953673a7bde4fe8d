//! Bernstein basis and cubic Bezier evaluation.
//!
//! Two evaluators are provided. [`evaluate`] uses De Casteljau's repeated
//! linear interpolation and is what the texture builder uses for every curve
//! query. [`evaluate_bernstein`] sums the Bernstein-weighted control points
//! directly; the light model uses it to build the stencil boundary polygon.
//! Both agree to within float rounding.

use crate::math::vec3::Vec3;

/// Control points per curve segment (cubic).
pub const NUM_CPS_IN_CURVE: usize = 4;

/// Degree of every curve segment.
pub const DEGREE: usize = NUM_CPS_IN_CURVE - 1;

/// Number of parameter steps in [`bernstein_table`].
pub const COEFF_DIV: usize = 1024;

/// Binomial coefficient `C(n, m)`.
///
/// Uses the symmetric reduced product, so at most `min(m, n - m)` steps run.
/// Every partial product is itself a binomial coefficient, which keeps the
/// integer division exact.
pub fn binomial(n: u32, m: u32) -> u32 {
    debug_assert!(m <= n, "binomial({n}, {m}) is undefined");
    let m = m.min(n - m);
    let mut ret = 1;
    for i in 0..m {
        ret = ret * (n - i) / (i + 1);
    }
    ret
}

/// Bernstein basis polynomial `C(n, i) * t^i * (1 - t)^(n - i)`.
pub fn bernstein(n: u32, i: u32, t: f64) -> f32 {
    (binomial(n, i) as f64 * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32)) as f32
}

/// Evaluates a cubic segment at `t` with De Casteljau's algorithm.
pub fn evaluate(segment: &[Vec3; NUM_CPS_IN_CURVE], t: f32) -> Vec3 {
    let mut vs = *segment;
    for i in (1..NUM_CPS_IN_CURVE).rev() {
        for j in 0..i {
            vs[j] = vs[j].lerp(vs[j + 1], t);
        }
    }
    vs[0]
}

/// Evaluates a cubic segment at `t` by direct Bernstein summation.
pub fn evaluate_bernstein(segment: &[Vec3; NUM_CPS_IN_CURVE], t: f64) -> Vec3 {
    let mut p = Vec3::ZERO;
    for (d, cp) in segment.iter().enumerate() {
        p += *cp * bernstein(DEGREE as u32, d as u32, t);
    }
    p
}

/// Cubic Bernstein weights sampled at `t = i / COEFF_DIV` for `i` in `0..=COEFF_DIV`.
///
/// Each row holds `[B0(t), B1(t), B2(t), B3(t)]`; suitable for upload as a
/// 1D lookup texture.
pub fn bernstein_table() -> Vec<[f32; 4]> {
    let n = DEGREE as u32;
    (0..=COEFF_DIV)
        .map(|i| {
            let t = 1.0 / COEFF_DIV as f64 * i as f64;
            [
                bernstein(n, 0, t),
                bernstein(n, 1, t),
                bernstein(n, 2, t),
                bernstein(n, 3, t),
            ]
        })
        .collect()
}
