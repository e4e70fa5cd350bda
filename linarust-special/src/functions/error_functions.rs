//! Error function family and the standard normal CDF/quantile.

use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

const TWO_OVER_SQRT_PI: f64 = 1.128_379_167_095_512_6;
const FRAC_1_SQRT_PI: f64 = 0.564_189_583_547_756_3;
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
/// `ln √(2π)`.
pub const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

/// Below this `|x|` the Maclaurin series is used, above it the continued fraction.
const SERIES_LIMIT: f64 = 3.0;

/// Maclaurin series `erf(x) = 2/√π · Σ (-1)ⁿ x²ⁿ⁺¹ / (n!·(2n+1))` for `x ≥ 0`.
fn erf_series(x: f64) -> f64 {
    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    for n in 1..60 {
        term *= -x2 / n as f64;
        let contribution = term / (2 * n + 1) as f64;
        sum += contribution;
        if contribution.abs() < sum.abs() * 1e-17 {
            break;
        }
    }
    sum * TWO_OVER_SQRT_PI
}

/// Laplace continued fraction for `erfc(x)`, `x ≥ SERIES_LIMIT`, evaluated
/// backwards from a fixed depth.
fn erfc_continued_fraction(x: f64) -> f64 {
    let mut f = 0.0;
    for n in (1..=60).rev() {
        f = n as f64 * 0.5 / (x + f);
    }
    (-x * x).exp() * FRAC_1_SQRT_PI / (x + f)
}

/// The error function.
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.is_infinite() {
        return x.signum();
    }
    let a = x.abs();
    let value = if a < SERIES_LIMIT {
        erf_series(a)
    } else {
        1.0 - erfc_continued_fraction(a)
    };
    value.copysign(x)
}

/// The complementary error function `1 - erf(x)`, accurate in the right tail.
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return 0.0;
    }
    if x == f64::NEG_INFINITY {
        return 2.0;
    }
    let a = x.abs();
    let tail = if a < SERIES_LIMIT {
        1.0 - erf_series(a)
    } else {
        erfc_continued_fraction(a)
    };
    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

/// Standard normal CDF `Φ(x) = ½·erfc(-x/√2)`.
pub fn ndtr(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// `ln Φ(x)`, using the asymptotic expansion in the far left tail.
pub fn log_ndtr(x: f64) -> f64 {
    if x > -20.0 {
        return ndtr(x).ln();
    }
    let r = 1.0 / (x * x);
    let series = 1.0 - r * (1.0 - 3.0 * r * (1.0 - 5.0 * r * (1.0 - 7.0 * r)));
    -0.5 * x * x - (-x).ln() - LN_SQRT_2PI + series.ln()
}

/// Standard normal density.
pub(crate) fn normal_density(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Acklam's rational approximation of `Φ⁻¹(p)`, relative error about 1e-9.
fn ndtri_initial(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };
    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// Quantile of the standard normal distribution, `Φ⁻¹(p)`.
///
/// Acklam's approximation followed by Halley steps on `Φ(x) - p`. The lower
/// half is refined directly and the upper half by symmetry, so both tails keep
/// full relative precision.
pub fn ndtri(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    if p > 0.5 {
        return -ndtri(1.0 - p);
    }
    let mut x = ndtri_initial(p);
    for _ in 0..3 {
        let density = normal_density(x);
        if density < 1e-300 {
            break;
        }
        let err = ndtr(x) - p;
        if err == 0.0 {
            break;
        }
        let step = err / density;
        x -= step / (1.0 + 0.5 * x * step);
    }
    x
}

/// Inverse error function on `[-1, 1]`.
pub fn erfinv(y: f64) -> f64 {
    if y.is_nan() || !(-1.0..=1.0).contains(&y) {
        return f64::NAN;
    }
    if y.abs() < 1e-3 {
        // Maclaurin series; Φ⁻¹ near ½ would lose relative precision here.
        let z = std::f64::consts::PI * y * y;
        let series = 1.0 + z * (1.0 / 12.0 + z * (7.0 / 480.0 + z * 127.0 / 40_320.0));
        return 0.5 * std::f64::consts::PI.sqrt() * y * series;
    }
    // erfinv(y) = -Φ⁻¹((1 - |y|) / 2) / √2, keeping the small tail probability exact.
    let magnitude = -ndtri(0.5 * (1.0 - y.abs())) / SQRT_2;
    magnitude.copysign(y)
}

#[cfg(test)]
#[path = "error_functions_test.rs"]
mod tests;
