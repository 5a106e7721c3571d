//! Special functions missing from the standard library.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Coefficients of the Lanczos approximation with `g = 7`.
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Maximum number of terms summed by [`hyp1f1`].
const MAX_TERMS: usize = 10_000;

/// The gamma function of a complex argument.
pub fn gamma(z: Complex64) -> Complex64 {
    if z.re < 0.5 {
        // reflection formula
        let pi = Complex64::new(PI, 0.0);
        return pi / ((pi * z).sin() * gamma(1.0 - z));
    }

    let z = z - 1.0;
    let mut x = Complex64::new(LANCZOS[0], 0.0);
    for (i, c) in LANCZOS.iter().enumerate().skip(1) {
        x += *c / (z + i as f64);
    }
    let t = z + 7.5;
    (2.0 * PI).sqrt() * t.powc(z + 0.5) * (-t).exp() * x
}

/// The upper incomplete gamma function `Γ(a, x)` for real arguments.
pub fn gamma_upper(a: f64, x: f64) -> f64 {
    if x == 0.0 && a > 0.0 {
        return statrs::function::gamma::gamma(a);
    }
    statrs::function::gamma::checked_gamma_ui(a, x).unwrap_or(f64::NAN)
}

/// Sums the power series of `₁F₁(a; b; z)`.
fn kummer_series(a: Complex64, b: Complex64, z: Complex64) -> Complex64 {
    let mut term = Complex64::new(1.0, 0.0);
    let mut sum = term;
    for n in 0..MAX_TERMS {
        let n = n as f64;
        term *= (a + n) * z / ((b + n) * (n + 1.0));
        sum += term;
        if term.norm() <= f64::EPSILON * sum.norm() || !sum.is_finite() {
            break;
        }
    }
    sum
}

/// Kummer's confluent hypergeometric function `₁F₁(a; b; z)`.
///
/// Arguments with a negative real part go through Kummer's transformation
/// `₁F₁(a; b; z) = eᶻ ₁F₁(b - a; b; -z)`, which avoids cancellation between alternating terms.
pub fn hyp1f1(a: Complex64, b: Complex64, z: Complex64) -> Complex64 {
    if z.re < 0.0 {
        z.exp() * kummer_series(b - a, b, -z)
    } else {
        kummer_series(a, b, z)
    }
}

/// The error function of a complex argument, `erf(z) = 2z/√π ₁F₁(1/2; 3/2; -z²)`.
pub fn erf(z: Complex64) -> Complex64 {
    let half = Complex64::new(0.5, 0.0);
    let three_halves = Complex64::new(1.5, 0.0);
    2.0 * z / PI.sqrt() * hyp1f1(half, three_halves, -z * z)
}
