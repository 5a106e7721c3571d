//! Numeric constants available to compiled expressions.

use num_complex::Complex64;

pub const PI: f64 = std::f64::consts::PI;

/// Euler's number.
pub const E: f64 = std::f64::consts::E;

/// The imaginary unit.
pub const I: Complex64 = Complex64::new(0.0, 1.0);

/// The number of radians in one degree.
pub const DEGREE: f64 = PI / 180.0;

/// The golden ratio.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// The Euler-Mascheroni constant.
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
