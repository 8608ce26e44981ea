//! Draw helpers shared by every stochastic model.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Gaussian draw. A zero standard deviation returns the mean without
/// consuming randomness.
pub fn gauss<R: Rng + ?Sized>(rng: &mut R, mean: f64, stddev: f64) -> f64 {
    if stddev == 0.0 {
        return mean;
    }
    let z: f64 = StandardNormal.sample(rng);
    z * stddev + mean
}

pub fn clamped_gauss<R: Rng + ?Sized>(rng: &mut R, mean: f64, stddev: f64, min: f64, max: f64) -> f64 {
    gauss(rng, mean, stddev).clamp(min, max)
}

#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>()
}

/// Skewed draw through an inverse-tangent quantile transform.
///
/// `median` is the uniform sample that maps to the middle of the output range
/// and `squish` controls how sharply mass concentrates around it. Passing
/// `None` for `slope` or `offset` normalizes the output into `[0, 1]`.
pub fn tangent_draw<R: Rng + ?Sized>(
    rng: &mut R,
    median: f64,
    squish: f64,
    slope: Option<f64>,
    offset: Option<f64>,
) -> f64 {
    let r = uniform(rng);
    tangent_quantile(r, median, squish, slope, offset)
}

pub fn tangent_quantile(
    r: f64,
    median: f64,
    squish: f64,
    slope: Option<f64>,
    offset: Option<f64>,
) -> f64 {
    let slope = slope.unwrap_or_else(|| {
        PI / (((1.0 - median) * squish).atan() - (-median * squish).atan())
    });
    let offset = offset.unwrap_or_else(|| -slope * ((-median * squish).atan() + PI / 2.0) / PI);
    slope * (((r - median) * squish).atan() + PI / 2.0) / PI + offset
}
