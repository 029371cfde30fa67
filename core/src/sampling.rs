//! Sampling routines for Monte Carlo integration.
//!
//! These are stateless mappings from canonical uniform samples to
//! domain-specific distributions, plus the stratification utilities the
//! samplers are built on. Every randomized routine takes the random number
//! generator explicitly so callers control determinism.

#![allow(dead_code)]

use crate::common::*;
use crate::geometry::*;
use crate::rng::*;

/// Maps a 2D sample in [0,1)² to the unit radius disk using Shirley's
/// concentric mapping, which avoids the area distortion of the naive polar
/// mapping. The degenerate sample at the square's center maps to the origin.
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to [-1,1]^2.
    let sx = 2.0 * u.x - 1.0;
    let sy = 2.0 * u.y - 1.0;

    // Handle degeneracy at the origin.
    if sx == 0.0 && sy == 0.0 {
        return Point2f::zero();
    }

    // Each wedge of the square maps to a radius and an angular fraction in
    // [0,8) which is then scaled by π/4.
    let (r, mut theta) = if sx >= -sy {
        if sx > sy {
            (sx, if sy > 0.0 { sy / sx } else { 8.0 + sy / sx })
        } else {
            (sy, 2.0 - sx / sy)
        }
    } else if sx <= sy {
        (-sx, 4.0 - sy / -sx)
    } else {
        (-sy, 6.0 + sx / -sy)
    };

    theta *= PI_OVER_FOUR;
    Point2f::new(r * theta.cos(), r * theta.sin())
}

/// Uniformly sample a direction on the hemisphere centered at the origin
/// above the xy plane.
///
/// * `u` - The random sample point.
pub fn uniform_sample_hemisphere(u: &Point2f) -> Vector3f {
    let z = u.x;
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = TWO_PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a hemisphere.
#[inline]
pub fn uniform_hemisphere_pdf() -> Float {
    INV_TWO_PI
}

/// Uniformly sample a direction from the sphere centered at the origin.
///
/// * `u` - The random sample point.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u.x;
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = TWO_PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a sphere.
#[inline]
pub fn uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Sample a direction on the hemisphere with a cosine distribution over the
/// polar angle, by uniformly sampling the unit disk and projecting up to the
/// hemisphere (Malley's method). This keeps the sampled directions exactly
/// consistent with `cosine_hemisphere_pdf`.
///
/// * `u` - The random sample point.
#[inline]
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = max(0.0, 1.0 - d.x * d.x - d.y * d.y).sqrt();
    Vector3f::new(d.x, d.y, z)
}

/// Returns the PDF for cosine-weighted hemisphere sampling.
///
/// * `cos_theta` - Cosine of the polar angle. Should be in [0,1].
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    debug_assert!((0.0..=1.0).contains(&cos_theta));
    cos_theta * INV_PI
}

/// Uniformly sample a direction inside the cone of directions around the
/// z-axis with the given spread angle.
///
/// * `u`             - The random sample point.
/// * `cos_theta_max` - Cosine of the cone spread angle, in [0,1).
pub fn uniform_sample_cone(u: &Point2f, cos_theta_max: Float) -> Vector3f {
    debug_assert!((0.0..1.0).contains(&cos_theta_max));

    let cos_theta = (1.0 - u.x) + u.x * cos_theta_max;
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = u.y * TWO_PI;
    Vector3f::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta)
}

/// Returns the PDF for sampling a direction from a cone of directions.
///
/// * `cos_theta_max` - Cosine of the cone spread angle, in [0,1).
#[inline]
pub fn uniform_cone_pdf(cos_theta_max: Float) -> Float {
    1.0 / (TWO_PI * (1.0 - cos_theta_max))
}

/// Uniformly sample a point on a triangle. Returns the first two barycentric
/// coordinates, so the mapping is independent of the actual vertices. The
/// result satisfies `b1 >= 0`, `b2 >= 0` and `b1 + b2 <= 1`.
///
/// * `u` - The random sample point.
pub fn uniform_sample_triangle(u: &Point2f) -> (Float, Float) {
    let su0 = u.x.sqrt();
    (1.0 - su0, u.y * su0)
}

/// Fills the slice with stratified 1D values in [0,1).
///
/// * `samples` - The slice to fill; its length is the number of strata.
/// * `jitter`  - Jitter the samples within their strata.
/// * `rng`     - Random number generator.
pub fn stratified_sample_1d(samples: &mut [Float], jitter: bool, rng: &mut RNG) {
    let n_samples = samples.len();
    if n_samples == 0 {
        return;
    }

    let inv_n_samples = 1.0 / n_samples as Float;
    for (i, sample) in samples.iter_mut().enumerate() {
        let delta = if jitter { rng.uniform_float() } else { 0.5 };
        *sample = min((i as Float + delta) * inv_n_samples, ONE_MINUS_EPSILON);
    }
}

/// Fills the slice with stratified 2D values in [0,1)², one sample per cell
/// of an `nx` by `ny` grid in row-major order.
///
/// * `samples` - The slice to fill; must hold `nx * ny` points.
/// * `nx`      - Number of strata in x-direction.
/// * `ny`      - Number of strata in y-direction.
/// * `jitter`  - Jitter the samples within their strata.
/// * `rng`     - Random number generator.
pub fn stratified_sample_2d(
    samples: &mut [Point2f],
    nx: usize,
    ny: usize,
    jitter: bool,
    rng: &mut RNG,
) {
    debug_assert!(samples.len() >= nx * ny);
    if nx == 0 || ny == 0 {
        return;
    }

    let dx = 1.0 / nx as Float;
    let dy = 1.0 / ny as Float;

    let mut i = 0;
    for y in 0..ny {
        for x in 0..nx {
            let jx = if jitter { rng.uniform_float() } else { 0.5 };
            let jy = if jitter { rng.uniform_float() } else { 0.5 };
            samples[i] = Point2f::new(
                min((x as Float + jx) * dx, ONE_MINUS_EPSILON),
                min((y as Float + jy) * dy, ONE_MINUS_EPSILON),
            );
            i += 1;
        }
    }
}

/// Fills the slice with 2D Latin hypercube samples: the samples are placed
/// along the diagonal of the unit square so each axis is stratified into
/// `n` strata, then the x and y coordinates are permuted independently so
/// the pairing between axes is randomized.
///
/// * `samples` - The slice to fill; its length is the number of samples.
/// * `jitter`  - Jitter the samples within their strata.
/// * `rng`     - Random number generator.
pub fn latin_hypercube_2d(samples: &mut [Point2f], jitter: bool, rng: &mut RNG) {
    let n_samples = samples.len();
    if n_samples == 0 {
        return;
    }

    // Generate samples along the diagonal.
    let delta = 1.0 / n_samples as Float;
    for (i, sample) in samples.iter_mut().enumerate() {
        let jx = if jitter { rng.uniform_float() } else { 0.5 };
        let jy = if jitter { rng.uniform_float() } else { 0.5 };
        *sample = Point2f::new(
            min((i as Float + jx) * delta, ONE_MINUS_EPSILON),
            min((i as Float + jy) * delta, ONE_MINUS_EPSILON),
        );
    }

    // Permute each dimension independently.
    for j in 0..n_samples {
        let other = j + rng.bounded_uniform_u32(0, (n_samples - j) as u32) as usize;
        let tmp = samples[j].x;
        samples[j].x = samples[other].x;
        samples[other].x = tmp;

        let other = j + rng.bounded_uniform_u32(0, (n_samples - j) as u32) as usize;
        let tmp = samples[j].y;
        samples[j].y = samples[other].y;
        samples[other].y = tmp;
    }
}

/// Randomly permute a slice of `count` n-dimensional records stored in a
/// flat layout, using the Fisher–Yates algorithm.
///
/// * `values`       - The slice to shuffle.
/// * `count`        - Number of n-dimensional records.
/// * `n_dimensions` - Number of dimensions per record.
/// * `rng`          - Random number generator.
pub fn shuffle<T>(values: &mut [T], count: usize, n_dimensions: usize, rng: &mut RNG) {
    debug_assert!(count * n_dimensions <= values.len());

    for i in 0..count {
        let other = i + rng.bounded_uniform_u32(0, (count - i) as u32) as usize;
        for j in 0..n_dimensions {
            values.swap(n_dimensions * i + j, n_dimensions * other + j);
        }
    }
}

/// Weight samples using the balance heuristic for multiple importance
/// sampling with two strategies. The all-zero denominator case is a caller
/// precondition.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn balance_heuristic(nf: usize, f_pdf: Float, ng: usize, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    f / (f + g)
}

/// Weight samples using the power heuristic for multiple importance sampling
/// with two strategies, with an exponent of 2. The all-zero denominator case
/// is a caller precondition.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn power_heuristic(nf: usize, f_pdf: Float, ng: usize, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    (f * f) / (f * f + g * g)
}

/// Lanczos windowed sinc filter. The argument should be normalized so that
/// the filter support is [-1,1]; values outside it evaluate to 0.
///
/// * `x`   - Point at which the filter is evaluated.
/// * `tau` - Number of sinc cycles within the window.
pub fn lanczos(x: Float, tau: Float) -> Float {
    let x = abs(x);
    if x < 1e-5 {
        return 1.0;
    }
    if x > 1.0 {
        return 0.0;
    }

    let x = x * PI;
    let window = (x * tau).sin() / (x * tau);
    let sinc = x.sin() / x;
    window * sinc
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
