//! MIPMap

#![allow(dead_code)]

use crate::blocked_array::*;
use crate::common::*;
use crate::error::Error;
use crate::geometry::*;
use crate::sampling::lanczos;
use std::ops::{Add, AddAssign, Div, Mul};

/// Size of the EWA weights lookup table.
const WEIGHT_LUT_SIZE: usize = 128;

/// Length below which an ellipse axis is considered degenerate.
const MINOR_AXIS_EPSILON: Float = 1e-6;

/// Determines how to handle out-of-bounds texels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ImageWrap {
    /// Wrap the texture at its edges.
    Repeat,

    /// Treat the texture as zero (black) beyond its edges.
    Black,
}

/// Holds resampling weights for one texel of a zoomed image.
#[derive(Copy, Clone, Default)]
struct ResampleWeight {
    /// Offset to the first of the four contributing texels.
    first_texel: i64,

    /// The weight values for the 4 contributing texels.
    weight: [Float; 4],
}

/// An image pyramid supporting trilinear and elliptically-weighted-average
/// anisotropic filtering with spatially varying filter widths.
///
/// Level 0 is the full-resolution image (after resampling to power-of-two
/// dimensions when necessary) and the last level is a single texel. The
/// pyramid is built once and is read-only afterwards.
pub struct MIPMap<T> {
    /// Determines how to handle out-of-bounds texels.
    wrap_mode: ImageWrap,

    /// Width of the highest resolution level.
    width: usize,

    /// Height of the highest resolution level.
    height: usize,

    /// Ratio of the major ellipse axis to its minor axis beyond which the
    /// minor axis is scaled up.
    max_anisotropy: Float,

    /// The image pyramid of increasingly lower resolution prefiltered
    /// versions of the original image.
    pyramid: Vec<BlockedArray<T>>,

    /// Precomputed lookup table of Gaussian-like filter function values.
    weight_lut: [Float; WEIGHT_LUT_SIZE],
}

impl<T> MIPMap<T>
where
    T: Copy
        + Default
        + Add<T, Output = T>
        + AddAssign
        + Mul<Float, Output = T>
        + Div<Float, Output = T>,
{
    /// Builds a MIPMap for the given image.
    ///
    /// * `values`         - 2D array of the image values; all rows must have
    ///                      the same length and the image must have at least
    ///                      one row and one column.
    /// * `wrap_mode`      - Determines how to handle out-of-bounds texels.
    /// * `max_anisotropy` - Maximum allowed ratio of the major ellipse axis
    ///                      to its minor axis. Values below 1.0 are clamped
    ///                      up to 1.0.
    pub fn new(values: &[Vec<T>], wrap_mode: ImageWrap, max_anisotropy: Float) -> Result<Self, Error> {
        if values.is_empty() || values[0].is_empty() {
            return Err(Error::EmptyImage);
        }
        let width = values[0].len();
        let height = values.len();
        if values.iter().any(|row| row.len() != width) {
            return Err(Error::RaggedImage);
        }

        let max_anisotropy = max(max_anisotropy, 1.0);

        let mut image: Vec<T> = Vec::with_capacity(width * height);
        for row in values {
            image.extend_from_slice(row);
        }

        // Resample to power-of-two dimensions when necessary; all further
        // work uses the post-resample size.
        let (image, width, height) = if !width.is_power_of_two() || !height.is_power_of_two() {
            resample_to_power_of_two(&image, width, height, wrap_mode)
        } else {
            (image, width, height)
        };

        // Initialize the most detailed level and then each level from the
        // previous one with a 2x2 box filter.
        let n_levels = 1 + log2_int(max(width, height));
        let mut pyramid: Vec<BlockedArray<T>> = Vec::with_capacity(n_levels);
        pyramid.push(BlockedArray::from_slice(width, height, &image));

        for level in 1..n_levels {
            let u_res = max(1, pyramid[level - 1].u_size() / 2);
            let v_res = max(1, pyramid[level - 1].v_size() / 2);
            let mut current = BlockedArray::new(u_res, v_res);

            for v in 0..v_res {
                for u in 0..u_res {
                    let (u2, v2) = (2 * u as i64, 2 * v as i64);
                    let t0 = texel(&pyramid[level - 1], wrap_mode, u2, v2);
                    let t1 = texel(&pyramid[level - 1], wrap_mode, u2 + 1, v2);
                    let t2 = texel(&pyramid[level - 1], wrap_mode, u2, v2 + 1);
                    let t3 = texel(&pyramid[level - 1], wrap_mode, u2 + 1, v2 + 1);
                    current[(u, v)] = (t0 + t1 + t2 + t3) * 0.25;
                }
            }

            pyramid.push(current);
        }

        // Initialize the EWA filter weights.
        let mut weight_lut = [0.0; WEIGHT_LUT_SIZE];
        let alpha = 2.0;
        for (i, w) in weight_lut.iter_mut().enumerate() {
            let r2 = i as Float / (WEIGHT_LUT_SIZE - 1) as Float;
            *w = (-alpha * r2).exp() - (-alpha).exp();
        }

        Ok(Self {
            wrap_mode,
            width,
            height,
            max_anisotropy,
            pyramid,
            weight_lut,
        })
    }

    /// Returns the width of the highest resolution level.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the highest resolution level.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of pyramid levels.
    pub fn levels(&self) -> usize {
        self.pyramid.len()
    }

    /// Returns the filtered image value at the given point using the
    /// trilinear (isotropic triangle) filter.
    ///
    /// * `st`    - Texture coordinates; [0,1]² covers the image.
    /// * `width` - Filter width in normalized texture space.
    pub fn lookup(&self, st: &Point2f, width: Float) -> T {
        let levels = self.levels();
        let level = (levels - 1) as Float + log2(max(width, 1e-8));

        if level < 0.0 {
            self.triangle(0, st)
        } else if level >= (levels - 1) as Float {
            self.coarsest(st)
        } else {
            let i_level = level.floor() as usize;
            let delta = level - i_level as Float;
            self.triangle(i_level, st) * (1.0 - delta) + self.triangle(i_level + 1, st) * delta
        }
    }

    /// Returns the filtered image value at the given point using the EWA
    /// anisotropic filter over the elliptical footprint spanned by the two
    /// axis vectors.
    ///
    /// * `st`   - Texture coordinates; [0,1]² covers the image.
    /// * `dst0` - First ellipse axis in normalized texture space.
    /// * `dst1` - Second ellipse axis in normalized texture space.
    pub fn lookup_ewa(&self, st: &Point2f, dst0: &Vector2f, dst1: &Vector2f) -> T {
        // Order the axes so dst0 is the major one.
        let (mut dst0, mut dst1) = (*dst0, *dst1);
        if dst0.length_squared() < dst1.length_squared() {
            std::mem::swap(&mut dst0, &mut dst1);
        }

        let major_length = dst0.length();
        let mut minor_length = dst1.length();

        if minor_length < MINOR_AXIS_EPSILON {
            return self.triangle(0, st);
        }

        // Clamp the ellipse eccentricity if too large, trading blur for a
        // bounded number of filtered texels.
        if minor_length * self.max_anisotropy < major_length {
            let scale = major_length / (minor_length * self.max_anisotropy);
            dst1 *= scale;
            minor_length *= scale;
        }

        // Choose the level of detail from the minor axis length.
        let levels = self.levels();
        let level = max(0.0, (levels - 1) as Float + log2(minor_length));

        if level >= (levels - 1) as Float {
            self.coarsest(st)
        } else {
            let i_level = level.floor() as usize;
            let delta = level - i_level as Float;
            self.ewa(i_level, st, &dst0, &dst1) * (1.0 - delta)
                + self.ewa(i_level + 1, st, &dst0, &dst1) * delta
        }
    }

    /// Returns the single texel of the coarsest level. In repeat mode the
    /// value is returned unconditionally; otherwise points outside [0,1]²
    /// read as black.
    ///
    /// * `st` - Texture coordinates.
    fn coarsest(&self, st: &Point2f) -> T {
        let last = self.levels() - 1;
        match self.wrap_mode {
            ImageWrap::Repeat => texel(&self.pyramid[last], self.wrap_mode, 0, 0),
            ImageWrap::Black => {
                if st.x >= 0.0 && st.x <= 1.0 && st.y >= 0.0 && st.y <= 1.0 {
                    texel(&self.pyramid[last], self.wrap_mode, 0, 0)
                } else {
                    T::default()
                }
            }
        }
    }

    /// Interpolates between the four texels surrounding the sample point at
    /// the given level.
    ///
    /// * `level` - The pyramid level.
    /// * `st`    - Texture coordinates.
    fn triangle(&self, level: usize, st: &Point2f) -> T {
        let level = clamp(level, 0, self.levels() - 1);
        let layer = &self.pyramid[level];

        let s = st.x * layer.u_size() as Float - 0.5;
        let t = st.y * layer.v_size() as Float - 0.5;
        let s0 = s.floor() as i64;
        let t0 = t.floor() as i64;
        let ds = s - s0 as Float;
        let dt = t - t0 as Float;

        texel(layer, self.wrap_mode, s0, t0) * (1.0 - ds) * (1.0 - dt)
            + texel(layer, self.wrap_mode, s0, t0 + 1) * (1.0 - ds) * dt
            + texel(layer, self.wrap_mode, s0 + 1, t0) * ds * (1.0 - dt)
            + texel(layer, self.wrap_mode, s0 + 1, t0 + 1) * ds * dt
    }

    /// Filters the texels inside the elliptical footprint at the given
    /// level with the precomputed Gaussian-like weights.
    ///
    /// * `level` - The pyramid level.
    /// * `st`    - Texture coordinates.
    /// * `dst0`  - Major ellipse axis in normalized texture space.
    /// * `dst1`  - Minor ellipse axis in normalized texture space.
    fn ewa(&self, level: usize, st: &Point2f, dst0: &Vector2f, dst1: &Vector2f) -> T {
        let level = clamp(level, 0, self.levels() - 1);
        let layer = &self.pyramid[level];
        let u_size = layer.u_size() as Float;
        let v_size = layer.v_size() as Float;

        // Convert EWA coordinates to the scale of this level.
        let ps = st.x * u_size - 0.5;
        let pt = st.y * v_size - 0.5;
        let dst0 = [dst0.x * u_size, dst0.y * v_size];
        let dst1 = [dst1.x * u_size, dst1.y * v_size];

        // Compute the implicit ellipse coefficients, normalized so the
        // boundary satisfies e(s,t) = 1.
        let mut a = dst0[1] * dst0[1] + dst1[1] * dst1[1] + 1.0;
        let mut b = -2.0 * (dst0[0] * dst0[1] + dst1[0] * dst1[1]);
        let mut c = dst0[0] * dst0[0] + dst1[0] * dst1[0] + 1.0;
        let inv_f = 1.0 / (a * c - b * b * 0.25);
        a *= inv_f;
        b *= inv_f;
        c *= inv_f;

        // The ellipse's axis-aligned bounding box in texel space.
        let det = 4.0 * a * c - b * b;
        let inv_det = 1.0 / det;
        let s_sqrt = (det * c).sqrt();
        let t_sqrt = (a * det).sqrt();
        let s0 = (ps - 2.0 * inv_det * s_sqrt).ceil() as i64;
        let s1 = (ps + 2.0 * inv_det * s_sqrt).floor() as i64;
        let t0 = (pt - 2.0 * inv_det * t_sqrt).ceil() as i64;
        let t1 = (pt + 2.0 * inv_det * t_sqrt).floor() as i64;

        // Scan the bounding box and accumulate the texels inside the
        // ellipse.
        let mut sum = T::default();
        let mut sum_weights = 0.0;
        for it in t0..=t1 {
            let tt = it as Float - pt;
            for is in s0..=s1 {
                let ss = is as Float - ps;
                let r2 = a * ss * ss + b * ss * tt + c * tt * tt;
                if r2 < 1.0 {
                    let index = min((r2 * WEIGHT_LUT_SIZE as Float) as usize, WEIGHT_LUT_SIZE - 1);
                    let weight = self.weight_lut[index];
                    sum += texel(layer, self.wrap_mode, is, it) * weight;
                    sum_weights += weight;
                }
            }
        }

        // A micro-ellipse can fall entirely between texel centers; fall
        // back to bilinear interpolation rather than divide by zero.
        if sum_weights > 0.0 {
            sum / sum_weights
        } else {
            self.triangle(level, st)
        }
    }
}

/// Returns the texel at the given coordinates of a pyramid level,
/// accounting for the boundary condition.
///
/// * `layer`     - The pyramid level.
/// * `wrap_mode` - The image wrap mode.
/// * `s`         - s-index; may be out of bounds.
/// * `t`         - t-index; may be out of bounds.
fn texel<T>(layer: &BlockedArray<T>, wrap_mode: ImageWrap, s: i64, t: i64) -> T
where
    T: Copy + Default,
{
    let u_size = layer.u_size() as i64;
    let v_size = layer.v_size() as i64;

    match wrap_mode {
        ImageWrap::Repeat => layer[(
            s.rem_euclid(u_size) as usize,
            t.rem_euclid(v_size) as usize,
        )],
        ImageWrap::Black => {
            if s < 0 || s >= u_size || t < 0 || t >= v_size {
                T::default()
            } else {
                layer[(s as usize, t as usize)]
            }
        }
    }
}

/// Resamples an image to the next power-of-two resolution in each dimension
/// with a separable Lanczos reconstruction filter. Out-of-range taps wrap in
/// repeat mode and are dropped (with the surviving weights renormalized) in
/// black mode. Returns the resampled image and its dimensions.
///
/// * `image`     - Row-major image values.
/// * `width`     - Original width.
/// * `height`    - Original height.
/// * `wrap_mode` - The image wrap mode.
fn resample_to_power_of_two<T>(
    image: &[T],
    width: usize,
    height: usize,
    wrap_mode: ImageWrap,
) -> (Vec<T>, usize, usize)
where
    T: Copy
        + Default
        + Add<T, Output = T>
        + AddAssign
        + Mul<Float, Output = T>
        + Div<Float, Output = T>,
{
    let new_width = width.next_power_of_two();
    let new_height = height.next_power_of_two();
    info!(
        "Resampling MIPMap from {}x{} to {}x{}",
        width, height, new_width, new_height
    );

    // Zoom in the s direction.
    let s_weights = resample_weights(width, new_width);
    let mut s_zoomed = vec![T::default(); new_width * height];
    for t in 0..height {
        for s in 0..new_width {
            s_zoomed[t * new_width + s] =
                apply_weights(&s_weights[s], wrap_mode, width, |orig| {
                    image[t * width + orig]
                });
        }
    }

    // Zoom in the t direction.
    let t_weights = resample_weights(height, new_height);
    let mut resampled = vec![T::default(); new_width * new_height];
    for s in 0..new_width {
        for t in 0..new_height {
            resampled[t * new_width + s] =
                apply_weights(&t_weights[t], wrap_mode, height, |orig| {
                    s_zoomed[orig * new_width + s]
                });
        }
    }

    (resampled, new_width, new_height)
}

/// Computes the reconstruction filter taps for each texel of the zoomed
/// image. Each new texel takes contributions from 4 texels of the original
/// image weighted by a Lanczos kernel of radius 2, normalized to sum to 1.
///
/// * `old_res` - The old resolution.
/// * `new_res` - The new resolution.
fn resample_weights(old_res: usize, new_res: usize) -> Vec<ResampleWeight> {
    debug_assert!(new_res >= old_res);

    let filter_width = 2.0;
    let mut weights = vec![ResampleWeight::default(); new_res];

    for (i, rw) in weights.iter_mut().enumerate() {
        // Center of the i'th new texel in the old image's coordinates.
        let center = (i as Float + 0.5) * old_res as Float / new_res as Float;
        rw.first_texel = (center - filter_width + 0.5).floor() as i64;

        let mut sum = 0.0;
        for (j, w) in rw.weight.iter_mut().enumerate() {
            let pos = rw.first_texel as Float + j as Float + 0.5;
            *w = lanczos((pos - center) / filter_width, 2.0);
            sum += *w;
        }

        let inv_sum = 1.0 / sum;
        for w in rw.weight.iter_mut() {
            *w *= inv_sum;
        }
    }

    weights
}

/// Applies one texel's resampling taps along a single axis, wrapping or
/// dropping out-of-range taps per the wrap mode. Dropped taps renormalize
/// the surviving weights so constant images stay constant at the edges.
///
/// * `rw`        - The resampling taps.
/// * `wrap_mode` - The image wrap mode.
/// * `res`       - The original resolution along this axis.
/// * `fetch`     - Reads the original texel at a given in-range index.
fn apply_weights<T, F>(rw: &ResampleWeight, wrap_mode: ImageWrap, res: usize, fetch: F) -> T
where
    T: Copy + Default + AddAssign + Mul<Float, Output = T> + Div<Float, Output = T>,
    F: Fn(usize) -> T,
{
    let mut value = T::default();
    let mut weight_sum = 0.0;

    for j in 0..4 {
        let pos = rw.first_texel + j as i64;
        let orig = match wrap_mode {
            ImageWrap::Repeat => Some(pos.rem_euclid(res as i64) as usize),
            ImageWrap::Black => {
                if pos < 0 || pos >= res as i64 {
                    None
                } else {
                    Some(pos as usize)
                }
            }
        };

        if let Some(orig) = orig {
            value += fetch(orig) * rw.weight[j];
            weight_sum += rw.weight[j];
        }
    }

    assert!(weight_sum > 0.0, "resampling taps lost all weight");
    value / weight_sum
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::Spectrum;
    use float_cmp::approx_eq;

    fn constant_map(width: usize, height: usize, value: Float, wrap: ImageWrap) -> MIPMap<Float> {
        let image = vec![vec![value; width]; height];
        MIPMap::new(&image, wrap, 8.0).unwrap()
    }

    /// Left half red, right half blue; red + blue sums to one everywhere.
    fn red_blue_map(width: usize, height: usize, wrap: ImageWrap) -> MIPMap<Spectrum> {
        let mut image = vec![vec![Spectrum::new(0.0); width]; height];
        for row in image.iter_mut() {
            for (i, v) in row.iter_mut().enumerate() {
                *v = if i < width / 2 {
                    Spectrum::from_rgb([1.0, 0.0, 0.0])
                } else {
                    Spectrum::from_rgb([0.0, 0.0, 1.0])
                };
            }
        }
        MIPMap::new(&image, wrap, 8.0).unwrap()
    }

    #[test]
    fn construction_rejects_bad_images() {
        let empty: Vec<Vec<Float>> = vec![];
        assert_eq!(
            MIPMap::new(&empty, ImageWrap::Repeat, 8.0).err(),
            Some(Error::EmptyImage)
        );

        let no_columns: Vec<Vec<Float>> = vec![vec![], vec![]];
        assert_eq!(
            MIPMap::new(&no_columns, ImageWrap::Repeat, 8.0).err(),
            Some(Error::EmptyImage)
        );

        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            MIPMap::new(&ragged, ImageWrap::Repeat, 8.0).err(),
            Some(Error::RaggedImage)
        );
    }

    #[test]
    fn pyramid_shape() {
        let map = constant_map(11, 17, 1.0, ImageWrap::Repeat);
        // 11x17 resamples up to 16x32.
        assert_eq!(map.width(), 16);
        assert_eq!(map.height(), 32);
        assert_eq!(map.levels(), 6);
    }

    #[test]
    fn constant_image_round_trips_at_zero_width() {
        for (w, h) in [(1, 1), (8, 8), (11, 17), (40, 60)] {
            let map = constant_map(w, h, 1.0, ImageWrap::Repeat);
            let v = map.lookup(&Point2f::new(0.5, 0.5), 0.0);
            assert!(approx_eq!(f32, v, 1.0, epsilon = 1e-4), "{}x{} -> {}", w, h, v);
        }
    }

    #[test]
    fn constant_image_is_flat_across_all_levels_and_widths() {
        let map = constant_map(11, 17, 1.0, ImageWrap::Repeat);
        for level in 0..map.levels() {
            let v = map.triangle(level, &Point2f::new(0.5, 0.5));
            assert!(approx_eq!(f32, v, 1.0, epsilon = 1e-4), "level {} -> {}", level, v);
        }
        for width in [0.0, 0.01, 0.1, 0.5, 1.0, 4.0] {
            let v = map.lookup(&Point2f::new(0.5, 0.5), width);
            assert!(approx_eq!(f32, v, 1.0, epsilon = 1e-4), "width {} -> {}", width, v);
        }
    }

    #[test]
    fn repeat_mode_wraps_out_of_range_points() {
        let map = constant_map(11, 17, 1.0, ImageWrap::Repeat);
        let v = map.lookup(&Point2f::new(2.5, 0.5), 0.1);
        assert!(approx_eq!(f32, v, 1.0, epsilon = 1e-4));
    }

    #[test]
    fn black_mode_reads_zero_outside_the_image() {
        let map = constant_map(11, 17, 1.0, ImageWrap::Black);
        let v = map.lookup(&Point2f::new(2.5, 0.5), 0.1);
        assert!(approx_eq!(f32, v, 0.0, epsilon = 1e-4));
    }

    #[test]
    fn black_mode_is_constant_in_the_interior() {
        // Dropped-and-renormalized resampling taps keep a constant image
        // constant even at the edge of the image.
        let map = constant_map(11, 17, 1.0, ImageWrap::Black);
        let v = map.lookup(&Point2f::new(0.5, 0.5), 0.0);
        assert!(approx_eq!(f32, v, 1.0, epsilon = 1e-4));
    }

    #[test]
    fn black_mode_corner_blends_with_zero_neighbors() {
        // At the far image corner three of the four bilinear taps read
        // black, leaving a quarter of the constant value.
        let map = constant_map(11, 17, 1.0, ImageWrap::Black);
        let v = map.lookup(&Point2f::new(1.0, 1.0), 0.1);
        assert!(approx_eq!(f32, v, 0.25, epsilon = 1e-4));
    }

    #[test]
    fn coarsest_level_fallback_respects_wrap_mode() {
        let repeat = constant_map(8, 8, 3.0, ImageWrap::Repeat);
        assert!(approx_eq!(
            f32,
            repeat.lookup(&Point2f::new(7.5, -2.0), 5.0),
            3.0,
            epsilon = 1e-4
        ));

        let black = constant_map(8, 8, 3.0, ImageWrap::Black);
        assert!(approx_eq!(
            f32,
            black.lookup(&Point2f::new(0.5, 0.5), 5.0),
            3.0,
            epsilon = 1e-4
        ));
        assert_eq!(black.lookup(&Point2f::new(7.5, -2.0), 5.0), 0.0);
    }

    #[test]
    fn ewa_footprint_orientation_matters_near_a_color_edge() {
        let map = red_blue_map(40, 60, ImageWrap::Black);
        let st = Point2f::new(0.47, 0.2);

        // Footprint elongated along t stays on the red side; elongated
        // along s it straddles the color boundary.
        let t1 = map.lookup_ewa(&st, &Vector2f::new(0.02, 0.0), &Vector2f::new(0.0, 0.2));
        let t2 = map.lookup_ewa(&st, &Vector2f::new(0.2, 0.0), &Vector2f::new(0.0, 0.02));

        assert!(approx_eq!(f32, t1[0] + t1[1] + t1[2], 1.0, epsilon = 1e-3));
        assert!(t1[0] > t1[2] && t1[2] < 0.1);

        assert!(approx_eq!(f32, t2[0] + t2[1] + t2[2], 1.0, epsilon = 1e-3));
        assert!(t2[0] > t2[2] && t2[2] > 0.1);
    }

    #[test]
    fn ewa_outside_the_image_is_black_in_black_mode() {
        let map = red_blue_map(40, 60, ImageWrap::Black);
        let t = map.lookup_ewa(
            &Point2f::new(2.0, -0.2),
            &Vector2f::new(0.02, 0.0),
            &Vector2f::new(0.0, 0.2),
        );
        assert!(t.is_black());
    }

    #[test]
    fn ewa_on_a_single_texel_image() {
        let map = red_blue_map(1, 1, ImageWrap::Repeat);
        let t = map.lookup_ewa(
            &Point2f::new(0.3, 0.7),
            &Vector2f::new(0.02, 0.0),
            &Vector2f::new(0.0, 0.2),
        );
        assert_eq!(t, Spectrum::from_rgb([0.0, 0.0, 1.0]));
    }

    #[test]
    fn ewa_degenerate_minor_axis_matches_trilinear() {
        let map = red_blue_map(64, 64, ImageWrap::Repeat);
        let st = Point2f::new(0.3, 0.4);
        let ewa = map.lookup_ewa(&st, &Vector2f::new(0.1, 0.0), &Vector2f::zero());
        let tri = map.triangle(0, &st);
        for i in 0..3 {
            assert!(approx_eq!(f32, ewa[i], tri[i], epsilon = 1e-5));
        }
    }

    #[test]
    fn ewa_micro_ellipse_does_not_divide_by_zero() {
        let map = red_blue_map(64, 64, ImageWrap::Repeat);
        // Both axes far smaller than a texel.
        let st = Point2f::new(0.203, 0.417);
        let v = map.lookup_ewa(
            &st,
            &Vector2f::new(1e-4, 0.0),
            &Vector2f::new(0.0, 0.9e-4),
        );
        assert!(!v.has_nans());
        let tri = map.triangle(0, &st);
        for i in 0..3 {
            assert!(approx_eq!(f32, v[i], tri[i], epsilon = 1e-4));
        }
    }

    #[test]
    fn anisotropy_below_one_is_clamped() {
        let image = vec![vec![1.0_f32; 8]; 8];
        let map = MIPMap::new(&image, ImageWrap::Repeat, 0.25).unwrap();
        assert_eq!(map.max_anisotropy, 1.0);
    }

    #[test]
    fn negative_texel_taps_wrap_in_repeat_mode() {
        // A lookup near the left edge pulls bilinear taps from s = -1; in
        // repeat mode those come from the right edge instead of black.
        let mut image = vec![vec![0.0_f32; 8]; 8];
        for row in image.iter_mut() {
            row[7] = 8.0;
        }
        let map = MIPMap::new(&image, ImageWrap::Repeat, 8.0).unwrap();
        let v = map.lookup(&Point2f::new(0.0, 0.5), 0.0);
        assert!(v > 3.0, "expected wrapped contribution, got {}", v);
    }
}
