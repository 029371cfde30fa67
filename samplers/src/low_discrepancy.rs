//! Low-Discrepancy Sampler.

use lumen_core::common::*;
use lumen_core::geometry::*;
use lumen_core::low_discrepancy::{sobol_2d, van_der_corput};
use lumen_core::rng::RNG;
use lumen_core::sampler::*;

/// Sampler producing low-discrepancy samples. Image points, lens UVs and 2D
/// sequences come from scrambled (0,2)-sequences built on the Van der
/// Corput and Sobol' generators; 1D sequences use the Van der Corput
/// sequence alone. Any aligned power-of-two block of a (0,2)-sequence is
/// well distributed, so both the samples per pixel and every granted
/// sequence length are powers of two (requests are rounded up).
///
/// Each pixel draws fresh random scrambles, which decorrelates pixels that
/// would otherwise all receive identical sample values.
pub struct LowDiscrepancySampler {
    data: SamplerData,
}

impl LowDiscrepancySampler {
    /// Create a new `LowDiscrepancySampler` with the default consecutive
    /// pixel traversal order.
    ///
    /// * `extent`            - The sampling window (max corner exclusive).
    /// * `samples_per_pixel` - Number of samples to generate for each
    ///                         pixel; rounded up to a power of two.
    pub fn new(extent: Bounds2i, samples_per_pixel: usize) -> Self {
        Self {
            data: SamplerData::new(extent, Self::round_spp(samples_per_pixel)),
        }
    }

    /// Create a new `LowDiscrepancySampler` with an explicit pixel
    /// traversal order.
    ///
    /// * `extent`            - The sampling window (max corner exclusive).
    /// * `samples_per_pixel` - Number of samples to generate for each
    ///                         pixel; rounded up to a power of two.
    /// * `pixels_order`      - The pixel traversal strategy.
    pub fn with_pixels_order(
        extent: Bounds2i,
        samples_per_pixel: usize,
        pixels_order: Box<dyn PixelsOrder>,
    ) -> Self {
        Self {
            data: SamplerData::with_pixels_order(
                extent,
                Self::round_spp(samples_per_pixel),
                pixels_order,
            ),
        }
    }

    fn round_spp(samples_per_pixel: usize) -> usize {
        if !samples_per_pixel.is_power_of_two() {
            let rounded = samples_per_pixel.next_power_of_two();
            warn!(
                "Pixel samples being rounded up to power of 2 (from {} to {}).",
                samples_per_pixel, rounded
            );
            rounded
        } else {
            samples_per_pixel
        }
    }
}

impl Sampler for LowDiscrepancySampler {
    fn data(&self) -> &SamplerData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut SamplerData {
        &mut self.data
    }

    /// Rounds up to the next power of two.
    ///
    /// * `count` - The requested samples count.
    fn round_samples_count(&self, count: usize) -> usize {
        count.next_power_of_two()
    }

    fn create_sub_sampler(&self, pixels: Vec<Point2i>) -> Box<dyn SubSampler> {
        let samples_per_pixel = self.data.samples_per_pixel;
        let sequences_1d_sizes = self.data.sequences_1d_sizes.clone();
        let sequences_2d_sizes = self.data.sequences_2d_sizes.clone();

        let count_1d: usize = sequences_1d_sizes.iter().sum();
        let count_2d: usize = sequences_2d_sizes.iter().sum();

        Box::new(LowDiscrepancySubSampler {
            data: SubSamplerData::new(pixels, samples_per_pixel),
            sequences_1d_sizes,
            sequences_2d_sizes,
            image_points: vec![Point2f::zero(); samples_per_pixel],
            lens_uvs: vec![Point2f::zero(); samples_per_pixel],
            buffer_1d: vec![0.0; count_1d * samples_per_pixel],
            buffer_2d: vec![Point2f::zero(); count_2d * samples_per_pixel],
            inv_spp_sqrt: 1.0 / (samples_per_pixel as Float).sqrt(),
        })
    }
}

/// Sub-sampler producing low-discrepancy samples. All samples of a pixel
/// are precomputed in one batch when the pixel is started.
pub struct LowDiscrepancySubSampler {
    data: SubSamplerData,

    /// Granted lengths of the registered 1D sequences.
    sequences_1d_sizes: Vec<usize>,

    /// Granted lengths of the registered 2D sequences.
    sequences_2d_sizes: Vec<usize>,

    /// Per-pixel image points.
    image_points: Vec<Point2f>,

    /// Per-pixel lens UV coordinates.
    lens_uvs: Vec<Point2f>,

    /// 1D sequence values for all samples of the current pixel. Sequence i
    /// occupies a contiguous region of `sizes[i] * samples_per_pixel`
    /// values grouped by pixel sample.
    buffer_1d: Vec<Float>,

    /// 2D sequence values for all samples of the current pixel, laid out
    /// like `buffer_1d`.
    buffer_2d: Vec<Point2f>,

    /// Image-space filter width, the same in both axes.
    inv_spp_sqrt: Float,
}

impl SubSampler for LowDiscrepancySubSampler {
    fn data(&self) -> &SubSamplerData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut SubSamplerData {
        &mut self.data
    }

    fn precompute_pixel_samples(&mut self, pixel: &Point2i, rng: &mut RNG) {
        let spp = self.data.samples_per_pixel;

        // Image points are a (0,2)-sequence translated into the pixel.
        sobol_2d(1, spp, &mut self.image_points, rng);
        for p in self.image_points.iter_mut() {
            *p = *p + Point2f::from(*pixel);
        }

        sobol_2d(1, spp, &mut self.lens_uvs, rng);

        let mut offset = 0;
        for &n in self.sequences_1d_sizes.iter() {
            van_der_corput(n, spp, &mut self.buffer_1d[offset..offset + n * spp], rng);
            offset += n * spp;
        }

        let mut offset = 0;
        for &n in self.sequences_2d_sizes.iter() {
            sobol_2d(n, spp, &mut self.buffer_2d[offset..offset + n * spp], rng);
            offset += n * spp;
        }
    }

    fn get_sample(
        &mut self,
        _pixel: &Point2i,
        pixel_sample_index: usize,
        _rng: &mut RNG,
        sample: &mut Sample,
    ) {
        debug_assert!(pixel_sample_index < self.data.samples_per_pixel);
        let spp = self.data.samples_per_pixel;

        sample.set_image_point(self.image_points[pixel_sample_index]);
        sample.set_filter_width(self.inv_spp_sqrt, self.inv_spp_sqrt);
        sample.set_lens_uv(self.lens_uvs[pixel_sample_index]);

        debug_assert!(sample.sequences_1d_count() == self.sequences_1d_sizes.len());
        let mut offset = 0;
        for (i, &n) in self.sequences_1d_sizes.iter().enumerate() {
            let begin = offset + n * pixel_sample_index;
            sample
                .sequence_1d_mut(i)
                .copy_from_slice(&self.buffer_1d[begin..begin + n]);
            offset += n * spp;
        }

        debug_assert!(sample.sequences_2d_count() == self.sequences_2d_sizes.len());
        let mut offset = 0;
        for (i, &n) in self.sequences_2d_sizes.iter().enumerate() {
            let begin = offset + n * pixel_sample_index;
            sample
                .sequence_2d_mut(i)
                .copy_from_slice(&self.buffer_2d[begin..begin + n]);
            offset += n * spp;
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
