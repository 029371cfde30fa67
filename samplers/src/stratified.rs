//! Stratified Sampler.

use lumen_core::common::*;
use lumen_core::geometry::*;
use lumen_core::rng::RNG;
use lumen_core::sampler::*;
use lumen_core::sampling;

/// Sampler producing stratified samples. Image and lens samples are
/// stratified with respect to the other samples inside the same pixel over
/// an x by y grid; 1D sequences are shuffled stratified values and 2D
/// sequences are stratified over a √n by √n grid, so granted sequence
/// lengths are perfect squares. Samples are not stratified with respect to
/// other pixels.
pub struct StratifiedSampler {
    data: SamplerData,

    /// Number of image samples per pixel in the x dimension.
    x_samples_per_pixel: usize,

    /// Number of image samples per pixel in the y dimension.
    y_samples_per_pixel: usize,
}

impl StratifiedSampler {
    /// Create a new `StratifiedSampler` with the default consecutive pixel
    /// traversal order.
    ///
    /// * `extent`              - The sampling window (max corner exclusive).
    /// * `x_samples_per_pixel` - Image samples per pixel in the x dimension.
    /// * `y_samples_per_pixel` - Image samples per pixel in the y dimension.
    pub fn new(
        extent: Bounds2i,
        x_samples_per_pixel: usize,
        y_samples_per_pixel: usize,
    ) -> Self {
        Self {
            data: SamplerData::new(extent, x_samples_per_pixel * y_samples_per_pixel),
            x_samples_per_pixel,
            y_samples_per_pixel,
        }
    }

    /// Create a new `StratifiedSampler` with an explicit pixel traversal
    /// order.
    ///
    /// * `extent`              - The sampling window (max corner exclusive).
    /// * `x_samples_per_pixel` - Image samples per pixel in the x dimension.
    /// * `y_samples_per_pixel` - Image samples per pixel in the y dimension.
    /// * `pixels_order`        - The pixel traversal strategy.
    pub fn with_pixels_order(
        extent: Bounds2i,
        x_samples_per_pixel: usize,
        y_samples_per_pixel: usize,
        pixels_order: Box<dyn PixelsOrder>,
    ) -> Self {
        Self {
            data: SamplerData::with_pixels_order(
                extent,
                x_samples_per_pixel * y_samples_per_pixel,
                pixels_order,
            ),
            x_samples_per_pixel,
            y_samples_per_pixel,
        }
    }
}

impl Sampler for StratifiedSampler {
    fn data(&self) -> &SamplerData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut SamplerData {
        &mut self.data
    }

    /// Rounds up to the next perfect square so 2D sequences can be
    /// stratified over a square grid.
    ///
    /// * `count` - The requested samples count.
    fn round_samples_count(&self, count: usize) -> usize {
        let sqrt_ceil = (count as Float).sqrt().ceil() as usize;
        sqrt_ceil * sqrt_ceil
    }

    fn create_sub_sampler(&self, pixels: Vec<Point2i>) -> Box<dyn SubSampler> {
        let samples_per_pixel = self.data.samples_per_pixel;
        Box::new(StratifiedSubSampler {
            data: SubSamplerData::new(pixels, samples_per_pixel),
            x_samples_per_pixel: self.x_samples_per_pixel,
            y_samples_per_pixel: self.y_samples_per_pixel,
            image_points: vec![Point2f::zero(); samples_per_pixel],
            lens_uvs: vec![Point2f::zero(); samples_per_pixel],
        })
    }
}

/// Sub-sampler producing stratified samples.
pub struct StratifiedSubSampler {
    data: SubSamplerData,

    x_samples_per_pixel: usize,
    y_samples_per_pixel: usize,

    /// Per-pixel image points, precomputed one pixel at a time.
    image_points: Vec<Point2f>,

    /// Per-pixel lens UV coordinates, precomputed one pixel at a time.
    lens_uvs: Vec<Point2f>,
}

impl SubSampler for StratifiedSubSampler {
    fn data(&self) -> &SubSamplerData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut SubSamplerData {
        &mut self.data
    }

    fn precompute_pixel_samples(&mut self, pixel: &Point2i, rng: &mut RNG) {
        sampling::stratified_sample_2d(
            &mut self.image_points,
            self.x_samples_per_pixel,
            self.y_samples_per_pixel,
            true,
            rng,
        );
        // Translate the image samples into the pixel.
        for p in self.image_points.iter_mut() {
            *p = *p + Point2f::from(*pixel);
        }

        sampling::stratified_sample_2d(
            &mut self.lens_uvs,
            self.x_samples_per_pixel,
            self.y_samples_per_pixel,
            true,
            rng,
        );

        // De-correlate image and lens samples.
        let count = self.lens_uvs.len();
        sampling::shuffle(&mut self.lens_uvs, count, 1, rng);
    }

    fn get_sample(
        &mut self,
        _pixel: &Point2i,
        pixel_sample_index: usize,
        rng: &mut RNG,
        sample: &mut Sample,
    ) {
        debug_assert!(pixel_sample_index < self.data.samples_per_pixel);

        sample.set_image_point(self.image_points[pixel_sample_index]);
        sample.set_filter_width(
            1.0 / self.x_samples_per_pixel as Float,
            1.0 / self.y_samples_per_pixel as Float,
        );
        sample.set_lens_uv(self.lens_uvs[pixel_sample_index]);

        // 1D sequences are stratified and shuffled to de-correlate them
        // from the other sequences.
        for i in 0..sample.sequences_1d_count() {
            let seq = sample.sequence_1d_mut(i);
            sampling::stratified_sample_1d(seq, true, rng);
            let count = seq.len();
            sampling::shuffle(seq, count, 1, rng);
        }

        // 2D sequences are stratified over a square grid; the granted
        // length is always a perfect square.
        for i in 0..sample.sequences_2d_count() {
            let seq = sample.sequence_2d_mut(i);
            let n_sqrt = (seq.len() as Float).sqrt().round() as usize;
            debug_assert!(n_sqrt * n_sqrt == seq.len());

            sampling::stratified_sample_2d(seq, n_sqrt, n_sqrt, true, rng);
            let count = seq.len();
            sampling::shuffle(seq, count, 1, rng);
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(x1: Int, y1: Int) -> Bounds2i {
        Bounds2i::new(Point2i::new(0, 0), Point2i::new(x1, y1))
    }

    #[test]
    fn sequence_counts_round_up_to_squares() {
        let sampler = StratifiedSampler::new(extent(2, 2), 2, 2);
        assert_eq!(sampler.round_samples_count(1), 1);
        assert_eq!(sampler.round_samples_count(2), 4);
        assert_eq!(sampler.round_samples_count(9), 9);
        assert_eq!(sampler.round_samples_count(10), 16);
    }

    #[test]
    fn image_points_are_stratified_within_the_pixel() {
        let mut sampler = StratifiedSampler::new(extent(2, 2), 4, 2);
        let mut sample = sampler.create_sample();
        let mut rng = RNG::new(3);

        let mut ss = sampler.get_next_sub_sampler(1).unwrap();
        let pixel = ss.data().pixels[0];

        let mut index = 0;
        while ss.next_sample(&mut rng, &mut sample) {
            let p = sample.image_point();
            assert!(p.x >= pixel.x as Float && p.x < (pixel.x + 1) as Float);
            assert!(p.y >= pixel.y as Float && p.y < (pixel.y + 1) as Float);

            // Row-major 4x2 strata within the pixel.
            let (sx, sy) = (index % 4, index / 4);
            let local_x = p.x - pixel.x as Float;
            let local_y = p.y - pixel.y as Float;
            assert!(local_x >= sx as Float / 4.0 - 1e-6);
            assert!(local_x < (sx + 1) as Float / 4.0 + 1e-6);
            assert!(local_y >= sy as Float / 2.0 - 1e-6);
            assert!(local_y < (sy + 1) as Float / 2.0 + 1e-6);

            index += 1;
        }
        assert_eq!(index, 8);
    }

    #[test]
    fn filter_width_reflects_the_strata_grid() {
        let mut sampler = StratifiedSampler::new(extent(1, 1), 4, 2);
        let mut sample = sampler.create_sample();
        let mut rng = RNG::new(4);

        let mut ss = sampler.get_next_sub_sampler(1).unwrap();
        assert!(ss.next_sample(&mut rng, &mut sample));
        assert_eq!(sample.filter_width(), (0.25, 0.5));
    }

    #[test]
    fn sequences_cover_the_unit_domain() {
        let mut sampler = StratifiedSampler::new(extent(1, 1), 2, 2);
        let id1 = sampler.add_samples_sequence_1d(8);
        let id2 = sampler.add_samples_sequence_2d(8);
        assert_eq!(id1.len, 9);
        assert_eq!(id2.len, 9);

        let mut sample = sampler.create_sample();
        let mut rng = RNG::new(5);
        let mut ss = sampler.get_next_sub_sampler(1).unwrap();

        while ss.next_sample(&mut rng, &mut sample) {
            let seq = sample.sequence_1d(&id1);
            assert!(seq.iter().all(|v| (0.0..1.0).contains(v)));

            // Sorted values land one per stratum.
            let mut sorted = seq.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            for (i, v) in sorted.iter().enumerate() {
                assert!(*v >= i as Float / 9.0 - 1e-6);
                assert!(*v < (i + 1) as Float / 9.0 + 1e-6);
            }

            let seq = sample.sequence_2d(&id2);
            assert!(seq
                .iter()
                .all(|p| (0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y)));
        }
    }
}
