//! Random Sampler.

use lumen_core::common::*;
use lumen_core::geometry::*;
use lumen_core::rng::RNG;
use lumen_core::sampler::*;

/// Sampler producing purely random samples: image points are jittered
/// uniformly within the pixel and every sequence value is an independent
/// uniform draw. Any samples count is granted as requested.
pub struct RandomSampler {
    data: SamplerData,
}

impl RandomSampler {
    /// Create a new `RandomSampler` with the default consecutive pixel
    /// traversal order.
    ///
    /// * `extent`            - The sampling window (max corner exclusive).
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    pub fn new(extent: Bounds2i, samples_per_pixel: usize) -> Self {
        Self {
            data: SamplerData::new(extent, samples_per_pixel),
        }
    }

    /// Create a new `RandomSampler` with an explicit pixel traversal order.
    ///
    /// * `extent`            - The sampling window (max corner exclusive).
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    /// * `pixels_order`      - The pixel traversal strategy.
    pub fn with_pixels_order(
        extent: Bounds2i,
        samples_per_pixel: usize,
        pixels_order: Box<dyn PixelsOrder>,
    ) -> Self {
        Self {
            data: SamplerData::with_pixels_order(extent, samples_per_pixel, pixels_order),
        }
    }
}

impl Sampler for RandomSampler {
    fn data(&self) -> &SamplerData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut SamplerData {
        &mut self.data
    }

    fn create_sub_sampler(&self, pixels: Vec<Point2i>) -> Box<dyn SubSampler> {
        Box::new(RandomSubSampler {
            data: SubSamplerData::new(pixels, self.data.samples_per_pixel),
            inv_spp_sqrt: 1.0 / (self.data.samples_per_pixel as Float).sqrt(),
        })
    }
}

/// Sub-sampler producing purely random samples.
pub struct RandomSubSampler {
    data: SubSamplerData,

    /// Image-space filter width, the same in both axes.
    inv_spp_sqrt: Float,
}

impl SubSampler for RandomSubSampler {
    fn data(&self) -> &SubSamplerData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut SubSamplerData {
        &mut self.data
    }

    fn get_sample(
        &mut self,
        pixel: &Point2i,
        _pixel_sample_index: usize,
        rng: &mut RNG,
        sample: &mut Sample,
    ) {
        sample.set_image_point(Point2f::new(
            pixel.x as Float + rng.uniform_float(),
            pixel.y as Float + rng.uniform_float(),
        ));
        sample.set_filter_width(self.inv_spp_sqrt, self.inv_spp_sqrt);
        sample.set_lens_uv(Point2f::new(rng.uniform_float(), rng.uniform_float()));

        for i in 0..sample.sequences_1d_count() {
            for value in sample.sequence_1d_mut(i).iter_mut() {
                *value = rng.uniform_float();
            }
        }
        for i in 0..sample.sequences_2d_count() {
            for value in sample.sequence_2d_mut(i).iter_mut() {
                *value = Point2f::new(rng.uniform_float(), rng.uniform_float());
            }
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
    fn image_points_stay_inside_their_pixel() {
        let mut sampler = RandomSampler::new(extent(3, 3), 4);
        let mut sample = sampler.create_sample();
        let mut rng = RNG::new(1);

        let mut ss = sampler.get_next_sub_sampler(16).unwrap();
        let mut pixel_index = 0;
        let mut sample_index = 0;
        while ss.next_sample(&mut rng, &mut sample) {
            let pixel = ss.data().pixels[pixel_index];
            let p = sample.image_point();
            assert!(p.x >= pixel.x as Float && p.x < (pixel.x + 1) as Float);
            assert!(p.y >= pixel.y as Float && p.y < (pixel.y + 1) as Float);

            sample_index += 1;
            if sample_index == 4 {
                sample_index = 0;
                pixel_index += 1;
            }
        }
        assert_eq!(pixel_index, 9);
    }

    #[test]
    fn sequences_are_filled_with_unit_interval_values() {
        let mut sampler = RandomSampler::new(extent(1, 1), 2);
        let id1 = sampler.add_samples_sequence_1d(5);
        let id2 = sampler.add_samples_sequence_2d(3);
        assert_eq!(id1.len, 5);
        assert_eq!(id2.len, 3);

        let mut sample = sampler.create_sample();
        let mut rng = RNG::new(2);
        let mut ss = sampler.get_next_sub_sampler(1).unwrap();
        while ss.next_sample(&mut rng, &mut sample) {
            assert!(sample.sequence_1d(&id1).iter().all(|v| (0.0..1.0).contains(v)));
            assert!(sample
                .sequence_2d(&id2)
                .iter()
                .all(|p| (0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y)));
        }
    }
}
