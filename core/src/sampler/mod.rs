//! Sampler

mod pixels_order;
mod sample;

use crate::geometry::*;
use crate::rng::RNG;

// Re-export
pub use pixels_order::*;
pub use sample::*;

/// Stores the state shared by all sampler implementations: the sampling
/// extent traversal, the number of samples per pixel and the sizes of the
/// samples sequences registered by the integrator.
pub struct SamplerData {
    /// Number of samples generated for each pixel.
    pub samples_per_pixel: usize,

    /// Sizes of the registered 1D samples sequences.
    pub sequences_1d_sizes: Vec<usize>,

    /// Sizes of the registered 2D samples sequences.
    pub sequences_2d_sizes: Vec<usize>,

    /// Strategy defining the order the image pixels are sampled in.
    pub pixels_order: Box<dyn PixelsOrder>,

    /// Set once dispensing has begun; sequence registration is no longer
    /// allowed afterwards.
    dispensing: bool,
}

impl SamplerData {
    /// Create a new `SamplerData` covering the given sampling extent with
    /// the default consecutive pixel traversal order.
    ///
    /// * `extent`            - The sampling window (max corner exclusive).
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    pub fn new(extent: Bounds2i, samples_per_pixel: usize) -> Self {
        Self::with_pixels_order(extent, samples_per_pixel, Box::new(ConsecutivePixelsOrder::new()))
    }

    /// Create a new `SamplerData` with an explicit pixel traversal order.
    ///
    /// * `extent`            - The sampling window (max corner exclusive).
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    /// * `pixels_order`      - The pixel traversal strategy.
    pub fn with_pixels_order(
        extent: Bounds2i,
        samples_per_pixel: usize,
        mut pixels_order: Box<dyn PixelsOrder>,
    ) -> Self {
        assert!(samples_per_pixel >= 1);
        pixels_order.set_extent(extent);

        Self {
            samples_per_pixel,
            sequences_1d_sizes: vec![],
            sequences_2d_sizes: vec![],
            pixels_order,
            dispensing: false,
        }
    }
}

/// The sampler partitions the image plane into chunks of pixels and
/// produces sub-samplers that generate the sample bundles for those pixels.
///
/// Integrators register the samples sequences they need up front; once the
/// first sub-sampler is dispensed, registration is a contract violation.
pub trait Sampler: Send {
    /// Returns a shared reference to the underlying `SamplerData`.
    fn data(&self) -> &SamplerData;

    /// Returns a mutable reference to the underlying `SamplerData`.
    fn data_mut(&mut self) -> &mut SamplerData;

    /// Returns the nearest samples count greater or equal than the
    /// requested one that the sampler can produce well-distributed
    /// sequences for. The default implementation grants the request as is.
    ///
    /// * `count` - The requested samples count.
    fn round_samples_count(&self, count: usize) -> usize {
        count
    }

    /// Creates the sub-sampler for a set of pixels. Implementations receive
    /// the pixels in traversal order and produce `samples_per_pixel` sample
    /// bundles for each.
    ///
    /// * `pixels` - The pixels assigned to the sub-sampler.
    fn create_sub_sampler(&self, pixels: Vec<Point2i>) -> Box<dyn SubSampler>;

    /// Registers a 1D samples sequence. Returns the handle the integrator
    /// uses to retrieve the sequence from a `Sample`, carrying the actual
    /// granted length (which may exceed the request).
    ///
    /// * `count` - The requested sequence length.
    fn add_samples_sequence_1d(&mut self, count: usize) -> Sequence1dId {
        let granted = self.round_samples_count(count);
        let data = self.data_mut();
        debug_assert!(
            !data.dispensing,
            "samples sequences must be registered before dispensing starts"
        );
        data.sequences_1d_sizes.push(granted);
        Sequence1dId {
            index: data.sequences_1d_sizes.len() - 1,
            len: granted,
        }
    }

    /// Registers a 2D samples sequence. Returns the handle the integrator
    /// uses to retrieve the sequence from a `Sample`, carrying the actual
    /// granted length (which may exceed the request).
    ///
    /// * `count` - The requested sequence length.
    fn add_samples_sequence_2d(&mut self, count: usize) -> Sequence2dId {
        let granted = self.round_samples_count(count);
        let data = self.data_mut();
        debug_assert!(
            !data.dispensing,
            "samples sequences must be registered before dispensing starts"
        );
        data.sequences_2d_sizes.push(granted);
        Sequence2dId {
            index: data.sequences_2d_sizes.len() - 1,
            len: granted,
        }
    }

    /// Removes all registered samples sequences so a new render pass can
    /// register a fresh set.
    fn clear_samples_sequences(&mut self) {
        let data = self.data_mut();
        data.sequences_1d_sizes.clear();
        data.sequences_2d_sizes.clear();
        data.dispensing = false;
    }

    /// Creates an empty `Sample` with storage allocated for every
    /// registered sequence. Sub-samplers populate it with data.
    fn create_sample(&self) -> Sample {
        let data = self.data();
        Sample::new(&data.sequences_1d_sizes, &data.sequences_2d_sizes)
    }

    /// Hands out a sub-sampler covering the next group of pixels, or `None`
    /// once the sampling extent is exhausted. Consecutive calls return
    /// disjoint pixel sets.
    ///
    /// * `pixels_num` - Maximum number of pixels to assign.
    fn get_next_sub_sampler(&mut self, pixels_num: usize) -> Option<Box<dyn SubSampler>> {
        assert!(pixels_num > 0);

        let pixels = {
            let data = self.data_mut();
            data.dispensing = true;

            let mut pixels = Vec::with_capacity(pixels_num);
            while pixels.len() < pixels_num {
                match data.pixels_order.next_pixel() {
                    Some(p) => pixels.push(p),
                    None => break,
                }
            }
            pixels
        };

        if pixels.is_empty() {
            None
        } else {
            Some(self.create_sub_sampler(pixels))
        }
    }

    /// Rewinds the pixel traversal so the whole extent can be dispensed
    /// again.
    fn reset(&mut self) {
        let data = self.data_mut();
        data.pixels_order.reset();
        data.dispensing = false;
    }

    /// Returns the total number of samples the sampler produces over the
    /// whole extent.
    fn total_samples(&self) -> usize {
        let data = self.data();
        data.pixels_order.total_pixels() * data.samples_per_pixel
    }

    /// Returns the number of samples generated for each pixel.
    fn samples_per_pixel(&self) -> usize {
        self.data().samples_per_pixel
    }
}

/// Stores the pixel iteration state shared by all sub-sampler
/// implementations.
pub struct SubSamplerData {
    /// The pixels assigned to this sub-sampler.
    pub pixels: Vec<Point2i>,

    /// Number of samples generated for each pixel.
    pub samples_per_pixel: usize,

    /// Index of the pixel currently being sampled.
    current_pixel_index: usize,

    /// Index of the next sample within the current pixel.
    pixel_sample_index: usize,
}

impl SubSamplerData {
    /// Create a new `SubSamplerData`.
    ///
    /// * `pixels`            - The pixels assigned to the sub-sampler.
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    pub fn new(pixels: Vec<Point2i>, samples_per_pixel: usize) -> Self {
        assert!(samples_per_pixel > 0);

        let pixel_sample_index = if pixels.is_empty() { samples_per_pixel } else { 0 };
        Self {
            pixels,
            samples_per_pixel,
            current_pixel_index: 0,
            pixel_sample_index,
        }
    }
}

/// Produces the sample bundles for a fixed set of pixels. A sub-sampler is
/// owned by exactly one worker at a time; the random number generator is
/// supplied by the owner on every call so the owner controls the stream.
pub trait SubSampler: Send {
    /// Returns a shared reference to the underlying `SubSamplerData`.
    fn data(&self) -> &SubSamplerData;

    /// Returns a mutable reference to the underlying `SubSamplerData`.
    fn data_mut(&mut self) -> &mut SubSamplerData;

    /// Called once per pixel before the first sample of that pixel is
    /// produced. Implementations may precompute all of the pixel's samples
    /// here. The default implementation does nothing.
    ///
    /// * `pixel` - The pixel about to be sampled.
    /// * `rng`   - Random number generator.
    fn precompute_pixel_samples(&mut self, pixel: &Point2i, rng: &mut RNG) {
        let _ = (pixel, rng);
    }

    /// Populates the sample with the data for the given pixel and the given
    /// sample index inside that pixel.
    ///
    /// * `pixel`              - The pixel being sampled.
    /// * `pixel_sample_index` - Index of the sample within the pixel.
    /// * `rng`                - Random number generator.
    /// * `sample`             - The sample to populate.
    fn get_sample(
        &mut self,
        pixel: &Point2i,
        pixel_sample_index: usize,
        rng: &mut RNG,
        sample: &mut Sample,
    );

    /// Populates the sample with the next sample's data. Returns `false`
    /// when all samples for all assigned pixels have been produced.
    ///
    /// * `rng`    - Random number generator.
    /// * `sample` - The sample to populate.
    fn next_sample(&mut self, rng: &mut RNG, sample: &mut Sample) -> bool {
        let (pixel, index) = {
            let data = self.data_mut();
            if data.pixel_sample_index == data.samples_per_pixel {
                if data.current_pixel_index + 1 >= data.pixels.len() {
                    return false;
                }
                data.current_pixel_index += 1;
                data.pixel_sample_index = 0;
            }
            (data.pixels[data.current_pixel_index], data.pixel_sample_index)
        };

        if index == 0 {
            self.precompute_pixel_samples(&pixel, rng);
        }
        self.get_sample(&pixel, index, rng, sample);

        self.data_mut().pixel_sample_index += 1;
        true
    }

    /// Returns the total number of samples this sub-sampler produces.
    fn total_samples(&self) -> usize {
        let data = self.data();
        data.pixels.len() * data.samples_per_pixel
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
