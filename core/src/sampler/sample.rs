//! Sample bundle.

use crate::common::*;
use crate::geometry::*;

/// Handle for a registered 1D samples sequence. Carries the actual granted
/// sequence length, which may exceed the requested one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sequence1dId {
    /// Position of the sequence within the sample.
    pub index: usize,

    /// Granted sequence length.
    pub len: usize,
}

/// Handle for a registered 2D samples sequence. Carries the actual granted
/// sequence length, which may exceed the requested one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sequence2dId {
    /// Position of the sequence within the sample.
    pub index: usize,

    /// Granted sequence length.
    pub len: usize,
}

/// Holds all the sample values for one camera sample: the image plane
/// point, the lens UV coordinates, the image-space filter widths and the
/// samples sequences registered by the integrator.
///
/// One instance is created per pixel chunk and repopulated for every
/// sample, so there is no per-sample allocation.
pub struct Sample {
    /// The image plane point.
    image_point: Point2f,

    /// Lens UV coordinates for depth of field.
    lens_uv: Point2f,

    /// Filter width in image space, per axis.
    filter_width: (Float, Float),

    /// The registered 1D samples sequences.
    sequences_1d: Vec<Vec<Float>>,

    /// The registered 2D samples sequences.
    sequences_2d: Vec<Vec<Point2f>>,
}

impl Sample {
    /// Creates an empty sample with storage allocated for the given
    /// sequence sizes.
    ///
    /// * `sequences_1d_sizes` - Lengths of the registered 1D sequences.
    /// * `sequences_2d_sizes` - Lengths of the registered 2D sequences.
    pub fn new(sequences_1d_sizes: &[usize], sequences_2d_sizes: &[usize]) -> Self {
        Self {
            image_point: Point2f::zero(),
            lens_uv: Point2f::zero(),
            filter_width: (0.0, 0.0),
            sequences_1d: sequences_1d_sizes.iter().map(|&n| vec![0.0; n]).collect(),
            sequences_2d: sequences_2d_sizes
                .iter()
                .map(|&n| vec![Point2f::zero(); n])
                .collect(),
        }
    }

    /// Returns the image plane point.
    pub fn image_point(&self) -> Point2f {
        self.image_point
    }

    /// Sets the image plane point.
    ///
    /// * `p` - The image plane point.
    pub fn set_image_point(&mut self, p: Point2f) {
        self.image_point = p;
    }

    /// Returns the lens UV coordinates.
    pub fn lens_uv(&self) -> Point2f {
        self.lens_uv
    }

    /// Sets the lens UV coordinates.
    ///
    /// * `uv` - The lens UV coordinates.
    pub fn set_lens_uv(&mut self, uv: Point2f) {
        self.lens_uv = uv;
    }

    /// Returns the image-space filter width per axis.
    pub fn filter_width(&self) -> (Float, Float) {
        self.filter_width
    }

    /// Sets the image-space filter width per axis.
    ///
    /// * `x_width` - Filter width along the image x axis.
    /// * `y_width` - Filter width along the image y axis.
    pub fn set_filter_width(&mut self, x_width: Float, y_width: Float) {
        self.filter_width = (x_width, y_width);
    }

    /// Returns the number of 1D sequences.
    pub fn sequences_1d_count(&self) -> usize {
        self.sequences_1d.len()
    }

    /// Returns the number of 2D sequences.
    pub fn sequences_2d_count(&self) -> usize {
        self.sequences_2d.len()
    }

    /// Returns the 1D sequence for a registration handle. The sequence
    /// length always equals the granted length the handle reports.
    ///
    /// * `id` - The registration handle.
    pub fn sequence_1d(&self, id: &Sequence1dId) -> &[Float] {
        let seq = &self.sequences_1d[id.index];
        debug_assert!(seq.len() == id.len, "sequence length does not match its handle");
        seq
    }

    /// Returns the 2D sequence for a registration handle. The sequence
    /// length always equals the granted length the handle reports.
    ///
    /// * `id` - The registration handle.
    pub fn sequence_2d(&self, id: &Sequence2dId) -> &[Point2f] {
        let seq = &self.sequences_2d[id.index];
        debug_assert!(seq.len() == id.len, "sequence length does not match its handle");
        seq
    }

    /// Returns mutable access to a 1D sequence by position, for the
    /// sub-sampler populating the sample.
    ///
    /// * `index` - Position of the sequence.
    pub fn sequence_1d_mut(&mut self, index: usize) -> &mut [Float] {
        &mut self.sequences_1d[index]
    }

    /// Returns mutable access to a 2D sequence by position, for the
    /// sub-sampler populating the sample.
    ///
    /// * `index` - Position of the sequence.
    pub fn sequence_2d_mut(&mut self, index: usize) -> &mut [Point2f] {
        &mut self.sequences_2d[index]
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_have_the_requested_storage() {
        let sample = Sample::new(&[3, 7], &[4]);
        assert_eq!(sample.sequences_1d_count(), 2);
        assert_eq!(sample.sequences_2d_count(), 1);

        let id = Sequence1dId { index: 1, len: 7 };
        assert_eq!(sample.sequence_1d(&id).len(), 7);
    }

    #[test]
    fn mutation_is_visible_through_handles() {
        let mut sample = Sample::new(&[2], &[2]);
        sample.sequence_1d_mut(0).copy_from_slice(&[0.25, 0.75]);
        sample.sequence_2d_mut(0)[1] = Point2f::new(0.5, 0.125);

        let id1 = Sequence1dId { index: 0, len: 2 };
        let id2 = Sequence2dId { index: 0, len: 2 };
        assert_eq!(sample.sequence_1d(&id1), &[0.25, 0.75]);
        assert_eq!(sample.sequence_2d(&id2)[1], Point2f::new(0.5, 0.125));
    }
}
