//! Film

mod filter;

use crate::common::*;
use crate::error::Error;
use crate::geometry::*;
use crate::spectrum::*;
use std::sync::RwLock;

// Re-export
pub use filter::*;

/// The camera's sensing device. The contribution of each camera ray is
/// added as a weighted sample; pixel values are the filter-weighted average
/// of the contributing samples.
///
/// Sample accumulation is commutative, so the image does not depend on the
/// order samples arrive in. The renderer writes to the film from a single
/// serialized pipeline stage.
pub trait Film: Send + Sync {
    /// Returns the number of pixels in the x direction.
    fn x_resolution(&self) -> usize;

    /// Returns the number of pixels in the y direction.
    fn y_resolution(&self) -> usize;

    /// Adds a sample contribution to the film.
    ///
    /// * `image_point` - The sample position on the image plane.
    /// * `spectrum`    - The radiance carried by the sample.
    fn add_sample(&self, image_point: &Point2f, spectrum: &Spectrum);

    /// Removes all samples accumulated so far.
    fn clear(&self);

    /// Returns the value of the given pixel, or `None` when no sample has
    /// contributed to it yet.
    ///
    /// * `p` - The pixel coordinates.
    fn get_pixel(&self, p: &Point2i) -> Option<Spectrum>;

    /// Returns the window on the image plane where samples need to be
    /// generated. The window can exceed the pixel bounds because of the
    /// reconstruction filter's support.
    fn sampling_extent(&self) -> Bounds2i;
}

/// Accumulated contributions of a single image pixel.
#[derive(Copy, Clone, Default)]
struct FilmPixel {
    /// The running filter-weighted sum of sample spectra.
    sum: Spectrum,

    /// The running sum of filter weights.
    weight_sum: Float,
}

/// A film storing the image as filter-weighted running sums per pixel.
pub struct ImageFilm {
    /// The image resolution in pixels.
    x_resolution: usize,

    /// The image resolution in pixels.
    y_resolution: usize,

    /// Filter weighting sample contributions to nearby pixels.
    filter: Box<dyn FilmFilter>,

    /// The image pixels.
    pixels: RwLock<Vec<FilmPixel>>,
}

impl ImageFilm {
    /// Create a new `ImageFilm`.
    ///
    /// * `x_resolution` - Number of pixels in the x direction.
    /// * `y_resolution` - Number of pixels in the y direction.
    /// * `filter`       - The reconstruction filter.
    pub fn new(
        x_resolution: usize,
        y_resolution: usize,
        filter: Box<dyn FilmFilter>,
    ) -> Result<Self, Error> {
        if x_resolution == 0 || y_resolution == 0 {
            return Err(Error::ZeroResolution);
        }

        let pixels = RwLock::new(vec![FilmPixel::default(); x_resolution * y_resolution]);
        Ok(Self {
            x_resolution,
            y_resolution,
            filter,
            pixels,
        })
    }
}

impl Film for ImageFilm {
    fn x_resolution(&self) -> usize {
        self.x_resolution
    }

    fn y_resolution(&self) -> usize {
        self.y_resolution
    }

    fn add_sample(&self, image_point: &Point2f, spectrum: &Spectrum) {
        // Discrete pixel range covered by the filter support. Pixel centers
        // sit at (x + 0.5, y + 0.5).
        let x_width = self.filter.x_width();
        let y_width = self.filter.y_width();

        let x0 = (image_point.x - 0.5 - x_width).ceil() as i64;
        let x1 = (image_point.x - 0.5 + x_width).floor() as i64;
        let y0 = (image_point.y - 0.5 - y_width).ceil() as i64;
        let y1 = (image_point.y - 0.5 + y_width).floor() as i64;

        let x0 = max(x0, 0);
        let y0 = max(y0, 0);
        let x1 = min(x1, self.x_resolution as i64 - 1);
        let y1 = min(y1, self.y_resolution as i64 - 1);

        let mut pixels = self.pixels.write().unwrap();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = image_point.x - (x as Float + 0.5);
                let dy = image_point.y - (y as Float + 0.5);
                let weight = self.filter.evaluate(dx, dy);
                if weight > 0.0 {
                    let pixel = &mut pixels[y as usize * self.x_resolution + x as usize];
                    pixel.sum += *spectrum * weight;
                    pixel.weight_sum += weight;
                }
            }
        }
    }

    fn clear(&self) {
        let mut pixels = self.pixels.write().unwrap();
        for pixel in pixels.iter_mut() {
            *pixel = FilmPixel::default();
        }
    }

    fn get_pixel(&self, p: &Point2i) -> Option<Spectrum> {
        if p.x < 0
            || p.x >= self.x_resolution as Int
            || p.y < 0
            || p.y >= self.y_resolution as Int
        {
            return None;
        }

        let pixels = self.pixels.read().unwrap();
        let pixel = &pixels[p.y as usize * self.x_resolution + p.x as usize];
        if pixel.weight_sum > 0.0 {
            Some(pixel.sum / pixel.weight_sum)
        } else {
            None
        }
    }

    fn sampling_extent(&self) -> Bounds2i {
        let begin = Point2i::new(
            (0.5 - self.filter.x_width()).floor() as Int,
            (0.5 - self.filter.y_width()).floor() as Int,
        );
        let end = Point2i::new(
            (self.x_resolution as Float - 0.5 + self.filter.x_width()).ceil() as Int,
            (self.y_resolution as Float - 0.5 + self.filter.y_width()).ceil() as Int,
        );
        Bounds2i::new(begin, end)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn film(x: usize, y: usize) -> ImageFilm {
        ImageFilm::new(x, y, Box::new(BoxFilter::new(0.5, 0.5))).unwrap()
    }

    #[test]
    fn zero_resolution_is_rejected() {
        assert!(ImageFilm::new(0, 4, Box::new(BoxFilter::new(0.5, 0.5))).is_err());
        assert!(ImageFilm::new(4, 0, Box::new(BoxFilter::new(0.5, 0.5))).is_err());
    }

    #[test]
    fn sample_lands_in_its_pixel() {
        let film = film(4, 4);
        film.add_sample(&Point2f::new(2.5, 1.5), &Spectrum::new(3.0));

        let v = film.get_pixel(&Point2i::new(2, 1)).unwrap();
        assert!(approx_eq!(f32, v[0], 3.0, epsilon = 1e-6));
        assert!(film.get_pixel(&Point2i::new(0, 0)).is_none());
    }

    #[test]
    fn samples_average_with_filter_weights() {
        let film = film(2, 2);
        film.add_sample(&Point2f::new(0.4, 0.5), &Spectrum::new(1.0));
        film.add_sample(&Point2f::new(0.6, 0.5), &Spectrum::new(3.0));

        let v = film.get_pixel(&Point2i::new(0, 0)).unwrap();
        assert!(approx_eq!(f32, v[0], 2.0, epsilon = 1e-6));
    }

    #[test]
    fn clear_removes_accumulated_samples() {
        let film = film(2, 2);
        film.add_sample(&Point2f::new(0.5, 0.5), &Spectrum::new(1.0));
        film.clear();
        assert!(film.get_pixel(&Point2i::new(0, 0)).is_none());
    }

    #[test]
    fn out_of_bounds_pixels_read_none() {
        let film = film(2, 2);
        assert!(film.get_pixel(&Point2i::new(-1, 0)).is_none());
        assert!(film.get_pixel(&Point2i::new(0, 2)).is_none());
    }

    #[test]
    fn sampling_extent_covers_the_filter_support() {
        let film = film(10, 8);
        let extent = film.sampling_extent();
        assert_eq!(extent.p_min, Point2i::new(0, 0));
        assert_eq!(extent.p_max, Point2i::new(10, 8));

        let wide = ImageFilm::new(10, 8, Box::new(BoxFilter::new(2.0, 2.0))).unwrap();
        let extent = wide.sampling_extent();
        assert_eq!(extent.p_min, Point2i::new(-2, -2));
        assert_eq!(extent.p_max, Point2i::new(12, 10));
    }
}
