//! Camera

#![allow(dead_code)]

use crate::common::*;
use crate::error::Error;
use crate::film::Film;
use crate::geometry::*;
use crate::sampling::concentric_sample_disk;
use std::sync::Arc;

/// A camera placed in the scene. The camera owns the film the rendered
/// image accumulates on.
pub trait Camera: Send + Sync {
    /// Generates the world-space ray for an image plane point and lens UV
    /// coordinates, along with its weight. A weight of zero means the ray
    /// carries no contribution and its radiance need not be computed.
    /// Implementations without a lens ignore the UV coordinates.
    ///
    /// * `image_point` - The image plane point.
    /// * `lens_uv`     - Lens UV coordinates in [0,1]².
    fn generate_ray(&self, image_point: &Point2f, lens_uv: &Point2f) -> (Ray, Float);

    /// Returns the film.
    fn film(&self) -> Arc<dyn Film>;
}

/// A perspective projection camera with an optional thin lens for depth of
/// field.
pub struct PerspectiveCamera {
    /// The film.
    film: Arc<dyn Film>,

    /// Camera position in world space.
    eye: Point3f,

    /// Camera-space basis vectors in world space.
    right: Vector3f,
    up: Vector3f,
    forward: Vector3f,

    /// Half extents of the image plane at unit distance.
    tan_half_fov_y: Float,
    tan_half_fov_x: Float,

    /// Lens radius; zero disables depth of field.
    lens_radius: Float,

    /// Distance from the lens to the plane of focus.
    focal_distance: Float,
}

impl PerspectiveCamera {
    /// Create a new `PerspectiveCamera`.
    ///
    /// * `eye`            - Camera position.
    /// * `look_at`        - Point the camera looks at.
    /// * `up`             - The world up direction.
    /// * `fov_y`          - Vertical field of view in radians.
    /// * `lens_radius`    - Lens radius; zero disables depth of field.
    /// * `focal_distance` - Distance to the plane of focus.
    /// * `film`           - The film.
    pub fn new(
        eye: Point3f,
        look_at: Point3f,
        up: Vector3f,
        fov_y: Float,
        lens_radius: Float,
        focal_distance: Float,
        film: Arc<dyn Film>,
    ) -> Result<Self, Error> {
        let forward = look_at - eye;
        if forward.length_squared() == 0.0 {
            return Err(Error::DegenerateCameraBasis);
        }
        let forward = forward.normalize();

        let right = up.cross(&forward);
        if right.length_squared() < 1e-12 {
            return Err(Error::DegenerateCameraBasis);
        }
        let right = right.normalize();
        let up = forward.cross(&right);

        let aspect = film.x_resolution() as Float / film.y_resolution() as Float;
        let tan_half_fov_y = (fov_y * 0.5).tan();
        let tan_half_fov_x = tan_half_fov_y * aspect;

        Ok(Self {
            film,
            eye,
            right,
            up,
            forward,
            tan_half_fov_y,
            tan_half_fov_x,
            lens_radius,
            focal_distance,
        })
    }
}

impl Camera for PerspectiveCamera {
    fn generate_ray(&self, image_point: &Point2f, lens_uv: &Point2f) -> (Ray, Float) {
        // Image point to normalized screen coordinates in [-1,1]².
        let sx = 2.0 * image_point.x / self.film.x_resolution() as Float - 1.0;
        let sy = 1.0 - 2.0 * image_point.y / self.film.y_resolution() as Float;

        // Camera-space direction through the image plane point.
        let mut origin = Point3f::zero();
        let mut direction = Vector3f::new(
            sx * self.tan_half_fov_x,
            sy * self.tan_half_fov_y,
            1.0,
        );

        if self.lens_radius > 0.0 {
            // Sample a point on the lens and refocus the ray so points at
            // the focal distance stay sharp.
            let lens = concentric_sample_disk(lens_uv) * self.lens_radius;
            let focus = Point3f::zero() + direction * self.focal_distance;
            origin = Point3f::new(lens.x, lens.y, 0.0);
            direction = focus - origin;
        }

        let world_origin = self.eye + self.right * origin.x + self.up * origin.y;
        let world_direction =
            (self.right * direction.x + self.up * direction.y + self.forward * direction.z)
                .normalize();

        (Ray::new(world_origin, world_direction), 1.0)
    }

    fn film(&self) -> Arc<dyn Film> {
        Arc::clone(&self.film)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::film::{BoxFilter, ImageFilm};
    use float_cmp::approx_eq;

    fn camera(lens_radius: Float) -> PerspectiveCamera {
        let film = Arc::new(ImageFilm::new(8, 8, Box::new(BoxFilter::new(0.5, 0.5))).unwrap());
        PerspectiveCamera::new(
            Point3f::zero(),
            Point3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            PI_OVER_TWO,
            lens_radius,
            1.0,
            film,
        )
        .unwrap()
    }

    #[test]
    fn center_ray_points_forward() {
        let camera = camera(0.0);
        let (ray, weight) = camera.generate_ray(&Point2f::new(4.0, 4.0), &Point2f::new(0.5, 0.5));
        assert_eq!(weight, 1.0);
        assert!(approx_eq!(f32, ray.d.z, 1.0, epsilon = 1e-6));
        assert_eq!(ray.o, Point3f::zero());
    }

    #[test]
    fn corner_rays_diverge() {
        let camera = camera(0.0);
        let (top_left, _) = camera.generate_ray(&Point2f::new(0.0, 0.0), &Point2f::new(0.5, 0.5));
        let (bottom_right, _) =
            camera.generate_ray(&Point2f::new(8.0, 8.0), &Point2f::new(0.5, 0.5));
        assert!(top_left.d.x < 0.0 && top_left.d.y > 0.0);
        assert!(bottom_right.d.x > 0.0 && bottom_right.d.y < 0.0);
    }

    #[test]
    fn rays_are_normalized() {
        let camera = camera(0.1);
        let mut rng = crate::rng::RNG::new(1);
        for _ in 0..100 {
            let p = Point2f::new(rng.uniform_float() * 8.0, rng.uniform_float() * 8.0);
            let uv = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let (ray, _) = camera.generate_ray(&p, &uv);
            assert!(approx_eq!(f32, ray.d.length(), 1.0, epsilon = 1e-5));
        }
    }

    #[test]
    fn degenerate_orientation_is_rejected() {
        let film = Arc::new(ImageFilm::new(8, 8, Box::new(BoxFilter::new(0.5, 0.5))).unwrap());
        let result = PerspectiveCamera::new(
            Point3f::zero(),
            Point3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, 1.0),
            PI_OVER_TWO,
            0.0,
            1.0,
            film,
        );
        assert!(result.is_err());
    }
}
