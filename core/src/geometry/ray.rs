//! Rays

#![allow(dead_code)]

use super::{Point3f, Vector3f};
use crate::common::*;
use std::fmt;

/// A ray with an origin and a normalized direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Maximum extent of the ray.
    pub t_max: Float,

    /// Auxilliary rays offset by one filter width in the x and y directions
    /// of the image plane.
    pub differentials: Option<RayDifferential>,
}

impl Ray {
    /// Returns a ray with no differentials.
    ///
    /// * `o` - Origin.
    /// * `d` - Direction.
    pub fn new(o: Point3f, d: Vector3f) -> Self {
        Self {
            o,
            d,
            t_max: INFINITY,
            differentials: None,
        }
    }

    /// Get position along the ray at given parameter.
    ///
    /// * `t` - Parameter to evaluate.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }

    /// Scale the differential rays to account for spacing between samples on
    /// the film plane.
    ///
    /// * `s` - The weight used to scale the differential rays.
    pub fn scale_differentials(&mut self, s: Float) {
        if let Some(d) = self.differentials {
            self.differentials = Some(RayDifferential {
                rx_origin: self.o + (d.rx_origin - self.o) * s,
                ry_origin: self.o + (d.ry_origin - self.o) * s,
                rx_direction: self.d + (d.rx_direction - self.d) * s,
                ry_direction: self.d + (d.ry_direction - self.d) * s,
            });
        }
    }
}

impl Default for Ray {
    /// Returns a ray at the origin pointing along +z.
    fn default() -> Self {
        Self::new(Point3f::zero(), Vector3f::new(0.0, 0.0, 1.0))
    }
}

impl fmt::Display for Ray {
    /// Formats the ray as `o -> d`.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.o, self.d)
    }
}

/// A pair of auxilliary rays offset by one filter width in the x and y
/// directions of the image plane, used to estimate a ray's texture-space
/// footprint.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RayDifferential {
    /// Origin of ray offset in x-direction.
    pub rx_origin: Point3f,

    /// Origin of ray offset in y-direction.
    pub ry_origin: Point3f,

    /// Direction of ray offset in x-direction.
    pub rx_direction: Vector3f,

    /// Direction of ray offset in y-direction.
    pub ry_direction: Vector3f,
}

impl RayDifferential {
    /// Returns a ray differential.
    ///
    /// * `rx_origin`    - Origin for x-direction differential.
    /// * `ry_origin`    - Origin for y-direction differential.
    /// * `rx_direction` - Direction for x-direction differential.
    /// * `ry_direction` - Direction for y-direction differential.
    pub fn new(
        rx_origin: Point3f,
        ry_origin: Point3f,
        rx_direction: Vector3f,
        ry_direction: Vector3f,
    ) -> Self {
        Self {
            rx_origin,
            ry_origin,
            rx_direction,
            ry_direction,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_along_ray() {
        let r = Ray::new(Point3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 2.0, 0.0));
        assert_eq!(r.at(0.5), Point3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn scaling_differentials_halves_offsets() {
        let mut r = Ray::new(Point3f::zero(), Vector3f::new(0.0, 0.0, 1.0));
        r.differentials = Some(RayDifferential::new(
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(0.0, 2.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, 1.0),
        ));
        r.scale_differentials(0.5);
        let d = r.differentials.unwrap();
        assert_eq!(d.rx_origin, Point3f::new(1.0, 0.0, 0.0));
        assert_eq!(d.ry_origin, Point3f::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn scaling_without_differentials_is_a_noop() {
        let mut r = Ray::default();
        r.scale_differentials(0.25);
        assert!(r.differentials.is_none());
    }
}
