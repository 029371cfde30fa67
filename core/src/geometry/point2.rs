//! 2-D Points

#![allow(dead_code)]

use super::Vector2;
use crate::common::*;
use num_traits::{Num, Zero};
use std::fmt;
use std::ops::{Add, AddAssign, Index, Mul, Sub};

/// A 2-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,
}

/// 2-D point containing `Float` values.
pub type Point2f = Point2<Float>;

/// 2-D point containing `Int` values.
pub type Point2i = Point2<Int>;

impl<T: Num> Point2<T> {
    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Creates a new 2-D zero point.
    pub fn zero() -> Self
    where
        T: Zero,
    {
        Self::new(T::zero(), T::zero())
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool
    where
        T: num_traits::Float,
    {
        self.x.is_nan() || self.y.is_nan()
    }

    /// Returns a new point containing floor of values of the components.
    pub fn floor(&self) -> Self
    where
        T: num_traits::Float,
    {
        Self::new(self.x.floor(), self.y.floor())
    }

    /// Returns a new point containing ceil of values of the components.
    pub fn ceil(&self) -> Self
    where
        T: num_traits::Float,
    {
        Self::new(self.x.ceil(), self.y.ceil())
    }

    /// Return the component-wise minimum coordinate values with another point.
    ///
    /// * `other` - The other point.
    pub fn min(&self, other: &Self) -> Self
    where
        T: PartialOrd + Copy,
    {
        Self::new(min(self.x, other.x), min(self.y, other.y))
    }

    /// Return the component-wise maximum coordinate values with another point.
    ///
    /// * `other` - The other point.
    pub fn max(&self, other: &Self) -> Self
    where
        T: PartialOrd + Copy,
    {
        Self::new(max(self.x, other.x), max(self.y, other.y))
    }
}

impl<T: Num> Add<Vector2<T>> for Point2<T> {
    type Output = Self;

    /// Offset the point by a vector.
    ///
    /// * `v` - The vector to add.
    fn add(self, v: Vector2<T>) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }
}

impl<T: Num> Add for Point2<T> {
    type Output = Self;

    /// Component-wise sum with another point.
    ///
    /// * `p` - The point to add.
    fn add(self, p: Self) -> Self {
        Self::new(self.x + p.x, self.y + p.y)
    }
}

impl<T: Num + Copy> AddAssign<Vector2<T>> for Point2<T> {
    /// Offset the point by a vector.
    ///
    /// * `v` - The vector to add.
    fn add_assign(&mut self, v: Vector2<T>) {
        self.x = self.x + v.x;
        self.y = self.y + v.y;
    }
}

impl<T: Num> Sub for Point2<T> {
    type Output = Vector2<T>;

    /// Returns the vector pointing from another point to this one.
    ///
    /// * `p` - The point to subtract.
    fn sub(self, p: Self) -> Vector2<T> {
        Vector2::new(self.x - p.x, self.y - p.y)
    }
}

impl<T: Num + Copy> Mul<T> for Point2<T> {
    type Output = Self;

    /// Scale the point's coordinates.
    ///
    /// * `s` - The scale factor.
    fn mul(self, s: T) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl<T> Index<usize> for Point2<T> {
    type Output = T;

    /// Index the point by axis (0 = x, 1 = y).
    ///
    /// * `index` - The axis.
    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("invalid axis index {} for Point2", index),
        }
    }
}

impl From<Point2i> for Point2f {
    /// Convert an integer point to a floating point one.
    ///
    /// * `p` - The integer point.
    fn from(p: Point2i) -> Self {
        Self::new(p.x as Float, p.y as Float)
    }
}

impl<T: fmt::Display> fmt::Display for Point2<T> {
    /// Formats the point as `(x, y)`.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_point() {
        assert!(Point2::new(0, 0) == Point2::zero());
        assert!(Point2::new(0.0, 0.0) == Point2::<f32>::zero());
    }

    #[test]
    fn has_nans() {
        assert!(!Point2::new(0.0_f32, 0.0).has_nans());
        assert!(Point2::new(f32::NAN, 0.0).has_nans());
    }

    #[test]
    #[should_panic]
    #[allow(unused)]
    fn invalid_index() {
        let z = Point2::<i32>::zero()[2];
    }

    proptest! {
        #[test]
        fn point_minus_point_is_vector(
            x1 in -100.0..100.0f32, y1 in -100.0..100.0f32,
            x2 in -100.0..100.0f32, y2 in -100.0..100.0f32,
        ) {
            let v = Point2::new(x1, y1) - Point2::new(x2, y2);
            prop_assert_eq!(v, Vector2::new(x1 - x2, y1 - y2));
        }

        #[test]
        fn point_plus_vector_round_trips(
            x in -100.0..100.0f32, y in -100.0..100.0f32,
            dx in -100.0..100.0f32, dy in -100.0..100.0f32,
        ) {
            let p = Point2::new(x, y);
            let q = p + Vector2::new(dx, dy);
            let v = q - p;
            prop_assert!((v.x - dx).abs() < 1e-3 && (v.y - dy).abs() < 1e-3);
        }

        #[test]
        fn floor_and_ceil_bracket(x in -100.0..100.0f32, y in -100.0..100.0f32) {
            let p = Point2::new(x, y);
            prop_assert!(p.floor().x <= p.x && p.ceil().x >= p.x);
            prop_assert!(p.floor().y <= p.y && p.ceil().y >= p.y);
        }
    }
}
