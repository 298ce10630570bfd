// odomfuse_core/src/geometry/translation.rs

use nalgebra::Vector2;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::Rotation2d;

/// A planar position or offset, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Translation2d(Vector2<f64>);

impl Translation2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Vector2::new(x, y))
    }

    pub fn zero() -> Self {
        Self(Vector2::zeros())
    }

    pub fn from_polar(distance: f64, angle: &Rotation2d) -> Self {
        Self::new(distance * angle.cos(), distance * angle.sin())
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    pub fn distance(&self, other: &Translation2d) -> f64 {
        (self.0 - other.0).norm()
    }

    /// Direction of this vector from the origin.
    pub fn angle(&self) -> Rotation2d {
        Rotation2d::from_cos_sin(self.0.x, self.0.y)
    }

    pub fn rotate_by(&self, rotation: &Rotation2d) -> Self {
        Self(rotation.as_unit_complex() * self.0)
    }

    pub fn as_vector(&self) -> &Vector2<f64> {
        &self.0
    }
}

impl Default for Translation2d {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Vector2<f64>> for Translation2d {
    fn from(value: Vector2<f64>) -> Self {
        Self(value)
    }
}

impl Add for Translation2d {
    type Output = Translation2d;

    fn add(self, rhs: Translation2d) -> Translation2d {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Translation2d {
    type Output = Translation2d;

    fn sub(self, rhs: Translation2d) -> Translation2d {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Translation2d {
    type Output = Translation2d;

    fn neg(self) -> Translation2d {
        Self(-self.0)
    }
}

impl Mul<f64> for Translation2d {
    type Output = Translation2d;

    fn mul(self, rhs: f64) -> Translation2d {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Translation2d {
    type Output = Translation2d;

    fn div(self, rhs: f64) -> Translation2d {
        Self(self.0 / rhs)
    }
}
