// odomfuse_core/src/geometry/rotation.rs

use nalgebra::UnitComplex;
use std::ops::{Add, Neg, Sub};

/// A planar heading. Always normalized to `(-pi, pi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation2d(UnitComplex<f64>);

impl Rotation2d {
    pub fn identity() -> Self {
        Self(UnitComplex::identity())
    }

    pub fn from_radians(radians: f64) -> Self {
        Self(UnitComplex::new(radians))
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// Builds a rotation from an (unnormalized) direction vector.
    /// A zero-length direction yields the identity.
    pub fn from_cos_sin(cos: f64, sin: f64) -> Self {
        let magnitude = cos.hypot(sin);
        if magnitude > 1e-6 {
            Self(UnitComplex::from_cos_sin_unchecked(
                cos / magnitude,
                sin / magnitude,
            ))
        } else {
            Self::identity()
        }
    }

    pub fn radians(&self) -> f64 {
        self.0.angle()
    }

    pub fn degrees(&self) -> f64 {
        self.radians().to_degrees()
    }

    pub fn cos(&self) -> f64 {
        self.0.cos_angle()
    }

    pub fn sin(&self) -> f64 {
        self.0.sin_angle()
    }

    /// Composes two rotations (angle addition wrapped to `(-pi, pi]`).
    pub fn rotate_by(&self, other: &Rotation2d) -> Self {
        Self(self.0 * other.0)
    }

    pub fn inverse(&self) -> Self {
        Self(self.0.inverse())
    }

    /// Multiplies the wrapped angle by `scalar`.
    pub fn scale(&self, scalar: f64) -> Self {
        Self::from_radians(self.radians() * scalar)
    }

    /// Interpolates along the shortest arc. `t` is clamped to `[0, 1]`.
    pub fn interpolate(&self, end: &Rotation2d, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        *self + (*end - *self).scale(t)
    }

    pub fn as_unit_complex(&self) -> &UnitComplex<f64> {
        &self.0
    }
}

impl Default for Rotation2d {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<UnitComplex<f64>> for Rotation2d {
    fn from(value: UnitComplex<f64>) -> Self {
        Self(value)
    }
}

impl Add for Rotation2d {
    type Output = Rotation2d;

    fn add(self, rhs: Rotation2d) -> Rotation2d {
        self.rotate_by(&rhs)
    }
}

impl Sub for Rotation2d {
    type Output = Rotation2d;

    fn sub(self, rhs: Rotation2d) -> Rotation2d {
        self.rotate_by(&rhs.inverse())
    }
}

impl Neg for Rotation2d {
    type Output = Rotation2d;

    fn neg(self) -> Rotation2d {
        self.inverse()
    }
}
