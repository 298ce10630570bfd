// odomfuse_core/src/geometry/twist.rs

use nalgebra::Vector3;
use std::ops::{Add, Mul, Neg, Sub};

use super::{Pose2d, Rotation2d, Translation2d};

/// Incremental motion in the robot's own frame since the last sample:
/// forward `dx`, leftward `dy` (meters) and counter-clockwise `dtheta` (radians).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist2d {
    pub dx: f64,
    pub dy: f64,
    pub dtheta: f64,
}

impl Twist2d {
    pub fn new(dx: f64, dy: f64, dtheta: f64) -> Self {
        Self { dx, dy, dtheta }
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Self::new(self.dx * scalar, self.dy * scalar, self.dtheta * scalar)
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.dx, self.dy, self.dtheta)
    }

    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Chassis velocity in the robot frame: `vx`, `vy` in m/s and `omega` in rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    pub vx: f64,
    pub vy: f64,
    pub omega: f64,
}

impl ChassisSpeeds {
    pub fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }

    /// Converts a field-relative velocity into the robot frame given the robot's heading.
    pub fn from_field_relative(field_speeds: &ChassisSpeeds, robot_heading: &Rotation2d) -> Self {
        let robot_relative = Translation2d::new(field_speeds.vx, field_speeds.vy)
            .rotate_by(&robot_heading.inverse());
        Self::new(robot_relative.x(), robot_relative.y(), field_speeds.omega)
    }

    /// Returns the constant-curvature velocity that, held for `dt` seconds, ends at the
    /// pose a straight-line-plus-spin command would have reached. Removes the skew that
    /// appears when translating and rotating at the same time in discrete steps.
    pub fn discretize(&self, dt: f64) -> Self {
        if dt <= 0.0 {
            return *self;
        }
        let desired_delta = Pose2d::new(
            self.vx * dt,
            self.vy * dt,
            Rotation2d::from_radians(self.omega * dt),
        );
        let twist = Pose2d::default().log(&desired_delta);
        Self::new(twist.dx / dt, twist.dy / dt, twist.dtheta / dt)
    }

    /// The local-frame motion produced by holding this velocity for `dt` seconds.
    pub fn to_twist(&self, dt: f64) -> Twist2d {
        Twist2d::new(self.vx * dt, self.vy * dt, self.omega * dt)
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.vx, self.vy, self.omega)
    }
}

impl Add for ChassisSpeeds {
    type Output = ChassisSpeeds;

    fn add(self, rhs: ChassisSpeeds) -> ChassisSpeeds {
        ChassisSpeeds::new(self.vx + rhs.vx, self.vy + rhs.vy, self.omega + rhs.omega)
    }
}

impl Sub for ChassisSpeeds {
    type Output = ChassisSpeeds;

    fn sub(self, rhs: ChassisSpeeds) -> ChassisSpeeds {
        self + (-rhs)
    }
}

impl Neg for ChassisSpeeds {
    type Output = ChassisSpeeds;

    fn neg(self) -> ChassisSpeeds {
        ChassisSpeeds::new(-self.vx, -self.vy, -self.omega)
    }
}

impl Mul<f64> for ChassisSpeeds {
    type Output = ChassisSpeeds;

    fn mul(self, rhs: f64) -> ChassisSpeeds {
        ChassisSpeeds::new(self.vx * rhs, self.vy * rhs, self.omega * rhs)
    }
}
