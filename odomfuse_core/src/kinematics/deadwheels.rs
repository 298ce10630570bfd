// odomfuse_core/src/kinematics/deadwheels.rs

use std::ops::{Add, Neg, Sub};

use super::{Kinematics, WheelPositions};
use crate::error::KinematicsError;
use crate::geometry::{ChassisSpeeds, Rotation2d, Translation2d, Twist2d};
use crate::interpolation::Interpolate;

/// Two unpowered tracking wheels, one along the robot's x axis and one along its y axis,
/// plus a gyro for heading.
///
/// The mapping is the identity, which is only exact when both wheels pass through the
/// robot center. That placement is assumed, not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeadwheelKinematics;

impl DeadwheelKinematics {
    pub fn new() -> Self {
        Self
    }

    /// The identity mapping: x-wheel delta to `dx`, y-wheel delta to `dy`, yaw delta
    /// to `dtheta`.
    pub fn twist_between(start: &DeadwheelPositions, end: &DeadwheelPositions) -> Twist2d {
        let delta = *end - *start;
        Twist2d::new(delta.x, delta.y, delta.yaw.radians())
    }
}

/// Cumulative distances of the x and y tracking wheels and the gyro yaw.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeadwheelPositions {
    pub x: f64,
    pub y: f64,
    pub yaw: Rotation2d,
}

impl DeadwheelPositions {
    pub fn new(x: f64, y: f64, yaw: Rotation2d) -> Self {
        Self { x, y, yaw }
    }
}

impl Add for DeadwheelPositions {
    type Output = DeadwheelPositions;

    fn add(self, rhs: DeadwheelPositions) -> DeadwheelPositions {
        DeadwheelPositions::new(self.x + rhs.x, self.y + rhs.y, self.yaw + rhs.yaw)
    }
}

impl Neg for DeadwheelPositions {
    type Output = DeadwheelPositions;

    fn neg(self) -> DeadwheelPositions {
        DeadwheelPositions::new(-self.x, -self.y, -self.yaw)
    }
}

impl Sub for DeadwheelPositions {
    type Output = DeadwheelPositions;

    fn sub(self, rhs: DeadwheelPositions) -> DeadwheelPositions {
        self + (-rhs)
    }
}

impl Interpolate for DeadwheelPositions {
    fn interpolate(&self, end: &Self, t: f64) -> Self {
        DeadwheelPositions::new(
            self.x.interpolate(&end.x, t),
            self.y.interpolate(&end.y, t),
            self.yaw.interpolate(&end.yaw, t),
        )
    }
}

impl WheelPositions for DeadwheelPositions {
    fn minus(&self, other: &Self) -> Self {
        *self - *other
    }
}

impl Kinematics for DeadwheelKinematics {
    type Positions = DeadwheelPositions;
    type Speeds = ChassisSpeeds;

    fn to_twist(
        &self,
        start: &DeadwheelPositions,
        end: &DeadwheelPositions,
    ) -> Result<Twist2d, KinematicsError> {
        Ok(Self::twist_between(start, end))
    }

    fn to_chassis_speeds(
        &self,
        wheel_speeds: &ChassisSpeeds,
    ) -> Result<ChassisSpeeds, KinematicsError> {
        Ok(*wheel_speeds)
    }

    fn to_wheel_speeds(&self, chassis_speeds: &ChassisSpeeds) -> ChassisSpeeds {
        *chassis_speeds
    }

    /// The wheels sit on the robot center, so they see the velocity of the center
    /// point while the chassis spins about `center_of_rotation`.
    fn to_wheel_speeds_about(
        &mut self,
        chassis_speeds: &ChassisSpeeds,
        center_of_rotation: &Translation2d,
    ) -> Result<ChassisSpeeds, KinematicsError> {
        let omega = chassis_speeds.omega;
        Ok(ChassisSpeeds::new(
            chassis_speeds.vx + omega * center_of_rotation.y(),
            chassis_speeds.vy - omega * center_of_rotation.x(),
            omega,
        ))
    }
}
