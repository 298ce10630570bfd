// odomfuse_core/src/kinematics/mod.rs

//! Drivetrain kinematics: the mapping between wheel-space motion and chassis motion.
//!
//! Every drivetrain geometry implements [`Kinematics`]. Odometry only needs
//! [`Kinematics::to_twist`]; the velocity mappings exist for controllers that share the
//! same geometry description.

use std::fmt::Debug;

use crate::error::KinematicsError;
use crate::geometry::{ChassisSpeeds, Translation2d, Twist2d};
use crate::interpolation::Interpolate;

/// A cumulative wheel reading for one drivetrain geometry.
pub trait WheelPositions: Clone + Debug + Send + Sync + Interpolate {
    /// Component-wise difference `self - other`.
    fn minus(&self, other: &Self) -> Self;
}

/// The geometric contract shared by all drivetrains.
pub trait Kinematics: Debug + Send + Sync {
    type Positions: WheelPositions;
    type Speeds: Clone + Debug;

    /// Local-frame chassis motion between two cumulative wheel readings.
    fn to_twist(
        &self,
        start: &Self::Positions,
        end: &Self::Positions,
    ) -> Result<Twist2d, KinematicsError>;

    /// Forward kinematics for velocities.
    fn to_chassis_speeds(
        &self,
        wheel_speeds: &Self::Speeds,
    ) -> Result<ChassisSpeeds, KinematicsError>;

    /// Inverse kinematics for velocities, rotating about the robot center.
    fn to_wheel_speeds(&self, chassis_speeds: &ChassisSpeeds) -> Self::Speeds;

    /// Inverse kinematics for velocities, rotating about `center_of_rotation`
    /// (robot frame, meters).
    fn to_wheel_speeds_about(
        &mut self,
        chassis_speeds: &ChassisSpeeds,
        center_of_rotation: &Translation2d,
    ) -> Result<Self::Speeds, KinematicsError>;
}

mod deadwheels;
mod omni;

pub use deadwheels::{DeadwheelKinematics, DeadwheelPositions};
pub use omni::{OmniWheelKinematics, OmniWheelPositions, OmniWheelSpeeds};
