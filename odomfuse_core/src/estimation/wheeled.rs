// odomfuse_core/src/estimation/wheeled.rs

use std::time::Instant;

use super::{FusionCore, PoseFusion};
use crate::config::EstimatorConfig;
use crate::error::{ConfigError, KinematicsError};
use crate::geometry::{Pose2d, Rotation2d, Translation2d};
use crate::kinematics::{DeadwheelKinematics, Kinematics, OmniWheelKinematics};
use crate::odometry::Odometry;
use crate::types::Timestamp;

/// Wheel odometry fused with vision.
///
/// Call one of the `update` methods once per control tick and
/// [`PoseFusion::add_vision_measurement`] whenever a vision pose arrives, stamped with
/// the time it was captured.
#[derive(Debug, Clone)]
pub struct PoseEstimator<K: Kinematics> {
    odometry: Odometry<K>,
    fusion: FusionCore,
    /// Zero point of the fallback clock used by [`PoseEstimator::update`].
    epoch: Instant,
}

pub type DeadwheelPoseEstimator = PoseEstimator<DeadwheelKinematics>;
pub type OmniWheelPoseEstimator = PoseEstimator<OmniWheelKinematics>;

impl<K: Kinematics> PoseEstimator<K> {
    /// An estimator with the default retention window and standard deviations.
    pub fn new(
        kinematics: K,
        gyro_angle: Rotation2d,
        wheel_positions: K::Positions,
        initial_pose: Pose2d,
    ) -> Self {
        Self {
            odometry: Odometry::new(kinematics, gyro_angle, wheel_positions, initial_pose),
            fusion: FusionCore::with_defaults(initial_pose),
            epoch: Instant::now(),
        }
    }

    pub fn with_config(
        kinematics: K,
        gyro_angle: Rotation2d,
        wheel_positions: K::Positions,
        initial_pose: Pose2d,
        config: &EstimatorConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            odometry: Odometry::new(kinematics, gyro_angle, wheel_positions, initial_pose),
            fusion: FusionCore::new(config, initial_pose)?,
            epoch: Instant::now(),
        })
    }

    /// Integrates a new reading taken at `timestamp` and returns the fused estimate.
    pub fn update_with_time(
        &mut self,
        timestamp: Timestamp,
        gyro_angle: Rotation2d,
        wheel_positions: &K::Positions,
    ) -> Result<Pose2d, KinematicsError> {
        let odometry_pose = self.odometry.update(gyro_angle, wheel_positions)?;
        Ok(self.fusion.record_odometry(timestamp, odometry_pose))
    }

    /// Like [`update_with_time`](Self::update_with_time), stamped with
    /// [`clock_seconds`](Self::clock_seconds).
    pub fn update(
        &mut self,
        gyro_angle: Rotation2d,
        wheel_positions: &K::Positions,
    ) -> Result<Pose2d, KinematicsError> {
        let now = self.clock_seconds();
        self.update_with_time(now, gyro_angle, wheel_positions)
    }

    /// Seconds since this estimator was constructed. Vision timestamps must be on the
    /// same clock as the odometry timestamps.
    pub fn clock_seconds(&self) -> Timestamp {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Re-anchors at `pose` given fresh raw sensor readings.
    pub fn reset_position(
        &mut self,
        gyro_angle: Rotation2d,
        wheel_positions: K::Positions,
        pose: Pose2d,
    ) {
        self.odometry.reset_position(gyro_angle, wheel_positions, pose);
        self.fusion.reset(self.odometry.pose());
    }

    pub fn odometry_pose(&self) -> Pose2d {
        self.odometry.pose()
    }

    pub fn odometry(&self) -> &Odometry<K> {
        &self.odometry
    }

    /// For moving the center of rotation of the wheel mapping.
    pub fn kinematics_mut(&mut self) -> &mut K {
        self.odometry.kinematics_mut()
    }
}

impl PoseEstimator<DeadwheelKinematics> {
    /// Deadwheel shortcut for [`update_with_time`](Self::update_with_time).
    pub fn update_deadwheels_with_time(
        &mut self,
        timestamp: Timestamp,
        x: f64,
        y: f64,
        yaw: Rotation2d,
    ) -> Pose2d {
        let odometry_pose = self.odometry.update_deadwheels(x, y, yaw);
        self.fusion.record_odometry(timestamp, odometry_pose)
    }

    pub fn update_deadwheels(&mut self, x: f64, y: f64, yaw: Rotation2d) -> Pose2d {
        let now = self.clock_seconds();
        self.update_deadwheels_with_time(now, x, y, yaw)
    }
}

impl<K: Kinematics> PoseFusion for PoseEstimator<K> {
    fn fusion(&self) -> &FusionCore {
        &self.fusion
    }

    fn fusion_mut(&mut self) -> &mut FusionCore {
        &mut self.fusion
    }

    fn reset_pose(&mut self, pose: Pose2d) {
        self.odometry.reset_pose(pose);
        self.fusion.reset(self.odometry.pose());
    }

    fn reset_translation(&mut self, translation: Translation2d) {
        self.odometry.reset_translation(translation);
        self.fusion.reset(self.odometry.pose());
    }

    fn reset_rotation(&mut self, rotation: Rotation2d) {
        self.odometry.reset_rotation(rotation);
        self.fusion.reset(self.odometry.pose());
    }
}
