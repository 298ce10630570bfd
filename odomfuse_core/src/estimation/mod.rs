// odomfuse_core/src/estimation/mod.rs

//! Fusion of odometry with delayed absolute pose measurements.

use crate::error::GainError;
use crate::geometry::{Pose2d, Rotation2d, Translation2d};
use crate::types::{StdDevs, Timestamp};

/// What happened to a vision measurement. Rejections are normal at runtime and need no
/// handling beyond, perhaps, a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionUpdate {
    /// A correction was recorded and the estimate republished.
    Applied,
    /// Older than the retention window relative to the newest odometry sample.
    Stale,
    /// No odometry has been buffered yet.
    NoOdometry,
}

impl VisionUpdate {
    pub fn is_applied(&self) -> bool {
        matches!(self, VisionUpdate::Applied)
    }
}

/// The contract shared by every pose estimator, whatever feeds it odometry.
///
/// Implementors expose their [`FusionCore`]; the read and vision operations are provided
/// on top of it. Resets are left to the implementor since they must also re-anchor the
/// odometry source.
pub trait PoseFusion: Send {
    fn fusion(&self) -> &FusionCore;

    fn fusion_mut(&mut self) -> &mut FusionCore;

    /// Teleports to `pose`, clearing the pose history and all vision corrections.
    fn reset_pose(&mut self, pose: Pose2d);

    fn reset_translation(&mut self, translation: Translation2d);

    fn reset_rotation(&mut self, rotation: Rotation2d);

    /// The best current estimate.
    fn estimated_pose(&self) -> Pose2d {
        self.fusion().estimate()
    }

    fn sample_at(&self, timestamp: Timestamp) -> Option<Pose2d> {
        self.fusion().sample_at(timestamp)
    }

    fn add_vision_measurement(
        &mut self,
        vision_pose: Pose2d,
        timestamp: Timestamp,
    ) -> VisionUpdate {
        self.fusion_mut().add_vision_measurement(vision_pose, timestamp)
    }

    /// Sets the vision standard deviations (they persist) and then adds the measurement.
    fn add_vision_measurement_with_std_devs(
        &mut self,
        vision_pose: Pose2d,
        timestamp: Timestamp,
        vision_std_devs: &StdDevs,
    ) -> Result<VisionUpdate, GainError> {
        self.set_vision_std_devs(vision_std_devs)?;
        Ok(self.add_vision_measurement(vision_pose, timestamp))
    }

    fn set_vision_std_devs(&mut self, vision_std_devs: &StdDevs) -> Result<(), GainError> {
        self.fusion_mut().set_vision_std_devs(vision_std_devs)
    }

    fn history_len(&self) -> usize {
        self.fusion().history_len()
    }

    fn correction_count(&self) -> usize {
        self.fusion().correction_count()
    }
}

mod fusion;
mod gain;
mod integrated;
mod shared;
mod vision;
mod wheeled;

pub use fusion::FusionCore;
pub use gain::VisionGain;
pub use integrated::{DeviceStatus, IntegratedOdometry, IntegratedOdometryEstimator};
pub use shared::SharedEstimator;
pub use vision::{VisionCorrection, VisionCorrectionHistory};
pub use wheeled::{DeadwheelPoseEstimator, OmniWheelPoseEstimator, PoseEstimator};
