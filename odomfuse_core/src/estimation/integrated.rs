// odomfuse_core/src/estimation/integrated.rs

use std::time::Instant;
use tracing::{info, warn};

use super::{FusionCore, PoseFusion};
use crate::config::EstimatorConfig;
use crate::error::ConfigError;
use crate::geometry::{Pose2d, Rotation2d, Translation2d};
use crate::types::Timestamp;

/// Health reported by a self-contained odometry peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Ready,
    Calibrating,
    NotReady,
    /// The device reports a hardware fault, such as a missing pod or IMU runaway.
    Fault,
}

/// An odometry device that integrates its own pose (for example a tracking coprocessor
/// with its own encoders and IMU).
pub trait IntegratedOdometry: Send {
    /// Pulls fresh data from the device. Called once per estimator update.
    fn refresh(&mut self);

    fn status(&self) -> DeviceStatus;

    /// The device's integrated pose as of the last refresh.
    fn pose(&self) -> Pose2d;

    fn reset_pose(&mut self, pose: Pose2d);
}

/// Vision fusion on top of an [`IntegratedOdometry`] device.
#[derive(Debug)]
pub struct IntegratedOdometryEstimator<D> {
    device: D,
    fusion: FusionCore,
    last_status: DeviceStatus,
    epoch: Instant,
}

impl<D: IntegratedOdometry> IntegratedOdometryEstimator<D> {
    /// Resets the device to `initial_pose` and starts with default tuning.
    pub fn new(mut device: D, initial_pose: Pose2d) -> Self {
        device.reset_pose(initial_pose);
        Self {
            device,
            fusion: FusionCore::with_defaults(initial_pose),
            last_status: DeviceStatus::NotReady,
            epoch: Instant::now(),
        }
    }

    pub fn with_config(
        mut device: D,
        initial_pose: Pose2d,
        config: &EstimatorConfig,
    ) -> Result<Self, ConfigError> {
        let fusion = FusionCore::new(config, initial_pose)?;
        device.reset_pose(initial_pose);
        Ok(Self {
            device,
            fusion,
            last_status: DeviceStatus::NotReady,
            epoch: Instant::now(),
        })
    }

    /// Refreshes the device and, if it is ready, buffers its pose at `timestamp`.
    /// Otherwise the previous estimate is returned untouched.
    pub fn update_with_time(&mut self, timestamp: Timestamp) -> Pose2d {
        self.device.refresh();
        let status = self.device.status();
        self.note_status(status);
        if status != DeviceStatus::Ready {
            return self.fusion.estimate();
        }
        let odometry_pose = self.device.pose();
        self.fusion.record_odometry(timestamp, odometry_pose)
    }

    pub fn update(&mut self) -> Pose2d {
        let now = self.clock_seconds();
        self.update_with_time(now)
    }

    // Logs on transitions only; a device can sit in calibration for many ticks.
    fn note_status(&mut self, status: DeviceStatus) {
        if status == self.last_status {
            return;
        }
        match status {
            DeviceStatus::Ready => info!("odometry device ready"),
            other => warn!(status = ?other, "odometry device not ready, holding last estimate"),
        }
        self.last_status = status;
    }

    pub fn clock_seconds(&self) -> Timestamp {
        self.epoch.elapsed().as_secs_f64()
    }

    pub fn device_status(&self) -> DeviceStatus {
        self.last_status
    }

    pub fn odometry_pose(&self) -> Pose2d {
        self.fusion.odometry_pose()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: IntegratedOdometry> PoseFusion for IntegratedOdometryEstimator<D> {
    fn fusion(&self) -> &FusionCore {
        &self.fusion
    }

    fn fusion_mut(&mut self) -> &mut FusionCore {
        &mut self.fusion
    }

    fn reset_pose(&mut self, pose: Pose2d) {
        self.device.reset_pose(pose);
        self.fusion.reset(pose);
    }

    fn reset_translation(&mut self, translation: Translation2d) {
        let pose = Pose2d::from_parts(translation, self.fusion.odometry_pose().rotation);
        self.reset_pose(pose);
    }

    fn reset_rotation(&mut self, rotation: Rotation2d) {
        let pose = Pose2d::from_parts(self.fusion.odometry_pose().translation, rotation);
        self.reset_pose(pose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Replays a scripted sequence of `(status, pose)` readings.
    #[derive(Debug, Default)]
    struct ScriptedDevice {
        script: Vec<(DeviceStatus, Pose2d)>,
        cursor: usize,
        offset: Pose2d,
        resets: usize,
    }

    impl ScriptedDevice {
        fn new(script: Vec<(DeviceStatus, Pose2d)>) -> Self {
            Self {
                script,
                ..Default::default()
            }
        }

        fn current(&self) -> (DeviceStatus, Pose2d) {
            let index = self.cursor.saturating_sub(1);
            self.script
                .get(index)
                .copied()
                .unwrap_or((DeviceStatus::NotReady, Pose2d::default()))
        }
    }

    impl IntegratedOdometry for ScriptedDevice {
        fn refresh(&mut self) {
            self.cursor += 1;
        }

        fn status(&self) -> DeviceStatus {
            self.current().0
        }

        fn pose(&self) -> Pose2d {
            let raw = self.current().1;
            Pose2d::from_parts(
                self.offset.translation + raw.translation,
                self.offset.rotation + raw.rotation,
            )
        }

        fn reset_pose(&mut self, pose: Pose2d) {
            self.offset = pose;
            self.resets += 1;
        }
    }

    fn pose_x(x: f64) -> Pose2d {
        Pose2d::new(x, 0.0, Rotation2d::identity())
    }

    #[test]
    fn not_ready_device_holds_the_last_estimate() {
        let device = ScriptedDevice::new(vec![
            (DeviceStatus::Ready, pose_x(0.1)),
            (DeviceStatus::Calibrating, pose_x(9.0)),
            (DeviceStatus::Fault, pose_x(9.0)),
            (DeviceStatus::Ready, pose_x(0.3)),
        ]);
        let mut estimator = IntegratedOdometryEstimator::new(device, Pose2d::default());

        assert_abs_diff_eq!(estimator.update_with_time(0.1).x(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(estimator.update_with_time(0.2).x(), 0.1, epsilon = 1e-12);
        assert_eq!(estimator.device_status(), DeviceStatus::Calibrating);
        assert_abs_diff_eq!(estimator.update_with_time(0.3).x(), 0.1, epsilon = 1e-12);
        assert_eq!(estimator.history_len(), 1);
        assert_abs_diff_eq!(estimator.update_with_time(0.4).x(), 0.3, epsilon = 1e-12);
        assert_eq!(estimator.history_len(), 2);
    }

    #[test]
    fn vision_corrects_device_pose() {
        let device = ScriptedDevice::new(vec![
            (DeviceStatus::Ready, pose_x(0.1)),
            (DeviceStatus::Ready, pose_x(0.2)),
        ]);
        let config = EstimatorConfig {
            vision_std_devs: [0.0; 3],
            ..Default::default()
        };
        let mut estimator =
            IntegratedOdometryEstimator::with_config(device, Pose2d::default(), &config).unwrap();

        estimator.update_with_time(1.0);
        assert!(estimator.add_vision_measurement(pose_x(0.12), 1.0).is_applied());
        assert_abs_diff_eq!(estimator.estimated_pose().x(), 0.12, epsilon = 1e-9);
        assert_abs_diff_eq!(estimator.update_with_time(1.1).x(), 0.22, epsilon = 1e-9);
    }

    #[test]
    fn reset_reaches_the_device() {
        let device = ScriptedDevice::new(vec![(DeviceStatus::Ready, pose_x(0.5))]);
        let mut estimator = IntegratedOdometryEstimator::new(device, Pose2d::default());
        estimator.update_with_time(0.1);

        estimator.reset_translation(Translation2d::new(2.0, 3.0));
        assert_eq!(estimator.device().resets, 2);
        assert_eq!(estimator.history_len(), 0);
        assert_abs_diff_eq!(estimator.estimated_pose().x(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(estimator.estimated_pose().y(), 3.0, epsilon = 1e-12);
    }
}
