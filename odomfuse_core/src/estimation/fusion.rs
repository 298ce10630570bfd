// odomfuse_core/src/estimation/fusion.rs

use tracing::{debug, trace, warn};

use super::{VisionCorrection, VisionCorrectionHistory, VisionGain, VisionUpdate};
use crate::config::EstimatorConfig;
use crate::error::{ConfigError, GainError};
use crate::geometry::Pose2d;
use crate::interpolation::TimeInterpolatableBuffer;
use crate::types::{StdDevs, Timestamp, DEFAULT_RETENTION_SECONDS};

/// The time-aware half of a pose estimator.
///
/// Holds the odometry-only pose history, the vision corrections reconciled against it,
/// the vision gain and the published estimate. Whatever produces odometry poses (wheel
/// odometry or an integrated device) feeds them in through `record_odometry`.
#[derive(Debug, Clone)]
pub struct FusionCore {
    odometry_history: TimeInterpolatableBuffer<Pose2d>,
    corrections: VisionCorrectionHistory,
    gain: VisionGain,
    /// Latest odometry-only pose, timestamped or not.
    odometry_pose: Pose2d,
    estimate: Pose2d,
}

impl FusionCore {
    pub fn new(config: &EstimatorConfig, initial_pose: Pose2d) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(
            config.retention_seconds,
            config.gain()?,
            initial_pose,
        ))
    }

    pub(crate) fn with_defaults(initial_pose: Pose2d) -> Self {
        Self::from_parts(DEFAULT_RETENTION_SECONDS, VisionGain::default(), initial_pose)
    }

    fn from_parts(retention_seconds: f64, gain: VisionGain, initial_pose: Pose2d) -> Self {
        Self {
            odometry_history: TimeInterpolatableBuffer::new(retention_seconds),
            corrections: VisionCorrectionHistory::new(),
            gain,
            odometry_pose: initial_pose,
            estimate: initial_pose,
        }
    }

    /// Buffers a fresh odometry pose and republishes the estimate.
    pub(crate) fn record_odometry(
        &mut self,
        timestamp: Timestamp,
        odometry_pose: Pose2d,
    ) -> Pose2d {
        if timestamp.is_nan() {
            warn!("dropping odometry sample with NaN timestamp");
        } else if !self.odometry_history.add_sample(timestamp, odometry_pose) {
            warn!(timestamp, "dropping odometry sample older than the retained history");
        }
        self.odometry_pose = odometry_pose;
        self.estimate = match self.corrections.latest() {
            Some(correction) => correction.compensate(&odometry_pose),
            None => odometry_pose,
        };
        self.estimate
    }

    /// Forgets all history and republishes `odometry_pose` as the estimate.
    pub(crate) fn reset(&mut self, odometry_pose: Pose2d) {
        self.odometry_history.clear();
        self.corrections.clear();
        self.odometry_pose = odometry_pose;
        self.estimate = odometry_pose;
        debug!(
            x = odometry_pose.x(),
            y = odometry_pose.y(),
            heading = odometry_pose.rotation.radians(),
            "pose estimator reset"
        );
    }

    pub fn estimate(&self) -> Pose2d {
        self.estimate
    }

    pub fn odometry_pose(&self) -> Pose2d {
        self.odometry_pose
    }

    /// The fused pose at `timestamp`, clamped to the buffered span.
    /// `None` while no odometry has been buffered.
    pub fn sample_at(&self, timestamp: Timestamp) -> Option<Pose2d> {
        let oldest = self.odometry_history.oldest_timestamp()?;
        let newest = self.odometry_history.newest_timestamp()?;
        if timestamp.is_nan() {
            return None;
        }
        let timestamp = timestamp.clamp(oldest, newest);

        let odometry_pose = self.odometry_history.sample(timestamp)?;
        Some(match self.corrections.at_or_before(timestamp) {
            Some(correction) => correction.compensate(&odometry_pose),
            None => odometry_pose,
        })
    }

    /// Reconciles a vision pose captured at `timestamp` against the odometry history.
    ///
    /// The discrepancy between the fused estimate at `timestamp` and `vision_pose` is
    /// expressed as a twist, damped by the gain and applied at `timestamp`. The resulting
    /// correction replaces every later one and is carried forward to the current pose.
    pub fn add_vision_measurement(
        &mut self,
        vision_pose: Pose2d,
        timestamp: Timestamp,
    ) -> VisionUpdate {
        let Some(newest) = self.odometry_history.newest_timestamp() else {
            return VisionUpdate::NoOdometry;
        };
        if timestamp.is_nan() || newest - self.odometry_history.history_seconds() > timestamp {
            debug!(timestamp, newest, "rejecting stale vision measurement");
            return VisionUpdate::Stale;
        }

        if let Some(oldest) = self.odometry_history.oldest_timestamp() {
            self.corrections.prune(oldest);
        }

        let Some(odometry_pose) = self.odometry_history.sample(timestamp) else {
            return VisionUpdate::NoOdometry;
        };
        let Some(estimate_then) = self.sample_at(timestamp) else {
            return VisionUpdate::NoOdometry;
        };

        let discrepancy = estimate_then.log(&vision_pose);
        let damped = self.gain.apply(&discrepancy);
        let correction = VisionCorrection {
            corrected_pose: estimate_then.exp(&damped),
            odometry_pose,
        };

        let superseded = self.corrections.record(timestamp, correction).unwrap_or(0);
        self.estimate = correction.compensate(&self.odometry_pose);
        trace!(
            timestamp,
            dx = damped.dx,
            dy = damped.dy,
            dtheta = damped.dtheta,
            superseded,
            "applied vision correction"
        );
        VisionUpdate::Applied
    }

    /// Replaces the vision trust used by subsequent measurements.
    pub fn set_vision_std_devs(&mut self, vision_std_devs: &StdDevs) -> Result<(), GainError> {
        self.gain.set_vision_std_devs(vision_std_devs)
    }

    pub fn gain(&self) -> &VisionGain {
        &self.gain
    }

    pub fn retention_seconds(&self) -> f64 {
        self.odometry_history.history_seconds()
    }

    /// Number of buffered odometry samples.
    pub fn history_len(&self) -> usize {
        self.odometry_history.len()
    }

    pub fn correction_count(&self) -> usize {
        self.corrections.len()
    }
}
