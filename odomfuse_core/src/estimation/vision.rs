// odomfuse_core/src/estimation/vision.rs

use ordered_float::NotNan;
use std::collections::BTreeMap;
use std::ops::Bound::{Included, Unbounded};

use crate::geometry::Pose2d;
use crate::types::Timestamp;

/// A reconciliation record: at some timestamp odometry reported `odometry_pose`, but the
/// fused estimate for that instant is `corrected_pose`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionCorrection {
    pub corrected_pose: Pose2d,
    pub odometry_pose: Pose2d,
}

impl VisionCorrection {
    /// Carries the correction forward: applies the odometry motion observed since the
    /// anchor on top of the corrected anchor pose.
    pub fn compensate(&self, pose: &Pose2d) -> Pose2d {
        self.corrected_pose + (*pose - self.odometry_pose)
    }
}

/// Time-ordered vision corrections.
///
/// After pruning, at most one entry is older than the oldest odometry sample still
/// buffered. Recording a correction discards every correction stamped at or after it.
#[derive(Debug, Clone, Default)]
pub struct VisionCorrectionHistory {
    corrections: BTreeMap<NotNan<f64>, VisionCorrection>,
}

impl VisionCorrectionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `correction` at `timestamp` and drops all later corrections.
    /// Returns how many were dropped, or `None` for a NaN timestamp.
    pub fn record(&mut self, timestamp: Timestamp, correction: VisionCorrection) -> Option<usize> {
        let key = NotNan::new(timestamp).ok()?;
        let superseded = self.corrections.split_off(&key);
        self.corrections.insert(key, correction);
        let dropped = superseded.keys().filter(|k| **k != key).count();
        Some(dropped)
    }

    /// Removes corrections that can no longer influence any sample at or after
    /// `oldest_needed`, keeping the newest one at or before it.
    pub fn prune(&mut self, oldest_needed: Timestamp) {
        let Some(anchor) = self.floor_key(oldest_needed) else {
            return;
        };
        self.corrections = self.corrections.split_off(&anchor);
    }

    /// The latest correction stamped at or before `timestamp`.
    pub fn at_or_before(&self, timestamp: Timestamp) -> Option<&VisionCorrection> {
        let key = self.floor_key(timestamp)?;
        self.corrections.get(&key)
    }

    pub fn latest(&self) -> Option<&VisionCorrection> {
        self.corrections.values().next_back()
    }

    pub fn oldest_timestamp(&self) -> Option<Timestamp> {
        self.corrections.keys().next().map(|k| k.into_inner())
    }

    fn floor_key(&self, timestamp: Timestamp) -> Option<NotNan<f64>> {
        let key = NotNan::new(timestamp).ok()?;
        self.corrections
            .range((Unbounded, Included(key)))
            .next_back()
            .map(|(k, _)| *k)
    }

    pub fn clear(&mut self) {
        self.corrections.clear();
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rotation2d;
    use approx::assert_abs_diff_eq;

    fn correction(offset: f64) -> VisionCorrection {
        VisionCorrection {
            corrected_pose: Pose2d::new(offset, 0.0, Rotation2d::identity()),
            odometry_pose: Pose2d::default(),
        }
    }

    #[test]
    fn compensate_applies_motion_since_the_anchor() {
        let c = VisionCorrection {
            corrected_pose: Pose2d::new(0.12, 0.0, Rotation2d::identity()),
            odometry_pose: Pose2d::new(0.1, 0.0, Rotation2d::identity()),
        };
        let later = c.compensate(&Pose2d::new(0.2, 0.0, Rotation2d::identity()));
        assert_abs_diff_eq!(later.x(), 0.22, epsilon = 1e-12);
    }

    #[test]
    fn compensate_respects_heading_differences() {
        // Vision says the robot is rotated a quarter turn relative to odometry, so
        // odometry's forward motion shows up along +y.
        let c = VisionCorrection {
            corrected_pose: Pose2d::new(0.0, 0.0, Rotation2d::from_degrees(90.0)),
            odometry_pose: Pose2d::default(),
        };
        let later = c.compensate(&Pose2d::new(1.0, 0.0, Rotation2d::identity()));
        assert_abs_diff_eq!(later.x(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(later.y(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn record_discards_later_corrections() {
        let mut history = VisionCorrectionHistory::new();
        history.record(1.0, correction(1.0));
        history.record(2.0, correction(2.0));
        history.record(3.0, correction(3.0));

        assert_eq!(history.record(1.5, correction(1.5)), Some(2));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest(), Some(&correction(1.5)));
    }

    #[test]
    fn record_replaces_same_timestamp() {
        let mut history = VisionCorrectionHistory::new();
        history.record(1.0, correction(1.0));
        assert_eq!(history.record(1.0, correction(5.0)), Some(0));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest(), Some(&correction(5.0)));
    }

    #[test]
    fn floor_lookup() {
        let mut history = VisionCorrectionHistory::new();
        history.record(1.0, correction(1.0));
        history.record(2.0, correction(2.0));
        assert!(history.at_or_before(0.5).is_none());
        assert_eq!(history.at_or_before(1.0), Some(&correction(1.0)));
        assert_eq!(history.at_or_before(1.9), Some(&correction(1.0)));
        assert_eq!(history.at_or_before(7.0), Some(&correction(2.0)));
    }

    #[test]
    fn prune_keeps_one_anchor_before_the_horizon() {
        let mut history = VisionCorrectionHistory::new();
        for t in [1.0, 2.0, 3.0, 4.0] {
            history.record(t, correction(t));
        }
        history.prune(3.5);
        assert_eq!(history.len(), 2);
        assert_abs_diff_eq!(history.oldest_timestamp().unwrap(), 3.0, epsilon = 1e-12);

        // Nothing at or before the horizon: nothing to prune.
        history.prune(0.0);
        assert_eq!(history.len(), 2);
    }
}
