// odomfuse_core/src/estimation/shared.rs

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use super::{PoseFusion, VisionUpdate};
use crate::geometry::Pose2d;
use crate::types::Timestamp;

/// A cloneable handle for driving one estimator from several threads, typically the
/// control loop calling `update` and a perception thread adding vision measurements.
///
/// Every call holds the lock for its whole duration, so a reset is never observed
/// half-applied.
#[derive(Debug)]
pub struct SharedEstimator<E> {
    inner: Arc<Mutex<E>>,
}

impl<E> Clone for SharedEstimator<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: PoseFusion> SharedEstimator<E> {
    pub fn new(estimator: E) -> Self {
        Self {
            inner: Arc::new(Mutex::new(estimator)),
        }
    }

    /// Locks the estimator for a sequence of calls that must not interleave with others.
    pub fn lock(&self) -> MutexGuard<'_, E> {
        self.inner.lock()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn estimated_pose(&self) -> Pose2d {
        self.inner.lock().estimated_pose()
    }

    pub fn sample_at(&self, timestamp: Timestamp) -> Option<Pose2d> {
        self.inner.lock().sample_at(timestamp)
    }

    pub fn add_vision_measurement(
        &self,
        vision_pose: Pose2d,
        timestamp: Timestamp,
    ) -> VisionUpdate {
        self.inner.lock().add_vision_measurement(vision_pose, timestamp)
    }

    pub fn reset_pose(&self, pose: Pose2d) {
        self.inner.lock().reset_pose(pose);
    }
}
