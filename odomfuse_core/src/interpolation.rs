// odomfuse_core/src/interpolation.rs

//! Time-indexed sample history with bounded retention and interpolated lookup.

use ordered_float::NotNan;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};

use crate::geometry::{Pose2d, Rotation2d, Translation2d};
use crate::types::Timestamp;

/// Values that can be blended between two samples. `t = 0` yields `self`, `t = 1` yields `end`.
pub trait Interpolate: Clone {
    fn interpolate(&self, end: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(&self, end: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        self + (end - self) * t
    }
}

impl Interpolate for Translation2d {
    fn interpolate(&self, end: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        *self + (*end - *self) * t
    }
}

impl Interpolate for Rotation2d {
    fn interpolate(&self, end: &Self, t: f64) -> Self {
        Rotation2d::interpolate(self, end, t)
    }
}

impl Interpolate for Pose2d {
    fn interpolate(&self, end: &Self, t: f64) -> Self {
        Pose2d::interpolate(self, end, t)
    }
}

/// An ordered `timestamp -> sample` map that only keeps samples younger than
/// `history_seconds` relative to the newest insertion.
#[derive(Debug, Clone)]
pub struct TimeInterpolatableBuffer<T> {
    history_seconds: f64,
    samples: BTreeMap<NotNan<f64>, T>,
}

impl<T: Interpolate> TimeInterpolatableBuffer<T> {
    pub fn new(history_seconds: f64) -> Self {
        debug_assert!(history_seconds > 0.0, "history must be positive");
        Self {
            history_seconds,
            samples: BTreeMap::new(),
        }
    }

    pub fn history_seconds(&self) -> f64 {
        self.history_seconds
    }

    /// Records `sample` at `time` and evicts everything that fell out of the window
    /// measured from the newest stored timestamp. Returns `false` when the sample is
    /// refused: a NaN timestamp, or one already outside the window.
    pub fn add_sample(&mut self, time: Timestamp, sample: T) -> bool {
        let Ok(key) = NotNan::new(time) else {
            return false;
        };
        let newest = self.newest_timestamp().map_or(time, |newest| newest.max(time));
        if newest - time >= self.history_seconds {
            return false;
        }
        self.evict_older_than(newest);
        self.samples.insert(key, sample);
        true
    }

    fn evict_older_than(&mut self, time: Timestamp) {
        while let Some(entry) = self.samples.first_entry() {
            if time - entry.key().into_inner() >= self.history_seconds {
                entry.remove();
            } else {
                return;
            }
        }
    }

    /// Samples the history at `time`, interpolating between the two enclosing entries.
    /// Times outside the stored span return the nearest endpoint; an empty buffer
    /// returns `None`.
    pub fn sample(&self, time: Timestamp) -> Option<T> {
        let key = NotNan::new(time).ok()?;

        if let Some(exact) = self.samples.get(&key) {
            return Some(exact.clone());
        }

        let floor = self.samples.range((Unbounded, Included(key))).next_back();
        let ceiling = self.samples.range((Excluded(key), Unbounded)).next();

        match (floor, ceiling) {
            (None, None) => None,
            (Some((_, below)), None) => Some(below.clone()),
            (None, Some((_, above))) => Some(above.clone()),
            (Some((t0, below)), Some((t1, above))) => {
                let span = t1.into_inner() - t0.into_inner();
                let t = (time - t0.into_inner()) / span;
                Some(below.interpolate(above, t))
            }
        }
    }

    pub fn oldest_timestamp(&self) -> Option<Timestamp> {
        self.samples.keys().next().map(|k| k.into_inner())
    }

    pub fn newest_timestamp(&self) -> Option<Timestamp> {
        self.samples.keys().next_back().map(|k| k.into_inner())
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_buffer_has_no_samples() {
        let buffer = TimeInterpolatableBuffer::<f64>::new(1.0);
        assert!(buffer.sample(0.0).is_none());
        assert!(buffer.oldest_timestamp().is_none());
    }

    #[test]
    fn interpolates_between_neighbours() {
        let mut buffer = TimeInterpolatableBuffer::new(10.0);
        buffer.add_sample(1.0, 10.0);
        buffer.add_sample(2.0, 20.0);
        assert_abs_diff_eq!(buffer.sample(1.25).unwrap(), 12.5, epsilon = 1e-12);
        assert_abs_diff_eq!(buffer.sample(2.0).unwrap(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn clamps_outside_the_stored_span() {
        let mut buffer = TimeInterpolatableBuffer::new(10.0);
        buffer.add_sample(1.0, 10.0);
        buffer.add_sample(2.0, 20.0);
        assert_abs_diff_eq!(buffer.sample(0.0).unwrap(), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(buffer.sample(5.0).unwrap(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn evicts_samples_outside_the_window() {
        let mut buffer = TimeInterpolatableBuffer::new(1.5);
        for i in 0..100 {
            buffer.add_sample(i as f64 / 8.0, i as f64);
        }
        // A sample exactly 1.5 s older than the newest one is evicted.
        assert_eq!(buffer.len(), 12);
        assert_abs_diff_eq!(buffer.oldest_timestamp().unwrap(), 11.0, epsilon = 1e-12);
        assert_abs_diff_eq!(buffer.newest_timestamp().unwrap(), 12.375, epsilon = 1e-12);
    }

    #[test]
    fn late_samples_are_windowed_from_the_newest_entry() {
        let mut buffer = TimeInterpolatableBuffer::new(1.5);
        buffer.add_sample(0.0, 0.0);
        buffer.add_sample(1.0, 1.0);
        buffer.add_sample(3.0, 3.0);
        assert_eq!(buffer.len(), 1);

        // Older than the window behind t = 3.0.
        assert!(!buffer.add_sample(1.5, 1.5));
        assert_eq!(buffer.len(), 1);
        assert_abs_diff_eq!(buffer.oldest_timestamp().unwrap(), 3.0, epsilon = 1e-12);

        // Out of order but still inside the window.
        assert!(buffer.add_sample(2.0, 2.0));
        assert_eq!(buffer.len(), 2);
        assert_abs_diff_eq!(buffer.newest_timestamp().unwrap(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(buffer.sample(2.5).unwrap(), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn refuses_nan_timestamps() {
        let mut buffer = TimeInterpolatableBuffer::new(1.0);
        assert!(!buffer.add_sample(f64::NAN, 1.0));
        assert!(buffer.is_empty());
        assert!(buffer.sample(f64::NAN).is_none());
    }
}
