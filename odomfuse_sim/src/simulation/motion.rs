// odomfuse_sim/src/simulation/motion.rs

use odomfuse_core::geometry::{ChassisSpeeds, Rotation2d};

use super::config::{Motion, Segment};

/// Piecewise-constant velocity commands laid end to end.
#[derive(Debug, Clone)]
pub struct MotionSchedule {
    segments: Vec<Segment>,
}

impl MotionSchedule {
    pub fn new(motion: &Motion) -> Self {
        Self {
            segments: motion.segments.clone(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// The segment active at `time`, or `None` once the schedule has run out.
    pub fn segment_at(&self, time: f64) -> Option<&Segment> {
        let mut start = 0.0;
        for segment in &self.segments {
            let end = start + segment.duration;
            if time >= start && time < end {
                return Some(segment);
            }
            start = end;
        }
        None
    }

    /// Robot-relative speeds to hold over `[time, time + dt)`.
    ///
    /// Field-relative segments are rotated into the robot frame at `heading` and
    /// discretized, so the robot translates in a straight line across the tick even
    /// while turning.
    pub fn commanded_speeds(&self, time: f64, heading: &Rotation2d, dt: f64) -> ChassisSpeeds {
        let Some(segment) = self.segment_at(time) else {
            return ChassisSpeeds::default();
        };
        let speeds = ChassisSpeeds::new(segment.vx, segment.vy, segment.omega);
        if segment.field_relative {
            ChassisSpeeds::from_field_relative(&speeds, heading).discretize(dt)
        } else {
            speeds
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use odomfuse_core::geometry::Pose2d;

    fn segment(duration: f64, vx: f64, omega: f64, field_relative: bool) -> Segment {
        Segment {
            duration,
            vx,
            vy: 0.0,
            omega,
            field_relative,
        }
    }

    #[test]
    fn looks_up_segments_by_time() {
        let schedule = MotionSchedule::new(&Motion {
            segments: vec![segment(1.0, 1.0, 0.0, false), segment(0.5, 2.0, 0.0, false)],
            max_wheel_speed: None,
        });
        assert_eq!(schedule.duration(), 1.5);
        assert_eq!(schedule.segment_at(0.0).map(|s| s.vx), Some(1.0));
        assert_eq!(schedule.segment_at(1.2).map(|s| s.vx), Some(2.0));
        assert!(schedule.segment_at(1.5).is_none());
        let idle = schedule.commanded_speeds(3.0, &Rotation2d::identity(), 0.02);
        assert_eq!(idle, ChassisSpeeds::default());
    }

    #[test]
    fn field_relative_segment_holds_a_straight_line_while_spinning() {
        let schedule = MotionSchedule::new(&Motion {
            segments: vec![segment(1.0, 1.0, 2.0, true)],
            max_wheel_speed: None,
        });
        let dt = 0.01;
        let mut pose = Pose2d::default();
        for i in 0..100 {
            let speeds = schedule.commanded_speeds(f64::from(i) * dt, &pose.rotation, dt);
            pose = pose.exp(&speeds.to_twist(dt));
        }
        assert_abs_diff_eq!(pose.x(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pose.y(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pose.rotation.radians(), 2.0, epsilon = 1e-6);
    }
}
