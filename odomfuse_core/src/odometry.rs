// odomfuse_core/src/odometry.rs

//! Dead-reckoning pose integration from wheel and gyro readings.

use crate::error::KinematicsError;
use crate::geometry::{Pose2d, Rotation2d, Translation2d, Twist2d};
use crate::kinematics::{DeadwheelKinematics, DeadwheelPositions, Kinematics, OmniWheelKinematics};

/// Integrates wheel motion into a field pose, one reading at a time.
///
/// Heading always comes from the gyro. The twist produced by the kinematics is used
/// for translation, with its rotation component replaced by the gyro delta so that the
/// arc followed by `Pose2d::exp` matches the measured turn.
///
/// There is no time dimension here: each update reports where the robot is after the
/// motion implied by the newest reading.
#[derive(Debug, Clone)]
pub struct Odometry<K: Kinematics> {
    kinematics: K,
    pose: Pose2d,
    /// Added to raw gyro readings to get the field heading.
    gyro_offset: Rotation2d,
    previous_angle: Rotation2d,
    previous_positions: K::Positions,
}

pub type DeadwheelOdometry = Odometry<DeadwheelKinematics>;
pub type OmniWheelOdometry = Odometry<OmniWheelKinematics>;

impl<K: Kinematics> Odometry<K> {
    /// Starts integrating at `initial_pose` given the current raw sensor readings.
    pub fn new(
        kinematics: K,
        gyro_angle: Rotation2d,
        wheel_positions: K::Positions,
        initial_pose: Pose2d,
    ) -> Self {
        Self {
            kinematics,
            pose: initial_pose,
            gyro_offset: initial_pose.rotation - gyro_angle,
            previous_angle: initial_pose.rotation,
            previous_positions: wheel_positions,
        }
    }

    /// Integrates the motion since the previous reading and returns the new pose.
    ///
    /// On error (mismatched wheel count) the odometry state is left untouched.
    pub fn update(
        &mut self,
        gyro_angle: Rotation2d,
        wheel_positions: &K::Positions,
    ) -> Result<Pose2d, KinematicsError> {
        let twist = self
            .kinematics
            .to_twist(&self.previous_positions, wheel_positions)?;
        Ok(self.integrate(gyro_angle, wheel_positions.clone(), twist))
    }

    fn integrate(
        &mut self,
        gyro_angle: Rotation2d,
        wheel_positions: K::Positions,
        mut twist: Twist2d,
    ) -> Pose2d {
        let angle = gyro_angle + self.gyro_offset;
        twist.dtheta = (angle - self.previous_angle).radians();

        let new_pose = self.pose.exp(&twist);

        self.previous_positions = wheel_positions;
        self.previous_angle = angle;
        self.pose = Pose2d::from_parts(new_pose.translation, angle);
        self.pose
    }

    /// Re-anchors odometry at `pose` given fresh raw sensor readings.
    pub fn reset_position(
        &mut self,
        gyro_angle: Rotation2d,
        wheel_positions: K::Positions,
        pose: Pose2d,
    ) {
        self.pose = pose;
        self.previous_angle = pose.rotation;
        self.gyro_offset = pose.rotation - gyro_angle;
        self.previous_positions = wheel_positions;
    }

    /// Teleports to `pose` while keeping the current sensor baselines.
    pub fn reset_pose(&mut self, pose: Pose2d) {
        self.gyro_offset = self.gyro_offset + (pose.rotation - self.pose.rotation);
        self.pose = pose;
        self.previous_angle = pose.rotation;
    }

    pub fn reset_translation(&mut self, translation: Translation2d) {
        self.pose = Pose2d::from_parts(translation, self.pose.rotation);
    }

    pub fn reset_rotation(&mut self, rotation: Rotation2d) {
        self.gyro_offset = self.gyro_offset + (rotation - self.pose.rotation);
        self.pose = Pose2d::from_parts(self.pose.translation, rotation);
        self.previous_angle = rotation;
    }

    pub fn pose(&self) -> Pose2d {
        self.pose
    }

    pub fn kinematics(&self) -> &K {
        &self.kinematics
    }

    pub fn kinematics_mut(&mut self) -> &mut K {
        &mut self.kinematics
    }
}

impl Odometry<DeadwheelKinematics> {
    /// Convenience for the two-deadwheel drivetrain, whose gyro is part of the reading.
    /// Infallible, since the deadwheel mapping has no shape to mismatch.
    pub fn update_deadwheels(&mut self, x: f64, y: f64, yaw: Rotation2d) -> Pose2d {
        let positions = DeadwheelPositions::new(x, y, yaw);
        let twist = DeadwheelKinematics::twist_between(&self.previous_positions, &positions);
        self.integrate(yaw, positions, twist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ChassisSpeeds, Transform2d};
    use crate::kinematics::OmniWheelPositions;
    use approx::assert_abs_diff_eq;

    #[test]
    fn straight_line_deadwheel_motion() {
        let mut odometry = DeadwheelOdometry::new(
            DeadwheelKinematics::new(),
            Rotation2d::identity(),
            DeadwheelPositions::default(),
            Pose2d::default(),
        );
        let pose = odometry.update_deadwheels(0.1, 0.0, Rotation2d::identity());
        assert_abs_diff_eq!(pose.x(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.y(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn heading_comes_from_the_gyro_with_offset() {
        // Robot placed at 90 degrees on the field while its gyro reads 10 degrees.
        let mut odometry = DeadwheelOdometry::new(
            DeadwheelKinematics::new(),
            Rotation2d::from_degrees(10.0),
            DeadwheelPositions::new(0.0, 0.0, Rotation2d::from_degrees(10.0)),
            Pose2d::new(1.0, 1.0, Rotation2d::from_degrees(90.0)),
        );
        let pose = odometry.update_deadwheels(0.5, 0.0, Rotation2d::from_degrees(10.0));
        // Driving forward at a field heading of 90 degrees moves along +y.
        assert_abs_diff_eq!(pose.x(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.y(), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.rotation.degrees(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn generic_update_matches_the_deadwheel_shortcut() {
        let start = DeadwheelPositions::default();
        let mut generic = DeadwheelOdometry::new(
            DeadwheelKinematics::new(),
            Rotation2d::identity(),
            start,
            Pose2d::default(),
        );
        let mut shortcut = generic.clone();

        let yaw = Rotation2d::from_degrees(30.0);
        let a = generic
            .update(yaw, &DeadwheelPositions::new(0.3, 0.1, yaw))
            .unwrap();
        let b = shortcut.update_deadwheels(0.3, 0.1, yaw);
        assert_eq!(a, b);
    }

    #[test]
    fn omni_odometry_integrates_an_arc() {
        let mounts = vec![
            Transform2d::new(Translation2d::new(0.0, 0.15), Rotation2d::identity()),
            Transform2d::new(Translation2d::new(0.0, -0.15), Rotation2d::identity()),
            Transform2d::new(Translation2d::new(0.15, 0.0), Rotation2d::from_degrees(90.0)),
            Transform2d::new(Translation2d::new(-0.15, 0.0), Rotation2d::from_degrees(90.0)),
        ];
        let kinematics = OmniWheelKinematics::new(mounts).unwrap();
        let mut odometry = OmniWheelOdometry::new(
            kinematics.clone(),
            Rotation2d::identity(),
            OmniWheelPositions::zeros(4),
            Pose2d::default(),
        );

        // A quarter circle of radius 1 m in a single step.
        let dtheta = std::f64::consts::FRAC_PI_2;
        let deltas = kinematics.to_wheel_speeds(&ChassisSpeeds::new(dtheta, 0.0, dtheta));
        let positions = OmniWheelPositions::new(deltas.as_slice().to_vec());
        let pose = odometry
            .update(Rotation2d::from_radians(dtheta), &positions)
            .unwrap();

        assert_abs_diff_eq!(pose.x(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.y(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.rotation.degrees(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn failed_update_leaves_state_alone() {
        let mounts = vec![
            Transform2d::new(Translation2d::new(0.0, 0.15), Rotation2d::identity()),
            Transform2d::new(Translation2d::new(0.15, 0.0), Rotation2d::from_degrees(90.0)),
            Transform2d::new(Translation2d::new(-0.15, 0.0), Rotation2d::from_degrees(90.0)),
        ];
        let mut odometry = OmniWheelOdometry::new(
            OmniWheelKinematics::new(mounts).unwrap(),
            Rotation2d::identity(),
            OmniWheelPositions::zeros(3),
            Pose2d::default(),
        );
        assert!(odometry
            .update(Rotation2d::identity(), &OmniWheelPositions::zeros(2))
            .is_err());
        assert_eq!(odometry.pose(), Pose2d::default());
    }

    #[test]
    fn reset_rotation_keeps_following_the_gyro() {
        let mut odometry = DeadwheelOdometry::new(
            DeadwheelKinematics::new(),
            Rotation2d::identity(),
            DeadwheelPositions::default(),
            Pose2d::default(),
        );
        odometry.reset_rotation(Rotation2d::from_degrees(180.0));
        let pose = odometry.update_deadwheels(1.0, 0.0, Rotation2d::identity());
        assert_abs_diff_eq!(pose.x(), -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.rotation.degrees().abs(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn reset_translation_keeps_heading() {
        let mut odometry = DeadwheelOdometry::new(
            DeadwheelKinematics::new(),
            Rotation2d::from_degrees(45.0),
            DeadwheelPositions::default(),
            Pose2d::new(0.0, 0.0, Rotation2d::from_degrees(45.0)),
        );
        odometry.reset_translation(Translation2d::new(3.0, -2.0));
        assert_eq!(odometry.pose().translation, Translation2d::new(3.0, -2.0));
        assert_abs_diff_eq!(odometry.pose().rotation.degrees(), 45.0, epsilon = 1e-9);
    }
}
