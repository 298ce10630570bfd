// odomfuse_core/src/geometry/pose.rs

use std::ops::{Add, Sub};

use super::{Rotation2d, Translation2d, Twist2d};

// Below this angle the closed-form exp/log terms are replaced by their Taylor series.
const SMALL_ANGLE: f64 = 1e-9;

/// A rigid planar transform: an offset expressed in the frame of the pose it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform2d {
    pub translation: Translation2d,
    pub rotation: Rotation2d,
}

impl Transform2d {
    pub fn new(translation: Translation2d, rotation: Rotation2d) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// The transform that takes `initial` to `last`.
    pub fn between(initial: &Pose2d, last: &Pose2d) -> Self {
        Self {
            translation: (last.translation - initial.translation)
                .rotate_by(&initial.rotation.inverse()),
            rotation: last.rotation - initial.rotation,
        }
    }

    pub fn inverse(&self) -> Self {
        let inverse_rotation = self.rotation.inverse();
        Self {
            translation: (-self.translation).rotate_by(&inverse_rotation),
            rotation: inverse_rotation,
        }
    }
}

/// Robot position and heading on the field plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2d {
    pub translation: Translation2d,
    pub rotation: Rotation2d,
}

impl Pose2d {
    pub fn new(x: f64, y: f64, heading: Rotation2d) -> Self {
        Self::from_parts(Translation2d::new(x, y), heading)
    }

    pub fn from_parts(translation: Translation2d, rotation: Rotation2d) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn x(&self) -> f64 {
        self.translation.x()
    }

    pub fn y(&self) -> f64 {
        self.translation.y()
    }

    /// Applies `transform` in this pose's local frame.
    pub fn transform_by(&self, transform: &Transform2d) -> Pose2d {
        Pose2d {
            translation: self.translation + transform.translation.rotate_by(&self.rotation),
            rotation: transform.rotation + self.rotation,
        }
    }

    /// Expresses this pose in the frame of `other`.
    pub fn relative_to(&self, other: &Pose2d) -> Pose2d {
        let transform = Transform2d::between(other, self);
        Pose2d::from_parts(transform.translation, transform.rotation)
    }

    /// Exponential map: follows the constant-curvature arc described by a local-frame
    /// `twist` starting at this pose.
    pub fn exp(&self, twist: &Twist2d) -> Pose2d {
        let (sin_theta, cos_theta) = twist.dtheta.sin_cos();

        let (s, c) = if twist.dtheta.abs() < SMALL_ANGLE {
            (
                1.0 - twist.dtheta * twist.dtheta / 6.0,
                0.5 * twist.dtheta,
            )
        } else {
            (
                sin_theta / twist.dtheta,
                (1.0 - cos_theta) / twist.dtheta,
            )
        };

        let transform = Transform2d::new(
            Translation2d::new(
                twist.dx * s - twist.dy * c,
                twist.dx * c + twist.dy * s,
            ),
            Rotation2d::from_cos_sin(cos_theta, sin_theta),
        );

        self.transform_by(&transform)
    }

    /// Logarithm map: the local-frame twist that `exp` would need to reach `end`.
    pub fn log(&self, end: &Pose2d) -> Twist2d {
        let transform = end.relative_to(self);
        let dtheta = transform.rotation.radians();
        let half_dtheta = dtheta / 2.0;

        let cos_minus_one = transform.rotation.cos() - 1.0;
        let half_theta_by_tan_of_half_dtheta = if cos_minus_one.abs() < SMALL_ANGLE {
            1.0 - dtheta * dtheta / 12.0
        } else {
            -(half_dtheta * transform.rotation.sin()) / cos_minus_one
        };

        let translation_part = transform.translation.rotate_by(&Rotation2d::from_cos_sin(
            half_theta_by_tan_of_half_dtheta,
            -half_dtheta,
        )) * half_theta_by_tan_of_half_dtheta.hypot(half_dtheta);

        Twist2d::new(translation_part.x(), translation_part.y(), dtheta)
    }

    /// Interpolates along the twist between the two poses, so heading and
    /// position move together on an arc. `t` outside `[0, 1]` returns an endpoint.
    pub fn interpolate(&self, end: &Pose2d, t: f64) -> Pose2d {
        if t <= 0.0 {
            *self
        } else if t >= 1.0 {
            *end
        } else {
            self.exp(&self.log(end).scale(t))
        }
    }
}

impl Add<Transform2d> for Pose2d {
    type Output = Pose2d;

    fn add(self, rhs: Transform2d) -> Pose2d {
        self.transform_by(&rhs)
    }
}

/// `a - b` is the transform that takes `b` to `a`, so `b + (a - b) == a`.
impl Sub for Pose2d {
    type Output = Transform2d;

    fn sub(self, rhs: Pose2d) -> Transform2d {
        Transform2d::between(&rhs, &self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn assert_pose_eq(actual: &Pose2d, expected: &Pose2d) {
        assert_abs_diff_eq!(actual.x(), expected.x(), epsilon = 1e-9);
        assert_abs_diff_eq!(actual.y(), expected.y(), epsilon = 1e-9);
        assert_abs_diff_eq!(
            (actual.rotation - expected.rotation).radians(),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn exp_follows_a_quarter_circle() {
        let end = Pose2d::default().exp(&Twist2d::new(FRAC_PI_2, 0.0, FRAC_PI_2));
        assert_pose_eq(&end, &Pose2d::new(1.0, 1.0, Rotation2d::from_degrees(90.0)));
    }

    #[test]
    fn exp_straight_line_is_in_the_local_frame() {
        let start = Pose2d::new(1.0, 2.0, Rotation2d::from_degrees(90.0));
        let end = start.exp(&Twist2d::new(0.5, 0.0, 0.0));
        assert_pose_eq(&end, &Pose2d::new(1.0, 2.5, Rotation2d::from_degrees(90.0)));
    }

    #[test]
    fn log_inverts_exp() {
        let start = Pose2d::new(-0.3, 0.7, Rotation2d::from_degrees(-35.0));
        let twist = Twist2d::new(0.4, -0.2, 0.9);
        let recovered = start.log(&start.exp(&twist));
        assert_abs_diff_eq!(recovered.dx, twist.dx, epsilon = 1e-9);
        assert_abs_diff_eq!(recovered.dy, twist.dy, epsilon = 1e-9);
        assert_abs_diff_eq!(recovered.dtheta, twist.dtheta, epsilon = 1e-9);
    }

    #[test]
    fn minus_then_plus_round_trips() {
        let a = Pose2d::new(2.0, -1.0, Rotation2d::from_degrees(120.0));
        let b = Pose2d::new(0.5, 0.25, Rotation2d::from_degrees(-10.0));
        assert_pose_eq(&(b + (a - b)), &a);
    }

    #[test]
    fn relative_to_expresses_in_local_frame() {
        let origin = Pose2d::new(1.0, 1.0, Rotation2d::from_degrees(90.0));
        let target = Pose2d::new(1.0, 3.0, Rotation2d::from_degrees(90.0));
        let expected = Pose2d::new(2.0, 0.0, Rotation2d::identity());
        assert_pose_eq(&target.relative_to(&origin), &expected);
    }

    #[test]
    fn interpolate_endpoints_and_midpoint() {
        let a = Pose2d::default();
        let b = Pose2d::new(2.0, 0.0, Rotation2d::identity());
        assert_pose_eq(&a.interpolate(&b, -0.5), &a);
        assert_pose_eq(&a.interpolate(&b, 1.5), &b);
        assert_pose_eq(&a.interpolate(&b, 0.25), &Pose2d::new(0.5, 0.0, Rotation2d::identity()));
    }

    #[test]
    fn transform_inverse_undoes_transform() {
        let pose = Pose2d::new(0.2, 0.1, Rotation2d::from_degrees(30.0));
        let transform =
            Transform2d::new(Translation2d::new(1.0, -2.0), Rotation2d::from_degrees(45.0));
        assert_pose_eq(&(pose + transform + transform.inverse()), &pose);
    }
}
