// odomfuse_core/src/kinematics/omni.rs

use nalgebra::{DMatrix, DVector};

use super::{Kinematics, WheelPositions};
use crate::error::KinematicsError;
use crate::geometry::{ChassisSpeeds, Transform2d, Translation2d, Twist2d};
use crate::interpolation::Interpolate;

// Wheels closer than this to the center of rotation cannot observe rotation.
const MIN_WHEEL_RADIUS: f64 = 1e-9;
// Singular values below this are treated as zero for rank and pseudoinverse.
const SINGULAR_VALUE_EPS: f64 = 1e-9;

/// An array of independently driven or tracked omni wheels with arbitrary placement.
///
/// Each wheel is described by a [`Transform2d`] in the robot frame: the translation is
/// where the wheel touches the ground, the rotation is the direction in which it rolls.
///
/// The inverse kinematics matrix `M` (N x 3) maps chassis motion `[vx, vy, omega]` to
/// wheel motion. Row `i` is
///
/// ```text
/// [ cos(heading_i), sin(heading_i), radius_i * sin(heading_i - position_angle_i) ]
/// ```
///
/// The forward matrix is the Moore-Penrose pseudoinverse of `M`. With more than three
/// wheels that is a least-squares fit: it minimizes the wheel-space residual rather than
/// reproducing noisy readings exactly.
#[derive(Debug, Clone)]
pub struct OmniWheelKinematics {
    wheel_mounts: Vec<Transform2d>,
    /// Inverse kinematics about the robot center.
    inverse_kinematics: DMatrix<f64>,
    /// Pseudoinverse of `inverse_kinematics`.
    forward_kinematics: DMatrix<f64>,
    // Cached inverse kinematics for the last requested center of rotation.
    center_of_rotation: Translation2d,
    shifted_inverse_kinematics: DMatrix<f64>,
}

impl OmniWheelKinematics {
    /// Builds the kinematics for the given wheel layout.
    ///
    /// Fails for fewer than three wheels, for a wheel placed on the robot center, and for
    /// layouts that cannot observe all three chassis degrees of freedom (for example every
    /// wheel rolling in the same direction).
    pub fn new(wheel_mounts: Vec<Transform2d>) -> Result<Self, KinematicsError> {
        match wheel_mounts.len() {
            0 => return Err(KinematicsError::NoWheels),
            count @ 1..=2 => return Err(KinematicsError::TooFewWheels { count }),
            _ => {}
        }

        let inverse_kinematics = build_inverse_kinematics(&wheel_mounts, &Translation2d::zero())?;

        let rank = inverse_kinematics
            .clone()
            .svd(false, false)
            .rank(SINGULAR_VALUE_EPS);
        if rank < 3 {
            return Err(KinematicsError::RankDeficient { rank });
        }

        let forward_kinematics = inverse_kinematics
            .clone()
            .pseudo_inverse(SINGULAR_VALUE_EPS)
            .map_err(|_| KinematicsError::RankDeficient { rank })?;

        Ok(Self {
            shifted_inverse_kinematics: inverse_kinematics.clone(),
            center_of_rotation: Translation2d::zero(),
            wheel_mounts,
            inverse_kinematics,
            forward_kinematics,
        })
    }

    pub fn wheel_count(&self) -> usize {
        self.wheel_mounts.len()
    }

    pub fn wheel_mounts(&self) -> &[Transform2d] {
        &self.wheel_mounts
    }

    pub fn inverse_kinematics(&self) -> &DMatrix<f64> {
        &self.inverse_kinematics
    }

    pub fn forward_kinematics(&self) -> &DMatrix<f64> {
        &self.forward_kinematics
    }

    fn check_count(&self, actual: usize) -> Result<(), KinematicsError> {
        let expected = self.wheel_count();
        if actual == expected {
            Ok(())
        } else {
            Err(KinematicsError::WheelCountMismatch { expected, actual })
        }
    }

    fn solve_forward(&self, wheel_values: &[f64]) -> [f64; 3] {
        let wheels = DVector::from_column_slice(wheel_values);
        let chassis = &self.forward_kinematics * wheels;
        [chassis[0], chassis[1], chassis[2]]
    }
}

fn build_inverse_kinematics(
    wheel_mounts: &[Transform2d],
    center_of_rotation: &Translation2d,
) -> Result<DMatrix<f64>, KinematicsError> {
    let mut matrix = DMatrix::zeros(wheel_mounts.len(), 3);

    for (index, mount) in wheel_mounts.iter().enumerate() {
        let offset = mount.translation - *center_of_rotation;
        let radius = offset.norm();
        if radius < MIN_WHEEL_RADIUS {
            return Err(KinematicsError::WheelAtCenterOfRotation { index });
        }

        let heading = mount.rotation;
        matrix[(index, 0)] = heading.cos();
        matrix[(index, 1)] = heading.sin();
        matrix[(index, 2)] = radius * (heading - offset.angle()).sin();
    }

    Ok(matrix)
}

impl Kinematics for OmniWheelKinematics {
    type Positions = OmniWheelPositions;
    type Speeds = OmniWheelSpeeds;

    fn to_twist(
        &self,
        start: &OmniWheelPositions,
        end: &OmniWheelPositions,
    ) -> Result<Twist2d, KinematicsError> {
        self.check_count(start.len())?;
        self.check_count(end.len())?;

        let [dx, dy, dtheta] = self.solve_forward(end.minus(start).as_slice());
        Ok(Twist2d::new(dx, dy, dtheta))
    }

    fn to_chassis_speeds(
        &self,
        wheel_speeds: &OmniWheelSpeeds,
    ) -> Result<ChassisSpeeds, KinematicsError> {
        self.check_count(wheel_speeds.len())?;

        let [vx, vy, omega] = self.solve_forward(wheel_speeds.as_slice());
        Ok(ChassisSpeeds::new(vx, vy, omega))
    }

    fn to_wheel_speeds(&self, chassis_speeds: &ChassisSpeeds) -> OmniWheelSpeeds {
        apply_inverse(&self.inverse_kinematics, chassis_speeds)
    }

    /// Rebuilds the cached matrix only when `center_of_rotation` differs from the
    /// previous call. A center that coincides with a wheel is rejected and leaves the
    /// cache untouched.
    fn to_wheel_speeds_about(
        &mut self,
        chassis_speeds: &ChassisSpeeds,
        center_of_rotation: &Translation2d,
    ) -> Result<OmniWheelSpeeds, KinematicsError> {
        if *center_of_rotation != self.center_of_rotation {
            self.shifted_inverse_kinematics =
                build_inverse_kinematics(&self.wheel_mounts, center_of_rotation)?;
            self.center_of_rotation = *center_of_rotation;
        }
        Ok(apply_inverse(&self.shifted_inverse_kinematics, chassis_speeds))
    }
}

fn apply_inverse(inverse: &DMatrix<f64>, chassis_speeds: &ChassisSpeeds) -> OmniWheelSpeeds {
    let chassis = DVector::from_column_slice(chassis_speeds.to_vector().as_slice());
    let wheels = inverse * chassis;
    OmniWheelSpeeds::new(wheels.iter().copied().collect())
}

// =========================================================================
// == Wheel-space values ==
// =========================================================================

/// Cumulative distance rolled by each omni wheel, in meters, in mount order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OmniWheelPositions(Vec<f64>);

impl OmniWheelPositions {
    pub fn new(positions: Vec<f64>) -> Self {
        Self(positions)
    }

    pub fn zeros(wheel_count: usize) -> Self {
        Self(vec![0.0; wheel_count])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn plus(&self, other: &Self) -> Self {
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a + b).collect())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Self(self.0.iter().map(|p| p * scalar).collect())
    }
}

impl WheelPositions for OmniWheelPositions {
    fn minus(&self, other: &Self) -> Self {
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a - b).collect())
    }
}

impl Interpolate for OmniWheelPositions {
    fn interpolate(&self, end: &Self, t: f64) -> Self {
        Self(
            self.0
                .iter()
                .zip(&end.0)
                .map(|(a, b)| a.interpolate(b, t))
                .collect(),
        )
    }
}

/// Surface speed of each omni wheel, in m/s, in mount order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OmniWheelSpeeds(Vec<f64>);

impl OmniWheelSpeeds {
    pub fn new(speeds: Vec<f64>) -> Self {
        Self(speeds)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn plus(&self, other: &Self) -> Self {
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a + b).collect())
    }

    pub fn minus(&self, other: &Self) -> Self {
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a - b).collect())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Self(self.0.iter().map(|s| s * scalar).collect())
    }

    /// Scales every wheel down by the same factor so the fastest one runs at
    /// `max_speed`. Keeps the commanded direction of motion.
    pub fn desaturate(&self, max_speed: f64) -> Self {
        let highest = self.0.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
        if highest > max_speed {
            self.scale(max_speed / highest)
        } else {
            self.clone()
        }
    }
}
