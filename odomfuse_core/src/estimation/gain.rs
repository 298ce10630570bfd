// odomfuse_core/src/estimation/gain.rs

use nalgebra::Vector3;

use crate::error::GainError;
use crate::geometry::Twist2d;
use crate::types::{GainMatrix, StdDevs, DEFAULT_ODOMETRY_STD_DEVS, DEFAULT_VISION_STD_DEVS};

/// Per-axis trust placed in vision relative to odometry.
///
/// Each axis is treated as an independent continuous filter with identity dynamics and
/// identity observation. Its steady-state gain has the closed form
///
/// ```text
/// k = q / (q + sqrt(q * r))        q = odometry variance, r = vision variance
/// ```
///
/// with `k = 0` when `q == 0`. The result is a diagonal matrix, recomputed only when the
/// vision standard deviations change.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionGain {
    odometry_variances: Vector3<f64>,
    gain: GainMatrix,
}

impl VisionGain {
    /// Fails if any odometry standard deviation is negative, NaN or infinite, or any vision
    /// standard deviation is negative or NaN. An infinite vision standard deviation is
    /// allowed and disables vision on that axis.
    pub fn new(odometry_std_devs: &StdDevs, vision_std_devs: &StdDevs) -> Result<Self, GainError> {
        validate("odometry", odometry_std_devs, false)?;
        validate("vision", vision_std_devs, true)?;
        Ok(Self::from_valid(odometry_std_devs, vision_std_devs))
    }

    fn from_valid(odometry_std_devs: &StdDevs, vision_std_devs: &StdDevs) -> Self {
        let odometry_variances = odometry_std_devs.component_mul(odometry_std_devs);
        let gain = closed_form_gain(&odometry_variances, vision_std_devs);
        Self {
            odometry_variances,
            gain,
        }
    }

    /// Replaces the vision standard deviations. On error the previous gain is kept.
    pub fn set_vision_std_devs(&mut self, vision_std_devs: &StdDevs) -> Result<(), GainError> {
        validate("vision", vision_std_devs, true)?;
        self.gain = closed_form_gain(&self.odometry_variances, vision_std_devs);
        Ok(())
    }

    pub fn matrix(&self) -> &GainMatrix {
        &self.gain
    }

    /// Scales each component of `twist` by its axis gain.
    pub fn apply(&self, twist: &Twist2d) -> Twist2d {
        Twist2d::from_vector(&(self.gain * twist.to_vector()))
    }
}

impl Default for VisionGain {
    fn default() -> Self {
        Self::from_valid(
            &StdDevs::from(DEFAULT_ODOMETRY_STD_DEVS),
            &StdDevs::from(DEFAULT_VISION_STD_DEVS),
        )
    }
}

fn validate(
    source_name: &'static str,
    std_devs: &StdDevs,
    allow_infinite: bool,
) -> Result<(), GainError> {
    for (axis, &value) in std_devs.iter().enumerate() {
        let finite_enough = allow_infinite || value.is_finite();
        if value.is_nan() || value < 0.0 || !finite_enough {
            return Err(GainError::InvalidStdDev {
                source_name,
                axis,
                value,
            });
        }
    }
    Ok(())
}

fn closed_form_gain(odometry_variances: &Vector3<f64>, vision_std_devs: &StdDevs) -> GainMatrix {
    let vision_variances = vision_std_devs.component_mul(vision_std_devs);
    let diagonal = odometry_variances.zip_map(&vision_variances, |q, r| {
        if q == 0.0 {
            0.0
        } else {
            q / (q + (q * r).sqrt())
        }
    });
    GainMatrix::from_diagonal(&diagonal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_gain_trusts_vision_a_little() {
        let gain = VisionGain::default();
        for axis in 0..3 {
            assert_abs_diff_eq!(gain.matrix()[(axis, axis)], 1.0 / 11.0, epsilon = 1e-12);
        }
        assert_eq!(gain.matrix()[(0, 1)], 0.0);
    }

    #[test]
    fn perfect_vision_gives_full_gain() {
        let gain = VisionGain::new(&StdDevs::new(0.01, 0.02, 0.03), &StdDevs::zeros()).unwrap();
        assert_eq!(*gain.matrix(), GainMatrix::identity());
    }

    #[test]
    fn perfect_odometry_never_trusts_vision() {
        let gain = VisionGain::new(&StdDevs::new(0.0, 0.01, 0.01), &StdDevs::zeros()).unwrap();
        assert_eq!(gain.matrix()[(0, 0)], 0.0);
        assert_eq!(gain.matrix()[(1, 1)], 1.0);
    }

    #[test]
    fn infinite_vision_noise_disables_the_axis() {
        let mut gain = VisionGain::default();
        gain.set_vision_std_devs(&StdDevs::new(f64::INFINITY, 0.1, f64::INFINITY))
            .unwrap();
        assert_eq!(gain.matrix()[(0, 0)], 0.0);
        assert!(gain.matrix()[(1, 1)] > 0.0);
        assert_eq!(gain.matrix()[(2, 2)], 0.0);
    }

    #[test]
    fn rejects_nan_and_negative_values() {
        let err = VisionGain::new(&StdDevs::new(0.01, f64::NAN, 0.01), &StdDevs::zeros())
            .unwrap_err();
        assert!(matches!(err, GainError::InvalidStdDev { source_name: "odometry", axis: 1, .. }));

        let mut gain = VisionGain::default();
        let before = gain.clone();
        assert!(gain.set_vision_std_devs(&StdDevs::new(0.1, 0.1, -1.0)).is_err());
        assert_eq!(gain, before);

        assert!(VisionGain::new(&StdDevs::repeat(f64::INFINITY), &StdDevs::zeros()).is_err());
    }

    #[test]
    fn apply_scales_per_axis() {
        let gain = VisionGain::new(&StdDevs::new(0.0, 0.1, 0.1), &StdDevs::new(0.1, 0.0, 0.1))
            .unwrap();
        let scaled = gain.apply(&Twist2d::new(1.0, 2.0, 4.0));
        assert_abs_diff_eq!(scaled.dx, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled.dy, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled.dtheta, 2.0, epsilon = 1e-12);
    }
}
