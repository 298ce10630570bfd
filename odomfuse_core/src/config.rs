// odomfuse_core/src/config.rs

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GainError, KinematicsError};
use crate::estimation::VisionGain;
use crate::geometry::{Rotation2d, Transform2d, Translation2d};
use crate::kinematics::OmniWheelKinematics;
use crate::types::{
    StdDevs, DEFAULT_ODOMETRY_STD_DEVS, DEFAULT_RETENTION_SECONDS, DEFAULT_VISION_STD_DEVS,
};

// =========================================================================
// == Estimator ==
// =========================================================================

/// Tuning for the fusion layer. Every field is optional in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    /// How far back, in seconds, odometry history is kept for late vision measurements.
    pub retention_seconds: f64,
    /// `[x (m), y (m), heading (rad)]`
    pub odometry_std_devs: [f64; 3],
    /// `[x (m), y (m), heading (rad)]`. Use `inf` to ignore vision on an axis.
    pub vision_std_devs: [f64; 3],
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            retention_seconds: DEFAULT_RETENTION_SECONDS,
            odometry_std_devs: DEFAULT_ODOMETRY_STD_DEVS,
            vision_std_devs: DEFAULT_VISION_STD_DEVS,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.retention_seconds.is_finite() && self.retention_seconds > 0.0) {
            return Err(ConfigError::InvalidRetention {
                seconds: self.retention_seconds,
            });
        }
        self.gain()?;
        Ok(())
    }

    pub fn gain(&self) -> Result<VisionGain, GainError> {
        VisionGain::new(
            &StdDevs::from(self.odometry_std_devs),
            &StdDevs::from(self.vision_std_devs),
        )
    }
}

// =========================================================================
// == Drivetrain ==
// =========================================================================

/// Placement of one omni wheel in the robot frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WheelMount {
    pub x: f64,
    pub y: f64,
    /// Direction the wheel rolls, counter-clockwise from robot forward.
    pub heading_deg: f64,
}

impl WheelMount {
    pub fn to_transform(&self) -> Transform2d {
        Transform2d::new(
            Translation2d::new(self.x, self.y),
            Rotation2d::from_degrees(self.heading_deg),
        )
    }
}

/// Drivetrain geometry, selected in TOML with `kind = "Deadwheels"` or `kind = "Omni"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "PascalCase")]
pub enum DrivetrainConfig {
    /// Two perpendicular tracking wheels through the robot center plus a gyro.
    #[default]
    Deadwheels,
    Omni { wheels: Vec<WheelMount> },
}

impl DrivetrainConfig {
    /// Builds the omni kinematics for an `Omni` layout. `Ok(None)` for deadwheels.
    pub fn omni_kinematics(&self) -> Result<Option<OmniWheelKinematics>, KinematicsError> {
        match self {
            DrivetrainConfig::Deadwheels => Ok(None),
            DrivetrainConfig::Omni { wheels } => {
                let mounts = wheels.iter().map(WheelMount::to_transform).collect();
                OmniWheelKinematics::new(mounts).map(Some)
            }
        }
    }

    pub fn wheel_count(&self) -> usize {
        match self {
            DrivetrainConfig::Deadwheels => 2,
            DrivetrainConfig::Omni { wheels } => wheels.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EstimatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retention_seconds, 1.5);
    }

    #[test]
    fn rejects_bad_retention() {
        for seconds in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = EstimatorConfig {
                retention_seconds: seconds,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidRetention { .. })
            ));
        }
    }

    #[test]
    fn rejects_negative_std_devs() {
        let config = EstimatorConfig {
            vision_std_devs: [0.1, -0.1, 0.1],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Gain(_))));
    }

    #[test]
    fn builds_omni_kinematics_from_mounts() {
        let drivetrain = DrivetrainConfig::Omni {
            wheels: vec![
                WheelMount { x: 0.2, y: 0.0, heading_deg: 90.0 },
                WheelMount { x: -0.1, y: 0.17, heading_deg: 210.0 },
                WheelMount { x: -0.1, y: -0.17, heading_deg: 330.0 },
            ],
        };
        let kinematics = drivetrain.omni_kinematics().unwrap().unwrap();
        assert_eq!(kinematics.wheel_count(), 3);
        assert!(DrivetrainConfig::Deadwheels.omni_kinematics().unwrap().is_none());
    }

    #[test]
    fn degenerate_omni_layout_is_a_config_error() {
        let drivetrain = DrivetrainConfig::Omni {
            wheels: vec![
                WheelMount { x: 0.0, y: 0.0, heading_deg: 0.0 },
                WheelMount { x: 0.2, y: 0.0, heading_deg: 90.0 },
                WheelMount { x: -0.2, y: 0.0, heading_deg: 90.0 },
            ],
        };
        assert_eq!(
            drivetrain.omni_kinematics().unwrap_err(),
            KinematicsError::WheelAtCenterOfRotation { index: 0 }
        );
    }
}
