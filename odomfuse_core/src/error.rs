// odomfuse_core/src/error.rs

//! Error types for the localization core.
//!
//! Only configuration problems are errors. Stale or unusable runtime input (a vision
//! measurement older than the retention window, sampling an empty history) is reported
//! through `Option` or [`crate::estimation::VisionUpdate`] instead.

use thiserror::Error;

/// Invalid drivetrain geometry or mismatched wheel readings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicsError {
    #[error("omni-wheel kinematics needs at least one wheel")]
    NoWheels,

    #[error("omni-wheel kinematics needs at least 3 wheels, got {count}")]
    TooFewWheels { count: usize },

    #[error("wheel {index} sits on the center of rotation and cannot observe rotation")]
    WheelAtCenterOfRotation { index: usize },

    #[error("wheel layout only spans {rank} of the 3 chassis degrees of freedom")]
    RankDeficient { rank: usize },

    #[error("expected readings for {expected} wheels, got {actual}")]
    WheelCountMismatch { expected: usize, actual: usize },
}

/// Invalid standard deviations handed to the gain computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GainError {
    #[error("{source_name} standard deviation for axis {axis} must be non-negative, got {value}")]
    InvalidStdDev {
        source_name: &'static str,
        axis: usize,
        value: f64,
    },
}

/// Anything that can be wrong with an estimator or drivetrain configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("retention window must be a positive, finite number of seconds, got {seconds}")]
    InvalidRetention { seconds: f64 },

    #[error(transparent)]
    Gain(#[from] GainError),

    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}
