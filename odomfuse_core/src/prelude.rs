// odomfuse_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::estimation::{IntegratedOdometry, PoseFusion};
pub use crate::kinematics::{Kinematics, WheelPositions};

// --- Geometry ---
pub use crate::geometry::{ChassisSpeeds, Pose2d, Rotation2d, Transform2d, Translation2d, Twist2d};

// --- Estimators ---
pub use crate::estimation::{
    DeadwheelPoseEstimator, DeviceStatus, IntegratedOdometryEstimator, OmniWheelPoseEstimator,
    PoseEstimator, SharedEstimator, VisionUpdate,
};
pub use crate::odometry::{DeadwheelOdometry, OmniWheelOdometry, Odometry};

// --- Drivetrains ---
pub use crate::kinematics::{
    DeadwheelKinematics, DeadwheelPositions, OmniWheelKinematics, OmniWheelPositions,
    OmniWheelSpeeds,
};

// --- Configuration & Errors ---
pub use crate::config::{DrivetrainConfig, EstimatorConfig, WheelMount};
pub use crate::error::{ConfigError, GainError, KinematicsError};
pub use crate::types::{StdDevs, Timestamp};
