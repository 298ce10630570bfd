// odomfuse_core/src/types.rs

use nalgebra::{Matrix3, Vector3};

// --- Core Type Aliases ---

/// Caller-supplied monotonic time, in seconds.
pub type Timestamp = f64;

/// Per-axis standard deviations, ordered `[x (m), y (m), heading (rad)]`.
pub type StdDevs = Vector3<f64>;

/// Diagonal per-axis gain applied to a correction twist.
pub type GainMatrix = Matrix3<f64>;

/// Length of the odometry history kept for reconciling late vision measurements.
pub const DEFAULT_RETENTION_SECONDS: f64 = 1.5;

/// Default odometry trust: about 1 cm and 0.01 rad per axis.
pub const DEFAULT_ODOMETRY_STD_DEVS: [f64; 3] = [0.01, 0.01, 0.01];

/// Default vision trust: about 10 cm and 0.1 rad per axis.
pub const DEFAULT_VISION_STD_DEVS: [f64; 3] = [0.1, 0.1, 0.1];
