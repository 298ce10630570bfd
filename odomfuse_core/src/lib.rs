// odomfuse_core/src/lib.rs

//! Planar robot localization: wheel kinematics, odometry, and fusion of odometry with
//! delayed vision measurements.

pub mod config;
pub mod error;
pub mod estimation;
pub mod geometry;
pub mod interpolation;
pub mod kinematics;
pub mod odometry;
pub mod prelude;
pub mod types;
