// odomfuse_core/src/geometry/mod.rs

//! Planar geometry value types: translations, headings, poses, twists and chassis
//! velocities. All lengths are meters, all angles radians unless a name says otherwise.

mod pose;
mod rotation;
mod translation;
mod twist;

pub use pose::{Pose2d, Transform2d};
pub use rotation::Rotation2d;
pub use translation::Translation2d;
pub use twist::{ChassisSpeeds, Twist2d};
