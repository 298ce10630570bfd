// odomfuse_sim/src/prelude.rs

// Re-export the odomfuse_core prelude so the geometry and estimator types are at hand.
pub use odomfuse_core::prelude::*;

pub use crate::cli::Cli;
pub use crate::error::SimError;
pub use crate::simulation::config::ScenarioConfig;
pub use crate::simulation::prng::{resolve_seed, SimulationRng};
pub use crate::simulation::report::{ErrorStats, SimulationReport};
pub use crate::simulation::runner::run;
pub use crate::simulation::sensors::{VisionCamera, VisionSample, WheelEncoders};
