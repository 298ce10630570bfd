// odomfuse_sim/src/simulation/mod.rs

//! Ground truth, simulated sensors and the run loop that feeds them to the estimator.

pub mod config;
pub mod motion;
pub mod prng;
pub mod report;
pub mod runner;
pub mod sensors;
