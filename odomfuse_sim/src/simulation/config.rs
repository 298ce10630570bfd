// odomfuse_sim/src/simulation/config.rs

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::Path;

use crate::error::SimError;
use odomfuse_core::config::{DrivetrainConfig, EstimatorConfig};
use odomfuse_core::geometry::{Pose2d, Rotation2d};

// =========================================================================
// == Top-Level Scenario ==
// =========================================================================

/// Root of a `scenario.toml` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub drivetrain: DrivetrainConfig,

    #[serde(default)]
    pub estimator: EstimatorConfig,

    pub motion: Motion,

    #[serde(default)]
    pub vision: Vision,
}

impl ScenarioConfig {
    /// Loads a scenario file, then applies `ODOMFUSE_`-prefixed environment overrides
    /// (`ODOMFUSE_SIMULATION__SEED=3` sets `simulation.seed`).
    pub fn load(path: &Path) -> Result<Self, SimError> {
        if !path.is_file() {
            return Err(SimError::MissingScenario {
                path: path.to_path_buf(),
            });
        }
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("ODOMFUSE_").split("__"));
        let scenario: ScenarioConfig =
            figment.extract().map_err(|source| SimError::Scenario {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parses a scenario from TOML text, without environment overrides.
    pub fn from_toml_str(toml: &str) -> Result<Self, SimError> {
        let scenario: ScenarioConfig = Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .map_err(|source| SimError::Scenario {
                path: "<inline>".into(),
                source: Box::new(source),
            })?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.estimator.validate()?;

        let sim = &self.simulation;
        ensure_positive("simulation.tick_seconds", sim.tick_seconds)?;
        ensure_non_negative("simulation.encoder_noise_std", sim.encoder_noise_std)?;
        ensure_non_negative("simulation.gyro_drift_std", sim.gyro_drift_std)?;

        if self.motion.segments.is_empty() {
            return Err(SimError::InvalidScenario(
                "motion needs at least one segment".to_string(),
            ));
        }
        for segment in &self.motion.segments {
            ensure_positive("motion.segments.duration", segment.duration)?;
        }
        if let Some(max) = self.motion.max_wheel_speed {
            ensure_positive("motion.max_wheel_speed", max)?;
        }

        let vision = &self.vision;
        ensure_positive("vision.period", vision.period)?;
        ensure_non_negative("vision.latency", vision.latency)?;
        for value in vision.noise_std_devs {
            ensure_non_negative("vision.noise_std_devs", value)?;
        }
        Ok(())
    }

    pub fn duration_seconds(&self) -> f64 {
        self.motion.segments.iter().map(|s| s.duration).sum()
    }
}

fn ensure_positive(field: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidScenario(format!(
            "{field} must be positive, got {value}"
        )))
    }
}

fn ensure_non_negative(field: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidScenario(format!(
            "{field} must be zero or positive, got {value}"
        )))
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the pseudo-random number generator, for determinism.
    pub seed: Option<u64>,
    /// Control loop period.
    pub tick_seconds: f64,
    /// `[x, y, heading_deg]`
    pub start_pose: [f64; 3],
    /// Per-tick Gaussian noise added to each wheel's travel, in meters.
    pub encoder_noise_std: f64,
    /// Gyro random-walk intensity, in rad per sqrt(second).
    pub gyro_drift_std: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            tick_seconds: 0.02,
            start_pose: [0.0, 0.0, 0.0],
            encoder_noise_std: 0.0005,
            gyro_drift_std: 0.002,
        }
    }
}

impl Simulation {
    pub fn start_pose(&self) -> Pose2d {
        let [x, y, heading_deg] = self.start_pose;
        Pose2d::new(x, y, Rotation2d::from_degrees(heading_deg))
    }
}

/// The velocity schedule the robot follows, as `[[motion.segments]]` tables.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Motion {
    pub segments: Vec<Segment>,
    /// Omni drivetrains scale wheel speeds down to this limit.
    #[serde(default)]
    pub max_wheel_speed: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Segment {
    pub duration: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub omega: f64,
    /// Interpret `vx`/`vy` in the field frame rather than the robot frame.
    #[serde(default)]
    pub field_relative: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vision {
    pub enabled: bool,
    /// Seconds between captures.
    pub period: f64,
    /// Seconds between capture and delivery to the estimator.
    pub latency: f64,
    /// `[x (m), y (m), heading (rad)]`
    pub noise_std_devs: [f64; 3],
}

impl Default for Vision {
    fn default() -> Self {
        Self {
            enabled: true,
            period: 0.1,
            latency: 0.05,
            noise_std_devs: [0.02, 0.02, 0.01],
        }
    }
}
