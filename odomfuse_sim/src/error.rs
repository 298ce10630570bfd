// odomfuse_sim/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

use odomfuse_core::error::{ConfigError, KinematicsError};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario file '{path}' does not exist")]
    MissingScenario { path: PathBuf },

    #[error("failed to load scenario '{path}': {source}")]
    Scenario {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}
