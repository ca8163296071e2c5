use std::io;
use thiserror::Error;

use crate::components::craft::ConfigError;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid config value: {0}")]
    InvalidConfig(String),

    #[error("Physics error: {0}")]
    PhysicsError(String),

    #[error("Invalid control input: {0}")]
    InvalidControl(String),

    #[error("Craft error: {0}")]
    CraftError(String),

    #[error("Weapon error: {0}")]
    WeaponError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),
}
