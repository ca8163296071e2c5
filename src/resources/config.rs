use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::RngManager;

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Fixed physics timestep [s]
    pub timestep: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 120.0, // 120 Hz default physics rate
        }
    }
}

/// Deterministic RNG source shared by stochastic systems (turret scatter).
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct SimRng(pub RngManager);

impl Default for SimRng {
    fn default() -> Self {
        Self(RngManager::new(0))
    }
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(RngManager::new(seed))
    }
}
