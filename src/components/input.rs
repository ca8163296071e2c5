use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Pilot or AI control input for one craft.
///
/// `raw_*` fields are what the input layer wrote this tick; the `*` fields are
/// the post-assist values the force generators consume. The assist controller
/// copies raw into assisted each tick before layering its corrections on top.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct ControlInputs {
    /// Commanded translation, body frame, each axis in [-1, 1]
    /// (x: forward/back, y: right/left, z: down/up).
    pub raw_translation: Vector3<f64>,

    /// Commanded rotation, each axis in [-1, 1]
    /// (x: roll, y: pitch, z: yaw).
    pub raw_rotation: Vector3<f64>,

    /// Post-assist translation input consumed by the thrusters.
    pub translation: Vector3<f64>,

    /// Post-assist rotation input consumed by thrusters and control surfaces.
    pub rotation: Vector3<f64>,

    pub primary_fire: bool,
    pub secondary_fire: bool,
}

impl Default for ControlInputs {
    fn default() -> Self {
        Self {
            raw_translation: Vector3::zeros(),
            raw_rotation: Vector3::zeros(),
            translation: Vector3::zeros(),
            rotation: Vector3::zeros(),
            primary_fire: false,
            secondary_fire: false,
        }
    }
}

impl ControlInputs {
    /// Write a new pilot command, clamping each axis into [-1, 1].
    pub fn set_command(&mut self, translation: Vector3<f64>, rotation: Vector3<f64>) {
        self.raw_translation = translation.map(|v| v.clamp(-1.0, 1.0));
        self.raw_rotation = rotation.map(|v| v.clamp(-1.0, 1.0));
    }

    pub fn set_fire(&mut self, primary: bool, secondary: bool) {
        self.primary_fire = primary;
        self.secondary_fire = secondary;
    }

    /// True when the pilot is commanding any rotation.
    pub fn is_rotating(&self) -> bool {
        self.raw_rotation.iter().any(|v| v.abs() > 1e-3)
    }

    /// True when the pilot is commanding any translation.
    pub fn is_translating(&self) -> bool {
        self.raw_translation.iter().any(|v| v.abs() > 1e-3)
    }
}
