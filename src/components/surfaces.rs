use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::components::damage::{performance_from_health, RegionRef};

pub const SURFACE_STARTING_HEALTH: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WingConfig {
    pub name: String,
    /// Spanwise length [m]
    pub span: f64,
    /// Chord length [m]
    pub chord: f64,
    /// Mount position relative to the craft origin [m]
    pub position: Vector3<f64>,
    /// Direction lift acts along in the body frame (unit vector).
    pub lift_axis: Vector3<f64>,
    /// Built-in incidence added to the measured angle of attack [rad]
    pub camber_offset: f64,
    /// Scales how deeply the lift curve collapses past the stall plateau, [0, 1].
    pub stall_effect: f64,
    pub min_performance: f64,
    pub damage_region: RegionRef,
}

impl Default for WingConfig {
    fn default() -> Self {
        Self {
            name: "wing".to_string(),
            span: 4.0,
            chord: 1.2,
            position: Vector3::zeros(),
            lift_axis: Vector3::new(0.0, 0.0, -1.0),
            camber_offset: 0.0,
            stall_effect: 1.0,
            min_performance: 0.0,
            damage_region: RegionRef::Main,
        }
    }
}

/// Deflecting surface driven directly by a control input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSurfaceRole {
    Aileron,
    Elevator,
    Rudder,
    AirBrake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSurfaceConfig {
    pub name: String,
    pub role: ControlSurfaceRole,
    /// Reference area [m^2]
    pub area: f64,
    /// Mount position relative to the craft origin [m]
    pub position: Vector3<f64>,
    /// Axis the surface's effective position travels along as it deflects.
    pub movement_axis: Vector3<f64>,
    /// Direction the lift delta acts along in the body frame.
    pub lift_axis: Vector3<f64>,
    /// Travel limit [rad]
    pub max_deflection: f64,
    pub min_performance: f64,
    pub damage_region: RegionRef,
}

impl Default for ControlSurfaceConfig {
    fn default() -> Self {
        Self {
            name: "surface".to_string(),
            role: ControlSurfaceRole::Elevator,
            area: 0.8,
            position: Vector3::new(-3.0, 0.0, 0.0),
            movement_axis: Vector3::new(0.0, 0.0, 1.0),
            lift_axis: Vector3::new(0.0, 0.0, -1.0),
            max_deflection: 0.5,
            min_performance: 0.0,
            damage_region: RegionRef::Main,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WingState {
    health: f64,
    current_performance: f64,
}

impl Default for WingState {
    fn default() -> Self {
        Self {
            health: SURFACE_STARTING_HEALTH,
            current_performance: 1.0,
        }
    }
}

impl WingState {
    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn health_normalised(&self) -> f64 {
        (self.health / SURFACE_STARTING_HEALTH).clamp(0.0, 1.0)
    }

    pub fn current_performance(&self) -> f64 {
        self.current_performance
    }

    pub fn set_health(&mut self, config: &WingConfig, health: f64) {
        self.health = health.clamp(0.0, SURFACE_STARTING_HEALTH);
        self.current_performance = performance_from_health(
            self.health,
            SURFACE_STARTING_HEALTH,
            config.min_performance,
        );
    }

    pub fn apply_damage(&mut self, config: &WingConfig, amount: f64) {
        self.set_health(config, self.health - amount);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSurfaceState {
    health: f64,
    current_performance: f64,
    /// Current deflection [rad], signed.
    pub deflection: f64,
}

impl Default for ControlSurfaceState {
    fn default() -> Self {
        Self {
            health: SURFACE_STARTING_HEALTH,
            current_performance: 1.0,
            deflection: 0.0,
        }
    }
}

impl ControlSurfaceState {
    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn health_normalised(&self) -> f64 {
        (self.health / SURFACE_STARTING_HEALTH).clamp(0.0, 1.0)
    }

    pub fn current_performance(&self) -> f64 {
        self.current_performance
    }

    pub fn set_health(&mut self, config: &ControlSurfaceConfig, health: f64) {
        self.health = health.clamp(0.0, SURFACE_STARTING_HEALTH);
        self.current_performance = performance_from_health(
            self.health,
            SURFACE_STARTING_HEALTH,
            config.min_performance,
        );
    }

    pub fn apply_damage(&mut self, config: &ControlSurfaceConfig, amount: f64) {
        self.set_health(config, self.health - amount);
    }
}

/// Wing and control-surface state for one craft.
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AeroSurfacesComponent {
    pub wings: Vec<WingState>,
    pub control_surfaces: Vec<ControlSurfaceState>,
}

impl AeroSurfacesComponent {
    pub fn from_counts(wings: usize, control_surfaces: usize) -> Self {
        Self {
            wings: vec![WingState::default(); wings],
            control_surfaces: vec![ControlSurfaceState::default(); control_surfaces],
        }
    }
}
