use bevy::prelude::*;
use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::damage::{DamageConfig, DamageModelKind, RegionRef};
use crate::components::surfaces::{ControlSurfaceConfig, WingConfig};
use crate::components::thruster::ThrusterSystemConfig;
use crate::components::weapon::WeaponConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Invalid craft configuration: {0}")]
    ValidationError(String),
}

/// Which force model drives the craft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicsModel {
    /// Thruster moments, control surfaces, and positional force application.
    FullDynamics,
    /// Simplified model: direct acceleration shaping, no positional moments.
    Arcade,
}

/// Faction tag used for friend/foe resolution in line-of-sight checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionComponent(pub FactionId);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GravityConfig {
    /// World-space down direction (unit vector).
    pub direction: Vector3<f64>,
    /// [m/s^2]
    pub magnitude: f64,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            direction: Vector3::new(0.0, 0.0, 1.0),
            magnitude: 9.81,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragConfig {
    /// Per-axis drag coefficients, body frame.
    pub coefficients: Vector3<f64>,
    /// Per-axis reference areas [m^2]
    pub areas: Vector3<f64>,
    /// Application point of the drag force along each axis, relative to the
    /// center of mass [m]
    pub moment_centers: [Vector3<f64>; 3],
    /// Drag forces contribute moments through their application points.
    pub moment_from_drag: bool,
    /// Scales rotational drag in the arcade model; the full-dynamics model
    /// pins this to 1.
    pub angular_drag_factor: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            coefficients: Vector3::new(0.3, 0.8, 0.9),
            areas: Vector3::new(4.0, 12.0, 18.0),
            moment_centers: [Vector3::zeros(), Vector3::zeros(), Vector3::zeros()],
            moment_from_drag: true,
            angular_drag_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StartPose {
    pub position: Vector3<f64>,
    pub attitude: UnitQuaternion<f64>,
}

impl Default for StartPose {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            attitude: UnitQuaternion::identity(),
        }
    }
}

/// Where a destroyed craft reappears.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum RespawnPolicy {
    None,
    /// Back at the configured start pose.
    Original,
    /// At the last periodically-snapshotted pose.
    LastKnown { snapshot_interval: f64 },
    Fixed {
        position: Vector3<f64>,
        attitude: UnitQuaternion<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundFollowConfig {
    /// Master switch for ground-plane pitch/roll limiting.
    pub limit_pitch_and_roll: bool,
    /// Hold the target hover distance with a feedback loop.
    pub stick_to_ground: bool,
    /// Hover distance setpoint [m]
    pub target_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Feedback gain inputs; P = responsiveness / height range.
    pub responsiveness: f64,
    pub damping: f64,
    /// Rolling window of ground normals averaged to suppress jitter.
    pub normal_window: usize,
    /// Prefer the probe's vertex-smoothed normal when available.
    pub smooth_normals: bool,
    /// Forward look-ahead horizons [s]; the shallowest distance wins.
    pub look_ahead: Vec<f64>,
    /// Attitude limits the pilot can lean within [rad]
    pub max_pitch: f64,
    pub max_roll: f64,
    /// Pilot lean slew rate [rad/s]
    pub lean_rate: f64,
    /// Probe reach [m]
    pub probe_range: f64,
}

impl Default for GroundFollowConfig {
    fn default() -> Self {
        Self {
            limit_pitch_and_roll: false,
            stick_to_ground: false,
            target_distance: 8.0,
            min_distance: 2.0,
            max_distance: 25.0,
            responsiveness: 6.0,
            damping: 3.0,
            normal_window: 8,
            smooth_normals: true,
            look_ahead: vec![0.5, 1.0, 2.0],
            max_pitch: 0.35,
            max_roll: 0.5,
            lean_rate: 1.2,
            probe_range: 120.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Constraint plane normal, world space (unit vector).
    pub normal: Vector3<f64>,
    /// Any point on the constraint plane.
    pub point: Vector3<f64>,
    pub position_responsiveness: f64,
    pub heading_responsiveness: f64,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            normal: Vector3::new(0.0, 1.0, 0.0),
            point: Vector3::zeros(),
            position_responsiveness: 2.0,
            heading_responsiveness: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationAssistConfig {
    /// Per-axis counter-velocity gain; lateral axes act in full dynamics only.
    pub strength: Vector3<f64>,
    /// Speed below which braking blends into quadratic damping, per axis [m/s]
    pub brake_speed_window: Vector3<f64>,
    pub brake_strength: Vector3<f64>,
}

impl Default for TranslationAssistConfig {
    fn default() -> Self {
        Self {
            strength: Vector3::new(0.4, 0.4, 0.4),
            brake_speed_window: Vector3::new(3.0, 3.0, 3.0),
            brake_strength: Vector3::new(0.6, 0.6, 0.6),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcadeConfig {
    /// Acceleration envelope for direct force shaping [m/s^2]
    pub max_acceleration: f64,
    /// Cap on the counter-velocity turning correction [m/s^2]
    pub max_turn_acceleration: f64,
    /// Angular acceleration per unit rotation input [rad/s^2]
    pub max_angular_acceleration: f64,
    /// Quadratic brake coefficient; 0 disables.
    pub brake_coefficient: f64,
    /// Reciprocal-power blending exponent softening the envelope near the
    /// hover bounds; 0 disables.
    pub envelope_blend_power: f64,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            max_acceleration: 30.0,
            max_turn_acceleration: 12.0,
            max_angular_acceleration: 4.0,
            brake_coefficient: 0.08,
            envelope_blend_power: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistConfig {
    pub ground: GroundFollowConfig,
    /// Counter-rotation gain on released input; 0 disables.
    pub rotational_strength: f64,
    /// Attitude-hold gain; 0 disables.
    pub stability_strength: f64,
    pub translation: TranslationAssistConfig,
    pub lane: Option<LaneConfig>,
    pub arcade: ArcadeConfig,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            ground: GroundFollowConfig::default(),
            rotational_strength: 0.8,
            stability_strength: 0.0,
            translation: TranslationAssistConfig::default(),
            lane: None,
            arcade: ArcadeConfig::default(),
        }
    }
}

/// Immutable-per-session craft tunables plus all subsystem configuration.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct CraftConfig {
    pub name: String,
    pub physics_model: PhysicsModel,
    pub mass: f64,
    /// Center of mass relative to the craft origin [m]
    pub center_of_mass: Vector3<f64>,
    pub inertia: Matrix3<f64>,
    /// Density of the surrounding medium [kg/m^3]; 0 disables aerodynamics.
    pub medium_density: f64,
    pub gravity: GravityConfig,
    pub drag: DragConfig,
    pub start: StartPose,
    pub respawn: RespawnPolicy,
    pub assist: AssistConfig,
    pub propulsion: ThrusterSystemConfig,
    pub wings: Vec<WingConfig>,
    pub control_surfaces: Vec<ControlSurfaceConfig>,
    pub weapons: Vec<WeaponConfig>,
    pub damage: DamageConfig,
}

impl Default for CraftConfig {
    fn default() -> Self {
        Self {
            name: "craft".to_string(),
            physics_model: PhysicsModel::FullDynamics,
            mass: 2200.0,
            center_of_mass: Vector3::zeros(),
            inertia: Matrix3::from_diagonal(&Vector3::new(1800.0, 2600.0, 3200.0)),
            medium_density: 1.225,
            gravity: GravityConfig::default(),
            drag: DragConfig::default(),
            start: StartPose::default(),
            respawn: RespawnPolicy::Original,
            assist: AssistConfig::default(),
            propulsion: ThrusterSystemConfig::default(),
            wings: Vec::new(),
            control_surfaces: Vec::new(),
            weapons: Vec::new(),
            damage: DamageConfig::default(),
        }
    }
}

impl CraftConfig {
    /// Parse a YAML craft definition and validate it.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let mut config: CraftConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        info!("loaded craft configuration '{}'", config.name);
        Ok(config)
    }

    /// Repair what can be repaired, reject what cannot.
    ///
    /// Multiplier tables are padded/truncated, region references are normalized
    /// for the active damage model, and structural faults (a turret weapon with
    /// no pivot configuration) are reported as errors.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.damage.main_region.sanitize();
        for region in &mut self.damage.localized_regions {
            region.sanitize();
        }

        let localized_count = self.damage.localized_regions.len();
        let model = self.damage.model;
        let normalize = |region: &mut RegionRef, owner: &str| -> Result<(), ConfigError> {
            match (*region, model) {
                // Without localized regions every reference collapses to main.
                (RegionRef::Localized(_), DamageModelKind::Simple)
                | (RegionRef::Localized(_), DamageModelKind::Progressive) => {
                    *region = RegionRef::Main;
                    Ok(())
                }
                (RegionRef::Localized(i), DamageModelKind::Localized) if i >= localized_count => {
                    Err(ConfigError::ValidationError(format!(
                        "{owner}: localized region index {i} out of range ({localized_count} configured)"
                    )))
                }
                _ => Ok(()),
            }
        };

        for thruster in &mut self.propulsion.thrusters {
            normalize(&mut thruster.damage_region, &thruster.name)?;
        }
        for wing in &mut self.wings {
            normalize(&mut wing.damage_region, &wing.name)?;
        }
        for surface in &mut self.control_surfaces {
            normalize(&mut surface.damage_region, &surface.name)?;
        }
        for weapon in &mut self.weapons {
            normalize(&mut weapon.damage_region, &weapon.name)?;
            if weapon.kind.is_turret() && weapon.turret.is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "{}: turret weapon requires a turret pivot configuration",
                    weapon.name
                )));
            }
            if weapon.fire_points.is_empty() {
                weapon.fire_points.push(Vector3::zeros());
            }
        }

        if self.mass <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "{}: mass must be positive",
                self.name
            )));
        }
        Ok(())
    }

    pub fn inertia_inv(&self) -> Matrix3<f64> {
        self.inertia.try_inverse().unwrap_or_else(|| {
            error!("inertia matrix is not invertible, defaulting to identity");
            Matrix3::identity()
        })
    }
}
