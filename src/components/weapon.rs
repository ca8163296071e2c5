use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::components::damage::{performance_from_health, RegionRef};

pub const WEAPON_STARTING_HEALTH: f64 = 100.0;

/// Lock-on tolerance for both turret pivots [rad] (5 degrees).
pub const TURRET_LOCK_TOLERANCE: f64 = 5.0 * std::f64::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    FixedProjectile,
    FixedBeam,
    TurretProjectile,
    TurretBeam,
}

impl WeaponKind {
    pub fn is_turret(&self) -> bool {
        matches!(self, WeaponKind::TurretProjectile | WeaponKind::TurretBeam)
    }

    pub fn is_beam(&self) -> bool {
        matches!(self, WeaponKind::FixedBeam | WeaponKind::TurretBeam)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireTrigger {
    Primary,
    Secondary,
}

/// Current target of a weapon. Entity and craft+region forms are mutually
/// exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeaponTarget {
    #[default]
    None,
    Entity(Entity),
    Craft {
        entity: Entity,
        region: Option<RegionRef>,
    },
}

impl WeaponTarget {
    pub fn entity(&self) -> Option<Entity> {
        match self {
            WeaponTarget::None => None,
            WeaponTarget::Entity(e) => Some(*e),
            WeaponTarget::Craft { entity, .. } => Some(*entity),
        }
    }

    pub fn is_some(&self) -> bool {
        !matches!(self, WeaponTarget::None)
    }
}

/// Pivot travel limits and servo speed for turret weapons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurretConfig {
    /// Yaw travel limits [rad]
    pub yaw_min: f64,
    pub yaw_max: f64,
    /// Pitch travel limits [rad]
    pub pitch_min: f64,
    pub pitch_max: f64,
    /// Pivot slew rate [rad/s]
    pub angular_speed: f64,
    /// Seconds without a target before easing back to rest; `None` holds pose.
    pub park_delay: Option<f64>,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            yaw_min: -std::f64::consts::PI,
            yaw_max: std::f64::consts::PI,
            pitch_min: -0.3,
            pitch_max: 1.2,
            angular_speed: 2.0,
            park_delay: Some(3.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponConfig {
    pub name: String,
    pub kind: WeaponKind,
    /// Mount position relative to the craft origin [m]
    pub position: Vector3<f64>,
    /// Muzzle offsets relative to the mount (after turret rotation) [m]
    pub fire_points: Vec<Vector3<f64>>,
    /// Rest fire direction in the body frame (unit vector).
    pub fire_direction: Vector3<f64>,
    /// Seconds between shots
    pub reload_interval: f64,
    /// Beam seconds available at full charge
    pub beam_charge: f64,
    /// Beam charge regained per second while not firing
    pub beam_recharge_rate: f64,
    /// `None` is unlimited
    pub ammunition: Option<u32>,
    /// Heat budget spent per shot is `heat_rate / reload_interval`; beams
    /// accumulate `heat_rate` per second of fire.
    pub heat_rate: f64,
    /// Heat shed per second while not firing
    pub cool_rate: f64,
    /// Muzzle velocity for projectile weapons [m/s]
    pub projectile_speed: f64,
    /// Aim scatter as a fraction of target distance
    pub inaccuracy: f64,
    pub max_range: f64,
    pub trigger: FireTrigger,
    /// Turrets fire on lock-on without a trigger press.
    pub auto_fire: bool,
    pub require_line_of_sight: bool,
    /// Obstacles between muzzle and target block the shot.
    pub obstacles_block: bool,
    /// Projectiles home on the target; no intercept lead is computed.
    pub target_guided: bool,
    pub turret: Option<TurretConfig>,
    pub min_performance: f64,
    pub damage_region: RegionRef,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            name: "cannon".to_string(),
            kind: WeaponKind::FixedProjectile,
            position: Vector3::zeros(),
            fire_points: vec![Vector3::zeros()],
            fire_direction: Vector3::new(1.0, 0.0, 0.0),
            reload_interval: 0.25,
            beam_charge: 3.0,
            beam_recharge_rate: 1.0,
            ammunition: None,
            heat_rate: 5.0,
            cool_rate: 10.0,
            projectile_speed: 300.0,
            inaccuracy: 0.0,
            max_range: 2000.0,
            trigger: FireTrigger::Primary,
            auto_fire: false,
            require_line_of_sight: false,
            obstacles_block: true,
            target_guided: false,
            turret: None,
            min_performance: 0.0,
            damage_region: RegionRef::Main,
        }
    }
}

/// Persistent turret pose and aim bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurretState {
    /// Current pivot angles relative to the mount [rad]
    pub yaw: f64,
    pub pitch: f64,
    /// Clamped aim solution the pivots are slewing toward [rad]
    pub target_yaw: f64,
    pub target_pitch: f64,
    /// False when the aim solution had to be clamped to the travel limits.
    pub facing_target: bool,
    /// Both pivots within tolerance of the solution and inside limits.
    pub locked_on: bool,
    /// Settled at rest orientation with no target.
    pub parked: bool,
    /// Seconds since the turret lost its target.
    pub idle_timer: f64,
    /// Advances the deterministic scatter stream once per aim update.
    pub scatter_seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct WeaponState {
    /// Seconds since the last shot.
    pub since_fired: f64,
    heat: f64,
    pub beam_charge: f64,
    /// Remaining rounds; `None` is unlimited.
    pub ammunition: Option<u32>,
    health: f64,
    current_performance: f64,
    /// Beam is currently emitting.
    pub firing: bool,
    pub turret: TurretState,
    pub target: WeaponTarget,
    /// Result of the latest line-of-sight evaluation.
    pub line_of_sight: bool,
}

impl WeaponState {
    pub fn from_config(config: &WeaponConfig) -> Self {
        Self {
            since_fired: config.reload_interval,
            heat: 0.0,
            beam_charge: config.beam_charge,
            ammunition: config.ammunition,
            health: WEAPON_STARTING_HEALTH,
            current_performance: 1.0,
            firing: false,
            turret: TurretState {
                parked: true,
                facing_target: false,
                ..Default::default()
            },
            target: WeaponTarget::None,
            line_of_sight: false,
        }
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn health_normalised(&self) -> f64 {
        (self.health / WEAPON_STARTING_HEALTH).clamp(0.0, 1.0)
    }

    pub fn heat(&self) -> f64 {
        self.heat
    }

    pub fn current_performance(&self) -> f64 {
        self.current_performance
    }

    pub fn set_health(&mut self, config: &WeaponConfig, health: f64) {
        self.health = health.clamp(0.0, WEAPON_STARTING_HEALTH);
        self.recompute_performance(config);
    }

    pub fn apply_damage(&mut self, config: &WeaponConfig, amount: f64) {
        self.set_health(config, self.health - amount);
    }

    pub fn set_heat(&mut self, config: &WeaponConfig, heat: f64) {
        self.heat = heat.clamp(0.0, 100.0);
        self.recompute_performance(config);
    }

    /// Operational gate: destroyed or overheated weapons act on nothing.
    pub fn operational(&self) -> bool {
        self.health > 0.0 && self.current_performance > 0.0
    }

    pub fn set_target_entity(&mut self, entity: Entity) {
        self.target = WeaponTarget::Entity(entity);
    }

    pub fn set_target_craft(&mut self, entity: Entity, region: Option<RegionRef>) {
        self.target = WeaponTarget::Craft { entity, region };
    }

    pub fn clear_target(&mut self) {
        self.target = WeaponTarget::None;
        self.turret.locked_on = false;
        self.turret.facing_target = false;
    }

    pub fn reload_ready(&self, config: &WeaponConfig) -> bool {
        self.since_fired >= config.reload_interval
    }

    fn recompute_performance(&mut self, config: &WeaponConfig) {
        if self.heat >= 100.0 {
            self.current_performance = 0.0;
        } else {
            self.current_performance = performance_from_health(
                self.health,
                WEAPON_STARTING_HEALTH,
                config.min_performance,
            );
        }
    }
}

/// All weapon state for one craft, index-aligned with the configured weapons.
#[derive(Component, Debug, Clone, Default)]
pub struct WeaponSystemComponent {
    pub weapons: Vec<WeaponState>,
}

impl WeaponSystemComponent {
    pub fn from_configs(configs: &[WeaponConfig]) -> Self {
        Self {
            weapons: configs.iter().map(WeaponState::from_config).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_target_forms_are_exclusive() {
        let mut state = WeaponState::from_config(&WeaponConfig::default());
        let entity = Entity::from_raw(7);

        state.set_target_entity(entity);
        assert_eq!(state.target, WeaponTarget::Entity(entity));

        state.set_target_craft(entity, Some(RegionRef::Localized(1)));
        assert!(matches!(state.target, WeaponTarget::Craft { .. }));

        state.clear_target();
        assert!(!state.target.is_some());
        assert!(!state.turret.locked_on);
    }

    #[test]
    fn test_overheat_gates_performance() {
        let config = WeaponConfig::default();
        let mut state = WeaponState::from_config(&config);
        state.set_heat(&config, 100.0);
        assert_relative_eq!(state.current_performance(), 0.0);
        assert!(!state.operational());

        state.set_heat(&config, 50.0);
        assert!(state.operational());
    }

    #[test]
    fn test_destroyed_weapon_not_operational() {
        let config = WeaponConfig::default();
        let mut state = WeaponState::from_config(&config);
        state.apply_damage(&config, WEAPON_STARTING_HEALTH + 10.0);
        assert_relative_eq!(state.health(), 0.0);
        assert!(!state.operational());
    }
}
