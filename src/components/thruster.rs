use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::components::damage::{performance_from_health, RegionRef};

/// Translation axis a thruster serves. Body frame: +X forward, +Y right, +Z down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForceRole {
    #[default]
    None,
    Forward,
    Reverse,
    Right,
    Left,
    Down,
    Up,
}

impl ForceRole {
    /// Demand in [0, 1] this role draws from the translation input.
    pub fn demand(&self, translation: &Vector3<f64>) -> f64 {
        match self {
            ForceRole::None => 0.0,
            ForceRole::Forward => translation.x.max(0.0),
            ForceRole::Reverse => (-translation.x).max(0.0),
            ForceRole::Right => translation.y.max(0.0),
            ForceRole::Left => (-translation.y).max(0.0),
            ForceRole::Down => translation.z.max(0.0),
            ForceRole::Up => (-translation.z).max(0.0),
        }
    }
}

/// Rotation axis a thruster serves. x: roll, y: pitch, z: yaw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MomentRole {
    #[default]
    None,
    RollRight,
    RollLeft,
    PitchUp,
    PitchDown,
    YawRight,
    YawLeft,
}

impl MomentRole {
    /// Signed demand this role draws from the rotation input: positive when the
    /// commanded rotation matches the role, negative when it opposes it.
    pub fn demand(&self, rotation: &Vector3<f64>) -> f64 {
        match self {
            MomentRole::None => 0.0,
            MomentRole::RollRight => rotation.x,
            MomentRole::RollLeft => -rotation.x,
            MomentRole::PitchUp => rotation.y,
            MomentRole::PitchDown => -rotation.y,
            MomentRole::YawRight => rotation.z,
            MomentRole::YawLeft => -rotation.z,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrusterConfig {
    pub name: String,
    /// Thrust direction in the body frame (unit vector).
    pub direction: Vector3<f64>,
    /// Mount position relative to the craft origin [m]
    pub position: Vector3<f64>,
    /// Thrust at full input and full performance [N]
    pub max_thrust: f64,
    pub force_role: ForceRole,
    pub primary_moment: MomentRole,
    pub secondary_moment: MomentRole,
    /// Input ramp time constants [s]
    pub ramp_up: f64,
    pub ramp_down: f64,
    /// Fuel consumed per second at full input
    pub burn_rate: f64,
    /// Heat gained per second at full input
    pub heat_up_rate: f64,
    /// Heat shed per second while idle
    pub cool_down_rate: f64,
    pub min_performance: f64,
    pub damage_region: RegionRef,
    /// Per-thruster tank; `None` draws from the craft's shared pool.
    pub fuel_capacity: Option<f64>,
}

impl Default for ThrusterConfig {
    fn default() -> Self {
        Self {
            name: "thruster".to_string(),
            direction: Vector3::new(1.0, 0.0, 0.0),
            position: Vector3::zeros(),
            max_thrust: 20000.0,
            force_role: ForceRole::Forward,
            primary_moment: MomentRole::None,
            secondary_moment: MomentRole::None,
            ramp_up: 0.6,
            ramp_down: 0.4,
            burn_rate: 0.5,
            heat_up_rate: 2.0,
            cool_down_rate: 6.0,
            min_performance: 0.0,
            damage_region: RegionRef::Main,
            fuel_capacity: None,
        }
    }
}

pub const THRUSTER_STARTING_HEALTH: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrusterState {
    /// Smoothed input in [0, 1]; never steps discontinuously.
    pub current_input: f64,
    health: f64,
    /// Per-thruster fuel in [0, 100]; unused when drawing from the shared pool.
    fuel: f64,
    /// Heat in [0, 100]; 100 stalls thrust generation.
    heat: f64,
    /// Latched at heat 100 until repaired; pins heat at the ceiling.
    pub burned_out: bool,
    current_performance: f64,
}

impl Default for ThrusterState {
    fn default() -> Self {
        Self {
            current_input: 0.0,
            health: THRUSTER_STARTING_HEALTH,
            fuel: 100.0,
            heat: 0.0,
            burned_out: false,
            current_performance: 1.0,
        }
    }
}

impl ThrusterState {
    pub fn from_config(config: &ThrusterConfig) -> Self {
        Self {
            fuel: config.fuel_capacity.unwrap_or(100.0).clamp(0.0, 100.0),
            ..Default::default()
        }
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    pub fn heat(&self) -> f64 {
        self.heat
    }

    /// Cached performance multiplier, recomputed on every state write.
    pub fn current_performance(&self) -> f64 {
        self.current_performance
    }

    pub fn health_normalised(&self) -> f64 {
        (self.health / THRUSTER_STARTING_HEALTH).clamp(0.0, 1.0)
    }

    pub fn set_health(&mut self, config: &ThrusterConfig, health: f64) {
        self.health = health.clamp(0.0, THRUSTER_STARTING_HEALTH);
        if self.burned_out && self.health >= THRUSTER_STARTING_HEALTH {
            self.burned_out = false;
            self.heat = 0.0;
        }
        self.recompute_performance(config);
    }

    pub fn apply_damage(&mut self, config: &ThrusterConfig, amount: f64) {
        self.set_health(config, self.health - amount);
    }

    pub fn set_fuel(&mut self, config: &ThrusterConfig, fuel: f64) {
        let ceiling = config.fuel_capacity.unwrap_or(100.0).clamp(0.0, 100.0);
        self.fuel = fuel.clamp(0.0, ceiling);
        self.recompute_performance(config);
    }

    pub fn set_heat(&mut self, config: &ThrusterConfig, heat: f64) {
        self.heat = if self.burned_out {
            100.0
        } else {
            heat.clamp(0.0, 100.0)
        };
        if self.heat >= 100.0 {
            self.burned_out = true;
        }
        self.recompute_performance(config);
    }

    /// `has_fuel` reflects the pool actually feeding this thruster (shared or
    /// per-thruster).
    pub fn recompute_performance_with_fuel(&mut self, config: &ThrusterConfig, has_fuel: bool) {
        if !has_fuel || self.heat >= 100.0 {
            self.current_performance = 0.0;
        } else {
            self.current_performance = performance_from_health(
                self.health,
                THRUSTER_STARTING_HEALTH,
                config.min_performance,
            );
        }
    }

    fn recompute_performance(&mut self, config: &ThrusterConfig) {
        let has_fuel = match config.fuel_capacity {
            Some(_) => self.fuel > 0.0,
            None => true,
        };
        self.recompute_performance_with_fuel(config, has_fuel);
    }
}

/// Online/offline transition of the whole thruster bank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PowerState {
    Offline,
    Starting { progress: f64 },
    Online,
    Stopping { progress: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrusterSystemConfig {
    pub thrusters: Vec<ThrusterConfig>,
    /// Draw fuel from one craft-wide pool instead of per-thruster tanks.
    pub shared_fuel: bool,
    /// Thruster contribution de-weighting when a moment demand opposes an
    /// active translation demand; 0 disables, 1 can zero a thruster out.
    pub steering_priority: f64,
    pub startup_duration: f64,
    pub shutdown_duration: f64,
}

impl Default for ThrusterSystemConfig {
    fn default() -> Self {
        Self {
            thrusters: Vec::new(),
            shared_fuel: true,
            steering_priority: 1.0,
            startup_duration: 2.0,
            shutdown_duration: 1.0,
        }
    }
}

#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct ThrusterSystemComponent {
    pub power: PowerState,
    /// Craft-wide fuel pool in [0, 100].
    pub shared_fuel: f64,
    pub thrusters: Vec<ThrusterState>,
}

impl ThrusterSystemComponent {
    pub fn from_config(config: &ThrusterSystemConfig) -> Self {
        Self {
            power: PowerState::Online,
            shared_fuel: 100.0,
            thrusters: config.thrusters.iter().map(ThrusterState::from_config).collect(),
        }
    }

    pub fn online(&self) -> bool {
        matches!(self.power, PowerState::Online)
    }

    /// Progress of the current transition in [0, 1]; 1 when settled.
    pub fn transition_progress(&self) -> f64 {
        match self.power {
            PowerState::Offline | PowerState::Online => 1.0,
            PowerState::Starting { progress } | PowerState::Stopping { progress } => progress,
        }
    }

    pub fn start(&mut self, instant: bool) {
        if matches!(self.power, PowerState::Online | PowerState::Starting { .. }) {
            return;
        }
        self.power = if instant {
            PowerState::Online
        } else {
            PowerState::Starting { progress: 0.0 }
        };
    }

    pub fn stop(&mut self, instant: bool) {
        if matches!(self.power, PowerState::Offline | PowerState::Stopping { .. }) {
            return;
        }
        self.power = if instant {
            PowerState::Offline
        } else {
            PowerState::Stopping { progress: 0.0 }
        };
    }

    /// Advance a pending startup/shutdown transition.
    pub fn advance_transition(&mut self, config: &ThrusterSystemConfig, dt: f64) {
        self.power = match self.power {
            PowerState::Starting { progress } => {
                let progress = progress + dt / config.startup_duration.max(1e-6);
                if progress >= 1.0 {
                    PowerState::Online
                } else {
                    PowerState::Starting { progress }
                }
            }
            PowerState::Stopping { progress } => {
                let progress = progress + dt / config.shutdown_duration.max(1e-6);
                if progress >= 1.0 {
                    PowerState::Offline
                } else {
                    PowerState::Stopping { progress }
                }
            }
            other => other,
        };
    }

    pub fn set_shared_fuel(&mut self, config: &ThrusterSystemConfig, fuel: f64) {
        self.shared_fuel = fuel.clamp(0.0, 100.0);
        let has_fuel = self.shared_fuel > 0.0;
        for (state, thruster_config) in self.thrusters.iter_mut().zip(&config.thrusters) {
            if thruster_config.fuel_capacity.is_none() {
                state.recompute_performance_with_fuel(thruster_config, has_fuel);
            }
        }
    }

    /// Fuel level feeding the given thruster, shared pool or private tank.
    pub fn fuel_for(&self, config: &ThrusterSystemConfig, index: usize) -> f64 {
        match config.thrusters.get(index).and_then(|t| t.fuel_capacity) {
            Some(_) => self.thrusters.get(index).map(|t| t.fuel()).unwrap_or(0.0),
            None => self.shared_fuel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_performance_zero_without_fuel() {
        let config = ThrusterConfig {
            fuel_capacity: Some(100.0),
            ..Default::default()
        };
        let mut state = ThrusterState::default();
        state.set_fuel(&config, 0.0);
        assert_relative_eq!(state.current_performance(), 0.0);

        state.set_fuel(&config, 30.0);
        assert_relative_eq!(state.current_performance(), 1.0);
    }

    #[test]
    fn test_performance_zero_at_full_heat() {
        let config = ThrusterConfig::default();
        let mut state = ThrusterState::default();
        state.set_heat(&config, 100.0);
        assert_relative_eq!(state.current_performance(), 0.0);
        assert!(state.burned_out);

        // Burnout pins heat at the ceiling until repaired
        state.set_heat(&config, 20.0);
        assert_relative_eq!(state.heat(), 100.0);

        state.set_health(&config, THRUSTER_STARTING_HEALTH);
        assert!(!state.burned_out);
        assert_relative_eq!(state.current_performance(), 1.0);
    }

    #[test]
    fn test_performance_respects_min() {
        let config = ThrusterConfig {
            min_performance: 0.25,
            ..Default::default()
        };
        let mut state = ThrusterState::default();
        state.set_health(&config, 5.0);
        assert_relative_eq!(state.current_performance(), 0.25);
    }

    #[test]
    fn test_power_transitions() {
        let config = ThrusterSystemConfig {
            startup_duration: 2.0,
            shutdown_duration: 1.0,
            ..Default::default()
        };
        let mut system = ThrusterSystemComponent::from_config(&config);

        system.stop(true);
        assert_eq!(system.power, PowerState::Offline);

        system.start(false);
        system.advance_transition(&config, 1.0);
        assert!(matches!(system.power, PowerState::Starting { progress } if progress > 0.4));
        system.advance_transition(&config, 1.1);
        assert!(system.online());

        system.stop(false);
        assert_relative_eq!(system.transition_progress(), 0.0);
        system.advance_transition(&config, 2.0);
        assert_eq!(system.power, PowerState::Offline);
    }

    #[test]
    fn test_role_demands() {
        let translation = Vector3::new(-0.5, 0.0, 0.8);
        assert_relative_eq!(ForceRole::Forward.demand(&translation), 0.0);
        assert_relative_eq!(ForceRole::Reverse.demand(&translation), 0.5);
        assert_relative_eq!(ForceRole::Down.demand(&translation), 0.8);

        let rotation = Vector3::new(0.0, -0.3, 0.6);
        assert_relative_eq!(MomentRole::PitchUp.demand(&rotation), -0.3);
        assert_relative_eq!(MomentRole::PitchDown.demand(&rotation), 0.3);
        assert_relative_eq!(MomentRole::YawRight.demand(&rotation), 0.6);
    }
}
