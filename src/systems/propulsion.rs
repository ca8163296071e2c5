use bevy::prelude::*;
use nalgebra::Vector3;

use crate::components::{
    ControlInputs, CraftConfig, DamageModelKind, Force, ForceCategory, PhysicsComponent,
    PhysicsModel, ReferenceFrame, ThrusterConfig, ThrusterState, ThrusterSystemComponent,
    ThrusterSystemConfig,
};
use crate::resources::PhysicsConfig;

/// Target input in [0, 1] for one thruster given the current control demands.
///
/// The translation demand always applies. Moment demands apply only in the
/// full-dynamics model; a moment demand opposing the commanded rotation is
/// weighted by `steering_priority` and subtracts, so a translation-assigned
/// thruster can be zeroed out rather than fight the commanded turn.
pub fn thruster_target_input(
    config: &ThrusterConfig,
    system: &ThrusterSystemConfig,
    translation: &Vector3<f64>,
    rotation: &Vector3<f64>,
    physics_model: PhysicsModel,
) -> f64 {
    let force_demand = config.force_role.demand(translation);

    let moment_demand = match physics_model {
        PhysicsModel::FullDynamics => {
            config.primary_moment.demand(rotation) + 0.5 * config.secondary_moment.demand(rotation)
        }
        PhysicsModel::Arcade => 0.0,
    };

    let target = if moment_demand >= 0.0 {
        force_demand + moment_demand
    } else {
        force_demand + system.steering_priority * moment_demand
    };
    target.clamp(0.0, 1.0)
}

/// Smooth `current_input` toward `target` with an exponential first-order
/// response, independent time constants for ramp-up and ramp-down.
pub fn ramp_thruster_input(current: f64, target: f64, config: &ThrusterConfig, dt: f64) -> f64 {
    let time_constant = if target > current {
        config.ramp_up
    } else {
        config.ramp_down
    };

    if time_constant > 1e-6 {
        let decay = (-dt / time_constant).exp();
        (target + (current - target) * decay).clamp(0.0, 1.0)
    } else {
        target.clamp(0.0, 1.0)
    }
}

/// Thrust vector for one thruster at its current input, or `None` when heat or
/// fuel stalls generation. Damage-derived performance scales the output unless
/// the damage model is `Simple`.
pub fn thruster_force(
    config: &ThrusterConfig,
    state: &ThrusterState,
    fuel_available: f64,
    damage_model: DamageModelKind,
) -> Option<Vector3<f64>> {
    if state.heat() >= 100.0 || fuel_available <= 0.0 {
        return None;
    }
    let performance = if damage_model == DamageModelKind::Simple {
        1.0
    } else {
        state.current_performance()
    };
    if performance <= 0.0 || state.current_input <= 1e-6 {
        return None;
    }
    Some(config.direction * (config.max_thrust * state.current_input * performance))
}

pub fn propulsion_system(
    mut query: Query<(
        &CraftConfig,
        &ControlInputs,
        &mut ThrusterSystemComponent,
        &mut PhysicsComponent,
    )>,
    physics_config: Res<PhysicsConfig>,
) {
    let dt = physics_config.timestep;

    for (craft, inputs, mut system, mut physics) in query.iter_mut() {
        physics
            .forces
            .retain(|force| force.category != ForceCategory::Propulsive);

        system.advance_transition(&craft.propulsion, dt);
        let online = system.online();

        let mut shared_burn = 0.0;
        for (index, thruster_config) in craft.propulsion.thrusters.iter().enumerate() {
            let fuel_available = system.fuel_for(&craft.propulsion, index);
            let Some(state) = system.thrusters.get_mut(index) else {
                continue;
            };

            let target = if online {
                thruster_target_input(
                    thruster_config,
                    &craft.propulsion,
                    &inputs.translation,
                    &inputs.rotation,
                    craft.physics_model,
                )
            } else {
                0.0
            };
            state.current_input = ramp_thruster_input(state.current_input, target, thruster_config, dt);

            let thrusting =
                state.current_input > 1e-6 && state.heat() < 100.0 && fuel_available > 0.0;

            if thrusting {
                state.set_heat(
                    thruster_config,
                    state.heat() + state.current_input * thruster_config.heat_up_rate * dt,
                );
                let burn = state.current_input * thruster_config.burn_rate * dt;
                match thruster_config.fuel_capacity {
                    Some(_) => state.set_fuel(thruster_config, state.fuel() - burn),
                    None => shared_burn += burn,
                }
            } else {
                state.set_heat(
                    thruster_config,
                    state.heat() - thruster_config.cool_down_rate * dt,
                );
            }

            if let Some(thrust) =
                thruster_force(thruster_config, state, fuel_available, craft.damage.model)
            {
                let point = match craft.physics_model {
                    PhysicsModel::FullDynamics => {
                        Some(thruster_config.position - craft.center_of_mass)
                    }
                    PhysicsModel::Arcade => None,
                };
                physics.add_force(Force {
                    vector: thrust,
                    point,
                    frame: ReferenceFrame::Body,
                    category: ForceCategory::Propulsive,
                });
            }
        }

        if shared_burn > 0.0 {
            let remaining = system.shared_fuel - shared_burn;
            system.set_shared_fuel(&craft.propulsion, remaining);
        }
    }
}
