pub mod los;
pub mod turret;

pub use los::line_of_sight;
pub use turret::{
    aim_angles, intercept_time, move_turret, predicted_intercept, turret_rotation, TurretAim,
};

use bevy::prelude::*;
use nalgebra::Vector3;
use rand::Rng;

use crate::components::{
    ControlInputs, CraftConfig, FactionComponent, FireTrigger, KinematicsComponent, OutOfAmmoEvent,
    RegionRef, RigidBodyState, WeaponConfig, WeaponFiredEvent, WeaponState, WeaponSystemComponent,
    WeaponTarget,
};
use crate::resources::{SimRng, SurfaceProbeResource};

/// World-space position and velocity of a weapon's current target.
fn resolve_target(
    target: &WeaponTarget,
    targets: &Query<(&RigidBodyState, Option<&CraftConfig>)>,
) -> Option<(Vector3<f64>, Vector3<f64>)> {
    let entity = target.entity()?;
    let (body, target_craft) = targets.get(entity).ok()?;
    let mut position = body.position;

    // A craft target may name a damage region; aim at its volume center
    if let WeaponTarget::Craft {
        region: Some(region),
        ..
    } = target
    {
        if let Some(config) = target_craft {
            let center = match region {
                RegionRef::Main => config.damage.main_region.volume.center,
                RegionRef::Localized(i) => config
                    .damage
                    .localized_regions
                    .get(*i)
                    .map(|r| r.volume.center)
                    .unwrap_or_default(),
                RegionRef::None => Vector3::zeros(),
            };
            position = body.position + body.attitude * center;
        }
    }
    Some((position, body.velocity))
}

/// Muzzle pose for one fire point with the turret pivots composed in.
fn muzzle_pose(
    config: &WeaponConfig,
    state: &WeaponState,
    kinematics: &KinematicsComponent,
    fire_point: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let rotation = turret_rotation(&state.turret);
    let position = kinematics.body_to_world_point(&(config.position + rotation * fire_point));
    let direction = kinematics.body_to_world_dir(&(rotation * config.fire_direction));
    let up = kinematics.body_to_world_dir(&Vector3::new(0.0, 0.0, -1.0));
    (position, direction, up)
}

/// Per-frame weapon update: heat, turret motion, target lock, line of sight,
/// and firing with ammunition/reload bookkeeping.
#[allow(clippy::too_many_arguments)]
pub fn weapon_control_system(
    mut query: Query<(
        Entity,
        &CraftConfig,
        &KinematicsComponent,
        &ControlInputs,
        &mut WeaponSystemComponent,
        Option<&FactionComponent>,
    )>,
    targets: Query<(&RigidBodyState, Option<&CraftConfig>)>,
    probe: Res<SurfaceProbeResource>,
    rng: Res<SimRng>,
    time: Res<Time>,
    mut fired_events: EventWriter<WeaponFiredEvent>,
    mut ammo_events: EventWriter<OutOfAmmoEvent>,
) {
    let dt = time.delta_secs() as f64;

    for (entity, craft, kinematics, inputs, mut weapons, faction) in query.iter_mut() {
        for (index, config) in craft.weapons.iter().enumerate() {
            let Some(state) = weapons.weapons.get_mut(index) else {
                continue;
            };
            state.since_fired += dt;

            if !state.operational() {
                state.firing = false;
                continue;
            }

            let target_info = resolve_target(&state.target, &targets);
            let weapon_world = kinematics.body_to_world_point(&config.position);
            let target_distance = target_info
                .map(|(position, _)| (position - weapon_world).norm())
                .unwrap_or(f64::INFINITY);

            if let Some(turret) = &config.turret {
                let aim = target_info.and_then(|(position, velocity)| {
                    let lead = !config.kind.is_beam() && !config.target_guided;
                    let mut aim_point = predicted_intercept(
                        &weapon_world,
                        &position,
                        &velocity,
                        &kinematics.velocity,
                        config.projectile_speed,
                        lead,
                    );
                    if config.inaccuracy > 0.0 {
                        let mut stream = rng.0.get_rng(&format!(
                            "scatter:{}:{}:{}",
                            entity.index(),
                            index,
                            state.turret.scatter_seq
                        ));
                        state.turret.scatter_seq = state.turret.scatter_seq.wrapping_add(1);
                        let offset = Vector3::new(
                            stream.gen::<f64>() - 0.5,
                            stream.gen::<f64>() - 0.5,
                            stream.gen::<f64>() - 0.5,
                        ) * 2.0;
                        aim_point += offset * (config.inaccuracy * target_distance);
                    }
                    aim_angles(config, kinematics, &aim_point)
                });
                move_turret(turret, &mut state.turret, aim, dt);
            }

            if config.require_line_of_sight || config.auto_fire {
                let (direction, distance) = match target_info {
                    Some((position, _)) => {
                        let to_target = position - weapon_world;
                        let norm = to_target.norm();
                        if norm > 1e-6 {
                            (to_target / norm, norm)
                        } else {
                            (kinematics.body_to_world_dir(&config.fire_direction), 0.0)
                        }
                    }
                    None => {
                        let (_, direction, _) =
                            muzzle_pose(config, state, kinematics, &Vector3::zeros());
                        (direction, config.max_range)
                    }
                };
                state.line_of_sight = line_of_sight(
                    &probe,
                    weapon_world,
                    direction,
                    state.target.entity(),
                    distance,
                    faction.map(|f| f.0),
                    config.obstacles_block,
                    config.max_range,
                );
            }

            let triggered = match config.trigger {
                FireTrigger::Primary => inputs.primary_fire,
                FireTrigger::Secondary => inputs.secondary_fire,
            };
            let auto = config.auto_fire
                && config.kind.is_turret()
                && state.turret.locked_on
                && target_distance <= config.max_range
                && (!config.require_line_of_sight || state.line_of_sight);
            let want_fire = triggered || auto;

            if config.kind.is_beam() {
                if want_fire && state.beam_charge > 0.0 {
                    if !state.firing {
                        let (position, direction, up) =
                            muzzle_pose(config, state, kinematics, &config.fire_points[0]);
                        fired_events.send(WeaponFiredEvent {
                            craft: entity,
                            weapon_index: index,
                            position,
                            direction,
                            up,
                            velocity_bias: kinematics.velocity,
                            target: state.target,
                        });
                    }
                    state.firing = true;
                    state.beam_charge = (state.beam_charge - dt).max(0.0);
                    state.set_heat(config, state.heat() + config.heat_rate * dt);
                } else {
                    state.firing = false;
                    state.beam_charge =
                        (state.beam_charge + config.beam_recharge_rate * dt).min(config.beam_charge);
                    state.set_heat(config, state.heat() - config.cool_rate * dt);
                }
                continue;
            }

            // Projectile path
            let mut fired = false;
            if want_fire && state.reload_ready(config) && state.ammunition != Some(0) {
                for fire_point in &config.fire_points {
                    if state.ammunition == Some(0) {
                        break;
                    }
                    let (position, direction, up) =
                        muzzle_pose(config, state, kinematics, fire_point);
                    fired_events.send(WeaponFiredEvent {
                        craft: entity,
                        weapon_index: index,
                        position,
                        direction,
                        up,
                        velocity_bias: kinematics.velocity,
                        target: state.target,
                    });
                    if let Some(ammo) = &mut state.ammunition {
                        *ammo -= 1;
                        if *ammo == 0 {
                            ammo_events.send(OutOfAmmoEvent {
                                craft: entity,
                                weapon_index: index,
                            });
                        }
                    }
                    fired = true;
                }
                if fired {
                    state.since_fired = 0.0;
                    let heat_per_shot = config.heat_rate / config.reload_interval.max(1e-6);
                    state.set_heat(config, state.heat() + heat_per_shot);
                }
            }
            if !fired {
                state.set_heat(config, state.heat() - config.cool_rate * dt);
            }
        }
    }
}
