use bevy::prelude::*;
use nalgebra::{UnitQuaternion, Vector3};

use crate::components::{
    AeroSurfacesComponent, ApplyDamageEvent, CraftConfig, CraftDestroyedEvent, DamageComponent,
    DamageEvent, DamageKind, DamageModelKind, DamageRegionConfig, DamageRegionState,
    KinematicsComponent, PoseSnapshot, RegionRef, RespawnPolicy, ThrusterSystemComponent,
    WeaponSystemComponent, SHIELD_DESTROYED,
};

/// One damage application, already in world space.
#[derive(Debug, Clone, Copy)]
pub struct DamageRequest {
    /// Damage amount, or raw impulse for collision hits.
    pub amount: f64,
    pub kind: DamageKind,
    pub world_position: Vector3<f64>,
    pub from_collision: bool,
}

/// Post-shield damage landed on one region.
#[derive(Debug, Clone, Copy)]
pub struct RegionDamage {
    pub region: RegionRef,
    pub applied: f64,
    /// This hit took the region's health through zero.
    pub region_destroyed: bool,
}

#[derive(Debug, Clone)]
pub struct DamageOutcome {
    pub regions: Vec<RegionDamage>,
    pub destroyed: bool,
    pub event_index: u64,
    pub rumble: f64,
    pub camera_shake: f64,
}

/// Run `amount` through a region's shield.
///
/// Below the shielding threshold the hit is fully absorbed with no effect.
/// At or above it the shield depletes; whatever overflows past empty comes
/// back as residual health damage and the shield collapses to the destroyed
/// sentinel. Returns the residual.
pub fn shield_absorb(
    config: &DamageRegionConfig,
    state: &mut DamageRegionState,
    amount: f64,
) -> f64 {
    if !config.shielded() || !state.shield_active() {
        return amount;
    }
    if amount < config.shielding_damage_threshold {
        return 0.0;
    }

    state.since_damaged = 0.0;
    let overflow = amount - state.shield;
    if overflow >= 0.0 {
        state.shield = SHIELD_DESTROYED;
        overflow
    } else {
        state.shield -= amount;
        0.0
    }
}

/// Restore health, optionally spilling overflow above starting health into
/// the shield (capped at capacity).
pub fn add_health(config: &DamageRegionConfig, state: &mut DamageRegionState, amount: f64) {
    let healed = state.health + amount.max(0.0);
    let overflow = healed - config.starting_health;
    if overflow > 0.0 {
        state.health = config.starting_health;
        if config.repair_overflow_to_shield && config.shielded() {
            state.shield = (state.shield.max(0.0) + overflow).min(config.shielding_amount);
        }
    } else {
        state.health = healed;
    }
}

/// Apply one damage request to a craft's regions.
///
/// Returns `None` when the craft is invincible (an invincible main region
/// shields the whole craft). Component propagation is separate so the caller
/// controls which subsystems participate.
pub fn apply_damage(
    craft: &CraftConfig,
    kinematics: &KinematicsComponent,
    damage: &mut DamageComponent,
    request: &DamageRequest,
) -> Option<DamageOutcome> {
    let config = &craft.damage;
    if config.main_region.invincible {
        return None;
    }

    let local_position = kinematics.world_to_body_point(&request.world_position);

    let base = if request.from_collision {
        if config.collision_resistance.abs() < 1e-9 {
            f64::INFINITY
        } else {
            request.amount / config.collision_resistance * 4.0 / craft.mass
        }
    } else {
        request.amount
    };

    let mut affected = vec![RegionRef::Main];
    if config.model == DamageModelKind::Localized {
        for (index, region) in config.localized_regions.iter().enumerate() {
            if !region.invincible && region.volume.contains(&local_position) {
                affected.push(RegionRef::Localized(index));
            }
        }
    }

    let mut regions = Vec::with_capacity(affected.len());
    for region_ref in affected {
        let region_config = damage.region_config(config, region_ref)?;
        let multiplier = if config.use_main_multipliers {
            config.main_region.multiplier(request.kind)
        } else {
            region_config.multiplier(request.kind)
        };
        let amount = base * multiplier;

        let state = damage.region_state_mut(region_ref)?;
        let residual = shield_absorb(region_config, state, amount);
        let mut region_destroyed = false;
        if residual > 0.0 {
            state.health -= residual;
            state.since_damaged = 0.0;
            if state.health <= 0.0 && !state.destruction_triggered {
                state.destruction_triggered = true;
                region_destroyed = true;
            }
        }
        regions.push(RegionDamage {
            region: region_ref,
            applied: residual,
            region_destroyed,
        });
    }

    damage.event_index += 1;
    if damage.main.health <= 0.0 {
        damage.destroyed = true;
    }

    let span = (config.shake_max_damage - config.shake_min_damage).max(1e-9);
    let intensity = ((base - config.shake_min_damage) / span).clamp(0.0, 1.0);

    Some(DamageOutcome {
        regions,
        destroyed: damage.destroyed,
        event_index: damage.event_index,
        rumble: intensity,
        camera_shake: intensity,
    })
}

/// Forward region damage to every component referencing an affected region.
/// The simple damage model skips this entirely.
pub fn propagate_to_components(
    craft: &CraftConfig,
    outcome: &DamageOutcome,
    thrusters: &mut ThrusterSystemComponent,
    surfaces: &mut AeroSurfacesComponent,
    weapons: &mut WeaponSystemComponent,
) {
    if craft.damage.model == DamageModelKind::Simple {
        return;
    }

    for region_damage in &outcome.regions {
        if region_damage.applied <= 0.0 {
            continue;
        }
        let region = region_damage.region;
        let amount = region_damage.applied;

        for (config, state) in craft
            .propulsion
            .thrusters
            .iter()
            .zip(thrusters.thrusters.iter_mut())
        {
            if config.damage_region == region {
                state.apply_damage(config, amount);
            }
        }
        for (config, state) in craft.wings.iter().zip(surfaces.wings.iter_mut()) {
            if config.damage_region == region {
                state.apply_damage(config, amount);
            }
        }
        for (config, state) in craft
            .control_surfaces
            .iter()
            .zip(surfaces.control_surfaces.iter_mut())
        {
            if config.damage_region == region {
                state.apply_damage(config, amount);
            }
        }
        for (config, state) in craft.weapons.iter().zip(weapons.weapons.iter_mut()) {
            if config.damage_region == region {
                state.apply_damage(config, amount);
            }
        }
    }
}

/// Respawn pose for a destroyed craft under the configured policy.
pub fn respawn_pose(
    craft: &CraftConfig,
    damage: &DamageComponent,
) -> Option<(Vector3<f64>, UnitQuaternion<f64>)> {
    match craft.respawn {
        RespawnPolicy::None => None,
        RespawnPolicy::Original => Some((craft.start.position, craft.start.attitude)),
        RespawnPolicy::LastKnown { .. } => damage
            .last_known_pose
            .map(|pose| (pose.position, pose.attitude))
            .or(Some((craft.start.position, craft.start.attitude))),
        RespawnPolicy::Fixed { position, attitude } => Some((position, attitude)),
    }
}

pub fn damage_application_system(
    mut events: EventReader<ApplyDamageEvent>,
    mut query: Query<(
        &CraftConfig,
        &KinematicsComponent,
        &mut DamageComponent,
        &mut ThrusterSystemComponent,
        &mut AeroSurfacesComponent,
        &mut WeaponSystemComponent,
    )>,
    mut damage_events: EventWriter<DamageEvent>,
    mut destroyed_events: EventWriter<CraftDestroyedEvent>,
) {
    for event in events.read() {
        let Ok((craft, kinematics, mut damage, mut thrusters, mut surfaces, mut weapons)) =
            query.get_mut(event.craft)
        else {
            continue;
        };
        let was_destroyed = damage.destroyed;

        let request = DamageRequest {
            amount: event.amount,
            kind: event.kind,
            world_position: event.world_position,
            from_collision: event.from_collision,
        };
        let Some(outcome) = apply_damage(craft, kinematics, &mut damage, &request) else {
            continue;
        };

        propagate_to_components(craft, &outcome, &mut thrusters, &mut surfaces, &mut weapons);

        // Report against the most specific region the hit landed in
        let region = outcome
            .regions
            .iter()
            .rev()
            .find(|r| !matches!(r.region, RegionRef::Main))
            .or_else(|| outcome.regions.first());
        if let Some(primary) = region {
            damage_events.send(DamageEvent {
                craft: event.craft,
                region: primary.region,
                amount: primary.applied,
                event_index: outcome.event_index,
                rumble: outcome.rumble,
                camera_shake: outcome.camera_shake,
            });
        }

        if outcome.destroyed && !was_destroyed {
            info!("craft {:?} destroyed", event.craft);
            destroyed_events.send(CraftDestroyedEvent { craft: event.craft });
        }
    }
}

/// Advance shield recharge timers and restore charge after the delay.
pub fn shield_recharge_system(
    mut query: Query<(&CraftConfig, &mut DamageComponent)>,
    time: Res<Time>,
) {
    let dt = time.delta_secs() as f64;

    for (craft, mut damage) in query.iter_mut() {
        let recharge = |config: &DamageRegionConfig, state: &mut DamageRegionState| {
            state.since_damaged += dt;
            if !config.shielded() || config.shield_recharge_rate <= 0.0 {
                return;
            }
            if state.since_damaged >= config.shield_recharge_delay
                && state.shield < config.shielding_amount
            {
                state.shield = (state.shield.max(0.0)
                    + config.shield_recharge_rate * dt)
                    .min(config.shielding_amount);
            }
        };

        recharge(&craft.damage.main_region, &mut damage.main);
        for (index, state) in damage.localized.iter_mut().enumerate() {
            if let Some(config) = craft.damage.localized_regions.get(index) {
                recharge(config, state);
            }
        }
    }
}

/// Keep the periodic pose snapshot fresh for the last-known respawn policy.
pub fn respawn_snapshot_system(
    mut query: Query<(&CraftConfig, &KinematicsComponent, &mut DamageComponent)>,
    time: Res<Time>,
) {
    let dt = time.delta_secs() as f64;

    for (craft, kinematics, mut damage) in query.iter_mut() {
        let RespawnPolicy::LastKnown { snapshot_interval } = craft.respawn else {
            continue;
        };
        damage.snapshot_timer += dt;
        if damage.snapshot_timer >= snapshot_interval && !damage.destroyed {
            damage.snapshot_timer = 0.0;
            damage.last_known_pose = Some(PoseSnapshot {
                position: kinematics.position,
                attitude: kinematics.attitude,
            });
        }
    }
}
