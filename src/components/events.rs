use bevy::prelude::*;
use nalgebra::Vector3;

use crate::components::damage::{DamageKind, RegionRef};
use crate::components::weapon::WeaponTarget;

/// Inbound command: apply damage (or a collision impulse) to a craft.
#[derive(Event, Debug, Clone)]
pub struct ApplyDamageEvent {
    pub craft: Entity,
    /// Damage amount, or raw impulse when `from_collision` is set.
    pub amount: f64,
    pub kind: DamageKind,
    pub world_position: Vector3<f64>,
    pub from_collision: bool,
}

/// Outbound notification: a region took (post-shield) damage.
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    pub craft: Entity,
    pub region: RegionRef,
    /// Damage applied to region health after shield absorption.
    pub amount: f64,
    /// Monotonically increasing per-craft event index.
    pub event_index: u64,
    /// Feedback intensities in [0, 1].
    pub rumble: f64,
    pub camera_shake: f64,
}

#[derive(Event, Debug, Clone)]
pub struct CraftDestroyedEvent {
    pub craft: Entity,
}

/// Outbound: a weapon discharged; the host instantiates the projectile or beam.
#[derive(Event, Debug, Clone)]
pub struct WeaponFiredEvent {
    pub craft: Entity,
    pub weapon_index: usize,
    /// Muzzle pose, world space.
    pub position: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub up: Vector3<f64>,
    /// Shooter velocity to fold into the projectile [m/s]
    pub velocity_bias: Vector3<f64>,
    pub target: WeaponTarget,
}

#[derive(Event, Debug, Clone)]
pub struct OutOfAmmoEvent {
    pub craft: Entity,
    pub weapon_index: usize,
}
