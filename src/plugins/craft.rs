use bevy::prelude::*;

use crate::components::{
    AeroSurfacesComponent, ApplyDamageEvent, ControlInputs, CraftConfig, CraftDestroyedEvent,
    DamageComponent, DamageEvent, KinematicsComponent, OutOfAmmoEvent, PhysicsComponent,
    RigidBodyState, ThrusterSystemComponent, WeaponFiredEvent, WeaponSystemComponent,
};
use crate::resources::{PhysicsConfig, SimRng, SurfaceProbeResource};
use crate::systems::{
    aerodynamics_system, damage_application_system, flight_assist_system, force_summation_system,
    kinematics_sync_system, propulsion_system, respawn_snapshot_system, shield_recharge_system,
    weapon_control_system, AssistComponent,
};

/// Physics-tick stages, executed in order.
#[derive(Debug, Hash, PartialEq, Eq, Clone, SystemSet)]
pub enum CraftSet {
    KinematicsSync,
    Assist,
    ForceGeneration,
    ForceSummation,
}

/// Everything needed to spawn one simulated craft from a validated config.
#[derive(Bundle)]
pub struct CraftBundle {
    pub config: CraftConfig,
    pub rigid_body: RigidBodyState,
    pub kinematics: KinematicsComponent,
    pub physics: PhysicsComponent,
    pub inputs: ControlInputs,
    pub thrusters: ThrusterSystemComponent,
    pub surfaces: AeroSurfacesComponent,
    pub damage: DamageComponent,
    pub weapons: WeaponSystemComponent,
    pub assist: AssistComponent,
}

impl CraftBundle {
    pub fn new(config: CraftConfig) -> Self {
        let rigid_body = RigidBodyState {
            position: config.start.position,
            attitude: config.start.attitude,
            inertia: config.inertia,
            ..Default::default()
        };
        Self {
            rigid_body: rigid_body.clone(),
            kinematics: KinematicsComponent::from_rigid_body(&rigid_body),
            physics: PhysicsComponent::new(config.mass, config.inertia),
            inputs: ControlInputs::default(),
            thrusters: ThrusterSystemComponent::from_config(&config.propulsion),
            surfaces: AeroSurfacesComponent::from_counts(
                config.wings.len(),
                config.control_surfaces.len(),
            ),
            damage: DamageComponent::from_config(&config.damage),
            weapons: WeaponSystemComponent::from_configs(&config.weapons),
            assist: AssistComponent::from_config(&config),
            config,
        }
    }
}

pub struct CraftPlugin {
    pub timestep: f64,
    pub seed: u64,
}

impl Default for CraftPlugin {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 120.0, // 120 Hz default physics rate
            seed: 0,
        }
    }
}

impl Plugin for CraftPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SurfaceProbeResource>();
        app.insert_resource(PhysicsConfig {
            timestep: self.timestep,
        });
        app.insert_resource(SimRng::seeded(self.seed));
        app.insert_resource(Time::<Fixed>::from_seconds(self.timestep));

        app.add_event::<ApplyDamageEvent>()
            .add_event::<DamageEvent>()
            .add_event::<CraftDestroyedEvent>()
            .add_event::<WeaponFiredEvent>()
            .add_event::<OutOfAmmoEvent>();

        app.configure_sets(
            FixedUpdate,
            (
                CraftSet::KinematicsSync,
                CraftSet::Assist,
                CraftSet::ForceGeneration,
                CraftSet::ForceSummation,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                kinematics_sync_system.in_set(CraftSet::KinematicsSync),
                flight_assist_system.in_set(CraftSet::Assist),
                (propulsion_system, aerodynamics_system)
                    .chain()
                    .in_set(CraftSet::ForceGeneration),
                force_summation_system.in_set(CraftSet::ForceSummation),
            ),
        );

        // Frame-tick bookkeeping: damage first so weapons see fresh
        // performance, fixed order for determinism.
        app.add_systems(
            Update,
            (
                damage_application_system,
                shield_recharge_system,
                respawn_snapshot_system,
                weapon_control_system,
            )
                .chain(),
        );
    }
}
