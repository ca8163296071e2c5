use corsair::components::damage::DamageRegionConfig;
use corsair::components::thruster::{ForceRole, MomentRole, ThrusterConfig};
use corsair::components::weapon::{TurretConfig, WeaponConfig, WeaponKind};
use corsair::components::{
    DamageModelKind, KinematicsComponent, RegionRef, RegionVolume, RigidBodyState, WingConfig,
};
use corsair::resources::{HitTarget, RayHit, SurfaceProbe};
use corsair::CraftConfig;
use nalgebra::{UnitQuaternion, Vector3};

/// A combat craft with lift/cruise thrusters, wings, a fixed cannon, and a
/// shielded turret section.
pub fn combat_craft_config() -> CraftConfig {
    let mut config = CraftConfig::default();
    config.name = "test_interceptor".to_string();
    config.damage.model = DamageModelKind::Localized;
    config.damage.localized_regions.push(DamageRegionConfig {
        name: "turret bay".to_string(),
        volume: RegionVolume {
            center: Vector3::new(-2.0, 0.0, 0.0),
            extents: Vector3::new(1.5, 1.5, 1.0),
        },
        shielding_amount: 50.0,
        shielding_damage_threshold: 10.0,
        shield_recharge_rate: 5.0,
        shield_recharge_delay: 4.0,
        ..Default::default()
    });

    config.propulsion.thrusters = vec![
        ThrusterConfig {
            name: "main drive".to_string(),
            direction: Vector3::new(1.0, 0.0, 0.0),
            position: Vector3::new(-3.0, 0.0, 0.0),
            force_role: ForceRole::Forward,
            max_thrust: 40000.0,
            ramp_up: 2.0,
            ramp_down: 1.0,
            ..Default::default()
        },
        ThrusterConfig {
            name: "port lift".to_string(),
            direction: Vector3::new(0.0, 0.0, -1.0),
            position: Vector3::new(0.0, -2.5, 0.0),
            force_role: ForceRole::Up,
            primary_moment: MomentRole::RollRight,
            max_thrust: 15000.0,
            ..Default::default()
        },
        ThrusterConfig {
            name: "starboard lift".to_string(),
            direction: Vector3::new(0.0, 0.0, -1.0),
            position: Vector3::new(0.0, 2.5, 0.0),
            force_role: ForceRole::Up,
            primary_moment: MomentRole::RollLeft,
            max_thrust: 15000.0,
            ..Default::default()
        },
    ];

    config.wings.push(WingConfig {
        name: "main plane".to_string(),
        span: 6.0,
        chord: 1.5,
        camber_offset: 0.05,
        ..Default::default()
    });

    config.weapons = vec![
        WeaponConfig {
            name: "nose cannon".to_string(),
            kind: WeaponKind::FixedProjectile,
            position: Vector3::new(4.0, 0.0, 0.0),
            ammunition: Some(200),
            ..Default::default()
        },
        WeaponConfig {
            name: "dorsal turret".to_string(),
            kind: WeaponKind::TurretProjectile,
            position: Vector3::new(-2.0, 0.0, -1.0),
            auto_fire: true,
            require_line_of_sight: true,
            turret: Some(TurretConfig::default()),
            damage_region: RegionRef::Localized(0),
            ..Default::default()
        },
    ];

    config.validate().expect("fixture config must validate");
    config
}

/// Level flight at the given forward speed.
pub fn level_kinematics(speed: f64) -> KinematicsComponent {
    KinematicsComponent::from_rigid_body(&RigidBodyState {
        position: Vector3::new(0.0, 0.0, -10.0),
        attitude: UnitQuaternion::identity(),
        velocity: Vector3::new(speed, 0.0, 0.0),
        ..Default::default()
    })
}

/// Flat ground plane at world z = 0 (z points down; craft fly at negative z).
pub struct FlatGroundProbe;

impl SurfaceProbe for FlatGroundProbe {
    fn raycast(
        &self,
        origin: Vector3<f64>,
        direction: Vector3<f64>,
        max_distance: f64,
    ) -> Option<RayHit> {
        if direction.z <= 1e-9 || origin.z >= 0.0 {
            return None;
        }
        let distance = -origin.z / direction.z;
        if distance > max_distance {
            return None;
        }
        Some(RayHit {
            point: origin + direction * distance,
            normal: Vector3::new(0.0, 0.0, -1.0),
            smoothed_normal: None,
            distance,
            triangle_index: Some(0),
            target: HitTarget::Obstacle,
        })
    }
}
