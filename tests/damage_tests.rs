mod common;

use approx::assert_relative_eq;
use corsair::components::{
    AeroSurfacesComponent, DamageComponent, DamageKind, DamageModelKind, KinematicsComponent,
    ThrusterSystemComponent, WeaponSystemComponent, SHIELD_DESTROYED,
};
use corsair::systems::{apply_damage, propagate_to_components, DamageRequest};
use corsair::CraftConfig;
use nalgebra::Vector3;

use common::combat_craft_config;

fn request(amount: f64, position: Vector3<f64>) -> DamageRequest {
    DamageRequest {
        amount,
        kind: DamageKind::Kinetic,
        world_position: position,
        from_collision: false,
    }
}

#[test]
fn simple_model_hit_reduces_main_health_only() {
    let mut craft = CraftConfig::default();
    craft.damage.model = DamageModelKind::Simple;
    craft.propulsion.thrusters.push(Default::default());
    craft.validate().unwrap();

    let kinematics = KinematicsComponent::default();
    let mut damage = DamageComponent::from_config(&craft.damage);
    let mut thrusters = ThrusterSystemComponent::from_config(&craft.propulsion);
    let mut surfaces = AeroSurfacesComponent::default();
    let mut weapons = WeaponSystemComponent::default();

    let before_index = damage.event_index;
    let outcome = apply_damage(
        &craft,
        &kinematics,
        &mut damage,
        &request(40.0, Vector3::zeros()),
    )
    .unwrap();
    propagate_to_components(&craft, &outcome, &mut thrusters, &mut surfaces, &mut weapons);

    assert_relative_eq!(damage.main.health, 60.0);
    assert_eq!(outcome.event_index, before_index + 1);
    assert_relative_eq!(thrusters.thrusters[0].health(), 100.0);
}

#[test]
fn shield_sequence_threshold_depletion_and_residual() {
    let craft = combat_craft_config();
    let kinematics = KinematicsComponent::default();
    let mut damage = DamageComponent::from_config(&craft.damage);

    // All hits land inside the shielded turret bay
    let bay = Vector3::new(-2.0, 0.0, 0.0);

    // Below the shielding threshold: fully absorbed, nothing changes
    apply_damage(&craft, &kinematics, &mut damage, &request(5.0, bay)).unwrap();
    assert_relative_eq!(damage.localized[0].shield, 50.0);
    assert_relative_eq!(damage.localized[0].health, 100.0);

    // At threshold: depletes the shield
    apply_damage(&craft, &kinematics, &mut damage, &request(30.0, bay)).unwrap();
    assert_relative_eq!(damage.localized[0].shield, 20.0);
    assert_relative_eq!(damage.localized[0].health, 100.0);

    // Overflow collapses the shield and only the overflow reaches health
    apply_damage(&craft, &kinematics, &mut damage, &request(25.0, bay)).unwrap();
    assert_relative_eq!(damage.localized[0].shield, SHIELD_DESTROYED);
    assert_relative_eq!(damage.localized[0].health, 95.0);
}

#[test]
fn localized_hit_propagates_to_region_components() {
    let craft = combat_craft_config();
    let kinematics = KinematicsComponent::default();
    let mut damage = DamageComponent::from_config(&craft.damage);
    let mut thrusters = ThrusterSystemComponent::from_config(&craft.propulsion);
    let mut surfaces = AeroSurfacesComponent::from_counts(craft.wings.len(), 0);
    let mut weapons = WeaponSystemComponent::from_configs(&craft.weapons);

    // Heavy hit on the turret bay: shield (50) absorbs, residual 30 lands
    let outcome = apply_damage(
        &craft,
        &kinematics,
        &mut damage,
        &request(80.0, Vector3::new(-2.0, 0.0, 0.0)),
    )
    .unwrap();
    propagate_to_components(&craft, &outcome, &mut thrusters, &mut surfaces, &mut weapons);

    // The turret references the bay region and takes the residual
    assert_relative_eq!(weapons.weapons[1].health(), 70.0);
    // The nose cannon references the main region and takes the main residual
    assert_relative_eq!(weapons.weapons[0].health(), 20.0);
    // Thrusters on the main region degrade too
    assert!(thrusters.thrusters[0].current_performance() < 1.0);
}

#[test]
fn overkill_keeps_normalised_health_in_bounds() {
    let craft = CraftConfig::default();
    let kinematics = KinematicsComponent::default();
    let mut damage = DamageComponent::from_config(&craft.damage);

    let outcome = apply_damage(
        &craft,
        &kinematics,
        &mut damage,
        &request(10_000.0, Vector3::zeros()),
    )
    .unwrap();

    assert!(outcome.destroyed);
    assert!(damage.main.health < 0.0);
    assert_relative_eq!(damage.main.health_normalised(&craft.damage.main_region), 0.0);
}

#[test]
fn event_index_is_monotonic_across_hits() {
    let craft = combat_craft_config();
    let kinematics = KinematicsComponent::default();
    let mut damage = DamageComponent::from_config(&craft.damage);

    let mut last = 0;
    for _ in 0..5 {
        let outcome = apply_damage(
            &craft,
            &kinematics,
            &mut damage,
            &request(1.0, Vector3::zeros()),
        )
        .unwrap();
        assert!(outcome.event_index > last);
        last = outcome.event_index;
    }
}
