mod common;

use approx::assert_relative_eq;
use corsair::components::{ControlInputs, PhysicsComponent, PhysicsModel};
use corsair::resources::SurfaceProbeResource;
use corsair::systems::aerodynamics::{profile_drag_forces, wing_forces};
use corsair::systems::assist::{ground_distance_hold, sense_ground, AssistComponent};
use corsair::systems::propulsion::{ramp_thruster_input, thruster_force, thruster_target_input};
use corsair::CraftConfig;
use nalgebra::Vector3;

use common::{combat_craft_config, level_kinematics, FlatGroundProbe};

const DT: f64 = 1.0 / 120.0;

#[test]
fn thruster_input_never_steps_discontinuously() {
    let craft = combat_craft_config();
    let main_drive = &craft.propulsion.thrusters[0];
    assert_relative_eq!(main_drive.ramp_up, 2.0);

    // Requested input jumps 0 -> 1; one tick later the applied input is
    // strictly between the endpoints
    let after_tick = ramp_thruster_input(0.0, 1.0, main_drive, DT);
    assert!(after_tick > 0.0);
    assert!(after_tick < 0.05);
}

#[test]
fn full_throttle_produces_forward_thrust() {
    let craft = combat_craft_config();
    let config = &craft.propulsion.thrusters[0];
    let mut state = corsair::components::ThrusterState::default();
    state.current_input = 1.0;

    let thrust = thruster_force(config, &state, 100.0, craft.damage.model).unwrap();
    assert_relative_eq!(thrust.x, config.max_thrust);
    assert_relative_eq!(thrust.y, 0.0);
}

#[test]
fn opposed_lift_pair_rolls_the_craft() {
    let craft = combat_craft_config();
    let translation = Vector3::new(0.0, 0.0, -1.0);
    let rotation = Vector3::new(1.0, 0.0, 0.0); // roll right

    let port = thruster_target_input(
        &craft.propulsion.thrusters[1],
        &craft.propulsion,
        &translation,
        &rotation,
        PhysicsModel::FullDynamics,
    );
    let starboard = thruster_target_input(
        &craft.propulsion.thrusters[2],
        &craft.propulsion,
        &translation,
        &rotation,
        PhysicsModel::FullDynamics,
    );

    // Port (roll-right) thruster works harder than the opposing starboard one
    assert!(port > starboard);
    assert_relative_eq!(port, 1.0);
    assert_relative_eq!(starboard, 0.0);
}

#[test]
fn cruise_forces_sum_to_sane_net() {
    let craft = combat_craft_config();
    let kinematics = level_kinematics(60.0);
    let mut physics = PhysicsComponent::new(craft.mass, craft.inertia);

    for force in profile_drag_forces(&craft.drag, craft.medium_density, &kinematics.velocity_body)
    {
        physics.add_force(force);
    }
    let (lift, induced) = wing_forces(
        &craft.wings[0],
        1.0,
        craft.medium_density,
        &kinematics.velocity_body,
        &craft.center_of_mass,
    )
    .unwrap();
    physics.add_force(lift);
    physics.add_force(induced);
    physics.summarize(&kinematics);

    // Drag pushes back, lift pushes up (negative z), both finite
    assert!(physics.net_force.x < 0.0);
    assert!(physics.net_force.z < 0.0);
    assert!(physics.net_force.iter().all(|v| v.is_finite()));
}

#[test]
fn ground_probe_feeds_distance_hold() {
    let mut craft = combat_craft_config();
    craft.assist.ground.stick_to_ground = true;
    craft.assist.ground.target_distance = 8.0;
    craft.assist.ground.look_ahead = vec![];

    let probe = SurfaceProbeResource::new(FlatGroundProbe);
    let mut assist = AssistComponent::from_config(&craft);
    // Hovering 10 m up (z points down, so altitude is -z)
    let kinematics = level_kinematics(0.0);
    let mut inputs = ControlInputs::default();
    let mut physics = PhysicsComponent::new(craft.mass, craft.inertia);

    let reference = sense_ground(
        &craft,
        &craft.assist.ground,
        &kinematics,
        &probe,
        &mut assist,
    )
    .expect("flat ground is below the craft");
    assert_relative_eq!(reference.distance, 10.0, epsilon = 1e-9);
    assert_relative_eq!(reference.normal.z, -1.0, epsilon = 1e-9);

    ground_distance_hold(
        &craft,
        &reference,
        &mut inputs,
        &mut physics,
        &mut assist,
        DT,
    );
    // Two meters above the setpoint: the loop asks to descend (positive z is down)
    assert!(inputs.translation.z > 0.0);
}

#[test]
fn arcade_hold_respects_acceleration_envelope() {
    let mut craft = combat_craft_config();
    craft.physics_model = PhysicsModel::Arcade;
    craft.assist.ground.stick_to_ground = true;
    craft.assist.ground.look_ahead = vec![];
    craft.assist.arcade.max_acceleration = 20.0;

    let probe = SurfaceProbeResource::new(FlatGroundProbe);
    let mut assist = AssistComponent::from_config(&craft);
    let kinematics = level_kinematics(0.0);
    let mut inputs = ControlInputs::default();
    let mut physics = PhysicsComponent::new(craft.mass, craft.inertia);

    let reference = sense_ground(
        &craft,
        &craft.assist.ground,
        &kinematics,
        &probe,
        &mut assist,
    )
    .unwrap();
    ground_distance_hold(
        &craft,
        &reference,
        &mut inputs,
        &mut physics,
        &mut assist,
        DT,
    );

    let force = &physics.forces[0];
    let accel = force.vector.norm() / craft.mass;
    assert!(accel <= craft.assist.arcade.max_acceleration + 1e-9);
}

#[test]
fn vacuum_disables_aerodynamics() {
    let mut craft = combat_craft_config();
    craft.medium_density = 0.0;
    let kinematics = level_kinematics(80.0);

    let drag = profile_drag_forces(&craft.drag, craft.medium_density, &kinematics.velocity_body);
    assert!(drag.iter().all(|f| f.vector.norm() == 0.0));
    assert!(wing_forces(
        &craft.wings[0],
        1.0,
        craft.medium_density,
        &kinematics.velocity_body,
        &craft.center_of_mass
    )
    .is_none());
}

#[test]
fn offline_thrusters_wind_down() {
    let craft = combat_craft_config();
    let config = &craft.propulsion.thrusters[0];
    let mut input = 1.0;
    // Target forced to zero while the bank is offline
    for _ in 0..(120 * 8) {
        input = ramp_thruster_input(input, 0.0, config, DT);
    }
    assert!(input < 1e-3);
}

#[test]
fn yaml_round_trip_preserves_config() {
    use pretty_assertions::assert_eq;

    let craft = combat_craft_config();
    let yaml = serde_yaml::to_string(&craft).unwrap();
    let restored = CraftConfig::from_yaml(&yaml).unwrap();

    assert_eq!(restored.name, craft.name);
    assert_eq!(restored.propulsion.thrusters.len(), 3);
    assert_eq!(restored.weapons.len(), 2);
    assert_relative_eq!(
        restored.propulsion.thrusters[0].max_thrust,
        craft.propulsion.thrusters[0].max_thrust
    );
}
