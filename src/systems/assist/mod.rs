pub mod ground;
pub mod lane;
pub mod stability;

pub use ground::{ground_attitude_limit, ground_distance_hold, sense_ground, GroundReference};
pub use lane::lane_constraint;
pub use stability::{rotational_assist, stability_assist, translational_assist};

use bevy::prelude::*;
use nalgebra::Vector3;
use std::collections::VecDeque;

use crate::components::{
    ControlInputs, CraftConfig, Force, ForceCategory, KinematicsComponent, Moment,
    PhysicsComponent, PhysicsModel, ReferenceFrame,
};
use crate::resources::{PhysicsConfig, SurfaceProbeResource};
use crate::systems::feedback::FeedbackController;

/// Feedback loops and latched targets of the flight assist behaviors.
/// Every loop owns its own controller; nothing is shared across loops.
#[derive(Component, Debug, Clone)]
pub struct AssistComponent {
    /// Rolling window of sensed ground normals, world space.
    pub normal_history: VecDeque<Vector3<f64>>,
    /// Pilot lean amounts, ramped toward the commanded fractions [rad]
    pub pilot_lean_pitch: f64,
    pub pilot_lean_roll: f64,
    pub pitch_controller: FeedbackController,
    pub roll_controller: FeedbackController,
    pub ground_distance_controller: FeedbackController,
    pub lane_position_controller: FeedbackController,
    pub lane_heading_controller: FeedbackController,
    /// Attitude-hold loops and latches (roll, pitch, yaw).
    pub stability_controllers: [FeedbackController; 3],
    pub stability_target: Vector3<f64>,
    pub in_maneuver: [bool; 3],
}

impl AssistComponent {
    pub fn from_config(config: &CraftConfig) -> Self {
        let ground = &config.assist.ground;
        let height_range = (ground.max_distance - ground.min_distance).max(1e-6);
        let p = ground.responsiveness / height_range;
        let d = ground.damping / height_range;

        let attitude_limits = match config.physics_model {
            PhysicsModel::FullDynamics => 1.0,
            PhysicsModel::Arcade => config.assist.arcade.max_angular_acceleration,
        };

        let lane = config.assist.lane.clone().unwrap_or_default();

        Self {
            normal_history: VecDeque::new(),
            pilot_lean_pitch: 0.0,
            pilot_lean_roll: 0.0,
            pitch_controller: FeedbackController::new(
                2.0,
                0.0,
                0.4,
                -attitude_limits,
                attitude_limits,
            ),
            roll_controller: FeedbackController::new(
                2.0,
                0.0,
                0.4,
                -attitude_limits,
                attitude_limits,
            ),
            ground_distance_controller: FeedbackController::new(p, p / 2.0, d, -1.0, 1.0),
            lane_position_controller: FeedbackController::new(
                lane.position_responsiveness * 0.1,
                0.0,
                lane.position_responsiveness * 0.05,
                -1.0,
                1.0,
            ),
            lane_heading_controller: FeedbackController::new(
                lane.heading_responsiveness,
                0.0,
                lane.heading_responsiveness * 0.2,
                -1.0,
                1.0,
            ),
            stability_controllers: [
                FeedbackController::new(1.5, 0.0, 0.3, -1.0, 1.0),
                FeedbackController::new(1.5, 0.0, 0.3, -1.0, 1.0),
                FeedbackController::new(1.5, 0.0, 0.3, -1.0, 1.0),
            ],
            stability_target: Vector3::zeros(),
            in_maneuver: [false; 3],
        }
    }
}

/// Runs every assist behavior for the tick, in precedence order: ground-plane
/// limiting (or rotational assist), stability overlay, translational assist,
/// hover-distance hold, lane constraint, then the arcade conversions.
pub fn flight_assist_system(
    mut query: Query<(
        &CraftConfig,
        &KinematicsComponent,
        &mut ControlInputs,
        &mut AssistComponent,
        &mut PhysicsComponent,
    )>,
    probe: Res<SurfaceProbeResource>,
    physics_config: Res<PhysicsConfig>,
) {
    let dt = physics_config.timestep;

    for (craft, kinematics, mut inputs, mut assist, mut physics) in query.iter_mut() {
        physics
            .forces
            .retain(|f| f.category != ForceCategory::Assist);
        physics
            .moments
            .retain(|m| m.category != ForceCategory::Assist);

        inputs.translation = inputs.raw_translation;
        inputs.rotation = inputs.raw_rotation;

        let ground = &craft.assist.ground;
        let reference = if ground.limit_pitch_and_roll || ground.stick_to_ground {
            sense_ground(craft, ground, kinematics, &probe, &mut assist)
        } else {
            None
        };

        let limiting = ground.limit_pitch_and_roll && reference.is_some();
        if limiting {
            let reference = reference.as_ref().unwrap();
            ground_attitude_limit(
                craft,
                reference,
                kinematics,
                &mut inputs,
                &mut physics,
                &mut assist,
                dt,
            );
            // Ground limiting owns pitch and roll; yaw assist re-references to
            // the sensed normal.
            rotational_assist(
                craft,
                kinematics,
                &mut inputs,
                Some(&reference.normal),
                [false, false, true],
            );
        } else {
            rotational_assist(craft, kinematics, &mut inputs, None, [true; 3]);
        }

        stability_assist(craft, kinematics, &mut inputs, &mut assist, dt);
        translational_assist(craft, kinematics, &mut inputs);

        if ground.stick_to_ground {
            if let Some(reference) = &reference {
                ground_distance_hold(craft, reference, &mut inputs, &mut physics, &mut assist, dt);
            }
        }

        if let Some(lane) = &craft.assist.lane {
            lane_constraint(craft, lane, kinematics, &mut inputs, &mut assist, dt);
        }

        if craft.physics_model == PhysicsModel::Arcade {
            arcade_adjustments(craft, kinematics, &mut inputs, &mut physics, dt);
        }
    }
}

/// Arcade-model conversions: rotation input becomes a moment through the
/// inertia tensor, velocity is redirected toward the commanded direction
/// within the turning-acceleration cap, and an optional quadratic brake slows
/// an uncommanded craft without ever reversing it.
fn arcade_adjustments(
    craft: &CraftConfig,
    kinematics: &KinematicsComponent,
    inputs: &mut ControlInputs,
    physics: &mut PhysicsComponent,
    dt: f64,
) {
    let arcade = &craft.assist.arcade;

    let alpha = Vector3::new(inputs.rotation.x, inputs.rotation.y, inputs.rotation.z)
        * arcade.max_angular_acceleration;
    if alpha.norm_squared() > 1e-12 {
        physics.add_moment(Moment {
            vector: craft.inertia * alpha,
            frame: ReferenceFrame::Body,
            category: ForceCategory::Assist,
        });
    }

    let velocity = kinematics.velocity_body;
    let command = inputs.translation;

    if command.norm() > 1e-3 {
        let direction = command.normalize();
        let lateral = velocity - direction * velocity.dot(&direction);
        if lateral.norm_squared() > 1e-9 {
            let mut acceleration = -lateral / dt.max(1e-6);
            let cap = arcade.max_turn_acceleration;
            if acceleration.norm() > cap {
                acceleration = acceleration.normalize() * cap;
            }
            physics.add_force(Force {
                vector: acceleration * physics.mass,
                point: None,
                frame: ReferenceFrame::Body,
                category: ForceCategory::Assist,
            });
        }
    } else if arcade.brake_coefficient > 0.0 {
        let mut brake = Vector3::zeros();
        for axis in 0..3 {
            let v = velocity[axis];
            if v.abs() < 1e-6 {
                continue;
            }
            let magnitude = (arcade.brake_coefficient * physics.mass * v * v)
                .min(physics.mass * v.abs() / dt.max(1e-6));
            brake[axis] = -v.signum() * magnitude;
        }
        physics.add_force(Force {
            vector: brake,
            point: None,
            frame: ReferenceFrame::Body,
            category: ForceCategory::Assist,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::RigidBodyState;
    use approx::assert_relative_eq;

    #[test]
    fn test_arcade_brake_never_reverses() {
        let mut craft = CraftConfig::default();
        craft.physics_model = PhysicsModel::Arcade;
        craft.assist.arcade.brake_coefficient = 100.0;

        let kinematics = KinematicsComponent::from_rigid_body(&RigidBodyState {
            velocity: Vector3::new(0.5, 0.0, 0.0),
            ..Default::default()
        });
        let mut inputs = ControlInputs::default();
        let mut physics = PhysicsComponent::new(craft.mass, craft.inertia);
        let dt = 1.0 / 120.0;

        arcade_adjustments(&craft, &kinematics, &mut inputs, &mut physics, dt);

        let brake = &physics.forces[0];
        // Impulse cannot exceed what stops the craft within the tick
        let delta_v = brake.vector.x * dt / physics.mass;
        assert!(delta_v < 0.0);
        assert!(delta_v.abs() <= 0.5 + 1e-9);
    }

    #[test]
    fn test_arcade_rotation_becomes_moment() {
        let mut craft = CraftConfig::default();
        craft.physics_model = PhysicsModel::Arcade;

        let kinematics = KinematicsComponent::default();
        let mut inputs = ControlInputs::default();
        inputs.rotation.y = 1.0;
        let mut physics = PhysicsComponent::new(craft.mass, craft.inertia);

        arcade_adjustments(&craft, &kinematics, &mut inputs, &mut physics, 1.0 / 120.0);
        assert_eq!(physics.moments.len(), 1);
        let expected = craft.inertia[(1, 1)] * craft.assist.arcade.max_angular_acceleration;
        assert_relative_eq!(physics.moments[0].vector.y, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_turn_correction_clamped() {
        let mut craft = CraftConfig::default();
        craft.physics_model = PhysicsModel::Arcade;
        craft.assist.arcade.max_turn_acceleration = 5.0;

        let kinematics = KinematicsComponent::from_rigid_body(&RigidBodyState {
            velocity: Vector3::new(0.0, 40.0, 0.0),
            ..Default::default()
        });
        let mut inputs = ControlInputs::default();
        inputs.translation = Vector3::new(1.0, 0.0, 0.0);
        let mut physics = PhysicsComponent::new(craft.mass, craft.inertia);

        arcade_adjustments(&craft, &kinematics, &mut inputs, &mut physics, 1.0 / 120.0);
        let accel = physics.forces[0].vector.norm() / physics.mass;
        assert_relative_eq!(accel, 5.0, epsilon = 1e-9);
    }
}
