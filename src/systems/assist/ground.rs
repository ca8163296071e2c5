use nalgebra::Vector3;

use crate::components::{
    ControlInputs, CraftConfig, Force, ForceCategory, GroundFollowConfig, KinematicsComponent,
    Moment, PhysicsComponent, PhysicsModel, ReferenceFrame,
};
use crate::resources::SurfaceProbeResource;
use crate::systems::assist::AssistComponent;
use crate::utils::math::move_toward;

/// Ground sensing result for this tick, shared between attitude limiting and
/// the hover-distance loop.
#[derive(Debug, Clone, Copy)]
pub struct GroundReference {
    /// Averaged surface normal, world space, pointing away from the ground.
    pub normal: Vector3<f64>,
    /// Shallowest sensed distance across the look-ahead horizons [m]
    pub distance: f64,
}

/// Probe straight down (and along the look-ahead horizons), smooth the normal
/// through the rolling history window, and report the shallowest distance.
pub fn sense_ground(
    config: &CraftConfig,
    ground: &GroundFollowConfig,
    kinematics: &KinematicsComponent,
    probe: &SurfaceProbeResource,
    assist: &mut AssistComponent,
) -> Option<GroundReference> {
    let down = config.gravity.direction;
    let hit = probe.raycast(kinematics.position, down, ground.probe_range)?;

    let raw_normal = if ground.smooth_normals {
        hit.smoothed_normal.unwrap_or(hit.normal)
    } else {
        hit.normal
    };

    assist.normal_history.push_back(raw_normal);
    while assist.normal_history.len() > ground.normal_window.max(1) {
        assist.normal_history.pop_front();
    }
    let sum: Vector3<f64> = assist.normal_history.iter().sum();
    let normal = if sum.norm_squared() > 1e-9 {
        sum.normalize()
    } else {
        raw_normal
    };

    let mut distance = hit.distance;
    for horizon in &ground.look_ahead {
        let origin = kinematics.position + kinematics.velocity * *horizon;
        if let Some(ahead) = probe.raycast(origin, down, ground.probe_range) {
            distance = distance.min(ahead.distance);
        }
    }

    Some(GroundReference { normal, distance })
}

/// Pitch/roll the craft to match the sensed ground plane, with pilot lean
/// layered on top inside the configured limits.
///
/// Full dynamics feeds the correction to the moment-assigned thrusters through
/// the rotation input; the arcade model applies the moment directly.
pub fn ground_attitude_limit(
    config: &CraftConfig,
    reference: &GroundReference,
    kinematics: &KinematicsComponent,
    inputs: &mut ControlInputs,
    physics: &mut PhysicsComponent,
    assist: &mut AssistComponent,
    dt: f64,
) {
    let ground = &config.assist.ground;

    // Pilot lean ramps toward the commanded fraction of the limits
    let lean_target_pitch = inputs.raw_rotation.y * ground.max_pitch;
    let lean_target_roll = inputs.raw_rotation.x * ground.max_roll;
    assist.pilot_lean_pitch = move_toward(
        assist.pilot_lean_pitch,
        lean_target_pitch,
        ground.lean_rate * dt,
    );
    assist.pilot_lean_roll = move_toward(
        assist.pilot_lean_roll,
        lean_target_roll,
        ground.lean_rate * dt,
    );

    // Attitude relative to the ground plane, from the normal's body components.
    // Level over flat ground the up normal sits along body -Z.
    let n_body = kinematics.world_to_body_dir(&reference.normal);
    let measured_pitch = n_body.x.clamp(-1.0, 1.0).asin();
    let measured_roll = (-n_body.y).clamp(-1.0, 1.0).asin();

    let pitch_out = assist
        .pitch_controller
        .required_input(assist.pilot_lean_pitch, measured_pitch, dt);
    let roll_out = assist
        .roll_controller
        .required_input(assist.pilot_lean_roll, measured_roll, dt);

    match config.physics_model {
        PhysicsModel::FullDynamics => {
            inputs.rotation.y = pitch_out.clamp(-1.0, 1.0);
            inputs.rotation.x = roll_out.clamp(-1.0, 1.0);
        }
        PhysicsModel::Arcade => {
            let alpha = Vector3::new(roll_out, pitch_out, 0.0);
            physics.add_moment(Moment {
                vector: config.inertia * alpha,
                frame: ReferenceFrame::Body,
                category: ForceCategory::Assist,
            });
            inputs.rotation.y = 0.0;
            inputs.rotation.x = 0.0;
        }
    }
}

/// Reciprocal-power blend in (0, 1]: 1 far from the bound, falling away as
/// `proximity` approaches 1.
fn reciprocal_blend(proximity: f64, power: f64) -> f64 {
    if power <= 0.0 {
        return 1.0;
    }
    1.0 / (1.0 + proximity.clamp(0.0, 1.0).powf(power) * 4.0)
}

/// Hold the hover distance with the scheduled feedback loop.
///
/// Output units are thruster input in full dynamics (bounded by what the lift
/// thrusters can do) and vertical acceleration in the arcade model, where the
/// envelope is optionally softened near the distance bounds.
pub fn ground_distance_hold(
    config: &CraftConfig,
    reference: &GroundReference,
    inputs: &mut ControlInputs,
    physics: &mut PhysicsComponent,
    assist: &mut AssistComponent,
    dt: f64,
) {
    let ground = &config.assist.ground;
    let arcade = &config.assist.arcade;

    match config.physics_model {
        PhysicsModel::FullDynamics => {
            assist.ground_distance_controller.set_limits(-1.0, 1.0);
            let output = assist.ground_distance_controller.required_input(
                ground.target_distance,
                reference.distance,
                dt,
            );
            // Positive output asks for lift; up demand is negative Z input
            inputs.translation.z = (-output).clamp(-1.0, 1.0);
        }
        PhysicsModel::Arcade => {
            assist
                .ground_distance_controller
                .set_limits(-arcade.max_acceleration, arcade.max_acceleration);
            let mut output = assist.ground_distance_controller.required_input(
                ground.target_distance,
                reference.distance,
                dt,
            );

            if arcade.envelope_blend_power > 0.0 {
                let span_high = (ground.max_distance - ground.target_distance).max(1e-6);
                let span_low = (ground.target_distance - ground.min_distance).max(1e-6);
                if output > 0.0 {
                    // Climbing toward the ceiling
                    let proximity = (reference.distance - ground.target_distance) / span_high;
                    output *= reciprocal_blend(proximity, arcade.envelope_blend_power);
                } else {
                    let proximity = (ground.target_distance - reference.distance) / span_low;
                    output *= reciprocal_blend(proximity, arcade.envelope_blend_power);
                }
            }

            // Up is opposite the gravity direction
            let up = -config.gravity.direction;
            physics.add_force(Force {
                vector: up * (output * physics.mass),
                point: None,
                frame: ReferenceFrame::Inertial,
                category: ForceCategory::Assist,
            });
        }
    }
}
