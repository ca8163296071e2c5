use nalgebra::Vector3;

use crate::components::{ControlInputs, CraftConfig, KinematicsComponent, PhysicsModel};
use crate::systems::assist::AssistComponent;
use crate::utils::math::wrap_angle;

const INPUT_DEADZONE: f64 = 0.05;

/// Threshold above which an assist correction keeps an axis latched as
/// "still maneuvering".
const MANEUVER_HOLD_THRESHOLD: f64 = 0.3;

fn larger_magnitude(a: f64, b: f64) -> f64 {
    if a.abs() >= b.abs() {
        a
    } else {
        b
    }
}

/// Counter-rotation on released or opposing input: a proportional law per
/// axis, with the larger of pilot input and assist winning.
///
/// When a ground normal is supplied the yaw rate is measured about it rather
/// than the body vertical. `active_axes` masks out axes another behavior owns
/// this tick (ground limiting claims pitch and roll).
pub fn rotational_assist(
    config: &CraftConfig,
    kinematics: &KinematicsComponent,
    inputs: &mut ControlInputs,
    ground_normal: Option<&Vector3<f64>>,
    active_axes: [bool; 3],
) {
    let strength = config.assist.rotational_strength;
    if strength <= 0.0 {
        return;
    }

    let yaw_rate = match ground_normal {
        Some(normal) => {
            // Yaw axis re-referenced to the ground normal (body down is -normal)
            let axis = kinematics.world_to_body_dir(&-normal);
            kinematics.angular_velocity_body.dot(&axis)
        }
        None => kinematics.angular_velocity_body.z,
    };
    let rates = [
        kinematics.angular_velocity_body.x,
        kinematics.angular_velocity_body.y,
        yaw_rate,
    ];

    for axis in 0..3 {
        if !active_axes[axis] {
            continue;
        }
        let pilot = inputs.raw_rotation[axis];
        let rate = rates[axis];
        let released = pilot.abs() < INPUT_DEADZONE;
        let opposing = pilot * rate < 0.0;

        if released || opposing {
            let assist_value = (-rate * strength).clamp(-1.0, 1.0);
            inputs.rotation[axis] = larger_magnitude(pilot, assist_value);
        }
    }
}

/// Attitude hold: latch the orientation whenever the pilot maneuvers, drive
/// back to the latch once they release. "Fly where you point, hold where you
/// leave it."
pub fn stability_assist(
    config: &CraftConfig,
    kinematics: &KinematicsComponent,
    inputs: &mut ControlInputs,
    assist: &mut AssistComponent,
    dt: f64,
) {
    let strength = config.assist.stability_strength;
    if strength <= 0.0 {
        return;
    }

    let angles = kinematics.euler_angles();

    for axis in 0..3 {
        let maneuvering = inputs.raw_rotation[axis].abs() > INPUT_DEADZONE;
        let assist_active =
            inputs.rotation[axis].abs() > MANEUVER_HOLD_THRESHOLD && assist.in_maneuver[axis];

        if maneuvering || assist_active {
            assist.stability_target[axis] = angles[axis];
            assist.stability_controllers[axis].reset();
            assist.in_maneuver[axis] = maneuvering;
        } else {
            assist.in_maneuver[axis] = false;
            let error = wrap_angle(assist.stability_target[axis] - angles[axis]);
            let correction =
                assist.stability_controllers[axis].required_input(error, 0.0, dt) * strength;
            inputs.rotation[axis] = larger_magnitude(inputs.rotation[axis], correction)
                .clamp(-1.0, 1.0);
        }
    }
}

/// Counter-velocity translation assist.
///
/// Lateral axes act only in full dynamics; the vertical axis always runs the
/// speed-windowed brake law, quadratic near the zero crossing so the craft
/// settles without reversing.
pub fn translational_assist(
    config: &CraftConfig,
    kinematics: &KinematicsComponent,
    inputs: &mut ControlInputs,
) {
    let translation = &config.assist.translation;
    let velocity = kinematics.velocity_body;

    if config.physics_model == PhysicsModel::FullDynamics {
        for axis in 0..2 {
            if inputs.raw_translation[axis].abs() >= INPUT_DEADZONE {
                continue;
            }
            let strength = translation.strength[axis];
            if strength <= 0.0 {
                continue;
            }
            inputs.translation[axis] = (-velocity[axis] * strength).clamp(-1.0, 1.0);
        }
    }

    if inputs.raw_translation.z.abs() < INPUT_DEADZONE {
        let strength = translation.brake_strength.z;
        if strength > 0.0 {
            let window = translation.brake_speed_window.z.max(1e-6);
            let v = velocity.z;
            let windowed = (v.abs() / window).min(1.0);
            inputs.translation.z = (-v * strength * windowed).clamp(-1.0, 1.0);
        }
    }
}
