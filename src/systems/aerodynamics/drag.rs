use nalgebra::Vector3;

use crate::components::{DragConfig, Force, ForceCategory, PhysicsModel, ReferenceFrame};

/// Per-axis profile drag in the body frame: `-0.5 rho |v| v c_d A` on each
/// axis, applied at that axis's moment center when drag moments are enabled.
pub fn profile_drag_forces(
    drag: &DragConfig,
    density: f64,
    velocity_body: &Vector3<f64>,
) -> Vec<Force> {
    let mut forces = Vec::with_capacity(3);

    for axis in 0..3 {
        let v = velocity_body[axis];
        if v.abs() < 1e-9 {
            continue;
        }
        let magnitude = 0.5 * density * v.abs() * v * drag.coefficients[axis] * drag.areas[axis];
        let mut vector = Vector3::zeros();
        vector[axis] = -magnitude;

        forces.push(Force {
            vector,
            point: drag.moment_from_drag.then_some(drag.moment_centers[axis]),
            frame: ReferenceFrame::Body,
            category: ForceCategory::Aerodynamic,
        });
    }
    forces
}

/// Side lengths of the rectangular prism with the configured face areas.
fn equivalent_prism(areas: &Vector3<f64>) -> Vector3<f64> {
    let ax = areas.x.max(1e-6);
    let ay = areas.y.max(1e-6);
    let az = areas.z.max(1e-6);
    Vector3::new(
        (ay * az / ax).sqrt(),
        (ax * az / ay).sqrt(),
        (ax * ay / az).sqrt(),
    )
}

/// Rotational damping moment from spinning the equivalent prism through the
/// medium. Quadratic in rate, quartic in the half-extents swept through the
/// flow, always opposing the rotation. The arcade model scales the result by
/// the configured factor; the full-dynamics model runs it unscaled.
pub fn angular_drag_moment(
    drag: &DragConfig,
    density: f64,
    angular_velocity_body: &Vector3<f64>,
    physics_model: PhysicsModel,
) -> Vector3<f64> {
    let dims = equivalent_prism(&drag.areas);
    let factor = match physics_model {
        PhysicsModel::FullDynamics => 1.0,
        PhysicsModel::Arcade => drag.angular_drag_factor,
    };

    let mut moment = Vector3::zeros();
    for axis in 0..3 {
        let rate = angular_velocity_body[axis];
        if rate.abs() < 1e-9 {
            continue;
        }
        let along = dims[axis];
        let r1 = dims[(axis + 1) % 3] / 2.0;
        let r2 = dims[(axis + 2) % 3] / 2.0;
        let quartic = along * (r1.powi(4) + r2.powi(4)) / 2.0;
        moment[axis] = -rate.signum() * density * rate * rate * quartic * factor;
    }
    moment
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_profile_drag_opposes_velocity() {
        let drag = DragConfig::default();
        let forces = profile_drag_forces(&drag, 1.225, &Vector3::new(40.0, 0.0, -5.0));
        assert_eq!(forces.len(), 2);
        assert!(forces[0].vector.x < 0.0);
        assert!(forces[1].vector.z > 0.0);
    }

    #[test]
    fn test_profile_drag_quadratic_in_speed() {
        let drag = DragConfig::default();
        let slow = profile_drag_forces(&drag, 1.225, &Vector3::new(10.0, 0.0, 0.0));
        let fast = profile_drag_forces(&drag, 1.225, &Vector3::new(20.0, 0.0, 0.0));
        assert_relative_eq!(fast[0].vector.x / slow[0].vector.x, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_drag_without_medium() {
        let drag = DragConfig::default();
        let forces = profile_drag_forces(&drag, 0.0, &Vector3::new(40.0, 0.0, 0.0));
        assert_relative_eq!(forces[0].vector.norm(), 0.0);
    }

    #[test]
    fn test_angular_drag_opposes_rotation() {
        let drag = DragConfig::default();
        let moment = angular_drag_moment(
            &drag,
            1.225,
            &Vector3::new(1.5, 0.0, -2.0),
            PhysicsModel::FullDynamics,
        );
        assert!(moment.x < 0.0);
        assert_relative_eq!(moment.y, 0.0);
        assert!(moment.z > 0.0);
    }

    #[test]
    fn test_arcade_factor_scales_angular_drag() {
        let drag = DragConfig {
            angular_drag_factor: 0.5,
            ..Default::default()
        };
        let omega = Vector3::new(0.0, 2.0, 0.0);
        let full = angular_drag_moment(&drag, 1.225, &omega, PhysicsModel::FullDynamics);
        let arcade = angular_drag_moment(&drag, 1.225, &omega, PhysicsModel::Arcade);
        assert_relative_eq!(arcade.y, full.y * 0.5, epsilon = 1e-9);
    }
}
