use nalgebra::Vector3;

use crate::components::{
    ControlInputs, ControlSurfaceConfig, ControlSurfaceRole, Force, ForceCategory, ReferenceFrame,
};

/// Deflection commanded by the input channel this surface listens to [rad]
pub fn commanded_deflection(config: &ControlSurfaceConfig, inputs: &ControlInputs) -> f64 {
    let channel = match config.role {
        ControlSurfaceRole::Aileron => inputs.rotation.x,
        ControlSurfaceRole::Elevator => inputs.rotation.y,
        ControlSurfaceRole::Rudder => inputs.rotation.z,
        // Brakes deploy on reverse translation demand only
        ControlSurfaceRole::AirBrake => (-inputs.translation.x).max(0.0),
    };
    (channel * config.max_deflection).clamp(-config.max_deflection, config.max_deflection)
}

/// Lift and drag deltas from a deflected surface at dynamic pressure.
///
/// Lift follows a `1 - cos` shaping, drag a `sin` shaping, and the surface's
/// effective position slides along its movement axis with `sin` of the
/// deflection before the moment arm is taken.
pub fn control_surface_forces(
    config: &ControlSurfaceConfig,
    deflection: f64,
    performance: f64,
    density: f64,
    velocity_body: &Vector3<f64>,
    center_of_mass: &Vector3<f64>,
) -> Option<(Force, Force)> {
    if velocity_body.x <= 0.0 || density <= 0.0 || deflection.abs() < 1e-6 {
        return None;
    }

    let q = 0.5 * density * velocity_body.norm_squared();
    let effective_position =
        config.position + config.movement_axis * deflection.sin() - center_of_mass;

    let lift_magnitude =
        q * config.area * (1.0 - deflection.cos()) * deflection.signum() * performance;
    let lift = Force {
        vector: config.lift_axis * lift_magnitude,
        point: Some(effective_position),
        frame: ReferenceFrame::Body,
        category: ForceCategory::Aerodynamic,
    };

    let drag_magnitude = q * config.area * deflection.sin().abs() * performance;
    let drag = Force {
        vector: -Vector3::x() * drag_magnitude,
        point: Some(effective_position),
        frame: ReferenceFrame::Body,
        category: ForceCategory::Aerodynamic,
    };

    Some((lift, drag))
}
