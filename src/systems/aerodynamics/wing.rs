use nalgebra::Vector3;
use std::f64::consts::PI;

use crate::components::{Force, ForceCategory, ReferenceFrame, WingConfig};
use crate::utils::math::project_on_plane;

/// Lift-curve breakpoints [rad]: no lift below `STALL_FLOOR`, linear rise to
/// the plateau at `RISE_END`, plateau to `PLATEAU_END`, linear fall to the
/// stalled value at `STALL_END`.
const STALL_FLOOR: f64 = -0.05;
const RISE_END: f64 = 0.30;
const PLATEAU_END: f64 = 0.35;
const STALL_END: f64 = 0.80;
const CL_MAX: f64 = 1.6;

/// Piecewise-linear lift coefficient. `stall_effect` in [0, 1] sets how much
/// of the plateau collapses past `PLATEAU_END`: 1 stalls to zero at
/// `STALL_END`, 0 carries the plateau through.
pub fn lift_coefficient(aoa: f64, stall_effect: f64) -> f64 {
    let stall_effect = stall_effect.clamp(0.0, 1.0);

    if aoa <= STALL_FLOOR {
        0.0
    } else if aoa <= RISE_END {
        CL_MAX * (aoa - STALL_FLOOR) / (RISE_END - STALL_FLOOR)
    } else if aoa <= PLATEAU_END {
        CL_MAX
    } else if aoa <= STALL_END {
        let fall = (aoa - PLATEAU_END) / (STALL_END - PLATEAU_END);
        CL_MAX * (1.0 - stall_effect * fall)
    } else {
        CL_MAX * (1.0 - stall_effect)
    }
}

/// Angle of attack of a wing in the body-frame flow: the angle between the
/// lift axis and the local velocity projected into the lift plane, measured
/// from the zero-lift quadrature, plus the built-in camber offset.
pub fn angle_of_attack(config: &WingConfig, velocity_body: &Vector3<f64>) -> Option<f64> {
    let forward = Vector3::x();
    let span_axis = config.lift_axis.cross(&forward);
    if span_axis.norm_squared() < 1e-9 {
        return None;
    }
    let span_axis = span_axis.normalize();
    let projected = project_on_plane(velocity_body, &span_axis);
    if projected.norm_squared() < 1e-9 {
        return None;
    }
    let angle = config.lift_axis.angle(&projected);
    Some(angle - PI / 2.0 + config.camber_offset)
}

/// Lift and induced drag for one wing, or `None` when there is no forward
/// airspeed to work with. `performance` scales lift directly; induced drag
/// follows from the realized lift.
pub fn wing_forces(
    config: &WingConfig,
    performance: f64,
    density: f64,
    velocity_body: &Vector3<f64>,
    center_of_mass: &Vector3<f64>,
) -> Option<(Force, Force)> {
    if velocity_body.x <= 0.0 || density <= 0.0 {
        return None;
    }
    let aoa = angle_of_attack(config, velocity_body)?;
    let cl = lift_coefficient(aoa, config.stall_effect);

    let forward = Vector3::x();
    let span_axis = config.lift_axis.cross(&forward).normalize();
    let projected = project_on_plane(velocity_body, &span_axis);
    let speed_sq = projected.norm_squared();

    let lift_magnitude =
        0.5 * density * speed_sq * config.span * config.chord * aoa.cos() * cl * performance;
    let lift = Force {
        vector: config.lift_axis * lift_magnitude,
        point: Some(config.position - center_of_mass),
        frame: ReferenceFrame::Body,
        category: ForceCategory::Aerodynamic,
    };

    let induced_magnitude =
        2.0 * lift_magnitude * lift_magnitude / (density * speed_sq * PI * config.span.powi(2));
    let induced = Force {
        vector: -forward * induced_magnitude,
        point: Some(config.position - center_of_mass),
        frame: ReferenceFrame::Body,
        category: ForceCategory::Aerodynamic,
    };

    Some((lift, induced))
}
