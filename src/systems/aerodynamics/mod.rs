pub mod control_surface;
pub mod drag;
pub mod wing;

pub use control_surface::{commanded_deflection, control_surface_forces};
pub use drag::{angular_drag_moment, profile_drag_forces};
pub use wing::{angle_of_attack, lift_coefficient, wing_forces};

use bevy::prelude::*;

use crate::components::{
    AeroSurfacesComponent, ControlInputs, CraftConfig, DamageModelKind, ForceCategory,
    KinematicsComponent, Moment, PhysicsComponent, PhysicsModel, ReferenceFrame,
};

/// Accumulates every aerodynamic term for the tick: profile drag, rotational
/// drag, wing lift with induced drag, and (full dynamics only) control-surface
/// deltas. Inactive in a vacuum.
pub fn aerodynamics_system(
    mut query: Query<(
        &CraftConfig,
        &KinematicsComponent,
        &ControlInputs,
        &mut AeroSurfacesComponent,
        &mut PhysicsComponent,
    )>,
) {
    for (craft, kinematics, inputs, mut surfaces, mut physics) in query.iter_mut() {
        physics
            .forces
            .retain(|f| f.category != ForceCategory::Aerodynamic);
        physics
            .moments
            .retain(|m| m.category != ForceCategory::Aerodynamic);

        let density = craft.medium_density;
        if density <= 0.0 {
            continue;
        }
        let velocity = kinematics.velocity_body;

        for force in profile_drag_forces(&craft.drag, density, &velocity) {
            physics.add_force(force);
        }

        let angular = angular_drag_moment(
            &craft.drag,
            density,
            &kinematics.angular_velocity_body,
            craft.physics_model,
        );
        if angular.norm_squared() > 1e-12 {
            physics.add_moment(Moment {
                vector: angular,
                frame: ReferenceFrame::Body,
                category: ForceCategory::Aerodynamic,
            });
        }

        let simple_damage = craft.damage.model == DamageModelKind::Simple;
        for (config, state) in craft.wings.iter().zip(&surfaces.wings) {
            let performance = if simple_damage {
                1.0
            } else {
                state.current_performance()
            };
            if let Some((lift, induced)) = wing_forces(
                config,
                performance,
                density,
                &velocity,
                &craft.center_of_mass,
            ) {
                physics.add_force(lift);
                physics.add_force(induced);
            }
        }

        if craft.physics_model == PhysicsModel::FullDynamics {
            for (config, state) in craft
                .control_surfaces
                .iter()
                .zip(surfaces.control_surfaces.iter_mut())
            {
                state.deflection = commanded_deflection(config, inputs);
                let performance = if simple_damage {
                    1.0
                } else {
                    state.current_performance()
                };
                if let Some((lift, drag_delta)) = control_surface_forces(
                    config,
                    state.deflection,
                    performance,
                    density,
                    &velocity,
                    &craft.center_of_mass,
                ) {
                    physics.add_force(lift);
                    physics.add_force(drag_delta);
                }
            }
        }
    }
}
