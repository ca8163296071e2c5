use bevy::prelude::*;

use crate::components::{
    CraftConfig, Force, ForceCategory, KinematicsComponent, PhysicsComponent, ReferenceFrame,
    RigidBodyState,
};

/// Take the tick's kinematic snapshot from the host rigid body. Runs first in
/// the physics schedule; nothing downstream mutates the snapshot.
pub fn kinematics_sync_system(mut query: Query<(&RigidBodyState, &mut KinematicsComponent)>) {
    for (body, mut kinematics) in query.iter_mut() {
        kinematics.refresh(body);
    }
}

/// Fold every contribution plus gravity into the net body-frame force and
/// moment the host integrator consumes.
pub fn force_summation_system(
    mut query: Query<(&CraftConfig, &KinematicsComponent, &mut PhysicsComponent)>,
) {
    for (craft, kinematics, mut physics) in query.iter_mut() {
        physics
            .forces
            .retain(|f| f.category != ForceCategory::Gravitational);

        let weight = craft.gravity.direction * (craft.gravity.magnitude * physics.mass);
        physics.add_force(Force {
            vector: weight,
            point: None,
            frame: ReferenceFrame::Inertial,
            category: ForceCategory::Gravitational,
        });

        physics.summarize(kinematics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_gravity_lands_in_body_frame() {
        let craft = CraftConfig::default();
        let mut physics = PhysicsComponent::new(craft.mass, craft.inertia);

        // Rolled 90 degrees: world down maps onto body +Y
        let kinematics = KinematicsComponent::from_rigid_body(&RigidBodyState {
            attitude: UnitQuaternion::from_euler_angles(std::f64::consts::FRAC_PI_2, 0.0, 0.0),
            ..Default::default()
        });

        physics
            .forces
            .retain(|f| f.category != ForceCategory::Gravitational);
        let weight = craft.gravity.direction * (craft.gravity.magnitude * physics.mass);
        physics.add_force(Force {
            vector: weight,
            point: None,
            frame: ReferenceFrame::Inertial,
            category: ForceCategory::Gravitational,
        });
        physics.summarize(&kinematics);

        assert_relative_eq!(physics.net_force.y, craft.mass * 9.81, epsilon = 1e-6);
        assert_relative_eq!(physics.net_force.z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(physics.net_force.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_summation_is_idempotent_per_tick() {
        let craft = CraftConfig::default();
        let kinematics = KinematicsComponent::default();
        let mut physics = PhysicsComponent::new(craft.mass, craft.inertia);

        for _ in 0..3 {
            physics
                .forces
                .retain(|f| f.category != ForceCategory::Gravitational);
            let weight = craft.gravity.direction * (craft.gravity.magnitude * physics.mass);
            physics.add_force(Force {
                vector: weight,
                point: None,
                frame: ReferenceFrame::Inertial,
                category: ForceCategory::Gravitational,
            });
            physics.summarize(&kinematics);
        }
        // Re-running does not double-count the standing contributions
        assert_relative_eq!(physics.net_force.z, craft.mass * 9.81, epsilon = 1e-6);
    }
}
