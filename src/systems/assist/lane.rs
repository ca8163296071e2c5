use crate::components::{ControlInputs, CraftConfig, KinematicsComponent, LaneConfig};
use crate::systems::assist::AssistComponent;

/// Constrain the craft to a 2.5D lane plane: drive both the signed positional
/// offset from the plane and the heading deviation out of it toward zero.
pub fn lane_constraint(
    _config: &CraftConfig,
    lane: &LaneConfig,
    kinematics: &KinematicsComponent,
    inputs: &mut ControlInputs,
    assist: &mut AssistComponent,
    dt: f64,
) {
    let normal = lane.normal;
    let n_body = kinematics.world_to_body_dir(&normal);

    // Signed distance from the plane, world space
    let offset = (kinematics.position - lane.point).dot(&normal);

    // The forward axis dotted with the plane normal is exactly the normal's
    // body-frame x component; its arcsine is the heading deviation angle.
    let deviation = n_body.x.clamp(-1.0, 1.0).asin();

    let force_out = assist
        .lane_position_controller
        .required_input(0.0, offset, dt);
    let moment_out = assist
        .lane_heading_controller
        .required_input(0.0, deviation, dt);

    // Push back along the plane normal expressed in the body frame
    let correction = n_body * force_out;
    inputs.translation.x = (inputs.translation.x + correction.x).clamp(-1.0, 1.0);
    inputs.translation.y = (inputs.translation.y + correction.y).clamp(-1.0, 1.0);
    inputs.translation.z = (inputs.translation.z + correction.z).clamp(-1.0, 1.0);

    // Yaw sense depends on which side of the craft the plane normal lies
    if n_body.y.abs() > 1e-6 {
        let yaw = moment_out * n_body.y.signum();
        inputs.rotation.z = (inputs.rotation.z + yaw).clamp(-1.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{LaneConfig, RigidBodyState};
    use nalgebra::Vector3;

    #[test]
    fn test_offset_produces_restoring_input() {
        let mut config = CraftConfig::default();
        let lane = LaneConfig::default();
        config.assist.lane = Some(lane.clone());
        let mut assist = AssistComponent::from_config(&config);

        // Craft displaced to +normal (body +y with identity attitude)
        let kinematics = KinematicsComponent::from_rigid_body(&RigidBodyState {
            position: Vector3::new(0.0, 5.0, 0.0),
            ..Default::default()
        });
        let mut inputs = ControlInputs::default();

        lane_constraint(&config, &lane, &kinematics, &mut inputs, &mut assist, 0.01);
        assert!(inputs.translation.y < 0.0);
    }

    #[test]
    fn test_heading_deviation_produces_yaw() {
        let mut config = CraftConfig::default();
        let lane = LaneConfig::default();
        config.assist.lane = Some(lane.clone());
        let mut assist = AssistComponent::from_config(&config);

        // Nose yawed toward the plane normal
        let kinematics = KinematicsComponent::from_rigid_body(&RigidBodyState {
            attitude: nalgebra::UnitQuaternion::from_euler_angles(0.0, 0.0, 0.4),
            ..Default::default()
        });
        let mut inputs = ControlInputs::default();

        lane_constraint(&config, &lane, &kinematics, &mut inputs, &mut assist, 0.01);
        // Positive yaw carried the nose toward +normal; correction yaws back
        assert!(inputs.rotation.z < 0.0);
    }
}
