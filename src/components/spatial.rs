use bevy::prelude::*;
use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Pose and velocity of the craft's rigid body, written by the host physics
/// solver after each integration step. The simulation never mutates this.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyState {
    /// Position in world space [m]
    pub position: Vector3<f64>,

    /// Attitude quaternion (rotation from body to world frame)
    pub attitude: UnitQuaternion<f64>,

    /// Linear velocity in world space [m/s]
    pub velocity: Vector3<f64>,

    /// Angular velocity in world space [rad/s]
    pub angular_velocity: Vector3<f64>,

    /// Inertia tensor about the center of mass [kg m^2]
    pub inertia: Matrix3<f64>,
}

impl Default for RigidBodyState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            attitude: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            inertia: Matrix3::identity(),
        }
    }
}

/// Kinematic snapshot taken once per physics tick and treated as read-only by
/// every sub-computation within that tick.
///
/// Holds both world-frame and body-frame quantities so downstream force models
/// never re-derive them mid-tick.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct KinematicsComponent {
    /// Position in world space [m]
    pub position: Vector3<f64>,

    /// Attitude quaternion (rotation from body to world frame)
    pub attitude: UnitQuaternion<f64>,

    /// Inverse attitude (rotation from world to body frame)
    pub attitude_inv: UnitQuaternion<f64>,

    /// Linear velocity in world space [m/s]
    pub velocity: Vector3<f64>,

    /// Linear velocity in body frame [m/s]
    pub velocity_body: Vector3<f64>,

    /// Angular velocity in world space [rad/s]
    pub angular_velocity: Vector3<f64>,

    /// Angular velocity in body frame [rad/s]
    pub angular_velocity_body: Vector3<f64>,
}

impl Default for KinematicsComponent {
    fn default() -> Self {
        Self::from_rigid_body(&RigidBodyState::default())
    }
}

impl KinematicsComponent {
    /// Snapshot the host rigid-body state, deriving the body-frame quantities.
    pub fn from_rigid_body(body: &RigidBodyState) -> Self {
        let attitude_inv = body.attitude.inverse();
        Self {
            position: body.position,
            attitude: body.attitude,
            attitude_inv,
            velocity: body.velocity,
            velocity_body: attitude_inv * body.velocity,
            angular_velocity: body.angular_velocity,
            angular_velocity_body: attitude_inv * body.angular_velocity,
        }
    }

    /// Refresh in place from the host rigid-body state.
    pub fn refresh(&mut self, body: &RigidBodyState) {
        *self = Self::from_rigid_body(body);
    }

    /// Transform a world-space point into the body frame.
    pub fn world_to_body_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.attitude_inv * (point - self.position)
    }

    /// Transform a body-frame point into world space.
    pub fn body_to_world_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.position + self.attitude * point
    }

    /// Transform a world-space direction into the body frame.
    pub fn world_to_body_dir(&self, dir: &Vector3<f64>) -> Vector3<f64> {
        self.attitude_inv * dir
    }

    /// Transform a body-frame direction into world space.
    pub fn body_to_world_dir(&self, dir: &Vector3<f64>) -> Vector3<f64> {
        self.attitude * dir
    }

    /// Euler angles (roll, pitch, yaw) of the current attitude [rad]
    pub fn euler_angles(&self) -> Vector3<f64> {
        let (roll, pitch, yaw) = self.attitude.euler_angles();
        Vector3::new(roll, pitch, yaw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_body_frame_velocity() {
        let body = RigidBodyState {
            velocity: Vector3::new(10.0, 0.0, 0.0),
            attitude: UnitQuaternion::from_euler_angles(0.0, 0.0, FRAC_PI_2),
            ..Default::default()
        };
        let kin = KinematicsComponent::from_rigid_body(&body);

        // Craft yawed 90 deg left of the velocity: motion appears along -Y in body frame
        assert_relative_eq!(kin.velocity_body.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(kin.velocity_body.y, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_round_trip() {
        let body = RigidBodyState {
            position: Vector3::new(5.0, -2.0, 1.0),
            attitude: UnitQuaternion::from_euler_angles(0.3, -0.2, 1.0),
            ..Default::default()
        };
        let kin = KinematicsComponent::from_rigid_body(&body);
        let p = Vector3::new(1.0, 2.0, 3.0);
        let round = kin.world_to_body_point(&kin.body_to_world_point(&p));
        assert_relative_eq!(round.x, p.x, epsilon = 1e-9);
        assert_relative_eq!(round.y, p.y, epsilon = 1e-9);
        assert_relative_eq!(round.z, p.z, epsilon = 1e-9);
    }
}
