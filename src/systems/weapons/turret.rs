use nalgebra::{UnitQuaternion, Vector3};

use crate::components::{
    KinematicsComponent, TurretConfig, TurretState, WeaponConfig, TURRET_LOCK_TOLERANCE,
};
use crate::utils::math::{move_toward, wrap_angle};

/// Time until a projectile launched at `projectile_speed` meets a target at
/// `relative_position` moving with `relative_velocity`.
///
/// The meeting condition `|p + v t| = v_p t` squares into
/// `(v_p^2 - v_t^2) t^2 - 2 (p . v) t - d^2 = 0`; solved for the smallest
/// positive root, with a linear fallback when the speeds match.
/// `None` when no intercept exists.
pub fn intercept_time(
    relative_position: &Vector3<f64>,
    relative_velocity: &Vector3<f64>,
    projectile_speed: f64,
) -> Option<f64> {
    let distance_sq = relative_position.norm_squared();
    if distance_sq < 1e-9 {
        return Some(0.0);
    }

    let a = projectile_speed * projectile_speed - relative_velocity.norm_squared();
    let b = -2.0 * relative_position.dot(relative_velocity);
    let c = -distance_sq;

    if a.abs() < 1e-6 {
        // Equal speeds degenerate to a line; solvable only while closing
        if b.abs() < 1e-9 {
            return None;
        }
        let t = -c / b;
        return (t > 0.0).then_some(t);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);

    let t = match (t1 > 0.0, t2 > 0.0) {
        (true, true) => t1.min(t2),
        (true, false) => t1,
        (false, true) => t2,
        (false, false) => return None,
    };
    Some(t)
}

/// Aim point for a weapon, leading the target by the intercept solution.
///
/// Beams and target-guided projectiles aim straight at the target, as does
/// anything with no relative motion to lead.
pub fn predicted_intercept(
    weapon_position: &Vector3<f64>,
    target_position: &Vector3<f64>,
    target_velocity: &Vector3<f64>,
    shooter_velocity: &Vector3<f64>,
    projectile_speed: f64,
    lead_target: bool,
) -> Vector3<f64> {
    let relative_velocity = target_velocity - shooter_velocity;
    if !lead_target || relative_velocity.norm_squared() < 1e-9 {
        return *target_position;
    }

    let relative_position = target_position - weapon_position;
    match intercept_time(&relative_position, &relative_velocity, projectile_speed) {
        Some(t) => target_position + relative_velocity * t,
        None => *target_position,
    }
}

/// Turret-local yaw/pitch solution for a world-space aim point, relative to
/// the weapon's rest fire direction.
#[derive(Debug, Clone, Copy)]
pub struct TurretAim {
    pub yaw: f64,
    pub pitch: f64,
}

pub fn aim_angles(
    config: &WeaponConfig,
    kinematics: &KinematicsComponent,
    aim_point: &Vector3<f64>,
) -> Option<TurretAim> {
    let weapon_world = kinematics.body_to_world_point(&config.position);
    let direction = kinematics.world_to_body_dir(&(aim_point - weapon_world));
    if direction.norm_squared() < 1e-9 {
        return None;
    }
    let direction = direction.normalize();

    let yaw = direction.y.atan2(direction.x);
    let pitch = (-direction.z).atan2((direction.x * direction.x + direction.y * direction.y).sqrt());

    let rest = config.fire_direction;
    let rest_yaw = rest.y.atan2(rest.x);
    let rest_pitch = (-rest.z).atan2((rest.x * rest.x + rest.y * rest.y).sqrt());

    Some(TurretAim {
        yaw: wrap_angle(yaw - rest_yaw),
        pitch: pitch - rest_pitch,
    })
}

/// Slew the turret pivots toward an aim solution (or back to rest when idle),
/// updating the facing/lock-on/parked bookkeeping.
pub fn move_turret(
    turret: &TurretConfig,
    state: &mut TurretState,
    aim: Option<TurretAim>,
    dt: f64,
) {
    match aim {
        Some(aim) => {
            state.idle_timer = 0.0;
            state.parked = false;

            let clamped_yaw = aim.yaw.clamp(turret.yaw_min, turret.yaw_max);
            let clamped_pitch = aim.pitch.clamp(turret.pitch_min, turret.pitch_max);
            state.facing_target = (clamped_yaw - aim.yaw).abs() < 1e-9
                && (clamped_pitch - aim.pitch).abs() < 1e-9;
            state.target_yaw = clamped_yaw;
            state.target_pitch = clamped_pitch;

            let step = turret.angular_speed * dt;
            state.yaw = move_toward(state.yaw, state.target_yaw, step);
            state.pitch = move_toward(state.pitch, state.target_pitch, step);

            state.locked_on = state.facing_target
                && (state.yaw - state.target_yaw).abs() <= TURRET_LOCK_TOLERANCE
                && (state.pitch - state.target_pitch).abs() <= TURRET_LOCK_TOLERANCE;
        }
        None => {
            state.locked_on = false;
            state.facing_target = false;
            state.idle_timer += dt;

            if let Some(delay) = turret.park_delay {
                if state.idle_timer >= delay && !state.parked {
                    let step = turret.angular_speed * dt;
                    state.yaw = move_toward(state.yaw, 0.0, step);
                    state.pitch = move_toward(state.pitch, 0.0, step);
                    state.target_yaw = 0.0;
                    state.target_pitch = 0.0;
                    if state.yaw.abs() < 1e-3 && state.pitch.abs() < 1e-3 {
                        state.parked = true;
                    }
                }
            }
        }
    }
}

/// World-space muzzle rotation: the craft attitude composed with the turret
/// pivots (yaw about the mount vertical, then pitch).
pub fn turret_rotation(state: &TurretState) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(0.0, state.pitch, state.yaw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_head_on_intercept() {
        // Target 1000 m ahead, closing at 100 m/s; projectile at 400 m/s
        let t = intercept_time(
            &Vector3::new(1000.0, 0.0, 0.0),
            &Vector3::new(-100.0, 0.0, 0.0),
            400.0,
        )
        .unwrap();
        assert_relative_eq!(t, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_crossing_intercept_leads_target() {
        let rel_pos = Vector3::new(500.0, 0.0, 0.0);
        let rel_vel = Vector3::new(0.0, 50.0, 0.0);
        let t = intercept_time(&rel_pos, &rel_vel, 300.0).unwrap();
        // Projectile travel distance must equal |p + v t|
        let predicted = rel_pos + rel_vel * t;
        assert_relative_eq!(predicted.norm(), 300.0 * t, epsilon = 1e-6);
    }

    #[test]
    fn test_equal_speed_linear_branch() {
        // Closing component present: the linear fallback stays finite
        let t = intercept_time(
            &Vector3::new(800.0, 0.0, 0.0),
            &Vector3::new(-200.0, 0.0, 0.0),
            200.0,
        )
        .unwrap();
        assert!(t.is_finite());
        assert!(t > 0.0);
        assert_relative_eq!(t, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_equal_speed_receding_has_no_solution() {
        let t = intercept_time(
            &Vector3::new(800.0, 0.0, 0.0),
            &Vector3::new(200.0, 0.0, 0.0),
            200.0,
        );
        assert!(t.is_none());
    }

    #[test]
    fn test_outrun_projectile_has_no_solution() {
        let t = intercept_time(
            &Vector3::new(1000.0, 0.0, 0.0),
            &Vector3::new(400.0, 0.0, 0.0),
            100.0,
        );
        assert!(t.is_none());
    }

    #[test]
    fn test_beam_aims_directly() {
        let aim = predicted_intercept(
            &Vector3::zeros(),
            &Vector3::new(100.0, 0.0, 0.0),
            &Vector3::new(0.0, 50.0, 0.0),
            &Vector3::zeros(),
            300.0,
            false,
        );
        assert_relative_eq!(aim.y, 0.0);
    }

    #[test]
    fn test_turret_clamps_to_travel_limits() {
        let turret = TurretConfig {
            yaw_min: -0.5,
            yaw_max: 0.5,
            pitch_min: -0.2,
            pitch_max: 0.6,
            angular_speed: 100.0,
            park_delay: None,
        };
        let mut state = TurretState::default();

        move_turret(
            &turret,
            &mut state,
            Some(TurretAim { yaw: 2.0, pitch: -1.0 }),
            1.0,
        );
        assert_relative_eq!(state.yaw, 0.5);
        assert_relative_eq!(state.pitch, -0.2);
        assert!(!state.facing_target);
        assert!(!state.locked_on);
    }

    #[test]
    fn test_lock_on_within_tolerance() {
        let turret = TurretConfig {
            angular_speed: 10.0,
            ..Default::default()
        };
        let mut state = TurretState::default();
        let aim = TurretAim {
            yaw: 0.3,
            pitch: 0.1,
        };

        move_turret(&turret, &mut state, Some(aim), 0.005);
        assert!(!state.locked_on);

        for _ in 0..20 {
            move_turret(&turret, &mut state, Some(aim), 0.01);
        }
        assert!(state.locked_on);
        assert_relative_eq!(state.yaw, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_parking_after_delay() {
        let turret = TurretConfig {
            angular_speed: 5.0,
            park_delay: Some(1.0),
            ..Default::default()
        };
        let mut state = TurretState {
            yaw: 0.8,
            pitch: 0.4,
            ..Default::default()
        };

        // Before the delay nothing moves
        move_turret(&turret, &mut state, None, 0.5);
        assert_relative_eq!(state.yaw, 0.8);
        assert!(!state.parked);

        for _ in 0..40 {
            move_turret(&turret, &mut state, None, 0.1);
        }
        assert!(state.parked);
        assert_relative_eq!(state.yaw, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_aim_angles_relative_to_rest_direction() {
        let config = WeaponConfig::default();
        let kinematics = KinematicsComponent::default();

        let aim = aim_angles(&config, &kinematics, &Vector3::new(10.0, 10.0, 0.0)).unwrap();
        assert_relative_eq!(aim.yaw, std::f64::consts::FRAC_PI_4, epsilon = 1e-9);
        assert_relative_eq!(aim.pitch, 0.0, epsilon = 1e-9);

        // Above the weapon (body -Z is up)
        let aim = aim_angles(&config, &kinematics, &Vector3::new(10.0, 0.0, -10.0)).unwrap();
        assert!(aim.pitch > 0.0);
    }
}
