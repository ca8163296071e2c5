use bevy::prelude::*;
use nalgebra::Vector3;

use crate::components::craft::FactionId;
use crate::resources::{HitTarget, SurfaceProbeResource};

/// Whether a shot from `origin` toward the target would land.
///
/// The ray is classified against what it first strikes: the target itself
/// passes, a friendly craft blocks, an opposing craft passes (it gets hit
/// instead, which is acceptable), and obstacles block only when the weapon
/// cares. A hit at or beyond the target distance is coincidental scenery and
/// passes.
pub fn line_of_sight(
    probe: &SurfaceProbeResource,
    origin: Vector3<f64>,
    direction: Vector3<f64>,
    target_entity: Option<Entity>,
    target_distance: f64,
    own_faction: Option<FactionId>,
    obstacles_block: bool,
    max_range: f64,
) -> bool {
    let Some(hit) = probe.raycast(origin, direction, max_range) else {
        return true;
    };

    if hit.distance >= target_distance - 1e-3 {
        return true;
    }

    match hit.target {
        HitTarget::Craft { entity, faction } => {
            if target_entity == Some(entity) {
                return true;
            }
            match (own_faction, faction) {
                (Some(own), Some(other)) if own == other => false,
                _ => true,
            }
        }
        HitTarget::Obstacle => !obstacles_block,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{RayHit, SurfaceProbe};

    struct FixedHit(Option<RayHit>);

    impl SurfaceProbe for FixedHit {
        fn raycast(&self, _: Vector3<f64>, _: Vector3<f64>, _: f64) -> Option<RayHit> {
            self.0
        }
    }

    fn hit_at(distance: f64, target: HitTarget) -> RayHit {
        RayHit {
            point: Vector3::new(distance, 0.0, 0.0),
            normal: Vector3::new(-1.0, 0.0, 0.0),
            smoothed_normal: None,
            distance,
            triangle_index: None,
            target,
        }
    }

    #[test]
    fn test_clear_ray_passes() {
        let probe = SurfaceProbeResource::new(FixedHit(None));
        assert!(line_of_sight(
            &probe,
            Vector3::zeros(),
            Vector3::x(),
            None,
            500.0,
            None,
            true,
            2000.0
        ));
    }

    #[test]
    fn test_friendly_craft_blocks() {
        let friendly = Entity::from_raw(3);
        let probe = SurfaceProbeResource::new(FixedHit(Some(hit_at(
            100.0,
            HitTarget::Craft {
                entity: friendly,
                faction: Some(FactionId(1)),
            },
        ))));

        let target = Entity::from_raw(9);
        assert!(!line_of_sight(
            &probe,
            Vector3::zeros(),
            Vector3::x(),
            Some(target),
            500.0,
            Some(FactionId(1)),
            true,
            2000.0
        ));

        // Unless the friendly is the target itself
        assert!(line_of_sight(
            &probe,
            Vector3::zeros(),
            Vector3::x(),
            Some(friendly),
            500.0,
            Some(FactionId(1)),
            true,
            2000.0
        ));
    }

    #[test]
    fn test_opposing_craft_passes() {
        let probe = SurfaceProbeResource::new(FixedHit(Some(hit_at(
            100.0,
            HitTarget::Craft {
                entity: Entity::from_raw(4),
                faction: Some(FactionId(2)),
            },
        ))));
        assert!(line_of_sight(
            &probe,
            Vector3::zeros(),
            Vector3::x(),
            Some(Entity::from_raw(9)),
            500.0,
            Some(FactionId(1)),
            true,
            2000.0
        ));
    }

    #[test]
    fn test_obstacle_respects_blocking_flag() {
        let probe = SurfaceProbeResource::new(FixedHit(Some(hit_at(100.0, HitTarget::Obstacle))));
        assert!(!line_of_sight(
            &probe,
            Vector3::zeros(),
            Vector3::x(),
            None,
            500.0,
            None,
            true,
            2000.0
        ));
        assert!(line_of_sight(
            &probe,
            Vector3::zeros(),
            Vector3::x(),
            None,
            500.0,
            None,
            false,
            2000.0
        ));
    }

    #[test]
    fn test_hit_beyond_target_is_coincidental() {
        let probe = SurfaceProbeResource::new(FixedHit(Some(hit_at(800.0, HitTarget::Obstacle))));
        assert!(line_of_sight(
            &probe,
            Vector3::zeros(),
            Vector3::x(),
            None,
            500.0,
            None,
            true,
            2000.0
        ));
    }
}
