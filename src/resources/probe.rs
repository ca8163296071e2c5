use bevy::prelude::*;
use nalgebra::Vector3;

use crate::components::craft::FactionId;

/// What a probe ray struck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    /// Static world geometry.
    Obstacle,
    Craft {
        entity: Entity,
        faction: Option<FactionId>,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Vector3<f64>,
    /// Face normal at the hit.
    pub normal: Vector3<f64>,
    /// Vertex-interpolated normal when the host geometry provides one.
    pub smoothed_normal: Option<Vector3<f64>>,
    pub distance: f64,
    pub triangle_index: Option<u32>,
    pub target: HitTarget,
}

/// Raycast primitive supplied by the host physics layer.
///
/// Invoked synchronously within the tick; a `None` result degrades the caller
/// (no ground reference, no line of sight) rather than erroring.
pub trait SurfaceProbe: Send + Sync {
    fn raycast(
        &self,
        origin: Vector3<f64>,
        direction: Vector3<f64>,
        max_distance: f64,
    ) -> Option<RayHit>;
}

/// A probe that never hits; the default until the host installs one.
pub struct NullProbe;

impl SurfaceProbe for NullProbe {
    fn raycast(&self, _: Vector3<f64>, _: Vector3<f64>, _: f64) -> Option<RayHit> {
        None
    }
}

#[derive(Resource)]
pub struct SurfaceProbeResource(pub Box<dyn SurfaceProbe>);

impl Default for SurfaceProbeResource {
    fn default() -> Self {
        Self(Box::new(NullProbe))
    }
}

impl SurfaceProbeResource {
    pub fn new(probe: impl SurfaceProbe + 'static) -> Self {
        Self(Box::new(probe))
    }

    pub fn raycast(
        &self,
        origin: Vector3<f64>,
        direction: Vector3<f64>,
        max_distance: f64,
    ) -> Option<RayHit> {
        self.0.raycast(origin, direction, max_distance)
    }
}
