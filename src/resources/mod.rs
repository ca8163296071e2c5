pub mod config;
pub mod probe;

pub use config::{PhysicsConfig, SimRng};
pub use probe::{HitTarget, RayHit, SurfaceProbe, SurfaceProbeResource};
