pub mod components;
pub mod plugins;
pub mod resources;
pub mod systems;
pub mod utils;

pub use components::{
    ControlInputs, CraftConfig, DamageComponent, DamageKind, DamageModelKind, KinematicsComponent,
    PhysicsComponent, PhysicsModel, RegionRef, RigidBodyState,
};
pub use plugins::{CraftBundle, CraftPlugin, CraftSet};
pub use resources::{PhysicsConfig, SimRng, SurfaceProbe, SurfaceProbeResource};
pub use systems::FeedbackController;
pub use utils::SimError;
