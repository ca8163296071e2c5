pub mod craft;
pub mod damage;
pub mod events;
pub mod input;
pub mod physics;
pub mod spatial;
pub mod surfaces;
pub mod thruster;
pub mod weapon;

pub use craft::{
    ArcadeConfig, AssistConfig, ConfigError, CraftConfig, DragConfig, FactionComponent, FactionId,
    GravityConfig, GroundFollowConfig, LaneConfig, PhysicsModel, RespawnPolicy, StartPose,
    TranslationAssistConfig,
};
pub use damage::{
    performance_from_health, DamageComponent, DamageConfig, DamageKind, DamageModelKind,
    DamageRegionConfig, DamageRegionState, PoseSnapshot, RegionRef, RegionVolume, SHIELD_DESTROYED,
};
pub use events::{
    ApplyDamageEvent, CraftDestroyedEvent, DamageEvent, OutOfAmmoEvent, WeaponFiredEvent,
};
pub use input::ControlInputs;
pub use physics::{Force, ForceCategory, Moment, PhysicsComponent, ReferenceFrame};
pub use spatial::{KinematicsComponent, RigidBodyState};
pub use surfaces::{
    AeroSurfacesComponent, ControlSurfaceConfig, ControlSurfaceRole, ControlSurfaceState,
    WingConfig, WingState,
};
pub use thruster::{
    ForceRole, MomentRole, PowerState, ThrusterConfig, ThrusterState, ThrusterSystemComponent,
    ThrusterSystemConfig,
};
pub use weapon::{
    FireTrigger, TurretConfig, TurretState, WeaponConfig, WeaponKind, WeaponState,
    WeaponSystemComponent, WeaponTarget, TURRET_LOCK_TOLERANCE,
};
