pub mod aerodynamics;
pub mod assist;
pub mod damage;
pub mod feedback;
pub mod forces;
pub mod propulsion;
pub mod weapons;

pub use aerodynamics::aerodynamics_system;
pub use assist::{flight_assist_system, AssistComponent};
pub use damage::{
    add_health, apply_damage, damage_application_system, propagate_to_components, respawn_pose,
    respawn_snapshot_system, shield_absorb, shield_recharge_system, DamageOutcome, DamageRequest,
    RegionDamage,
};
pub use feedback::FeedbackController;
pub use forces::{force_summation_system, kinematics_sync_system};
pub use propulsion::propulsion_system;
pub use weapons::weapon_control_system;
