pub mod errors;
pub mod math;
pub mod rng;

pub use errors::SimError;
pub use math::{deg_to_rad, lerp, move_toward, rad_to_deg, wrap_angle};
pub use rng::RngManager;
