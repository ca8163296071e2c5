mod craft;

pub use craft::{CraftBundle, CraftPlugin, CraftSet};
