use bevy::prelude::*;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shield charge value marking a depleted shield. Distinguished from 0.0 so a
/// collapsed shield does not absorb the hit that destroyed it.
pub const SHIELD_DESTROYED: f64 = -0.01;

/// Number of discrete damage kinds; multiplier tables are repaired to this length.
pub const DAMAGE_KIND_COUNT: usize = 6;

/// Margin added to region volumes during point-containment hit tests [m]
pub const HIT_TEST_EPSILON: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Kinetic,
    Energy,
    Explosive,
    Fire,
    Electrical,
    Collision,
}

impl DamageKind {
    pub fn index(&self) -> usize {
        match self {
            DamageKind::Kinetic => 0,
            DamageKind::Energy => 1,
            DamageKind::Explosive => 2,
            DamageKind::Fire => 3,
            DamageKind::Electrical => 4,
            DamageKind::Collision => 5,
        }
    }
}

/// How incoming damage is distributed across the craft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageModelKind {
    /// Main region only, no component damage.
    Simple,
    /// Main region plus damage propagation to components.
    Progressive,
    /// Main region, positional localized regions, and component propagation.
    Localized,
}

/// Which damage region a component belongs to.
///
/// A closed tag instead of an index with offset semantics: `Main` and
/// `Localized(0)` are distinct values, so no off-by-one convention exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegionRef {
    #[default]
    None,
    Main,
    Localized(usize),
}

/// Axis-aligned volume in the body frame used for hit localization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegionVolume {
    pub center: Vector3<f64>,
    pub extents: Vector3<f64>,
}

impl RegionVolume {
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        let d = point - self.center;
        d.x.abs() <= self.extents.x + HIT_TEST_EPSILON
            && d.y.abs() <= self.extents.y + HIT_TEST_EPSILON
            && d.z.abs() <= self.extents.z + HIT_TEST_EPSILON
    }
}

impl Default for RegionVolume {
    fn default() -> Self {
        Self {
            center: Vector3::zeros(),
            extents: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageRegionConfig {
    pub name: String,
    pub invincible: bool,
    pub volume: RegionVolume,
    pub starting_health: f64,
    /// Shield capacity; 0 disables shielding for this region.
    pub shielding_amount: f64,
    /// Shield charge regained per second once the delay has elapsed.
    pub shield_recharge_rate: f64,
    /// Seconds without damage before the shield starts recharging.
    pub shield_recharge_delay: f64,
    /// Damage below this amount is fully absorbed without depleting the shield.
    pub shielding_damage_threshold: f64,
    /// Repair overflow above starting health feeds the shield when set.
    pub repair_overflow_to_shield: bool,
    /// Per-`DamageKind` multiplier table, repaired to `DAMAGE_KIND_COUNT` entries.
    pub damage_multipliers: Vec<f64>,
    pub id: Uuid,
}

impl Default for DamageRegionConfig {
    fn default() -> Self {
        Self {
            name: "hull".to_string(),
            invincible: false,
            volume: RegionVolume::default(),
            starting_health: 100.0,
            shielding_amount: 0.0,
            shield_recharge_rate: 0.0,
            shield_recharge_delay: 5.0,
            shielding_damage_threshold: 0.0,
            repair_overflow_to_shield: false,
            damage_multipliers: vec![1.0; DAMAGE_KIND_COUNT],
            id: Uuid::nil(),
        }
    }
}

impl DamageRegionConfig {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: Uuid::new_v4(),
            ..Default::default()
        }
    }

    /// Repair an out-of-range multiplier table by padding/truncating to the
    /// expected fixed size.
    pub fn sanitize(&mut self) {
        if self.damage_multipliers.len() != DAMAGE_KIND_COUNT {
            warn!(
                "region '{}': repairing damage multiplier table ({} entries)",
                self.name,
                self.damage_multipliers.len()
            );
            self.damage_multipliers.resize(DAMAGE_KIND_COUNT, 1.0);
        }
        if self.id.is_nil() {
            self.id = Uuid::new_v4();
        }
    }

    pub fn multiplier(&self, kind: DamageKind) -> f64 {
        self.damage_multipliers
            .get(kind.index())
            .copied()
            .unwrap_or(1.0)
    }

    pub fn shielded(&self) -> bool {
        self.shielding_amount > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageConfig {
    pub model: DamageModelKind,
    pub main_region: DamageRegionConfig,
    /// Only consulted when `model` is `Localized`.
    pub localized_regions: Vec<DamageRegionConfig>,
    /// Use the main region's multiplier table for every region.
    pub use_main_multipliers: bool,
    /// Impulse divisor for collision-sourced damage; ~0 means collisions are fatal.
    pub collision_resistance: f64,
    /// Damage range mapped linearly onto [0, 1] rumble/camera-shake intensity.
    pub shake_min_damage: f64,
    pub shake_max_damage: f64,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            model: DamageModelKind::Progressive,
            main_region: DamageRegionConfig::default(),
            localized_regions: Vec::new(),
            use_main_multipliers: false,
            collision_resistance: 10.0,
            shake_min_damage: 1.0,
            shake_max_damage: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageRegionState {
    /// Unbounded below zero so overkill is preserved.
    pub health: f64,
    /// In [SHIELD_DESTROYED, shielding_amount].
    pub shield: f64,
    /// Seconds since this region last took damage.
    pub since_damaged: f64,
    /// Set once when health first crosses zero, so the host plays the
    /// destruction effect exactly once.
    pub destruction_triggered: bool,
}

impl DamageRegionState {
    pub fn from_config(config: &DamageRegionConfig) -> Self {
        Self {
            health: config.starting_health,
            shield: config.shielding_amount,
            since_damaged: f64::INFINITY,
            destruction_triggered: false,
        }
    }

    /// Health mapped into [0, 1]; zero starting health is defined as 0.
    pub fn health_normalised(&self, config: &DamageRegionConfig) -> f64 {
        if config.starting_health <= 0.0 {
            0.0
        } else {
            (self.health / config.starting_health).clamp(0.0, 1.0)
        }
    }

    pub fn shield_normalised(&self, config: &DamageRegionConfig) -> f64 {
        if config.shielding_amount <= 0.0 {
            0.0
        } else {
            (self.shield / config.shielding_amount).clamp(0.0, 1.0)
        }
    }

    pub fn shield_active(&self) -> bool {
        self.shield > 0.0
    }
}

/// Pose captured for the last-known-position respawn policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoseSnapshot {
    pub position: Vector3<f64>,
    pub attitude: nalgebra::UnitQuaternion<f64>,
}

/// Region health/shield state plus damage-event bookkeeping for one craft.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct DamageComponent {
    pub main: DamageRegionState,
    pub localized: Vec<DamageRegionState>,
    /// Monotonically increasing index of applied damage events.
    pub event_index: u64,
    pub destroyed: bool,
    pub last_known_pose: Option<PoseSnapshot>,
    /// Seconds since the last respawn pose snapshot.
    pub snapshot_timer: f64,
}

impl DamageComponent {
    pub fn from_config(config: &DamageConfig) -> Self {
        let localized = if config.model == DamageModelKind::Localized {
            config
                .localized_regions
                .iter()
                .map(DamageRegionState::from_config)
                .collect()
        } else {
            Vec::new()
        };
        Self {
            main: DamageRegionState::from_config(&config.main_region),
            localized,
            event_index: 0,
            destroyed: false,
            last_known_pose: None,
            snapshot_timer: 0.0,
        }
    }

    pub fn region_state(&self, region: RegionRef) -> Option<&DamageRegionState> {
        match region {
            RegionRef::None => None,
            RegionRef::Main => Some(&self.main),
            RegionRef::Localized(i) => self.localized.get(i),
        }
    }

    pub fn region_state_mut(&mut self, region: RegionRef) -> Option<&mut DamageRegionState> {
        match region {
            RegionRef::None => None,
            RegionRef::Main => Some(&mut self.main),
            RegionRef::Localized(i) => self.localized.get_mut(i),
        }
    }

    pub fn region_config<'a>(
        &self,
        config: &'a DamageConfig,
        region: RegionRef,
    ) -> Option<&'a DamageRegionConfig> {
        match region {
            RegionRef::None => None,
            RegionRef::Main => Some(&config.main_region),
            RegionRef::Localized(i) => config.localized_regions.get(i),
        }
    }
}

/// Shared health-to-performance mapping used by thrusters, wings, control
/// surfaces, and weapons: a clamped monotonic ramp over normalized health.
pub fn performance_from_health(health: f64, starting_health: f64, min_performance: f64) -> f64 {
    let normalised = if starting_health <= 0.0 {
        0.0
    } else {
        (health / starting_health).clamp(0.0, 1.0)
    };
    normalised.clamp(min_performance.clamp(0.0, 1.0), 1.0)
}
