//! Brawl Arena - a top-down arena brawler simulation
//!
//! Core modules:
//! - `sim`: Fixed-step combat simulation (world, entities, combat, AI, match flow)
//! - `config`: Match configuration handed in by the surrounding application
//! - `settings`: Presentation-facing simulation settings
//! - `session`: Frame loop driver, HUD refresh and match-end reporting

pub mod config;
pub mod session;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, GameMode, MatchConfig};
pub use session::Session;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Simulation tuning constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one pass per animation frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the session will accept
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena dimensions
    pub const WORLD_WIDTH: f32 = 2000.0;
    pub const WORLD_HEIGHT: f32 = 2000.0;
    /// Thickness of the permanent border wall strips
    pub const WALL_THICKNESS: f32 = 40.0;
    /// Number of randomly placed obstacles
    pub const OBSTACLE_COUNT: usize = 40;
    pub const OBSTACLE_MIN_SIZE: f32 = 60.0;
    pub const OBSTACLE_MAX_SIZE: f32 = 180.0;
    /// Open circle kept clear around the map centre
    pub const KEEP_OUT_RADIUS: f32 = 260.0;
    /// Extra reach added to destruction radius checks
    pub const DESTROY_MARGIN: f32 = 30.0;
    /// Integrity of a power box
    pub const POWER_BOX_HP: f32 = 4000.0;

    /// Character body radius
    pub const CHARACTER_RADIUS: f32 = 28.0;
    pub const MAX_LEVEL: u8 = 11;
    /// Stat bonus per level above 1
    pub const LEVEL_BONUS: f32 = 0.1;
    pub const MAX_AMMO: f32 = 3.0;
    /// Super charge needed to fire a super
    pub const MAX_POWER: f32 = 100.0;
    pub const SPAWN_SHIELD_DURATION: f32 = 3.0;
    pub const COUNTDOWN_DURATION: f32 = 3.0;
    /// Spawn placement attempts before falling back to the map centre
    pub const SPAWN_ATTEMPTS: u32 = 10;

    /// Seconds without damage or shooting before health regenerates
    pub const REGEN_DELAY: f32 = 3.0;
    /// Fraction of max health regenerated per second
    pub const REGEN_RATE: f32 = 0.13;

    /// Power cube bonuses
    pub const CUBE_HEALTH_BONUS: f32 = 400.0;
    pub const CUBE_DAMAGE_FACTOR: f32 = 0.1;
    pub const PICKUP_RADIUS: f32 = 20.0;
    /// Scatter distance when a cube drops
    pub const PICKUP_SCATTER: f32 = 40.0;

    /// Hazard zone schedule
    pub const ZONE_SHRINK_DELAY: f32 = 30.0;
    pub const ZONE_SHRINK_DURATION: f32 = 90.0;
    pub const ZONE_MIN_SIZE: f32 = 400.0;
    pub const ZONE_TICK_INTERVAL: f32 = 1.0;
    pub const ZONE_BASE_DAMAGE: f32 = 300.0;
    pub const ZONE_DAMAGE_STEP: f32 = 150.0;

    /// Match flow timings
    pub const RESPAWN_DELAY: f32 = 5.0;
    pub const ROUNDS_TO_WIN: u32 = 2;
    pub const ROUND_END_DELAY: f32 = 2.5;
    pub const VICTORY_DELAY: f32 = 1.5;

    /// AI tuning
    pub const ALLY_LEASH: f32 = 450.0;
    pub const STANDOFF_FACTOR: f32 = 0.85;
    pub const EMOTE_CHANCE: f32 = 0.002;
    pub const EMOTE_DURATION: f32 = 2.0;

    /// Visual-only timings
    pub const HIT_FLASH_DURATION: f32 = 0.12;
    pub const FLOATING_TEXT_LIFE: f32 = 0.9;
}

/// Unit vector pointing along `angle`
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Clamp `target` so it lies at most `max_dist` away from `origin`
#[inline]
pub fn clamp_reach(origin: Vec2, target: Vec2, max_dist: f32) -> Vec2 {
    let offset = target - origin;
    let dist = offset.length();
    if dist > max_dist && dist > 0.0 {
        origin + offset / dist * max_dist
    } else {
        target
    }
}
