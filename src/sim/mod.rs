//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod abilities;
pub mod ai;
pub mod brawler;
pub mod collision;
pub mod combat;
pub mod director;
pub mod entity;
pub mod rect;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod world;
pub mod zone;

pub use brawler::{BrawlerDef, BrawlerKind, StarPower, SuperAbility};
pub use director::{MatchResult, Participant};
pub use entity::{Character, Emote, Pickup, Pool, Projectile, StatusEffect};
pub use rect::Rect;
pub use snapshot::{HudSnapshot, RenderSnapshot};
pub use state::{GameEvent, MatchPhase, MatchState};
pub use tick::{TickInput, tick};
pub use world::{Obstacle, ObstacleKind, World};
pub use zone::HazardZone;
