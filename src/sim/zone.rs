//! Shrinking safe zone (solo and duo)
//!
//! The zone starts as the whole map, begins closing a fixed delay after play
//! starts and hurts anyone outside it on a fixed tick. Each consecutive tick
//! outside hurts more than the last; stepping back inside resets the count.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat::{self, DamageKind, DamageSource};
use super::entity::StatusEffect;
use super::rect::Rect;
use super::state::MatchState;
use crate::consts::*;

/// The safe area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardZone {
    pub enabled: bool,
    /// Starting rectangle (whole map)
    pub full: Rect,
    /// Final rectangle once shrinking completes
    pub target: Rect,
    /// Current safe rectangle
    pub current: Rect,
    /// Time shrinking begins; infinite until armed
    pub shrink_start: f32,
    pub shrink_duration: f32,
}

impl HazardZone {
    pub fn new(bounds: Rect, enabled: bool) -> Self {
        let target = Rect::from_center_size(bounds.center(), Vec2::splat(ZONE_MIN_SIZE));
        Self {
            enabled,
            full: bounds,
            target,
            current: bounds,
            shrink_start: f32::INFINITY,
            shrink_duration: ZONE_SHRINK_DURATION,
        }
    }

    /// Start the shrink timer when play begins
    pub fn arm(&mut self, now: f32) {
        self.shrink_start = now + ZONE_SHRINK_DELAY;
    }

    /// Shrink progress, 0..=1
    pub fn progress(&self, now: f32) -> f32 {
        if !self.enabled || now < self.shrink_start {
            return 0.0;
        }
        if self.shrink_duration <= 0.0 {
            return 1.0;
        }
        ((now - self.shrink_start) / self.shrink_duration).clamp(0.0, 1.0)
    }

    pub fn update(&mut self, now: f32) {
        self.current = self.full.lerp(&self.target, self.progress(now));
    }

    /// Is `point` safe
    pub fn contains(&self, point: Vec2) -> bool {
        !self.enabled || self.current.contains(point)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.current.center()
    }
}

/// Damage for the n-th consecutive tick outside the zone (0-based)
#[inline]
pub fn zone_tick_damage(consecutive_ticks: u32) -> f32 {
    ZONE_BASE_DAMAGE + ZONE_DAMAGE_STEP * consecutive_ticks as f32
}

/// Shrink the zone and hurt everyone standing outside it
pub fn update(state: &mut MatchState) {
    if !state.zone.enabled {
        return;
    }
    let now = state.now;
    state.zone.update(now);

    for idx in 0..state.characters.len() {
        let character = &mut state.characters[idx];
        if !character.active {
            continue;
        }
        if state.zone.contains(character.pos) {
            character.clear_zone_exposure();
            continue;
        }

        let (count, next_tick) = character
            .status
            .iter()
            .find_map(|s| match *s {
                StatusEffect::Poisoned {
                    consecutive_ticks,
                    next_tick,
                } => Some((consecutive_ticks, next_tick)),
                _ => None,
            })
            .unwrap_or((0, now));

        if now < next_tick {
            continue;
        }

        character.apply_status(StatusEffect::Poisoned {
            consecutive_ticks: count + 1,
            next_tick: next_tick.max(now - ZONE_TICK_INTERVAL) + ZONE_TICK_INTERVAL,
        });
        combat::apply_damage(
            state,
            idx,
            zone_tick_damage(count),
            DamageSource {
                attacker: None,
                kind: DamageKind::Zone,
            },
        );
    }
}
