//! Entity records: characters, projectiles, pools, pickups and visual effects
//!
//! Every mutation that must respect a clamp (health, ammo, super charge)
//! goes through a method here so repeated reads always agree.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::brawler::{BrawlerDef, BrawlerKind, OnHit, PoolSpec, StarPower, level_multiplier};
use crate::consts::*;

/// Timed status effects; at most one of each kind per character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Damage over time, credited to `source`
    Burning {
        until: f32,
        damage: f32,
        interval: f32,
        next_tick: f32,
        source: u32,
    },
    /// Movement speed multiplied by `factor`
    Slowed { until: f32, factor: f32 },
    /// Standing outside the safe zone
    Poisoned { consecutive_ticks: u32, next_tick: f32 },
}

impl StatusEffect {
    fn same_kind(&self, other: &StatusEffect) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Zone exposure has no expiry; it is removed on re-entry
    pub fn expired(&self, now: f32) -> bool {
        match *self {
            StatusEffect::Burning { until, .. } | StatusEffect::Slowed { until, .. } => now >= until,
            StatusEffect::Poisoned { .. } => false,
        }
    }
}

/// Super-driven movement that overrides normal input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Arcing jump, landing handled by a scheduled action
    Leap {
        from: Vec2,
        to: Vec2,
        start: f32,
        duration: f32,
    },
    /// Ram along `dir`, hitting each enemy at most once
    Charge {
        dir: Vec2,
        until: f32,
        speed: f32,
        damage: f32,
        hit: Vec<u32>,
    },
}

/// Cosmetic emotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emote {
    Laugh,
    Angry,
    Sad,
    ThumbsUp,
    GoodGame,
}

impl Emote {
    pub const ALL: [Emote; 5] = [
        Emote::Laugh,
        Emote::Angry,
        Emote::Sad,
        Emote::ThumbsUp,
        Emote::GoodGame,
    ];
}

/// A combatant, human or bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    pub name: String,
    pub brawler: BrawlerKind,
    pub team: u8,
    pub is_player: bool,
    /// Character that summoned this one
    pub owner: Option<u32>,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle (radians)
    pub angle: f32,
    pub active: bool,
    pub health: f32,
    pub max_health: f32,
    /// Continuous ammo, 0..=MAX_AMMO
    pub ammo: f32,
    /// Super charge, 0..=MAX_POWER
    pub power: f32,
    pub level: u8,
    pub power_cubes: u32,
    pub last_shot: f32,
    pub last_damage: f32,
    pub shield_until: f32,
    /// 0 when no respawn is pending
    pub respawn_at: f32,
    pub skin: Option<String>,
    pub star_power: Option<StarPower>,
    pub status: Vec<StatusEffect>,
    pub motion: Option<Motion>,
    pub emote: Option<(Emote, f32)>,
    pub hit_flash_until: f32,
    pub kills: u32,
    pub cubes_collected: u32,
}

impl Character {
    pub fn new(id: u32, name: String, brawler: BrawlerKind, team: u8, level: u8, pos: Vec2) -> Self {
        let mut character = Self {
            id,
            name,
            brawler,
            team,
            is_player: false,
            owner: None,
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            active: true,
            health: 0.0,
            max_health: 0.0,
            ammo: MAX_AMMO,
            power: 0.0,
            level: level.clamp(1, MAX_LEVEL),
            power_cubes: 0,
            last_shot: f32::NEG_INFINITY,
            last_damage: f32::NEG_INFINITY,
            shield_until: 0.0,
            respawn_at: 0.0,
            skin: None,
            star_power: None,
            status: Vec::new(),
            motion: None,
            emote: None,
            hit_flash_until: 0.0,
            kills: 0,
            cubes_collected: 0,
        };
        character.max_health = character.base_max_health();
        character.health = character.max_health;
        character
    }

    #[inline]
    pub fn def(&self) -> &'static BrawlerDef {
        self.brawler.def()
    }

    #[inline]
    pub fn is_summon(&self) -> bool {
        self.owner.is_some()
    }

    #[inline]
    pub fn level_multiplier(&self) -> f32 {
        level_multiplier(self.level)
    }

    /// Max health from level, star power and collected cubes
    pub fn base_max_health(&self) -> f32 {
        let tough = match self.star_power {
            Some(StarPower::Tough(f)) => f,
            _ => 1.0,
        };
        self.def().health * self.level_multiplier() * tough
            + self.power_cubes as f32 * CUBE_HEALTH_BONUS
    }

    /// Outgoing damage scale
    #[inline]
    pub fn damage_multiplier(&self) -> f32 {
        self.level_multiplier() * (1.0 + self.power_cubes as f32 * CUBE_DAMAGE_FACTOR)
    }

    /// Damage of one basic attack projectile
    #[inline]
    pub fn attack_damage(&self) -> f32 {
        self.def().damage * self.damage_multiplier()
    }

    pub fn move_speed(&self, now: f32) -> f32 {
        let swift = match self.star_power {
            Some(StarPower::SwiftFeet(f)) => f,
            _ => 1.0,
        };
        self.def().speed * swift * self.slow_factor(now)
    }

    pub fn reload_duration(&self) -> f32 {
        let quick = match self.star_power {
            Some(StarPower::QuickReload(f)) => f,
            _ => 1.0,
        };
        (self.def().reload * quick).max(0.01)
    }

    pub fn regen_delay(&self) -> f32 {
        match self.star_power {
            Some(StarPower::SecondWind(secs)) => secs,
            _ => REGEN_DELAY,
        }
    }

    pub fn lifesteal(&self) -> f32 {
        match self.star_power {
            Some(StarPower::Lifesteal(ratio)) => ratio,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn shielded(&self, now: f32) -> bool {
        now < self.shield_until
    }

    /// Alive or waiting to respawn
    #[inline]
    pub fn in_play(&self) -> bool {
        self.active || self.respawn_at > 0.0
    }

    /// Subtract health, clamped at 0. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let amount = amount.max(0.0);
        let before = self.health;
        self.health = (self.health - amount).max(0.0);
        before - self.health
    }

    /// Add health, clamped at max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let amount = amount.max(0.0);
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Continuous reload toward MAX_AMMO
    pub fn reload(&mut self, dt: f32) {
        self.ammo = (self.ammo + dt / self.reload_duration()).clamp(0.0, MAX_AMMO);
    }

    /// Take one ammo if available
    pub fn spend_ammo(&mut self) -> bool {
        if self.ammo >= 1.0 {
            self.ammo = (self.ammo - 1.0).max(0.0);
            true
        } else {
            false
        }
    }

    pub fn add_power(&mut self, amount: f32) {
        self.power = (self.power + amount).clamp(0.0, MAX_POWER);
    }

    #[inline]
    pub fn super_ready(&self) -> bool {
        self.power >= MAX_POWER && self.def().super_ability.is_some()
    }

    pub fn slow_factor(&self, now: f32) -> f32 {
        self.status
            .iter()
            .filter_map(|s| match *s {
                StatusEffect::Slowed { until, factor } if now < until => Some(factor),
                _ => None,
            })
            .fold(1.0, f32::min)
    }

    /// Apply a status, replacing any of the same kind
    pub fn apply_status(&mut self, effect: StatusEffect) {
        self.status.retain(|s| !s.same_kind(&effect));
        self.status.push(effect);
    }

    pub fn clear_zone_exposure(&mut self) {
        self.status
            .retain(|s| !matches!(s, StatusEffect::Poisoned { .. }));
    }

    /// Consecutive hazard-zone ticks taken so far
    pub fn zone_ticks(&self) -> u32 {
        self.status
            .iter()
            .find_map(|s| match *s {
                StatusEffect::Poisoned {
                    consecutive_ticks, ..
                } => Some(consecutive_ticks),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Apply an on-hit status from `source`
    pub fn apply_on_hit(&mut self, on_hit: OnHit, source: u32, now: f32) {
        match on_hit {
            OnHit::Burn {
                damage,
                interval,
                duration,
            } => self.apply_status(StatusEffect::Burning {
                until: now + duration,
                damage,
                interval,
                next_tick: now + interval,
                source,
            }),
            OnHit::Slow { factor, duration } => self.apply_status(StatusEffect::Slowed {
                until: now + duration,
                factor,
            }),
        }
    }

    /// Full restore for spawn, respawn and round resets
    pub fn restore(&mut self, pos: Vec2, shield_until: f32) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.active = true;
        self.respawn_at = 0.0;
        self.max_health = self.base_max_health();
        self.health = self.max_health;
        self.ammo = MAX_AMMO;
        self.status.clear();
        self.motion = None;
        self.shield_until = shield_until;
    }
}

/// Arc data for lobbed projectiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lob {
    pub origin: Vec2,
    pub target: Vec2,
    pub launched_at: f32,
    pub flight: f32,
}

impl Lob {
    /// Flight progress, 0..=1
    pub fn progress(&self, now: f32) -> f32 {
        if self.flight <= 0.0 {
            return 1.0;
        }
        ((now - self.launched_at) / self.flight).clamp(0.0, 1.0)
    }
}

/// A fired shot or lobbed explosive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: u32,
    pub team: u8,
    pub pos: Vec2,
    /// Zero for lobbed projectiles
    pub vel: Vec2,
    pub origin: Vec2,
    pub damage: f32,
    pub radius: f32,
    /// Lobbed shots explode over this radius on landing
    pub blast_radius: Option<f32>,
    /// Destroys terrain instead of stopping
    pub wall_breaking: bool,
    pub is_super: bool,
    /// Leaves a pool on impact (damage already scaled)
    pub pool: Option<PoolSpec>,
    pub lob: Option<Lob>,
    pub max_range: Option<f32>,
    pub on_hit: Option<OnHit>,
}

impl Projectile {
    #[inline]
    pub fn traveled(&self) -> f32 {
        self.pos.distance(self.origin)
    }
}

/// Parameters of a direct-fire shot, also used for delayed shots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotSpec {
    pub damage: f32,
    pub speed: f32,
    pub radius: f32,
    pub range: f32,
    pub wall_breaking: bool,
    pub is_super: bool,
    pub on_hit: Option<OnHit>,
}

/// Parameters of a lobbed throw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrowSpec {
    pub target: Vec2,
    pub flight: f32,
    pub damage: f32,
    pub radius: f32,
    pub blast_radius: f32,
    pub pool: Option<PoolSpec>,
    pub wall_breaking: bool,
    pub is_super: bool,
}

/// A lingering damage-over-time zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub id: u32,
    pub owner: u32,
    pub team: u8,
    pub center: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub tick_rate: f32,
    pub spawned_at: f32,
    pub duration: f32,
    /// Last time this pool chipped a power box
    pub last_box_tick: f32,
}

impl Pool {
    #[inline]
    pub fn expired(&self, now: f32) -> bool {
        now >= self.spawned_at + self.duration
    }
}

/// A power cube lying on the ground
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub pos: Vec2,
}

/// Particle look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Debris,
    Spark,
    Heal,
    Smoke,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextKind {
    Damage,
    Heal,
    Info,
}

/// Floating combat text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub kind: TextKind,
    pub life: f32,
}
