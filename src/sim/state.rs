//! Match state and core simulation bookkeeping
//!
//! Everything the tick mutates lives in [`MatchState`]. Collections are kept
//! sorted by entity id so iteration order never depends on insertion quirks.

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::brawler::BrawlerKind;
use super::director::MatchResult;
use super::entity::{
    Character, Emote, FloatingText, Particle, ParticleKind, Pickup, Pool, Projectile, TextKind,
};
use super::schedule::Scheduler;
use super::world::World;
use super::zone::HazardZone;
use crate::config::{GameMode, MatchConfig};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Pre-round countdown; nobody can act
    Countdown,
    /// Active gameplay
    Playing,
    /// Knockout: a round was decided, waiting for the reset
    RoundEnd,
    /// Match over; the state no longer changes
    GameOver,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Countdown { seconds: u32 },
    MatchStarted,
    RoundStarted { round: u32 },
    Hit {
        target: u32,
        attacker: Option<u32>,
        amount: f32,
    },
    Healed { target: u32, amount: f32 },
    Killed { victim: u32, killer: Option<u32> },
    SuperUsed { by: u32, brawler: BrawlerKind },
    Summoned { by: u32, summon: u32 },
    Emote { by: u32, emote: Emote },
    Respawned { id: u32 },
    RespawnCancelled { id: u32 },
    PowerCubeCollected { by: u32, team: u8 },
    ObstacleDestroyed { id: u32, pos: Vec2 },
    RoundWon { team: Option<u8>, score: [u32; 2] },
    MatchEnded { rank: u32 },
}

/// Complete match state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct MatchState {
    pub seed: u64,
    pub rng: Pcg32,
    pub mode: GameMode,
    /// Simulation clock in seconds
    pub now: f32,
    pub time_ticks: u64,
    pub phase: MatchPhase,
    /// Seconds left in the countdown
    pub countdown: f32,
    /// When play first started
    pub started_at: Option<f32>,
    /// Seconds spent in the playing phase across all rounds
    pub play_time: f32,
    pub world: World,
    pub zone: HazardZone,
    /// Sorted by id
    pub characters: Vec<Character>,
    /// Sorted by id; resolution happens in this order
    pub projectiles: Vec<Projectile>,
    pub pools: Vec<Pool>,
    pub pickups: Vec<Pickup>,
    /// Visual only
    pub particles: Vec<Particle>,
    /// Visual only
    pub texts: Vec<FloatingText>,
    /// Events raised during the most recent tick
    pub events: Vec<GameEvent>,
    pub scheduler: Scheduler,
    pub player_id: u32,
    /// Knockout round wins per team
    pub round_score: [u32; 2],
    pub round: u32,
    /// Victory banner is up and the end is scheduled
    pub victory_pending: bool,
    pub result: Option<MatchResult>,
    pub max_particles: usize,
    pub floating_text: bool,
    next_id: u32,
}

impl MatchState {
    fn empty(mode: GameMode, seed: u64, world: World, settings: &Settings) -> Self {
        let zone = HazardZone::new(world.bounds(), mode.has_hazard_zone());
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode,
            now: 0.0,
            time_ticks: 0,
            phase: MatchPhase::Countdown,
            countdown: COUNTDOWN_DURATION,
            started_at: None,
            play_time: 0.0,
            world,
            zone,
            characters: Vec::new(),
            projectiles: Vec::new(),
            pools: Vec::new(),
            pickups: Vec::new(),
            particles: Vec::new(),
            texts: Vec::new(),
            events: Vec::new(),
            scheduler: Scheduler::new(),
            player_id: 0,
            round_score: [0, 0],
            round: 1,
            victory_pending: false,
            result: None,
            max_particles: settings.max_particles(),
            floating_text: settings.floating_text,
            next_id: 1,
        }
    }

    /// Build the arena and roster for a validated config
    pub fn new(config: &MatchConfig, settings: &Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let world = World::generate(&mut rng, config.mode);
        let mut state = Self::empty(config.mode, config.seed, world, settings);
        state.rng = rng;

        let player_team = 0;
        let player_pos = state.spawn_point(player_team, 0);
        let player_id = state.spawn_character(
            config.brawler,
            player_team,
            config.level,
            config.player_name.clone(),
            player_pos,
        );
        state.player_id = player_id;
        if let Some(player) = state.character_mut(player_id) {
            player.is_player = true;
            player.skin = config.skin.clone();
            player.star_power = config
                .star_power
                .and_then(|i| config.brawler.def().star_powers.get(i).copied());
            let pos = player.pos;
            let shield = player.shield_until;
            player.restore(pos, shield);
        }

        let mut team_slots = [1usize, 0usize];
        for (i, name) in config.opponents.iter().enumerate() {
            let team = match config.mode {
                GameMode::Solo => (i + 1) as u8,
                // Player pairs with the first bot, the rest pair up in order
                GameMode::Duo => i.div_ceil(2) as u8,
                GameMode::Knockout => u8::from(i >= 2),
            };
            let slot = if config.mode.is_round_based() {
                let side = usize::from(team);
                let slot = team_slots[side];
                team_slots[side] += 1;
                slot
            } else {
                0
            };
            let pos = state.spawn_point(team, slot);

            let kind = BrawlerKind::PLAYABLE
                .choose(&mut state.rng)
                .copied()
                .unwrap_or(BrawlerKind::Buckshot);
            let offset: i16 = state.rng.random_range(-1..=1);
            let level = (config.level as i16 + offset).clamp(1, MAX_LEVEL as i16) as u8;
            let id = state.spawn_character(kind, team, level, name.clone(), pos);

            let star_roll: f32 = state.rng.random();
            let star = if star_roll < 0.5 {
                kind.def().star_powers.choose(&mut state.rng).copied()
            } else {
                None
            };
            if let Some(bot) = state.character_mut(id) {
                bot.star_power = star;
                let (pos, shield) = (bot.pos, bot.shield_until);
                bot.restore(pos, shield);
            }
        }

        log::info!(
            "Match ready: {} {} (level {}) vs {} bots, seed {}",
            config.mode.as_str(),
            config.brawler.name(),
            config.level,
            config.opponents.len(),
            config.seed
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Knockout uses fixed spawn rows; other modes scatter at random
    pub fn spawn_point(&self, team: u8, slot: usize) -> Option<Vec2> {
        if self.mode.is_round_based() {
            let spawns = self.world.team_spawns(usize::from(team));
            spawns.get(slot % spawns.len()).copied()
        } else {
            None
        }
    }

    /// Random open position, falling back to a jittered map centre
    pub fn open_position(&mut self) -> Vec2 {
        if let Some(pos) = self
            .world
            .random_open_position(&mut self.rng, CHARACTER_RADIUS)
        {
            return pos;
        }
        let jitter = Vec2::new(
            self.rng.random_range(-60.0..60.0),
            self.rng.random_range(-60.0..60.0),
        );
        self.world
            .push_out(self.world.center() + jitter, CHARACTER_RADIUS)
    }

    /// Add a character at `pos` (or a random open spot) with full health,
    /// full ammo and a spawn shield that outlasts the countdown
    pub fn spawn_character(
        &mut self,
        kind: BrawlerKind,
        team: u8,
        level: u8,
        name: String,
        pos: Option<Vec2>,
    ) -> u32 {
        let id = self.next_entity_id();
        let pos = match pos {
            Some(p) => p,
            None => self.open_position(),
        };
        let mut character = Character::new(id, name, kind, team, level, pos);
        let shield = self.now + SPAWN_SHIELD_DURATION + COUNTDOWN_DURATION;
        character.restore(pos, shield);
        self.characters.push(character);
        id
    }

    /// Drop a power cube near `origin`, staying out of walls
    pub fn spawn_pickup(&mut self, origin: Vec2) -> u32 {
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let dist = self.rng.random_range(0.0..PICKUP_SCATTER);
        let mut pos = origin + crate::direction(angle) * dist;
        if self.world.collides(pos, PICKUP_RADIUS) {
            pos = origin;
        }
        let id = self.next_entity_id();
        self.pickups.push(Pickup { id, pos });
        id
    }

    pub fn character_index(&self, id: u32) -> Option<usize> {
        self.characters.binary_search_by_key(&id, |c| c.id).ok()
    }

    pub fn character(&self, id: u32) -> Option<&Character> {
        self.character_index(id).map(|i| &self.characters[i])
    }

    pub fn character_mut(&mut self, id: u32) -> Option<&mut Character> {
        self.character_index(id).map(move |i| &mut self.characters[i])
    }

    pub fn player(&self) -> Option<&Character> {
        self.character(self.player_id)
    }

    pub fn player_team(&self) -> u8 {
        self.player().map_or(0, |p| p.team)
    }

    /// Teams with a non-summon member alive or waiting to respawn
    pub fn teams_in_play(&self) -> Vec<u8> {
        let mut teams: Vec<u8> = self
            .characters
            .iter()
            .filter(|c| !c.is_summon() && c.in_play())
            .map(|c| c.team)
            .collect();
        teams.sort_unstable();
        teams.dedup();
        teams
    }

    /// Teams with a non-summon member currently alive
    pub fn teams_alive(&self) -> Vec<u8> {
        let mut teams: Vec<u8> = self
            .characters
            .iter()
            .filter(|c| !c.is_summon() && c.active)
            .map(|c| c.team)
            .collect();
        teams.sort_unstable();
        teams.dedup();
        teams
    }

    /// Move a character along `dir` at its current speed, sliding on walls.
    /// Returns the distance actually covered.
    pub fn move_character(&mut self, idx: usize, dir: Vec2, dt: f32) -> f32 {
        let now = self.now;
        let world = &self.world;
        let Some(character) = self.characters.get_mut(idx) else {
            return 0.0;
        };
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO || dt <= 0.0 {
            character.vel = Vec2::ZERO;
            return 0.0;
        }
        let delta = dir * character.move_speed(now) * dt;
        let next = world.slide(character.pos, delta, CHARACTER_RADIUS);
        let moved = next.distance(character.pos);
        character.vel = (next - character.pos) / dt;
        character.pos = next;
        moved
    }

    /// Deterministic pseudo-random value in 0..1 for visual effects only,
    /// so particle settings never shift gameplay RNG
    fn visual_noise(&self, salt: u32) -> f32 {
        let hash = (self.time_ticks as u32)
            .wrapping_mul(2654435761)
            .wrapping_add(salt.wrapping_mul(2246822519))
            .rotate_left(13)
            .wrapping_mul(3266489917);
        (hash % 1000) as f32 / 1000.0
    }

    pub fn spawn_particles(&mut self, pos: Vec2, kind: ParticleKind, count: usize) {
        let room = self.max_particles.saturating_sub(self.particles.len());
        for i in 0..count.min(room) {
            let salt = (self.particles.len() + i) as u32;
            let angle = self.visual_noise(salt) * std::f32::consts::TAU;
            let speed = 60.0 + self.visual_noise(salt ^ 0x5bd1) * 180.0;
            let size = 3.0 + self.visual_noise(salt ^ 0x1b87) * 5.0;
            self.particles.push(Particle {
                pos,
                vel: crate::direction(angle) * speed,
                kind,
                life: 1.0,
                size,
            });
        }
    }

    pub fn float_text(&mut self, pos: Vec2, text: String, kind: TextKind) {
        if !self.floating_text {
            return;
        }
        self.texts.push(FloatingText {
            pos: pos - Vec2::new(0.0, CHARACTER_RADIUS + 10.0),
            text,
            kind,
            life: 1.0,
        });
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.characters.sort_by_key(|c| c.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.pools.sort_by_key(|p| p.id);
        self.pickups.sort_by_key(|p| p.id);
    }

    /// Empty open arena already in play, for driving the sim by hand
    #[cfg(test)]
    pub fn sandbox(mode: GameMode, seed: u64) -> Self {
        let world = World::bordered(WORLD_WIDTH, WORLD_HEIGHT);
        let mut state = Self::empty(mode, seed, world, &Settings::default());
        state.phase = MatchPhase::Playing;
        state.countdown = 0.0;
        state.started_at = Some(0.0);
        state
    }

    /// Unshielded character; the first one added becomes the player
    #[cfg(test)]
    pub fn add_test_character(&mut self, kind: BrawlerKind, team: u8, pos: Vec2) -> u32 {
        let name = format!("{} {}", kind.name(), self.characters.len() + 1);
        let id = self.spawn_character(kind, team, 1, name, Some(pos));
        let first = self.characters.len() == 1;
        if let Some(c) = self.character_mut(id) {
            c.shield_until = 0.0;
            c.is_player = first;
        }
        if first {
            self.player_id = id;
        }
        id
    }
}
