//! Read-only views handed to the presentation layer
//!
//! Rendering and the HUD never touch [`MatchState`] directly; they get a
//! serializable copy of exactly what they draw.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::brawler::BrawlerKind;
use super::entity::{Emote, FloatingText, Motion, Particle, StatusEffect};
use super::rect::Rect;
use super::state::{GameEvent, MatchPhase, MatchState};
use super::world::ObstacleKind;
use crate::consts::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterView {
    pub id: u32,
    pub name: String,
    pub brawler: BrawlerKind,
    pub team: u8,
    pub is_player: bool,
    pub is_summon: bool,
    pub pos: Vec2,
    pub angle: f32,
    pub health: f32,
    pub max_health: f32,
    pub ammo: f32,
    pub power_cubes: u32,
    pub skin: Option<String>,
    pub shielded: bool,
    pub flashing: bool,
    pub hidden: bool,
    pub super_ready: bool,
    pub leaping: bool,
    pub charging: bool,
    pub burning: bool,
    pub slowed: bool,
    pub emote: Option<Emote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub radius: f32,
    pub team: u8,
    pub is_super: bool,
    /// Arc height 0..=1 for lobbed shots
    pub height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolView {
    pub center: Vec2,
    pub radius: f32,
    pub team: u8,
    /// Remaining lifetime 0..=1
    pub life: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleView {
    pub rect: Rect,
    pub kind: ObstacleKind,
    /// Remaining integrity 0..=1 (power boxes)
    pub integrity: f32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub time: f32,
    pub phase: MatchPhase,
    pub world_size: Vec2,
    pub zone: Option<Rect>,
    pub obstacles: Vec<ObstacleView>,
    pub characters: Vec<CharacterView>,
    pub projectiles: Vec<ProjectileView>,
    pub pools: Vec<PoolView>,
    pub pickups: Vec<Vec2>,
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    /// Events since the previous frame
    pub events: Vec<GameEvent>,
}

impl RenderSnapshot {
    pub fn capture(state: &MatchState, events: &[GameEvent]) -> Self {
        let now = state.now;
        let player_team = state.player_team();
        let characters = state
            .characters
            .iter()
            .filter(|c| c.active)
            .map(|c| {
                // Enemies in bushes are hidden unless someone is right next to them
                let in_bush = state.world.in_bush(c.pos);
                let spotted = state.characters.iter().any(|o| {
                    o.active && o.team == player_team && o.pos.distance(c.pos) < CHARACTER_RADIUS * 4.0
                });
                CharacterView {
                    id: c.id,
                    name: c.name.clone(),
                    brawler: c.brawler,
                    team: c.team,
                    is_player: c.is_player,
                    is_summon: c.is_summon(),
                    pos: c.pos,
                    angle: c.angle,
                    health: c.health,
                    max_health: c.max_health,
                    ammo: c.ammo,
                    power_cubes: c.power_cubes,
                    skin: c.skin.clone(),
                    shielded: c.shielded(now),
                    flashing: now < c.hit_flash_until,
                    hidden: in_bush && c.team != player_team && !spotted,
                    super_ready: c.super_ready(),
                    leaping: matches!(c.motion, Some(Motion::Leap { .. })),
                    charging: matches!(c.motion, Some(Motion::Charge { .. })),
                    burning: c
                        .status
                        .iter()
                        .any(|s| matches!(s, StatusEffect::Burning { .. })),
                    slowed: c.slow_factor(now) < 1.0,
                    emote: c.emote.map(|(e, _)| e),
                }
            })
            .collect();

        let projectiles = state
            .projectiles
            .iter()
            .map(|p| {
                let height = p.lob.map_or(0.0, |lob| {
                    let t = lob.progress(now);
                    4.0 * t * (1.0 - t)
                });
                ProjectileView {
                    pos: p.pos,
                    radius: p.radius,
                    team: p.team,
                    is_super: p.is_super,
                    height,
                }
            })
            .collect();

        let pools = state
            .pools
            .iter()
            .map(|p| PoolView {
                center: p.center,
                radius: p.radius,
                team: p.team,
                life: if p.duration > 0.0 {
                    (1.0 - (now - p.spawned_at) / p.duration).clamp(0.0, 1.0)
                } else {
                    0.0
                },
            })
            .collect();

        let obstacles = state
            .world
            .obstacles
            .iter()
            .map(|o| ObstacleView {
                rect: o.rect,
                kind: o.kind,
                integrity: if o.kind == ObstacleKind::PowerBox {
                    (o.hp / POWER_BOX_HP).clamp(0.0, 1.0)
                } else {
                    1.0
                },
            })
            .collect();

        Self {
            time: now,
            phase: state.phase,
            world_size: Vec2::new(state.world.width, state.world.height),
            zone: state.zone.enabled.then_some(state.zone.current),
            obstacles,
            characters,
            projectiles,
            pools,
            pickups: state.pickups.iter().map(|p| p.pos).collect(),
            particles: state.particles.clone(),
            texts: state.texts.clone(),
            events: events.to_vec(),
        }
    }
}

/// Values shown on the heads-up display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub health: f32,
    pub max_health: f32,
    pub ammo: f32,
    pub max_ammo: f32,
    pub level: u8,
    pub power_cubes: u32,
    /// Damage bonus from cubes, percent
    pub damage_boost_pct: f32,
    /// Super charge, percent
    pub super_pct: f32,
    pub teams_remaining: usize,
    /// Whole seconds until respawn
    pub respawn_in: Option<u32>,
    /// Whole seconds of countdown left
    pub countdown: Option<u32>,
    pub round_score: Option<[u32; 2]>,
    pub in_zone: bool,
}

impl HudSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        let now = state.now;
        let countdown = (state.phase == MatchPhase::Countdown)
            .then(|| state.countdown.ceil() as u32)
            .filter(|&s| s > 0);
        let round_score = state.mode.is_round_based().then(|| {
            // Player's side first
            if state.player_team() == 0 {
                state.round_score
            } else {
                [state.round_score[1], state.round_score[0]]
            }
        });
        let teams_remaining = state.teams_in_play().len();

        match state.player() {
            Some(p) => Self {
                health: p.health,
                max_health: p.max_health,
                ammo: p.ammo,
                max_ammo: MAX_AMMO,
                level: p.level,
                power_cubes: p.power_cubes,
                damage_boost_pct: p.power_cubes as f32 * CUBE_DAMAGE_FACTOR * 100.0,
                super_pct: p.power / MAX_POWER * 100.0,
                teams_remaining,
                respawn_in: (p.respawn_at > 0.0)
                    .then(|| (p.respawn_at - now).max(0.0).ceil() as u32),
                countdown,
                round_score,
                in_zone: state.zone.contains(p.pos),
            },
            None => Self {
                teams_remaining,
                countdown,
                round_score,
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameMode;

    #[test]
    fn test_hud_reflects_player() {
        let mut state = MatchState::sandbox(GameMode::Duo, 3);
        let p = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::splat(500.0));
        state.add_test_character(BrawlerKind::Frost, 1, Vec2::splat(1500.0));
        if let Some(c) = state.character_mut(p) {
            c.power = 50.0;
            c.power_cubes = 2;
            c.respawn_at = 0.0;
        }
        let hud = HudSnapshot::capture(&state);
        assert_eq!(hud.super_pct, 50.0);
        assert!((hud.damage_boost_pct - 20.0).abs() < 1e-4);
        assert_eq!(hud.teams_remaining, 2);
        assert_eq!(hud.respawn_in, None);
        assert_eq!(hud.countdown, None);
        assert_eq!(hud.round_score, None);

        let now = state.now;
        if let Some(c) = state.character_mut(p) {
            c.active = false;
            c.respawn_at = now + 4.2;
        }
        assert_eq!(HudSnapshot::capture(&state).respawn_in, Some(5));
    }

    #[test]
    fn test_render_hides_enemies_in_bushes() {
        let mut state = MatchState::sandbox(GameMode::Solo, 3);
        state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::splat(500.0));
        let enemy = state.add_test_character(BrawlerKind::Frost, 1, Vec2::splat(1500.0));
        state.world.add_obstacle(
            Rect::from_center_size(Vec2::splat(1500.0), Vec2::splat(200.0)),
            ObstacleKind::Bush,
        );
        let snap = RenderSnapshot::capture(&state, &[]);
        let view = snap.characters.iter().find(|c| c.id == enemy).unwrap();
        assert!(view.hidden);
        assert!(snap.zone.is_some());

        if let Some(c) = state.character_mut(enemy) {
            c.pos = Vec2::new(560.0, 500.0);
        }
        let snap = RenderSnapshot::capture(&state, &[]);
        assert!(!snap.characters.iter().any(|c| c.hidden));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = MatchState::sandbox(GameMode::Knockout, 3);
        state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::splat(500.0));
        let snap = RenderSnapshot::capture(&state, &[GameEvent::MatchStarted]);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("MatchStarted"));
        assert!(snap.zone.is_none());
        let hud = HudSnapshot::capture(&state);
        assert_eq!(hud.round_score, Some([0, 0]));
    }
}
