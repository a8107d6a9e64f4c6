//! Bot behaviour
//!
//! Each tick every bot picks one intent in priority order: get back inside
//! the safe zone, regroup with a straying teammate, grab a nearby power cube,
//! then fight whatever is closest (enemy or power box). The same logic
//! drives the player when autopilot is on.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::abilities;
use super::brawler::SuperAbility;
use super::entity::Emote;
use super::state::{GameEvent, MatchState};
use super::world::ObstacleKind;
use crate::angle_between;
use crate::consts::*;

/// How close a power cube must be before a bot detours for it
const PICKUP_DETOUR: f32 = 350.0;
/// Enemies in bushes are only noticed this close
const BUSH_SIGHT: f32 = CHARACTER_RADIUS * 4.0;

/// What a character wants to do this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Intent {
    pub move_dir: Vec2,
    pub aim: Option<Vec2>,
    pub fire: bool,
    pub use_super: bool,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Enemy { pos: Vec2, range: f32, dist: f32 },
    PowerBox { pos: Vec2, dist: f32 },
}

impl Target {
    fn dist(&self) -> f32 {
        match *self {
            Target::Enemy { dist, .. } | Target::PowerBox { dist, .. } => dist,
        }
    }
}

fn toward(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

fn nearest_enemy(state: &MatchState, idx: usize) -> Option<Target> {
    let me = &state.characters[idx];
    state
        .characters
        .iter()
        .filter(|c| c.active && c.team != me.team)
        .map(|c| (c, c.pos.distance(me.pos)))
        .filter(|(c, dist)| *dist <= BUSH_SIGHT || !state.world.in_bush(c.pos))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, dist)| Target::Enemy {
            pos: c.pos,
            range: c.def().range,
            dist,
        })
}

fn nearest_power_box(state: &MatchState, pos: Vec2) -> Option<Target> {
    if !state.mode.drops_power_cubes() {
        return None;
    }
    state
        .world
        .obstacles
        .iter()
        .filter(|o| o.kind == ObstacleKind::PowerBox)
        .map(|o| (o.rect.center(), o.rect.distance_to(pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(pos, dist)| Target::PowerBox { pos, dist })
}

/// Owner for summons, otherwise the closest living teammate
fn anchor_ally(state: &MatchState, idx: usize) -> Option<(Vec2, f32)> {
    let me = &state.characters[idx];
    if let Some(owner) = me.owner {
        return state
            .character(owner)
            .filter(|o| o.active)
            .map(|o| (o.pos, o.pos.distance(me.pos)));
    }
    if !state.mode.is_team_mode() {
        return None;
    }
    state
        .characters
        .iter()
        .filter(|c| c.active && c.team == me.team && c.id != me.id && !c.is_summon())
        .map(|c| (c.pos, c.pos.distance(me.pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn super_worth_it(state: &MatchState, idx: usize, dist: f32) -> bool {
    let me = &state.characters[idx];
    let def = me.def();
    match def.super_ability {
        None => false,
        Some(SuperAbility::HealBurst { .. }) => me.health < me.max_health * 0.6,
        Some(SuperAbility::Summon { .. }) => dist < def.range * 1.5,
        Some(SuperAbility::Leap { range, .. }) | Some(SuperAbility::Blink { range, .. }) => {
            dist <= range
        }
        Some(SuperAbility::Charge {
            duration, speed, ..
        }) => dist <= duration * speed * 0.8,
        Some(SuperAbility::SpreadBurst { range, .. })
        | Some(SuperAbility::Volley { range, .. })
        | Some(SuperAbility::Throw { range, .. }) => dist <= range,
    }
}

/// Strafe direction that flips every couple of seconds
fn strafe(state: &MatchState, idx: usize, facing: Vec2) -> Vec2 {
    let me = &state.characters[idx];
    let phase = (state.now * 0.5 + me.id as f32 * 0.37).floor() as i64;
    let side = if phase % 2 == 0 { 1.0 } else { -1.0 };
    facing.perp() * side * 0.6
}

/// Pick this tick's intent for the character at `idx`
pub fn decide(state: &MatchState, idx: usize) -> Intent {
    let me = &state.characters[idx];
    let pos = me.pos;
    let def = me.def();

    if !state.zone.contains(pos) {
        return Intent {
            move_dir: toward(pos, state.zone.center()),
            ..Intent::default()
        };
    }

    let enemy = nearest_enemy(state, idx);
    let target = match (enemy, nearest_power_box(state, pos)) {
        (Some(e), Some(b)) => Some(if b.dist() < e.dist() { b } else { e }),
        (e, b) => e.or(b),
    };

    if let Some((ally_pos, ally_dist)) = anchor_ally(state, idx)
        && ally_dist > ALLY_LEASH
        && target.is_none_or(|t| t.dist() > ally_dist)
    {
        return Intent {
            move_dir: toward(pos, ally_pos),
            ..Intent::default()
        };
    }

    if !me.is_summon() {
        let cube = state
            .pickups
            .iter()
            .map(|p| (p.pos, p.pos.distance(pos)))
            .filter(|(_, d)| *d < PICKUP_DETOUR)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((cube_pos, cube_dist)) = cube
            && enemy.is_none_or(|e| e.dist() > cube_dist)
        {
            return Intent {
                move_dir: toward(pos, cube_pos),
                ..Intent::default()
            };
        }
    }

    match target {
        None => Intent::default(),
        Some(Target::Enemy {
            pos: enemy_pos,
            range,
            dist,
        }) => {
            let standoff = (range * STANDOFF_FACTOR)
                .min(def.range * 0.9)
                .max(CHARACTER_RADIUS * 2.0);
            let facing = toward(pos, enemy_pos);
            let move_dir = if dist > standoff {
                facing
            } else if dist < standoff * 0.6 {
                -facing
            } else {
                strafe(state, idx, facing)
            };
            Intent {
                move_dir,
                aim: Some(enemy_pos),
                fire: dist <= def.range,
                use_super: me.super_ready() && super_worth_it(state, idx, dist),
            }
        }
        Some(Target::PowerBox { pos: box_pos, dist }) => {
            let move_dir = if dist > def.range * 0.7 {
                toward(pos, box_pos)
            } else {
                Vec2::ZERO
            };
            Intent {
                move_dir,
                aim: Some(box_pos),
                fire: dist <= def.range * 0.9,
                use_super: false,
            }
        }
    }
}

/// Carry out an intent: move with wall avoidance, face, then attack
pub fn apply_intent(state: &mut MatchState, idx: usize, intent: Intent, dt: f32) {
    let Some(me) = state.characters.get(idx) else {
        return;
    };
    let (id, now) = (me.id, state.now);
    let expected = me.move_speed(now) * dt;

    if intent.move_dir != Vec2::ZERO {
        let moved = state.move_character(idx, intent.move_dir, dt);
        if moved < expected * 0.25 {
            // Blocked: try sidestepping around the obstacle
            let side = intent.move_dir.perp() * if id % 2 == 0 { 1.0 } else { -1.0 };
            let moved = state.move_character(idx, side, dt);
            if moved < expected * 0.25 {
                state.move_character(idx, -side, dt);
            }
        }
    } else {
        state.characters[idx].vel = Vec2::ZERO;
    }

    if let Some(aim) = intent.aim {
        let me = &mut state.characters[idx];
        me.angle = angle_between(me.pos, aim);
        if intent.use_super {
            abilities::try_super(state, id, aim);
        }
        if intent.fire {
            abilities::try_basic_attack(state, id, aim);
        }
    } else if intent.move_dir != Vec2::ZERO {
        state.characters[idx].angle = intent.move_dir.y.atan2(intent.move_dir.x);
    }
}

fn maybe_emote(state: &mut MatchState, idx: usize) {
    let roll: f32 = state.rng.random();
    if roll >= EMOTE_CHANCE {
        return;
    }
    let Some(&emote) = Emote::ALL.choose(&mut state.rng) else {
        return;
    };
    let now = state.now;
    let me = &mut state.characters[idx];
    me.emote = Some((emote, now + EMOTE_DURATION));
    let by = me.id;
    state.push_event(GameEvent::Emote { by, emote });
}

/// Drive every bot, and the player too when `autopilot` is set
pub fn update_bots(state: &mut MatchState, dt: f32, autopilot: bool) {
    for idx in 0..state.characters.len() {
        let c = &state.characters[idx];
        if !c.active || c.motion.is_some() || (c.is_player && !autopilot) {
            continue;
        }
        let intent = decide(state, idx);
        apply_intent(state, idx, intent, dt);
        if !state.characters[idx].is_player {
            maybe_emote(state, idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameMode;
    use crate::sim::brawler::BrawlerKind;
    use crate::sim::rect::Rect;

    #[test]
    fn test_retreats_into_zone_first() {
        let mut state = MatchState::sandbox(GameMode::Solo, 1);
        let me = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::new(200.0, 200.0));
        state.add_test_character(BrawlerKind::Frost, 1, Vec2::new(300.0, 200.0));
        state.zone.shrink_start = 0.0;
        state.zone.shrink_duration = 0.0;
        state.zone.update(1.0);

        let idx = state.character_index(me).unwrap();
        let intent = decide(&state, idx);
        assert!(!intent.fire);
        assert!(intent.move_dir.dot(toward(Vec2::new(200.0, 200.0), state.zone.center())) > 0.99);
    }

    #[test]
    fn test_closes_to_standoff_and_fires_in_range() {
        let mut state = MatchState::sandbox(GameMode::Solo, 1);
        let me = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::new(300.0, 1000.0));
        state.add_test_character(BrawlerKind::Frost, 1, Vec2::new(1500.0, 1000.0));
        let idx = state.character_index(me).unwrap();

        let far = decide(&state, idx);
        assert!(far.move_dir.x > 0.9);
        assert!(!far.fire);

        state.characters[idx].pos = Vec2::new(1500.0 - 380.0, 1000.0);
        let near = decide(&state, idx);
        assert!(near.fire);
        assert_eq!(near.aim, Some(Vec2::new(1500.0, 1000.0)));
    }

    #[test]
    fn test_regroups_with_distant_teammate() {
        let mut state = MatchState::sandbox(GameMode::Duo, 1);
        let me = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::new(300.0, 1000.0));
        state.add_test_character(BrawlerKind::Medic, 0, Vec2::new(300.0, 300.0));
        state.add_test_character(BrawlerKind::Frost, 1, Vec2::new(1700.0, 1700.0));
        let idx = state.character_index(me).unwrap();
        let intent = decide(&state, idx);
        assert!(intent.move_dir.y < -0.99);
        assert!(!intent.fire);
    }

    #[test]
    fn test_targets_power_box_when_closer() {
        let mut state = MatchState::sandbox(GameMode::Solo, 1);
        let me = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::new(300.0, 1000.0));
        state.add_test_character(BrawlerKind::Frost, 1, Vec2::new(1700.0, 1700.0));
        let center = Vec2::new(500.0, 1000.0);
        state
            .world
            .add_obstacle(Rect::from_center_size(center, Vec2::splat(70.0)), ObstacleKind::PowerBox);
        let idx = state.character_index(me).unwrap();
        let intent = decide(&state, idx);
        assert_eq!(intent.aim, Some(center));
        assert!(intent.fire);
    }

    #[test]
    fn test_sidesteps_around_wall() {
        let mut state = MatchState::sandbox(GameMode::Solo, 1);
        let me = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::new(500.0, 1000.0));
        state.world.add_obstacle(
            Rect::new(Vec2::new(530.0, 900.0), Vec2::new(600.0, 1100.0)),
            ObstacleKind::Stone,
        );
        let idx = state.character_index(me).unwrap();
        let start = state.characters[idx].pos;
        apply_intent(
            &mut state,
            idx,
            Intent {
                move_dir: Vec2::X,
                ..Intent::default()
            },
            SIM_DT,
        );
        assert_ne!(state.characters[idx].pos, start);
    }

    #[test]
    fn test_player_left_alone_without_autopilot() {
        let mut state = MatchState::sandbox(GameMode::Solo, 1);
        let me = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::new(300.0, 1000.0));
        state.add_test_character(BrawlerKind::Frost, 1, Vec2::new(1500.0, 1000.0));
        update_bots(&mut state, SIM_DT, false);
        assert_eq!(state.character(me).map(|c| c.pos), Some(Vec2::new(300.0, 1000.0)));
        update_bots(&mut state, SIM_DT, true);
        assert_ne!(state.character(me).map(|c| c.pos), Some(Vec2::new(300.0, 1000.0)));
    }
}
