//! Damage, deaths, projectiles, pools and power cubes
//!
//! Every source of harm funnels through [`apply_damage`], which owns the
//! shield check, super charge, lifesteal and death handling. Projectiles are
//! resolved one at a time in creation order and each resolves to exactly one
//! outcome per tick.

use glam::Vec2;

use super::brawler::OnHit;
use super::collision::{circle_circle_overlap, circle_rect_overlap, swept_circle_hit};
use super::entity::{ParticleKind, Pool, Projectile, StatusEffect, TextKind};
use super::state::{GameEvent, MatchState};
use super::world::{Obstacle, ObstacleKind};
use crate::consts::*;

/// What caused a damage instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    /// Basic attack hit; charges the attacker's super
    Attack,
    /// Super hit; never charges a super
    Super,
    Pool,
    Burn,
    Zone,
}

#[derive(Debug, Clone, Copy)]
pub struct DamageSource {
    pub attacker: Option<u32>,
    pub kind: DamageKind,
}

impl DamageSource {
    pub fn hit(attacker: u32, is_super: bool) -> Self {
        Self {
            attacker: Some(attacker),
            kind: if is_super {
                DamageKind::Super
            } else {
                DamageKind::Attack
            },
        }
    }

    #[inline]
    fn steals_life(&self) -> bool {
        matches!(self.kind, DamageKind::Attack | DamageKind::Super)
    }
}

/// An area hit
#[derive(Debug, Clone, Copy)]
pub struct Blast {
    pub center: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub owner: u32,
    pub team: u8,
    pub is_super: bool,
    pub wall_breaking: bool,
    pub on_hit: Option<OnHit>,
}

/// Damage the character at `idx`. Returns the health actually removed.
///
/// Shielded or inactive targets take nothing. A killing blow runs the
/// death handling before returning.
pub fn apply_damage(state: &mut MatchState, idx: usize, amount: f32, source: DamageSource) -> f32 {
    let now = state.now;
    let Some(target) = state.characters.get_mut(idx) else {
        return 0.0;
    };
    if !target.active || target.shielded(now) || amount <= 0.0 {
        return 0.0;
    }

    let dealt = target.take_damage(amount);
    target.last_damage = now;
    target.hit_flash_until = now + HIT_FLASH_DURATION;
    let (target_id, pos, died) = (target.id, target.pos, target.health <= 0.0);

    state.float_text(pos, format!("{:.0}", dealt), TextKind::Damage);
    state.push_event(GameEvent::Hit {
        target: target_id,
        attacker: source.attacker,
        amount: dealt,
    });

    if let Some(attacker_idx) = source
        .attacker
        .filter(|&a| a != target_id)
        .and_then(|a| state.character_index(a))
    {
        let attacker = &mut state.characters[attacker_idx];
        if source.kind == DamageKind::Attack {
            attacker.add_power(attacker.def().super_charge);
        }
        if source.steals_life() && attacker.active {
            let stolen = attacker.heal(dealt * attacker.lifesteal());
            if stolen > 0.0 {
                let (id, pos) = (attacker.id, attacker.pos);
                state.float_text(pos, format!("+{:.0}", stolen), TextKind::Heal);
                state.push_event(GameEvent::Healed { target: id, amount: stolen });
            }
        }
    }

    if died {
        handle_death(state, idx, source.attacker);
    }
    dealt
}

/// Heal the character at `idx`, with floating text. Returns the amount healed.
pub fn heal_character(state: &mut MatchState, idx: usize, amount: f32) -> f32 {
    let Some(character) = state.characters.get_mut(idx) else {
        return 0.0;
    };
    if !character.active {
        return 0.0;
    }
    let healed = character.heal(amount);
    let (id, pos) = (character.id, character.pos);
    if healed > 0.0 {
        state.float_text(pos, format!("+{:.0}", healed), TextKind::Heal);
        state.spawn_particles(pos, ParticleKind::Heal, 6);
        state.push_event(GameEvent::Healed { target: id, amount: healed });
    }
    healed
}

/// Take a character out of play
pub fn handle_death(state: &mut MatchState, idx: usize, killer: Option<u32>) {
    let now = state.now;
    let mode = state.mode;
    let Some(victim) = state.characters.get_mut(idx) else {
        return;
    };
    victim.active = false;
    victim.health = 0.0;
    victim.vel = Vec2::ZERO;
    victim.motion = None;
    victim.emote = None;
    victim.status.clear();
    victim.respawn_at = 0.0;
    let (victim_id, team, pos, is_summon) = (victim.id, victim.team, victim.pos, victim.is_summon());
    log::debug!("{} ({}) was eliminated", victim.name, victim.brawler.name());

    // Summon kills count for the summoner
    if let Some(credited) = killer
        .filter(|&k| k != victim_id)
        .and_then(|k| state.character(k))
        .map(|k| k.owner.unwrap_or(k.id))
        && let Some(k) = state.character_mut(credited)
    {
        k.kills += 1;
    }

    state.push_event(GameEvent::Killed {
        victim: victim_id,
        killer,
    });
    state.spawn_particles(pos, ParticleKind::Smoke, 12);

    if is_summon {
        return;
    }

    // Summons go down with their owner
    let orphans: Vec<usize> = state
        .characters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.active && c.owner == Some(victim_id))
        .map(|(i, _)| i)
        .collect();
    for orphan in orphans {
        handle_death(state, orphan, None);
    }

    if mode.drops_power_cubes() {
        state.spawn_pickup(pos);
    }

    if mode.allows_respawn() {
        let teammate_alive = state
            .characters
            .iter()
            .any(|c| c.team == team && c.id != victim_id && !c.is_summon() && c.active);
        if teammate_alive {
            state.characters[idx].respawn_at = now + RESPAWN_DELAY;
        } else {
            cancel_team_respawns(state, team);
        }
    }
}

/// Drop every pending respawn on `team`
pub fn cancel_team_respawns(state: &mut MatchState, team: u8) {
    let mut cancelled = Vec::new();
    for c in state
        .characters
        .iter_mut()
        .filter(|c| c.team == team && c.respawn_at > 0.0)
    {
        c.respawn_at = 0.0;
        cancelled.push(c.id);
    }
    for id in cancelled {
        log::debug!("Respawn cancelled for {}", id);
        state.push_event(GameEvent::RespawnCancelled { id });
    }
}

/// Debris, events and cube drops for removed terrain
pub fn break_obstacles(state: &mut MatchState, removed: Vec<Obstacle>) {
    for obstacle in removed {
        let center = obstacle.rect.center();
        state.spawn_particles(center, ParticleKind::Debris, 10);
        state.push_event(GameEvent::ObstacleDestroyed {
            id: obstacle.id,
            pos: center,
        });
        if obstacle.kind == ObstacleKind::PowerBox && state.mode.drops_power_cubes() {
            state.spawn_pickup(center);
        }
    }
}

/// Chip a power box. Returns true if it broke.
pub fn damage_power_box(state: &mut MatchState, index: usize, amount: f32) -> bool {
    let Some(obstacle) = state.world.obstacles.get_mut(index) else {
        return false;
    };
    if obstacle.kind != ObstacleKind::PowerBox {
        return false;
    }
    obstacle.hp -= amount.max(0.0);
    if obstacle.hp > 0.0 {
        let center = obstacle.rect.center();
        state.spawn_particles(center, ParticleKind::Debris, 2);
        return false;
    }
    match state.world.destroy_at(index) {
        Some(removed) => {
            break_obstacles(state, vec![removed]);
            true
        }
        None => false,
    }
}

fn damage_boxes_in(state: &mut MatchState, center: Vec2, radius: f32, amount: f32) {
    let hits: Vec<usize> = state
        .world
        .obstacles
        .iter()
        .enumerate()
        .filter(|(_, o)| o.kind == ObstacleKind::PowerBox && circle_rect_overlap(center, radius, &o.rect))
        .map(|(i, _)| i)
        .collect();
    // Highest index first so removals don't shift the rest
    for index in hits.into_iter().rev() {
        damage_power_box(state, index, amount);
    }
}

/// Hit every enemy and power box in the blast
pub fn explode(state: &mut MatchState, blast: Blast) {
    let now = state.now;
    let reach = blast.radius + CHARACTER_RADIUS;
    let targets: Vec<usize> = state
        .characters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.active && c.team != blast.team && c.pos.distance(blast.center) <= reach)
        .map(|(i, _)| i)
        .collect();

    let source = DamageSource::hit(blast.owner, blast.is_super);
    for idx in targets {
        let dealt = apply_damage(state, idx, blast.damage, source);
        if dealt > 0.0
            && let Some(on_hit) = blast.on_hit
            && state.characters[idx].active
        {
            state.characters[idx].apply_on_hit(on_hit, blast.owner, now);
        }
    }

    damage_boxes_in(state, blast.center, blast.radius, blast.damage);
    if blast.wall_breaking {
        let removed = state.world.destroy(blast.center, blast.radius);
        break_obstacles(state, removed);
    }
    state.spawn_particles(blast.center, ParticleKind::Spark, 14);
}

fn blast_for(p: &Projectile, radius: f32) -> Blast {
    Blast {
        center: p.pos,
        radius,
        damage: p.damage,
        owner: p.owner,
        team: p.team,
        is_super: p.is_super,
        wall_breaking: p.wall_breaking,
        on_hit: p.on_hit,
    }
}

/// Advance and resolve every projectile in creation order
pub fn update_projectiles(state: &mut MatchState, dt: f32) {
    let pending = std::mem::take(&mut state.projectiles);
    let mut survivors = Vec::with_capacity(pending.len());
    for mut projectile in pending {
        if step_projectile(state, &mut projectile, dt) {
            survivors.push(projectile);
        }
    }
    // Anything fired while resolving goes after the survivors
    survivors.append(&mut state.projectiles);
    state.projectiles = survivors;
}

/// Returns false once the projectile is consumed
fn step_projectile(state: &mut MatchState, p: &mut Projectile, dt: f32) -> bool {
    let now = state.now;

    // Lobbed shots ignore everything until they land
    if let Some(lob) = p.lob {
        let t = lob.progress(now);
        p.pos = lob.origin.lerp(lob.target, t);
        if t >= 1.0 {
            let radius = p.blast_radius.unwrap_or(p.radius);
            explode(state, blast_for(p, radius));
            if let Some(spec) = p.pool {
                let id = state.next_entity_id();
                state.pools.push(Pool {
                    id,
                    owner: p.owner,
                    team: p.team,
                    center: p.pos,
                    radius: spec.radius,
                    damage: spec.damage,
                    tick_rate: spec.tick_rate,
                    spawned_at: now,
                    duration: spec.duration,
                    last_box_tick: now,
                });
            }
            return false;
        }
        return true;
    }

    let prev = p.pos;
    p.pos += p.vel * dt;

    if !state.world.in_bounds(p.pos) {
        return false;
    }

    if let Some(range) = p.max_range
        && p.traveled() >= range
    {
        return false;
    }

    if let Some(index) = state.world.blocking_obstacle(p.pos, p.radius) {
        return hit_obstacle(state, p, index);
    }

    let target = state
        .characters
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.active
                && c.team != p.team
                && swept_circle_hit(prev, p.pos, p.radius, c.pos, CHARACTER_RADIUS)
        })
        .min_by(|(_, a), (_, b)| {
            a.pos
                .distance_squared(prev)
                .total_cmp(&b.pos.distance_squared(prev))
        })
        .map(|(i, c)| (i, c.shielded(now)));

    match target {
        // Shields swallow normal shots; wall breakers pass through
        Some((_, true)) => p.wall_breaking,
        Some((idx, false)) => {
            hit_character(state, p, idx);
            false
        }
        None => true,
    }
}

/// Returns true if the projectile keeps flying
fn hit_obstacle(state: &mut MatchState, p: &Projectile, index: usize) -> bool {
    if p.wall_breaking {
        if let Some(removed) = state.world.destroy_at(index) {
            break_obstacles(state, vec![removed]);
        }
        return true;
    }
    let is_box = state
        .world
        .obstacles
        .get(index)
        .is_some_and(|o| o.kind == ObstacleKind::PowerBox);
    if is_box {
        damage_power_box(state, index, p.damage);
    } else {
        state.spawn_particles(p.pos, ParticleKind::Spark, 3);
    }
    false
}

fn hit_character(state: &mut MatchState, p: &Projectile, idx: usize) {
    let dealt = apply_damage(state, idx, p.damage, DamageSource::hit(p.owner, p.is_super));
    if dealt > 0.0
        && let Some(on_hit) = p.on_hit
        && state.characters[idx].active
    {
        let now = state.now;
        state.characters[idx].apply_on_hit(on_hit, p.owner, now);
    }
    state.spawn_particles(p.pos, ParticleKind::Spark, 4);
}

/// Expire pools and tick them against enemies and power boxes
pub fn update_pools(state: &mut MatchState) {
    let now = state.now;
    state.pools.retain(|p| !p.expired(now));

    for pi in 0..state.pools.len() {
        let pool = state.pools[pi].clone();
        for idx in 0..state.characters.len() {
            let c = &state.characters[idx];
            if !c.active || c.team == pool.team {
                continue;
            }
            if !circle_circle_overlap(c.pos, CHARACTER_RADIUS * 0.5, pool.center, pool.radius) {
                continue;
            }
            // Gated by the target's own last-damage time
            if now - c.last_damage < pool.tick_rate {
                continue;
            }
            apply_damage(
                state,
                idx,
                pool.damage,
                DamageSource {
                    attacker: Some(pool.owner),
                    kind: DamageKind::Pool,
                },
            );
        }
        if now - pool.last_box_tick >= 1.0 {
            state.pools[pi].last_box_tick = now;
            damage_boxes_in(state, pool.center, pool.radius, pool.damage);
        }
    }
}

/// Tick burns and drop expired effects
pub fn update_status_effects(state: &mut MatchState) {
    let now = state.now;
    for idx in 0..state.characters.len() {
        let character = &mut state.characters[idx];
        if !character.active {
            continue;
        }
        let mut burns = Vec::new();
        for effect in character.status.iter_mut() {
            if let StatusEffect::Burning {
                until,
                damage,
                interval,
                next_tick,
                source,
            } = effect
            {
                while *next_tick <= now && *next_tick <= *until {
                    burns.push((*damage, *source));
                    *next_tick += interval.max(0.05);
                }
            }
        }
        character.status.retain(|s| !s.expired(now));

        for (damage, source) in burns {
            apply_damage(
                state,
                idx,
                damage,
                DamageSource {
                    attacker: Some(source),
                    kind: DamageKind::Burn,
                },
            );
        }
    }
}

/// Collect power cubes; the first eligible character by id wins
pub fn update_pickups(state: &mut MatchState) {
    let mut i = 0;
    while i < state.pickups.len() {
        let pos = state.pickups[i].pos;
        let collector = state
            .characters
            .iter()
            .find(|c| {
                c.active
                    && !c.is_summon()
                    && circle_circle_overlap(c.pos, CHARACTER_RADIUS, pos, PICKUP_RADIUS)
            })
            .map(|c| (c.id, c.team));
        match collector {
            Some((id, team)) => {
                state.pickups.remove(i);
                grant_power_cube(state, id, team);
            }
            None => i += 1,
        }
    }
}

/// Every living member of `team` gets the cube bonus
pub fn grant_power_cube(state: &mut MatchState, collector: u32, team: u8) {
    for c in state
        .characters
        .iter_mut()
        .filter(|c| c.team == team && c.active && !c.is_summon())
    {
        c.power_cubes += 1;
        c.max_health += CUBE_HEALTH_BONUS;
        c.health = (c.health + CUBE_HEALTH_BONUS).min(c.max_health);
        if c.id == collector {
            c.cubes_collected += 1;
        }
    }
    if let Some(pos) = state.character(collector).map(|c| c.pos) {
        state.float_text(pos, "+1 Power".to_string(), TextKind::Info);
    }
    state.push_event(GameEvent::PowerCubeCollected {
        by: collector,
        team,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameMode;
    use crate::sim::brawler::BrawlerKind;
    use crate::sim::entity::Lob;
    use crate::sim::rect::Rect;

    fn duel(mode: GameMode) -> (MatchState, u32, u32) {
        let mut state = MatchState::sandbox(mode, 5);
        let a = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::new(600.0, 1000.0));
        let b = state.add_test_character(BrawlerKind::Gunslinger, 1, Vec2::new(1400.0, 1000.0));
        (state, a, b)
    }

    fn shot(state: &mut MatchState, owner: u32, team: u8, pos: Vec2, vel: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            owner,
            team,
            pos,
            vel,
            origin: pos,
            damage: 500.0,
            radius: 8.0,
            blast_radius: None,
            wall_breaking: false,
            is_super: false,
            pool: None,
            lob: None,
            max_range: Some(2000.0),
            on_hit: None,
        });
        id
    }

    fn idx(state: &MatchState, id: u32) -> usize {
        state.character_index(id).unwrap()
    }

    #[test]
    fn test_basic_kill_flow() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let ai = idx(&state, a);
        state.characters[ai].health = 100.0;
        let pos = state.characters[ai].pos;

        let dealt = apply_damage(&mut state, ai, 150.0, DamageSource::hit(b, false));
        assert_eq!(dealt, 100.0);

        let victim = &state.characters[ai];
        assert_eq!(victim.health, 0.0);
        assert!(!victim.active);
        assert_eq!(state.pickups.len(), 1);
        assert!(state.pickups[0].pos.distance(pos) <= PICKUP_SCATTER);
        assert_eq!(state.teams_in_play(), vec![1]);
        assert_eq!(state.character(b).map(|c| c.kills), Some(1));
    }

    #[test]
    fn test_attack_hit_charges_super_but_super_hit_does_not() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let ai = idx(&state, a);
        apply_damage(&mut state, ai, 10.0, DamageSource::hit(b, false));
        let charge = BrawlerKind::Gunslinger.def().super_charge;
        assert_eq!(state.character(b).map(|c| c.power), Some(charge));

        apply_damage(&mut state, ai, 10.0, DamageSource::hit(b, true));
        assert_eq!(state.character(b).map(|c| c.power), Some(charge));
    }

    #[test]
    fn test_shield_blocks_everything() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let ai = idx(&state, a);
        state.characters[ai].shield_until = 100.0;
        let full = state.characters[ai].health;

        assert_eq!(apply_damage(&mut state, ai, 999.0, DamageSource::hit(b, false)), 0.0);
        let zone = DamageSource {
            attacker: None,
            kind: DamageKind::Zone,
        };
        assert_eq!(apply_damage(&mut state, ai, 999.0, zone), 0.0);
        assert_eq!(state.characters[ai].health, full);
        assert_eq!(state.character(b).map(|c| c.power), Some(0.0));
    }

    #[test]
    fn test_shielded_target_swallows_normal_shot_and_passes_wall_breaker() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let ai = idx(&state, a);
        state.characters[ai].shield_until = 100.0;
        let target = state.characters[ai].pos;

        shot(&mut state, b, 1, target + Vec2::new(20.0, 0.0), Vec2::new(-600.0, 0.0));
        update_projectiles(&mut state, SIM_DT);
        assert!(state.projectiles.is_empty());

        let id = shot(&mut state, b, 1, target + Vec2::new(20.0, 0.0), Vec2::new(-600.0, 0.0));
        state.projectiles[0].wall_breaking = true;
        update_projectiles(&mut state, SIM_DT);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].id, id);
        assert_eq!(state.characters[ai].health, state.characters[ai].max_health);
    }

    #[test]
    fn test_fast_projectile_does_not_tunnel() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let ai = idx(&state, a);
        let target = state.characters[ai].pos;
        // Crosses the whole body in one step
        shot(&mut state, b, 1, target + Vec2::new(60.0, 0.0), Vec2::new(-7200.0, 0.0));
        update_projectiles(&mut state, SIM_DT);
        assert!(state.projectiles.is_empty());
        assert!(state.characters[ai].health < state.characters[ai].max_health);
    }

    #[test]
    fn test_projectile_leaves_world_or_range() {
        let (mut state, _, b) = duel(GameMode::Solo);
        shot(&mut state, b, 1, Vec2::new(1000.0, 300.0), Vec2::new(0.0, 600.0));
        state.projectiles[0].max_range = Some(5.0);
        update_projectiles(&mut state, SIM_DT);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_wall_breaker_destroys_power_box_and_drops_one_cube() {
        let (mut state, _, b) = duel(GameMode::Solo);
        let center = Vec2::new(1000.0, 400.0);
        state
            .world
            .add_obstacle(Rect::from_center_size(center, Vec2::splat(70.0)), ObstacleKind::PowerBox);
        let before = state.world.obstacles.len();

        shot(&mut state, b, 1, center + Vec2::new(0.0, 60.0), Vec2::new(0.0, -600.0));
        state.projectiles[0].wall_breaking = true;
        update_projectiles(&mut state, SIM_DT);
        update_projectiles(&mut state, SIM_DT);

        assert_eq!(state.world.obstacles.len(), before - 1);
        assert_eq!(state.pickups.len(), 1);
        // Still flying
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_normal_shot_chips_power_box() {
        let (mut state, _, b) = duel(GameMode::Solo);
        let center = Vec2::new(1000.0, 400.0);
        state
            .world
            .add_obstacle(Rect::from_center_size(center, Vec2::splat(70.0)), ObstacleKind::PowerBox);

        shot(&mut state, b, 1, center + Vec2::new(0.0, 45.0), Vec2::new(0.0, -600.0));
        update_projectiles(&mut state, SIM_DT);
        assert!(state.projectiles.is_empty());
        let hp = state
            .world
            .obstacles
            .iter()
            .find(|o| o.kind == ObstacleKind::PowerBox)
            .map(|o| o.hp);
        assert_eq!(hp, Some(POWER_BOX_HP - 500.0));
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_repeated_shots_break_power_box_into_one_cube() {
        let (mut state, _, b) = duel(GameMode::Solo);
        let center = Vec2::new(1000.0, 400.0);
        state
            .world
            .add_obstacle(Rect::from_center_size(center, Vec2::splat(70.0)), ObstacleKind::PowerBox);
        let has_box = |state: &MatchState| {
            state
                .world
                .obstacles
                .iter()
                .any(|o| o.kind == ObstacleKind::PowerBox)
        };

        let mut shots = 0;
        while has_box(&state) && shots < 20 {
            shot(&mut state, b, 1, center + Vec2::new(0.0, 45.0), Vec2::new(0.0, -600.0));
            update_projectiles(&mut state, SIM_DT);
            shots += 1;
        }

        assert!(!has_box(&state));
        assert_eq!(shots, (POWER_BOX_HP / 500.0).ceil() as i32);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.pickups.len(), 1);
        assert!(state.pickups[0].pos.distance(center) <= PICKUP_SCATTER);
    }

    #[test]
    fn test_direct_shot_expires_at_max_range() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let origin = Vec2::new(1000.0, 1000.0);
        let id = shot(&mut state, b, 1, origin, Vec2::new(-600.0, 0.0));
        if let Some(p) = state.projectiles.iter_mut().find(|p| p.id == id) {
            p.max_range = Some(100.0);
        }
        for _ in 0..15 {
            update_projectiles(&mut state, SIM_DT);
        }
        assert!(state.projectiles.is_empty());
        assert!(state.pools.is_empty());
        let ai = idx(&state, a);
        assert_eq!(state.characters[ai].health, state.characters[ai].max_health);
    }

    #[test]
    fn test_knockout_boxes_never_drop_cubes() {
        let (mut state, _, _) = duel(GameMode::Knockout);
        let center = Vec2::new(1000.0, 400.0);
        state
            .world
            .add_obstacle(Rect::from_center_size(center, Vec2::splat(70.0)), ObstacleKind::PowerBox);
        let index = state.world.obstacles.len() - 1;
        assert!(damage_power_box(&mut state, index, POWER_BOX_HP));
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_explosion_breaks_terrain_and_hits_enemies() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let ai = idx(&state, a);
        let pos = state.characters[ai].pos;
        state.world.add_obstacle(
            Rect::from_center_size(pos + Vec2::new(80.0, 0.0), Vec2::splat(60.0)),
            ObstacleKind::Barrel,
        );
        let before = state.world.obstacles.len();
        explode(
            &mut state,
            Blast {
                center: pos,
                radius: 120.0,
                damage: 400.0,
                owner: b,
                team: 1,
                is_super: true,
                wall_breaking: true,
                on_hit: None,
            },
        );
        assert_eq!(state.world.obstacles.len(), before - 1);
        let c = &state.characters[ai];
        assert!((c.max_health - c.health - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_lob_lands_after_flight_and_leaves_pool() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let target = state.character(a).map(|c| c.pos).unwrap();
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            owner: b,
            team: 1,
            pos: Vec2::new(1400.0, 1000.0),
            vel: Vec2::ZERO,
            origin: Vec2::new(1400.0, 1000.0),
            damage: 300.0,
            radius: 10.0,
            blast_radius: Some(80.0),
            wall_breaking: false,
            is_super: false,
            pool: Some(crate::sim::brawler::PoolSpec {
                radius: 90.0,
                damage: 200.0,
                tick_rate: 0.75,
                duration: 2.0,
            }),
            lob: Some(Lob {
                origin: Vec2::new(1400.0, 1000.0),
                target,
                launched_at: 0.0,
                flight: 0.5,
            }),
            max_range: None,
            on_hit: None,
        });

        state.now = 0.25;
        update_projectiles(&mut state, SIM_DT);
        assert_eq!(state.projectiles.len(), 1);
        assert!(state.pools.is_empty());

        state.now = 0.5;
        update_projectiles(&mut state, SIM_DT);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.pools.len(), 1);
        let ai = idx(&state, a);
        assert!(state.characters[ai].health < state.characters[ai].max_health);

        // Pool waits for the target's own damage gate
        let after_blast = state.characters[ai].health;
        update_pools(&mut state);
        assert_eq!(state.characters[ai].health, after_blast);
        state.now = 1.3;
        update_pools(&mut state);
        assert!(state.characters[ai].health < after_blast);

        state.now = 10.0;
        update_pools(&mut state);
        assert!(state.pools.is_empty());
    }

    #[test]
    fn test_duo_respawn_then_cancel() {
        let mut state = MatchState::sandbox(GameMode::Duo, 8);
        let a = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::new(500.0, 500.0));
        let b = state.add_test_character(BrawlerKind::Medic, 0, Vec2::new(600.0, 500.0));
        let c = state.add_test_character(BrawlerKind::Frost, 1, Vec2::new(1500.0, 1500.0));
        state.now = 20.0;

        let ai = idx(&state, a);
        apply_damage(&mut state, ai, 1e6, DamageSource::hit(c, false));
        assert_eq!(state.characters[ai].respawn_at, 20.0 + RESPAWN_DELAY);
        assert_eq!(state.teams_in_play(), vec![0, 1]);

        state.now = 22.0;
        let bi = idx(&state, b);
        apply_damage(&mut state, bi, 1e6, DamageSource::hit(c, false));
        assert_eq!(state.characters[ai].respawn_at, 0.0);
        assert_eq!(state.characters[bi].respawn_at, 0.0);
        assert_eq!(state.teams_in_play(), vec![1]);
    }

    #[test]
    fn test_summon_kill_credits_owner_and_dies_with_owner() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let bear = state.spawn_character(BrawlerKind::Bear, 1, 1, "Bear".into(), Some(Vec2::new(700.0, 1000.0)));
        if let Some(bear) = state.character_mut(bear) {
            bear.owner = Some(b);
            bear.shield_until = 0.0;
        }
        let ai = idx(&state, a);
        apply_damage(&mut state, ai, 1e6, DamageSource::hit(bear, false));
        assert_eq!(state.character(b).map(|c| c.kills), Some(1));

        let bi = idx(&state, b);
        apply_damage(&mut state, bi, 1e6, DamageSource::hit(a, false));
        assert_eq!(state.character(bear).map(|c| c.active), Some(false));
        // Summons never drop cubes
        assert_eq!(state.pickups.len(), 2);
    }

    #[test]
    fn test_cube_buffs_whole_team() {
        let mut state = MatchState::sandbox(GameMode::Duo, 8);
        let a = state.add_test_character(BrawlerKind::Buckshot, 0, Vec2::new(500.0, 500.0));
        let b = state.add_test_character(BrawlerKind::Medic, 0, Vec2::new(900.0, 500.0));
        state.pickups.push(crate::sim::entity::Pickup {
            id: 999,
            pos: Vec2::new(510.0, 500.0),
        });
        update_pickups(&mut state);
        assert!(state.pickups.is_empty());
        for id in [a, b] {
            let c = state.character(id).unwrap();
            assert_eq!(c.power_cubes, 1);
            assert_eq!(c.health, c.max_health);
            assert!((c.max_health - c.def().health - CUBE_HEALTH_BONUS).abs() < 1e-3);
        }
        assert_eq!(state.character(a).map(|c| c.cubes_collected), Some(1));
        assert_eq!(state.character(b).map(|c| c.cubes_collected), Some(0));
    }

    #[test]
    fn test_burn_ticks_then_expires() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let ai = idx(&state, a);
        state.characters[ai].apply_on_hit(
            OnHit::Burn {
                damage: 50.0,
                interval: 0.5,
                duration: 1.0,
            },
            b,
            0.0,
        );
        for step in 1..=4 {
            state.now = step as f32 * 0.5;
            update_status_effects(&mut state);
        }
        let c = &state.characters[ai];
        assert!((c.max_health - c.health - 100.0).abs() < 1e-3);
        assert!(c.status.is_empty());
    }

    #[test]
    fn test_lifesteal_heals_shooter() {
        let (mut state, a, b) = duel(GameMode::Solo);
        let bi = idx(&state, b);
        state.characters[bi].star_power = Some(crate::sim::brawler::StarPower::Lifesteal(0.5));
        state.characters[bi].health -= 1000.0;
        let before = state.characters[bi].health;
        let ai = idx(&state, a);
        apply_damage(&mut state, ai, 400.0, DamageSource::hit(b, false));
        assert!((state.characters[bi].health - before - 200.0).abs() < 1e-3);
    }
}
