//! Basic attacks, supers and super-driven movement
//!
//! Attacks read the brawler registry and turn into projectiles, throws or
//! scheduled follow-ups. Nothing here decides *when* to attack; that is the
//! player input or the bot AI.

use glam::Vec2;
use rand::Rng;

use super::brawler::{AttackPattern, BrawlerKind, SuperAbility};
use super::collision::circle_circle_overlap;
use super::combat::{self, Blast, DamageKind, DamageSource};
use super::entity::{Lob, Motion, ParticleKind, Projectile, ShotSpec, ThrowSpec};
use super::schedule::ScheduledAction;
use super::state::{GameEvent, MatchState};
use crate::consts::*;
use crate::{angle_between, clamp_reach, direction};

/// Lobbed super flight time
const SUPER_THROW_FLIGHT: f32 = 0.9;
/// Minimum speed of super projectiles
const SUPER_SHOT_SPEED: f32 = 900.0;
/// Gap between consecutive super throws
const THROW_STAGGER: f32 = 0.05;
/// How far in front of the caster a summon appears
const SUMMON_OFFSET: f32 = 70.0;

/// Angles for `count` shots centred on `center` across `spread` radians.
/// A full-circle spread places shots evenly around the caster.
pub fn fan_angles(center: f32, count: u32, spread: f32) -> Vec<f32> {
    if count <= 1 {
        return vec![center];
    }
    if spread >= std::f32::consts::TAU - 1e-3 {
        let step = std::f32::consts::TAU / count as f32;
        return (0..count).map(|i| center + step * i as f32).collect();
    }
    let step = spread / (count - 1) as f32;
    (0..count)
        .map(|i| center - spread / 2.0 + step * i as f32)
        .collect()
}

/// Fire one direct projectile from the shooter's current position.
/// Shots from characters that died in the meantime fizzle.
pub fn fire_shot(state: &mut MatchState, shooter: u32, angle: f32, spec: ShotSpec) -> Option<u32> {
    let (pos, team) = state
        .character(shooter)
        .filter(|c| c.active)
        .map(|c| (c.pos, c.team))?;
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        owner: shooter,
        team,
        pos,
        vel: direction(angle) * spec.speed,
        origin: pos,
        damage: spec.damage,
        radius: spec.radius,
        blast_radius: None,
        wall_breaking: spec.wall_breaking,
        is_super: spec.is_super,
        pool: None,
        lob: None,
        max_range: Some(spec.range),
        on_hit: spec.on_hit,
    });
    Some(id)
}

/// Launch one lobbed projectile toward `spec.target`
pub fn launch_throw(state: &mut MatchState, shooter: u32, spec: ThrowSpec) -> Option<u32> {
    let (pos, team, on_hit) = state
        .character(shooter)
        .filter(|c| c.active)
        .map(|c| (c.pos, c.team, c.def().on_hit))?;
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        owner: shooter,
        team,
        pos,
        vel: Vec2::ZERO,
        origin: pos,
        damage: spec.damage,
        radius: spec.radius,
        blast_radius: Some(spec.blast_radius),
        wall_breaking: spec.wall_breaking,
        is_super: spec.is_super,
        pool: spec.pool,
        lob: Some(Lob {
            origin: pos,
            target: spec.target,
            launched_at: state.now,
            flight: spec.flight,
        }),
        max_range: None,
        on_hit: if spec.is_super { None } else { on_hit },
    });
    Some(id)
}

/// Basic attack toward `aim`. Fails without ammo, inside the attack
/// interval, while a super motion is running, or when inactive.
pub fn try_basic_attack(state: &mut MatchState, id: u32, aim: Vec2) -> bool {
    let now = state.now;
    let Some(idx) = state.character_index(id) else {
        return false;
    };
    let character = &mut state.characters[idx];
    if !character.active || character.motion.is_some() {
        return false;
    }
    let def = character.def();
    if now - character.last_shot < def.attack_interval {
        return false;
    }
    if !character.spend_ammo() {
        return false;
    }

    character.last_shot = now;
    character.angle = angle_between(character.pos, aim);
    let (pos, angle, damage, mult) = (
        character.pos,
        character.angle,
        character.attack_damage(),
        character.damage_multiplier(),
    );

    let spec = ShotSpec {
        damage,
        speed: def.projectile_speed,
        radius: def.projectile_radius,
        range: def.range,
        wall_breaking: false,
        is_super: false,
        on_hit: def.on_hit,
    };

    match def.attack {
        AttackPattern::Straight { count, spread } => {
            for a in fan_angles(angle, count, spread) {
                fire_shot(state, id, a, spec);
            }
        }
        AttackPattern::Burst { shots, delay } => {
            fire_shot(state, id, angle, spec);
            for i in 1..shots {
                state.scheduler.schedule(
                    now + delay * i as f32,
                    ScheduledAction::Shot {
                        shooter: id,
                        angle,
                        spec,
                    },
                );
            }
        }
        AttackPattern::Lobbed {
            blast_radius,
            flight_time,
            pool,
        } => {
            let spec = ThrowSpec {
                target: clamp_reach(pos, aim, def.range),
                flight: flight_time,
                damage,
                radius: def.projectile_radius,
                blast_radius,
                pool: pool.map(|mut p| {
                    p.damage *= mult;
                    p
                }),
                wall_breaking: false,
                is_super: false,
            };
            launch_throw(state, id, spec);
        }
    }
    true
}

/// Fire the super toward `aim` if fully charged. The charge resets to
/// zero immediately.
pub fn try_super(state: &mut MatchState, id: u32, aim: Vec2) -> bool {
    let now = state.now;
    let Some(idx) = state.character_index(id) else {
        return false;
    };
    let character = &mut state.characters[idx];
    if !character.active || character.motion.is_some() || !character.super_ready() {
        return false;
    }
    let def = character.def();
    let Some(ability) = def.super_ability else {
        return false;
    };

    character.power = 0.0;
    character.angle = angle_between(character.pos, aim);
    let (pos, angle, team, level, mult, level_mult, brawler) = (
        character.pos,
        character.angle,
        character.team,
        character.level,
        character.damage_multiplier(),
        character.level_multiplier(),
        character.brawler,
    );
    state.push_event(GameEvent::SuperUsed { by: id, brawler });
    log::debug!("{} used super", brawler.name());

    match ability {
        SuperAbility::SpreadBurst {
            count,
            spread,
            damage,
            range,
            wall_breaking,
            on_hit,
        } => {
            let spec = ShotSpec {
                damage: damage * mult,
                speed: def.projectile_speed.max(SUPER_SHOT_SPEED),
                radius: def.projectile_radius,
                range,
                wall_breaking,
                is_super: true,
                on_hit,
            };
            for a in fan_angles(angle, count, spread) {
                fire_shot(state, id, a, spec);
            }
        }
        SuperAbility::Volley {
            shots,
            delay,
            jitter,
            damage,
            range,
            wall_breaking,
        } => {
            let spec = ShotSpec {
                damage: damage * mult,
                speed: def.projectile_speed.max(SUPER_SHOT_SPEED),
                radius: def.projectile_radius,
                range,
                wall_breaking,
                is_super: true,
                on_hit: None,
            };
            for i in 0..shots {
                let a = angle + state.rng.random_range(-jitter..=jitter);
                if i == 0 {
                    fire_shot(state, id, a, spec);
                } else {
                    state.scheduler.schedule(
                        now + delay * i as f32,
                        ScheduledAction::Shot {
                            shooter: id,
                            angle: a,
                            spec,
                        },
                    );
                }
            }
        }
        SuperAbility::Leap {
            range, duration, ..
        } => {
            let to = keep_inside(state, clamp_reach(pos, aim, range));
            state.characters[idx].motion = Some(Motion::Leap {
                from: pos,
                to,
                start: now,
                duration,
            });
            state.scheduler.schedule(
                now + duration,
                ScheduledAction::LeapLanding {
                    character: id,
                    target: to,
                },
            );
        }
        SuperAbility::Throw {
            count,
            scatter,
            blast_radius,
            damage,
            range,
            pool,
            wall_breaking,
        } => {
            let target = clamp_reach(pos, aim, range);
            for i in 0..count {
                let offset = if count > 1 && scatter > 0.0 {
                    let a = state.rng.random_range(0.0..std::f32::consts::TAU);
                    let d = state.rng.random_range(0.0..scatter);
                    direction(a) * d
                } else {
                    Vec2::ZERO
                };
                let spec = ThrowSpec {
                    target: target + offset,
                    flight: SUPER_THROW_FLIGHT,
                    damage: damage * mult,
                    radius: def.projectile_radius,
                    blast_radius,
                    pool: pool.map(|mut p| {
                        p.damage *= mult;
                        p
                    }),
                    wall_breaking,
                    is_super: true,
                };
                if i == 0 {
                    launch_throw(state, id, spec);
                } else {
                    state.scheduler.schedule(
                        now + THROW_STAGGER * i as f32,
                        ScheduledAction::Throw { shooter: id, spec },
                    );
                }
            }
        }
        SuperAbility::Summon { kind } => {
            summon(state, id, kind, team, level, pos + direction(angle) * SUMMON_OFFSET);
        }
        SuperAbility::Charge {
            duration,
            speed,
            damage,
        } => {
            state.characters[idx].motion = Some(Motion::Charge {
                dir: direction(angle),
                until: now + duration,
                speed,
                damage: damage * mult,
                hit: Vec::new(),
            });
        }
        SuperAbility::Blink {
            range,
            radius,
            damage,
        } => {
            let landing = blink_destination(state, pos, clamp_reach(pos, aim, range));
            state.characters[idx].pos = landing;
            state.spawn_particles(pos, ParticleKind::Smoke, 8);
            combat::explode(
                state,
                Blast {
                    center: landing,
                    radius,
                    damage: damage * mult,
                    owner: id,
                    team,
                    is_super: true,
                    wall_breaking: false,
                    on_hit: None,
                },
            );
        }
        SuperAbility::HealBurst { radius, amount } => {
            let allies: Vec<usize> = state
                .characters
                .iter()
                .enumerate()
                .filter(|(_, c)| c.active && c.team == team && c.pos.distance(pos) <= radius)
                .map(|(i, _)| i)
                .collect();
            for ally in allies {
                combat::heal_character(state, ally, amount * level_mult);
            }
        }
    }
    true
}

/// Clamp a landing spot inside the border walls
fn keep_inside(state: &MatchState, point: Vec2) -> Vec2 {
    let lo = Vec2::splat(WALL_THICKNESS + CHARACTER_RADIUS);
    let hi = Vec2::new(state.world.width, state.world.height) - lo;
    point.clamp(lo, hi)
}

/// Walk back from `target` toward `from` until the body fits
fn blink_destination(state: &MatchState, from: Vec2, target: Vec2) -> Vec2 {
    const STEPS: u32 = 10;
    for i in 0..=STEPS {
        let candidate = target.lerp(from, i as f32 / STEPS as f32);
        if !state.world.collides(candidate, CHARACTER_RADIUS) {
            return candidate;
        }
    }
    from
}

/// Replace the caster's previous summon with a fresh one
fn summon(
    state: &mut MatchState,
    owner: u32,
    kind: BrawlerKind,
    team: u8,
    level: u8,
    near: Vec2,
) {
    let previous: Vec<usize> = state
        .characters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.active && c.owner == Some(owner))
        .map(|(i, _)| i)
        .collect();
    for idx in previous {
        combat::handle_death(state, idx, None);
    }

    let pos = if state.world.collides(near, CHARACTER_RADIUS) {
        state.world.push_out(near, CHARACTER_RADIUS)
    } else {
        near
    };
    let name = format!("{} {}", kind.name(), owner);
    let id = state.spawn_character(kind, team, level, name, Some(pos));
    if let Some(summoned) = state.character_mut(id) {
        summoned.owner = Some(owner);
        summoned.shield_until = 0.0;
    }
    state.push_event(GameEvent::Summoned { by: owner, summon: id });
}

/// Run one scheduled attack follow-up
pub fn run_scheduled(state: &mut MatchState, action: ScheduledAction) {
    match action {
        ScheduledAction::Shot {
            shooter,
            angle,
            spec,
        } => {
            fire_shot(state, shooter, angle, spec);
        }
        ScheduledAction::Throw { shooter, spec } => {
            launch_throw(state, shooter, spec);
        }
        ScheduledAction::LeapLanding { character, target } => land_leap(state, character, target),
        ScheduledAction::ResetRound | ScheduledAction::EndMatch { .. } => {}
    }
}

/// Finish a leap: snap to the landing spot, smash terrain, hit and heal
pub fn land_leap(state: &mut MatchState, id: u32, target: Vec2) {
    let Some(idx) = state.character_index(id) else {
        return;
    };
    let character = &mut state.characters[idx];
    if !character.active || !matches!(character.motion, Some(Motion::Leap { .. })) {
        return;
    }
    character.motion = None;
    let (team, mult, level_mult) = (
        character.team,
        character.damage_multiplier(),
        character.level_multiplier(),
    );
    let Some(SuperAbility::Leap {
        radius, damage, heal, ..
    }) = character.def().super_ability
    else {
        return;
    };

    if damage > 0.0 {
        let removed = state.world.destroy(target, radius * 0.5);
        combat::break_obstacles(state, removed);
    }
    let landing = state.world.push_out(target, CHARACTER_RADIUS);
    state.characters[idx].pos = landing;
    state.spawn_particles(landing, ParticleKind::Debris, 10);

    if damage > 0.0 {
        combat::explode(
            state,
            Blast {
                center: landing,
                radius,
                damage: damage * mult,
                owner: id,
                team,
                is_super: true,
                wall_breaking: false,
                on_hit: None,
            },
        );
    }
    if heal > 0.0 {
        combat::heal_character(state, idx, heal * level_mult);
    }
}

/// Advance leaps and charges
pub fn update_motions(state: &mut MatchState, dt: f32) {
    let now = state.now;
    for idx in 0..state.characters.len() {
        let character = &mut state.characters[idx];
        if !character.active {
            character.motion = None;
            continue;
        }
        let Some(motion) = character.motion.take() else {
            continue;
        };

        match motion {
            Motion::Leap {
                from,
                to,
                start,
                duration,
            } => {
                let t = if duration <= 0.0 {
                    1.0
                } else {
                    ((now - start) / duration).clamp(0.0, 1.0)
                };
                character.pos = from.lerp(to, t);
                character.motion = Some(Motion::Leap {
                    from,
                    to,
                    start,
                    duration,
                });
            }
            Motion::Charge {
                dir,
                until,
                speed,
                damage,
                mut hit,
            } => {
                if now >= until {
                    let pos = character.pos;
                    character.pos = state.world.push_out(pos, CHARACTER_RADIUS);
                    continue;
                }
                let next = character.pos + dir * speed * dt;
                let lo = WALL_THICKNESS + CHARACTER_RADIUS;
                if next.x < lo
                    || next.y < lo
                    || next.x > state.world.width - lo
                    || next.y > state.world.height - lo
                {
                    let pos = character.pos;
                    character.pos = state.world.push_out(pos, CHARACTER_RADIUS);
                    continue;
                }
                character.pos = next;
                character.vel = dir * speed;
                let (id, team) = (character.id, character.team);

                let removed = state.world.destroy_overlapping(next, CHARACTER_RADIUS + 10.0);
                combat::break_obstacles(state, removed);

                let victims: Vec<usize> = state
                    .characters
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| {
                        c.active
                            && c.team != team
                            && !hit.contains(&c.id)
                            && circle_circle_overlap(c.pos, CHARACTER_RADIUS, next, CHARACTER_RADIUS)
                    })
                    .map(|(i, _)| i)
                    .collect();
                for victim in victims {
                    hit.push(state.characters[victim].id);
                    combat::apply_damage(
                        state,
                        victim,
                        damage,
                        DamageSource {
                            attacker: Some(id),
                            kind: DamageKind::Super,
                        },
                    );
                }

                if state.characters[idx].active {
                    state.characters[idx].motion = Some(Motion::Charge {
                        dir,
                        until,
                        speed,
                        damage,
                        hit,
                    });
                }
            }
        }
    }
}
