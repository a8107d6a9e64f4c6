//! Match flow: countdown, respawns, win checks, round resets and the result
//!
//! The director only ever moves the phase forward. Once `GameOver` is
//! reached the result is frozen and every later call is a no-op.

use serde::{Deserialize, Serialize};

use super::brawler::BrawlerKind;
use super::combat;
use super::schedule::ScheduledAction;
use super::state::{GameEvent, MatchPhase, MatchState};
use crate::config::GameMode;
use crate::consts::*;

/// One other participant in the result screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: u32,
    pub name: String,
    pub brawler: BrawlerKind,
    pub team: u8,
    pub level: u8,
    pub kills: u32,
    pub alive: bool,
}

/// Final outcome reported once when the match ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 1 is a win
    pub rank: u32,
    pub victory: bool,
    pub mode: GameMode,
    pub player_name: String,
    pub brawler: BrawlerKind,
    pub kills: u32,
    pub cubes_collected: u32,
    /// Seconds of play
    pub duration: f32,
    pub teammates: Vec<Participant>,
    pub opponents: Vec<Participant>,
    /// Knockout only
    pub round_wins: Option<u32>,
    pub round_losses: Option<u32>,
}

/// Count the countdown down and start play when it runs out
pub fn update_countdown(state: &mut MatchState, dt: f32) {
    let before = state.countdown.ceil() as u32;
    state.countdown = (state.countdown - dt).max(0.0);
    let after = state.countdown.ceil() as u32;
    if after != before && after > 0 {
        state.push_event(GameEvent::Countdown { seconds: after });
    }
    if state.countdown <= 0.0 {
        begin_play(state);
    }
}

fn begin_play(state: &mut MatchState) {
    state.phase = MatchPhase::Playing;
    if state.started_at.is_none() {
        let now = state.now;
        state.started_at = Some(now);
        state.zone.arm(now);
        log::info!("Match started ({})", state.mode.as_str());
        state.push_event(GameEvent::MatchStarted);
    } else {
        log::info!("Round {} started", state.round);
        let round = state.round;
        state.push_event(GameEvent::RoundStarted { round });
    }
}

/// Duo: bring back characters whose timer ran out, drop timers for teams
/// that no longer have anyone standing
pub fn update_respawns(state: &mut MatchState) {
    if !state.mode.allows_respawn() {
        return;
    }
    let now = state.now;

    let mut waiting: Vec<u8> = state
        .characters
        .iter()
        .filter(|c| c.respawn_at > 0.0)
        .map(|c| c.team)
        .collect();
    waiting.sort_unstable();
    waiting.dedup();
    for team in waiting {
        let anyone_up = state
            .characters
            .iter()
            .any(|c| c.team == team && c.active && !c.is_summon());
        if !anyone_up {
            combat::cancel_team_respawns(state, team);
        }
    }

    for idx in 0..state.characters.len() {
        let c = &state.characters[idx];
        if c.active || c.respawn_at <= 0.0 || now < c.respawn_at {
            continue;
        }
        let pos = state.open_position();
        let c = &mut state.characters[idx];
        c.restore(pos, now + SPAWN_SHIELD_DURATION);
        let id = c.id;
        log::debug!("{} respawned", c.name);
        state.push_event(GameEvent::Respawned { id });
    }
}

/// Check for eliminations and decide how the match continues
pub fn evaluate(state: &mut MatchState) {
    if state.phase != MatchPhase::Playing {
        return;
    }
    if state.mode.is_round_based() {
        evaluate_round(state);
    } else {
        evaluate_survival(state);
    }
}

fn evaluate_survival(state: &mut MatchState) {
    let teams = state.teams_in_play();
    let player_team = state.player_team();

    if !teams.contains(&player_team) {
        // Everyone still standing finished ahead of us
        end_match(state, teams.len() as u32 + 1);
        return;
    }
    if teams.len() == 1 && !state.victory_pending {
        state.victory_pending = true;
        log::info!("Last team standing, victory");
        let due = state.now + VICTORY_DELAY;
        state
            .scheduler
            .schedule(due, ScheduledAction::EndMatch { rank: 1 });
    }
}

fn evaluate_round(state: &mut MatchState) {
    let alive = state.teams_alive();
    if alive.len() > 1 {
        return;
    }
    let winner = alive.first().copied();
    if let Some(team) = winner {
        state.round_score[usize::from(team).min(1)] += 1;
    }
    let score = state.round_score;
    log::info!(
        "Round {} over: {} ({}-{})",
        state.round,
        winner.map_or("draw".to_string(), |t| format!("team {} wins", t)),
        score[0],
        score[1]
    );
    state.push_event(GameEvent::RoundWon {
        team: winner,
        score,
    });

    if let Some(team) = winner
        && score[usize::from(team).min(1)] >= ROUNDS_TO_WIN
    {
        let rank = if team == state.player_team() { 1 } else { 2 };
        end_match(state, rank);
        return;
    }

    state.phase = MatchPhase::RoundEnd;
    state.scheduler.clear();
    let due = state.now + ROUND_END_DELAY;
    state.scheduler.schedule(due, ScheduledAction::ResetRound);
}

/// Knockout: put everyone back on their spawn row and count down again
pub fn reset_round(state: &mut MatchState) {
    if state.phase != MatchPhase::RoundEnd {
        return;
    }
    state.round += 1;
    state.projectiles.clear();
    state.pools.clear();
    state.pickups.clear();
    state.characters.retain(|c| !c.is_summon());

    let shield = state.now + COUNTDOWN_DURATION + SPAWN_SHIELD_DURATION;
    let mut slots = [0usize; 2];
    for idx in 0..state.characters.len() {
        let side = usize::from(state.characters[idx].team).min(1);
        let slot = slots[side];
        slots[side] += 1;
        let pos = match state.spawn_point(side as u8, slot) {
            Some(p) => p,
            None => state.open_position(),
        };
        state.characters[idx].restore(pos, shield);
    }

    state.phase = MatchPhase::Countdown;
    state.countdown = COUNTDOWN_DURATION;
    state.push_event(GameEvent::Countdown {
        seconds: COUNTDOWN_DURATION.ceil() as u32,
    });
}

/// Freeze the match and build the result. Only the first call counts.
pub fn end_match(state: &mut MatchState, rank: u32) -> bool {
    if state.phase == MatchPhase::GameOver {
        return false;
    }
    state.phase = MatchPhase::GameOver;
    state.scheduler.clear();

    let result = build_result(state, rank);
    log::info!(
        "Match over: rank {} with {} kills after {:.1}s",
        result.rank,
        result.kills,
        result.duration
    );
    state.push_event(GameEvent::MatchEnded { rank });
    state.result = Some(result);
    true
}

fn build_result(state: &MatchState, rank: u32) -> MatchResult {
    let player = state.player();
    let player_team = state.player_team();
    let participant = |c: &super::entity::Character| Participant {
        id: c.id,
        name: c.name.clone(),
        brawler: c.brawler,
        team: c.team,
        level: c.level,
        kills: c.kills,
        alive: c.active,
    };
    let others = state
        .characters
        .iter()
        .filter(|c| !c.is_summon() && c.id != state.player_id);

    let (round_wins, round_losses) = if state.mode.is_round_based() {
        let ours = usize::from(player_team).min(1);
        (
            Some(state.round_score[ours]),
            Some(state.round_score[1 - ours]),
        )
    } else {
        (None, None)
    };

    MatchResult {
        rank,
        victory: rank == 1,
        mode: state.mode,
        player_name: player.map(|p| p.name.clone()).unwrap_or_default(),
        brawler: player.map_or(BrawlerKind::Buckshot, |p| p.brawler),
        kills: player.map_or(0, |p| p.kills),
        cubes_collected: player.map_or(0, |p| p.cubes_collected),
        duration: state.play_time,
        teammates: others
            .clone()
            .filter(|c| c.team == player_team)
            .map(participant)
            .collect(),
        opponents: others
            .filter(|c| c.team != player_team)
            .map(participant)
            .collect(),
        round_wins,
        round_losses,
    }
}
