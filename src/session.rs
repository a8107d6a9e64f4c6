//! Frame loop driver
//!
//! A [`Session`] owns one live match. The host calls [`Session::update`] once
//! per animation frame with the elapsed time; the session runs as many fixed
//! ticks as fit, refreshes the HUD on its own slower timer, and reports the
//! result exactly once when the match ends.

use crate::config::{ConfigError, MatchConfig};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::director::MatchResult;
use crate::sim::snapshot::{HudSnapshot, RenderSnapshot};
use crate::sim::state::{GameEvent, MatchPhase, MatchState};
use crate::sim::tick::{TickInput, tick};

type MatchEndHook = Box<dyn FnMut(&MatchResult)>;

pub struct Session {
    state: MatchState,
    settings: Settings,
    input: TickInput,
    accumulator: f32,
    hud_elapsed: f32,
    hud: HudSnapshot,
    /// Events raised by every tick of the latest frame
    frame_events: Vec<GameEvent>,
    on_match_end: Option<MatchEndHook>,
    reported: bool,
    running: bool,
}

impl Session {
    pub fn new(config: &MatchConfig, settings: Settings) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = MatchState::new(config, &settings);
        log::info!(
            "Session started: {} as {} (level {}), {} bots, seed {}",
            config.mode.as_str(),
            config.brawler.name(),
            config.level,
            config.opponents.len(),
            config.seed
        );
        let hud = HudSnapshot::capture(&state);
        Ok(Self {
            state,
            settings,
            input: TickInput::default(),
            accumulator: 0.0,
            hud_elapsed: 0.0,
            hud,
            frame_events: Vec::new(),
            on_match_end: None,
            reported: false,
            running: true,
        })
    }

    /// Register the callback that receives the final result
    pub fn on_match_end(&mut self, hook: impl FnMut(&MatchResult) + 'static) {
        self.on_match_end = Some(Box::new(hook));
    }

    /// Latch the current input. One-shot triggers stay set until a tick consumes them.
    pub fn set_input(&mut self, input: TickInput) {
        let use_super = self.input.use_super || input.use_super;
        let emote = input.emote.or(self.input.emote);
        self.input = TickInput {
            use_super,
            emote,
            ..input
        };
    }

    /// Advance by one animation frame. Returns false once the session is over.
    pub fn update(&mut self, frame_dt: f32) -> bool {
        if !self.running {
            return false;
        }
        let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;
        self.frame_events.clear();

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
            self.frame_events.append(&mut self.state.events);

            // Clear one-shot inputs after processing
            self.input.use_super = false;
            self.input.emote = None;

            if self.state.phase == MatchPhase::GameOver {
                break;
            }
        }

        self.hud_elapsed += dt;
        if self.hud_elapsed >= self.settings.hud_interval {
            self.hud_elapsed = 0.0;
            self.hud = HudSnapshot::capture(&self.state);
        }

        if !self.reported
            && let Some(result) = self.state.result.as_ref()
        {
            self.reported = true;
            if let Some(hook) = self.on_match_end.as_mut() {
                hook(result);
            }
            self.hud = HudSnapshot::capture(&self.state);
            self.teardown();
        }

        self.running
    }

    /// Stop ticking for good; later updates do nothing
    pub fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.accumulator = 0.0;
        self.input = TickInput::default();
        log::debug!("Session torn down at t={:.2}s", self.state.now);
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.state, &self.frame_events)
    }

    pub fn hud(&self) -> &HudSnapshot {
        &self.hud
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.frame_events
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.state.result.as_ref()
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameMode;
    use crate::sim::brawler::BrawlerKind;
    use std::cell::Cell;
    use std::rc::Rc;

    fn session(mode: GameMode) -> Session {
        let config = MatchConfig::new(BrawlerKind::Buckshot, mode, 11);
        Session::new(&config, Settings::headless()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = MatchConfig::new(BrawlerKind::Buckshot, GameMode::Solo, 1);
        config.level = 0;
        assert!(matches!(
            Session::new(&config, Settings::default()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut s = session(GameMode::Solo);
        s.update(SIM_DT * 0.5);
        assert_eq!(s.state().time_ticks, 0);
        s.update(SIM_DT * 0.6);
        assert_eq!(s.state().time_ticks, 1);

        s.update(5.0);
        let ticks = s.state().time_ticks - 1;
        assert!((5..=6).contains(&ticks), "ran {} ticks", ticks);
    }

    #[test]
    fn test_one_shot_inputs_survive_until_a_tick() {
        let mut s = session(GameMode::Solo);
        s.set_input(TickInput {
            use_super: true,
            ..TickInput::default()
        });
        s.set_input(TickInput {
            fire: true,
            ..TickInput::default()
        });
        assert!(s.input.use_super);
        assert!(s.input.fire);

        s.update(SIM_DT * 1.5);
        assert!(!s.input.use_super);
        assert!(s.input.fire);
    }

    #[test]
    fn test_hud_refreshes_on_its_own_timer() {
        let mut s = session(GameMode::Solo);
        s.settings.hud_interval = 0.25;
        assert_eq!(s.hud().countdown, Some(3));
        s.update(0.05);
        assert_eq!(s.hud().countdown, Some(3));
        for _ in 0..30 {
            s.update(0.05);
        }
        assert_eq!(s.hud().countdown, Some(2));
    }

    #[test]
    fn test_reports_once_and_stops() {
        let mut s = session(GameMode::Solo);
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        s.on_match_end(move |_| seen.set(seen.get() + 1));
        s.set_input(TickInput {
            autopilot: true,
            ..TickInput::default()
        });

        let mut frames = 0;
        while s.update(0.1) && frames < 10 * 600 {
            frames += 1;
        }
        assert!(!s.is_running());
        assert_eq!(calls.get(), 1);
        assert!(s.result().is_some());

        let ticks = s.state().time_ticks;
        assert!(!s.update(0.1));
        assert_eq!(s.state().time_ticks, ticks);
        assert_eq!(calls.get(), 1);
    }
}
