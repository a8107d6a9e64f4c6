//! Match configuration
//!
//! Everything the surrounding application hands the simulation when a match
//! starts: chosen brawler, level, mode, opponent roster and cosmetics.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::MAX_LEVEL;
use crate::sim::BrawlerKind;

/// Errors raised while loading or validating a match configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Free-for-all, last brawler standing
    #[default]
    Solo,
    /// Teams of two with respawns while a teammate lives
    Duo,
    /// 3v3 best-of-three rounds
    Knockout,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Solo => "solo",
            GameMode::Duo => "duo",
            GameMode::Knockout => "knockout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "solo" | "showdown" => Some(GameMode::Solo),
            "duo" | "duos" => Some(GameMode::Duo),
            "knockout" | "ko" => Some(GameMode::Knockout),
            _ => None,
        }
    }

    /// Shrinking hazard zone is active
    pub fn has_hazard_zone(&self) -> bool {
        !matches!(self, GameMode::Knockout)
    }

    /// Power cubes drop from deaths and boxes
    pub fn drops_power_cubes(&self) -> bool {
        !matches!(self, GameMode::Knockout)
    }

    /// Dead characters may come back mid-match
    pub fn allows_respawn(&self) -> bool {
        matches!(self, GameMode::Duo)
    }

    pub fn is_team_mode(&self) -> bool {
        !matches!(self, GameMode::Solo)
    }

    pub fn is_round_based(&self) -> bool {
        matches!(self, GameMode::Knockout)
    }

    /// Number of bots the roster must name
    pub fn validate_roster(&self, count: usize) -> Result<(), ConfigError> {
        let ok = match self {
            GameMode::Solo => (1..=9).contains(&count),
            // one teammate plus whole enemy pairs
            GameMode::Duo => count >= 3 && count % 2 == 1 && count <= 9,
            GameMode::Knockout => count == 5,
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "{} mode cannot be played with {} bots",
                self.as_str(),
                count
            )))
        }
    }
}

/// Match configuration loaded from JSON or built by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Brawler the player controls
    pub brawler: BrawlerKind,
    /// Player display name
    #[serde(default = "default_player_name")]
    pub player_name: String,
    /// Player brawler level (1-11)
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub mode: GameMode,
    /// Display names for every bot, teammates first in team modes
    pub opponents: Vec<String>,
    /// Equipped cosmetic skin
    #[serde(default)]
    pub skin: Option<String>,
    /// Index into the brawler's star power list
    #[serde(default)]
    pub star_power: Option<usize>,
    /// RNG seed; the same seed and inputs replay the same match
    #[serde(default)]
    pub seed: u64,
}

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_level() -> u8 {
    1
}

impl MatchConfig {
    /// Config with a default roster sized for `mode`
    pub fn new(brawler: BrawlerKind, mode: GameMode, seed: u64) -> Self {
        let bots = match mode {
            GameMode::Solo => 9,
            GameMode::Duo => 9,
            GameMode::Knockout => 5,
        };
        Self {
            brawler,
            player_name: default_player_name(),
            level: default_level(),
            mode,
            opponents: (1..=bots).map(|i| format!("Bot {}", i)).collect(),
            skin: None,
            star_power: None,
            seed,
        }
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level == 0 || self.level > MAX_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "level {} is outside 1-{}",
                self.level, MAX_LEVEL
            )));
        }
        if self.brawler.def().summon_only {
            return Err(ConfigError::Invalid(format!(
                "{} cannot be played",
                self.brawler.name()
            )));
        }
        self.mode.validate_roster(self.opponents.len())?;
        if let Some(index) = self.star_power {
            let available = self.brawler.def().star_powers.len();
            if index >= available {
                return Err(ConfigError::Invalid(format!(
                    "star power {} out of range ({} has {})",
                    index,
                    self.brawler.name(),
                    available
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_json() {
        let json = r#"{ "brawler": "Buckshot", "opponents": ["a", "b", "c"] }"#;
        let config = MatchConfig::from_json(json).unwrap();
        assert_eq!(config.mode, GameMode::Solo);
        assert_eq!(config.level, 1);
        assert_eq!(config.player_name, "Player");
    }

    #[test]
    fn test_knockout_roster_size() {
        let mut config = MatchConfig::new(BrawlerKind::Gunslinger, GameMode::Knockout, 1);
        assert!(config.validate().is_ok());
        config.opponents.pop();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_duo_roster_needs_teammate_and_pairs() {
        assert!(GameMode::Duo.validate_roster(3).is_ok());
        assert!(GameMode::Duo.validate_roster(4).is_err());
        assert!(GameMode::Duo.validate_roster(1).is_err());
    }

    #[test]
    fn test_rejects_bad_level_and_star_power() {
        let mut config = MatchConfig::new(BrawlerKind::Medic, GameMode::Solo, 1);
        config.level = 12;
        assert!(config.validate().is_err());
        config.level = 11;
        config.star_power = Some(7);
        assert!(config.validate().is_err());
        config.star_power = Some(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_summon_not_playable() {
        let config = MatchConfig::new(BrawlerKind::Bear, GameMode::Solo, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            MatchConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(GameMode::parse("KO"), Some(GameMode::Knockout));
        assert_eq!(GameMode::parse("duos"), Some(GameMode::Duo));
        assert_eq!(GameMode::parse("gem grab"), None);
    }
}
