//! Brawl Arena - headless runner
//!
//! Plays one full match with the AI driving the player and prints the
//! result record as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use brawl_arena::consts::SIM_DT;
    use brawl_arena::sim::{BrawlerKind, TickInput};
    use brawl_arena::{ConfigError, GameMode, MatchConfig, QualityPreset, Session, Settings};
    use clap::Parser;

    /// Top-down arena brawler simulation
    #[derive(Parser, Debug)]
    #[command(name = "brawl-arena")]
    #[command(about = "Run a headless arena brawler match")]
    #[command(version)]
    pub struct Args {
        /// Match config JSON file (overrides brawler/mode/level/seed)
        #[arg(long, value_name = "CONFIG_FILE")]
        pub config: Option<PathBuf>,

        /// Brawler the player controls
        #[arg(long, default_value = "Buckshot")]
        pub brawler: String,

        /// Game mode: solo, duo or knockout
        #[arg(long, default_value = "solo")]
        pub mode: String,

        /// Player brawler level
        #[arg(long, default_value_t = 1)]
        pub level: u8,

        /// RNG seed (random when omitted)
        #[arg(long)]
        pub seed: Option<u64>,

        /// Maximum simulated match duration in seconds
        #[arg(long, default_value = "600")]
        pub max_duration: f32,

        /// Quality preset for particles and floating text
        #[arg(long)]
        pub quality: Option<String>,
    }

    fn build_config(args: &Args) -> Result<MatchConfig, ConfigError> {
        if let Some(path) = &args.config {
            log::info!("Loading match config from {}", path.display());
            return MatchConfig::load_from_file(path);
        }
        let brawler = BrawlerKind::parse(&args.brawler)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown brawler '{}'", args.brawler)))?;
        let mode = GameMode::parse(&args.mode)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown mode '{}'", args.mode)))?;
        let seed = args.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.as_nanos() as u64)
        });
        let mut config = MatchConfig::new(brawler, mode, seed);
        config.level = args.level;
        Ok(config)
    }

    fn build_settings(args: &Args) -> Result<Settings, ConfigError> {
        match &args.quality {
            None => Ok(Settings::headless()),
            Some(name) => QualityPreset::parse(name)
                .map(Settings::from_preset)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown quality '{}'", name))),
        }
    }

    pub fn run() -> Result<(), ConfigError> {
        let args = Args::parse();
        let config = build_config(&args)?;
        let mut session = Session::new(&config, build_settings(&args)?)?;
        session.on_match_end(|result| {
            log::info!(
                "{} finished rank {} ({} kills, {} cubes)",
                result.player_name,
                result.rank,
                result.kills,
                result.cubes_collected
            );
        });
        session.set_input(TickInput {
            autopilot: true,
            ..TickInput::default()
        });

        while session.update(SIM_DT) {
            if session.state().now >= args.max_duration {
                log::warn!("Match hit the {:.0}s limit without a result", args.max_duration);
                session.teardown();
                break;
            }
        }

        match session.result() {
            Some(result) => println!("{}", serde_json::to_string_pretty(result)?),
            None => println!("{}", serde_json::to_string_pretty(session.hud())?),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; there is no binary entry point
}
