//! Ledge Runner headless runner
//!
//! Plays the campaign at a fixed timestep with the built-in autopilot,
//! logs gameplay events and prints a JSON summary. `RUST_LOG` controls
//! logging.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::BTreeMap;
    use std::env;
    use std::path::PathBuf;

    use anyhow::{Context, Result, anyhow};
    use serde::Serialize;

    use ledge_runner::Settings;
    use ledge_runner::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    #[derive(Debug, Default)]
    struct Cli {
        settings_path: Option<PathBuf>,
        levels_path: Option<PathBuf>,
        seconds: Option<f32>,
        seed: Option<u64>,
    }

    impl Cli {
        fn parse() -> Result<Self> {
            let mut args = env::args().skip(1);
            let mut cli = Cli::default();

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--settings" => {
                        let value = args
                            .next()
                            .ok_or_else(|| anyhow!("--settings requires a file path"))?;
                        cli.settings_path = Some(PathBuf::from(value));
                    }
                    "--levels" => {
                        let value = args
                            .next()
                            .ok_or_else(|| anyhow!("--levels requires a file path"))?;
                        cli.levels_path = Some(PathBuf::from(value));
                    }
                    "--seconds" => {
                        let value = args
                            .next()
                            .ok_or_else(|| anyhow!("--seconds requires a number"))?;
                        cli.seconds = Some(
                            value
                                .parse::<f32>()
                                .with_context(|| format!("invalid --seconds value: {value}"))?,
                        );
                    }
                    "--seed" => {
                        let value = args
                            .next()
                            .ok_or_else(|| anyhow!("--seed requires a number"))?;
                        cli.seed = Some(
                            value
                                .parse::<u64>()
                                .with_context(|| format!("invalid --seed value: {value}"))?,
                        );
                    }
                    "-h" | "--help" => {
                        println!(
                            "Usage: ledge-runner [--settings <file.json>] \
                             [--levels <campaign.json>] [--seconds <n>] [--seed <n>]"
                        );
                        std::process::exit(0);
                    }
                    other => {
                        return Err(anyhow!("unknown argument: {other}. Use --help for usage."));
                    }
                }
            }
            Ok(cli)
        }

        /// Settings file (or defaults) with command-line overrides applied
        fn settings(&self) -> Result<Settings> {
            let mut settings = match &self.settings_path {
                Some(path) => Settings::load(path)
                    .with_context(|| format!("failed to load settings: {}", path.display()))?,
                None => Settings::default(),
            };
            if let Some(path) = &self.levels_path {
                settings.levels_path = Some(path.clone());
            }
            if let Some(seconds) = self.seconds {
                settings.run_seconds = seconds;
            }
            if let Some(seed) = self.seed {
                settings.seed = seed;
            }
            settings.validate().context("invalid settings")?;
            Ok(settings)
        }
    }

    #[derive(Debug, Serialize)]
    struct Summary {
        seed: u64,
        ticks: u64,
        simulated_seconds: f32,
        phase: GamePhase,
        level: u32,
        score: u64,
        lives: u8,
        kills: u32,
        power_ups: u32,
        deaths: u32,
        levels_cleared: u32,
        /// Per-kind kill counts
        kills_by_kind: BTreeMap<String, u32>,
    }

    pub fn run() -> Result<()> {
        env_logger::init();

        let cli = Cli::parse()?;
        let settings = cli.settings()?;
        let mut state = GameState::from_settings(&settings).context("failed to start the game")?;
        log::info!(
            "Ledge Runner starting: seed {}, {} levels, {:.1}s at dt {:.4}",
            settings.seed,
            state.levels.len(),
            settings.run_seconds,
            settings.fixed_dt
        );

        let mut summary = Summary {
            seed: settings.seed,
            ticks: 0,
            simulated_seconds: 0.0,
            phase: state.phase,
            level: 0,
            score: 0,
            lives: state.lives,
            kills: 0,
            power_ups: 0,
            deaths: 0,
            levels_cleared: 0,
            kills_by_kind: BTreeMap::new(),
        };

        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..settings.total_ticks() {
            tick(&mut state, &input, settings.fixed_dt);

            for event in state.drain_events() {
                match &event {
                    GameEvent::Explosion { .. } => log::trace!("{event:?}"),
                    GameEvent::EnemyKilled { kind, .. } => {
                        summary.kills += 1;
                        *summary.kills_by_kind.entry(format!("{kind:?}")).or_default() += 1;
                        log::debug!("{event:?}");
                    }
                    GameEvent::PowerUpCollected { .. } => {
                        summary.power_ups += 1;
                        log::debug!("{event:?}");
                    }
                    GameEvent::PlayerDefeated { .. } => {
                        summary.deaths += 1;
                        log::info!("{event:?}");
                    }
                    GameEvent::LevelCleared { .. } => {
                        summary.levels_cleared += 1;
                        log::info!("{event:?}");
                    }
                    _ => log::info!("{event:?}"),
                }
            }

            match state.phase {
                GamePhase::LevelCleared => {
                    state.advance_level().context("failed to advance level")?
                }
                GamePhase::Victory | GamePhase::GameOver => break,
                GamePhase::Playing | GamePhase::Paused => {}
            }
        }

        summary.ticks = state.time_ticks;
        summary.simulated_seconds = state.elapsed;
        summary.phase = state.phase;
        summary.level = state.level_index;
        summary.score = state.score;
        summary.lives = state.lives;
        log::info!(
            "Run finished: {:?} on level {} with score {}",
            summary.phase,
            summary.level + 1,
            summary.score
        );

        let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{json}");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the embedding host on the web
}
