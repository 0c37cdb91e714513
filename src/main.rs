//! Rogue Runner headless host
//!
//! Drives complete runs at the fixed tick rate with an autopilot standing in
//! for the player, then credits the profile on disk.

use std::error::Error;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use env_logger::{Builder, Env};
use glam::Vec2;
use log::LevelFilter;

use rogue_runner::consts::*;
use rogue_runner::sim::{RunPhase, RunState, TickInput, tick};
use rogue_runner::{Profile, Tuning, UpgradeKind, arena_center, direction_or_zero};

/// Play timed arena runs and bank the coins
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of runs to play
    #[arg(short, long, default_value_t = 1)]
    runs: u32,
    /// Seed for the first run (later runs add their index)
    #[arg(short, long)]
    seed: Option<u64>,
    /// Profile file
    #[arg(short, long, default_value = "rogue-runner-profile.json")]
    profile: PathBuf,
    /// Balance overrides (JSON)
    #[arg(short, long)]
    tuning: Option<PathBuf>,
    /// Upgrades to buy before playing (damage, speed, health, fire_rate, magnetism)
    #[arg(short, long)]
    buy: Vec<UpgradeKind>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Steer away from nearby pursuers, drift toward orbs, and keep off the walls
fn autopilot(state: &RunState) -> Vec2 {
    let me = state.agent.body.center;

    let mut flee = Vec2::ZERO;
    for pursuer in &state.pursuers {
        let offset = me - pursuer.body.center;
        let dist = offset.length();
        if dist < 150.0 {
            flee += direction_or_zero(offset) * (150.0 - dist) / 150.0;
        }
    }

    let orb = state
        .pickups
        .iter()
        .map(|p| p.body.center)
        .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)))
        .map(|p| direction_or_zero(p - me) * 0.5)
        .unwrap_or(Vec2::ZERO);

    let home = (arena_center() - me) / Vec2::new(ARENA_WIDTH, ARENA_HEIGHT);

    direction_or_zero(flee * 2.0 + orb + home)
}

/// `RUST_LOG` wins over `--verbose` when set
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let tuning = match &args.tuning {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };

    let mut profile = Profile::load(&args.profile)?;
    for kind in &args.buy {
        if let Err(e) = profile.purchase(*kind) {
            log::warn!("{e}");
        }
    }

    let base_seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    for run in 0..args.runs {
        let mut state = RunState::new(base_seed.wrapping_add(run as u64), tuning.clone());
        state.start_run(profile.upgrades);

        while state.phase != RunPhase::Ended {
            if state.phase == RunPhase::LevelPaused {
                let choice = state.apply_level_up_choice(0)?;
                log::debug!("Autopilot took {}", choice.name());
            }
            let input = TickInput {
                movement: autopilot(&state),
                ..Default::default()
            };
            tick(&mut state, &input);
        }

        if let Some(outcome) = state.outcome {
            profile.record_run(&outcome);
            log::info!(
                "Run {}/{}: {:?} after {:.1}s, score {}, level {}, +{} coins",
                run + 1,
                args.runs,
                outcome.cause,
                state.time_ticks as f32 * SIM_DT,
                outcome.score,
                outcome.level,
                outcome.coins_earned
            );
        }
    }

    profile.save(&args.profile)?;
    log::info!(
        "{} coins banked over {} runs",
        profile.coins,
        profile.total_runs
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rogue_runner::sim::PursuerClass;
    use rogue_runner::upgrades::PermanentUpgrades;

    #[test]
    fn autopilot_backs_away_from_a_pursuer() {
        let mut state = RunState::new(1, Tuning::default());
        state.start_run(PermanentUpgrades::default());
        state.pursuers.clear();
        let me = state.agent.body.center;
        state.spawn_pursuer_at(PursuerClass::Balanced, me + Vec2::new(40.0, 0.0));

        let intent = autopilot(&state);
        assert!(intent.x < 0.0);
    }

    #[test]
    fn autopilot_finishes_a_run() {
        let mut state = RunState::new(2, Tuning::default());
        state.start_run(PermanentUpgrades::default());
        for _ in 0..5000 {
            if state.phase == RunPhase::Ended {
                break;
            }
            if state.phase == RunPhase::LevelPaused {
                state.apply_level_up_choice(0).unwrap();
            }
            let input = TickInput {
                movement: autopilot(&state),
                ..Default::default()
            };
            tick(&mut state, &input);
        }
        assert_eq!(state.phase, RunPhase::Ended);
        assert!(state.outcome.is_some());
    }
}
