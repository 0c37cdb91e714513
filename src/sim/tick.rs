//! Fixed timestep run controller
//!
//! Drives the run state machine and advances the simulation one tick at a
//! time. Phase order inside a tick is fixed: movement, combat, progression,
//! then the spawn ramp and the end-of-run check.

use glam::Vec2;
use rand::Rng;
use thiserror::Error;

use super::geometry::Aabb;
use super::progression::LevelUpChoice;
use super::state::{
    Agent, EndCause, GameEvent, Obstacle, RunOutcome, RunPhase, RunState, TempUpgrades,
};
use super::{combat, movement, progression};
use crate::arena_center;
use crate::consts::*;
use crate::upgrades::PermanentUpgrades;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Movement intent, each axis in [-1, 1]
    pub movement: Vec2,
    /// Help overlay toggle
    pub toggle_help: bool,
    /// Abandon the current run without reward
    pub cancel_run: bool,
}

/// Rejected level-up selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error("no level-up choice is pending")]
    NotPaused,
    #[error("choice {index} is not on offer ({offered} available)")]
    InvalidChoice { index: usize, offered: usize },
}

/// Currency awarded at the end of a run
pub fn coins_for(score: u64, level: u32) -> u64 {
    score / 10 + level as u64
}

impl RunState {
    /// Begin a fresh run with the given permanent upgrades
    pub fn start_run(&mut self, permanent: PermanentUpgrades) {
        self.permanent = permanent;
        self.agent = Agent::new(&self.permanent);
        self.temp = TempUpgrades::default();
        self.timer_secs = self.tuning.run_duration_secs;
        self.time_ticks = 0;
        self.score = 0;
        self.outcome = None;
        self.events.clear();

        self.clear_entities();
        generate_obstacles(self);
        for _ in 0..self.tuning.initial_pursuers {
            self.spawn_pursuer();
        }

        self.phase = RunPhase::Running;
        log::info!(
            "Run started (seed {}, {} obstacles, {} pursuers)",
            self.seed,
            self.obstacles.len(),
            self.pursuers.len()
        );
    }

    /// Apply one of the offered level-up choices and resume the run
    pub fn apply_level_up_choice(&mut self, index: usize) -> Result<LevelUpChoice, ChoiceError> {
        if self.phase != RunPhase::LevelPaused {
            return Err(ChoiceError::NotPaused);
        }
        let choice = *self
            .level_up_choices
            .get(index)
            .ok_or(ChoiceError::InvalidChoice {
                index,
                offered: self.level_up_choices.len(),
            })?;

        choice.apply(self);
        self.level_up_choices.clear();
        self.phase = RunPhase::Running;
        log::info!("Level-up choice applied: {}", choice.name());
        Ok(choice)
    }

    /// Abandon the run. Nothing is awarded.
    pub fn cancel_run(&mut self) {
        self.clear_entities();
        self.obstacles.clear();
        self.outcome = None;
        self.phase = RunPhase::Idle;
        log::info!("Run cancelled after {} ticks", self.time_ticks);
    }

    /// Finish the run and record its outcome
    fn end_run(&mut self, cause: EndCause) {
        let outcome = RunOutcome {
            cause,
            score: self.score,
            level: self.agent.level,
            coins_earned: coins_for(self.score, self.agent.level),
        };
        self.outcome = Some(outcome);
        self.level_up_choices.clear();
        self.phase = RunPhase::Ended;
        self.events.push(GameEvent::RunEnded(outcome));
        log::info!(
            "Run ended ({:?}): score {}, level {}, {} coins",
            cause,
            outcome.score,
            outcome.level,
            outcome.coins_earned
        );
    }
}

/// Advance the run by one fixed timestep
pub fn tick(state: &mut RunState, input: &TickInput) {
    state.events.clear();

    if input.toggle_help {
        state.show_help = !state.show_help;
    }
    if input.cancel_run && matches!(state.phase, RunPhase::Running | RunPhase::LevelPaused) {
        state.cancel_run();
        return;
    }

    // Only a running run advances; a pending level-up holds everything
    if state.phase != RunPhase::Running {
        return;
    }

    state.time_ticks += 1;

    movement::update(state, input.movement);
    combat::update(state);
    progression::update(state);
    spawn_ramp(state);

    state.timer_secs = (state.timer_secs - SIM_DT).max(0.0);

    if state.agent.is_dead() {
        state.end_run(EndCause::Died);
    } else if state.timer_secs <= 0.0 {
        state.end_run(EndCause::TimeUp);
    }
}

/// Probabilistic pursuer spawn, bounded by the live cap
fn spawn_ramp(state: &mut RunState) {
    let elapsed = state.elapsed_secs();
    let chance = state.tuning.spawn_chance(elapsed);
    let cap = state.tuning.pursuer_cap(elapsed);
    if state.pursuers.len() >= cap {
        return;
    }
    if state.rng().random::<f32>() < chance {
        state.spawn_pursuer();
    }
}

/// Scatter obstacles, keeping the arena center clear and walls apart
pub fn generate_obstacles(state: &mut RunState) {
    state.obstacles.clear();
    let center = arena_center();

    for _ in 0..OBSTACLE_ATTEMPTS {
        if state.obstacles.len() >= OBSTACLE_TARGET {
            break;
        }

        let rng = state.rng();
        let corner = Vec2::new(
            rng.random_range(OBSTACLE_EDGE_MARGIN..ARENA_WIDTH - OBSTACLE_FAR_MARGIN),
            rng.random_range(OBSTACLE_EDGE_MARGIN..ARENA_HEIGHT - OBSTACLE_FAR_MARGIN),
        );
        let size = Vec2::new(
            rng.random_range(OBSTACLE_MIN_SIDE..OBSTACLE_MAX_SIDE),
            rng.random_range(OBSTACLE_MIN_SIDE..OBSTACLE_MAX_SIDE),
        );
        let body = Aabb::from_corner(corner, size);

        if body.center.distance(center) <= OBSTACLE_SPAWN_CLEARANCE {
            continue;
        }
        let crowded = state
            .obstacles
            .iter()
            .any(|o| o.body.center.distance(body.center) < OBSTACLE_MIN_SEPARATION);
        if crowded {
            continue;
        }

        state.obstacles.push(Obstacle { body });
    }

    log::debug!("Placed {} obstacles", state.obstacles.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::overlaps;
    use crate::sim::state::PursuerClass;
    use crate::tuning::Tuning;
    use crate::upgrades::UpgradeKind;

    fn quiet_tuning() -> Tuning {
        Tuning {
            spawn_base_chance: 0.0,
            spawn_chance_per_sec: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn start_run_resets_and_seeds_the_arena() {
        let mut state = RunState::new(12345, Tuning::default());
        assert_eq!(state.phase, RunPhase::Idle);

        let mut permanent = PermanentUpgrades::default();
        permanent.increment(UpgradeKind::Health);
        state.score = 999;
        state.start_run(permanent);

        assert_eq!(state.phase, RunPhase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.timer_secs, 30.0);
        assert_eq!(state.pursuers.len(), 2);
        assert_eq!(state.agent.max_health, 120.0);
        assert_eq!(state.agent.body.center, arena_center());
        assert!(state.obstacles.iter().all(|o| !overlaps(&o.body, &state.agent.body)));
    }

    #[test]
    fn idle_state_does_not_advance() {
        let mut state = RunState::new(1, Tuning::default());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.phase, RunPhase::Idle);
    }

    #[test]
    fn obstacle_placement_rules_hold() {
        let center = arena_center();
        for seed in 0..25 {
            let mut state = RunState::new(seed, Tuning::default());
            state.start_run(PermanentUpgrades::default());

            assert!(state.obstacles.len() <= OBSTACLE_TARGET);
            for (i, a) in state.obstacles.iter().enumerate() {
                let min = a.body.min();
                let size = a.body.size();
                assert!(min.x >= OBSTACLE_EDGE_MARGIN - 1e-3);
                assert!(min.y >= OBSTACLE_EDGE_MARGIN - 1e-3);
                assert!(min.x <= ARENA_WIDTH - OBSTACLE_FAR_MARGIN + 1e-3);
                assert!(min.y <= ARENA_HEIGHT - OBSTACLE_FAR_MARGIN + 1e-3);
                assert!(size.x >= OBSTACLE_MIN_SIDE - 1e-3 && size.x <= OBSTACLE_MAX_SIDE + 1e-3);
                assert!(size.y >= OBSTACLE_MIN_SIDE - 1e-3 && size.y <= OBSTACLE_MAX_SIDE + 1e-3);
                assert!(a.body.center.distance(center) > OBSTACLE_SPAWN_CLEARANCE);
                for b in &state.obstacles[i + 1..] {
                    assert!(a.body.center.distance(b.body.center) >= OBSTACLE_MIN_SEPARATION);
                }
            }
        }
    }

    #[test]
    fn repeated_contact_ends_the_run_after_thirteen_hits() {
        let mut state = RunState::new(77, quiet_tuning());
        state.start_run(PermanentUpgrades::default());
        state.obstacles.clear();
        state.pursuers.clear();
        // Weapon never finds a target
        state.agent.weapon.range = -1.0;

        let center = state.agent.body.center;
        state.spawn_pursuer_at(PursuerClass::Fast, center - Vec2::new(30.0, 0.0));
        state.spawn_pursuer_at(PursuerClass::Fast, center + Vec2::new(30.0, 0.0));

        let mut contacts = 0;
        for _ in 0..1800 {
            tick(&mut state, &TickInput::default());
            contacts += state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::ContactDamage { .. }))
                .count();
            if state.phase == RunPhase::Ended {
                break;
            }
        }

        assert_eq!(state.phase, RunPhase::Ended);
        assert_eq!(contacts, 13);
        let outcome = state.outcome.expect("outcome recorded");
        assert_eq!(outcome.cause, EndCause::Died);
        assert_eq!(outcome.coins_earned, state.score / 10 + state.agent.level as u64);
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::RunEnded(_))));
    }

    #[test]
    fn timer_expiry_ends_the_run() {
        let mut state = RunState::new(5, quiet_tuning());
        state.start_run(PermanentUpgrades::default());
        state.pursuers.clear();
        state.score = 57;
        state.timer_secs = SIM_DT * 0.5;

        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, RunPhase::Ended);
        let outcome = state.outcome.expect("outcome recorded");
        assert_eq!(outcome.cause, EndCause::TimeUp);
        assert_eq!(outcome.coins_earned, 5 + 1);

        // Ended runs are frozen
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn death_on_a_level_up_tick_drops_the_offer() {
        let mut state = RunState::new(13, quiet_tuning());
        state.start_run(PermanentUpgrades::default());
        state.pursuers.clear();
        state.agent.xp = 5;
        state.agent.health = 1.0;
        let center = state.agent.body.center;
        state.spawn_pursuer_at(PursuerClass::Balanced, center + Vec2::new(5.0, 0.0));

        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, RunPhase::Ended);
        assert_eq!(state.agent.level, 2);
        assert!(state.level_up_choices.is_empty());
        assert_eq!(state.apply_level_up_choice(0), Err(ChoiceError::NotPaused));
    }

    #[test]
    fn level_up_pauses_until_a_valid_choice() {
        let mut state = RunState::new(8, quiet_tuning());
        state.start_run(PermanentUpgrades::default());
        state.agent.xp = 5;

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, RunPhase::LevelPaused);
        assert_eq!(state.level_up_choices.len(), 3);

        let ticks = state.time_ticks;
        let timer = state.timer_secs;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.timer_secs, timer);

        assert_eq!(
            state.apply_level_up_choice(3),
            Err(ChoiceError::InvalidChoice {
                index: 3,
                offered: 3
            })
        );
        assert_eq!(state.phase, RunPhase::LevelPaused);

        let offered = state.level_up_choices[1];
        assert_eq!(state.apply_level_up_choice(1), Ok(offered));
        assert_eq!(state.phase, RunPhase::Running);
        assert!(state.level_up_choices.is_empty());

        assert_eq!(state.apply_level_up_choice(0), Err(ChoiceError::NotPaused));
    }

    #[test]
    fn cancel_returns_to_idle_without_reward() {
        let mut state = RunState::new(3, Tuning::default());
        state.start_run(PermanentUpgrades::default());
        tick(&mut state, &TickInput::default());

        let input = TickInput {
            cancel_run: true,
            ..Default::default()
        };
        tick(&mut state, &input);

        assert_eq!(state.phase, RunPhase::Idle);
        assert!(state.outcome.is_none());
        assert!(state.pursuers.is_empty());
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn help_toggle_works_in_any_phase() {
        let mut state = RunState::new(3, Tuning::default());
        let input = TickInput {
            toggle_help: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert!(state.show_help);
        tick(&mut state, &input);
        assert!(!state.show_help);
    }

    #[test]
    fn spawn_ramp_respects_cap() {
        let tuning = Tuning {
            spawn_base_chance: 1.0,
            pursuer_cap_base: 3,
            pursuer_cap_max: 3,
            ..Default::default()
        };
        let mut state = RunState::new(21, tuning);
        state.start_run(PermanentUpgrades::default());
        assert_eq!(state.pursuers.len(), 2);

        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.pursuers.len(), 3);
    }

    #[test]
    fn coins_follow_score_and_level() {
        assert_eq!(coins_for(0, 1), 1);
        assert_eq!(coins_for(129, 4), 16);
    }

    #[test]
    fn determinism() {
        let mut a = RunState::new(99999, Tuning::default());
        let mut b = RunState::new(99999, Tuning::default());
        a.start_run(PermanentUpgrades::default());
        b.start_run(PermanentUpgrades::default());

        for i in 0..600 {
            let angle = i as f32 * 0.05;
            let input = TickInput {
                movement: Vec2::new(angle.cos(), angle.sin()),
                ..Default::default()
            };
            for state in [&mut a, &mut b] {
                if state.phase == RunPhase::LevelPaused {
                    let _ = state.apply_level_up_choice(0);
                }
                tick(state, &input);
            }
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.agent.body.center, b.agent.body.center);
        assert_eq!(a.pursuers.len(), b.pursuers.len());
        for (pa, pb) in a.pursuers.iter().zip(&b.pursuers) {
            assert_eq!(pa.id, pb.id);
            assert_eq!(pa.body.center, pb.body.center);
        }
    }
}
