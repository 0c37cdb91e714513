//! Rewards, experience and leveling
//!
//! Defeated pursuers drop orbs, orbs drift toward the agent and are
//! collected on contact, and crossing the experience threshold pauses the
//! run until one of three offered choices is applied.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::geometry::{overlaps, within_distance};
use super::state::{GameEvent, RunPhase, RunState};
use crate::consts::*;

/// Upgrades offered on level-up (last for the rest of the run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpChoice {
    DamageBoost,
    FireRate,
    SpeedBoost,
    HealthBoost,
    MultiShot,
    PiercingShots,
    ExplosiveRounds,
    HomingMissiles,
    RapidFire,
    HealthRegen,
}

impl LevelUpChoice {
    pub const ALL: [LevelUpChoice; 10] = [
        LevelUpChoice::DamageBoost,
        LevelUpChoice::FireRate,
        LevelUpChoice::SpeedBoost,
        LevelUpChoice::HealthBoost,
        LevelUpChoice::MultiShot,
        LevelUpChoice::PiercingShots,
        LevelUpChoice::ExplosiveRounds,
        LevelUpChoice::HomingMissiles,
        LevelUpChoice::RapidFire,
        LevelUpChoice::HealthRegen,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LevelUpChoice::DamageBoost => "Damage Boost",
            LevelUpChoice::FireRate => "Fire Rate",
            LevelUpChoice::SpeedBoost => "Speed Boost",
            LevelUpChoice::HealthBoost => "Health Boost",
            LevelUpChoice::MultiShot => "Multi-Shot",
            LevelUpChoice::PiercingShots => "Piercing Shots",
            LevelUpChoice::ExplosiveRounds => "Explosive Rounds",
            LevelUpChoice::HomingMissiles => "Homing Missiles",
            LevelUpChoice::RapidFire => "Rapid Fire",
            LevelUpChoice::HealthRegen => "Health Regen",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LevelUpChoice::DamageBoost => "+3 Damage",
            LevelUpChoice::FireRate => "25% Faster Shooting",
            LevelUpChoice::SpeedBoost => "+1 Movement Speed",
            LevelUpChoice::HealthBoost => "+20 Max Health",
            LevelUpChoice::MultiShot => "Shoot 2 Extra Bullets",
            LevelUpChoice::PiercingShots => "Bullets Pierce 3 Enemies",
            LevelUpChoice::ExplosiveRounds => "Bullets Explode on Impact",
            LevelUpChoice::HomingMissiles => "Projectiles Track Enemies",
            LevelUpChoice::RapidFire => "50% Fire Rate Boost",
            LevelUpChoice::HealthRegen => "Slowly Regenerate HP",
        }
    }

    /// Apply the upgrade to the running state
    pub fn apply(self, state: &mut RunState) {
        match self {
            LevelUpChoice::DamageBoost => state.temp.damage += 3.0,
            LevelUpChoice::FireRate => state.temp.fire_rate += 0.25,
            LevelUpChoice::SpeedBoost => state.temp.speed += 1.0,
            LevelUpChoice::HealthBoost => {
                state.temp.health += 20.0;
                state.agent.max_health += 20.0;
                state.agent.adjust_health(20.0);
            }
            LevelUpChoice::MultiShot => state.agent.weapon.multi_shot += 2,
            LevelUpChoice::PiercingShots => state.agent.weapon.piercing = true,
            LevelUpChoice::ExplosiveRounds => state.agent.weapon.explosive = true,
            LevelUpChoice::HomingMissiles => state.agent.weapon.homing = true,
            LevelUpChoice::RapidFire => state.temp.fire_rate += 0.5,
            LevelUpChoice::HealthRegen => state.agent.weapon.regen = true,
        }
    }
}

/// Draw `LEVEL_UP_CHOICES` distinct choices
pub fn draw_choices(state: &mut RunState) -> Vec<LevelUpChoice> {
    let mut pool = LevelUpChoice::ALL.to_vec();
    pool.shuffle(state.rng());
    pool.truncate(LEVEL_UP_CHOICES);
    pool
}

/// Remove defeated pursuers, drop their orbs and credit score
pub fn collect_defeated(state: &mut RunState) {
    let (defeated, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pursuers)
        .into_iter()
        .partition(|p| p.is_dead());
    state.pursuers = alive;

    for pursuer in defeated {
        let pos = pursuer.body.center;
        state.spawn_pickup(pos, pursuer.reward);
        state.score += pursuer.reward as u64 * SCORE_PER_REWARD;
        state.events.push(GameEvent::PursuerDefeated {
            pursuer_id: pursuer.id,
            pos,
            reward: pursuer.reward,
        });
    }
}

/// Pull orbs toward the agent and collect the ones touching it
pub fn update_pickups(state: &mut RunState) {
    let agent_body = state.agent.body;
    let mut gained = 0u32;

    state.pickups.retain_mut(|pickup| {
        let offset = agent_body.center - pickup.body.center;
        if within_distance(pickup.body.center, agent_body.center, pickup.attraction_radius) {
            pickup.body.center += offset * PICKUP_PULL;
        }
        if overlaps(&agent_body, &pickup.body) {
            gained += pickup.value;
            state.events.push(GameEvent::PickupCollected {
                value: pickup.value,
            });
            return false;
        }
        true
    });

    state.agent.xp += gained;
}

/// Single level check. Returns true if the run is now paused for a choice.
pub fn check_level_up(state: &mut RunState) -> bool {
    let needed = state.agent.xp_to_next();
    if state.agent.xp < needed {
        return false;
    }

    state.agent.xp -= needed;
    state.agent.level += 1;
    state.level_up_choices = draw_choices(state);
    state.phase = RunPhase::LevelPaused;
    state.events.push(GameEvent::LevelUp {
        level: state.agent.level,
    });
    log::info!(
        "Level {} reached, offering {:?}",
        state.agent.level,
        state.level_up_choices
    );
    true
}

/// Progression phase of a tick
pub fn update(state: &mut RunState) {
    collect_defeated(state);
    update_pickups(state);
    check_level_up(state);
}
