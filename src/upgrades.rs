//! Permanent upgrades bought between runs
//!
//! Levels are owned by the persistence layer; the simulation only reads
//! them at run start.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{PICKUP_ATTRACTION_PER_LEVEL, PICKUP_BASE_ATTRACTION};

/// Upgrade kinds offered in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    Damage,
    Speed,
    Health,
    FireRate,
    Magnetism,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown upgrade kind `{0}`")]
pub struct UpgradeParseError(pub String);

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::Damage,
        UpgradeKind::Speed,
        UpgradeKind::Health,
        UpgradeKind::FireRate,
        UpgradeKind::Magnetism,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Damage => "damage",
            UpgradeKind::Speed => "speed",
            UpgradeKind::Health => "health",
            UpgradeKind::FireRate => "fire_rate",
            UpgradeKind::Magnetism => "magnetism",
        }
    }

    /// Shop description
    pub fn description(&self) -> &'static str {
        match self {
            UpgradeKind::Damage => "Increase weapon damage",
            UpgradeKind::Speed => "Increase movement speed",
            UpgradeKind::Health => "Increase max health",
            UpgradeKind::FireRate => "Faster shooting",
            UpgradeKind::Magnetism => "Attract XP from farther",
        }
    }

    /// Per-kind price multiplier
    pub fn cost_multiplier(&self) -> u64 {
        match self {
            UpgradeKind::Damage => 10,
            UpgradeKind::Speed => 12,
            UpgradeKind::Health => 15,
            UpgradeKind::FireRate => 20,
            UpgradeKind::Magnetism => 8,
        }
    }

    /// Price of buying the next level when currently at `level`
    pub fn cost(&self, level: u32) -> u64 {
        (level as u64 + 1) * self.cost_multiplier()
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpgradeKind {
    type Err = UpgradeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "damage" => Ok(UpgradeKind::Damage),
            "speed" => Ok(UpgradeKind::Speed),
            "health" => Ok(UpgradeKind::Health),
            "fire_rate" | "firerate" => Ok(UpgradeKind::FireRate),
            "magnetism" => Ok(UpgradeKind::Magnetism),
            _ => Err(UpgradeParseError(s.to_string())),
        }
    }
}

/// Permanent upgrade levels (all start at 0)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermanentUpgrades {
    pub damage: u32,
    pub speed: u32,
    pub health: u32,
    pub fire_rate: u32,
    pub magnetism: u32,
}

impl PermanentUpgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Damage => self.damage,
            UpgradeKind::Speed => self.speed,
            UpgradeKind::Health => self.health,
            UpgradeKind::FireRate => self.fire_rate,
            UpgradeKind::Magnetism => self.magnetism,
        }
    }

    pub fn increment(&mut self, kind: UpgradeKind) {
        let slot = match kind {
            UpgradeKind::Damage => &mut self.damage,
            UpgradeKind::Speed => &mut self.speed,
            UpgradeKind::Health => &mut self.health,
            UpgradeKind::FireRate => &mut self.fire_rate,
            UpgradeKind::Magnetism => &mut self.magnetism,
        };
        *slot = slot.saturating_add(1);
    }

    /// Price of the next level of `kind`
    pub fn next_cost(&self, kind: UpgradeKind) -> u64 {
        kind.cost(self.level(kind))
    }

    /// Flat damage added to every projectile
    pub fn bonus_damage(&self) -> f32 {
        self.damage as f32
    }

    /// Flat per-tick speed added to the agent
    pub fn bonus_speed(&self) -> f32 {
        self.speed as f32
    }

    /// Extra max health
    pub fn bonus_health(&self) -> f32 {
        self.health as f32 * 20.0
    }

    /// Fraction shaved off the fire interval (10% per level)
    pub fn fire_rate_fraction(&self) -> f32 {
        self.fire_rate as f32 * 0.1
    }

    /// Pickup attraction radius
    pub fn attraction_radius(&self) -> f32 {
        PICKUP_BASE_ATTRACTION + self.magnetism as f32 * PICKUP_ATTRACTION_PER_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_grows_linearly_with_level() {
        assert_eq!(UpgradeKind::Damage.cost(0), 10);
        assert_eq!(UpgradeKind::Damage.cost(2), 30);
        assert_eq!(UpgradeKind::Magnetism.cost(4), 40);
        assert_eq!(UpgradeKind::FireRate.cost(1), 40);
    }

    #[test]
    fn parses_known_kinds() {
        assert_eq!("fireRate".parse::<UpgradeKind>(), Ok(UpgradeKind::FireRate));
        assert_eq!("Fire_Rate".parse::<UpgradeKind>(), Ok(UpgradeKind::FireRate));
        assert_eq!("magnetism".parse::<UpgradeKind>(), Ok(UpgradeKind::Magnetism));
        for kind in UpgradeKind::ALL {
            assert_eq!(kind.as_str().parse::<UpgradeKind>(), Ok(kind));
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "armor".parse::<UpgradeKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown upgrade kind `armor`");
    }

    #[test]
    fn increment_only_touches_one_kind() {
        let mut levels = PermanentUpgrades::default();
        levels.increment(UpgradeKind::Magnetism);
        levels.increment(UpgradeKind::Magnetism);
        assert_eq!(levels.level(UpgradeKind::Magnetism), 2);
        assert_eq!(levels.level(UpgradeKind::Damage), 0);
        assert_eq!(levels.attraction_radius(), 60.0);
        assert_eq!(levels.next_cost(UpgradeKind::Magnetism), 24);
    }
}
