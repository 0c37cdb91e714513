//! Player profile: coins, runs played and permanent upgrade levels
//!
//! Persisted as JSON between runs. The simulation never touches the file;
//! the host loads a profile, hands its upgrades to a run, and records the
//! outcome afterwards.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::RunOutcome;
use crate::upgrades::{PermanentUpgrades, UpgradeKind};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shop purchase rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("{kind} costs {cost} coins, only {available} available")]
    InsufficientCoins {
        kind: UpgradeKind,
        cost: u64,
        available: u64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub coins: u64,
    pub total_runs: u32,
    pub upgrades: PermanentUpgrades,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a finished run
    pub fn record_run(&mut self, outcome: &RunOutcome) {
        self.coins = self.coins.saturating_add(outcome.coins_earned);
        self.total_runs = self.total_runs.saturating_add(1);
    }

    /// Buy the next level of `kind`. Returns the price paid.
    pub fn purchase(&mut self, kind: UpgradeKind) -> Result<u64, PurchaseError> {
        let cost = self.upgrades.next_cost(kind);
        if self.coins < cost {
            return Err(PurchaseError::InsufficientCoins {
                kind,
                cost,
                available: self.coins,
            });
        }
        self.coins -= cost;
        self.upgrades.increment(kind);
        log::info!(
            "Bought {} level {} for {} coins",
            kind,
            self.upgrades.level(kind),
            cost
        );
        Ok(cost)
    }

    pub fn to_json(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from `path`, starting fresh if the file does not exist yet
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let profile = Self::from_json(&json)?;
                log::info!(
                    "Loaded profile: {} coins, {} runs",
                    profile.coins,
                    profile.total_runs
                );
                Ok(profile)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No profile at {}, starting fresh", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ProfileError> {
        fs::write(path, self.to_json()?)?;
        log::info!("Profile saved ({} coins)", self.coins);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EndCause;

    fn outcome(coins: u64) -> RunOutcome {
        RunOutcome {
            cause: EndCause::TimeUp,
            score: 0,
            level: 1,
            coins_earned: coins,
        }
    }

    #[test]
    fn recording_runs_accumulates() {
        let mut profile = Profile::new();
        profile.record_run(&outcome(12));
        profile.record_run(&outcome(3));
        assert_eq!(profile.coins, 15);
        assert_eq!(profile.total_runs, 2);
    }

    #[test]
    fn purchase_follows_cost_curve() {
        let mut profile = Profile {
            coins: 100,
            ..Default::default()
        };
        assert_eq!(profile.purchase(UpgradeKind::FireRate), Ok(20));
        assert_eq!(profile.purchase(UpgradeKind::FireRate), Ok(40));
        assert_eq!(profile.coins, 40);
        assert_eq!(profile.upgrades.fire_rate, 2);

        assert_eq!(
            profile.purchase(UpgradeKind::FireRate),
            Err(PurchaseError::InsufficientCoins {
                kind: UpgradeKind::FireRate,
                cost: 60,
                available: 40,
            })
        );
        assert_eq!(profile.coins, 40);
        assert_eq!(profile.upgrades.fire_rate, 2);
    }

    #[test]
    fn json_roundtrip_and_defaults() {
        let mut profile = Profile::new();
        profile.coins = 7;
        profile.upgrades.increment(UpgradeKind::Magnetism);
        let json = profile.to_json().unwrap();
        assert_eq!(Profile::from_json(&json).unwrap(), profile);

        // Missing fields fall back to defaults
        let partial = Profile::from_json(r#"{"coins": 4}"#).unwrap();
        assert_eq!(partial.coins, 4);
        assert_eq!(partial.upgrades, PermanentUpgrades::default());

        assert!(matches!(
            Profile::from_json("not json"),
            Err(ProfileError::Json(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("rogue-runner-profile-{}.json", std::process::id()));
        let mut profile = Profile::new();
        profile.coins = 42;
        profile.total_runs = 3;
        profile.save(&path).unwrap();

        let loaded = Profile::load(&path).unwrap();
        assert_eq!(loaded, profile);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_a_fresh_profile() {
        let path = std::env::temp_dir().join("rogue-runner-does-not-exist.json");
        let _ = fs::remove_file(&path);
        assert_eq!(Profile::load(&path).unwrap(), Profile::new());
    }
}
