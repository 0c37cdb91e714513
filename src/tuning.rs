//! Run balance knobs
//!
//! Loaded from JSON (missing fields fall back to the shipped defaults) and
//! validated before a run is built.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("`{field}` must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("`{field}` must be a probability in [0, 1] (got {value})")]
    NotProbability { field: &'static str, value: f64 },
    #[error("pursuer cap base {base} exceeds ceiling {max}")]
    CapInverted { base: u32, max: u32 },
    #[error("invalid tuning JSON: {0}")]
    Json(String),
}

/// Run-level balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Length of a run on the clock
    pub run_duration_secs: f32,
    /// Pursuers granted when a run starts
    pub initial_pursuers: u32,
    /// Spawn chance per tick at t = 0
    pub spawn_base_chance: f32,
    /// Added to the spawn chance per elapsed second
    pub spawn_chance_per_sec: f32,
    /// Live pursuer cap at t = 0
    pub pursuer_cap_base: u32,
    /// Cap grows by one every this many seconds
    pub pursuer_cap_step_secs: f32,
    /// Hard ceiling on live pursuers
    pub pursuer_cap_max: u32,
    pub contact_damage: f32,
    pub contact_cooldown_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            run_duration_secs: 30.0,
            initial_pursuers: 2,
            spawn_base_chance: 0.015,
            spawn_chance_per_sec: 0.0008,
            pursuer_cap_base: 8,
            pursuer_cap_step_secs: 5.0,
            pursuer_cap_max: 15,
            contact_damage: 8.0,
            contact_cooldown_ms: 500.0,
        }
    }
}

impl Tuning {
    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Json(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        positive("run_duration_secs", self.run_duration_secs as f64)?;
        positive("pursuer_cap_step_secs", self.pursuer_cap_step_secs as f64)?;
        positive("contact_cooldown_ms", self.contact_cooldown_ms)?;
        if !(self.contact_damage >= 0.0) {
            return Err(TuningError::NotPositive {
                field: "contact_damage",
                value: self.contact_damage as f64,
            });
        }
        probability("spawn_base_chance", self.spawn_base_chance)?;
        probability("spawn_chance_per_sec", self.spawn_chance_per_sec)?;
        if self.pursuer_cap_base > self.pursuer_cap_max {
            return Err(TuningError::CapInverted {
                base: self.pursuer_cap_base,
                max: self.pursuer_cap_max,
            });
        }
        Ok(())
    }

    /// Spawn chance per tick after `elapsed` seconds
    pub fn spawn_chance(&self, elapsed: f32) -> f32 {
        self.spawn_base_chance + elapsed * self.spawn_chance_per_sec
    }

    /// Live pursuer cap after `elapsed` seconds
    pub fn pursuer_cap(&self, elapsed: f32) -> usize {
        let steps = (elapsed / self.pursuer_cap_step_secs).floor().max(0.0) as u32;
        self.pursuer_cap_base
            .saturating_add(steps)
            .min(self.pursuer_cap_max) as usize
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::NotPositive { field, value })
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::NotProbability {
            field,
            value: value as f64,
        })
    }
}
