//! Rogue Runner - A timed arena survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, combat, progression, run state)
//! - `upgrades`: Permanent upgrade kinds and their cost curve
//! - `profile`: Persisted coins, runs and upgrade levels
//! - `tuning`: Data-driven run balance

pub mod profile;
pub mod sim;
pub mod tuning;
pub mod upgrades;

pub use profile::Profile;
pub use tuning::Tuning;
pub use upgrades::{PermanentUpgrades, UpgradeKind};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_HZ: f32 = 60.0;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_HZ;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Agent defaults
    pub const AGENT_SIZE: f32 = 20.0;
    pub const AGENT_BASE_SPEED: f32 = 3.0;
    pub const AGENT_BASE_HEALTH: f32 = 100.0;
    /// Health regenerated per tick once the regen perk is taken
    pub const AGENT_REGEN_PER_TICK: f32 = 0.2;

    /// Weapon defaults
    pub const WEAPON_DAMAGE: f32 = 15.0;
    pub const WEAPON_RANGE: f32 = 120.0;
    pub const WEAPON_FIRE_INTERVAL_MS: f64 = 600.0;
    /// Multi-shot aim perturbation (total width, radians)
    pub const MULTI_SHOT_SPREAD: f32 = 0.8;

    /// Knockback applied to the agent on contact
    pub const KNOCKBACK_DISTANCE: f32 = 15.0;

    /// Pursuer steering
    pub const AVOIDANCE_LOOKAHEAD: f32 = 35.0;
    pub const AVOIDANCE_WEIGHT: f32 = 0.7;
    pub const UNSTICK_FACTOR: f32 = 0.4;
    /// How far past the arena edge a pursuer may drift before being clamped
    pub const PURSUER_BOUND_MARGIN: f32 = 15.0;
    /// Spawn distance outside the arena edge
    pub const PURSUER_SPAWN_OFFSET: f32 = 12.0;

    /// Projectiles
    pub const PROJECTILE_LIFE_TICKS: u32 = 60;
    pub const PROJECTILE_BOUND_MARGIN: f32 = 20.0;
    pub const PIERCE_BUDGET: u32 = 3;
    pub const EXPLOSION_RADIUS: f32 = 40.0;
    /// Fraction of the projectile damage dealt by its explosion
    pub const EXPLOSION_PAYLOAD: f32 = 0.7;
    pub const EXPLOSION_LIFE_TICKS: u32 = 10;
    pub const HOMING_STRENGTH: f32 = 0.05;
    pub const HOMING_TRACK_RADIUS: f32 = 120.0;

    /// Pickups
    pub const PICKUP_SIZE: f32 = 6.0;
    pub const PICKUP_BASE_ATTRACTION: f32 = 40.0;
    pub const PICKUP_ATTRACTION_PER_LEVEL: f32 = 10.0;
    /// Fraction of the remaining offset closed each tick while attracted
    pub const PICKUP_PULL: f32 = 0.15;

    /// Progression
    pub const SCORE_PER_REWARD: u64 = 10;
    pub const XP_PER_LEVEL: u32 = 5;
    pub const LEVEL_UP_CHOICES: usize = 3;

    /// Spatial index
    pub const GRID_CELL_SIZE: f32 = 50.0;

    /// Obstacle generation
    pub const OBSTACLE_TARGET: usize = 12;
    pub const OBSTACLE_ATTEMPTS: u32 = 50;
    pub const OBSTACLE_EDGE_MARGIN: f32 = 30.0;
    pub const OBSTACLE_FAR_MARGIN: f32 = 80.0;
    pub const OBSTACLE_MIN_SIDE: f32 = 25.0;
    pub const OBSTACLE_MAX_SIDE: f32 = 45.0;
    pub const OBSTACLE_SPAWN_CLEARANCE: f32 = 100.0;
    pub const OBSTACLE_MIN_SEPARATION: f32 = 60.0;
}

/// Center of the arena
#[inline]
pub fn arena_center() -> Vec2 {
    Vec2::new(consts::ARENA_WIDTH / 2.0, consts::ARENA_HEIGHT / 2.0)
}

/// Unit vector pointing along `v`, or zero when `v` has no usable length
#[inline]
pub fn direction_or_zero(v: Vec2) -> Vec2 {
    if !v.is_finite() {
        return Vec2::ZERO;
    }
    v.try_normalize().unwrap_or(Vec2::ZERO)
}

/// Rotate a vector 90° counter-clockwise
#[inline]
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}
