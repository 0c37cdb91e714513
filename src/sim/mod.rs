//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, I/O or platform dependencies

pub mod combat;
pub mod geometry;
pub mod movement;
pub mod progression;
pub mod spatial;
pub mod state;
pub mod tick;

pub use geometry::{Aabb, overlaps, within_distance};
pub use progression::LevelUpChoice;
pub use spatial::SpatialGrid;
pub use state::{
    Agent, EndCause, GameEvent, Obstacle, Pickup, Projectile, ProjectileKind, Pursuer,
    PursuerClass, RunOutcome, RunPhase, RunState,
};
pub use tick::{ChoiceError, TickInput, coins_for, generate_obstacles, tick};
