//! Run state and core simulation types
//!
//! Everything a run owns lives in [`RunState`]; the renderer and host only
//! ever see it through a shared borrow between ticks.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use super::progression::LevelUpChoice;
use super::spatial::SpatialGrid;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::upgrades::PermanentUpgrades;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// No run in progress
    Idle,
    /// Active gameplay
    Running,
    /// Waiting for a level-up choice
    LevelPaused,
    /// Run finished (death or timer)
    Ended,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    Died,
    TimeUp,
}

/// Result handed to the persistence layer when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub cause: EndCause,
    pub score: u64,
    pub level: u32,
    pub coins_earned: u64,
}

/// Things that happened during the last tick (for renderers / audio)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ContactDamage { pursuer_id: u32, damage: f32 },
    PursuerDefeated { pursuer_id: u32, pos: Vec2, reward: u32 },
    PickupCollected { value: u32 },
    Explosion { pos: Vec2, radius: f32 },
    LevelUp { level: u32 },
    RunEnded(RunOutcome),
}

/// Weapon loadout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub damage: f32,
    pub range: f32,
    pub fire_interval_ms: f64,
    /// Simulated time of the last shot
    pub last_shot_ms: Option<f64>,
    /// Extra projectiles per volley
    pub multi_shot: u32,
    pub piercing: bool,
    pub explosive: bool,
    pub homing: bool,
    pub regen: bool,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            damage: WEAPON_DAMAGE,
            range: WEAPON_RANGE,
            fire_interval_ms: WEAPON_FIRE_INTERVAL_MS,
            last_shot_ms: None,
            multi_shot: 0,
            piercing: false,
            explosive: false,
            homing: false,
            regen: false,
        }
    }
}

/// The player-controlled agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub body: Aabb,
    /// Per-tick speed before temporary bonuses
    pub base_speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub xp: u32,
    pub weapon: Weapon,
}

impl Agent {
    /// Fresh agent at the arena center with permanent upgrades applied
    pub fn new(permanent: &PermanentUpgrades) -> Self {
        let max_health = AGENT_BASE_HEALTH + permanent.bonus_health();
        Self {
            body: Aabb::square(crate::arena_center(), AGENT_SIZE),
            base_speed: AGENT_BASE_SPEED + permanent.bonus_speed(),
            health: max_health,
            max_health,
            level: 1,
            xp: 0,
            weapon: Weapon::default(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Change health, keeping it in `[0, max_health]`
    pub fn adjust_health(&mut self, delta: f32) {
        self.health = (self.health + delta).clamp(0.0, self.max_health);
    }

    /// Experience needed for the next level
    pub fn xp_to_next(&self) -> u32 {
        self.level * XP_PER_LEVEL
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(&PermanentUpgrades::default())
    }
}

/// Pursuer tiers, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PursuerClass {
    Balanced,
    Fast,
    Tanky,
}

/// Per-class stats
#[derive(Debug, Clone, Copy)]
pub struct PursuerStats {
    pub speed: f32,
    pub health: f32,
    pub size: f32,
    /// Relative spawn weight
    pub weight: u32,
    /// Render color (0xRRGGBB)
    pub color: u32,
}

impl PursuerClass {
    pub const ALL: [PursuerClass; 3] = [
        PursuerClass::Balanced,
        PursuerClass::Tanky,
        PursuerClass::Fast,
    ];

    pub fn stats(&self) -> PursuerStats {
        match self {
            PursuerClass::Balanced => PursuerStats {
                speed: 1.0,
                health: 12.0,
                size: 14.0,
                weight: 50,
                color: 0xff4444,
            },
            PursuerClass::Tanky => PursuerStats {
                speed: 0.7,
                health: 25.0,
                size: 18.0,
                weight: 30,
                color: 0xff8844,
            },
            PursuerClass::Fast => PursuerStats {
                speed: 1.6,
                health: 6.0,
                size: 11.0,
                weight: 20,
                color: 0xff44ff,
            },
        }
    }

    /// Experience/score reward for defeating this class
    pub fn reward(&self) -> u32 {
        (self.stats().health / 4.0).ceil() as u32
    }

    /// Weighted random pick
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        let total: u32 = Self::ALL.iter().map(|c| c.stats().weight).sum();
        let mut roll = rng.random_range(0..total);
        for class in Self::ALL {
            let weight = class.stats().weight;
            if roll < weight {
                return class;
            }
            roll -= weight;
        }
        PursuerClass::Balanced
    }
}

/// A hostile entity chasing the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pursuer {
    pub id: u32,
    pub class: PursuerClass,
    pub body: Aabb,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub reward: u32,
    /// Simulated time this pursuer last damaged the agent
    pub last_contact_ms: Option<f64>,
}

impl Pursuer {
    pub fn new(id: u32, class: PursuerClass, center: Vec2) -> Self {
        let stats = class.stats();
        Self {
            id,
            class,
            body: Aabb::square(center, stats.size),
            speed: stats.speed,
            health: stats.health,
            max_health: stats.health,
            reward: class.reward(),
            last_contact_ms: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Projectile behavior, chosen once at fire time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Normal,
    /// Survives hits until `max_pierce` distinct pursuers have been struck
    Piercing { max_pierce: u32 },
    /// Terminates on first contact and damages everything within `radius`
    Explosive { radius: f32 },
    /// Steers toward the nearest pursuer within `track_radius`
    Homing { strength: f32, track_radius: f32 },
}

impl ProjectileKind {
    /// Resolve the active special from the weapon flags.
    /// Priority: piercing, then explosive, then homing.
    pub fn from_weapon(weapon: &Weapon) -> Self {
        if weapon.piercing {
            ProjectileKind::Piercing {
                max_pierce: PIERCE_BUDGET,
            }
        } else if weapon.explosive {
            ProjectileKind::Explosive {
                radius: EXPLOSION_RADIUS,
            }
        } else if weapon.homing {
            ProjectileKind::Homing {
                strength: HOMING_STRENGTH,
                track_radius: HOMING_TRACK_RADIUS,
            }
        } else {
            ProjectileKind::Normal
        }
    }

    /// Travel speed per tick
    pub fn speed(&self) -> f32 {
        match self {
            ProjectileKind::Normal => 10.0,
            ProjectileKind::Piercing { .. } => 8.0,
            ProjectileKind::Explosive { .. } => 6.0,
            ProjectileKind::Homing { .. } => 7.0,
        }
    }

    /// Side length of the hitbox
    pub fn size(&self) -> f32 {
        match self {
            ProjectileKind::Piercing { .. } => 6.0,
            _ => 4.0,
        }
    }
}

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub body: Aabb,
    pub vel: Vec2,
    pub damage: f32,
    pub life_ticks: u32,
    /// Pursuer ids already struck by this projectile
    pub hits: Vec<u32>,
}

impl Projectile {
    pub fn new(id: u32, kind: ProjectileKind, origin: Vec2, angle: f32, damage: f32) -> Self {
        Self {
            id,
            kind,
            body: Aabb::square(origin, kind.size()),
            vel: Vec2::from_angle(angle) * kind.speed(),
            damage,
            life_ticks: PROJECTILE_LIFE_TICKS,
            hits: Vec::new(),
        }
    }

    pub fn has_hit(&self, pursuer_id: u32) -> bool {
        self.hits.contains(&pursuer_id)
    }

    pub fn is_spent(&self) -> bool {
        self.life_ticks == 0
    }

    /// True once the projectile has left the arena by more than the margin
    pub fn out_of_bounds(&self) -> bool {
        let p = self.body.center;
        p.x < -PROJECTILE_BOUND_MARGIN
            || p.x > ARENA_WIDTH + PROJECTILE_BOUND_MARGIN
            || p.y < -PROJECTILE_BOUND_MARGIN
            || p.y > ARENA_HEIGHT + PROJECTILE_BOUND_MARGIN
    }
}

/// An experience orb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub body: Aabb,
    pub value: u32,
    pub attraction_radius: f32,
}

/// Static wall placed at run start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub body: Aabb,
}

/// Visual record of an explosion (damage is applied once, on creation)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub life_ticks: u32,
}

/// Upgrades picked during the current run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TempUpgrades {
    pub damage: f32,
    pub speed: f32,
    /// Fraction shaved off the fire interval
    pub fire_rate: f32,
    pub health: f32,
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub phase: RunPhase,
    /// Seconds left on the run clock
    pub timer_secs: f32,
    /// Simulation tick counter (reset per run)
    pub time_ticks: u64,
    pub score: u64,
    pub agent: Agent,
    /// Sorted by id
    pub pursuers: Vec<Pursuer>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub obstacles: Vec<Obstacle>,
    pub explosions: Vec<Explosion>,
    pub temp: TempUpgrades,
    pub permanent: PermanentUpgrades,
    /// Choices on offer while in `LevelPaused`
    pub level_up_choices: Vec<LevelUpChoice>,
    /// Help overlay toggle (render-only)
    pub show_help: bool,
    /// Events emitted by the last tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    pub outcome: Option<RunOutcome>,
    #[serde(skip)]
    pub(crate) grid: SpatialGrid,
    next_id: u32,
}

impl RunState {
    /// Create an idle state with the given seed and balance
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            timer_secs: tuning.run_duration_secs,
            tuning,
            phase: RunPhase::Idle,
            time_ticks: 0,
            score: 0,
            agent: Agent::default(),
            pursuers: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            obstacles: Vec::new(),
            explosions: Vec::new(),
            temp: TempUpgrades::default(),
            permanent: PermanentUpgrades::default(),
            level_up_choices: Vec::new(),
            show_help: false,
            events: Vec::new(),
            outcome: None,
            grid: SpatialGrid::default(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Simulated milliseconds since the run started
    pub fn now_ms(&self) -> f64 {
        self.time_ticks as f64 * 1000.0 / TICK_HZ as f64
    }

    /// Seconds elapsed on the run clock
    pub fn elapsed_secs(&self) -> f32 {
        (self.tuning.run_duration_secs - self.timer_secs).max(0.0)
    }

    /// Agent speed with temporary bonuses
    pub fn agent_speed(&self) -> f32 {
        self.agent.base_speed + self.temp.speed
    }

    /// Damage carried by each projectile
    pub fn shot_damage(&self) -> f32 {
        self.agent.weapon.damage + self.temp.damage + self.permanent.bonus_damage()
    }

    /// Fire interval after temporary and permanent fire-rate bonuses
    pub fn effective_fire_interval_ms(&self) -> f64 {
        let temp = (1.0 - self.temp.fire_rate as f64).max(0.0);
        let permanent = (1.0 - self.permanent.fire_rate_fraction() as f64).max(0.0);
        self.agent.weapon.fire_interval_ms * temp * permanent
    }

    /// Remove every dynamic entity
    pub fn clear_entities(&mut self) {
        self.pursuers.clear();
        self.projectiles.clear();
        self.pickups.clear();
        self.explosions.clear();
        self.level_up_choices.clear();
        self.grid.clear();
    }

    /// Spawn a pursuer of a random class just outside a random arena edge
    pub fn spawn_pursuer(&mut self) -> u32 {
        let class = PursuerClass::roll(&mut self.rng);
        let side = self.rng.random_range(0..4u8);
        let along_x = self.rng.random_range(0.0..ARENA_WIDTH);
        let along_y = self.rng.random_range(0.0..ARENA_HEIGHT);
        let center = match side {
            0 => Vec2::new(-PURSUER_SPAWN_OFFSET, along_y),
            1 => Vec2::new(ARENA_WIDTH + PURSUER_SPAWN_OFFSET, along_y),
            2 => Vec2::new(along_x, -PURSUER_SPAWN_OFFSET),
            _ => Vec2::new(along_x, ARENA_HEIGHT + PURSUER_SPAWN_OFFSET),
        };
        self.spawn_pursuer_at(class, center)
    }

    /// Spawn a pursuer of a given class at an exact position
    pub fn spawn_pursuer_at(&mut self, class: PursuerClass, center: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.pursuers.push(Pursuer::new(id, class, center));
        id
    }

    /// Drop an experience orb
    pub fn spawn_pickup(&mut self, center: Vec2, value: u32) -> u32 {
        let id = self.next_entity_id();
        let attraction_radius = self.permanent.attraction_radius();
        self.pickups.push(Pickup {
            id,
            body: Aabb::square(center, PICKUP_SIZE),
            value,
            attraction_radius,
        });
        id
    }

    /// Ensure entity lists are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.pursuers.sort_by_key(|p| p.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}
