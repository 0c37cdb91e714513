//! Weapon fire and projectile resolution
//!
//! Projectiles are advanced and resolved one at a time against the spatial
//! grid of pursuers (rebuilt at the start of the phase). Obstacles are few
//! and are checked directly.

use glam::Vec2;
use rand::Rng;

use super::geometry::overlaps;
use super::movement::blocked;
use super::state::{Explosion, GameEvent, Projectile, ProjectileKind, Pursuer, RunState};
use crate::consts::*;
use crate::direction_or_zero;

/// Index of the pursuer nearest to `from` within `max_dist` (inclusive).
/// Ties go to the earliest pursuer in the slice.
pub fn nearest_pursuer(pursuers: &[Pursuer], from: Vec2, max_dist: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, pursuer) in pursuers.iter().enumerate() {
        let dist = from.distance(pursuer.body.center);
        if dist > max_dist {
            continue;
        }
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}

/// Explosion damage at `dist` from the center: full payload at the center,
/// falling linearly to zero at `radius`.
#[inline]
pub fn explosion_damage(payload: f32, radius: f32, dist: f32) -> f32 {
    if radius <= 0.0 || dist > radius {
        return 0.0;
    }
    payload * (1.0 - dist / radius)
}

/// Launch a projectile from `origin`
pub fn spawn_projectile(
    state: &mut RunState,
    kind: ProjectileKind,
    origin: Vec2,
    angle: f32,
    damage: f32,
) -> u32 {
    let id = state.next_entity_id();
    state
        .projectiles
        .push(Projectile::new(id, kind, origin, angle, damage));
    id
}

/// Auto-fire at the nearest pursuer in range once the fire interval has elapsed.
/// Returns true if a volley was fired.
pub fn fire_weapon(state: &mut RunState) -> bool {
    if state.pursuers.is_empty() {
        return false;
    }

    let now = state.now_ms();
    if let Some(last) = state.agent.weapon.last_shot_ms {
        if now - last < state.effective_fire_interval_ms() {
            return false;
        }
    }

    let origin = state.agent.body.center;
    let Some(target) = nearest_pursuer(&state.pursuers, origin, state.agent.weapon.range) else {
        return false;
    };
    let to_target = state.pursuers[target].body.center - origin;
    let angle = to_target.y.atan2(to_target.x);

    let kind = ProjectileKind::from_weapon(&state.agent.weapon);
    let damage = state.shot_damage();

    spawn_projectile(state, kind, origin, angle, damage);
    for _ in 0..state.agent.weapon.multi_shot {
        let spread = (state.rng().random::<f32>() - 0.5) * MULTI_SHOT_SPREAD;
        spawn_projectile(state, kind, origin, angle + spread, damage);
    }

    state.agent.weapon.last_shot_ms = Some(now);
    true
}

/// Area damage to every pursuer within `radius` of `pos`
fn detonate(
    pursuers: &mut [Pursuer],
    explosions: &mut Vec<Explosion>,
    events: &mut Vec<GameEvent>,
    pos: Vec2,
    radius: f32,
    payload: f32,
) {
    for pursuer in pursuers.iter_mut() {
        let dist = pos.distance(pursuer.body.center);
        if dist <= radius {
            pursuer.health -= explosion_damage(payload, radius, dist);
        }
    }
    explosions.push(Explosion {
        pos,
        radius,
        life_ticks: EXPLOSION_LIFE_TICKS,
    });
    events.push(GameEvent::Explosion { pos, radius });
}

/// Bend a homing projectile toward the nearest pursuer in tracking range
fn steer_homing(projectile: &mut Projectile, pursuers: &[Pursuer]) {
    let ProjectileKind::Homing {
        strength,
        track_radius,
    } = projectile.kind
    else {
        return;
    };
    let pos = projectile.body.center;
    let Some(target) = nearest_pursuer(pursuers, pos, track_radius) else {
        return;
    };
    // Strictly inside the tracking radius
    if pos.distance(pursuers[target].body.center) >= track_radius {
        return;
    }

    let toward = direction_or_zero(pursuers[target].body.center - pos);
    let speed = projectile.kind.speed();
    let turned = direction_or_zero(projectile.vel + toward * strength);
    if turned != Vec2::ZERO {
        projectile.vel = turned * speed;
    }
}

/// Advance projectiles, resolve hits, and drop spent ones
pub fn update_projectiles(state: &mut RunState) {
    for explosion in &mut state.explosions {
        explosion.life_ticks = explosion.life_ticks.saturating_sub(1);
    }
    state.explosions.retain(|e| e.life_ticks > 0);

    state.grid.rebuild(state.pursuers.iter().map(|p| &p.body));

    let mut nearby = Vec::new();
    for projectile in &mut state.projectiles {
        if projectile.is_spent() {
            continue;
        }

        steer_homing(projectile, &state.pursuers);
        projectile.body.center += projectile.vel;
        projectile.life_ticks = projectile.life_ticks.saturating_sub(1);

        let body = projectile.body;
        let mut terminated = false;
        let mut blast: Option<f32> = None;

        state.grid.query_into(&body, &mut nearby);
        for &index in &nearby {
            let pursuer = &mut state.pursuers[index];
            if projectile.has_hit(pursuer.id) || !overlaps(&body, &pursuer.body) {
                continue;
            }

            pursuer.health -= projectile.damage;
            projectile.hits.push(pursuer.id);

            match projectile.kind {
                ProjectileKind::Explosive { radius } => {
                    blast = Some(radius);
                    terminated = true;
                }
                ProjectileKind::Piercing { max_pierce } => {
                    terminated = projectile.hits.len() as u32 >= max_pierce;
                }
                ProjectileKind::Normal | ProjectileKind::Homing { .. } => {
                    terminated = true;
                }
            }
            if terminated {
                break;
            }
        }

        if !terminated && blocked(&body, &state.obstacles) {
            if let ProjectileKind::Explosive { radius } = projectile.kind {
                blast = Some(radius);
            }
            terminated = true;
        }

        if terminated {
            projectile.life_ticks = 0;
        }
        if let Some(radius) = blast {
            detonate(
                &mut state.pursuers,
                &mut state.explosions,
                &mut state.events,
                body.center,
                radius,
                projectile.damage * EXPLOSION_PAYLOAD,
            );
        }
    }

    state
        .projectiles
        .retain(|p| !p.is_spent() && !p.out_of_bounds());
}

/// Combat phase of a tick
pub fn update(state: &mut RunState) {
    fire_weapon(state);
    update_projectiles(state);
}
