//! Agent and pursuer movement against static obstacles
//!
//! Every accepted position is collision-free: a candidate move is only
//! committed after its box has been tested against every obstacle.

use glam::Vec2;

use super::geometry::{Aabb, clamp_inside, overlaps, within_distance};
use super::state::{GameEvent, Obstacle, RunState};
use crate::consts::*;
use crate::{direction_or_zero, perpendicular};

/// True if `body` overlaps any obstacle
#[inline]
pub fn blocked(body: &Aabb, obstacles: &[Obstacle]) -> bool {
    obstacles.iter().any(|o| overlaps(body, &o.body))
}

/// Arena bounds for the agent (the full box stays inside)
fn agent_bounds() -> (Vec2, Vec2) {
    (Vec2::ZERO, Vec2::new(ARENA_WIDTH, ARENA_HEIGHT))
}

/// Move the agent along `intent` (each component in [-1, 1]).
///
/// Axes are resolved one after the other so a blocked axis does not stop
/// the free one (wall sliding).
pub fn move_agent(state: &mut RunState, intent: Vec2) {
    let intent = if intent.is_finite() {
        intent.clamp(Vec2::NEG_ONE, Vec2::ONE)
    } else {
        Vec2::ZERO
    };
    if intent == Vec2::ZERO {
        return;
    }

    let speed = state.agent_speed();
    let (lo, hi) = agent_bounds();
    let body = state.agent.body;

    let target = clamp_inside(body.center + intent * speed, body.half, lo, hi);

    let mut center = body.center;
    let try_x = body.at(Vec2::new(target.x, center.y));
    if !blocked(&try_x, &state.obstacles) {
        center.x = target.x;
    }
    let try_y = body.at(Vec2::new(center.x, target.y));
    if !blocked(&try_y, &state.obstacles) {
        center.y = target.y;
    }

    state.agent.body.center = center;
}

/// Health regeneration perk
pub fn regenerate(state: &mut RunState) {
    let agent = &mut state.agent;
    if agent.weapon.regen && agent.health < agent.max_health {
        agent.adjust_health(AGENT_REGEN_PER_TICK);
    }
}

/// Seek direction toward `target` blended with obstacle repulsion.
///
/// Returns a unit vector (or zero when the blend cancels out).
pub fn steer_direction(from: Vec2, target: Vec2, obstacles: &[Obstacle]) -> Vec2 {
    let seek = direction_or_zero(target - from);

    let mut avoid = Vec2::ZERO;
    for obstacle in obstacles {
        let center = obstacle.body.center;
        if !within_distance(from, center, AVOIDANCE_LOOKAHEAD) {
            continue;
        }
        let dist = from.distance(center);
        if dist <= 0.0 {
            continue;
        }
        let strength = (AVOIDANCE_LOOKAHEAD - dist) / AVOIDANCE_LOOKAHEAD;
        avoid += (from - center) / dist * strength;
    }

    direction_or_zero(seek + avoid * AVOIDANCE_WEIGHT)
}

/// Advance every pursuer one step toward the agent.
///
/// Cascade: full step, then single-axis slide, then a small perpendicular
/// unstick step. Each stage is only taken if collision-free.
pub fn move_pursuers(state: &mut RunState) {
    let goal = state.agent.body.center;
    let lo = Vec2::splat(-PURSUER_BOUND_MARGIN);
    let hi = Vec2::new(
        ARENA_WIDTH + PURSUER_BOUND_MARGIN,
        ARENA_HEIGHT + PURSUER_BOUND_MARGIN,
    );
    let obstacles = &state.obstacles;

    for pursuer in &mut state.pursuers {
        let body = pursuer.body;
        let to_goal = goal - body.center;
        if to_goal.length() <= 1.0 {
            continue;
        }
        let seek = to_goal.normalize();
        let step = steer_direction(body.center, goal, obstacles) * pursuer.speed;

        let full = body.at(body.center + step);
        if !blocked(&full, obstacles) {
            pursuer.body = full;
        } else {
            let slide_x = body.at(body.center + Vec2::new(step.x, 0.0));
            let slide_y = body.at(body.center + Vec2::new(0.0, step.y));
            if !blocked(&slide_x, obstacles) {
                pursuer.body = slide_x;
            } else if !blocked(&slide_y, obstacles) {
                pursuer.body = slide_y;
            } else {
                let unstick = perpendicular(seek) * pursuer.speed * UNSTICK_FACTOR;
                let nudged = body.at(body.center + unstick);
                if !blocked(&nudged, obstacles) {
                    pursuer.body = nudged;
                }
            }
        }

        pursuer.body.center = pursuer.body.center.clamp(lo, hi);
    }
}

/// Contact damage and knockback from every pursuer touching the agent.
///
/// Each pursuer has its own cooldown; damage from one never gates another.
pub fn resolve_contacts(state: &mut RunState) {
    let now = state.now_ms();
    let cooldown = state.tuning.contact_cooldown_ms;
    let damage = state.tuning.contact_damage;
    let (lo, hi) = agent_bounds();

    for pursuer in &mut state.pursuers {
        if state.agent.is_dead() {
            break;
        }
        if !overlaps(&state.agent.body, &pursuer.body) {
            continue;
        }
        let ready = pursuer
            .last_contact_ms
            .is_none_or(|last| now - last > cooldown);
        if !ready {
            continue;
        }

        state.agent.adjust_health(-damage);
        pursuer.last_contact_ms = Some(now);
        state.events.push(GameEvent::ContactDamage {
            pursuer_id: pursuer.id,
            damage,
        });

        let body = state.agent.body;
        let push = direction_or_zero(body.center - pursuer.body.center) * KNOCKBACK_DISTANCE;
        let landed = body.at(clamp_inside(body.center + push, body.half, lo, hi));
        if !blocked(&landed, &state.obstacles) {
            state.agent.body = landed;
        }
    }
}

/// Movement phase of a tick
pub fn update(state: &mut RunState, intent: Vec2) {
    move_agent(state, intent);
    regenerate(state);
    move_pursuers(state);
    resolve_contacts(state);
}
