//! Ship behavior state machines.
//!
//! Pure functions that compute phase transitions, velocity and position for
//! one ship from its behavior tag, phase sub-state and situation.
//! No ECS dependency; operates on plain data.

use std::f32::consts::TAU;

use glam::Vec3;

use siege_core::components::Behavior;
use siege_core::constants::*;
use siege_core::enums::{OrbitPhase, PincerPhase};

use crate::geometry::{escort_orbit_point, orbit_point, perpendicular, smooth_toward};

/// Input to the behavior FSM for a single ship.
#[derive(Debug, Clone, Copy)]
pub struct ShipContext {
    pub behavior: Behavior,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Cruise speed.
    pub speed: f32,
    pub dt: f32,
    /// Current position of the escorted bomber (escorts only).
    pub escort_anchor: Option<Vec3>,
    /// Uniform roll in `[0, 1)` drawn for this ship this tick.
    pub roll: f32,
}

/// Output from the behavior FSM.
#[derive(Debug, Clone, Copy)]
pub struct ShipUpdate {
    pub behavior: Behavior,
    pub position: Vec3,
    pub velocity: Vec3,
    pub facing: Vec3,
    pub speed: f32,
    pub phase_changed: bool,
}

/// Evaluate the FSM for one ship and integrate its motion for `ctx.dt`.
pub fn evaluate(ctx: &ShipContext) -> ShipUpdate {
    match ctx.behavior {
        Behavior::Default | Behavior::EscortedBomber => seek_defender(ctx, ctx.behavior),
        Behavior::VFormation { heading } => evaluate_v_formation(ctx, heading),
        Behavior::Pincer {
            phase,
            phase_elapsed_secs,
        } => evaluate_pincer(ctx, phase, phase_elapsed_secs),
        Behavior::EscortProtect { orbit_angle } => match ctx.escort_anchor {
            Some(anchor) => evaluate_escort(ctx, anchor, orbit_angle),
            None => {
                let (behavior, speed) = release_escort(ctx.behavior, ctx.speed);
                let released = ShipContext {
                    behavior,
                    speed,
                    ..*ctx
                };
                ShipUpdate {
                    phase_changed: true,
                    ..seek_defender(&released, behavior)
                }
            }
        },
        Behavior::OrbitStrafe {
            phase,
            angle,
            radius,
            height,
        } => evaluate_orbit_strafe(ctx, phase, angle, radius, height),
    }
}

/// One-way conversion of an escort whose bomber is gone.
/// Returns the new behavior and boosted speed; any other behavior is
/// returned unchanged.
pub fn release_escort(behavior: Behavior, speed: f32) -> (Behavior, f32) {
    if behavior.is_escort() {
        (Behavior::Default, speed * ESCORT_RELEASE_SPEED_BOOST)
    } else {
        (behavior, speed)
    }
}

fn unchanged(ctx: &ShipContext) -> ShipUpdate {
    ShipUpdate {
        behavior: ctx.behavior,
        position: ctx.position,
        velocity: ctx.velocity,
        facing: ctx.velocity.try_normalize().unwrap_or(-ctx.position),
        speed: ctx.speed,
        phase_changed: false,
    }
}

/// Integrate along a fixed velocity, facing the direction of travel.
fn fly(ctx: &ShipContext, behavior: Behavior, velocity: Vec3, phase_changed: bool) -> ShipUpdate {
    ShipUpdate {
        behavior,
        position: ctx.position + velocity * ctx.dt,
        velocity,
        facing: velocity.try_normalize().unwrap_or(-ctx.position),
        speed: ctx.speed,
        phase_changed,
    }
}

/// Move to `target` with smoothing, always facing the defender.
fn glide(ctx: &ShipContext, behavior: Behavior, target: Vec3, rate: f32, phase_changed: bool) -> ShipUpdate {
    let position = smooth_toward(ctx.position, target, rate, ctx.dt);
    let velocity = if ctx.dt > 0.0 {
        (position - ctx.position) / ctx.dt
    } else {
        Vec3::ZERO
    };
    ShipUpdate {
        behavior,
        position,
        velocity,
        facing: (-position).try_normalize().unwrap_or(ctx.velocity),
        speed: ctx.speed,
        phase_changed,
    }
}

fn toward_defender(position: Vec3) -> Option<Vec3> {
    (-position).try_normalize()
}

/// Straight-line pursuit of the defender. A ship sitting exactly on the
/// defender has no direction and skips its movement for the tick.
fn seek_defender(ctx: &ShipContext, behavior: Behavior) -> ShipUpdate {
    match toward_defender(ctx.position) {
        Some(dir) => fly(ctx, behavior, dir * ctx.speed, false),
        None => ShipUpdate {
            behavior,
            ..unchanged(ctx)
        },
    }
}

fn evaluate_v_formation(ctx: &ShipContext, heading: Vec3) -> ShipUpdate {
    match heading.try_normalize() {
        Some(dir) => fly(ctx, ctx.behavior, dir * ctx.speed, false),
        None => seek_defender(ctx, Behavior::Default),
    }
}

fn evaluate_pincer(ctx: &ShipContext, phase: PincerPhase, elapsed: f32) -> ShipUpdate {
    let distance = ctx.position.length();
    let elapsed = elapsed + ctx.dt;

    match phase {
        PincerPhase::Approach => {
            if distance <= PINCER_STRAFE_DISTANCE {
                if let Some(side) = perpendicular(ctx.position) {
                    let next = Behavior::Pincer {
                        phase: PincerPhase::Strafe,
                        phase_elapsed_secs: 0.0,
                    };
                    return fly(ctx, next, side * ctx.speed, true);
                }
            }
            let next = Behavior::Pincer {
                phase,
                phase_elapsed_secs: elapsed,
            };
            match toward_defender(ctx.position) {
                Some(dir) => fly(ctx, next, dir * ctx.speed, false),
                None => unchanged(ctx),
            }
        }
        PincerPhase::Strafe => {
            if elapsed >= PINCER_STRAFE_SECS {
                if let Some(away) = ctx.position.try_normalize() {
                    let next = Behavior::Pincer {
                        phase: PincerPhase::Retreat,
                        phase_elapsed_secs: 0.0,
                    };
                    return fly(ctx, next, away * ctx.speed, true);
                }
            }
            let next = Behavior::Pincer {
                phase,
                phase_elapsed_secs: elapsed,
            };
            fly(ctx, next, ctx.velocity, false)
        }
        PincerPhase::Retreat => {
            if distance >= PINCER_RETREAT_DISTANCE {
                if let Some(dir) = toward_defender(ctx.position) {
                    let next = Behavior::Pincer {
                        phase: PincerPhase::Approach,
                        phase_elapsed_secs: 0.0,
                    };
                    return fly(ctx, next, dir * ctx.speed, true);
                }
            }
            let next = Behavior::Pincer {
                phase,
                phase_elapsed_secs: elapsed,
            };
            match ctx.position.try_normalize() {
                Some(away) => fly(ctx, next, away * ctx.speed, false),
                None => unchanged(ctx),
            }
        }
    }
}

fn evaluate_escort(ctx: &ShipContext, anchor: Vec3, orbit_angle: f32) -> ShipUpdate {
    let orbit_angle = (orbit_angle + ESCORT_ORBIT_RATE * ctx.dt).rem_euclid(TAU);
    let target = escort_orbit_point(anchor, orbit_angle);
    glide(
        ctx,
        Behavior::EscortProtect { orbit_angle },
        target,
        ESCORT_SMOOTHING,
        false,
    )
}

fn evaluate_orbit_strafe(
    ctx: &ShipContext,
    phase: OrbitPhase,
    angle: f32,
    radius: f32,
    height: f32,
) -> ShipUpdate {
    let dt = ctx.dt;

    let (next_phase, angle, radius) = match phase {
        OrbitPhase::Approach => {
            if ctx.position.length() > ORBIT_RADIUS {
                return match toward_defender(ctx.position) {
                    Some(dir) => fly(ctx, ctx.behavior, dir * ctx.speed, false),
                    None => unchanged(ctx),
                };
            }
            let angle = ctx.position.z.atan2(ctx.position.x);
            let height = ctx.position.y.clamp(-ORBIT_MAX_HEIGHT, ORBIT_MAX_HEIGHT);
            let next = Behavior::OrbitStrafe {
                phase: OrbitPhase::Orbit,
                angle,
                radius: ORBIT_RADIUS,
                height,
            };
            let target = orbit_point(angle, ORBIT_RADIUS, height);
            return glide(ctx, next, target, ORBIT_SMOOTHING, true);
        }
        OrbitPhase::Orbit => {
            let angle = angle + ORBIT_ANGULAR_RATE * dt;
            if ctx.roll < ORBIT_STRAFE_CHANCE {
                (OrbitPhase::Strafe, angle, radius)
            } else {
                (OrbitPhase::Orbit, angle, radius)
            }
        }
        OrbitPhase::Strafe => {
            let angle = angle + ORBIT_ANGULAR_RATE * STRAFE_ANGULAR_FACTOR * dt;
            let radius = radius - STRAFE_RADIAL_SPEED * dt;
            if radius <= STRAFE_INNER_RADIUS {
                (OrbitPhase::Retreat, angle, STRAFE_INNER_RADIUS)
            } else {
                (OrbitPhase::Strafe, angle, radius)
            }
        }
        OrbitPhase::Retreat => {
            let angle = angle + ORBIT_ANGULAR_RATE * dt;
            let radius = radius + STRAFE_RADIAL_SPEED * dt;
            if radius >= ORBIT_RADIUS {
                (OrbitPhase::Orbit, angle, ORBIT_RADIUS)
            } else {
                (OrbitPhase::Retreat, angle, radius)
            }
        }
    };

    let angle = angle.rem_euclid(TAU);
    let next = Behavior::OrbitStrafe {
        phase: next_phase,
        angle,
        radius,
        height,
    };
    let target = orbit_point(angle, radius, height);
    glide(ctx, next, target, ORBIT_SMOOTHING, next_phase != phase)
}
