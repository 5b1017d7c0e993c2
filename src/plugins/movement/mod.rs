//! Movement plugin: waypoint steering for enemies and the boss.
//!
//! Both movers pick a random waypoint inside the play area and fly towards it
//! at constant speed. A new waypoint is picked when the re-pick interval
//! elapses or the current one is reached. The variants differ in where
//! waypoints may land:
//! - `EnemyMover`: around the current position, with an edge rule near the
//!   viewport border. Flies straight down until it has entered the screen.
//! - `BossMover`: anywhere in the upper half.
//!
//! Steering writes `LinearVelocity`; the physics step integrates it.

use avian2d::prelude::*;
use bevy::ecs::component::Mutable;
use bevy::prelude::*;

use crate::common::clock::SimClock;
use crate::common::rng::SimRng;
use crate::common::sets::SimSet;
use crate::plugins::combat::Health;
use crate::plugins::world::{PlayBounds, WAYPOINT_INSET};

/// Distance at which a waypoint counts as reached.
pub const ARRIVE_TOLERANCE: f32 = 0.1;

/// Range of the re-randomised axis when the edge rule fires.
pub const EDGE_JITTER: f32 = 1.0;

/// Shared context for one steering step.
pub struct SteerCtx<'a> {
    pub now: f64,
    pub bounds: &'a PlayBounds,
    pub rng: &'a mut SimRng,
}

pub trait Mover {
    /// Pick a new waypoint from the current position.
    fn retarget(&mut self, pos: Vec2, ctx: &mut SteerCtx);

    /// Velocity for this tick.
    fn steer(&mut self, pos: Vec2, ctx: &mut SteerCtx) -> Vec2;
}

/// Waypoint bookkeeping shared by both movers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub target: Vec2,
    pub next_pick_at: f64,
}

impl Waypoint {
    #[inline]
    fn due(&self, pos: Vec2, now: f64) -> bool {
        now >= self.next_pick_at || pos.distance(self.target) <= ARRIVE_TOLERANCE
    }

    #[inline]
    fn velocity(&self, pos: Vec2, speed: f32) -> Vec2 {
        (self.target - pos).normalize_or_zero() * speed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyPhase {
    /// Spawned above the screen, flying straight down.
    Entering,
    Patrolling,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct EnemyMover {
    pub phase: EnemyPhase,
    pub speed: f32,
    pub retarget_interval: f32,
    pub wander_range: f32,
    pub waypoint: Waypoint,
}

impl EnemyMover {
    pub fn new(speed: f32, retarget_interval: f32, wander_range: f32, spawn: Vec2) -> Self {
        Self {
            phase: EnemyPhase::Entering,
            speed,
            retarget_interval,
            wander_range,
            waypoint: Waypoint { target: spawn, next_pick_at: 0.0 },
        }
    }

    #[inline]
    pub fn is_patrolling(&self) -> bool {
        self.phase == EnemyPhase::Patrolling
    }

    /// Near an edge: pull the target back on that axis and jitter the other
    /// one around the current position.
    fn apply_edge_rule(&mut self, pos: Vec2, ctx: &mut SteerCtx) {
        let edge = ctx.bounds.near_edge(pos);
        let target = &mut self.waypoint.target;
        if edge.x {
            target.x = ctx.bounds.clamp_x_inset(target.x);
            target.y = pos.y + ctx.rng.spread(EDGE_JITTER);
        }
        if edge.y {
            target.y = ctx.bounds.clamp_y_inset(target.y);
            target.x = pos.x + ctx.rng.spread(EDGE_JITTER);
        }
    }
}

impl Mover for EnemyMover {
    fn retarget(&mut self, pos: Vec2, ctx: &mut SteerCtx) {
        let offset = Vec2::new(ctx.rng.spread(self.wander_range), ctx.rng.spread(self.wander_range));
        self.waypoint = Waypoint {
            target: ctx.bounds.clamp_inset(pos + offset),
            next_pick_at: ctx.now + f64::from(self.retarget_interval),
        };
    }

    fn steer(&mut self, pos: Vec2, ctx: &mut SteerCtx) -> Vec2 {
        if self.phase == EnemyPhase::Entering {
            if !ctx.bounds.contains(pos) {
                return Vec2::NEG_Y * self.speed;
            }
            self.phase = EnemyPhase::Patrolling;
            self.retarget(pos, ctx);
        } else if self.waypoint.due(pos, ctx.now) {
            self.retarget(pos, ctx);
        }

        self.apply_edge_rule(pos, ctx);
        self.waypoint.velocity(pos, self.speed)
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct BossMover {
    pub speed: f32,
    pub retarget_interval: f32,
    pub waypoint: Waypoint,
}

impl BossMover {
    pub fn new(speed: f32, retarget_interval: f32, spawn: Vec2) -> Self {
        Self {
            speed,
            retarget_interval,
            waypoint: Waypoint { target: spawn, next_pick_at: 0.0 },
        }
    }

    /// Waypoint band: inset horizontally, upper half vertically.
    pub fn band(bounds: &PlayBounds) -> Rect {
        let x = (bounds.half_width - WAYPOINT_INSET).max(0.0);
        let top = (bounds.half_height - WAYPOINT_INSET).max(0.0);
        let bottom = (bounds.half_height * 0.5).min(top);
        Rect::new(-x, bottom, x, top)
    }
}

impl Mover for BossMover {
    fn retarget(&mut self, _pos: Vec2, ctx: &mut SteerCtx) {
        let band = Self::band(ctx.bounds);
        self.waypoint = Waypoint {
            target: Vec2::new(
                ctx.rng.between(band.min.x, band.max.x),
                ctx.rng.between(band.min.y, band.max.y),
            ),
            next_pick_at: ctx.now + f64::from(self.retarget_interval),
        };
    }

    fn steer(&mut self, pos: Vec2, ctx: &mut SteerCtx) -> Vec2 {
        if self.waypoint.due(pos, ctx.now) {
            self.retarget(pos, ctx);
        }
        self.waypoint.velocity(pos, self.speed)
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        (steer::<EnemyMover>, steer::<BossMover>).in_set(SimSet::Steer),
    );
}

/// Steer every live mover of type `M`.
pub fn steer<M: Mover + Component<Mutability = Mutable>>(
    clock: Res<SimClock>,
    bounds: Res<PlayBounds>,
    mut rng: ResMut<SimRng>,
    mut q: Query<(&mut M, &Health, &Transform, &mut LinearVelocity)>,
) {
    let mut ctx = SteerCtx { now: clock.now, bounds: &bounds, rng: &mut rng };
    for (mut mover, health, tf, mut vel) in &mut q {
        if !health.is_alive() {
            continue;
        }
        vel.0 = mover.steer(tf.translation.truncate(), &mut ctx);
    }
}
