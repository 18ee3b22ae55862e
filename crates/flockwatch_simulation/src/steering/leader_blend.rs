//! Leader-relative blend (continuous steering, boids)
//!
//! force = wC·(centroid − self) + wV·(flockVelocity − selfVelocity)
//!       + wF·(leader − self) + wS·Σ normalize(self − neighbor)
//!       + wR·randomUnit + jitter_push
//!
//! velocity = force·dt (если не ноль), clamp в [min_velocity, max_velocity].

use bevy::prelude::*;
use rand::{Rng, RngCore};

use super::{
    clamp_speed, random_in_unit_sphere, random_unit_vector, safe_normalize, SteeringContext,
    SteeringStrategy, SteeringWeights,
};

/// Ориентация следует за velocity только выше этого порога (|v|²)
pub const ORIENT_MIN_SPEED_SQUARED: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderBlend {
    pub weights: SteeringWeights,
    pub min_velocity: f32,
    pub max_velocity: f32,
}

impl LeaderBlend {
    pub fn new(weights: SteeringWeights, min_velocity: f32, max_velocity: f32) -> Self {
        Self {
            weights,
            min_velocity,
            max_velocity,
        }
    }

    /// Force → мгновенная скорость
    ///
    /// Нулевой force оставляет текущую скорость; результат всегда clamp'ится.
    pub fn resolve_velocity(&self, force: Vec3, dt: f32, current: Vec3, forward: Vec3) -> Vec3 {
        let step = force * dt;
        let candidate = if step.is_finite() && step != Vec3::ZERO {
            step
        } else {
            current
        };
        clamp_speed(candidate, self.min_velocity, self.max_velocity, forward)
    }

    /// compute_force + resolve_velocity за один вызов
    pub fn steer(&self, ctx: &SteeringContext<'_>, dt: f32, rng: &mut dyn RngCore) -> Vec3 {
        let force = self.compute_force(ctx, rng);
        self.resolve_velocity(force, dt, ctx.agent.velocity, ctx.agent.forward)
    }
}

impl SteeringStrategy for LeaderBlend {
    fn compute_force(&self, ctx: &SteeringContext<'_>, rng: &mut dyn RngCore) -> Vec3 {
        let agent = ctx.agent;
        let w = self.weights;

        let (center, velocity_match) = match ctx.flock {
            Some(flock) => (
                flock.centroid - agent.position,
                flock.average_velocity - agent.velocity,
            ),
            None => (Vec3::ZERO, Vec3::ZERO),
        };

        let follow = ctx
            .leader
            .map(|leader| leader - agent.position)
            .unwrap_or(Vec3::ZERO);

        let separation: Vec3 = ctx
            .neighbors
            .iter()
            .map(|neighbor| safe_normalize(agent.position - neighbor.position))
            .sum();

        let randomize = if w.jitter != 0.0 {
            random_unit_vector(rng)
        } else {
            Vec3::ZERO
        };

        w.cohesion * center
            + w.alignment * velocity_match
            + w.leader_follow * follow
            + w.separation * separation
            + w.jitter * randomize
            + ctx.jitter_push
    }
}

/// Периодический random push (time-accumulated, вместо корутины)
///
/// Каждые `1/frequency ± половина` секунд пересчитывает
/// `push = random_in_unit_sphere · random_force`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct JitterSchedule {
    pub frequency: f32,
    pub random_force: f32,
    pub elapsed: f32,
    pub next_interval: f32,
    pub push: Vec3,
}

impl Default for JitterSchedule {
    fn default() -> Self {
        Self::new(2.0, 0.0)
    }
}

impl JitterSchedule {
    pub fn new(frequency: f32, random_force: f32) -> Self {
        Self {
            frequency,
            random_force,
            elapsed: 0.0,
            // Первый push — на первом же тике
            next_interval: 0.0,
            push: Vec3::ZERO,
        }
    }

    pub fn base_interval(&self) -> f32 {
        if self.frequency > 0.0 {
            1.0 / self.frequency
        } else {
            f32::INFINITY
        }
    }

    /// Продвигает расписание; true если push был пересчитан в этом вызове
    pub fn tick(&mut self, dt: f32, rng: &mut dyn RngCore) -> bool {
        if self.random_force == 0.0 || self.frequency <= 0.0 {
            self.push = Vec3::ZERO;
            return false;
        }

        self.elapsed += dt;
        if self.elapsed < self.next_interval {
            return false;
        }

        self.push = random_in_unit_sphere(rng) * self.random_force;

        let base = self.base_interval();
        self.next_interval = base + (rng.gen::<f32>() - 0.5) * base;
        self.elapsed = 0.0;
        true
    }
}

/// Yaw+pitch ориентация по velocity (None если скорость слишком мала)
pub fn facing_from_velocity(velocity: Vec3) -> Option<Vec3> {
    if velocity.length_squared() > ORIENT_MIN_SPEED_SQUARED {
        Some(safe_normalize(velocity))
    } else {
        None
    }
}
