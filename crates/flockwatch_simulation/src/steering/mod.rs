//! Steering engine
//!
//! Три взаимозаменяемые стратегии с одним контрактом (SteeringStrategy):
//! - FlockBlend: leaderless cohesion/separation/alignment → short-range target point
//! - LeaderBlend: leader-relative blend → мгновенная скорость (boids)
//! - OriginBlend: инерционная скорость с ограниченным поворотом (boids)
//!
//! Numeric policy: normalize почти нулевого вектора = Vec3::ZERO.

use bevy::prelude::*;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::flock::FlockSnapshot;

pub mod flock_blend;
pub mod leader_blend;
pub mod origin_blend;


pub use flock_blend::FlockBlend;
pub use leader_blend::{JitterSchedule, LeaderBlend};
pub use origin_blend::{rotate_towards, OriginBlend, OriginBlendConfig};

/// Порог длины, ниже которого вектор считается нулевым
pub const NORMALIZE_EPSILON: f32 = 1e-5;

/// Веса steering blend (designer tuning, не меняются в runtime)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct SteeringWeights {
    pub cohesion: f32,
    pub separation: f32,
    /// Alignment (FlockBlend) / velocity matching (LeaderBlend)
    pub alignment: f32,
    pub leader_follow: f32,
    /// Вес per-tick random unit vector
    pub jitter: f32,
    /// Магнитуда периодического random push (JitterSchedule)
    pub random_force: f32,
}

impl Default for SteeringWeights {
    fn default() -> Self {
        Self {
            cohesion: 1.0,
            separation: 1.5,
            alignment: 1.0,
            leader_follow: 0.0,
            jitter: 0.0,
            random_force: 0.0,
        }
    }
}

/// Кинематика одного агента (из TickSnapshot)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentKinematics {
    pub position: Vec3,
    pub velocity: Vec3,
    pub forward: Vec3,
}

/// Входные данные одного вызова steering стратегии
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext<'a> {
    pub agent: AgentKinematics,
    pub neighbors: &'a [AgentKinematics],
    pub flock: Option<&'a FlockSnapshot>,
    /// Leader/follow point (target provider)
    pub leader: Option<Vec3>,
    /// Текущий push от JitterSchedule
    pub jitter_push: Vec3,
}

impl<'a> SteeringContext<'a> {
    pub fn new(agent: AgentKinematics, neighbors: &'a [AgentKinematics]) -> Self {
        Self {
            agent,
            neighbors,
            flock: None,
            leader: None,
            jitter_push: Vec3::ZERO,
        }
    }

    pub fn with_flock(mut self, flock: Option<&'a FlockSnapshot>) -> Self {
        self.flock = flock;
        self
    }

    pub fn with_leader(mut self, leader: Option<Vec3>) -> Self {
        self.leader = leader;
        self
    }

    pub fn with_jitter_push(mut self, push: Vec3) -> Self {
        self.jitter_push = push;
        self
    }
}

/// Общий контракт steering стратегий
pub trait SteeringStrategy {
    fn compute_force(&self, ctx: &SteeringContext<'_>, rng: &mut dyn RngCore) -> Vec3;
}

/// Normalize с guard'ом: почти нулевой вектор → Vec3::ZERO
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let length = v.length();
    if !length.is_finite() || length < NORMALIZE_EPSILON {
        Vec3::ZERO
    } else {
        v / length
    }
}

/// Clamp магнитуды в [min, max]
///
/// Нулевой вектор получает направление `fallback_direction` (или -Z), чтобы
/// результат всегда оставался в диапазоне.
pub fn clamp_speed(velocity: Vec3, min: f32, max: f32, fallback_direction: Vec3) -> Vec3 {
    let max = max.max(min);
    let mut direction = safe_normalize(velocity);
    if direction == Vec3::ZERO {
        direction = safe_normalize(fallback_direction);
    }
    if direction == Vec3::ZERO {
        direction = Vec3::NEG_Z;
    }

    let speed = velocity.length();
    let speed = if speed.is_finite() { speed.clamp(min, max) } else { max };
    direction * speed
}

/// Случайный unit vector: компоненты в [-1, 1], затем normalize
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    let v = Vec3::new(
        rng.gen::<f32>() * 2.0 - 1.0,
        rng.gen::<f32>() * 2.0 - 1.0,
        rng.gen::<f32>() * 2.0 - 1.0,
    );
    safe_normalize(v)
}

/// Случайная точка внутри единичной сферы (rejection sampling)
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}
