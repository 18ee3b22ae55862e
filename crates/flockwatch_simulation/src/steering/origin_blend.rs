//! Origin-relative blend (boids с инерцией)
//!
//! В отличие от LeaderBlend скорость не пересчитывается с нуля каждый тик:
//!
//! force = −v + jitter_push + originPush + avg(neighborTerms) + gravity·normalize(centroid − self)
//! wanted = v + force·dt
//! velocity = rotate_towards(v, wanted, turn_speed·dt)
//!
//! - originPush = (d / to_origin_range)·to_origin_force·dir к leader
//! - neighborTerm = separation с linear falloff внутри avoidance_radius
//!   + follow_velocity·(d / follow_radius)·normalize(neighbor velocity)
//! - v ненулевая и медленнее min_speed → поднимается до min_speed

use bevy::prelude::*;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{safe_normalize, AgentKinematics, SteeringContext, SteeringStrategy, NORMALIZE_EPSILON};

/// Максимальное изменение магнитуды за один rotate_towards (м/с)
pub const MAX_MAGNITUDE_STEP: f32 = 100.0;

/// Параметры origin blend (boid с BoidModel::OriginBlend)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct OriginBlendConfig {
    pub min_speed: f32,
    /// Радиан в секунду
    pub turn_speed: f32,
    pub random_frequency: f32,
    pub random_force: f32,
    pub to_origin_force: f32,
    pub to_origin_range: f32,
    pub gravity: f32,
    pub avoidance_radius: f32,
    pub avoidance_force: f32,
    pub follow_velocity: f32,
    pub follow_radius: f32,
}

impl Default for OriginBlendConfig {
    fn default() -> Self {
        Self {
            min_speed: 20.0,
            turn_speed: 20.0,
            random_frequency: 20.0,
            random_force: 20.0,
            to_origin_force: 50.0,
            to_origin_range: 100.0,
            gravity: 2.0,
            avoidance_radius: 50.0,
            avoidance_force: 20.0,
            follow_velocity: 4.0,
            follow_radius: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginBlend {
    pub config: OriginBlendConfig,
}

impl OriginBlend {
    pub fn new(config: OriginBlendConfig) -> Self {
        Self { config }
    }

    /// Средний вклад соседей: separation + distance-scaled follow
    pub fn neighbor_velocity(&self, ctx: &SteeringContext<'_>) -> Vec3 {
        if ctx.neighbors.is_empty() {
            return Vec3::ZERO;
        }

        let c = self.config;
        let position = ctx.agent.position;
        let mut sum = Vec3::ZERO;

        for neighbor in ctx.neighbors {
            let offset = position - neighbor.position;
            let distance = offset.length();
            if distance <= NORMALIZE_EPSILON {
                continue;
            }

            if distance < c.avoidance_radius {
                let falloff = 1.0 - distance / c.avoidance_radius;
                sum += offset / distance * falloff * c.avoidance_force;
            }

            sum += c.follow_velocity * (distance / c.follow_radius) * safe_normalize(neighbor.velocity);
        }

        sum / ctx.neighbors.len() as f32
    }

    /// Тяга к leader, линейно растёт с расстоянием
    pub fn origin_push(&self, position: Vec3, origin: Option<Vec3>) -> Vec3 {
        let Some(origin) = origin else {
            return Vec3::ZERO;
        };

        let offset = origin - position;
        let distance = offset.length();
        if distance <= NORMALIZE_EPSILON {
            return Vec3::ZERO;
        }

        (distance / self.config.to_origin_range) * self.config.to_origin_force * (offset / distance)
    }

    /// Ненулевая скорость ниже min_speed поднимается до min_speed
    pub fn enforce_min_speed(&self, velocity: Vec3) -> Vec3 {
        let speed = velocity.length();
        if speed > NORMALIZE_EPSILON && speed < self.config.min_speed {
            velocity / speed * self.config.min_speed
        } else {
            velocity
        }
    }

    /// Полный шаг: force → wanted → поворот с ограничением turn_speed
    pub fn steer(&self, ctx: &SteeringContext<'_>, dt: f32, rng: &mut dyn RngCore) -> Vec3 {
        let velocity = self.enforce_min_speed(ctx.agent.velocity);
        let stepped = SteeringContext {
            agent: AgentKinematics { velocity, ..ctx.agent },
            ..*ctx
        };

        let wanted = velocity + self.compute_force(&stepped, rng) * dt;
        if !wanted.is_finite() {
            return velocity;
        }

        rotate_towards(velocity, wanted, self.config.turn_speed * dt, MAX_MAGNITUDE_STEP)
    }
}

impl SteeringStrategy for OriginBlend {
    fn compute_force(&self, ctx: &SteeringContext<'_>, _rng: &mut dyn RngCore) -> Vec3 {
        let agent = ctx.agent;

        let cohesion = if ctx.neighbors.is_empty() {
            Vec3::ZERO
        } else {
            let centroid = ctx.neighbors.iter().map(|n| n.position).sum::<Vec3>() / ctx.neighbors.len() as f32;
            safe_normalize(centroid - agent.position)
        };

        -agent.velocity
            + ctx.jitter_push
            + self.origin_push(agent.position, ctx.leader)
            + self.neighbor_velocity(ctx)
            + self.config.gravity * cohesion
    }
}

/// Поворот `current` к `target` не больше чем на `max_radians`, магнитуда
/// меняется не больше чем на `max_magnitude`
///
/// Нулевой вектор с любой стороны: направление берётся у target, меняется
/// только магнитуда.
pub fn rotate_towards(current: Vec3, target: Vec3, max_radians: f32, max_magnitude: f32) -> Vec3 {
    let current_length = current.length();
    let target_length = target.length();
    let length = current_length + (target_length - current_length).clamp(-max_magnitude, max_magnitude);

    let from = safe_normalize(current);
    let to = safe_normalize(target);
    if from == Vec3::ZERO || to == Vec3::ZERO {
        let direction = if to == Vec3::ZERO { from } else { to };
        return direction * length;
    }

    let angle = from.angle_between(to);
    if angle <= max_radians.max(0.0) {
        return to * length;
    }

    let mut axis = from.cross(to);
    if axis.length_squared() < NORMALIZE_EPSILON * NORMALIZE_EPSILON {
        // Антипараллельные векторы: любая ось перпендикулярно from
        axis = from.any_orthonormal_vector();
    }

    Quat::from_axis_angle(axis.normalize(), max_radians) * from * length
}
