//! Leaderless flock blend (Group state)
//!
//! force = normalize(cohesion·wC + separation·wS + alignment·wA)
//! target = self + force · lookahead (resolve на navigable surface — у вызывающего)

use bevy::prelude::*;
use rand::RngCore;

use super::{safe_normalize, SteeringContext, SteeringStrategy, SteeringWeights};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockBlend {
    pub weights: SteeringWeights,
    /// Соседи ближе этой дистанции отталкивают (inverse-distance weighted)
    pub separation_distance: f32,
    /// Насколько далеко вперёд ставится target point
    pub lookahead: f32,
}

impl FlockBlend {
    pub fn new(weights: SteeringWeights, separation_distance: f32, lookahead: f32) -> Self {
        Self {
            weights,
            separation_distance,
            lookahead,
        }
    }

    /// Short-range target point; None если blend нулевой (нет соседей)
    pub fn target_point(&self, ctx: &SteeringContext<'_>, rng: &mut dyn RngCore) -> Option<Vec3> {
        let direction = self.compute_force(ctx, rng);
        if direction == Vec3::ZERO {
            return None;
        }
        Some(ctx.agent.position + direction * self.lookahead)
    }
}

impl SteeringStrategy for FlockBlend {
    fn compute_force(&self, ctx: &SteeringContext<'_>, _rng: &mut dyn RngCore) -> Vec3 {
        if ctx.neighbors.is_empty() {
            return Vec3::ZERO;
        }

        let position = ctx.agent.position;
        let mut center_of_mass = Vec3::ZERO;
        let mut heading_sum = Vec3::ZERO;
        let mut separation = Vec3::ZERO;
        let mut too_close = 0usize;

        for neighbor in ctx.neighbors {
            center_of_mass += neighbor.position;
            heading_sum += neighbor.forward;

            let distance = position.distance(neighbor.position);
            if distance > 0.0 && distance < self.separation_distance {
                separation += safe_normalize(position - neighbor.position) / distance;
                too_close += 1;
            }
        }

        let count = ctx.neighbors.len() as f32;
        center_of_mass /= count;

        let cohesion = safe_normalize(center_of_mass - position) * self.weights.cohesion;
        let alignment = safe_normalize(heading_sum / count) * self.weights.alignment;
        let separation = if too_close > 0 {
            safe_normalize(separation) * self.weights.separation
        } else {
            Vec3::ZERO
        };

        safe_normalize(cohesion + separation + alignment)
    }
}
