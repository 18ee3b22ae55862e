//! TickSnapshot — previous-step состояние мира
//!
//! Read-previous / write-next: все cross-agent чтения в тике идут через
//! snapshot, поэтому порядок обновления агентов не влияет на результат.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::{Aspect, AspectRegistry, Body, Faction, Obstacle, Velocity};
use crate::spatial::SpatialQueryService;
use crate::steering::AgentKinematics;
use crate::SimulationTick;

/// Форма коллайдера для spatial сервиса
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

/// Состояние одной entity на начало тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub entity: Entity,
    pub position: Vec3,
    pub velocity: Vec3,
    pub forward: Vec3,
    pub faction: Option<Faction>,
    pub shape: Option<BodyShape>,
}

/// Snapshot всех perceivable entities (отсортирован по Entity index)
#[derive(Resource, Debug, Clone, Default)]
pub struct TickSnapshot {
    bodies: Vec<BodySnapshot>,
    index: HashMap<Entity, usize>,
}

impl TickSnapshot {
    pub fn from_bodies(mut bodies: Vec<BodySnapshot>) -> Self {
        bodies.sort_by_key(|body| body.entity.index());
        let index = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| (body.entity, i))
            .collect();
        Self { bodies, index }
    }

    pub fn bodies(&self) -> &[BodySnapshot] {
        &self.bodies
    }

    pub fn get(&self, entity: Entity) -> Option<&BodySnapshot> {
        self.index.get(&entity).map(|&i| &self.bodies[i])
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Кинематика entity для steering
    pub fn kinematics(&self, entity: Entity) -> Option<AgentKinematics> {
        self.get(entity).map(|body| AgentKinematics {
            position: body.position,
            velocity: body.velocity,
            forward: body.forward,
        })
    }
}

impl AspectRegistry for TickSnapshot {
    fn faction_of(&self, entity: Entity) -> Option<Faction> {
        self.get(entity).and_then(|body| body.faction)
    }

    fn position_of(&self, entity: Entity) -> Option<Vec3> {
        self.get(entity).map(|body| body.position)
    }
}

/// Система: начало тика (tick counter + snapshot + sync коллайдеров)
///
/// Первая система в Capture фазе; всё остальное в тике читает её результат.
pub fn capture_tick_snapshot(
    mut tick: ResMut<SimulationTick>,
    mut snapshot: ResMut<TickSnapshot>,
    mut spatial: ResMut<SpatialQueryService>,
    query: Query<
        (
            Entity,
            &Transform,
            Option<&Aspect>,
            Option<&Velocity>,
            Option<&Body>,
            Option<&Obstacle>,
        ),
        Or<(With<Aspect>, With<Body>, With<Obstacle>)>,
    >,
) {
    tick.0 += 1;

    let bodies = query
        .iter()
        .map(|(entity, transform, aspect, velocity, body, obstacle)| {
            let shape = match (obstacle, body) {
                (Some(obstacle), _) => Some(BodyShape::Cuboid {
                    half_extents: obstacle.half_extents,
                }),
                (None, Some(body)) => Some(BodyShape::Sphere {
                    radius: body.radius,
                }),
                (None, None) => None,
            };

            BodySnapshot {
                entity,
                position: transform.translation,
                velocity: velocity.map(|v| v.linear).unwrap_or(Vec3::ZERO),
                forward: transform.forward().as_vec3(),
                faction: aspect.map(|a| a.faction()),
                shape,
            }
        })
        .collect();

    *snapshot = TickSnapshot::from_bodies(bodies);
    spatial.get_mut().sync_bodies(snapshot.bodies());
}
