//! Spawn helpers (scene construction)
//!
//! Все функции работают на `&mut World` и возвращают Entity сразу, чтобы
//! сцена могла прописать named handles в SimulationContext.

use bevy::prelude::*;
use std::f32::consts::TAU;

use crate::ai::components::{Boid, Citizen};
use crate::components::{
    Aspect, Body, Faction, Flocking, Obstacle, ScriptedMover, SimulationContext, TargetPoint, Velocity,
};
use crate::config::{BoidArchetype, BoidModel, CitizenArchetype, SimulationConfig};
use crate::steering::{safe_normalize, JitterSchedule};

/// Citizen: FSM + сенсоры по архетипу
pub fn spawn_citizen(world: &mut World, archetype: &CitizenArchetype, position: Vec3) -> Entity {
    let mut entity = world.spawn((
        Citizen,
        Aspect::new(archetype.faction),
        Transform::from_translation(position),
        Body {
            radius: archetype.body_radius,
        },
        Flocking {
            neighbor_radius: archetype.behavior.group_radius,
        },
        archetype.behavior,
        archetype.movement,
        archetype.steering,
    ));

    if archetype.sight.enabled {
        entity.insert(archetype.sight.sensor());
    }
    if archetype.touch.enabled {
        entity.insert(archetype.touch.sensor());
    }

    entity.id()
}

/// Boid: стартует с минимальной скоростью модели в направлении `heading`
///
/// OriginBlend boid дополнительно получает OriginBlendConfig, его jitter
/// расписание берётся из origin параметров.
pub fn spawn_boid(world: &mut World, archetype: &BoidArchetype, position: Vec3, heading: Vec3) -> Entity {
    let mut heading = safe_normalize(heading);
    if heading == Vec3::ZERO {
        heading = Vec3::NEG_Z;
    }

    let mut transform = Transform::from_translation(position);
    transform.look_to(heading, Vec3::Y);

    let (start_speed, jitter) = match archetype.model {
        BoidModel::LeaderBlend => (
            archetype.boid.min_velocity,
            JitterSchedule::new(archetype.boid.jitter_frequency, archetype.steering.random_force),
        ),
        BoidModel::OriginBlend => (
            archetype.origin.min_speed,
            JitterSchedule::new(archetype.origin.random_frequency, archetype.origin.random_force),
        ),
    };

    let mut entity = world.spawn((
        Boid,
        Aspect::new(archetype.faction),
        transform,
        Velocity::new(heading * start_speed),
        Body {
            radius: archetype.body_radius,
        },
        Flocking {
            neighbor_radius: archetype.boid.neighbor_radius,
        },
        archetype.boid,
        archetype.steering,
        jitter,
    ));

    if archetype.model == BoidModel::OriginBlend {
        entity.insert(archetype.origin);
    }

    entity.id()
}

/// Hostile / любая неподвижная entity с фракцией
pub fn spawn_faction_body(world: &mut World, faction: Faction, position: Vec3) -> Entity {
    world
        .spawn((Aspect::new(faction), Body::default(), Transform::from_translation(position)))
        .id()
}

/// Игрок: reference target для Sight (прописывается в SimulationContext)
pub fn spawn_player(world: &mut World, position: Vec3) -> Entity {
    let player = spawn_faction_body(world, Faction::Player, position);
    if let Some(mut context) = world.get_resource_mut::<SimulationContext>() {
        context.player = Some(player);
    }
    player
}

/// Статическое препятствие (блокирует line of sight)
pub fn spawn_obstacle(world: &mut World, position: Vec3, half_extents: Vec3) -> Entity {
    world
        .spawn((Obstacle { half_extents }, Transform::from_translation(position)))
        .id()
}

/// Scripted leader target для boids (прописывается в SimulationContext)
pub fn spawn_leader_target(world: &mut World, origin: Vec3, bounds: Vec3) -> Entity {
    let target = world
        .spawn((
            TargetPoint,
            ScriptedMover::new(origin, bounds),
            Transform::from_translation(origin),
        ))
        .id();
    if let Some(mut context) = world.get_resource_mut::<SimulationContext>() {
        context.leader_target = Some(target);
    }
    target
}

/// Размер демо-сцены
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationCounts {
    pub citizens: usize,
    pub enemies: usize,
    pub boids: usize,
}

impl Default for PopulationCounts {
    fn default() -> Self {
        Self {
            citizens: 24,
            enemies: 2,
            boids: 30,
        }
    }
}

/// Демо-сцена: кластеры citizens, hostiles на внешнем кольце, игрок в центре,
/// стая boids вокруг scripted leader target
///
/// Раскладка детерминирована (без RNG), чтобы seed влиял только на поведение.
pub fn populate_demo_world(world: &mut World, config: &SimulationConfig, counts: PopulationCounts) {
    spawn_player(world, Vec3::ZERO);

    const CLUSTER_SIZE: usize = 4;
    let clusters = counts.citizens.div_ceil(CLUSTER_SIZE).max(1);
    for i in 0..counts.citizens {
        let cluster = i / CLUSTER_SIZE;
        let slot = i % CLUSTER_SIZE;
        let center = ring_point(cluster, clusters, 25.0, 0.0);
        let offset = ring_point(slot, CLUSTER_SIZE, 2.0, 0.0);
        spawn_citizen(world, &config.citizen, center + offset);
    }

    for i in 0..counts.enemies {
        let position = ring_point(i, counts.enemies, 45.0, 0.0);
        spawn_faction_body(world, Faction::Enemy, position);
    }

    if counts.boids > 0 {
        let origin = Vec3::new(0.0, 10.0, 0.0);
        spawn_leader_target(world, origin, Vec3::new(30.0, 5.0, 30.0));

        for i in 0..counts.boids {
            let position = origin + ring_point(i, counts.boids, 6.0, (i % 3) as f32 - 1.0);
            let heading = ring_point(i + 1, counts.boids, 1.0, 0.0) - ring_point(i, counts.boids, 1.0, 0.0);
            spawn_boid(world, &config.boid, position, heading);
        }
    }
}

fn ring_point(index: usize, count: usize, radius: f32, height: f32) -> Vec3 {
    let angle = TAU * index as f32 / count.max(1) as f32;
    Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
}
