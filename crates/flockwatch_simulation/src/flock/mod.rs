//! Flock coordinator
//!
//! Раз в тик:
//! 1. update_neighbors — пересборка Neighbors из spatial query (Perception фаза)
//! 2. aggregate_flocks — связные компоненты графа соседей → FlockSnapshot
//!    (centroid, average velocity/heading, member count) (Aggregation фаза)
//!
//! Membership не хранится между тиками: FlockMembership перезаписывается
//! каждый проход. Steering читает FlockSnapshots только после агрегации.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::{Aspect, AspectRegistry, Flocking, Neighbors};
use crate::spatial::{SpatialQueryService, TickSnapshot};
use crate::steering::safe_normalize;
use crate::SimulationSet;


/// Flock Plugin
///
/// update_neighbors — Perception фаза, aggregate_flocks — Aggregation фаза
/// (barrier: Decision читает FlockSnapshots только после неё).
pub struct FlockPlugin;

impl Plugin for FlockPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, update_neighbors.in_set(SimulationSet::Perception))
            .add_systems(FixedUpdate, aggregate_flocks.in_set(SimulationSet::Aggregation));
    }
}

/// Индекс flock внутри текущего тика (стабилен только в пределах тика)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct FlockId(pub u32);

/// Агрегат одной стаи на текущий тик (read-only после aggregate_flocks)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockSnapshot {
    pub id: FlockId,
    pub centroid: Vec3,
    pub average_velocity: Vec3,
    pub average_heading: Vec3,
    pub member_count: usize,
}

/// Все стаи текущего тика
#[derive(Resource, Debug, Clone, Default)]
pub struct FlockSnapshots {
    pub flocks: Vec<FlockSnapshot>,
}

impl FlockSnapshots {
    pub fn get(&self, id: FlockId) -> Option<&FlockSnapshot> {
        self.flocks.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.flocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flocks.is_empty()
    }
}

/// В какой стае агент в этом тике (at most one)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct FlockMembership {
    pub flock: Option<FlockId>,
}

/// Один участник агрегации
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockSample {
    pub entity: Entity,
    pub position: Vec3,
    pub velocity: Vec3,
    pub forward: Vec3,
}

/// Результат кластеризации
#[derive(Debug, Clone, Default)]
pub struct FlockPartition {
    pub flocks: Vec<FlockSnapshot>,
    pub membership: HashMap<Entity, FlockId>,
}

/// Кластеризация + агрегация
///
/// `samples` должны быть в стабильном порядке (Entity index): FlockId
/// назначаются по первому вхождению. Ссылки на соседей вне `samples`
/// игнорируются; одиночки образуют стаю из одного.
pub fn build_flocks(samples: &[FlockSample], links: &HashMap<Entity, Vec<Entity>>) -> FlockPartition {
    let slot: HashMap<Entity, usize> = samples
        .iter()
        .enumerate()
        .map(|(i, sample)| (sample.entity, i))
        .collect();

    let mut parent: Vec<usize> = (0..samples.len()).collect();

    for (i, sample) in samples.iter().enumerate() {
        let Some(neighbors) = links.get(&sample.entity) else {
            continue;
        };
        for neighbor in neighbors {
            if let Some(&j) = slot.get(neighbor) {
                union(&mut parent, i, j);
            }
        }
    }

    let mut root_to_flock: HashMap<usize, usize> = HashMap::new();
    let mut sums: Vec<(Vec3, Vec3, Vec3, usize)> = Vec::new();
    let mut membership = HashMap::with_capacity(samples.len());

    for (i, sample) in samples.iter().enumerate() {
        let root = find(&mut parent, i);
        let flock_index = *root_to_flock.entry(root).or_insert_with(|| {
            sums.push((Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, 0));
            sums.len() - 1
        });

        let acc = &mut sums[flock_index];
        acc.0 += sample.position;
        acc.1 += sample.velocity;
        acc.2 += sample.forward;
        acc.3 += 1;

        membership.insert(sample.entity, FlockId(flock_index as u32));
    }

    let flocks = sums
        .into_iter()
        .enumerate()
        .map(|(index, (position_sum, velocity_sum, heading_sum, count))| {
            let n = count as f32;
            FlockSnapshot {
                id: FlockId(index as u32),
                centroid: position_sum / n,
                average_velocity: velocity_sum / n,
                average_heading: safe_normalize(heading_sum / n),
                member_count: count,
            }
        })
        .collect();

    FlockPartition { flocks, membership }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a == root_b {
        return;
    }
    if root_a < root_b {
        parent[root_b] = root_a;
    } else {
        parent[root_a] = root_b;
    }
}

/// Система: пересборка Neighbors (same faction, flocking, center distance ≤ radius)
pub fn update_neighbors(
    snapshot: Res<TickSnapshot>,
    spatial: Res<SpatialQueryService>,
    flocking_agents: Query<(), With<Flocking>>,
    mut agents: Query<(Entity, &Flocking, &Aspect, &mut Neighbors)>,
) {
    for (entity, flocking, aspect, mut neighbors) in agents.iter_mut() {
        neighbors.entities.clear();

        let Some(position) = snapshot.position_of(entity) else {
            continue;
        };

        for other in spatial.overlap_sphere(position, flocking.neighbor_radius) {
            if other == entity || !flocking_agents.contains(other) {
                continue;
            }
            if snapshot.faction_of(other) != Some(aspect.faction()) {
                continue;
            }
            let Some(other_position) = snapshot.position_of(other) else {
                continue;
            };
            if position.distance(other_position) <= flocking.neighbor_radius {
                neighbors.entities.push(other);
            }
        }
    }
}

/// Система: FlockCoordinator (aggregate-then-consume barrier)
pub fn aggregate_flocks(
    snapshot: Res<TickSnapshot>,
    mut flocks: ResMut<FlockSnapshots>,
    mut members: Query<(Entity, &Neighbors, &mut FlockMembership), With<Flocking>>,
) {
    let mut samples: Vec<FlockSample> = Vec::new();
    let mut links: HashMap<Entity, Vec<Entity>> = HashMap::new();

    for (entity, neighbors, _) in members.iter() {
        let Some(body) = snapshot.get(entity) else {
            continue;
        };
        samples.push(FlockSample {
            entity,
            position: body.position,
            velocity: body.velocity,
            forward: body.forward,
        });
        links.insert(entity, neighbors.entities.clone());
    }

    samples.sort_by_key(|sample| sample.entity.index());

    let partition = build_flocks(&samples, &links);

    for (entity, _, mut membership) in members.iter_mut() {
        membership.flock = partition.membership.get(&entity).copied();
    }

    flocks.flocks = partition.flocks;
}
