//! Threat lookup: ближайший hostile в радиусе

use bevy::prelude::*;

use crate::ai::components::ThreatSighting;
use crate::components::{AspectRegistry, Faction};
use crate::spatial::SpatialQuery;

/// overlap_sphere → фильтр по фракции → минимум дистанции
///
/// При равных дистанциях остаётся первый в enumeration order сервиса.
pub fn nearest_hostile(
    observer: Entity,
    position: Vec3,
    radius: f32,
    hostile: Faction,
    spatial: &dyn SpatialQuery,
    registry: &impl AspectRegistry,
) -> Option<ThreatSighting> {
    let mut nearest: Option<ThreatSighting> = None;

    for entity in spatial.overlap_sphere(position, radius) {
        if entity == observer || registry.faction_of(entity) != Some(hostile) {
            continue;
        }
        let Some(hostile_position) = registry.position_of(entity) else {
            continue;
        };

        let distance = position.distance(hostile_position);
        if nearest.is_none_or(|best| distance < best.distance) {
            nearest = Some(ThreatSighting {
                entity,
                position: hostile_position,
                distance,
            });
        }
    }

    nearest
}
