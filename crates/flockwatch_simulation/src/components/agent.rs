//! Базовые компоненты агентов: Agent, Velocity, Body, MovementProfile, Neighbors

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Агент (citizen, boid) — базовый marker для симулируемых существ
///
/// Автоматически добавляет Velocity, Body, Neighbors через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Velocity, Body, Neighbors)]
pub struct Agent;

/// Линейная скорость (м/с), пишется в Actuation фазе
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Velocity {
    pub linear: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3) -> Self {
        Self { linear }
    }
}

/// Сферический коллайдер агента/игрока для spatial queries
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Body {
    pub radius: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self { radius: 0.5 }
    }
}

/// Статическое препятствие (AABB вокруг Transform.translation)
///
/// Блокирует line-of-sight raycast'ы Sight сенсоров.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Obstacle {
    pub half_extents: Vec3,
}

/// Скоростной профиль агента (м/с, градусы и дистанции wander annulus)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct MovementProfile {
    pub wander_speed: f32,
    pub group_speed: f32,
    pub evade_speed: f32,
    /// Скорость поворота (slerp factor в секунду) для Watch
    pub rotation_speed: f32,
    pub min_wander_distance: f32,
    pub max_wander_distance: f32,
}

impl Default for MovementProfile {
    fn default() -> Self {
        Self {
            wander_speed: 2.0,
            group_speed: 2.5,
            evade_speed: 4.0,
            rotation_speed: 3.0,
            min_wander_distance: 5.0,
            max_wander_distance: 15.0,
        }
    }
}

/// Участник flocking: радиус, в котором ищутся соседи своей фракции
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Neighbors, crate::flock::FlockMembership)]
pub struct Flocking {
    pub neighbor_radius: f32,
}

impl Default for Flocking {
    fn default() -> Self {
        Self {
            neighbor_radius: 10.0,
        }
    }
}

/// Соседи агента в текущем тике (same faction, внутри neighbor_radius)
///
/// Перестраивается каждый тик из spatial query — не кэш между тиками.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Neighbors {
    pub entities: Vec<Entity>,
}

impl Neighbors {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
