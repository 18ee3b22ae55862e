//! Сенсоры: Sight (конус + дальность + line-of-sight) и Touch (proximity trigger)
//!
//! Оба сенсора работают по cadence: время накапливается, полный проход
//! делается только когда накопленное время строго больше `detection_rate`,
//! после чего аккумулятор сбрасывается в ноль (остаток отбрасывается).
//! Между проходами возвращается предыдущий результат.

use bevy::prelude::*;

use crate::components::{AspectRegistry, Faction};
use crate::spatial::SpatialQuery;
use crate::steering::safe_normalize;

/// Cadence сенсора
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct SensorCadence {
    /// Минимальный интервал между проходами (секунды)
    pub detection_rate: f32,
    pub elapsed: f32,
}

impl SensorCadence {
    pub fn new(detection_rate: f32) -> Self {
        Self {
            detection_rate,
            elapsed: 0.0,
        }
    }

    /// Накопить dt; true = пора делать проход (аккумулятор сброшен в 0)
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed > self.detection_rate {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}

/// Результат одного прохода сенсора
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct DetectionResult {
    pub detected: bool,
    pub entity: Option<Entity>,
    pub position: Option<Vec3>,
}

impl DetectionResult {
    pub fn hit(entity: Entity, position: Vec3) -> Self {
        Self {
            detected: true,
            entity: Some(entity),
            position: Some(position),
        }
    }
}

/// Sight сенсор (видит reference target из SimulationContext)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SightSensor {
    pub target_faction: Faction,
    /// Half-angle конуса (градусы)
    pub field_of_view: f32,
    pub view_distance: f32,
    pub cadence: SensorCadence,
    pub last: DetectionResult,
    /// Проход в текущем тике что-то обнаружил
    pub fresh: bool,
}

impl Default for SightSensor {
    fn default() -> Self {
        Self::new(Faction::Player, 60.0, 15.0, 0.5)
    }
}

impl SightSensor {
    pub fn new(target_faction: Faction, field_of_view: f32, view_distance: f32, detection_rate: f32) -> Self {
        Self {
            target_faction,
            field_of_view,
            view_distance,
            cadence: SensorCadence::new(detection_rate),
            last: DetectionResult::default(),
            fresh: false,
        }
    }

    /// Обновить сенсор
    ///
    /// `reference = None` (игрок не разрешён): no-op, "no detection",
    /// аккумулятор не двигается.
    pub fn update(
        &mut self,
        dt: f32,
        position: Vec3,
        forward: Vec3,
        reference: Option<Vec3>,
        spatial: &dyn SpatialQuery,
        registry: &impl AspectRegistry,
    ) -> DetectionResult {
        self.fresh = false;

        let Some(reference) = reference else {
            return DetectionResult::default();
        };

        if !self.cadence.tick(dt) {
            return self.last;
        }

        self.last = self.detect(position, forward, reference, spatial, registry);
        self.fresh = self.last.detected;
        self.last
    }

    fn detect(
        &self,
        position: Vec3,
        forward: Vec3,
        reference: Vec3,
        spatial: &dyn SpatialQuery,
        registry: &impl AspectRegistry,
    ) -> DetectionResult {
        let direction = safe_normalize(reference - position);
        if direction == Vec3::ZERO {
            return DetectionResult::default();
        }

        // NaN (нулевой forward) тоже отбрасывается
        let angle = forward.angle_between(direction).to_degrees();
        if angle.is_nan() || angle >= self.field_of_view {
            return DetectionResult::default();
        }

        let Some(hit) = spatial.raycast(position, direction, self.view_distance) else {
            return DetectionResult::default();
        };

        if registry.faction_of(hit.entity) != Some(self.target_faction) {
            return DetectionResult::default();
        }

        let target_position = registry.position_of(hit.entity).unwrap_or(hit.point);
        DetectionResult::hit(hit.entity, target_position)
    }
}

/// Touch сенсор: срабатывает на вход entity целевой фракции в радиус
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct TouchSensor {
    pub target_faction: Faction,
    pub radius: f32,
    pub cadence: SensorCadence,
    /// Текущие контакты (для детекта входа)
    pub contacts: Vec<Entity>,
    pub last: DetectionResult,
    pub fresh: bool,
}

impl Default for TouchSensor {
    fn default() -> Self {
        Self::new(Faction::Enemy, 2.0, 0.0)
    }
}

impl TouchSensor {
    pub fn new(target_faction: Faction, radius: f32, detection_rate: f32) -> Self {
        Self {
            target_faction,
            radius,
            cadence: SensorCadence::new(detection_rate),
            contacts: Vec::new(),
            last: DetectionResult::default(),
            fresh: false,
        }
    }

    /// Обновить сенсор
    ///
    /// detected только на проходе, где появился новый контакт; из нескольких
    /// новых контактов репортится ближайший.
    pub fn update(
        &mut self,
        dt: f32,
        owner: Entity,
        position: Vec3,
        spatial: &dyn SpatialQuery,
        registry: &impl AspectRegistry,
    ) -> DetectionResult {
        self.fresh = false;

        if !self.cadence.tick(dt) {
            return self.last;
        }

        let mut current = Vec::new();
        let mut nearest_new: Option<(Entity, Vec3, f32)> = None;

        for other in spatial.overlap_sphere(position, self.radius) {
            if other == owner || registry.faction_of(other) != Some(self.target_faction) {
                continue;
            }
            let Some(other_position) = registry.position_of(other) else {
                continue;
            };

            current.push(other);
            if self.contacts.contains(&other) {
                continue;
            }

            let distance = position.distance(other_position);
            if nearest_new.is_none_or(|(_, _, best)| distance < best) {
                nearest_new = Some((other, other_position, distance));
            }
        }

        self.contacts = current;
        self.last = match nearest_new {
            Some((entity, entity_position, _)) => DetectionResult::hit(entity, entity_position),
            None => DetectionResult::default(),
        };
        self.fresh = self.last.detected;
        self.last
    }
}
