//! Perception events

use bevy::prelude::*;

/// Какой сенсор сработал
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Sight,
    Touch,
}

/// Event: проход сенсора что-то обнаружил
///
/// Пишется только на проходах с detected = true (не каждый тик).
#[derive(Event, Debug, Clone)]
pub struct SensorDetected {
    /// Владелец сенсора
    pub observer: Entity,
    pub kind: SensorKind,
    pub target: Entity,
    pub position: Vec3,
}
