//! World-level компоненты и ресурсы: SimulationContext, target provider

use bevy::prelude::*;

/// Именованные handles, инжектируемые при построении сцены
///
/// Заменяет глобальный "find by tag": каждая система получает ссылки отсюда.
/// `None` = ссылка не разрешена (MissingReference → потребитель inert).
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimulationContext {
    /// Reference target для Sight сенсоров (игрок)
    pub player: Option<Entity>,
    /// Target provider для leader-relative steering
    pub leader_target: Option<Entity>,
}

/// Marker: точка в мире, которую агенты используют как leader/follow point
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TargetPoint;

/// Скриптовый mover для target provider
///
/// Летит вперёд со скоростью `speed`, плавно поворачиваясь к случайной точке
/// внутри `origin ± bounds`; новая точка — когда до текущей < `reach_radius`.
#[derive(Component, Debug, Clone, Copy)]
pub struct ScriptedMover {
    pub origin: Vec3,
    pub bounds: Vec3,
    pub speed: f32,
    pub reach_radius: f32,
    /// Slerp factor в секунду
    pub turn_rate: f32,
    pub next_point: Option<Vec3>,
}

impl ScriptedMover {
    pub fn new(origin: Vec3, bounds: Vec3) -> Self {
        Self {
            origin,
            bounds,
            speed: 6.0,
            reach_radius: 2.0,
            turn_rate: 1.0,
            next_point: None,
        }
    }
}
