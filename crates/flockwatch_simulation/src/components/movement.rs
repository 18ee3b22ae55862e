//! Movement компоненты: команды перемещения и стратегия движения

use bevy::prelude::*;

/// Команда движения для агента (исполняется в Actuation фазе)
///
/// Архитектура:
/// - AI системы пишут MovementCommand (high-level intent)
/// - apply_movement_commands интегрирует его в Transform + Velocity
/// - внешний движок может читать ту же команду для своего NavigationAgent
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub enum MovementCommand {
    /// Стоять на месте (velocity = 0)
    #[default]
    Idle,
    /// Двигаться к точке на navigable surface
    MoveToPosition { target: Vec3, speed: f32 },
    /// Мгновенная скорость (steering blend без навигации)
    SetVelocity { velocity: Vec3 },
}

/// Стратегия движения, однозначно определяемая behavior mode
///
/// Ни один mode не включает одновременно навигацию и steering blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementStrategy {
    /// Прямая навигация к точке (Wander, Evade)
    Navigate,
    /// Flock blend → short-range target point (Group)
    FlockBlend,
    /// Без перемещения, только поворот (Alert, Watch)
    Hold,
}
