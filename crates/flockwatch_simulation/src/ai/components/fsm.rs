//! FSM AI components (behavior state, citizen/boid config, threat awareness).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Agent, Faction, Flocking, MovementCommand, MovementProfile, MovementStrategy};
use crate::steering::{JitterSchedule, SteeringWeights};

/// Behavior FSM состояния (с per-state таймерами)
///
/// Нет терминального состояния: агент крутится между режимами до despawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub enum BehaviorState {
    /// Wander — начальное состояние: случайные точки в annulus вокруг агента
    #[default]
    Wander,

    /// Group — движение вместе с соседями своей фракции (flock blend)
    Group,

    /// Alert — стоим и крутимся на месте
    Alert {
        /// Сколько секунд в Alert
        elapsed: f32,
    },

    /// Evade — убегаем от ближайшего hostile
    Evade,

    /// Watch — стоим и смотрим на hostile
    Watch {
        /// Сколько секунд в Watch
        elapsed: f32,
    },
}

impl BehaviorState {
    pub fn mode(&self) -> BehaviorMode {
        match self {
            BehaviorState::Wander => BehaviorMode::Wander,
            BehaviorState::Group => BehaviorMode::Group,
            BehaviorState::Alert { .. } => BehaviorMode::Alert,
            BehaviorState::Evade => BehaviorMode::Evade,
            BehaviorState::Watch { .. } => BehaviorMode::Watch,
        }
    }
}

/// Режим без таймеров (readback, события, логи)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BehaviorMode {
    Wander,
    Group,
    Alert,
    Evade,
    Watch,
}

impl BehaviorMode {
    pub const ALL: [BehaviorMode; 5] = [
        BehaviorMode::Wander,
        BehaviorMode::Group,
        BehaviorMode::Alert,
        BehaviorMode::Evade,
        BehaviorMode::Watch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorMode::Wander => "Wander",
            BehaviorMode::Group => "Group",
            BehaviorMode::Alert => "Alert",
            BehaviorMode::Evade => "Evade",
            BehaviorMode::Watch => "Watch",
        }
    }

    /// Стратегия движения однозначно определяется режимом
    pub fn movement_strategy(&self) -> MovementStrategy {
        match self {
            BehaviorMode::Wander | BehaviorMode::Evade => MovementStrategy::Navigate,
            BehaviorMode::Group => MovementStrategy::FlockBlend,
            BehaviorMode::Alert | BehaviorMode::Watch => MovementStrategy::Hold,
        }
    }
}

impl std::fmt::Display for BehaviorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Параметры citizen FSM
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct CitizenConfig {
    /// Радиус поиска соседей для Group
    pub group_radius: f32,
    /// FlockBlend: соседи ближе отталкивают
    pub separation_distance: f32,
    /// Радиус threat lookup
    pub alert_radius: f32,
    /// Alert длится watch_time, Watch → Alert через watch_time / 2
    pub watch_time: f32,
    /// Hostile дальше этой дистанции → Watch, ближе → Evade
    pub watch_distance: f32,
    /// Evade заканчивается когда hostile дальше alert_radius × factor
    pub evade_exit_factor: f32,
    /// Насколько далеко убегаем за один pick
    pub evade_distance: f32,
    /// Group target point: self + direction × lookahead
    pub group_lookahead: f32,
    /// Wander target считается достигнутым ближе этой дистанции
    pub arrival_distance: f32,
    /// Per-tick вероятность сменить wander target раньше времени
    pub wander_repick_chance: f32,
    /// max_radius для sample_navigable
    pub nav_sample_radius: f32,
    /// Fallback при QueryMiss: шаг вперёд на эту дистанцию
    pub fallback_distance: f32,
    /// Alert: скорость вращения на месте (градусы/сек)
    pub alert_turn_rate_deg: f32,
    pub hostile_faction: Faction,
}

impl Default for CitizenConfig {
    fn default() -> Self {
        Self {
            group_radius: 10.0,
            separation_distance: 2.0,
            alert_radius: 20.0,
            watch_time: 5.0,
            watch_distance: 10.0,
            evade_exit_factor: 1.5,
            evade_distance: 10.0,
            group_lookahead: 5.0,
            arrival_distance: 1.0,
            wander_repick_chance: 0.01,
            nav_sample_radius: 10.0,
            fallback_distance: 5.0,
            alert_turn_rate_deg: 45.0,
            hostile_faction: Faction::Enemy,
        }
    }
}

/// Citizen marker (FSM-driven агент)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(
    Agent,
    Flocking,
    BehaviorState,
    CitizenConfig,
    MovementProfile,
    SteeringWeights,
    WanderGoal,
    ThreatAwareness,
    MovementCommand
)]
pub struct Citizen;

/// Текущая wander цель (None = нужно выбрать)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WanderGoal {
    pub target: Option<Vec3>,
}

/// Один найденный hostile
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ThreatSighting {
    pub entity: Entity,
    pub position: Vec3,
    pub distance: f32,
}

/// Ближайший hostile в этом тике (перестраивается в Perception фазе)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ThreatAwareness {
    pub nearest: Option<ThreatSighting>,
}

impl ThreatAwareness {
    pub fn distance(&self) -> Option<f32> {
        self.nearest.map(|sighting| sighting.distance)
    }
}

/// Boid marker (continuous leader-relative steering)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Agent, Flocking, BoidConfig, SteeringWeights, JitterSchedule, MovementCommand)]
pub struct Boid;

/// Параметры boid
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct BoidConfig {
    pub min_velocity: f32,
    pub max_velocity: f32,
    pub neighbor_radius: f32,
    /// Частота JitterSchedule (раз в секунду)
    pub jitter_frequency: f32,
}

impl Default for BoidConfig {
    fn default() -> Self {
        Self {
            min_velocity: 1.0,
            max_velocity: 8.0,
            neighbor_radius: 10.0,
            jitter_frequency: 2.0,
        }
    }
}
