//! FLOCKWATCH Simulation Core
//!
//! ECS-симуляция NPC на Bevy 0.16 (headless, fixed tick)
//!
//! Один тик = пять chained фаз в FixedUpdate (SimulationSet):
//! 1. Capture — SimulationTick + TickSnapshot + sync коллайдеров
//! 2. Perception — сенсоры, Neighbors, ThreatAwareness
//! 3. Aggregation — FlockCoordinator (FlockSnapshots)
//! 4. Decision — FSM transitions, per-state behavior, boid steering
//! 5. Actuation — MovementCommand → Transform, scripted movers
//!
//! Все cross-agent чтения идут через TickSnapshot (read-previous / write-next),
//! поэтому порядок итерации агентов не влияет на результат.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod components;
pub mod config;
pub mod error;
pub mod flock;
pub mod logger;
pub mod movement;
pub mod perception;
pub mod readback;
pub mod spatial;
pub mod spawn;
pub mod steering;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, BehaviorModeChanged};
pub use components::*;
pub use config::SimulationConfig;
pub use error::{ConfigError, SimulationFault};
pub use flock::{FlockPlugin, FlockSnapshot, FlockSnapshots};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, LogLevel, LogPrinter};
pub use movement::MovementPlugin;
pub use perception::{PerceptionPlugin, SensorDetected, SightSensor, TouchSensor};
pub use readback::{collect_agent_reports, AgentReport, ModeCounts};
pub use spatial::{HeadlessSpatialQuery, NavigableArea, SpatialQuery, SpatialQueryService, TickSnapshot};

/// Частота fixed step по умолчанию (Hz)
pub const DEFAULT_TICK_HZ: f64 = 60.0;

/// Фазы одного тика (chained в FixedUpdate)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Capture,
    Perception,
    Aggregation,
    Decision,
    Actuation,
}

/// Сколько fixed step'ов выполнено
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationTick(pub u64);

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Tick rate задаётся при создании App (create_headless_app_with_rate),
/// plugin его не трогает.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // init (не insert): seed из create_headless_app не перетирается
            .init_resource::<DeterministicRng>()
            .init_resource::<SimulationTick>()
            .init_resource::<spatial::TickSnapshot>()
            .init_resource::<FlockSnapshots>()
            .init_resource::<SpatialQueryService>()
            .init_resource::<SimulationContext>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Capture,
                    SimulationSet::Perception,
                    SimulationSet::Aggregation,
                    SimulationSet::Decision,
                    SimulationSet::Actuation,
                )
                    .chain(),
            )
            .add_systems(Startup, report_missing_references)
            .add_systems(
                FixedUpdate,
                spatial::capture_tick_snapshot.in_set(SimulationSet::Capture),
            )
            // Подсистемы
            .add_plugins((PerceptionPlugin, FlockPlugin, AIPlugin, MovementPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Startup: MissingReference для потребителей без named handle
fn report_missing_references(
    context: Res<SimulationContext>,
    sight_sensors: Query<(), With<SightSensor>>,
    boids: Query<(), With<ai::Boid>>,
) {
    if context.player.is_none() && !sight_sensors.is_empty() {
        SimulationFault::MissingReference {
            name: "player",
            consumer: "sight sensors",
        }
        .report();
    }

    if context.leader_target.is_none() && !boids.is_empty() {
        SimulationFault::MissingReference {
            name: "leader_target",
            consumer: "boid leader follow",
        }
        .report();
    }
}

/// Создаёт minimal Bevy App для headless симуляции (60Hz)
pub fn create_headless_app(seed: u64) -> App {
    create_headless_app_with_rate(seed, DEFAULT_TICK_HZ)
}

/// Headless App с заданной частотой fixed step
///
/// Время двигается вручную ровно на один fixed step за `App::update`
/// (кроме самого первого update — он только стартует часы).
pub fn create_headless_app_with_rate(seed: u64, tick_hz: f64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(tick_hz))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / tick_hz)));

    app
}

/// Прогоняет App пока не выполнится `ticks` fixed step'ов
///
/// Возвращает фактическое число выполненных step'ов (меньше `ticks` только
/// если SimulationPlugin не добавлен или время не двигается).
pub fn run_ticks(app: &mut App, ticks: u64) -> u64 {
    let start = current_tick(app);
    let target = start + ticks;
    let max_updates = ticks.saturating_mul(2).saturating_add(4);

    for _ in 0..max_updates {
        if current_tick(app) >= target {
            break;
        }
        app.update();
    }

    current_tick(app) - start
}

fn current_tick(app: &App) -> u64 {
    app.world().get_resource::<SimulationTick>().map(|tick| tick.0).unwrap_or(0)
}

/// Snapshot мира для сравнения детерминизма
/// (Debug-представление компонента T, отсортировано по Entity index)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
