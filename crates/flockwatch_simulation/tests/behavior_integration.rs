//! Behavior integration test
//!
//! Headless App с SimulationPlugin, сценарии citizen FSM:
//! - hostile близко → Evade на следующем тике, далеко → Watch
//! - Watch → Alert → Wander по таймерам
//! - Evade заканчивается когда агент убежал
//! - группа из трёх соседей → Group + один flock
//! - Sight видит игрока → Alert, препятствие блокирует

use bevy::prelude::*;
use flockwatch_simulation::ai::{BehaviorMode, BehaviorModeChanged, BehaviorState};
use flockwatch_simulation::config::CitizenArchetype;
use flockwatch_simulation::spawn::{spawn_citizen, spawn_faction_body, spawn_obstacle, spawn_player};
use flockwatch_simulation::*;

/// Все BehaviorModeChanged за прогон
#[derive(Resource, Default)]
struct ModeChangeLog(Vec<BehaviorModeChanged>);

fn record_mode_changes(mut events: EventReader<BehaviorModeChanged>, mut log: ResMut<ModeChangeLog>) {
    log.0.extend(events.read().cloned());
}

/// Helper: App с SimulationPlugin + запись смен режима
fn create_behavior_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .init_resource::<ModeChangeLog>()
        .add_systems(FixedUpdate, record_mode_changes.after(SimulationSet::Decision));
    app
}

/// Citizen без сенсоров: реагирует только на threat lookup и соседей
fn quiet_citizen() -> CitizenArchetype {
    let mut archetype = CitizenArchetype::default();
    archetype.sight.enabled = false;
    archetype.touch.enabled = false;
    archetype
}

fn mode_of(app: &App, entity: Entity) -> BehaviorMode {
    app.world()
        .get::<BehaviorState>(entity)
        .map(BehaviorState::mode)
        .expect("citizen has BehaviorState")
}

fn position_of(app: &App, entity: Entity) -> Vec3 {
    app.world()
        .get::<Transform>(entity)
        .map(|transform| transform.translation)
        .expect("entity has Transform")
}

fn transitions(app: &App, entity: Entity) -> Vec<(BehaviorMode, BehaviorMode)> {
    app.world()
        .resource::<ModeChangeLog>()
        .0
        .iter()
        .filter(|change| change.entity == entity)
        .map(|change| (change.from, change.to))
        .collect()
}

#[test]
fn test_run_ticks_counts_fixed_steps() {
    let mut app = create_behavior_app(42);

    assert_eq!(run_ticks(&mut app, 5), 5);
    assert_eq!(app.world().resource::<SimulationTick>().0, 5);
    assert_eq!(run_ticks(&mut app, 3), 3);
    assert_eq!(app.world().resource::<SimulationTick>().0, 8);
}

#[test]
fn test_close_hostile_evades_next_tick() {
    let mut app = create_behavior_app(42);
    let citizen = spawn_citizen(app.world_mut(), &quiet_citizen(), Vec3::ZERO);
    spawn_faction_body(app.world_mut(), Faction::Enemy, Vec3::new(5.0, 0.0, 0.0));

    run_ticks(&mut app, 1);

    assert_eq!(mode_of(&app, citizen), BehaviorMode::Evade);
    assert_eq!(transitions(&app, citizen), vec![(BehaviorMode::Wander, BehaviorMode::Evade)]);
}

#[test]
fn test_far_hostile_is_watched() {
    let mut app = create_behavior_app(42);
    let citizen = spawn_citizen(app.world_mut(), &quiet_citizen(), Vec3::ZERO);
    spawn_faction_body(app.world_mut(), Faction::Enemy, Vec3::new(15.0, 0.0, 0.0));

    run_ticks(&mut app, 1);

    assert_eq!(mode_of(&app, citizen), BehaviorMode::Watch);

    // Watch: стоим на месте
    run_ticks(&mut app, 5);
    assert_eq!(position_of(&app, citizen), Vec3::ZERO);
}

fn command_of(app: &App, entity: Entity) -> MovementCommand {
    *app.world()
        .get::<MovementCommand>(entity)
        .expect("agent has MovementCommand")
}

#[test]
fn test_mode_picks_movement_command() {
    let mut app = create_behavior_app(42);
    let archetype = quiet_citizen();
    let watcher = spawn_citizen(app.world_mut(), &archetype, Vec3::ZERO);
    let evader = spawn_citizen(app.world_mut(), &archetype, Vec3::new(100.0, 0.0, 0.0));
    spawn_faction_body(app.world_mut(), Faction::Enemy, Vec3::new(15.0, 0.0, 0.0));
    spawn_faction_body(app.world_mut(), Faction::Enemy, Vec3::new(105.0, 0.0, 0.0));

    run_ticks(&mut app, 2);

    // Watch → Hold
    assert_eq!(mode_of(&app, watcher), BehaviorMode::Watch);
    assert_eq!(command_of(&app, watcher), MovementCommand::Idle);

    // Evade → Navigate прочь от threat
    assert_eq!(mode_of(&app, evader), BehaviorMode::Evade);
    match command_of(&app, evader) {
        MovementCommand::MoveToPosition { target, speed } => {
            assert_eq!(speed, archetype.movement.evade_speed);
            assert!(target.x < position_of(&app, evader).x, "evade target {target:?}");
        }
        other => panic!("expected MoveToPosition, got {other:?}"),
    }
}

#[test]
fn test_hostile_outside_alert_radius_ignored() {
    let mut app = create_behavior_app(42);
    let citizen = spawn_citizen(app.world_mut(), &quiet_citizen(), Vec3::ZERO);
    spawn_faction_body(app.world_mut(), Faction::Enemy, Vec3::new(40.0, 0.0, 0.0));

    run_ticks(&mut app, 1);

    assert_eq!(mode_of(&app, citizen), BehaviorMode::Wander);
}

#[test]
fn test_watch_then_alert_then_wander() {
    let mut app = create_behavior_app(42);
    let mut archetype = quiet_citizen();
    archetype.behavior.watch_time = 0.2;
    let citizen = spawn_citizen(app.world_mut(), &archetype, Vec3::ZERO);
    let enemy = spawn_faction_body(app.world_mut(), Faction::Enemy, Vec3::new(15.0, 0.0, 0.0));

    run_ticks(&mut app, 1);
    assert_eq!(mode_of(&app, citizen), BehaviorMode::Watch);

    // Hostile ушёл — иначе Wander сразу вернётся в Watch
    app.world_mut().despawn(enemy);

    // Watch → Alert через watch_time / 2 = 0.1s (~6 тиков)
    run_ticks(&mut app, 10);
    assert_eq!(mode_of(&app, citizen), BehaviorMode::Alert);

    // Alert → Wander через watch_time = 0.2s (~12 тиков), соседей нет
    run_ticks(&mut app, 20);
    assert_eq!(mode_of(&app, citizen), BehaviorMode::Wander);

    assert_eq!(
        transitions(&app, citizen),
        vec![
            (BehaviorMode::Wander, BehaviorMode::Watch),
            (BehaviorMode::Watch, BehaviorMode::Alert),
            (BehaviorMode::Alert, BehaviorMode::Wander),
        ]
    );
}

#[test]
fn test_evade_moves_away_and_escapes() {
    let mut app = create_behavior_app(42);
    let citizen = spawn_citizen(app.world_mut(), &quiet_citizen(), Vec3::ZERO);
    let enemy_position = Vec3::new(5.0, 0.0, 0.0);
    spawn_faction_body(app.world_mut(), Faction::Enemy, enemy_position);

    run_ticks(&mut app, 60);
    assert_eq!(mode_of(&app, citizen), BehaviorMode::Evade);
    assert!(
        position_of(&app, citizen).distance(enemy_position) > 8.0,
        "citizen should run away at evade speed"
    );

    // 1.5 × alert_radius = 30m при evade_speed 4 м/с — ~6.5s
    run_ticks(&mut app, 600);
    let changes = transitions(&app, citizen);
    assert!(
        changes.contains(&(BehaviorMode::Evade, BehaviorMode::Wander)),
        "evade never ended: {changes:?}"
    );
}

#[test]
fn test_close_neighbors_form_group() {
    let mut app = create_behavior_app(42);
    let archetype = quiet_citizen();
    let citizens: Vec<Entity> = [Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.5)]
        .into_iter()
        .map(|position| spawn_citizen(app.world_mut(), &archetype, position))
        .collect();

    run_ticks(&mut app, 1);

    for &citizen in &citizens {
        assert_eq!(mode_of(&app, citizen), BehaviorMode::Group);
    }

    let flocks = app.world().resource::<FlockSnapshots>();
    assert_eq!(flocks.len(), 1);
    assert_eq!(flocks.flocks[0].member_count, 3);
}

#[test]
fn test_single_neighbor_does_not_group() {
    let mut app = create_behavior_app(42);
    let archetype = quiet_citizen();
    let first = spawn_citizen(app.world_mut(), &archetype, Vec3::ZERO);
    spawn_citizen(app.world_mut(), &archetype, Vec3::new(1.5, 0.0, 0.0));

    run_ticks(&mut app, 1);

    assert_eq!(mode_of(&app, first), BehaviorMode::Wander);
}

#[test]
fn test_threat_overrides_group() {
    let mut app = create_behavior_app(42);
    let archetype = quiet_citizen();
    let citizens: Vec<Entity> = [Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.5)]
        .into_iter()
        .map(|position| spawn_citizen(app.world_mut(), &archetype, position))
        .collect();
    spawn_faction_body(app.world_mut(), Faction::Enemy, Vec3::new(-4.0, 0.0, 0.0));

    run_ticks(&mut app, 1);

    for &citizen in &citizens {
        assert_eq!(mode_of(&app, citizen), BehaviorMode::Evade);
    }
}

#[test]
fn test_sight_detects_player_and_alerts() {
    let mut app = create_behavior_app(42);
    let mut archetype = CitizenArchetype::default();
    archetype.sight.detection_rate = 0.0;
    archetype.touch.enabled = false;

    let player = spawn_player(app.world_mut(), Vec3::new(0.0, 0.0, -8.0));
    let citizen = spawn_citizen(app.world_mut(), &archetype, Vec3::ZERO);

    run_ticks(&mut app, 1);

    assert_eq!(mode_of(&app, citizen), BehaviorMode::Alert);
    let sensor = app.world().get::<SightSensor>(citizen).expect("sight sensor");
    assert_eq!(sensor.last.entity, Some(player));
}

#[test]
fn test_obstacle_blocks_sight() {
    let mut app = create_behavior_app(42);
    let mut archetype = CitizenArchetype::default();
    archetype.sight.detection_rate = 0.0;
    archetype.touch.enabled = false;

    spawn_player(app.world_mut(), Vec3::new(0.0, 0.0, -8.0));
    spawn_obstacle(app.world_mut(), Vec3::new(0.0, 0.0, -4.0), Vec3::new(2.0, 2.0, 0.25));
    let citizen = spawn_citizen(app.world_mut(), &archetype, Vec3::ZERO);

    run_ticks(&mut app, 1);

    assert_eq!(mode_of(&app, citizen), BehaviorMode::Wander);
    let sensor = app.world().get::<SightSensor>(citizen).expect("sight sensor");
    assert!(!sensor.last.detected);
}

#[test]
fn test_missing_player_keeps_sight_inert() {
    let mut app = create_behavior_app(42);
    let mut archetype = CitizenArchetype::default();
    archetype.sight.detection_rate = 0.0;
    let citizen = spawn_citizen(app.world_mut(), &archetype, Vec3::ZERO);

    run_ticks(&mut app, 30);

    assert_eq!(mode_of(&app, citizen), BehaviorMode::Wander);
    let sensor = app.world().get::<SightSensor>(citizen).expect("sight sensor");
    assert_eq!(sensor.cadence.elapsed, 0.0);
}

#[test]
fn test_wander_stays_on_navigable_area() {
    let mut app = create_behavior_app(7);
    let citizen = spawn_citizen(app.world_mut(), &quiet_citizen(), Vec3::ZERO);

    let area = NavigableArea::default();
    for _ in 0..20 {
        run_ticks(&mut app, 30);
        let position = position_of(&app, citizen);
        assert!(area.contains(position), "left navigable area: {position:?}");
        assert_eq!(position.y, 0.0);
    }
    assert_eq!(mode_of(&app, citizen), BehaviorMode::Wander);
}

#[test]
fn test_despawned_agent_leaves_snapshot() {
    let mut app = create_behavior_app(42);
    let archetype = quiet_citizen();
    let first = spawn_citizen(app.world_mut(), &archetype, Vec3::ZERO);
    spawn_citizen(app.world_mut(), &archetype, Vec3::new(20.0, 0.0, 0.0));

    run_ticks(&mut app, 1);
    assert_eq!(app.world().resource::<TickSnapshot>().len(), 2);

    app.world_mut().despawn(first);
    run_ticks(&mut app, 1);

    let snapshot = app.world().resource::<TickSnapshot>();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.get(first).is_none());
}

#[test]
fn test_readback_reports_modes() {
    let mut app = create_behavior_app(42);
    let citizen = spawn_citizen(app.world_mut(), &quiet_citizen(), Vec3::ZERO);
    spawn_faction_body(app.world_mut(), Faction::Enemy, Vec3::new(5.0, 0.0, 0.0));

    run_ticks(&mut app, 1);

    let reports = collect_agent_reports(app.world_mut());
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].entity_index, citizen.index());
    assert_eq!(reports[0].mode, Some(BehaviorMode::Evade));

    let counts = ModeCounts::from_reports(&reports);
    assert_eq!(counts.evade, 1);
    assert_eq!(counts.total(), 1);
}
