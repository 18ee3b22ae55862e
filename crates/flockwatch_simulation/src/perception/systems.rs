//! Perception systems (Perception фаза)

use bevy::prelude::*;

use crate::ai::components::{BehaviorState, Citizen, CitizenConfig, ThreatAwareness};
use crate::components::{AspectRegistry, SimulationContext};
use crate::perception::{nearest_hostile, SensorDetected, SensorKind, SightSensor, TouchSensor};
use crate::spatial::{SpatialQueryService, TickSnapshot};

/// Система: Sight сенсоры
///
/// Reference target = SimulationContext.player (позиция из snapshot).
pub fn update_sight_sensors(
    snapshot: Res<TickSnapshot>,
    spatial: Res<SpatialQueryService>,
    context: Res<SimulationContext>,
    time: Res<Time<Fixed>>,
    mut sensors: Query<(Entity, &mut SightSensor)>,
    mut detections: EventWriter<SensorDetected>,
) {
    let dt = time.delta_secs();
    let reference = context.player.and_then(|player| snapshot.position_of(player));

    for (entity, mut sensor) in sensors.iter_mut() {
        let Some(body) = snapshot.get(entity) else {
            continue;
        };

        let result = sensor.update(dt, body.position, body.forward, reference, &**spatial, &*snapshot);

        if sensor.fresh {
            if let (Some(target), Some(position)) = (result.entity, result.position) {
                crate::log(&format!("👁️ Sight: {:?} sees {:?} at {:?}", entity, target, position));
                detections.write(SensorDetected {
                    observer: entity,
                    kind: SensorKind::Sight,
                    target,
                    position,
                });
            }
        }
    }
}

/// Система: Touch сенсоры
pub fn update_touch_sensors(
    snapshot: Res<TickSnapshot>,
    spatial: Res<SpatialQueryService>,
    time: Res<Time<Fixed>>,
    mut sensors: Query<(Entity, &mut TouchSensor)>,
    mut detections: EventWriter<SensorDetected>,
) {
    let dt = time.delta_secs();

    for (entity, mut sensor) in sensors.iter_mut() {
        let Some(position) = snapshot.position_of(entity) else {
            continue;
        };

        let result = sensor.update(dt, entity, position, &**spatial, &*snapshot);

        if sensor.fresh {
            if let (Some(target), Some(position)) = (result.entity, result.position) {
                crate::log(&format!("✋ Touch: {:?} touched by {:?}", entity, target));
                detections.write(SensorDetected {
                    observer: entity,
                    kind: SensorKind::Touch,
                    target,
                    position,
                });
            }
        }
    }
}

/// Система: ThreatAwareness (ближайший hostile)
///
/// В Evade радиус расширяется до alert_radius × evade_exit_factor, чтобы
/// выход из Evade видел "убежал ли агент".
pub fn update_threat_awareness(
    snapshot: Res<TickSnapshot>,
    spatial: Res<SpatialQueryService>,
    mut citizens: Query<(Entity, &CitizenConfig, &BehaviorState, &mut ThreatAwareness), With<Citizen>>,
) {
    for (entity, config, state, mut awareness) in citizens.iter_mut() {
        let Some(position) = snapshot.position_of(entity) else {
            awareness.nearest = None;
            continue;
        };

        let radius = match state {
            BehaviorState::Evade => config.alert_radius * config.evade_exit_factor,
            _ => config.alert_radius,
        };

        awareness.nearest = nearest_hostile(
            entity,
            position,
            radius,
            config.hostile_faction,
            &**spatial,
            &*snapshot,
        );
    }
}
