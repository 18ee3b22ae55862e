//! FSM AI systems (state transitions).

use bevy::prelude::*;

use crate::ai::components::{BehaviorState, Citizen, CitizenConfig, ThreatAwareness};
use crate::ai::transitions::{next_state, TransitionInputs};
use crate::ai::BehaviorModeChanged;
use crate::components::Neighbors;
use crate::perception::{SightSensor, TouchSensor};

/// Система: citizen FSM transitions
///
/// Входы собраны в Perception фазе этого тика:
/// - Neighbors (same faction, group radius)
/// - ThreatAwareness (nearest hostile)
/// - fresh флаги Sight/Touch сенсоров
///
/// Приоритет: threat > sight > social (см. next_state).
pub fn citizen_state_transitions(
    mut citizens: Query<
        (
            Entity,
            &mut BehaviorState,
            &CitizenConfig,
            &Neighbors,
            &ThreatAwareness,
            Option<&SightSensor>,
            Option<&TouchSensor>,
        ),
        With<Citizen>,
    >,
    time: Res<Time<Fixed>>,
    mut mode_changes: EventWriter<BehaviorModeChanged>,
) {
    let delta = time.delta_secs();

    for (entity, mut state, config, neighbors, awareness, sight, touch) in citizens.iter_mut() {
        let inputs = TransitionInputs {
            neighbor_count: neighbors.len(),
            nearest_hostile: awareness.distance(),
            sight_detected: sight.is_some_and(|sensor| sensor.fresh),
            touch_detected: touch.is_some_and(|sensor| sensor.fresh),
        };

        let new_state = next_state(&state, &inputs, config, delta);
        if new_state == *state {
            continue;
        }

        let from = state.mode();
        let to = new_state.mode();
        *state = new_state;

        if from != to {
            crate::log(&format!(
                "AI: {:?} {} → {} (neighbors {}, hostile {:?})",
                entity, from, to, inputs.neighbor_count, inputs.nearest_hostile
            ));
            mode_changes.write(BehaviorModeChanged { entity, from, to });
        }
    }
}
