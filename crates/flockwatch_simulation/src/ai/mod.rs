//! AI decision-making module
//!
//! Citizen FSM (Wander/Group/Alert/Evade/Watch) + boid steering.
//! Transition function чистая (transitions.rs), системы только собирают
//! входы и применяют результат.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;
pub mod transitions;


// Re-export основных типов
pub use components::{
    BehaviorMode, BehaviorState, Boid, BoidConfig, Citizen, CitizenConfig, ThreatAwareness, ThreatSighting,
    WanderGoal,
};
pub use events::BehaviorModeChanged;
pub use systems::{boid_steering, citizen_behavior, citizen_state_transitions, pick_wander_target};
pub use transitions::{next_state, TransitionInputs};

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в Decision фазе FixedUpdate.
/// Порядок выполнения:
/// 1. citizen_state_transitions — обновление FSM state
/// 2. citizen_behavior — конвертация state → MovementCommand
/// 3. boid_steering — leader/origin blend → SetVelocity
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BehaviorModeChanged>().add_systems(
            FixedUpdate,
            (citizen_state_transitions, citizen_behavior, boid_steering)
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimulationSet::Decision),
        );
    }
}
