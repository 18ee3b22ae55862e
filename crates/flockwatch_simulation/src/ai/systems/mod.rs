//! AI systems (decision phase)

pub mod boids;
pub mod fsm;
pub mod movement;

#[cfg(test)]
mod movement_tests;

pub use boids::boid_steering;
pub use fsm::citizen_state_transitions;
pub use movement::{citizen_behavior, pick_wander_target};
