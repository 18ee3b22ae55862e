//! AI компоненты: state machine, config, threat awareness

// NOTE: типы живут в crate::ai::components, здесь только re-export
// для единообразного `use crate::components::*`.
pub use crate::ai::components::{
    BehaviorMode, BehaviorState, Boid, BoidConfig, Citizen, CitizenConfig, ThreatAwareness,
    ThreatSighting, WanderGoal,
};
