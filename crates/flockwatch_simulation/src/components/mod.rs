//! ECS Components для симулируемых entity
//!
//! Организация по доменам:
//! - aspect: фракционный тег (Aspect, Faction, AspectRegistry)
//! - agent: базовые характеристики агента (Velocity, Body, MovementProfile, Neighbors)
//! - movement: команды перемещения (MovementCommand, MovementStrategy)
//! - world: named handles и target provider (SimulationContext, TargetPoint, ScriptedMover)
//! - ai: FSM компоненты (re-export из crate::ai)

pub mod agent;
pub mod ai;
pub mod aspect;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use agent::*;
pub use ai::*;
pub use aspect::*;
pub use movement::*;
pub use world::*;
