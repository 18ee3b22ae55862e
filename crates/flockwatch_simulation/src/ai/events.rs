//! AI Events — смена behavior mode
//!
//! Внешние потребители (анимация, UI) читают их вместо polling'а
//! BehaviorState каждый тик.

use bevy::prelude::*;

use super::components::BehaviorMode;

/// Event: агент сменил режим
///
/// Пишется только при смене mode (тики таймеров внутри Alert/Watch не в счёт).
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BehaviorModeChanged {
    pub entity: Entity,
    pub from: BehaviorMode,
    pub to: BehaviorMode,
}
