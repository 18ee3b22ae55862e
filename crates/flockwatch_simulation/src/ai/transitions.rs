//! Pure FSM transition function
//!
//! Вызывается раз в тик на агента. Threat проверки перекрывают social
//! проверки; Sight детект (без threat) перекрывает social.
//! Sight переводит в Alert из любого состояния кроме Evade.

use super::components::{BehaviorState, CitizenConfig};

/// Входы одного шага FSM (собираются из Perception фазы)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransitionInputs {
    /// Соседи своей фракции в group radius
    pub neighbor_count: usize,
    /// Дистанция до ближайшего hostile (None = нет в радиусе)
    pub nearest_hostile: Option<f32>,
    /// Sight проход в этом тике что-то увидел
    pub sight_detected: bool,
    /// Touch проход в этом тике зафиксировал вход
    pub touch_detected: bool,
}

/// Следующее состояние (без side effects)
pub fn next_state(
    state: &BehaviorState,
    inputs: &TransitionInputs,
    config: &CitizenConfig,
    dt: f32,
) -> BehaviorState {
    match *state {
        BehaviorState::Wander | BehaviorState::Group => {
            if let Some(distance) = inputs.nearest_hostile {
                return threat_response(distance, config);
            }

            if inputs.sight_detected {
                return BehaviorState::Alert { elapsed: 0.0 };
            }

            match state {
                BehaviorState::Wander if inputs.neighbor_count >= 2 => BehaviorState::Group,
                BehaviorState::Group if inputs.neighbor_count == 0 => BehaviorState::Wander,
                _ => *state,
            }
        }

        BehaviorState::Watch { elapsed } => {
            if inputs.sight_detected {
                return BehaviorState::Alert { elapsed: 0.0 };
            }

            let elapsed = elapsed + dt;
            if elapsed >= config.watch_time / 2.0 {
                BehaviorState::Alert { elapsed: 0.0 }
            } else {
                BehaviorState::Watch { elapsed }
            }
        }

        BehaviorState::Alert { elapsed } => {
            if inputs.touch_detected {
                if let Some(distance) = inputs.nearest_hostile {
                    return threat_response(distance, config);
                }
            }

            let elapsed = elapsed + dt;
            if elapsed >= config.watch_time {
                if inputs.neighbor_count > 0 {
                    BehaviorState::Group
                } else {
                    BehaviorState::Wander
                }
            } else {
                BehaviorState::Alert { elapsed }
            }
        }

        BehaviorState::Evade => match inputs.nearest_hostile {
            Some(distance) if distance <= config.alert_radius * config.evade_exit_factor => BehaviorState::Evade,
            _ => BehaviorState::Wander,
        },
    }
}

/// Hostile в alert radius: далеко → Watch, близко → Evade
fn threat_response(distance: f32, config: &CitizenConfig) -> BehaviorState {
    if distance > config.watch_distance {
        BehaviorState::Watch { elapsed: 0.0 }
    } else {
        BehaviorState::Evade
    }
}
