//! Tests for FSM AI components.

#[cfg(test)]
mod tests {
    use super::super::fsm::{BehaviorMode, BehaviorState, BoidConfig, CitizenConfig, ThreatAwareness};
    use crate::components::{Faction, MovementStrategy};

    #[test]
    fn test_behavior_state_default() {
        let state = BehaviorState::default();
        assert!(matches!(state, BehaviorState::Wander));
        assert_eq!(state.mode(), BehaviorMode::Wander);
    }

    #[test]
    fn test_mode_ignores_timers() {
        assert_eq!(BehaviorState::Alert { elapsed: 3.0 }.mode(), BehaviorMode::Alert);
        assert_eq!(BehaviorState::Watch { elapsed: 0.5 }.mode(), BehaviorMode::Watch);
    }

    #[test]
    fn test_mode_determines_single_strategy() {
        assert_eq!(BehaviorMode::Wander.movement_strategy(), MovementStrategy::Navigate);
        assert_eq!(BehaviorMode::Evade.movement_strategy(), MovementStrategy::Navigate);
        assert_eq!(BehaviorMode::Group.movement_strategy(), MovementStrategy::FlockBlend);
        assert_eq!(BehaviorMode::Alert.movement_strategy(), MovementStrategy::Hold);
        assert_eq!(BehaviorMode::Watch.movement_strategy(), MovementStrategy::Hold);
    }

    #[test]
    fn test_citizen_config_default() {
        let config = CitizenConfig::default();
        assert_eq!(config.alert_radius, 20.0);
        assert_eq!(config.watch_distance, 10.0);
        assert_eq!(config.watch_time, 5.0);
        assert_eq!(config.evade_exit_factor, 1.5);
        assert_eq!(config.evade_distance, 10.0);
        assert_eq!(config.group_lookahead, 5.0);
        assert_eq!(config.arrival_distance, 1.0);
        assert_eq!(config.alert_turn_rate_deg, 45.0);
        assert_eq!(config.hostile_faction, Faction::Enemy);
    }

    #[test]
    fn test_boid_config_default() {
        let config = BoidConfig::default();
        assert!(config.min_velocity < config.max_velocity);
    }

    #[test]
    fn test_threat_awareness_empty() {
        assert_eq!(ThreatAwareness::default().distance(), None);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(BehaviorMode::Evade.to_string(), "Evade");
        assert_eq!(BehaviorMode::ALL.len(), 5);
    }
}
