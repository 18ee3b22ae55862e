//! Readback для внешних (cosmetic) потребителей
//!
//! Read-only; обычно опрашивается раз в тик после Actuation.

use bevy::prelude::*;
use serde::Serialize;

use crate::ai::components::{BehaviorMode, BehaviorState};
use crate::components::Agent;

/// Состояние одного агента
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentReport {
    pub entity_index: u32,
    /// None для boids (у них нет FSM)
    pub mode: Option<BehaviorMode>,
    pub position: [f32; 3],
}

/// Все агенты, отсортированы по Entity index
pub fn collect_agent_reports(world: &mut World) -> Vec<AgentReport> {
    let mut query = world.query_filtered::<(Entity, &Transform, Option<&BehaviorState>), With<Agent>>();
    let mut reports: Vec<AgentReport> = query
        .iter(world)
        .map(|(entity, transform, state)| AgentReport {
            entity_index: entity.index(),
            mode: state.map(BehaviorState::mode),
            position: transform.translation.to_array(),
        })
        .collect();

    reports.sort_by_key(|report| report.entity_index);
    reports
}

/// Сколько агентов в каждом режиме
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ModeCounts {
    pub wander: usize,
    pub group: usize,
    pub alert: usize,
    pub evade: usize,
    pub watch: usize,
    /// Агенты без FSM (boids)
    pub steering_only: usize,
}

impl ModeCounts {
    pub fn from_reports(reports: &[AgentReport]) -> Self {
        let mut counts = Self::default();
        for report in reports {
            match report.mode {
                Some(BehaviorMode::Wander) => counts.wander += 1,
                Some(BehaviorMode::Group) => counts.group += 1,
                Some(BehaviorMode::Alert) => counts.alert += 1,
                Some(BehaviorMode::Evade) => counts.evade += 1,
                Some(BehaviorMode::Watch) => counts.watch += 1,
                None => counts.steering_only += 1,
            }
        }
        counts
    }

    pub fn get(&self, mode: BehaviorMode) -> usize {
        match mode {
            BehaviorMode::Wander => self.wander,
            BehaviorMode::Group => self.group,
            BehaviorMode::Alert => self.alert,
            BehaviorMode::Evade => self.evade,
            BehaviorMode::Watch => self.watch,
        }
    }

    pub fn total(&self) -> usize {
        self.wander + self.group + self.alert + self.evade + self.watch + self.steering_only
    }
}

impl std::fmt::Display for ModeCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "wander={} group={} alert={} evade={} watch={} boids={}",
            self.wander, self.group, self.alert, self.evade, self.watch, self.steering_only
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(mode: Option<BehaviorMode>) -> AgentReport {
        AgentReport {
            entity_index: 0,
            mode,
            position: [0.0; 3],
        }
    }

    #[test]
    fn test_mode_counts() {
        let reports = [
            report(Some(BehaviorMode::Wander)),
            report(Some(BehaviorMode::Wander)),
            report(Some(BehaviorMode::Evade)),
            report(None),
        ];
        let counts = ModeCounts::from_reports(&reports);

        assert_eq!(counts.get(BehaviorMode::Wander), 2);
        assert_eq!(counts.get(BehaviorMode::Evade), 1);
        assert_eq!(counts.steering_only, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_collect_reports_sorted() {
        let mut world = World::new();
        let citizen = world.spawn((Agent, Transform::from_xyz(1.0, 0.0, 0.0), BehaviorState::Evade)).id();
        let boid = world.spawn((Agent, Transform::from_xyz(2.0, 0.0, 0.0))).id();
        world.spawn(Transform::default());

        let reports = collect_agent_reports(&mut world);

        assert_eq!(reports.len(), 2);
        assert!(reports[0].entity_index < reports[1].entity_index);
        let evading = reports
            .iter()
            .find(|r| r.entity_index == citizen.index())
            .expect("agent reported");
        assert_eq!(evading.mode, Some(BehaviorMode::Evade));
        assert_eq!(evading.position, [1.0, 0.0, 0.0]);
        let steering_only = reports.iter().find(|r| r.entity_index == boid.index()).expect("agent reported");
        assert_eq!(steering_only.mode, None);
    }
}
