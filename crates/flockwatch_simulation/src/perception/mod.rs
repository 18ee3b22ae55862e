//! Perception domain — сенсоры и threat lookup
//!
//! Содержит:
//! - SightSensor / TouchSensor (cadence-based detection)
//! - nearest_hostile (overlap + faction filter + min distance)
//! - SensorDetected event
//!
//! Все чтения мира идут через TickSnapshot (previous step).

use bevy::prelude::*;

pub mod events;
pub mod sensor;
pub mod systems;
pub mod threat;


pub use events::*;
pub use sensor::*;
pub use systems::*;
pub use threat::*;

use crate::SimulationSet;

/// Perception Plugin
///
/// Порядок внутри Perception фазы не важен (все читают snapshot), но
/// фиксирован `.chain()` для детерминизма логов и событий.
pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SensorDetected>().add_systems(
            FixedUpdate,
            (update_sight_sensors, update_touch_sensors, update_threat_awareness)
                .chain()
                .in_set(SimulationSet::Perception),
        );
    }
}
