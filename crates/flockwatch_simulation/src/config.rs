//! Конфигурация симуляции (JSON)
//!
//! Архетипы citizen/boid: плоские наборы именованных параметров.
//! Все поля имеют default — пустой `{}` валидный конфиг.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ai::components::{BoidConfig, CitizenConfig};
use crate::components::{Faction, MovementProfile};
use crate::error::ConfigError;
use crate::perception::{SightSensor, TouchSensor};
use crate::steering::{OriginBlendConfig, SteeringWeights};

/// Sight сенсор архетипа
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SightConfig {
    pub enabled: bool,
    pub target_faction: Faction,
    /// Half-angle (градусы)
    pub field_of_view: f32,
    pub view_distance: f32,
    pub detection_rate: f32,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_faction: Faction::Player,
            field_of_view: 60.0,
            view_distance: 15.0,
            detection_rate: 0.5,
        }
    }
}

impl SightConfig {
    pub fn sensor(&self) -> SightSensor {
        SightSensor::new(self.target_faction, self.field_of_view, self.view_distance, self.detection_rate)
    }
}

/// Touch сенсор архетипа
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    pub enabled: bool,
    pub target_faction: Faction,
    pub radius: f32,
    pub detection_rate: f32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_faction: Faction::Enemy,
            radius: 2.0,
            detection_rate: 0.0,
        }
    }
}

impl TouchConfig {
    pub fn sensor(&self) -> TouchSensor {
        TouchSensor::new(self.target_faction, self.radius, self.detection_rate)
    }
}

/// Citizen архетип (FSM агент)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitizenArchetype {
    pub faction: Faction,
    pub behavior: CitizenConfig,
    pub movement: MovementProfile,
    pub steering: SteeringWeights,
    pub sight: SightConfig,
    pub touch: TouchConfig,
    pub body_radius: f32,
}

impl Default for CitizenArchetype {
    fn default() -> Self {
        Self {
            faction: Faction::Civilian,
            behavior: CitizenConfig::default(),
            movement: MovementProfile::default(),
            steering: SteeringWeights::default(),
            sight: SightConfig::default(),
            touch: TouchConfig::default(),
            body_radius: 0.5,
        }
    }
}

/// Какой steering ведёт boids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoidModel {
    /// Скорость пересчитывается каждый тик и clamp'ится в [min, max]
    #[default]
    LeaderBlend,
    /// Инерционная скорость, ограниченный поворот
    OriginBlend,
}

/// Boid архетип
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoidArchetype {
    pub faction: Faction,
    pub model: BoidModel,
    pub boid: BoidConfig,
    pub steering: SteeringWeights,
    /// Используется только при model = OriginBlend
    pub origin: OriginBlendConfig,
    pub body_radius: f32,
}

impl Default for BoidArchetype {
    fn default() -> Self {
        Self {
            faction: Faction::Neutral,
            model: BoidModel::LeaderBlend,
            boid: BoidConfig::default(),
            steering: SteeringWeights {
                cohesion: 1.0,
                separation: 1.0,
                alignment: 1.0,
                leader_follow: 1.0,
                jitter: 0.0,
                random_force: 1.0,
            },
            origin: OriginBlendConfig::default(),
            body_radius: 0.25,
        }
    }
}

/// Корневой конфиг
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Частота fixed step (Hz)
    pub tick_hz: f64,
    pub citizen: CitizenArchetype,
    pub boid: BoidArchetype,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_hz: 60.0,
            citizen: CitizenArchetype::default(),
            boid: BoidArchetype::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(ConfigError::invalid("tick_hz", format!("must be > 0, got {}", self.tick_hz)));
        }

        let citizen = &self.citizen;
        let movement = &citizen.movement;
        non_negative("citizen.movement.wander_speed", movement.wander_speed)?;
        non_negative("citizen.movement.group_speed", movement.group_speed)?;
        non_negative("citizen.movement.evade_speed", movement.evade_speed)?;
        non_negative("citizen.movement.rotation_speed", movement.rotation_speed)?;
        non_negative("citizen.movement.min_wander_distance", movement.min_wander_distance)?;
        non_negative("citizen.movement.max_wander_distance", movement.max_wander_distance)?;
        if movement.max_wander_distance < movement.min_wander_distance {
            return Err(ConfigError::invalid(
                "citizen.movement.max_wander_distance",
                "must be >= min_wander_distance",
            ));
        }

        let behavior = &citizen.behavior;
        positive("citizen.behavior.group_radius", behavior.group_radius)?;
        positive("citizen.behavior.alert_radius", behavior.alert_radius)?;
        non_negative("citizen.behavior.watch_time", behavior.watch_time)?;
        non_negative("citizen.behavior.watch_distance", behavior.watch_distance)?;
        non_negative("citizen.behavior.separation_distance", behavior.separation_distance)?;
        non_negative("citizen.behavior.arrival_distance", behavior.arrival_distance)?;
        non_negative("citizen.behavior.nav_sample_radius", behavior.nav_sample_radius)?;
        non_negative("citizen.behavior.fallback_distance", behavior.fallback_distance)?;
        if behavior.evade_exit_factor.is_nan() || behavior.evade_exit_factor < 1.0 {
            return Err(ConfigError::invalid("citizen.behavior.evade_exit_factor", "must be >= 1"));
        }
        if !(0.0..=1.0).contains(&behavior.wander_repick_chance) {
            return Err(ConfigError::invalid(
                "citizen.behavior.wander_repick_chance",
                "must be within [0, 1]",
            ));
        }

        if !(citizen.sight.field_of_view > 0.0 && citizen.sight.field_of_view <= 180.0) {
            return Err(ConfigError::invalid("citizen.sight.field_of_view", "must be within (0, 180]"));
        }
        positive("citizen.sight.view_distance", citizen.sight.view_distance)?;
        non_negative("citizen.sight.detection_rate", citizen.sight.detection_rate)?;
        positive("citizen.touch.radius", citizen.touch.radius)?;
        non_negative("citizen.touch.detection_rate", citizen.touch.detection_rate)?;
        positive("citizen.body_radius", citizen.body_radius)?;

        let boid = &self.boid.boid;
        non_negative("boid.boid.min_velocity", boid.min_velocity)?;
        non_negative("boid.boid.max_velocity", boid.max_velocity)?;
        if boid.max_velocity < boid.min_velocity {
            return Err(ConfigError::invalid("boid.boid.max_velocity", "must be >= min_velocity"));
        }
        positive("boid.boid.neighbor_radius", boid.neighbor_radius)?;
        non_negative("boid.boid.jitter_frequency", boid.jitter_frequency)?;
        positive("boid.body_radius", self.boid.body_radius)?;

        if self.boid.model == BoidModel::OriginBlend {
            let origin = &self.boid.origin;
            non_negative("boid.origin.min_speed", origin.min_speed)?;
            non_negative("boid.origin.turn_speed", origin.turn_speed)?;
            non_negative("boid.origin.random_frequency", origin.random_frequency)?;
            non_negative("boid.origin.random_force", origin.random_force)?;
            non_negative("boid.origin.to_origin_force", origin.to_origin_force)?;
            positive("boid.origin.to_origin_range", origin.to_origin_range)?;
            non_negative("boid.origin.gravity", origin.gravity)?;
            positive("boid.origin.avoidance_radius", origin.avoidance_radius)?;
            non_negative("boid.origin.avoidance_force", origin.avoidance_force)?;
            non_negative("boid.origin.follow_velocity", origin.follow_velocity)?;
            positive("boid.origin.follow_radius", origin.follow_radius)?;
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be >= 0, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = SimulationConfig::from_json_str("{}").expect("empty config is valid");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "seed": 7,
            "citizen": { "behavior": { "alert_radius": 30.0 }, "faction": "Enemy" },
            "boid": { "boid": { "max_velocity": 12.0 } }
        }"#;
        let config = SimulationConfig::from_json_str(json).expect("valid config");

        assert_eq!(config.seed, 7);
        assert_eq!(config.citizen.behavior.alert_radius, 30.0);
        assert_eq!(config.citizen.behavior.watch_distance, 10.0);
        assert_eq!(config.citizen.faction, Faction::Enemy);
        assert_eq!(config.boid.boid.max_velocity, 12.0);
        assert_eq!(config.boid.boid.min_velocity, 1.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimulationConfig::from_json_str(r#"{ "boid": { "boid": { "min_velocity": 5.0, "max_velocity": 2.0 } } }"#)
            .expect_err("min > max");
        assert!(matches!(err, ConfigError::Invalid { field: "boid.boid.max_velocity", .. }));

        let err = SimulationConfig::from_json_str(r#"{ "tick_hz": 0.0 }"#).expect_err("zero tick rate");
        assert!(matches!(err, ConfigError::Invalid { field: "tick_hz", .. }));

        let err = SimulationConfig::from_json_str(r#"{ "citizen": { "behavior": { "wander_repick_chance": 2.0 } } }"#)
            .expect_err("probability > 1");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "citizen.behavior.wander_repick_chance",
                ..
            }
        ));
    }

    #[test]
    fn test_overflowing_distances_rejected() {
        // 1e39 не помещается в f32 и читается как inf
        let err = SimulationConfig::from_json_str(r#"{ "citizen": { "movement": { "max_wander_distance": 1e39 } } }"#)
            .expect_err("infinite wander distance");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "citizen.movement.max_wander_distance",
                ..
            }
        ));

        let err = SimulationConfig::from_json_str(r#"{ "boid": { "boid": { "max_velocity": 1e39 } } }"#)
            .expect_err("infinite max velocity");
        assert!(matches!(err, ConfigError::Invalid { field: "boid.boid.max_velocity", .. }));
    }

    #[test]
    fn test_origin_model_parsed_and_validated() {
        let json = r#"{ "boid": { "model": "OriginBlend", "origin": { "min_speed": 5.0 } } }"#;
        let config = SimulationConfig::from_json_str(json).expect("valid origin config");
        assert_eq!(config.boid.model, BoidModel::OriginBlend);
        assert_eq!(config.boid.origin.min_speed, 5.0);
        assert_eq!(config.boid.origin.to_origin_range, 100.0);

        let err = SimulationConfig::from_json_str(r#"{ "boid": { "model": "OriginBlend", "origin": { "follow_radius": 0.0 } } }"#)
            .expect_err("zero follow radius");
        assert!(matches!(err, ConfigError::Invalid { field: "boid.origin.follow_radius", .. }));

        // LeaderBlend не смотрит на origin параметры
        SimulationConfig::from_json_str(r#"{ "boid": { "origin": { "follow_radius": 0.0 } } }"#)
            .expect("origin ignored for leader blend");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = SimulationConfig::from_json_str("{ seed: ").expect_err("malformed");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimulationConfig::load("/definitely/not/here/flockwatch.json").expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_json_round_trip_keeps_values() {
        let mut config = SimulationConfig::default();
        config.citizen.sight.enabled = false;
        let json = config.to_json_pretty().expect("serializable");
        assert_eq!(SimulationConfig::from_json_str(&json).expect("valid"), config);
    }
}
