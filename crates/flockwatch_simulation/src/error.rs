//! Ошибки и non-fatal faults
//!
//! ConfigError — настоящая ошибка (binary завершается с кодом != 0).
//! SimulationFault — деградация одного агента/компонента: логируем, применяем
//! fallback, симуляция продолжается.

use bevy::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// Ошибка загрузки/валидации конфигурации архетипов
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Non-fatal faults симуляции (только для логов)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationFault {
    /// Внешняя ссылка (player, leader target) не найдена — потребитель inert
    #[error("missing reference `{name}`: {consumer} stays inert")]
    MissingReference {
        name: &'static str,
        consumer: &'static str,
    },

    /// SpatialQuery вернул "none" — применён детерминированный fallback
    #[error("spatial query miss for {entity:?} near {point}: {fallback}")]
    QueryMiss {
        entity: Entity,
        point: Vec3,
        fallback: &'static str,
    },
}

impl SimulationFault {
    /// Залогировать fault: MissingReference — warning, QueryMiss — debug
    pub fn report(&self) {
        match self {
            SimulationFault::MissingReference { .. } => crate::log_warning(&self.to_string()),
            SimulationFault::QueryMiss { .. } => crate::log(&self.to_string()),
        }
    }
}
