//! Aspect — фракционный тег любой world entity (агенты, игрок, препятствия)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Фракция entity (используется фильтрами сенсоров и threat lookup)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
    Civilian,
    #[default]
    Neutral,
}

impl Faction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Player => "player",
            Faction::Enemy => "enemy",
            Faction::Civilian => "civilian",
            Faction::Neutral => "neutral",
        }
    }
}

/// Фракционный тег entity
///
/// Immutable после spawn: поменять фракцию можно только пересозданием entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[component(immutable)]
pub struct Aspect {
    faction: Faction,
}

impl Aspect {
    pub fn new(faction: Faction) -> Self {
        Self { faction }
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }
}

/// Faction registry: lookup фракции и позиции по Entity
///
/// Реализуется TickSnapshot (previous-step данные); внешний движок может
/// предоставить свою реализацию.
pub trait AspectRegistry {
    fn faction_of(&self, entity: Entity) -> Option<Faction>;
    fn position_of(&self, entity: Entity) -> Option<Vec3>;
}
