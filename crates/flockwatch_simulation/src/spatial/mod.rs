//! Spatial query capability
//!
//! SpatialQuery — внешний сервис (navmesh sampling, overlap, raycast).
//! Симуляция видит его только через trait; headless реализация
//! (HeadlessSpatialQuery) используется тестами и headless binary.
//!
//! Все методы могут вернуть "none" — у каждого вызывающего есть fallback.

use bevy::prelude::*;
use std::ops::Deref;

pub mod headless;
pub mod snapshot;


pub use headless::{HeadlessSpatialQuery, NavigableArea};
pub use snapshot::{capture_tick_snapshot, BodyShape, BodySnapshot, TickSnapshot};

/// Результат raycast: первая поверхность на луче
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    pub distance: f32,
}

/// Контракт внешнего spatial сервиса
pub trait SpatialQuery: Send + Sync + 'static {
    /// Ближайшая точка navigable surface в пределах `max_radius`
    fn sample_navigable(&self, point: Vec3, max_radius: f32) -> Option<Vec3>;

    /// Entities, чьи коллайдеры пересекают сферу (порядок = enumeration order сервиса)
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Entity>;

    /// Первое попадание луча; луч, начатый внутри коллайдера, этот коллайдер не видит
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    /// Синхронизация dynamic коллайдеров с previous-step snapshot (один раз за тик)
    fn sync_bodies(&mut self, _bodies: &[BodySnapshot]) {}
}

/// Resource-обёртка над реализацией SpatialQuery
#[derive(Resource)]
pub struct SpatialQueryService(Box<dyn SpatialQuery>);

impl SpatialQueryService {
    pub fn new(query: impl SpatialQuery) -> Self {
        Self(Box::new(query))
    }

    pub fn get_mut(&mut self) -> &mut dyn SpatialQuery {
        self.0.as_mut()
    }
}

impl Default for SpatialQueryService {
    fn default() -> Self {
        Self::new(HeadlessSpatialQuery::new(NavigableArea::default()))
    }
}

impl Deref for SpatialQueryService {
    type Target = dyn SpatialQuery;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
