//! Headless SpatialQuery: плоский navigable прямоугольник + простые коллайдеры
//!
//! Достаточно для тестов и headless прогонов. Настоящий navmesh/broad-phase
//! живёт во внешнем движке и подключается через тот же trait.

use bevy::prelude::*;

use super::{BodyShape, BodySnapshot, RayHit, SpatialQuery};
use crate::steering::safe_normalize;

/// Navigable surface: прямоугольник в плоскости XZ на высоте `height`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigableArea {
    pub min: Vec2,
    pub max: Vec2,
    pub height: f32,
}

impl Default for NavigableArea {
    fn default() -> Self {
        Self::centered(100.0)
    }
}

impl NavigableArea {
    /// Квадрат [-half_size, half_size]² на y = 0
    pub fn centered(half_size: f32) -> Self {
        Self {
            min: Vec2::splat(-half_size),
            max: Vec2::splat(half_size),
            height: 0.0,
        }
    }

    /// Ближайшая точка области к `point` (clamp по XZ, y = height)
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            self.height,
            point.z.clamp(self.min.y, self.max.y),
        )
    }

    pub fn contains(&self, point: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.z)
    }
}

#[derive(Debug, Clone, Copy)]
struct Collider {
    entity: Entity,
    center: Vec3,
    shape: BodyShape,
}

/// Headless реализация SpatialQuery
///
/// Коллайдеры пересобираются из TickSnapshot в `sync_bodies`, enumeration
/// order = порядок snapshot (Entity index).
#[derive(Debug, Clone, Default)]
pub struct HeadlessSpatialQuery {
    area: NavigableArea,
    colliders: Vec<Collider>,
}

impl HeadlessSpatialQuery {
    pub fn new(area: NavigableArea) -> Self {
        Self {
            area,
            colliders: Vec::new(),
        }
    }

    pub fn area(&self) -> NavigableArea {
        self.area
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

impl SpatialQuery for HeadlessSpatialQuery {
    fn sample_navigable(&self, point: Vec3, max_radius: f32) -> Option<Vec3> {
        let snapped = self.area.closest_point(point);
        (snapped.distance(point) <= max_radius).then_some(snapped)
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Entity> {
        self.colliders
            .iter()
            .filter(|collider| match collider.shape {
                BodyShape::Sphere { radius: body_radius } => {
                    collider.center.distance_squared(center) <= (radius + body_radius).powi(2)
                }
                BodyShape::Cuboid { half_extents } => {
                    let min = collider.center - half_extents;
                    let max = collider.center + half_extents;
                    center.clamp(min, max).distance_squared(center) <= radius * radius
                }
            })
            .map(|collider| collider.entity)
            .collect()
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = safe_normalize(direction);
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut nearest: Option<RayHit> = None;

        for collider in &self.colliders {
            let distance = match collider.shape {
                BodyShape::Sphere { radius } => ray_sphere(origin, direction, collider.center, radius),
                BodyShape::Cuboid { half_extents } => ray_aabb(
                    origin,
                    direction,
                    collider.center - half_extents,
                    collider.center + half_extents,
                ),
            };

            let Some(distance) = distance else {
                continue;
            };

            if distance > max_distance {
                continue;
            }

            // Строго меньше: при равенстве выигрывает первый в enumeration order
            if nearest.is_none_or(|hit| distance < hit.distance) {
                nearest = Some(RayHit {
                    entity: collider.entity,
                    point: origin + direction * distance,
                    distance,
                });
            }
        }

        nearest
    }

    fn sync_bodies(&mut self, bodies: &[BodySnapshot]) {
        self.colliders.clear();
        self.colliders.extend(bodies.iter().filter_map(|body| {
            body.shape.map(|shape| Collider {
                entity: body.entity,
                center: body.position,
                shape,
            })
        }));
    }
}

/// Ray vs sphere. None если origin внутри сферы или сфера позади
fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = origin - center;
    let c = offset.length_squared() - radius * radius;
    if c < 0.0 {
        return None;
    }

    let b = offset.dot(direction);
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

/// Ray vs AABB (slab method). None если origin внутри бокса
fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];

        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }

    if t_exit < t_enter || t_exit < 0.0 || t_enter < 0.0 {
        return None;
    }

    Some(t_enter)
}
