//! AI movement systems.
//!
//! Конвертирует BehaviorState → MovementCommand (+ поворот на месте для
//! Alert/Watch). Стратегия движения выбирается только по mode:
//! Navigate (Wander, Evade), FlockBlend (Group), Hold (Alert, Watch).

use bevy::prelude::*;
use rand::{Rng, RngCore};
use std::f32::consts::TAU;

use crate::ai::components::{BehaviorState, Citizen, CitizenConfig, ThreatAwareness, WanderGoal};
use crate::components::{MovementCommand, MovementProfile, MovementStrategy, Neighbors};
use crate::error::SimulationFault;
use crate::flock::{FlockMembership, FlockSnapshots};
use crate::spatial::{SpatialQuery, SpatialQueryService, TickSnapshot};
use crate::steering::{safe_normalize, AgentKinematics, FlockBlend, SteeringContext, SteeringWeights};
use crate::DeterministicRng;

/// Система: citizen behavior from state
///
/// Cross-agent данные (соседи, flock) читаются из TickSnapshot/FlockSnapshots;
/// собственный Transform пишется только поворотом (перемещение — Actuation).
pub fn citizen_behavior(
    mut citizens: Query<
        (
            Entity,
            &BehaviorState,
            &CitizenConfig,
            &MovementProfile,
            &SteeringWeights,
            &Neighbors,
            &ThreatAwareness,
            Option<&FlockMembership>,
            &mut WanderGoal,
            &mut MovementCommand,
            &mut Transform,
        ),
        With<Citizen>,
    >,
    snapshot: Res<TickSnapshot>,
    flocks: Res<FlockSnapshots>,
    spatial: Res<SpatialQueryService>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let spatial: &dyn SpatialQuery = &**spatial;
    let rng: &mut dyn RngCore = &mut rng.rng;

    for (entity, state, config, profile, weights, neighbors, awareness, membership, mut goal, mut command, mut transform) in
        citizens.iter_mut()
    {
        let position = transform.translation;
        let forward = transform.forward().as_vec3();

        match state.mode().movement_strategy() {
            MovementStrategy::Navigate => {
                let next = match state {
                    BehaviorState::Evade => {
                        // Без threat (уже убежали) держим прежнюю команду до перехода в Wander
                        let Some(threat) = awareness.nearest else {
                            continue;
                        };
                        evade_command(entity, position, forward, threat.position, config, profile, spatial)
                    }
                    _ => wander_command(entity, position, forward, config, profile, spatial, rng, &mut goal),
                };
                command.set_if_neq(next);
            }

            MovementStrategy::FlockBlend => {
                let agent = snapshot.kinematics(entity).unwrap_or(AgentKinematics {
                    position,
                    velocity: Vec3::ZERO,
                    forward,
                });
                let neighbor_kinematics: Vec<AgentKinematics> = neighbors
                    .entities
                    .iter()
                    .filter_map(|&neighbor| snapshot.kinematics(neighbor))
                    .collect();
                let flock = membership.and_then(|m| m.flock).and_then(|id| flocks.get(id));

                let ctx = SteeringContext::new(agent, &neighbor_kinematics).with_flock(flock);
                let blend = FlockBlend::new(*weights, config.separation_distance, config.group_lookahead);

                let next = match blend.target_point(&ctx, rng) {
                    Some(point) => match spatial.sample_navigable(point, config.nav_sample_radius) {
                        Some(target) => MovementCommand::MoveToPosition {
                            target,
                            speed: profile.group_speed,
                        },
                        None => {
                            SimulationFault::QueryMiss {
                                entity,
                                point,
                                fallback: "hold position",
                            }
                            .report();
                            MovementCommand::Idle
                        }
                    },
                    // Соседи пропали в этом тике, ведём себя как Wander
                    None => wander_command(entity, position, forward, config, profile, spatial, rng, &mut goal),
                };
                command.set_if_neq(next);
            }

            MovementStrategy::Hold => {
                command.set_if_neq(MovementCommand::Idle);
                match state {
                    BehaviorState::Watch { .. } => {
                        if let Some(threat) = awareness.nearest {
                            turn_towards(&mut transform, threat.position, profile.rotation_speed * delta);
                        }
                    }
                    _ => transform.rotate_y(config.alert_turn_rate_deg.to_radians() * delta),
                }
            }
        }
    }
}

/// Evade: точка на evade_distance прямо от threat, snapped на navigable surface
fn evade_command(
    entity: Entity,
    position: Vec3,
    forward: Vec3,
    threat: Vec3,
    config: &CitizenConfig,
    profile: &MovementProfile,
    spatial: &dyn SpatialQuery,
) -> MovementCommand {
    let mut away = safe_normalize(horizontal(position - threat));
    if away == Vec3::ZERO {
        away = -flat_forward(forward);
    }

    let destination = position + away * config.evade_distance;
    let target = spatial
        .sample_navigable(destination, config.nav_sample_radius)
        .unwrap_or_else(|| {
            SimulationFault::QueryMiss {
                entity,
                point: destination,
                fallback: "short step away from threat",
            }
            .report();
            position + away * config.fallback_distance
        });

    MovementCommand::MoveToPosition {
        target,
        speed: profile.evade_speed,
    }
}

/// Wander: текущая цель или новая (достигнута / не navigable / random repick)
#[allow(clippy::too_many_arguments)]
fn wander_command(
    entity: Entity,
    position: Vec3,
    forward: Vec3,
    config: &CitizenConfig,
    profile: &MovementProfile,
    spatial: &dyn SpatialQuery,
    rng: &mut dyn RngCore,
    goal: &mut WanderGoal,
) -> MovementCommand {
    let repick = rng.gen::<f32>() < config.wander_repick_chance;

    let target = match goal.target {
        Some(target)
            if !repick
                && horizontal_distance(position, target) >= config.arrival_distance
                && spatial.sample_navigable(target, config.arrival_distance).is_some() =>
        {
            target
        }
        _ => {
            let target = pick_wander_target(entity, position, forward, config, profile, spatial, rng);
            goal.target = Some(target);
            target
        }
    };

    MovementCommand::MoveToPosition {
        target,
        speed: profile.wander_speed,
    }
}

/// Случайная точка в annulus [min_wander_distance, max_wander_distance]
/// вокруг `position` (горизонтальная плоскость), snapped на navigable surface
///
/// QueryMiss → шаг вперёд на fallback_distance.
pub fn pick_wander_target(
    entity: Entity,
    position: Vec3,
    forward: Vec3,
    config: &CitizenConfig,
    profile: &MovementProfile,
    spatial: &dyn SpatialQuery,
    rng: &mut dyn RngCore,
) -> Vec3 {
    let low = profile.min_wander_distance.min(profile.max_wander_distance);
    let high = profile.min_wander_distance.max(profile.max_wander_distance);

    let angle = rng.gen_range(0.0..TAU);
    let distance = rng.gen_range(low..=high);
    let candidate = position + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance;

    match spatial.sample_navigable(candidate, config.nav_sample_radius) {
        Some(point) => point,
        None => {
            SimulationFault::QueryMiss {
                entity,
                point: candidate,
                fallback: "step forward",
            }
            .report();
            position + flat_forward(forward) * config.fallback_distance
        }
    }
}

/// Yaw-only slerp к точке
fn turn_towards(transform: &mut Transform, point: Vec3, factor: f32) {
    let direction = horizontal(point - transform.translation);
    if direction.length_squared() < 1e-6 {
        return;
    }

    let look = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
    transform.rotation = transform.rotation.slerp(look, factor.clamp(0.0, 1.0));
}

fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    horizontal(a - b).length()
}

fn flat_forward(forward: Vec3) -> Vec3 {
    let flat = safe_normalize(horizontal(forward));
    if flat == Vec3::ZERO {
        Vec3::NEG_Z
    } else {
        flat
    }
}
