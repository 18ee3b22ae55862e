//! Boid steering (continuous leader-relative or origin blend).

use bevy::prelude::*;
use rand::RngCore;

use crate::ai::components::{Boid, BoidConfig};
use crate::components::{MovementCommand, Neighbors, SimulationContext, TargetPoint};
use crate::flock::{FlockMembership, FlockSnapshots};
use crate::spatial::TickSnapshot;
use crate::steering::{
    AgentKinematics, JitterSchedule, LeaderBlend, OriginBlend, OriginBlendConfig, SteeringContext, SteeringWeights,
};
use crate::DeterministicRng;

/// Система: boid steering → SetVelocity
///
/// Leader = SimulationContext.leader_target, если это TargetPoint
/// (иначе follow term inert). Flock centroid/velocity берутся из
/// FlockSnapshots этого тика. Boid с OriginBlendConfig ведёт OriginBlend.
pub fn boid_steering(
    mut boids: Query<
        (
            Entity,
            &BoidConfig,
            &SteeringWeights,
            Option<&OriginBlendConfig>,
            &Neighbors,
            Option<&FlockMembership>,
            &mut JitterSchedule,
            &mut MovementCommand,
        ),
        With<Boid>,
    >,
    leaders: Query<&Transform, With<TargetPoint>>,
    snapshot: Res<TickSnapshot>,
    flocks: Res<FlockSnapshots>,
    context: Res<SimulationContext>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let rng: &mut dyn RngCore = &mut rng.rng;
    let leader = context
        .leader_target
        .and_then(|target| leaders.get(target).ok())
        .map(|transform| transform.translation);

    for (entity, config, weights, origin, neighbors, membership, mut jitter, mut command) in boids.iter_mut() {
        let Some(agent) = snapshot.kinematics(entity) else {
            continue;
        };

        jitter.tick(delta, rng);

        let neighbor_kinematics: Vec<AgentKinematics> = neighbors
            .entities
            .iter()
            .filter_map(|&neighbor| snapshot.kinematics(neighbor))
            .collect();
        let flock = membership.and_then(|m| m.flock).and_then(|id| flocks.get(id));

        let ctx = SteeringContext::new(agent, &neighbor_kinematics)
            .with_flock(flock)
            .with_leader(leader)
            .with_jitter_push(jitter.push);

        let velocity = match origin {
            Some(origin) => OriginBlend::new(*origin).steer(&ctx, delta, rng),
            None => LeaderBlend::new(*weights, config.min_velocity, config.max_velocity).steer(&ctx, delta, rng),
        };

        *command = MovementCommand::SetVelocity { velocity };
    }
}
