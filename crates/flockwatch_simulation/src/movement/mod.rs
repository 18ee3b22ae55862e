//! Movement domain — исполнение MovementCommand и scripted target provider
//!
//! Содержит:
//! - apply_movement_commands (MovementCommand → Transform + Velocity)
//! - drive_scripted_movers (ScriptedMover, leader target для boids)
//!
//! Headless заменитель NavigationAgent внешнего движка: MoveToPosition идёт
//! по прямой к уже navigable точке.

use bevy::prelude::*;
use rand::Rng;

use crate::components::{MovementCommand, ScriptedMover, Velocity};
use crate::steering::leader_blend::facing_from_velocity;
use crate::steering::safe_normalize;
use crate::{DeterministicRng, SimulationSet};

/// Movement Plugin (Actuation фаза, последняя в тике)
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (apply_movement_commands, drive_scripted_movers)
                .chain()
                .in_set(SimulationSet::Actuation),
        );
    }
}

/// Один шаг интеграции команды
///
/// Возвращает (новая позиция, velocity, направление взгляда).
pub fn integrate_command(command: &MovementCommand, position: Vec3, dt: f32) -> (Vec3, Vec3, Option<Vec3>) {
    match *command {
        MovementCommand::Idle => (position, Vec3::ZERO, None),

        MovementCommand::MoveToPosition { target, speed } => {
            let offset = target - position;
            let distance = offset.length();
            let step = (speed.max(0.0) * dt).min(distance);
            let motion = safe_normalize(offset) * step;

            let velocity = if dt > 0.0 { motion / dt } else { Vec3::ZERO };
            let flat = Vec3::new(offset.x, 0.0, offset.z);
            let facing = (flat.length_squared() > 1e-6).then_some(flat);

            (position + motion, velocity, facing)
        }

        MovementCommand::SetVelocity { velocity } => {
            (position + velocity * dt, velocity, facing_from_velocity(velocity))
        }
    }
}

/// Система: MovementCommand → Transform + Velocity
pub fn apply_movement_commands(
    mut agents: Query<(&MovementCommand, &mut Transform, &mut Velocity)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (command, mut transform, mut velocity) in agents.iter_mut() {
        let (position, linear, facing) = integrate_command(command, transform.translation, delta);

        if position != transform.translation {
            transform.translation = position;
        }
        if let Some(direction) = facing {
            transform.look_to(direction, Vec3::Y);
        }
        velocity.set_if_neq(Velocity::new(linear));
    }
}

/// Система: scripted target provider
///
/// Летит вперёд, плавно поворачивая к случайной точке внутри origin ± bounds.
pub fn drive_scripted_movers(
    mut movers: Query<(&mut ScriptedMover, &mut Transform)>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut mover, mut transform) in movers.iter_mut() {
        let target = match mover.next_point {
            Some(point) if transform.translation.distance(point) >= mover.reach_radius => point,
            _ => {
                let bounds = mover.bounds.abs();
                let point = mover.origin
                    + Vec3::new(
                        rng.rng.gen_range(-bounds.x..=bounds.x),
                        rng.rng.gen_range(-bounds.y..=bounds.y),
                        rng.rng.gen_range(-bounds.z..=bounds.z),
                    );
                mover.next_point = Some(point);
                point
            }
        };

        let direction = safe_normalize(target - transform.translation);
        if direction != Vec3::ZERO {
            let look = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
            transform.rotation = transform.rotation.slerp(look, (mover.turn_rate * delta).clamp(0.0, 1.0));
        }

        let forward = transform.forward().as_vec3();
        transform.translation += forward * mover.speed * delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_to_position_caps_step() {
        let command = MovementCommand::MoveToPosition {
            target: Vec3::new(10.0, 0.0, 0.0),
            speed: 2.0,
        };

        let (position, velocity, facing) = integrate_command(&command, Vec3::ZERO, 0.5);

        assert_eq!(position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(velocity, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(facing, Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_move_to_position_does_not_overshoot() {
        let command = MovementCommand::MoveToPosition {
            target: Vec3::new(0.0, 0.0, -0.5),
            speed: 4.0,
        };

        let (position, _, _) = integrate_command(&command, Vec3::ZERO, 1.0);

        assert_eq!(position, Vec3::new(0.0, 0.0, -0.5));
    }

    #[test]
    fn test_idle_zeroes_velocity() {
        let (position, velocity, facing) = integrate_command(&MovementCommand::Idle, Vec3::ONE, 0.1);

        assert_eq!(position, Vec3::ONE);
        assert_eq!(velocity, Vec3::ZERO);
        assert_eq!(facing, None);
    }

    #[test]
    fn test_set_velocity_faces_only_above_threshold() {
        let slow = MovementCommand::SetVelocity {
            velocity: Vec3::new(0.05, 0.0, 0.0),
        };
        let (_, _, facing) = integrate_command(&slow, Vec3::ZERO, 0.1);
        assert_eq!(facing, None);

        let fast = MovementCommand::SetVelocity {
            velocity: Vec3::new(0.0, 0.0, 3.0),
        };
        let (position, velocity, facing) = integrate_command(&fast, Vec3::ZERO, 0.5);
        assert_eq!(position, Vec3::new(0.0, 0.0, 1.5));
        assert_eq!(velocity, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(facing, Some(Vec3::Z));
    }
}
