//! Тесты выбора wander цели

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::super::movement::pick_wander_target;
    use crate::ai::components::CitizenConfig;
    use crate::components::MovementProfile;
    use crate::spatial::{HeadlessSpatialQuery, NavigableArea};

    #[test]
    fn test_wander_targets_stay_in_annulus() {
        let spatial = HeadlessSpatialQuery::new(NavigableArea::default());
        let config = CitizenConfig::default();
        let profile = MovementProfile::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let position = Vec3::new(3.0, 0.0, -2.0);

        for _ in 0..200 {
            let target = pick_wander_target(
                Entity::PLACEHOLDER,
                position,
                Vec3::NEG_Z,
                &config,
                &profile,
                &spatial,
                &mut rng,
            );

            let distance = Vec3::new(target.x - position.x, 0.0, target.z - position.z).length();
            assert!(
                distance >= profile.min_wander_distance - 1e-4 && distance <= profile.max_wander_distance + 1e-4,
                "target {target:?} at distance {distance}"
            );
            assert_eq!(target.y, 0.0);
        }
    }

    #[test]
    fn test_wander_target_same_seed_same_target() {
        let spatial = HeadlessSpatialQuery::new(NavigableArea::default());
        let config = CitizenConfig::default();
        let profile = MovementProfile::default();

        let pick = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            pick_wander_target(
                Entity::PLACEHOLDER,
                Vec3::ZERO,
                Vec3::NEG_Z,
                &config,
                &profile,
                &spatial,
                &mut rng,
            )
        };

        assert_eq!(pick(7), pick(7));
    }

    #[test]
    fn test_wander_query_miss_steps_forward() {
        // Navigable только 2×2 вокруг центра, sample radius меньше минимального отступа
        let spatial = HeadlessSpatialQuery::new(NavigableArea::centered(1.0));
        let config = CitizenConfig {
            nav_sample_radius: 0.5,
            ..CitizenConfig::default()
        };
        let profile = MovementProfile::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let target = pick_wander_target(
            Entity::PLACEHOLDER,
            Vec3::ZERO,
            Vec3::new(1.0, 0.5, 0.0),
            &config,
            &profile,
            &spatial,
            &mut rng,
        );

        assert_eq!(target, Vec3::new(config.fallback_distance, 0.0, 0.0));
    }
}
