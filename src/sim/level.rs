//! Level generation
//!
//! Picks a factor pair, derives the target product, and scatters the factors
//! among distractor bubbles. All randomness comes from the injected RNG.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Bubble, BubbleColor, BubbleId, DifficultyTier, Level};
use crate::tuning::Tuning;

/// Produces levels from a seeded random source
#[derive(Debug, Clone)]
pub struct LevelGenerator<R: Rng = Pcg32> {
    rng: R,
    tuning: Tuning,
    next_id: u32,
}

impl LevelGenerator<Pcg32> {
    /// Deterministic generator for a run seed
    pub fn seeded(seed: u64, tuning: Tuning) -> Self {
        Self::new(Pcg32::seed_from_u64(seed), tuning)
    }
}

impl<R: Rng> LevelGenerator<R> {
    pub fn new(rng: R, tuning: Tuning) -> Self {
        Self {
            rng,
            tuning,
            next_id: 1,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Allocate a new bubble ID
    fn next_bubble_id(&mut self) -> BubbleId {
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Generate a fresh level for `tier`
    pub fn generate(&mut self, tier: DifficultyTier) -> Level {
        let max_factor = self.tuning.tier(tier).max_factor;
        let factor1 = self.rng.random_range(2..=max_factor);
        let factor2 = self.rng.random_range(2..=max_factor);
        let target = factor1 * factor2;

        let distractor_max = max_factor + self.tuning.level.distractor_headroom;
        let mut values = Vec::with_capacity(2 + self.tuning.level.distractors);
        values.push(factor1);
        values.push(factor2);
        for _ in 0..self.tuning.level.distractors {
            values.push(self.rng.random_range(1..=distractor_max));
        }

        log::debug!(
            "{} level: {} x {} = {}, pool {:?}",
            tier.as_str(),
            factor1,
            factor2,
            target,
            values
        );

        self.level_from_values(target, (factor1, factor2), &values)
    }

    /// Build a level with explicit values, randomizing only the visuals.
    /// The first two values should be the factor pair.
    pub fn level_from_values(&mut self, target: u32, factors: (u32, u32), values: &[u32]) -> Level {
        let bubbles = values.iter().map(|&value| self.spawn_bubble(value)).collect();
        Level {
            target,
            factors,
            bubbles,
        }
    }

    /// Materialize one bubble with random placement and look
    fn spawn_bubble(&mut self, value: u32) -> Bubble {
        let layout = self.tuning.level;
        let id = self.next_bubble_id();
        let x = self.rng.random_range(layout.spawn_x.0..=layout.spawn_x.1);
        let y = self.rng.random_range(layout.spawn_y.0..=layout.spawn_y.1);
        let color = BubbleColor::PALETTE[self.rng.random_range(0..BubbleColor::PALETTE.len())];
        let size = self.rng.random_range(layout.size.0..=layout.size.1);
        let magnitude = self.rng.random_range(layout.speed.0..=layout.speed.1);
        let speed = if self.rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        };

        Bubble {
            id,
            value,
            pos: Vec2::new(x, y),
            speed,
            size,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_shape() {
        let tuning = Tuning::default();
        let mut generator = LevelGenerator::seeded(42, tuning.clone());

        for tier in DifficultyTier::ALL {
            let max_factor = tuning.tier(tier).max_factor;
            for _ in 0..50 {
                let level = generator.generate(tier);
                assert_eq!(level.bubbles.len(), 12);
                assert_eq!(level.bubbles[0].value * level.bubbles[1].value, level.target);
                assert_eq!(level.factors.0 * level.factors.1, level.target);
                assert!(level.target >= 4 && level.target <= max_factor * max_factor);

                for bubble in &level.bubbles {
                    assert!(bubble.value >= 1 && bubble.value <= max_factor + 3);
                    assert!((5.0..=85.0).contains(&bubble.pos.x));
                    assert!((10.0..=80.0).contains(&bubble.pos.y));
                    assert!((60.0..=80.0).contains(&bubble.size));
                    assert!((0.05..=0.15).contains(&bubble.speed.abs()));
                }
            }
        }
    }

    #[test]
    fn test_ids_unique_across_levels() {
        let mut generator = LevelGenerator::seeded(7, Tuning::default());
        let mut seen = HashSet::new();
        for _ in 0..20 {
            for bubble in generator.generate(DifficultyTier::Explorer).bubbles {
                assert!(seen.insert(bubble.id), "duplicate id {:?}", bubble.id);
            }
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = LevelGenerator::seeded(99999, Tuning::default());
        let mut b = LevelGenerator::seeded(99999, Tuning::default());
        for _ in 0..10 {
            assert_eq!(
                a.generate(DifficultyTier::MathMaster),
                b.generate(DifficultyTier::MathMaster)
            );
        }
    }

    #[test]
    fn test_largest_valid_factor_generates() {
        let tuning = Tuning::from_json(r#"{"math_master": {"max_factor": 65535, "time_budget_secs": 25}}"#)
            .unwrap();
        let mut generator = LevelGenerator::seeded(3, tuning);
        for _ in 0..50 {
            let level = generator.generate(DifficultyTier::MathMaster);
            assert_eq!(level.factors.0 * level.factors.1, level.target);
            assert!(level.values().iter().all(|&v| v <= 65538));
        }
    }

    #[test]
    fn test_level_from_values() {
        let mut generator = LevelGenerator::seeded(1, Tuning::default());
        let level = generator.level_from_values(12, (3, 4), &[3, 4, 7]);
        assert_eq!(level.target, 12);
        assert_eq!(level.values(), vec![3, 4, 7]);
    }
}
