//! Ball size tiers: radius and score per tier, smallest first.

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

/// One ball size and the score for merging two balls of that size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SizeTier {
    pub radius: f32,
    pub score: u32,
}

impl SizeTier {
    pub const fn new(radius: f32, score: u32) -> Self {
        Self { radius, score }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizeError {
    #[error("no size tier has radius {radius}")]
    UnknownSize { radius: f32 },
    #[error("size table has no tiers")]
    Empty,
    #[error("tier radii must strictly increase, got {previous} then {next}")]
    NotIncreasing { previous: f32, next: f32 },
}

const DEFAULT_TIERS: [SizeTier; 8] = [
    SizeTier::new(25.0, 10),
    SizeTier::new(35.0, 20),
    SizeTier::new(50.0, 40),
    SizeTier::new(60.0, 80),
    SizeTier::new(80.0, 160),
    SizeTier::new(100.0, 320),
    SizeTier::new(125.0, 640),
    SizeTier::new(150.0, 1280),
];

/// Ordered, non-empty list of tiers with strictly increasing radii.
/// Radii are matched exactly: every ball radius in play comes from this table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<SizeTier>")]
pub struct SizeTable {
    tiers: Vec<SizeTier>,
}

impl SizeTable {
    pub fn new(tiers: Vec<SizeTier>) -> Result<Self, SizeError> {
        if tiers.is_empty() {
            return Err(SizeError::Empty);
        }
        for pair in tiers.windows(2) {
            if pair[1].radius <= pair[0].radius {
                return Err(SizeError::NotIncreasing {
                    previous: pair[0].radius,
                    next: pair[1].radius,
                });
            }
        }
        Ok(Self { tiers })
    }

    pub fn index_of(&self, radius: f32) -> Option<usize> {
        self.tiers.iter().position(|t| t.radius == radius)
    }

    pub fn tier_of(&self, radius: f32) -> Result<SizeTier, SizeError> {
        self.index_of(radius)
            .map(|i| self.tiers[i])
            .ok_or(SizeError::UnknownSize { radius })
    }

    /// The tier one step larger. The largest tier and unknown radii wrap to the smallest.
    pub fn next_tier(&self, radius: f32) -> SizeTier {
        match self.index_of(radius) {
            Some(i) if i + 1 < self.tiers.len() => self.tiers[i + 1],
            _ => self.smallest(),
        }
    }

    /// Uniform pick among the smallest `max_fraction` of tiers (always at least one).
    pub fn random_spawn_tier<R: Rng + ?Sized>(&self, rng: &mut R, max_fraction: f32) -> SizeTier {
        let count = (self.tiers.len() as f32 * max_fraction.max(0.0)).floor() as usize;
        let count = count.clamp(1, self.tiers.len());
        self.tiers[rng.random_range(0..count)]
    }

    pub fn smallest(&self) -> SizeTier {
        self.tiers[0]
    }

    pub fn largest(&self) -> SizeTier {
        self.tiers[self.tiers.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SizeTier> {
        self.tiers.iter()
    }
}

impl TryFrom<Vec<SizeTier>> for SizeTable {
    type Error = SizeError;

    fn try_from(tiers: Vec<SizeTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl Default for SizeTable {
    fn default() -> Self {
        Self { tiers: DEFAULT_TIERS.to_vec() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn default_table_starts_at_25_scoring_10() {
        let table = SizeTable::default();
        assert_eq!(table.len(), 8);
        assert_eq!(table.smallest(), SizeTier::new(25.0, 10));
        assert_eq!(table.largest().radius, 150.0);
    }

    #[test]
    fn tier_of_is_exact() {
        let table = SizeTable::default();
        assert_eq!(table.tier_of(50.0), Ok(SizeTier::new(50.0, 40)));
        assert_eq!(table.tier_of(50.5), Err(SizeError::UnknownSize { radius: 50.5 }));
    }

    #[test]
    fn next_tier_wraps_for_largest_and_unknown() {
        let table = SizeTable::default();
        assert_eq!(table.next_tier(25.0).radius, 35.0);
        assert_eq!(table.next_tier(150.0).radius, 25.0);
        assert_eq!(table.next_tier(7.0).radius, 25.0);
    }

    #[test]
    fn rejects_bad_tables() {
        assert_eq!(SizeTable::new(vec![]), Err(SizeError::Empty));
        assert_eq!(
            SizeTable::new(vec![SizeTier::new(30.0, 1), SizeTier::new(30.0, 2)]),
            Err(SizeError::NotIncreasing { previous: 30.0, next: 30.0 })
        );
    }

    #[test]
    fn deserializes_with_validation() {
        let table: SizeTable =
            serde_json::from_str(r#"[{"radius":10,"score":1},{"radius":20,"score":3}]"#).unwrap();
        assert_eq!(table.next_tier(10.0), SizeTier::new(20.0, 3));

        let bad = serde_json::from_str::<SizeTable>(r#"[{"radius":20,"score":1},{"radius":10,"score":3}]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn spawn_tier_keeps_at_least_one_tier() {
        let table = SizeTable::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(table.random_spawn_tier(&mut rng, 0.0).radius, 25.0);
        }
    }

    proptest! {
        #[test]
        fn next_tier_grows_or_wraps(index in 0usize..8) {
            let table = SizeTable::default();
            let tier = table.iter().nth(index).copied().unwrap();
            let next = table.next_tier(tier.radius);
            if tier == table.largest() {
                prop_assert_eq!(next, table.smallest());
            } else {
                prop_assert!(next.radius > tier.radius);
                prop_assert_eq!(table.index_of(next.radius), Some(index + 1));
            }
        }

        #[test]
        fn spawn_tier_is_among_smallest_third(seed in any::<u64>()) {
            let table = SizeTable::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let tier = table.random_spawn_tier(&mut rng, 1.0 / 3.0);
            prop_assert!(tier.radius == 25.0 || tier.radius == 35.0);
        }
    }
}
