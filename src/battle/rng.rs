use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// The single source of every probabilistic decision in a battle.
///
/// Scripted outcomes are percentiles in `1..=100`. A chance check succeeds when
/// the percentile is within the chance; a range draw maps the percentile onto
/// the range from its low end. Seeded sources draw exactly.
#[derive(Debug, Clone)]
pub struct BattleRng {
    source: RngSource,
}

#[derive(Debug, Clone)]
enum RngSource {
    Seeded(StdRng),
    Scripted { outcomes: Vec<u8>, index: usize },
}

impl BattleRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Seeded(StdRng::from_os_rng()),
        }
    }

    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    /// Scripted outcomes not consumed yet. Seeded sources report `None`.
    pub fn remaining_scripted(&self) -> Option<usize> {
        match &self.source {
            RngSource::Seeded(_) => None,
            RngSource::Scripted { outcomes, index } => Some(outcomes.len() - index),
        }
    }

    fn next_percentile(&mut self, reason: &str) -> u32 {
        match &mut self.source {
            RngSource::Seeded(rng) => rng.random_range(1..=100),
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "BattleRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                }
                let outcome = outcomes[*index];
                *index += 1;
                u32::from(outcome.clamp(1, 100))
            }
        }
    }

    /// True with probability `chance / out_of`.
    pub fn roll_chance(&mut self, chance: u32, out_of: u32, reason: &str) -> bool {
        let hit = match &mut self.source {
            RngSource::Seeded(rng) => rng.random_range(0..out_of.max(1)) < chance,
            RngSource::Scripted { .. } => {
                let percentile = self.next_percentile(reason);
                u64::from(percentile) * u64::from(out_of) <= u64::from(chance) * 100
            }
        };
        trace!(reason, chance, out_of, hit, "rng chance");
        hit
    }

    /// Uniform integer in `min..=max`.
    pub fn random_int(&mut self, min: u32, max: u32, reason: &str) -> u32 {
        if max <= min {
            return min;
        }
        let value = match &mut self.source {
            RngSource::Seeded(rng) => rng.random_range(min..=max),
            RngSource::Scripted { .. } => {
                let percentile = self.next_percentile(reason);
                let span = max - min + 1;
                min + (percentile - 1) * span / 100
            }
        };
        trace!(reason, min, max, value, "rng int");
        value
    }

    pub fn random_index(&mut self, len: usize, reason: &str) -> usize {
        if len <= 1 {
            return 0;
        }
        self.random_int(0, (len - 1) as u32, reason) as usize
    }

    /// Uniform Fisher-Yates shuffle. Draws `len - 1` times.
    pub fn shuffle<T>(&mut self, items: &mut [T], reason: &str) {
        let len = items.len();
        if len < 2 {
            return;
        }
        for a in 0..len - 1 {
            let b = self.random_int(a as u32, (len - 1) as u32, reason) as usize;
            items.swap(a, b);
        }
    }
}
