//! Review decision policy.
//!
//! A decision draws one uniform sample `u` in `[0, 1)` and flags the packet
//! when `u < flag_rate`. Decisions are independent of each other; the policy
//! keeps no memory beyond its random source.
//!
//! The random source is injectable so tests can script exact outcomes.

use std::collections::VecDeque;

use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::packet::Verdict;

/// A source of uniform samples in `[0, 1)`.
pub trait RandomSource: Send {
    /// Returns the next sample.
    fn next_unit(&mut self) -> f64;
}

/// ChaCha-backed random source, reproducible when seeded.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    /// Creates a source from a seed, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed sequence of samples, cycling when exhausted.
///
/// An empty script always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    samples: VecDeque<f64>,
}

impl ScriptedSource {
    /// Creates a source that replays `samples` in order.
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    /// A source whose every sample flags under any positive flag rate.
    pub fn always_flag() -> Self {
        Self::new([0.0])
    }

    /// A source whose every sample verifies under any flag rate below one.
    pub fn always_verify() -> Self {
        Self::new([0.999_999])
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        match self.samples.pop_front() {
            Some(sample) => {
                self.samples.push_back(sample);
                sample
            }
            None => 0.0,
        }
    }
}

/// Classifies packets leaving review.
pub struct DecisionPolicy {
    flag_rate: f64,
    source: Box<dyn RandomSource>,
}

impl DecisionPolicy {
    /// Creates a policy with the given flag probability and random source.
    pub fn new(flag_rate: f64, source: Box<dyn RandomSource>) -> Self {
        Self { flag_rate, source }
    }

    /// Creates a policy backed by a [`SeededSource`].
    pub fn seeded(flag_rate: f64, seed: Option<u64>) -> Self {
        Self::new(flag_rate, Box::new(SeededSource::new(seed)))
    }

    /// Returns the configured flag probability.
    pub fn flag_rate(&self) -> f64 {
        self.flag_rate
    }

    /// Draws one sample and returns the verdict.
    pub fn decide(&mut self) -> Verdict {
        classify(self.source.next_unit(), self.flag_rate)
    }
}

impl std::fmt::Debug for DecisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionPolicy")
            .field("flag_rate", &self.flag_rate)
            .finish_non_exhaustive()
    }
}

/// Maps one uniform sample to a verdict.
pub fn classify(sample: f64, flag_rate: f64) -> Verdict {
    if sample < flag_rate {
        Verdict::Flagged
    } else {
        Verdict::Verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_threshold() {
        assert_eq!(classify(0.0, 0.25), Verdict::Flagged);
        assert_eq!(classify(0.2499, 0.25), Verdict::Flagged);
        assert_eq!(classify(0.25, 0.25), Verdict::Verified);
        assert_eq!(classify(0.9, 0.25), Verdict::Verified);
        assert_eq!(classify(0.0, 0.0), Verdict::Verified);
        assert_eq!(classify(0.999, 1.0), Verdict::Flagged);
    }

    #[test]
    fn test_scripted_source_cycles() {
        let mut source = ScriptedSource::new([0.1, 0.7]);
        assert_eq!(source.next_unit(), 0.1);
        assert_eq!(source.next_unit(), 0.7);
        assert_eq!(source.next_unit(), 0.1);

        let mut empty = ScriptedSource::default();
        assert_eq!(empty.next_unit(), 0.0);
    }

    #[test]
    fn test_scripted_policy_outcomes() {
        let mut policy = DecisionPolicy::new(0.25, Box::new(ScriptedSource::new([0.1, 0.5, 0.3])));
        assert_eq!(policy.decide(), Verdict::Flagged);
        assert_eq!(policy.decide(), Verdict::Verified);
        assert_eq!(policy.decide(), Verdict::Verified);

        let mut flagging = DecisionPolicy::new(0.25, Box::new(ScriptedSource::always_flag()));
        let mut verifying = DecisionPolicy::new(0.25, Box::new(ScriptedSource::always_verify()));
        for _ in 0..10 {
            assert_eq!(flagging.decide(), Verdict::Flagged);
            assert_eq!(verifying.decide(), Verdict::Verified);
        }
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = SeededSource::new(Some(42));
        let mut b = SeededSource::new(Some(42));
        for _ in 0..100 {
            let sample = a.next_unit();
            assert!((0.0..1.0).contains(&sample));
            assert_eq!(sample, b.next_unit());
        }
    }

    #[test]
    fn test_flag_fraction_converges() {
        const N: usize = 20_000;
        let mut policy = DecisionPolicy::seeded(0.25, Some(7));
        let flagged = (0..N)
            .filter(|_| policy.decide() == Verdict::Flagged)
            .count();

        let fraction = flagged as f64 / N as f64;
        // Four standard errors of a Bernoulli(0.25) mean.
        let tolerance = 4.0 * (0.25_f64 * 0.75 / N as f64).sqrt();
        assert!(
            (fraction - 0.25).abs() < tolerance,
            "flagged fraction {} outside 0.25 +/- {}",
            fraction,
            tolerance
        );
    }

    #[test]
    fn test_decisions_are_memoryless() {
        // The flag rate after a flag equals the flag rate after a verify.
        const N: usize = 40_000;
        let mut policy = DecisionPolicy::seeded(0.25, Some(11));
        let outcomes: Vec<Verdict> = (0..N).map(|_| policy.decide()).collect();

        let (mut after_flag, mut flag_after_flag) = (0usize, 0usize);
        let (mut after_verify, mut flag_after_verify) = (0usize, 0usize);
        for pair in outcomes.windows(2) {
            let next_flagged = pair[1] == Verdict::Flagged;
            match pair[0] {
                Verdict::Flagged => {
                    after_flag += 1;
                    flag_after_flag += next_flagged as usize;
                }
                Verdict::Verified => {
                    after_verify += 1;
                    flag_after_verify += next_flagged as usize;
                }
            }
        }

        let p_flag = flag_after_flag as f64 / after_flag as f64;
        let p_verify = flag_after_verify as f64 / after_verify as f64;
        let tolerance = 4.0 * (0.25_f64 * 0.75 / after_flag as f64).sqrt();
        assert!(
            (p_flag - p_verify).abs() < tolerance,
            "conditional rates differ: {} vs {}",
            p_flag,
            p_verify
        );
    }
}
