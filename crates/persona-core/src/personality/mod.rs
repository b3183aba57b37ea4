//! Personality model logic: templates, randomization, comparison, analysis.

pub mod analysis;
pub mod template;

use rand::Rng;

use persona_types::personality::{Factor, Personality, Score};

/// Draw every factor uniformly from 1..=10.
pub fn random_personality<R: Rng + ?Sized>(rng: &mut R) -> Personality {
    Personality::from_fn(|_| {
        Score::clamped(i64::from(rng.gen_range(Score::MIN..=Score::MAX)))
    })
}

/// Unweighted profile similarity in [0.0, 1.0].
///
/// `1 - mean(|d_a - d_b|) / 2`, where `d` is each score's deviation. Identical
/// profiles score 1.0; all-1 against all-10 scores 0.0.
pub fn similarity(a: &Personality, b: &Personality) -> f64 {
    let total: f64 = Factor::ALL
        .into_iter()
        .map(|f| (a[f].deviation() - b[f].deviation()).abs())
        .sum();
    1.0 - (total / Factor::COUNT as f64) / 2.0
}

/// Weighted sum of deviations, clamped to [-1.0, 1.0].
pub(crate) fn weighted(personality: &Personality, weights: &[(Factor, f64)]) -> f64 {
    weights
        .iter()
        .map(|&(factor, weight)| personality[factor].deviation() * weight)
        .sum::<f64>()
        .clamp(-1.0, 1.0)
}
