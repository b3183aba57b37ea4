//! Aggregate statistics across the registry.

use serde::Serialize;

use std::collections::BTreeMap;

use persona_types::bot::Bot;
use persona_types::personality::{Factor, Score};

use crate::personality::analysis::Profile;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorStats {
    pub factor: Factor,
    pub min: Score,
    pub max: Score,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub total: usize,
    /// One entry per factor in canonical order; empty when there are no bots.
    pub factors: Vec<FactorStats>,
    pub profiles: BTreeMap<Profile, usize>,
}

pub fn registry_stats(bots: &[Bot]) -> RegistryStats {
    let mut profiles = BTreeMap::new();
    for bot in bots {
        *profiles.entry(Profile::of(&bot.personality)).or_insert(0) += 1;
    }

    let factors = if bots.is_empty() {
        Vec::new()
    } else {
        Factor::ALL
            .into_iter()
            .map(|factor| {
                let scores = bots.iter().map(|b| b.personality[factor]);
                let sum: u32 = scores.clone().map(|s| u32::from(s.value())).sum();
                FactorStats {
                    factor,
                    min: scores.clone().min().unwrap_or(Score::MIDPOINT),
                    max: scores.max().unwrap_or(Score::MIDPOINT),
                    mean: f64::from(sum) / bots.len() as f64,
                }
            })
            .collect()
    };

    RegistryStats {
        total: bots.len(),
        factors,
        profiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use persona_types::bot::BotId;
    use persona_types::personality::Personality;

    fn bot(personality: Personality) -> Bot {
        let now = Utc::now();
        Bot {
            id: BotId::new(),
            slug: "b".to_string(),
            name: "b".to_string(),
            personality,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_registry() {
        let stats = registry_stats(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.factors.is_empty());
        assert!(stats.profiles.is_empty());
    }

    #[test]
    fn test_min_max_mean() {
        let mut high = Personality::neutral();
        high.set(Factor::A, Score::new(9).unwrap());
        let mut low = Personality::neutral();
        low.set(Factor::A, Score::new(2).unwrap());

        let stats = registry_stats(&[bot(high), bot(low)]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.factors.len(), Factor::COUNT);

        let warmth = &stats.factors[0];
        assert_eq!(warmth.factor, Factor::A);
        assert_eq!(warmth.min.value(), 2);
        assert_eq!(warmth.max.value(), 9);
        assert!((warmth.mean - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_profile_distribution() {
        let extreme = Personality::from_fn(|_| Score::new(10).unwrap());
        let stats = registry_stats(&[bot(Personality::neutral()), bot(extreme), bot(extreme)]);
        assert_eq!(stats.profiles.get(&Profile::Balanced), Some(&1));
        assert_eq!(stats.profiles.get(&Profile::Extreme), Some(&2));
        assert_eq!(stats.profiles.get(&Profile::Specialized), None);
    }
}
