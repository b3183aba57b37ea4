//! Personality editing on top of [`BotRegistry`].
//!
//! Every operation validates its whole input before touching the bot, so a
//! rejected edit leaves the registry exactly as it was.

use chrono::Utc;
use rand::Rng;
use tracing::info;

use persona_types::bot::{Bot, BotId};
use persona_types::error::RegistryError;
use persona_types::personality::{Factor, Personality, Score};

use crate::personality::random_personality;
use crate::personality::template::Template;
use crate::repository::registry::RegistryStore;
use crate::service::registry::BotRegistry;

/// Parse a factor reference (code or trait name).
pub fn parse_factor(name: &str) -> Result<Factor, RegistryError> {
    name.parse::<Factor>()
        .map_err(|_| RegistryError::FactorNotFound(name.trim().to_string()))
}

/// Check a raw value against the 1..=10 range for `factor`.
pub fn checked_score(factor: Factor, value: i64) -> Result<Score, RegistryError> {
    Score::new(value).map_err(|_| RegistryError::OutOfRange { factor, value })
}

impl<S: RegistryStore> BotRegistry<S> {
    /// Set one factor on one bot and save.
    ///
    /// Checks, in order: the bot exists, the factor name is known, the value
    /// is in range. Nothing changes unless all three pass.
    pub async fn set_factor(
        &mut self,
        id: &BotId,
        factor_name: &str,
        value: i64,
    ) -> Result<Score, RegistryError> {
        self.get(id)?;
        let factor = parse_factor(factor_name)?;
        let score = checked_score(factor, value)?;

        let bot = self.bot_mut(id)?;
        bot.personality.set(factor, score);
        bot.updated_at = Utc::now();
        info!(bot_id = %id, %factor, value = score.value(), "set factor");

        self.commit().await?;
        Ok(score)
    }

    /// Set several factors with a single save. Any invalid entry rejects the
    /// whole batch.
    pub async fn set_factors(
        &mut self,
        id: &BotId,
        values: &[(Factor, i64)],
    ) -> Result<Bot, RegistryError> {
        self.get(id)?;
        let scores = values
            .iter()
            .map(|&(factor, value)| checked_score(factor, value).map(|score| (factor, score)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut personality = self.get(id)?.personality;
        for (factor, score) in scores {
            personality.set(factor, score);
        }
        self.set_personality(id, personality).await
    }

    /// Replace a bot's whole personality.
    pub async fn set_personality(
        &mut self,
        id: &BotId,
        personality: Personality,
    ) -> Result<Bot, RegistryError> {
        let bot = self.bot_mut(id)?;
        bot.personality = personality;
        bot.updated_at = Utc::now();
        let bot = bot.clone();
        self.commit().await?;
        Ok(bot)
    }

    /// Overwrite a bot's personality with a template's.
    pub async fn apply_template(
        &mut self,
        id: &BotId,
        template: Template,
    ) -> Result<Bot, RegistryError> {
        info!(bot_id = %id, %template, "applying template");
        self.set_personality(id, template.personality()).await
    }

    /// Give a bot a uniformly random personality.
    pub async fn randomize<R: Rng + ?Sized>(
        &mut self,
        id: &BotId,
        rng: &mut R,
    ) -> Result<Bot, RegistryError> {
        self.get(id)?;
        let personality = random_personality(rng);
        info!(bot_id = %id, "randomized personality");
        self.set_personality(id, personality).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;
    use persona_types::bot::CreateBotRequest;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    async fn setup() -> (MemoryStore, BotRegistry<MemoryStore>, Bot) {
        let store = MemoryStore::new();
        let mut registry = BotRegistry::open(store.clone()).await.unwrap();
        let bot = registry.create(CreateBotRequest::named("Aria")).await.unwrap();
        (store, registry, bot)
    }

    #[tokio::test]
    async fn test_set_factor_by_name_and_code() {
        let (store, mut registry, bot) = setup().await;

        registry.set_factor(&bot.id, "Warmth", 8).await.unwrap();
        registry.set_factor(&bot.id, "q4", 2).await.unwrap();

        let saved = store.saved().unwrap();
        let saved_bot = saved.get(&bot.id).unwrap();
        assert_eq!(saved_bot.personality[Factor::A].value(), 8);
        assert_eq!(saved_bot.personality[Factor::Q4].value(), 2);
        for (factor, score) in saved_bot.personality.iter() {
            if factor != Factor::A && factor != Factor::Q4 {
                assert_eq!(score, Score::MIDPOINT, "{factor} changed");
            }
        }
    }

    #[tokio::test]
    async fn test_set_factor_out_of_range_changes_nothing() {
        let (store, mut registry, bot) = setup().await;
        let saves = store.save_count();

        for value in [0, 11, -3] {
            let err = registry.set_factor(&bot.id, "Warmth", value).await.unwrap_err();
            assert!(matches!(
                err,
                RegistryError::OutOfRange { factor: Factor::A, value: v } if v == value
            ));
        }
        assert_eq!(registry.get(&bot.id).unwrap().personality, Personality::neutral());
        assert_eq!(store.save_count(), saves);
    }

    #[tokio::test]
    async fn test_set_factor_unknown_factor() {
        let (_store, mut registry, bot) = setup().await;
        let err = registry.set_factor(&bot.id, "Charisma", 5).await.unwrap_err();
        assert!(matches!(err, RegistryError::FactorNotFound(ref f) if f == "Charisma"));
    }

    #[tokio::test]
    async fn test_set_factor_unknown_bot_checked_first() {
        let (_store, mut registry, _bot) = setup().await;
        let err = registry
            .set_factor(&BotId::new(), "Charisma", 99)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::BotNotFound(_)));
    }

    #[tokio::test]
    async fn test_set_factor_bounds_accepted() {
        let (_store, mut registry, bot) = setup().await;
        assert_eq!(registry.set_factor(&bot.id, "B", 1).await.unwrap().value(), 1);
        assert_eq!(registry.set_factor(&bot.id, "B", 10).await.unwrap().value(), 10);
    }

    #[tokio::test]
    async fn test_set_factors_is_all_or_nothing() {
        let (store, mut registry, bot) = setup().await;
        let saves = store.save_count();

        let err = registry
            .set_factors(&bot.id, &[(Factor::A, 9), (Factor::E, 42)])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::OutOfRange { factor: Factor::E, .. }));
        assert_eq!(registry.get(&bot.id).unwrap().personality, Personality::neutral());

        let updated = registry
            .set_factors(&bot.id, &[(Factor::A, 9), (Factor::E, 2)])
            .await
            .unwrap();
        assert_eq!(updated.personality[Factor::A].value(), 9);
        assert_eq!(updated.personality[Factor::E].value(), 2);
        assert_eq!(store.save_count(), saves + 1);
    }

    #[tokio::test]
    async fn test_apply_template() {
        let (_store, mut registry, bot) = setup().await;
        let updated = registry.apply_template(&bot.id, Template::Leader).await.unwrap();
        assert_eq!(updated.personality, Template::Leader.personality());
    }

    #[tokio::test]
    async fn test_randomize_is_seeded() {
        let (_store, mut registry, bot) = setup().await;
        let updated = registry
            .randomize(&bot.id, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();
        let expected = random_personality(&mut StdRng::seed_from_u64(3));
        assert_eq!(updated.personality, expected);
    }

    #[tokio::test]
    async fn test_edit_write_failure_keeps_change() {
        let (store, mut registry, bot) = setup().await;
        store.fail_writes(true);

        let err = registry.set_factor(&bot.id, "A", 7).await.unwrap_err();
        assert!(matches!(err, RegistryError::WriteError(_)));
        assert_eq!(registry.get(&bot.id).unwrap().personality[Factor::A].value(), 7);
        assert!(registry.is_dirty());
    }
}
