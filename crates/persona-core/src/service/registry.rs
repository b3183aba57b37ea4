//! Bot registry service.
//!
//! Owns the in-memory [`Registry`] and the store behind it. Every mutation is
//! written through the store before the call returns. When a write fails the
//! mutation stays in memory, the registry is marked dirty, and
//! [`BotRegistry::flush`] can retry.

use chrono::Utc;
use tracing::{debug, info, warn};

use persona_types::bot::{Bot, BotId, CreateBotRequest, slugify};
use persona_types::error::RegistryError;
use persona_types::personality::{Factor, Personality, Score};
use persona_types::registry::Registry;

use crate::personality::similarity;
use crate::repository::registry::RegistryStore;
use crate::service::transfer::ImportedBot;

/// A bot that passed a similarity query, with its score.
#[derive(Debug, Clone)]
pub struct SimilarBot<'a> {
    pub bot: &'a Bot,
    pub similarity: f64,
}

/// Service orchestrating the bot lifecycle.
///
/// Generic over the store trait to maintain clean architecture --
/// persona-core never depends on persona-infra.
pub struct BotRegistry<S: RegistryStore> {
    store: S,
    registry: Registry,
    default_personality: Personality,
    dirty: bool,
}

impl<S: RegistryStore> BotRegistry<S> {
    /// Load the registry from `store`.
    ///
    /// Fails with `StorageUnavailable` when the store exists but cannot be
    /// read; an absent store yields an empty registry.
    pub async fn open(store: S) -> Result<Self, RegistryError> {
        let registry = store.load().await?;
        info!(bots = registry.len(), "registry loaded");
        Ok(Self {
            store,
            registry,
            default_personality: Personality::neutral(),
            dirty: false,
        })
    }

    /// Personality given to bots created without one.
    pub fn with_default_personality(mut self, personality: Personality) -> Self {
        self.default_personality = personality;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// All bots, in insertion order.
    pub fn list(&self) -> &[Bot] {
        self.registry.bots()
    }

    pub fn get(&self, id: &BotId) -> Result<&Bot, RegistryError> {
        self.registry
            .get(id)
            .ok_or_else(|| RegistryError::BotNotFound(id.to_string()))
    }

    /// Look a bot up by id, falling back to slug.
    pub fn resolve(&self, reference: &str) -> Result<&Bot, RegistryError> {
        let reference = reference.trim();
        let by_id = reference
            .parse::<BotId>()
            .ok()
            .and_then(|id| self.registry.get(&id));
        by_id
            .or_else(|| self.registry.get_by_slug(reference))
            .ok_or_else(|| RegistryError::BotNotFound(reference.to_string()))
    }

    /// True when the last save failed and memory is ahead of the store.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Retry saving after a `WriteError`. A no-op when nothing is pending.
    pub async fn flush(&mut self) -> Result<(), RegistryError> {
        if !self.dirty {
            return Ok(());
        }
        self.commit().await
    }

    /// Create a bot with a fresh id and a unique slug.
    pub async fn create(&mut self, request: CreateBotRequest) -> Result<Bot, RegistryError> {
        let name = validate_name(&request.name)?;
        let personality = request.personality.unwrap_or(self.default_personality);
        let bot = self.insert(name, personality)?;
        info!(bot_id = %bot.id, slug = %bot.slug, "created bot");
        self.commit().await?;
        Ok(bot)
    }

    /// Remove a bot. Unknown ids fail with `BotNotFound` and change nothing.
    pub async fn delete(&mut self, id: &BotId) -> Result<Bot, RegistryError> {
        let removed = self
            .registry
            .remove(id)
            .ok_or_else(|| RegistryError::BotNotFound(id.to_string()))?;
        info!(bot_id = %removed.id, slug = %removed.slug, "deleted bot");
        self.commit().await?;
        Ok(removed)
    }

    /// Change a bot's display name. The slug is kept so existing references
    /// keep working.
    pub async fn rename(&mut self, id: &BotId, name: &str) -> Result<Bot, RegistryError> {
        let name = validate_name(name)?;
        let bot = self
            .registry
            .get_mut(id)
            .ok_or_else(|| RegistryError::BotNotFound(id.to_string()))?;
        bot.name = name;
        bot.updated_at = Utc::now();
        let bot = bot.clone();
        self.commit().await?;
        Ok(bot)
    }

    /// Copy a bot's personality into a new bot named "<name> (Clone)".
    pub async fn clone_bot(&mut self, id: &BotId) -> Result<Bot, RegistryError> {
        let source = self.get(id)?;
        let name = format!("{} (Clone)", source.name);
        let personality = source.personality;
        let clone = self.insert(name, personality)?;
        info!(source = %id, bot_id = %clone.id, "cloned bot");
        self.commit().await?;
        Ok(clone)
    }

    /// Remove every bot. Returns how many were removed.
    pub async fn clear(&mut self) -> Result<usize, RegistryError> {
        let count = self.registry.len();
        self.registry.clear();
        info!(count, "cleared registry");
        self.commit().await?;
        Ok(count)
    }

    /// Swap in a whole registry (used when restoring a backup). A snapshot
    /// that breaks the uniqueness invariants is rejected as `InvalidImport`.
    pub async fn replace(&mut self, registry: Registry) -> Result<(), RegistryError> {
        registry
            .validate()
            .map_err(|e| RegistryError::InvalidImport(format!("invalid snapshot: {e}")))?;
        self.registry = registry;
        info!(bots = self.registry.len(), "replaced registry");
        self.commit().await
    }

    /// Add several bots with one save. Names are validated up front, so an
    /// invalid entry leaves the registry untouched.
    pub async fn import_bots(
        &mut self,
        entries: Vec<ImportedBot>,
    ) -> Result<Vec<Bot>, RegistryError> {
        let validated = entries
            .into_iter()
            .map(|entry| -> Result<_, RegistryError> {
                Ok((validate_name(&entry.name)?, entry.personality))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut created = Vec::with_capacity(validated.len());
        for (name, personality) in validated {
            created.push(self.insert(name, personality)?);
        }
        info!(count = created.len(), "imported bots");
        self.commit().await?;
        Ok(created)
    }

    /// Bots scoring at least `minimum` on every listed factor.
    pub fn find_by_traits(&self, minimums: &[(Factor, Score)]) -> Vec<&Bot> {
        self.list()
            .iter()
            .filter(|bot| {
                minimums
                    .iter()
                    .all(|&(factor, minimum)| bot.personality[factor] >= minimum)
            })
            .collect()
    }

    /// Other bots whose profile similarity to `id` is at least `threshold`,
    /// most similar first.
    pub fn similar_to(
        &self,
        id: &BotId,
        threshold: f64,
    ) -> Result<Vec<SimilarBot<'_>>, RegistryError> {
        let reference = self.get(id)?;
        let mut matches: Vec<SimilarBot<'_>> = self
            .list()
            .iter()
            .filter(|bot| bot.id != reference.id)
            .map(|bot| SimilarBot {
                bot,
                similarity: similarity(&reference.personality, &bot.personality),
            })
            .filter(|m| m.similarity >= threshold)
            .collect();
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        Ok(matches)
    }

    /// Mutable access for the editor operations.
    pub(crate) fn bot_mut(&mut self, id: &BotId) -> Result<&mut Bot, RegistryError> {
        self.registry
            .get_mut(id)
            .ok_or_else(|| RegistryError::BotNotFound(id.to_string()))
    }

    /// Save the current state, tracking whether memory is ahead of disk.
    pub(crate) async fn commit(&mut self) -> Result<(), RegistryError> {
        match self.store.save(&self.registry).await {
            Ok(()) => {
                self.dirty = false;
                debug!(bots = self.registry.len(), "registry saved");
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                warn!(error = %err, "registry save failed; changes kept in memory");
                Err(err.into())
            }
        }
    }

    fn insert(&mut self, name: String, personality: Personality) -> Result<Bot, RegistryError> {
        let slug = self.unique_slug(&name)?;
        let now = Utc::now();
        let bot = Bot {
            id: BotId::new(),
            slug,
            name,
            personality,
            created_at: now,
            updated_at: now,
        };
        self.registry.push(bot.clone());
        Ok(bot)
    }

    /// Derive a slug from `name`, appending -2, -3, etc. if it is taken.
    fn unique_slug(&self, name: &str) -> Result<String, RegistryError> {
        let base = slugify(name);
        if base.is_empty() {
            return Err(RegistryError::InvalidName(
                "name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let mut slug = base.clone();
        let mut counter = 2;
        while self.registry.contains_slug(&slug) {
            slug = format!("{base}-{counter}");
            counter += 1;
        }
        Ok(slug)
    }
}

/// Trim a display name and reject names with no alphanumeric content.
fn validate_name(name: &str) -> Result<String, RegistryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RegistryError::InvalidName("name cannot be empty".to_string()));
    }
    if !name.chars().any(char::is_alphanumeric) {
        return Err(RegistryError::InvalidName(
            "name must contain at least one alphanumeric character".to_string(),
        ));
    }
    Ok(name.to_string())
}
