//! The persisted collection of bots.

use serde::{Deserialize, Serialize};

use std::collections::HashSet;

use crate::bot::{Bot, BotId};

/// On-disk document version written by this build.
pub const REGISTRY_FORMAT_VERSION: u32 = 1;

/// All managed bots, in insertion order.
///
/// Invariants: ids are unique and slugs are unique. [`Registry::validate`]
/// checks both after deserialization; the mutators below never break them
/// as long as callers pick unused slugs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Registry {
    #[serde(default = "default_version")]
    version: u32,
    bots: Vec<Bot>,
}

fn default_version() -> u32 {
    REGISTRY_FORMAT_VERSION
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            version: REGISTRY_FORMAT_VERSION,
            bots: Vec::new(),
        }
    }

    /// Build a registry from bots, rejecting duplicate ids or slugs.
    pub fn from_bots(bots: Vec<Bot>) -> Result<Self, String> {
        let registry = Self {
            version: REGISTRY_FORMAT_VERSION,
            bots,
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Check the format version and the uniqueness invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.version != REGISTRY_FORMAT_VERSION {
            return Err(format!(
                "unsupported registry version {} (expected {REGISTRY_FORMAT_VERSION})",
                self.version
            ));
        }

        let mut ids = HashSet::with_capacity(self.bots.len());
        let mut slugs = HashSet::with_capacity(self.bots.len());
        for bot in &self.bots {
            if !ids.insert(&bot.id) {
                return Err(format!("duplicate bot id {}", bot.id));
            }
            if !slugs.insert(bot.slug.as_str()) {
                return Err(format!("duplicate bot slug '{}'", bot.slug));
            }
        }
        Ok(())
    }

    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    pub fn get(&self, id: &BotId) -> Option<&Bot> {
        self.bots.iter().find(|b| &b.id == id)
    }

    pub fn get_mut(&mut self, id: &BotId) -> Option<&mut Bot> {
        self.bots.iter_mut().find(|b| &b.id == id)
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&Bot> {
        self.bots.iter().find(|b| b.slug == slug)
    }

    pub fn contains_slug(&self, slug: &str) -> bool {
        self.get_by_slug(slug).is_some()
    }

    /// Append a bot at the end of the insertion order.
    pub fn push(&mut self, bot: Bot) {
        self.bots.push(bot);
    }

    /// Remove a bot, preserving the order of the others.
    pub fn remove(&mut self, id: &BotId) -> Option<Bot> {
        let pos = self.bots.iter().position(|b| &b.id == id)?;
        Some(self.bots.remove(pos))
    }

    pub fn clear(&mut self) {
        self.bots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personality::Personality;
    use chrono::Utc;

    fn bot(slug: &str) -> Bot {
        let now = Utc::now();
        Bot {
            id: BotId::new(),
            slug: slug.to_string(),
            name: slug.to_string(),
            personality: Personality::neutral(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut registry = Registry::new();
        let (a, b, c) = (bot("a"), bot("b"), bot("c"));
        let b_id = b.id.clone();
        registry.push(a);
        registry.push(b);
        registry.push(c);

        let removed = registry.remove(&b_id).unwrap();
        assert_eq!(removed.slug, "b");
        let slugs: Vec<_> = registry.bots().iter().map(|b| b.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "c"]);
        assert!(registry.remove(&b_id).is_none());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let a = bot("a");
        let mut dup = bot("b");
        dup.id = a.id.clone();
        let err = Registry::from_bots(vec![a, dup]).unwrap_err();
        assert!(err.contains("duplicate bot id"));
    }

    #[test]
    fn test_validate_rejects_duplicate_slugs() {
        let err = Registry::from_bots(vec![bot("aria"), bot("aria")]).unwrap_err();
        assert!(err.contains("duplicate bot slug 'aria'"));
    }

    #[test]
    fn test_validate_rejects_unknown_version() {
        let registry: Registry = serde_json::from_str(r#"{"version": 9, "bots": []}"#).unwrap();
        assert!(registry.validate().is_err());
    }

    #[test]
    fn test_missing_version_defaults_to_v1() {
        let registry: Registry = serde_json::from_str(r#"{"bots": []}"#).unwrap();
        assert!(registry.is_empty());
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_missing_bots_key_is_rejected() {
        assert!(serde_json::from_str::<Registry>("{}").is_err());
        assert!(serde_json::from_str::<Registry>(r#"{"version": 1}"#).is_err());
    }

    #[test]
    fn test_misnamed_key_is_rejected() {
        let err = serde_json::from_str::<Registry>(r#"{"version": 1, "bot": []}"#).unwrap_err();
        assert!(err.to_string().contains("bot"), "{err}");
    }
}
