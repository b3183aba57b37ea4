use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::personality::Personality;

/// Unique identifier for a bot, wrapping a UUID v7 (time-sortable).
///
/// Every created, cloned, or imported bot gets a fresh id, so an id is never
/// handed out twice, including after the original bot is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotId(pub Uuid);

impl BotId {
    /// Create a new BotId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for BotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BotId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A managed bot and the personality it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: BotId,
    /// URL-safe handle derived from the name ("Research Assistant" -> "research-assistant").
    /// Unique within a registry.
    pub slug: String,
    /// Freeform display name (duplicates allowed across bots).
    pub name: String,
    pub personality: Personality,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new bot. Only `name` is required; the personality
/// defaults to the registry's configured default.
#[derive(Debug, Clone, Default)]
pub struct CreateBotRequest {
    pub name: String,
    pub personality: Option<Personality>,
}

impl CreateBotRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            personality: None,
        }
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = Some(personality);
        self
    }
}

/// Generate a URL-safe slug from a display name.
///
/// Lowercases, turns every run of non-alphanumeric characters into a single
/// hyphen, and trims hyphens from both ends.
///
/// # Examples
///
/// ```
/// use persona_types::bot::slugify;
///
/// assert_eq!(slugify("Research Assistant"), "research-assistant");
/// assert_eq!(slugify("My  Cool  Bot!"), "my-cool-bot");
/// assert_eq!(slugify("---hello---world---"), "hello-world");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Research Assistant"), "research-assistant");
    }

    #[test]
    fn test_slugify_special_chars() {
        assert_eq!(slugify("My  Cool  Bot!"), "my-cool-bot");
    }

    #[test]
    fn test_slugify_leading_trailing() {
        assert_eq!(slugify("---hello---world---"), "hello-world");
    }

    #[test]
    fn test_slugify_numbers() {
        assert_eq!(slugify("Bot v2.0"), "bot-v2-0");
    }

    #[test]
    fn test_slugify_no_alphanumerics() {
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn test_bot_id_display_parse() {
        let id = BotId::new();
        let parsed: BotId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_bot_ids_are_distinct() {
        let a = BotId::new();
        let b = BotId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_bot_serde_shape() {
        let now = Utc::now();
        let bot = Bot {
            id: BotId::new(),
            slug: "aria".to_string(),
            name: "Aria".to_string(),
            personality: Personality::neutral(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&bot).unwrap();
        assert_eq!(json["id"], bot.id.to_string());
        assert_eq!(json["personality"]["Q3"], 5);

        let parsed: Bot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, bot);
    }
}
