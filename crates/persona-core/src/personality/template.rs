//! Predefined personality templates.
//!
//! Each template raises or lowers a handful of factors and leaves the rest at
//! the midpoint.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use persona_types::personality::{Factor, Personality, Score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Neutral,
    Leader,
    Creative,
    Analytical,
    Social,
    Reserved,
    Adventurous,
    Cautious,
}

impl Template {
    pub const ALL: [Template; 8] = [
        Template::Neutral,
        Template::Leader,
        Template::Creative,
        Template::Analytical,
        Template::Social,
        Template::Reserved,
        Template::Adventurous,
        Template::Cautious,
    ];

    pub fn summary(self) -> &'static str {
        match self {
            Template::Neutral => "every factor at the midpoint",
            Template::Leader => "warm, dominant, bold, self-reliant and exacting",
            Template::Creative => "abstract, imaginative, lively and open to change",
            Template::Analytical => "abstract, rule-conscious and perfectionistic",
            Template::Social => "warm, lively, bold and group-oriented",
            Template::Reserved => "reserved, serious, shy and private",
            Template::Adventurous => "bold, lively, dominant and open to change",
            Template::Cautious => "shy, vigilant, apprehensive and rule-conscious",
        }
    }

    /// Factors this template moves away from the midpoint.
    fn overrides(self) -> &'static [(Factor, i64)] {
        match self {
            Template::Neutral => &[],
            Template::Leader => &[
                (Factor::A, 9),
                (Factor::E, 9),
                (Factor::H, 9),
                (Factor::L, 7),
                (Factor::O, 3),
                (Factor::Q2, 8),
                (Factor::Q3, 9),
            ],
            Template::Creative => &[
                (Factor::B, 9),
                (Factor::M, 9),
                (Factor::Q1, 9),
                (Factor::F, 8),
            ],
            Template::Analytical => &[
                (Factor::B, 9),
                (Factor::G, 9),
                (Factor::Q3, 9),
                (Factor::M, 8),
            ],
            Template::Social => &[
                (Factor::A, 9),
                (Factor::F, 9),
                (Factor::H, 9),
                (Factor::Q2, 3),
            ],
            Template::Reserved => &[
                (Factor::A, 3),
                (Factor::F, 4),
                (Factor::H, 3),
                (Factor::N, 8),
            ],
            Template::Adventurous => &[
                (Factor::H, 9),
                (Factor::F, 9),
                (Factor::Q1, 9),
                (Factor::E, 8),
            ],
            Template::Cautious => &[
                (Factor::H, 3),
                (Factor::L, 8),
                (Factor::O, 8),
                (Factor::F, 4),
                (Factor::G, 9),
            ],
        }
    }

    pub fn personality(self) -> Personality {
        let mut personality = Personality::neutral();
        for &(factor, value) in self.overrides() {
            personality.set(factor, Score::clamped(value));
        }
        personality
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Template::Neutral => "neutral",
            Template::Leader => "leader",
            Template::Creative => "creative",
            Template::Analytical => "analytical",
            Template::Social => "social",
            Template::Reserved => "reserved",
            Template::Adventurous => "adventurous",
            Template::Cautious => "cautious",
        };
        f.write_str(s)
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Template::ALL
            .into_iter()
            .find(|t| t.to_string() == wanted)
            .ok_or_else(|| format!("invalid template: '{s}'"))
    }
}
