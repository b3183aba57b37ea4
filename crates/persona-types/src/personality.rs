//! The Cattell 16PF personality model.
//!
//! A [`Personality`] holds exactly one sten [`Score`] (1-10) for each of the
//! sixteen [`Factor`]s. The fixed array representation makes a missing or
//! duplicated factor unrepresentable in memory; the serde impls enforce the
//! same on the wire.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::error::ScoreOutOfRange;

/// One of the sixteen primary factors of the 16PF model.
///
/// Variants are declared in canonical order; `factor as usize` is the index
/// into [`Personality`]'s score array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Factor {
    A,
    B,
    C,
    E,
    F,
    G,
    H,
    I,
    L,
    M,
    N,
    O,
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Factor {
    pub const COUNT: usize = 16;

    /// All factors in canonical order.
    pub const ALL: [Factor; Factor::COUNT] = [
        Factor::A,
        Factor::B,
        Factor::C,
        Factor::E,
        Factor::F,
        Factor::G,
        Factor::H,
        Factor::I,
        Factor::L,
        Factor::M,
        Factor::N,
        Factor::O,
        Factor::Q1,
        Factor::Q2,
        Factor::Q3,
        Factor::Q4,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Factor::A => "A",
            Factor::B => "B",
            Factor::C => "C",
            Factor::E => "E",
            Factor::F => "F",
            Factor::G => "G",
            Factor::H => "H",
            Factor::I => "I",
            Factor::L => "L",
            Factor::M => "M",
            Factor::N => "N",
            Factor::O => "O",
            Factor::Q1 => "Q1",
            Factor::Q2 => "Q2",
            Factor::Q3 => "Q3",
            Factor::Q4 => "Q4",
        }
    }

    /// Trait name, e.g. "Warmth" for A.
    pub fn name(self) -> &'static str {
        self.labels().0
    }

    /// Label for the low end of the scale (scores 1-4).
    pub fn low_pole(self) -> &'static str {
        self.labels().1
    }

    /// Label for the high end of the scale (scores 7-10).
    pub fn high_pole(self) -> &'static str {
        self.labels().2
    }

    fn labels(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Factor::A => ("Warmth", "Reserved", "Warm"),
            Factor::B => ("Reasoning", "Concrete", "Abstract"),
            Factor::C => ("Emotional Stability", "Reactive", "Stable"),
            Factor::E => ("Dominance", "Deferential", "Dominant"),
            Factor::F => ("Liveliness", "Serious", "Lively"),
            Factor::G => ("Rule-Consciousness", "Expedient", "Rule-conscious"),
            Factor::H => ("Social Boldness", "Shy", "Bold"),
            Factor::I => ("Sensitivity", "Utilitarian", "Sensitive"),
            Factor::L => ("Vigilance", "Trusting", "Vigilant"),
            Factor::M => ("Abstractedness", "Practical", "Imaginative"),
            Factor::N => ("Privateness", "Forthright", "Private"),
            Factor::O => ("Apprehension", "Self-assured", "Apprehensive"),
            Factor::Q1 => ("Openness to Change", "Traditional", "Open to change"),
            Factor::Q2 => ("Self-Reliance", "Group-oriented", "Self-reliant"),
            Factor::Q3 => ("Perfectionism", "Flexible", "Perfectionistic"),
            Factor::Q4 => ("Tension", "Relaxed", "Tense"),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parses a factor from its code (`"q1"`) or its trait name (`"social boldness"`),
/// ignoring case, spaces, and punctuation.
impl FromStr for Factor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        if wanted.is_empty() {
            return Err(format!("invalid factor: '{s}'"));
        }
        Factor::ALL
            .into_iter()
            .find(|f| normalize(f.code()) == wanted || normalize(f.name()) == wanted)
            .ok_or_else(|| format!("invalid factor: '{s}'"))
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A sten (standard ten) score: an integer from 1 to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Default score for every factor of a new personality.
    pub const MIDPOINT: Score = Score(5);

    /// Validate a raw value against the 1..=10 range.
    pub fn new(value: i64) -> Result<Self, ScoreOutOfRange> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ScoreOutOfRange(value))
        }
    }

    /// Saturate a raw value into range instead of rejecting it.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Position on a symmetric [-1.0, 1.0] axis centred on 5.5.
    ///
    /// Score 1 maps to -1.0 and 10 maps to 1.0. Analysis weights and
    /// thresholds are expressed on this axis.
    pub fn deviation(self) -> f64 {
        (f64::from(self.0) - 5.5) / 4.5
    }

    pub fn band(self) -> Band {
        Band::of(self)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::MIDPOINT
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Score::new(raw).map_err(de::Error::custom)
    }
}

/// Five descriptive bands over the sten scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// 1-2
    VeryLow,
    /// 3-4
    Low,
    /// 5-6
    Average,
    /// 7-8
    High,
    /// 9-10
    VeryHigh,
}

impl Band {
    pub const ALL: [Band; 5] = [
        Band::VeryLow,
        Band::Low,
        Band::Average,
        Band::High,
        Band::VeryHigh,
    ];

    pub fn of(score: Score) -> Self {
        match score.value() {
            1..=2 => Band::VeryLow,
            3..=4 => Band::Low,
            5..=6 => Band::Average,
            7..=8 => Band::High,
            _ => Band::VeryHigh,
        }
    }

    /// Human label for a factor in this band, e.g. "Very Warm" or "Shy".
    pub fn describe(self, factor: Factor) -> String {
        match self {
            Band::VeryLow => format!("Very {}", factor.low_pole().to_lowercase()),
            Band::Low => factor.low_pole().to_string(),
            Band::Average => "Average".to_string(),
            Band::High => factor.high_pole().to_string(),
            Band::VeryHigh => format!("Very {}", factor.high_pole().to_lowercase()),
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Band::VeryLow => "very low",
            Band::Low => "low",
            Band::Average => "average",
            Band::High => "high",
            Band::VeryHigh => "very high",
        };
        f.write_str(s)
    }
}

/// A complete 16PF profile: one score per factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Personality {
    scores: [Score; Factor::COUNT],
}

impl Personality {
    /// Every factor at the midpoint.
    pub fn neutral() -> Self {
        Self {
            scores: [Score::MIDPOINT; Factor::COUNT],
        }
    }

    /// Build a personality by computing each factor's score.
    pub fn from_fn(mut f: impl FnMut(Factor) -> Score) -> Self {
        let mut personality = Self::neutral();
        for factor in Factor::ALL {
            personality.set(factor, f(factor));
        }
        personality
    }

    pub fn get(&self, factor: Factor) -> Score {
        self.scores[factor.index()]
    }

    pub fn set(&mut self, factor: Factor, score: Score) {
        self.scores[factor.index()] = score;
    }

    /// Factor/score pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Factor, Score)> + '_ {
        Factor::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Index<Factor> for Personality {
    type Output = Score;

    fn index(&self, factor: Factor) -> &Score {
        &self.scores[factor.index()]
    }
}

impl Serialize for Personality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Factor::COUNT))?;
        for (factor, score) in self.iter() {
            map.serialize_entry(&factor, &score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Personality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PersonalityVisitor)
    }
}

struct PersonalityVisitor;

impl<'de> Visitor<'de> for PersonalityVisitor {
    type Value = Personality;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with exactly one score for each of the 16 factors")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Personality, M::Error> {
        let mut seen: [Option<Score>; Factor::COUNT] = [None; Factor::COUNT];

        while let Some(factor) = map.next_key::<Factor>()? {
            let slot = &mut seen[factor.index()];
            if slot.is_some() {
                return Err(de::Error::custom(format!("duplicate factor {factor}")));
            }
            *slot = Some(map.next_value()?);
        }

        let mut personality = Personality::neutral();
        for factor in Factor::ALL {
            match seen[factor.index()] {
                Some(score) => personality.set(factor, score),
                None => return Err(de::Error::custom(format!("missing factor {factor}"))),
            }
        }
        Ok(personality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_order_matches_index() {
        for (i, factor) in Factor::ALL.into_iter().enumerate() {
            assert_eq!(factor.index(), i);
        }
    }

    #[test]
    fn test_factor_parse_code_and_name() {
        assert_eq!("A".parse::<Factor>().unwrap(), Factor::A);
        assert_eq!("q1".parse::<Factor>().unwrap(), Factor::Q1);
        assert_eq!("warmth".parse::<Factor>().unwrap(), Factor::A);
        assert_eq!("Social Boldness".parse::<Factor>().unwrap(), Factor::H);
        assert_eq!("rule-consciousness".parse::<Factor>().unwrap(), Factor::G);
    }

    #[test]
    fn test_factor_parse_rejects_unknown() {
        assert!("D".parse::<Factor>().is_err());
        assert!("Q5".parse::<Factor>().is_err());
        assert!("".parse::<Factor>().is_err());
    }

    #[test]
    fn test_score_bounds() {
        assert!(Score::new(1).is_ok());
        assert!(Score::new(10).is_ok());
        assert_eq!(Score::new(0), Err(ScoreOutOfRange(0)));
        assert_eq!(Score::new(11), Err(ScoreOutOfRange(11)));
        assert_eq!(Score::new(-3), Err(ScoreOutOfRange(-3)));
    }

    #[test]
    fn test_score_clamped() {
        assert_eq!(Score::clamped(-4).value(), 1);
        assert_eq!(Score::clamped(7).value(), 7);
        assert_eq!(Score::clamped(42).value(), 10);
    }

    #[test]
    fn test_score_deviation_endpoints() {
        assert!((Score::new(1).unwrap().deviation() + 1.0).abs() < f64::EPSILON);
        assert!((Score::new(10).unwrap().deviation() - 1.0).abs() < f64::EPSILON);
        assert!(Score::MIDPOINT.deviation() < 0.0);
    }

    #[test]
    fn test_band_labels() {
        assert_eq!(Band::of(Score::new(1).unwrap()).describe(Factor::A), "Very reserved");
        assert_eq!(Band::of(Score::new(4).unwrap()).describe(Factor::H), "Shy");
        assert_eq!(Band::of(Score::MIDPOINT).describe(Factor::A), "Average");
        assert_eq!(Band::of(Score::new(8).unwrap()).describe(Factor::E), "Dominant");
        assert_eq!(Band::of(Score::new(10).unwrap()).describe(Factor::A), "Very warm");
    }

    #[test]
    fn test_neutral_is_all_midpoint() {
        let p = Personality::neutral();
        assert!(p.iter().all(|(_, s)| s == Score::MIDPOINT));
        assert_eq!(p.iter().count(), 16);
    }

    #[test]
    fn test_personality_serializes_as_code_map() {
        let mut p = Personality::neutral();
        p.set(Factor::Q4, Score::new(9).unwrap());
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["A"], 5);
        assert_eq!(json["Q4"], 9);
        assert_eq!(json.as_object().unwrap().len(), 16);

        let parsed: Personality = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, p);
    }

    #[test]
    fn test_personality_rejects_missing_factor() {
        let mut json = serde_json::to_value(Personality::neutral()).unwrap();
        json.as_object_mut().unwrap().remove("M");
        let err = serde_json::from_value::<Personality>(json).unwrap_err();
        assert!(err.to_string().contains("missing factor M"));
    }

    #[test]
    fn test_personality_rejects_duplicate_factor() {
        let raw = r#"{"A":5,"B":5,"C":5,"E":5,"F":5,"G":5,"H":5,"I":5,"L":5,
            "M":5,"N":5,"O":5,"Q1":5,"Q2":5,"Q3":5,"Q4":5,"A":7}"#;
        let err = serde_json::from_str::<Personality>(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate factor A"));
    }

    #[test]
    fn test_personality_rejects_out_of_range_and_unknown() {
        let mut json = serde_json::to_value(Personality::neutral()).unwrap();
        json["C"] = serde_json::json!(11);
        assert!(serde_json::from_value::<Personality>(json).is_err());

        let mut json = serde_json::to_value(Personality::neutral()).unwrap();
        json["D"] = serde_json::json!(5);
        assert!(serde_json::from_value::<Personality>(json).is_err());
    }
}
