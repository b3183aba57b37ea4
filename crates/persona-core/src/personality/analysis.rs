//! Personality analysis: dominant traits, behavioural tendencies,
//! compatibility, and template adjustments.
//!
//! All arithmetic happens on the deviation axis (see
//! [`Score::deviation`]), where 1 maps to -1.0 and 10 maps to 1.0.

use serde::Serialize;

use std::collections::BTreeMap;
use std::fmt;

use persona_types::personality::{Band, Factor, Personality, Score};

use super::template::Template;
use super::weighted;

/// |deviation| above which a factor counts as dominant (scores 1-2 and 9-10).
pub const DOMINANT_THRESHOLD: f64 = 0.7;

const RISK_TAKING: &[(Factor, f64)] = &[
    (Factor::H, 0.3),
    (Factor::F, 0.2),
    (Factor::L, -0.1),
    (Factor::O, -0.2),
    (Factor::Q1, 0.2),
];

const SOCIABILITY: &[(Factor, f64)] = &[
    (Factor::A, 0.3),
    (Factor::F, 0.2),
    (Factor::H, 0.2),
    (Factor::Q2, -0.2),
    (Factor::N, -0.1),
];

const LEADERSHIP: &[(Factor, f64)] = &[
    (Factor::E, 0.3),
    (Factor::L, 0.1),
    (Factor::Q2, 0.2),
    (Factor::O, -0.2),
    (Factor::H, 0.2),
];

const CREATIVITY: &[(Factor, f64)] = &[
    (Factor::M, 0.3),
    (Factor::Q1, 0.3),
    (Factor::B, 0.2),
    (Factor::F, 0.1),
    (Factor::A, 0.1),
];

const ANALYTICAL: &[(Factor, f64)] = &[
    (Factor::B, 0.3),
    (Factor::G, 0.2),
    (Factor::Q3, 0.2),
    (Factor::M, -0.1),
    (Factor::C, 0.2),
];

const EMOTIONAL_DEPENDENCY: &[(Factor, f64)] = &[
    (Factor::C, -0.3),
    (Factor::O, 0.3),
    (Factor::Q4, 0.2),
    (Factor::I, 0.2),
];

const EMOTIONAL_STABILITY: &[(Factor, f64)] = &[(Factor::C, 0.5), (Factor::O, 0.3), (Factor::Q4, 0.2)];

const ADAPTABILITY: &[(Factor, f64)] = &[(Factor::Q1, 0.4), (Factor::F, 0.3), (Factor::E, 0.3)];

/// Per-factor weights for [`compatibility`]; unlisted factors weigh 0.5.
fn compatibility_weight(factor: Factor) -> f64 {
    match factor {
        Factor::A => 1.0,
        Factor::H | Factor::Q2 => 0.9,
        Factor::E | Factor::L => 0.8,
        Factor::F | Factor::N => 0.7,
        Factor::I => 0.6,
        _ => 0.5,
    }
}

/// Coarse shape of a profile, by number of dominant traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// No dominant traits.
    Balanced,
    /// One to three dominant traits.
    Specialized,
    /// More than three dominant traits.
    Extreme,
}

impl Profile {
    pub fn of(personality: &Personality) -> Self {
        match dominant_traits(personality).len() {
            0 => Profile::Balanced,
            1..=3 => Profile::Specialized,
            _ => Profile::Extreme,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Profile::Balanced => "balanced",
            Profile::Specialized => "specialized",
            Profile::Extreme => "extreme",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStyle {
    Logical,
    Emotional,
    Balanced,
}

impl fmt::Display for DecisionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionStyle::Logical => "logical",
            DecisionStyle::Emotional => "emotional",
            DecisionStyle::Balanced => "balanced",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialOrientation {
    Extroverted,
    Introverted,
    Ambivert,
}

impl fmt::Display for SocialOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SocialOrientation::Extroverted => "extroverted",
            SocialOrientation::Introverted => "introverted",
            SocialOrientation::Ambivert => "ambivert",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DominantTrait {
    pub factor: Factor,
    pub score: Score,
    pub deviation: f64,
    /// e.g. "Very warm"
    pub label: String,
}

/// Behavioural tendencies, each in [-1.0, 1.0].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Tendencies {
    pub risk_taking: f64,
    pub sociability: f64,
    pub leadership: f64,
    pub creativity: f64,
    pub analytical: f64,
    pub emotional_dependency: f64,
}

impl Tendencies {
    pub fn of(personality: &Personality) -> Self {
        Self {
            risk_taking: weighted(personality, RISK_TAKING),
            sociability: weighted(personality, SOCIABILITY),
            leadership: weighted(personality, LEADERSHIP),
            creativity: weighted(personality, CREATIVITY),
            analytical: weighted(personality, ANALYTICAL),
            emotional_dependency: weighted(personality, EMOTIONAL_DEPENDENCY),
        }
    }

    /// Name/value pairs in a fixed order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("risk-taking", self.risk_taking),
            ("sociability", self.sociability),
            ("leadership", self.leadership),
            ("creativity", self.creativity),
            ("analytical", self.analytical),
            ("emotional dependency", self.emotional_dependency),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateAffinity {
    pub template: Template,
    pub affinity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonalityAnalysis {
    pub dominant_traits: Vec<DominantTrait>,
    pub band_distribution: BTreeMap<Band, usize>,
    pub profile: Profile,
    pub tendencies: Tendencies,
    pub decision_style: DecisionStyle,
    pub social_orientation: SocialOrientation,
    pub emotional_stability: f64,
    pub adaptability: f64,
    /// Closest template first.
    pub template_affinity: Vec<TemplateAffinity>,
}

/// A signed change that would move one factor onto a template's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    pub factor: Factor,
    pub current: Score,
    pub target: Score,
    pub delta: i8,
}

/// Factors with |deviation| above [`DOMINANT_THRESHOLD`], strongest first.
pub fn dominant_traits(personality: &Personality) -> Vec<DominantTrait> {
    let mut traits: Vec<DominantTrait> = personality
        .iter()
        .filter(|(_, score)| score.deviation().abs() > DOMINANT_THRESHOLD)
        .map(|(factor, score)| DominantTrait {
            factor,
            score,
            deviation: score.deviation(),
            label: score.band().describe(factor),
        })
        .collect();
    // Stable sort keeps canonical order among equally strong traits.
    traits.sort_by(|a, b| b.deviation.abs().total_cmp(&a.deviation.abs()));
    traits
}

pub fn band_distribution(personality: &Personality) -> BTreeMap<Band, usize> {
    let mut distribution: BTreeMap<Band, usize> = Band::ALL.into_iter().map(|b| (b, 0)).collect();
    for (_, score) in personality.iter() {
        *distribution.entry(score.band()).or_default() += 1;
    }
    distribution
}

pub fn analyze(personality: &Personality) -> PersonalityAnalysis {
    let tendencies = Tendencies::of(personality);

    let decision_style = if tendencies.analytical > 0.7 {
        DecisionStyle::Logical
    } else if tendencies.emotional_dependency > 0.7 {
        DecisionStyle::Emotional
    } else {
        DecisionStyle::Balanced
    };

    let social_orientation = if tendencies.sociability > 0.7 {
        SocialOrientation::Extroverted
    } else if tendencies.sociability < -0.3 {
        SocialOrientation::Introverted
    } else {
        SocialOrientation::Ambivert
    };

    let mut template_affinity: Vec<TemplateAffinity> = Template::ALL
        .into_iter()
        .map(|template| TemplateAffinity {
            template,
            affinity: template_affinity(personality, template),
        })
        .collect();
    template_affinity.sort_by(|a, b| b.affinity.total_cmp(&a.affinity));

    PersonalityAnalysis {
        dominant_traits: dominant_traits(personality),
        band_distribution: band_distribution(personality),
        profile: Profile::of(personality),
        tendencies,
        decision_style,
        social_orientation,
        emotional_stability: weighted(personality, EMOTIONAL_STABILITY),
        adaptability: weighted(personality, ADAPTABILITY),
        template_affinity,
    }
}

/// `1 - mean(|d - d_template|)`, in [-1.0, 1.0].
pub fn template_affinity(personality: &Personality, template: Template) -> f64 {
    let target = template.personality();
    let total: f64 = Factor::ALL
        .into_iter()
        .map(|f| (personality[f].deviation() - target[f].deviation()).abs())
        .sum();
    1.0 - total / Factor::COUNT as f64
}

/// Weighted compatibility between two personalities in [0.0, 1.0].
///
/// Identical profiles score 1.0 and exact opposites (every factor at 1 vs 10)
/// score 0.0. Interpersonal factors (A, H, Q2, ...) weigh more.
pub fn compatibility(a: &Personality, b: &Personality) -> f64 {
    let (diff, weights) = Factor::ALL
        .into_iter()
        .fold((0.0, 0.0), |(diff, weights), f| {
            let w = compatibility_weight(f);
            (
                diff + (a[f].deviation() - b[f].deviation()).abs() * w,
                weights + w,
            )
        });
    1.0 - diff / (weights * 2.0)
}

/// Changes that would turn `personality` into `template`, in canonical order.
pub fn suggest_adjustments(personality: &Personality, template: Template) -> Vec<Adjustment> {
    let target = template.personality();
    personality
        .iter()
        .filter(|&(factor, current)| current != target[factor])
        .map(|(factor, current)| Adjustment {
            factor,
            current,
            target: target[factor],
            delta: target[factor].value() as i8 - current.value() as i8,
        })
        .collect()
}

/// A short English summary of a personality.
pub fn describe(personality: &Personality) -> String {
    let analysis = analyze(personality);
    let mut parts = Vec::new();

    parts.push(format!(
        "A {} personality with an {} social orientation.",
        analysis.profile, analysis.social_orientation
    ));

    if !analysis.dominant_traits.is_empty() {
        let traits = analysis
            .dominant_traits
            .iter()
            .take(3)
            .map(|t| format!("{} ({} {})", t.label, t.factor, t.score))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Most pronounced traits: {traits}."));
    }

    parts.push(format!(
        "Decision-making is {}, with emotional stability {:+.2} and adaptability {:+.2}.",
        analysis.decision_style, analysis.emotional_stability, analysis.adaptability
    ));

    let mut strong: Vec<(&str, f64)> = analysis
        .tendencies
        .entries()
        .into_iter()
        .filter(|(_, v)| v.abs() > 0.5)
        .collect();
    if !strong.is_empty() {
        strong.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        let list = strong
            .iter()
            .map(|(name, v)| format!("{name} ({v:+.2})"))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Strongest tendencies: {list}."));
    }

    parts.join(" ")
}
