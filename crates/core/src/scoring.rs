//! Scoring engine: raw answers to individual profiles, and two profiles to
//! a compatibility report.
//!
//! Everything here is pure and deterministic. The same answer set always
//! produces the same [`IndividualResult`] regardless of answer order, and
//! the same pair of score maps always produces the same [`CombinedResult`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::questions::{find_question, questions_per_dimension, Dimension, MAX_OPTION_WEIGHT};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lower bound of every per-dimension compatibility value.
pub const MIN_COMPATIBILITY: u8 = 45;

/// Upper bound of every per-dimension compatibility value.
pub const MAX_COMPATIBILITY: u8 = 99;

/// Weight of similarity (`100 - |a - b|`) in the blend.
const CLOSENESS_WEIGHT: f64 = 0.6;

/// Weight of mutual strength (`(a + b) / 2`) in the blend.
const STRENGTH_WEIGHT: f64 = 0.4;

/// Number of dimensions reported as strengths.
pub const TOP_STRENGTHS: usize = 3;

/// Number of dimensions reported as growth areas.
pub const GROWTH_AREAS: usize = 2;

// ---------------------------------------------------------------------------
// Answers and score maps
// ---------------------------------------------------------------------------

/// One participant's answer to one question. `value` must equal the
/// weight of one of the question's options to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: u32,
    pub value: i32,
}

/// Normalised `0..=100` score for each dimension.
///
/// Backed by a fixed array indexed by [`Dimension::index`]; serialises as
/// a `{ "<dimension key>": score }` object in canonical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Dimension, u8>", into = "BTreeMap<Dimension, u8>")]
pub struct DimensionScores([u8; Dimension::COUNT]);

impl DimensionScores {
    /// Build a score map, capping each entry at 100.
    pub fn new(scores: [u8; Dimension::COUNT]) -> Self {
        Self(scores.map(|s| s.min(100)))
    }

    /// The same score on every dimension.
    pub fn uniform(score: u8) -> Self {
        Self::new([score; Dimension::COUNT])
    }

    pub fn get(&self, dimension: Dimension) -> u8 {
        self.0[dimension.index()]
    }

    /// `(dimension, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, u8)> + '_ {
        Dimension::ALL.iter().map(move |&d| (d, self.get(d)))
    }
}

impl From<BTreeMap<Dimension, u8>> for DimensionScores {
    fn from(map: BTreeMap<Dimension, u8>) -> Self {
        let mut scores = [0u8; Dimension::COUNT];
        for (dimension, score) in map {
            scores[dimension.index()] = score;
        }
        Self::new(scores)
    }
}

impl From<DimensionScores> for BTreeMap<Dimension, u8> {
    fn from(scores: DimensionScores) -> Self {
        scores.iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Style catalogs
// ---------------------------------------------------------------------------

/// Wire form of a catalog entry: `{ "type": ..., "description": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleDescriptor {
    #[serde(rename = "type")]
    pub name: String,
    pub description: String,
}

/// Primary expression style, picked by hashing the whole answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StyleDescriptor", try_from = "StyleDescriptor")]
pub enum ExpressionStyle {
    WordsOfAffirmation,
    QualityTime,
    ActsOfService,
    PhysicalTouch,
}

impl ExpressionStyle {
    /// Catalog order; the selection index is `answer_total mod 4`.
    pub const CATALOG: [Self; 4] = [
        Self::WordsOfAffirmation,
        Self::QualityTime,
        Self::ActsOfService,
        Self::PhysicalTouch,
    ];

    /// Select by the raw sum of every submitted answer value. The sum is
    /// reduced with `rem_euclid`, so negative totals still land in range.
    pub fn from_answer_total(total: i64) -> Self {
        Self::CATALOG[total.rem_euclid(Self::CATALOG.len() as i64) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::WordsOfAffirmation => "Words of Affirmation",
            Self::QualityTime => "Quality Time",
            Self::ActsOfService => "Acts of Service",
            Self::PhysicalTouch => "Physical Touch",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::WordsOfAffirmation => {
                "You thrive on verbal expressions of love. Compliments, encouragement, and \
                 hearing 'I love you' fill your emotional tank. You value open, heartfelt \
                 communication above all."
            }
            Self::QualityTime => {
                "Undivided attention is your love currency. You feel most connected when your \
                 partner is fully present — no phones, no distractions. Shared experiences \
                 create your deepest bonds."
            }
            Self::ActsOfService => {
                "Actions speak louder than words for you. When your partner helps out, takes \
                 initiative, or anticipates your needs, you feel genuinely cared for and \
                 supported."
            }
            Self::PhysicalTouch => {
                "Physical closeness is how you connect. From holding hands to a warm embrace, \
                 touch is your emotional anchor. You feel most secure when there's physical \
                 presence."
            }
        }
    }
}

impl From<ExpressionStyle> for StyleDescriptor {
    fn from(style: ExpressionStyle) -> Self {
        Self {
            name: style.name().to_string(),
            description: style.description().to_string(),
        }
    }
}

impl TryFrom<StyleDescriptor> for ExpressionStyle {
    type Error = String;

    fn try_from(d: StyleDescriptor) -> Result<Self, Self::Error> {
        Self::CATALOG
            .into_iter()
            .find(|s| s.name() == d.name)
            .ok_or_else(|| format!("Unknown expression style '{}'", d.name))
    }
}

/// Relational security style, picked from the emotional and conflict scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StyleDescriptor", try_from = "StyleDescriptor")]
pub enum SecurityStyle {
    Secure,
    Anxious,
    Avoidant,
    FearfulAvoidant,
}

impl SecurityStyle {
    pub const CATALOG: [Self; 4] = [
        Self::Secure,
        Self::Anxious,
        Self::Avoidant,
        Self::FearfulAvoidant,
    ];

    /// Decision table over the emotional and conflict dimension scores.
    pub fn classify(emotional: u8, conflict: u8) -> Self {
        if emotional >= 75 && conflict >= 75 {
            Self::Secure
        } else if emotional >= 50 && conflict < 50 {
            Self::Anxious
        } else if emotional < 50 && conflict >= 50 {
            Self::Avoidant
        } else {
            Self::FearfulAvoidant
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Secure => "Secure",
            Self::Anxious => "Anxious",
            Self::Avoidant => "Avoidant",
            Self::FearfulAvoidant => "Fearful-Avoidant",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Secure => {
                "You approach relationships with confidence and trust. You're comfortable with \
                 intimacy and independence alike, and you communicate your needs openly \
                 without fear."
            }
            Self::Anxious => {
                "You love deeply and crave closeness. Sometimes you worry about how your \
                 partner feels, and you seek reassurance. Your emotional awareness is a \
                 strength when channeled well."
            }
            Self::Avoidant => {
                "You value independence and self-sufficiency. You might sometimes pull back \
                 when things get too intense, needing space to feel safe. You love on your \
                 own terms."
            }
            Self::FearfulAvoidant => {
                "You have a complex relationship with intimacy — wanting closeness but \
                 sometimes fearing it. This depth gives you unique emotional insight when \
                 you learn to trust the process."
            }
        }
    }
}

impl From<SecurityStyle> for StyleDescriptor {
    fn from(style: SecurityStyle) -> Self {
        Self {
            name: style.name().to_string(),
            description: style.description().to_string(),
        }
    }
}

impl TryFrom<StyleDescriptor> for SecurityStyle {
    type Error = String;

    fn try_from(d: StyleDescriptor) -> Result<Self, Self::Error> {
        Self::CATALOG
            .into_iter()
            .find(|s| s.name() == d.name)
            .ok_or_else(|| format!("Unknown security style '{}'", d.name))
    }
}

// ---------------------------------------------------------------------------
// Individual results
// ---------------------------------------------------------------------------

/// One participant's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualResult {
    pub primary_expression_style: ExpressionStyle,
    pub relational_security_style: SecurityStyle,
    pub dimension_scores: DimensionScores,
}

/// Score one participant's answers.
///
/// Total over any input: answers naming an unknown question, or a value
/// that is not one of the question's option weights, contribute nothing to
/// the dimension scores. The expression style is chosen from the sum of
/// every submitted value, valid or not. Dimensions with no counted answers
/// score 0.
pub fn compute_individual(answers: &[Answer]) -> IndividualResult {
    let mut raw = [0u32; Dimension::COUNT];
    let total: i64 = answers.iter().map(|a| i64::from(a.value)).sum();

    for answer in answers {
        let Some(question) = find_question(answer.question_id) else {
            continue;
        };
        let Some(option) = question.option_for(answer.value) else {
            continue;
        };
        let weight = u32::from(option.weight);
        raw[question.dimension.index()] += weight;
    }

    let counts = questions_per_dimension();
    let mut scores = [0u8; Dimension::COUNT];
    for dimension in Dimension::ALL {
        let i = dimension.index();
        let max_possible = counts[i] * u32::from(MAX_OPTION_WEIGHT);
        if max_possible > 0 {
            scores[i] = round_pct(f64::from(raw[i]) / f64::from(max_possible) * 100.0);
        }
    }
    let dimension_scores = DimensionScores::new(scores);

    IndividualResult {
        primary_expression_style: ExpressionStyle::from_answer_total(total),
        relational_security_style: SecurityStyle::classify(
            dimension_scores.get(Dimension::Emotional),
            dimension_scores.get(Dimension::Conflict),
        ),
        dimension_scores,
    }
}

fn round_pct(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Combined results
// ---------------------------------------------------------------------------

/// Headline band selected from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadlineTier {
    /// `85..=100`
    CosmicallyAligned,
    /// `70..85`
    PowerfulConnection,
    /// `55..70`
    OppositesWithPotential,
    /// below 55
    ComplexDynamic,
}

impl HeadlineTier {
    pub fn from_overall(score: u8) -> Self {
        match score {
            85..=u8::MAX => Self::CosmicallyAligned,
            70..=84 => Self::PowerfulConnection,
            55..=69 => Self::OppositesWithPotential,
            _ => Self::ComplexDynamic,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::CosmicallyAligned => "You're Cosmically Aligned ✨",
            Self::PowerfulConnection => "A Powerful Connection 💫",
            Self::OppositesWithPotential => "Opposites With Potential 🌙",
            Self::ComplexDynamic => "A Complex Dynamic 🔮",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::CosmicallyAligned => {
                "Your connection runs deep across nearly every dimension. You share a rare \
                 level of understanding and compatibility that most couples only dream of."
            }
            Self::PowerfulConnection => {
                "You have a strong foundation with genuine chemistry. Your differences aren't \
                 weaknesses — they're opportunities to complement each other beautifully."
            }
            Self::OppositesWithPotential => {
                "You balance each other in interesting ways. While you see the world \
                 differently in some areas, that tension can create the most dynamic and \
                 growth-oriented relationships."
            }
            Self::ComplexDynamic => {
                "Your relationship has unique challenges, but that doesn't mean it can't work. \
                 The most transformative relationships are the ones that push us to grow."
            }
        }
    }
}

/// Per-dimension line of the compatibility report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionCompatibility {
    pub dimension: Dimension,
    pub label: String,
    pub emoji: String,
    pub score_a: u8,
    pub score_b: u8,
    pub compatibility: u8,
}

/// The joint report, materialised once when the second participant submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedResult {
    pub overall_score: u8,
    pub per_dimension: Vec<DimensionCompatibility>,
    pub headline_tier: HeadlineTier,
    pub headline: String,
    pub summary_text: String,
    pub top_strengths: Vec<String>,
    pub growth_areas: Vec<String>,
    pub second_participant_result: IndividualResult,
}

/// Blend two dimension scores into a compatibility value.
///
/// `round(closeness * 0.6 + average * 0.4)` clamped to
/// `MIN_COMPATIBILITY..=MAX_COMPATIBILITY`.
pub fn blend(score_a: u8, score_b: u8) -> u8 {
    let closeness = 100.0 - f64::from(score_a.abs_diff(score_b));
    let average = (f64::from(score_a) + f64::from(score_b)) / 2.0;
    let raw = (closeness * CLOSENESS_WEIGHT + average * STRENGTH_WEIGHT).round();
    raw.clamp(f64::from(MIN_COMPATIBILITY), f64::from(MAX_COMPATIBILITY)) as u8
}

/// Build the compatibility report from the first participant's stored
/// result and the second participant's raw answers.
///
/// The second participant's profile is always recomputed from `answers_b`.
pub fn compute_combined(result_a: &IndividualResult, answers_b: &[Answer]) -> CombinedResult {
    combine(&result_a.dimension_scores, compute_individual(answers_b))
}

/// Report assembly over already-computed profiles.
pub fn combine(scores_a: &DimensionScores, result_b: IndividualResult) -> CombinedResult {
    let scores_b = result_b.dimension_scores;

    let per_dimension: Vec<DimensionCompatibility> = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let score_a = scores_a.get(dimension);
            let score_b = scores_b.get(dimension);
            DimensionCompatibility {
                dimension,
                label: dimension.label().to_string(),
                emoji: dimension.emoji().to_string(),
                score_a,
                score_b,
                compatibility: blend(score_a, score_b),
            }
        })
        .collect();

    let sum: u32 = per_dimension.iter().map(|d| u32::from(d.compatibility)).sum();
    let overall_score = round_pct(f64::from(sum) / per_dimension.len() as f64);

    // Stable sort: ties keep canonical dimension order.
    let mut ranked: Vec<&DimensionCompatibility> = per_dimension.iter().collect();
    ranked.sort_by(|a, b| b.compatibility.cmp(&a.compatibility));

    let top_strengths = ranked
        .iter()
        .take(TOP_STRENGTHS)
        .map(|d| format!("{} {}: {}% aligned", d.emoji, d.label, d.compatibility))
        .collect();

    let growth_areas = ranked
        .iter()
        .rev()
        .take(GROWTH_AREAS)
        .map(|d| format!("{} {}: Room to grow together", d.emoji, d.label))
        .collect();

    let tier = HeadlineTier::from_overall(overall_score);

    CombinedResult {
        overall_score,
        per_dimension,
        headline_tier: tier,
        headline: tier.headline().to_string(),
        summary_text: tier.summary().to_string(),
        top_strengths,
        growth_areas,
        second_participant_result: result_b,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
