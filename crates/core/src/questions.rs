//! The fixed questionnaire both participants answer.
//!
//! The bank is a process-wide constant: there is no way to mutate it at
//! runtime. Every question belongs to exactly one [`Dimension`], and every
//! option carries a small positive weight.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Highest weight any option may carry. Score normalisation divides by
/// `question_count * MAX_OPTION_WEIGHT`, so every option weight in the
/// bank must stay within `1..=MAX_OPTION_WEIGHT`.
pub const MAX_OPTION_WEIGHT: u8 = 4;

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// One of the seven relationship-trait categories.
///
/// The declaration order is the canonical order used by score maps and
/// by the per-dimension section of the compatibility report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Communication,
    Emotional,
    Intimacy,
    Values,
    Conflict,
    Growth,
    Lifestyle,
}

impl Dimension {
    /// Number of dimensions.
    pub const COUNT: usize = 7;

    /// All dimensions in canonical order.
    pub const ALL: [Dimension; Self::COUNT] = [
        Self::Communication,
        Self::Emotional,
        Self::Intimacy,
        Self::Values,
        Self::Conflict,
        Self::Growth,
        Self::Lifestyle,
    ];

    /// Position of this dimension in [`Dimension::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable machine key (matches the serde representation).
    pub fn key(self) -> &'static str {
        match self {
            Self::Communication => "communication",
            Self::Emotional => "emotional",
            Self::Intimacy => "intimacy",
            Self::Values => "values",
            Self::Conflict => "conflict",
            Self::Growth => "growth",
            Self::Lifestyle => "lifestyle",
        }
    }

    /// Human-readable label used in report lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Communication => "Communication",
            Self::Emotional => "Emotional",
            Self::Intimacy => "Intimacy",
            Self::Values => "Values",
            Self::Conflict => "Conflict",
            Self::Growth => "Growth",
            Self::Lifestyle => "Lifestyle",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Communication => "💬",
            Self::Emotional => "💖",
            Self::Intimacy => "🔥",
            Self::Values => "🌿",
            Self::Conflict => "⚡",
            Self::Growth => "🚀",
            Self::Lifestyle => "🏡",
        }
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// A selectable answer and the weight it contributes to its dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub label: &'static str,
    pub weight: u8,
}

/// A single questionnaire entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: u32,
    pub text: &'static str,
    pub dimension: Dimension,
    pub options: &'static [AnswerOption],
}

impl Question {
    /// The option whose weight equals `value`, if any.
    pub fn option_for(&self, value: i32) -> Option<&'static AnswerOption> {
        self.options.iter().find(|o| i32::from(o.weight) == value)
    }
}

const fn opt(label: &'static str, weight: u8) -> AnswerOption {
    AnswerOption { label, weight }
}

/// The questionnaire, ordered by id.
pub static QUESTION_BANK: &[Question] = &[
    Question {
        id: 1,
        text: "When your partner is upset, what's your first instinct?",
        dimension: Dimension::Emotional,
        options: &[
            opt("Hold them and let them vent", 4),
            opt("Try to fix the problem immediately", 2),
            opt("Give them space to process", 3),
            opt("Distract them to cheer them up", 1),
        ],
    },
    Question {
        id: 2,
        text: "How do you prefer to resolve a disagreement?",
        dimension: Dimension::Conflict,
        options: &[
            opt("Talk it out right away, even if it's heated", 4),
            opt("Take a breather first, then discuss calmly", 3),
            opt("Write down my thoughts before talking", 2),
            opt("Avoid it and hope it blows over", 1),
        ],
    },
    Question {
        id: 3,
        text: "Your ideal Saturday together looks like:",
        dimension: Dimension::Lifestyle,
        options: &[
            opt("Adventure — hiking, exploring, trying something new", 4),
            opt("Cozy at home — cooking, movies, no plans", 2),
            opt("Social — dinner with friends, events, going out", 3),
            opt("Productive — errands, projects, getting things done", 1),
        ],
    },
    Question {
        id: 4,
        text: "What makes you feel most loved?",
        dimension: Dimension::Communication,
        options: &[
            opt("Hearing 'I love you' and genuine compliments", 4),
            opt("Surprise gifts or thoughtful gestures", 2),
            opt("Quality time with undivided attention", 3),
            opt("Acts of service — they do things without being asked", 1),
        ],
    },
    Question {
        id: 5,
        text: "How important is physical affection in your relationship?",
        dimension: Dimension::Intimacy,
        options: &[
            opt("Essential — I need daily touch and closeness", 4),
            opt("Important — but I also value personal space", 3),
            opt("Nice but not a priority for me", 2),
            opt("I show love in other ways", 1),
        ],
    },
    Question {
        id: 6,
        text: "When it comes to finances in a relationship:",
        dimension: Dimension::Values,
        options: &[
            opt("Everything should be shared and transparent", 4),
            opt("Some shared, some separate — balance is key", 3),
            opt("Keep finances mostly separate", 2),
            opt("Whoever earns more should handle more", 1),
        ],
    },
    Question {
        id: 7,
        text: "Where do you see yourself in 5 years?",
        dimension: Dimension::Growth,
        options: &[
            opt("Settled down — house, maybe kids, stability", 3),
            opt("Career-focused — climbing the ladder, building something", 2),
            opt("Free-spirited — traveling, new experiences, no fixed plan", 4),
            opt("Same as now, just better — improve what I have", 1),
        ],
    },
    Question {
        id: 8,
        text: "How do you handle stress?",
        dimension: Dimension::Emotional,
        options: &[
            opt("I talk about it — sharing helps me process", 4),
            opt("I go quiet and need alone time", 2),
            opt("I exercise or do something physical", 3),
            opt("I push through and deal with it later", 1),
        ],
    },
    Question {
        id: 9,
        text: "How much alone time do you need in a relationship?",
        dimension: Dimension::Lifestyle,
        options: &[
            opt("Very little — I want to do everything together", 4),
            opt("Some — a few hours a week to recharge", 3),
            opt("A good amount — I need my own hobbies and space", 2),
            opt("A lot — independence is crucial to me", 1),
        ],
    },
    Question {
        id: 10,
        text: "What's the biggest relationship deal-breaker for you?",
        dimension: Dimension::Values,
        options: &[
            opt("Dishonesty — trust is everything", 4),
            opt("Lack of ambition — I need a partner who grows", 3),
            opt("Poor communication — if we can't talk, it won't work", 2),
            opt("Different life goals — we need to want the same things", 1),
        ],
    },
];

/// Look up a question by id.
pub fn find_question(id: u32) -> Option<&'static Question> {
    QUESTION_BANK.iter().find(|q| q.id == id)
}

/// Number of questions tagged with each dimension, indexed by [`Dimension::index`].
pub fn questions_per_dimension() -> [u32; Dimension::COUNT] {
    let mut counts = [0u32; Dimension::COUNT];
    for q in QUESTION_BANK {
        counts[q.dimension.index()] += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
