use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::assessment::tiers::{Tier, TierScheme};

/// Length heuristic used to award partial credit on free-text answers.
/// Rewards a non-trivial submission; it never checks correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditHeuristic {
    /// Code-writing prompts.
    AttemptBased,
    /// Scenario and reasoning prompts.
    DetailBased,
    /// Short-answer prompts in weekly tests.
    PresenceBased,
}

impl CreditHeuristic {
    /// Trimmed length (in characters) an answer must exceed to earn credit.
    pub fn default_threshold(self) -> usize {
        match self {
            CreditHeuristic::AttemptBased => 20,
            CreditHeuristic::DetailBased => 50,
            CreditHeuristic::PresenceBased => 10,
        }
    }

    /// Fraction of the question's points awarded, in tenths.
    pub fn credit_tenths(self) -> u32 {
        match self {
            CreditHeuristic::AttemptBased => 7,
            CreditHeuristic::DetailBased => 8,
            CreditHeuristic::PresenceBased => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum QuestionKind {
    SingleChoice {
        options: Vec<String>,
        correct_option_index: usize,
    },
    FreeText {
        heuristic: CreditHeuristic,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum_length_for_credit: Option<usize>,
    },
    /// Any kind this engine does not know how to score. Answers to it earn zero.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub skill: String,
    pub points: u32,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Either a chosen option index or free-text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Choice(usize),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub value: AnswerValue,
}

/// Answers keyed by question id.
pub type AnswerSheet = HashMap<String, AnswerValue>;

/// Builds an answer sheet. A later answer to the same question replaces an earlier one.
pub fn answer_sheet(answers: impl IntoIterator<Item = Answer>) -> AnswerSheet {
    answers
        .into_iter()
        .map(|a| (a.question_id, a.value))
        .collect()
}

/// Skill label → percentage (0–100, rounded).
pub type SkillBreakdown = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredQuestion {
    pub question_id: String,
    pub skill: String,
    pub awarded_points: u32,
    pub max_points: u32,
    /// True when the answer could not be scored against this question's kind.
    pub unscorable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub overall_score: u32, // 0 – 100
    pub awarded_points: u64,
    pub max_points: u64,
    pub tier: Tier,
    pub tier_scheme: TierScheme,
    pub skill_breakdown: SkillBreakdown,
    pub skill_tiers: BTreeMap<String, Tier>,
    pub strengths: Vec<String>,  // breakdown ≥ 80
    pub weaknesses: Vec<String>, // breakdown < 60
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
    pub questions: Vec<ScoredQuestion>,
}
