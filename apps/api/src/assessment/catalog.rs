//! Statically authored assessments. Created once at startup, immutable afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assessment::models::{CreditHeuristic, Question, QuestionKind};
use crate::assessment::scoring::{validate_questions, ScoringError};
use crate::assessment::tiers::TierScheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentFamily {
    SkillsAssessment,
    EnhancedAssessment,
    WeeklyTest,
}

impl AssessmentFamily {
    /// Every family grades on exactly one curve.
    pub fn tier_scheme(self) -> TierScheme {
        match self {
            AssessmentFamily::SkillsAssessment | AssessmentFamily::EnhancedAssessment => {
                TierScheme::Standard
            }
            AssessmentFamily::WeeklyTest => TierScheme::Quintile,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssessmentDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub family: AssessmentFamily,
    pub time_limit_secs: Option<u64>,
    pub questions: Vec<Question>,
}

/// Listing entry for the catalog endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub family: AssessmentFamily,
    pub time_limit_secs: Option<u64>,
    pub question_count: usize,
    pub total_points: u64,
    pub skills: Vec<String>,
}

/// A question as shown to the candidate. Never carries the correct answer.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub skill: String,
    pub points: u32,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: PublicQuestionKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PublicQuestionKind {
    SingleChoice { options: Vec<String> },
    FreeText { minimum_length_for_credit: usize },
    Unsupported,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicAssessment {
    #[serde(flatten)]
    pub summary: AssessmentSummary,
    pub questions: Vec<PublicQuestion>,
}

impl AssessmentDefinition {
    pub fn summary(&self) -> AssessmentSummary {
        let mut skills: Vec<String> = Vec::new();
        for q in &self.questions {
            if !skills.contains(&q.skill) {
                skills.push(q.skill.clone());
            }
        }
        AssessmentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            family: self.family,
            time_limit_secs: self.time_limit_secs,
            question_count: self.questions.len(),
            total_points: self.questions.iter().map(|q| u64::from(q.points)).sum(),
            skills,
        }
    }

    pub fn public_view(&self) -> PublicAssessment {
        PublicAssessment {
            summary: self.summary(),
            questions: self.questions.iter().map(public_question).collect(),
        }
    }

    pub fn tier_scheme(&self) -> TierScheme {
        self.family.tier_scheme()
    }
}

fn public_question(q: &Question) -> PublicQuestion {
    let kind = match &q.kind {
        QuestionKind::SingleChoice { options, .. } => PublicQuestionKind::SingleChoice {
            options: options.clone(),
        },
        QuestionKind::FreeText {
            heuristic,
            minimum_length_for_credit,
        } => PublicQuestionKind::FreeText {
            minimum_length_for_credit: minimum_length_for_credit
                .unwrap_or_else(|| heuristic.default_threshold()),
        },
        QuestionKind::Unsupported => PublicQuestionKind::Unsupported,
    };
    PublicQuestion {
        id: q.id.clone(),
        skill: q.skill.clone(),
        points: q.points,
        prompt: q.prompt.clone(),
        kind,
    }
}

/// All assessments offered by the service, in display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    assessments: Vec<AssessmentDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Validates every definition. One bad question set rejects the whole catalog.
    pub fn new(assessments: Vec<AssessmentDefinition>) -> Result<Self, ScoringError> {
        let mut index = HashMap::new();
        for (i, def) in assessments.iter().enumerate() {
            validate_questions(&def.questions).map_err(|e| match e {
                ScoringError::InvalidAssessment(msg) => {
                    ScoringError::InvalidAssessment(format!("{}: {msg}", def.id))
                }
                other => other,
            })?;
            if index.insert(def.id.clone(), i).is_some() {
                return Err(ScoringError::InvalidAssessment(format!(
                    "duplicate assessment id '{}'",
                    def.id
                )));
            }
        }
        Ok(Self { assessments, index })
    }

    pub fn builtin() -> Result<Self, ScoringError> {
        Self::new(vec![
            skills_assessment(),
            enhanced_assessment(),
            weekly_test(),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&AssessmentDefinition> {
        self.index.get(id).map(|&i| &self.assessments[i])
    }

    pub fn summaries(&self) -> Vec<AssessmentSummary> {
        self.assessments.iter().map(|a| a.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.assessments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessments.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Authoring helpers
// ────────────────────────────────────────────────────────────────────────────

fn choice(id: &str, skill: &str, points: u32, prompt: &str, options: &[&str], correct: usize) -> Question {
    Question {
        id: id.to_string(),
        skill: skill.to_string(),
        points,
        prompt: prompt.to_string(),
        kind: QuestionKind::SingleChoice {
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_option_index: correct,
        },
    }
}

fn written(id: &str, skill: &str, points: u32, prompt: &str, heuristic: CreditHeuristic) -> Question {
    Question {
        id: id.to_string(),
        skill: skill.to_string(),
        points,
        prompt: prompt.to_string(),
        kind: QuestionKind::FreeText {
            heuristic,
            minimum_length_for_credit: None,
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in assessments
// ────────────────────────────────────────────────────────────────────────────

fn skills_assessment() -> AssessmentDefinition {
    AssessmentDefinition {
        id: "skills-assessment".to_string(),
        title: "Skills Assessment".to_string(),
        description: "A broad check of core technical and professional skills.".to_string(),
        family: AssessmentFamily::SkillsAssessment,
        time_limit_secs: None,
        questions: vec![
            choice(
                "sa-prog-1",
                "Programming",
                10,
                "What is the time complexity of binary search on a sorted array?",
                &["O(n)", "O(log n)", "O(n log n)", "O(1)"],
                1,
            ),
            choice(
                "sa-prog-2",
                "Programming",
                10,
                "Which data structure gives average O(1) lookup by key?",
                &["Linked list", "Binary heap", "Hash map", "Sorted array"],
                2,
            ),
            written(
                "sa-prog-3",
                "Programming",
                20,
                "Write a function that returns the largest number in a list.",
                CreditHeuristic::AttemptBased,
            ),
            choice(
                "sa-logic-1",
                "Problem Solving",
                10,
                "If all bloops are razzies and all razzies are lazzies, are all bloops lazzies?",
                &["Yes", "No", "Only some", "Cannot be determined"],
                0,
            ),
            choice(
                "sa-logic-2",
                "Problem Solving",
                10,
                "What comes next in the sequence 2, 6, 12, 20, 30?",
                &["36", "40", "42", "48"],
                2,
            ),
            choice(
                "sa-comm-1",
                "Communication",
                10,
                "A stakeholder disagrees with your technical proposal. What is the best first step?",
                &[
                    "Escalate to your manager",
                    "Ask questions to understand their concerns",
                    "Proceed anyway",
                    "Drop the proposal",
                ],
                1,
            ),
            choice(
                "sa-data-1",
                "Data Analysis",
                10,
                "Which measure of central tendency is least affected by outliers?",
                &["Mean", "Median", "Range", "Standard deviation"],
                1,
            ),
            choice(
                "sa-data-2",
                "Data Analysis",
                10,
                "A correlation coefficient of -0.9 indicates:",
                &[
                    "No relationship",
                    "A weak positive relationship",
                    "A strong negative relationship",
                    "Causation",
                ],
                2,
            ),
        ],
    }
}

fn enhanced_assessment() -> AssessmentDefinition {
    AssessmentDefinition {
        id: "enhanced-assessment".to_string(),
        title: "Enhanced Career Assessment".to_string(),
        description: "Scenario-based assessment of technical depth and leadership judgement."
            .to_string(),
        family: AssessmentFamily::EnhancedAssessment,
        time_limit_secs: Some(30 * 60),
        questions: vec![
            choice(
                "ea-tech-1",
                "Technical Knowledge",
                10,
                "Which HTTP status code indicates the client sent too many requests?",
                &["401", "404", "429", "503"],
                2,
            ),
            choice(
                "ea-tech-2",
                "Technical Knowledge",
                10,
                "What does an index on a database column primarily improve?",
                &["Write throughput", "Read query performance", "Disk usage", "Backup speed"],
                1,
            ),
            written(
                "ea-tech-3",
                "Technical Knowledge",
                20,
                "Implement a function that checks whether a string is a palindrome.",
                CreditHeuristic::AttemptBased,
            ),
            written(
                "ea-lead-1",
                "Leadership",
                20,
                "Two senior engineers on your team disagree on an architecture decision and the \
                 deadline is close. Describe how you would resolve it.",
                CreditHeuristic::DetailBased,
            ),
            choice(
                "ea-lead-2",
                "Leadership",
                10,
                "A team member is repeatedly missing deadlines. What should you do first?",
                &[
                    "Reassign their work",
                    "Have a private conversation to understand the cause",
                    "Report them to HR",
                    "Ignore it",
                ],
                1,
            ),
            written(
                "ea-ps-1",
                "Problem Solving",
                20,
                "Production latency doubled after a release and rollback is not possible. \
                 Walk through how you would investigate.",
                CreditHeuristic::DetailBased,
            ),
            choice(
                "ea-ps-2",
                "Problem Solving",
                10,
                "You have 8 balls, one heavier than the rest, and a balance scale. \
                 What is the minimum number of weighings to find it?",
                &["1", "2", "3", "4"],
                1,
            ),
        ],
    }
}

fn weekly_test() -> AssessmentDefinition {
    AssessmentDefinition {
        id: "weekly-test".to_string(),
        title: "Weekly Progress Test".to_string(),
        description: "A short timed check on this week's learning roadmap topics.".to_string(),
        family: AssessmentFamily::WeeklyTest,
        time_limit_secs: Some(10 * 60),
        questions: vec![
            choice(
                "wt-web-1",
                "Web Development",
                5,
                "Which CSS layout model arranges items along a single axis?",
                &["Grid", "Flexbox", "Float", "Table"],
                1,
            ),
            written(
                "wt-web-2",
                "Web Development",
                5,
                "In one sentence, what is the purpose of a REST API?",
                CreditHeuristic::PresenceBased,
            ),
            choice(
                "wt-git-1",
                "Version Control",
                5,
                "Which git command creates a new branch and switches to it?",
                &["git branch -d", "git switch -c", "git merge", "git stash"],
                1,
            ),
            written(
                "wt-git-2",
                "Version Control",
                5,
                "Briefly describe when you would rebase instead of merge.",
                CreditHeuristic::PresenceBased,
            ),
            choice(
                "wt-soft-1",
                "Communication",
                5,
                "What is the most effective format for a status update to leadership?",
                &[
                    "A detailed log of every task",
                    "A short summary of progress, risks and asks",
                    "A verbal update only",
                    "No update unless asked",
                ],
                1,
            ),
        ],
    }
}
