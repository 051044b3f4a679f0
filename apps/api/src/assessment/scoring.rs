//! Assessment Scoring Engine: a pure transformation from (questions, answers) to a result.
//!
//! No I/O, no clock, no randomness: identical inputs always yield an identical
//! `AssessmentResult`. Timing (`time_spent`) and persistence belong to the caller.
//!
//! Algorithm:
//! 1. Award per-question credit (exact match for single choice, length heuristic
//!    for free text). Unscorable answers earn zero and do not abort scoring.
//! 2. Group awarded and max points by skill label.
//! 3. breakdown[skill] = round(100 × awarded / max); overall likewise over all questions.
//! 4. Classify overall and per-skill scores with the caller's tier scheme.
//! 5. Derive strengths (≥80), weaknesses (<60), recommendations and next steps.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use tracing::{debug, warn};

use crate::assessment::feedback;
use crate::assessment::models::{
    AnswerSheet, AnswerValue, AssessmentResult, Question, QuestionKind, ScoredQuestion,
    SkillBreakdown,
};
use crate::assessment::tiers::{classify, TierScheme};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// The question set cannot be scored at all. Callers must not render a result.
    #[error("Invalid assessment: {0}")]
    InvalidAssessment(String),

    /// A single answer cannot be scored. Degrades to zero credit for that question.
    #[error("Unscorable answer for question '{question_id}': {reason}")]
    UnscorableAnswer { question_id: String, reason: String },
}

/// Scores with the standard (90/80/70/60) tier scheme.
pub fn score(questions: &[Question], answers: &AnswerSheet) -> Result<AssessmentResult, ScoringError> {
    score_with_scheme(questions, answers, TierScheme::Standard)
}

pub fn score_with_scheme(
    questions: &[Question],
    answers: &AnswerSheet,
    scheme: TierScheme,
) -> Result<AssessmentResult, ScoringError> {
    validate_questions(questions)?;

    // skill → (awarded, max)
    let mut tallies: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    let mut scored = Vec::with_capacity(questions.len());

    for question in questions {
        let (awarded, unscorable) = match score_question(question, answers.get(&question.id)) {
            Ok(points) => (points, false),
            Err(e) => {
                warn!("{e}; awarding zero credit");
                (0, true)
            }
        };

        let tally = tallies.entry(question.skill.as_str()).or_insert((0, 0));
        tally.0 += u64::from(awarded);
        tally.1 += u64::from(question.points);

        scored.push(ScoredQuestion {
            question_id: question.id.clone(),
            skill: question.skill.clone(),
            awarded_points: awarded,
            max_points: question.points,
            unscorable,
        });
    }

    let skill_breakdown: SkillBreakdown = tallies
        .iter()
        .map(|(skill, (awarded, max))| (skill.to_string(), percentage(*awarded, *max)))
        .collect();

    let awarded_points: u64 = tallies.values().map(|(a, _)| a).sum();
    let max_points: u64 = tallies.values().map(|(_, m)| m).sum();
    let overall_score = percentage(awarded_points, max_points);

    let skill_tiers = skill_breakdown
        .iter()
        .map(|(skill, &pct)| (skill.clone(), classify(pct, scheme)))
        .collect();

    let strengths = feedback::strengths(&skill_breakdown);
    let weaknesses = feedback::weaknesses(&skill_breakdown);
    let recommendations = feedback::recommendations(&weaknesses);
    let next_steps = feedback::next_steps(overall_score);
    let tier = classify(overall_score, scheme);

    debug!(
        "Scored {} questions: {awarded_points}/{max_points} = {overall_score}% ({tier})",
        questions.len()
    );

    Ok(AssessmentResult {
        overall_score,
        awarded_points,
        max_points,
        tier,
        tier_scheme: scheme,
        skill_breakdown,
        skill_tiers,
        strengths,
        weaknesses,
        recommendations,
        next_steps,
        questions: scored,
    })
}

/// Awards credit for one question. A missing answer earns zero.
pub fn score_question(question: &Question, answer: Option<&AnswerValue>) -> Result<u32, ScoringError> {
    let Some(answer) = answer else {
        return Ok(0);
    };

    let unscorable = |reason: &str| ScoringError::UnscorableAnswer {
        question_id: question.id.clone(),
        reason: reason.to_string(),
    };

    match (&question.kind, answer) {
        (
            QuestionKind::SingleChoice {
                correct_option_index,
                ..
            },
            AnswerValue::Choice(chosen),
        ) => Ok(if chosen == correct_option_index {
            question.points
        } else {
            0
        }),
        (
            QuestionKind::FreeText {
                heuristic,
                minimum_length_for_credit,
            },
            AnswerValue::Text(text),
        ) => {
            let threshold = minimum_length_for_credit.unwrap_or_else(|| heuristic.default_threshold());
            if text.trim().chars().count() > threshold {
                let credit = u64::from(question.points) * u64::from(heuristic.credit_tenths()) / 10;
                Ok(credit as u32)
            } else {
                Ok(0)
            }
        }
        (QuestionKind::SingleChoice { .. }, AnswerValue::Text(_)) => {
            Err(unscorable("expected an option index, got free text"))
        }
        (QuestionKind::FreeText { .. }, AnswerValue::Choice(_)) => {
            Err(unscorable("expected free text, got an option index"))
        }
        (QuestionKind::Unsupported, _) => Err(unscorable("question kind is not supported")),
    }
}

/// Rejects question sets that cannot produce a meaningful percentage.
pub fn validate_questions(questions: &[Question]) -> Result<(), ScoringError> {
    if questions.is_empty() {
        return Err(ScoringError::InvalidAssessment(
            "assessment has no questions".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for q in questions {
        if !seen.insert(q.id.as_str()) {
            return Err(ScoringError::InvalidAssessment(format!(
                "duplicate question id '{}'",
                q.id
            )));
        }
        if q.points == 0 {
            return Err(ScoringError::InvalidAssessment(format!(
                "question '{}' must be worth at least one point",
                q.id
            )));
        }
        if q.skill.trim().is_empty() {
            return Err(ScoringError::InvalidAssessment(format!(
                "question '{}' has no skill label",
                q.id
            )));
        }
        if let QuestionKind::SingleChoice {
            options,
            correct_option_index,
        } = &q.kind
        {
            if *correct_option_index >= options.len() {
                return Err(ScoringError::InvalidAssessment(format!(
                    "question '{}' marks option {} correct but has {} options",
                    q.id,
                    correct_option_index,
                    options.len()
                )));
            }
        }
    }
    Ok(())
}

fn percentage(awarded: u64, max: u64) -> u32 {
    if max == 0 {
        return 0;
    }
    ((awarded as f64 * 100.0) / max as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::models::{answer_sheet, Answer, CreditHeuristic};
    use crate::assessment::tiers::Tier;

    fn choice(id: &str, skill: &str, points: u32, correct: usize) -> Question {
        Question {
            id: id.to_string(),
            skill: skill.to_string(),
            points,
            prompt: format!("Question {id}"),
            kind: QuestionKind::SingleChoice {
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_option_index: correct,
            },
        }
    }

    fn free_text(id: &str, skill: &str, points: u32, heuristic: CreditHeuristic) -> Question {
        Question {
            id: id.to_string(),
            skill: skill.to_string(),
            points,
            prompt: format!("Question {id}"),
            kind: QuestionKind::FreeText {
                heuristic,
                minimum_length_for_credit: None,
            },
        }
    }

    fn sheet(entries: &[(&str, AnswerValue)]) -> AnswerSheet {
        entries
            .iter()
            .map(|(id, v)| (id.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_end_to_end_logic_scenario() {
        let questions = vec![
            choice("q1", "Logic", 10, 1),
            choice("q2", "Logic", 10, 0),
            choice("q3", "Logic", 10, 2),
        ];
        let answers = sheet(&[
            ("q1", AnswerValue::Choice(1)),
            ("q2", AnswerValue::Choice(1)),
            ("q3", AnswerValue::Choice(2)),
        ]);

        let result = score(&questions, &answers).unwrap();
        let awarded: Vec<u32> = result.questions.iter().map(|q| q.awarded_points).collect();
        assert_eq!(awarded, vec![10, 0, 10]);
        assert_eq!(result.skill_breakdown["Logic"], 67);
        assert_eq!(result.overall_score, 67);
        assert_eq!(result.tier, Tier::Beginner);
        assert!(result.weaknesses.is_empty());
        assert!(result.strengths.is_empty());
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_full_marks() {
        let questions = vec![
            choice("q1", "Programming", 10, 0),
            choice("q2", "Logic", 5, 3),
            choice("q3", "Communication", 15, 2),
        ];
        let answers = sheet(&[
            ("q1", AnswerValue::Choice(0)),
            ("q2", AnswerValue::Choice(3)),
            ("q3", AnswerValue::Choice(2)),
        ]);

        let result = score(&questions, &answers).unwrap();
        assert_eq!(result.overall_score, 100);
        assert!(result.skill_breakdown.values().all(|&s| s == 100));
        assert_eq!(result.tier, Tier::Expert);
        assert_eq!(result.strengths.len(), 3);
        assert!(next_steps_mention(&result, "certification"));
    }

    #[test]
    fn test_zero_marks_with_empty_answers() {
        let questions = vec![
            choice("q1", "Programming", 10, 0),
            free_text("q2", "Logic", 20, CreditHeuristic::DetailBased),
        ];

        let result = score(&questions, &AnswerSheet::new()).unwrap();
        assert_eq!(result.overall_score, 0);
        assert_eq!(result.awarded_points, 0);
        assert_eq!(result.max_points, 30);
        assert_eq!(result.weaknesses, vec!["Logic", "Programming"]);
        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(result.tier, Tier::Novice);
        assert!(next_steps_mention(&result, "fundamentals"));
    }

    #[test]
    fn test_correcting_an_answer_never_lowers_score() {
        let questions = vec![
            choice("q1", "Logic", 10, 1),
            choice("q2", "Programming", 25, 2),
            free_text("q3", "Programming", 20, CreditHeuristic::AttemptBased),
        ];
        let mut answers = sheet(&[
            ("q1", AnswerValue::Choice(0)),
            ("q2", AnswerValue::Choice(0)),
            ("q3", AnswerValue::Text("short".into())),
        ]);

        let before = score(&questions, &answers).unwrap().overall_score;
        answers.insert("q2".to_string(), AnswerValue::Choice(2));
        let after = score(&questions, &answers).unwrap().overall_score;
        assert!(after >= before, "{after} < {before}");
        assert!(after > before);
    }

    #[test]
    fn test_attempt_based_threshold_is_strict() {
        let q = free_text("code", "Programming", 20, CreditHeuristic::AttemptBased);
        let over = AnswerValue::Text("x".repeat(21));
        let at = AnswerValue::Text("x".repeat(20));
        assert_eq!(score_question(&q, Some(&over)).unwrap(), 14);
        assert_eq!(score_question(&q, Some(&at)).unwrap(), 0);
    }

    #[test]
    fn test_free_text_length_is_measured_after_trimming() {
        let q = free_text("code", "Programming", 20, CreditHeuristic::AttemptBased);
        let padded = AnswerValue::Text(format!("   {}   \n", "x".repeat(20)));
        assert_eq!(score_question(&q, Some(&padded)).unwrap(), 0);
    }

    #[test]
    fn test_free_text_length_counts_characters_not_bytes() {
        let q = free_text("short", "Culture", 10, CreditHeuristic::PresenceBased);
        // 10 characters, 20 bytes
        let answer = AnswerValue::Text("éééééééééé".to_string());
        assert_eq!(score_question(&q, Some(&answer)).unwrap(), 0);
    }

    #[test]
    fn test_detail_based_credit() {
        let q = free_text("scenario", "Leadership", 15, CreditHeuristic::DetailBased);
        let long = AnswerValue::Text("y".repeat(51));
        let short = AnswerValue::Text("y".repeat(50));
        // floor(15 × 0.8) = 12
        assert_eq!(score_question(&q, Some(&long)).unwrap(), 12);
        assert_eq!(score_question(&q, Some(&short)).unwrap(), 0);
    }

    #[test]
    fn test_presence_based_credit() {
        let q = free_text("short", "Communication", 5, CreditHeuristic::PresenceBased);
        let answer = AnswerValue::Text("active listening".to_string());
        // floor(5 × 0.8) = 4
        assert_eq!(score_question(&q, Some(&answer)).unwrap(), 4);
    }

    #[test]
    fn test_threshold_override() {
        let q = Question {
            kind: QuestionKind::FreeText {
                heuristic: CreditHeuristic::AttemptBased,
                minimum_length_for_credit: Some(5),
            },
            ..free_text("code", "Programming", 10, CreditHeuristic::AttemptBased)
        };
        let answer = AnswerValue::Text("abcdef".to_string());
        assert_eq!(score_question(&q, Some(&answer)).unwrap(), 7);
    }

    #[test]
    fn test_skill_aggregation() {
        let questions = vec![
            choice("q1", "Programming", 10, 0),
            choice("q2", "Programming", 20, 0),
        ];
        let answers = sheet(&[
            ("q1", AnswerValue::Choice(0)),
            ("q2", AnswerValue::Choice(1)),
        ]);

        let result = score(&questions, &answers).unwrap();
        assert_eq!(result.skill_breakdown["Programming"], 33);
        assert_eq!(result.skill_breakdown.len(), 1);
    }

    #[test]
    fn test_skill_labels_are_case_sensitive() {
        let questions = vec![
            choice("q1", "Programming", 10, 0),
            choice("q2", "programming", 10, 0),
        ];
        let result = score(&questions, &AnswerSheet::new()).unwrap();
        assert_eq!(result.skill_breakdown.len(), 2);
    }

    #[test]
    fn test_stray_answers_are_ignored() {
        let questions = vec![choice("q1", "Logic", 10, 1), choice("q2", "Logic", 10, 0)];
        let answers = answer_sheet(vec![Answer {
            question_id: "q1".into(),
            value: AnswerValue::Choice(1),
        }]);
        let mut with_stray = answers.clone();
        with_stray.insert("nope".to_string(), AnswerValue::Choice(0));

        let a = score(&questions, &answers).unwrap();
        let b = score(&questions, &with_stray).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.overall_score, 50);
    }

    #[test]
    fn test_overall_tier_boundaries() {
        // 80 / 100 → Advanced, 79 / 100 → Intermediate
        let questions = vec![choice("q1", "Logic", 80, 0), choice("q2", "Logic", 20, 0)];
        let answers = sheet(&[("q1", AnswerValue::Choice(0))]);
        let result = score(&questions, &answers).unwrap();
        assert_eq!(result.overall_score, 80);
        assert_eq!(result.tier, Tier::Advanced);
        assert_eq!(result.strengths, vec!["Logic"]);

        let questions = vec![choice("q1", "Logic", 79, 0), choice("q2", "Logic", 21, 0)];
        let result = score(&questions, &answers).unwrap();
        assert_eq!(result.overall_score, 79);
        assert_eq!(result.tier, Tier::Intermediate);
    }

    #[test]
    fn test_quintile_scheme_applies_to_overall_and_skills() {
        let questions = vec![
            choice("q1", "Logic", 10, 0),
            choice("q2", "Design", 10, 0),
        ];
        let answers = sheet(&[("q1", AnswerValue::Choice(0))]);
        let result = score_with_scheme(&questions, &answers, TierScheme::Quintile).unwrap();
        assert_eq!(result.overall_score, 50);
        assert_eq!(result.tier, Tier::Intermediate);
        assert_eq!(result.tier_scheme, TierScheme::Quintile);
        assert_eq!(result.skill_tiers["Logic"], Tier::Expert);
        assert_eq!(result.skill_tiers["Design"], Tier::Novice);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let questions = vec![
            choice("q1", "Logic", 10, 1),
            free_text("q2", "Programming", 20, CreditHeuristic::AttemptBased),
            choice("q3", "Communication", 5, 0),
        ];
        let answers = sheet(&[
            ("q1", AnswerValue::Choice(1)),
            ("q2", AnswerValue::Text("fn add(a: i32, b: i32) -> i32 { a + b }".into())),
        ]);
        let first = score(&questions, &answers).unwrap();
        let second = score(&questions, &answers).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_question_list_is_invalid() {
        let err = score(&[], &AnswerSheet::new()).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidAssessment(_)));
    }

    #[test]
    fn test_zero_point_question_is_invalid() {
        let err = score(&[choice("q1", "Logic", 0, 0)], &AnswerSheet::new()).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidAssessment(_)));
    }

    #[test]
    fn test_duplicate_ids_are_invalid() {
        let questions = vec![choice("q1", "Logic", 10, 0), choice("q1", "Logic", 10, 0)];
        let err = validate_questions(&questions).unwrap_err();
        assert_eq!(
            err,
            ScoringError::InvalidAssessment("duplicate question id 'q1'".to_string())
        );
    }

    #[test]
    fn test_out_of_range_correct_option_is_invalid() {
        let err = validate_questions(&[choice("q1", "Logic", 10, 4)]).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidAssessment(_)));
    }

    #[test]
    fn test_blank_skill_is_invalid() {
        let err = validate_questions(&[choice("q1", "  ", 10, 0)]).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidAssessment(_)));
    }

    #[test]
    fn test_mismatched_answer_is_unscorable_but_does_not_abort() {
        let questions = vec![
            choice("q1", "Logic", 10, 0),
            choice("q2", "Logic", 10, 1),
        ];
        let answers = sheet(&[
            ("q1", AnswerValue::Text("zero".into())),
            ("q2", AnswerValue::Choice(1)),
        ]);

        assert!(matches!(
            score_question(&questions[0], answers.get("q1")),
            Err(ScoringError::UnscorableAnswer { .. })
        ));

        let result = score(&questions, &answers).unwrap();
        assert_eq!(result.overall_score, 50);
        assert!(result.questions[0].unscorable);
        assert!(!result.questions[1].unscorable);
    }

    #[test]
    fn test_unsupported_kind_is_unscorable() {
        let q = Question {
            id: "dnd".into(),
            skill: "Design".into(),
            points: 10,
            prompt: "Drag".into(),
            kind: QuestionKind::Unsupported,
        };
        let err = score_question(&q, Some(&AnswerValue::Choice(0))).unwrap_err();
        assert!(matches!(err, ScoringError::UnscorableAnswer { .. }));

        // Unanswered unsupported questions still count towards the max.
        let result = score(&[q], &AnswerSheet::new()).unwrap();
        assert_eq!(result.max_points, 10);
        assert_eq!(result.overall_score, 0);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 0), 0);
    }

    fn next_steps_mention(result: &AssessmentResult, needle: &str) -> bool {
        result.next_steps.iter().any(|s| s.contains(needle))
    }
}
