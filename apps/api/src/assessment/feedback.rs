use crate::assessment::models::SkillBreakdown;

/// Skills scoring at or above this are strengths.
pub const STRENGTH_THRESHOLD: u32 = 80;
/// Skills scoring below this are weaknesses.
pub const WEAKNESS_THRESHOLD: u32 = 60;

/// Skills with breakdown ≥ 80, highest first (ties by label).
pub fn strengths(breakdown: &SkillBreakdown) -> Vec<String> {
    let mut picked: Vec<(&String, u32)> = breakdown
        .iter()
        .filter(|(_, &score)| score >= STRENGTH_THRESHOLD)
        .map(|(skill, &score)| (skill, score))
        .collect();
    picked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    picked.into_iter().map(|(skill, _)| skill.clone()).collect()
}

/// Skills with breakdown < 60, lowest first (ties by label).
pub fn weaknesses(breakdown: &SkillBreakdown) -> Vec<String> {
    let mut picked: Vec<(&String, u32)> = breakdown
        .iter()
        .filter(|(_, &score)| score < WEAKNESS_THRESHOLD)
        .map(|(skill, &score)| (skill, score))
        .collect();
    picked.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    picked.into_iter().map(|(skill, _)| skill.clone()).collect()
}

/// One sentence per weak skill.
pub fn recommendations(weaknesses: &[String]) -> Vec<String> {
    weaknesses
        .iter()
        .map(|skill| format!("Focus on improving {skill} through additional practice."))
        .collect()
}

/// Fixed guidance keyed off the overall score bucket.
pub fn next_steps(overall_score: u32) -> Vec<String> {
    let steps: &[&str] = if overall_score >= 80 {
        &[
            "Take the advanced assessments for your strongest skills.",
            "Pursue an industry certification to validate your expertise.",
            "Consider mentoring others to deepen your mastery.",
        ]
    } else if overall_score >= 60 {
        &[
            "Review the questions you missed and the concepts behind them.",
            "Complete supplementary learning modules for your weaker skills.",
            "Retake the assessment once you have practiced.",
        ]
    } else {
        &[
            "Revisit the fundamentals before moving on to advanced material.",
            "Work through the prerequisite modules on your learning roadmap.",
            "Schedule regular practice sessions and track your progress weekly.",
        ]
    };
    steps.iter().map(|s| s.to_string()).collect()
}
