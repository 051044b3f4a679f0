// All LLM prompt constants for the AI features.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Interview question prompt. Replace `{role}`, `{level}` and `{count}` before sending.
pub const INTERVIEW_PROMPT_TEMPLATE: &str = r#"Generate {count} interview questions for a {level} {role} candidate.

Mix behavioral, technical and situational questions appropriate to the role.

Return a JSON object with this EXACT schema (no extra fields):
{
  "questions": [
    {
      "question": "Tell me about a time you disagreed with a teammate.",
      "category": "behavioral",
      "difficulty": "medium",
      "tips": ["Use the STAR method", "Focus on the resolution"]
    }
  ]
}

"category" must be one of: behavioral, technical, situational.
"difficulty" must be one of: easy, medium, hard."#;

/// Resume analysis prompt. Replace `{target_role}` and `{resume_text}` before sending.
pub const RESUME_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume for a candidate targeting: {target_role}.

Return a JSON object with this EXACT schema (no extra fields):
{
  "overall_score": 72,
  "strengths": ["Clear progression of responsibility"],
  "improvements": ["Quantify the impact of each role"],
  "missing_keywords": ["CI/CD"],
  "summary": "One or two sentence overall assessment."
}

"overall_score" is an integer from 0 to 100.

RESUME:
{resume_text}"#;

/// Chat prompt. Replace `{transcript}` and `{message}` before sending.
pub const CHAT_PROMPT_TEMPLATE: &str = r#"Conversation so far:
{transcript}

User: {message}

Reply to the user's latest message as their career advisor. Be concise (under 200 words)."#;
