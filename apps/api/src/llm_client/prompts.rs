// Shared prompt constants.
// Each feature that needs LLM calls defines its own prompts alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Persona shared by every career-guidance prompt.
pub const CAREER_ADVISOR_PERSONA: &str = "You are an experienced career advisor and \
    technical recruiter. You give concrete, encouraging, actionable guidance. \
    You never invent facts about the user that they did not provide.";

/// Fills `{name}` placeholders in one pass over `template`.
/// Substituted values are not scanned again, so braces in user text stay literal.
/// Unknown `{...}` sequences (such as JSON schema examples) are copied through.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
