// LLM prompt templates for the resume module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::PLAIN_TEXT_ONLY;

/// Industry used when the user has not set one on their profile.
pub const DEFAULT_INDUSTRY: &str = "general";

/// Section improvement prompt template.
/// Replace: {section_type}, {industry}, {current}, {plain_text_only}
pub const IMPROVE_SECTION_PROMPT_TEMPLATE: &str = r#"As an expert resume writer, improve the following {section_type} description for a {industry} professional.
Make it more impactful, quantifiable, and aligned with industry standards.
Current content: "{current}"

Requirements:
1. Use action verbs
2. Include metrics and results where possible
3. Highlight relevant technical skills
4. Keep it concise but detailed
5. Focus on achievements over responsibilities
6. Use industry-specific keywords

{plain_text_only}
Format the response as a single paragraph."#;

pub fn build_improve_prompt(current: &str, section_type: &str, industry: Option<&str>) -> String {
    let industry = industry
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(DEFAULT_INDUSTRY);

    fill_template(
        IMPROVE_SECTION_PROMPT_TEMPLATE,
        &[
            ("plain_text_only", PLAIN_TEXT_ONLY),
            ("section_type", section_type),
            ("industry", industry),
            ("current", current),
        ],
    )
}

/// Substitutes `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are copied verbatim and never rescanned. Unknown or
/// unterminated `{...}` sequences are kept as literal text.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
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
