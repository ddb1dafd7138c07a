// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

/// Instruction appended to prompts whose output is shown to the user verbatim.
pub const PLAIN_TEXT_ONLY: &str = "\
    Respond strictly with the rewritten content only, no preamble or explanations.";
