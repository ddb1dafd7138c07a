// Resume storage and AI-assisted section rewriting.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod cache;
pub mod handlers;
pub mod prompts;
pub mod service;
pub mod store;
