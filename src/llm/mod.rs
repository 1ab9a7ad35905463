//! LLM-backed collaborators
//!
//! A Groq-compatible chat-completions client plus the three prompts built on
//! it: triple extraction, entity extraction, and answer generation. Extraction
//! failures of any kind degrade to an empty result so a request never fails
//! solely because extraction failed; generation failures surface to the
//! caller as an error they render into the answer string.

pub mod client;
pub mod extract;

pub use client::LlmClient;
pub use extract::{extract_entities, extract_triples, generate_answer};
