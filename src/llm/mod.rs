//! LLM module for briefly
//!
//! Prompt templates, the Gemini client, and request dispatch with
//! cancellation and timeout.

mod client;
mod gemini;
mod prompts;

pub use client::{build_provider, LlmProvider, RequestDispatcher};
pub use gemini::GeminiClient;
pub use prompts::build_prompt;

#[cfg(test)]
pub(crate) use client::testing;
