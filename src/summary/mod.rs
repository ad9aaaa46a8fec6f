//! Summarization pipeline for briefly
//!
//! Builds a prompt, dispatches it to the provider, and splits the raw answer
//! into a summary and a list of key takeaways.

mod error;
pub mod guard;
pub mod input;
pub mod parser;
pub mod service;
pub mod session;

pub use error::SummarizeError;
pub use guard::{GuardOutcome, GuardStatus, RequestGuard};
pub use input::prepare_input;
pub use parser::parse_response;
pub use service::SummarizationService;
pub use session::SummarySession;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest custom instruction accepted, in characters.
pub const MAX_CUSTOM_INSTRUCTION_CHARS: usize = 500;

/// Summarization style, selects the prompt template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SummarizationMode {
    /// Concise summary with a few actionable takeaways
    #[default]
    Brief,
    /// Comprehensive summary with 3-5 actionable takeaways
    Detailed,
    /// Markdown bullet summary with bold section headers
    BulletPoints,
    /// User-provided instruction
    Customize,
}

impl SummarizationMode {
    pub const ALL: [SummarizationMode; 4] = [
        Self::Brief,
        Self::Detailed,
        Self::BulletPoints,
        Self::Customize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Detailed => "detailed",
            Self::BulletPoints => "bullet_points",
            Self::Customize => "customize",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Brief => "Concise summary followed by actionable key takeaways",
            Self::Detailed => "Comprehensive summary followed by 3-5 actionable key takeaways",
            Self::BulletPoints => "Markdown bullet summary with bold headers and labelled takeaways",
            Self::Customize => "Your own instruction (summary.custom_prompt or --instruction)",
        }
    }
}

impl fmt::Display for SummarizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummarizationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "brief" => Ok(Self::Brief),
            "detailed" => Ok(Self::Detailed),
            "bullet_points" | "bullets" => Ok(Self::BulletPoints),
            "customize" | "custom" => Ok(Self::Customize),
            other => Err(format!(
                "Unknown mode '{}'. Supported modes: brief, detailed, bullet_points, customize",
                other
            )),
        }
    }
}

/// One summarization job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizationRequest {
    /// Text to summarize
    pub input_text: String,

    /// Prompt template selector
    pub mode: SummarizationMode,

    /// Only used when mode is `customize`
    #[serde(default)]
    pub custom_instruction: Option<String>,

    /// MIME type hint from the file handler, informational only
    #[serde(default)]
    pub source_mime: Option<String>,
}

impl SummarizationRequest {
    pub fn new(input_text: impl Into<String>, mode: SummarizationMode) -> Self {
        Self {
            input_text: input_text.into(),
            mode,
            custom_instruction: None,
            source_mime: None,
        }
    }

    pub fn with_instruction(mut self, instruction: Option<String>) -> Self {
        self.custom_instruction = instruction;
        self
    }

    pub fn with_source_mime(mut self, mime: Option<String>) -> Self {
        self.source_mime = mime;
        self
    }

    /// Reject requests that must never reach the prompt builder.
    pub fn validate(&self) -> Result<(), SummarizeError> {
        if self.input_text.trim().is_empty() {
            return Err(SummarizeError::EmptyInput);
        }

        if let Some(instruction) = &self.custom_instruction {
            let len = instruction.chars().count();
            if len > MAX_CUSTOM_INSTRUCTION_CHARS {
                return Err(SummarizeError::InstructionTooLong {
                    len,
                    limit: MAX_CUSTOM_INSTRUCTION_CHARS,
                });
            }
        }

        Ok(())
    }
}

/// Parsed provider answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizationResult {
    pub summary: String,
    pub takeaways: Vec<String>,
}
