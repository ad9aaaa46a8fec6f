//! briefly - Summarize text into a summary plus key takeaways
//!
//! Text goes through a prompt template, a single Gemini call and a heuristic
//! response parser. A background daemon keeps at most one request in flight.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod llm;
pub mod summary;
pub mod translation;

use thiserror::Error;

pub use summary::SummarizeError;

/// Main error type for briefly
#[derive(Error, Debug)]
pub enum BrieflyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BrieflyError>;

