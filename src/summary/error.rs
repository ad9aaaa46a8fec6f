use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of a single summarization request
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummarizeError {
    #[error("Nothing to summarize: the input text is empty")]
    EmptyInput,

    #[error("Custom instruction is too long ({len} characters, limit is {limit})")]
    InstructionTooLong { len: usize, limit: usize },

    #[error(
        "Provider request failed with status {status}: {}",
        message.as_deref().unwrap_or("could not parse error details")
    )]
    ProviderHttp { status: u16, message: Option<String> },

    #[error("Empty response from provider: no valid content in response")]
    ProviderEmptyResponse,

    #[error("Provider request failed: {0}")]
    Network(String),

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Request timed out after {secs}s. Please try again with shorter input.")]
    TimedOut { secs: u64 },
}

impl SummarizeError {
    /// Whether the error should be shown to the user.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_without_details_says_so() {
        let err = SummarizeError::ProviderHttp {
            status: 502,
            message: None,
        };
        assert_eq!(
            err.to_string(),
            "Provider request failed with status 502: could not parse error details"
        );
    }

    #[test]
    fn timeout_suggests_shorter_input() {
        let err = SummarizeError::TimedOut { secs: 30 };
        assert!(err.to_string().contains("shorter input"));
        assert!(err.is_user_facing());
        assert!(!SummarizeError::Cancelled.is_user_facing());
    }
}
