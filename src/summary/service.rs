//! Prompt -> dispatch -> parse orchestration

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::llm::{build_prompt, LlmProvider, RequestDispatcher};
use crate::summary::parser::parse_response;
use crate::summary::{SummarizationRequest, SummarizationResult, SummarizeError};

/// Default provider deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Stateless summarization: every call performs a fresh provider request.
#[derive(Clone)]
pub struct SummarizationService {
    dispatcher: RequestDispatcher,
    timeout: Duration,
}

impl SummarizationService {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self {
            dispatcher: RequestDispatcher::new(provider),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Summarize with a private cancellation token.
    pub async fn summarize(
        &self,
        request: &SummarizationRequest,
    ) -> Result<SummarizationResult, SummarizeError> {
        self.summarize_with(request, &CancellationToken::new()).await
    }

    /// Summarize, aborting when `cancel` fires.
    pub async fn summarize_with(
        &self,
        request: &SummarizationRequest,
        cancel: &CancellationToken,
    ) -> Result<SummarizationResult, SummarizeError> {
        request.validate()?;

        if let Some(mime) = &request.source_mime {
            debug!("Input originates from a {} source", mime);
        }

        let prompt = build_prompt(
            request.mode,
            &request.input_text,
            request.custom_instruction.as_deref(),
        );

        let raw = self.dispatcher.dispatch(&prompt, cancel, self.timeout).await?;
        if raw.trim().is_empty() {
            return Err(SummarizeError::ProviderEmptyResponse);
        }

        let result = parse_response(&raw);
        info!(
            "Summarized {} characters in {} mode ({} takeaways)",
            request.input_text.chars().count(),
            request.mode,
            result.takeaways.len()
        );

        Ok(result)
    }
}
