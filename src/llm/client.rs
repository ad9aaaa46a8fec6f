use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::llm::gemini::GeminiClient;
use crate::summary::SummarizeError;

/// A language-model backend that turns one prompt into raw text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Send a single prompt. Implementations never retry.
    async fn generate(&self, prompt: &str) -> Result<String, SummarizeError>;
}

/// Build an LLM provider from runtime settings.
pub fn build_provider(settings: &Settings) -> Result<Arc<dyn LlmProvider>> {
    match settings.llm.provider.to_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::from_settings(settings)?)),
        other => anyhow::bail!(
            "Unsupported llm.provider '{}'. Supported providers: gemini",
            other
        ),
    }
}

/// Sends prompts to a provider with cooperative cancellation and a deadline.
#[derive(Clone)]
pub struct RequestDispatcher {
    provider: Arc<dyn LlmProvider>,
}

impl RequestDispatcher {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Dispatch one prompt.
    ///
    /// Resolves to `Cancelled` when `cancel` fires first and to `TimedOut`
    /// when `timeout` elapses first; on timeout `cancel` is triggered so other
    /// holders of the token observe it.
    pub async fn dispatch(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<String, SummarizeError> {
        if cancel.is_cancelled() {
            return Err(SummarizeError::Cancelled);
        }

        debug!(
            "Dispatching {} character prompt to {}",
            prompt.chars().count(),
            self.provider.name()
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Request to {} cancelled", self.provider.name());
                Err(SummarizeError::Cancelled)
            }
            _ = tokio::time::sleep(timeout) => {
                warn!(
                    "Request to {} timed out after {:?}",
                    self.provider.name(),
                    timeout
                );
                cancel.cancel();
                Err(SummarizeError::TimedOut {
                    secs: whole_secs_rounded_up(timeout),
                })
            }
            result = self.provider.generate(prompt) => result,
        }
    }
}

/// Seconds for user-facing messages; sub-second remainders count as a full second.
fn whole_secs_rounded_up(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One scripted provider reply.
    pub enum Reply {
        Text(&'static str),
        Fail(SummarizeError),
        /// Resolve with text after a delay.
        Delayed(Duration, &'static str),
        /// Never resolve.
        Hang,
    }

    /// In-process provider that replays scripted replies and records prompts.
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Reply>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String, SummarizeError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Text(text)) => Ok(text.to_string()),
                Some(Reply::Fail(err)) => Err(err),
                Some(Reply::Delayed(delay, text)) => {
                    tokio::time::sleep(delay).await;
                    Ok(text.to_string())
                }
                Some(Reply::Hang) | None => std::future::pending().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Reply, ScriptedProvider};
    use super::*;
    use crate::config::Settings;

    #[test]
    fn unsupported_provider_returns_error() {
        let mut settings = Settings::default();
        settings.llm.provider = "unknown".to_string();

        let err = match build_provider(&settings) {
            Ok(_) => panic!("expected provider creation to fail"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("Unsupported llm.provider"));
    }

    #[test]
    fn gemini_provider_requires_api_key() {
        let settings = Settings::default();

        let err = match build_provider(&settings) {
            Ok(_) => panic!("expected provider creation to fail"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("Gemini API key is missing"));
    }

    #[tokio::test]
    async fn returns_provider_text() {
        let dispatcher = RequestDispatcher::new(ScriptedProvider::new(vec![Reply::Text("ok")]));
        let text = dispatcher
            .dispatch("prompt", &CancellationToken::new(), Duration::from_secs(5))
            .await;
        assert_eq!(text, Ok("ok".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_provider_times_out_and_cancels_token() {
        let dispatcher = RequestDispatcher::new(ScriptedProvider::new(vec![Reply::Hang]));
        let cancel = CancellationToken::new();

        let result = dispatcher
            .dispatch("prompt", &cancel, Duration::from_secs(30))
            .await;

        assert_eq!(result, Err(SummarizeError::TimedOut { secs: 30 }));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn sub_second_timeout_reports_at_least_one_second() {
        let dispatcher = RequestDispatcher::new(ScriptedProvider::new(vec![Reply::Hang]));

        let result = dispatcher
            .dispatch("prompt", &CancellationToken::new(), Duration::from_millis(500))
            .await;

        assert_eq!(result, Err(SummarizeError::TimedOut { secs: 1 }));
        assert_eq!(whole_secs_rounded_up(Duration::from_millis(1500)), 2);
        assert_eq!(whole_secs_rounded_up(Duration::from_secs(30)), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_wins_over_late_response() {
        let dispatcher = RequestDispatcher::new(ScriptedProvider::new(vec![Reply::Delayed(
            Duration::from_secs(10),
            "late",
        )]));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result = dispatcher
            .dispatch("prompt", &cancel, Duration::from_secs(30))
            .await;
        assert_eq!(result, Err(SummarizeError::Cancelled));
    }

    #[tokio::test]
    async fn already_cancelled_token_skips_provider() {
        let provider = ScriptedProvider::new(vec![Reply::Text("unused")]);
        let dispatcher = RequestDispatcher::new(provider.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = dispatcher
            .dispatch("prompt", &cancel, Duration::from_secs(5))
            .await;
        assert_eq!(result, Err(SummarizeError::Cancelled));
        assert_eq!(provider.prompt_count(), 0);
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let dispatcher = RequestDispatcher::new(ScriptedProvider::new(vec![Reply::Fail(
            SummarizeError::ProviderEmptyResponse,
        )]));
        let result = dispatcher
            .dispatch("prompt", &CancellationToken::new(), Duration::from_secs(5))
            .await;
        assert_eq!(result, Err(SummarizeError::ProviderEmptyResponse));
    }
}
