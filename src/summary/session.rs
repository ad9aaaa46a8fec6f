//! Session-scoped context: last input and last result of one user session

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::summary::guard::{GuardOutcome, RequestGuard};
use crate::summary::{
    SummarizationMode, SummarizationRequest, SummarizationResult, SummarizeError,
};

#[derive(Debug, Default)]
struct SessionContext {
    last_request: Option<SummarizationRequest>,
    last_result: Option<SummarizationResult>,
}

/// Entry point for a UI session. Cheap to clone; clones share the guard.
#[derive(Clone)]
pub struct SummarySession {
    guard: RequestGuard,
    context: Arc<Mutex<SessionContext>>,
}

impl SummarySession {
    pub fn new(guard: RequestGuard) -> Self {
        Self {
            guard,
            context: Arc::new(Mutex::new(SessionContext::default())),
        }
    }

    pub fn guard(&self) -> &RequestGuard {
        &self.guard
    }

    /// Summarize and remember the input for later regeneration.
    ///
    /// Returns `Ok(None)` when a newer request superseded this one.
    pub async fn request_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<Option<SummarizationResult>, SummarizeError> {
        request.validate()?;
        self.context.lock().await.last_request = Some(request.clone());

        match self.guard.summarize(request).await? {
            GuardOutcome::Completed(result) => {
                self.context.lock().await.last_result = Some(result.clone());
                Ok(Some(result))
            }
            GuardOutcome::Superseded => {
                debug!("Session request superseded");
                Ok(None)
            }
        }
    }

    /// Summarize the last input again ("try again" or a mode change).
    ///
    /// `None` keeps the mode of the last request.
    pub async fn regenerate(
        &self,
        mode: Option<SummarizationMode>,
    ) -> Result<Option<SummarizationResult>, SummarizeError> {
        let previous = self.context.lock().await.last_request.clone();
        let Some(mut request) = previous else {
            return Err(SummarizeError::EmptyInput);
        };

        if let Some(mode) = mode {
            request.mode = mode;
        }
        debug!("Regenerating last input in {} mode", request.mode);
        self.request_summary(request).await
    }

    pub async fn last_result(&self) -> Option<SummarizationResult> {
        self.context.lock().await.last_result.clone()
    }

    pub async fn last_mode(&self) -> Option<SummarizationMode> {
        self.context
            .lock()
            .await
            .last_request
            .as_ref()
            .map(|request| request.mode)
    }

    /// Forget the remembered input and cancel anything in flight.
    pub async fn clear(&self) {
        self.guard.cancel().await;
        *self.context.lock().await = SessionContext::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{Reply, ScriptedProvider};
    use crate::summary::service::SummarizationService;
    use std::time::Duration;

    fn session_with(replies: Vec<Reply>) -> (SummarySession, Arc<ScriptedProvider>) {
        let provider = ScriptedProvider::new(replies);
        let service = SummarizationService::new(provider.clone(), Duration::from_secs(30));
        (SummarySession::new(RequestGuard::new(service)), provider)
    }

    #[tokio::test]
    async fn regenerate_reuses_last_input_with_new_mode() {
        let (session, provider) = session_with(vec![
            Reply::Text("Short.\nKey Takeaways\n- one"),
            Reply::Text("Long.\nKey Takeaways\n- one\n- two"),
        ]);

        let first = session
            .request_summary(SummarizationRequest::new(
                "Source text",
                SummarizationMode::Brief,
            ))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.takeaways.len(), 1);

        let second = session
            .regenerate(Some(SummarizationMode::Detailed))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.summary, "Long.");
        assert_eq!(session.last_mode().await, Some(SummarizationMode::Detailed));
        assert_eq!(session.last_result().await, Some(second));

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[1].contains("Source text"));
        assert!(prompts[1].contains("3-5 actionable insights"));
    }

    #[tokio::test]
    async fn regenerate_without_input_is_empty_input() {
        let (session, _) = session_with(vec![]);
        assert_eq!(
            session.regenerate(None).await,
            Err(SummarizeError::EmptyInput)
        );
    }

    #[tokio::test]
    async fn regenerate_without_mode_keeps_last_mode() {
        let (session, provider) = session_with(vec![Reply::Text("One."), Reply::Text("Two.")]);
        session
            .request_summary(SummarizationRequest::new("text", SummarizationMode::BulletPoints))
            .await
            .unwrap();

        let again = session.regenerate(None).await.unwrap().unwrap();

        assert_eq!(again.summary, "Two.");
        assert_eq!(session.last_mode().await, Some(SummarizationMode::BulletPoints));
        assert!(provider.prompts.lock().unwrap()[1].contains("Key Takeaway 1"));
    }

    #[tokio::test]
    async fn clear_forgets_context() {
        let (session, _) = session_with(vec![Reply::Text("Done.")]);
        session
            .request_summary(SummarizationRequest::new("text", SummarizationMode::Brief))
            .await
            .unwrap();

        session.clear().await;

        assert_eq!(session.last_result().await, None);
        assert_eq!(session.last_mode().await, None);
    }

    #[tokio::test]
    async fn failed_request_keeps_previous_result() {
        let (session, _) = session_with(vec![
            Reply::Text("Kept."),
            Reply::Fail(SummarizeError::ProviderEmptyResponse),
        ]);

        session
            .request_summary(SummarizationRequest::new("text", SummarizationMode::Brief))
            .await
            .unwrap();
        let failed = session.regenerate(Some(SummarizationMode::BulletPoints)).await;

        assert_eq!(failed, Err(SummarizeError::ProviderEmptyResponse));
        assert_eq!(
            session.last_result().await.map(|r| r.summary),
            Some("Kept.".to_string())
        );
    }
}
