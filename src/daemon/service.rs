//! Main daemon service: the single actor that owns the summary session

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::daemon::ipc::{DaemonRequest, DaemonResponse};
use crate::daemon::server::{CommandReceiver, SocketServer};
use crate::llm::build_provider;
use crate::summary::{
    RequestGuard, SummarizationResult, SummarizationService, SummarizeError, SummarySession,
};

/// Run the daemon service
pub async fn run(settings: &Settings) -> Result<()> {
    info!("Starting briefly daemon");

    let provider = build_provider(settings)?;
    let session = SummarySession::new(RequestGuard::new(SummarizationService::new(
        provider,
        settings.request_timeout(),
    )));

    let server = SocketServer::bind(settings.socket_path())?;

    std::fs::write(settings.pid_path(), std::process::id().to_string())?;

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let server_handle = tokio::spawn(async move { server.run(cmd_tx).await });

    command_loop(session, cmd_rx).await;

    info!("Shutting down daemon");
    let _ = std::fs::remove_file(settings.pid_path());
    server_handle.abort();

    Ok(())
}

/// Handle incoming commands until shutdown
pub async fn command_loop(session: SummarySession, mut cmd_rx: CommandReceiver) {
    while let Some((request, resp_tx)) = cmd_rx.recv().await {
        let response = match request {
            DaemonRequest::Summarize(request) => {
                // Summaries run off the loop so a newer request can supersede them.
                let session = session.clone();
                tokio::spawn(async move {
                    let response = summarize_response(session.request_summary(request).await);
                    let _ = resp_tx.send(response);
                });
                continue;
            }
            DaemonRequest::Regenerate { mode } => {
                let session = session.clone();
                tokio::spawn(async move {
                    let response = summarize_response(session.regenerate(mode).await);
                    let _ = resp_tx.send(response);
                });
                continue;
            }
            DaemonRequest::Cancel => DaemonResponse::Cancelled {
                was_in_flight: session.guard().cancel().await,
            },
            DaemonRequest::GetStatus => DaemonResponse::Status(session.guard().status().await),
            DaemonRequest::Ping => DaemonResponse::Pong,
            DaemonRequest::Shutdown => {
                session.guard().cancel().await;
                let _ = resp_tx.send(DaemonResponse::Ok);
                break;
            }
        };

        let _ = resp_tx.send(response);
    }
}

fn summarize_response(
    outcome: Result<Option<SummarizationResult>, SummarizeError>,
) -> DaemonResponse {
    match outcome {
        Ok(Some(result)) => DaemonResponse::Summary(result),
        Ok(None) => {
            debug!("Replying superseded");
            DaemonResponse::Superseded
        }
        Err(e) => {
            if e.is_user_facing() {
                warn!("Summarization failed: {}", e);
            } else {
                debug!("Summarization stopped: {}", e);
            }
            DaemonResponse::Error {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{Reply, ScriptedProvider};
    use crate::summary::{GuardStatus, SummarizationMode, SummarizationRequest};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn spawn_loop_with(
        replies: Vec<Reply>,
    ) -> (mpsc::Sender<crate::daemon::server::Command>, Arc<ScriptedProvider>) {
        let provider = ScriptedProvider::new(replies);
        let service = SummarizationService::new(provider.clone(), Duration::from_secs(30));
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(command_loop(SummarySession::new(RequestGuard::new(service)), rx));
        (tx, provider)
    }

    fn spawn_loop(replies: Vec<Reply>) -> mpsc::Sender<crate::daemon::server::Command> {
        spawn_loop_with(replies).0
    }

    async fn send(
        tx: &mpsc::Sender<crate::daemon::server::Command>,
        request: DaemonRequest,
    ) -> oneshot::Receiver<DaemonResponse> {
        let (resp_tx, resp_rx) = oneshot::channel();
        tx.send((request, resp_tx)).await.unwrap();
        resp_rx
    }

    fn summarize(text: &str) -> DaemonRequest {
        DaemonRequest::Summarize(SummarizationRequest::new(text, SummarizationMode::Brief))
    }

    #[tokio::test(start_paused = true)]
    async fn second_summarize_supersedes_first() {
        let tx = spawn_loop(vec![
            Reply::Delayed(Duration::from_secs(10), "stale"),
            Reply::Text("Fresh.\nKey Takeaways\n- kept"),
        ]);

        let first = send(&tx, summarize("a")).await;
        loop {
            let status = send(&tx, DaemonRequest::GetStatus).await.await.unwrap();
            if matches!(status, DaemonResponse::Status(GuardStatus::InFlight { .. })) {
                break;
            }
            tokio::task::yield_now().await;
        }
        let second = send(&tx, summarize("b")).await;

        assert_eq!(first.await.unwrap(), DaemonResponse::Superseded);
        assert_eq!(
            second.await.unwrap(),
            DaemonResponse::Summary(SummarizationResult {
                summary: "Fresh.".to_string(),
                takeaways: vec!["kept".to_string()],
            })
        );
    }

    #[tokio::test]
    async fn failures_are_reported_as_messages() {
        let tx = spawn_loop(vec![]);
        let response = send(&tx, summarize("   ")).await.await.unwrap();
        assert_eq!(
            response,
            DaemonResponse::Error {
                message: SummarizeError::EmptyInput.to_string()
            }
        );
    }

    #[tokio::test]
    async fn regenerate_resends_last_input_with_new_mode() {
        let (tx, provider) = spawn_loop_with(vec![
            Reply::Text("Short.\nKey Takeaways\n- one"),
            Reply::Text("Long.\nKey Takeaways\n- one\n- two"),
        ]);

        let first = send(&tx, summarize("The remembered article.")).await.await.unwrap();
        assert!(matches!(first, DaemonResponse::Summary(_)));

        let again = send(
            &tx,
            DaemonRequest::Regenerate {
                mode: Some(SummarizationMode::Detailed),
            },
        )
        .await
        .await
        .unwrap();

        assert_eq!(
            again,
            DaemonResponse::Summary(SummarizationResult {
                summary: "Long.".to_string(),
                takeaways: vec!["one".to_string(), "two".to_string()],
            })
        );
        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("The remembered article."));
        assert!(prompts[1].contains("3-5 actionable insights"));
    }

    #[tokio::test]
    async fn regenerate_before_any_summary_is_an_error() {
        let tx = spawn_loop(vec![]);
        let response = send(&tx, DaemonRequest::Regenerate { mode: None })
            .await
            .await
            .unwrap();
        assert_eq!(
            response,
            DaemonResponse::Error {
                message: SummarizeError::EmptyInput.to_string()
            }
        );
    }

    #[tokio::test]
    async fn ping_cancel_and_shutdown() {
        let tx = spawn_loop(vec![]);
        assert_eq!(send(&tx, DaemonRequest::Ping).await.await.unwrap(), DaemonResponse::Pong);
        assert_eq!(
            send(&tx, DaemonRequest::Cancel).await.await.unwrap(),
            DaemonResponse::Cancelled {
                was_in_flight: false
            }
        );
        assert_eq!(send(&tx, DaemonRequest::Shutdown).await.await.unwrap(), DaemonResponse::Ok);

        let (resp_tx, _resp_rx) = oneshot::channel();
        tokio::task::yield_now().await;
        assert!(tx.send((DaemonRequest::Ping, resp_tx)).await.is_err());
    }
}
