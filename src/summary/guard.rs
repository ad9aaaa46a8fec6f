//! Single-flight guard: a newer request always supersedes the one in flight

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::summary::service::SummarizationService;
use crate::summary::{
    SummarizationMode, SummarizationRequest, SummarizationResult, SummarizeError,
};

/// Current state of the guard
#[derive(Debug)]
pub enum GuardState {
    /// Nothing in flight
    Idle,

    /// One request awaiting the provider
    InFlight(InFlightRequest),
}

/// The request currently owned by the guard
#[derive(Debug)]
pub struct InFlightRequest {
    pub id: Uuid,
    pub mode: SummarizationMode,
    pub started_at: DateTime<Utc>,
    cancel: CancellationToken,
}

impl InFlightRequest {
    fn new(mode: SummarizationMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            started_at: Utc::now(),
            cancel: CancellationToken::new(),
        }
    }
}

/// Snapshot of the guard for status reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardStatus {
    Idle,
    InFlight {
        id: String,
        mode: SummarizationMode,
        started_at: DateTime<Utc>,
    },
}

impl GuardState {
    pub fn to_status(&self) -> GuardStatus {
        match self {
            GuardState::Idle => GuardStatus::Idle,
            GuardState::InFlight(request) => GuardStatus::InFlight {
                id: request.id.to_string(),
                mode: request.mode,
                started_at: request.started_at,
            },
        }
    }
}

/// How a guarded request ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The request was still current when it resolved
    Completed(SummarizationResult),

    /// A newer request replaced this one; its result was discarded
    Superseded,
}

/// Tracks at most one in-flight summarization per session.
#[derive(Clone)]
pub struct RequestGuard {
    service: SummarizationService,
    state: Arc<RwLock<GuardState>>,
}

impl RequestGuard {
    pub fn new(service: SummarizationService) -> Self {
        Self {
            service,
            state: Arc::new(RwLock::new(GuardState::Idle)),
        }
    }

    /// Run a request, superseding whatever is in flight.
    ///
    /// Invalid requests are rejected without touching the in-flight request.
    /// Supersession resolves to `GuardOutcome::Superseded`, never to an error.
    pub async fn summarize(
        &self,
        request: SummarizationRequest,
    ) -> Result<GuardOutcome, SummarizeError> {
        request.validate()?;

        let (id, cancel) = self.begin(request.mode).await;
        let result = self.service.summarize_with(&request, &cancel).await;

        if !self.finish(id).await {
            debug!("Discarding result of superseded request {}", id);
            return Ok(GuardOutcome::Superseded);
        }

        result.map(GuardOutcome::Completed)
    }

    /// Cancel the in-flight request, if any. Its caller receives `Cancelled`.
    pub async fn cancel(&self) -> bool {
        let state = self.state.read().await;
        match &*state {
            GuardState::InFlight(request) => {
                info!("Cancelling request {}", request.id);
                request.cancel.cancel();
                true
            }
            GuardState::Idle => false,
        }
    }

    pub async fn status(&self) -> GuardStatus {
        self.state.read().await.to_status()
    }

    pub async fn is_idle(&self) -> bool {
        matches!(*self.state.read().await, GuardState::Idle)
    }

    async fn begin(&self, mode: SummarizationMode) -> (Uuid, CancellationToken) {
        let mut state = self.state.write().await;

        if let GuardState::InFlight(previous) = &*state {
            info!("Request {} superseded by a newer request", previous.id);
            previous.cancel.cancel();
        }

        let request = InFlightRequest::new(mode);
        let handle = (request.id, request.cancel.clone());
        debug!("Request {} in flight ({} mode)", request.id, mode);
        *state = GuardState::InFlight(request);
        handle
    }

    /// Clear the slot if `id` still owns it. Returns false for superseded requests.
    async fn finish(&self, id: Uuid) -> bool {
        let mut state = self.state.write().await;
        match &*state {
            GuardState::InFlight(current) if current.id == id => {
                *state = GuardState::Idle;
                true
            }
            _ => false,
        }
    }
}
