// Handles generation requests and applies their outcome to session state

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::{ApiError, GenerationFailure};
use crate::pagination::{PageView, Pagination};
use crate::params::{is_blank, LineParams, PageParams};
use crate::session::{GenerationOutput, GenerationState, Lifecycle};
use crate::types::{LineRequest, LineResponse, PageRequest, PageResponse};

/// How a single submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<T> {
    /// Nothing to write; no request was sent.
    Skipped,
    Completed(T),
    Failed(GenerationFailure),
    /// A newer submission was issued while this one was in flight; its
    /// response was discarded.
    Superseded,
}

impl<T> Submission<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Submission::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// A page-mode result together with the view it left pagination in.
///
/// The view is read under the same lock that reset pagination, so it always
/// matches `response.pages`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCompletion {
    pub response: PageResponse,
    pub view: PageView,
}

/// Issues generation calls and owns the shared lifecycle slot.
///
/// Each submit sends exactly one request. Overlapping submissions each run to
/// completion, but only the most recently issued one writes the lifecycle and
/// pagination state.
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<ApiClient>,
    state: Arc<Mutex<GenerationState>>,
    pagination: Arc<Mutex<Pagination>>,
}

impl Orchestrator {
    pub fn new(client: Arc<ApiClient>, pagination: Arc<Mutex<Pagination>>) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(GenerationState::default())),
            pagination,
        }
    }

    pub fn pagination(&self) -> &Arc<Mutex<Pagination>> {
        &self.pagination
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        self.state.lock().await.lifecycle.clone()
    }

    /// Line mode from form parameters.
    pub async fn submit_lines(&self, params: &LineParams) -> Submission<LineResponse> {
        match params.to_request() {
            Some(request) => self.submit_line_request(request).await,
            None => {
                debug!("line generation skipped: empty text");
                Submission::Skipped
            }
        }
    }

    /// Line mode with caller-built per-line arrays.
    pub async fn submit_line_request(&self, request: LineRequest) -> Submission<LineResponse> {
        if is_blank(&request.lines) {
            debug!("line generation skipped: empty text");
            return Submission::Skipped;
        }

        let client = Arc::clone(&self.client);
        self.dispatch(
            async move { client.generate_lines(&request).await },
            |response: &LineResponse| GenerationOutput::Lines {
                svg: response.svg_content.clone(),
                message: response.message.clone(),
            },
            |response, _| response,
        )
        .await
    }

    /// Page mode from form parameters.
    pub async fn submit_pages(&self, params: &PageParams) -> Submission<PageCompletion> {
        match params.to_request() {
            Some(request) => self.submit_page_request(request).await,
            None => {
                debug!("page generation skipped: empty text");
                Submission::Skipped
            }
        }
    }

    pub async fn submit_page_request(&self, request: PageRequest) -> Submission<PageCompletion> {
        if request.text.trim().is_empty() {
            debug!("page generation skipped: empty text");
            return Submission::Skipped;
        }

        let client = Arc::clone(&self.client);
        self.dispatch(
            async move { client.generate_pages(&request).await },
            |response: &PageResponse| GenerationOutput::Pages {
                page_count: response.pages.len(),
                line_count: response.line_count,
                message: response.message.clone(),
            },
            |response: PageResponse, pagination: &mut Pagination| {
                pagination.reset(response.pages.clone());
                PageCompletion {
                    view: pagination.view(),
                    response,
                }
            },
        )
        .await
    }

    /// Cancels the in-flight submission. Its result resolves to a cancelled failure.
    pub async fn abort(&self) -> bool {
        let aborted = self.state.lock().await.abort();
        if aborted {
            info!("generation aborted");
        }
        aborted
    }

    async fn dispatch<T, R, Fut>(
        &self,
        call: Fut,
        output: impl FnOnce(&T) -> GenerationOutput,
        apply: impl FnOnce(T, &mut Pagination) -> R,
    ) -> Submission<R>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let (token, cancel) = self.state.lock().await.begin();
        debug!(token, "generation pending");

        let result: Result<T, GenerationFailure> = tokio::select! {
            result = call => result.map_err(GenerationFailure::from),
            () = cancel.cancelled() => Err(GenerationFailure::cancelled()),
        };

        let mut state = self.state.lock().await;
        if !state.is_current(token) {
            debug!(token, latest = state.latest_token, "discarding stale generation response");
            return Submission::Superseded;
        }

        match result {
            Ok(value) => {
                // Pagination first, so the lifecycle never reports success
                // for pages that are not yet visible.
                let output = output(&value);
                let completed = apply(value, &mut *self.pagination.lock().await);
                state.settle(token, Ok(output));
                info!(token, "generation succeeded");
                Submission::Completed(completed)
            }
            Err(failure) => {
                state.settle(token, Err(failure.clone()));
                info!(token, kind = %failure.kind, "generation failed");
                Submission::Failed(failure)
            }
        }
    }
}
