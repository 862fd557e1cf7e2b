// Manages generation lifecycle state and request tokens

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::GenerationFailure;

/// What the last applied generation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GenerationOutput {
    /// Line mode renders one SVG directly; it has no pagination.
    Lines { svg: String, message: String },
    /// Page mode; the pages themselves live in the pagination state.
    Pages {
        page_count: usize,
        line_count: u32,
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    Idle,
    Pending,
    Success(GenerationOutput),
    Error(GenerationFailure),
}

impl Lifecycle {
    pub fn is_pending(&self) -> bool {
        matches!(self, Lifecycle::Pending)
    }
}

/// Single shared slot for the visible generation outcome.
///
/// Every submission takes a fresh token; only the holder of `latest_token`
/// may write the outcome.
#[derive(Debug, Default)]
pub struct GenerationState {
    pub lifecycle: Lifecycle,
    pub latest_token: u64,
    pub cancellation_token: Option<CancellationToken>,
}

impl GenerationState {
    /// Starts a new submission, superseding any in flight.
    pub fn begin(&mut self) -> (u64, CancellationToken) {
        self.latest_token += 1;
        let cancel = CancellationToken::new();
        self.cancellation_token = Some(cancel.clone());
        self.lifecycle = Lifecycle::Pending;
        (self.latest_token, cancel)
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.latest_token == token
    }

    /// Writes the outcome for `token`. Returns false for a stale token.
    pub fn settle(&mut self, token: u64, outcome: Result<GenerationOutput, GenerationFailure>) -> bool {
        if !self.is_current(token) {
            return false;
        }

        self.cancellation_token = None;
        self.lifecycle = match outcome {
            Ok(output) => Lifecycle::Success(output),
            Err(failure) => Lifecycle::Error(failure),
        };
        true
    }

    /// Cancels the in-flight submission, if any.
    pub fn abort(&mut self) -> bool {
        match self.cancellation_token.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_token_cannot_settle() {
        let mut state = GenerationState::default();
        let (first, _) = state.begin();
        let (second, _) = state.begin();

        assert!(!state.settle(first, Err(GenerationFailure::cancelled())));
        assert!(state.lifecycle.is_pending());

        assert!(state.settle(
            second,
            Ok(GenerationOutput::Lines {
                svg: "<svg/>".into(),
                message: String::new(),
            })
        ));
        assert!(matches!(state.lifecycle, Lifecycle::Success(_)));
    }

    #[test]
    fn abort_cancels_only_the_current_submission() {
        let mut state = GenerationState::default();
        assert!(!state.abort());

        let (_, cancel) = state.begin();
        assert!(state.abort());
        assert!(cancel.is_cancelled());
        assert!(!state.abort());
    }
}
