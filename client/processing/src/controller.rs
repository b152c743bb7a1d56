//! Lifecycle controller: idle, in flight, succeeded, or failed.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use studylens_core::error::LensError;
use studylens_core::payload::{self, ImagePayload};
use studylens_core::types::{ImageUploadRequest, ProcessingResult};
use studylens_core::{ProcessingBackend, ProcessingOutcome};

/// Snapshot of the lifecycle state as observed by drivers.
///
/// While idle or in flight both `result` and `error` are `None`; once a
/// cycle terminates exactly one of them is set and `processing` is false.
#[derive(Debug, Clone, Default)]
pub struct ProcessingState {
    pub processing: bool,
    pub result: Option<ProcessingResult>,
    pub error: Option<String>,
}

impl ProcessingState {
    fn in_flight() -> Self {
        Self {
            processing: true,
            result: None,
            error: None,
        }
    }

    fn succeeded(result: ProcessingResult) -> Self {
        Self {
            processing: false,
            result: Some(result),
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            processing: false,
            result: None,
            error: Some(message),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !self.processing && (self.result.is_some() || self.error.is_some())
    }
}

/// Drives one processing attempt at a time and publishes state snapshots.
///
/// Calls are tagged with a monotonically increasing generation; a state
/// write from a call that has been overtaken by a newer call (or by
/// [`reset`](Self::reset)) is dropped, so the published state always
/// reflects the latest issued call. Overtaken calls are not cancelled;
/// they run to completion and only their writes are suppressed.
pub struct ProcessingController {
    backend: Arc<dyn ProcessingBackend>,
    state_tx: watch::Sender<ProcessingState>,
    generation: AtomicU64,
    max_image_bytes: u64,
}

impl ProcessingController {
    pub fn new(backend: Arc<dyn ProcessingBackend>) -> Self {
        let (state_tx, _) = watch::channel(ProcessingState::default());
        Self {
            backend,
            state_tx,
            generation: AtomicU64::new(0),
            max_image_bytes: payload::MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_image_bytes(mut self, max_bytes: u64) -> Self {
        self.max_image_bytes = max_bytes;
        self
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<ProcessingState> {
        self.state_tx.subscribe()
    }

    /// Current snapshot.
    pub fn state(&self) -> ProcessingState {
        self.state_tx.borrow().clone()
    }

    /// Clear any result or error and return to idle.
    ///
    /// Callable from any state. Also invalidates in-flight calls: their
    /// resolutions are dropped when they land.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state_tx.send_replace(ProcessingState::default());
    }

    /// Run one processing attempt end to end and return its terminal state.
    ///
    /// The returned state is this call's own outcome even when a newer call
    /// has overtaken it; only the published state is guarded.
    pub async fn process_image(
        &self,
        image: &Path,
        question: Option<String>,
        subject: Option<String>,
    ) -> ProcessingState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(generation, ProcessingState::in_flight());

        let state = match self.run(image, question, subject).await {
            Ok(ProcessingOutcome::Success(result)) => ProcessingState::succeeded(result),
            Ok(ProcessingOutcome::Failure { message }) => ProcessingState::failed(message),
            Err(e) => ProcessingState::failed(e.user_message()),
        };

        self.publish(generation, state.clone());
        state
    }

    async fn run(
        &self,
        image: &Path,
        question: Option<String>,
        subject: Option<String>,
    ) -> Result<ProcessingOutcome, LensError> {
        payload::validate_image(image, self.max_image_bytes).await?;
        let image_data = ImagePayload::from_file(image).await?;

        let request = ImageUploadRequest {
            image_data,
            question,
            subject,
        };
        debug!(
            backend = self.backend.name(),
            bytes = request.image_data.len(),
            "Dispatching processing request"
        );

        let response = self.backend.process_image(&request).await?;
        Ok(ProcessingOutcome::from(response))
    }

    /// Publish a state snapshot unless a newer call or a reset owns the
    /// cell.
    fn publish(&self, generation: u64, state: ProcessingState) {
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(generation, "Dropping stale processing state write");
            return;
        }
        self.state_tx.send_replace(state);
    }
}
