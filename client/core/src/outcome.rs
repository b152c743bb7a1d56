//! Convergence point between envelope shapes and the lifecycle controller.

use crate::types::{ProcessingResponse, ProcessingResult};

/// Terminal outcome of one processing call, independent of wire shape.
///
/// Envelope adapters produce this; the lifecycle controller consumes it and
/// never inspects a raw envelope.
#[derive(Debug, Clone)]
pub enum ProcessingOutcome {
    Success(ProcessingResult),
    Failure { message: String },
}

impl From<ProcessingResponse> for ProcessingOutcome {
    fn from(envelope: ProcessingResponse) -> Self {
        match envelope.result {
            // A success flag without a result payload is still a failure:
            // there is nothing to render.
            Some(result) if envelope.success => Self::Success(result),
            _ => Self::Failure {
                message: envelope
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Processing failed".to_string()),
            },
        }
    }
}
