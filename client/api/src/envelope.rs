//! Compact envelope served by the local proxy route.
//!
//! The hosted backend answers `/process` with the full
//! [`ProcessingResponse`] envelope; the proxy's `/api/process` answers with
//! a compact `{success, data, error}` shape instead. Both convert into
//! [`ProcessingOutcome`] so the lifecycle controller never branches on wire
//! shape.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use studylens_core::types::{ProcessingResult, RequestStatus};
use studylens_core::ProcessingOutcome;

/// Wire shape of the proxy's processing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactProcessResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CompactData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result payload carried by the compact shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactData {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub processing_time: f64,
}

impl From<CompactProcessResponse> for ProcessingOutcome {
    fn from(envelope: CompactProcessResponse) -> Self {
        match envelope.data {
            Some(data) if envelope.success => Self::Success(data.into_result()),
            _ => Self::Failure {
                message: envelope
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "Processing failed".to_string()),
            },
        }
    }
}

impl From<ProcessingOutcome> for CompactProcessResponse {
    fn from(outcome: ProcessingOutcome) -> Self {
        match outcome {
            ProcessingOutcome::Success(result) => Self {
                success: true,
                data: Some(CompactData::from_result(&result)),
                error: None,
            },
            ProcessingOutcome::Failure { message } => Self {
                success: false,
                data: None,
                error: Some(message),
            },
        }
    }
}

impl CompactData {
    /// Widen to a full result. Backend-owned fields the compact shape does
    /// not carry take neutral values.
    fn into_result(self) -> ProcessingResult {
        ProcessingResult {
            request_id: String::new(),
            status: RequestStatus::Completed,
            ocr_result: None,
            llm_response: None,
            extracted_text: Some(self.text),
            ai_explanation: None,
            subject_detected: None,
            confidence_score: self.confidence,
            processing_time_total: self.processing_time,
            created_at: Utc::now(),
            user_id: String::new(),
        }
    }

    fn from_result(result: &ProcessingResult) -> Self {
        let text = result
            .extracted_text
            .clone()
            .or_else(|| result.ocr_result.as_ref().map(|o| o.text.clone()))
            .unwrap_or_default();
        Self {
            text,
            confidence: result.confidence_score,
            processing_time: result.processing_time_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_success_widens_to_result() {
        let envelope = CompactProcessResponse {
            success: true,
            data: Some(CompactData {
                text: "E = mc^2".to_string(),
                confidence: Some(0.92),
                processing_time: 0.8,
            }),
            error: None,
        };
        match ProcessingOutcome::from(envelope) {
            ProcessingOutcome::Success(result) => {
                assert_eq!(result.extracted_text.as_deref(), Some("E = mc^2"));
                assert_eq!(result.confidence_score, Some(0.92));
                assert_eq!(result.status, RequestStatus::Completed);
                assert!(result.request_id.is_empty());
            }
            ProcessingOutcome::Failure { message } => panic!("unexpected failure: {message}"),
        }
    }

    #[test]
    fn compact_failure_uses_error_field() {
        let envelope = CompactProcessResponse {
            success: false,
            data: None,
            error: Some("Processing failed".to_string()),
        };
        match ProcessingOutcome::from(envelope) {
            ProcessingOutcome::Failure { message } => assert_eq!(message, "Processing failed"),
            ProcessingOutcome::Success(_) => panic!("unexpected success"),
        }
    }

    #[test]
    fn compact_success_without_data_is_failure() {
        let envelope = CompactProcessResponse {
            success: true,
            data: None,
            error: None,
        };
        match ProcessingOutcome::from(envelope) {
            ProcessingOutcome::Failure { message } => assert_eq!(message, "Processing failed"),
            ProcessingOutcome::Success(_) => panic!("unexpected success"),
        }
    }

    #[test]
    fn outcome_round_trips_through_compact_shape() {
        let envelope = CompactProcessResponse {
            success: true,
            data: Some(CompactData {
                text: "x = 3".to_string(),
                confidence: None,
                processing_time: 1.5,
            }),
            error: None,
        };
        let outcome = ProcessingOutcome::from(envelope);
        let back = CompactProcessResponse::from(outcome);
        assert!(back.success);
        assert_eq!(back.data.unwrap().text, "x = 3");
    }
}
