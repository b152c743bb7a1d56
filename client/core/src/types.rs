use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::ImagePayload;

/// Subscription tier for a user account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[default]
    Free,
    Pro,
    Max,
}

/// Billing state of a subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Inactive,
    Canceled,
    PastDue,
}

/// Where a processing request sits in the backend pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

/// OCR engine that extracted the text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OcrProvider {
    Tesseract,
    GoogleVision,
    AzureCv,
}

/// LLM that produced the explanation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Groq,
    Anthropic,
    Openai,
    Openrouter,
}

/// Upload request sent to the processing endpoint.
///
/// Immutable once constructed; the payload is always bare base64 (see
/// [`ImagePayload`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploadRequest {
    pub image_data: ImagePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl ImageUploadRequest {
    pub fn new(image_data: ImagePayload) -> Self {
        Self {
            image_data,
            question: None,
            subject: None,
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// Text extraction stage of a processing result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    pub provider: OcrProvider,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub processing_time: f64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Explanation stage of a processing result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub provider: LlmProvider,
    pub model: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    pub processing_time: f64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A completed (or failed) processing request as stored by the backend.
///
/// Backend-owned; the client never mutates one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub request_id: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_result: Option<OcrResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_response: Option<LlmResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_detected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f32>,
    pub processing_time_total: f64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

/// Envelope returned by the processing endpoints.
///
/// `success == true` goes with a populated `result`; a `false` envelope
/// explains itself through `message` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResponse {
    pub success: bool,
    pub request_id: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ProcessingResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Account data for the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub plan: PlanType,
    pub subscription_status: SubscriptionStatus,
    pub usage_count: u32,
    /// Calendar month (1-12) the usage counter belongs to.
    pub usage_month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub usage_reset_date: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Current-month usage against the plan limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUsage {
    pub user_id: String,
    pub current_month_usage: u32,
    /// `-1` means the plan is unlimited.
    pub plan_limit: i64,
    pub remaining_requests: u32,
    #[serde(with = "timestamp")]
    pub reset_date: DateTime<Utc>,
    pub plan: PlanType,
}

/// One subscription plan as advertised by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub name: String,
    pub price: f64,
    /// `-1` means the plan is unlimited.
    pub requests_per_month: i64,
    pub ocr_quality: String,
    pub llm_model: String,
    pub features: Vec<String>,
    pub support: String,
}

/// Promotional banner attached to the plans payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub message: String,
    pub discount: f64,
    pub expires: String,
}

/// Payload of the plans endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlansResponse {
    pub plans: HashMap<String, PlanConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_promotion: Option<Promotion>,
}

/// Rate-limit headroom reported alongside quota errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub requests_remaining: u32,
    #[serde(with = "timestamp")]
    pub reset_time: DateTime<Utc>,
    /// `-1` means the plan is unlimited.
    pub plan_limit: i64,
    pub current_usage: u32,
}

/// Error body shape used by the backend for failure statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Liveness report from the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Per-service readiness flags, keyed by service name.
    pub services: HashMap<String, bool>,
    pub uptime: f64,
}

/// One page of the request history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub requests: Vec<ProcessingResult>,
    pub total: u32,
    pub limit: u32,
}

/// ISO 8601 timestamps, tolerant of the offset-less strings the hosted
/// backend emits. A value without an offset is taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|at| at.with_timezone(&Utc))
            .or_else(|_| raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            value.serialize(serializer)
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanType::Free => write!(f, "free"),
            PlanType::Pro => write!(f, "pro"),
            PlanType::Max => write!(f, "max"),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Processing => write!(f, "processing"),
            RequestStatus::Completed => write!(f, "completed"),
            RequestStatus::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_skips_absent_fields() {
        let request = ImageUploadRequest::new(ImagePayload::from_bytes(b"img"));
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("question").is_none());
        assert!(json.get("subject").is_none());
        assert_eq!(json["image_data"], "aW1n");
    }

    #[test]
    fn test_upload_request_builders() {
        let request = ImageUploadRequest::new(ImagePayload::from_bytes(b"img"))
            .with_question("what is x?")
            .with_subject("math");
        assert_eq!(request.question.as_deref(), Some("what is x?"));
        assert_eq!(request.subject.as_deref(), Some("math"));
    }

    #[test]
    fn test_provider_wire_encoding() {
        assert_eq!(
            serde_json::to_value(OcrProvider::GoogleVision).unwrap(),
            "google_vision"
        );
        assert_eq!(
            serde_json::to_value(LlmProvider::Openrouter).unwrap(),
            "openrouter"
        );
        assert_eq!(
            serde_json::to_value(SubscriptionStatus::PastDue).unwrap(),
            "past_due"
        );
    }

    #[test]
    fn test_envelope_round_trip() {
        let raw = serde_json::json!({
            "success": true,
            "request_id": "req-1",
            "status": "completed",
            "result": {
                "request_id": "req-1",
                "status": "completed",
                "extracted_text": "2+2=4",
                "processing_time_total": 1.2,
                "created_at": "2025-01-15T10:30:00Z",
                "user_id": "user-1"
            }
        });
        let envelope: ProcessingResponse = serde_json::from_value(raw).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.status, RequestStatus::Completed);
        let result = envelope.result.unwrap();
        assert_eq!(result.extracted_text.as_deref(), Some("2+2=4"));
        assert!(result.ocr_result.is_none());
    }

    #[test]
    fn test_failure_envelope_decodes_without_result() {
        let raw = serde_json::json!({
            "success": false,
            "request_id": "req-2",
            "status": "failed",
            "message": "OCR could not read the image"
        });
        let envelope: ProcessingResponse = serde_json::from_value(raw).unwrap();
        assert!(!envelope.success);
        assert!(envelope.result.is_none());
        assert_eq!(
            envelope.message.as_deref(),
            Some("OCR could not read the image")
        );
    }

    #[test]
    fn test_quota_error_carries_rate_limit_details() {
        let raw = serde_json::json!({
            "error": "rate_limit_exceeded",
            "message": "Monthly request limit reached",
            "details": {
                "requests_remaining": 0,
                "reset_time": "2025-02-01T00:00:00Z",
                "plan_limit": 10,
                "current_usage": 10
            },
            "request_id": "req-3"
        });
        let body: ErrorResponse = serde_json::from_value(raw).unwrap();
        let info: RateLimitInfo = serde_json::from_value(body.details.unwrap()).unwrap();
        assert_eq!(info.requests_remaining, 0);
        assert_eq!(info.plan_limit, 10);
        assert_eq!(info.current_usage, 10);
    }

    #[test]
    fn test_result_accepts_offset_less_created_at() {
        let raw = serde_json::json!({
            "request_id": "req-4",
            "status": "completed",
            "extracted_text": "x = 3",
            "processing_time_total": 0.8,
            "created_at": "2025-08-25T14:30:00.123456",
            "user_id": "user-1"
        });
        let result: ProcessingResult = serde_json::from_value(raw).unwrap();
        let expected = "2025-08-25T14:30:00.123456Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(result.created_at, expected);
    }

    #[test]
    fn test_profile_decodes_numeric_month_and_naive_dates() {
        let raw = serde_json::json!({
            "id": "user-1",
            "email": "student@example.com",
            "plan": "free",
            "subscription_status": "inactive",
            "usage_count": 3,
            "usage_month": 8,
            "created_at": "2025-08-25T14:30:00.123456"
        });
        let profile: UserProfile = serde_json::from_value(raw).unwrap();
        assert_eq!(profile.usage_month, 8);
        assert!(profile.usage_reset_date.is_none());
        assert!(profile.updated_at.is_none());
    }

    #[test]
    fn test_usage_reports_unlimited_plan_as_negative_limit() {
        let raw = serde_json::json!({
            "user_id": "user-1",
            "current_month_usage": 42,
            "plan_limit": -1,
            "remaining_requests": 999999,
            "reset_date": "2025-09-01T00:00:00",
            "plan": "max"
        });
        let usage: UserUsage = serde_json::from_value(raw).unwrap();
        assert_eq!(usage.plan_limit, -1);
        assert_eq!(usage.plan, PlanType::Max);
    }

    #[test]
    fn test_health_reports_services_as_flags() {
        let raw = serde_json::json!({
            "status": "healthy",
            "version": "1.4.0",
            "timestamp": "2025-08-25T14:30:00.500000",
            "services": {"ocr": true, "database": true, "redis": false},
            "uptime": 3600.0
        });
        let health: HealthCheck = serde_json::from_value(raw).unwrap();
        assert!(health.services["database"]);
        assert!(!health.services["redis"]);
    }

    #[test]
    fn test_plans_promotion_is_structured() {
        let raw = serde_json::json!({
            "plans": {
                "max": {
                    "name": "Max",
                    "price": 59.90,
                    "requests_per_month": -1,
                    "ocr_quality": "premium",
                    "llm_model": "claude-3-sonnet",
                    "features": ["all"],
                    "support": "priority"
                }
            },
            "current_promotion": {
                "message": "First 100 users get 50% off",
                "discount": 0.5,
                "expires": "2024-12-31"
            }
        });
        let plans: PlansResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(plans.plans["max"].requests_per_month, -1);
        let promo = plans.current_promotion.unwrap();
        assert_eq!(promo.discount, 0.5);
        assert_eq!(promo.expires, "2024-12-31");
    }
}
