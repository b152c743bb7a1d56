pub mod error;
pub mod outcome;
pub mod payload;
pub mod traits;
pub mod types;

pub use error::LensError;
pub use outcome::ProcessingOutcome;
pub use payload::ImagePayload;
pub use traits::ProcessingBackend;
pub use types::{
    ErrorResponse, HealthCheck, HistoryPage, ImageUploadRequest, LlmProvider, LlmResponse,
    OcrProvider, OcrResult, PlanConfig, PlanType, PlansResponse, ProcessingResponse,
    ProcessingResult, Promotion, RateLimitInfo, RequestStatus, SubscriptionStatus, UserProfile,
    UserUsage,
};
