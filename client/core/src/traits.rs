use async_trait::async_trait;

use crate::error::LensError;
use crate::types::{ImageUploadRequest, ProcessingResponse};

/// Seam between the lifecycle controller and the transport layer.
///
/// The HTTP client implements this against the hosted backend; tests
/// substitute in-memory mocks.
#[async_trait]
pub trait ProcessingBackend: Send + Sync {
    /// Backend name used in log fields (e.g., "remote").
    fn name(&self) -> &str;

    /// Submit an image for processing and return the decoded envelope.
    async fn process_image(
        &self,
        request: &ImageUploadRequest,
    ) -> Result<ProcessingResponse, LensError>;
}
