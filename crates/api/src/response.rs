//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: themes }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Acknowledgement for work scheduled in the background.
#[derive(Debug, Serialize)]
pub struct ProcessingResponse {
    pub status: &'static str,
    pub message: String,
}

impl ProcessingResponse {
    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            status: "processing",
            message: message.into(),
        }
    }
}
