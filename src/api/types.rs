//! API response envelope types.

use serde::Serialize;

/// Success envelope: `{"status":"success","data":...}`.
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    /// Always `"success"`
    pub status: &'static str,

    /// Endpoint-specific payload
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// Error envelope: `{"status":"error","message":...}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`
    pub status: &'static str,

    /// Human-readable failure description
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
