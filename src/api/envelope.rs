//! Standard JSON response envelope.

use serde::Serialize;

use crate::error::ErrorCode;

/// Wrapper returned by every route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error description when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Error section of a failed response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Sanitized message.
    pub message: String,
    /// Underlying error message, development only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with a message and payload.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    /// Failed response carrying an error code and message.
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(ErrorBody {
                code,
                message: message.into(),
                details: None,
            }),
        }
    }

    /// Attach error details to a failed response.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.details = Some(details.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn success_omits_error() {
        let body = ApiResponse::success("ok", json!({}));

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"success": true, "message": "ok", "data": {}})
        );
    }

    #[test]
    fn failure_omits_data_and_details() {
        let body = ApiResponse::<()>::failure(ErrorCode::NotFound, "Route not found");

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": false,
                "error": {"code": "NOT_FOUND", "message": "Route not found"}
            })
        );
    }

    #[test]
    fn details_only_apply_to_failures() {
        let failed = ApiResponse::<()>::failure(ErrorCode::InternalServerError, "boom")
            .with_details("disk full");
        assert_eq!(
            failed.error.as_ref().and_then(|e| e.details.as_deref()),
            Some("disk full")
        );

        let ok = ApiResponse::success("ok", 1).with_details("ignored");
        assert!(ok.error.is_none());
    }
}
