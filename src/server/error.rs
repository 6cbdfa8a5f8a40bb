use crate::error::RoomFlipError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

pub use crate::providers::Stage;

/// The `{ success: false, error, details }` failure body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub error: String,
    pub details: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &str, details: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            error: error.to_string(),
            details: details.into(),
        }
    }

    pub fn missing_fields(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Missing required fields", details)
    }

    pub fn from_error(err: &RoomFlipError, stage: Stage) -> Self {
        let label = match err {
            RoomFlipError::InvalidImageFormat(_) => "Invalid image format",
            RoomFlipError::MissingRequiredInput(_) => "Missing required fields",
            RoomFlipError::InvalidParameter(_) => "Invalid parameter",
            RoomFlipError::ConfigError(_) => "Configuration error",
            _ => match stage {
                Stage::Prompt => "Prompt generation failed",
                Stage::Image => "Image generation failed",
            },
        };
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, label, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.details)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_request() {
        let api = ApiError::from_error(&RoomFlipError::InvalidImageFormat("bad".into()), Stage::Prompt);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Invalid image format");
    }

    #[test]
    fn test_upstream_errors_use_stage_label() {
        let api = ApiError::from_error(&RoomFlipError::NoCandidatesReturned("zero".into()), Stage::Image);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Image generation failed");
        assert!(api.details.starts_with("No candidates returned"));

        let api = ApiError::from_error(&RoomFlipError::EmptyResponse("none".into()), Stage::Prompt);
        assert_eq!(api.error, "Prompt generation failed");

        let body = serde_json::to_value(&api).unwrap();
        assert_eq!(body["success"], false);
        assert!(body.get("status").is_none());
    }
}
