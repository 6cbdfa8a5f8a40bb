use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoomFlipError {
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),
    #[error("Missing required input: {0}")]
    MissingRequiredInput(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Empty response: {0}")]
    EmptyResponse(String),
    #[error("No candidates returned: {0}")]
    NoCandidatesReturned(String),
    #[error("No image in response: {0}")]
    NoImageInResponse(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RoomFlipError {
    /// True for failures caused by the caller's input rather than a provider.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RoomFlipError::InvalidImageFormat(_)
                | RoomFlipError::MissingRequiredInput(_)
                | RoomFlipError::InvalidParameter(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RoomFlipError::InvalidImageFormat(_) => "InvalidImageFormat",
            RoomFlipError::MissingRequiredInput(_) => "MissingRequiredInput",
            RoomFlipError::InvalidParameter(_) => "InvalidParameter",
            RoomFlipError::UpstreamUnavailable(_) => "UpstreamUnavailable",
            RoomFlipError::EmptyResponse(_) => "EmptyResponse",
            RoomFlipError::NoCandidatesReturned(_) => "NoCandidatesReturned",
            RoomFlipError::NoImageInResponse(_) => "NoImageInResponse",
            RoomFlipError::ConfigError(_) => "ConfigError",
            RoomFlipError::SerializationError(_) => "SerializationError",
        }
    }
}

/// Unwraps a provider error body of the form `{"error": {"message": ".."}}`.
///
/// Anything that is not JSON, or JSON without a nested string message, is
/// returned unchanged.
pub fn provider_error_message(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|message| message.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| raw.to_string())
}

pub type Result<T> = std::result::Result<T, RoomFlipError>;
