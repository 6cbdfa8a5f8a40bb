use crate::error::{provider_error_message, Result, RoomFlipError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl OutboundRequest {
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// The single seam between the provider clients and the network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(&self, request: OutboundRequest) -> Result<Value>;
}

#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: OutboundRequest) -> Result<Value> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            log::error!("Transport error calling {}: {:?}", redact(&request.url), e);
            RoomFlipError::UpstreamUnavailable(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RoomFlipError::UpstreamUnavailable(e.to_string()))?;

        map_response(status, &body)
    }
}

/// Turns a provider status and raw body into JSON, unwrapping provider error
/// messages for non-2xx statuses.
pub fn map_response(status: reqwest::StatusCode, body: &str) -> Result<Value> {
    if !status.is_success() {
        log::error!("Provider returned HTTP {}: {}", status, body);
        return Err(RoomFlipError::UpstreamUnavailable(provider_error_message(
            body,
        )));
    }

    serde_json::from_str(body).map_err(|e| {
        RoomFlipError::UpstreamUnavailable(format!("provider returned invalid JSON: {}", e))
    })
}

/// Runs one remote call under `timeout`. Elapsing drops the in-flight
/// request future, which cancels the underlying HTTP call.
pub async fn send_with_timeout(
    transport: &dyn HttpTransport,
    request: OutboundRequest,
    timeout: Duration,
) -> Result<Value> {
    let url = redact(&request.url).to_string();
    match tokio::time::timeout(timeout, transport.post_json(request)).await {
        Ok(result) => result,
        Err(_) => {
            log::error!("Request to {} timed out after {:?}", url, timeout);
            Err(RoomFlipError::UpstreamUnavailable(format!(
                "request timed out after {}s",
                timeout.as_secs_f64()
            )))
        }
    }
}

fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}


#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_with_timeout_passes_response_through() {
        let transport = MockTransport::new().with_response(json!({"ok": true}));
        let value = send_with_timeout(
            &transport,
            OutboundRequest::new("http://provider/v1", json!({})),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(value, json!({"ok": true}));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_send_with_timeout_elapses_as_upstream_unavailable() {
        let transport = MockTransport::new()
            .with_response(json!({"ok": true}))
            .with_delay(Duration::from_millis(200));
        let err = send_with_timeout(
            &transport,
            OutboundRequest::new("http://provider/v1?key=secret", json!({})),
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();
        match err {
            RoomFlipError::UpstreamUnavailable(msg) => assert!(msg.contains("timed out")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_map_response_unwraps_provider_error() {
        let body = r#"{"error":{"code":403,"message":"API key not valid. Please pass a valid API key.","status":"PERMISSION_DENIED"}}"#;
        let err = map_response(reqwest::StatusCode::FORBIDDEN, body).unwrap_err();
        match err {
            RoomFlipError::UpstreamUnavailable(msg) => {
                assert_eq!(msg, "API key not valid. Please pass a valid API key.")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_map_response_passes_plain_text_errors_through() {
        let err = map_response(reqwest::StatusCode::BAD_GATEWAY, "upstream connect error").unwrap_err();
        match err {
            RoomFlipError::UpstreamUnavailable(msg) => assert_eq!(msg, "upstream connect error"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_map_response_rejects_non_json_success() {
        let err = map_response(reqwest::StatusCode::OK, "<html>ok</html>").unwrap_err();
        match err {
            RoomFlipError::UpstreamUnavailable(msg) => assert!(msg.contains("invalid JSON")),
            other => panic!("unexpected error {:?}", other),
        }

        let value = map_response(reqwest::StatusCode::OK, r#"{"candidates":[]}"#).unwrap();
        assert_eq!(value, json!({"candidates": []}));
    }

    #[test]
    fn test_redact_strips_query() {
        assert_eq!(redact("https://x/y:predict?key=abc"), "https://x/y:predict");
    }
}
