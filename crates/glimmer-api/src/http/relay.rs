//! The relay handler: verbatim forwarding to the remote generative API.

use axum::extract::{Json, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// State shared by relay handlers.
#[derive(Clone)]
pub struct RelayState {
    pub client: reqwest::Client,
    pub api_base: String,
}

impl RelayState {
    pub fn new(api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
        }
    }
}

/// Body of a relay request. `endpoint` is the model path segment including
/// the operation, e.g. `gemini-1.5-pro:generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl RelayRequest {
    /// Whether any required field is absent or blank.
    pub fn has_missing_fields(&self) -> bool {
        self.endpoint.trim().is_empty() || self.api_key.trim().is_empty() || self.payload.is_null()
    }
}

/// POST /relay - forward the payload to the remote API and return its
/// status and body unchanged.
pub async fn forward(State(state): State<RelayState>, Json(request): Json<RelayRequest>) -> Response {
    if request.has_missing_fields() {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "Missing required parameters: endpoint, apiKey, or payload"
            })),
        )
            .into_response();
    }

    let url = format!(
        "{}/models/{}?key={}",
        state.api_base, request.endpoint, request.api_key
    );
    debug!(endpoint = %request.endpoint, "relaying request");

    match state.client.post(&url).json(&request.payload).send().await {
        Ok(upstream) => {
            let status = StatusCode::from_u16(upstream.status().as_u16())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            let body = upstream.bytes().await.unwrap_or_default().to_vec();
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }
        Err(err) => {
            warn!(error = %err, "relay upstream request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({"error": err.to_string()})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forward_rejects_missing_fields_before_upstream() {
        let state = RelayState::new("http://127.0.0.1:9".to_string());
        let request: RelayRequest = serde_json::from_str(r#"{"endpoint": "m"}"#).unwrap();

        let response = forward(State(state), Json(request)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_relay_request_camel_case_fields() {
        let request: RelayRequest = serde_json::from_str(
            r#"{"endpoint": "gemini-1.5-pro:generateContent", "apiKey": "k", "payload": {"contents": []}}"#,
        )
        .unwrap();
        assert_eq!(request.endpoint, "gemini-1.5-pro:generateContent");
        assert_eq!(request.api_key, "k");
        assert!(!request.has_missing_fields());
    }

    #[test]
    fn test_missing_fields_detected() {
        let request: RelayRequest = serde_json::from_str(r#"{"endpoint": "m"}"#).unwrap();
        assert!(request.has_missing_fields());

        let request: RelayRequest =
            serde_json::from_str(r#"{"endpoint": "m", "apiKey": "  ", "payload": {}}"#).unwrap();
        assert!(request.has_missing_fields());

        let request: RelayRequest =
            serde_json::from_str(r#"{"endpoint": "m", "apiKey": "k", "payload": null}"#).unwrap();
        assert!(request.has_missing_fields());
    }
}
