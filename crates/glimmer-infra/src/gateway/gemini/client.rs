//! GeminiClient -- concrete [`GatewayClient`] implementation for the
//! Generative Language API.
//!
//! One POST per classified operation to
//! `models/{model}:generateContent?key={api_key}`, with the heterogeneous
//! reply shape (text-only vs. text+inline-image) normalized into a single
//! assistant [`Turn`].
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! while the request URL is built. It never appears in logs.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};

use glimmer_core::gateway::GatewayClient;
use glimmer_types::config::GatewayConfig;
use glimmer_types::error::GatewayError;
use glimmer_types::turn::{ImageRef, Turn, TurnRole};

use super::types::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part,
    WireGenerationConfig, permissive_safety_settings,
};

/// Caption used when an image reply carries no text part.
const DEFAULT_IMAGE_CAPTION: &str = "Here is the image you asked for.";

/// Soft-failure reply when an image was requested but none came back.
const NO_IMAGE_MESSAGE: &str =
    "I couldn't come up with an image for that request. Try rephrasing the prompt.";

/// Generative Language API gateway client.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    config: GatewayConfig,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key wrapped in SecretString
    /// * `config` - endpoint, model selection, and generation parameters
    pub fn new(api_key: SecretString, config: GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300)) // 5 min timeout for image generations
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            config,
        }
    }

    /// Build the full request URL for a model. The key travels as a query
    /// parameter; this is the only place it leaves its wrapper.
    fn url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_base,
            model,
            self.api_key.expose_secret()
        )
    }

    async fn post(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let response = self
            .client
            .post(self.url(model))
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(status_error(status.as_u16(), message));
        }

        // A 2xx body that does not decode has no usable candidate.
        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|_| GatewayError::EmptyResponse)
    }

    fn text_request(&self, turns: &[Turn]) -> GenerateContentRequest {
        let contents = turns
            .iter()
            .map(|turn| Content {
                role: Some(wire_role(turn.role).to_string()),
                parts: vec![Part::text(turn.content.clone())],
            })
            .collect();

        GenerateContentRequest {
            contents,
            generation_config: WireGenerationConfig::text(&self.config.generation),
            safety_settings: permissive_safety_settings(),
        }
    }

    fn image_request(&self, text: &str, source: Option<InlineData>) -> GenerateContentRequest {
        let mut parts = vec![Part::text(text)];
        if let Some(data) = source {
            parts.push(Part::inline(data));
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: WireGenerationConfig::text_and_image(&self.config.generation),
            safety_settings: permissive_safety_settings(),
        }
    }

    /// Resolve an image reference to inline bytes. Inline refs pass
    /// through; URL refs are fetched and base64-encoded, with the mime type
    /// taken from the response headers.
    async fn resolve_image(&self, source: &ImageRef) -> Result<InlineData, GatewayError> {
        match source {
            ImageRef::Inline { mime_type, data } => Ok(InlineData {
                mime_type: mime_type.clone(),
                data: data.clone(),
            }),
            ImageRef::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|err| GatewayError::Transport(err.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(status_error(
                        status.as_u16(),
                        format!("image fetch failed for {url}"),
                    ));
                }

                let mime_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.split(';').next())
                    .unwrap_or("image/png")
                    .to_string();

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|err| GatewayError::Transport(err.to_string()))?;

                Ok(InlineData {
                    mime_type,
                    data: BASE64.encode(&bytes),
                })
            }
        }
    }
}

// GeminiClient intentionally does NOT derive Debug; the SecretString field
// keeps the key out of Debug output, and omitting Debug entirely avoids
// leaking the rest of the request state.

impl GatewayClient for GeminiClient {
    async fn send_text(&self, turns: &[Turn]) -> Result<Turn, GatewayError> {
        let request = self.text_request(turns);
        let response = self.post(&self.config.text_model, &request).await?;
        let text = extract_text(response)?;
        Ok(Turn::assistant(text))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Turn, GatewayError> {
        let request = self.image_request(prompt, None);
        let response = self.post(&self.config.image_model, &request).await?;
        Ok(normalize_image_reply(response))
    }

    async fn edit_image(&self, instructions: &str, source: &ImageRef) -> Result<Turn, GatewayError> {
        let source = self.resolve_image(source).await?;
        let request = self.image_request(instructions, Some(source));
        let response = self.post(&self.config.image_model, &request).await?;
        Ok(normalize_image_reply(response))
    }
}

/// Map a turn role onto the wire's role vocabulary. The wire has no system
/// role in this flow; system turns are folded into `user`.
fn wire_role(role: TurnRole) -> &'static str {
    match role {
        TurnRole::System | TurnRole::User => "user",
        TurnRole::Assistant => "model",
    }
}

fn status_error(status: u16, message: String) -> GatewayError {
    match status {
        401 | 403 => GatewayError::Auth,
        400 => GatewayError::BadRequest(message),
        status => GatewayError::Provider { status, message },
    }
}

/// First text part of the first candidate, or `EmptyResponse`.
fn extract_text(response: GenerateContentResponse) -> Result<String, GatewayError> {
    first_parts(response)
        .into_iter()
        .find_map(|part| part.text)
        .filter(|text| !text.is_empty())
        .ok_or(GatewayError::EmptyResponse)
}

/// Normalize an image-operation reply into a single assistant turn.
///
/// An image part yields a turn carrying the image plus whatever text came
/// with it (default caption if none). No image part is a soft failure: a
/// text-only turn explaining the shortfall, never an error.
fn normalize_image_reply(response: GenerateContentResponse) -> Turn {
    let mut caption: Option<String> = None;
    let mut image: Option<InlineData> = None;
    for part in first_parts(response) {
        if caption.is_none() {
            if let Some(text) = &part.text {
                if !text.is_empty() {
                    caption = Some(text.clone());
                }
            }
        }
        if image.is_none() {
            image = part.inline_data;
        }
    }

    match image {
        Some(data) => Turn::assistant(
            caption.unwrap_or_else(|| DEFAULT_IMAGE_CAPTION.to_string()),
        )
        .with_image(ImageRef::Inline {
            mime_type: data.mime_type,
            data: data.data,
        }),
        None => Turn::assistant(caption.unwrap_or_else(|| NO_IMAGE_MESSAGE.to_string())),
    }
}

fn first_parts(response: GenerateContentResponse) -> Vec<Part> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::gemini::types::Candidate;

    fn make_client() -> GeminiClient {
        GeminiClient::new(
            SecretString::from("test-key-not-real"),
            GatewayConfig::default(),
        )
    }

    fn response_with_parts(parts: Vec<Part>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content { role: Some("model".to_string()), parts }),
            }],
        }
    }

    fn png() -> InlineData {
        InlineData {
            mime_type: "image/png".to_string(),
            data: "aGVsbG8=".to_string(),
        }
    }

    #[test]
    fn test_url_carries_model_and_key() {
        let client = GeminiClient::new(
            SecretString::from("test-key"),
            GatewayConfig {
                api_base: "http://localhost:3001/v1beta".to_string(),
                ..GatewayConfig::default()
            },
        );
        assert_eq!(
            client.url("gemini-1.5-pro"),
            "http://localhost:3001/v1beta/models/gemini-1.5-pro:generateContent?key=test-key"
        );
    }

    #[test]
    fn test_wire_role_folds_system_into_user() {
        assert_eq!(wire_role(TurnRole::System), "user");
        assert_eq!(wire_role(TurnRole::User), "user");
        assert_eq!(wire_role(TurnRole::Assistant), "model");
    }

    #[test]
    fn test_text_request_shape() {
        let client = make_client();
        let turns = vec![
            Turn::system("Welcome!"),
            Turn::user("hello"),
            Turn::assistant("hi there"),
        ];
        let request = client.text_request(&turns);

        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[1].role.as_deref(), Some("user"));
        assert_eq!(request.contents[2].role.as_deref(), Some("model"));
        assert!(request.generation_config.response_modalities.is_none());
        assert_eq!(request.safety_settings.len(), 4);
    }

    #[test]
    fn test_image_request_shape() {
        let client = make_client();
        let request = client.image_request("make it brighter", Some(png()));

        assert_eq!(request.contents.len(), 1);
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text.as_deref(), Some("make it brighter"));
        assert_eq!(parts[1].inline_data, Some(png()));
        assert_eq!(
            request.generation_config.response_modalities,
            Some(vec!["TEXT".to_string(), "IMAGE".to_string()])
        );
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(status_error(401, String::new()), GatewayError::Auth));
        assert!(matches!(status_error(403, String::new()), GatewayError::Auth));
        assert!(matches!(
            status_error(400, "bad payload".to_string()),
            GatewayError::BadRequest(_)
        ));
        assert!(matches!(
            status_error(503, String::new()),
            GatewayError::Provider { status: 503, .. }
        ));
    }

    #[test]
    fn test_extract_text_first_text_part() {
        let response = response_with_parts(vec![
            Part::inline(png()),
            Part::text("the answer"),
            Part::text("a second part"),
        ]);
        assert_eq!(extract_text(response).unwrap(), "the answer");
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let response = GenerateContentResponse { candidates: vec![] };
        assert!(matches!(
            extract_text(response),
            Err(GatewayError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_text_no_text_parts() {
        let response = response_with_parts(vec![Part::inline(png())]);
        assert!(matches!(
            extract_text(response),
            Err(GatewayError::EmptyResponse)
        ));
    }

    #[test]
    fn test_normalize_text_and_image() {
        let response =
            response_with_parts(vec![Part::text("A mountain."), Part::inline(png())]);
        let turn = normalize_image_reply(response);
        assert_eq!(turn.content, "A mountain.");
        assert_eq!(
            turn.image,
            Some(ImageRef::Inline {
                mime_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string(),
            })
        );
    }

    #[test]
    fn test_normalize_image_without_text_gets_default_caption() {
        let turn = normalize_image_reply(response_with_parts(vec![Part::inline(png())]));
        assert_eq!(turn.content, DEFAULT_IMAGE_CAPTION);
        assert!(turn.image.is_some());
    }

    #[test]
    fn test_normalize_no_image_is_soft_failure() {
        let turn = normalize_image_reply(response_with_parts(vec![Part::text(
            "I can't picture that.",
        )]));
        assert_eq!(turn.content, "I can't picture that.");
        assert!(turn.image.is_none());

        let turn = normalize_image_reply(GenerateContentResponse { candidates: vec![] });
        assert_eq!(turn.content, NO_IMAGE_MESSAGE);
        assert!(turn.image.is_none());
    }
}
