// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Gemini-backed slide engine.
//!
//! Talks to the `generateContent` endpoint over blocking HTTP with
//! inline base64 image parts. Provider failures are classified into the
//! [`EngineError`] taxonomy and surfaced without retries.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::engine::{
    AspectRatio, EngineError, GenerationRequest, ModelSelector, ReferenceImage, SlideEngine,
    SlideResult,
};
use crate::models::project::SlideMetadata;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Candidate finish reasons that indicate a content block.
const BLOCKED_FINISH_REASONS: &[&str] = &["SAFETY", "IMAGE_SAFETY", "PROHIBITED_CONTENT"];

/// [`SlideEngine`] implementation backed by Gemini image generation.
pub struct GeminiEngine {
    client: reqwest::blocking::Client,
    api_key: String,
    model: ModelSelector,
}

impl GeminiEngine {
    pub fn new(api_key: String, model: ModelSelector) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EngineError::Protocol(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    fn call(&self, body: &GenerateContentBody) -> Result<GenerateContentResponse, EngineError> {
        let url = format!(
            "{API_BASE}/models/{}:generateContent",
            self.model.api_model()
        );
        log::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(EngineError::from_status(
                status.as_u16(),
                provider_message(&text),
            ));
        }

        response
            .json::<GenerateContentResponse>()
            .map_err(|e| EngineError::Protocol(format!("failed to decode response: {e}")))
    }

    fn run(
        &self,
        body: &GenerateContentBody,
        revised_prompt: &str,
        aspect_ratio: Option<AspectRatio>,
    ) -> Result<SlideResult, EngineError> {
        let response = self.call(body)?;
        let parsed = extract_payload(response)?;

        let mut metadata = SlideMetadata::new();
        metadata.insert("engine".to_string(), serde_json::json!("gemini"));
        metadata.insert(
            "model_selector".to_string(),
            serde_json::json!(self.model.as_str()),
        );
        metadata.insert("model".to_string(), serde_json::json!(self.model.api_model()));
        metadata.insert(
            "mime_type".to_string(),
            serde_json::json!(parsed.mime_type.clone()),
        );
        if let Some(ratio) = aspect_ratio {
            metadata.insert("aspect_ratio".to_string(), serde_json::json!(ratio.as_str()));
        }
        if !parsed.text.is_empty() {
            metadata.insert("response_text".to_string(), serde_json::json!(parsed.text));
        }

        Ok(SlideResult {
            image_bytes: parsed.image_bytes,
            mime_type: parsed.mime_type,
            revised_prompt: revised_prompt.to_string(),
            metadata,
        })
    }
}

impl SlideEngine for GeminiEngine {
    fn generate(&self, request: &GenerationRequest) -> Result<SlideResult, EngineError> {
        let mut parts = vec![PartBody::text(&request.prompt)];
        parts.extend(request.references.iter().map(PartBody::inline));
        let body = GenerateContentBody {
            contents: vec![ContentBody { parts }],
            generation_config: GenerationConfig {
                response_modalities: &["TEXT", "IMAGE"],
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect_ratio.as_str(),
                }),
            },
        };
        self.run(&body, &request.prompt, Some(request.aspect_ratio))
    }

    fn edit(
        &self,
        source_image: &[u8],
        request: &GenerationRequest,
    ) -> Result<SlideResult, EngineError> {
        let mut parts = vec![
            PartBody::text(&request.prompt),
            PartBody::bytes(source_image, "image/png"),
        ];
        parts.extend(request.references.iter().map(PartBody::inline));
        let body = GenerateContentBody {
            contents: vec![ContentBody { parts }],
            generation_config: GenerationConfig {
                response_modalities: &["TEXT", "IMAGE"],
                image_config: None,
            },
        };
        self.run(&body, &request.prompt, None)
    }
}

fn transport_error(error: reqwest::Error) -> EngineError {
    if error.is_timeout() {
        EngineError::Transport(format!("request timed out: {error}"))
    } else {
        EngineError::Transport(error.to_string())
    }
}

/// Pull the human-readable message out of a provider error body,
/// falling back to the raw text.
fn provider_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(default)]
        message: String,
        #[serde(default)]
        status: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            if parsed.error.status.is_empty() {
                parsed.error.message
            } else {
                format!("{} ({})", parsed.error.message, parsed.error.status)
            }
        }
        _ => body.trim().to_string(),
    }
}

struct ExtractedPayload {
    image_bytes: Vec<u8>,
    mime_type: String,
    text: String,
}

/// Pick the first inline image and any text parts out of a response.
fn extract_payload(response: GenerateContentResponse) -> Result<ExtractedPayload, EngineError> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(EngineError::Rejected(format!(
                "prompt blocked by the provider: {reason}"
            )));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::Protocol("response carried no candidates".to_string()))?;

    if let Some(reason) = &candidate.finish_reason {
        if BLOCKED_FINISH_REASONS.contains(&reason.as_str()) {
            return Err(EngineError::Rejected(format!(
                "response blocked by the provider: {reason}"
            )));
        }
    }

    let mut image: Option<(Vec<u8>, String)> = None;
    let mut text_parts = Vec::new();
    for part in candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
    {
        if let Some(text) = part.text {
            if !text.is_empty() {
                text_parts.push(text);
            }
        }
        if let Some(inline) = part.inline_data {
            if image.is_none() {
                let bytes = BASE64.decode(inline.data.as_bytes()).map_err(|e| {
                    EngineError::Protocol(format!("invalid base64 image payload: {e}"))
                })?;
                image = Some((bytes, inline.mime_type));
            }
        }
    }

    let (image_bytes, mime_type) = image.ok_or_else(|| {
        EngineError::Rejected("the engine returned no image in the response".to_string())
    })?;
    Ok(ExtractedPayload {
        image_bytes,
        mime_type,
        text: text_parts.join("\n"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<ContentBody>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct ContentBody {
    parts: Vec<PartBody>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PartBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineDataBody>,
}

impl PartBody {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline(reference: &ReferenceImage) -> Self {
        Self::bytes(&reference.bytes, &reference.mime_type)
    }

    fn bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineDataBody {
                mime_type: mime_type.to_string(),
                data: BASE64.encode(bytes),
            }),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataBody {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default = "default_mime_type")]
    mime_type: String,
    data: String,
}

fn default_mime_type() -> String {
    "image/png".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from_json(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_payload_decodes_inline_image() {
        let data = BASE64.encode(b"fake-image-bytes");
        let response = response_from_json(&format!(
            r#"{{"candidates":[{{"content":{{"parts":[
                {{"text":"Here is your slide"}},
                {{"inlineData":{{"mimeType":"image/png","data":"{data}"}}}}
            ]}},"finishReason":"STOP"}}]}}"#
        ));

        let payload = extract_payload(response).unwrap();

        assert_eq!(payload.image_bytes, b"fake-image-bytes");
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.text, "Here is your slide");
    }

    #[test]
    fn test_extract_payload_rejects_blocked_prompt() {
        let response = response_from_json(
            r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#,
        );

        assert!(matches!(
            extract_payload(response),
            Err(EngineError::Rejected(_))
        ));
    }

    #[test]
    fn test_extract_payload_rejects_blocked_candidate() {
        let response = response_from_json(
            r#"{"candidates":[{"finishReason":"IMAGE_SAFETY"}]}"#,
        );

        assert!(matches!(
            extract_payload(response),
            Err(EngineError::Rejected(_))
        ));
    }

    #[test]
    fn test_extract_payload_requires_an_image() {
        let response = response_from_json(
            r#"{"candidates":[{"content":{"parts":[{"text":"only text"}]},"finishReason":"STOP"}]}"#,
        );

        assert!(matches!(
            extract_payload(response),
            Err(EngineError::Rejected(_))
        ));
    }

    #[test]
    fn test_provider_message_parses_error_body() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(provider_message(body), "Quota exceeded (RESOURCE_EXHAUSTED)");
        assert_eq!(provider_message("plain text"), "plain text");
    }

    #[test]
    fn test_request_body_uses_camel_case_wire_names() {
        let body = GenerateContentBody {
            contents: vec![ContentBody {
                parts: vec![PartBody::text("hello"), PartBody::bytes(b"img", "image/png")],
            }],
            generation_config: GenerationConfig {
                response_modalities: &["TEXT", "IMAGE"],
                image_config: Some(ImageConfig { aspect_ratio: "16:9" }),
            },
        };

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
    }
}
