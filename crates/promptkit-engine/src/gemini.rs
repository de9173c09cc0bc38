use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Value};

use crate::config::EngineConfig;
use crate::{
    GenerativeBackend, ImageEditRequest, InlineImage, ResponsePart, TextGenerationRequest,
};

/// `models/{model}:generateContent` client for the Gemini REST API.
pub struct GeminiBackend {
    api_base: String,
    api_key: Option<String>,
    http: HttpClient,
}

impl GeminiBackend {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs_f64(config.request_timeout_s))
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn post_generate(&self, model: &str, payload: &Value) -> Result<Value> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("API_KEY or GEMINI_API_KEY or GOOGLE_API_KEY not set");
        };
        let endpoint = self.endpoint_for_model(model);
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(payload)
            .send()
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        response_json_or_error("Gemini", response)
    }
}

impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate_text(&self, request: &TextGenerationRequest) -> Result<Option<String>> {
        let payload = build_text_payload(request);
        let response = self.post_generate(&request.model, &payload)?;
        Ok(extract_text(&response))
    }

    fn edit_image(&self, request: &ImageEditRequest) -> Result<Vec<ResponsePart>> {
        let payload = build_image_edit_payload(request);
        let response = self.post_generate(&request.model, &payload)?;
        Ok(extract_parts(&response))
    }
}

pub(crate) fn build_text_payload(request: &TextGenerationRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }],
        }],
        "systemInstruction": {
            "parts": [{ "text": request.system_instruction }],
        },
        "generationConfig": {
            "temperature": request.temperature,
            "topK": request.top_k,
            "topP": request.top_p,
        },
    })
}

pub(crate) fn build_image_edit_payload(request: &ImageEditRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inlineData": {
                        "data": request.image_base64,
                        "mimeType": request.mime_type,
                    }
                },
                { "text": request.instruction },
            ],
        }],
    })
}

fn first_candidate_parts(response: &Value) -> Vec<Value> {
    response
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Concatenated text parts of the first candidate, skipping thought parts.
/// `None` when the candidate carries no text at all.
pub(crate) fn extract_text(response: &Value) -> Option<String> {
    let mut found = false;
    let mut text = String::new();
    for part in first_candidate_parts(response) {
        if part.get("thought").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        if let Some(chunk) = part.get("text").and_then(Value::as_str) {
            found = true;
            text.push_str(chunk);
        }
    }
    found.then_some(text)
}

/// Parts of the first candidate in response order.
pub(crate) fn extract_parts(response: &Value) -> Vec<ResponsePart> {
    first_candidate_parts(response)
        .into_iter()
        .map(|part| {
            let inline_data = part
                .get("inlineData")
                .or_else(|| part.get("inline_data"))
                .and_then(Value::as_object)
                .and_then(|inline| {
                    let data = inline.get("data").and_then(Value::as_str)?;
                    Some(InlineImage {
                        mime_type: inline
                            .get("mimeType")
                            .or_else(|| inline.get("mime_type"))
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        data: data.to_string(),
                    })
                });
            ResponsePart {
                text: part.get("text").and_then(Value::as_str).map(str::to_string),
                inline_data,
            }
        })
        .collect()
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            crate::truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}
