mod config;
mod dryrun;
mod gemini;

use anyhow::{bail, Context, Result};
use promptkit_contracts::data_url::{png_data_url, strip_data_url_prefix, PNG_MIME};
use promptkit_contracts::events::{EventPayload, EventWriter};
use promptkit_contracts::instruction::build_system_instruction;
use promptkit_contracts::models::{
    ModelRegistry, ModelSelection, ModelSelector, CAPABILITY_IMAGE_EDIT, CAPABILITY_TEXT,
};
use promptkit_contracts::payload::{GeneratedResult, PromptRequestPayload};
use promptkit_contracts::workspace::{failure_payload, ResponseSource};
use serde_json::{json, Value};

pub use config::{BackendKind, EngineConfig, DEFAULT_GEMINI_API_BASE};
pub use dryrun::DryrunBackend;
pub use gemini::GeminiBackend;

pub const TEMPERATURE: f64 = 0.7;
pub const TOP_K: u32 = 40;
pub const TOP_P: f64 = 0.95;

pub const DEFAULT_EDIT_INSTRUCTION: &str = "Enhance this image";
pub const IMAGE_EDIT_FAILURE_MESSAGE: &str =
    "Não foi possível gerar a imagem. Tente uma instrução diferente.";
pub const NO_TEXT_MESSAGE: &str = "Nenhuma resposta de texto foi gerada.";
pub const GENERIC_ERROR_MESSAGE: &str = "Desculpe, ocorreu um erro ao processar sua solicitação. Verifique se o arquivo não é muito grande e tente novamente.";

#[derive(Debug, Clone, PartialEq)]
pub struct TextGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: String,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageEditRequest {
    pub model: String,
    /// Raw base64, no data URL prefix.
    pub image_base64: String,
    pub mime_type: String,
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponsePart {
    pub text: Option<String>,
    pub inline_data: Option<InlineImage>,
}

/// Remote model endpoint. One call per method invocation, no retries.
pub trait GenerativeBackend: Send + Sync {
    fn name(&self) -> &str;
    /// `Ok(None)` when the model answered without any text.
    fn generate_text(&self, request: &TextGenerationRequest) -> Result<Option<String>>;
    /// Content parts of the answer, in response order.
    fn edit_image(&self, request: &ImageEditRequest) -> Result<Vec<ResponsePart>>;
}

pub fn backend_from_config(config: &EngineConfig) -> Result<Box<dyn GenerativeBackend>> {
    let backend: Box<dyn GenerativeBackend> = match config.backend {
        BackendKind::Gemini => Box::new(GeminiBackend::new(config)?),
        BackendKind::Dryrun => Box::new(DryrunBackend),
    };
    Ok(backend)
}

/// The request adapter: one payload in, one normalized result out.
pub struct PromptEngine {
    backend: Box<dyn GenerativeBackend>,
    model_selector: ModelSelector,
    text_model: Option<String>,
    image_model: Option<String>,
    events: EventWriter,
}

impl PromptEngine {
    pub fn new(backend: Box<dyn GenerativeBackend>, events: EventWriter) -> Self {
        let registry = ModelRegistry::for_provider(backend.name());
        Self {
            backend,
            model_selector: ModelSelector::new(Some(registry)),
            text_model: None,
            image_model: None,
            events,
        }
    }

    pub fn from_config(config: &EngineConfig, events: EventWriter) -> Result<Self> {
        let mut engine = Self::new(backend_from_config(config)?, events);
        engine.set_text_model(config.text_model.clone());
        engine.set_image_model(config.image_model.clone());
        Ok(engine)
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn set_text_model(&mut self, model: Option<String>) {
        self.text_model = model;
    }

    pub fn text_model(&self) -> Option<&str> {
        self.text_model.as_deref()
    }

    pub fn set_image_model(&mut self, model: Option<String>) {
        self.image_model = model;
    }

    pub fn image_model(&self) -> Option<&str> {
        self.image_model.as_deref()
    }

    pub fn event_writer(&self) -> EventWriter {
        self.events.clone()
    }

    pub fn resolve_text_model(&self) -> Result<ModelSelection> {
        self.select(self.text_model.as_deref(), CAPABILITY_TEXT)
    }

    pub fn resolve_image_model(&self) -> Result<ModelSelection> {
        self.select(self.image_model.as_deref(), CAPABILITY_IMAGE_EDIT)
    }

    fn select(&self, requested: Option<&str>, capability: &str) -> Result<ModelSelection> {
        self.model_selector
            .select(requested, capability)
            .map_err(anyhow::Error::msg)
    }

    /// Never fails: any error on either path is logged and replaced by
    /// [`GENERIC_ERROR_MESSAGE`] as a text result.
    pub fn generate_prompt_response(&self, payload: &PromptRequestPayload) -> GeneratedResult {
        match self.try_generate(payload) {
            Ok(result) => {
                let _ = self.events.emit(
                    "generation_finished",
                    event_payload(json!({
                        "category": payload.category.id,
                        "tool": payload.tool_type.id(),
                        "result_type": result.kind,
                        "chars": result.content.chars().count(),
                    })),
                );
                result
            }
            Err(err) => {
                let error_text = error_chain_text(&err, 1024);
                eprintln!("Gemini API call failed: {error_text}");
                let _ = self.events.emit(
                    "generation_failed",
                    failure_payload(payload, "adapter", &error_text),
                );
                GeneratedResult::text(GENERIC_ERROR_MESSAGE)
            }
        }
    }

    fn try_generate(&self, payload: &PromptRequestPayload) -> Result<GeneratedResult> {
        match payload.image.as_deref() {
            Some(image) if payload.wants_image_edit() => self.edit_image(payload, image),
            _ => self.generate_text(payload),
        }
    }

    fn edit_image(&self, payload: &PromptRequestPayload, image: &str) -> Result<GeneratedResult> {
        let selection = self.resolve_image_model()?;
        self.emit_started(payload, "image_edit", &selection);
        let instruction = if payload.input.is_empty() {
            DEFAULT_EDIT_INSTRUCTION.to_string()
        } else {
            payload.input.clone()
        };
        let request = ImageEditRequest {
            model: selection.model.name,
            image_base64: strip_data_url_prefix(image).to_string(),
            mime_type: PNG_MIME.to_string(),
            instruction,
        };
        let parts = self.backend.edit_image(&request)?;
        let image_part = parts
            .iter()
            .filter_map(|part| part.inline_data.as_ref())
            .find(|inline| !inline.data.is_empty());
        Ok(match image_part {
            Some(inline) => GeneratedResult::image(png_data_url(&inline.data)),
            None => GeneratedResult::text(IMAGE_EDIT_FAILURE_MESSAGE),
        })
    }

    fn generate_text(&self, payload: &PromptRequestPayload) -> Result<GeneratedResult> {
        let selection = self.resolve_text_model()?;
        self.emit_started(payload, "text", &selection);
        let request = TextGenerationRequest {
            model: selection.model.name,
            prompt: payload.input.clone(),
            system_instruction: build_system_instruction(&payload.category, payload.tool_type),
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
        };
        let text = self
            .backend
            .generate_text(&request)
            .with_context(|| format!("text generation with {} failed", request.model))?;
        match text {
            Some(text) if !text.is_empty() => Ok(GeneratedResult::text(text)),
            _ => bail!(NO_TEXT_MESSAGE),
        }
    }

    /// Event writes are best effort here, like the finished and failed events.
    fn emit_started(
        &self,
        payload: &PromptRequestPayload,
        path: &str,
        selection: &ModelSelection,
    ) {
        let _ = self.events.emit(
            "generation_started",
            event_payload(json!({
                "category": payload.category.id,
                "tool": payload.tool_type.id(),
                "path": path,
                "backend": self.backend.name(),
                "model": selection.model.name,
                "model_fallback": selection.fallback_reason,
                "input_chars": payload.input.chars().count(),
                "has_image": payload.image.is_some(),
            })),
        );
    }
}

impl ResponseSource for PromptEngine {
    fn respond(&self, payload: &PromptRequestPayload) -> Result<GeneratedResult> {
        Ok(self.generate_prompt_response(payload))
    }
}

fn event_payload(value: Value) -> EventPayload {
    value.as_object().cloned().unwrap_or_default()
}

pub fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if parts
            .last()
            .map(|existing| existing == trimmed)
            .unwrap_or(false)
        {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

pub(crate) fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
