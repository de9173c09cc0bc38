use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolType {
    Generator,
    Refiner,
    Persona,
    Analyzer,
    ImageEditor,
}

impl ToolType {
    pub const ALL: [ToolType; 5] = [
        ToolType::Generator,
        ToolType::Refiner,
        ToolType::Persona,
        ToolType::Analyzer,
        ToolType::ImageEditor,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ToolType::Generator => "GENERATOR",
            ToolType::Refiner => "REFINER",
            ToolType::Persona => "PERSONA",
            ToolType::Analyzer => "ANALYZER",
            ToolType::ImageEditor => "IMAGE_EDITOR",
        }
    }

    /// Accepts the canonical id in any case plus the short verbs used by the
    /// workspace commands (`generate`, `refine`, `edit`, ...).
    pub fn parse(raw: &str) -> Option<ToolType> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        let tool = match normalized.as_str() {
            "generator" | "generate" | "gen" => ToolType::Generator,
            "refiner" | "refine" => ToolType::Refiner,
            "persona" => ToolType::Persona,
            "analyzer" | "analyze" | "analyse" => ToolType::Analyzer,
            "image_editor" | "image" | "edit" | "magic" => ToolType::ImageEditor,
            _ => return None,
        };
        Some(tool)
    }

    pub fn is_image_editor(self) -> bool {
        self == ToolType::ImageEditor
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequestPayload {
    pub input: String,
    pub category: Category,
    pub tool_type: ToolType,
    /// Data URL (or bare base64) of the staged image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
}

impl PromptRequestPayload {
    pub fn new(input: impl Into<String>, category: Category, tool_type: ToolType) -> Self {
        Self {
            input: input.into(),
            category,
            tool_type,
            image: None,
            complexity: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// The image-edit path only applies when a non-empty image travels with
    /// an IMAGE_EDITOR request; every other combination goes to the text model.
    pub fn wants_image_edit(&self) -> bool {
        self.tool_type.is_image_editor()
            && self
                .image
                .as_deref()
                .map(|image| !image.is_empty())
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Text,
    Image,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Normalized output of one generation. `kind` decides how `content` is read:
/// plain text, or a `data:image/png;base64,...` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResult {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
}

impl GeneratedResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: ResultKind::Text,
            metadata: None,
        }
    }

    pub fn image(data_url: impl Into<String>) -> Self {
        Self {
            content: data_url.into(),
            kind: ResultKind::Image,
            metadata: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == ResultKind::Image
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::catalog::category_by_id;

    #[test]
    fn tool_type_parses_ids_and_aliases() {
        assert_eq!(ToolType::parse("GENERATOR"), Some(ToolType::Generator));
        assert_eq!(ToolType::parse("refine"), Some(ToolType::Refiner));
        assert_eq!(ToolType::parse(" Analyze "), Some(ToolType::Analyzer));
        assert_eq!(ToolType::parse("image-editor"), Some(ToolType::ImageEditor));
        assert_eq!(ToolType::parse("edit"), Some(ToolType::ImageEditor));
        assert_eq!(ToolType::parse("summarize"), None);
        assert_eq!(ToolType::parse(""), None);
    }

    #[test]
    fn payload_serializes_with_source_field_names() -> anyhow::Result<()> {
        let category =
            category_by_id("coding").ok_or_else(|| anyhow::anyhow!("missing coding category"))?;
        let payload = PromptRequestPayload::new("make a parser", category, ToolType::ImageEditor)
            .with_image("data:image/png;base64,AAAA");
        let value = serde_json::to_value(&payload)?;
        assert_eq!(value["toolType"], json!("IMAGE_EDITOR"));
        assert!(value["category"].get("systemContext").is_some());
        assert_eq!(value["image"], json!("data:image/png;base64,AAAA"));
        assert!(value.get("complexity").is_none());

        let parsed: PromptRequestPayload = serde_json::from_value(value)?;
        assert_eq!(parsed, payload);
        Ok(())
    }

    #[test]
    fn image_edit_requires_editor_tool_and_non_empty_image() -> anyhow::Result<()> {
        let category =
            category_by_id("image").ok_or_else(|| anyhow::anyhow!("missing image category"))?;
        let base = PromptRequestPayload::new("", category, ToolType::ImageEditor);
        assert!(!base.wants_image_edit());
        assert!(!base.clone().with_image("").wants_image_edit());
        assert!(base.clone().with_image("AAAA").wants_image_edit());

        let mut text = base.with_image("AAAA");
        text.tool_type = ToolType::Refiner;
        assert!(!text.wants_image_edit());
        Ok(())
    }

    #[test]
    fn generated_result_uses_type_field() -> anyhow::Result<()> {
        let value = serde_json::to_value(GeneratedResult::image("data:image/png;base64,QQ=="))?;
        assert_eq!(value["type"], Value::String("image".to_string()));
        assert!(value.get("metadata").is_none());

        let parsed: GeneratedResult =
            serde_json::from_value(json!({"content": "ok", "type": "text"}))?;
        assert_eq!(parsed, GeneratedResult::text("ok"));
        assert!(!parsed.is_image());
        Ok(())
    }
}
