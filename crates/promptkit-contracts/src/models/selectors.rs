use super::registry::{ModelRegistry, ModelSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: ModelSpec,
    pub requested: Option<String>,
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelSelector {
    pub registry: ModelRegistry,
}

impl ModelSelector {
    pub fn new(registry: Option<ModelRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_else(|| ModelRegistry::new(None)),
        }
    }

    /// Requested model when the registry knows it for `capability`, otherwise
    /// the registry default with the reason recorded. No request means the
    /// default without a reason.
    pub fn select(
        &self,
        requested: Option<&str>,
        capability: &str,
    ) -> Result<ModelSelection, String> {
        let (fallback_reason, requested_text) = match requested
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            Some(requested_value) => {
                if let Some(model) = self.registry.ensure(requested_value, capability) {
                    return Ok(ModelSelection {
                        model,
                        requested: Some(requested_value.to_string()),
                        fallback_reason: None,
                    });
                }
                (
                    Some(format!(
                        "Requested model '{requested_value}' unavailable for capability '{capability}'."
                    )),
                    Some(requested_value.to_string()),
                )
            }
            None => (None, None),
        };

        let candidates = self.registry.by_capability(capability);
        let Some(model) = candidates.first().cloned() else {
            return Err(format!(
                "No models available for capability '{capability}'."
            ));
        };
        Ok(ModelSelection {
            model,
            requested: requested_text,
            fallback_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::models::{CAPABILITY_IMAGE_EDIT, CAPABILITY_TEXT};

    fn text_model(name: &str) -> ModelSpec {
        ModelSpec {
            name: name.to_string(),
            provider: "dryrun".to_string(),
            capabilities: vec![CAPABILITY_TEXT.to_string()],
            context_window: None,
        }
    }

    #[test]
    fn selector_falls_back_when_requested_model_unavailable() {
        let mut models = IndexMap::new();
        models.insert("text-fallback".to_string(), text_model("text-fallback"));
        let selection = ModelSelector::new(Some(ModelRegistry::new(Some(models))))
            .select(Some("missing"), CAPABILITY_TEXT)
            .unwrap();
        assert_eq!(selection.model.name, "text-fallback");
        assert_eq!(selection.requested.as_deref(), Some("missing"));
        assert_eq!(
            selection.fallback_reason.as_deref(),
            Some("Requested model 'missing' unavailable for capability 'text'.")
        );
    }

    #[test]
    fn selector_without_request_uses_default_silently() {
        let selection = ModelSelector::new(None)
            .select(None, CAPABILITY_TEXT)
            .unwrap();
        assert_eq!(selection.model.name, "gemini-2.5-flash");
        assert!(selection.fallback_reason.is_none());

        let blank = ModelSelector::new(None)
            .select(Some("  "), CAPABILITY_IMAGE_EDIT)
            .unwrap();
        assert_eq!(blank.model.name, "gemini-2.5-flash-image");
        assert!(blank.requested.is_none());
    }

    #[test]
    fn selector_honors_known_request() {
        let selection = ModelSelector::new(None)
            .select(Some("gemini-2.5-pro"), CAPABILITY_TEXT)
            .unwrap();
        assert_eq!(selection.model.name, "gemini-2.5-pro");
        assert!(selection.fallback_reason.is_none());
    }

    #[test]
    fn selector_errors_when_no_models_for_capability() {
        let mut models = IndexMap::new();
        models.insert("text-only".to_string(), text_model("text-only"));
        let err = ModelSelector::new(Some(ModelRegistry::new(Some(models))))
            .select(Some("gemini-2.5-flash-image"), CAPABILITY_IMAGE_EDIT)
            .err()
            .unwrap_or_default();
        assert_eq!(err, "No models available for capability 'image_edit'.");
    }
}
