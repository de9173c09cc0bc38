use indexmap::IndexMap;

pub const CAPABILITY_TEXT: &str = "text";
pub const CAPABILITY_IMAGE_EDIT: &str = "image_edit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<String>,
    pub context_window: Option<u64>,
}

impl ModelSpec {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }
}

/// Known models in preference order; the first model with a capability is
/// the default for it.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    /// Default models restricted to one backend.
    pub fn for_provider(provider: &str) -> Self {
        let models = default_models()
            .into_iter()
            .filter(|(_, spec)| spec.provider == provider)
            .collect();
        Self { models }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    pub fn by_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }

    pub fn ensure(&self, name: &str, capability: &str) -> Option<ModelSpec> {
        let model = self.get(name)?;
        if model.supports(capability) {
            return Some(model.clone());
        }
        None
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert =
        |name: &str, provider: &str, capabilities: &[&str], context_window: Option<u64>| {
            map.insert(
                name.to_string(),
                ModelSpec {
                    name: name.to_string(),
                    provider: provider.to_string(),
                    capabilities: capabilities
                        .iter()
                        .map(|item| (*item).to_string())
                        .collect(),
                    context_window,
                },
            );
        };

    insert("gemini-2.5-flash", "gemini", &[CAPABILITY_TEXT], Some(1_048_576));
    insert(
        "gemini-2.5-flash-image",
        "gemini",
        &[CAPABILITY_IMAGE_EDIT],
        Some(32_768),
    );
    insert("gemini-2.5-pro", "gemini", &[CAPABILITY_TEXT], Some(1_048_576));
    insert("gemini-2.0-flash", "gemini", &[CAPABILITY_TEXT], Some(1_048_576));
    insert(
        "gemini-3-pro-image-preview",
        "gemini",
        &[CAPABILITY_IMAGE_EDIT],
        Some(65_536),
    );
    insert("dryrun-text-1", "dryrun", &[CAPABILITY_TEXT], Some(8192));
    insert("dryrun-image-1", "dryrun", &[CAPABILITY_IMAGE_EDIT], None);

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_defaults_lead_each_capability() {
        let registry = ModelRegistry::new(None);
        assert_eq!(
            registry.by_capability(CAPABILITY_TEXT)[0].name,
            "gemini-2.5-flash"
        );
        assert_eq!(
            registry.by_capability(CAPABILITY_IMAGE_EDIT)[0].name,
            "gemini-2.5-flash-image"
        );
    }

    #[test]
    fn provider_filter_keeps_only_that_backend() {
        let registry = ModelRegistry::for_provider("dryrun");
        let names = registry
            .list()
            .map(|model| model.name.clone())
            .collect::<Vec<String>>();
        assert_eq!(names, vec!["dryrun-text-1", "dryrun-image-1"]);
        assert!(registry.ensure("gemini-2.5-flash", CAPABILITY_TEXT).is_none());
    }

    #[test]
    fn ensure_checks_capability() {
        let registry = ModelRegistry::new(None);
        assert!(registry
            .ensure("gemini-2.5-flash-image", CAPABILITY_IMAGE_EDIT)
            .is_some());
        assert!(registry
            .ensure("gemini-2.5-flash-image", CAPABILITY_TEXT)
            .is_none());
    }
}
