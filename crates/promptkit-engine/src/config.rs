use std::env;
use std::fmt;

use anyhow::{bail, Result};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_REQUEST_TIMEOUT_S: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Gemini,
    Dryrun,
}

impl BackendKind {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(BackendKind::Gemini),
            "dryrun" | "dry-run" | "offline" => Ok(BackendKind::Dryrun),
            other => bail!("unknown backend '{other}' (expected gemini or dryrun)"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Gemini => "gemini",
            BackendKind::Dryrun => "dryrun",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime settings for the engine. Environment first, CLI flags layered on
/// top by the caller.
#[derive(Clone)]
pub struct EngineConfig {
    pub backend: BackendKind,
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub request_timeout_s: f64,
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("backend", &self.backend)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("request_timeout_s", &self.request_timeout_s)
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Gemini,
            api_key: None,
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            text_model: None,
            image_model: None,
            request_timeout_s: DEFAULT_REQUEST_TIMEOUT_S,
        }
    }
}

impl EngineConfig {
    /// Reads `API_KEY` (then `GEMINI_API_KEY`, `GOOGLE_API_KEY`),
    /// `GEMINI_API_BASE`, `PROMPTKIT_BACKEND`, `PROMPTKIT_TEXT_MODEL`,
    /// `PROMPTKIT_IMAGE_MODEL` and `PROMPTKIT_REQUEST_TIMEOUT`. A missing key
    /// is not an error here; requests fail later and surface as text.
    pub fn from_env() -> Result<Self> {
        let backend = match non_empty_env("PROMPTKIT_BACKEND") {
            Some(raw) => BackendKind::parse(&raw)?,
            None => BackendKind::Gemini,
        };
        let request_timeout_s = non_empty_env("PROMPTKIT_REQUEST_TIMEOUT")
            .and_then(|raw| raw.parse::<f64>().ok())
            .map(clamp_timeout)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_S);
        Ok(Self {
            backend,
            api_key: non_empty_env("API_KEY")
                .or_else(|| non_empty_env("GEMINI_API_KEY"))
                .or_else(|| non_empty_env("GOOGLE_API_KEY")),
            api_base: non_empty_env("GEMINI_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            text_model: non_empty_env("PROMPTKIT_TEXT_MODEL"),
            image_model: non_empty_env("PROMPTKIT_IMAGE_MODEL"),
            request_timeout_s,
        })
    }

    pub fn with_request_timeout(mut self, seconds: f64) -> Self {
        self.request_timeout_s = clamp_timeout(seconds);
        self
    }
}

fn clamp_timeout(seconds: f64) -> f64 {
    if !seconds.is_finite() {
        return DEFAULT_REQUEST_TIMEOUT_S;
    }
    seconds.clamp(15.0, 300.0)
}

pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_parses_aliases() -> anyhow::Result<()> {
        assert_eq!(BackendKind::parse("Gemini")?, BackendKind::Gemini);
        assert_eq!(BackendKind::parse(" dry-run ")?, BackendKind::Dryrun);
        assert!(BackendKind::parse("openai").is_err());
        Ok(())
    }

    #[test]
    fn timeout_is_clamped() {
        let config = EngineConfig::default().with_request_timeout(2.0);
        assert_eq!(config.request_timeout_s, 15.0);
        let config = EngineConfig::default().with_request_timeout(1_000.0);
        assert_eq!(config.request_timeout_s, 300.0);
        let config = EngineConfig::default().with_request_timeout(f64::NAN);
        assert_eq!(config.request_timeout_s, 90.0);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = EngineConfig {
            api_key: Some("secret-key".to_string()),
            ..EngineConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
