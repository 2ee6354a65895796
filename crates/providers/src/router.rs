//! Provider router: selects the model provider based on config.

use crate::openai_compat::OpenAiCompatProvider;
use errand_config::{AppConfig, ProviderConfig};
use errand_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Routes completion requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    pub fn default_name(&self) -> &str {
        &self.default_provider
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
///
/// Every provider is OpenAI-compatible. The default provider is registered
/// even without a `[providers.<name>]` section as long as its base URL is
/// known. A provider with neither an `api_url` nor a well-known URL is
/// skipped.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    let unconfigured_default = (!config.providers.contains_key(&config.default_provider))
        .then_some((&config.default_provider, None));
    let entries = config
        .providers
        .iter()
        .map(|(name, section)| (name, Some(section)))
        .chain(unconfigured_default);

    for (name, section) in entries {
        match connect(name, section, config.api_key.as_deref()) {
            Some(provider) => router.register(name.clone(), Arc::new(provider)),
            None => warn!(provider = %name, "No api_url for unknown provider; skipping"),
        }
    }

    router
}

fn connect(
    name: &str,
    section: Option<&ProviderConfig>,
    shared_key: Option<&str>,
) -> Option<OpenAiCompatProvider> {
    let base_url = section
        .and_then(|s| s.api_url.clone())
        .or_else(|| default_base_url(name).map(String::from))?;
    let api_key = section
        .and_then(|s| s.api_key.as_deref())
        .or(shared_key)
        .unwrap_or_default();
    Some(OpenAiCompatProvider::new(name, &base_url, api_key))
}

/// Base URL of a well-known OpenAI-compatible endpoint.
fn default_base_url(provider_name: &str) -> Option<&'static str> {
    let url = match provider_name {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url)
}
