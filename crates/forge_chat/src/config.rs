//! Chat completion backend settings.

use std::fmt;

pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
pub const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";

pub const DEFAULT_API_VERSION: &str = "2024-06-01";

/// Credentials and addressing for the hosted chat completion service.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl BackendSettings {
    /// Read settings from the environment.
    ///
    /// Returns `None` unless endpoint, key and deployment are all present and
    /// non-empty; callers then fall back to stub agents.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BackendSettings::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let endpoint = required(ENV_ENDPOINT)?;
        let api_key = required(ENV_API_KEY)?;
        let deployment = required(ENV_DEPLOYMENT)?;
        let api_version = required(ENV_API_VERSION).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        Some(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment,
            api_version,
        })
    }

    /// Full streaming chat completions URL for the deployment.
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_all_required_present() {
        let settings = BackendSettings::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://example.openai.azure.com/"),
            (ENV_API_KEY, "secret"),
            (ENV_DEPLOYMENT, "gpt-4o"),
        ]))
        .unwrap();

        assert_eq!(settings.api_version, DEFAULT_API_VERSION);
        assert_eq!(
            settings.chat_completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-06-01"
        );
    }

    #[test]
    fn test_any_missing_or_blank_selects_none() {
        let full = [
            (ENV_ENDPOINT, "https://example.openai.azure.com"),
            (ENV_API_KEY, "secret"),
            (ENV_DEPLOYMENT, "gpt-4o"),
        ];
        for skip in 0..full.len() {
            let partial: Vec<_> = full
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, kv)| *kv)
                .collect();
            assert!(BackendSettings::from_lookup(lookup(&partial)).is_none());

            let mut blank = full;
            blank[skip].1 = "  ";
            assert!(BackendSettings::from_lookup(lookup(&blank)).is_none());
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = BackendSettings::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://example.openai.azure.com"),
            (ENV_API_KEY, "super-secret-key"),
            (ENV_DEPLOYMENT, "gpt-4o"),
        ]))
        .unwrap();

        let debug = format!("{:?}", settings);
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
