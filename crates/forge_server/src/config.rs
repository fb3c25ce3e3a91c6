//! Server configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_OWNER_ID: &str = "local-user";

/// Bind address, CORS and request ownership settings.
///
/// Sources, lowest precedence first: defaults, optional TOML file,
/// environment, then CLI flags applied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed browser origins.
    pub cors_origins: Vec<String>,
    /// Owner id applied to every project request.
    pub owner_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: derive_cors_origins(|_| None),
            owner_id: DEFAULT_OWNER_ID.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded server config");
        Ok(config)
    }

    /// Overlay environment variables.
    pub fn with_env(self) -> ServerResult<Self> {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable source.
    ///
    /// `CORS_ORIGINS` replaces the origin list outright. Otherwise, if any
    /// `FRONTEND_*` variable is set, the list is rebuilt from them.
    pub fn with_lookup<F>(mut self, lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("FORGE_HOST") {
            self.host = host;
        }
        if let Some(port) = get("FORGE_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("invalid FORGE_PORT: {}", port)))?;
        }
        if let Some(owner) = get("FORGE_OWNER_ID") {
            self.owner_id = owner;
        }

        if let Some(origins) = get("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        } else if ["FRONTEND_HOST", "FRONTEND_PORT", "FRONTEND_FALLBACK_PORT"]
            .iter()
            .any(|key| get(key).is_some())
        {
            self.cors_origins = derive_cors_origins(&get);
        }

        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Origins for the dev frontend: its host (plus `127.0.0.1` when it is
/// `localhost`) on the primary and fallback ports.
fn derive_cors_origins<F>(get: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = get("FRONTEND_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = get("FRONTEND_PORT").unwrap_or_else(|| "5173".to_string());
    let fallback = get("FRONTEND_FALLBACK_PORT").unwrap_or_else(|| "5174".to_string());

    let mut hosts = vec![host.clone()];
    if host == "localhost" {
        hosts.push("127.0.0.1".to_string());
    }

    hosts
        .iter()
        .flat_map(|h| [&port, &fallback].map(|p| format!("http://{}:{}", h, p)))
        .collect()
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
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.owner_id, "local-user");
        assert_eq!(
            config.cors_origins,
            vec![
                "http://localhost:5173",
                "http://localhost:5174",
                "http://127.0.0.1:5173",
                "http://127.0.0.1:5174",
            ]
        );
    }

    #[test]
    fn test_cors_origins_env_wins() {
        let config = ServerConfig::default()
            .with_lookup(lookup(&[
                ("CORS_ORIGINS", "https://a.example, https://b.example"),
                ("FRONTEND_HOST", "ignored"),
            ]))
            .unwrap();
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_frontend_host_without_alias() {
        let config = ServerConfig::default()
            .with_lookup(lookup(&[("FRONTEND_HOST", "app.local"), ("FRONTEND_PORT", "3000")]))
            .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["http://app.local:3000", "http://app.local:5174"]
        );
    }

    #[test]
    fn test_env_overrides_and_bad_port() {
        let config = ServerConfig::default()
            .with_lookup(lookup(&[("FORGE_PORT", "9000"), ("FORGE_OWNER_ID", "alice")]))
            .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.owner_id, "alice");

        let err = ServerConfig::default()
            .with_lookup(lookup(&[("FORGE_PORT", "nine")]))
            .unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forge.toml");
        std::fs::write(&path, "port = 8080\nowner_id = \"team\"\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.owner_id, "team");
        assert_eq!(config.host, DEFAULT_HOST);
    }
}
