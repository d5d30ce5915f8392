//! Configuration loading and management

use crate::storage::SeedData;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment variable holding the config file path
pub const CONFIG_ENV: &str = "GRAPHQL_BASICS_CONFIG";

/// Cross-origin settings of the HTTP transport
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; empty or `*` allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Complete configuration of the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on (e.g., "127.0.0.1:4000")
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path of the GraphQL endpoint
    #[serde(default = "default_graphql_path")]
    pub graphql_path: String,

    /// Serve the GraphQL playground under `{graphql_path}/playground`
    #[serde(default = "default_playground")]
    pub playground: bool,

    #[serde(default)]
    pub cors: CorsConfig,

    /// Optional YAML seed dataset; the demo dataset is used without one
    #[serde(default)]
    pub seed_file: Option<String>,
}

fn default_bind() -> String {
    "127.0.0.1:4000".to_string()
}

fn default_graphql_path() -> String {
    "/graphql".to_string()
}

fn default_playground() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            graphql_path: default_graphql_path(),
            playground: default_playground(),
            cors: CorsConfig::default(),
            seed_file: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from an explicit path, else from `GRAPHQL_BASICS_CONFIG`, else defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path.map(str::to_string).or_else(|| std::env::var(CONFIG_ENV).ok()) {
            Some(path) => {
                tracing::info!(path = %path, "Loading configuration");
                Self::from_yaml_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// `graphql_path` with exactly one leading `/` and no trailing one
    ///
    /// The root path normalizes to `/`.
    pub fn endpoint_path(&self) -> String {
        format!("/{}", self.graphql_path.trim_matches('/'))
    }

    /// The seed dataset the store starts with
    pub fn load_seed(&self) -> Result<SeedData> {
        match &self.seed_file {
            Some(path) => SeedData::from_yaml_file(path),
            None => Ok(SeedData::demo()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind, "127.0.0.1:4000");
        assert_eq!(config.graphql_path, "/graphql");
        assert!(config.playground);
        assert!(config.cors.allows_any_origin());
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ServerConfig::from_yaml_str("bind: 0.0.0.0:8080\n").unwrap();

        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.graphql_path, "/graphql");
        assert!(config.playground);
    }

    #[test]
    fn test_cors_origins() {
        let yaml = r#"
cors:
  allowed_origins:
    - http://localhost:3000
"#;
        let config = ServerConfig::from_yaml_str(yaml).unwrap();
        assert!(!config.cors.allows_any_origin());

        let wildcard = CorsConfig {
            allowed_origins: vec!["*".to_string()],
        };
        assert!(wildcard.allows_any_origin());
    }

    #[test]
    fn test_endpoint_path_is_normalized() {
        for (configured, expected) in [
            ("/graphql", "/graphql"),
            ("graphql", "/graphql"),
            ("/api/v1/", "/api/v1"),
            ("/", "/"),
            ("", "/"),
        ] {
            let config = ServerConfig {
                graphql_path: configured.to_string(),
                ..Default::default()
            };
            assert_eq!(config.endpoint_path(), expected);
        }
    }

    #[test]
    fn test_seed_defaults_to_demo_dataset() {
        let seed = ServerConfig::default().load_seed().unwrap();
        assert_eq!(seed.users.len(), 3);
        assert_eq!(seed.comments.len(), 4);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(ServerConfig::from_yaml_str("playground: [not, a, bool]").is_err());
    }
}
