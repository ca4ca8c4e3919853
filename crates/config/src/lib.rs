//! Configuration loading, validation, and management for PaperForge.
//!
//! Loads configuration from `~/.paperforge/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.paperforge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenAI-compatible LLM backend (chat + embeddings)
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Pinecone vector index
    #[serde(default)]
    pub pinecone: PineconeConfig,

    /// Retrieval limits
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Batch ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_url")]
    pub api_url: String,

    /// Chat completion model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model used for queries and ingestion
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_openai_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    /// Data-plane host. Resolved from the control plane when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default = "default_namespace")]
    pub namespace: String,
}

/// Namespace holding the Class 10 Science reference questions.
pub const DEFAULT_NAMESPACE: &str = "class10-science";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_name: None,
            host: None,
            namespace: default_namespace(),
        }
    }
}

impl std::fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("api_key", &redact(&self.api_key))
            .field("index_name", &self.index_name)
            .field("host", &self.host)
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Matches requested from the index
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Snippets included in the prompt. Independent of `top_k`.
    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,
}

fn default_top_k() -> usize {
    12
}
fn default_max_snippets() -> usize {
    12
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_snippets: default_max_snippets(),
        }
    }
}

/// Completion limits. The sampling temperature is fixed by the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    50
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Resolved Pinecone credentials, see [`AppConfig::require_pinecone`].
#[derive(Clone)]
pub struct PineconeCredentials {
    pub api_key: String,
    pub index_name: String,
    pub host: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.paperforge/config.toml),
    /// then apply environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides. Blank values are ignored.
    ///
    /// Takes a lookup function so overrides can be tested without touching
    /// the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.openai.api_url = url;
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.openai.model = model;
        }
        if let Some(model) = var("OPENAI_EMBEDDING_MODEL") {
            self.openai.embedding_model = model;
        }
        if let Some(key) = var("PINECONE_API_KEY") {
            self.pinecone.api_key = Some(key);
        }
        if let Some(name) = var("PINECONE_INDEX_NAME") {
            self.pinecone.index_name = Some(name);
        }
        if let Some(host) = var("PINECONE_HOST") {
            self.pinecone.host = Some(host);
        }
        if let Some(ns) = var("PINECONE_NAMESPACE") {
            self.pinecone.namespace = ns;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".paperforge")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be >= 1".into(),
            ));
        }

        if self.retrieval.max_snippets == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.max_snippets must be >= 1".into(),
            ));
        }

        if self.ingest.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "ingest.batch_size must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// The OpenAI API key, or an error naming the variable to set.
    pub fn require_openai_key(&self) -> Result<&str, ConfigError> {
        self.openai
            .api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }

    /// Pinecone credentials, or an error naming the first missing variable.
    pub fn require_pinecone(&self) -> Result<PineconeCredentials, ConfigError> {
        let api_key = self
            .pinecone
            .api_key
            .clone()
            .ok_or(ConfigError::Missing("PINECONE_API_KEY"))?;
        let index_name = self
            .pinecone
            .index_name
            .clone()
            .ok_or(ConfigError::Missing("PINECONE_INDEX_NAME"))?;
        Ok(PineconeCredentials {
            api_key,
            index_name,
            host: self.pinecone.host.clone(),
        })
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing env var: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.embedding_model, "text-embedding-3-small");
        assert_eq!(config.pinecone.namespace, "class10-science");
        assert_eq!(config.retrieval.top_k, 12);
        assert_eq!(config.retrieval.max_snippets, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.openai.model, config.openai.model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn generation_section_only_sets_max_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[generation]\ntemperature = 1.5\nmax_tokens = 4000\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.generation.max_tokens, Some(4000));
        assert!(!AppConfig::default_toml().contains("temperature"));
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.max_snippets = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.ingest.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[retrieval]\ntop_k = 20\n\n[pinecone]\nindex_name = \"pyq\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.retrieval.top_k, 20);
        assert_eq!(config.retrieval.max_snippets, 12);
        assert_eq!(config.pinecone.index_name.as_deref(), Some("pyq"));
        assert_eq!(config.pinecone.namespace, "class10-science");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retrieval\ntop_k = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply_and_skip_blanks() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("PINECONE_NAMESPACE", "  "),
            ("PINECONE_INDEX_NAME", "pyq-index"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.pinecone.namespace, "class10-science");
        assert_eq!(config.pinecone.index_name.as_deref(), Some("pyq-index"));
    }

    #[test]
    fn required_credentials_name_the_missing_variable() {
        let config = AppConfig::default();
        assert_eq!(
            config.require_openai_key().unwrap_err().to_string(),
            "Missing env var: OPENAI_API_KEY"
        );

        let mut config = AppConfig::default();
        config.pinecone.api_key = Some("pc-key".into());
        assert_eq!(
            config.require_pinecone().err().unwrap().to_string(),
            "Missing env var: PINECONE_INDEX_NAME"
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.openai.api_key = Some("sk-secret".into());
        config.pinecone.api_key = Some("pc-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("pc-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o-mini"));
        assert!(toml_str.contains("class10-science"));
    }
}
