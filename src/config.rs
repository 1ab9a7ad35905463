//! Service configuration
//!
//! Configuration is layered: defaults, then an optional `kgraph.toml` file,
//! then environment variables prefixed with `KGRAG_` (e.g.
//! `KGRAG_SERVER__PORT=9090`). Secrets such as the LLM API key are read from
//! the environment only (`GROQ_API_KEY`), usually via a `.env` file loaded by
//! `main`.

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Where the persisted store files live
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

/// Embedding backend settings
///
/// When `api_url` is unset the service falls back to the deterministic
/// offline hashing embedder.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_embed_model")]
    pub model: String,
    /// Vector dimension, fixed for the life of a store instance
    #[serde(default = "default_embed_dim")]
    pub dim: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Groq-compatible chat-completions settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_url")]
    pub api_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// API-key gate for the mutating and query endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub require_api_key: bool,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}
fn default_data_dir() -> String {
    "data".to_string()
}
fn default_embed_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}
fn default_embed_dim() -> usize {
    384
}
fn default_timeout_ms() -> u64 {
    40_000
}
fn default_llm_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}
fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}
fn default_max_tokens() -> u32 {
    512
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_token: None,
            model: default_embed_model(),
            dim: default_embed_dim(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_url(),
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_api_key: false,
            api_key: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `kgraph.toml` (optional) and `KGRAG_*`
    /// environment variables.
    pub fn load() -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("kgraph").required(false))
            .add_source(
                config::Environment::with_prefix("KGRAG")
                    .separator("__")
                    .try_parsing(true),
            );

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// LLM API key, read from `GROQ_API_KEY`.
    ///
    /// Returns a configuration error when the key is absent; callers that can
    /// tolerate missing credentials (extraction) degrade at the call site.
    pub fn llm_api_key(&self) -> Result<SecretString> {
        match std::env::var("GROQ_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(SecretString::new(key)),
            _ => Err(Error::Config("missing GROQ_API_KEY".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.embedding.dim, 384);
        assert!(!config.auth.require_api_key);
    }
}
