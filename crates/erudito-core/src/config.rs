//! Configuration for the Ollama backend, model selection, index storage and the HTTP service.

use crate::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{from_str, to_string_pretty};
use tracing::debug;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "erudito.toml";

/// Complete erudito configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EruditoConfig {
    /// Ollama connection settings
    pub ollama: OllamaConfig,
    /// Models used for embeddings and completions
    pub models: ModelConfig,
    /// Where and how indexes are built
    pub index: IndexConfig,
    /// HTTP service settings
    pub server: ServerConfig,
}

/// Ollama connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Scheme and host of the Ollama server
    pub host: String,
    /// Port of the Ollama server
    pub port: u16,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_owned(),
            port: 11434,
        }
    }
}

impl OllamaConfig {
    /// URL of the Ollama HTTP API.
    ///
    /// `host` may be a full URL (`http://gpu-box`), a bare host (`gpu-box`) or
    /// Ollama's own `host:port` form (`127.0.0.1:11434`). A port written in
    /// `host` wins over `port`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `host` is not a usable HTTP address
    pub fn url(&self) -> Result<Url> {
        let host = self.host.trim();
        let candidate = if host.contains("://") {
            host.to_owned()
        } else {
            format!("http://{host}")
        };

        let invalid = |reason: String| {
            Error::Config(format!("Invalid Ollama host '{}': {reason}", self.host))
        };
        let mut url = Url::parse(&candidate).map_err(|error| invalid(error.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_owned()));
        }
        if !has_explicit_port(&candidate) {
            url.set_port(Some(self.port))
                .map_err(|()| invalid("cannot carry a port".to_owned()))?;
        }
        Ok(url)
    }

    /// Base URL of the Ollama HTTP API, without a trailing slash.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `host` is not a usable HTTP address
    pub fn base_url(&self) -> Result<String> {
        Ok(self.url()?.as_str().trim_end_matches('/').to_owned())
    }
}

/// Whether the authority of `url` spells out a port
fn has_explicit_port(url: &str) -> bool {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    authority.rsplit_once(':').is_some_and(|(_, port)| {
        !port.is_empty() && port.chars().all(|character| character.is_ascii_digit())
    })
}

/// Model names as known to Ollama.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model used to embed chunks and questions
    pub embedding: String,
    /// Model used to answer questions
    pub completion: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding: "nomic-embed-text".to_owned(),
            completion: "llama3.2".to_owned(),
        }
    }
}

/// Index storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding one sub-directory per ingested document folder
    pub root: PathBuf,
    /// Maximum chunk length in characters
    pub chunk_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("index"),
            chunk_size: 512,
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
        }
    }
}

/// Models resolved for a single ingestion or query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    /// Embedding model name
    pub embedding: String,
    /// Completion model name
    pub completion: String,
}

impl EruditoConfig {
    /// Load configuration.
    ///
    /// Uses `explicit` when given, otherwise `./erudito.toml` when present, otherwise
    /// defaults. Environment overrides are applied last.
    ///
    /// # Errors
    /// Returns an error if a config file exists but cannot be read or parsed
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load_from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.ollama.url()?;
        Ok(config)
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|error| {
            Error::Config(format!("Failed to read config {}: {error}", path.display()))
        })?;
        let config: Self = from_str(&contents)?;

        debug!(
            "Loaded config from {}: embedding={}, completion={}",
            path.display(),
            config.models.embedding,
            config.models.completion
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let contents = to_string_pretty(self)
            .map_err(|error| Error::Config(format!("Failed to serialize config: {error}")))?;

        let header = "# Erudito Configuration File\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Apply overrides from a variable lookup (the process environment in practice).
    ///
    /// Recognised keys: `OLLAMA_HOST`, `OLLAMA_PORT`, `EMBEDDING_MODEL`,
    /// `COMPLETION_MODEL`, `ERUDITO_INDEX_DIR`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Some(port) = lookup("OLLAMA_PORT").and_then(|value| value.parse().ok()) {
            self.ollama.port = port;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.models.embedding = model;
        }
        if let Some(model) = lookup("COMPLETION_MODEL") {
            self.models.completion = model;
        }
        if let Some(root) = lookup("ERUDITO_INDEX_DIR") {
            self.index.root = PathBuf::from(root);
        }
    }

    /// Resolve the models to use, with an optional override applied to both.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a resolved model name is empty
    pub fn select_models(&self, model_override: Option<&str>) -> Result<ModelSelection> {
        Ok(ModelSelection {
            embedding: resolve_model(&self.models.embedding, model_override)?,
            completion: resolve_model(&self.models.completion, model_override)?,
        })
    }

    /// Resolve only the embedding model, for operations that never complete text.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the resolved model name is empty
    pub fn select_embedding_model(&self, model_override: Option<&str>) -> Result<String> {
        resolve_model(&self.models.embedding, model_override)
    }
}

/// Whether an installed Ollama model satisfies a requested model name.
///
/// An untagged request matches any tag of the same model, so `llama3.2`
/// is satisfied by `llama3.2:latest` but not by `llama3.2-vision:latest`.
pub fn model_name_matches(installed: &str, requested: &str) -> bool {
    if installed == requested {
        return true;
    }
    !requested.contains(':')
        && installed
            .split_once(':')
            .is_some_and(|(name, _)| name == requested)
}

/// Apply a non-blank override to a configured model name
fn resolve_model(configured: &str, model_override: Option<&str>) -> Result<String> {
    let model = match model_override.map(str::trim) {
        Some(model) if !model.is_empty() => model,
        _ => configured.trim(),
    };
    if model.is_empty() {
        return Err(Error::Config(
            "You need to specify the model the first time you ask a question".to_owned(),
        ));
    }
    Ok(model.to_owned())
}
