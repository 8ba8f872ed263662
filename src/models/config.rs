//! Environment-backed configuration, validated once at startup.
//!
//! All settings are read into an immutable [`Config`] before any component is
//! constructed; business logic never consults the environment directly.

use crate::error::ConfigError;

pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:11411";
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;
pub const DEFAULT_INGEST_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    /// Qdrant endpoint.
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Embedding server base URL.
    pub url: String,
    pub timeout_secs: u64,
    /// Vector dimensionality; must match the collection configuration.
    pub dimension: usize,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Maximum number of chunks embedded and uploaded per round trip.
    pub batch_size: usize,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Missing required variables and unparseable or non-positive numeric
    /// values fail here, before any client handle is built.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("VECTOR_STORE_URL").ok_or(ConfigError::MissingVar("VECTOR_STORE_URL"))?;
        let api_key =
            lookup("VECTOR_STORE_API_KEY").ok_or(ConfigError::MissingVar("VECTOR_STORE_API_KEY"))?;

        let dimension = positive_var(
            &lookup,
            "EMBEDDING_DIMENSION",
            DEFAULT_EMBEDDING_DIMENSION,
        )?;
        let batch_size = positive_var(&lookup, "INGEST_BATCH_SIZE", DEFAULT_INGEST_BATCH_SIZE)?;
        let timeout_secs = positive_var(
            &lookup,
            "EMBEDDING_TIMEOUT_SECS",
            DEFAULT_EMBEDDING_TIMEOUT_SECS as usize,
        )? as u64;

        let embedding_url = lookup("EMBEDDING_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_EMBEDDING_URL.to_string());

        Ok(Self {
            vector_store: VectorStoreConfig { url, api_key },
            embedding: EmbeddingConfig {
                url: embedding_url,
                timeout_secs,
                dimension,
            },
            ingest: IngestConfig { batch_size },
        })
    }
}

fn positive_var<F>(lookup: &F, name: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };

    let value: usize = raw.parse().map_err(|_| ConfigError::InvalidVar {
        name,
        value: raw.clone(),
        reason: "not an integer".to_string(),
    })?;

    if value == 0 {
        return Err(ConfigError::InvalidVar {
            name,
            value: raw,
            reason: "must be a positive integer".to_string(),
        });
    }

    Ok(value)
}
