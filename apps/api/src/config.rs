use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Default encoder: the local pretrained MiniLM model.
pub const DEFAULT_EMBEDDING_BACKEND: &str = "fastembed";

/// Which encoder backs the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// all-MiniLM-L6-v2 run locally; model files cached under `MODELS_DIR`.
    FastEmbed,
    /// Offline feature hashing fallback; no model download, no synonyms.
    Hashing,
    /// OpenAI-compatible `/embeddings` endpoint.
    Remote {
        api_url: String,
        api_key: String,
        model: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if a remote backend is selected without its settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub embedding_backend: EmbeddingBackend,
    /// Hashing and remote backends only; MiniLM is fixed at 384.
    pub embedding_dimensions: usize,
    pub force_refresh: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let embedding_backend = parse_backend(
            &env_or("EMBEDDING_BACKEND", DEFAULT_EMBEDDING_BACKEND),
            require_env,
        )?;

        Ok(Config {
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            models_dir: PathBuf::from(env_or("MODELS_DIR", "models")),
            embedding_backend,
            embedding_dimensions: env_or("EMBEDDING_DIMENSIONS", "384")
                .parse::<usize>()
                .context("EMBEDDING_DIMENSIONS must be a positive integer")?,
            force_refresh: parse_bool(&env_or("FORCE_REFRESH", "false"))
                .context("FORCE_REFRESH must be true or false")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn parse_backend(name: &str, require: impl Fn(&str) -> Result<String>) -> Result<EmbeddingBackend> {
    Ok(match name.trim().to_lowercase().as_str() {
        "fastembed" | "minilm" => EmbeddingBackend::FastEmbed,
        "hashing" => EmbeddingBackend::Hashing,
        "remote" => EmbeddingBackend::Remote {
            api_url: require("EMBEDDING_API_URL")?,
            api_key: require("EMBEDDING_API_KEY")?,
            model: require("EMBEDDING_MODEL")?,
        },
        other => bail!("EMBEDDING_BACKEND must be 'fastembed', 'hashing' or 'remote', got '{other}'"),
    })
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("not a boolean: '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(key: &str) -> Result<String> {
        bail!("{key} is not set")
    }

    #[test]
    fn test_default_backend_is_pretrained_model() {
        let backend = parse_backend(DEFAULT_EMBEDDING_BACKEND, no_env).unwrap();
        assert_eq!(backend, EmbeddingBackend::FastEmbed);
    }

    #[test]
    fn test_parse_backend_names() {
        assert_eq!(parse_backend(" Hashing ", no_env).unwrap(), EmbeddingBackend::Hashing);
        assert_eq!(parse_backend("minilm", no_env).unwrap(), EmbeddingBackend::FastEmbed);
        assert!(parse_backend("word2vec", no_env).is_err());
    }

    #[test]
    fn test_remote_backend_requires_settings() {
        assert!(parse_backend("remote", no_env).is_err());
        let backend = parse_backend("remote", |key| Ok(format!("{key}-value"))).unwrap();
        assert_eq!(
            backend,
            EmbeddingBackend::Remote {
                api_url: "EMBEDDING_API_URL-value".to_string(),
                api_key: "EMBEDDING_API_KEY-value".to_string(),
                model: "EMBEDDING_MODEL-value".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool(" 1 ").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(!parse_bool("").unwrap());
        assert!(parse_bool("maybe").is_err());
    }
}
