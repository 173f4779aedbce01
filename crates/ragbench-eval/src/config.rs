//! Configuration and path resolution for the evaluator.
//!
//! Everything read from the environment is read here, so the library only
//! ever sees explicit values:
//! - Dataset path: `--dataset` or `$RAGBENCH_DATASET`
//! - OpenAI credential: `$OPENAI_API_KEY`

use anyhow::{anyhow, Result};
use ragbench_core::embedding::{EmbeddingBackend, EmbeddingConfig, EmbeddingProvider};
use std::path::PathBuf;

/// Environment variable for the dataset path
const DATASET_ENV: &str = "RAGBENCH_DATASET";

/// Environment variable holding the OpenAI API key
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Finds the dataset file to evaluate.
///
/// Search order:
/// 1. `--dataset` argument
/// 2. `$RAGBENCH_DATASET` environment variable
pub fn dataset_path(cli_path: Option<&PathBuf>) -> Result<PathBuf> {
    resolve_dataset_path(cli_path, std::env::var(DATASET_ENV).ok())
}

fn resolve_dataset_path(cli_path: Option<&PathBuf>, env_path: Option<String>) -> Result<PathBuf> {
    let path = cli_path
        .cloned()
        .or_else(|| env_path.filter(|p| !p.is_empty()).map(PathBuf::from))
        .ok_or_else(|| anyhow!("No dataset given. Pass --dataset or set ${}.", DATASET_ENV))?;

    if !path.exists() {
        return Err(anyhow!("Dataset file not found: {}", path.display()));
    }
    Ok(path)
}

/// Builds the embedding backend for `provider` on `device`.
///
/// The OpenAI key is read from `$OPENAI_API_KEY` only when the OpenAI
/// provider is selected.
pub fn embedding_backend(provider: &str, device: &str) -> Result<EmbeddingBackend> {
    let config = EmbeddingConfig::from_names(provider, device)?;
    let api_key = match config.provider {
        EmbeddingProvider::OpenAi => std::env::var(OPENAI_API_KEY_ENV).ok(),
        EmbeddingProvider::KoSimCse | EmbeddingProvider::KoSrobertaMultitask => None,
    };
    build_backend(config, api_key)
}

fn build_backend(config: EmbeddingConfig, api_key: Option<String>) -> Result<EmbeddingBackend> {
    let config = match api_key {
        Some(key) => config.with_openai_api_key(key),
        None => config,
    };
    Ok(config.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragbench_core::embedding::Device;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_path_wins_over_env() {
        let file = NamedTempFile::new().unwrap();
        let cli = file.path().to_path_buf();
        let path = resolve_dataset_path(Some(&cli), Some("/nonexistent".to_string())).unwrap();
        assert_eq!(path, cli);
    }

    #[test]
    fn test_env_path_used_without_cli() {
        let file = NamedTempFile::new().unwrap();
        let env = file.path().to_string_lossy().into_owned();
        let path = resolve_dataset_path(None, Some(env.clone())).unwrap();
        assert_eq!(path, PathBuf::from(env));
    }

    #[test]
    fn test_missing_dataset() {
        assert!(resolve_dataset_path(None, None).is_err());
        assert!(resolve_dataset_path(None, Some(String::new())).is_err());

        let missing = PathBuf::from("/nonexistent/ragbench/bench.json");
        let err = resolve_dataset_path(Some(&missing), None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_build_backend() {
        let openai = EmbeddingConfig::from_names("openai", "cpu").unwrap();
        assert!(build_backend(openai.clone(), None).is_err());
        let backend = build_backend(openai, Some("sk-test".to_string())).unwrap();
        assert_eq!(backend.model_name(), "text-embedding-ada-002");

        let local = EmbeddingConfig::from_names("kosimcse", "mps").unwrap();
        let backend = build_backend(local, None).unwrap();
        assert_eq!(backend.device(), Some(Device::Mps));
    }

    #[test]
    fn test_unknown_provider() {
        let err = embedding_backend("fasttext", "cpu").unwrap_err();
        assert!(err.to_string().contains("fasttext"));
    }
}
