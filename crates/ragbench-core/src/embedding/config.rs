//! Configuration for embedding providers.
//!
//! Provider and device identifiers come from user input, so both parse
//! leniently: case and `-`/`_` separators are ignored for providers, and
//! unknown devices fall back to CUDA.

use super::backend::EmbeddingBackend;
use crate::error::EmbeddingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model served by the OpenAI embeddings endpoint.
pub const OPENAI_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// HuggingFace model behind [`EmbeddingProvider::KoSimCse`].
pub const KOSIMCSE_MODEL: &str = "BM-K/KoSimCSE-roberta-multitask";

/// HuggingFace model behind [`EmbeddingProvider::KoSrobertaMultitask`].
pub const KO_SROBERTA_MULTITASK_MODEL: &str = "jhgan/ko-sroberta-multitask";

/// Credential required by [`EmbeddingProvider::OpenAi`].
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Supported embedding providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EmbeddingProvider {
    /// OpenAI hosted embeddings
    OpenAi,
    /// KoSimCSE RoBERTa (HuggingFace)
    KoSimCse,
    /// Korean Sentence-RoBERTa multitask (HuggingFace)
    KoSrobertaMultitask,
}

impl EmbeddingProvider {
    /// Every supported provider.
    pub const ALL: [EmbeddingProvider; 3] = [
        EmbeddingProvider::OpenAi,
        EmbeddingProvider::KoSimCse,
        EmbeddingProvider::KoSrobertaMultitask,
    ];

    /// Canonical identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingProvider::OpenAi => "openai",
            EmbeddingProvider::KoSimCse => "kosimcse",
            EmbeddingProvider::KoSrobertaMultitask => "ko-sroberta-multitask",
        }
    }

    /// Every supported provider.
    pub fn all() -> impl Iterator<Item = EmbeddingProvider> {
        Self::ALL.into_iter()
    }
}

/// Lowercases and drops `-`, `_` and spaces.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for EmbeddingProvider {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        EmbeddingProvider::all()
            .find(|provider| normalize(provider.as_str()) == key)
            .ok_or_else(|| EmbeddingError::UnknownProvider(s.to_string()))
    }
}

impl TryFrom<String> for EmbeddingProvider {
    type Error = EmbeddingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EmbeddingProvider> for String {
    fn from(provider: EmbeddingProvider) -> Self {
        provider.as_str().to_string()
    }
}

impl fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute device for locally run models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Device {
    /// CPU
    Cpu,
    /// Apple Metal Performance Shaders
    Mps,
    /// NVIDIA CUDA
    #[default]
    Cuda,
}

impl Device {
    /// Parses a device name. Anything other than `cpu` or `mps` selects CUDA.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("cpu") {
            Device::Cpu
        } else if s.eq_ignore_ascii_case("mps") {
            Device::Mps
        } else {
            Device::Cuda
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Mps => "mps",
            Device::Cuda => "cuda",
        }
    }
}

impl From<&str> for Device {
    fn from(s: &str) -> Self {
        Device::parse(s)
    }
}

impl From<String> for Device {
    fn from(s: String) -> Self {
        Device::parse(&s)
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.as_str().to_string()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Embedding provider settings.
///
/// Credentials are plain fields; callers decide where they come from.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider to build
    pub provider: EmbeddingProvider,
    /// Device for locally run models
    #[serde(default)]
    pub device: Device,
    /// API key for the OpenAI provider
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<String>,
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("device", &self.device)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl EmbeddingConfig {
    /// Creates a configuration for `provider` on the default device.
    pub fn new(provider: EmbeddingProvider) -> Self {
        Self {
            provider,
            device: Device::default(),
            openai_api_key: None,
        }
    }

    /// Parses provider and device identifiers.
    pub fn from_names(provider: &str, device: &str) -> Result<Self, EmbeddingError> {
        Ok(Self::new(provider.parse()?).with_device(Device::parse(device)))
    }

    /// Sets the device.
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Sets the OpenAI API key.
    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Builds the backend description.
    ///
    /// Fails with [`EmbeddingError::MissingCredential`] when the OpenAI
    /// provider has no usable key.
    pub fn build(&self) -> Result<EmbeddingBackend, EmbeddingError> {
        match self.provider {
            EmbeddingProvider::OpenAi => {
                let api_key = self
                    .openai_api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .ok_or(EmbeddingError::MissingCredential(OPENAI_API_KEY))?;
                Ok(EmbeddingBackend::OpenAi {
                    api_key: api_key.to_string(),
                    model: OPENAI_EMBEDDING_MODEL.to_string(),
                })
            }
            EmbeddingProvider::KoSimCse => Ok(EmbeddingBackend::HuggingFace {
                model_name: KOSIMCSE_MODEL.to_string(),
                device: self.device,
            }),
            EmbeddingProvider::KoSrobertaMultitask => Ok(EmbeddingBackend::HuggingFace {
                model_name: KO_SROBERTA_MULTITASK_MODEL.to_string(),
                device: self.device,
            }),
        }
    }
}
