//! Embedding client descriptions.

use super::config::Device;
use std::fmt;

/// The embedding client a configuration resolves to.
///
/// This describes which client to construct; it performs no inference.
#[derive(Clone, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// OpenAI embeddings endpoint
    OpenAi {
        /// API key sent with every request
        api_key: String,
        /// Embedding model name
        model: String,
    },
    /// Locally run HuggingFace sentence-transformer
    HuggingFace {
        /// HuggingFace Hub model identifier
        model_name: String,
        /// Device the model runs on
        device: Device,
    },
}

impl EmbeddingBackend {
    /// Model identifier.
    pub fn model_name(&self) -> &str {
        match self {
            EmbeddingBackend::OpenAi { model, .. } => model,
            EmbeddingBackend::HuggingFace { model_name, .. } => model_name,
        }
    }

    /// Device for local models; `None` for hosted ones.
    pub fn device(&self) -> Option<Device> {
        match self {
            EmbeddingBackend::OpenAi { .. } => None,
            EmbeddingBackend::HuggingFace { device, .. } => Some(*device),
        }
    }
}

impl fmt::Debug for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingBackend::OpenAi { model, .. } => f
                .debug_struct("OpenAi")
                .field("api_key", &"<redacted>")
                .field("model", model)
                .finish(),
            EmbeddingBackend::HuggingFace { model_name, device } => f
                .debug_struct("HuggingFace")
                .field("model_name", model_name)
                .field("device", device)
                .finish(),
        }
    }
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingBackend::OpenAi { model, .. } => write!(f, "OpenAI {}", model),
            EmbeddingBackend::HuggingFace { model_name, device } => {
                write!(f, "HuggingFace {} on {}", model_name, device)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let hosted = EmbeddingBackend::OpenAi {
            api_key: "sk-test".to_string(),
            model: "text-embedding-ada-002".to_string(),
        };
        assert_eq!(hosted.to_string(), "OpenAI text-embedding-ada-002");
        assert!(!format!("{:?}", hosted).contains("sk-test"));

        let local = EmbeddingBackend::HuggingFace {
            model_name: "jhgan/ko-sroberta-multitask".to_string(),
            device: Device::Mps,
        };
        assert_eq!(local.to_string(), "HuggingFace jhgan/ko-sroberta-multitask on mps");
        assert_eq!(local.device(), Some(Device::Mps));
    }
}
