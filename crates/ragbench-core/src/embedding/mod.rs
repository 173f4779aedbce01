//! Embedding provider selection.
//!
//! Maps a provider identifier and device name to a description of the
//! embedding client to construct. No embeddings are computed here.
//!
//! ## Example
//!
//! ```
//! use ragbench_core::embedding::{Device, EmbeddingConfig};
//!
//! let backend = EmbeddingConfig::from_names("KoSimCSE", "cpu")
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! assert_eq!(backend.model_name(), "BM-K/KoSimCSE-roberta-multitask");
//! assert_eq!(backend.device(), Some(Device::Cpu));
//! ```

pub mod backend;
pub mod config;

pub use backend::EmbeddingBackend;
pub use config::{Device, EmbeddingConfig, EmbeddingProvider};
