//! Core data types shared by the pipeline and the evaluation engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a retrieved or ground-truth passage.
///
/// Pipelines hand out either UUIDs or free-form strings. Metrics compare
/// identifiers by their string form, so a `Uuid` and a `Text` holding the
/// same hyphenated UUID refer to the same passage once normalized with
/// [`PassageId::to_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PassageId {
    /// UUID identifier
    Uuid(Uuid),
    /// Any other identifier
    Text(String),
}

impl PassageId {
    /// Returns the normalized string key used in solution and prediction maps.
    pub fn to_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PassageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassageId::Uuid(id) => write!(f, "{}", id.hyphenated()),
            PassageId::Text(id) => f.write_str(id),
        }
    }
}

impl From<Uuid> for PassageId {
    fn from(id: Uuid) -> Self {
        PassageId::Uuid(id)
    }
}

impl From<String> for PassageId {
    fn from(id: String) -> Self {
        PassageId::Text(id)
    }
}

impl From<&str> for PassageId {
    fn from(id: &str) -> Self {
        PassageId::Text(id.to_string())
    }
}

/// A passage returned by a pipeline as supporting evidence for an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Passage identifier
    pub id: PassageId,
    /// Passage text
    pub content: String,
}

impl Passage {
    /// Creates a new passage.
    pub fn new(id: impl Into<PassageId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_and_text_share_key() {
        let raw = Uuid::from_u128(42);
        let a = PassageId::from(raw);
        let b = PassageId::from(raw.to_string());
        assert_ne!(a, b);
        assert_eq!(a.to_key(), b.to_key());
    }

    #[test]
    fn test_deserialize_untagged() {
        let ids: Vec<PassageId> =
            serde_json::from_str(r#"["p1", "00000000-0000-0000-0000-00000000002a"]"#).unwrap();
        assert_eq!(ids[0], PassageId::Text("p1".to_string()));
        assert_eq!(ids[1], PassageId::Uuid(Uuid::from_u128(42)));
    }
}
