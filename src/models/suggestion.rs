//! Autocomplete suggestion model

use serde::{Deserialize, Serialize};

/// A candidate place returned by the autocomplete provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Provider place id, used to resolve coordinates
    pub id: String,
    /// Human-readable place description
    pub description: String,
}

impl Suggestion {
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}
