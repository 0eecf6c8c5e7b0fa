use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The set of selectable models and their display labels.
///
/// `GET /models` returns a JSON object mapping model ids to human-readable
/// names. Each fetch produces an immutable snapshot: a refetch fully
/// replaces the previous directory, there are no merge semantics. When the
/// fetch fails the session installs [`ModelDirectory::fallback`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelDirectory {
    models: BTreeMap<String, String>,
}

impl ModelDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    /// The fixed two-entry directory used when the relay cannot be asked.
    ///
    /// These are also the models the original relay backend itself offers,
    /// so a fallback client remains usable against it.
    pub fn fallback() -> Self {
        let mut models = BTreeMap::new();
        models.insert("gpt-3.5-turbo".to_string(), "GPT-3.5 Turbo".to_string());
        models.insert("gpt-4o".to_string(), "GPT-4o".to_string());
        Self { models }
    }

    /// The display label for a model id, if the directory knows it.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.models.get(id).map(String::as_str)
    }

    /// The display label for a model id, falling back to the id itself.
    pub fn label_or_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.label(id).unwrap_or(id)
    }

    /// Whether the directory contains the given model id.
    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Iterate over `(id, label)` entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.models
            .iter()
            .map(|(id, label)| (id.as_str(), label.as_str()))
    }

    /// Number of models in the directory.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(String, String)> for ModelDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            models: iter.into_iter().collect(),
        }
    }
}
