//! Canonical label list: the fixed target order the resolver restores.

pub mod default;
pub mod load;

pub use load::*;

use std::collections::HashMap;

use crate::normalize::normalize;

/// Ordered, distinct reference labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalList {
    labels: Vec<String>,
}

impl CanonicalList {
    /// Build a list, rejecting empty lists and labels that collide after
    /// normalization.
    pub fn new(labels: Vec<String>) -> anyhow::Result<Self> {
        if labels.is_empty() {
            anyhow::bail!("canonical list is empty");
        }
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (i, label) in labels.iter().enumerate() {
            let key = normalize(label);
            if key.is_empty() {
                anyhow::bail!("canonical label #{} '{}' has no letters or digits", i, label);
            }
            if let Some(prev) = seen.insert(key, i) {
                anyhow::bail!(
                    "canonical labels #{} '{}' and #{} '{}' are identical after normalization",
                    prev,
                    labels[prev],
                    i,
                    label
                );
            }
        }
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for CanonicalList {
    fn default() -> Self {
        Self {
            labels: default::owasp_llm_top10(),
        }
    }
}
