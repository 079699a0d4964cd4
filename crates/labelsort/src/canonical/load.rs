use serde::Deserialize;

use super::CanonicalList;

/// On-disk form: `labels = ["..", ..]`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCanonicalFile {
    pub labels: Vec<String>,
}

pub fn from_toml_str(s: &str) -> anyhow::Result<CanonicalList> {
    let raw: RawCanonicalFile = toml::from_str(s)?;
    CanonicalList::new(raw.labels)
}

pub fn load_from_file(path: &std::path::Path) -> anyhow::Result<CanonicalList> {
    let content = std::fs::read_to_string(path)?;
    from_toml_str(&content)
}
