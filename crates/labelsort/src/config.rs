use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    pub logging: Option<LoggingCfg>,
    pub challenge: Option<ChallengeCfg>,
    pub matching: Option<MatchingCfg>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingCfg {
    pub to_file: Option<bool>,
    pub dir: Option<String>,
    pub json: Option<bool>,
    pub compact: Option<bool>,
    pub pretty: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChallengeCfg {
    pub fetch_url: Option<String>,
    pub submit_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub dry_run: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MatchingCfg {
    pub threshold: Option<f64>,
    pub metric: Option<String>, // gestalt | levenshtein | jaro-winkler | sorensen-dice
    pub canonical_file: Option<String>,
}

pub fn load_user_config(home: &Path) -> anyhow::Result<Option<UserConfig>> {
    let path = home.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)?;
    let cfg: UserConfig = toml::from_str(&s)?;
    Ok(Some(cfg))
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// Validate an approximate-tier threshold.
pub fn parse_threshold(raw: &str) -> anyhow::Result<f64> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid threshold '{}': {}", raw, e))?;
    check_threshold(v)
}

pub fn check_threshold(v: f64) -> anyhow::Result<f64> {
    if !(0.0..=1.0).contains(&v) {
        anyhow::bail!("threshold {} outside [0, 1]", v);
    }
    Ok(v)
}
