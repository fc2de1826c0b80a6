use crate::rx::model::Language;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RxRemoteConfig {
    pub model: String,
    pub api_base: String,
    pub web_search: bool,
    /// 0 disables the client-side timeout; the call runs until the remote
    /// side answers or fails.
    pub request_timeout_secs: u64,
}

impl Default for RxRemoteConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            web_search: true,
            request_timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RxLocaleConfig {
    pub language: String,
}

impl Default for RxLocaleConfig {
    fn default() -> Self {
        Self {
            language: Language::detect().code().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RxConfig {
    pub remote: RxRemoteConfig,
    pub locale: RxLocaleConfig,
}

impl RxConfig {
    pub fn language(&self) -> Language {
        Language::parse(&self.locale.language).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialRxConfig {
    remote: Option<RxRemoteConfig>,
    locale: Option<RxLocaleConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => {
            let trimmed = v.trim();
            match trimmed {
                "1" | "true" | "TRUE" | "yes" | "on" => true,
                "0" | "false" | "FALSE" | "no" | "off" => false,
                _ => fallback,
            }
        }
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn validate(cfg: &RxConfig) -> Result<()> {
    if cfg.remote.model.trim().is_empty() {
        return Err(anyhow!("invalid remote model: cannot be empty"));
    }
    let base = cfg.remote.api_base.trim();
    if !(base.starts_with("https://") || base.starts_with("http://")) {
        return Err(anyhow!(
            "invalid remote api base `{base}`: must start with http:// or https://"
        ));
    }
    if Language::parse(&cfg.locale.language).is_none() {
        return Err(anyhow!(
            "invalid language `{}`: use `es` or `en`",
            cfg.locale.language
        ));
    }
    Ok(())
}

fn merge_file_config(base: &mut RxConfig, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: PartialRxConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse rxcheck config {}: {err}", path.display()))?;
    if let Some(remote) = parsed.remote {
        base.remote = remote;
    }
    if let Some(locale) = parsed.locale {
        base.locale = locale;
    }
    Ok(())
}

pub fn load_config(config_file: &Path) -> Result<RxConfig> {
    let mut cfg = RxConfig::default();
    merge_file_config(&mut cfg, config_file)?;

    cfg.remote.model = env_or_string("RXCHECK_MODEL", &cfg.remote.model);
    cfg.remote.api_base = env_or_string("RXCHECK_API_BASE", &cfg.remote.api_base);
    cfg.remote.web_search = env_or_bool("RXCHECK_WEB_SEARCH", cfg.remote.web_search);
    cfg.remote.request_timeout_secs = env_or_u64(
        "RXCHECK_REQUEST_TIMEOUT_SECS",
        cfg.remote.request_timeout_secs,
    );
    cfg.locale.language = env_or_string("RXCHECK_LANG", &cfg.locale.language);

    validate(&cfg)?;
    Ok(cfg)
}
