use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RxPaths {
    pub rx_home: PathBuf,
    pub credential_file: PathBuf,
    pub history_file: PathBuf,
    pub logs_dir: PathBuf,
    pub config_file: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<RxPaths> {
    let rx_home = match env::var("RXCHECK_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join(".rxcheck"),
    };

    let credential_file = env_or_default_path("RXCHECK_CREDENTIAL_FILE", rx_home.join("credential"));
    let history_file = env_or_default_path(
        "RXCHECK_HISTORY_FILE",
        rx_home.join("state").join("history.json"),
    );
    let logs_dir = env_or_default_path("RXCHECK_LOGS_DIR", rx_home.join("logs"));
    let config_file = env_or_default_path("RXCHECK_CONFIG_PATH", rx_home.join("config.toml"));

    Ok(RxPaths {
        rx_home,
        credential_file,
        history_file,
        logs_dir,
        config_file,
    })
}
