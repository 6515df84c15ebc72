use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default skein data directory: ~/.skein
pub fn get_skein_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".skein"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.skein/config.toml (highest)
    let skein_dir = get_skein_data_dir()?;
    let user_config = skein_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg: AppConfig = if user_config.exists() {
        let s = std::fs::read_to_string(&user_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    // Environment variable overrides (Priority 0: highest)
    if let Ok(v) = std::env::var("SKEIN_PLACEHOLDER") {
        if !v.trim().is_empty() {
            cfg.placeholder = v;
        }
    }
    if let Ok(v) = std::env::var("SKEIN_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.logging.level = v;
        }
    }
    if let Ok(v) = std::env::var("SKEIN_WORKERS") {
        if let Ok(n) = v.trim().parse::<usize>() {
            if n > 0 {
                cfg.scheduler.workers = n;
            }
        }
    }

    Ok(cfg)
}
