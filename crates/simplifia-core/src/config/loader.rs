//! Config loader — reads `~/.simplifia/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.simplifia/config.json`
//! 3. Plain environment variables (`OPENAI_API_KEY`, `PORT`, …)
//! 4. Prefixed environment variables `SIMPLIFIA_<SECTION>__<FIELD>`

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Provider sections that accept env overrides.
pub const PROVIDER_NAMES: &[&str] = &["openai", "gemini", "deepseek"];

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path (or `path`) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply process environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_with(config, |key| std::env::var(key).ok())
}

/// Apply overrides read through `lookup`.
///
/// Supported variables:
/// - `OPENAI_API_KEY`, `GEMINI_API_KEY`, `DEEPSEEK_API_KEY`
/// - `HOST`, `PORT`
/// - `SIMPLIFIA_PROVIDERS__<NAME>__API_KEY` / `__API_BASE` / `__MODEL`
/// - `SIMPLIFIA_SERVER__HOST`, `SIMPLIFIA_SERVER__PORT`
///
/// Empty values are ignored. Unparseable ports are ignored with a warning.
pub fn apply_overrides_with<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    for name in PROVIDER_NAMES {
        let upper = name.to_uppercase();
        if let Some(provider) = config.providers.get_by_name_mut(name) {
            if let Some(val) = get(&format!("{upper}_API_KEY")) {
                provider.api_key = val;
            }
            apply_provider_env(provider, &upper, &get);
        }
    }

    if let Some(val) = get("HOST") {
        config.server.host = val;
    }
    if let Some(val) = get("SIMPLIFIA_SERVER__HOST") {
        config.server.host = val;
    }
    for key in ["PORT", "SIMPLIFIA_SERVER__PORT"] {
        if let Some(val) = get(key) {
            match val.trim().parse::<u16>() {
                Ok(p) => config.server.port = p,
                Err(_) => warn!(var = key, value = %val, "Ignoring invalid port"),
            }
        }
    }

    config
}

/// Apply prefixed env var overrides for a single provider.
fn apply_provider_env<G>(provider: &mut ProviderConfig, name: &str, get: &G)
where
    G: Fn(&str) -> Option<String>,
{
    if let Some(val) = get(&format!("SIMPLIFIA_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Some(val) = get(&format!("SIMPLIFIA_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if let Some(val) = get(&format!("SIMPLIFIA_PROVIDERS__{name}__MODEL")) {
        provider.model = Some(val);
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
