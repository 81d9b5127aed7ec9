use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::PromptloopConfig};

/// Standard config file name.
const CONFIG_FILENAME: &str = "promptloop.toml";

/// Load config from the given path.
pub fn load_config(path: &Path) -> anyhow::Result<PromptloopConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    let config = toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    Ok(config)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./promptloop.toml` (project-local)
/// 2. `~/.config/promptloop/promptloop.toml` (user-global)
///
/// Returns `PromptloopConfig::default()` if no config file is found, and falls
/// back to defaults (with a warning) when the file exists but fails to parse.
pub fn discover_and_load() -> PromptloopConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return apply_env_overrides(cfg),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    apply_env_overrides(PromptloopConfig::default())
}

/// Apply `PROMPTLOOP_*` env var overrides on top of a loaded config.
pub fn apply_env_overrides(mut config: PromptloopConfig) -> PromptloopConfig {
    if let Ok(bind) = std::env::var("PROMPTLOOP_BIND")
        && !bind.is_empty()
    {
        config.server.bind = bind;
    }
    if let Ok(port) = std::env::var("PROMPTLOOP_PORT")
        && let Ok(port) = port.parse()
    {
        config.server.port = port;
    }
    if let Ok(url) = std::env::var("PROMPTLOOP_CDP_URL")
        && !url.is_empty()
    {
        config.target.cdp_url = url;
    }
    if let Ok(dir) = std::env::var("PROMPTLOOP_DATA_DIR")
        && !dir.is_empty()
    {
        config.storage.data_dir = Some(PathBuf::from(dir));
    }
    config
}

/// Resolve the data directory: explicit config value, or the platform default
/// (`~/.local/share/promptloop` on Linux).
pub fn data_dir(config: &PromptloopConfig) -> PathBuf {
    if let Some(ref dir) = config.storage.data_dir {
        return dir.clone();
    }
    directories::ProjectDirs::from("", "", "promptloop")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".promptloop"))
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "promptloop") {
        let global = dirs.config_dir().join(CONFIG_FILENAME);
        if global.exists() {
            return Some(global);
        }
    }
    None
}
