pub mod types;

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".syncable.toml";

/// Get the global config file path (~/.syncable.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (project/.syncable.toml)
pub fn local_config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_FILE_NAME)
}

/// Load configuration from file or use defaults
/// Checks local config first, then global config
pub fn load_config(project_path: Option<&Path>) -> Result<types::Config> {
    // Try local config first
    if let Some(path) = project_path {
        let local = local_config_path(path);
        if local.exists() {
            if let Ok(content) = fs::read_to_string(&local) {
                if let Ok(config) = toml::from_str(&content) {
                    return Ok(config);
                }
            }
        }
    }

    // Try global config
    if let Some(global) = global_config_path() {
        if global.exists() {
            if let Ok(content) = fs::read_to_string(&global) {
                if let Ok(config) = toml::from_str(&content) {
                    return Ok(config);
                }
            }
        }
    }

    Ok(types::Config::default())
}

/// Save configuration to global config file
pub fn save_global_config(config: &types::Config) -> Result<()> {
    if let Some(path) = global_config_path() {
        let content = toml::to_string_pretty(config)?;
        fs::write(&path, content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_file_present() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(Some(dir.path())).unwrap();
        assert_eq!(cfg.server.max_generation_attempts, 3);
    }

    #[test]
    fn local_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = types::Config::default();
        cfg.server.max_generation_attempts = 5;
        let path = local_config_path(dir.path());
        fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();

        let loaded = load_config(Some(dir.path())).unwrap();
        assert_eq!(loaded.server.max_generation_attempts, 5);
    }
}
