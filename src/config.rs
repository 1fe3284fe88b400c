use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Project shown on the home dashboard and opened by `:board`
  pub default_project: Option<u64>,
  /// Custom title for the header (defaults to the API host if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the project-management API, e.g. http://localhost:8000
  pub base_url: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./taskdeck.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/taskdeck/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/taskdeck/config.yaml\n\
                 with at least:\n  api:\n    base_url: http://localhost:8000"
      )),
    }
  }

  /// Minimal configuration built from CLI flags alone, for running without
  /// a config file.
  pub fn from_base_url(base_url: String) -> Self {
    Self {
      api: ApiConfig { base_url },
      default_project: None,
      title: None,
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("taskdeck.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("taskdeck").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full_config() {
    let yaml = "api:\n  base_url: http://localhost:8000\ndefault_project: 3\ntitle: Acme Workspace\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.default_project, Some(3));
    assert_eq!(config.title.as_deref(), Some("Acme Workspace"));
  }

  #[test]
  fn test_parse_minimal_config() {
    let yaml = "api:\n  base_url: https://pm.example.com/api\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert!(config.default_project.is_none());
    assert!(config.title.is_none());
  }
}
