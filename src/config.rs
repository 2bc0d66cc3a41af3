//! Loading dashboard configuration (backend connection, badge policy, level table) from TOML.
//!
//! See `DashboardConfig` for expected schema. Environment variables override the
//! backend section so secrets never need to live in the file.

use serde::Deserialize;
use tracing::{error, info};

use crate::levels::{default_levels, Level};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct DashboardConfig {
  #[serde(default)]
  pub backend: BackendCfg,
  #[serde(default)]
  pub badges: BadgePolicy,
  #[serde(default)]
  pub levels: Vec<Level>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BackendCfg {
  /// Base URL of the hosted backend. Unset means "use the in-memory demo store".
  #[serde(default)] pub url: Option<String>,
  #[serde(default)] pub api_key: Option<String>,
  #[serde(default = "default_timeout_secs")] pub timeout_secs: u64,
  /// Rows requested per page for bulk selects. Keep it at or below the server's max rows.
  #[serde(default = "default_page_size")] pub page_size: usize,
}

impl Default for BackendCfg {
  fn default() -> Self {
    Self { url: None, api_key: None, timeout_secs: default_timeout_secs(), page_size: default_page_size() }
  }
}

fn default_timeout_secs() -> u64 { 10 }
fn default_page_size() -> usize { 1000 }

/// Knobs for badge evaluation.
#[derive(Clone, Debug, Deserialize)]
pub struct BadgePolicy {
  /// A path with no non-empty topics counts as completed for its tier.
  #[serde(default = "default_true")] pub vacuous_paths_complete: bool,
}

impl Default for BadgePolicy {
  fn default() -> Self {
    Self { vacuous_paths_complete: true }
  }
}

fn default_true() -> bool { true }

impl DashboardConfig {
  /// Load from DASHBOARD_CONFIG_PATH (if set), then apply BACKEND_URL / BACKEND_API_KEY.
  pub fn from_env() -> Self {
    let mut cfg = std::env::var("DASHBOARD_CONFIG_PATH")
      .ok()
      .and_then(|path| load_config_file(&path))
      .unwrap_or_default();

    if let Ok(url) = std::env::var("BACKEND_URL") {
      if !url.trim().is_empty() {
        cfg.backend.url = Some(url);
      }
    }
    if let Ok(key) = std::env::var("BACKEND_API_KEY") {
      cfg.backend.api_key = Some(key);
    }
    cfg
  }

  /// Configured level table, or the built-in one when the file has none.
  pub fn level_table(&self) -> Vec<Level> {
    if self.levels.is_empty() {
      return default_levels();
    }
    let mut levels = self.levels.clone();
    levels.sort_by_key(|l| l.threshold);
    levels
  }
}

/// Attempt to load `DashboardConfig` from a TOML file. On any parsing/IO error, returns None.
pub fn load_config_file(path: &str) -> Option<DashboardConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<DashboardConfig>(&s) {
      Ok(cfg) => {
        info!(target: "dashboard", %path, levels = cfg.levels.len(), "Loaded dashboard config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "dashboard", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "dashboard", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn parses_full_file() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(
      f,
      r#"
[backend]
url = "https://db.example.co"
timeout_secs = 3

[badges]
vacuous_paths_complete = false

[[levels]]
level = 2
name = "Two"
threshold = 50

[[levels]]
level = 1
name = "One"
threshold = 0
"#
    )
    .unwrap();

    let cfg = load_config_file(f.path().to_str().unwrap()).unwrap();
    assert_eq!(cfg.backend.url.as_deref(), Some("https://db.example.co"));
    assert_eq!(cfg.backend.timeout_secs, 3);
    assert!(!cfg.badges.vacuous_paths_complete);
    let table = cfg.level_table();
    assert_eq!(table[0].name, "One");
    assert_eq!(table[1].threshold, 50);
  }

  #[test]
  fn empty_file_gives_defaults() {
    let f = tempfile::NamedTempFile::new().unwrap();
    let cfg = load_config_file(f.path().to_str().unwrap()).unwrap();
    assert!(cfg.backend.url.is_none());
    assert_eq!(cfg.backend.timeout_secs, 10);
    assert!(cfg.badges.vacuous_paths_complete);
    assert_eq!(cfg.level_table(), default_levels());
  }

  #[test]
  fn broken_or_missing_files_are_none() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "[backend\nurl = ").unwrap();
    assert!(load_config_file(f.path().to_str().unwrap()).is_none());
    assert!(load_config_file("/definitely/not/here.toml").is_none());
  }
}
