use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const APP_NAME: &str = "kiseki";

/// User preferences persisted as `prefs.toml` in the platform config dir.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub theme_name: Option<String>,
  /// Site root: a base URL or a local directory.
  pub site: Option<String>,
  /// Use the fragments compiled into the binary instead of the site's `pages/`.
  #[serde(default)]
  pub builtin_pages: bool,
}

fn prefs_path() -> Option<PathBuf> {
  ProjectDirs::from("", "", APP_NAME).map(|d| d.config_dir().join("prefs.toml"))
}

impl Config {
  pub fn load() -> Self {
    prefs_path().map(|p| Self::load_from(&p)).unwrap_or_default()
  }

  pub fn load_from(path: &std::path::Path) -> Self {
    let Ok(content) = std::fs::read_to_string(path) else {
      return Self::default();
    };
    match toml::from_str(&content) {
      Ok(config) => config,
      Err(e) => {
        warn!(path = %path.display(), err = %e, "prefs: ignoring unreadable file");
        Self::default()
      }
    }
  }

  pub fn save(&self) {
    if let Some(path) = prefs_path() {
      self.save_to(&path);
    }
  }

  pub fn save_to(&self, path: &std::path::Path) {
    if let Some(dir) = path.parent()
      && std::fs::create_dir_all(dir).is_ok()
      && let Ok(content) = toml::to_string(self)
      && let Err(e) = std::fs::write(path, content)
    {
      warn!(path = %path.display(), err = %e, "prefs: save failed");
    }
  }
}
