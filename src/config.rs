use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cache::SqliteStore;
use crate::logging;

const DEFAULT_TARGET: &str = "http://dpsrescue.org/adopt/available/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Page holding the adoption listing
  pub target_url: String,
  /// Seconds to wait between the end of one check and the next fetch
  pub interval_secs: u64,
  /// Snapshot cache database (defaults to the user data directory)
  pub cache_path: Option<PathBuf>,
  /// Directory for log files (defaults to the user data directory)
  pub log_dir: Option<PathBuf>,
  pub color: ColorMode,
  pub fetch: FetchConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      target_url: DEFAULT_TARGET.to_string(),
      interval_secs: 120,
      cache_path: None,
      log_dir: None,
      color: ColorMode::default(),
      fetch: FetchConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
  /// Colour when stdout is a terminal
  #[default]
  Auto,
  Always,
  Never,
}

impl ColorMode {
  pub fn enabled(self) -> bool {
    match self {
      ColorMode::Auto => std::io::stdout().is_terminal(),
      ColorMode::Always => true,
      ColorMode::Never => false,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
  pub timeout_secs: u64,
  pub user_agent: String,
  /// Class of the `<div>` whose `<span>` children are the listed dogs
  pub container_class: String,
}

impl Default for FetchConfig {
  fn default() -> Self {
    Self {
      timeout_secs: 30,
      user_agent: concat!("doggo-watch/", env!("CARGO_PKG_VERSION")).to_string(),
      container_class: "dogs col-md-12".to_string(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./doggo-watch.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/doggo-watch/config.yaml
  ///
  /// Without any file the built-in defaults are used.
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
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("doggo-watch.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("doggo-watch").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Parsed target URL. Only http and https are accepted.
  pub fn target(&self) -> Result<Url> {
    let url = Url::parse(&self.target_url)
      .map_err(|e| eyre!("Invalid target URL {:?}: {}", self.target_url, e))?;
    match url.scheme() {
      "http" | "https" => Ok(url),
      scheme => Err(eyre!("Unsupported URL scheme {:?} in {}", scheme, url)),
    }
  }

  pub fn interval(&self) -> Result<Duration> {
    if self.interval_secs == 0 {
      return Err(eyre!("Poll interval must be at least 1 second"));
    }
    Ok(Duration::from_secs(self.interval_secs))
  }

  pub fn cache_path(&self) -> Result<PathBuf> {
    match &self.cache_path {
      Some(path) => Ok(path.clone()),
      None => SqliteStore::default_path().ok_or_else(|| eyre!("Could not determine data directory")),
    }
  }

  pub fn log_dir(&self) -> Result<PathBuf> {
    match &self.log_dir {
      Some(dir) => Ok(dir.clone()),
      None => logging::default_dir().ok_or_else(|| eyre!("Could not determine data directory")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_file_uses_defaults() {
    let config = Config::from_yaml("{}").unwrap();
    assert_eq!(config.target_url, DEFAULT_TARGET);
    assert_eq!(config.interval_secs, 120);
    assert_eq!(config.color, ColorMode::Auto);
    assert_eq!(config.fetch.container_class, "dogs col-md-12");
  }

  #[test]
  fn test_full_file() {
    let config = Config::from_yaml(
      r#"
target_url: https://example.org/dogs
interval_secs: 30
cache_path: /tmp/dogs.db
log_dir: /tmp/dog-logs
color: never
fetch:
  timeout_secs: 5
  container_class: listing
"#,
    )
    .unwrap();

    assert_eq!(config.target().unwrap().as_str(), "https://example.org/dogs");
    assert_eq!(config.interval().unwrap(), Duration::from_secs(30));
    assert_eq!(config.cache_path().unwrap(), PathBuf::from("/tmp/dogs.db"));
    assert_eq!(config.log_dir().unwrap(), PathBuf::from("/tmp/dog-logs"));
    assert_eq!(config.color, ColorMode::Never);
    assert_eq!(config.fetch.timeout_secs, 5);
    assert_eq!(config.fetch.container_class, "listing");
    assert!(config.fetch.user_agent.starts_with("doggo-watch/"));
  }

  #[test]
  fn test_unknown_color_rejected() {
    assert!(Config::from_yaml("color: rainbow").is_err());
  }

  #[test]
  fn test_zero_interval_rejected() {
    let config = Config {
      interval_secs: 0,
      ..Config::default()
    };
    assert!(config.interval().is_err());
  }

  #[test]
  fn test_non_http_target_rejected() {
    let config = Config {
      target_url: "file:///etc/passwd".to_string(),
      ..Config::default()
    };
    assert!(config.target().is_err());

    let config = Config {
      target_url: "not a url".to_string(),
      ..Config::default()
    };
    assert!(config.target().is_err());
  }

  #[test]
  fn test_color_mode_explicit() {
    assert!(ColorMode::Always.enabled());
    assert!(!ColorMode::Never.enabled());
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    assert!(Config::load(Some(Path::new("/definitely/not/here.yaml"))).is_err());
  }
}
