use crate::overlay::{SearchColumns, SearchSettings};
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub search: SearchConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
  /// Milliseconds of quiet typing before a search is applied (0 = immediate)
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
  /// Columns searched: `visible`, `default_field` or `fields: [...]`
  #[serde(default, with = "serde_yaml::with::singleton_map")]
  pub columns: SearchColumns,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      debounce_ms: default_debounce_ms(),
      columns: SearchColumns::default(),
    }
  }
}

impl SearchConfig {
  pub fn settings(&self) -> SearchSettings {
    SearchSettings {
      debounce: Duration::from_millis(self.debounce_ms),
      columns: self.columns.clone(),
    }
  }
}

fn default_debounce_ms() -> u64 {
  150
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Default level filter; `X2M_LOG` overrides it
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Directory for log files (defaults to the user data directory)
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      dir: None,
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./x2m.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/x2m/config.yaml
  ///
  /// Without a file every setting takes its default.
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
    let local = PathBuf::from("x2m.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("x2m").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file is a valid, all-defaults config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Directory log files are written to
  pub fn log_dir(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.log.dir {
      return Ok(dir.clone());
    }
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;
    Ok(data_dir.join("x2m").join("logs"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.search.debounce_ms, 150);
    assert_eq!(config.search.columns, SearchColumns::Visible);
    assert_eq!(config.log.level, "info");
    assert_eq!(
      config.search.settings().debounce,
      Duration::from_millis(150)
    );
  }

  #[test]
  fn test_parse_full() {
    let config = Config::parse(
      "search:\n  debounce_ms: 0\n  columns:\n    fields: [name, ref]\nlog:\n  level: debug\n  dir: /tmp/x2m\n",
    )
    .unwrap();
    assert!(config.search.settings().debounce.is_zero());
    assert_eq!(
      config.search.columns,
      SearchColumns::Fields(vec!["name".into(), "ref".into()])
    );
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.log_dir().unwrap(), PathBuf::from("/tmp/x2m"));
  }

  #[test]
  fn test_partial_search_section() {
    let config = Config::parse("search:\n  columns: default_field\n").unwrap();
    assert_eq!(config.search.debounce_ms, 150);
    assert_eq!(config.search.columns, SearchColumns::DefaultField);
  }

  #[test]
  fn test_explicit_columns_flow_map() {
    let config = Config::parse("search:\n  columns: { fields: [email] }\n").unwrap();
    assert_eq!(config.search.columns, SearchColumns::Fields(vec!["email".into()]));
  }

  #[test]
  fn test_example_config_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("x2m.example.yaml");
    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.search.debounce_ms, 150);
    assert_eq!(config.search.columns, SearchColumns::Visible);
  }

  #[test]
  fn test_invalid_yaml() {
    assert!(Config::parse("search: [").is_err());
  }

  #[test]
  fn test_missing_explicit_path() {
    assert!(Config::load(Some(Path::new("/nonexistent/x2m.yaml"))).is_err());
  }
}
