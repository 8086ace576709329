use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PivotError, Result};
use crate::filter::RowFilter;
use crate::reports::{PivotConfig, DEFAULT_NET_DIVISOR};

pub const CONFIG_ENV: &str = "SALESPIVOT_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    #[serde(default)]
    pub filter: RowFilter,
    #[serde(default = "default_net_divisor")]
    pub net_divisor: f64,
}

fn default_export_dir() -> String {
    home_dir()
        .join("Documents")
        .join("salespivot")
        .join("exports")
        .to_string_lossy()
        .to_string()
}

fn default_net_divisor() -> f64 {
    DEFAULT_NET_DIVISOR
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
            filter: RowFilter::default(),
            net_divisor: default_net_divisor(),
        }
    }
}

impl Settings {
    pub fn pivot_config(&self) -> PivotConfig {
        PivotConfig {
            filter: self.filter.clone(),
            net_divisor: self.net_divisor,
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub fn settings_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    home_dir()
        .join(".config")
        .join("salespivot")
        .join("settings.json")
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings() -> Settings {
    load_from(&settings_path())
}

fn load_from(path: &Path) -> Settings {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("ignoring {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<PathBuf> {
    let path = settings_path();
    save_to(settings, &path)?;
    Ok(path)
}

fn save_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PivotError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn export_dir() -> PathBuf {
    PathBuf::from(&load_settings().export_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            export_dir: "/tmp/exports".to_string(),
            filter: RowFilter {
                excluded_status: "Anulado".to_string(),
                allowed_groups: vec!["CORPORATIVO".to_string()],
            },
            net_divisor: 1.0,
        };
        save_to(&settings, &path).unwrap();
        assert!(path.exists());
        assert_eq!(load_from(&path), settings);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_from(&dir.path().join("settings.json")), Settings::default());
    }

    #[test]
    fn test_corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_from(&path), Settings::default());
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.filter.excluded_status, "Cerrado");
        assert_eq!(s.filter.allowed_groups.len(), 4);
        assert_eq!(s.net_divisor, 1.18);
        assert!(s.export_dir.ends_with("exports"));
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let json = r#"{"filter": {"allowed_groups": ["MAYORISTAS A"]}}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.filter.allowed_groups, vec!["MAYORISTAS A"]);
        assert_eq!(s.filter.excluded_status, "Cerrado");
        assert_eq!(s.net_divisor, 1.18);
    }

    #[test]
    fn test_pivot_config_carries_rules() {
        let mut s = Settings::default();
        s.net_divisor = 1.1;
        s.filter.excluded_status = "Anulado".to_string();
        let config = s.pivot_config();
        assert_eq!(config.net_divisor, 1.1);
        assert_eq!(config.filter.excluded_status, "Anulado");
    }
}
