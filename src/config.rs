use crate::model::{SortDirection, SortKey, ViewMode};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveTime;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".routines";
const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_STORAGE_KEY: &str = "routines";

const SUPPORTED_KEYS: &str = "db_path|db.path, storage_key|storage.key, report_dir|report.dir, seed_examples|storage.seed_examples, strict_validation|validation.strict, default_sort|view.sort, default_direction|view.direction, default_view|view.mode";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: PathBuf,
    pub storage_key: String,
    pub report_dir: PathBuf,
    pub seed_examples: bool,
    pub strict_validation: bool,
    pub default_sort: SortKey,
    pub default_direction: SortDirection,
    pub default_view: ViewMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_root_dir().join("db").join("routines.db"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            report_dir: default_report_dir(),
            seed_examples: true,
            strict_validation: true,
            default_sort: SortKey::default(),
            default_direction: SortDirection::default(),
            default_view: ViewMode::default(),
        }
    }
}

impl Config {
    pub fn config_path() -> PathBuf {
        default_root_dir().join(CONFIG_FILE)
    }

    /// Reads the config file, writing the defaults first when it does not
    /// exist yet.
    pub fn load_or_init() -> Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        let config = Self::default();
        config.save_to(&config_path)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        set_mode_600(config_path)?;

        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_config_key(key) {
            "db_path" => {
                self.db_path = expand_home(value.trim());
            }
            "storage_key" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    bail!("storage_key must not be empty");
                }
                self.storage_key = trimmed.to_string();
            }
            "report_dir" => {
                self.report_dir = expand_home(value.trim());
            }
            "seed_examples" => {
                self.seed_examples = value
                    .parse::<bool>()
                    .map_err(|_| anyhow!("seed_examples must be true/false"))?;
            }
            "strict_validation" => {
                self.strict_validation = value
                    .parse::<bool>()
                    .map_err(|_| anyhow!("strict_validation must be true/false"))?;
            }
            "default_sort" => {
                self.default_sort = value.parse::<SortKey>()?;
            }
            "default_direction" => {
                self.default_direction = value.parse::<SortDirection>()?;
            }
            "default_view" => {
                self.default_view = value.parse::<ViewMode>()?;
            }
            _ => {
                bail!("Unsupported config key: {key}. Supported keys: {SUPPORTED_KEYS}");
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_config_key(key) {
            "db_path" => Some(self.db_path.display().to_string()),
            "storage_key" => Some(self.storage_key.clone()),
            "report_dir" => Some(self.report_dir.display().to_string()),
            "seed_examples" => Some(self.seed_examples.to_string()),
            "strict_validation" => Some(self.strict_validation.to_string()),
            "default_sort" => Some(self.default_sort.to_string()),
            "default_direction" => Some(self.default_direction.to_string()),
            "default_view" => Some(self.default_view.to_string()),
            _ => None,
        }
    }
}

fn normalize_config_key(key: &str) -> &str {
    match key {
        "db_path" | "db.path" => "db_path",
        "storage_key" | "storage.key" => "storage_key",
        "report_dir" | "report.dir" => "report_dir",
        "seed_examples" | "storage.seed_examples" => "seed_examples",
        "strict_validation" | "validation.strict" => "strict_validation",
        "default_sort" | "view.sort" => "default_sort",
        "default_direction" | "view.direction" => "default_direction",
        "default_view" | "view.mode" => "default_view",
        _ => key,
    }
}

pub fn parse_hhmm(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("Invalid time format: {value}. Example: 06:30 (24-hour format)"))
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

pub fn default_report_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("Routines")
        .join("reports")
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn set_mode_600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set file permissions: {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn dotted_aliases_resolve_to_fields() {
        let mut config = Config::default();

        config.set_value("storage.key", "mine").expect("storage key");
        config
            .set_value("validation.strict", "false")
            .expect("strict flag");
        config.set_value("view.sort", "progress").expect("sort");

        assert_eq!(config.get_value("storage_key").as_deref(), Some("mine"));
        assert!(!config.strict_validation);
        assert_eq!(config.default_sort, SortKey::Progress);
        assert_eq!(config.get_value("view.direction").as_deref(), Some("asc"));
    }

    #[test]
    fn unknown_and_invalid_values_are_rejected() {
        let mut config = Config::default();

        let unknown = config
            .set_value("polling_seconds", "5")
            .expect_err("unknown key");
        assert!(unknown.to_string().contains("Supported keys"));

        assert!(config.set_value("seed_examples", "maybe").is_err());
        assert!(config.set_value("storage_key", "  ").is_err());
        assert!(config.set_value("view.mode", "grid").is_err());
        assert_eq!(config.get_value("nope"), None);
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"storage_key":"legacy","default_view":"list"}"#).expect("write");

        let config = Config::load_from(&path).expect("load");

        assert_eq!(config.storage_key, "legacy");
        assert_eq!(config.default_view, ViewMode::List);
        assert!(config.seed_examples);
        assert!(config.strict_validation);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.set_value("default_direction", "desc").expect("direction");

        config.save_to(&path).expect("save");
        let loaded = Config::load_from(&path).expect("load");

        assert_eq!(loaded.default_direction, SortDirection::Desc);
        assert_eq!(loaded.db_path, config.db_path);
    }

    #[test]
    fn parse_hhmm_accepts_24_hour_times() {
        assert!(parse_hhmm("23:59").is_ok());
        assert!(parse_hhmm("24:00").is_err());
        assert!(parse_hhmm("7pm").is_err());
    }
}
