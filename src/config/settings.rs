use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_email() -> String {
    "local@kaizen".to_string()
}
fn default_name() -> String {
    "Friend".to_string()
}
fn default_week_days() -> u32 {
    7
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Storage namespace. Not an account: anyone with the file can read it.
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default = "default_name")]
    pub name: String,
    /// Give a brand-new namespace two sample habits.
    #[serde(default = "default_true")]
    pub seed_examples: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            email: default_email(),
            name: default_name(),
            seed_examples: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Scans run once per wall-clock minute while the TUI or `remind --watch` is open.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub show_archived: bool,
    /// Days shown in the trend chart.
    #[serde(default = "default_week_days")]
    pub week_days: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_archived: false,
            week_days: default_week_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "kaizen")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("kaizen.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.profile.email, "local@kaizen");
        assert!(cfg.reminders.enabled);
        assert!(cfg.profile.seed_examples);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profile]\nemail = \"me@home.io\"\n\n[reminders]\nenabled = false\n")
            .unwrap();
        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.profile.email, "me@home.io");
        assert_eq!(cfg.profile.name, "Friend");
        assert!(!cfg.reminders.enabled);
        assert_eq!(cfg.display.week_days, 7);
    }

    #[test]
    fn save_then_load_in_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.display.show_archived = true;
        cfg.save_to(&path).unwrap();
        let back = AppConfig::load_from(&path).unwrap();
        assert!(back.display.show_archived);
    }

    #[test]
    fn rejects_broken_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profile\nemail = ").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
