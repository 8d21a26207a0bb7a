use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Departments shown on the modality view when none are configured.
pub const DEFAULT_DEPARTMENTS: [&str; 5] = ["aod", "ctd", "msk", "nr", "nuk"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub port: u16,
    pub database_url: String,
    pub static_dir: String,
    /// Departments that get a card on every modality view, in display order.
    pub departments: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: wardlight_core::db_path::get_database_url(),
            static_dir: "static".to_string(),
            departments: DEFAULT_DEPARTMENTS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl WebConfig {
    /// Defaults, overlaid by an optional TOML file, overlaid by the environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read configuration file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("could not parse configuration file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply overrides from `lookup`, normally the process environment
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("WARDLIGHT_PORT").or_else(|| lookup("PORT")) {
            self.port = port
                .parse()
                .with_context(|| format!("invalid port '{}'", port))?;
        }

        if let Some(database_url) =
            lookup("WARDLIGHT_DATABASE_URL").or_else(|| lookup("DATABASE_URL"))
        {
            self.database_url = database_url;
        }

        if let Some(static_dir) = lookup("WARDLIGHT_STATIC_DIR") {
            self.static_dir = static_dir;
        }

        if let Some(departments) = lookup("WARDLIGHT_DEPARTMENTS") {
            self.departments = departments
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(())
    }

    /// Filesystem path of the SQLite database named by `database_url`
    pub fn database_path(&self) -> PathBuf {
        let path = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))
            .unwrap_or(&self.database_url);
        PathBuf::from(path.split('?').next().unwrap_or(path))
    }
}
