use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{LinearError, Result};

/// Non-secret settings. Credentials live in the auth file, not here.
#[derive(Deserialize, Default)]
pub struct Config {
    pub default_team: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| LinearError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| LinearError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "linctl")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(LinearError::NoConfigDir)
    }

    /// Get team, preferring explicit argument over default
    pub fn resolve_team(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(String::from)
            .or_else(|| self.default_team.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_team_beats_default() {
        let config = Config {
            default_team: Some("OPS".to_string()),
        };
        assert_eq!(config.resolve_team(Some("ENG")), Some("ENG".to_string()));
    }

    #[test]
    fn default_team_used_when_no_explicit() {
        let config = Config {
            default_team: Some("OPS".to_string()),
        };
        assert_eq!(config.resolve_team(None), Some("OPS".to_string()));
    }

    #[test]
    fn no_team_resolves_to_none() {
        assert_eq!(Config::default().resolve_team(None), None);
    }
}
