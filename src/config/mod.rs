//! Release configuration
//!
//! One JSON file describes a release run: the portal to talk to, the groups
//! to share into, and the list of promotion units. The password is never in
//! the file; it comes from the `PORTAL_PASSWORD` environment variable.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::promotion::PromotionUnit;
use crate::session::PortalSession;

pub const PASSWORD_ENV: &str = "PORTAL_PASSWORD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("password not set; export {PASSWORD_ENV}")]
    MissingPassword,
}

/// The full release configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub portal_url: String,
    pub username: String,
    /// Operator initials stamped into release comments. When blank they are
    /// derived from the login name; see `operator_initials`.
    #[serde(default)]
    pub initials: String,
    /// Default content folder for items created by units that name none.
    #[serde(default)]
    pub folder: Option<String>,
    /// Titles of the groups every released item is shared into.
    #[serde(default)]
    pub release_groups: Vec<String>,
    /// Titles of the working groups staged uploads are shared into.
    #[serde(default)]
    pub staging_groups: Vec<String>,
    /// Tags applied to staged uploads.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Credits (access information) applied to staged uploads.
    #[serde(default)]
    pub credits: String,
    /// License/use text applied to staged uploads.
    #[serde(default)]
    pub license_text: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    pub units: Vec<PromotionUnit>,
}

fn default_timeout_secs() -> u64 {
    PortalSession::DEFAULT_TIMEOUT_SECS
}

/// First two characters of a login name, uppercased.
fn initials_from_login(login: &str) -> String {
    login.chars().take(2).collect::<String>().to_uppercase()
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config: Self = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        config.validate()?;
        // Units that name no folder inherit the config-wide one.
        for unit in &mut config.units {
            if unit.folder.is_none() {
                unit.folder = config.folder.clone();
            }
        }
        Ok(config)
    }

    /// Operator initials for release comments: the configured value, or the
    /// first two letters of the login name (`USER`, then `USERNAME`),
    /// uppercased.
    pub fn operator_initials(&self) -> String {
        if !self.initials.is_empty() {
            return self.initials.clone();
        }
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .map(|login| initials_from_login(&login))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portal_url.is_empty() {
            return Err(ConfigError::Invalid("portal_url is empty".to_string()));
        }
        if !self.portal_url.starts_with("https://") && !self.portal_url.starts_with("http://") {
            return Err(ConfigError::Invalid(format!(
                "portal_url \"{}\" is not an http(s) url",
                self.portal_url
            )));
        }
        if self.username.is_empty() {
            return Err(ConfigError::Invalid("username is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.units.is_empty() {
            return Err(ConfigError::Invalid("units list is empty".to_string()));
        }
        for unit in &self.units {
            unit.validate().map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }

    /// The portal password, from the environment only.
    pub fn password(&self) -> Result<String, ConfigError> {
        match std::env::var(PASSWORD_ENV) {
            Ok(password) if !password.is_empty() => Ok(password),
            _ => Err(ConfigError::MissingPassword),
        }
    }

    /// Build the connection session described by this config.
    pub fn session(&self) -> Result<PortalSession, ConfigError> {
        let password = self.password()?;
        Ok(PortalSession::new(
            &self.portal_url,
            &self.username,
            &password,
            std::time::Duration::from_secs(self.request_timeout_secs),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::ItemType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config() {
        let file = write_config(
            r#"{
                "portal_url": "https://maps.example.gov/portal",
                "username": "publisher",
                "initials": "BW",
                "release_groups": ["GIS TEAM"],
                "units": [
                    {
                        "staged_title": "Roads STAGED",
                        "target_title": "Roads",
                        "service_type": "tile-service"
                    }
                ]
            }"#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.username, "publisher");
        assert_eq!(
            config.request_timeout_secs,
            PortalSession::DEFAULT_TIMEOUT_SECS
        );
        assert_eq!(config.units.len(), 1);
        assert_eq!(config.units[0].service_type, ItemType::TileService);
    }

    #[test]
    fn test_staging_fields_parse_and_default() {
        let file = write_config(
            r#"{
                "portal_url": "https://maps.example.gov/portal",
                "username": "publisher",
                "folder": "basemaps",
                "staging_groups": ["GIS EDITORS"],
                "tags": ["basemap", "staged"],
                "credits": "City GIS",
                "license_text": "Internal use only",
                "units": [
                    {
                        "staged_title": "Roads STAGED",
                        "target_title": "Roads",
                        "service_type": "tile-service"
                    }
                ]
            }"#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.staging_groups, vec!["GIS EDITORS".to_string()]);
        assert_eq!(config.tags.len(), 2);
        assert_eq!(config.credits, "City GIS");
        assert_eq!(config.license_text, "Internal use only");
        // Units without a folder inherit the config-wide one.
        assert_eq!(config.units[0].folder.as_deref(), Some("basemaps"));

        // And all of them default cleanly when absent.
        let file = write_config(
            r#"{
                "portal_url": "https://maps.example.gov/portal",
                "username": "publisher",
                "units": [
                    {
                        "staged_title": "Roads STAGED",
                        "target_title": "Roads",
                        "service_type": "tile-service"
                    }
                ]
            }"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert!(config.folder.is_none());
        assert!(config.staging_groups.is_empty());
        assert!(config.tags.is_empty());
        assert!(config.units[0].folder.is_none());
    }

    #[test]
    fn test_unit_folder_wins_over_config_folder() {
        let file = write_config(
            r#"{
                "portal_url": "https://maps.example.gov/portal",
                "username": "publisher",
                "folder": "basemaps",
                "units": [
                    {
                        "staged_title": "Roads STAGED",
                        "target_title": "Roads",
                        "service_type": "tile-service",
                        "folder": "transportation"
                    }
                ]
            }"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.units[0].folder.as_deref(), Some("transportation"));
    }

    #[test]
    fn test_initials_from_login_takes_first_two_uppercased() {
        assert_eq!(initials_from_login("bwalters"), "BW");
        assert_eq!(initials_from_login("Al"), "AL");
        assert_eq!(initials_from_login("x"), "X");
        assert_eq!(initials_from_login(""), "");
    }

    #[test]
    fn test_configured_initials_win_over_login() {
        let config = Config {
            portal_url: "https://maps.example.gov/portal".to_string(),
            username: "publisher".to_string(),
            initials: "BW".to_string(),
            folder: None,
            release_groups: Vec::new(),
            staging_groups: Vec::new(),
            tags: Vec::new(),
            credits: String::new(),
            license_text: String::new(),
            request_timeout_secs: 600,
            units: Vec::new(),
        };
        assert_eq!(config.operator_initials(), "BW");
    }

    #[test]
    fn test_empty_units_rejected() {
        let file = write_config(
            r#"{
                "portal_url": "https://maps.example.gov/portal",
                "username": "publisher",
                "units": []
            }"#,
        );
        let error = Config::load(file.path()).unwrap_err();
        assert!(error.to_string().contains("units"));
    }

    #[test]
    fn test_non_http_url_rejected() {
        let file = write_config(
            r#"{
                "portal_url": "maps.example.gov",
                "username": "publisher",
                "units": [
                    {
                        "staged_title": "Roads STAGED",
                        "target_title": "Roads",
                        "service_type": "tile-service"
                    }
                ]
            }"#,
        );
        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_names_the_path() {
        let file = write_config("{ not json");
        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unit_validation_is_applied() {
        let file = write_config(
            r#"{
                "portal_url": "https://maps.example.gov/portal",
                "username": "publisher",
                "units": [
                    {
                        "staged_title": "",
                        "target_title": "Roads",
                        "service_type": "tile-service"
                    }
                ]
            }"#,
        );
        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }
}
