//! Application settings loaded from config.toml
//!
//! The file is optional. Every section has defaults, so a missing file or a
//! missing section yields a working configuration. `BIND_ADDRESS` in the
//! environment overrides `[server] bind_address`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener and session cookie settings
    pub server: ServerSettings,
    /// Category deletion policy and start-up seed list
    pub categories: CategorySettings,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to listen on
    pub bind_address: String,
    /// Lifetime of a login session in hours
    pub session_ttl_hours: i64,
    /// Whether the session cookie carries the `Secure` attribute
    pub secure_cookies: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            session_ttl_hours: 24 * 7,
            secure_cookies: false,
        }
    }
}

impl ServerSettings {
    /// Session lifetime as a duration.
    #[must_use]
    pub fn session_ttl(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::hours(self.session_ttl_hours.max(1))
    }
}

/// `[categories]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategorySettings {
    /// What happens to expenses when their category is deleted
    pub delete_policy: DeletePolicy,
    /// Categories inserted at start-up when missing
    pub seed: Vec<CategorySeed>,
}

/// Policy applied when deleting a category that expenses still reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Refuse the delete with a conflict
    #[default]
    Restrict,
    /// Delete the referencing expenses together with the category
    Cascade,
}

/// A category to create on start-up
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    /// Unique category name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from ./config.toml when present, otherwise the defaults,
/// then applies environment overrides.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    let mut settings = if path.exists() {
        load_settings(path)?
    } else {
        tracing::info!("No config.toml found, using default settings");
        Settings::default()
    };

    if let Ok(bind_address) = std::env::var("BIND_ADDRESS") {
        settings.server.bind_address = bind_address;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [server]
            bind_address = "0.0.0.0:8080"
            session_ttl_hours = 12
            secure_cookies = true

            [categories]
            delete_policy = "cascade"

            [[categories.seed]]
            name = "Travel"
            description = "Business travel expenses"

            [[categories.seed]]
            name = "Software"
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.server.bind_address, "0.0.0.0:8080");
        assert_eq!(settings.server.session_ttl(), chrono::TimeDelta::hours(12));
        assert!(settings.server.secure_cookies);
        assert_eq!(settings.categories.delete_policy, DeletePolicy::Cascade);
        assert_eq!(settings.categories.seed.len(), 2);
        assert_eq!(
            settings.categories.seed[0].description.as_deref(),
            Some("Business travel expenses")
        );
        assert!(settings.categories.seed[1].description.is_none());
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.server.bind_address, "127.0.0.1:3000");
        assert_eq!(settings.categories.delete_policy, DeletePolicy::Restrict);
        assert!(settings.categories.seed.is_empty());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = parse_settings("[categories]\ndelete_policy = \"orphan\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_shipped_config_parses() {
        let settings = parse_settings(include_str!("../../config.toml")).unwrap();
        assert_eq!(settings.categories.delete_policy, DeletePolicy::Restrict);
        assert_eq!(settings.categories.seed.len(), 5);
        assert_eq!(settings.categories.seed[0].name, "Office Supplies");
    }
}
