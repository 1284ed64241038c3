//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic overrides ([`ConfigLoader::merge`])
//! 3. Profile-specific file (`ferrite.{profile}.toml`)
//! 4. Main file (`ferrite.toml`, or the one given to [`ConfigLoader::file`])
//! 5. Environment variables (`FERRITE_*`)
//!
//! # Environment Variable Mapping
//!
//! Variables use the `FERRITE_` prefix with `__` as the nesting separator:
//!
//! - `FERRITE_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `FERRITE_BOT__TOKEN_FILE=/run/secrets/token` → `bot.token_file = "/run/secrets/token"`
//! - `FERRITE_GATEWAY__URL=wss://gateway.discord.gg` → `gateway.url = "wss://gateway.discord.gg"`
//!
//! # Example
//!
//! ```rust,ignore
//! use ferrite_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/ferrite.toml")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::FerriteConfig;

const ENV_PREFIX: &str = "FERRITE_";
const FILE_STEM: &str = "ferrite";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name, accepting the usual short forms.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `FERRITE_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var("FERRITE_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader that searches the default locations and reads the
    /// environment.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    ///
    /// Once any path is added, the default locations are no longer searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching. It must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges configuration programmatically, below files and environment.
    pub fn merge(mut self, config: FerriteConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<FerriteConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: FerriteConfig = figment.extract()?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(FerriteConfig::default()));

        let user_figment = std::mem::take(&mut self.figment);
        figment = figment.merge(user_figment);

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                return Err(ConfigError::ParseError(format!(
                    "Unsupported configuration file format: {}",
                    path.display()
                )));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = figment.merge(Toml::file(path));
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(FILE_STEM));
        }
        paths
    }

    /// Merges the profile file and the main file from the first search path
    /// that has a main file.
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        for search_path in self.resolve_search_paths() {
            let base_path = search_path.join(format!("{FILE_STEM}.toml"));
            if !base_path.exists() {
                continue;
            }

            let profile_path =
                search_path.join(format!("{FILE_STEM}.{}.toml", self.profile.as_str()));
            if profile_path.exists() {
                debug!(path = %profile_path.display(), "Loading profile-specific config");
                figment = figment.merge(Toml::file(&profile_path));
            }

            info!(path = %base_path.display(), "Loading configuration file");
            return figment.merge(Toml::file(&base_path));
        }

        warn!("No configuration file found, using defaults");
        figment
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<FerriteConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file, plus the environment.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<FerriteConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;
    use figment::Jail;

    #[test]
    fn test_defaults_without_files() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Info);
            assert_eq!(config.bot.token_file, PathBuf::from("token.dat"));
            assert!(config.gateway.url.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ferrite.toml",
                r#"
                [logging]
                level = "debug"

                [bot]
                token_file = "secrets/bot.token"

                [rest]
                timeout_ms = 5000
                "#,
            )?;
            jail.set_env("FERRITE_REST__TIMEOUT_MS", "750");
            jail.set_env("FERRITE_GATEWAY__URL", "wss://gateway.example");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Debug);
            assert_eq!(config.bot.token_file, PathBuf::from("secrets/bot.token"));
            assert_eq!(config.rest.timeout_ms, 750);
            assert_eq!(config.gateway.url.as_deref(), Some("wss://gateway.example"));
            Ok(())
        });
    }

    #[test]
    fn test_profile_file_is_overridden_by_main_file() {
        Jail::expect_with(|jail| {
            jail.create_file("ferrite.production.toml", "[gateway]\nevent_buffer = 8\napi_version = 9")?;
            jail.create_file("ferrite.toml", "[gateway]\nevent_buffer = 16")?;

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .profile("prod")
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.gateway.event_buffer, 16);
            assert_eq!(config.gateway.api_version, 9);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        Jail::expect_with(|jail| {
            let missing = jail.directory().join("nope.toml");
            let err = ConfigLoader::new().file(&missing).load().unwrap_err();
            assert!(matches!(err, ConfigError::FileNotFound(p) if p == missing));
            Ok(())
        });
    }

    #[test]
    fn test_unknown_log_level_is_parse_error() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[logging]\nlevel = \"loud\"")?;
            let err = ConfigLoader::new()
                .file(jail.directory().join("custom.toml"))
                .without_env()
                .load()
                .unwrap_err();
            assert!(matches!(err, ConfigError::ParseError(_)));
            Ok(())
        });
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("PROD"), Profile::Production);
        assert_eq!(Profile::parse("dev"), Profile::Development);
        assert_eq!(Profile::parse("staging"), Profile::Custom("staging".into()));
    }
}
