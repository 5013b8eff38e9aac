//! Configuration loader: file first, environment on top.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. `Default` of the target type (or the target's current value for
//!    [`ConfigLoader::load_into`])
//! 2. Values passed to [`ConfigLoader::merge`]
//! 3. The configuration file
//! 4. Environment variables (`PREFIX_*`), matched against the target's path
//!    templates
//!
//! A missing configuration file is not an error unless
//! [`ConfigLoader::require_file`] is set.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables `.toml` files
//! - `yaml-config`: enables `.yaml` / `.yml` files
//!
//! # Example
//!
//! ```rust,ignore
//! use envoverlay::ConfigLoader;
//!
//! let config: AppConfig = ConfigLoader::new("app")
//!     .file("./config/app.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
use figment::providers::Serialized;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::engine::overlay_from;
use crate::env;
use crate::error::{LoadError, LoadResult};
use crate::shape::Overlay;

/// Configuration loader with a file source and an environment overlay.
pub struct ConfigLoader {
    /// Environment variable prefix.
    prefix: String,
    /// Programmatic sources.
    figment: Figment,
    /// Config file to load.
    config_file: Option<PathBuf>,
    /// Whether a missing config file is an error.
    require_file: bool,
    /// Whether to overlay environment variables.
    load_env: bool,
    /// Listing used instead of the process environment.
    env: Option<Vec<String>>,
}

impl ConfigLoader {
    /// Creates a loader reading variables that start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            figment: Figment::new(),
            config_file: None,
            require_file: false,
            load_env: true,
            env: None,
        }
    }

    /// Sets the configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Makes a missing configuration file an error.
    pub fn require_file(mut self) -> Self {
        self.require_file = true;
        self
    }

    /// Enables the environment overlay (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables the environment overlay.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Uses `env` (`NAME=VALUE` entries) instead of the process environment.
    pub fn env_snapshot<I, S>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env = Some(env.into_iter().map(Into::into).collect());
        self
    }

    /// Merges programmatic values above the defaults and below the file.
    pub fn merge<T: Serialize>(mut self, values: T) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(values));
        self
    }

    /// Loads a fresh `T`.
    pub fn load<T>(self) -> LoadResult<T>
    where
        T: Overlay + Default + Serialize + DeserializeOwned,
    {
        let mut config = T::default();
        self.load_into(&mut config)?;
        Ok(config)
    }

    /// Loads on top of the current value of `target`.
    ///
    /// `target` is only replaced once the file sources were extracted
    /// successfully; the environment overlay then mutates it in place.
    pub fn load_into<T>(mut self, target: &mut T) -> LoadResult<()>
    where
        T: Overlay + Serialize + DeserializeOwned,
    {
        let mut figment = Figment::from(Serialized::defaults(&*target));
        figment = figment.merge(std::mem::replace(&mut self.figment, Figment::new()));

        if let Some(path) = &self.config_file {
            figment = self.merge_file(figment, path)?;
        }

        *target = figment.extract()?;

        if self.load_env {
            let env = self.env.take().unwrap_or_else(env::snapshot);
            overlay_from(env, &self.prefix, target)?;
        }

        debug!(
            prefix = %self.prefix,
            config_type = std::any::type_name::<T>(),
            "Configuration loaded successfully"
        );
        Ok(())
    }

    fn merge_file(&self, figment: Figment, path: &Path) -> LoadResult<Figment> {
        if !path.exists() {
            if self.require_file {
                return Err(LoadError::FileNotFound(path.to_path_buf()));
            }
            warn!(path = %path.display(), "Configuration file not found, using defaults");
            return Ok(figment);
        }

        info!(path = %path.display(), "Loading configuration file");
        Self::merge_config_file(figment, path)
    }

    /// Merges a single config file into the figment, dispatching on file extension.
    ///
    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> LoadResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => {
                // Only referenced when no format feature is enabled.
                let _ = &figment;
                Err(LoadError::UnsupportedFormat(ext.to_string()))
            }
        }
    }
}

/// Loads `T` from a TOML file, then overlays `PREFIX_*` variables.
///
/// A missing file is not an error.
#[cfg(feature = "toml-config")]
pub fn load_toml<T, P>(prefix: &str, path: P) -> LoadResult<T>
where
    T: Overlay + Default + Serialize + DeserializeOwned,
    P: AsRef<Path>,
{
    ConfigLoader::new(prefix).file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize, crate::Overlay)]
    #[serde(default)]
    struct Settings {
        name: String,
        port: u16,
        limits: HashMap<String, u32>,
    }

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings: Settings = ConfigLoader::new("app").without_env().load().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let settings: Settings = ConfigLoader::new("app")
            .file("/nonexistent/envoverlay/app.toml")
            .env_snapshot(["APP_PORT=9000"])
            .load()
            .unwrap();
        assert_eq!(settings.port, 9000);
    }

    #[test]
    fn test_required_missing_file() {
        let result: LoadResult<Settings> = ConfigLoader::new("app")
            .file("/nonexistent/envoverlay/app.toml")
            .require_file()
            .without_env()
            .load();
        assert!(matches!(result, Err(LoadError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_config(".ini", "port = 1");
        let result: LoadResult<Settings> = ConfigLoader::new("app")
            .file(file.path())
            .without_env()
            .load();
        assert!(matches!(result, Err(LoadError::UnsupportedFormat(ext)) if ext == "ini"));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_env_overrides_file() {
        let file = write_config(
            ".toml",
            r#"
name = "from-file"
port = 8080

[limits]
read = 10
write = 20
"#,
        );

        let settings: Settings = ConfigLoader::new("app")
            .file(file.path())
            .env_snapshot(["APP_PORT=9090", "APP_LIMITS_WRITE=25", "APP_LIMITS_DELETE=1"])
            .load()
            .unwrap();

        assert_eq!(settings.name, "from-file");
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.limits["read"], 10);
        assert_eq!(settings.limits["write"], 25);
        assert_eq!(settings.limits["delete"], 1);
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_merge_sits_below_file() {
        let file = write_config(".toml", "port = 1234\n");

        let settings: Settings = ConfigLoader::new("app")
            .merge(Settings {
                name: "merged".to_string(),
                port: 1,
                ..Default::default()
            })
            .file(file.path())
            .without_env()
            .load()
            .unwrap();

        assert_eq!(settings.name, "merged");
        assert_eq!(settings.port, 1234);
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_load_into_keeps_existing_values() {
        let file = write_config(".toml", "name = \"file\"\n");
        let mut settings = Settings {
            port: 42,
            ..Default::default()
        };

        ConfigLoader::new("app")
            .file(file.path())
            .without_env()
            .load_into(&mut settings)
            .unwrap();

        assert_eq!(settings.name, "file");
        assert_eq!(settings.port, 42);
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_parse_error() {
        let file = write_config(".toml", "port = \"not a number\"\n");
        let result: LoadResult<Settings> = ConfigLoader::new("app")
            .file(file.path())
            .without_env()
            .load();
        assert!(matches!(result, Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_overlay_error_is_surfaced() {
        let result: LoadResult<Settings> = ConfigLoader::new("app")
            .env_snapshot(["APP_PORT=eighty"])
            .load();
        assert!(matches!(result, Err(LoadError::Overlay(_))));
    }
}
