//! User configuration, read from `config.json` in the platform configuration directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Also append log lines to this file.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    /// Name of the lesson shown at start-up.
    pub start_lesson: String,
    /// Directory the `textures/` folder is looked up in.
    pub asset_dir: PathBuf,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            start_lesson: "transforms".to_string(),
            asset_dir: PathBuf::from("assets"),
            log: LogConfig::default(),
        }
    }
}

/// Environment variable overriding the configured log level.
pub const LOG_ENV: &str = "SCENELAB_LOG";

impl Config {
    pub fn from_json(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| e.to_string())
    }

    /// Location of the configuration file, if the platform has a configuration directory.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scenelab").join("config.json"))
    }

    /// Loads the configuration file.
    ///
    /// A missing file yields the defaults. A broken one also yields the defaults, together with
    /// a description of the problem for the caller to report once logging is up.
    pub fn load() -> (Self, Option<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), None);
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => (config, None),
                Err(e) => (
                    Self::default(),
                    Some(format!("Ignoring malformed {}: {e}", path.display())),
                ),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Self::default(), None),
            Err(e) => (
                Self::default(),
                Some(format!("Could not read {}: {e}", path.display())),
            ),
        }
    }

    /// The effective log level: the environment override if set, else the configured one.
    pub fn log_level(&self) -> log::LevelFilter {
        let raw = std::env::var(LOG_ENV).unwrap_or_else(|_| self.log.level.clone());
        parse_level(&raw).unwrap_or(log::LevelFilter::Info)
    }
}

fn parse_level(s: &str) -> Option<log::LevelFilter> {
    s.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_json(r#"{ "window": { "width": 800 }, "start_lesson": "particles" }"#)
            .unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert!(config.window.vsync);
        assert_eq!(config.start_lesson, "particles");
        assert_eq!(config.asset_dir, PathBuf::from("assets"));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(Config::from_json("{ window: 3 ").is_err());
        assert!(Config::from_json(r#"{ "window": { "width": "wide" } }"#).is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_level("debug"), Some(log::LevelFilter::Debug));
        assert_eq!(parse_level(" WARN "), Some(log::LevelFilter::Warn));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_round_trip_file_path() {
        let config = Config::from_json(r#"{ "log": { "file": "scenelab.log" } }"#).unwrap();
        assert_eq!(config.log.file, Some(PathBuf::from("scenelab.log")));
    }
}
