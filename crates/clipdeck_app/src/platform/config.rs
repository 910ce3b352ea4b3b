//! `clipdeck.ron` loading.
//!
//! Every field is optional; a missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clipdeck_core::{OverflowPolicy, SimulationSettings};
use clipdeck_engine::FetchSettings;
use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::AppError;
use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILENAME: &str = "clipdeck.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upload page cadence. Omitted fields keep the foreground preset.
    #[serde(deserialize_with = "foreground_section")]
    pub foreground: SimulationSettings,
    /// Omitted fields keep the background preset.
    #[serde(deserialize_with = "background_section")]
    pub background: SimulationSettings,
    /// `GET {endpoint}?url=...` for link metadata. Links get a fallback title when unset.
    pub metadata_endpoint: Option<String>,
    /// Base of `GET {base}/status/{id}`. Background progress is simulated when unset.
    pub status_endpoint: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Page ticks to run before moving the rest to the background.
    pub background_after_ticks: u32,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            foreground: SimulationSettings::foreground(),
            background: SimulationSettings::background(),
            metadata_endpoint: None,
            status_endpoint: None,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            background_after_ticks: 3,
            log_destination: LogDestination::File,
        }
    }
}

/// A partial settings block laid over one preset.
macro_rules! settings_section {
    ($section:ident, $parse:ident, $preset:path) => {
        #[derive(Deserialize)]
        #[serde(default, deny_unknown_fields)]
        struct $section {
            tick_interval_ms: u64,
            increment_scale: f64,
            increment_floor: f64,
            overflow: OverflowPolicy,
        }

        impl Default for $section {
            fn default() -> Self {
                let preset = $preset();
                Self {
                    tick_interval_ms: preset.tick_interval_ms,
                    increment_scale: preset.increment_scale,
                    increment_floor: preset.increment_floor,
                    overflow: preset.overflow,
                }
            }
        }

        fn $parse<'de, D>(deserializer: D) -> Result<SimulationSettings, D::Error>
        where
            D: Deserializer<'de>,
        {
            let section = $section::deserialize(deserializer)?;
            Ok(SimulationSettings {
                tick_interval_ms: section.tick_interval_ms,
                increment_scale: section.increment_scale,
                increment_floor: section.increment_floor,
                overflow: section.overflow,
            })
        }
    };
}

settings_section!(
    ForegroundSection,
    foreground_section,
    SimulationSettings::foreground
);
settings_section!(
    BackgroundSection,
    background_section,
    SimulationSettings::background
);

impl AppConfig {
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.foreground
            .validate()
            .map_err(|source| AppError::Settings {
                section: "foreground",
                source,
            })?;
        self.background
            .validate()
            .map_err(|source| AppError::Settings {
                section: "background",
                source,
            })
    }
}

/// Reads `path`, or `./clipdeck.ron` when none is given.
///
/// An explicit path must exist; the default file may be absent.
pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(AppConfig::default());
        }
        Err(source) => return Err(AppError::ConfigRead { path, source }),
    };

    let config: AppConfig =
        ron::from_str(&content).map_err(|source| AppError::ConfigParse {
            path: path.clone(),
            source,
        })?;
    config.validate()?;
    if config.background_after_ticks == 0 {
        engine_warn!("background_after_ticks is 0; items go to the background right away");
    }
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipdeck_core::ConfigError;

    fn write(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("clipdeck.ron");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"(
                background: (tick_interval_ms: 250, overflow: reset),
                status_endpoint: Some("http://localhost:8080/jobs"),
                background_after_ticks: 5,
            )"#,
        );

        let config = load(Some(&path)).unwrap();

        assert_eq!(config.background.tick_interval_ms, 250);
        assert_eq!(config.background.overflow, OverflowPolicy::Reset);
        assert_eq!(config.background.increment_floor, 15.0);
        assert_eq!(config.foreground, SimulationSettings::foreground());
        assert_eq!(
            config.status_endpoint.as_deref(),
            Some("http://localhost:8080/jobs")
        );
        assert_eq!(config.metadata_endpoint, None);
        assert_eq!(config.background_after_ticks, 5);
        assert_eq!(config.log_destination, LogDestination::File);
    }

    #[test]
    fn partial_foreground_keeps_foreground_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "(foreground: (tick_interval_ms: 500))");

        let config = load(Some(&path)).unwrap();

        assert_eq!(
            config.foreground,
            SimulationSettings {
                tick_interval_ms: 500,
                ..SimulationSettings::foreground()
            }
        );
        assert_eq!(config.background, SimulationSettings::background());
    }

    #[test]
    fn unknown_settings_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "(background: (tick_ms: 500))");
        assert!(matches!(
            load(Some(&path)),
            Err(AppError::ConfigParse { .. })
        ));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ron");
        assert!(matches!(
            load(Some(&missing)),
            Err(AppError::ConfigRead { .. })
        ));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "(background: [1, 2");
        assert!(matches!(
            load(Some(&path)),
            Err(AppError::ConfigParse { .. })
        ));
    }

    #[test]
    fn invalid_simulation_settings_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "(foreground: (tick_interval_ms: 0))");
        match load(Some(&path)) {
            Err(AppError::Settings { section, source }) => {
                assert_eq!(section, "foreground");
                assert_eq!(source, ConfigError::ZeroTickInterval);
            }
            other => panic!("expected settings error, got {other:?}"),
        }
    }

    #[test]
    fn timeouts_map_to_fetch_settings() {
        let config = AppConfig {
            connect_timeout_ms: 1_500,
            request_timeout_ms: 4_000,
            ..AppConfig::default()
        };
        let settings = config.fetch_settings();
        assert_eq!(settings.connect_timeout, Duration::from_millis(1_500));
        assert_eq!(settings.request_timeout, Duration::from_secs(4));
    }
}
