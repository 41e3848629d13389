// Configuration for playdeck
// Timings and thresholds with sensible defaults; a config file only overrides them and is never written back

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub playback: PlaybackConfig,
    pub ui: UiConfig,
    pub shutdown: ShutdownConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub tick_ms: u64,
    pub paused_tick_ms: u64,
    /// Frames before the end that still count as "reached the end".
    pub guard_frames: u64,
    pub volume: f32, // 0.0 to 1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub redraw_ms: u64,
    /// Percent moved by the Up/Down keys.
    pub seek_step: f64,
    /// How far the slider may drift from reported progress before it counts as a drag.
    pub drag_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub filter: Option<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            paused_tick_ms: 50,
            guard_frames: 100,
            volume: 1.0,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            redraw_ms: 10,
            seek_step: 5.0,
            drag_threshold: 0.5,
        }
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { timeout_ms: 2000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let directory = dirs::data_local_dir()
            .map(|dir| dir.join("playdeck").join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));

        Self {
            directory,
            filter: None,
        }
    }
}

impl PlaybackConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn paused_tick(&self) -> Duration {
        Duration::from_millis(self.paused_tick_ms.max(1))
    }
}

impl UiConfig {
    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.redraw_ms.max(1))
    }
}

impl ShutdownConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// used when present and the defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Config::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.playback.volume = config.playback.volume.clamp(0.0, 1.0);
        Ok(config)
    }

    fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("playdeck").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_player_timings() {
        let config = Config::default();
        assert_eq!(config.playback.tick(), Duration::from_millis(10));
        assert_eq!(config.playback.paused_tick(), Duration::from_millis(50));
        assert_eq!(config.playback.guard_frames, 100);
        assert_eq!(config.ui.seek_step, 5.0);
        assert_eq!(config.ui.drag_threshold, 0.5);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::from_toml("[playback]\nguard_frames = 250\n\n[ui]\nseek_step = 10.0\n").unwrap();
        assert_eq!(config.playback.guard_frames, 250);
        assert_eq!(config.playback.tick_ms, 10);
        assert_eq!(config.ui.seek_step, 10.0);
        assert_eq!(config.shutdown, ShutdownConfig::default());
    }

    #[test]
    fn test_volume_is_clamped() {
        let config = Config::from_toml("[playback]\nvolume = 3.5\n").unwrap();
        assert_eq!(config.playback.volume, 1.0);
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[shutdown]\ntimeout_ms = 500").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.shutdown.timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        assert!(Config::load(Some(Path::new("/no/such/playdeck.toml"))).is_err());
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(Config::from_toml("[playback\n").is_err());
    }
}
