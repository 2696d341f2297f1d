//! User configuration
//!
//! Optional TOML file at `~/.config/brightness-levels/config.toml`. Every key
//! has a default, so a missing file is normal. A broken file is reported and
//! ignored rather than stopping a hotkey from working. Environment variables
//! are applied on top of whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::backend::BackendChoice;
use crate::backlight::Locator;
use crate::constants::{env, paths, sysfs, validation, wayland};
use crate::state::LevelStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `auto`, `x11` or `wayland`
    pub backend: BackendChoice,
    /// Overrides the default `~/.local/share/brightness_level`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    pub backlight: BacklightSettings,
    pub wayland: WaylandSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklightSettings {
    pub root: PathBuf,
    /// Device names tried in order; the first usable one wins
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaylandSettings {
    pub poll_interval_ms: u64,
    pub startup_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendChoice::Auto,
            state_file: None,
            backlight: BacklightSettings::default(),
            wayland: WaylandSettings::default(),
        }
    }
}

impl Default for BacklightSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from(sysfs::BACKLIGHT_ROOT),
            candidates: default_candidates(),
        }
    }
}

impl Default for WaylandSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: wayland::DEFAULT_POLL_INTERVAL_MS,
            startup_timeout_ms: wayland::DEFAULT_STARTUP_TIMEOUT_MS,
        }
    }
}

fn default_candidates() -> Vec<String> {
    sysfs::DEFAULT_CANDIDATES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl WaylandSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(paths::APP_DIR);
        path.push(paths::CONFIG_FILENAME);
        path
    }

    /// Load from the default location with environment overrides
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path` with environment overrides
    pub fn load_from(path: &Path) -> Self {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load from `path`, reading overrides through `lookup` instead of the environment
    pub fn load_with(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                    error!(path = %path.display(), "Please fix the syntax errors in your config file.");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        config.apply_env_overrides(lookup);
        config.validate_and_clamp();
        config
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(env::BACKEND) {
            match raw.parse::<BackendChoice>() {
                Ok(choice) => self.backend = choice,
                Err(e) => warn!(var = env::BACKEND, error = %e, "ignoring invalid override"),
            }
        }
        if let Some(path) = lookup(env::STATE_FILE).filter(|p| !p.trim().is_empty()) {
            self.state_file = Some(PathBuf::from(path));
        }
        if let Some(device) = lookup(env::BACKLIGHT).map(|d| d.trim().to_string())
            && !device.is_empty()
        {
            self.backlight.candidates.retain(|c| *c != device);
            self.backlight.candidates.insert(0, device);
        }
    }

    /// Validate and clamp values to safe ranges
    fn validate_and_clamp(&mut self) {
        self.backlight.candidates.retain(|c| !c.trim().is_empty());
        if self.backlight.candidates.is_empty() {
            warn!("backlight.candidates is empty, using the built-in list");
            self.backlight.candidates = default_candidates();
        }

        let interval = self.wayland.poll_interval_ms;
        if !(validation::MIN_POLL_INTERVAL_MS..=validation::MAX_POLL_INTERVAL_MS).contains(&interval) {
            let clamped = interval.clamp(validation::MIN_POLL_INTERVAL_MS, validation::MAX_POLL_INTERVAL_MS);
            warn!(poll_interval_ms = interval, using = clamped, "poll_interval_ms out of range, clamping");
            self.wayland.poll_interval_ms = clamped;
        }

        let timeout = self.wayland.startup_timeout_ms;
        let min_timeout = self.wayland.poll_interval_ms;
        if !(min_timeout..=validation::MAX_STARTUP_TIMEOUT_MS).contains(&timeout) {
            let clamped = timeout.clamp(min_timeout, validation::MAX_STARTUP_TIMEOUT_MS);
            warn!(startup_timeout_ms = timeout, using = clamped, "startup_timeout_ms out of range, clamping");
            self.wayland.startup_timeout_ms = clamped;
        }
    }

    pub fn state_store(&self) -> LevelStore {
        LevelStore::new(
            self.state_file
                .clone()
                .unwrap_or_else(LevelStore::default_path),
        )
    }

    pub fn locator(&self) -> Locator {
        Locator::new(&self.backlight.root, self.backlight.candidates.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backlight::test_support::scratch_dir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(tag: &str, contents: &str) -> PathBuf {
        let path = scratch_dir(tag).join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = scratch_dir("cfg-missing").join("config.toml");
        let config = Config::load_with(&path, no_env);
        assert_eq!(config, Config::default());
        assert_eq!(config.backlight.candidates[0], "amdgpu_bl1");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = write_config(
            "cfg-partial",
            r#"
backend = "wayland"

[backlight]
candidates = ["acpi_video0", "intel_backlight"]
"#,
        );
        let config = Config::load_with(&path, no_env);
        assert_eq!(config.backend, BackendChoice::Wayland);
        assert_eq!(config.backlight.candidates, vec!["acpi_video0", "intel_backlight"]);
        assert_eq!(config.backlight.root, PathBuf::from("/sys/class/backlight"));
        assert_eq!(config.wayland, WaylandSettings::default());
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let path = write_config("cfg-broken", "backend = [not toml");
        assert_eq!(Config::load_with(&path, no_env), Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let path = scratch_dir("cfg-env").join("config.toml");
        let config = Config::load_with(&path, |key| match key {
            "BRIGHTNESS_BACKEND" => Some("x11".to_string()),
            "BRIGHTNESS_STATE_FILE" => Some("/tmp/level".to_string()),
            "BRIGHTNESS_BACKLIGHT" => Some("intel_backlight".to_string()),
            _ => None,
        });
        assert_eq!(config.backend, BackendChoice::X11);
        assert_eq!(config.state_file, Some(PathBuf::from("/tmp/level")));
        assert_eq!(config.backlight.candidates[0], "intel_backlight");
        assert_eq!(
            config
                .backlight
                .candidates
                .iter()
                .filter(|c| *c == "intel_backlight")
                .count(),
            1
        );
    }

    #[test]
    fn test_invalid_backend_override_is_ignored() {
        let path = scratch_dir("cfg-bad-env").join("config.toml");
        let config = Config::load_with(&path, |key| {
            (key == "BRIGHTNESS_BACKEND").then(|| "mir".to_string())
        });
        assert_eq!(config.backend, BackendChoice::Auto);
    }

    #[test]
    fn test_validate_and_clamp() {
        let path = write_config(
            "cfg-clamp",
            r#"
[backlight]
candidates = []

[wayland]
poll_interval_ms = 0
startup_timeout_ms = 999999
"#,
        );
        let config = Config::load_with(&path, no_env);
        assert_eq!(config.backlight.candidates, default_candidates());
        assert_eq!(config.wayland.poll_interval_ms, validation::MIN_POLL_INTERVAL_MS);
        assert_eq!(config.wayland.startup_timeout_ms, validation::MAX_STARTUP_TIMEOUT_MS);
    }

    #[test]
    fn test_state_store_uses_override() {
        let config = Config {
            state_file: Some(PathBuf::from("/tmp/custom_level")),
            ..Config::default()
        };
        assert_eq!(config.state_store().path(), Path::new("/tmp/custom_level"));
    }

    #[test]
    fn test_default_config_serializes() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(text.contains("backend = \"auto\""));
        assert!(text.contains("[wayland]"));
    }
}
