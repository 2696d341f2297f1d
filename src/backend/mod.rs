//! Display server backends
//!
//! Software gamma/dimming is applied differently per display server:
//! - **x11**: `xrandr` against the primary RandR output
//! - **wayland**: `wl-gammarelay-rs` driven over the session bus

pub mod wayland;
pub mod x11;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::WaylandSettings;
use crate::constants::env;
use crate::error::{BrightnessError, Result};
use crate::mapper::Correction;
use crate::process::SystemRunner;

pub use wayland::WaylandBackend;
pub use x11::{OutputQuery, RandrQuery, X11Backend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServerKind {
    X11,
    Wayland,
}

impl DisplayServerKind {
    /// Detect from the process environment
    pub fn detect() -> Result<Self> {
        Self::detect_with(|key| std::env::var(key).ok())
    }

    /// Detect using `lookup` in place of the environment
    ///
    /// A Wayland display handle wins over an X11 one unless the session type
    /// says otherwise (XWayland sessions set both).
    pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let present = |key: &str| lookup(key).is_some_and(|v| !v.trim().is_empty());
        let wayland = present(env::WAYLAND_DISPLAY);
        let x11 = present(env::DISPLAY);

        match (wayland, x11) {
            (true, true) => match lookup(env::SESSION_TYPE).as_deref().map(str::trim) {
                Some("x11") => Ok(Self::X11),
                _ => Ok(Self::Wayland),
            },
            (true, false) => Ok(Self::Wayland),
            (false, true) => Ok(Self::X11),
            (false, false) => Err(BrightnessError::NoDisplayServer),
        }
    }
}

impl fmt::Display for DisplayServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X11 => write!(f, "x11"),
            Self::Wayland => write!(f, "wayland"),
        }
    }
}

/// Backend selection as written in config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    #[default]
    Auto,
    X11,
    Wayland,
}

impl BackendChoice {
    pub fn resolve(self) -> Result<DisplayServerKind> {
        match self {
            Self::Auto => DisplayServerKind::detect(),
            Self::X11 => Ok(DisplayServerKind::X11),
            Self::Wayland => Ok(DisplayServerKind::Wayland),
        }
    }
}

impl FromStr for BackendChoice {
    type Err = BrightnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "x11" | "xorg" => Ok(Self::X11),
            "wayland" => Ok(Self::Wayland),
            other => Err(BrightnessError::UnknownBackend(other.to_string())),
        }
    }
}

/// Software correction capability of a display server
pub trait DisplayBackend {
    fn kind(&self) -> DisplayServerKind;

    /// Make the backend ready to accept corrections (find the output, start the daemon)
    ///
    /// Idempotent: later calls reuse what the first one resolved.
    fn resolve_target(&mut self) -> Result<()>;

    /// Apply a correction, resolving the target first if needed
    fn apply(&mut self, correction: Correction) -> Result<()>;
}

impl<B: DisplayBackend + ?Sized> DisplayBackend for Box<B> {
    fn kind(&self) -> DisplayServerKind {
        (**self).kind()
    }

    fn resolve_target(&mut self) -> Result<()> {
        (**self).resolve_target()
    }

    fn apply(&mut self, correction: Correction) -> Result<()> {
        (**self).apply(correction)
    }
}

/// Build the real backend for `kind`
pub fn create(kind: DisplayServerKind, wayland: &WaylandSettings) -> Box<dyn DisplayBackend> {
    info!(backend = %kind, "selected display backend");
    match kind {
        DisplayServerKind::X11 => Box::new(X11Backend::new(SystemRunner, RandrQuery)),
        DisplayServerKind::Wayland => Box::new(WaylandBackend::new(
            SystemRunner,
            wayland.poll_interval(),
            wayland.startup_timeout(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_detect_wayland_display() {
        let kind = DisplayServerKind::detect_with(lookup(&[("WAYLAND_DISPLAY", "wayland-0")]));
        assert_eq!(kind.unwrap(), DisplayServerKind::Wayland);
    }

    #[test]
    fn test_detect_x11_display() {
        let kind = DisplayServerKind::detect_with(lookup(&[("DISPLAY", ":0")]));
        assert_eq!(kind.unwrap(), DisplayServerKind::X11);
    }

    #[test]
    fn test_detect_both_prefers_wayland() {
        let kind = DisplayServerKind::detect_with(lookup(&[
            ("DISPLAY", ":0"),
            ("WAYLAND_DISPLAY", "wayland-1"),
        ]));
        assert_eq!(kind.unwrap(), DisplayServerKind::Wayland);
    }

    #[test]
    fn test_detect_both_with_x11_session_type() {
        let kind = DisplayServerKind::detect_with(lookup(&[
            ("DISPLAY", ":0"),
            ("WAYLAND_DISPLAY", "wayland-1"),
            ("XDG_SESSION_TYPE", "x11"),
        ]));
        assert_eq!(kind.unwrap(), DisplayServerKind::X11);
    }

    #[test]
    fn test_detect_empty_values_count_as_unset() {
        let err = DisplayServerKind::detect_with(lookup(&[("DISPLAY", ""), ("WAYLAND_DISPLAY", " ")]))
            .unwrap_err();
        assert!(matches!(err, BrightnessError::NoDisplayServer));
    }

    #[test]
    fn test_backend_choice_parse() {
        assert_eq!("auto".parse::<BackendChoice>().unwrap(), BackendChoice::Auto);
        assert_eq!("X11".parse::<BackendChoice>().unwrap(), BackendChoice::X11);
        assert_eq!(" wayland ".parse::<BackendChoice>().unwrap(), BackendChoice::Wayland);
        assert!("mir".parse::<BackendChoice>().is_err());
    }

    #[test]
    fn test_explicit_choice_skips_detection() {
        assert_eq!(BackendChoice::Wayland.resolve().unwrap(), DisplayServerKind::Wayland);
        assert_eq!(BackendChoice::X11.resolve().unwrap(), DisplayServerKind::X11);
    }
}
