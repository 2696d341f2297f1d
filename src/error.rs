//! Error taxonomy shared by every layer below the CLI

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::constants::permissions;

pub type Result<T, E = BrightnessError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BrightnessError {
    /// None of the candidate sysfs devices exist
    #[error(
        "No backlight device found under {} (tried: {}). \
         Check that the kernel exposes a backlight and that you can read it; \
         members of the '{}' group usually can.",
        .root.display(),
        .candidates.join(", "),
        permissions::VIDEO_GROUP
    )]
    DeviceNotFound {
        root: PathBuf,
        candidates: Vec<String>,
    },

    /// Writing the backlight control file was denied
    #[error(
        "Permission denied writing {}. Join the '{}' group:\n  {}\n\
         or install a udev rule:\n  {}\nthen log out and back in.",
        .path.display(),
        permissions::VIDEO_GROUP,
        permissions::ADD_TO_VIDEO_GROUP,
        permissions::UDEV_RULE
    )]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The Wayland gamma daemon never answered its readiness probe
    #[error("{daemon} did not become ready within {timeout_ms} ms")]
    BackendStartup { daemon: String, timeout_ms: u64 },

    /// X11 reports no primary output
    #[error(
        "No primary monitor is set on the X server. \
         Mark one with `xrandr --output <name> --primary`."
    )]
    NoPrimaryMonitor,

    /// CLI verb that maps to no operation
    #[error("Invalid operation '{0}' (expected max, min, increase or decrease)")]
    InvalidOperation(String),

    /// Neither a Wayland nor an X11 display is reachable
    #[error("No display server detected (neither WAYLAND_DISPLAY nor DISPLAY is set)")]
    NoDisplayServer,

    /// Unknown backend name in config or environment
    #[error("Unknown display backend '{0}' (expected auto, x11 or wayland)")]
    UnknownBackend(String),

    /// External program could not be started
    #[error("Failed to run {program}")]
    CommandSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// External program exited unsuccessfully
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// Sysfs or state file content is not a decimal integer
    #[error("Unexpected content in {}: {content:?}", .path.display())]
    InvalidSysfsValue { path: PathBuf, content: String },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Connection or request failure talking to the X server
    #[error("X11 error: {0}")]
    X11(String),

    /// Advisory lock on the state directory could not be taken
    #[error("Failed to lock {}: {reason}", .path.display())]
    Lock { path: PathBuf, reason: String },
}

impl BrightnessError {
    /// Wrap an I/O error, promoting `PermissionDenied` to [`BrightnessError::Permission`]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::Permission { path, source }
        } else {
            Self::Io { path, source }
        }
    }
}

impl From<x11rb::errors::ConnectError> for BrightnessError {
    fn from(e: x11rb::errors::ConnectError) -> Self {
        Self::X11(e.to_string())
    }
}

impl From<x11rb::errors::ConnectionError> for BrightnessError {
    fn from(e: x11rb::errors::ConnectionError) -> Self {
        Self::X11(e.to_string())
    }
}

impl From<x11rb::errors::ReplyError> for BrightnessError {
    fn from(e: x11rb::errors::ReplyError) -> Self {
        Self::X11(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_promoted() {
        let err = BrightnessError::io(
            "/sys/class/backlight/intel_backlight/brightness",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, BrightnessError::Permission { .. }));
        let message = err.to_string();
        assert!(message.contains("video"));
        assert!(message.contains("udev"));
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let err = BrightnessError::io("/tmp/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, BrightnessError::Io { .. }));
    }

    #[test]
    fn test_device_not_found_lists_candidates() {
        let err = BrightnessError::DeviceNotFound {
            root: PathBuf::from("/sys/class/backlight"),
            candidates: vec!["amdgpu_bl0".to_string(), "intel_backlight".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("amdgpu_bl0, intel_backlight"));
    }
}
