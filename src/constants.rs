//! Application-wide constants
//!
//! This module contains all tunables and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Level ladder layout
pub mod levels {
    /// Number of software-dimmed levels below the hardware floor
    pub const DARK_GAMMA_STEPS: u8 = 10;

    /// Number of native backlight levels
    pub const HARDWARE_STEPS: u8 = 10;

    /// Number of software-boosted levels above the hardware ceiling
    pub const BRIGHT_GAMMA_STEPS: u8 = 10;

    /// Lowest level
    pub const MIN: u8 = 0;

    /// First level of the hardware range (10)
    pub const HARDWARE_START: u8 = DARK_GAMMA_STEPS;

    /// First level of the bright gamma range (20)
    pub const BRIGHT_START: u8 = DARK_GAMMA_STEPS + HARDWARE_STEPS;

    /// Highest level (29)
    pub const MAX: u8 = DARK_GAMMA_STEPS + HARDWARE_STEPS + BRIGHT_GAMMA_STEPS - 1;

    /// Maximum hardware brightness with no gamma correction (19)
    pub const HARDWARE_MAX: u8 = BRIGHT_START - 1;

    /// Level used when nothing has been persisted yet
    pub const DEFAULT: u8 = HARDWARE_MAX;

    /// Distance moved by a single increase/decrease
    pub const STEP: u8 = 1;
}

/// Perceptual curve tunables
///
/// Perceived brightness is not linear in duty cycle, so the hardware and
/// dimming ranges follow `(alpha^k - 1) / (alpha^n - 1)` instead of a line.
pub mod curve {
    /// Exponent base of the backlight curve
    pub const HARDWARE_ALPHA: f64 = 1.4;

    /// Exponent base of the software dimming curve
    pub const DARK_ALPHA: f64 = 1.4;

    /// Hardware fraction written for the lowest hardware level and the whole dark range
    pub const HARDWARE_MIN_FRACTION: f64 = 0.0;

    /// Hardware fraction written for the top hardware level and the whole bright range
    pub const HARDWARE_MAX_FRACTION: f64 = 1.0;

    /// Gamma and brightness multiplier that leave the picture untouched
    pub const NEUTRAL: f64 = 1.0;
}

/// Per display server correction limits
pub mod gamma {
    /// X11: xrandr brightness multiplier at the darkest level
    pub const X11_DIM_FLOOR: f64 = 0.1;

    /// X11: xrandr gamma at the brightest level (values above 1.0 brighten)
    pub const X11_BOOST_LIMIT: f64 = 2.0;

    /// Wayland: daemon brightness at the darkest level
    pub const WAYLAND_DIM_FLOOR: f64 = 0.1;

    /// Wayland: daemon gamma at the brightest level (values below 1.0 brighten)
    pub const WAYLAND_BOOST_LIMIT: f64 = 0.5;
}

/// Sysfs backlight interface
pub mod sysfs {
    /// Directory holding one subdirectory per backlight device
    pub const BACKLIGHT_ROOT: &str = "/sys/class/backlight";

    /// Writable brightness control file
    pub const BRIGHTNESS_FILE: &str = "brightness";

    /// Read-only upper bound for the control file
    pub const MAX_BRIGHTNESS_FILE: &str = "max_brightness";

    /// Known device names, discrete GPU backlights before integrated, before ACPI
    pub const DEFAULT_CANDIDATES: &[&str] = &[
        "amdgpu_bl1",
        "amdgpu_bl0",
        "nvidia_wmi_ec_backlight",
        "nvidia_0",
        "intel_backlight",
        "acpi_video0",
    ];
}

/// X11 backend
pub mod x11 {
    /// Gamma/brightness adjustment tool
    pub const XRANDR: &str = "xrandr";

    /// Lowest RandR version providing GetOutputPrimary
    pub const RANDR_MAJOR: u32 = 1;
    pub const RANDR_MINOR: u32 = 3;
}

/// Wayland backend (wl-gammarelay-rs over the session bus)
pub mod wayland {
    /// Gamma daemon executable
    pub const DAEMON: &str = "wl-gammarelay-rs";

    /// Argument that starts the daemon's server loop
    pub const DAEMON_RUN_ARG: &str = "run";

    /// D-Bus command line client used as the control channel
    pub const BUSCTL: &str = "busctl";

    /// Bus name the daemon claims once ready
    pub const BUS_NAME: &str = "rs.wl-gammarelay";

    /// Object path exposing the properties
    pub const OBJECT_PATH: &str = "/";

    /// Interface holding the Brightness and Gamma properties
    pub const INTERFACE: &str = "rs.wl.gammarelay";

    /// Property used for software dimming
    pub const BRIGHTNESS_PROPERTY: &str = "Brightness";

    /// Property used for software boosting
    pub const GAMMA_PROPERTY: &str = "Gamma";

    /// Delay between readiness probes
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

    /// Give up on the daemon after this long
    pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 3000;
}

/// Config validation limits
pub mod validation {
    /// Allowed delay between readiness probes
    pub const MIN_POLL_INTERVAL_MS: u64 = 10;
    pub const MAX_POLL_INTERVAL_MS: u64 = 1000;

    /// The daemon gets at least one probe interval and at most half a minute
    pub const MAX_STARTUP_TIMEOUT_MS: u64 = 30_000;
}

/// Environment variables inspected at startup
pub mod env {
    pub const WAYLAND_DISPLAY: &str = "WAYLAND_DISPLAY";
    pub const DISPLAY: &str = "DISPLAY";
    pub const SESSION_TYPE: &str = "XDG_SESSION_TYPE";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";

    /// Config overrides
    pub const BACKEND: &str = "BRIGHTNESS_BACKEND";
    pub const STATE_FILE: &str = "BRIGHTNESS_STATE_FILE";
    pub const BACKLIGHT: &str = "BRIGHTNESS_BACKLIGHT";
}

/// File locations
pub mod paths {
    /// Directory under the user's config dir
    pub const APP_DIR: &str = "brightness-levels";

    /// Config file name
    pub const CONFIG_FILENAME: &str = "config.toml";

    /// Persisted level, directly under the user's local data dir
    pub const STATE_FILENAME: &str = "brightness_level";

    /// Advisory lock next to the state file
    pub const LOCK_FILENAME: &str = ".brightness_level.lock";
}

/// Permission remediation hints
pub mod permissions {
    /// Group that usually owns backlight control files
    pub const VIDEO_GROUP: &str = "video";

    /// Command to add the current user to the video group
    pub const ADD_TO_VIDEO_GROUP: &str = "sudo usermod -aG video $USER";

    /// udev rule granting the video group write access
    pub const UDEV_RULE: &str = r#"ACTION=="add", SUBSYSTEM=="backlight", RUN+="/bin/chgrp video $sys$devpath/brightness", RUN+="/bin/chmod g+w $sys$devpath/brightness""#;
}
