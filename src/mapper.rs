//! Level → physical value conversion
//!
//! Pure functions only: a level becomes a hardware duty-cycle fraction plus a
//! software correction for whichever display server is active. Nothing here
//! touches the OS.

use crate::backend::DisplayServerKind;
use crate::constants::{curve, gamma, levels};
use crate::level::{BrightnessLevel, Range};

/// Software correction applied by the display server backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    /// Gamma exponent in the backend's own direction (see [`GammaProfile`])
    pub gamma: f64,
    /// Multiplicative dimming factor, 1.0 = untouched
    pub brightness: f64,
}

impl Correction {
    pub const NEUTRAL: Self = Self {
        gamma: curve::NEUTRAL,
        brightness: curve::NEUTRAL,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

/// Backend-specific correction limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaProfile {
    /// Brightness multiplier at level 0
    pub dim_floor: f64,
    /// Gamma at the top level; above 1.0 for X11, below 1.0 for Wayland
    pub boost_limit: f64,
}

impl GammaProfile {
    pub fn for_kind(kind: DisplayServerKind) -> Self {
        match kind {
            DisplayServerKind::X11 => Self {
                dim_floor: gamma::X11_DIM_FLOOR,
                boost_limit: gamma::X11_BOOST_LIMIT,
            },
            DisplayServerKind::Wayland => Self {
                dim_floor: gamma::WAYLAND_DIM_FLOOR,
                boost_limit: gamma::WAYLAND_BOOST_LIMIT,
            },
        }
    }
}

/// Everything needed to realise one level physically
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapping {
    pub level: BrightnessLevel,
    /// Backlight duty cycle in `[0, 1]`
    pub hardware_fraction: f64,
    pub correction: Correction,
}

impl Mapping {
    pub fn range(&self) -> Range {
        self.level.range()
    }

    /// Raw value for a device whose control file tops out at `max_brightness`
    pub fn hardware_value(&self, max_brightness: u32) -> u32 {
        hardware_value(self.hardware_fraction, max_brightness)
    }
}

/// Point `k` of an `n`-step exponential ramp normalised to `[0, 1]`
///
/// `alpha` must be greater than 1; larger values put more of the ramp's
/// resolution at the dark end.
pub fn exp_curve(k: u8, n: u8, alpha: f64) -> f64 {
    if n == 0 {
        return 1.0;
    }
    let k = f64::from(k.min(n));
    let n = f64::from(n);
    (alpha.powf(k) - 1.0) / (alpha.powf(n) - 1.0)
}

pub fn map(level: BrightnessLevel, kind: DisplayServerKind) -> Mapping {
    map_with_profile(level, GammaProfile::for_kind(kind))
}

pub fn map_with_profile(level: BrightnessLevel, profile: GammaProfile) -> Mapping {
    let offset = level.offset_in_range();
    let (hardware_fraction, correction) = match level.range() {
        Range::DarkGamma => {
            let t = exp_curve(offset, levels::DARK_GAMMA_STEPS, curve::DARK_ALPHA);
            let brightness = profile.dim_floor + (curve::NEUTRAL - profile.dim_floor) * t;
            (
                curve::HARDWARE_MIN_FRACTION,
                Correction {
                    gamma: curve::NEUTRAL,
                    brightness,
                },
            )
        }
        Range::Hardware => {
            let t = exp_curve(offset, levels::HARDWARE_STEPS - 1, curve::HARDWARE_ALPHA);
            let fraction = curve::HARDWARE_MIN_FRACTION
                + (curve::HARDWARE_MAX_FRACTION - curve::HARDWARE_MIN_FRACTION) * t;
            (fraction, Correction::NEUTRAL)
        }
        Range::BrightGamma => {
            // level 20 is already one increment above neutral
            let t = f64::from(offset + 1) / f64::from(levels::BRIGHT_GAMMA_STEPS);
            let gamma = curve::NEUTRAL + (profile.boost_limit - curve::NEUTRAL) * t;
            (
                curve::HARDWARE_MAX_FRACTION,
                Correction {
                    gamma,
                    brightness: curve::NEUTRAL,
                },
            )
        }
    };

    Mapping {
        level,
        hardware_fraction,
        correction,
    }
}

pub fn hardware_value(fraction: f64, max_brightness: u32) -> u32 {
    (fraction.clamp(0.0, 1.0) * f64::from(max_brightness)).round() as u32
}
