//! Ordinal brightness control spanning software dimming, the hardware
//! backlight and software boosting, on X11 or Wayland.

#![forbid(unsafe_code)]

pub mod backend;
pub mod backlight;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod level;
pub mod mapper;
pub mod process;
pub mod state;

pub use backend::{DisplayBackend, DisplayServerKind};
pub use config::Config;
pub use controller::{Controller, Operation};
pub use error::{BrightnessError, Result};
pub use level::{BrightnessLevel, Range};
pub use mapper::{Correction, Mapping};
