//! The four user operations
//!
//! Every operation runs the same sequence under the state lock:
//! load the persisted level, pick the next one, map it, write the backlight,
//! apply the software correction, then persist. Persistence happens only after
//! both writes succeeded, so the stored level always describes something that
//! was actually applied. If the process dies between the physical writes and
//! the save, the screen reflects the new level while the file still holds the
//! old one; the next invocation simply starts from the stale value.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::backend::{self, DisplayBackend};
use crate::backlight::BacklightDevice;
use crate::config::Config;
use crate::error::{BrightnessError, Result};
use crate::level::BrightnessLevel;
use crate::mapper::{self, Mapping};
use crate::state::LevelStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Full hardware brightness, no correction
    Max,
    /// Lowest level: hardware minimum plus maximum software dimming
    Min,
    Increase,
    Decrease,
}

impl FromStr for Operation {
    type Err = BrightnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            "increase" | "up" | "+" => Ok(Self::Increase),
            "decrease" | "down" | "-" => Ok(Self::Decrease),
            other => Err(BrightnessError::InvalidOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        };
        write!(f, "{name}")
    }
}

pub struct Controller<B> {
    backend: B,
    device: BacklightDevice,
    store: LevelStore,
}

/// Resolve everything `config` describes: display server, backlight, state file
pub fn open(config: &Config) -> Result<Controller<Box<dyn DisplayBackend>>> {
    let kind = config.backend.resolve()?;
    let device = config.locator().locate()?;
    let backend = backend::create(kind, &config.wayland);
    Ok(Controller::new(backend, device, config.state_store()))
}

impl<B: DisplayBackend> Controller<B> {
    pub fn new(backend: B, device: BacklightDevice, store: LevelStore) -> Self {
        Self {
            backend,
            device,
            store,
        }
    }

    pub fn device(&self) -> &BacklightDevice {
        &self.device
    }

    /// Persisted level (default when nothing valid is stored)
    pub fn current_level(&self) -> BrightnessLevel {
        self.store.load()
    }

    pub fn run(&mut self, operation: Operation) -> Result<Mapping> {
        info!(%operation, "running operation");
        match operation {
            Operation::Max => self.set_max(),
            Operation::Min => self.set_min(),
            Operation::Increase => self.step_up(),
            Operation::Decrease => self.step_down(),
        }
    }

    pub fn set_max(&mut self) -> Result<Mapping> {
        self.transition(|_| BrightnessLevel::HARDWARE_MAX)
    }

    pub fn set_min(&mut self) -> Result<Mapping> {
        self.transition(|_| BrightnessLevel::MIN)
    }

    pub fn step_up(&mut self) -> Result<Mapping> {
        self.transition(BrightnessLevel::step_up)
    }

    pub fn step_down(&mut self) -> Result<Mapping> {
        self.transition(BrightnessLevel::step_down)
    }

    /// Jump straight to `level`
    pub fn set_level(&mut self, level: BrightnessLevel) -> Result<Mapping> {
        self.transition(|_| level)
    }

    fn transition(&mut self, next: impl FnOnce(BrightnessLevel) -> BrightnessLevel) -> Result<Mapping> {
        let _lock = self.store.lock()?;
        let current = self.store.load();
        let level = next(current);
        debug!(from = %current, to = %level, "level transition");
        self.apply_and_persist(level)
    }

    fn apply_and_persist(&mut self, level: BrightnessLevel) -> Result<Mapping> {
        let mapping = mapper::map(level, self.backend.kind());

        // fail on an unusable backend before anything physical changes
        self.backend.resolve_target()?;

        let raw = self.device.write_fraction(mapping.hardware_fraction)?;
        self.backend.apply(mapping.correction)?;
        self.store.save(level)?;

        info!(
            level = %level,
            range = ?mapping.range(),
            device = %self.device.name(),
            raw,
            gamma = mapping.correction.gamma,
            brightness = mapping.correction.brightness,
            "applied brightness level"
        );
        Ok(mapping)
    }
}
