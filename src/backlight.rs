//! Sysfs backlight discovery and control

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::constants::sysfs;
use crate::error::{BrightnessError, Result};
use crate::mapper;

/// A writable backlight, `max_brightness` read once when opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklightDevice {
    path: PathBuf,
    max_brightness: u32,
}

fn read_u32(path: &Path) -> Result<u32> {
    let contents = fs::read_to_string(path).map_err(|e| BrightnessError::io(path, e))?;
    contents
        .trim()
        .parse()
        .map_err(|_| BrightnessError::InvalidSysfsValue {
            path: path.to_path_buf(),
            content: contents.trim().to_string(),
        })
}

impl BacklightDevice {
    /// Open the device directory at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let max_path = path.join(sysfs::MAX_BRIGHTNESS_FILE);
        let max_brightness = read_u32(&max_path)?;
        if max_brightness == 0 {
            return Err(BrightnessError::InvalidSysfsValue {
                path: max_path,
                content: "0".to_string(),
            });
        }
        Ok(Self {
            path,
            max_brightness,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    fn control_path(&self) -> PathBuf {
        self.path.join(sysfs::BRIGHTNESS_FILE)
    }

    /// Current raw value of the control file
    pub fn read_brightness(&self) -> Result<u32> {
        read_u32(&self.control_path())
    }

    /// Write a raw value, clamped to `max_brightness`
    pub fn write_raw(&self, value: u32) -> Result<()> {
        let value = value.min(self.max_brightness);
        let path = self.control_path();
        fs::write(&path, value.to_string()).map_err(|e| BrightnessError::io(&path, e))?;
        debug!(device = %self.name(), value, "wrote backlight");
        Ok(())
    }

    /// Write `round(fraction * max_brightness)`, returning the raw value written
    pub fn write_fraction(&self, fraction: f64) -> Result<u32> {
        let value = mapper::hardware_value(fraction, self.max_brightness);
        self.write_raw(value)?;
        Ok(value)
    }
}

/// Finds the first usable device among an ordered list of names under a sysfs root
#[derive(Debug, Clone)]
pub struct Locator {
    root: PathBuf,
    candidates: Vec<String>,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(
            sysfs::BACKLIGHT_ROOT,
            sysfs::DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl Locator {
    pub fn new(root: impl Into<PathBuf>, candidates: Vec<String>) -> Self {
        Self {
            root: root.into(),
            candidates,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    fn is_enumerable(dir: &Path) -> bool {
        dir.join(sysfs::BRIGHTNESS_FILE).exists() && dir.join(sysfs::MAX_BRIGHTNESS_FILE).exists()
    }

    pub fn locate(&self) -> Result<BacklightDevice> {
        debug!(root = %self.root.display(), candidates = ?self.candidates, "searching for backlight");
        for name in &self.candidates {
            let dir = self.root.join(name);
            if !Self::is_enumerable(&dir) {
                continue;
            }
            match BacklightDevice::open(&dir) {
                Ok(device) => {
                    info!(device = %name, max_brightness = device.max_brightness(), "using backlight device");
                    return Ok(device);
                }
                Err(e) => warn!(device = %name, error = %e, "skipping unusable backlight device"),
            }
        }

        Err(BrightnessError::DeviceNotFound {
            root: self.root.clone(),
            candidates: self.candidates.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fresh directory under the system temp dir, unique per call
    pub fn scratch_dir(tag: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let dir = std::env::temp_dir().join(format!(
            "brightness-levels-{tag}-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Fake sysfs device directory
    pub fn fake_device(root: &Path, name: &str, max: &str) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("max_brightness"), max).unwrap();
        std::fs::write(dir.join("brightness"), "0\n").unwrap();
        dir
    }
}
