use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::{DisplayBackend, DisplayServerKind};
use crate::constants::wayland;
use crate::error::{BrightnessError, Result};
use crate::mapper::Correction;
use crate::process::{CommandRunner, poll_until};

/// Wayland backend: `wl-gammarelay-rs` properties set through `busctl --user`
///
/// The daemon is started on demand and left running for later invocations.
pub struct WaylandBackend<R> {
    runner: R,
    poll_interval: Duration,
    startup_timeout: Duration,
    ready: bool,
}

impl<R: CommandRunner> WaylandBackend<R> {
    pub fn new(runner: R, poll_interval: Duration, startup_timeout: Duration) -> Self {
        Self {
            runner,
            poll_interval,
            startup_timeout,
            ready: false,
        }
    }

    /// Daemon answers on the bus
    fn probe(&self) -> bool {
        self.runner
            .run(
                wayland::BUSCTL,
                &[
                    "--user",
                    "get-property",
                    wayland::BUS_NAME,
                    wayland::OBJECT_PATH,
                    wayland::INTERFACE,
                    wayland::BRIGHTNESS_PROPERTY,
                ],
            )
            .inspect_err(|e| debug!(error = %e, "gamma daemon probe failed"))
            .is_ok()
    }

    fn set_property(&self, property: &str, value: f64) -> Result<()> {
        let value = format!("{value:.3}");
        self.runner.run(
            wayland::BUSCTL,
            &[
                "--user",
                "set-property",
                wayland::BUS_NAME,
                wayland::OBJECT_PATH,
                wayland::INTERFACE,
                property,
                "d",
                &value,
            ],
        )?;
        Ok(())
    }
}

impl<R: CommandRunner> DisplayBackend for WaylandBackend<R> {
    fn kind(&self) -> DisplayServerKind {
        DisplayServerKind::Wayland
    }

    fn resolve_target(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }
        if self.probe() {
            debug!(daemon = wayland::DAEMON, "gamma daemon already running");
            self.ready = true;
            return Ok(());
        }

        info!(daemon = wayland::DAEMON, "starting gamma daemon");
        self.runner
            .spawn_detached(wayland::DAEMON, &[wayland::DAEMON_RUN_ARG])?;

        if poll_until(self.startup_timeout, self.poll_interval, || self.probe()) {
            info!(daemon = wayland::DAEMON, "gamma daemon ready");
            self.ready = true;
            Ok(())
        } else {
            warn!(
                daemon = wayland::DAEMON,
                timeout_ms = self.startup_timeout.as_millis() as u64,
                "gamma daemon never became ready"
            );
            Err(BrightnessError::BackendStartup {
                daemon: wayland::DAEMON.to_string(),
                timeout_ms: self.startup_timeout.as_millis() as u64,
            })
        }
    }

    fn apply(&mut self, correction: Correction) -> Result<()> {
        self.resolve_target()?;
        self.set_property(wayland::BRIGHTNESS_PROPERTY, correction.brightness)?;
        self.set_property(wayland::GAMMA_PROPERTY, correction.gamma)?;
        debug!(gamma = correction.gamma, brightness = correction.brightness, "applied gamma daemon correction");
        Ok(())
    }
}
