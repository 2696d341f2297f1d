use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as RandrExt;
use x11rb::rust_connection::RustConnection;

use crate::backend::{DisplayBackend, DisplayServerKind};
use crate::constants::x11;
use crate::error::{BrightnessError, Result};
use crate::mapper::Correction;
use crate::process::CommandRunner;

/// Source of the primary output name
pub trait OutputQuery {
    /// Name of the output flagged primary, `None` when no output is
    fn primary_output(&self) -> Result<Option<String>>;
}

/// Asks the X server through the RandR extension
#[derive(Debug, Default, Clone, Copy)]
pub struct RandrQuery;

impl OutputQuery for RandrQuery {
    #[tracing::instrument(skip(self))]
    fn primary_output(&self) -> Result<Option<String>> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| BrightnessError::X11(format!("screen {screen_num} missing from setup")))?
            .root;

        let version = conn
            .randr_query_version(x11::RANDR_MAJOR, x11::RANDR_MINOR)?
            .reply()?;
        debug!(
            major = version.major_version,
            minor = version.minor_version,
            "RandR available"
        );

        let primary = conn.randr_get_output_primary(root)?.reply()?.output;
        if primary == x11rb::NONE {
            return Ok(None);
        }

        let info = conn
            .randr_get_output_info(primary, x11rb::CURRENT_TIME)?
            .reply()?;
        let name = String::from_utf8_lossy(&info.name).into_owned();
        Ok((!name.is_empty()).then_some(name))
    }
}

/// X11 backend: `xrandr --gamma/--brightness` against the primary output
pub struct X11Backend<R, Q> {
    runner: R,
    query: Q,
    /// Primary output, looked up once per invocation
    primary: Option<String>,
}

impl<R: CommandRunner, Q: OutputQuery> X11Backend<R, Q> {
    pub fn new(runner: R, query: Q) -> Self {
        Self {
            runner,
            query,
            primary: None,
        }
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    fn primary_output(&mut self) -> Result<&str> {
        if self.primary.is_none() {
            let name = self
                .query
                .primary_output()?
                .ok_or(BrightnessError::NoPrimaryMonitor)?;
            info!(output = %name, "resolved primary output");
            self.primary = Some(name);
        }
        self.primary.as_deref().ok_or(BrightnessError::NoPrimaryMonitor)
    }
}

fn xrandr_args(output: &str, correction: Correction) -> Vec<String> {
    let g = format!("{:.3}", correction.gamma);
    vec![
        "--output".to_string(),
        output.to_string(),
        "--gamma".to_string(),
        format!("{g}:{g}:{g}"),
        "--brightness".to_string(),
        format!("{:.3}", correction.brightness),
    ]
}

impl<R: CommandRunner, Q: OutputQuery> DisplayBackend for X11Backend<R, Q> {
    fn kind(&self) -> DisplayServerKind {
        DisplayServerKind::X11
    }

    fn resolve_target(&mut self) -> Result<()> {
        self.primary_output().map(|_| ())
    }

    fn apply(&mut self, correction: Correction) -> Result<()> {
        let output = self.primary_output()?.to_string();
        let args = xrandr_args(&output, correction);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run(x11::XRANDR, &args)?;
        debug!(output = %output, gamma = correction.gamma, brightness = correction.brightness, "applied xrandr correction");
        Ok(())
    }
}
