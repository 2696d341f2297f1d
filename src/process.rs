//! Checked external command execution

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{BrightnessError, Result};

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the backends and the processes they drive
pub trait CommandRunner {
    /// Run to completion; a non-zero exit becomes [`BrightnessError::CommandFailed`]
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Start a long-lived process and return without waiting for it
    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        (**self).run(program, args)
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<()> {
        (**self).spawn_detached(program, args)
    }
}

/// Runs real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!(program, ?args, "running command");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| BrightnessError::CommandSpawn {
                program: program.to_string(),
                source,
            })?;

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        };
        trace!(program, stdout = %captured.stdout, stderr = %captured.stderr, "command finished");

        if output.status.success() {
            Ok(captured)
        } else {
            Err(BrightnessError::CommandFailed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: captured.stderr,
            })
        }
    }

    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<()> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| BrightnessError::CommandSpawn {
                program: program.to_string(),
                source,
            })?;
        debug!(program, pid = child.id(), "spawned background process");
        Ok(())
    }
}

/// Call `ready` every `interval` until it returns true or `timeout` elapses
///
/// Returns whether readiness was observed. `ready` is always called at least once.
pub fn poll_until(timeout: Duration, interval: Duration, mut ready: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if ready() {
            debug!(attempts, "ready");
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            debug!(attempts, "gave up waiting");
            return false;
        }
        thread::sleep(interval.min(deadline - now));
    }
}
