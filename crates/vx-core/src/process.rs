use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

#[cfg(unix)]
const SIGINT: i32 = 2;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Installs the Ctrl-C handler. The handler only records the request; child
/// processes in the foreground group receive the signal themselves, and each
/// blocking step checks the flag after its child returns.
///
/// # Errors
/// Returns an error if a handler is already installed for this process.
pub fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))
        .context("failed to install interrupt handler")
}

pub(crate) fn interrupt_requested() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// How a child process finished: a normal exit code, a fatal signal, or a
/// user interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDisposition {
    Code(i32),
    Signaled(i32),
    Interrupted,
}

impl ExitDisposition {
    fn from_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        if let Some(signal) = status.signal() {
            return if signal == SIGINT {
                ExitDisposition::Interrupted
            } else {
                ExitDisposition::Signaled(signal)
            };
        }
        ExitDisposition::Code(status.code().unwrap_or(-1))
    }

    /// Shell-convention exit code for this disposition.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            ExitDisposition::Code(code) => code,
            ExitDisposition::Signaled(signal) => 128 + signal,
            ExitDisposition::Interrupted => crate::outcome::INTERRUPTED_CODE,
        }
    }

    #[must_use]
    pub fn success(self) -> bool {
        matches!(self, ExitDisposition::Code(0))
    }

    #[must_use]
    pub fn interrupted(self) -> bool {
        matches!(self, ExitDisposition::Interrupted)
    }
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub exit: ExitDisposition,
    pub stdout: String,
    pub stderr: String,
}

/// Execute a program and capture stdout/stderr.
///
/// # Errors
/// Returns an error when the program cannot be spawned.
pub(crate) fn run_captured(
    program: &Path,
    args: &[String],
    envs: &[(String, String)],
    cwd: &Path,
) -> Result<RunOutput> {
    let output = configured_command(program, args, envs, cwd)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("failed to start {}", program.display()))?;
    Ok(RunOutput {
        exit: ExitDisposition::from_status(output.status),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Execute a program with inherited stdio, suspending until it finishes.
///
/// # Errors
/// Returns an error when the program cannot be spawned.
pub(crate) fn run_inherited(
    program: &Path,
    args: &[String],
    envs: &[(String, String)],
    cwd: &Path,
) -> Result<RunOutput> {
    let status = configured_command(program, args, envs, cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to start {}", program.display()))?;
    Ok(RunOutput {
        exit: ExitDisposition::from_status(status),
        stdout: String::new(),
        stderr: String::new(),
    })
}

fn configured_command(
    program: &Path,
    args: &[String],
    envs: &[(String, String)],
    cwd: &Path,
) -> Command {
    let mut command = Command::new(program);
    command.args(args);
    for (key, value) in envs {
        command.env(key, value);
    }
    command.current_dir(cwd);
    command
}
