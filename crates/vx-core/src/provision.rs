use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info, warn};
use which::which;

use vx_domain::{absolutize, EnvironmentLayout};

use crate::config::PYTHON_ENV;
use crate::context::CommandContext;
use crate::outcome::{EnvUserError, ToolFailure};
use crate::process::{self, ExitDisposition, RunOutput};

/// Conventional manifest filename looked up in the working directory when no
/// explicit override is given.
pub(crate) const DEFAULT_MANIFEST: &str = "requirements.txt";

const STDERR_TAIL_BYTES: usize = 2048;

/// Whether `ensure` found an environment, built one, or was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Provisioned {
    Created,
    Existing,
    Interrupted,
}

/// Whether a single installer step ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    Done,
    Interrupted,
}

/// Ensure the environment directory exists, creating it with the external
/// provisioning tool on first use. Idempotent: an existing directory is left
/// untouched.
pub(crate) fn ensure(ctx: &CommandContext, layout: &EnvironmentLayout) -> Result<Provisioned> {
    if layout.root().exists() {
        debug!(env = %layout.root().display(), "environment already provisioned");
        return Ok(Provisioned::Existing);
    }
    let python = base_interpreter(ctx)?;
    info!(env = %layout.root().display(), "creating environment");
    let args = vec![
        "-m".to_string(),
        "venv".to_string(),
        layout.root().display().to_string(),
    ];
    match run_tool(ctx, &python, &args, "environment creation")? {
        Some(_) => Ok(Provisioned::Created),
        None => Ok(Provisioned::Interrupted),
    }
}

/// Install script-mode dependencies into the environment. The explicit
/// override must exist; the conventional default may be absent, which only
/// warns.
pub(crate) fn install_script_deps(
    ctx: &CommandContext,
    layout: &EnvironmentLayout,
    deps_override: Option<&Path>,
    upgrade: bool,
) -> Result<StepOutcome> {
    let Some(manifest) = resolve_manifest(ctx.cwd(), deps_override)? else {
        return Ok(StepOutcome::Done);
    };
    info!(manifest = %manifest.display(), upgrade, "installing dependencies");
    let mut args = pip_install_args(upgrade);
    args.push("-r".to_string());
    args.push(manifest.display().to_string());
    match run_tool(ctx, &layout.interpreter(), &args, "dependency install")? {
        Some(_) => Ok(StepOutcome::Done),
        None => Ok(StepOutcome::Interrupted),
    }
}

/// Install (or upgrade) the package that provides a package-mode command.
pub(crate) fn install_package(
    ctx: &CommandContext,
    layout: &EnvironmentLayout,
    package: &str,
    upgrade: bool,
) -> Result<StepOutcome> {
    info!(package, upgrade, "installing package");
    let mut args = pip_install_args(upgrade);
    args.push(package.to_string());
    match run_tool(ctx, &layout.interpreter(), &args, "package install")? {
        Some(_) => Ok(StepOutcome::Done),
        None => Ok(StepOutcome::Interrupted),
    }
}

/// Locate the dependency manifest for a script run. An explicit override
/// that is missing on disk is a fatal user error; a missing default is a
/// warning and the run proceeds without dependencies.
pub(crate) fn resolve_manifest(
    cwd: &Path,
    deps_override: Option<&Path>,
) -> Result<Option<PathBuf>> {
    match deps_override {
        Some(path) => {
            let resolved = absolutize(path, cwd);
            if resolved.is_file() {
                Ok(Some(resolved))
            } else {
                Err(EnvUserError::new(
                    format!("dependency manifest {} not found", resolved.display()),
                    json!({ "manifest": resolved.display().to_string() }),
                )
                .into())
            }
        }
        None => {
            let default = cwd.join(DEFAULT_MANIFEST);
            if default.is_file() {
                Ok(Some(default))
            } else {
                warn!(
                    cwd = %cwd.display(),
                    "no {DEFAULT_MANIFEST} found; continuing without dependencies"
                );
                Ok(None)
            }
        }
    }
}

fn pip_install_args(upgrade: bool) -> Vec<String> {
    let mut args = vec![
        "-m".to_string(),
        "pip".to_string(),
        "install".to_string(),
    ];
    if upgrade {
        args.push("--upgrade".to_string());
    }
    args
}

/// Resolve the base interpreter used to create environments: the explicit
/// override first, then the conventional names on PATH.
fn base_interpreter(ctx: &CommandContext) -> Result<PathBuf> {
    if let Some(explicit) = ctx.config().base_python() {
        return Ok(PathBuf::from(explicit));
    }
    for candidate in ["python3", "python"] {
        if let Ok(path) = which(candidate) {
            debug!(python = %path.display(), "using discovered interpreter");
            return Ok(path);
        }
    }
    Err(ToolFailure::new(
        "no python interpreter found on PATH",
        json!({ "hint": format!("set {PYTHON_ENV} to a python executable") }),
    )
    .into())
}

/// Run one external tool step. `None` means the step was interrupted by the
/// user; a non-zero exit or a spawn failure raises `ToolFailure`. Output is
/// captured unless verbose mode streams it.
fn run_tool(
    ctx: &CommandContext,
    program: &Path,
    args: &[String],
    what: &str,
) -> Result<Option<RunOutput>> {
    debug!(program = %program.display(), ?args, "invoking tool");
    let result = if ctx.verbose() {
        process::run_inherited(program, args, &[], ctx.cwd())
    } else {
        process::run_captured(program, args, &[], ctx.cwd())
    };
    let output = match result {
        Ok(output) => output,
        Err(err) => {
            return Err(ToolFailure::new(format!("{what} failed: {err:#}"), json!({})).into());
        }
    };
    if output.exit.interrupted() || process::interrupt_requested() {
        return Ok(None);
    }
    match output.exit {
        ExitDisposition::Code(0) => Ok(Some(output)),
        ExitDisposition::Code(code) => {
            let stderr = tail(&output.stderr);
            let message = if stderr.is_empty() {
                format!("{what} failed (exit {code})")
            } else {
                format!("{what} failed (exit {code}): {stderr}")
            };
            Err(ToolFailure::new(message, json!({ "code": code, "stderr": stderr })).into())
        }
        ExitDisposition::Signaled(signal) => Err(ToolFailure::new(
            format!("{what} was killed by signal {signal}"),
            json!({ "signal": signal }),
        )
        .into()),
        ExitDisposition::Interrupted => Ok(None),
    }
}

fn tail(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed.to_string();
    }
    let start = trimmed.len() - STDERR_TAIL_BYTES;
    let boundary = trimmed
        .char_indices()
        .map(|(idx, _)| idx)
        .find(|idx| *idx >= start)
        .unwrap_or(start);
    trimmed[boundary..].to_string()
}
