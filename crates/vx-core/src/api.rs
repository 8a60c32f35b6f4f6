use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use vx_domain::{absolutize, EnvironmentId, EnvironmentLayout};

use crate::context::CommandContext;
use crate::execute;
use crate::lifecycle;
use crate::outcome::{Completion, EnvUserError, ExecutionOutcome, ToolFailure};
use crate::provision::{self, Provisioned, StepOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Script,
    Package,
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub target: String,
    pub args: Vec<String>,
    pub mode: TargetMode,
    pub reset: bool,
    pub run_once: bool,
    /// Script mode only: dependency manifest override.
    pub deps: Option<PathBuf>,
    /// Package mode only: installable name when it differs from the command.
    pub module: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub target: String,
    pub mode: TargetMode,
}

enum ResolvedTarget {
    Script {
        layout: EnvironmentLayout,
        path: PathBuf,
    },
    Package {
        layout: EnvironmentLayout,
        name: String,
    },
}

impl ResolvedTarget {
    fn layout(&self) -> &EnvironmentLayout {
        match self {
            ResolvedTarget::Script { layout, .. } | ResolvedTarget::Package { layout, .. } => {
                layout
            }
        }
    }
}

/// Remove the target's environment and report what happened. Never fails on
/// an environment that was never provisioned.
///
/// # Errors
/// Returns an error only on unexpected filesystem plumbing failures.
pub fn clean_environment(ctx: &CommandContext, request: &CleanRequest) -> Result<ExecutionOutcome> {
    let resolved = resolve_target(ctx, &request.target, request.mode);
    Ok(lifecycle::remove_environment(resolved.layout()))
}

/// Provision the target's environment as needed, execute the target inside
/// it, and apply run-once teardown. User-correctable problems and external
/// tool failures come back as outcomes; interruption is its own variant.
///
/// # Errors
/// Returns an error only for internal failures that map to no outcome.
pub fn run_target(ctx: &CommandContext, request: &RunRequest) -> Result<Completion> {
    match run_flow(ctx, request) {
        Ok(completion) => Ok(completion),
        Err(err) => outcome_from_error(err),
    }
}

fn run_flow(ctx: &CommandContext, request: &RunRequest) -> Result<Completion> {
    let resolved = resolve_target(ctx, &request.target, request.mode);
    let result = provision_and_execute(ctx, request, &resolved);
    // Teardown applies to every disposition of the run, including failures
    // and interrupts; only the never-provisioned case has nothing to do.
    if request.run_once {
        lifecycle::teardown(resolved.layout());
    }
    result
}

fn provision_and_execute(
    ctx: &CommandContext,
    request: &RunRequest,
    resolved: &ResolvedTarget,
) -> Result<Completion> {
    let provisioned = provision::ensure(ctx, resolved.layout())?;
    if provisioned == Provisioned::Interrupted {
        return Ok(Completion::Interrupted);
    }

    if let Some(upgrade) = install_plan(provisioned == Provisioned::Created, request.reset) {
        let step = match resolved {
            ResolvedTarget::Script { layout, .. } => {
                provision::install_script_deps(ctx, layout, request.deps.as_deref(), upgrade)?
            }
            ResolvedTarget::Package { layout, name } => {
                let package = request.module.as_deref().unwrap_or(name);
                provision::install_package(ctx, layout, package, upgrade)?
            }
        };
        if step == StepOutcome::Interrupted {
            return Ok(Completion::Interrupted);
        }
    }

    match resolved {
        ResolvedTarget::Script { layout, path } => {
            execute::run_script(ctx, layout, path, &request.args)
        }
        ResolvedTarget::Package { layout, name } => {
            execute::run_command(ctx, layout, name, &request.args)
        }
    }
}

/// Whether an install step should run, and whether it upgrades. Fresh
/// environments install; existing ones only reinstall on reset, in upgrade
/// mode. An existing environment without reset performs no install at all.
fn install_plan(created: bool, reset: bool) -> Option<bool> {
    if created {
        Some(false)
    } else if reset {
        Some(true)
    } else {
        None
    }
}

fn resolve_target(ctx: &CommandContext, target: &str, mode: TargetMode) -> ResolvedTarget {
    let env_root = &ctx.config().env_root().path;
    match mode {
        TargetMode::Script => {
            let path = absolutize(Path::new(target), ctx.cwd());
            let id = EnvironmentId::for_script(&path.display().to_string());
            debug!(%id, script = %path.display(), "resolved script environment");
            ResolvedTarget::Script {
                layout: EnvironmentLayout::new(env_root, &id),
                path,
            }
        }
        TargetMode::Package => {
            let id = EnvironmentId::for_package(target);
            debug!(%id, package = target, "resolved package environment");
            ResolvedTarget::Package {
                layout: EnvironmentLayout::new(env_root, &id),
                name: target.to_string(),
            }
        }
    }
}

fn outcome_from_error(err: anyhow::Error) -> Result<Completion> {
    let err = match err.downcast::<EnvUserError>() {
        Ok(user) => return Ok(Completion::Finished(user.into_outcome())),
        Err(err) => err,
    };
    match err.downcast::<ToolFailure>() {
        Ok(tool) => Ok(Completion::Finished(tool.into_outcome())),
        Err(err) => Err(err),
    }
}
