use std::path::Path;

use anyhow::Result;
use serde_json::json;
use tracing::debug;

use vx_domain::EnvironmentLayout;

use crate::context::CommandContext;
use crate::outcome::{Completion, EnvUserError, ExecutionOutcome};
use crate::process::{self, ExitDisposition};

/// Run a script with the environment's own interpreter, forwarding the exit
/// status. The script file must exist.
pub(crate) fn run_script(
    ctx: &CommandContext,
    layout: &EnvironmentLayout,
    script: &Path,
    args: &[String],
) -> Result<Completion> {
    if !script.is_file() {
        return Err(EnvUserError::new(
            format!("script {} not found", script.display()),
            json!({ "script": script.display().to_string() }),
        )
        .into());
    }
    let mut child_args = vec![script.display().to_string()];
    child_args.extend(args.iter().cloned());
    launch(ctx, layout, &layout.interpreter(), &child_args, &script.display().to_string())
}

/// Run an installed command from the environment's executable directory,
/// forwarding the exit status.
pub(crate) fn run_command(
    ctx: &CommandContext,
    layout: &EnvironmentLayout,
    name: &str,
    args: &[String],
) -> Result<Completion> {
    let Some(program) = layout
        .command_candidates(name)
        .into_iter()
        .find(|candidate| candidate.is_file())
    else {
        return Err(EnvUserError::new(
            format!("command `{name}` not found in {}", layout.bin_dir().display()),
            json!({
                "command": name,
                "hint": "pass --module if the package name differs from the command",
            }),
        )
        .into());
    };
    launch(ctx, layout, &program, args, name)
}

fn launch(
    ctx: &CommandContext,
    layout: &EnvironmentLayout,
    program: &Path,
    args: &[String],
    target: &str,
) -> Result<Completion> {
    debug!(program = %program.display(), ?args, "executing target");
    let envs = vec![(
        "VIRTUAL_ENV".to_string(),
        layout.root().display().to_string(),
    )];
    let output = process::run_inherited(program, args, &envs, ctx.cwd())?;
    if output.exit.interrupted() || process::interrupt_requested() {
        return Ok(Completion::Interrupted);
    }
    let code = match output.exit {
        ExitDisposition::Code(code) => code,
        ExitDisposition::Signaled(signal) => {
            debug!(signal, "target killed by signal");
            output.exit.code()
        }
        ExitDisposition::Interrupted => unreachable!("handled above"),
    };
    let outcome = ExecutionOutcome::target_exit(
        format!("{target} exited with {code}"),
        code,
        json!({
            "target": target,
            "code": code,
            "passthrough": true,
        }),
    );
    Ok(Completion::Finished(outcome))
}
