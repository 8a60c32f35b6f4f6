use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use vx_core::{
    CleanRequest, CommandContext, CommandStatus, Completion, ExecutionOutcome, GlobalOptions,
    RunRequest, TargetMode,
};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = VxCli::parse();
    init_tracing(cli.verbose);
    vx_core::install_interrupt_handler().map_err(|err| eyre!("{err:?}"))?;

    let global = GlobalOptions {
        verbose: cli.verbose,
    };
    let ctx = CommandContext::new(&global).map_err(|err| eyre!("{err:?}"))?;

    let code = if cli.clean {
        let request = build_clean_request(&cli);
        let outcome = vx_core::clean_environment(&ctx, &request).map_err(|err| eyre!("{err:?}"))?;
        emit_clean(&outcome)
    } else {
        let request = build_run_request(&cli);
        let completion = vx_core::run_target(&ctx, &request).map_err(|err| eyre!("{err:?}"))?;
        emit_completion(&cli, &completion)
    };

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = format!("vx={level},vx_core={level},vx_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_clean(outcome: &ExecutionOutcome) -> i32 {
    match outcome.status {
        CommandStatus::Ok => println!("{}", outcome.message),
        CommandStatus::UserError | CommandStatus::Failure => {
            eprintln!("vx: {}", outcome.message);
        }
    }
    outcome.exit_code()
}

fn emit_completion(cli: &VxCli, completion: &Completion) -> i32 {
    let code = completion.exit_code();
    let Completion::Finished(outcome) = completion else {
        eprintln!("vx: interrupted");
        return code;
    };

    match outcome.status {
        CommandStatus::Ok => {}
        CommandStatus::UserError | CommandStatus::Failure => {
            if is_passthrough(&outcome.details) {
                // The target already wrote its own diagnostics; stay out of
                // the way unless the user has nothing else to go on.
                if cli.verbose == 0 {
                    eprintln!("vx: target failed; re-run with --verbose for diagnostics");
                }
            } else {
                eprintln!("vx: {}", outcome.message);
                if let Some(hint) = hint_from_details(&outcome.details) {
                    eprintln!("hint: {hint}");
                }
            }
        }
    }
    code
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn is_passthrough(details: &Value) -> bool {
    details
        .as_object()
        .and_then(|map| map.get("passthrough"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn target_mode(cli: &VxCli) -> TargetMode {
    if cli.pip {
        TargetMode::Package
    } else {
        TargetMode::Script
    }
}

fn build_clean_request(cli: &VxCli) -> CleanRequest {
    CleanRequest {
        target: cli.target.clone(),
        mode: target_mode(cli),
    }
}

fn build_run_request(cli: &VxCli) -> RunRequest {
    RunRequest {
        target: cli.target.clone(),
        args: cli.args.clone(),
        mode: target_mode(cli),
        reset: cli.reset,
        run_once: cli.run_once,
        deps: cli.deps.clone(),
        module: cli.module.clone(),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "vx",
    author,
    version,
    about = "Run scripts and tools inside per-target isolated environments",
    long_about = "Each target gets its own environment keyed by a stable digest, provisioned \
                  on first use and reused afterwards.",
    after_help = "Examples:\n  vx script.py --flag\n  vx -p -m httpie http example.org\n  vx --clean script.py\n"
)]
struct VxCli {
    #[arg(
        short,
        long,
        conflicts_with_all = ["reset", "run_once"],
        help = "Remove the target's environment, then exit"
    )]
    clean: bool,
    #[arg(short, long, help = "Reinstall dependencies/package before running")]
    reset: bool,
    #[arg(
        short = 'o',
        long = "run-once",
        help = "Delete the environment after this run"
    )]
    run_once: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)")]
    verbose: u8,
    #[arg(
        short,
        long,
        help = "Package mode: treat TARGET as an installable package/command name"
    )]
    pip: bool,
    #[arg(
        short,
        long,
        value_name = "NAME",
        requires = "pip",
        help = "Installable package name when it differs from the command"
    )]
    module: Option<String>,
    #[arg(
        short,
        long,
        value_name = "PATH",
        conflicts_with = "pip",
        help = "Dependency manifest override (script mode)"
    )]
    deps: Option<PathBuf>,
    #[arg(value_name = "TARGET", help = "Script path, or command name with --pip")]
    target: String,
    #[arg(
        value_name = "ARG",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Arguments forwarded to the target"
    )]
    args: Vec<String>,
}
