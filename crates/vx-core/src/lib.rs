#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

mod api;
mod config;
mod context;
mod execute;
mod lifecycle;
mod outcome;
mod process;
mod provision;

pub use api::{clean_environment, run_target, CleanRequest, RunRequest, TargetMode};
pub use config::{Config, EnvRoot, GlobalOptions, HOME_ENV, PYTHON_ENV};
pub use context::CommandContext;
pub use outcome::{
    CommandStatus, Completion, EnvUserError, ExecutionOutcome, ToolFailure, INTERRUPTED_CODE,
    TOOL_FAILURE_CODE, USER_ERROR_CODE,
};
pub use process::{install_interrupt_handler, ExitDisposition, RunOutput};
