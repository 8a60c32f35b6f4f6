use std::fs;
use std::io;

use serde_json::json;
use tracing::{info, warn};

use vx_domain::EnvironmentLayout;

use crate::outcome::ExecutionOutcome;

/// Remove an environment directory. Already-absent directories are a
/// successful no-op.
pub(crate) fn remove_environment(layout: &EnvironmentLayout) -> ExecutionOutcome {
    let root = layout.root();
    match fs::remove_dir_all(root) {
        Ok(()) => {
            info!(env = %root.display(), "removed environment");
            ExecutionOutcome::success(
                format!("removed environment {}", root.display()),
                json!({ "env": root.display().to_string(), "removed": true }),
            )
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => ExecutionOutcome::success(
            format!("no environment at {}", root.display()),
            json!({ "env": root.display().to_string(), "removed": false }),
        ),
        Err(err) => ExecutionOutcome::failure(
            format!("failed to remove environment {}: {err}", root.display()),
            json!({ "env": root.display().to_string() }),
        ),
    }
}

/// Run-once teardown: best effort, never changes the run's own outcome.
pub(crate) fn teardown(layout: &EnvironmentLayout) {
    let root = layout.root();
    match fs::remove_dir_all(root) {
        Ok(()) => info!(env = %root.display(), "removed environment after run"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(env = %root.display(), %err, "run-once teardown failed"),
    }
}
