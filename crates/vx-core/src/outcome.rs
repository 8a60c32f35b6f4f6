use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Exit status for user-correctable failures (missing script, missing
/// explicit manifest, command not installed).
pub const USER_ERROR_CODE: i32 = 1;
/// Exit status when an external tool (venv, pip) fails.
pub const TOOL_FAILURE_CODE: i32 = 2;
/// Conventional exit status after a user interrupt (128 + SIGINT).
pub const INTERRUPTED_CODE: i32 = 130;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    /// Exit code carried over from the target when one ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            code: None,
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            code: None,
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            code: None,
            details,
        }
    }

    /// Outcome of a target that actually ran; its exit code is forwarded
    /// verbatim.
    pub fn target_exit(message: impl Into<String>, code: i32, details: Value) -> Self {
        Self {
            status: if code == 0 {
                CommandStatus::Ok
            } else {
                CommandStatus::Failure
            },
            message: message.into(),
            code: Some(code),
            details,
        }
    }

    /// Process exit code this outcome maps to.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self.status {
            CommandStatus::Ok => 0,
            CommandStatus::UserError => USER_ERROR_CODE,
            CommandStatus::Failure => self.code.unwrap_or(TOOL_FAILURE_CODE),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}

/// Result of a full invocation. Interruption is a first-class variant rather
/// than an error so every caller must decide how to propagate it.
#[derive(Debug)]
pub enum Completion {
    Finished(ExecutionOutcome),
    Interrupted,
}

impl Completion {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Completion::Finished(outcome) => outcome.exit_code(),
            Completion::Interrupted => INTERRUPTED_CODE,
        }
    }
}

/// A condition the user can fix: the message names what was missing and the
/// details may carry a hint. Raised through `anyhow` and converted back into
/// a `UserError` outcome at the dispatch boundary.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct EnvUserError {
    message: String,
    details: Value,
}

impl EnvUserError {
    pub fn new(message: impl Into<String>, details: Value) -> Self {
        Self {
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn into_outcome(self) -> ExecutionOutcome {
        ExecutionOutcome::user_error(self.message, self.details)
    }
}

/// An external tool invocation that failed outright (non-zero exit, killed,
/// or unable to start). Also raised through `anyhow`, converted to a
/// `Failure` outcome at the boundary.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct ToolFailure {
    message: String,
    details: Value,
}

impl ToolFailure {
    pub fn new(message: impl Into<String>, details: Value) -> Self {
        Self {
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn into_outcome(self) -> ExecutionOutcome {
        ExecutionOutcome::failure(self.message, self.details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_maps_to_zero() {
        assert_eq!(ExecutionOutcome::success("ok", json!({})).exit_code(), 0);
    }

    #[test]
    fn user_error_maps_to_one() {
        assert_eq!(
            ExecutionOutcome::user_error("missing", json!({})).exit_code(),
            USER_ERROR_CODE
        );
    }

    #[test]
    fn tool_failure_maps_to_two() {
        assert_eq!(
            ExecutionOutcome::failure("venv failed", json!({})).exit_code(),
            TOOL_FAILURE_CODE
        );
    }

    #[test]
    fn target_exit_codes_are_forwarded_verbatim() {
        let outcome = ExecutionOutcome::target_exit("exited", 7, json!({}));
        assert_eq!(outcome.status, CommandStatus::Failure);
        assert_eq!(outcome.exit_code(), 7);

        let ok = ExecutionOutcome::target_exit("exited", 0, json!({}));
        assert_eq!(ok.status, CommandStatus::Ok);
        assert_eq!(ok.exit_code(), 0);
    }

    #[test]
    fn interruption_maps_to_convention() {
        assert_eq!(Completion::Interrupted.exit_code(), INTERRUPTED_CODE);
    }
}
