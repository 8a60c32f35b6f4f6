use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{Config, EnvSnapshot, GlobalOptions};

/// Immutable per-invocation state: parsed global options, the resolved
/// configuration, and the working directory captured once at startup. Every
/// operation receives this explicitly; there is no process-wide mutable
/// state.
pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    cwd: PathBuf,
}

impl<'a> CommandContext<'a> {
    /// Builds a context from the current process environment.
    ///
    /// # Errors
    /// Returns an error if the environment root or working directory cannot
    /// be resolved.
    pub fn new(global: &'a GlobalOptions) -> Result<Self> {
        let snapshot = EnvSnapshot::capture();
        let config = Config::from_snapshot(&snapshot)?;
        let cwd = env::current_dir().context("working directory is not accessible")?;
        Ok(Self {
            global,
            config,
            cwd,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.global.verbose > 0
    }

    #[cfg(test)]
    pub(crate) fn testing(global: &'a GlobalOptions, config: Config, cwd: PathBuf) -> Self {
        Self {
            global,
            config,
            cwd,
        }
    }
}
