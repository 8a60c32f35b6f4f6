use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};

/// Overrides the `~/.vx` root; environments then live in `$VX_HOME/envs`.
pub const HOME_ENV: &str = "VX_HOME";
/// Overrides discovery of the base interpreter used for provisioning.
pub const PYTHON_ENV: &str = "VX_PYTHON";

const HOME_SUBDIR: &str = ".vx";
const ENVS_SUBDIR: &str = "envs";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub verbose: u8,
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug)]
pub struct Config {
    pub(crate) env_root: EnvRoot,
    pub(crate) base_python: Option<String>,
}

impl Config {
    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self> {
        Ok(Self {
            env_root: resolve_env_root(snapshot)?,
            base_python: snapshot.var(PYTHON_ENV).map(ToOwned::to_owned),
        })
    }

    #[must_use]
    pub fn env_root(&self) -> &EnvRoot {
        &self.env_root
    }

    #[must_use]
    pub fn base_python(&self) -> Option<&str> {
        self.base_python.as_deref()
    }
}

/// Where environments are stored, and which setting chose that location.
#[derive(Debug, Clone)]
pub struct EnvRoot {
    pub path: PathBuf,
    pub source: &'static str,
}

fn resolve_env_root(snapshot: &EnvSnapshot) -> Result<EnvRoot> {
    if let Some(value) = snapshot.var(HOME_ENV) {
        return Ok(EnvRoot {
            path: PathBuf::from(value).join(ENVS_SUBDIR),
            source: HOME_ENV,
        });
    }
    let home = home_dir().ok_or_else(|| anyhow!("home directory not found"))?;
    Ok(EnvRoot {
        path: home.join(HOME_SUBDIR).join(ENVS_SUBDIR),
        source: "home",
    })
}
