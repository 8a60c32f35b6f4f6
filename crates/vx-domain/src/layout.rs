use std::path::{Path, PathBuf};

use crate::identity::EnvironmentId;

/// Name of the executable subdirectory inside a provisioned environment.
#[cfg(windows)]
pub const BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const BIN_DIR: &str = "bin";

#[cfg(windows)]
const INTERPRETER: &str = "python.exe";
#[cfg(not(windows))]
const INTERPRETER: &str = "python";

/// On-disk shape of one environment, derived from its identity. The layout
/// only describes paths; whether anything exists there is the caller's
/// concern.
#[derive(Debug, Clone)]
pub struct EnvironmentLayout {
    root: PathBuf,
}

impl EnvironmentLayout {
    #[must_use]
    pub fn new(env_root: &Path, id: &EnvironmentId) -> Self {
        Self {
            root: env_root.join(id.as_str()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    /// The environment's own interpreter.
    #[must_use]
    pub fn interpreter(&self) -> PathBuf {
        self.bin_dir().join(INTERPRETER)
    }

    /// Candidate file names for an installed command, most specific first.
    #[must_use]
    pub fn command_candidates(&self, name: &str) -> Vec<PathBuf> {
        let bin = self.bin_dir();
        #[cfg(windows)]
        {
            vec![
                bin.join(format!("{name}.exe")),
                bin.join(format!("{name}.cmd")),
                bin.join(format!("{name}.bat")),
                bin.join(name),
            ]
        }
        #[cfg(not(windows))]
        {
            vec![bin.join(name)]
        }
    }
}
