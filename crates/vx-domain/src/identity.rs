use std::fmt;

use sha2::{Digest, Sha256};

/// Prefix hashed into package-mode identities so that a package named like a
/// script path can never collide with that script's environment.
const PACKAGE_NAMESPACE: &str = "pkg::";

/// Storage key for an isolated environment: a SHA-256 digest rendered as
/// lowercase hex. Deriving an identity never touches the filesystem, so the
/// same input text maps to the same key on every platform and in every
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvironmentId(String);

impl EnvironmentId {
    /// Identity for a script, keyed by its absolutized path.
    #[must_use]
    pub fn for_script(absolute_path: &str) -> Self {
        Self::digest(absolute_path)
    }

    /// Identity for an installable package, keyed by its namespaced name.
    #[must_use]
    pub fn for_package(name: &str) -> Self {
        Self::digest(&format!("{PACKAGE_NAMESPACE}{name}"))
    }

    fn digest(input: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
