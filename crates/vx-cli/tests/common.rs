#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

/// A `vx` invocation whose environments live under the given scratch home.
pub fn vx_cmd(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("vx");
    cmd.env("VX_HOME", home);
    cmd
}

/// Locate an interpreter able to provision environments; tests that need
/// one skip when none is available.
pub fn find_python() -> Option<String> {
    for candidate in ["python3", "python"] {
        let probe = std::process::Command::new(candidate)
            .args(["-c", "import venv, ensurepip"])
            .output();
        if probe.is_ok_and(|output| output.status.success()) {
            return Some(candidate.to_string());
        }
    }
    None
}

/// Environment directories provisioned under the scratch home.
pub fn env_dirs(home: &Path) -> Vec<PathBuf> {
    let envs = home.join("envs");
    let Ok(entries) = fs::read_dir(envs) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect()
}

pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write script");
    path
}
