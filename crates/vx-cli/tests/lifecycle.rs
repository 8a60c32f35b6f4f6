mod common;

use common::{env_dirs, find_python, vx_cmd, write_script};

#[test]
fn clean_on_a_never_created_identity_is_a_no_op() {
    let temp = tempfile::tempdir().expect("tempdir");
    let work = tempfile::tempdir().expect("workdir");
    let script = write_script(work.path(), "tool.py", "print('hi')\n");

    let assert = vx_cmd(temp.path())
        .current_dir(work.path())
        .args(["--clean", script.to_str().expect("utf8 path")])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(
        stdout.contains("no environment"),
        "expected no-op report, got: {stdout}"
    );
}

#[test]
fn target_exit_code_is_forwarded() {
    let Some(python) = find_python() else {
        eprintln!("skipping exit code test (python not found)");
        return;
    };
    let temp = tempfile::tempdir().expect("tempdir");
    let work = tempfile::tempdir().expect("workdir");
    let script = write_script(work.path(), "fails.py", "import sys\nsys.exit(7)\n");

    let assert = vx_cmd(temp.path())
        .current_dir(work.path())
        .env("VX_PYTHON", &python)
        .arg(script.to_str().expect("utf8 path"))
        .assert()
        .code(7);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(
        stderr.contains("--verbose"),
        "non-verbose failures should hint at --verbose, got: {stderr}"
    );
    assert_eq!(env_dirs(temp.path()).len(), 1, "environment should persist");
}

#[test]
fn environment_is_reused_across_invocations() {
    let Some(python) = find_python() else {
        eprintln!("skipping reuse test (python not found)");
        return;
    };
    let temp = tempfile::tempdir().expect("tempdir");
    let work = tempfile::tempdir().expect("workdir");
    let script = write_script(work.path(), "ok.py", "print('ok')\n");
    let script_arg = script.to_str().expect("utf8 path");

    let first = vx_cmd(temp.path())
        .current_dir(work.path())
        .env("VX_PYTHON", &python)
        .arg(script_arg)
        .assert()
        .success();
    let first_stderr = String::from_utf8_lossy(&first.get_output().stderr).to_string();
    assert!(
        first_stderr.contains("creating environment"),
        "first run provisions, got: {first_stderr}"
    );

    let second = vx_cmd(temp.path())
        .current_dir(work.path())
        .env("VX_PYTHON", &python)
        .arg(script_arg)
        .assert()
        .success();
    let second_stderr = String::from_utf8_lossy(&second.get_output().stderr).to_string();
    assert!(
        !second_stderr.contains("creating environment"),
        "second run must reuse the environment, got: {second_stderr}"
    );
    assert_eq!(env_dirs(temp.path()).len(), 1);
}

#[test]
fn run_once_removes_the_environment_even_when_the_target_fails() {
    let Some(python) = find_python() else {
        eprintln!("skipping run-once test (python not found)");
        return;
    };
    let temp = tempfile::tempdir().expect("tempdir");
    let work = tempfile::tempdir().expect("workdir");
    let script = write_script(work.path(), "fails.py", "import sys\nsys.exit(3)\n");

    vx_cmd(temp.path())
        .current_dir(work.path())
        .env("VX_PYTHON", &python)
        .args(["--run-once", script.to_str().expect("utf8 path")])
        .assert()
        .code(3);
    assert!(
        env_dirs(temp.path()).is_empty(),
        "run-once must tear the environment down"
    );
}

#[test]
fn create_run_clean_round_trip_leaves_nothing_behind() {
    let Some(python) = find_python() else {
        eprintln!("skipping round-trip test (python not found)");
        return;
    };
    let temp = tempfile::tempdir().expect("tempdir");
    let work = tempfile::tempdir().expect("workdir");
    let script = write_script(work.path(), "ok.py", "print('ok')\n");
    let script_arg = script.to_str().expect("utf8 path");

    vx_cmd(temp.path())
        .current_dir(work.path())
        .env("VX_PYTHON", &python)
        .arg(script_arg)
        .assert()
        .success();
    assert_eq!(env_dirs(temp.path()).len(), 1);

    vx_cmd(temp.path())
        .current_dir(work.path())
        .args(["--clean", script_arg])
        .assert()
        .success();
    assert!(env_dirs(temp.path()).is_empty());
}

#[test]
fn missing_default_manifest_warns_but_still_runs() {
    let Some(python) = find_python() else {
        eprintln!("skipping manifest warning test (python not found)");
        return;
    };
    let temp = tempfile::tempdir().expect("tempdir");
    let work = tempfile::tempdir().expect("workdir");
    let script = write_script(work.path(), "ok.py", "print('ok')\n");

    let assert = vx_cmd(temp.path())
        .current_dir(work.path())
        .env("VX_PYTHON", &python)
        .arg(script.to_str().expect("utf8 path"))
        .assert()
        .success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(
        stderr.contains("requirements.txt"),
        "expected the missing-manifest warning, got: {stderr}"
    );
}

#[test]
fn missing_explicit_manifest_is_fatal() {
    let Some(python) = find_python() else {
        eprintln!("skipping explicit manifest test (python not found)");
        return;
    };
    let temp = tempfile::tempdir().expect("tempdir");
    let work = tempfile::tempdir().expect("workdir");
    let script = write_script(work.path(), "ok.py", "print('ok')\n");

    let assert = vx_cmd(temp.path())
        .current_dir(work.path())
        .env("VX_PYTHON", &python)
        .args(["--deps", "custom.txt", script.to_str().expect("utf8 path")])
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(
        stderr.contains("custom.txt"),
        "expected the missing manifest to be named, got: {stderr}"
    );
}

#[test]
fn missing_script_is_a_user_error() {
    let Some(python) = find_python() else {
        eprintln!("skipping missing script test (python not found)");
        return;
    };
    let temp = tempfile::tempdir().expect("tempdir");
    let work = tempfile::tempdir().expect("workdir");

    vx_cmd(temp.path())
        .current_dir(work.path())
        .env("VX_PYTHON", &python)
        .arg("does-not-exist.py")
        .assert()
        .code(1);
}
