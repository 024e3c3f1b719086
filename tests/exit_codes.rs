//! Step ordering and exit-code passthrough, driven through a fake `cmake`.
//!
//! Each test puts a shell-script `cmake` in an otherwise empty `PATH`. The
//! script appends its arguments to a log file so the test can see exactly
//! which steps ran.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::os::unix::process::CommandExt;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

struct Sandbox {
    _dir: tempfile::TempDir,
    project: PathBuf,
    bin: PathBuf,
    log: PathBuf,
}

impl Sandbox {
    /// `configure_exit` / `build_exit` are what the fake cmake returns for
    /// `cmake -S ...` and `cmake --build ...`.
    fn new(configure_exit: i32, build_exit: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project");
        let bin = dir.path().join("bin");
        let log = dir.path().join("cmake.log");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&bin).unwrap();

        fs::write(
            project.join("x.toml"),
            "[tools]\nrequired = [\"cmake\"]\n",
        )
        .unwrap();

        let script = format!(
            r#"#!/bin/sh
echo "$@" >> "{log}"
case "$1" in
  -S) exit {configure_exit} ;;
  --build) exit {build_exit} ;;
esac
exit 0
"#,
            log = log.display()
        );
        write_executable(&bin.join("cmake"), &script);

        Self {
            _dir: dir,
            project,
            bin,
            log,
        }
    }

    fn x(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_x"))
            .arg("--project-root")
            .arg(&self.project)
            .args(args)
            .env("PATH", &self.bin)
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute x")
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(|l| l.split_whitespace().next().unwrap_or("").to_string())
            .collect()
    }
}

fn write_executable(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

#[test]
fn test_all_runs_configure_then_build() {
    let sb = Sandbox::new(0, 0);
    let output = sb.x(&[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(sb.calls(), vec!["-S", "--build"]);
    assert!(sb.project.join("build").is_dir());

    // Every spawned command is echoed first
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("+ cmake -S"));
    assert!(stdout.contains("+ cmake --build"));
}

#[test]
fn test_failed_configure_stops_all_with_same_code() {
    let sb = Sandbox::new(3, 0);
    let output = sb.x(&["all"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(sb.calls(), vec!["-S"]);
}

#[test]
fn test_build_failure_code_passes_through() {
    let sb = Sandbox::new(0, 2);
    let output = sb.x(&["build"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("exit code 2"));
}

#[test]
fn test_rebuild_order() {
    let sb = Sandbox::new(0, 0);
    let build = sb.project.join("build");
    fs::create_dir_all(&build).unwrap();
    fs::write(build.join("stale.o"), "").unwrap();

    let output = sb.x(&["rebuild", "-j", "3"]);
    assert!(output.status.success());
    assert!(!build.join("stale.o").exists());
    assert_eq!(sb.calls(), vec!["-S", "--build"]);

    let log = fs::read_to_string(&sb.log).unwrap();
    assert!(log.contains("--parallel 3"), "log: {log}");
}

#[test]
fn test_missing_tool_fails_before_anything_runs() {
    let sb = Sandbox::new(0, 0);
    fs::remove_file(sb.bin.join("cmake")).unwrap();
    let build = sb.project.join("build");
    fs::create_dir_all(&build).unwrap();

    let output = sb.x(&["rebuild"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("`cmake`"));
    assert!(build.exists(), "clean must not run when a tool is missing");
}

#[test]
fn test_run_forwards_arguments_and_exit_code() {
    let sb = Sandbox::new(0, 0);
    let build = sb.project.join("build");
    fs::create_dir_all(&build).unwrap();
    let args_file = sb.project.join("args.txt");
    write_executable(
        &build.join("rex-editor"),
        &format!("#!/bin/sh\nprintf '%s ' \"$@\" > \"{}\"\nexit 5\n", args_file.display()),
    );

    let output = sb.x(&["run", "editor", "--", "--map", "arena"]);
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(fs::read_to_string(&args_file).unwrap().trim(), "--map arena");

    // A second separator belongs to the binary
    let output = sb.x(&["run", "editor", "--", "--", "--literal"]);
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(fs::read_to_string(&args_file).unwrap().trim(), "-- --literal");
}

#[test]
fn test_install_forwards_prefix() {
    let sb = Sandbox::new(0, 0);
    let output = sb.x(&["install", "--prefix", "/opt/rex"]);
    assert!(output.status.success());
    let log = fs::read_to_string(&sb.log).unwrap();
    assert!(log.contains("--install"));
    assert!(log.contains("--prefix /opt/rex"));
}

#[test]
fn test_dry_run_spawns_nothing() {
    let sb = Sandbox::new(0, 0);
    let output = sb.x(&["all", "--dry-run"]);
    assert!(output.status.success());
    assert!(sb.calls().is_empty());
    assert!(!sb.project.join("build").exists());
}

#[test]
fn test_ctrl_c_waits_for_child_and_keeps_its_code() {
    let sb = Sandbox::new(0, 0);
    let started = sb.project.join("started");
    let finished = sb.project.join("finished");
    let script = format!(
        r#"#!/bin/sh
PATH=/usr/bin:/bin
trap 'sleep 0.3; touch "{finished}"; exit 42' INT
touch "{started}"
while :; do sleep 0.1; done
"#,
        started = started.display(),
        finished = finished.display()
    );
    write_executable(&sb.bin.join("cmake"), &script);

    let mut child = Command::new(env!("CARGO_BIN_EXE_x"))
        .arg("--project-root")
        .arg(&sb.project)
        .arg("build")
        .env("PATH", &sb.bin)
        .env("NO_COLOR", "1")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()
        .expect("Failed to start x");

    let deadline = Instant::now() + Duration::from_secs(10);
    while !started.exists() {
        assert!(Instant::now() < deadline, "fake cmake never started");
        thread::sleep(Duration::from_millis(20));
    }

    // Ctrl-C in a terminal signals the whole foreground group
    let pgid = child.id();
    let status = Command::new("kill")
        .args(["-s", "INT", "--", &format!("-{pgid}")])
        .status()
        .expect("Failed to run kill");
    assert!(status.success());

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(42));
    assert!(finished.exists(), "x exited before the build tool did");
}
