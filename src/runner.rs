//! Child process execution.
//!
//! One process at a time, inherited stdio, blocking wait. Every command line
//! is echoed before it runs.

use crate::backend::BackendInvocation;
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub elapsed: Duration,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

pub trait ProcessRunner {
    /// Run `invocation` in `cwd` and wait for it.
    ///
    /// `Err` means the process could not be started at all; a process that
    /// ran and failed is an `Ok` outcome with a non-zero code.
    fn run(&mut self, invocation: &BackendInvocation, cwd: &Path) -> Result<ProcessOutcome>;
}

/// Spawns real processes
#[derive(Debug, Default)]
pub struct SystemRunner {
    pub verbose: bool,
}

impl ProcessRunner for SystemRunner {
    fn run(&mut self, invocation: &BackendInvocation, cwd: &Path) -> Result<ProcessOutcome> {
        println!("{} {}", "+".dimmed(), invocation.command_line());

        let start = Instant::now();
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .current_dir(cwd)
            .status()
            .with_context(|| format!("Failed to execute `{}`", invocation.program))?;
        let elapsed = start.elapsed();

        let exit_code = exit_code(status);
        if self.verbose {
            println!(
                "   {} `{}` exited with {} after {:.2?}",
                "⏱".dimmed(),
                invocation.program,
                exit_code,
                elapsed
            );
        }
        Ok(ProcessOutcome { exit_code, elapsed })
    }
}

/// Exit code of a finished child; a signal death on Unix maps to 128 + signal
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> BackendInvocation {
        if cfg!(windows) {
            BackendInvocation::new("cmd").args(["/C", script])
        } else {
            BackendInvocation::new("sh").args(["-c", script])
        }
    }

    #[test]
    fn test_zero_exit_is_success() {
        let mut runner = SystemRunner::default();
        let outcome = runner
            .run(&shell("exit 0"), &std::env::temp_dir())
            .unwrap();
        assert!(outcome.success());
    }

    #[test]
    fn test_exit_code_is_reported() {
        let mut runner = SystemRunner::default();
        let outcome = runner
            .run(&shell("exit 3"), &std::env::temp_dir())
            .unwrap();
        assert_eq!(outcome.exit_code, 3);
        assert!(!outcome.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_env_and_cwd_reach_the_child() {
        let dir = tempfile::tempdir().unwrap();
        let inv = shell("test \"$DESTDIR\" = staged && test -f marker")
            .env("DESTDIR", "staged");
        std::fs::write(dir.path().join("marker"), "").unwrap();
        let mut runner = SystemRunner::default();
        let outcome = runner.run(&inv, dir.path()).unwrap();
        assert_eq!(outcome.exit_code, 0);
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let mut runner = SystemRunner::default();
        let res = runner.run(
            &BackendInvocation::new("definitely-not-a-real-tool-rex-build"),
            &std::env::temp_dir(),
        );
        assert!(res.is_err());
    }
}
