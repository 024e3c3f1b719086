//! Lifecycle commands and the orchestrator that executes them.
//!
//! A command is first turned into a plan ([`plan::plan`]), then the
//! [`Orchestrator`] checks every tool the plan needs and executes the steps
//! in order. The first failing step ends the command; nothing is retried or
//! rolled back.

pub mod clean;
pub mod plan;
pub mod run;

pub use clean::{CleanOutcome, clean_build_dir};
pub use plan::{LifecycleCommand, Phase, Step, plan};

use crate::backend::{BackendInvocation, SelectionInput, SelectionReason, path_arg, select_backend};
use crate::config::BuildConfiguration;
use crate::error::Error;
use crate::probe::OsFamily;
use crate::runner::ProcessRunner;
use crate::tools::{ToolAvailability, ToolLocator, require_tools};
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

pub struct Orchestrator<'a> {
    config: &'a BuildConfiguration,
    os: OsFamily,
    tools: &'a ToolAvailability,
    locator: &'a dyn ToolLocator,
    runner: &'a mut dyn ProcessRunner,
    dry_run: bool,
    verbose: bool,
    phase: Phase,
    completed: Vec<Step>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a BuildConfiguration,
        os: OsFamily,
        tools: &'a ToolAvailability,
        locator: &'a dyn ToolLocator,
        runner: &'a mut dyn ProcessRunner,
    ) -> Self {
        Self {
            config,
            os,
            tools,
            locator,
            runner,
            dry_run: false,
            verbose: false,
            phase: Phase::Idle,
            completed: Vec::new(),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Steps that finished successfully, in order
    pub fn completed(&self) -> &[Step] {
        &self.completed
    }

    /// Execute `command` to completion or first failure.
    pub fn execute(&mut self, command: LifecycleCommand) -> Result<()> {
        let steps = plan(command, self.config);
        if self.verbose {
            let names: Vec<String> = steps.iter().map(|s| format!("{:?}", s)).collect();
            println!("   {} Plan for `{}`: {}", "📋".cyan(), command, names.join(" → "));
        }

        if let Err(e) = self.preflight(&steps) {
            self.phase = Phase::Failed;
            return Err(e.into());
        }

        for step in steps {
            self.phase = step.phase();
            if let Err(e) = self.run_step(step) {
                self.phase = Phase::Failed;
                return Err(e);
            }
            self.completed.push(step);
        }

        self.phase = Phase::Done;
        Ok(())
    }

    /// Every tool the whole plan needs, checked before anything is touched
    fn preflight(&self, steps: &[Step]) -> Result<(), Error> {
        let required = plan::plan_requirements(steps, self.config);
        require_tools(self.locator, required.as_slice())
    }

    fn run_step(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Clean => {
                clean_build_dir(&self.config.build_dir, self.dry_run)?;
                Ok(())
            }
            Step::Configure => self.configure(),
            Step::Build => self.build(),
            Step::Install => self.install(),
            Step::Run => self.run_binary(),
        }
    }

    fn configure(&mut self) -> Result<()> {
        let config = self.config;
        println!(
            "{} Configuring ({})...",
            "⚙".blue(),
            config.build_type.as_str().bold()
        );
        if !self.dry_run {
            fs::create_dir_all(&config.build_dir).with_context(|| {
                format!(
                    "Failed to create build directory {}",
                    config.build_dir.display()
                )
            })?;
        }
        let inv = plan::configure_invocation(config);
        self.spawn(&inv, &config.project_root)
    }

    fn build(&mut self) -> Result<()> {
        let config = self.config;
        let selection = select_backend(&SelectionInput {
            os: self.os,
            tools: self.tools,
            config,
        });

        match selection.reason {
            SelectionReason::UnsupportedPlatform => eprintln!(
                "   {} Unsupported platform `{}`; falling back to `cmake --build`",
                "⚠".yellow(),
                std::env::consts::OS
            ),
            SelectionReason::GeneratorOverride if self.verbose => println!(
                "   {} Generator override given; letting CMake drive the build",
                "ℹ".blue()
            ),
            SelectionReason::NoNativeBackend if self.verbose => println!(
                "   {} No native backend detected in {}",
                "ℹ".blue(),
                config.build_dir.display()
            ),
            _ => {}
        }

        println!(
            "{} Building with {} ({})...",
            "🔨".cyan(),
            selection.backend.bold(),
            jobs_label(config.jobs)
        );
        self.spawn(&selection.invocation, &config.project_root)
    }

    fn install(&mut self) -> Result<()> {
        let config = self.config;
        println!("{} Installing...", "📦".blue());
        let inv = plan::install_invocation(config);
        self.spawn(&inv, &config.project_root)
    }

    fn run_binary(&mut self) -> Result<()> {
        let config = self.config;
        let binary = run::resolve_binary(config, self.os)?;
        println!(
            "{} Running {}...\n",
            "▶".green(),
            config.run_binary_name().bold()
        );
        let inv = BackendInvocation::new(path_arg(&binary))
            .args(config.run_args.iter().cloned());
        self.spawn(&inv, &config.project_root)
    }

    fn spawn(&mut self, inv: &BackendInvocation, cwd: &Path) -> Result<()> {
        if self.dry_run {
            println!("{} {} {}", "+".dimmed(), inv.command_line(), "(dry run)".dimmed());
            return Ok(());
        }

        let outcome = self.runner.run(inv, cwd)?;
        if !outcome.success() {
            return Err(Error::ProcessFailure {
                program: inv.program.clone(),
                code: outcome.exit_code,
            }
            .into());
        }
        println!(
            "{} `{}` finished in {:.2?}",
            "✓".green(),
            inv.program,
            outcome.elapsed
        );
        Ok(())
    }
}

fn jobs_label(jobs: usize) -> String {
    if jobs == 1 {
        "1 job".to_string()
    } else {
        format!("{} jobs", jobs)
    }
}
