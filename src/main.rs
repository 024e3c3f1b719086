//! # `x` CLI Entry Point
//!
//! Parses the command line with clap, assembles the build configuration and
//! hands the requested lifecycle command to the orchestrator.
//!
//! Exit codes: `0` on success, the child's own code when a spawned process
//! fails, `1` for everything else (missing tool, missing binary, bad
//! arguments).

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rex_build::config::{self, BuildConfiguration, BuildType, CliOverrides, CoreCounts, RunTarget};
use rex_build::error::{Error, exit_code_of};
use rex_build::lifecycle::{LifecycleCommand, Orchestrator};
use rex_build::lifecycle::plan::DEFAULT_TOOLCHAIN;
use rex_build::paths;
use rex_build::probe::{self, OsFamily};
use rex_build::runner::SystemRunner;
use rex_build::tools::{BACKEND_TOOLS, PathLocator, ToolAvailability};
use rex_build::ui;

/// Set once Ctrl-C arrives. The child sees the same signal through the
/// process group; `x` keeps waiting and exits with the child's status.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Rex build utility", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Action to execute
    #[arg(value_enum, default_value_t = LifecycleCommand::All)]
    command: LifecycleCommand,

    /// Binary to run when command is `run` [default: editor]
    #[arg(value_enum)]
    run_target: Option<RunTarget>,

    /// Arguments forwarded to the selected binary (for `run`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    run_args: Vec<String>,

    /// Project root path [default: directory of this tool if it holds a CMakeLists.txt, else the current directory]
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Build directory, relative to the project root unless absolute [default: build]
    #[arg(short = 'B', long)]
    build_dir: Option<PathBuf>,

    /// CMake build type [default: Debug]
    #[arg(short = 't', long, value_enum)]
    build_type: Option<BuildType>,

    /// Parallel jobs for the backend [default: detected core count]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    jobs: Option<u32>,

    /// CMake generator override (e.g. "Ninja")
    #[arg(short = 'G', long)]
    generator: Option<String>,

    /// Build only this target
    #[arg(long)]
    target: Option<String>,

    /// Installation prefix for `install`
    #[arg(long)]
    prefix: Option<PathBuf>,

    /// Staging root for `install` (passed as DESTDIR)
    #[arg(long)]
    destdir: Option<PathBuf>,

    /// Delete the build directory before the default `all` command
    #[arg(long)]
    clean_first: bool,

    /// Print what would be executed without running anything
    #[arg(long)]
    dry_run: bool,

    /// Show the host report and selection decisions
    #[arg(short, long)]
    verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            project_root: self.project_root.clone(),
            build_dir: self.build_dir.clone(),
            build_type: self.build_type,
            jobs: self.jobs.map(|j| j as usize),
            generator: self.generator.clone(),
            target: self.target.clone(),
            install_prefix: self.prefix.clone(),
            destination_root: self.destdir.clone(),
            clean_first: self.clean_first,
            run_target: self.run_target,
            run_args: self.run_args.clone(),
        }
    }
}

fn main() {
    enable_windows_utf8_console();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help / --version are not failures
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst)) {
        eprintln!("{} Could not install Ctrl-C handler: {}", "!".yellow(), e);
    }

    if let Err(e) = run(&cli) {
        if INTERRUPTED.load(Ordering::SeqCst) {
            eprintln!("{} Interrupted", "!".yellow());
        }
        eprintln!("{} {:#}", "x".red(), e);
        std::process::exit(exit_code_of(&e));
    }
}

fn run(cli: &Cli) -> Result<()> {
    let command = cli.command;
    if command != LifecycleCommand::Run && (cli.run_target.is_some() || !cli.run_args.is_empty()) {
        return Err(Error::InvalidArgument(format!(
            "a run target and forwarded arguments only apply to `run`, not `{}`",
            command
        ))
        .into());
    }

    let overrides = cli.overrides();
    let root = match &overrides.project_root {
        Some(p) => paths::absolute_root(p)?,
        None => paths::default_project_root()?,
    };
    println!("{} Rex Build Tool (root={})", "🚀".blue(), root.display());

    let file = config::load_project_config(&root)?;
    let cores = CoreCounts {
        logical: probe::logical_cores(),
        physical: probe::physical_cores(),
    };
    let config = BuildConfiguration::resolve(root, overrides, file, cores)?;

    let os = OsFamily::current();
    let locator = PathLocator;
    let tools = ToolAvailability::probe(&locator, BACKEND_TOOLS);

    if cli.verbose {
        let compilers: Vec<String> = match &config.required_tools {
            Some(list) => list.clone(),
            None => DEFAULT_TOOLCHAIN.iter().map(|t| t.to_string()).collect(),
        }
        .into_iter()
        .filter(|t| t != "cmake")
        .collect();
        let host = probe::detect_host(&compilers);
        ui::print_host_report(&host, &tools, &config);
    }

    let start = Instant::now();
    let mut runner = SystemRunner {
        verbose: cli.verbose,
    };
    Orchestrator::new(&config, os, &tools, &locator, &mut runner)
        .dry_run(cli.dry_run)
        .verbose(cli.verbose)
        .execute(command)?;

    println!(
        "{} `{}` finished in {:.2?}",
        "✓".green(),
        command,
        start.elapsed()
    );
    Ok(())
}
