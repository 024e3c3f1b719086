//! # rex-build
//!
//! `x` is the single entry point for building a CMake project on any host.
//! It probes the machine, checks the required tools, picks the build backend
//! and job count, and runs a fixed lifecycle: configure, build, clean,
//! rebuild, install, run.
//!
//! ```bash
//! x                      # configure + build (Debug)
//! x build -t Release -j 8
//! x rebuild
//! x run runtime -- --level 2
//! ```
//!
//! ## Module Organization
//!
//! - [`lifecycle`] - Command plans and the orchestrator that runs them
//! - [`backend`] - Backend (ninja, msbuild, xcodebuild, make, cmake) and job-count selection
//! - [`probe`] - OS family, core counts, informational host data
//! - [`tools`] - Required-tool checks on `PATH`
//! - [`runner`] - Child process execution
//! - [`config`] - CLI + `x.toml` configuration

/// Backend selection table and job count policy.
pub mod backend;

/// Build configuration (`x.toml` and CLI merge).
pub mod config;

/// Error kinds and their exit codes.
pub mod error;

/// Lifecycle plans and execution.
pub mod lifecycle;

/// Path resolution relative to the project root.
pub mod paths;

/// Host environment probing.
pub mod probe;

/// Process execution.
pub mod runner;

/// Tool lookup on the search path.
pub mod tools;

/// Terminal tables and the host report.
pub mod ui;
