//! Build configuration.
//!
//! A [`BuildConfiguration`] is assembled once per invocation from, in order of
//! precedence, command-line flags, the optional `x.toml` at the project root,
//! and built-in defaults. It is never mutated afterwards.

use crate::backend::resolve_jobs;
use crate::error::Error;
use crate::paths;
use crate::probe::Probed;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "x.toml";
pub const DEFAULT_BUILD_DIR: &str = "build";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
pub enum BuildType {
    #[default]
    #[value(name = "Debug")]
    Debug,
    #[value(name = "Release")]
    Release,
    #[value(name = "RelWithDebInfo")]
    RelWithDebInfo,
    #[value(name = "MinSizeRel")]
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which project binary `x run` launches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RunTarget {
    #[default]
    Editor,
    Runtime,
}

// --- x.toml ---

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ProjectConfig {
    pub build: Option<BuildSection>,
    pub configure: Option<ConfigureSection>,
    pub tools: Option<ToolsSection>,
    pub run: Option<RunSection>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct BuildSection {
    pub dir: Option<PathBuf>,
    #[serde(rename = "type")]
    pub build_type: Option<BuildType>,
    pub generator: Option<String>,
    pub jobs: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ConfigureSection {
    #[serde(default)]
    pub defines: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ToolsSection {
    pub required: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct RunSection {
    pub editor: Option<String>,
    pub runtime: Option<String>,
}

/// Load `x.toml` from `root`; a missing file yields the defaults.
pub fn load_project_config(root: &Path) -> Result<ProjectConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_project_config(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_project_config(text: &str) -> Result<ProjectConfig> {
    Ok(toml::from_str(text)?)
}

// --- Resolved configuration ---

/// Values taken from the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub project_root: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub build_type: Option<BuildType>,
    pub jobs: Option<usize>,
    pub generator: Option<String>,
    pub target: Option<String>,
    pub install_prefix: Option<PathBuf>,
    pub destination_root: Option<PathBuf>,
    pub clean_first: bool,
    pub run_target: Option<RunTarget>,
    pub run_args: Vec<String>,
}

/// Detected core counts that feed the default job count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreCounts {
    pub logical: Probed<usize>,
    pub physical: Probed<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub project_root: PathBuf,
    /// Always absolute
    pub build_dir: PathBuf,
    pub build_type: BuildType,
    pub generator: Option<String>,
    /// Always >= 1
    pub jobs: usize,
    pub target: Option<String>,
    pub install_prefix: Option<PathBuf>,
    pub destination_root: Option<PathBuf>,
    pub clean_first: bool,
    pub run_target: RunTarget,
    pub run_args: Vec<String>,
    pub configure_defines: BTreeMap<String, String>,
    /// Tools that configure/build require; `None` keeps the built-in list
    pub required_tools: Option<Vec<String>>,
    pub editor_binary: String,
    pub runtime_binary: String,
}

impl BuildConfiguration {
    /// Merge CLI values over the project file over defaults.
    ///
    /// `project_root` must already be absolute.
    pub fn resolve(
        project_root: PathBuf,
        cli: CliOverrides,
        file: ProjectConfig,
        cores: CoreCounts,
    ) -> Result<Self, Error> {
        let build = file.build.unwrap_or_default();
        let run = file.run.unwrap_or_default();

        let jobs_override = cli.jobs.or(build.jobs);
        if jobs_override == Some(0) {
            return Err(Error::InvalidArgument(
                "job count must be at least 1".to_string(),
            ));
        }

        let build_dir_value = cli
            .build_dir
            .or(build.dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));
        let build_dir = paths::resolve_path(&project_root, &build_dir_value);

        Ok(Self {
            build_dir,
            build_type: cli.build_type.or(build.build_type).unwrap_or_default(),
            generator: non_empty(cli.generator).or_else(|| non_empty(build.generator)),
            jobs: resolve_jobs(jobs_override, cores.logical, cores.physical),
            target: non_empty(cli.target),
            install_prefix: cli
                .install_prefix
                .filter(|p| !p.as_os_str().is_empty()),
            destination_root: cli
                .destination_root
                .filter(|p| !p.as_os_str().is_empty()),
            clean_first: cli.clean_first,
            run_target: cli.run_target.unwrap_or_default(),
            run_args: cli.run_args,
            configure_defines: file.configure.map(|c| c.defines).unwrap_or_default(),
            required_tools: file.tools.and_then(|t| t.required),
            editor_binary: run.editor.unwrap_or_else(|| "rex-editor".to_string()),
            runtime_binary: run.runtime.unwrap_or_else(|| "rex-runtime".to_string()),
            project_root,
        })
    }

    /// Logical name of the binary `x run` launches
    pub fn run_binary_name(&self) -> &str {
        match self.run_target {
            RunTarget::Editor => &self.editor_binary,
            RunTarget::Runtime => &self.runtime_binary,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
