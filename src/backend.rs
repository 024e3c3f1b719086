//! Build backend and job-count selection.
//!
//! The backend for a build step is picked from [`BACKEND_TABLE`], a list of
//! rows evaluated top to bottom. The first row whose predicate matches the
//! host (OS family, tools on the path, files a previous configure left in the
//! build directory) renders the invocation. When nothing matches, the build
//! goes through `cmake --build`, which drives whichever generator configured
//! the tree.

use crate::config::BuildConfiguration;
use crate::paths::find_with_extension;
use crate::probe::{OsFamily, Probed};
use crate::tools::ToolAvailability;
use std::fmt;
use std::path::{Path, PathBuf};

/// A concrete external command for one step. Built fresh for every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment for the child, on top of the inherited one
    pub env: Vec<(String, String)>,
}

impl BackendInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shell-like rendering used for the `+ ...` audit line
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, quote(v)))
            .collect();
        parts.push(quote(&self.program));
        parts.extend(self.args.iter().map(|a| quote(a)));
        parts.join(" ")
    }
}

impl fmt::Display for BackendInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Job count: explicit override, else logical cores, else physical cores, else 1.
pub fn resolve_jobs(explicit: Option<usize>, logical: Probed<usize>, physical: Probed<usize>) -> usize {
    explicit
        .filter(|&n| n > 0)
        .or(logical.known().copied().filter(|&n| n > 0))
        .or(physical.known().copied().filter(|&n| n > 0))
        .unwrap_or(1)
}

/// What the selector looks at
pub struct SelectionInput<'a> {
    pub os: OsFamily,
    pub tools: &'a ToolAvailability,
    pub config: &'a BuildConfiguration,
}

/// A row matched: which tool to run and the build artifact it operates on
pub struct RowMatch {
    pub tool: &'static str,
    pub artifact: PathBuf,
}

pub struct BackendRow {
    pub name: &'static str,
    pub predicate: fn(&SelectionInput<'_>) -> Option<RowMatch>,
    pub template: fn(&SelectionInput<'_>, &RowMatch) -> BackendInvocation,
}

pub const BACKEND_TABLE: &[BackendRow] = &[
    BackendRow {
        name: "ninja",
        predicate: ninja_matches,
        template: ninja_template,
    },
    BackendRow {
        name: "msbuild",
        predicate: msbuild_matches,
        template: msbuild_template,
    },
    BackendRow {
        name: "xcodebuild",
        predicate: xcodebuild_matches,
        template: xcodebuild_template,
    },
    BackendRow {
        name: "make",
        predicate: make_matches,
        template: make_template,
    },
];

pub const GENERIC_BACKEND: &str = "cmake";

/// Why the selector ended up where it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// A table row matched
    Detected,
    /// `--generator` was given, so on-disk markers are ignored
    GeneratorOverride,
    /// No row matched on a known OS
    NoNativeBackend,
    /// OS family not recognised
    UnsupportedPlatform,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub backend: &'static str,
    pub reason: SelectionReason,
    pub invocation: BackendInvocation,
}

/// Pick the backend invocation for a build step
pub fn select_backend(input: &SelectionInput<'_>) -> Selection {
    if input.os == OsFamily::Other {
        return generic(input, SelectionReason::UnsupportedPlatform);
    }
    if input.config.generator.is_some() {
        return generic(input, SelectionReason::GeneratorOverride);
    }

    for row in BACKEND_TABLE {
        if let Some(m) = (row.predicate)(input) {
            return Selection {
                backend: row.name,
                reason: SelectionReason::Detected,
                invocation: (row.template)(input, &m),
            };
        }
    }

    generic(input, SelectionReason::NoNativeBackend)
}

fn generic(input: &SelectionInput<'_>, reason: SelectionReason) -> Selection {
    Selection {
        backend: GENERIC_BACKEND,
        reason,
        invocation: generic_build(input.config),
    }
}

/// `cmake --build` with CMake's own parallelism flag
pub fn generic_build(config: &BuildConfiguration) -> BackendInvocation {
    let mut inv = BackendInvocation::new("cmake")
        .arg("--build")
        .arg(path_arg(&config.build_dir))
        .arg("--parallel")
        .arg(config.jobs.to_string());
    if let Some(target) = &config.target {
        inv = inv.arg("--target").arg(target);
    }
    inv.arg("--config").arg(config.build_type.as_str())
}

// --- rows ---

fn ninja_matches(input: &SelectionInput<'_>) -> Option<RowMatch> {
    let manifest = input.config.build_dir.join("build.ninja");
    (input.tools.has("ninja") && manifest.is_file()).then(|| RowMatch {
        tool: "ninja",
        artifact: input.config.build_dir.clone(),
    })
}

fn ninja_template(input: &SelectionInput<'_>, m: &RowMatch) -> BackendInvocation {
    BackendInvocation::new(m.tool)
        .arg("-C")
        .arg(path_arg(&m.artifact))
        .arg("-j")
        .arg(input.config.jobs.to_string())
        .args(input.config.target.clone())
}

fn msbuild_matches(input: &SelectionInput<'_>) -> Option<RowMatch> {
    if input.os != OsFamily::Windows || !input.tools.has("msbuild") {
        return None;
    }
    find_with_extension(&input.config.build_dir, "sln").map(|sln| RowMatch {
        tool: "msbuild",
        artifact: sln,
    })
}

fn msbuild_template(input: &SelectionInput<'_>, m: &RowMatch) -> BackendInvocation {
    let inv = BackendInvocation::new(m.tool)
        .arg(path_arg(&m.artifact))
        .arg(format!("/m:{}", input.config.jobs))
        .arg(format!("/p:Configuration={}", input.config.build_type));
    match &input.config.target {
        Some(target) => inv.arg(format!("/t:{}", target)),
        None => inv,
    }
}

fn xcodebuild_matches(input: &SelectionInput<'_>) -> Option<RowMatch> {
    if input.os != OsFamily::MacOS || !input.tools.has("xcodebuild") {
        return None;
    }
    find_with_extension(&input.config.build_dir, "xcodeproj").map(|proj| RowMatch {
        tool: "xcodebuild",
        artifact: proj,
    })
}

fn xcodebuild_template(input: &SelectionInput<'_>, m: &RowMatch) -> BackendInvocation {
    let inv = BackendInvocation::new(m.tool)
        .arg("-project")
        .arg(path_arg(&m.artifact))
        .arg("-configuration")
        .arg(input.config.build_type.as_str())
        .arg("-jobs")
        .arg(input.config.jobs.to_string());
    match &input.config.target {
        Some(target) => inv.arg("-target").arg(target),
        None => inv,
    }
}

fn make_matches(input: &SelectionInput<'_>) -> Option<RowMatch> {
    let candidates: &[&'static str] = match input.os {
        OsFamily::Bsd => &["gmake", "make"],
        OsFamily::Linux | OsFamily::MacOS => &["make"],
        OsFamily::Windows | OsFamily::Other => return None,
    };
    if !input.config.build_dir.join("Makefile").is_file() {
        return None;
    }
    candidates
        .iter()
        .copied()
        .find(|tool| input.tools.has(tool))
        .map(|tool| RowMatch {
            tool,
            artifact: input.config.build_dir.clone(),
        })
}

fn make_template(input: &SelectionInput<'_>, m: &RowMatch) -> BackendInvocation {
    BackendInvocation::new(m.tool)
        .arg("-C")
        .arg(path_arg(&m.artifact))
        .arg("-j")
        .arg(input.config.jobs.to_string())
        .args(input.config.target.clone())
}
