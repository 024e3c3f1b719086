//! Tool resolution on the search path.
//!
//! [`require_tools`] is the pre-flight check run before any lifecycle step
//! touches the build directory. [`ToolAvailability`] is the snapshot of
//! backend tools the selector consults.

use crate::error::Error;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Looks executables up by name
pub trait ToolLocator {
    fn locate(&self, tool: &str) -> Option<PathBuf>;
}

/// Resolves tools against `PATH` (and `PATHEXT` on Windows)
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

/// Backend tools the selector may pick from
pub const BACKEND_TOOLS: &[&str] = &["ninja", "msbuild", "xcodebuild", "gmake", "make"];

/// Presence of each probed tool, computed once per invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolAvailability {
    tools: BTreeMap<String, bool>,
}

impl ToolAvailability {
    pub fn probe(locator: &dyn ToolLocator, names: &[&str]) -> Self {
        let tools = names
            .iter()
            .map(|name| (name.to_string(), locator.locate(name).is_some()))
            .collect();
        Self { tools }
    }

    /// Build from an explicit list of present tools
    pub fn with_present(names: &[&str]) -> Self {
        Self {
            tools: names.iter().map(|n| (n.to_string(), true)).collect(),
        }
    }

    pub fn has(&self, tool: &str) -> bool {
        self.tools.get(tool).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.tools.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Fail on the first tool in `tools` that cannot be found.
pub fn require_tools<S: AsRef<str>>(locator: &dyn ToolLocator, tools: &[S]) -> Result<(), Error> {
    for tool in tools {
        let tool = tool.as_ref();
        if locator.locate(tool).is_none() {
            return Err(Error::MissingTool {
                tool: tool.to_string(),
            });
        }
    }
    Ok(())
}
