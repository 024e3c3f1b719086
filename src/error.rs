//! Errors that decide how `x` exits.

use std::path::PathBuf;

/// Fatal orchestration errors.
///
/// These travel inside `anyhow::Error`; `main` downcasts to pick the exit code.
#[derive(Debug)]
pub enum Error {
    /// A required tool is not on the search path
    MissingTool { tool: String },
    /// A spawned process exited non-zero
    ProcessFailure { program: String, code: i32 },
    /// `run` was asked for a binary that has not been built
    BinaryNotFound { name: String, path: PathBuf },
    /// Argument values that cannot be combined or used
    InvalidArgument(String),
}

impl Error {
    /// Process exit code for this error. Child failures pass their code through.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ProcessFailure { code, .. } => *code,
            Error::MissingTool { .. } | Error::BinaryNotFound { .. } | Error::InvalidArgument(_) => 1,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingTool { tool } => write!(
                f,
                "Required tool `{}` was not found in PATH. Install it first and retry.",
                tool
            ),
            Error::ProcessFailure { program, code } => {
                write!(f, "`{}` failed with exit code {}", program, code)
            }
            Error::BinaryNotFound { name, path } => write!(
                f,
                "Cannot find {} at {}. Run `x build` first.",
                name,
                path.display()
            ),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Exit code for any error that reached `main`.
pub fn exit_code_of(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Error>().map_or(1, Error::exit_code)
}
