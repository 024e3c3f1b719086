//! Build directory removal for `x clean`.

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanOutcome {
    Removed,
    NothingToClean,
}

/// Remove `build_dir` recursively. A missing directory is not an error.
pub fn clean_build_dir(build_dir: &Path, dry_run: bool) -> Result<CleanOutcome> {
    if !build_dir.exists() {
        println!(
            "{} Build directory does not exist: {}",
            "!".yellow(),
            build_dir.display()
        );
        return Ok(CleanOutcome::NothingToClean);
    }

    if dry_run {
        println!(
            "{} Would remove build directory: {}",
            "🗑️".red(),
            build_dir.display()
        );
        return Ok(CleanOutcome::Removed);
    }

    fs::remove_dir_all(build_dir)
        .with_context(|| format!("Failed to remove {}", build_dir.display()))?;
    println!(
        "{} Removed build directory: {}",
        "🗑️".red(),
        build_dir.display()
    );
    Ok(CleanOutcome::Removed)
}
