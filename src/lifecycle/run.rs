//! Locating and launching the project's own binaries for `x run`.

use crate::config::BuildConfiguration;
use crate::error::Error;
use crate::probe::OsFamily;
use std::path::PathBuf;

/// Where a built binary may live: directly in the build dir, or in the
/// per-configuration subdirectory multi-config generators use.
pub fn binary_candidates(config: &BuildConfiguration, os: OsFamily) -> Vec<PathBuf> {
    let file = format!("{}{}", config.run_binary_name(), os.exe_suffix());
    vec![
        config.build_dir.join(&file),
        config.build_dir.join(config.build_type.as_str()).join(&file),
    ]
}

/// First existing candidate, or `BinaryNotFound` naming the primary location
pub fn resolve_binary(config: &BuildConfiguration, os: OsFamily) -> Result<PathBuf, Error> {
    let candidates = binary_candidates(config, os);
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }
    Err(Error::BinaryNotFound {
        name: config.run_binary_name().to_string(),
        path: candidates[0].clone(),
    })
}
