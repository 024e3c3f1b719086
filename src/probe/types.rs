//! Host facts gathered by the probe.

use std::fmt;

/// Operating system families the backend selector knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Linux,
    MacOS,
    /// FreeBSD, OpenBSD, NetBSD, DragonFly
    Bsd,
    /// Anything else; backend selection falls back to `cmake --build`
    Other,
}

impl OsFamily {
    /// Map a `std::env::consts::OS` value to a family
    pub fn from_os_str(os: &str) -> Self {
        match os {
            "windows" => OsFamily::Windows,
            "linux" => OsFamily::Linux,
            "macos" => OsFamily::MacOS,
            "freebsd" | "openbsd" | "netbsd" | "dragonfly" => OsFamily::Bsd,
            _ => OsFamily::Other,
        }
    }

    pub fn current() -> Self {
        Self::from_os_str(std::env::consts::OS)
    }

    pub fn exe_suffix(&self) -> &'static str {
        match self {
            OsFamily::Windows => ".exe",
            _ => "",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsFamily::Windows => "Windows",
            OsFamily::Linux => "Linux",
            OsFamily::MacOS => "macOS",
            OsFamily::Bsd => "BSD",
            OsFamily::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Result of a best-effort probe: either a value or an explicit unknown marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probed<T> {
    Known(T),
    Unknown,
}

impl<T> Probed<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Probed::Known(v) => Some(v),
            Probed::Unknown => None,
        }
    }

}

impl<T> From<Option<T>> for Probed<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Probed::Known(v),
            None => Probed::Unknown,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Probed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probed::Known(v) => write!(f, "{}", v),
            Probed::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Everything the environment probe learned about the host
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub os: OsFamily,
    pub arch: &'static str,
    pub logical_cores: Probed<usize>,
    pub physical_cores: Probed<usize>,
    pub processor: Probed<String>,
    pub gpus: Probed<Vec<String>>,
    pub cmake_version: Probed<String>,
    pub compiler_versions: Vec<(String, Probed<String>)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_family_mapping() {
        assert_eq!(OsFamily::from_os_str("windows"), OsFamily::Windows);
        assert_eq!(OsFamily::from_os_str("linux"), OsFamily::Linux);
        assert_eq!(OsFamily::from_os_str("macos"), OsFamily::MacOS);
        assert_eq!(OsFamily::from_os_str("freebsd"), OsFamily::Bsd);
        assert_eq!(OsFamily::from_os_str("openbsd"), OsFamily::Bsd);
        assert_eq!(OsFamily::from_os_str("haiku"), OsFamily::Other);
    }

    #[test]
    fn test_probed_display() {
        assert_eq!(Probed::Known(4).to_string(), "4");
        assert_eq!(Probed::<usize>::Unknown.to_string(), "Unknown");
        assert_eq!(Probed::from(None::<u8>), Probed::Unknown);
    }
}
