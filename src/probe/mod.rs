//! Host environment probing
//!
//! Detects the OS family and core counts that feed backend and job-count
//! selection, plus informational strings (processor, GPUs, tool versions)
//! shown by `x --verbose`. Nothing in here can fail the command: every
//! sub-probe degrades to [`Probed::Unknown`].

pub mod types;

pub use types::{HostInfo, OsFamily, Probed};

use std::process::Command;

/// Probe the current host.
///
/// `compilers` lists the toolchain binaries whose `--version` should be shown.
pub fn detect_host(compilers: &[String]) -> HostInfo {
    let os = OsFamily::current();
    HostInfo {
        os,
        arch: std::env::consts::ARCH,
        logical_cores: logical_cores(),
        physical_cores: physical_cores(),
        processor: processor_name(os),
        gpus: gpu_list(os),
        cmake_version: tool_version("cmake"),
        compiler_versions: compilers
            .iter()
            .map(|c| (c.clone(), tool_version(c)))
            .collect(),
    }
}

pub fn logical_cores() -> Probed<usize> {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .ok()
        .into()
}

pub fn physical_cores() -> Probed<usize> {
    match num_cpus::get_physical() {
        0 => Probed::Unknown,
        n => Probed::Known(n),
    }
}

/// Run a read-only helper and return its stdout if it exited cleanly
fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn processor_name(os: OsFamily) -> Probed<String> {
    let name = match os {
        OsFamily::Linux => std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|s| parse_cpuinfo_model(&s)),
        OsFamily::MacOS => capture("sysctl", &["-n", "machdep.cpu.brand_string"])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        OsFamily::Bsd => capture("sysctl", &["-n", "hw.model"])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        OsFamily::Windows => std::env::var("PROCESSOR_IDENTIFIER").ok(),
        OsFamily::Other => None,
    };
    name.into()
}

fn gpu_list(os: OsFamily) -> Probed<Vec<String>> {
    let gpus = match os {
        OsFamily::Linux | OsFamily::Bsd => {
            capture("lspci", &[]).map(|s| parse_lspci_gpus(&s))
        }
        OsFamily::MacOS => capture("system_profiler", &["SPDisplaysDataType"])
            .map(|s| parse_system_profiler_gpus(&s)),
        OsFamily::Windows => capture("wmic", &["path", "win32_VideoController", "get", "name"])
            .map(|s| parse_wmic_gpus(&s)),
        OsFamily::Other => None,
    };
    gpus.filter(|g| !g.is_empty()).into()
}

/// `<tool> --version`, reduced to the first dotted version number
pub fn tool_version(tool: &str) -> Probed<String> {
    capture(tool, &["--version"])
        .and_then(|s| parse_version(&s))
        .into()
}

pub fn parse_version(output: &str) -> Option<String> {
    let re = regex::Regex::new(r"(\d+\.\d+(?:\.\d+)?(?:[-+.][0-9A-Za-z]+)?)").ok()?;
    re.captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn parse_cpuinfo_model(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .find(|l| l.starts_with("model name"))
        .and_then(|l| l.split_once(':'))
        .map(|(_, v)| v.trim().to_string())
}

pub fn parse_lspci_gpus(lspci: &str) -> Vec<String> {
    lspci
        .lines()
        .filter(|l| l.contains("VGA compatible controller") || l.contains("3D controller"))
        .filter_map(|l| l.splitn(3, ':').nth(2))
        .map(|s| s.trim().to_string())
        .collect()
}

pub fn parse_system_profiler_gpus(report: &str) -> Vec<String> {
    report
        .lines()
        .filter_map(|l| l.trim().strip_prefix("Chipset Model:"))
        .map(|s| s.trim().to_string())
        .collect()
}

pub fn parse_wmic_gpus(report: &str) -> Vec<String> {
    report
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "Name")
        .map(str::to_string)
        .collect()
}
