//! Turning a lifecycle command into the ordered steps it runs.

use crate::backend::{BackendInvocation, path_arg};
use crate::config::BuildConfiguration;
use clap::ValueEnum;
use std::fmt;

/// Tools configure and build need unless `x.toml` says otherwise
pub const DEFAULT_TOOLCHAIN: &[&str] = &["cmake", "cargo", "rustc"];

/// Top-level operations `x` exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LifecycleCommand {
    #[default]
    All,
    Configure,
    Build,
    Clean,
    Rebuild,
    Install,
    Run,
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleCommand::All => "all",
            LifecycleCommand::Configure => "configure",
            LifecycleCommand::Build => "build",
            LifecycleCommand::Clean => "clean",
            LifecycleCommand::Rebuild => "rebuild",
            LifecycleCommand::Install => "install",
            LifecycleCommand::Run => "run",
        };
        f.write_str(name)
    }
}

/// One unit of a lifecycle plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Clean,
    Configure,
    Build,
    Install,
    Run,
}

/// Where the state machine is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Cleaning,
    Configuring,
    Building,
    Installing,
    Running,
    Done,
    Failed,
}

impl Step {
    pub fn phase(&self) -> Phase {
        match self {
            Step::Clean => Phase::Cleaning,
            Step::Configure => Phase::Configuring,
            Step::Build => Phase::Building,
            Step::Install => Phase::Installing,
            Step::Run => Phase::Running,
        }
    }

    /// Tools that must be on the path before this step may run
    pub fn required_tools(&self, config: &BuildConfiguration) -> Vec<String> {
        match self {
            Step::Configure | Step::Build => match &config.required_tools {
                Some(tools) => tools.clone(),
                None => DEFAULT_TOOLCHAIN.iter().map(|t| t.to_string()).collect(),
            },
            Step::Install => vec!["cmake".to_string()],
            Step::Clean | Step::Run => Vec::new(),
        }
    }
}

/// Ordered steps for `command`. Pure: nothing is executed or inspected.
pub fn plan(command: LifecycleCommand, config: &BuildConfiguration) -> Vec<Step> {
    match command {
        LifecycleCommand::Configure => vec![Step::Configure],
        LifecycleCommand::Build => vec![Step::Build],
        LifecycleCommand::Clean => vec![Step::Clean],
        LifecycleCommand::Rebuild => vec![Step::Clean, Step::Configure, Step::Build],
        LifecycleCommand::Install => vec![Step::Install],
        LifecycleCommand::Run => vec![Step::Run],
        LifecycleCommand::All => {
            let mut steps = Vec::with_capacity(3);
            if config.clean_first {
                steps.push(Step::Clean);
            }
            steps.push(Step::Configure);
            steps.push(Step::Build);
            steps
        }
    }
}

/// Union of the plan's tool requirements, in first-seen order
pub fn plan_requirements(steps: &[Step], config: &BuildConfiguration) -> Vec<String> {
    let mut tools: Vec<String> = Vec::new();
    for step in steps {
        for tool in step.required_tools(config) {
            if !tools.contains(&tool) {
                tools.push(tool);
            }
        }
    }
    tools
}

/// `cmake -S <root> -B <build>` with build type and generator override
pub fn configure_invocation(config: &BuildConfiguration) -> BackendInvocation {
    let mut inv = BackendInvocation::new("cmake")
        .arg("-S")
        .arg(path_arg(&config.project_root))
        .arg("-B")
        .arg(path_arg(&config.build_dir))
        .arg(format!("-DCMAKE_BUILD_TYPE={}", config.build_type))
        .arg("-DCMAKE_EXPORT_COMPILE_COMMANDS=ON");
    for (key, value) in &config.configure_defines {
        inv = inv.arg(format!("-D{}={}", key, value));
    }
    if let Some(generator) = &config.generator {
        inv = inv.arg("-G").arg(generator);
    }
    inv
}

/// `cmake --install <build>`; a destination root travels as `DESTDIR`
pub fn install_invocation(config: &BuildConfiguration) -> BackendInvocation {
    let mut inv = BackendInvocation::new("cmake")
        .arg("--install")
        .arg(path_arg(&config.build_dir));
    if let Some(prefix) = &config.install_prefix {
        inv = inv.arg("--prefix").arg(path_arg(prefix));
    }
    inv = inv.arg("--config").arg(config.build_type.as_str());
    if let Some(destdir) = &config.destination_root {
        inv = inv.env("DESTDIR", path_arg(destdir));
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildType, CliOverrides, CoreCounts, ProjectConfig};
    use crate::probe::Probed;
    use std::path::PathBuf;

    fn config(cli: CliOverrides) -> BuildConfiguration {
        BuildConfiguration::resolve(
            std::env::temp_dir().join("rex"),
            cli,
            ProjectConfig::default(),
            CoreCounts {
                logical: Probed::Known(4),
                physical: Probed::Unknown,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_single_step_commands() {
        let cfg = config(CliOverrides::default());
        assert_eq!(plan(LifecycleCommand::Configure, &cfg), vec![Step::Configure]);
        assert_eq!(plan(LifecycleCommand::Build, &cfg), vec![Step::Build]);
        assert_eq!(plan(LifecycleCommand::Clean, &cfg), vec![Step::Clean]);
        assert_eq!(plan(LifecycleCommand::Install, &cfg), vec![Step::Install]);
        assert_eq!(plan(LifecycleCommand::Run, &cfg), vec![Step::Run]);
    }

    #[test]
    fn test_rebuild_is_clean_configure_build() {
        let cfg = config(CliOverrides::default());
        let expected: Vec<Step> = [
            plan(LifecycleCommand::Clean, &cfg),
            plan(LifecycleCommand::Configure, &cfg),
            plan(LifecycleCommand::Build, &cfg),
        ]
        .concat();
        assert_eq!(plan(LifecycleCommand::Rebuild, &cfg), expected);
    }

    #[test]
    fn test_all_cleans_only_when_asked() {
        let cfg = config(CliOverrides::default());
        assert_eq!(
            plan(LifecycleCommand::All, &cfg),
            vec![Step::Configure, Step::Build]
        );

        let cfg = config(CliOverrides {
            clean_first: true,
            ..Default::default()
        });
        assert_eq!(
            plan(LifecycleCommand::All, &cfg),
            vec![Step::Clean, Step::Configure, Step::Build]
        );
    }

    #[test]
    fn test_requirements_are_deduplicated() {
        let cfg = config(CliOverrides::default());
        let steps = plan(LifecycleCommand::Rebuild, &cfg);
        assert_eq!(plan_requirements(&steps, &cfg), vec!["cmake", "cargo", "rustc"]);
        assert!(plan_requirements(&[Step::Clean, Step::Run], &cfg).is_empty());
        assert_eq!(plan_requirements(&[Step::Install], &cfg), vec!["cmake"]);
    }

    #[test]
    fn test_configure_invocation() {
        let cfg = config(CliOverrides {
            build_type: Some(BuildType::RelWithDebInfo),
            generator: Some("Ninja".into()),
            ..Default::default()
        });
        let inv = configure_invocation(&cfg);
        assert_eq!(inv.program, "cmake");
        assert_eq!(
            inv.args,
            vec![
                "-S".to_string(),
                path_arg(&cfg.project_root),
                "-B".to_string(),
                path_arg(&cfg.build_dir),
                "-DCMAKE_BUILD_TYPE=RelWithDebInfo".to_string(),
                "-DCMAKE_EXPORT_COMPILE_COMMANDS=ON".to_string(),
                "-G".to_string(),
                "Ninja".to_string(),
            ]
        );
    }

    #[test]
    fn test_install_invocation_forwards_prefix_and_destdir() {
        let cfg = config(CliOverrides {
            install_prefix: Some(PathBuf::from("/opt/rex")),
            destination_root: Some(PathBuf::from("/tmp/stage")),
            ..Default::default()
        });
        let inv = install_invocation(&cfg);
        assert_eq!(
            inv.args,
            vec![
                "--install".to_string(),
                path_arg(&cfg.build_dir),
                "--prefix".to_string(),
                path_arg(&PathBuf::from("/opt/rex")),
                "--config".to_string(),
                "Debug".to_string(),
            ]
        );
        assert_eq!(
            inv.env,
            vec![("DESTDIR".to_string(), path_arg(&PathBuf::from("/tmp/stage")))]
        );
    }
}
