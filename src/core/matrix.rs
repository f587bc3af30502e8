//! The set of builds to run for one host.

use std::fmt;

use super::command::BuildCommand;
use super::host::Os;

/// Target architecture, named after its pointer width as the `arch_*` profiles are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    X86,
}

impl Arch {
    /// Build order: 64-bit first.
    pub const ALL: [Arch; 2] = [Arch::X64, Arch::X86];

    /// Machines whose name ends with `64` (`x86_64`, `aarch64`, `AMD64`...) are 64-bit.
    pub fn from_machine(machine: &str) -> Self {
        if machine.ends_with("64") {
            Self::X64
        } else {
            Self::X86
        }
    }

    pub fn bits(&self) -> &'static str {
        match self {
            Self::X64 => "64",
            Self::X86 => "32",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.bits())
    }
}

/// Build type of the game itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildConfig {
    Release,
    Debug,
}

impl BuildConfig {
    /// Build order: release first.
    pub const ALL: [BuildConfig; 2] = [BuildConfig::Release, BuildConfig::Debug];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Release => "Release",
            Self::Debug => "Debug",
        }
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the third-party libraries themselves are compiled, selects a `build_*` profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibsBuildMode {
    Release,
    /// Optimized code with debug checks kept, used under debug builds of the game.
    DebugFast,
}

impl LibsBuildMode {
    /// Pick the libraries' build mode for a game configuration on the given OS.
    ///
    /// Linux always links release libraries.
    pub fn for_target(os: Os, config: BuildConfig) -> Self {
        match (os, config) {
            (Os::Windows, BuildConfig::Debug) => Self::DebugFast,
            (Os::Windows, BuildConfig::Release) | (Os::Linux, _) => Self::Release,
        }
    }

    pub fn profile_name(&self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::DebugFast => "debugfast",
        }
    }
}

impl fmt::Display for LibsBuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile_name())
    }
}

/// One combination of OS, architecture and configuration to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildJob {
    pub os: Os,
    pub arch: Arch,
    pub config: BuildConfig,
    pub libs_mode: LibsBuildMode,
}

impl BuildJob {
    pub fn new(os: Os, arch: Arch, config: BuildConfig) -> Self {
        Self {
            os,
            arch,
            config,
            libs_mode: LibsBuildMode::for_target(os, config),
        }
    }

    pub fn command(&self) -> BuildCommand {
        BuildCommand::new(self.os, self.arch, self.libs_mode, self.config)
    }
}

/// Every [`BuildJob`] of one OS, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMatrix {
    jobs: Vec<BuildJob>,
}

impl BuildMatrix {
    /// Architectures outer, configurations inner.
    pub fn for_os(os: Os) -> Self {
        let jobs = Arch::ALL
            .iter()
            .flat_map(|&arch| {
                BuildConfig::ALL
                    .iter()
                    .map(move |&config| BuildJob::new(os, arch, config))
            })
            .collect();
        Self { jobs }
    }

    pub fn jobs(&self) -> &[BuildJob] {
        &self.jobs
    }

    pub fn commands(&self) -> Vec<BuildCommand> {
        self.jobs.iter().map(BuildJob::command).collect()
    }
}
