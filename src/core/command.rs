use std::fmt;

use super::host::Os;
use super::matrix::{Arch, BuildConfig, LibsBuildMode};

/// The package manager program.
pub const PACKAGE_MANAGER: &str = "conan";
/// Package whose `build_type` setting follows the game configuration.
const GAME_PACKAGE: &str = "thedarkmod";
const DEPLOYER: &str = "tdm_deploy";

/// One `conan install` invocation for a single build job.
///
/// Use [`Display`](fmt::Display) to get the command line passed to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    args: Vec<String>,
}

impl BuildCommand {
    pub fn new(os: Os, arch: Arch, libs_mode: LibsBuildMode, config: BuildConfig) -> Self {
        let args = vec![
            "install".to_string(),
            ".".to_string(),
            "-pr:b".to_string(),
            format!("profiles/base_{os}"),
            "-pr".to_string(),
            format!("profiles/os_{os}"),
            "-pr".to_string(),
            format!("profiles/arch_{arch}"),
            "-pr".to_string(),
            format!("profiles/build_{libs_mode}"),
            "-s".to_string(),
            format!("{GAME_PACKAGE}/*:build_type={config}"),
            "-of".to_string(),
            format!("artefacts/{os}_{arch}"),
            "-d".to_string(),
            DEPLOYER.to_string(),
            "-b".to_string(),
            "missing".to_string(),
        ];
        Self { args }
    }

    pub fn program(&self) -> &str {
        PACKAGE_MANAGER
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
