//! Detection of an already configured MSVC environment.
//!
//! The conan profiles set up the Visual C++ environment for each architecture on their own,
//! having `cl` callable from the current shell (i.e. `vcvars*.bat` was run) breaks that.

use std::sync::OnceLock;

use anyhow::Result;
use log::{info, warn};
use regex::Regex;

use crate::utils;

const CL: &str = "cl";
const UNKNOWN: &str = "unknown";

static BANNER_RE: OnceLock<Regex> = OnceLock::new();

fn banner_re() -> &'static Regex {
    BANNER_RE.get_or_init(|| {
        Regex::new(r"Microsoft \(R\) C/C\+\+ Optimizing Compiler Version ([\w.]+) for (\w+)")
            .expect("invalid compiler banner pattern")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClCompiler {
    pub version: String,
    pub arch: String,
}

impl ClCompiler {
    /// Extract version and target architecture from the banner `cl` prints to `stderr`.
    pub fn parse_banner(banner: &str) -> Option<Self> {
        let caps = banner_re().captures(banner)?;
        Some(Self {
            version: caps[1].to_string(),
            arch: caps[2].to_string(),
        })
    }
}

/// Try to run `cl` in the current environment.
///
/// Returns `Ok(None)` if it cannot be found. A `cl` that runs but prints an unrecognized
/// banner is still reported, with both fields set to `unknown`.
pub fn probe_cl() -> Result<Option<ClCompiler>> {
    let Some(stderr) = utils::capture_stderr(CL, &[] as &[&str])? else {
        info!("CL compiler: not found");
        return Ok(None);
    };

    let compiler = ClCompiler::parse_banner(&stderr).unwrap_or_else(|| {
        warn!("unrecognized banner from `{CL}`: {}", stderr.trim());
        ClCompiler {
            version: UNKNOWN.into(),
            arch: UNKNOWN.into(),
        }
    });
    info!(
        "CL compiler: version [{}], arch [{}]",
        compiler.version, compiler.arch
    );
    Ok(Some(compiler))
}
