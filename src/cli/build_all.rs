//! Separated module to handle the `build-all` driver in command line.

use std::io::{self, BufRead, Write};

use anyhow::{ensure, Result};
use log::debug;

use super::common;
use super::BuildAll;
use crate::core::driver::{CommandRunner, Plan, ShellRunner};
use crate::core::host::HostInfo;
use crate::core::msvc::{self, ClCompiler};

const CONFIRM_QUESTION: &str = "continue? (yes/no):";
const CONFIRM_ANSWER: &str = "yes";

/// Execute `build-all` against the real host, console and shell.
pub(super) fn execute(args: &BuildAll) -> Result<()> {
    debug!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("TARGET")
    );
    let host = HostInfo::detect()?;
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout();
    run(
        host,
        args.unattended,
        msvc::probe_cl,
        &mut stdin,
        &mut stdout,
        &mut ShellRunner,
    )
}

/// Check the host, print the commands, ask for confirmation unless `unattended`,
/// then run every command with `runner` until one of them fails.
///
/// `input` is never read from when `unattended` is `true`.
pub fn run<F, I, O, R>(
    host: HostInfo,
    unattended: bool,
    probe_cl: F,
    input: &mut I,
    output: &mut O,
    runner: &mut R,
) -> Result<()>
where
    F: FnOnce() -> Result<Option<ClCompiler>>,
    I: BufRead,
    O: Write,
    R: CommandRunner,
{
    let plan = Plan::prepare(host, probe_cl)?;
    plan.write_summary(output)?;

    if !unattended {
        let confirmed = common::confirm_exact(CONFIRM_QUESTION, CONFIRM_ANSWER, input, output)?;
        ensure!(confirmed, "Cancelled by user");
    }

    plan.execute(runner)
}
