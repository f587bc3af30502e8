//! Check the host, lay out the build commands, then run them one after another.

use std::io::Write;

use anyhow::{bail, ensure, Result};
use log::{debug, info};

use super::command::BuildCommand;
use super::host::{HostInfo, Os};
use super::matrix::BuildMatrix;
use super::msvc::ClCompiler;
use crate::utils;

/// Something that can run a [`BuildCommand`] to completion and report its exit code.
pub trait CommandRunner {
    fn run(&mut self, cmd: &BuildCommand) -> Result<i32>;
}

/// Runs commands through the system shell with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&mut self, cmd: &BuildCommand) -> Result<i32> {
        utils::shell_execute(&cmd.to_string())
    }
}

impl<F> CommandRunner for F
where
    F: FnMut(&BuildCommand) -> Result<i32>,
{
    fn run(&mut self, cmd: &BuildCommand) -> Result<i32> {
        self(cmd)
    }
}

/// The commands to run on a host that passed the environment checks.
#[derive(Debug)]
pub struct Plan {
    commands: Vec<BuildCommand>,
}

impl Plan {
    /// Check the host environment and enumerate the build commands for it.
    ///
    /// `probe_cl` is only called on Windows hosts, see [`probe_cl`](super::msvc::probe_cl).
    ///
    /// # Errors
    ///
    /// - The host is not 64-bit.
    /// - On Windows, `cl` is already callable from the current environment.
    pub fn prepare<F>(host: HostInfo, probe_cl: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Option<ClCompiler>>,
    {
        debug!(
            "host: os [{}], machine [{}], {}-bit",
            host.os, host.machine, host.arch
        );
        ensure!(host.is_64bit(), "Use 64-bit OS for builds");

        if host.os == Os::Windows {
            if let Some(cl) = probe_cl()? {
                bail!(
                    "Run build in command line without VC vars! \
                    (found CL compiler version [{}] for [{}])",
                    cl.version,
                    cl.arch
                );
            }
        }

        let commands = BuildMatrix::for_os(host.os).commands();
        Ok(Self { commands })
    }

    pub fn commands(&self) -> &[BuildCommand] {
        &self.commands
    }

    /// Print every command line that is going to be executed.
    pub fn write_summary<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Commands to execute:")?;
        for cmd in &self.commands {
            writeln!(out, "  {cmd}")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Run the commands in order, stopping at the first one that does not exit with `0`.
    pub fn execute<R: CommandRunner>(self, runner: &mut R) -> Result<()> {
        let total = self.commands.len();
        for (idx, cmd) in self.commands.iter().enumerate() {
            info!("running build {}/{total}: {cmd}", idx + 1);
            match runner.run(cmd) {
                Ok(0) => (),
                Ok(code) => bail!("Stopped due to error for: {cmd} (exit code: {code})"),
                Err(e) => return Err(e.context(format!("Stopped due to error for: {cmd}"))),
            }
        }
        info!("all {total} builds finished successfully");
        Ok(())
    }
}
