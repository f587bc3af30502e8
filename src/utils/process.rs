use std::env;
use std::ffi::OsStr;
use std::fmt::Debug;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        const SHELL: &str = "cmd.exe";
        const START_ARG: &str = "/C";
    } else {
        const SHELL: &str = "sh";
        const START_ARG: &str = "-c";
    }
}

macro_rules! exec_err {
    ($p:expr, $args:expr, $ext_msg:expr) => {
        anyhow::anyhow!(
            "error occured when executing command `{} {}`{}",
            $p.as_ref().to_string_lossy().to_string(),
            $args
                .iter()
                .map(|oss| oss.as_ref().to_string_lossy().to_string())
                .collect::<std::vec::Vec<_>>()
                .join(" "),
            $ext_msg
        )
    };
}

/// Check if a command/program exist in the `PATH`.
pub fn cmd_exist(cmd: &str) -> bool {
    let path = env::var_os("PATH").unwrap_or_default();
    let file_name = format!("{cmd}{}", env::consts::EXE_SUFFIX);
    env::split_paths(&path)
        .map(|p| p.join(&file_name))
        .any(|p| p.is_file())
}

/// Run a full command line through the system shell (`sh -c` on Unix, `cmd.exe /C` on Windows)
/// and wait for it, returning its exit code.
///
/// Stdio is inherited, so the output of the child shows up in the current console as it runs.
///
/// # Errors
///
/// This will return errors if:
/// 1. The shell cannot be launched.
/// 2. The child was terminated by a signal, thus has no exit code.
pub fn shell_execute(cmd_line: &str) -> Result<i32> {
    let mut command = Command::new(SHELL);
    command
        .arg(START_ARG)
        .arg(cmd_line)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let status = command
        .status()
        .with_context(|| format!("unable to launch `{SHELL}` to run `{cmd_line}`"))?;

    status.code().ok_or_else(|| {
        anyhow!("failed to retrive exit code because `{cmd_line}` was terminated by a signal")
    })
}

/// Execute a program directly inside of a specific working directory,
/// with `envs` added to its environment.
///
/// # Errors
///
/// This will return errors if:
/// 1. The specific command cannot be execute.
/// 2. The command was executed but failed.
pub fn execute_in<D, P, A>(dir: D, program: P, args: &[A], envs: &[(&str, &OsStr)]) -> Result<()>
where
    D: AsRef<Path>,
    P: AsRef<OsStr> + Debug,
    A: AsRef<OsStr>,
{
    let mut command = Command::new(program.as_ref());
    command
        .args(args)
        .envs(envs.iter().copied())
        .current_dir(dir.as_ref())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped());

    let output = command
        .output()
        .with_context(|| exec_err!(program, args, ""))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(exec_err!(program, args, format!(":\n{stderr}")));
    }

    Ok(())
}

/// Run a program with captured output and return whatever it wrote to `stderr`,
/// regardless of its exit status.
///
/// Returns `Ok(None)` if the program could not be found.
pub fn capture_stderr<P, A>(program: P, args: &[A]) -> Result<Option<String>>
where
    P: AsRef<OsStr> + Debug,
    A: AsRef<OsStr>,
{
    let mut command = Command::new(program.as_ref());
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Prevent CMD window popup
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);
    }

    match command.output() {
        Ok(output) => Ok(Some(String::from_utf8_lossy(&output.stderr).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| exec_err!(program, args, "")),
    }
}
