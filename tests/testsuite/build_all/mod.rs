use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use snapbox::cmd::Command;
use crate::BinCommandExt;
use tdm_test_support::paths;
use tdm_test_support::prelude::*;

const FAKE_CONAN: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_CONAN_LOG"
n=$(wc -l < "$FAKE_CONAN_LOG")
if [ "$n" -ge "${FAKE_CONAN_FAIL_AT:-999}" ]; then
    exit 1
fi
"#;

fn stdout_of(cmd: Command) -> (bool, String, String) {
    let output = cmd.output().unwrap();
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

/// `PATH` with the fake `conan` directory in front.
fn path_with(bin_dir: &Path) -> OsString {
    let old = env::var_os("PATH").unwrap_or_default();
    env::join_paths(std::iter::once(bin_dir.to_path_buf()).chain(env::split_paths(&old))).unwrap()
}

fn invocations(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(ToOwned::to_owned)
        .collect()
}

#[tdm_test]
fn help() {
    let (ok, stdout, _) = stdout_of(Command::build_all().arg("--help"));
    assert!(ok);
    assert!(stdout.contains("--unattended"));
    assert!(!stdout.contains("--verbose"));
}

#[tdm_test]
fn refuses_32bit_host() {
    let (ok, stdout, stderr) = stdout_of(
        Command::build_all()
            .arg("--unattended")
            .env("TDM_OVERRIDE_HOST", "linux-32")
            .current_dir(paths::home()),
    );
    assert!(!ok);
    assert!(!stdout.contains("Commands to execute"));
    assert!(stderr.contains("Use 64-bit OS for builds"));
}

#[tdm_test]
fn invalid_host_override() {
    let (ok, _, stderr) = stdout_of(
        Command::build_all()
            .arg("--unattended")
            .env("TDM_OVERRIDE_HOST", "amiga-64")
            .current_dir(paths::home()),
    );
    assert!(!ok);
    assert!(stderr.contains("amiga"));
}

#[cfg(unix)]
#[tdm_test]
fn runs_every_job_in_order() {
    let project = ProjectBuilder::from(paths::home())
        .executable("bin/conan", FAKE_CONAN)
        .build();
    let log = project.join("conan.log");

    let (ok, stdout, stderr) = stdout_of(
        Command::build_all()
            .arg("--unattended")
            .env("TDM_OVERRIDE_HOST", "linux-64")
            .env("PATH", path_with(&project.join("bin")))
            .env("FAKE_CONAN_LOG", &log)
            .current_dir(project.root()),
    );
    assert!(ok, "stdout:\n{stdout}\nstderr:\n{stderr}");
    assert!(stdout.contains("Commands to execute:"));

    let common = "install . -pr:b profiles/base_linux -pr profiles/os_linux";
    assert_eq!(
        invocations(&log),
        [
            format!("{common} -pr profiles/arch_64 -pr profiles/build_release -s thedarkmod/*:build_type=Release -of artefacts/linux_64 -d tdm_deploy -b missing"),
            format!("{common} -pr profiles/arch_64 -pr profiles/build_release -s thedarkmod/*:build_type=Debug -of artefacts/linux_64 -d tdm_deploy -b missing"),
            format!("{common} -pr profiles/arch_32 -pr profiles/build_release -s thedarkmod/*:build_type=Release -of artefacts/linux_32 -d tdm_deploy -b missing"),
            format!("{common} -pr profiles/arch_32 -pr profiles/build_release -s thedarkmod/*:build_type=Debug -of artefacts/linux_32 -d tdm_deploy -b missing"),
        ]
    );
}

#[cfg(unix)]
#[tdm_test]
fn stops_after_first_failure() {
    let project = ProjectBuilder::from(paths::home())
        .executable("bin/conan", FAKE_CONAN)
        .build();
    let log = project.join("conan.log");

    let (ok, _, stderr) = stdout_of(
        Command::build_all()
            .arg("--unattended")
            .env("TDM_OVERRIDE_HOST", "linux-64")
            .env("PATH", path_with(&project.join("bin")))
            .env("FAKE_CONAN_LOG", &log)
            .env("FAKE_CONAN_FAIL_AT", "2")
            .current_dir(project.root()),
    );
    assert!(!ok);

    let ran = invocations(&log);
    assert_eq!(ran.len(), 2);
    assert!(ran[1].contains("build_type=Debug -of artefacts/linux_64"));
    assert!(stderr.contains("Stopped due to error for: conan install ."));
    assert!(stderr.contains("-s thedarkmod/*:build_type=Debug -of artefacts/linux_64"));
}

#[cfg(unix)]
#[tdm_test]
fn declined_prompt_runs_nothing() {
    let project = ProjectBuilder::from(paths::home())
        .executable("bin/conan", FAKE_CONAN)
        .build();
    let log = project.join("conan.log");

    let (ok, stdout, stderr) = stdout_of(
        Command::build_all()
            .stdin("y\n")
            .env("TDM_OVERRIDE_HOST", "linux-64")
            .env("PATH", path_with(&project.join("bin")))
            .env("FAKE_CONAN_LOG", &log)
            .current_dir(project.root()),
    );
    assert!(!ok);
    assert!(stdout.contains("continue? (yes/no):"));
    assert!(stderr.contains("Cancelled by user"));
    assert!(invocations(&log).is_empty());
}

#[cfg(unix)]
#[tdm_test]
fn confirmed_prompt_runs_everything() {
    let project = ProjectBuilder::from(paths::home())
        .executable("bin/conan", FAKE_CONAN)
        .build();
    let log = project.join("conan.log");

    let (ok, _, stderr) = stdout_of(
        Command::build_all()
            .stdin("yes\n")
            .env("TDM_OVERRIDE_HOST", "linux-64")
            .env("PATH", path_with(&project.join("bin")))
            .env("FAKE_CONAN_LOG", &log)
            .current_dir(project.root()),
    );
    assert!(ok, "stderr:\n{stderr}");
    assert_eq!(invocations(&log).len(), 4);
}

#[cfg(unix)]
#[tdm_test]
fn padded_yes_is_declined() {
    let project = ProjectBuilder::from(paths::home())
        .executable("bin/conan", FAKE_CONAN)
        .build();
    let log = project.join("conan.log");

    let (ok, _, stderr) = stdout_of(
        Command::build_all()
            .stdin(" yes\n")
            .env("TDM_OVERRIDE_HOST", "linux-64")
            .env("PATH", path_with(&project.join("bin")))
            .env("FAKE_CONAN_LOG", &log)
            .current_dir(project.root()),
    );
    assert!(!ok);
    assert!(stderr.contains("Cancelled by user"));
    assert!(invocations(&log).is_empty());
}
