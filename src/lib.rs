#![deny(unused_must_use)]

pub mod cli;
pub mod core;
pub mod utils;

// Exports
pub use self::core::command::BuildCommand;
pub use self::core::driver::{CommandRunner, Plan, ShellRunner};
pub use self::core::host::{HostInfo, Os};
pub use self::core::matrix::{Arch, BuildConfig, BuildJob, BuildMatrix, LibsBuildMode};
