//! Utility functions/types to use across the whole crate.

mod download;
mod extraction;
mod file_system;
mod log;
mod process;

pub use download::{cli, sha256_of_file, DownloadOpt};
pub use extraction::Extractable;
pub use file_system::*;
pub use self::log::{log_file_path, Logger, LOG_FILE_ENV};
pub use process::*;

use anyhow::{Context, Result};
use url::Url;

pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).with_context(|| format!("failed to parse url: {url}"))
}
