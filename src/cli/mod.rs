//! Contains all the definition of command line arguments.

mod build_all;
mod common;
mod recipe;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::core::recipe::DEFAULT_MANIFEST_NAME;
use crate::utils;

/// Build every third-party dependency configuration for the current OS with conan.
///
/// The commands are printed and confirmed before anything is built.
#[derive(Parser, Default, Debug)]
#[command(version, about)]
pub struct BuildAll {
    /// Enable verbose output
    #[arg(hide = true, short, long, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Suppress non-critical messages
    #[arg(hide = true, short, long, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Do not ask for confirmation before running the builds
    #[arg(long)]
    pub unattended: bool,
}

/// Fetch, patch and package a third-party library from its recipe.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct RecipeCli {
    /// Enable verbose output
    #[arg(hide = true, short, long, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Suppress non-critical messages
    #[arg(hide = true, short, long, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Path to the recipe manifest
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath, default_value = DEFAULT_MANIFEST_NAME)]
    manifest: PathBuf,
    /// Build another version than the one in the manifest
    #[arg(long, value_name = "VERSION")]
    version_override: Option<String>,
    /// Folder to work in, defaulting to `build/<name>-<version>`
    #[arg(long, value_name = "PATH", value_hint = ValueHint::DirPath)]
    build_folder: Option<PathBuf>,
    /// Folder to place the packaged files, defaulting to `<build folder>/package`
    #[arg(long, value_name = "PATH", value_hint = ValueHint::DirPath)]
    package_folder: Option<PathBuf>,
    #[command(subcommand)]
    command: RecipeSubcommands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum RecipeSubcommands {
    /// Print the name of the source folder
    Layout,
    /// Download and unpack the pinned sources
    Source,
    /// Apply patches and source modifications
    Build,
    /// Copy headers, sources and licenses into the package folder
    Package,
    /// Run `source`, `build` and `package` in order
    All,
}

impl BuildAll {
    pub fn execute(&self) -> Result<()> {
        setup(self.verbose, self.quiet)?;

        build_all::execute(self)
    }
}

impl RecipeCli {
    pub fn execute(&self) -> Result<()> {
        setup(self.verbose, self.quiet)?;

        recipe::execute(self)
    }
}

pub fn parse_build_all_cli() -> BuildAll {
    BuildAll::parse()
}

pub fn parse_recipe_cli() -> RecipeCli {
    RecipeCli::parse()
}

fn setup(verbose: bool, quiet: bool) -> Result<()> {
    utils::Logger::new().verbose(verbose).quiet(quiet).setup()
}
