mod build_all;
mod env;
mod file_utils;
mod tdm_recipe;

use snapbox::cmd::Command;

/// Commands for the binaries of this package.
pub(crate) trait BinCommandExt {
    fn build_all() -> Self;
    fn tdm_recipe() -> Self;
}

impl BinCommandExt for Command {
    fn build_all() -> Self {
        Self::new(snapbox::cmd::cargo_bin!("build-all"))
    }

    fn tdm_recipe() -> Self {
        Self::new(snapbox::cmd::cargo_bin!("tdm-recipe"))
    }
}
