use std::sync::OnceLock;

use anyhow::{ensure, Result};
use log::{debug, info};
use regex::Regex;

use super::{apply_patches, Recipe, RecipeContext, RecipeManifest};
use crate::utils;

/// Header whose OpenGL calls collide with the engine's own GL loader.
const OPENGL_HEADER: &str = "TracyOpenGL.hpp";
/// Calls in [`OPENGL_HEADER`] get these prefixes renamed to `qgl*`.
const GL_PREFIXES: [&str; 3] = ["glGet", "glGen", "glQuery"];

const SOURCE_DIRS: [&str; 3] = ["client", "common", "libbacktrace"];
const HEADER_EXTS: [&str; 2] = ["h", "hpp"];
const TOP_HEADERS: [&str; 3] = ["Tracy.hpp", "TracyC.h", OPENGL_HEADER];
const TOP_SOURCES: [&str; 1] = ["TracyClient.cpp"];
const LICENSES: [&str; 2] = ["LICENSE", "libbacktrace/LICENSE"];

static GL_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

/// Matches the GL prefixes at the start of an identifier only. Occurrences inside a longer
/// identifier (`qglGet...`, `_glGenX`, `myglQuery`) are left alone.
fn gl_prefix_re() -> &'static Regex {
    GL_PREFIX_RE.get_or_init(|| {
        Regex::new(&format!(r"\b({})", GL_PREFIXES.join("|"))).expect("invalid GL prefix pattern")
    })
}

/// Tracy, the frame profiler.
///
/// Only the client part is packaged, as sources, so that the game compiles it together with
/// its own code.
#[derive(Debug)]
pub struct TracyRecipe {
    manifest: RecipeManifest,
}

impl TracyRecipe {
    pub const NAME: &'static str = "tracy";

    pub fn new(manifest: RecipeManifest) -> Self {
        Self { manifest }
    }
}

impl Recipe for TracyRecipe {
    fn manifest(&self) -> &RecipeManifest {
        &self.manifest
    }

    fn build(&self, ctx: &RecipeContext) -> Result<()> {
        apply_patches(&self.manifest, ctx)?;

        let header = ctx.source_folder.join(OPENGL_HEADER);
        let count = utils::replace_in_file(&header, gl_prefix_re(), "q$1")?;
        info!("renamed {count} OpenGL calls in '{OPENGL_HEADER}'");
        Ok(())
    }

    fn package(&self, ctx: &RecipeContext) -> Result<()> {
        let src = &ctx.source_folder;
        let include_dir = ctx.package_folder.join("include");
        let src_dir = ctx.package_folder.join("src");
        let licenses_dir = ctx.package_folder.join("licenses");

        for dir in SOURCE_DIRS {
            for ext in HEADER_EXTS {
                let copied = utils::copy_by_extension(src, dir, ext, &include_dir)?;
                debug!("packaged {} '*.{ext}' files from '{dir}'", copied.len());
            }
            let copied = utils::copy_by_extension(src, dir, "cpp", &src_dir)?;
            debug!("packaged {} '*.cpp' files from '{dir}'", copied.len());
        }

        utils::copy_into(src.join("server").join("TracyVersion.hpp"), include_dir.join("common"))?;
        for file in TOP_HEADERS {
            utils::copy_into(src.join(file), &include_dir)?;
        }
        for file in TOP_SOURCES {
            utils::copy_into(src.join(file), &src_dir)?;
        }
        for license in LICENSES {
            let from = src.join(license);
            ensure!(from.is_file(), "license file '{license}' is missing");
            utils::copy(&from, licenses_dir.join(license))?;
        }

        info!("packaged {} into '{}'", Self::NAME, ctx.package_folder.display());
        Ok(())
    }
}
