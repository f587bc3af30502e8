//! Package recipes for third-party libraries.
//!
//! A recipe is made of a `recipe.toml` manifest, which pins the upstream sources and the
//! patches to apply, plus four hooks:
//!
//! 1. [`layout`](Recipe::layout): name of the sub folder that holds the sources.
//! 2. [`source`](Recipe::source): download and unpack the pinned archive.
//! 3. [`build`](Recipe::build): apply patches and whatever source edits the library needs.
//! 4. [`package`](Recipe::package): copy the files that consumers need into the package folder.

mod tracy;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, ensure, Context, Result};
use log::{debug, info};
use serde::Deserialize;
use url::Url;

use crate::utils;

pub use tracy::TracyRecipe;

pub const DEFAULT_MANIFEST_NAME: &str = "recipe.toml";

/// Contents of a `recipe.toml` file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RecipeManifest {
    pub name: String,
    /// Version to build unless another one is requested.
    pub version: String,
    pub license: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Sub folder of the build folder where sources are unpacked.
    pub src_folder: String,
    /// Pinned source archives, keyed by version.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceArchive>,
    /// Patches to apply for each version, in order.
    #[serde(default)]
    pub patches: BTreeMap<String, Vec<PatchEntry>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceArchive {
    pub url: String,
    /// Hex encoded SHA-256 of the archive, checked after download when present.
    pub sha256: Option<String>,
    /// Drop the single top level directory of the archive.
    #[serde(default = "default_true")]
    pub strip_root: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PatchEntry {
    /// Path to the patch file, relative to the manifest's directory.
    pub patch_file: String,
    pub patch_description: Option<String>,
}

impl FromStr for RecipeManifest {
    type Err = anyhow::Error;
    fn from_str(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content)?;
        ensure!(!manifest.name.is_empty(), "recipe name cannot be empty");
        ensure!(
            !manifest.src_folder.is_empty(),
            "`src_folder` of recipe '{}' cannot be empty",
            manifest.name
        );
        Ok(manifest)
    }
}

impl RecipeManifest {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = utils::read_to_string(&path)?;
        content
            .parse::<Self>()
            .with_context(|| format!("invalid recipe manifest '{}'", path.as_ref().display()))
    }

    pub fn source_for(&self, version: &str) -> Result<&SourceArchive> {
        self.sources.get(version).ok_or_else(|| {
            anyhow!(
                "no source archive pinned for {} version '{version}'",
                self.name
            )
        })
    }

    pub fn patches_for(&self, version: &str) -> &[PatchEntry] {
        self.patches.get(version).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Folders a recipe works with.
#[derive(Debug, Clone)]
pub struct RecipeContext {
    /// Directory of the manifest, patch paths are relative to it.
    pub recipe_dir: PathBuf,
    pub version: String,
    pub source_folder: PathBuf,
    pub package_folder: PathBuf,
}

pub trait Recipe {
    fn manifest(&self) -> &RecipeManifest;

    fn layout(&self) -> &str {
        &self.manifest().src_folder
    }

    fn source(&self, ctx: &RecipeContext) -> Result<()> {
        fetch_source(self.manifest(), ctx)
    }

    fn build(&self, ctx: &RecipeContext) -> Result<()> {
        apply_patches(self.manifest(), ctx)
    }

    fn package(&self, ctx: &RecipeContext) -> Result<()>;
}

/// Get the hooks registered for the manifest's library.
pub fn load_recipe(manifest: RecipeManifest) -> Result<Box<dyn Recipe>> {
    match manifest.name.as_str() {
        TracyRecipe::NAME => Ok(Box::new(TracyRecipe::new(manifest))),
        other => bail!("no recipe is registered for library '{other}'"),
    }
}

/// Download the archive pinned for `ctx.version` and unpack it into the source folder.
pub fn fetch_source(manifest: &RecipeManifest, ctx: &RecipeContext) -> Result<()> {
    let archive = manifest.source_for(&ctx.version)?;
    let url = resolve_url(&archive.url, &ctx.recipe_dir)?;
    let file_name = url
        .path_segments()
        .and_then(|mut segs| segs.next_back())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("unable to get archive file name from url '{url}'"))?;

    let temp_dir = tempfile::Builder::new()
        .prefix(&format!("{}-", manifest.name))
        .tempdir()
        .context("unable to create temporary directory for downloading")?;
    let dest = temp_dir.path().join(file_name);

    info!("fetching {} {} from '{url}'", manifest.name, ctx.version);
    let checksum = utils::cli::download(file_name, &url, &dest)?;
    if let Some(expected) = &archive.sha256 {
        ensure!(
            checksum.eq_ignore_ascii_case(expected),
            "checksum mismatch for '{file_name}': expected {expected}, got {checksum}"
        );
        debug!("checksum of '{file_name}' verified");
    }

    utils::Extractable::load(&dest)?.extract_to(&ctx.source_folder, archive.strip_root)?;
    info!("sources unpacked into '{}'", ctx.source_folder.display());
    Ok(())
}

/// Apply every patch listed for `ctx.version`, in order, stopping at the first failure.
pub fn apply_patches(manifest: &RecipeManifest, ctx: &RecipeContext) -> Result<()> {
    let patches = manifest.patches_for(&ctx.version);
    if patches.is_empty() {
        return Ok(());
    }
    ensure!(
        utils::cmd_exist("git"),
        "`git` is required to apply patches but was not found in PATH"
    );

    // git must not resolve patch paths against an enclosing repository.
    let ceiling = ctx
        .source_folder
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.source_folder.clone());

    for patch in patches {
        let patch_path = utils::to_nomalized_abspath(ctx.recipe_dir.join(&patch.patch_file))?;
        ensure!(
            patch_path.is_file(),
            "patch file '{}' does not exist",
            patch_path.display()
        );
        info!(
            "applying patch '{}'{}",
            patch.patch_file,
            patch
                .patch_description
                .as_deref()
                .map(|d| format!(": {d}"))
                .unwrap_or_default()
        );
        let patch_arg = utils::stringify_path(&patch_path)?;
        utils::execute_in(
            &ctx.source_folder,
            "git",
            &["apply", "-p1", patch_arg.as_str()],
            &[("GIT_CEILING_DIRECTORIES", ceiling.as_os_str())],
        )
        .with_context(|| format!("failed to apply patch '{}'", patch.patch_file))?;
    }
    Ok(())
}

/// Urls without a scheme are treated as paths relative to the recipe directory.
fn resolve_url(raw: &str, recipe_dir: &Path) -> Result<Url> {
    if raw.contains("://") {
        return utils::parse_url(raw);
    }
    let path = utils::to_nomalized_abspath(recipe_dir.join(raw))?;
    Url::from_file_path(&path).map_err(|_| anyhow!("invalid source path '{}'", path.display()))
}
