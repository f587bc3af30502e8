use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use log::info;

use super::{RecipeCli, RecipeSubcommands};
use crate::core::recipe::{load_recipe, Recipe, RecipeContext, RecipeManifest};
use crate::utils;

/// Execute one (or every) recipe hook.
pub(super) fn execute(args: &RecipeCli) -> Result<()> {
    let manifest_path = utils::to_nomalized_abspath(args.manifest.as_path())?;
    let manifest = RecipeManifest::load(&manifest_path)?;
    let recipe_dir = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("'{}' has no parent directory", manifest_path.display()))?;

    let version = args
        .version_override
        .clone()
        .unwrap_or_else(|| manifest.version.clone());
    let build_folder = match &args.build_folder {
        Some(dir) => dir.clone(),
        None => PathBuf::from("build").join(format!("{}-{version}", manifest.name)),
    };
    let build_folder = utils::to_nomalized_abspath(build_folder)?;

    let recipe = load_recipe(manifest)?;
    let package_folder = match &args.package_folder {
        Some(dir) => utils::to_nomalized_abspath(dir.as_path())?,
        None => build_folder.join("package"),
    };
    let ctx = RecipeContext {
        recipe_dir,
        version,
        source_folder: build_folder.join(recipe.layout()),
        package_folder,
    };

    run_hook(recipe.as_ref(), args.command, &ctx)
}

fn run_hook(recipe: &dyn Recipe, hook: RecipeSubcommands, ctx: &RecipeContext) -> Result<()> {
    let name = &recipe.manifest().name;
    match hook {
        RecipeSubcommands::Layout => println!("{}", recipe.layout()),
        RecipeSubcommands::Source => recipe.source(ctx)?,
        RecipeSubcommands::Build => recipe.build(ctx)?,
        RecipeSubcommands::Package => recipe.package(ctx)?,
        RecipeSubcommands::All => {
            info!("preparing {name} {}", ctx.version);
            recipe.source(ctx)?;
            recipe.build(ctx)?;
            recipe.package(ctx)?;
        }
    }
    Ok(())
}
