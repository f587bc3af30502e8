use anyhow::Result;
use tdm_deps::cli;

fn main() -> Result<()> {
    cli::parse_recipe_cli().execute()
}
