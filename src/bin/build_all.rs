use anyhow::Result;
use tdm_deps::cli;

fn main() -> Result<()> {
    cli::parse_build_all_cli().execute()
}
