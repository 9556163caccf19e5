use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use log::info;

use spritemoji::RunOptions;

/// Replace emoji in an HTML fragment with sprite-sheet spans.
#[derive(Debug, Parser)]
#[command(name = "spritemoji", version, about)]
struct Cli {
    /// YAML config file (defaults to ./spritemoji.yml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// emoji.json catalog, overriding `catalog_path` from the config
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// HTML input; stdin when omitted
    input: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();
    info!("Spriting {}", cli.input.as_ref().map_or("stdin".into(), |p| p.display().to_string()));

    spritemoji::run(&RunOptions {
        config: cli.config,
        catalog: cli.catalog,
        input: cli.input,
    })
}
