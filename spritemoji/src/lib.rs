pub mod spritemoji;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::spritemoji::{Catalog, Replacer, SpritemojiConfig};

/// Inputs of a single run, usually straight from the command line.
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub input: Option<PathBuf>,
}

pub fn run(opts: &RunOptions) -> Result<()> {
    let config = match &opts.config {
        Some(path) => SpritemojiConfig::load_from(path)?,
        None => SpritemojiConfig::load(),
    };

    let html = read_input(opts.input.as_deref())?;
    let output = render(&config, opts.catalog.as_deref(), &html)?;
    info!("Wrote {} bytes", output.len());

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("writing output")?;
    stdout.flush().context("flushing output")
}

/// Load the catalog named by `config` (or `catalog_override`) and transform `html`.
pub fn render(config: &SpritemojiConfig, catalog_override: Option<&Path>, html: &str) -> Result<String> {
    let catalog_path = catalog_override.unwrap_or_else(|| Path::new(&config.catalog_path));
    let catalog = Catalog::load(catalog_path)?;

    let options = config.sprite.options()?;
    Replacer::new(&catalog, options.into())
        .with_skipped_elements(config.skip_elements.iter().cloned())
        .with_shortcodes(config.expand_shortcodes)
        .replace_html(html)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}
