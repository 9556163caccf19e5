use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use confik::{Configuration, EnvSource};
use serde::{Deserialize, Serialize};

use self::yaml::YamlFileSource;
use crate::spritemoji::sprite::{
    self, DEFAULT_SHEET_COLUMNS, DEFAULT_SHEET_ROWS, DEFAULT_SIZE, SheetSize, SpriteOptions,
};

pub const CONFIG_FILE: &str = "spritemoji.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct SpriteConfig {
    /// One of `""`, `apple`, `facebook`, `twitter`, `google`.
    #[confik(default = default_set())]
    pub set: String,
    /// Rendered width and height in pixels.
    #[confik(default = DEFAULT_SIZE)]
    pub size: u32,
    #[confik(default = 64u32)]
    pub sheet_size: u32,
    #[confik(default = DEFAULT_SHEET_ROWS)]
    pub sheet_rows: u32,
    #[confik(default = DEFAULT_SHEET_COLUMNS)]
    pub sheet_columns: u32,
    /// Sheet URL with `${set}` and `${sheetSize}` placeholders.
    #[confik(default)]
    pub background_template: Option<String>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            set: default_set(),
            size: DEFAULT_SIZE,
            sheet_size: SheetSize::default().px(),
            sheet_rows: DEFAULT_SHEET_ROWS,
            sheet_columns: DEFAULT_SHEET_COLUMNS,
            background_template: None,
        }
    }
}

impl SpriteConfig {
    pub fn options(&self) -> Result<SpriteOptions> {
        Ok(SpriteOptions {
            set: self.set.parse()?,
            size: self.size,
            sheet_size: SheetSize::try_from(self.sheet_size)?,
            sheet_rows: self.sheet_rows,
            sheet_columns: self.sheet_columns,
            background: self
                .background_template
                .clone()
                .map(sprite::background_from_template),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Configuration)]
pub struct SpritemojiConfig {
    /// emoji-datasource style `emoji.json`.
    #[confik(default = default_catalog_path())]
    pub catalog_path: String,
    #[confik(default)]
    pub sprite: SpriteConfig,
    /// Elements whose text is left alone.
    #[confik(default = default_skip_elements())]
    pub skip_elements: Vec<String>,
    /// Turn `:shortcode:` tokens into glyphs before matching.
    #[confik(default)]
    pub expand_shortcodes: bool,
}

fn default_set() -> String {
    "apple".into()
}

fn default_catalog_path() -> String {
    "emoji.json".into()
}

fn default_skip_elements() -> Vec<String> {
    vec!["script".into(), "style".into(), "textarea".into()]
}

impl Default for SpritemojiConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            sprite: SpriteConfig::default(),
            skip_elements: default_skip_elements(),
            expand_shortcodes: false,
        }
    }
}

impl SpritemojiConfig {
    /// Load configuration from `spritemoji.yml` in the working directory (if
    /// present) and environment variables.
    /// Falls back to the compiled-in defaults when parsing fails.
    pub fn load() -> Self {
        let config_path = Path::new(CONFIG_FILE);
        let mut builder = SpritemojiConfig::builder();

        if config_path.exists() {
            builder.override_with(YamlFileSource::new(config_path));
        }

        builder.override_with(EnvSource::new());

        match builder.try_build() {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Failed to load {CONFIG_FILE} or env overrides: {err}. Using defaults.");
                SpritemojiConfig::default()
            }
        }
    }

    /// Load an explicit config file. Unlike [`SpritemojiConfig::load`], errors are returned.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            anyhow::bail!("config file {} does not exist", path.display());
        }

        let mut builder = SpritemojiConfig::builder();
        builder.override_with(YamlFileSource::new(&path));
        builder.override_with(EnvSource::new());
        builder
            .try_build()
            .with_context(|| format!("loading config from {}", path.display()))
    }
}

mod yaml {
    use std::error::Error;
    use std::path::PathBuf;

    use confik::Source;
    use serde::de::DeserializeOwned;
    use serde_yaml;

    #[derive(Debug)]
    pub struct YamlFileSource {
        path: PathBuf,
    }

    impl YamlFileSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl<T> Source<T> for YamlFileSource
    where
        T: DeserializeOwned + confik::ConfigurationBuilder,
    {
        fn allows_secrets(&self) -> bool {
            false
        }

        fn provide(&self) -> Result<T, Box<dyn Error + Sync + Send>> {
            let contents = std::fs::read_to_string(&self.path)?;
            let parsed = serde_yaml::from_str(&contents)?;
            Ok(parsed)
        }
    }
}
