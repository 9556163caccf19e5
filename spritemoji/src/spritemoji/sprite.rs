use std::fmt;
use std::str::FromStr;

use anyhow::{Error, Result, bail};

use crate::spritemoji::types::SpriteCoord;

pub const DEFAULT_SIZE: u32 = 24;
pub const DEFAULT_SHEET_ROWS: u32 = 57;
pub const DEFAULT_SHEET_COLUMNS: u32 = 57;
pub const DEFAULT_BACKGROUND_TEMPLATE: &str =
    "https://unpkg.com/emoji-datasource-${set}@5.0.1/img/${set}/sheets-256/${sheetSize}.png";

/// Locates the sprite sheet image for a set name and sheet size.
pub type BackgroundFn = Box<dyn Fn(&str, u32) -> String + Send + Sync>;

/// Named sprite sets published by emoji-datasource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SpriteSet {
    /// The empty set name; the background locator decides what it means.
    Unnamed,
    #[default]
    Apple,
    Facebook,
    Twitter,
    Google,
}

impl SpriteSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpriteSet::Unnamed => "",
            SpriteSet::Apple => "apple",
            SpriteSet::Facebook => "facebook",
            SpriteSet::Twitter => "twitter",
            SpriteSet::Google => "google",
        }
    }
}

impl FromStr for SpriteSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "" => SpriteSet::Unnamed,
            "apple" => SpriteSet::Apple,
            "facebook" => SpriteSet::Facebook,
            "twitter" => SpriteSet::Twitter,
            "google" => SpriteSet::Google,
            other => bail!("unknown sprite set {other:?}"),
        })
    }
}

impl fmt::Display for SpriteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel size of one cell in the published sheets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SheetSize {
    Px16,
    Px20,
    Px32,
    #[default]
    Px64,
}

impl SheetSize {
    pub fn px(&self) -> u32 {
        match self {
            SheetSize::Px16 => 16,
            SheetSize::Px20 => 20,
            SheetSize::Px32 => 32,
            SheetSize::Px64 => 64,
        }
    }
}

impl TryFrom<u32> for SheetSize {
    type Error = Error;

    fn try_from(px: u32) -> Result<Self> {
        Ok(match px {
            16 => SheetSize::Px16,
            20 => SheetSize::Px20,
            32 => SheetSize::Px32,
            64 => SheetSize::Px64,
            other => bail!("unsupported sheet size {other}; expected 16, 20, 32 or 64"),
        })
    }
}

/// Everything the built-in sprite span needs besides the emoji itself.
pub struct SpriteOptions {
    pub set: SpriteSet,
    pub size: u32,
    pub sheet_size: SheetSize,
    pub sheet_rows: u32,
    pub sheet_columns: u32,
    pub background: Option<BackgroundFn>,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            set: SpriteSet::default(),
            size: DEFAULT_SIZE,
            sheet_size: SheetSize::default(),
            sheet_rows: DEFAULT_SHEET_ROWS,
            sheet_columns: DEFAULT_SHEET_COLUMNS,
            background: None,
        }
    }
}

impl fmt::Debug for SpriteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteOptions")
            .field("set", &self.set)
            .field("size", &self.size)
            .field("sheet_size", &self.sheet_size)
            .field("sheet_rows", &self.sheet_rows)
            .field("sheet_columns", &self.sheet_columns)
            .field("background", &self.background.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl SpriteOptions {
    pub fn background_url(&self) -> String {
        let set = self.set.as_str();
        let sheet_size = self.sheet_size.px();
        match &self.background {
            Some(locate) => locate(set, sheet_size),
            None => expand_template(DEFAULT_BACKGROUND_TEMPLATE, set, sheet_size),
        }
    }

    /// Inline CSS drawing the cell at `sheet` scaled to `size` pixels.
    pub fn style(&self, sheet: SpriteCoord) -> String {
        let rows = self.sheet_rows.max(1);
        let columns = self.sheet_columns.max(1);
        let span_x = f64::from(columns.saturating_sub(1).max(1));
        let span_y = f64::from(rows.saturating_sub(1).max(1));

        format!(
            "width: {size}px; height: {size}px; display: inline-block; \
             background-image: url(\"{url}\"); \
             background-size: {size_x}% {size_y}%; \
             background-position: {pos_x}% {pos_y}%;",
            size = self.size,
            url = css_string(&self.background_url()),
            size_x = 100 * columns,
            size_y = 100 * rows,
            pos_x = 100.0 * f64::from(sheet.x) / span_x,
            pos_y = 100.0 * f64::from(sheet.y) / span_y,
        )
    }
}

/// Substitute `${set}` and `${sheetSize}` in a sheet URL template.
pub fn expand_template(template: &str, set: &str, sheet_size: u32) -> String {
    template
        .replace("${set}", set)
        .replace("${sheetSize}", &sheet_size.to_string())
}

/// A background locator built from a URL template.
pub fn background_from_template(template: impl Into<String>) -> BackgroundFn {
    let template = template.into();
    Box::new(move |set: &str, sheet_size: u32| expand_template(&template, set, sheet_size))
}

fn css_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
