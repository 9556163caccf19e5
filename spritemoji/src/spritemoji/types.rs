use serde::{Deserialize, Serialize};

/// Position of an emoji image inside a sprite sheet, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SpriteCoord {
    /// Column (`sheet_x` in emoji-datasource).
    pub x: u32,
    /// Row (`sheet_y` in emoji-datasource).
    pub y: u32,
}

impl SpriteCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkinVariation {
    pub unified: String,
    pub native: String,
    pub sheet: SpriteCoord,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmojiRecord {
    pub unified: String,
    pub native: String,
    pub sheet: SpriteCoord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub short_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skin_variations: Vec<SkinVariation>,
}

impl EmojiRecord {
    /// Every literal glyph sequence this record renders as: the base first,
    /// then each skin variation.
    pub fn natives(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.native.as_str())
            .chain(self.skin_variations.iter().map(|v| v.native.as_str()))
    }

    /// Copy of this record drawn with the given variation's sprite.
    pub fn with_variation(&self, variation: &SkinVariation) -> Self {
        Self {
            sheet: variation.sheet,
            ..self.clone()
        }
    }
}

/// One matcher hit inside a text span. Offsets are byte offsets into the
/// span's text at the time of the scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchResult<'t> {
    pub start: usize,
    pub len: usize,
    pub raw: &'t str,
}

impl MatchResult<'_> {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}
