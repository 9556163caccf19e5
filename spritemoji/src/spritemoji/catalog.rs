use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::spritemoji::hexcode::{hex_id, native_from_unified};
use crate::spritemoji::matcher::CompiledMatcher;
use crate::spritemoji::types::{EmojiRecord, SkinVariation, SpriteCoord};

/// Entry shape of emoji-datasource's `emoji.json`. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct RawEmoji {
    unified: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    short_names: Vec<String>,
    sheet_x: u32,
    sheet_y: u32,
    #[serde(default)]
    skin_variations: BTreeMap<String, RawVariation>,
}

#[derive(Debug, Deserialize)]
struct RawVariation {
    unified: String,
    sheet_x: u32,
    sheet_y: u32,
}

impl RawEmoji {
    fn into_record(self) -> Result<EmojiRecord> {
        let native = native_from_unified(&self.unified)?;
        let skin_variations = self
            .skin_variations
            .into_values()
            .map(|v| {
                Ok(SkinVariation {
                    native: native_from_unified(&v.unified)?,
                    unified: v.unified,
                    sheet: SpriteCoord::new(v.sheet_x, v.sheet_y),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EmojiRecord {
            unified: self.unified,
            native,
            sheet: SpriteCoord::new(self.sheet_x, self.sheet_y),
            name: self.name,
            short_names: self.short_names,
            skin_variations,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    record: usize,
    variation: Option<usize>,
}

/// The table of known emoji plus the matcher compiled from it.
///
/// The matcher is built on first use and kept until the record set changes.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<EmojiRecord>,
    by_unified: HashMap<String, Slot>,
    by_shortcode: HashMap<String, usize>,
    matcher: OnceCell<CompiledMatcher>,
    builds: AtomicUsize,
}

impl Catalog {
    pub fn new(records: Vec<EmojiRecord>) -> Self {
        let mut catalog = Self::default();
        catalog.extend(records);
        catalog
    }

    /// Parse an emoji-datasource style JSON array.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<RawEmoji> = serde_json::from_str(json).context("parsing emoji catalog")?;
        let records = raw
            .into_iter()
            .map(|emoji| {
                let unified = emoji.unified.clone();
                emoji
                    .into_record()
                    .with_context(|| format!("catalog record {unified}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading emoji catalog at {}", path.display()))?;
        let catalog =
            Self::from_json(&json).with_context(|| format!("loading {}", path.display()))?;
        info!(
            "Loaded {} emoji ({} sequences) from {}",
            catalog.records.len(),
            catalog.by_unified.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Add records and drop the cached matcher so the next scan sees them.
    /// Identities already present are skipped.
    ///
    /// Records are indexed by the hex id of their glyphs, so `1f44c` and
    /// `1F44C` in a catalog file name the same emoji.
    pub fn extend(&mut self, records: impl IntoIterator<Item = EmojiRecord>) {
        for record in records {
            let index = self.records.len();
            let id = hex_id(&record.native);
            if self.by_unified.contains_key(&id) {
                warn!("Duplicate emoji identity {}; keeping the first", record.unified);
                continue;
            }

            self.by_unified.insert(
                id,
                Slot {
                    record: index,
                    variation: None,
                },
            );
            for (i, variation) in record.skin_variations.iter().enumerate() {
                let id = hex_id(&variation.native);
                if self.by_unified.contains_key(&id) {
                    warn!(
                        "Duplicate skin variation {} under {}; keeping the first",
                        variation.unified, record.unified
                    );
                    continue;
                }
                self.by_unified.insert(
                    id,
                    Slot {
                        record: index,
                        variation: Some(i),
                    },
                );
            }
            for short_name in &record.short_names {
                self.by_shortcode.entry(short_name.clone()).or_insert(index);
            }

            self.records.push(record);
        }

        self.matcher.take();
    }

    pub fn records(&self) -> &[EmojiRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for a unified identity as [`hex_id`] spells it. A skin variation
    /// resolves to its parent record drawn with the variation's sprite.
    pub fn lookup(&self, unified: &str) -> Option<Cow<'_, EmojiRecord>> {
        let slot = self.by_unified.get(unified)?;
        let record = &self.records[slot.record];
        match slot.variation {
            None => Some(Cow::Borrowed(record)),
            Some(i) => Some(Cow::Owned(record.with_variation(&record.skin_variations[i]))),
        }
    }

    /// Resolve a matched glyph sequence.
    pub fn resolve(&self, raw: &str) -> Option<Cow<'_, EmojiRecord>> {
        self.lookup(&hex_id(raw))
    }

    pub fn by_shortcode(&self, short_name: &str) -> Option<&EmojiRecord> {
        self.by_shortcode.get(short_name).map(|&i| &self.records[i])
    }

    /// The compiled matcher, built on first call.
    pub fn matcher(&self) -> Result<&CompiledMatcher> {
        self.matcher.get_or_try_init(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            CompiledMatcher::build(&self.records)
        })
    }

    /// How many times the matcher has been compiled for this catalog.
    pub fn matcher_builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}
