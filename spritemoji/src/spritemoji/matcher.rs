use anyhow::{Context, Result};
use log::debug;
use regex::{Regex, RegexBuilder};

use crate::spritemoji::types::{EmojiRecord, MatchResult};

/// Compiled alternation over every glyph sequence in a catalog.
///
/// Alternatives are ordered longest first. The regex engine prefers the
/// earliest alternative at a given position, so a skin-toned sequence wins
/// over the bare glyph it starts with.
#[derive(Debug)]
pub struct CompiledMatcher {
    regex: Option<Regex>,
    alternatives: usize,
}

impl CompiledMatcher {
    pub fn build<'a>(records: impl IntoIterator<Item = &'a EmojiRecord>) -> Result<Self> {
        let mut literals: Vec<String> = records
            .into_iter()
            .flat_map(EmojiRecord::natives)
            .filter(|native| !native.is_empty())
            .map(regex::escape)
            .collect();

        if literals.is_empty() {
            return Ok(Self {
                regex: None,
                alternatives: 0,
            });
        }

        literals.sort_by(|a, b| b.len().cmp(&a.len()));
        let alternatives = literals.len();
        let pattern = format!("(?:{})", literals.join("|"));

        // Several thousand literals blow past the default compiled size limit.
        let regex = RegexBuilder::new(&pattern)
            .size_limit(1 << 26)
            .dfa_size_limit(1 << 24)
            .build()
            .with_context(|| format!("compiling emoji matcher over {alternatives} sequences"))?;

        debug!("Compiled emoji matcher over {alternatives} sequences");
        Ok(Self {
            regex: Some(regex),
            alternatives,
        })
    }

    /// Number of literal sequences in the alternation.
    pub fn len(&self) -> usize {
        self.alternatives
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives == 0
    }

    /// Leftmost match starting at or after byte offset `from`.
    pub fn find_at<'t>(&self, text: &'t str, from: usize) -> Option<MatchResult<'t>> {
        let regex = self.regex.as_ref()?;
        if from > text.len() {
            return None;
        }
        regex.find_at(text, from).map(|m| MatchResult {
            start: m.start(),
            len: m.len(),
            raw: m.as_str(),
        })
    }

    /// All non-overlapping matches in `text`. The cursor lives only for this call.
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<MatchResult<'t>> {
        let mut found = vec![];
        let mut cursor = 0;
        while let Some(m) = self.find_at(text, cursor) {
            cursor = m.end();
            found.push(m);
        }
        found
    }
}
