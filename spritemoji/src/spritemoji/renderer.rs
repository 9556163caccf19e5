use std::borrow::Cow;

use anyhow::{Result, bail};
use log::{debug, trace};

use crate::spritemoji::catalog::Catalog;
use crate::spritemoji::dom::{Document, NodeId};
use crate::spritemoji::plugins::emojicode::rewrite_shortcodes;
use crate::spritemoji::plugins::{MatchContext, RenderStrategy};
use crate::spritemoji::walker::collect_text_leaves_skipping;

/// Replaces emoji glyphs in text nodes with producer-built nodes.
pub struct Replacer<'c, 's> {
    catalog: &'c Catalog,
    strategy: RenderStrategy<'s>,
    skip_elements: Vec<String>,
    shortcodes: bool,
}

impl<'c, 's> Replacer<'c, 's> {
    pub fn new(catalog: &'c Catalog, strategy: RenderStrategy<'s>) -> Self {
        Self {
            catalog,
            strategy,
            skip_elements: vec![],
            shortcodes: false,
        }
    }

    /// Elements whose text is never touched (e.g. `script`).
    pub fn with_skipped_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_elements = names.into_iter().map(Into::into).collect();
        self
    }

    /// Expand `:shortcode:` tokens to glyphs before matching.
    pub fn with_shortcodes(mut self, enabled: bool) -> Self {
        self.shortcodes = enabled;
        self
    }

    /// Rewrite every text node under `root`, returning how many emoji were replaced.
    ///
    /// A producer error aborts the walk; nodes replaced before it stay replaced.
    pub fn replace(&mut self, doc: &mut Document, root: NodeId) -> Result<usize> {
        let matcher = self.catalog.matcher()?;
        // Snapshot before editing: spans created by splits are handled by the
        // inner loop, not revisited from this list.
        let leaves = collect_text_leaves_skipping(doc, root, &self.skip_elements);
        let mut replaced = 0;

        for leaf in leaves {
            if self.shortcodes {
                self.expand_shortcodes(doc, leaf)?;
            }

            let mut span = leaf;
            let mut cursor = 0;
            loop {
                let Some((start, end, raw)) = doc
                    .text(span)
                    .and_then(|text| matcher.find_at(text, cursor))
                    .map(|m| (m.start, m.end(), m.raw.to_owned()))
                else {
                    break;
                };

                let Some(emoji) = self.catalog.resolve(&raw) else {
                    debug!(
                        "Leaving uncataloged glyph {raw:?} ({}) in place",
                        emojis::get(&raw).map(|e| e.name()).unwrap_or("unknown")
                    );
                    cursor = end;
                    continue;
                };

                let context = MatchContext {
                    raw: &raw,
                    span,
                    offset: start,
                    emoji: &emoji,
                };
                let replacement = self.strategy.producer().produce(doc, &context)?;
                trace!("Replacing {} at byte {start}", emoji.unified);

                span = split_around(doc, span, &raw, start, end, replacement)?;
                cursor = 0;
                replaced += 1;
            }
        }

        Ok(replaced)
    }

    /// Parse `html`, replace its emoji and serialize it again.
    pub fn replace_html(&mut self, html: &str) -> Result<String> {
        let mut doc = Document::parse_fragment(html);
        let root = doc.root();
        let replaced = self.replace(&mut doc, root)?;
        debug!("Replaced {replaced} emoji");
        Ok(doc.html())
    }

    fn expand_shortcodes(&self, doc: &mut Document, leaf: NodeId) -> Result<()> {
        let expanded = match doc.text(leaf).map(|text| rewrite_shortcodes(text, self.catalog)) {
            Some(Cow::Owned(expanded)) => expanded,
            _ => return Ok(()),
        };
        doc.set_text(leaf, expanded)
    }
}

/// Cut `span` at `start..end`: the text before stays in `span`, `replacement`
/// follows it, and a new text node holding the rest follows that. Returns the
/// new trailing text node.
///
/// The span is only truncated once both inserts have succeeded, so a rejected
/// replacement leaves its text intact.
fn split_around(
    doc: &mut Document,
    span: NodeId,
    raw: &str,
    start: usize,
    end: usize,
    replacement: NodeId,
) -> Result<NodeId> {
    let Some(text) = doc.text(span) else {
        bail!("{span:?} stopped being a text node while its emoji was produced");
    };
    if text.get(start..end) != Some(raw) {
        bail!("{span:?} no longer holds {raw:?} at byte {start}");
    }
    let before = text[..start].to_owned();
    let after = text[end..].to_owned();

    doc.insert_after(span, replacement)?;
    let rest = doc.create_text(after);
    doc.insert_after(replacement, rest)?;
    doc.set_text(span, before)?;
    Ok(rest)
}

/// Replace emoji in an HTML fragment with the given strategy.
pub fn transform_html(html: &str, catalog: &Catalog, strategy: RenderStrategy<'_>) -> Result<String> {
    Replacer::new(catalog, strategy).replace_html(html)
}
