use anyhow::Result;

use crate::spritemoji::dom::{Document, NodeId};
use crate::spritemoji::types::EmojiRecord;

/// What a producer is told about one resolved match.
#[derive(Clone, Copy, Debug)]
pub struct MatchContext<'a> {
    /// The matched glyph sequence.
    pub raw: &'a str,
    /// Text node the match was found in, before it is split.
    pub span: NodeId,
    /// UTF-8 byte offset of the match inside `span`'s text. This is not a
    /// character count; see [`MatchContext::char_offset`].
    pub offset: usize,
    /// Catalog record the match resolved to.
    pub emoji: &'a EmojiRecord,
}

impl MatchContext<'_> {
    /// Offset of the match in `char`s (Unicode scalar values) from the start
    /// of `span`'s text. `None` once the span is no longer text.
    pub fn char_offset(&self, doc: &Document) -> Option<usize> {
        let text = doc.text(self.span)?;
        Some(text.get(..self.offset)?.chars().count())
    }
}

/// Builds the node that takes the place of a matched emoji.
///
/// The returned node must belong to `doc`; the engine moves it into position.
pub trait ElementProducer {
    fn produce(&mut self, doc: &mut Document, context: &MatchContext<'_>) -> Result<NodeId>;
}

impl<F> ElementProducer for F
where
    F: FnMut(&mut Document, &MatchContext<'_>) -> Result<NodeId>,
{
    fn produce(&mut self, doc: &mut Document, context: &MatchContext<'_>) -> Result<NodeId> {
        self(doc, context)
    }
}
