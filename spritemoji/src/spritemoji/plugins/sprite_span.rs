use anyhow::Result;

use crate::spritemoji::dom::{Document, NodeId};
use crate::spritemoji::sprite::SpriteOptions;

use super::traits::{ElementProducer, MatchContext};

/// Class carried by every built-in sprite span.
pub const SPRITE_CLASS: &str = "emoji-pipe-image";

/// Non-editable `<span>` drawing the emoji from a sprite sheet.
impl ElementProducer for SpriteOptions {
    fn produce(&mut self, doc: &mut Document, context: &MatchContext<'_>) -> Result<NodeId> {
        let style = self.style(context.emoji.sheet);
        Ok(doc.create_element(
            "span",
            [
                ("contenteditable", "false"),
                ("class", SPRITE_CLASS),
                ("style", style.as_str()),
            ],
        ))
    }
}
