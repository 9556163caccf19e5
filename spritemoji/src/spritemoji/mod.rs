pub mod catalog;
pub mod config;
pub mod dom;
pub mod hexcode;
pub mod matcher;
pub mod plugins;
pub mod renderer;
pub mod sprite;
pub mod types;
pub mod walker;

pub use catalog::Catalog;
pub use config::SpritemojiConfig;
pub use dom::{Document, NodeId};
pub use matcher::CompiledMatcher;
pub use plugins::{MatchContext, RenderStrategy};
pub use renderer::{Replacer, transform_html};
pub use sprite::{SheetSize, SpriteOptions, SpriteSet};
pub use types::{EmojiRecord, MatchResult, SkinVariation, SpriteCoord};
