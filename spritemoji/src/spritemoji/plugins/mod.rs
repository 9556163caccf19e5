pub mod emojicode;
pub mod sprite_span;
pub mod traits;

use std::fmt;

use crate::spritemoji::sprite::SpriteOptions;

use self::traits::ElementProducer;

pub use self::sprite_span::SPRITE_CLASS;
pub use self::traits::MatchContext;

/// How matched emoji are drawn. Exactly one producer is active per call.
pub enum RenderStrategy<'a> {
    /// Built-in sprite-sheet span.
    Sprite(SpriteOptions),
    /// Caller-built replacement node.
    Custom(Box<dyn ElementProducer + 'a>),
}

impl<'a> RenderStrategy<'a> {
    pub fn custom(producer: impl ElementProducer + 'a) -> Self {
        RenderStrategy::Custom(Box::new(producer))
    }

    pub fn producer(&mut self) -> &mut dyn ElementProducer {
        match self {
            RenderStrategy::Sprite(options) => options,
            RenderStrategy::Custom(producer) => producer.as_mut(),
        }
    }
}

impl Default for RenderStrategy<'_> {
    fn default() -> Self {
        RenderStrategy::Sprite(SpriteOptions::default())
    }
}

impl From<SpriteOptions> for RenderStrategy<'_> {
    fn from(options: SpriteOptions) -> Self {
        RenderStrategy::Sprite(options)
    }
}

impl fmt::Debug for RenderStrategy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStrategy::Sprite(options) => f.debug_tuple("Sprite").field(options).finish(),
            RenderStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
