use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::spritemoji::catalog::Catalog;

/// Replace Discord/Gemoji-style `:shortcode:` tokens with their Unicode emoji.
/// The catalog's short names win; the gemoji table fills the gaps. Unknown
/// shortcodes are left as written.
pub fn rewrite_shortcodes<'t>(input: &'t str, catalog: &Catalog) -> Cow<'t, str> {
    // Matches :shortcode: with lowercase letters, digits, underscores, plus, or minus.
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r":([a-z0-9_+\-]+):").expect("emoji shortcode regex"));

    RE.replace_all(input, |caps: &Captures| {
        let code = &caps[1];
        catalog
            .by_shortcode(code)
            .map(|record| record.native.clone())
            .or_else(|| emojis::get_by_shortcode(code).map(|e| e.as_str().to_string()))
            .unwrap_or_else(|| caps[0].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_short_names_take_precedence() {
        let catalog = Catalog::from_json(
            r#"[{ "unified": "1F44D-1F3FF", "short_names": ["thumbsup"], "sheet_x": 0, "sheet_y": 0 }]"#,
        )
        .unwrap();
        assert_eq!(rewrite_shortcodes("a :thumbsup: b", &catalog), "a 👍🏿 b");
    }

    #[test]
    fn falls_back_to_gemoji() {
        let catalog = Catalog::default();
        assert_eq!(rewrite_shortcodes(":ok_hand: :+1:", &catalog), "👌 👍");
    }

    #[test]
    fn unknown_codes_are_untouched() {
        let catalog = Catalog::default();
        let out = rewrite_shortcodes("ratio 1:2: and :not_an_emoji_at_all:", &catalog);
        assert_eq!(out, "ratio 1:2: and :not_an_emoji_at_all:");
    }
}
