use anyhow::{Context, Result, anyhow};

/// Separator between code point segments in a unified identity.
pub const SEGMENT_SEPARATOR: char = '-';

/// Unified identity of a glyph sequence, e.g. `👌🏽` becomes `1F44C-1F3FD`.
///
/// Each scalar value is written as uppercase hex padded to four digits, the
/// way emoji-datasource spells `0023-FE0F-20E3`.
pub fn hex_id(raw: &str) -> String {
    let mut id = String::with_capacity(raw.len() * 3);
    for (i, c) in raw.chars().enumerate() {
        if i > 0 {
            id.push(SEGMENT_SEPARATOR);
        }
        id.push_str(&format!("{:04X}", c as u32));
    }
    id
}

/// Inverse of [`hex_id`]: turns `1F9DB-200D-2640-FE0F` back into the glyph.
pub fn native_from_unified(unified: &str) -> Result<String> {
    unified
        .split(SEGMENT_SEPARATOR)
        .map(|segment| {
            let code = u32::from_str_radix(segment, 16)
                .with_context(|| format!("invalid code point segment {segment:?} in {unified}"))?;
            char::from_u32(code)
                .ok_or_else(|| anyhow!("{segment} in {unified} is not a Unicode scalar value"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_code_point() {
        assert_eq!(hex_id("👌"), "1F44C");
    }

    #[test]
    fn zwj_sequence_keeps_every_segment() {
        assert_eq!(hex_id("🧛\u{200D}♀\u{FE0F}"), "1F9DB-200D-2640-FE0F");
    }

    #[test]
    fn short_code_points_are_padded() {
        assert_eq!(hex_id("#\u{FE0F}\u{20E3}"), "0023-FE0F-20E3");
        assert_eq!(hex_id("©\u{FE0F}"), "00A9-FE0F");
    }

    #[test]
    fn native_round_trips_catalog_ids() {
        for id in ["1F44C", "1F44C-1F3FD", "0023-FE0F-20E3", "1F9DB-1F3FB-200D-2640-FE0F"] {
            let native = native_from_unified(id).unwrap();
            assert_eq!(hex_id(&native), id);
        }
    }

    #[test]
    fn native_rejects_garbage() {
        assert!(native_from_unified("1F44C-XYZ").is_err());
        assert!(native_from_unified("D800").is_err());
        assert!(native_from_unified("").is_err());
    }
}
