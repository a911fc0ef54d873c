//! Color token normalization.
//!
//! ThemeRoller colors arrive as bare hex strings (`cc0000`, `fff`), hex
//! strings with a leading `#`, or arbitrary tokens understood by the
//! rendering backend (`red`, `rgb(1,2,3)`). Only hex colors are rewritten.

/// Returns true if `s` is a 3- or 6-digit hex color without a `#`.
pub fn is_hex_color(s: &str) -> bool {
    (s.len() == 3 || s.len() == 6) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Expands a 3-digit hex color to 6 digits by doubling each digit.
///
/// Any other input is returned unchanged, so the function is idempotent.
///
/// ```
/// use themeroller::request::expand_color;
///
/// assert_eq!(expand_color("abc"), "aabbcc");
/// assert_eq!(expand_color("aabbcc"), "aabbcc");
/// assert_eq!(expand_color("red"), "red");
/// ```
pub fn expand_color(color: &str) -> String {
    if color.len() == 3 && is_hex_color(color) {
        color.chars().flat_map(|c| [c, c]).collect()
    } else {
        color.to_string()
    }
}

/// Normalizes a color token.
///
/// An optional leading `#` is ignored, 3-digit hex colors are expanded and
/// hex colors gain a leading `#`. Other tokens pass through untouched.
///
/// ```
/// use themeroller::request::normalize_color;
///
/// assert_eq!(normalize_color("fff"), "#ffffff");
/// assert_eq!(normalize_color("#cc0000"), "#cc0000");
/// assert_eq!(normalize_color("transparent"), "transparent");
/// ```
pub fn normalize_color(color: &str) -> String {
    let bare = color.strip_prefix('#').unwrap_or(color);
    if is_hex_color(bare) {
        format!("#{}", expand_color(bare))
    } else {
        color.to_string()
    }
}

/// Spells a normalized color the way it appears inside cache filenames.
pub fn filename_color(color: &str) -> &str {
    color.strip_prefix('#').unwrap_or(color)
}

/// Parses a normalized `#rrggbb` color into RGB components.
pub fn parse_hex_rgb(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_expand_short_color() {
        assert_eq!(expand_color("abc"), "aabbcc");
        assert_eq!(expand_color("fff"), "ffffff");
        assert_eq!(expand_color("F0a"), "FF00aa");
    }

    #[test]
    fn test_expand_is_idempotent_on_long_color() {
        assert_eq!(expand_color("aabbcc"), "aabbcc");
    }

    #[test]
    fn test_expand_leaves_non_hex_alone() {
        assert_eq!(expand_color("red"), "red");
        assert_eq!(expand_color("xyz"), "xyz");
    }

    #[test]
    fn test_normalize_adds_hash() {
        assert_eq!(normalize_color("fff"), "#ffffff");
        assert_eq!(normalize_color("b81900"), "#b81900");
        assert_eq!(normalize_color("#abc"), "#aabbcc");
    }

    #[test]
    fn test_normalize_passes_through_other_tokens() {
        assert_eq!(normalize_color("red"), "red");
        assert_eq!(normalize_color("rgb(1,2,3)"), "rgb(1,2,3)");
        assert_eq!(normalize_color("#abcd"), "#abcd");
    }

    #[test]
    fn test_filename_color_strips_hash() {
        assert_eq!(filename_color("#ffffff"), "ffffff");
        assert_eq!(filename_color("red"), "red");
    }

    #[test]
    fn test_parse_hex_rgb() {
        assert_eq!(parse_hex_rgb("#cc0000"), Some([0xcc, 0, 0]));
        assert_eq!(parse_hex_rgb("#FFffFF"), Some([255, 255, 255]));
        assert_eq!(parse_hex_rgb("cc0000"), None);
        assert_eq!(parse_hex_rgb("#ccc"), None);
        assert_eq!(parse_hex_rgb("red"), None);
    }

    proptest! {
        #[test]
        fn prop_expand_is_idempotent(color in "[0-9a-fA-F]{3}|[0-9a-fA-F]{6}") {
            let once = expand_color(&color);
            prop_assert_eq!(expand_color(&once), once.clone());
            prop_assert_eq!(once.len(), 6);
        }

        #[test]
        fn prop_normalize_is_idempotent(color in "#?[0-9a-f]{3}|#?[0-9a-f]{6}|[a-z]{1,8}") {
            let once = normalize_color(&color);
            prop_assert_eq!(normalize_color(&once), once);
        }
    }
}
