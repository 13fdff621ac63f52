// Display colours for kountdowns

/// Sentinel meaning "use the UI's default text colour"
pub const DEFAULT_COLOUR: &str = "palette.text";

/// Named colours offered when creating a kountdown
pub const PALETTE: [&str; 6] = [
    "crimson",
    "coral",
    "goldenrod",
    "lightseagreen",
    "deepskyblue",
    "hotpink",
];

/// Resolve a colour value to RGB
///
/// Accepts palette names and `#rrggbb`. Returns `None` for the default
/// sentinel and anything else the terminal cannot render.
pub fn to_rgb(colour: &str) -> Option<(u8, u8, u8)> {
    match colour.trim().to_ascii_lowercase().as_str() {
        "crimson" => Some((220, 20, 60)),
        "coral" => Some((255, 127, 80)),
        "goldenrod" => Some((218, 165, 32)),
        "lightseagreen" => Some((32, 178, 170)),
        "deepskyblue" => Some((0, 191, 255)),
        "hotpink" => Some((255, 105, 180)),
        other => parse_hex(other),
    }
}

fn parse_hex(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_names_resolve() {
        for name in PALETTE {
            assert!(to_rgb(name).is_some(), "{} should resolve", name);
        }
        assert_eq!(to_rgb("Crimson"), Some((220, 20, 60)));
    }

    #[test]
    fn test_hex_colours() {
        assert_eq!(to_rgb("#ff8000"), Some((255, 128, 0)));
        assert_eq!(to_rgb("#FF8000"), Some((255, 128, 0)));
        assert_eq!(to_rgb("#ff80"), None);
        assert_eq!(to_rgb("ff8000"), None);
    }

    #[test]
    fn test_default_sentinel_has_no_rgb() {
        assert_eq!(to_rgb(DEFAULT_COLOUR), None);
        assert_eq!(to_rgb(""), None);
    }
}
