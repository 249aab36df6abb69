//! Glyph ramp for character-mode rendering.

/// Glyphs ordered from empty to densest.
pub const GLYPH_RAMP: [char; 15] = [
    ' ', '.', ',', ':', ';', 'i', '1', 't', 'f', 'L', 'C', 'G', '0', '8', '@',
];

/// Half-block glyph used by ANSI mode: foreground paints the top half.
pub const UPPER_HALF_BLOCK: char = '▀';

/// Largest possible intensity, `(255 + 255 + 255) * 255 / 255`.
pub const FULL_SPAN: u32 = 255 * 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_matches_string_form() {
        let s: String = GLYPH_RAMP.iter().collect();
        assert_eq!(s, " .,:;i1tfLCG08@");
    }

    #[test]
    fn test_ramp_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        assert!(GLYPH_RAMP.iter().all(|c| seen.insert(*c)));
    }
}
