//! Terminal colors: parsing, capability profiles and SGR sequences.

use crossterm::tty::IsTty;

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CellColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<image::Rgba<u8>> for CellColor {
    fn from(p: image::Rgba<u8>) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl std::fmt::Display for CellColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color '{input}': expected #rrggbb or #rgb")]
pub struct ColorParseError {
    pub input: String,
}

impl std::str::FromStr for CellColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_color(s)
    }
}

/// Parse `#rrggbb` or `#rgb`. The leading `#` is optional.
pub fn parse_hex_color(input: &str) -> Result<CellColor, ColorParseError> {
    let err = || ColorParseError {
        input: input.to_string(),
    };

    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(err());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
    match hex.len() {
        6 => Ok(CellColor::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            // #abc is shorthand for #aabbcc
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Ok(CellColor::new(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => Err(err()),
    }
}

/// How many colors the terminal can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorProfile {
    /// 24-bit color
    TrueColor,
    /// xterm 256-color palette
    Ansi256,
    /// The 16 basic ANSI colors
    Ansi16,
    /// No color escapes at all
    Ascii,
}

/// The 16 ANSI colors as xterm draws them.
const ANSI16_PALETTE: [CellColor; 16] = [
    CellColor::new(0x00, 0x00, 0x00),
    CellColor::new(0x80, 0x00, 0x00),
    CellColor::new(0x00, 0x80, 0x00),
    CellColor::new(0x80, 0x80, 0x00),
    CellColor::new(0x00, 0x00, 0x80),
    CellColor::new(0x80, 0x00, 0x80),
    CellColor::new(0x00, 0x80, 0x80),
    CellColor::new(0xc0, 0xc0, 0xc0),
    CellColor::new(0x80, 0x80, 0x80),
    CellColor::new(0xff, 0x00, 0x00),
    CellColor::new(0x00, 0xff, 0x00),
    CellColor::new(0xff, 0xff, 0x00),
    CellColor::new(0x00, 0x00, 0xff),
    CellColor::new(0xff, 0x00, 0xff),
    CellColor::new(0x00, 0xff, 0xff),
    CellColor::new(0xff, 0xff, 0xff),
];

/// Channel levels of the 6x6x6 color cube.
const CUBE_LEVELS: [u8; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

impl ColorProfile {
    /// Detect the profile of stdout from the process environment.
    pub fn detect() -> Self {
        let is_tty = std::io::stdout().is_tty();
        Self::from_env(is_tty, |key| std::env::var(key).ok())
    }

    /// Decide the profile from a tty flag and an environment lookup.
    ///
    /// `NO_COLOR` or a non-tty output disables color; otherwise `COLORTERM`
    /// and `TERM` pick the richest supported palette.
    pub fn from_env<F>(is_tty: bool, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if !is_tty {
            return ColorProfile::Ascii;
        }
        if var("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            return ColorProfile::Ascii;
        }

        let term = var("TERM").unwrap_or_default().to_lowercase();
        let colorterm = var("COLORTERM").unwrap_or_default().to_lowercase();

        match colorterm.as_str() {
            "truecolor" | "24bit" => return ColorProfile::TrueColor,
            "yes" | "true" => return ColorProfile::Ansi256,
            _ => {}
        }

        if term == "dumb" || term.is_empty() {
            return ColorProfile::Ascii;
        }
        if term == "xterm-kitty" || term.contains("truecolor") || term.contains("direct") {
            return ColorProfile::TrueColor;
        }
        if term.contains("256color") {
            return ColorProfile::Ansi256;
        }
        ColorProfile::Ansi16
    }

    /// Parse a profile name as used in the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "truecolor" | "24bit" => Some(ColorProfile::TrueColor),
            "ansi256" | "256" => Some(ColorProfile::Ansi256),
            "ansi16" | "ansi" | "16" => Some(ColorProfile::Ansi16),
            "ascii" | "none" => Some(ColorProfile::Ascii),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorProfile::TrueColor => "truecolor",
            ColorProfile::Ansi256 => "ansi256",
            ColorProfile::Ansi16 => "ansi16",
            ColorProfile::Ascii => "ascii",
        }
    }

    /// SGR parameters selecting `color` as foreground, if the profile has color.
    pub fn fg_sequence(&self, color: CellColor) -> Option<String> {
        match self {
            ColorProfile::TrueColor => Some(format!("38;2;{};{};{}", color.r, color.g, color.b)),
            ColorProfile::Ansi256 => Some(format!("38;5;{}", to_ansi256(color))),
            ColorProfile::Ansi16 => {
                let n = to_ansi16(color);
                Some(if n < 8 { 30 + n } else { 90 + n - 8 }.to_string())
            }
            ColorProfile::Ascii => None,
        }
    }

    /// SGR parameters selecting `color` as background.
    pub fn bg_sequence(&self, color: CellColor) -> Option<String> {
        match self {
            ColorProfile::TrueColor => Some(format!("48;2;{};{};{}", color.r, color.g, color.b)),
            ColorProfile::Ansi256 => Some(format!("48;5;{}", to_ansi256(color))),
            ColorProfile::Ansi16 => {
                let n = to_ansi16(color);
                Some(if n < 8 { 40 + n } else { 100 + n - 8 }.to_string())
            }
            ColorProfile::Ascii => None,
        }
    }

    /// Append `text` to `out`, wrapped in the escapes for `fg` and `bg`.
    ///
    /// Without any sequences (no colors given, or the `Ascii` profile) the
    /// text is appended bare.
    pub fn push_styled(
        &self,
        out: &mut String,
        text: &str,
        fg: Option<CellColor>,
        bg: Option<CellColor>,
    ) {
        let fg = fg.and_then(|c| self.fg_sequence(c));
        let bg = bg.and_then(|c| self.bg_sequence(c));

        let seqs: Vec<String> = fg.into_iter().chain(bg).collect();
        if seqs.is_empty() {
            out.push_str(text);
            return;
        }

        out.push_str("\x1b[");
        out.push_str(&seqs.join(";"));
        out.push('m');
        out.push_str(text);
        out.push_str("\x1b[0m");
    }
}

fn distance_sq(a: CellColor, b: CellColor) -> u32 {
    let dr = i32::from(a.r) - i32::from(b.r);
    let dg = i32::from(a.g) - i32::from(b.g);
    let db = i32::from(a.b) - i32::from(b.b);
    (dr * dr + dg * dg + db * db) as u32
}

/// Nearest xterm-256 index: the closer of the cube entry and the gray ramp.
pub fn to_ansi256(color: CellColor) -> u8 {
    fn cube_index(v: u8) -> usize {
        if v < 48 {
            0
        } else if v < 115 {
            1
        } else {
            usize::from((v - 35) / 40)
        }
    }

    let (ri, gi, bi) = (cube_index(color.r), cube_index(color.g), cube_index(color.b));
    let cube = CellColor::new(CUBE_LEVELS[ri], CUBE_LEVELS[gi], CUBE_LEVELS[bi]);
    let cube_idx = 16 + 36 * ri + 6 * gi + bi;

    let average = (u32::from(color.r) + u32::from(color.g) + u32::from(color.b)) / 3;
    let gray_idx = if average > 238 {
        23
    } else {
        average.saturating_sub(3) / 10
    };
    let gray_level = (8 + 10 * gray_idx) as u8;
    let gray = CellColor::new(gray_level, gray_level, gray_level);

    if distance_sq(color, cube) <= distance_sq(color, gray) {
        cube_idx as u8
    } else {
        (232 + gray_idx) as u8
    }
}

/// Nearest of the 16 basic ANSI colors.
pub fn to_ansi16(color: CellColor) -> u8 {
    let mut best = 0;
    let mut best_dist = u32::MAX;
    for (i, candidate) in ANSI16_PALETTE.iter().enumerate() {
        let d = distance_sq(color, *candidate);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best as u8
}
