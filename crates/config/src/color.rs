// CSS color strings: hex, rgb()/rgba() and a fixed set of names

use crate::Color;

/// Named colors accepted as literal fill values, (name, 0xRRGGBB)
pub const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("silver", 0xC0C0C0),
    ("red", 0xFF0000),
    ("maroon", 0x800000),
    ("orange", 0xFFA500),
    ("yellow", 0xFFFF00),
    ("olive", 0x808000),
    ("lime", 0x00FF00),
    ("green", 0x008000),
    ("teal", 0x008080),
    ("cyan", 0x00FFFF),
    ("aqua", 0x00FFFF),
    ("blue", 0x0000FF),
    ("navy", 0x000080),
    ("purple", 0x800080),
    ("magenta", 0xFF00FF),
    ("fuchsia", 0xFF00FF),
    ("pink", 0xFFC0CB),
    ("brown", 0xA52A2A),
];

/// Parse a literal color. Returns `None` for anything that is not a color,
/// so arbitrary text never reaches a style.
pub fn parse_css_color(input: &str) -> Option<Color> {
    let s = input.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
        return parse_rgb_args(args, true);
    }
    if let Some(args) = lower.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        return parse_rgb_args(args, false);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, hex)| Color::from_hex(*hex))
}

/// `rgb`, `rgba`, `rrggbb` or `rrggbbaa` (no leading `#`)
fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let unit = |v: u8| v as f32 / 255.0;

    match hex.len() {
        3 | 4 => {
            // #abc is #aabbcc
            let short = |i: usize| digit(i).map(|d| unit(d * 17));
            let a = if hex.len() == 4 { short(3)? } else { 1.0 };
            Some(Color::from_rgba(short(0)?, short(1)?, short(2)?, a))
        }
        6 | 8 => {
            let a = if hex.len() == 8 { unit(pair(6)?) } else { 1.0 };
            Some(Color::from_rgba(unit(pair(0)?), unit(pair(2)?), unit(pair(4)?), a))
        }
        _ => None,
    }
}

fn parse_rgb_args(args: &str, with_alpha: bool) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let channel = |s: &str| -> Option<f32> {
        let v: f32 = s.parse().ok()?;
        (0.0..=255.0).contains(&v).then_some(v / 255.0)
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if with_alpha {
        let a: f32 = parts[3].parse().ok()?;
        if !(0.0..=1.0).contains(&a) {
            return None;
        }
        a
    } else {
        1.0
    };
    Some(Color::from_rgba(r, g, b, a))
}

/// Black or white text, whichever reads on `fill`
pub fn contrast_text(fill: &Color) -> &'static str {
    if fill.is_dark() {
        "#FFFFFF"
    } else {
        "#000000"
    }
}
