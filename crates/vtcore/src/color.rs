//! Color representation and the hash/rgb/cmyk parser grammars from spec §6,
//! grounded in `original_source/Terminal/Colors.cpp`.

/// A cell's ink/paper color, or a palette entry.
///
/// `Default` defers to the terminal's current theme ink/paper; `Indexed`
/// is a palette slot (0..15 ANSI, 16..255 extended); `Rgb` is a direct
/// 24-bit color, as produced by the `38:2::r:g:b` SGR form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn is_default(self) -> bool {
        matches!(self, Color::Default)
    }

    /// Resolve against a 256-slot palette, returning 24-bit RGB.
    pub fn resolve(self, palette: &[(u8, u8, u8); 256], default: (u8, u8, u8)) -> (u8, u8, u8) {
        match self {
            Color::Default => default,
            Color::Indexed(i) => palette[i as usize],
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }
}

/// Parse `#RGB`, `#RRGGBB`, `#RRRGGGBBB`, or `#RRRRGGGGBBBB` into 8-bit RGB,
/// downscaling wider channel widths. Returns `None` on malformed input.
pub fn parse_hash_color(s: &str) -> Option<(u8, u8, u8)> {
    let s = s.strip_prefix('#')?;
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let n = s.len();
    if n % 3 != 0 || n == 0 || n > 12 {
        return None;
    }
    let w = n / 3;
    let chan = |part: &str| -> Option<u8> {
        let v = u32::from_str_radix(part, 16).ok()?;
        let max = (1u32 << (4 * w)) - 1;
        Some(((v * 255 + max / 2) / max) as u8)
    };
    let r = chan(&s[0..w])?;
    let g = chan(&s[w..2 * w])?;
    let b = chan(&s[2 * w..3 * w])?;
    Some((r, g, b))
}

/// Parse xterm's `rgb:RRRR/GGGG/BBBB` (1-4 hex digits per channel, each
/// independently scaled to 8 bits) or legacy `rgb(R,G,B)` decimal form.
/// An optional alpha channel (`rgba:.../AAAA`) is parsed and discarded.
pub fn parse_rgb_color(s: &str) -> Option<(u8, u8, u8)> {
    if let Some(rest) = s.strip_prefix("rgba:").or_else(|| s.strip_prefix("rgb:")) {
        let mut parts = rest.split('/');
        let chan = |p: Option<&str>| -> Option<u8> {
            let p = p?;
            if p.is_empty() || p.len() > 4 || !p.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let v = u32::from_str_radix(p, 16).ok()?;
            let max = (1u32 << (4 * p.len())) - 1;
            Some(((v * 255 + max / 2) / max) as u8)
        };
        let r = chan(parts.next())?;
        let g = chan(parts.next())?;
        let b = chan(parts.next())?;
        return Some((r, g, b));
    }
    if let Some(rest) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let mut parts = rest.split(',').map(str::trim);
        let r: u8 = parts.next()?.parse().ok()?;
        let g: u8 = parts.next()?.parse().ok()?;
        let b: u8 = parts.next()?.parse().ok()?;
        return Some((r, g, b));
    }
    None
}

/// Parse `cmyk:c/m/y/k` or `cmy:c/m/y` with components in `0.0..=1.0`.
pub fn parse_cmyk_color(s: &str) -> Option<(u8, u8, u8)> {
    let (rest, has_k) = if let Some(rest) = s.strip_prefix("cmyk:") {
        (rest, true)
    } else if let Some(rest) = s.strip_prefix("cmy:") {
        (rest, false)
    } else {
        return None;
    };
    let mut parts = rest.split('/');
    let comp = |p: Option<&str>| -> Option<f32> {
        let v: f32 = p?.parse().ok()?;
        if (0.0..=1.0).contains(&v) { Some(v) } else { None }
    };
    let c = comp(parts.next())?;
    let m = comp(parts.next())?;
    let y = comp(parts.next())?;
    let k = if has_k { comp(parts.next())? } else { 0.0 };
    if parts.next().is_some() {
        return None;
    }
    let to_u8 = |ch: f32| (((1.0 - ch) * (1.0 - k)) * 255.0).round().clamp(0.0, 255.0) as u8;
    Some((to_u8(c), to_u8(m), to_u8(y)))
}

/// Parse any of the supported color text forms, trying hash, then
/// `rgb:`/`rgb()`, then `cmyk:`/`cmy:`.
pub fn parse_color_spec(s: &str) -> Option<(u8, u8, u8)> {
    parse_hash_color(s).or_else(|| parse_rgb_color(s)).or_else(|| parse_cmyk_color(s))
}

/// Format an 8-bit RGB triple as `rgb:RRRR/GGGG/BBBB`, the form xterm
/// uses when answering OSC 4/10/11 queries.
pub fn format_rgb_color(r: u8, g: u8, b: u8) -> String {
    // xterm widens each 8-bit channel to 16 bits by byte-doubling.
    format!("rgb:{r:02x}{r:02x}/{g:02x}{g:02x}/{b:02x}{b:02x}")
}

/// The 16 default ANSI colors (VGA-ish xterm defaults).
pub const DEFAULT_ANSI_16: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

/// Build the full 256-color xterm default palette: 16 ANSI, a 6x6x6 color
/// cube, and a 24-step grayscale ramp.
pub fn default_palette_256() -> [(u8, u8, u8); 256] {
    let mut p = [(0u8, 0u8, 0u8); 256];
    p[0..16].copy_from_slice(&DEFAULT_ANSI_16);
    const STEPS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let mut i = 16usize;
    for r in STEPS {
        for g in STEPS {
            for b in STEPS {
                p[i] = (r, g, b);
                i += 1;
            }
        }
    }
    for step in 0..24 {
        let v = 8 + step * 10;
        p[i] = (v as u8, v as u8, v as u8);
        i += 1;
    }
    p
}
