//! SGR (`CSI Pm m`) attribute and color parameter interpretation, grounded
//! in the teacher's `ansi/mod.rs` `parse_sgr` and spec §6's color grammar.

use crate::cell::CellAttributes;
use crate::color::Color;
use crate::dispatch::Dispatcher;
use crate::parser::params::Params;

/// Apply every SGR parameter group in `params` to the page's current
/// cell-attribute template.
pub fn apply_sgr(d: &mut Dispatcher, params: &Params) {
    if params.is_empty() {
        d.page.cellattrs.sgr = CellAttributes::empty();
        d.page.cellattrs.ink = Color::Default;
        d.page.cellattrs.paper = Color::Default;
        d.page.cellattrs.underline_color = None;
        return;
    }

    let mut i = 0;
    while i < params.len() {
        let code = params.get(i, 0);
        match code {
            0 => {
                d.page.cellattrs.sgr = CellAttributes::empty();
                d.page.cellattrs.ink = Color::Default;
                d.page.cellattrs.paper = Color::Default;
                d.page.cellattrs.underline_color = None;
            }
            1 => d.page.cellattrs.sgr.insert(CellAttributes::BOLD),
            2 => d.page.cellattrs.sgr.insert(CellAttributes::FAINT),
            3 => d.page.cellattrs.sgr.insert(CellAttributes::ITALIC),
            4 => {
                if params.has_subparams(i) {
                    match params.subparams(i).get(1).copied().unwrap_or(1) {
                        0 => {
                            d.page.cellattrs.sgr.remove(CellAttributes::UNDERLINE);
                            d.page.cellattrs.sgr.remove(CellAttributes::DOUBLE_UNDERLINE);
                            d.page.cellattrs.sgr.remove(CellAttributes::CURLY_UNDERLINE);
                        }
                        2 => {
                            d.page.cellattrs.sgr.insert(CellAttributes::DOUBLE_UNDERLINE);
                        }
                        3 => {
                            d.page.cellattrs.sgr.insert(CellAttributes::CURLY_UNDERLINE);
                        }
                        _ => d.page.cellattrs.sgr.insert(CellAttributes::UNDERLINE),
                    }
                } else {
                    d.page.cellattrs.sgr.insert(CellAttributes::UNDERLINE);
                }
            }
            5 | 6 => d.page.cellattrs.sgr.insert(CellAttributes::BLINK),
            7 => d.page.cellattrs.sgr.insert(CellAttributes::INVERT),
            8 => d.page.cellattrs.sgr.insert(CellAttributes::CONCEALED),
            9 => d.page.cellattrs.sgr.insert(CellAttributes::STRIKEOUT),
            21 => d.page.cellattrs.sgr.insert(CellAttributes::DOUBLE_UNDERLINE),
            22 => {
                d.page.cellattrs.sgr.remove(CellAttributes::BOLD);
                d.page.cellattrs.sgr.remove(CellAttributes::FAINT);
            }
            23 => d.page.cellattrs.sgr.remove(CellAttributes::ITALIC),
            24 => {
                d.page.cellattrs.sgr.remove(CellAttributes::UNDERLINE);
                d.page.cellattrs.sgr.remove(CellAttributes::DOUBLE_UNDERLINE);
                d.page.cellattrs.sgr.remove(CellAttributes::CURLY_UNDERLINE);
            }
            25 => d.page.cellattrs.sgr.remove(CellAttributes::BLINK),
            27 => d.page.cellattrs.sgr.remove(CellAttributes::INVERT),
            28 => d.page.cellattrs.sgr.remove(CellAttributes::CONCEALED),
            29 => d.page.cellattrs.sgr.remove(CellAttributes::STRIKEOUT),
            30..=37 => d.page.cellattrs.ink = Color::Indexed((code - 30) as u8),
            38 => {
                let (color, consumed) = parse_extended_color(params, i);
                if let Some(c) = color {
                    d.page.cellattrs.ink = c;
                }
                i += consumed;
                continue;
            }
            39 => d.page.cellattrs.ink = Color::Default,
            40..=47 => d.page.cellattrs.paper = Color::Indexed((code - 40) as u8),
            48 => {
                let (color, consumed) = parse_extended_color(params, i);
                if let Some(c) = color {
                    d.page.cellattrs.paper = c;
                }
                i += consumed;
                continue;
            }
            49 => d.page.cellattrs.paper = Color::Default,
            53 => d.page.cellattrs.sgr.insert(CellAttributes::OVERLINE),
            58 => {
                let (color, consumed) = parse_extended_color(params, i);
                d.page.cellattrs.underline_color = color;
                i += consumed;
                continue;
            }
            59 => d.page.cellattrs.underline_color = None,
            55 => d.page.cellattrs.sgr.remove(CellAttributes::OVERLINE),
            90..=97 => d.page.cellattrs.ink = Color::Indexed((code - 90 + 8) as u8),
            100..=107 => d.page.cellattrs.paper = Color::Indexed((code - 100 + 8) as u8),
            _ => {}
        }
        i += 1;
    }
}

/// Parse the 256-color/RGB extended color forms following a `38`/`48`
/// code, supporting both the legacy semicolon form (`38;5;N` / `38;2;R;G;B`)
/// and the ISO-8613-6 colon sub-parameter form (`38:2::R:G:B`).
/// Returns the color (if well-formed) and how many top-level groups were
/// consumed, including the introducer group itself.
fn parse_extended_color(params: &Params, at: usize) -> (Option<Color>, usize) {
    if params.has_subparams(at) {
        let sub = params.subparams(at);
        return match sub.get(1).copied() {
            Some(5) => (sub.get(2).map(|&i| Color::Indexed(i as u8)), 1),
            Some(2) => {
                // `38:2::r:g:b` reserves index 2 for an (unused) colorspace id.
                let r = sub.get(3).copied().unwrap_or(0) as u8;
                let g = sub.get(4).copied().unwrap_or(0) as u8;
                let b = sub.get(5).copied().unwrap_or(0) as u8;
                (Some(Color::Rgb(r, g, b)), 1)
            }
            Some(3) => {
                let c = sub.get(3).copied().unwrap_or(0);
                let m = sub.get(4).copied().unwrap_or(0);
                let y = sub.get(5).copied().unwrap_or(0);
                (cmy_to_rgb(c, m, y).map(|(r, g, b)| Color::Rgb(r, g, b)), 1)
            }
            Some(4) => {
                let c = sub.get(3).copied().unwrap_or(0);
                let m = sub.get(4).copied().unwrap_or(0);
                let y = sub.get(5).copied().unwrap_or(0);
                let k = sub.get(6).copied().unwrap_or(0);
                (cmyk_to_rgb(c, m, y, k).map(|(r, g, b)| Color::Rgb(r, g, b)), 1)
            }
            _ => (None, 1),
        };
    }

    match params.get(at + 1, -1) {
        5 => (Some(Color::Indexed(params.get(at + 2, 0) as u8)), 3),
        2 => {
            let r = params.get(at + 2, 0) as u8;
            let g = params.get(at + 3, 0) as u8;
            let b = params.get(at + 4, 0) as u8;
            (Some(Color::Rgb(r, g, b)), 5)
        }
        3 => {
            let c = params.get(at + 2, 0);
            let m = params.get(at + 3, 0);
            let y = params.get(at + 4, 0);
            (cmy_to_rgb(c, m, y).map(|(r, g, b)| Color::Rgb(r, g, b)), 5)
        }
        4 => {
            let c = params.get(at + 2, 0);
            let m = params.get(at + 3, 0);
            let y = params.get(at + 4, 0);
            let k = params.get(at + 5, 0);
            (cmyk_to_rgb(c, m, y, k).map(|(r, g, b)| Color::Rgb(r, g, b)), 6)
        }
        _ => (None, 1),
    }
}

/// `38:3::c:m:y` / `38;3;c;m;y`: percentage (0-100) CMY, via the same
/// math `crate::color::parse_cmyk_color` uses for the `cmy:`/`cmyk:`
/// text form.
fn cmy_to_rgb(c: i64, m: i64, y: i64) -> Option<(u8, u8, u8)> {
    crate::color::parse_cmyk_color(&format!("cmy:{}/{}/{}", c as f32 / 100.0, m as f32 / 100.0, y as f32 / 100.0))
}

fn cmyk_to_rgb(c: i64, m: i64, y: i64, k: i64) -> Option<(u8, u8, u8)> {
    crate::color::parse_cmyk_color(&format!(
        "cmyk:{}/{}/{}/{}",
        c as f32 / 100.0,
        m as f32 / 100.0,
        y as f32 / 100.0,
        k as f32 / 100.0
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::position::Size;

    fn params_from(codes: &[i64]) -> Params {
        let mut p = Params::new();
        for (idx, &c) in codes.iter().enumerate() {
            if idx > 0 {
                p.semicolon();
            }
            for digit in c.to_string().chars() {
                p.digit(digit.to_digit(10).unwrap() as u8);
            }
        }
        p
    }

    #[test]
    fn bold_and_reset() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        apply_sgr(&mut d, &params_from(&[1]));
        assert!(d.page.cellattrs.sgr.contains(CellAttributes::BOLD));
        apply_sgr(&mut d, &params_from(&[0]));
        assert!(d.page.cellattrs.sgr.is_empty());
    }

    #[test]
    fn legacy_256_color() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        apply_sgr(&mut d, &params_from(&[38, 5, 200]));
        assert_eq!(d.page.cellattrs.ink, Color::Indexed(200));
    }

    #[test]
    fn legacy_rgb_color() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        apply_sgr(&mut d, &params_from(&[48, 2, 10, 20, 30]));
        assert_eq!(d.page.cellattrs.paper, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn simple_foreground() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        apply_sgr(&mut d, &params_from(&[31]));
        assert_eq!(d.page.cellattrs.ink, Color::Indexed(1));
    }

    #[test]
    fn underline_color_set_and_reset() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        apply_sgr(&mut d, &params_from(&[58, 2, 10, 20, 30]));
        assert_eq!(d.page.cellattrs.underline_color, Some(Color::Rgb(10, 20, 30)));
        apply_sgr(&mut d, &params_from(&[59]));
        assert_eq!(d.page.cellattrs.underline_color, None);
    }

    #[test]
    fn cmyk_foreground_resolves_to_rgb() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        apply_sgr(&mut d, &params_from(&[38, 4, 0, 0, 0, 0]));
        assert_eq!(d.page.cellattrs.ink, Color::Rgb(255, 255, 255));
    }
}
