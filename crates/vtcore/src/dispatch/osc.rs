//! OSC (Operating System Command) string dispatch: title/icon (0/1/2),
//! palette get/set/reset (4/104), default and selection color get/set/reset
//! (10/11/12/17/19/110/111/117/119), hyperlinks (8), semantic prompt marks
//! (133), and policy-gated clipboard access (52) — spec §4.E, grounded in
//! `original_source/Terminal/Terminal.cpp`'s OSC switch and the teacher's
//! `ansi/mod.rs` OSC handling.

use crate::cell::CellAttributes;
use crate::color::{default_palette_256, format_rgb_color, parse_color_spec, Color};
use crate::dispatch::{Dispatcher, HostEvent, DEFAULT_INK, DEFAULT_PAPER};

/// Dispatch a fully collected OSC payload (`Ps ; Pt`, no introducer/ST).
pub fn handle_osc(d: &mut Dispatcher, payload: &str) {
    let Some((ps, pt)) = payload.split_once(';') else {
        return;
    };
    match ps {
        "0" => {
            d.title = pt.to_string();
            d.icon_name = pt.to_string();
        }
        "1" => d.icon_name = pt.to_string(),
        "2" => d.title = pt.to_string(),
        "4" => set_or_query_palette(d, pt),
        "7" => set_working_directory(d, pt),
        "8" => set_hyperlink(d, pt),
        "9" => handle_conemu_message(d, pt),
        "10" => set_or_query_named_color(d, pt, "10", |d| &mut d.default_ink),
        "11" => set_or_query_named_color(d, pt, "11", |d| &mut d.default_paper),
        "12" => {} // cursor color: accepted, not separately tracked.
        "17" => set_or_query_named_color(d, pt, "17", |d| &mut d.selection_paper),
        "19" => set_or_query_named_color(d, pt, "19", |d| &mut d.selection_ink),
        "52" => handle_clipboard(d, pt),
        "104" => reset_palette(d, pt),
        "110" => d.default_ink = DEFAULT_INK,
        "111" => d.default_paper = DEFAULT_PAPER,
        "117" => d.selection_paper = DEFAULT_INK,
        "119" => d.selection_ink = DEFAULT_PAPER,
        "133" => mark_semantic_prompt(d, pt),
        "8100" => d.set_annotation(pt),
        _ => {}
    }
}

/// `OSC 7 ; file://host/path ST`: the child's working directory changed.
fn set_working_directory(d: &mut Dispatcher, pt: &str) {
    let path = pt.strip_prefix("file://").and_then(|rest| rest.split_once('/')).map(|(_, path)| format!("/{path}")).unwrap_or_else(|| pt.to_string());
    d.working_directory = Some(path.clone());
    d.push_event(HostEvent::DirectoryChanged(path));
}

/// ConEmu's `OSC 9 ; Pt ST` family: `9;4;state;percent` reports progress,
/// anything else is surfaced as a plain message.
fn handle_conemu_message(d: &mut Dispatcher, pt: &str) {
    let mut fields = pt.splitn(3, ';');
    match fields.next() {
        Some("4") => {
            let state = fields.next().and_then(|s| s.parse::<u8>().ok()).unwrap_or(0);
            let percent = fields.next().and_then(|s| s.parse::<u8>().ok()).unwrap_or(0);
            d.push_event(HostEvent::Progress { state, percent });
        }
        _ => d.push_event(HostEvent::Message(pt.to_string())),
    }
}

/// `OSC 4 ; c1 ; spec1 ; c2 ; spec2 ; ... ST`: set or query one or more
/// palette entries. `spec == "?"` answers with the current color in
/// `rgb:RRRR/GGGG/BBBB` form.
fn set_or_query_palette(d: &mut Dispatcher, pt: &str) {
    let mut parts = pt.split(';');
    while let (Some(idx), Some(spec)) = (parts.next(), parts.next()) {
        let Ok(idx) = idx.parse::<usize>() else { continue };
        if idx >= 256 {
            continue;
        }
        if spec == "?" {
            let (r, g, b) = d.palette[idx];
            d.write_reply(&format!("\x1b]4;{idx};{}\x1b\\", format_rgb_color(r, g, b)));
        } else if let Some(rgb) = parse_color_spec(spec) {
            d.palette[idx] = rgb;
        }
    }
}

/// `OSC code ; spec ST` for any of the four named color slots (default
/// ink/paper, selection ink/paper): `spec == "?"` answers in the same
/// `rgb:RRRR/GGGG/BBBB` form DECRQSS-adjacent OSC 4 uses.
fn set_or_query_named_color(d: &mut Dispatcher, pt: &str, code: &str, slot: impl FnOnce(&mut Dispatcher) -> &mut (u8, u8, u8)) {
    if pt == "?" {
        let (r, g, b) = *slot(d);
        d.write_reply(&format!("\x1b]{code};{}\x1b\\", format_rgb_color(r, g, b)));
    } else if let Some(rgb) = parse_color_spec(pt) {
        *slot(d) = rgb;
    }
}

/// `OSC 104 ; Pc ; Pc ; ... ST`: reset one or more palette entries to
/// their power-on value, or all 256 if `pt` is empty.
fn reset_palette(d: &mut Dispatcher, pt: &str) {
    let defaults = default_palette_256();
    if pt.is_empty() {
        d.palette = defaults;
        return;
    }
    for idx in pt.split(';').filter_map(|s| s.parse::<usize>().ok()) {
        if idx < 256 {
            d.palette[idx] = defaults[idx];
        }
    }
}

/// `OSC 133 ; A|B|C|D ST`: tag the cursor's current position as the start
/// of a shell prompt (`A`), the end of the prompt / start of the command
/// the user types (`B`), or the start of the command's output (`C`/`D`
/// both end the input region in this emulator's simplified model).
fn mark_semantic_prompt(d: &mut Dispatcher, pt: &str) {
    let bit = match pt.split(';').next() {
        Some("A") => CellAttributes::PROMPT,
        Some("B") => CellAttributes::INPUT,
        Some("C") | Some("D") => CellAttributes::OUTPUT,
        _ => return,
    };
    d.page.cellattrs.sgr.remove(CellAttributes::PROMPT | CellAttributes::INPUT | CellAttributes::OUTPUT);
    d.page.cellattrs.sgr.insert(bit);
}

/// `OSC 8 ; params ; uri ST`: begin (non-empty `uri`) or end (empty `uri`)
/// a hyperlink region; `params` may carry `id=...` but nothing else is
/// interpreted.
fn set_hyperlink(d: &mut Dispatcher, pt: &str) {
    let mut parts = pt.splitn(2, ';');
    let _params = parts.next().unwrap_or_default();
    let uri = parts.next().unwrap_or_default();
    d.active_hyperlink = if uri.is_empty() { None } else { Some(uri.to_string()) };
}

/// `OSC 52 ; c ; base64-data ST`: clipboard write, or (`data == "?"`)
/// clipboard read, each gated by `clipboard_policy` and (spec §6) by
/// keyboard focus.
fn handle_clipboard(d: &mut Dispatcher, pt: &str) {
    let Some((_selection, data)) = pt.split_once(';') else { return };
    if !d.has_focus {
        return;
    }
    if data == "?" {
        if !d.clipboard_policy.allows_read() {
            return;
        }
        use base64::Engine;
        let encoded = d.clipboard.as_deref().map(|text| base64::engine::general_purpose::STANDARD.encode(text)).unwrap_or_default();
        d.write_reply(&format!("\x1b]52;c;{encoded}\x1b\\"));
        return;
    }
    if !d.clipboard_policy.allows_write() {
        return;
    }
    use base64::Engine;
    if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(data) {
        if let Ok(text) = String::from_utf8(bytes) {
            d.clipboard = Some(text);
        }
    }
}

fn relative_luminance((r, g, b): (u8, u8, u8)) -> f64 {
    0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
}

/// Pick whichever of the theme's ink/paper colors has the larger
/// luminance distance from `paper`, so an annotation underline stays
/// visible regardless of how the surrounding cell is themed.
pub fn annotation_underline_color(d: &Dispatcher, paper: (u8, u8, u8)) -> (u8, u8, u8) {
    let base = relative_luminance(paper);
    let ink_dist = (relative_luminance(d.default_ink) - base).abs();
    let paper_dist = (relative_luminance(d.default_paper) - base).abs();
    if ink_dist >= paper_dist {
        d.default_ink
    } else {
        d.default_paper
    }
}

/// Which color `Color::Default` should resolve to for rendering purposes.
pub fn resolve_default(d: &Dispatcher, color: Color, background: bool) -> (u8, u8, u8) {
    match color {
        Color::Default => {
            if background {
                d.default_paper
            } else {
                d.default_ink
            }
        }
        Color::Indexed(i) => d.palette[i as usize],
        Color::Rgb(r, g, b) => (r, g, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Size;

    #[test]
    fn sets_window_title() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        handle_osc(&mut d, "2;hello there");
        assert_eq!(d.title, "hello there");
    }

    #[test]
    fn hyperlink_region_tracks_active_uri() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        handle_osc(&mut d, "8;id=1;https://example.com");
        assert_eq!(d.active_hyperlink.as_deref(), Some("https://example.com"));
        handle_osc(&mut d, "8;;");
        assert_eq!(d.active_hyperlink, None);
    }

    #[test]
    fn working_directory_change_emits_event() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        handle_osc(&mut d, "7;file://host/home/user");
        assert_eq!(d.working_directory.as_deref(), Some("/home/user"));
        assert_eq!(d.take_events(), vec![HostEvent::DirectoryChanged("/home/user".to_string())]);
    }

    #[test]
    fn conemu_progress_reports_state_and_percent() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        handle_osc(&mut d, "9;4;1;42");
        assert_eq!(d.take_events(), vec![HostEvent::Progress { state: 1, percent: 42 }]);
    }

    #[test]
    fn annotation_underline_prefers_higher_contrast_color() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        d.default_ink = (255, 255, 255);
        d.default_paper = (0, 0, 0);
        assert_eq!(annotation_underline_color(&d, (10, 10, 10)), (255, 255, 255));
        assert_eq!(annotation_underline_color(&d, (245, 245, 245)), (0, 0, 0));
    }

    #[test]
    fn palette_query_replies_with_rgb() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        d.palette[1] = (200, 0, 0);
        handle_osc(&mut d, "4;1;?");
        assert_eq!(d.take_replies(), vec!["\x1b]4;1;rgb:c8c8/0000/0000\x1b\\".to_string()]);
    }

    #[test]
    fn palette_reset_restores_default_entry() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        let original = d.palette[1];
        d.palette[1] = (200, 0, 0);
        handle_osc(&mut d, "104;1");
        assert_eq!(d.palette[1], original);
    }

    #[test]
    fn selection_colors_set_reset_and_query() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        handle_osc(&mut d, "17;#ff0000");
        assert_eq!(d.selection_paper, (255, 0, 0));
        handle_osc(&mut d, "117;");
        assert_eq!(d.selection_paper, DEFAULT_INK);
    }

    #[test]
    fn semantic_prompt_mark_tags_subsequent_cells() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        handle_osc(&mut d, "133;A");
        assert!(d.page.cellattrs.sgr.contains(CellAttributes::PROMPT));
        handle_osc(&mut d, "133;B");
        assert!(!d.page.cellattrs.sgr.contains(CellAttributes::PROMPT));
        assert!(d.page.cellattrs.sgr.contains(CellAttributes::INPUT));
    }

    #[test]
    fn clipboard_write_then_read_round_trips_under_both_policy() {
        use crate::dispatch::ClipboardPolicy;
        let mut d = Dispatcher::new(Size::new(80, 24));
        d.clipboard_policy = ClipboardPolicy::Both;
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode("hello");
        handle_osc(&mut d, &format!("52;c;{encoded}"));
        assert_eq!(d.clipboard.as_deref(), Some("hello"));
        handle_osc(&mut d, "52;c;?");
        assert_eq!(d.take_replies(), vec![format!("\x1b]52;c;{encoded}\x1b\\")]);
    }

    #[test]
    fn clipboard_read_denied_without_read_policy() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        d.clipboard = Some("secret".to_string());
        handle_osc(&mut d, "52;c;?");
        assert!(d.take_replies().is_empty());
    }

    #[test]
    fn clipboard_denied_without_focus() {
        use crate::dispatch::ClipboardPolicy;
        let mut d = Dispatcher::new(Size::new(80, 24));
        d.clipboard_policy = ClipboardPolicy::Both;
        d.has_focus = false;
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode("hello");
        handle_osc(&mut d, &format!("52;c;{encoded}"));
        assert_eq!(d.clipboard, None);
    }
}
