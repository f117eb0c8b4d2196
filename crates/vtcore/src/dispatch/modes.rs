//! ANSI (`CSI Pm h/l`) and DEC private (`CSI ? Pm h/l`) mode setting,
//! grounded in `original_source/Terminal/Terminal.cpp`'s mode table and
//! the teacher's `ansi/mod.rs` `parse_mode` handling.

use crate::dispatch::mouse::{CoordinateFormat, MouseMode};
use crate::dispatch::Dispatcher;

/// What a `CSI ... h`/`CSI ... l` numeric parameter means, independent of
/// whether it arrived through the ANSI or DEC-private table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AnsiMode {
    Insert,
    /// IRM already named `Insert`; this covers LNM, keystroke echo, etc.
    Unknown,
}

fn ansi_mode(code: i64) -> AnsiMode {
    match code {
        4 => AnsiMode::Insert,
        _ => AnsiMode::Unknown,
    }
}

pub fn set_ansi_mode(d: &mut Dispatcher, code: i64, enable: bool) {
    match ansi_mode(code) {
        AnsiMode::Insert => d.page.insert_mode = enable,
        AnsiMode::Unknown => {}
    }
}

pub fn set_dec_mode(d: &mut Dispatcher, code: i64, enable: bool) {
    match code {
        1 => d.application_cursor_keys = enable,
        2 => d.vt52_mode = !enable,
        3 => {
            // DECCOLM: 80/132 column switch; resizing the page is a
            // host-level concern, so just remember the intent.
            d.deccolm_132 = enable;
        }
        5 => d.reverse_video = enable,
        6 => {
            d.page.cursor.origin_mode = enable;
            d.page.move_cursor(d.page.margins.left, d.page.margins.top, crate::cursor::MoveFlags::MARGINAL);
        }
        7 => d.page.autowrap = enable,
        8 => d.auto_repeat = enable,
        12 => d.page.cursor.blinking = enable,
        25 => d.page.cursor.visible = enable,
        45 => d.page.reverse_wrap = enable,
        47 => d.set_alternate_screen(enable, false),
        67 => d.backspace_sends_bs = enable,
        69 => d.page.left_right_margins_enabled = enable,
        80 => d.sixel_scrolling = enable,
        1000 => d.mouse.mode = if enable { MouseMode::Vt200 } else { MouseMode::Off },
        1001 => d.mouse.mode = if enable { MouseMode::Vt200Highlight } else { MouseMode::Off },
        1002 => d.mouse.mode = if enable { MouseMode::ButtonEvents } else { MouseMode::Off },
        1003 => d.mouse.mode = if enable { MouseMode::AnyEvents } else { MouseMode::Off },
        1004 => d.mouse.focus_events_enabled = enable,
        1005 => d.mouse.format = if enable { CoordinateFormat::Utf8 } else { CoordinateFormat::Normal },
        1006 => d.mouse.format = if enable { CoordinateFormat::Sgr } else { CoordinateFormat::Normal },
        1007 => d.mouse.alternate_scroll_enabled = enable,
        1015 => d.mouse.format = if enable { CoordinateFormat::Sgr } else { CoordinateFormat::Normal },
        1016 => d.mouse.format = if enable { CoordinateFormat::SgrPixels } else { CoordinateFormat::Normal },
        1034 => d.meta_sends_escape = enable,
        1047 | 1049 => d.set_alternate_screen(enable, code == 1049),
        1048 => {
            if enable {
                d.save_cursor();
            } else {
                d.restore_cursor();
            }
        }
        2004 => d.bracketed_paste = enable,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::position::Size;

    #[test]
    fn deccom_moves_cursor_into_margins() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        d.page.margins.top = 5;
        set_dec_mode(&mut d, 6, true);
        assert!(d.page.cursor.origin_mode);
        assert_eq!(d.page.cursor.pos.y, 5);
    }

    #[test]
    fn mouse_mode_toggles_tracking() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        set_dec_mode(&mut d, 1000, true);
        assert_eq!(d.mouse.mode, MouseMode::Vt200);
        set_dec_mode(&mut d, 1000, false);
        assert_eq!(d.mouse.mode, MouseMode::Off);
    }
}
