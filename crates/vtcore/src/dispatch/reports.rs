//! Device status/attribute reports written back to the host (spec §4.D),
//! grounded in `original_source/Terminal/Terminal.cpp`'s DA/DSR/CPR
//! handlers and the teacher's response-writing idiom in `ansi/mod.rs`.

use crate::dispatch::Dispatcher;
use crate::parser::params::Params;
use crate::parser::sequence::Mode;

/// Primary Device Attributes (`CSI c` / `CSI 0 c`): identify as a VT220
/// with the extensions this emulator implements (102 = 132 columns,
/// selective erase, user-defined keys omitted).
const DA1_RESPONSE: &str = "\x1b[?62;1;6;9c";

/// Secondary Device Attributes (`CSI > c`): terminal type 1 ("VT220-like"),
/// firmware version 10, ROM cartridge 0.
const DA2_RESPONSE: &str = "\x1b[>1;10;0c";

pub fn device_attributes(d: &mut Dispatcher, mode: Mode) {
    let response = match mode {
        Mode::Greater => DA2_RESPONSE,
        _ => DA1_RESPONSE,
    };
    d.write_reply(response);
}

/// `CSI n n` Device Status Report: `5` asks for terminal status (always
/// "ok"), `6` asks for the cursor position (CPR).
pub fn device_status_report(d: &mut Dispatcher, params: &Params, dec_private: bool) {
    match params.get(0, 0) {
        5 => d.write_reply("\x1b[0n"),
        6 => {
            let (row, col) = d.reported_cursor_position();
            if dec_private {
                d.write_reply(&format!("\x1b[?{row};{col}R"));
            } else {
                d.write_reply(&format!("\x1b[{row};{col}R"));
            }
        }
        _ => {}
    }
}

/// DECRQSS (`DCS $ q ... ST`): report the current value of a settable
/// parameter. Covers the ten settings spec §4.C names: DECSTBM, DECSLRM,
/// SGR, DECSCL, DECSCUSR, DECSCA, DECSACE, DECSLPP, DECSCPP, DECSNLS.
pub fn report_settings(d: &mut Dispatcher, request: &str) -> String {
    match request {
        "m" => {
            let mut parts = vec!["0".to_string()];
            let sgr = d.page.cellattrs.sgr;
            use crate::cell::CellAttributes;
            if sgr.contains(CellAttributes::BOLD) {
                parts.push("1".into());
            }
            if sgr.contains(CellAttributes::UNDERLINE) {
                parts.push("4".into());
            }
            if sgr.contains(CellAttributes::BLINK) {
                parts.push("5".into());
            }
            if sgr.contains(CellAttributes::INVERT) {
                parts.push("7".into());
            }
            format!("\x1bP1$r{}m\x1b\\", parts.join(";"))
        }
        // DECSTBM
        "r" => format!("\x1bP1$r{};{}r\x1b\\", d.page.margins.top, d.page.margins.bottom),
        // DECSLRM
        "s" => format!("\x1bP1$r{};{}s\x1b\\", d.page.margins.left, d.page.margins.right),
        // DECSCL
        "\"p" => format!("\x1bP1$r{};1\"p\x1b\\", d.conformance_level),
        // DECSCUSR
        " q" => format!("\x1bP1$r{} q\x1b\\", cursor_style_code(d)),
        // DECSCA
        "\"q" => format!("\x1bP1$r{}\"q\x1b\\", if d.protect_subsequent_chars { 1 } else { 2 }),
        // DECSACE
        "*x" => format!("\x1bP1$r{}*x\x1b\\", if d.rect_attr_extent_is_rectangle { 2 } else { 1 }),
        // DECSLPP
        "t" => format!("\x1bP1$r{}t\x1b\\", d.page.size().cy),
        // DECSCPP
        "$|" => format!("\x1bP1$r{}$|\x1b\\", d.page.size().cx),
        // DECSNLS
        "*|" => format!("\x1bP1$r{}*|\x1b\\", d.page.size().cy),
        _ => "\x1bP0$r\x1b\\".to_string(),
    }
}

/// The DECSCUSR parameter that would reproduce the cursor's current
/// shape/blink state.
fn cursor_style_code(d: &Dispatcher) -> i32 {
    use crate::cursor::CaretShape;
    match (d.page.cursor.shape, d.page.cursor.blinking) {
        (CaretShape::Block, true) => 1,
        (CaretShape::Block, false) => 2,
        (CaretShape::Underline, true) => 3,
        (CaretShape::Underline, false) => 4,
        (CaretShape::Bar, true) => 5,
        (CaretShape::Bar, false) => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Size;

    #[test]
    fn da1_reports_vt220() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        device_attributes(&mut d, Mode::None);
        assert_eq!(d.take_replies(), vec![DA1_RESPONSE.to_string()]);
    }

    #[test]
    fn cpr_reports_one_based_position() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        let mut p = Params::new();
        p.digit(6);
        device_status_report(&mut d, &p, false);
        assert_eq!(d.take_replies(), vec!["\x1b[1;1R".to_string()]);
    }

    #[test]
    fn decrqss_reports_conformance_level_and_cursor_style() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        d.conformance_level = 64;
        assert_eq!(report_settings(&mut d, "\"p"), "\x1bP1$r64;1\"p\x1b\\");
        assert_eq!(report_settings(&mut d, " q"), "\x1bP1$r1 q\x1b\\");
    }

    #[test]
    fn decrqss_reports_left_right_margins() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        d.page.margins.left = 5;
        d.page.margins.right = 40;
        assert_eq!(report_settings(&mut d, "s"), "\x1bP1$r5;40s\x1b\\");
    }

    #[test]
    fn decrqss_falls_back_for_unknown_requests() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        assert_eq!(report_settings(&mut d, "xyz"), "\x1bP0$r\x1b\\");
    }
}
