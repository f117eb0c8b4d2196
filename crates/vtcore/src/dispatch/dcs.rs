//! DCS (Device Control String) payload dispatch: DECRQSS and SIXEL inline
//! images (spec §4.F/§4.G), grounded in the teacher's `sixel_mod.rs`
//! passthrough entry point, adapted from a GUI canvas target to the
//! shared object cache.

use crate::cell::CellAttributes;
use crate::charset::Charset;
use crate::cursor::MoveFlags;
use crate::dispatch::reports::report_settings;
use crate::dispatch::Dispatcher;
use crate::parser::sequence::Sequence;
use crate::sixel;

/// Dispatch a complete DCS sequence (intermediates + params already
/// parsed, `payload` the collected passthrough string up to ST).
pub fn handle_dcs(d: &mut Dispatcher, seq: &Sequence) {
    match (seq.intermediates.as_slice(), seq.opcode) {
        (b"$", b'q') => {
            let reply = report_settings(d, &seq.payload);
            d.write_reply(&reply);
        }
        (b"$", b'u') => restore_presentation_state(d, seq),
        ([], b'q') => match sixel::decode_and_cache(&seq.payload) {
            Ok(key) => d.place_image(key),
            Err(err) => log::warn!("sixel decode failed: {err}"),
        },
        ([], b'|') => set_user_defined_keys(d, seq),
        _ => {}
    }
}

/// `DCS Pclear ; Plock ; Pmod | key/hex ; key/hex ; ... ST`: redefine
/// function-key strings (DECUDK). `key` is the 1-based function-key
/// number; `hex` is its replacement string as hex-pair bytes.
fn set_user_defined_keys(d: &mut Dispatcher, seq: &Sequence) {
    if d.udk_locked {
        return;
    }
    let clear = seq.params.get(0, 0) == 0;
    let lock = seq.params.get(1, 0) == 0;
    if clear {
        d.udk.clear();
    }
    for pair in seq.payload.split(';') {
        let Some((key, hex)) = pair.split_once('/') else { continue };
        let (Ok(key), Some(bytes)) = (key.parse::<u8>(), hex_decode(hex)) else { continue };
        d.udk.insert(key, bytes);
    }
    if lock {
        d.udk_locked = true;
    }
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    bytes
        .chunks(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some(((hi << 4) | lo) as u8)
        })
        .collect()
}

/// `DCS Ps $ u Pt ST` (DECRSPS): restore cursor state (`Ps == 1`,
/// DECCIR) or tab stops (`Ps == 2`, DECTABSR) from a report previously
/// captured via DECRQSS/DECTABSR.
fn restore_presentation_state(d: &mut Dispatcher, seq: &Sequence) {
    match seq.params.get(0, 0) {
        1 => restore_cursor_report(d, &seq.payload),
        2 => restore_tab_stops(d, &seq.payload),
        _ => {}
    }
}

fn restore_cursor_report(d: &mut Dispatcher, payload: &str) {
    let fields: Vec<&str> = payload.split(';').collect();
    let get = |n: usize| fields.get(n - 1).and_then(|s| s.parse::<i32>().ok()).unwrap_or(0);

    let row = get(1);
    let col = get(2);
    let sgr = get(4);
    let attrs = get(5);
    let flags = get(6);
    let gl = get(7);
    let gr = get(8);
    let gsets = fields.get(9).copied().unwrap_or("");

    d.page.cursor.origin_mode = flags & 0x01 != 0;
    d.page.autowrap = flags & 0x08 != 0;

    let mut template = d.page.cellattrs;
    template.sgr.set(CellAttributes::BOLD, sgr & 0x01 != 0);
    template.sgr.set(CellAttributes::UNDERLINE, sgr & 0x02 != 0);
    template.sgr.set(CellAttributes::BLINK, sgr & 0x04 != 0);
    template.sgr.set(CellAttributes::INVERT, sgr & 0x08 != 0);
    template.sgr.set(CellAttributes::PROTECTED, attrs & 0x01 != 0);
    d.page.cellattrs = template;

    d.page.move_cursor(col, row, MoveFlags::DISPLACEABLE);

    if flags & 0x02 != 0 {
        d.charset.single_shift(2);
    } else if flags & 0x04 != 0 {
        d.charset.single_shift(3);
    }

    for (slot, ch) in gsets.chars().take(4).enumerate() {
        let set = match ch {
            '0' => Charset::DecSpecialGraphics,
            '>' => Charset::DecTechnical,
            '<' => Charset::DecSupplemental,
            'A' => Charset::Latin1,
            _ => Charset::Ascii,
        };
        d.charset.designate(slot, set);
    }
    if (0..=3).contains(&gl) {
        d.charset.invoke_gl(gl as usize);
    }
    if (1..=3).contains(&gr) {
        d.charset.invoke_gr(gr as usize);
    }
}

fn restore_tab_stops(d: &mut Dispatcher, payload: &str) {
    d.page.clear_all_tabs();
    for field in payload.split('/') {
        if let Ok(pos) = field.parse::<i32>() {
            if pos > 0 {
                d.page.set_tab(pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::params::Params;
    use crate::parser::sequence::{Mode, SequenceKind};
    use crate::position::Size;

    #[test]
    fn decrqss_replies_with_sgr_state() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        let seq = Sequence {
            kind: SequenceKind::Dcs,
            intermediates: b"$".to_vec(),
            opcode: b'q',
            params: Params::new(),
            mode: Mode::None,
            payload: "m".to_string(),
        };
        handle_dcs(&mut d, &seq);
        assert_eq!(d.take_replies(), vec!["\x1bP1$r0m\x1b\\".to_string()]);
    }

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
    fn decudk_stores_hex_decoded_key_strings() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        let seq = Sequence {
            kind: SequenceKind::Dcs,
            intermediates: vec![],
            opcode: b'|',
            params: params_from(&[0, 1]),
            mode: Mode::None,
            payload: "1/4869".to_string(),
        };
        handle_dcs(&mut d, &seq);
        assert_eq!(d.user_defined_key(1), Some(b"Hi".as_slice()));
    }

    #[test]
    fn decrsps_restores_cursor_position() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        let seq = Sequence {
            kind: SequenceKind::Dcs,
            intermediates: b"$".to_vec(),
            opcode: b'u',
            params: params_from(&[1]),
            mode: Mode::None,
            payload: "5;10".to_string(),
        };
        handle_dcs(&mut d, &seq);
        assert_eq!(d.page.cursor.pos, crate::position::Position::new(10, 5));
    }

    #[test]
    fn dectabsr_replaces_tab_stops() {
        let mut d = Dispatcher::new(Size::new(80, 24));
        let seq = Sequence {
            kind: SequenceKind::Dcs,
            intermediates: b"$".to_vec(),
            opcode: b'u',
            params: params_from(&[2]),
            mode: Mode::None,
            payload: "5/9".to_string(),
        };
        handle_dcs(&mut d, &seq);
        assert_eq!(d.page.next_tab(1, 1), 5);
        assert_eq!(d.page.next_tab(5, 1), 9);
    }
}
