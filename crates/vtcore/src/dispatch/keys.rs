//! Key symbol -> escape sequence encoding (spec §4.C "Keys"), grounded
//! in `original_source/Terminal/Keys.cpp`'s `sFunctionKeyMap` and its
//! `ProcessVTStyleFunctionKey`/`ProcessPCStyleFunctionKey` pair, cast
//! into the teacher's enum-and-match idiom.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySymbol {
    Up,
    Down,
    Right,
    Left,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Char(char),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    /// xterm's 1-based modifier parameter: Shift=2, Alt=3, Shift+Alt=4,
    /// Ctrl=5, Shift+Ctrl=6, Ctrl+Alt=7, Shift+Ctrl+Alt=8, none=0.
    fn xterm_code(self) -> Option<u32> {
        match (self.shift, self.alt, self.ctrl) {
            (false, false, false) => None,
            (true, false, false) => Some(2),
            (false, true, false) => Some(3),
            (true, true, false) => Some(4),
            (false, false, true) => Some(5),
            (true, false, true) => Some(6),
            (false, true, true) => Some(7),
            (true, true, true) => Some(8),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FunctionKind {
    /// Cursor keys: CSI or SS3 letter, switching on DECCKM.
    Cursor,
    /// `CSI n ~` editing-pad keys (Insert/Delete/PageUp/PageDown).
    EditPad,
    /// `CSI H`/`CSI F` or `SS3 H`/`SS3 F` with no `~`.
    EditPadLetter,
    /// `CSI n ~` function keys (F5 and up).
    Function,
    /// `SS3` programmable keys (F1-F4, PF1-PF4).
    Programmable,
}

struct FunctionKey {
    kind: FunctionKind,
    code: &'static str,
}

fn lookup(sym: KeySymbol) -> Option<FunctionKey> {
    use FunctionKind::*;
    Some(match sym {
        KeySymbol::Up => FunctionKey { kind: Cursor, code: "A" },
        KeySymbol::Down => FunctionKey { kind: Cursor, code: "B" },
        KeySymbol::Right => FunctionKey { kind: Cursor, code: "C" },
        KeySymbol::Left => FunctionKey { kind: Cursor, code: "D" },
        KeySymbol::Insert => FunctionKey { kind: EditPad, code: "2" },
        KeySymbol::Delete => FunctionKey { kind: EditPad, code: "3" },
        KeySymbol::Home => FunctionKey { kind: EditPadLetter, code: "H" },
        KeySymbol::End => FunctionKey { kind: EditPadLetter, code: "F" },
        KeySymbol::PageUp => FunctionKey { kind: EditPad, code: "5" },
        KeySymbol::PageDown => FunctionKey { kind: EditPad, code: "6" },
        KeySymbol::F(1) => FunctionKey { kind: Programmable, code: "P" },
        KeySymbol::F(2) => FunctionKey { kind: Programmable, code: "Q" },
        KeySymbol::F(3) => FunctionKey { kind: Programmable, code: "R" },
        KeySymbol::F(4) => FunctionKey { kind: Programmable, code: "S" },
        KeySymbol::F(5) => FunctionKey { kind: Function, code: "15" },
        KeySymbol::F(6) => FunctionKey { kind: Function, code: "17" },
        KeySymbol::F(7) => FunctionKey { kind: Function, code: "18" },
        KeySymbol::F(8) => FunctionKey { kind: Function, code: "19" },
        KeySymbol::F(9) => FunctionKey { kind: Function, code: "20" },
        KeySymbol::F(10) => FunctionKey { kind: Function, code: "21" },
        KeySymbol::F(11) => FunctionKey { kind: Function, code: "23" },
        KeySymbol::F(12) => FunctionKey { kind: Function, code: "24" },
        _ => return None,
    })
}

/// Encode a key press into the bytes to write back to the pty, given
/// the current DECCKM (application cursor keys) state, whether PC
/// style (xterm modifier suffix) or strict VT style (no modifiers on
/// function keys beyond Ctrl folding into a control byte) is in use,
/// whether XTALTESCM (meta sends escape) is set, and whether the
/// terminal is in VT52 (DECANM reset) conformance mode.
pub fn encode_key(
    sym: KeySymbol,
    modifiers: Modifiers,
    application_cursor_keys: bool,
    pc_style: bool,
    meta_sends_escape: bool,
    vt52_mode: bool,
) -> String {
    if let KeySymbol::Char(ch) = sym {
        return encode_char(ch, modifiers, meta_sends_escape);
    }

    if vt52_mode {
        return encode_key_vt52(sym);
    }

    let Some(key) = lookup(sym) else { return String::new() };

    if pc_style {
        if let Some(code) = modifiers.xterm_code() {
            return match key.kind {
                FunctionKind::Cursor => format!("\x1b[1;{code}{}", key.code),
                FunctionKind::EditPadLetter => format!("\x1b[1;{code}{}", key.code),
                FunctionKind::Programmable => format!("\x1b[1;{code}{}", key.code),
                FunctionKind::EditPad | FunctionKind::Function => format!("\x1b[{};{code}~", key.code),
            };
        }
    }

    match key.kind {
        FunctionKind::Cursor => {
            if application_cursor_keys {
                format!("\x1bO{}", key.code)
            } else {
                format!("\x1b[{}", key.code)
            }
        }
        FunctionKind::EditPadLetter => {
            if application_cursor_keys {
                format!("\x1bO{}", key.code)
            } else {
                format!("\x1b[{}", key.code)
            }
        }
        FunctionKind::EditPad | FunctionKind::Function => format!("\x1b[{}~", key.code),
        FunctionKind::Programmable => format!("\x1bO{}", key.code),
    }
}

fn encode_char(ch: char, modifiers: Modifiers, meta_sends_escape: bool) -> String {
    if modifiers.ctrl && ch.is_ascii() {
        let byte = (ch.to_ascii_uppercase() as u8) & 0x1f;
        return (byte as char).to_string();
    }
    if modifiers.alt && meta_sends_escape {
        return format!("\x1b{ch}");
    }
    ch.to_string()
}

/// VT52 mode (DECANM reset): bare `ESC` + letter forms, no CSI/SS3, and
/// no modifier encoding — editing-pad and F5+ keys have no VT52 form.
fn encode_key_vt52(sym: KeySymbol) -> String {
    match sym {
        KeySymbol::Up => "\x1bA".to_string(),
        KeySymbol::Down => "\x1bB".to_string(),
        KeySymbol::Right => "\x1bC".to_string(),
        KeySymbol::Left => "\x1bD".to_string(),
        KeySymbol::Home => "\x1bH".to_string(),
        KeySymbol::F(1) => "\x1bP".to_string(),
        KeySymbol::F(2) => "\x1bQ".to_string(),
        KeySymbol::F(3) => "\x1bR".to_string(),
        KeySymbol::F(4) => "\x1bS".to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_switch_on_application_mode() {
        assert_eq!(encode_key(KeySymbol::Up, Modifiers::default(), false, false, false, false), "\x1b[A");
        assert_eq!(encode_key(KeySymbol::Up, Modifiers::default(), true, false, false, false), "\x1bOA");
    }

    #[test]
    fn pc_style_adds_xterm_modifier_suffix() {
        let m = Modifiers { shift: true, alt: false, ctrl: false };
        assert_eq!(encode_key(KeySymbol::Up, m, false, true, false, false), "\x1b[1;2A");
        assert_eq!(encode_key(KeySymbol::Delete, m, false, true, false, false), "\x1b[3;2~");
    }

    #[test]
    fn ctrl_char_folds_to_control_byte() {
        let m = Modifiers { shift: false, alt: false, ctrl: true };
        assert_eq!(encode_key(KeySymbol::Char('a'), m, false, false, false, false), "\x01");
    }

    #[test]
    fn alt_char_prefixes_escape_only_when_meta_sends_escape_is_set() {
        let m = Modifiers { shift: false, alt: true, ctrl: false };
        assert_eq!(encode_key(KeySymbol::Char('a'), m, false, false, true, false), "\x1ba");
        assert_eq!(encode_key(KeySymbol::Char('a'), m, false, false, false, false), "a");
    }

    #[test]
    fn function_keys_without_modifier() {
        assert_eq!(encode_key(KeySymbol::F(1), Modifiers::default(), false, false, false, false), "\x1bOP");
        assert_eq!(encode_key(KeySymbol::F(5), Modifiers::default(), false, false, false, false), "\x1b[15~");
    }

    #[test]
    fn vt52_mode_uses_bare_escape_letter_forms() {
        assert_eq!(encode_key(KeySymbol::Up, Modifiers::default(), true, true, false, true), "\x1bA");
        assert_eq!(encode_key(KeySymbol::F(1), Modifiers::default(), false, false, false, true), "\x1bP");
        assert_eq!(encode_key(KeySymbol::Delete, Modifiers::default(), false, false, false, true), "");
    }
}
