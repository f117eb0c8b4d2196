//! The typed event the state machine hands to the dispatcher (spec §4.A
//! "Sequence"), grounded in the shape of the teacher's `CallbackAction`
//! enum but generalized from a fixed action list to a structural
//! `{kind, intermediate, opcode, params, mode, payload}` record the
//! dispatcher pattern-matches on.

use crate::parser::params::Params;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceKind {
    /// A single printable glyph (already charset/width resolved).
    Print,
    /// A C0 or C1 control function (BEL, BS, CR, LF, ...).
    Control,
    /// `ESC <intermediates> <final>`, no CSI/DCS framing.
    Escape,
    /// `CSI <params> <intermediates> <final>`.
    Csi,
    /// A complete DCS sequence, payload collected through to ST.
    Dcs,
    /// A complete OSC sequence, payload collected through to ST/BEL.
    Osc,
    /// SOS/PM/APC: payload passed through largely uninterpreted.
    ApcLike,
}

/// Which private-marker prefix (if any) preceded a CSI/DCS sequence's
/// parameters: `?` (DEC private), `>` (secondary DA), `=` (tertiary DA),
/// `<` (another xterm private range).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    None,
    Dec,
    Greater,
    Equals,
    Less,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    pub kind: SequenceKind,
    /// Intermediate bytes (0x20-0x2f) seen before the final byte.
    pub intermediates: Vec<u8>,
    /// The final byte (CSI/escape) or introducer (control code value).
    pub opcode: u8,
    pub params: Params,
    pub mode: Mode,
    /// Raw text payload for `Dcs`/`Osc`/`ApcLike`, or the single decoded
    /// character for `Print`.
    pub payload: String,
}

impl Sequence {
    pub fn print(ch: char) -> Self {
        Sequence {
            kind: SequenceKind::Print,
            intermediates: Vec::new(),
            opcode: 0,
            params: Params::new(),
            mode: Mode::None,
            payload: ch.to_string(),
        }
    }

    pub fn control(byte: u8) -> Self {
        Sequence {
            kind: SequenceKind::Control,
            intermediates: Vec::new(),
            opcode: byte,
            params: Params::new(),
            mode: Mode::None,
            payload: String::new(),
        }
    }

    /// First char of `payload`, used by callers that only care about the
    /// single printed glyph.
    pub fn ch(&self) -> char {
        self.payload.chars().next().unwrap_or('\0')
    }
}
