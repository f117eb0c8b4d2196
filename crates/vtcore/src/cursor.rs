//! Cursor position, pending-wrap state, and DECSC/DECRC save/restore
//! (spec §3 Cursor), grounded in `original_source/Terminal/Page.cpp`'s
//! cursor handling and `original_source/Terminal/Caret.cpp`.

use crate::cell::CellAttrTemplate;
use crate::charset::CharsetState;
use crate::position::Position;

bitflags::bitflags! {
    /// Flags passed to `Page::move_cursor` describing how a motion should
    /// be interpreted; these fold several of the original's boolean
    /// parameters into one mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MoveFlags: u8 {
        /// Offsets are relative to the current position, not absolute.
        const RELATIVE      = 1 << 0;
        /// Row is relative to the top scroll margin (DECOM origin mode).
        const MARGINAL      = 1 << 1;
        /// The cursor may be displaced into the next line by a wide glyph
        /// or explicit wrap, clearing `eol`.
        const DISPLACEABLE  = 1 << 2;
        /// Motion past the bottom margin scrolls the page instead of
        /// clamping.
        const SCROLLER      = 1 << 3;
        /// Motion past the right margin soft-wraps to the next line
        /// instead of clamping at the margin.
        const REWRAPPER     = 1 << 4;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretShape {
    Block,
    Underline,
    Bar,
}

impl Default for CaretShape {
    fn default() -> Self {
        CaretShape::Block
    }
}

/// Cursor state captured and restored by DECSC/DECRC, plus everything
/// else the page tracks about where the next glyph lands.
#[derive(Clone, Debug)]
pub struct Cursor {
    pub pos: Position,
    /// True once a glyph has been written to the last column and autowrap
    /// is pending; the next printable glyph wraps before drawing.
    pub eol: bool,
    pub visible: bool,
    pub blinking: bool,
    pub shape: CaretShape,
    pub origin_mode: bool,
    /// Snapshot of everything DECSC/DECRC restores.
    backup: Option<CursorBackup>,
}

#[derive(Clone, Debug)]
struct CursorBackup {
    pos: Position,
    eol: bool,
    origin_mode: bool,
    template: CellAttrTemplate,
    charset: CharsetState,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            pos: Position::new(1, 1),
            eol: false,
            visible: true,
            blinking: true,
            shape: CaretShape::default(),
            origin_mode: false,
            backup: None,
        }
    }
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// DECSC: remember position, pending-wrap, origin mode, the current
    /// SGR/ink/paper template, and the charset designation state.
    pub fn save(&mut self, template: CellAttrTemplate, charset: CharsetState) {
        self.backup = Some(CursorBackup {
            pos: self.pos,
            eol: self.eol,
            origin_mode: self.origin_mode,
            template,
            charset,
        });
    }

    /// DECRC: restore the saved state, or reset to the home position with
    /// default attributes if nothing was ever saved (xterm behavior).
    pub fn restore(&mut self) -> (CellAttrTemplate, CharsetState) {
        match self.backup.clone() {
            Some(b) => {
                self.pos = b.pos;
                self.eol = b.eol;
                self.origin_mode = b.origin_mode;
                (b.template, b.charset)
            }
            None => {
                self.pos = Position::new(1, 1);
                self.eol = false;
                (CellAttrTemplate::default(), CharsetState::default())
            }
        }
    }

    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }
}
