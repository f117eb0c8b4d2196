//! One grid position's glyph, attributes, and semantic tag (spec §3 Cell).

use crate::color::Color;

bitflags::bitflags! {
    /// The SGR/semantic bit mask carried per cell.
    ///
    /// `WIDE_CONTINUATION` marks the trailing half of a double-width glyph
    /// (the spec's `chr == 1` sentinel); Rust's `char` can't hold that
    /// sentinel directly, so it lives here instead, and `Cell::ch` of a
    /// continuation cell mirrors the leading cell's glyph for callers that
    /// only look at `ch`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct CellAttributes: u32 {
        const BOLD               = 1 << 0;
        const FAINT              = 1 << 1;
        const ITALIC             = 1 << 2;
        const UNDERLINE          = 1 << 3;
        const BLINK              = 1 << 4;
        const INVERT             = 1 << 5;
        const STRIKEOUT          = 1 << 6;
        const OVERLINE           = 1 << 7;
        const CONCEALED          = 1 << 8;
        const PROTECTED          = 1 << 9;
        const IMAGE              = 1 << 10;
        const HYPERLINK          = 1 << 11;
        const ANNOTATION         = 1 << 12;
        const PROMPT             = 1 << 13;
        const INPUT              = 1 << 14;
        const OUTPUT             = 1 << 15;
        const WIDE_CONTINUATION  = 1 << 16;
        const DOUBLE_UNDERLINE   = 1 << 17;
        const CURLY_UNDERLINE    = 1 << 18;
        /// This cell is the leading half of a double-width glyph; the
        /// immediately following cell carries `WIDE_CONTINUATION`.
        const WIDE               = 1 << 19;
    }
}

/// The current SGR/fill template a page applies to newly written or
/// erased cells (spec §3 Page's `cellattrs` field).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellAttrTemplate {
    pub ink: Color,
    pub paper: Color,
    pub sgr: CellAttributes,
    /// SGR 58/59: underline color, independent of `ink`. `None` means
    /// "use the foreground color" (SGR 59's default).
    pub underline_color: Option<Color>,
}

/// Coordinates of an inline-image tile, valid only when
/// [`CellAttributes::IMAGE`] is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectTile {
    pub col: u16,
    pub row: u16,
}

/// Up to four code points: the base glyph plus combining marks, matching
/// spec §4.C's "recommended N=4 with overflow truncated".
const MAX_COMBINING: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub(crate) combining: [Option<char>; MAX_COMBINING],
    pub ink: Color,
    pub paper: Color,
    pub sgr: CellAttributes,
    pub underline_color: Option<Color>,
    /// Id into the shared image/hypertext cache; valid iff `sgr` has
    /// `IMAGE | HYPERLINK | ANNOTATION` set.
    pub data: u32,
    pub object: ObjectTile,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            combining: [None; MAX_COMBINING],
            ink: Color::Default,
            paper: Color::Default,
            sgr: CellAttributes::empty(),
            underline_color: None,
            data: 0,
            object: ObjectTile::default(),
        }
    }
}

impl Cell {
    pub fn blank_with(attrs: CellAttrTemplate) -> Self {
        Cell {
            ch: ' ',
            ink: attrs.ink,
            paper: attrs.paper,
            sgr: attrs.sgr & CellAttributes::PROTECTED,
            ..Default::default()
        }
    }

    pub fn is_wide_lead(&self) -> bool {
        self.sgr.contains(CellAttributes::WIDE)
    }

    pub fn is_wide_continuation(&self) -> bool {
        self.sgr.contains(CellAttributes::WIDE_CONTINUATION)
    }

    /// Display width: 0 for a continuation cell, 2 for a wide lead, else 1.
    pub fn width(&self) -> u8 {
        if self.is_wide_continuation() {
            0
        } else if self.is_wide_lead() {
            2
        } else {
            1
        }
    }

    pub fn is_protected(&self) -> bool {
        self.sgr.contains(CellAttributes::PROTECTED)
    }

    pub fn is_object(&self) -> bool {
        self.sgr.intersects(CellAttributes::IMAGE | CellAttributes::HYPERLINK | CellAttributes::ANNOTATION)
    }

    /// Append a combining mark to this cell's grapheme cluster. Overflow
    /// beyond `MAX_COMBINING` marks is silently dropped.
    pub fn push_combining(&mut self, mark: char) {
        for slot in self.combining.iter_mut() {
            if slot.is_none() {
                *slot = Some(mark);
                return;
            }
        }
    }

    /// The full grapheme cluster as a `String`: base glyph followed by
    /// any combining marks.
    pub fn grapheme(&self) -> String {
        let mut s = String::from(self.ch);
        for mark in self.combining.iter().flatten() {
            s.push(*mark);
        }
        s
    }
}
