//! An ordered, resizable sequence of cells with wrap/invalid flags
//! (spec §3 Line), grounded in `original_source/Terminal/Page.cpp`'s
//! `VTLine` (`Adjust`/`Grow`/`Shrink`/`ShiftLeft`/`ShiftRight`/`Fill`).

use crate::cell::{Cell, CellAttrTemplate};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FillFlags: u8 {
        /// Overwrite every cell, protected or not.
        const NORMAL           = 0;
        /// Leave cells with `CellAttributes::PROTECTED` untouched.
        const SELECTIVE        = 1 << 0;
        /// Only touch cells that *are* protected (used by DECSERA's
        /// complement operations).
        const PROTECTED_ONLY   = 1 << 1;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    cells: Vec<Cell>,
    /// The physical newline to the next line is a soft wrap.
    pub wrapped: bool,
    /// Paint is needed.
    pub invalid: bool,
}

impl Line {
    pub fn new(width: i32) -> Self {
        Line {
            cells: vec![Cell::default(); width.max(0) as usize],
            wrapped: false,
            invalid: true,
        }
    }

    pub fn len(&self) -> i32 {
        self.cells.len() as i32
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, col1: i32) -> Option<&Cell> {
        self.cells.get((col1 - 1) as usize)
    }

    pub fn cell_mut(&mut self, col1: i32) -> Option<&mut Cell> {
        self.invalid = true;
        self.cells.get_mut((col1 - 1) as usize)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Resize to `cx` columns, using `filler` for any new cells. Shrinking
    /// or growing both clear `wrapped` (a line can't claim to wrap into a
    /// row whose width just changed out from under it).
    pub fn adjust(&mut self, cx: i32, filler: Cell) {
        let cx = cx.max(0) as usize;
        if cx != self.cells.len() {
            self.wrapped = false;
        }
        self.cells.resize(cx, filler);
        self.invalid = true;
    }

    pub fn grow(&mut self, cx: i32, filler: Cell) {
        let cx = cx.max(0) as usize;
        if cx > self.cells.len() {
            self.wrapped = false;
            self.cells.resize(cx, filler);
            self.invalid = true;
        }
    }

    pub fn shrink(&mut self, cx: i32) {
        let cx = cx.max(0) as usize;
        if cx < self.cells.len() {
            self.wrapped = false;
            self.cells.truncate(cx);
            self.invalid = true;
        }
    }

    /// Shift the `[begin, end]` (1-based, inclusive) span left by `n`,
    /// pulling `filler` in at the right edge. Used by DCH (delete char).
    pub fn shift_left(&mut self, begin: i32, end: i32, n: i32, filler: Cell) {
        let lo = (begin - 1).max(0) as usize;
        let hi = (end as usize).min(self.cells.len());
        if lo >= hi || n <= 0 {
            return;
        }
        let n = (n as usize).min(hi - lo);
        self.cells[lo..hi].rotate_left(n);
        for c in &mut self.cells[hi - n..hi] {
            *c = filler;
        }
        self.wrapped = false;
        self.invalid = true;
    }

    /// Shift the `[begin, end]` span right by `n`, pulling `filler` in at
    /// the left edge. Used by ICH (insert char).
    pub fn shift_right(&mut self, begin: i32, end: i32, n: i32, filler: Cell) {
        let lo = (begin - 1).max(0) as usize;
        let hi = (end as usize).min(self.cells.len());
        if lo >= hi || n <= 0 {
            return;
        }
        let n = (n as usize).min(hi - lo);
        self.cells[lo..hi].rotate_right(n);
        for c in &mut self.cells[lo..lo + n] {
            *c = filler;
        }
        self.wrapped = false;
        self.invalid = true;
    }

    /// Fill `[begin, end]` (1-based, inclusive, clamped to the line) with
    /// `filler`, honoring `flags`. Returns whether anything was touched.
    pub fn fill(&mut self, begin: i32, end: i32, filler: Cell, flags: FillFlags) -> bool {
        let n = self.cells.len() as i32;
        let b = begin.clamp(1, n.max(1));
        let e = end.clamp(1, n.max(1));
        if b > e || self.cells.is_empty() {
            return false;
        }
        for cell in &mut self.cells[(b - 1) as usize..e as usize] {
            let protected = cell.is_protected();
            let skip = (flags.contains(FillFlags::SELECTIVE) && protected) || (flags.contains(FillFlags::PROTECTED_ONLY) && !protected);
            if !skip {
                *cell = filler;
            }
        }
        self.invalid = true;
        true
    }

    pub fn fill_left(&mut self, begin: i32, filler: Cell, flags: FillFlags) -> bool {
        self.fill(1, begin, filler, flags)
    }

    pub fn fill_right(&mut self, begin: i32, filler: Cell, flags: FillFlags) -> bool {
        self.fill(begin, self.len(), filler, flags)
    }

    /// Extract the plain text of the line, collapsing wide-continuation
    /// cells and combining marks into the preceding grapheme.
    pub fn text(&self) -> String {
        let mut s = String::with_capacity(self.cells.len());
        for c in &self.cells {
            if c.is_wide_continuation() {
                continue;
            }
            s.push_str(&c.grapheme());
        }
        s
    }
}

/// A filler cell built from the page's current attribute template,
/// matching spec §3's "cellattrs: the current SGR/fill template".
pub fn filler_cell(template: CellAttrTemplate) -> Cell {
    Cell::blank_with(template)
}

/// A sentinel line returned for any index outside the combined
/// scrollback+visible range; renders as nothing and matches no selection
/// (spec §4.B "Line fetch").
pub fn void_line() -> Line {
    Line {
        cells: Vec::new(),
        wrapped: false,
        invalid: false,
    }
}

impl Line {
    pub fn is_void(&self) -> bool {
        self.cells.is_empty()
    }
}
