//! The scrollable grid of lines, margins, cursor, and tab stops (spec §3
//! Page), grounded in `original_source/Terminal/Page.cpp`.

use std::collections::VecDeque;

use crate::cell::{Cell, CellAttrTemplate, CellAttributes};
use crate::cursor::{Cursor, MoveFlags};
use crate::line::{filler_cell, FillFlags, Line};
use crate::position::{Position, Rect, Size};

/// Default history capacity in lines, matching common xterm-family
/// defaults for an unconfigured scrollback.
pub const DEFAULT_HISTORY_SIZE: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

pub struct Page {
    lines: Vec<Line>,
    history: VecDeque<Line>,
    historysize: usize,
    /// Column interval `reset_tabs` lays default stops out at.
    tabsize: usize,
    size: Size,
    pub margins: Rect,
    /// Whether DECSLRM (left/right margins) may be set at all; off by
    /// default until DECLRMM enables it.
    pub left_right_margins_enabled: bool,
    pub cursor: Cursor,
    pub tabs: Vec<bool>,
    pub cellattrs: CellAttrTemplate,
    /// Treat East Asian Ambiguous-width characters as wide when true.
    pub ambiguouscellwidth: bool,
    pub autowrap: bool,
    pub reverse_wrap: bool,
    pub insert_mode: bool,
}

impl Page {
    pub fn new(size: Size) -> Self {
        let margins = Rect::full(size);
        let mut page = Page {
            lines: (0..size.cy.max(0)).map(|_| Line::new(size.cx)).collect(),
            history: VecDeque::new(),
            historysize: DEFAULT_HISTORY_SIZE,
            tabsize: 8,
            size,
            margins,
            left_right_margins_enabled: false,
            cursor: Cursor::new(),
            tabs: Vec::new(),
            cellattrs: CellAttrTemplate::default(),
            ambiguouscellwidth: false,
            autowrap: true,
            reverse_wrap: false,
            insert_mode: false,
        };
        page.reset_tabs();
        page
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_history_size(&mut self, n: usize) {
        self.historysize = n;
        while self.history.len() > self.historysize {
            self.history.pop_front();
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn filler(&self) -> Cell {
        filler_cell(self.cellattrs)
    }

    pub fn line(&self, row1: i32) -> Option<&Line> {
        self.lines.get((row1 - 1) as usize)
    }

    pub fn line_mut(&mut self, row1: i32) -> Option<&mut Line> {
        self.lines.get_mut((row1 - 1) as usize)
    }

    /// Fetch a line from the combined scrollback+visible address space,
    /// where row `0` is the oldest scrollback line. Out-of-range returns
    /// a void line (spec §4.B).
    pub fn line_span(&self, index: i64) -> Line {
        let hist = self.history.len() as i64;
        if index < 0 || index >= hist + self.lines.len() as i64 {
            return crate::line::void_line();
        }
        if index < hist {
            self.history[index as usize].clone()
        } else {
            self.lines[(index - hist) as usize].clone()
        }
    }

    pub fn total_lines(&self) -> i64 {
        self.history.len() as i64 + self.lines.len() as i64
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.line(pos.y)?.cell(pos.x)
    }

    // ---- tab stops ----

    pub fn reset_tabs(&mut self) {
        let cx = self.size.cx.max(0) as usize;
        let step = self.tabsize.max(1);
        self.tabs = (0..cx).map(|i| i % step == 0).collect();
    }

    pub fn set_tab_size(&mut self, n: usize) {
        self.tabsize = n.max(1);
        self.reset_tabs();
    }

    pub fn set_tab(&mut self, col1: i32) {
        if let Some(slot) = self.tabs.get_mut((col1 - 1).max(0) as usize) {
            *slot = true;
        }
    }

    pub fn clear_tab(&mut self, col1: i32) {
        if let Some(slot) = self.tabs.get_mut((col1 - 1).max(0) as usize) {
            *slot = false;
        }
    }

    pub fn clear_all_tabs(&mut self) {
        self.tabs.iter_mut().for_each(|t| *t = false);
    }

    pub fn next_tab(&self, from1: i32, n: i32) -> i32 {
        let mut col = from1;
        let mut remaining = n.max(1);
        while remaining > 0 {
            col += 1;
            if col as usize > self.tabs.len() {
                col = self.size.cx;
                break;
            }
            if self.tabs[(col - 1) as usize] {
                remaining -= 1;
            }
        }
        col.min(self.size.cx)
    }

    pub fn prev_tab(&self, from1: i32, n: i32) -> i32 {
        let mut col = from1;
        let mut remaining = n.max(1);
        while remaining > 0 && col > 1 {
            col -= 1;
            if self.tabs[(col - 1).max(0) as usize] {
                remaining -= 1;
            }
        }
        col.max(1)
    }

    // ---- resize ----

    pub fn resize(&mut self, new_size: Size) {
        let filler = self.filler();
        for line in self.lines.iter_mut() {
            line.adjust(new_size.cx, filler);
        }
        let old_cy = self.lines.len() as i32;
        if new_size.cy > old_cy {
            // Pull rows back from history before manufacturing new blank
            // ones, so a shrink immediately undone by a grow (no writes
            // in between) reproduces the original grid exactly.
            for _ in old_cy..new_size.cy {
                match self.history.pop_back() {
                    Some(mut line) => {
                        line.adjust(new_size.cx, filler);
                        self.lines.insert(0, line);
                    }
                    None => self.lines.push(Line::new(new_size.cx)),
                }
            }
        } else if new_size.cy < old_cy {
            for _ in new_size.cy..old_cy {
                if let Some(line) = self.lines.first().cloned() {
                    self.push_history(line);
                }
                self.lines.remove(0);
            }
        }
        self.size = new_size;
        self.margins = Rect::full(new_size);
        self.reset_tabs();
        self.cursor.pos = self.margins.clamp_pos(self.cursor.pos);
    }

    fn push_history(&mut self, line: Line) {
        self.history.push_back(line);
        while self.history.len() > self.historysize {
            self.history.pop_front();
        }
    }

    // ---- scrolling ----

    /// Scroll the `[top, bottom]` rows of the current margins by `n`
    /// lines. Lines scrolled off the top of the *full-height, full-width*
    /// region go to history; otherwise they're simply dropped, matching
    /// xterm's behavior that a horizontally or vertically margined
    /// scroll never touches scrollback.
    pub fn scroll(&mut self, dir: ScrollDirection, n: i32) {
        self.scroll_region(self.margins, dir, n);
    }

    pub fn scroll_region(&mut self, region: Rect, dir: ScrollDirection, n: i32) {
        let n = n.max(0);
        if n == 0 {
            return;
        }
        let full_width = region.left == 1 && region.right == self.size.cx;
        let filler = self.filler();
        let top = region.top;
        let bottom = region.bottom.min(self.lines.len() as i32);
        if top > bottom {
            return;
        }
        let span = (bottom - top + 1) as usize;
        let n = (n as usize).min(span);
        match dir {
            ScrollDirection::Up => {
                for _ in 0..n {
                    let mut removed = self.lines.remove((top - 1) as usize);
                    if full_width {
                        self.push_history(removed.clone());
                    }
                    removed.adjust(self.size.cx, filler);
                    removed.fill(1, removed.len(), filler, FillFlags::NORMAL);
                    self.lines.insert((bottom - 1) as usize, removed);
                }
            }
            ScrollDirection::Down => {
                for _ in 0..n {
                    let removed = self.lines.remove((bottom - 1) as usize);
                    let mut blank = removed;
                    blank.adjust(self.size.cx, filler);
                    blank.fill(1, blank.len(), filler, FillFlags::NORMAL);
                    self.lines.insert((top - 1) as usize, blank);
                }
            }
        }
        if !full_width {
            self.fill_region_edges(region);
        }
    }

    fn fill_region_edges(&mut self, region: Rect) {
        let filler = self.filler();
        for row in region.top..=region.bottom.min(self.lines.len() as i32) {
            if let Some(line) = self.line_mut(row) {
                line.fill(region.left, region.right, filler, FillFlags::NORMAL);
            }
        }
    }

    // ---- cursor motion ----

    pub fn move_cursor(&mut self, dx: i32, dy: i32, flags: MoveFlags) {
        let region = if flags.contains(MoveFlags::MARGINAL) { self.margins } else { Rect::full(self.size) };
        let mut target = if flags.contains(MoveFlags::RELATIVE) {
            self.cursor.pos + (dx, dy)
        } else {
            Position::new(dx, dy)
        };

        if dy != 0 && flags.contains(MoveFlags::SCROLLER) {
            if target.y > region.bottom {
                self.scroll(ScrollDirection::Up, target.y - region.bottom);
                target.y = region.bottom;
            } else if target.y < region.top {
                self.scroll(ScrollDirection::Down, region.top - target.y);
                target.y = region.top;
            }
        }

        self.cursor.pos = region.clamp_pos(target);
        if flags.contains(MoveFlags::DISPLACEABLE) {
            self.cursor.eol = false;
        }
    }

    /// Advance past writing a glyph at the cursor, handling autowrap.
    /// Returns true if the write caused a line-feed/wrap to occur.
    pub fn advance_after_write(&mut self, glyph_width: i32) -> bool {
        let right = self.margins.right;
        if self.cursor.pos.x + glyph_width - 1 >= right {
            if self.autowrap {
                self.cursor.eol = true;
            }
            self.cursor.pos.x = right;
            false
        } else {
            self.cursor.pos.x += glyph_width;
            false
        }
    }

    /// Perform the pending wrap set by `advance_after_write`, moving to
    /// column 1 of the next line (scrolling if at the bottom margin) and
    /// marking the line we're leaving as soft-wrapped.
    pub fn do_pending_wrap(&mut self) {
        if !self.cursor.eol {
            return;
        }
        self.cursor.eol = false;
        if let Some(line) = self.line_mut(self.cursor.pos.y) {
            line.wrapped = true;
        }
        self.move_cursor(self.margins.left, 1, MoveFlags::MARGINAL | MoveFlags::SCROLLER | MoveFlags::RELATIVE | MoveFlags::DISPLACEABLE);
        self.cursor.pos.x = self.margins.left;
    }

    // ---- rectangular operations ----

    /// DECERA: erase the rectangle to blanks from the current template,
    /// ignoring protection.
    pub fn erase_rect(&mut self, rect: Rect) {
        let filler = self.filler();
        for row in rect.top..=rect.bottom {
            if let Some(line) = self.line_mut(row) {
                line.fill(rect.left, rect.right, filler, FillFlags::NORMAL);
            }
        }
    }

    /// DECSERA: selective erase, leaving `PROTECTED` cells untouched.
    pub fn selective_erase_rect(&mut self, rect: Rect) {
        let mut filler = self.filler();
        filler.sgr.remove(CellAttributes::PROTECTED);
        for row in rect.top..=rect.bottom {
            if let Some(line) = self.line_mut(row) {
                line.fill(rect.left, rect.right, filler, FillFlags::SELECTIVE);
            }
        }
    }

    /// DECFRA: fill the rectangle with `ch` using the current SGR
    /// template, ignoring protection.
    pub fn fill_rect(&mut self, rect: Rect, ch: char) {
        let ink = self.cellattrs.ink;
        let paper = self.cellattrs.paper;
        let sgr = self.cellattrs.sgr;
        for row in rect.top..=rect.bottom {
            if let Some(line) = self.line_mut(row) {
                for col in rect.left..=rect.right {
                    if let Some(cell) = line.cell_mut(col) {
                        *cell = Cell {
                            ch,
                            ink,
                            paper,
                            sgr,
                            ..Cell::default()
                        };
                    }
                }
            }
        }
    }

    /// DECCARA: OR the given attribute bits into every (non-protected,
    /// if selective) cell of the rectangle.
    pub fn change_attrs_rect(&mut self, rect: Rect, attrs: CellAttributes, selective: bool) {
        for row in rect.top..=rect.bottom {
            if let Some(line) = self.line_mut(row) {
                for col in rect.left..=rect.right {
                    if let Some(cell) = line.cell_mut(col) {
                        if selective && cell.is_protected() {
                            continue;
                        }
                        cell.sgr |= attrs;
                    }
                }
            }
        }
    }

    /// DECRARA: reverse (toggle) the given attribute bits.
    pub fn reverse_attrs_rect(&mut self, rect: Rect, attrs: CellAttributes, selective: bool) {
        for row in rect.top..=rect.bottom {
            if let Some(line) = self.line_mut(row) {
                for col in rect.left..=rect.right {
                    if let Some(cell) = line.cell_mut(col) {
                        if selective && cell.is_protected() {
                            continue;
                        }
                        cell.sgr ^= attrs;
                    }
                }
            }
        }
    }

    /// DECCRA: copy a rectangle, possibly to a different page region,
    /// cell-for-cell including attributes and glyph.
    pub fn copy_rect(&mut self, src: Rect, dst_top_left: Position) {
        let mut buf = Vec::with_capacity(src.height() as usize);
        for row in src.top..=src.bottom {
            let cells: Vec<Cell> = match self.line(row) {
                Some(line) => (src.left..=src.right).map(|c| line.cell(c).copied().unwrap_or_default()).collect(),
                None => vec![Cell::default(); src.width() as usize],
            };
            buf.push(cells);
        }
        for (i, cells) in buf.into_iter().enumerate() {
            let row = dst_top_left.y + i as i32;
            if let Some(line) = self.line_mut(row) {
                for (j, cell) in cells.into_iter().enumerate() {
                    let col = dst_top_left.x + j as i32;
                    if let Some(dst) = line.cell_mut(col) {
                        *dst = cell;
                    }
                }
            }
        }
    }

    pub fn clear_scrollback(&mut self) {
        self.history.clear();
    }

    /// Collect and clear the `invalid` flag of every visible line touched
    /// since the last call, for a host to redraw (spec §4.H "Painting").
    pub fn take_invalid_rows(&mut self) -> Vec<i32> {
        let mut rows = Vec::new();
        for (i, line) in self.lines.iter_mut().enumerate() {
            if line.invalid {
                rows.push(i as i32 + 1);
                line.invalid = false;
            }
        }
        rows
    }
}
