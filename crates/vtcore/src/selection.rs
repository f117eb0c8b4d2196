//! Selection regions and substring search over wrapped line spans (spec
//! §4.E), grounded in the teacher's `selection.rs` (`Selection`,
//! `Shape`) generalized from its two shapes to the four modes spec.md
//! names, plus a sequential/parallel search pair built the way the
//! teacher's own text-buffer iterates wrapped rows.

use rayon::prelude::*;

use crate::page::Page;
use crate::position::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    /// Free-form run of cells, following line wraps (primary mouse drag).
    Text,
    /// Whole lines between anchor and lead.
    Line,
    /// A column-aligned rectangle (DEC block selection).
    Rect,
    /// Snap anchor/lead out to word boundaries.
    Word,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub anchor: Position,
    pub lead: Position,
    pub mode: SelectionMode,
}

impl Selection {
    pub fn new(pos: Position, mode: SelectionMode) -> Self {
        Selection { anchor: pos, lead: pos, mode }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.lead
    }

    fn ordered(&self) -> (Position, Position) {
        if (self.anchor.y, self.anchor.x) <= (self.lead.y, self.lead.x) {
            (self.anchor, self.lead)
        } else {
            (self.lead, self.anchor)
        }
    }

    /// Whether `pos` falls inside the selection, given the page it
    /// selects over (needed for `Text` mode, which must follow wraps).
    pub fn contains(&self, pos: Position, page: &Page) -> bool {
        let (lo, hi) = self.ordered();
        match self.mode {
            SelectionMode::Rect => {
                let (left, right) = if lo.x <= hi.x { (lo.x, hi.x) } else { (hi.x, lo.x) };
                pos.y >= lo.y && pos.y <= hi.y && pos.x >= left && pos.x <= right
            }
            SelectionMode::Line => pos.y >= lo.y && pos.y <= hi.y,
            SelectionMode::Text | SelectionMode::Word => {
                if pos.y < lo.y || pos.y > hi.y {
                    return false;
                }
                if pos.y == lo.y && pos.x < lo.x {
                    return false;
                }
                if pos.y == hi.y && pos.x > hi.x {
                    return false;
                }
                let _ = page;
                true
            }
        }
    }

    /// Expand a `Word` selection's anchor/lead out to the nearest word
    /// boundaries on their respective lines.
    pub fn snap_to_words(&mut self, page: &Page) {
        if self.mode != SelectionMode::Word {
            return;
        }
        self.anchor = snap_word_boundary(page, self.anchor, false);
        self.lead = snap_word_boundary(page, self.lead, true);
    }

    /// Extract the selected text, one paragraph per display line,
    /// collapsing soft wraps so a paragraph that wrapped across rows
    /// comes back as a single joined string.
    pub fn extract_text(&self, page: &Page) -> String {
        let (lo, hi) = self.ordered();
        let mut out = String::new();
        for row in lo.y..=hi.y {
            let Some(line) = page.line(row) else { continue };
            let (from, to) = match self.mode {
                SelectionMode::Rect => {
                    let (l, r) = if lo.x <= hi.x { (lo.x, hi.x) } else { (hi.x, lo.x) };
                    (l, r)
                }
                SelectionMode::Line => (1, line.len()),
                SelectionMode::Text | SelectionMode::Word => {
                    let from = if row == lo.y { lo.x } else { 1 };
                    let to = if row == hi.y { hi.x } else { line.len() };
                    (from, to)
                }
            };
            for col in from..=to {
                if let Some(cell) = line.cell(col) {
                    if cell.is_wide_continuation() {
                        continue;
                    }
                    out.push_str(&cell.grapheme());
                }
            }
            let hard_newline = !line.wrapped || row == hi.y;
            let collapses_wrap = matches!(self.mode, SelectionMode::Text | SelectionMode::Word);
            if row != hi.y && (!collapses_wrap || hard_newline) {
                out.push('\n');
            }
        }
        out
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

fn cell_char(page: &Page, row: i32, col: i32) -> char {
    page.line(row).and_then(|line| line.cell(col)).map(|cell| cell.ch).unwrap_or(' ')
}

/// A word run follows soft wraps: stepping past the last column of a
/// line whose `wrapped` flag is set continues onto the next line's
/// first column (and the mirror going backward), so a word split across
/// a wrap snaps as one run.
fn snap_word_boundary(page: &Page, pos: Position, forward: bool) -> Position {
    if !is_word_char(cell_char(page, pos.y, pos.x)) {
        return pos;
    }
    let (mut row, mut col) = (pos.y, pos.x);
    loop {
        let Some(line) = page.line(row) else { break };
        if forward {
            if col < line.len() {
                if is_word_char(cell_char(page, row, col + 1)) {
                    col += 1;
                    continue;
                }
                break;
            }
            if !line.wrapped || page.line(row + 1).is_none() {
                break;
            }
            if is_word_char(cell_char(page, row + 1, 1)) {
                row += 1;
                col = 1;
                continue;
            }
            break;
        } else {
            if col > 1 {
                if is_word_char(cell_char(page, row, col - 1)) {
                    col -= 1;
                    continue;
                }
                break;
            }
            let Some(prev) = page.line(row - 1) else { break };
            if !prev.wrapped {
                break;
            }
            if is_word_char(cell_char(page, row - 1, prev.len())) {
                row -= 1;
                col = prev.len();
                continue;
            }
            break;
        }
    }
    Position::new(col, row)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    /// Row the match starts on.
    pub row: i64,
    pub start_col: i32,
    /// Row the match ends on; equal to `row` unless the match straddles
    /// a soft wrap.
    pub end_row: i64,
    pub end_col: i32,
}

/// A wrapped run of rows joined into one search span: every row but the
/// last has `wrapped == true`, so a needle can straddle the row break.
fn blocks(page: &Page) -> Vec<Vec<i64>> {
    let total = page.total_lines();
    let mut out = Vec::new();
    let mut current = Vec::new();
    for row in 0..total {
        let wrapped = page.line_span(row).wrapped;
        current.push(row);
        if !wrapped {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Search every line (scrollback and visible) for `needle`, sequentially;
/// a needle spanning a soft wrap is found too, reporting the block it
/// occurs in.
pub fn search_sequential(page: &Page, needle: &str, case_sensitive: bool) -> Vec<SearchMatch> {
    if needle.is_empty() {
        return Vec::new();
    }
    blocks(page).into_iter().flat_map(|rows| search_block(page, &rows, needle, case_sensitive)).collect()
}

/// The same search, fanned out across blocks with rayon. Matches are
/// returned in row order; within a matching block, left-to-right.
pub fn search_parallel(page: &Page, needle: &str, case_sensitive: bool) -> Vec<SearchMatch> {
    if needle.is_empty() {
        return Vec::new();
    }
    let blocks = blocks(page);
    let mut all: Vec<(i64, Vec<SearchMatch>)> = blocks
        .into_par_iter()
        .map(|rows| (rows[0], search_block(page, &rows, needle, case_sensitive)))
        .collect();
    all.sort_by_key(|(row, _)| *row);
    all.into_iter().flat_map(|(_, m)| m).collect()
}

fn search_block(page: &Page, rows: &[i64], needle: &str, case_sensitive: bool) -> Vec<SearchMatch> {
    let mut positions: Vec<(i64, i32)> = Vec::new();
    let mut hay = String::new();
    for &row in rows {
        let line = page.line_span(row);
        for (i, ch) in line.text().chars().enumerate() {
            positions.push((row, i as i32 + 1));
            hay.push(ch);
        }
    }

    let (hay, pat) = if case_sensitive { (hay, needle.to_string()) } else { (hay.to_lowercase(), needle.to_lowercase()) };
    let hay: Vec<char> = hay.chars().collect();
    let pat: Vec<char> = pat.chars().collect();
    if pat.is_empty() || pat.len() > hay.len() || hay.len() != positions.len() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    let mut i = 0;
    while i + pat.len() <= hay.len() {
        if hay[i..i + pat.len()] == pat[..] {
            let (row, start_col) = positions[i];
            let (end_row, end_col) = positions[i + pat.len() - 1];
            matches.push(SearchMatch { row, start_col, end_row, end_col });
            i += pat.len().max(1);
        } else {
            i += 1;
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Size;
    use pretty_assertions::assert_eq;

    #[test]
    fn rect_selection_extracts_column_aligned_block() {
        let mut page = Page::new(Size::new(10, 3));
        for (row, text) in [(1, "abcdefgh"), (2, "12345678")] {
            let line = page.line_mut(row).unwrap();
            for (i, ch) in text.chars().enumerate() {
                line.cell_mut(i as i32 + 1).unwrap().ch = ch;
            }
        }
        let sel = Selection { anchor: Position::new(2, 1), lead: Position::new(4, 2), mode: SelectionMode::Rect };
        assert_eq!(sel.extract_text(&page), "bcd\n234");
    }

    #[test]
    fn line_mode_ignores_column_and_spans_full_rows() {
        let mut page = Page::new(Size::new(5, 2));
        page.line_mut(1).unwrap().cell_mut(1).unwrap().ch = 'x';
        let sel = Selection { anchor: Position::new(5, 1), lead: Position::new(1, 1), mode: SelectionMode::Line };
        assert_eq!(sel.extract_text(&page), "x    ");
    }

    #[test]
    fn search_block_reports_match_straddling_wrap() {
        let mut page = Page::new(Size::new(4, 2));
        page.line_mut(1).unwrap().wrapped = true;
        for (row, text) in [(1, "abcd"), (2, "efgh")] {
            let line = page.line_mut(row).unwrap();
            for (i, ch) in text.chars().enumerate() {
                line.cell_mut(i as i32 + 1).unwrap().ch = ch;
            }
        }
        let hits = search_sequential(&page, "defg", true);
        assert_eq!(hits, vec![SearchMatch { row: 1, start_col: 4, end_row: 2, end_col: 3 }]);
    }

    #[test]
    fn search_is_case_insensitive_by_request() {
        let mut page = Page::new(Size::new(10, 1));
        let line = page.line_mut(1).unwrap();
        for (i, ch) in "Hello".chars().enumerate() {
            line.cell_mut(i as i32 + 1).unwrap().ch = ch;
        }
        assert!(search_sequential(&page, "hello", false).len() == 1);
        assert!(search_sequential(&page, "hello", true).is_empty());
    }
}
