//! End-to-end scenarios and cross-module invariants, driven entirely
//! through `Terminal`/`Dispatcher` public entry points the way a real
//! host would feed bytes in and read state back out.

use pretty_assertions::assert_eq;
use vtcore::dispatch::mouse::{KeyModifiers, MouseButton, MouseEvent, MouseEventType};
use vtcore::position::{Position, Size};
use vtcore::pty::MockPty;
use vtcore::selection::{Selection, SelectionMode};
use vtcore::Terminal;

fn feed(term: &mut Terminal, s: &str) {
    term.feed(s.as_bytes());
}

/// S1: cursor & erase.
#[test]
fn cursor_and_erase() {
    let mut term = Terminal::new(Size::new(80, 24));
    feed(&mut term, "\x1b[2J\x1b[Hhello");

    let line0 = term.dispatcher.page.line(1).unwrap();
    assert_eq!(line0.text().trim_end(), "hello");
    assert_eq!(line0.cell(1).unwrap().ch, 'h');
    assert_eq!(line0.cell(6).unwrap().ch, ' ');
    assert_eq!(term.dispatcher.page.cursor.pos, Position::new(6, 1));

    for row in 2..=24 {
        let line = term.dispatcher.page.line(row).unwrap();
        assert_eq!(line.text().trim_end(), "");
    }
}

/// S2: scroll region.
#[test]
fn scroll_region_shifts_inside_margins_only() {
    let mut term = Terminal::new(Size::new(80, 24));
    feed(&mut term, "\x1b[2J\x1b[H");
    for row in 1..=24 {
        feed(&mut term, &format!("row{row:02}"));
        if row < 24 {
            feed(&mut term, "\r\n");
        }
    }

    feed(&mut term, "\x1b[5;10r\x1b[10;1H\n");

    // Rows 5..9 take on their successor's content, row 10 (the bottom
    // of the region) goes blank; the scrolled-out "row05" is gone.
    let page = &term.dispatcher.page;
    assert_eq!(page.line(5).unwrap().text().trim_end(), "row06");
    assert_eq!(page.line(8).unwrap().text().trim_end(), "row09");
    assert_eq!(page.line(9).unwrap().text().trim_end(), "row10");
    assert_eq!(page.line(10).unwrap().text().trim_end(), "");
    // Outside the scroll region, row 4 and row 11 are untouched.
    assert_eq!(page.line(4).unwrap().text().trim_end(), "row04");
    assert_eq!(page.line(11).unwrap().text().trim_end(), "row11");
    assert_eq!(page.cursor.pos.y, 10);
}

/// S3: SGR extended (colon-separated truecolor form).
#[test]
fn sgr_extended_colon_truecolor() {
    let mut term = Terminal::new(Size::new(80, 24));
    feed(&mut term, "\x1b[38:2::10:20:30mX");

    let cell = term.dispatcher.page.line(1).unwrap().cell(1).unwrap();
    assert_eq!(cell.ch, 'X');
    assert_eq!(cell.ink, vtcore::color::Color::Rgb(10, 20, 30));
}

/// S4: DECOM clamps absolute cursor addressing to inside the margins.
#[test]
fn decom_clamps_cursor_into_margins() {
    let mut term = Terminal::new(Size::new(80, 24));
    feed(&mut term, "\x1b[5;10r\x1b[?6h\x1b[1;1H");

    assert_eq!(term.dispatcher.page.cursor.pos, Position::new(1, 5));
}

/// S5: soft wrap marks the wrapped row and a word selection spanning
/// the wrap point yields the whole unwrapped word.
#[test]
fn soft_wrap_marks_line_and_word_select_spans_it() {
    let mut term = Terminal::new(Size::new(4, 24));
    feed(&mut term, "abcdefgh");

    let page = &term.dispatcher.page;
    assert!(page.line(1).unwrap().wrapped);
    assert_eq!(page.line(1).unwrap().text(), "abcd");
    assert_eq!(page.line(2).unwrap().text().trim_end(), "efgh");

    let mut sel = Selection::new(Position::new(2, 1), SelectionMode::Word);
    sel.lead = Position::new(2, 1);
    sel.snap_to_words(page);
    assert_eq!(sel.extract_text(page), "abcdefgh");
}

/// S6: mouse SGR encoding for a left-button press.
#[test]
fn mouse_sgr_report_for_button_press() {
    let mut term = Terminal::new(Size::new(80, 24));
    let mut pty = MockPty::new();
    feed(&mut term, "\x1b[?1000h\x1b[?1006h");

    let event = MouseEvent {
        event_type: MouseEventType::Press,
        cell: (5, 7),
        pixel: (0, 0),
        button: MouseButton::Left,
        modifiers: KeyModifiers::default(),
    };
    term.send_mouse(&mut pty, &event).unwrap();
    assert_eq!(pty.outbound, b"\x1b[<0;5;7M");
}

/// Invariant 1: cursor position always stays inside the page bounds,
/// even when motion sequences try to push it past either edge.
#[test]
fn cursor_stays_within_page_bounds() {
    let mut term = Terminal::new(Size::new(10, 5));
    feed(&mut term, "\x1b[999;999H");
    let pos = term.dispatcher.page.cursor.pos;
    assert!((1..=10).contains(&pos.x));
    assert!((1..=5).contains(&pos.y));

    feed(&mut term, "\x1b[0;0H");
    let pos = term.dispatcher.page.cursor.pos;
    assert!((1..=10).contains(&pos.x));
    assert!((1..=5).contains(&pos.y));
}

/// Invariant 2: every line always reports the page width.
#[test]
fn every_line_matches_page_width() {
    let mut term = Terminal::new(Size::new(10, 5));
    feed(&mut term, "hi\r\nthere");
    for row in 1..=5 {
        assert_eq!(term.dispatcher.page.line(row).unwrap().len(), 10);
    }
}

/// Invariant 4: RIS resets cursor, margins, SGR, and tab stops to
/// their power-on defaults.
#[test]
fn full_reset_restores_power_on_state() {
    let mut term = Terminal::new(Size::new(80, 24));
    feed(&mut term, "\x1b[31;1m\x1b[5;10r\x1b[3;3H\x1b[3g");

    feed(&mut term, "\x1bc");

    let page = &term.dispatcher.page;
    assert_eq!(page.cursor.pos, Position::new(1, 1));
    assert_eq!(page.margins, vtcore::position::Rect::full(page.size()));
    assert!(page.cellattrs.sgr.is_empty());
    assert_eq!(page.cellattrs.ink, vtcore::color::Color::Default);
    assert_eq!(page.next_tab(1, 1), 9);
}

/// Invariant 5: DECSC followed by DECRC restores cursor position,
/// attributes, and origin mode.
#[test]
fn decsc_decrc_round_trip() {
    let mut term = Terminal::new(Size::new(80, 24));
    feed(&mut term, "\x1b[10;20H\x1b[31m\x1b7");
    feed(&mut term, "\x1b[1;1H\x1b[0m");
    feed(&mut term, "\x1b8");

    let page = &term.dispatcher.page;
    assert_eq!(page.cursor.pos, Position::new(20, 10));
    assert_eq!(page.cellattrs.ink, vtcore::color::Color::Indexed(1));
}

/// Invariant 8: a resize cycle back to the original size with no
/// intervening writes preserves every cell.
#[test]
fn resize_cycle_preserves_cells() {
    let mut term = Terminal::new(Size::new(80, 24));
    let mut pty = MockPty::new();
    feed(&mut term, "\x1b[2J\x1b[Hhello world");

    let before: Vec<char> = term.dispatcher.page.line(1).unwrap().cells().iter().map(|c| c.ch).collect();

    term.resize(Size::new(40, 12), &mut pty).unwrap();
    term.resize(Size::new(80, 24), &mut pty).unwrap();

    let after: Vec<char> = term.dispatcher.page.line(1).unwrap().cells().iter().map(|c| c.ch).collect();
    assert_eq!(before, after);
}

/// Invariant 9: search finds a needle that straddles a wrapped line
/// boundary and reports the block it occurs in.
#[test]
fn search_finds_needle_across_wrap() {
    let mut term = Terminal::new(Size::new(4, 24));
    feed(&mut term, "abcdefgh");

    let hits = vtcore::selection::search_sequential(&term.dispatcher.page, "cdef", true);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].row, 1);
}
