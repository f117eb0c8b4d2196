//! Ties the byte-stream parser, the sequence dispatcher, a pty channel,
//! and a renderer together into the single entry point a host embeds
//! (spec §4.H "Terminal"), grounded in the teacher's top-level `Buffer`/
//! `BufferParser` pairing in `ansi/mod.rs`.

use crate::dispatch::keys::{encode_key, KeySymbol, Modifiers};
use crate::dispatch::mouse::{generate_mouse_report, MouseEvent};
use crate::dispatch::{Dispatcher, HostEvent};
use crate::error::Result;
use crate::parser::VTInStream;
use crate::position::Size;
use crate::pty::PtyChannel;
use crate::renderer::{CaretStyle, Renderer};

pub struct Terminal {
    instream: VTInStream,
    pub dispatcher: Dispatcher,
}

impl Terminal {
    pub fn new(size: Size) -> Self {
        Terminal {
            instream: VTInStream::new(),
            dispatcher: Dispatcher::new(size),
        }
    }

    /// Switch the input parser between 7-bit (`ESC`-prefixed) and 8-bit
    /// (raw 0x80..0x9f) C1 control recognition, paired with the page's
    /// own legacy-8-bit text mode.
    pub fn set_eight_bit_mode(&mut self, enable: bool) {
        self.instream.set_eight_bit_mode(enable);
    }

    /// Feed bytes read from the pty, mutating the page and queuing any
    /// replies (DA/DSR/DECRQSS) the host should write back.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(seq) = self.instream.feed_byte(byte) {
                self.dispatcher.dispatch(seq);
            }
        }
    }

    /// Read everything currently available from `pty` and feed it in.
    pub fn pump_input(&mut self, pty: &mut dyn PtyChannel) -> Result<usize> {
        let mut buf = [0u8; 4096];
        let mut total = 0;
        loop {
            let n = pty.read_nonblocking(&mut buf)?;
            if n == 0 {
                break;
            }
            self.feed(&buf[..n]);
            total += n;
        }
        Ok(total)
    }

    /// Write any queued replies (device reports, DECRQSS answers, OSC
    /// color query responses) back to the pty.
    pub fn flush_replies(&mut self, pty: &mut dyn PtyChannel) -> Result<()> {
        for reply in self.dispatcher.take_replies() {
            pty.write_all(reply.as_bytes())?;
        }
        Ok(())
    }

    /// Encode a key press per the current DECCKM state and write it
    /// back; an unmodified function key redefined via DECUDK sends its
    /// user-defined string instead of the built-in encoding.
    pub fn send_key(&mut self, pty: &mut dyn PtyChannel, sym: KeySymbol, modifiers: Modifiers, pc_style: bool) -> Result<()> {
        if let KeySymbol::F(n) = sym {
            if modifiers == Modifiers::default() {
                if let Some(bytes) = self.dispatcher.user_defined_key(n) {
                    pty.write_all(bytes)?;
                    return Ok(());
                }
            }
        }
        let encoded = encode_key(
            sym,
            modifiers,
            self.dispatcher.application_cursor_keys,
            pc_style,
            self.dispatcher.meta_sends_escape,
            self.dispatcher.vt52_mode,
        );
        if !encoded.is_empty() {
            pty.write_all(encoded.as_bytes())?;
        }
        Ok(())
    }

    /// Encode a mouse event per the current tracking mode and write it
    /// back, if the mode/event combination produces a report at all.
    pub fn send_mouse(&mut self, pty: &mut dyn PtyChannel, event: &MouseEvent) -> Result<()> {
        if let Some(report) = generate_mouse_report(event, &self.dispatcher.mouse) {
            pty.write_all(report.as_bytes())?;
        }
        Ok(())
    }

    /// Resize the page and the pty; rejected (no effect) below 2x2,
    /// matching how a window smaller than that can't usefully host a
    /// cursor plus a scroll margin.
    pub fn resize(&mut self, size: Size, pty: &mut dyn PtyChannel) -> Result<()> {
        if size.cx < 2 || size.cy < 2 {
            return Err(crate::error::VtError::InvalidSize(size.cx, size.cy));
        }
        self.dispatcher.page.resize(size);
        pty.resize(size.cx as u16, size.cy as u16)?;
        Ok(())
    }

    /// Paint every row invalidated since the last call, update the
    /// window chrome, and ring the bell, through `renderer`.
    pub fn paint(&mut self, renderer: &mut dyn Renderer) {
        let rows = self.dispatcher.page.take_invalid_rows();
        if !rows.is_empty() {
            let first = rows[0];
            let last = *rows.last().unwrap();
            renderer.invalidate_rows(first, last);
            for row in rows {
                if let Some(line) = self.dispatcher.page.line(row) {
                    for (i, cell) in line.cells().iter().enumerate() {
                        let pos = crate::position::Position::new(i as i32 + 1, row);
                        renderer.paint_cell(pos, cell);
                    }
                }
            }
        }

        let cursor = &self.dispatcher.page.cursor;
        let style = if cursor.blinking { CaretStyle::Blinking(cursor.shape) } else { CaretStyle::Steady(cursor.shape) };
        renderer.move_caret(cursor.pos, style, cursor.visible);

        renderer.set_title(&self.dispatcher.title);
        renderer.set_icon_name(&self.dispatcher.icon_name);

        for _ in 0..self.dispatcher.take_bell() {
            renderer.bell();
        }

        for event in self.dispatcher.take_events() {
            match event {
                HostEvent::DirectoryChanged(dir) => renderer.directory_changed(&dir),
                HostEvent::Progress { state, percent } => renderer.progress(state, percent),
                HostEvent::Message(text) => renderer.message(&text),
                HostEvent::BackgroundChanged(r, g, b) => renderer.background_changed(r, g, b),
                HostEvent::Annotation { rect, text } => renderer.annotation(rect, &text),
            }
        }
    }

    pub fn size(&self) -> Size {
        self.dispatcher.page.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pty::MockPty;
    use crate::renderer::NullRenderer;

    #[test]
    fn resize_below_2x2_is_rejected() {
        let mut term = Terminal::new(Size::new(80, 24));
        let mut pty = MockPty::new();
        let err = term.resize(Size::new(1, 1), &mut pty).unwrap_err();
        assert!(matches!(err, crate::error::VtError::InvalidSize(1, 1)));
        assert_eq!(term.size(), Size::new(80, 24));
    }

    #[test]
    fn redefined_function_key_overrides_builtin_encoding() {
        let mut term = Terminal::new(Size::new(80, 24));
        let mut pty = MockPty::new();
        term.feed(b"\x1bP0;1|1/4869\x1b\\");
        term.send_key(&mut pty, KeySymbol::F(1), Modifiers::default(), false).unwrap();
        assert_eq!(pty.outbound, b"Hi");
    }

    #[test]
    fn feed_writes_printable_text_into_page() {
        let mut term = Terminal::new(Size::new(80, 24));
        term.feed(b"hello");
        assert_eq!(term.dispatcher.page.line(1).unwrap().text().trim_end(), "hello");
    }

    #[test]
    fn device_attributes_queues_a_reply() {
        let mut term = Terminal::new(Size::new(80, 24));
        let mut pty = MockPty::new();
        term.feed(b"\x1b[c");
        term.flush_replies(&mut pty).unwrap();
        assert!(!pty.outbound.is_empty());
    }

    #[test]
    fn paint_reports_invalidated_rows_once() {
        let mut term = Terminal::new(Size::new(10, 2));
        let mut renderer = NullRenderer;
        term.feed(b"hi");
        term.paint(&mut renderer);
        assert!(term.dispatcher.page.take_invalid_rows().is_empty());
    }
}
