//! Demonstration host loop exercising `vtcore`'s external interfaces: a
//! script of bytes is fed through a `MockPty` as if it had come from a
//! child process, and a plain-text `Renderer` dumps the resulting page
//! to stdout. Not a terminal application in its own right.

use std::io::Read;

use clap::Parser;
use vtcore::pty::{MockPty, PtyChannel};
use vtcore::renderer::{CaretStyle, Renderer};
use vtcore::position::{Position, Size};
use vtcore::cell::Cell;
use vtcore::Terminal;

#[derive(Parser)]
#[command(about = "Feed a byte stream through vtcore and dump the resulting page")]
struct Args {
    /// File containing the byte stream to feed; reads stdin if omitted.
    #[arg(long)]
    input: Option<std::path::PathBuf>,

    #[arg(long, default_value_t = 80)]
    cols: i32,

    #[arg(long, default_value_t = 24)]
    rows: i32,
}

/// Mirrors the page into a `String` per row, ignoring styling.
struct TextDumpRenderer {
    width: usize,
    rows: Vec<Vec<char>>,
    title: String,
}

impl TextDumpRenderer {
    fn new(size: Size) -> Self {
        TextDumpRenderer {
            width: size.cx.max(0) as usize,
            rows: vec![vec![' '; size.cx.max(0) as usize]; size.cy.max(0) as usize],
            title: String::new(),
        }
    }

    fn dump(&self) {
        if !self.title.is_empty() {
            println!("=== {} ===", self.title);
        }
        for line in &self.rows {
            let text: String = line.iter().collect();
            println!("{}", text.trim_end());
        }
    }
}

impl Renderer for TextDumpRenderer {
    fn paint_cell(&mut self, pos: Position, cell: &Cell) {
        let row = (pos.y - 1) as usize;
        let col = (pos.x - 1) as usize;
        if let Some(line) = self.rows.get_mut(row) {
            if col < self.width {
                line[col] = cell.ch;
            }
        }
    }

    fn move_caret(&mut self, _pos: Position, _style: CaretStyle, _visible: bool) {}

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn bell(&mut self) {
        log::info!("bell");
    }
}

fn main() -> vtcore::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut bytes = Vec::new();
    match &args.input {
        Some(path) => {
            std::fs::File::open(path)
                .and_then(|mut f| f.read_to_end(&mut bytes))
                .map_err(vtcore::error::VtError::Spawn)?;
        }
        None => {
            std::io::stdin()
                .read_to_end(&mut bytes)
                .map_err(vtcore::error::VtError::Spawn)?;
        }
    }

    let size = Size::new(args.cols, args.rows);
    let mut term = Terminal::new(size);
    let mut pty = MockPty::new();
    pty.feed_inbound(&bytes);

    term.pump_input(&mut pty)?;
    term.flush_replies(&mut pty)?;

    let mut renderer = TextDumpRenderer::new(size);
    renderer.set_title(&term.dispatcher.title);
    term.paint(&mut renderer);
    renderer.dump();

    if !pty.outbound.is_empty() {
        log::info!("host would have written {} bytes back to the child", pty.outbound.len());
    }

    Ok(())
}
