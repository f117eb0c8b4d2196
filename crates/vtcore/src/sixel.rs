//! SIXEL raster decoding, adapted from the teacher's own sixel parser
//! (`original icy_engine::sixel_mod::SixelParser`); the only published
//! `icy_sixel` crate in the teacher's workspace encodes images *to*
//! sixel for its GUI frontends and has no decoder to delegate to, so
//! this module keeps the teacher's hand-rolled state machine instead.

use crate::error::{Result, VtError};
use crate::objects::{fold_hash, image_cache, ImageTile};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Read,
    ReadColor,
    ReadSize,
    Repeat,
}

#[derive(Clone, Copy, Debug, Default)]
struct Rgb(u8, u8, u8);

struct Parser {
    state: State,
    palette: Vec<Rgb>,
    current_color: u32,
    cursor_x: i32,
    cursor_y: i32,
    numbers: Vec<i32>,
    rows: Vec<Vec<u8>>,
    height_fixed: bool,
}

impl Default for Parser {
    fn default() -> Self {
        let mut palette = vec![Rgb(0, 0, 0); 256];
        // xterm's default sixel palette: 16-entry ANSI seed is reasonable
        // for senders that never emit `#n;2;r;g;b` before drawing.
        for (i, c) in crate::color::DEFAULT_ANSI_16.iter().enumerate() {
            palette[i] = Rgb(c.0, c.1, c.2);
        }
        Parser {
            state: State::Read,
            palette,
            current_color: 0,
            cursor_x: 0,
            cursor_y: 0,
            numbers: Vec::new(),
            rows: Vec::new(),
            height_fixed: false,
        }
    }
}

impl Parser {
    fn width(&self) -> usize {
        self.rows.first().map(|r| r.len() / 4).unwrap_or(0)
    }

    fn height(&self) -> usize {
        self.rows.len()
    }

    fn push_digit(&mut self, ch: char) {
        let d = self.numbers.pop().unwrap_or(0);
        self.numbers.push(d * 10 + ch.to_digit(10).unwrap_or(0) as i32);
    }

    fn feed(&mut self, ch: char) -> Result<()> {
        match self.state {
            State::Read => self.data(ch),
            State::ReadColor => {
                if ch.is_ascii_digit() {
                    self.push_digit(ch);
                    Ok(())
                } else if ch == ';' {
                    self.numbers.push(0);
                    Ok(())
                } else {
                    if let Some(&c) = self.numbers.first() {
                        self.current_color = c as u32;
                    }
                    if self.numbers.len() > 1 {
                        if self.numbers.len() != 5 || self.numbers[1] != 2 {
                            return Err(VtError::Sixel("unsupported sixel color format".into()));
                        }
                        let idx = (self.current_color as usize) % self.palette.len();
                        self.palette[idx] = Rgb(
                            (self.numbers[2] * 255 / 100) as u8,
                            (self.numbers[3] * 255 / 100) as u8,
                            (self.numbers[4] * 255 / 100) as u8,
                        );
                    }
                    self.state = State::Read;
                    self.data(ch)
                }
            }
            State::ReadSize => {
                if ch.is_ascii_digit() {
                    self.push_digit(ch);
                    Ok(())
                } else if ch == ';' {
                    self.numbers.push(0);
                    Ok(())
                } else {
                    if self.numbers.len() >= 4 {
                        let height = self.numbers[3];
                        let width = self.numbers[2];
                        if height > 0 && width > 0 {
                            self.rows.resize(height as usize, vec![0u8; 4 * width as usize]);
                            self.height_fixed = true;
                        }
                    }
                    self.state = State::Read;
                    self.data(ch)
                }
            }
            State::Repeat => {
                if ch.is_ascii_digit() {
                    self.push_digit(ch);
                    Ok(())
                } else {
                    let count = self.numbers.first().copied().unwrap_or(1).max(0);
                    self.state = State::Read;
                    for _ in 0..count {
                        self.data(ch)?;
                    }
                    Ok(())
                }
            }
        }
    }

    fn data(&mut self, ch: char) -> Result<()> {
        match ch {
            '#' => {
                self.numbers.clear();
                self.state = State::ReadColor;
            }
            '!' => {
                self.numbers.clear();
                self.state = State::Repeat;
            }
            '-' => {
                self.cursor_x = 0;
                self.cursor_y += 1;
            }
            '$' => {
                self.cursor_x = 0;
            }
            '"' => {
                self.numbers.clear();
                self.state = State::ReadSize;
            }
            _ if ch > '\x7f' => {}
            _ => self.plot(ch)?,
        }
        Ok(())
    }

    fn plot(&mut self, ch: char) -> Result<()> {
        if ch < '?' {
            return Err(VtError::Sixel(format!("byte {ch:?} out of range for sixel data")));
        }
        let mask = ch as u8 - b'?';
        let color = self.palette[(self.current_color as usize) % self.palette.len()];
        let x = self.cursor_x;
        let y0 = self.cursor_y * 6;
        let mut last_row = y0 + 6;
        if self.height_fixed && last_row > self.height() as i32 {
            last_row = self.height() as i32;
        }
        if (self.rows.len() as i32) < last_row {
            let w = self.width().max(1);
            self.rows.resize(last_row.max(0) as usize, vec![0u8; 4 * w]);
        }
        for bit in 0..6 {
            if mask & (1 << bit) == 0 {
                continue;
            }
            let row = y0 + bit;
            if row >= last_row || row < 0 {
                continue;
            }
            let line = &mut self.rows[row as usize];
            let offset = x as usize * 4;
            if line.len() <= offset + 3 {
                line.resize(offset + 4, 0);
            }
            line[offset] = color.0;
            line[offset + 1] = color.1;
            line[offset + 2] = color.2;
            line[offset + 3] = 0xff;
        }
        self.cursor_x += 1;
        Ok(())
    }
}

/// Decode a DCS sixel data string into an RGBA raster and register it in
/// the shared image cache, returning the cache key to store in a cell's
/// `data` field.
pub fn decode_and_cache(data: &str) -> Result<u32> {
    let mut parser = Parser::default();
    for ch in data.chars() {
        parser.feed(ch)?;
    }
    parser.feed('#')?;
    let width = parser.width();
    let height = parser.height();
    let mut rgba = Vec::with_capacity(width * height * 4);
    for row in &parser.rows {
        rgba.extend_from_slice(row);
        rgba.resize(rgba.len() + width.saturating_sub(row.len() / 4) * 4, 0);
    }
    let key = fold_hash(&rgba);
    image_cache().insert(
        key,
        ImageTile {
            width: width as u32,
            height: height as u32,
            rgba: Arc::from(rgba.into_boxed_slice()),
        },
    );
    Ok(key)
}
