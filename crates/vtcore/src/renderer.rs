//! The paint-side interface a host implements to draw a `Page` (spec §9
//! DESIGN NOTES: "callback hooks become a trait object"), shaped after
//! the teacher's `BufferParser` trait of mostly-default no-op methods.

use crate::cell::Cell;
use crate::cursor::CaretShape;
use crate::position::{Position, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretStyle {
    Steady(CaretShape),
    Blinking(CaretShape),
}

/// A host-supplied sink for terminal output. Every method has a no-op
/// default so a host only overrides what it actually draws.
pub trait Renderer {
    /// One or more rows changed and should be redrawn; `rows` is
    /// `[top, bottom]` inclusive, 1-based.
    fn invalidate_rows(&mut self, _top: i32, _bottom: i32) {}

    fn paint_cell(&mut self, _pos: Position, _cell: &Cell) {}

    fn move_caret(&mut self, _pos: Position, _style: CaretStyle, _visible: bool) {}

    fn set_title(&mut self, _title: &str) {}

    fn set_icon_name(&mut self, _name: &str) {}

    fn bell(&mut self) {}

    /// The host's clipboard should be set to `text` (OSC 52).
    fn set_clipboard(&mut self, _selection: char, _text: &str) {}

    /// A hyperlink (OSC 8) region was drawn at `rect`; hosts that support
    /// click-to-open can record the URI for hit testing.
    fn hyperlink_region(&mut self, _rect: Rect, _uri: &str) {}

    /// An inline image was placed at `rect`; `image_id` keys into
    /// `vtcore::objects::image_cache`.
    fn image_region(&mut self, _rect: Rect, _image_id: u32) {}

    fn resized(&mut self, _cx: i32, _cy: i32) {}

    /// OSC 7: the child process's working directory changed.
    fn directory_changed(&mut self, _dir: &str) {}

    /// ConEmu `OSC 9;4`: a progress indicator for the taskbar/dock.
    fn progress(&mut self, _state: u8, _percent: u8) {}

    /// ConEmu `OSC 9`: a plain notification message.
    fn message(&mut self, _text: &str) {}

    /// OSC 11-style background color change outside the default-color
    /// slot (e.g. a per-tab background set by the child).
    fn background_changed(&mut self, _r: u8, _g: u8, _b: u8) {}

    /// OSC 8100: an annotation region was closed at `rect`.
    fn annotation(&mut self, _rect: Rect, _text: &str) {}
}

/// A `Renderer` that does nothing; useful for headless parsing/tests
/// where only the resulting `Page` state matters.
#[derive(Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}
