//! Mouse event -> escape sequence encoding (spec §4.C), generalized from
//! the teacher's `mouse_handling.rs` (`MouseEvent::generate_mouse_report`)
//! to also cover the SGR, SGR-pixel, and UTF-8 coordinate forms the
//! teacher left commented out as future work.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    Button6,
    Button7,
    Button8,
    Button9,
    Button10,
    Button11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventType {
    Press,
    Release,
    Motion,
    FocusIn,
    FocusOut,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Which wire encoding a mouse report uses, selected by the currently
/// enabled xterm private modes (1000/1002/1003 for tracking level,
/// 1005/1006/1015 for coordinate format).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    Off,
    X10,
    Vt200,
    Vt200Highlight,
    ButtonEvents,
    AnyEvents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateFormat {
    /// `ESC [ M Cb Cx Cy`, bytes offset by 32, coordinates clamped to 223.
    Normal,
    /// `ESC [ < Cb ; Cx ; Cy M/m`, decimal, unbounded.
    Sgr,
    /// Like `Sgr`, but `Cx`/`Cy` are pixel coordinates, not cells.
    SgrPixels,
    /// `ESC [ M Cb`, then `Cx`/`Cy` UTF-8 encoded for values above 95.
    Utf8,
}

#[derive(Debug, Clone, Copy)]
pub struct MouseState {
    pub mode: MouseMode,
    pub format: CoordinateFormat,
    pub focus_events_enabled: bool,
    pub alternate_scroll_enabled: bool,
}

impl Default for MouseState {
    fn default() -> Self {
        MouseState {
            mode: MouseMode::Off,
            format: CoordinateFormat::Normal,
            focus_events_enabled: false,
            alternate_scroll_enabled: false,
        }
    }
}

pub struct MouseEvent {
    pub event_type: MouseEventType,
    /// 1-based cell position.
    pub cell: (i32, i32),
    /// Pixel position, used only by `CoordinateFormat::SgrPixels`.
    pub pixel: (i32, i32),
    pub button: MouseButton,
    pub modifiers: KeyModifiers,
}

fn encode_x10_button(button: MouseButton, modifiers: &KeyModifiers) -> u8 {
    let mut cb = match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        _ => return 3,
    };
    apply_modifiers(&mut cb, modifiers);
    cb
}

fn encode_vt200_button(button: MouseButton, event_type: MouseEventType, modifiers: &KeyModifiers) -> u8 {
    let mut cb = match event_type {
        MouseEventType::Release => 3,
        _ => match button {
            MouseButton::None | MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::WheelUp => 64,
            MouseButton::WheelDown => 65,
            MouseButton::Button6 => 66,
            MouseButton::Button7 => 67,
            MouseButton::Button8 => 128,
            MouseButton::Button9 => 129,
            MouseButton::Button10 => 130,
            MouseButton::Button11 => 131,
        },
    };
    apply_modifiers(&mut cb, modifiers);
    cb
}

fn encode_sgr_button(button: MouseButton, modifiers: &KeyModifiers) -> u8 {
    let mut cb = match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::WheelUp => 64,
        MouseButton::WheelDown => 65,
        _ => 3,
    };
    apply_modifiers(&mut cb, modifiers);
    cb
}

fn apply_modifiers(cb: &mut u8, modifiers: &KeyModifiers) {
    if modifiers.shift {
        *cb |= 4;
    }
    if modifiers.alt || modifiers.meta {
        *cb |= 8;
    }
    if modifiers.ctrl {
        *cb |= 16;
    }
}

fn utf8_mouse_coord(val: i32) -> String {
    if val < 96 {
        char::from_u32((val + 32) as u32).map(String::from).unwrap_or_default()
    } else if val < 2048 {
        let b1 = 0xc0 | ((val >> 6) & 0x1f);
        let b2 = 0x80 | (val & 0x3f);
        String::from_utf8(vec![b1 as u8, b2 as u8]).unwrap_or_default()
    } else {
        char::from(255).to_string()
    }
}

fn focus_event(focused: bool) -> String {
    if focused { "\x1b[I".to_string() } else { "\x1b[O".to_string() }
}

/// Encode `event` according to `state`, or `None` if the current mode
/// suppresses this kind of event entirely.
pub fn generate_mouse_report(event: &MouseEvent, state: &MouseState) -> Option<String> {
    match event.event_type {
        MouseEventType::FocusIn if state.focus_events_enabled => return Some(focus_event(true)),
        MouseEventType::FocusOut if state.focus_events_enabled => return Some(focus_event(false)),
        MouseEventType::FocusIn | MouseEventType::FocusOut => return None,
        _ => {}
    }

    let (x, y) = event.cell;
    if state.alternate_scroll_enabled && event.event_type == MouseEventType::Press && matches!(event.button, MouseButton::WheelUp | MouseButton::WheelDown) {
        return Some(if event.button == MouseButton::WheelUp { "\x1b[A".to_string() } else { "\x1b[B".to_string() });
    }

    if state.mode == MouseMode::Off {
        return None;
    }

    if state.format == CoordinateFormat::Sgr || state.format == CoordinateFormat::SgrPixels {
        let cb = encode_sgr_button(event.button, &event.modifiers) + if event.event_type == MouseEventType::Motion { 32 } else { 0 };
        let (cx, cy) = if state.format == CoordinateFormat::SgrPixels { event.pixel } else { (x, y) };
        let end = if event.event_type == MouseEventType::Release { 'm' } else { 'M' };
        return Some(format!("\x1b[<{cb};{cx};{cy}{end}"));
    }

    if state.mode == MouseMode::X10 {
        if event.event_type != MouseEventType::Press {
            return None;
        }
        let cb = encode_x10_button(event.button, &event.modifiers);
        return Some(format!("\x1b[M{}{}{}", char::from(cb + 32), char::from((x.min(223) + 32) as u8), char::from((y.min(223) + 32) as u8)));
    }

    let mut cb = encode_vt200_button(event.button, event.event_type, &event.modifiers);
    if event.event_type == MouseEventType::Motion && matches!(state.mode, MouseMode::ButtonEvents | MouseMode::AnyEvents) {
        cb += 32;
    }

    if state.format == CoordinateFormat::Utf8 {
        let mut s = String::from("\x1b[M");
        s.push_str(&utf8_mouse_coord(cb as i32));
        s.push_str(&utf8_mouse_coord(x));
        s.push_str(&utf8_mouse_coord(y));
        return Some(s);
    }

    Some(format!("\x1b[M{}{}{}", char::from((cb + 32) as u8), char::from((x.min(223) + 32) as u8), char::from((y.min(223) + 32) as u8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vt200_press_report() {
        let state = MouseState { mode: MouseMode::Vt200, ..Default::default() };
        let ev = MouseEvent {
            event_type: MouseEventType::Press,
            cell: (5, 10),
            pixel: (0, 0),
            button: MouseButton::Left,
            modifiers: KeyModifiers::default(),
        };
        assert_eq!(generate_mouse_report(&ev, &state), Some("\x1b[M !+".to_string()));
    }

    #[test]
    fn sgr_release_report() {
        let state = MouseState { mode: MouseMode::ButtonEvents, format: CoordinateFormat::Sgr, ..Default::default() };
        let ev = MouseEvent {
            event_type: MouseEventType::Release,
            cell: (5, 10),
            pixel: (0, 0),
            button: MouseButton::Left,
            modifiers: KeyModifiers::default(),
        };
        assert_eq!(generate_mouse_report(&ev, &state), Some("\x1b[<0;5;10m".to_string()));
    }

    #[test]
    fn off_mode_reports_nothing() {
        let state = MouseState::default();
        let ev = MouseEvent {
            event_type: MouseEventType::Press,
            cell: (1, 1),
            pixel: (0, 0),
            button: MouseButton::Left,
            modifiers: KeyModifiers::default(),
        };
        assert_eq!(generate_mouse_report(&ev, &state), None);
    }
}
