//! Persisted palette/caret configuration (spec §6), serialized to the
//! flat `Ink`/`Paper`/`Color_0`.. key shape the original implementation
//! persists, adapted from the teacher's `Options::load_options`/`save`
//! pattern in `data/options.rs` (there serialized as TOML; here kept as
//! JSON to match the field names callers already expect on disk).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::{default_palette_256, Color};
use crate::cursor::CaretShape;
use crate::error::Result;

fn color_to_rgb(c: Color) -> (u8, u8, u8) {
    match c {
        Color::Default => (0, 0, 0),
        Color::Indexed(i) => default_palette_256()[i as usize],
        Color::Rgb(r, g, b) => (r, g, b),
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RgbTriple(pub u8, pub u8, pub u8);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TerminalConfig {
    #[serde(rename = "Ink")]
    pub ink: RgbTriple,
    #[serde(rename = "Paper")]
    pub paper: RgbTriple,
    #[serde(rename = "SelectionInk")]
    pub selection_ink: RgbTriple,
    #[serde(rename = "SelectionPaper")]
    pub selection_paper: RgbTriple,
    #[serde(rename = "AnnotationUnderline")]
    pub annotation_underline: bool,
    #[serde(rename = "CaretShape")]
    pub caret_shape: CaretShapeConfig,
    #[serde(rename = "CaretBlink", default = "default_caret_blink")]
    pub caret_blink: bool,
    #[serde(rename = "HistorySize", default = "default_historysize")]
    pub historysize: usize,
    #[serde(rename = "TabSize", default = "default_tabsize")]
    pub tabsize: usize,
    #[serde(rename = "AmbiguousCellWidth", default)]
    pub ambiguouscellwidth: bool,
    #[serde(flatten)]
    pub palette: Palette256,
}

fn default_caret_blink() -> bool {
    true
}

fn default_historysize() -> usize {
    crate::page::DEFAULT_HISTORY_SIZE
}

fn default_tabsize() -> usize {
    8
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CaretShapeConfig {
    Block,
    Underline,
    Bar,
}

impl From<CaretShape> for CaretShapeConfig {
    fn from(s: CaretShape) -> Self {
        match s {
            CaretShape::Block => CaretShapeConfig::Block,
            CaretShape::Underline => CaretShapeConfig::Underline,
            CaretShape::Bar => CaretShapeConfig::Bar,
        }
    }
}

impl From<CaretShapeConfig> for CaretShape {
    fn from(s: CaretShapeConfig) -> Self {
        match s {
            CaretShapeConfig::Block => CaretShape::Block,
            CaretShapeConfig::Underline => CaretShape::Underline,
            CaretShapeConfig::Bar => CaretShape::Bar,
        }
    }
}

/// The 256-entry palette, flattened to `Color_0`..`Color_255` keys so
/// the on-disk shape matches what other VT-family implementations write.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette256(pub [RgbTriple; 256]);

impl Serialize for Palette256 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(256))?;
        for (i, c) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("Color_{i}"), c)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Palette256 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map: std::collections::HashMap<String, RgbTriple> = Deserialize::deserialize(deserializer)?;
        let defaults = default_palette_256();
        let mut out = [RgbTriple(0, 0, 0); 256];
        for (i, slot) in out.iter_mut().enumerate() {
            let d = defaults[i];
            *slot = map.get(&format!("Color_{i}")).copied().unwrap_or(RgbTriple(d.0, d.1, d.2));
        }
        Ok(Palette256(out))
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        let (ir, ig, ib) = color_to_rgb(Color::Indexed(7));
        let (pr, pg, pb) = color_to_rgb(Color::Indexed(0));
        let defaults = default_palette_256();
        TerminalConfig {
            ink: RgbTriple(ir, ig, ib),
            paper: RgbTriple(pr, pg, pb),
            selection_ink: RgbTriple(pr, pg, pb),
            selection_paper: RgbTriple(ir, ig, ib),
            annotation_underline: true,
            caret_shape: CaretShapeConfig::Block,
            caret_blink: default_caret_blink(),
            historysize: default_historysize(),
            tabsize: default_tabsize(),
            ambiguouscellwidth: false,
            palette: Palette256(defaults.map(|(r, g, b)| RgbTriple(r, g, b))),
        }
    }
}

impl TerminalConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(crate::error::VtError::ConfigIo)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json).map_err(crate::error::VtError::ConfigIo)?;
        Ok(())
    }

    /// Push every persisted setting onto a live dispatcher: ink/paper,
    /// selection colors, the 256-entry palette, caret style/blink,
    /// history/tab sizing, and the ambiguous-width policy.
    pub fn apply_to(&self, d: &mut crate::dispatch::Dispatcher) {
        d.page.cellattrs.ink = Color::Rgb(self.ink.0, self.ink.1, self.ink.2);
        d.page.cellattrs.paper = Color::Rgb(self.paper.0, self.paper.1, self.paper.2);
        d.selection_ink = (self.selection_ink.0, self.selection_ink.1, self.selection_ink.2);
        d.selection_paper = (self.selection_paper.0, self.selection_paper.1, self.selection_paper.2);
        d.page.ambiguouscellwidth = self.ambiguouscellwidth;
        d.page.set_history_size(self.historysize);
        d.page.set_tab_size(self.tabsize);
        d.page.cursor.shape = self.caret_shape.into();
        d.page.cursor.blinking = self.caret_blink;
        for (i, c) in self.palette.0.iter().enumerate() {
            d.palette[i] = (c.0, c.1, c.2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let cfg = TerminalConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"Ink\""));
        assert!(json.contains("\"Color_255\""));
        assert!(json.contains("\"HistorySize\""));
        assert!(json.contains("\"TabSize\""));
        let back: TerminalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_added_fields_fall_back_to_defaults() {
        // Old on-disk configs predating historysize/tabsize/etc. must
        // still deserialize.
        let mut cfg = TerminalConfig::default();
        let mut json: serde_json::Value = serde_json::to_value(&cfg).unwrap();
        let obj = json.as_object_mut().unwrap();
        obj.remove("HistorySize");
        obj.remove("TabSize");
        obj.remove("AmbiguousCellWidth");
        obj.remove("CaretBlink");
        let back: TerminalConfig = serde_json::from_value(json).unwrap();
        cfg.historysize = default_historysize();
        cfg.tabsize = default_tabsize();
        cfg.ambiguouscellwidth = false;
        cfg.caret_blink = default_caret_blink();
        assert_eq!(back, cfg);
    }

    #[test]
    fn apply_to_pushes_settings_onto_dispatcher() {
        use crate::dispatch::Dispatcher;
        use crate::position::Size;

        let mut cfg = TerminalConfig::default();
        cfg.tabsize = 4;
        cfg.historysize = 500;
        cfg.ambiguouscellwidth = true;
        cfg.ink = RgbTriple(1, 2, 3);

        let mut d = Dispatcher::new(Size::new(80, 24));
        cfg.apply_to(&mut d);

        assert_eq!(d.page.cellattrs.ink, Color::Rgb(1, 2, 3));
        assert!(d.page.ambiguouscellwidth);
        assert_eq!(d.page.next_tab(1, 1), 5);
    }
}
