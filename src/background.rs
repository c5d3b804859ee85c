// Selectable backgrounds and the registry the picker is built from.
//
// A background is a named pair of hooks: `setup` runs once when it's selected and
// may fill the side panel (`ExtraControls`) with its own inputs; `draw` runs on
// every redraw and may hand back an `Overlay` that the compositor runs after the
// user image, for decorations that must sit on top of it.

use crate::error::{Error, Result};
use crate::types::FrameBuffer;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Runs once, after the user image has been drawn.
pub type Overlay<'a> = Box<dyn FnOnce(&mut FrameBuffer) -> Result<()> + 'a>;

pub trait Background {
    /// Stable identifier (used by the CLI and config).
    fn id(&self) -> &str;

    /// Pretty name shown in the picker.
    fn name(&self) -> &str;

    /// Called once when this background becomes the selected one.
    fn setup(&mut self, controls: &mut ExtraControls) {
        controls.reset();
    }

    /// Paint the background. Anything returned runs on top of the user image.
    fn draw<'a>(&'a self, canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>>;

    /// Feed a file into a background that takes one (a picture, a script).
    /// `Ok(false)` means this background has no use for a file.
    fn load_source(&mut self, _path: &Path) -> Result<bool> {
        Ok(false)
    }
}

/// One entry in the side panel.
#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    /// A file picker and whatever it currently points at.
    File { label: String, path: Option<PathBuf> },
    /// Plain text (e.g. warnings).
    Note(String),
}

/// The side panel of extra controls a background can populate in `setup`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtraControls {
    controls: Vec<Control>,
}

impl ExtraControls {
    pub fn reset(&mut self) {
        self.controls.clear();
    }

    pub fn push(&mut self, control: Control) {
        self.controls.push(control);
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Control> {
        self.controls.iter()
    }

    /// One display line per control, for the HUD.
    pub fn lines(&self) -> Vec<String> {
        self.controls
            .iter()
            .map(|c| match c {
                Control::File { label, path: Some(p) } => {
                    let name = p.file_name().map(|n| n.to_string_lossy().into_owned());
                    format!("{label}: {}", name.unwrap_or_else(|| p.display().to_string()))
                }
                Control::File { label, path: None } => format!("{label}: (none)"),
                Control::Note(text) => text.clone(),
            })
            .collect()
    }
}

/// Every background the picker offers, in the order it offers them.
#[derive(Default)]
pub struct BackgroundRegistry {
    entries: IndexMap<String, Box<dyn Background>>,
}

impl BackgroundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, background: Box<dyn Background>) -> Result<()> {
        let id = background.id().to_string();
        if self.entries.contains_key(&id) {
            return Err(Error::DuplicateBackground(id));
        }
        self.entries.insert(id, background);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Background> {
        self.entries.get(id).map(|b| b.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn Background + 'static)> {
        self.entries.get_mut(id).map(|b| b.as_mut())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Background> {
        self.entries.values().map(|b| b.as_ref())
    }

    /// Position in picker order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.get_index_of(id)
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.entries.get_index(index).map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain(&'static str);

    impl Background for Plain {
        fn id(&self) -> &str { self.0 }
        fn name(&self) -> &str { "Plain" }
        fn draw<'a>(&'a self, _canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>> {
            Ok(None)
        }
    }

    #[test]
    fn registry_keeps_order_and_rejects_duplicates() {
        let mut reg = BackgroundRegistry::new();
        reg.register(Box::new(Plain("b"))).unwrap();
        reg.register(Box::new(Plain("a"))).unwrap();
        assert!(matches!(reg.register(Box::new(Plain("b"))), Err(Error::DuplicateBackground(id)) if id == "b"));

        assert_eq!(reg.ids().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(reg.index_of("a"), Some(1));
        assert_eq!(reg.id_at(0), Some("b"));
        assert!(reg.get("zzz").is_none());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn default_setup_clears_the_panel_and_sources_are_refused() {
        let mut controls = ExtraControls::default();
        controls.push(Control::Note("left over".into()));
        let mut plain = Plain("p");
        plain.setup(&mut controls);
        assert!(controls.is_empty());
        assert!(!plain.load_source(Path::new("x.png")).unwrap());
    }

    #[test]
    fn control_lines_show_file_names() {
        let mut controls = ExtraControls::default();
        controls.push(Control::File { label: "Background image".into(), path: Some("/tmp/sky.png".into()) });
        controls.push(Control::File { label: "Script".into(), path: None });
        controls.push(Control::Note("careful".into()));
        assert_eq!(controls.lines(), ["Background image: sky.png", "Script: (none)", "careful"]);
    }
}
