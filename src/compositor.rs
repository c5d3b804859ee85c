// The canvas stack: Background -> User Image -> Overlay?
//
// `Compositor` owns the canvas and everything that gets drawn on it. Input
// handlers (window keys, CLI flags) mutate state through it and then call
// `Compositor::redraw`; the draw order never changes.

use crate::background::{BackgroundRegistry, ExtraControls};
use crate::error::{Error, Result};
use crate::types::FrameBuffer;
use crate::user_image::UserImage;
use image::RgbaImage;
use std::path::Path;
use tracing::{debug, info};

pub struct Compositor {
    canvas: FrameBuffer,
    backgrounds: BackgroundRegistry,
    selected: String,
    controls: ExtraControls,
    user_image: Option<UserImage>,
    default_size: usize,
}

impl Compositor {
    /// Starts on a square placeholder canvas with `none` selected (or the first
    /// background, if there is no `none`).
    pub fn new(mut backgrounds: BackgroundRegistry, default_size: usize) -> Result<Self> {
        let selected = if backgrounds.contains("none") {
            "none".to_string()
        } else {
            backgrounds.id_at(0).ok_or(Error::EmptyRegistry)?.to_string()
        };

        let mut controls = ExtraControls::default();
        if let Some(bg) = backgrounds.get_mut(&selected) {
            bg.setup(&mut controls);
        }

        let default_size = default_size.max(1);
        let mut compositor = Self {
            canvas: FrameBuffer::new(default_size, default_size),
            backgrounds,
            selected,
            controls,
            user_image: None,
            default_size,
        };
        compositor.redraw()?;
        Ok(compositor)
    }

    pub fn canvas(&self) -> &FrameBuffer {
        &self.canvas
    }

    pub fn backgrounds(&self) -> &BackgroundRegistry {
        &self.backgrounds
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn selected_name(&self) -> &str {
        self.backgrounds.get(&self.selected).map(|b| b.name()).unwrap_or_default()
    }

    pub fn controls(&self) -> &ExtraControls {
        &self.controls
    }

    pub fn user_image(&self) -> Option<&UserImage> {
        self.user_image.as_ref()
    }

    /// For the position/rotation handlers. Call `redraw` afterwards.
    pub fn user_image_mut(&mut self) -> Option<&mut UserImage> {
        self.user_image.as_mut()
    }

    /// Switch backgrounds: run the new one's setup once, then redraw.
    /// Unknown ids leave the current selection alone.
    pub fn select_background(&mut self, id: &str) -> Result<()> {
        let bg = self
            .backgrounds
            .get_mut(id)
            .ok_or_else(|| Error::UnknownBackground(id.to_string()))?;
        bg.setup(&mut self.controls);
        self.selected = id.to_string();
        info!(background = id, "background selected");
        self.redraw()
    }

    /// Step through the picker order (wrapping). Negative steps go backwards.
    pub fn cycle_background(&mut self, step: isize) -> Result<()> {
        let len = self.backgrounds.len() as isize;
        let current = self.backgrounds.index_of(&self.selected).unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(len.max(1)) as usize;
        let id = self
            .backgrounds
            .id_at(next)
            .ok_or(Error::EmptyRegistry)?
            .to_string();
        self.select_background(&id)
    }

    /// Hand a file to a background that takes one (picture, script).
    /// Returns whether that background used it.
    pub fn load_background_source(&mut self, id: &str, path: &Path) -> Result<bool> {
        let bg = self
            .backgrounds
            .get_mut(id)
            .ok_or_else(|| Error::UnknownBackground(id.to_string()))?;
        let used = bg.load_source(path)?;
        if used && id == self.selected {
            // Refresh the side panel so it shows the new file.
            bg.setup(&mut self.controls);
        }
        self.redraw()?;
        Ok(used)
    }

    /// New upload: reset to the placeholder, then size the canvas to the image and redraw.
    pub fn load_image(&mut self, bitmap: RgbaImage) -> Result<()> {
        self.disable_canvas();
        let (w, h) = bitmap.dimensions();
        info!(width = w, height = h, "user image attached");
        self.user_image = Some(UserImage::new(bitmap));
        self.enable_canvas()
    }

    /// Drop the upload and go back to the placeholder canvas.
    pub fn clear_image(&mut self) -> Result<()> {
        self.user_image = None;
        self.disable_canvas();
        self.redraw()
    }

    fn disable_canvas(&mut self) {
        self.canvas.resize(self.default_size, self.default_size);
    }

    fn enable_canvas(&mut self) -> Result<()> {
        if let Some(img) = &self.user_image {
            let (w, h) = img.dimensions();
            self.canvas.resize(w as usize, h as usize);
        }
        self.redraw()
    }

    /// Clear, background, user image, then whatever overlay the background returned.
    pub fn redraw(&mut self) -> Result<()> {
        debug!(background = %self.selected, "redraw");

        // Removes artifacts from previous backgrounds.
        self.canvas.clear();

        let background = self
            .backgrounds
            .get(&self.selected)
            .ok_or_else(|| Error::UnknownBackground(self.selected.clone()))?;
        let overlay = background.draw(&mut self.canvas)?;

        if let Some(img) = &self.user_image {
            img.draw(&mut self.canvas);
        }

        if let Some(overlay) = overlay {
            overlay(&mut self.canvas)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::{Background, Control, Overlay};
    use crate::draw::fill_rect;
    use crate::script::CustomScript;
    use crate::types::Color;
    use image::Rgba;
    use std::cell::Cell;
    use std::rc::Rc;

    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    /// Fills red, and its overlay paints the top-left pixel blue.
    struct Probe {
        id: &'static str,
        setups: Rc<Cell<u32>>,
    }

    impl Background for Probe {
        fn id(&self) -> &str { self.id }
        fn name(&self) -> &str { "Probe" }

        fn setup(&mut self, controls: &mut ExtraControls) {
            self.setups.set(self.setups.get() + 1);
            controls.reset();
            controls.push(Control::Note(self.id.into()));
        }

        fn draw<'a>(&'a self, canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>> {
            fill_rect(canvas, 0.0, 0.0, canvas.width as f32, canvas.height as f32, RED);
            Ok(Some(Box::new(|canvas: &mut FrameBuffer| {
                fill_rect(canvas, 0.0, 0.0, 1.0, 1.0, BLUE);
                Ok(())
            })))
        }
    }

    fn compositor() -> (Compositor, Rc<Cell<u32>>) {
        let setups = Rc::new(Cell::new(0));
        let mut reg = BackgroundRegistry::new();
        reg.register(Box::new(Probe { id: "first", setups: setups.clone() })).unwrap();
        reg.register(Box::new(Probe { id: "second", setups: setups.clone() })).unwrap();
        (Compositor::new(reg, 8).unwrap(), setups)
    }

    #[test]
    fn empty_registry_is_rejected() {
        assert!(matches!(Compositor::new(BackgroundRegistry::new(), 8), Err(Error::EmptyRegistry)));
    }

    #[test]
    fn starts_on_first_background_with_placeholder_canvas() {
        let (c, setups) = compositor();
        assert_eq!(c.selected(), "first");
        assert_eq!((c.canvas().width, c.canvas().height), (8, 8));
        assert_eq!(setups.get(), 1);
        assert_eq!(c.canvas().get(0, 0), Some(BLUE));
        assert_eq!(c.canvas().get(1, 1), Some(RED));
    }

    #[test]
    fn draw_order_is_background_image_overlay() {
        let (mut c, _) = compositor();
        c.load_image(RgbaImage::from_pixel(4, 2, Rgba([0, 255, 0, 255]))).unwrap();

        // Canvas follows the image size.
        assert_eq!((c.canvas().width, c.canvas().height), (4, 2));
        // Image covers the background; overlay covers the image.
        assert_eq!(c.canvas().get(0, 0), Some(BLUE));
        assert_eq!(c.canvas().get(3, 1), Some(GREEN));
    }

    #[test]
    fn moving_the_image_uncovers_the_background() {
        let (mut c, _) = compositor();
        c.load_image(RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]))).unwrap();
        c.user_image_mut().unwrap().set_position(1.0, 1.0);
        c.redraw().unwrap();
        assert_eq!(c.canvas().get(1, 1), Some(RED));
        assert_eq!(c.canvas().get(3, 3), Some(GREEN));
    }

    #[test]
    fn selecting_runs_setup_once_and_unknown_ids_change_nothing() {
        let (mut c, setups) = compositor();
        c.select_background("second").unwrap();
        assert_eq!(c.selected(), "second");
        assert_eq!(setups.get(), 2);
        assert_eq!(c.controls().lines(), ["second"]);

        c.redraw().unwrap();
        assert_eq!(setups.get(), 2);

        assert!(matches!(c.select_background("nope"), Err(Error::UnknownBackground(_))));
        assert_eq!(c.selected(), "second");
        assert_eq!(setups.get(), 2);
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let (mut c, _) = compositor();
        c.cycle_background(1).unwrap();
        assert_eq!(c.selected(), "second");
        c.cycle_background(1).unwrap();
        assert_eq!(c.selected(), "first");
        c.cycle_background(-1).unwrap();
        assert_eq!(c.selected(), "second");
    }

    #[test]
    fn clearing_the_image_restores_the_placeholder() {
        let (mut c, _) = compositor();
        c.load_image(RgbaImage::new(3, 5)).unwrap();
        c.clear_image().unwrap();
        assert!(c.user_image().is_none());
        assert_eq!((c.canvas().width, c.canvas().height), (8, 8));
    }

    #[test]
    fn failed_draw_is_returned_and_keeps_what_was_painted() {
        let mut script = CustomScript::new(1_000_000).unwrap();
        script
            .set_source(r##"fill_style("#ff0000"); fill_rect(0, 0, 4, 8); no_such();"##, None)
            .unwrap();
        let (mut c, _) = compositor();
        c.backgrounds.register(Box::new(script)).unwrap();

        assert!(matches!(c.select_background("custom-script"), Err(Error::Script { .. })));
        assert_eq!(c.selected(), "custom-script");
        // Left half was filled before the script failed; the rest stays cleared.
        assert_eq!(c.canvas().get(1, 1), Some(RED));
        assert_eq!(c.canvas().get(6, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn sources_for_backgrounds_that_take_none_are_ignored() {
        let (mut c, _) = compositor();
        assert!(!c.load_background_source("first", Path::new("x.png")).unwrap());
        assert!(matches!(
            c.load_background_source("ghost", Path::new("x.png")),
            Err(Error::UnknownBackground(_))
        ));
    }
}
