// "Custom Image" background: any picture the user picks, stretched to the canvas.
// Visual: until a picture is picked, the magenta/black "missing texture" pattern shows.

use crate::background::{Background, Control, ExtraControls, Overlay};
use crate::draw::fill_rect;
use crate::error::Result;
use crate::loader::load_image;
use crate::types::{Color, FrameBuffer};
use crate::user_image::UserImage;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::path::{Path, PathBuf};
use tracing::info;

const PLACEHOLDER: Color = Color::rgb(0xff, 0x00, 0xdc);

#[derive(Default)]
pub struct CustomImage {
    image: Option<RgbaImage>,
    path: Option<PathBuf>,
}

impl CustomImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an already-decoded picture.
    pub fn set_image(&mut self, image: RgbaImage, path: Option<PathBuf>) {
        self.image = Some(image);
        self.path = path;
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

impl Background for CustomImage {
    fn id(&self) -> &str { "custom-image" }
    fn name(&self) -> &str { "Custom Image" }

    fn setup(&mut self, controls: &mut ExtraControls) {
        controls.reset();
        controls.push(Control::File { label: "Background image".into(), path: self.path.clone() });
    }

    fn draw<'a>(&'a self, canvas: &mut FrameBuffer) -> Result<Option<Overlay<'a>>> {
        let (w, h) = (canvas.width as f32, canvas.height as f32);
        match &self.image {
            None => {
                fill_rect(canvas, 0.0, 0.0, w, h, PLACEHOLDER);
                fill_rect(canvas, w / 2.0, 0.0, w / 2.0, h / 2.0, Color::BLACK);
                fill_rect(canvas, 0.0, h / 2.0, w / 2.0, h / 2.0, Color::BLACK);
            }
            Some(img) if canvas.width > 0 && canvas.height > 0 => {
                let stretched = if img.dimensions() == (canvas.width as u32, canvas.height as u32) {
                    img.clone()
                } else {
                    imageops::resize(img, canvas.width as u32, canvas.height as u32, FilterType::Triangle)
                };
                // Same path as the user image, with the canvas-sized copy centred and upright.
                UserImage::new(stretched).draw(canvas);
            }
            Some(_) => {}
        }
        Ok(None)
    }

    fn load_source(&mut self, path: &Path) -> Result<bool> {
        let img = load_image(path)?;
        info!(path = %path.display(), "custom background image set");
        self.set_image(img, Some(path.to_path_buf()));
        Ok(true)
    }
}
