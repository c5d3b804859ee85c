// Getting pictures out: the PNG download and a contact sheet of every background.

use crate::background::BackgroundRegistry;
use crate::draw::{draw_text_5x7, fill_rect, text_width, GLYPH_HEIGHT};
use crate::error::{Error, Result};
use crate::types::{Color, FrameBuffer};
use rand::Rng;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_PREFIX: &str = "backgrounder";

/// Write the canvas as a PNG, alpha included.
pub fn save_png(canvas: &FrameBuffer, path: &Path) -> Result<()> {
    canvas
        .to_rgba_image()
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| Error::ImageSave { path: path.to_path_buf(), reason: e.to_string() })?;
    info!(path = %path.display(), width = canvas.width, height = canvas.height, "saved png");
    Ok(())
}

/// `{prefix}-{0..=9999}.png`, like the browser download name.
pub fn random_file_name(prefix: &str) -> String {
    let n: u32 = rand::thread_rng().gen_range(0..=9999);
    format!("{prefix}-{n}.png")
}

const PREVIEWS_PER_ROW: usize = 6;
const LABEL_GAP: usize = 4;
const MARGIN: usize = 8;

/// Every background drawn on its own square tile with its name underneath,
/// in picker order. Backgrounds that fail to draw leave their tile blank.
pub fn render_previews(backgrounds: &BackgroundRegistry, tile: usize) -> FrameBuffer {
    let tile = tile.max(8);
    let label_h = GLYPH_HEIGHT as usize + 1 + 2 * LABEL_GAP;
    let cell_w = tile + MARGIN;
    let cell_h = tile + label_h + MARGIN;

    let count = backgrounds.len();
    let cols = count.clamp(1, PREVIEWS_PER_ROW);
    let rows = count.div_ceil(cols).max(1);
    let mut sheet = FrameBuffer::new(cols * cell_w + MARGIN, rows * cell_h + MARGIN);
    let (sw, sh) = (sheet.width as f32, sheet.height as f32);
    fill_rect(&mut sheet, 0.0, 0.0, sw, sh, Color::rgb(0x22, 0x22, 0x22));

    for (i, bg) in backgrounds.iter().enumerate() {
        let mut preview = FrameBuffer::new(tile, tile);
        match bg.draw(&mut preview) {
            Ok(Some(overlay)) => {
                if let Err(e) = overlay(&mut preview) {
                    warn!(background = bg.id(), error = %e, "preview overlay failed");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(background = bg.id(), error = %e, "preview failed"),
        }

        let x0 = MARGIN + (i % cols) * cell_w;
        let y0 = MARGIN + (i / cols) * cell_h;
        blit(&mut sheet, &preview, x0, y0);

        // Centre the name under the tile, trimming names that don't fit.
        let max_chars = (tile as i32 / crate::draw::GLYPH_ADVANCE).max(1) as usize;
        let label: String = bg.name().chars().take(max_chars).collect();
        let lx = x0 as i32 + (tile as i32 - text_width(&label)) / 2;
        draw_text_5x7(&mut sheet, lx, (y0 + tile + LABEL_GAP) as i32, &label, Color::WHITE);
    }
    sheet
}

/// Copy `src` onto `dst` at (x,y), blending over what's there.
fn blit(dst: &mut FrameBuffer, src: &FrameBuffer, x: usize, y: usize) {
    for sy in 0..src.height {
        for sx in 0..src.width {
            crate::draw::blend_pixel(dst, (x + sx) as i32, (y + sy) as i32, Color(src.pixels[sy * src.width + sx]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::default_registry;

    #[test]
    fn file_names_look_like_downloads() {
        for _ in 0..50 {
            let name = random_file_name(DEFAULT_PREFIX);
            let n: u32 = name
                .strip_prefix("backgrounder-")
                .and_then(|s| s.strip_suffix(".png"))
                .and_then(|s| s.parse().ok())
                .expect(&name);
            assert!(n <= 9999);
        }
    }

    #[test]
    fn png_keeps_size_and_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut fb = FrameBuffer::new(3, 2);
        fb.pixels[0] = Color::rgba(10, 20, 30, 40).0;
        save_png(&fb, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(0, 0).0, [10, 20, 30, 40]);
        assert_eq!(back.get_pixel(2, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn unwritable_destination_is_a_save_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.png");
        let fb = FrameBuffer::new(1, 1);
        assert!(matches!(save_png(&fb, &path), Err(Error::ImageSave { .. })));
    }

    #[test]
    fn preview_sheet_has_a_tile_per_background() {
        let reg = default_registry(1_000_000).unwrap();
        let sheet = render_previews(&reg, 32);
        let rows = reg.len().div_ceil(PREVIEWS_PER_ROW);
        assert_eq!(sheet.width, PREVIEWS_PER_ROW * (32 + MARGIN) + MARGIN);
        assert_eq!(sheet.height, rows * (32 + GLYPH_HEIGHT as usize + 1 + 2 * LABEL_GAP + MARGIN) + MARGIN);

        // Tile 3 is "rainbow": its top-left pixel is the first stripe.
        let x = MARGIN + 3 * (32 + MARGIN);
        assert_eq!(sheet.get(x, MARGIN), Some(Color::rgb(0xe6, 0x00, 0x00)));
    }
}
