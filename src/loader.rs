// Turns a file the user picked into an RGBA bitmap we can draw.
// Visual: nothing on screen by itself; the compositor shows the result on the next redraw.

use crate::error::Error;
use image::RgbaImage;
use std::path::Path;
use tracing::info;

/// Decode the image at `path` (PNG, JPEG, and whatever else `image` recognises).
pub fn load_image(path: &Path) -> Result<RgbaImage, Error> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| Error::ImageLoad { path: path.to_path_buf(), reason: e.to_string() })?
        .with_guessed_format()
        .map_err(|e| Error::ImageLoad { path: path.to_path_buf(), reason: e.to_string() })?;

    let img = reader
        .decode()
        .map_err(|e| Error::ImageLoad { path: path.to_path_buf(), reason: e.to_string() })?
        .to_rgba8();

    info!(path = %path.display(), width = img.width(), height = img.height(), "image loaded");
    Ok(img)
}

/// Decode an in-memory file (same formats as `load_image`).
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, Error> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| Error::ImageLoad { path: "<memory>".into(), reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn decodes_png_bytes() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();

        let back = decode_image(&bytes).unwrap();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(2, 1).0, [9, 8, 7, 255]);
    }

    #[test]
    fn garbage_and_missing_files_are_load_errors() {
        assert!(matches!(decode_image(b"not an image"), Err(Error::ImageLoad { .. })));
        let missing = Path::new("definitely/not/here.png");
        match load_image(missing) {
            Err(Error::ImageLoad { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected ImageLoad, got {other:?}"),
        }
    }

    #[test]
    fn sniffs_format_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        assert_eq!(load_image(&path).unwrap().dimensions(), (4, 4));
    }
}
