// The picture the user uploaded, plus where it sits and how it's turned.
// Visual: this is the layer drawn between the background and the overlay.

use crate::types::{blend_over, Color, FrameBuffer};
use image::RgbaImage;

pub struct UserImage {
    bitmap: RgbaImage,
    position: (f32, f32), // image centre, canvas-relative, each in [0,1]
    rotation: f32,        // degrees clockwise, in [0,360)
}

impl UserImage {
    /// Centred and upright: over a canvas of the same size it lands pixel-for-pixel.
    pub fn new(bitmap: RgbaImage) -> Self {
        Self { bitmap, position: (0.5, 0.5), rotation: 0.0 }
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.bitmap.dimensions()
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Visual: the image centre jumps to (x,y) of the canvas (0,0 = top-left, 1,1 = bottom-right).
    pub fn set_position(&mut self, x: f32, y: f32) {
        let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        self.position = (clamp(x), clamp(y));
    }

    /// Visual: the image slides by a fraction of the canvas.
    pub fn nudge(&mut self, dx: f32, dy: f32) {
        let (x, y) = self.position;
        self.set_position(x + dx, y + dy);
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = if degrees.is_finite() { degrees.rem_euclid(360.0) } else { 0.0 };
        // rem_euclid can land exactly on 360 for tiny negative inputs
        if self.rotation >= 360.0 {
            self.rotation = 0.0;
        }
    }

    /// Visual: the image spins clockwise by `degrees` about its own centre.
    pub fn rotate_by(&mut self, degrees: f32) {
        self.set_rotation(self.rotation + degrees);
    }

    pub fn reset_transform(&mut self) {
        self.position = (0.5, 0.5);
        self.rotation = 0.0;
    }

    /// Where the image centre lands on a canvas of this size, in pixels.
    pub fn center_on(&self, canvas: &FrameBuffer) -> (f32, f32) {
        (self.position.0 * canvas.width as f32, self.position.1 * canvas.height as f32)
    }

    /// Draw onto the canvas with the current position/rotation (source-over).
    /// Every canvas pixel inside the turned image's bounding box is mapped back into
    /// the bitmap and sampled bilinearly.
    pub fn draw(&self, canvas: &mut FrameBuffer) {
        let (iw, ih) = (self.bitmap.width() as f32, self.bitmap.height() as f32);
        if iw == 0.0 || ih == 0.0 || canvas.pixels.is_empty() {
            return;
        }

        let (cx, cy) = self.center_on(canvas);
        let (sin, cos) = if self.rotation == 0.0 { (0.0, 1.0) } else { self.rotation.to_radians().sin_cos() };

        // Bounding box of the rotated rectangle
        let half_w = 0.5 * (iw * cos.abs() + ih * sin.abs());
        let half_h = 0.5 * (iw * sin.abs() + ih * cos.abs());
        let x0 = ((cx - half_w).floor().max(0.0)) as usize;
        let y0 = ((cy - half_h).floor().max(0.0)) as usize;
        let x1 = ((cx + half_w).ceil().max(0.0) as usize).min(canvas.width);
        let y1 = ((cy + half_h).ceil().max(0.0) as usize).min(canvas.height);

        for y in y0..y1 {
            let dy = y as f32 + 0.5 - cy;
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                // Undo the clockwise rotation to land in image space
                let u = dx * cos + dy * sin + iw * 0.5;
                let v = -dx * sin + dy * cos + ih * 0.5;
                if u < 0.0 || v < 0.0 || u > iw || v > ih {
                    continue;
                }
                let src = self.sample(u - 0.5, v - 0.5);
                if src.a() == 0 {
                    continue;
                }
                let idx = y * canvas.width + x;
                canvas.pixels[idx] = blend_over(Color(canvas.pixels[idx]), src).0;
            }
        }
    }

    /// Bilinear sample at pixel-space (fx,fy) with premultiplied weights.
    /// Samples falling off the bitmap count as transparent, which softens the edges.
    fn sample(&self, fx: f32, fy: f32) -> Color {
        let (w, h) = (self.bitmap.width() as i64, self.bitmap.height() as i64);
        let (xf, yf) = (fx.floor(), fy.floor());
        let (tx, ty) = (fx - xf, fy - yf);
        let (xi, yi) = (xf as i64, yf as i64);

        // Exact pixel hit (the identity transform always lands here)
        if tx == 0.0 && ty == 0.0 && xi >= 0 && yi >= 0 && xi < w && yi < h {
            return Color::from_rgba8(self.bitmap.get_pixel(xi as u32, yi as u32).0);
        }

        let mut acc = [0.0f32; 4]; // premultiplied r,g,b + alpha
        for (ox, oy, wgt) in [
            (0, 0, (1.0 - tx) * (1.0 - ty)),
            (1, 0, tx * (1.0 - ty)),
            (0, 1, (1.0 - tx) * ty),
            (1, 1, tx * ty),
        ] {
            let (sx, sy) = (xi + ox, yi + oy);
            if wgt == 0.0 || sx < 0 || sy < 0 || sx >= w || sy >= h {
                continue;
            }
            let [r, g, b, a] = self.bitmap.get_pixel(sx as u32, sy as u32).0;
            let a = a as f32 * wgt;
            acc[0] += r as f32 * a;
            acc[1] += g as f32 * a;
            acc[2] += b as f32 * a;
            acc[3] += a;
        }

        if acc[3] <= 0.0 {
            return Color::TRANSPARENT;
        }
        let un = |c: f32| (c / acc[3]).round().clamp(0.0, 255.0) as u8;
        Color::rgba(un(acc[0]), un(acc[1]), un(acc[2]), acc[3].round().clamp(0.0, 255.0) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8 * 10, y as u8 * 10, 7, 255]))
    }

    #[test]
    fn identity_transform_copies_exactly() {
        let img = gradient(5, 3);
        let user = UserImage::new(img.clone());
        let mut canvas = FrameBuffer::new(5, 3);
        user.draw(&mut canvas);
        assert_eq!(canvas.to_rgba_image(), img);
    }

    #[test]
    fn position_is_clamped_and_moves_the_image() {
        let mut user = UserImage::new(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
        user.set_position(2.0, -1.0);
        assert_eq!(user.position(), (1.0, 0.0));
        user.set_position(f32::NAN, 0.25);
        assert_eq!(user.position(), (0.5, 0.25));

        // Centre at the canvas' top-left corner: only the bottom-right quarter shows.
        let mut canvas = FrameBuffer::new(4, 4);
        user.set_position(0.0, 0.0);
        user.draw(&mut canvas);
        assert_eq!(canvas.get(0, 0), Some(Color::rgb(255, 0, 0)));
        assert_eq!(canvas.get(1, 0), Some(Color::TRANSPARENT));
        assert_eq!(canvas.get(0, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn rotation_wraps_and_quarter_turn_is_exactish() {
        let mut user = UserImage::new(gradient(3, 3));
        user.rotate_by(-90.0);
        assert_eq!(user.rotation(), 270.0);
        user.rotate_by(450.0);
        assert!((user.rotation() - 0.0).abs() < 1e-3 || (user.rotation() - 360.0).abs() < 1e-3);
        user.reset_transform();
        assert_eq!((user.position(), user.rotation()), ((0.5, 0.5), 0.0));

        // 180 degrees: the top-left pixel ends up bottom-right.
        user.set_rotation(180.0);
        let mut canvas = FrameBuffer::new(3, 3);
        user.draw(&mut canvas);
        let tl = Color::from_rgba8(user.bitmap().get_pixel(0, 0).0);
        let br = canvas.get(2, 2).unwrap();
        assert!(br.r().abs_diff(tl.r()) <= 1 && br.g().abs_diff(tl.g()) <= 1, "{br:?} vs {tl:?}");
    }

    #[test]
    fn transparent_pixels_let_the_background_through() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let user = UserImage::new(img);
        let mut canvas = FrameBuffer::new(2, 2);
        canvas.pixels.fill(Color::WHITE.0);
        user.draw(&mut canvas);
        assert!(canvas.pixels.iter().all(|&p| p == Color::WHITE.0));
    }
}
