// Core pixel types shared by the rasteriser, the compositor and the window.

use crate::error::Error;
use image::{Rgba, RgbaImage};

/// The canvas everything is drawn into.
/// Pixels are packed 0xAARRGGBB with straight (non-premultiplied) alpha.
/// Visual: alpha 0 shows the checkerboard in the window and stays transparent in the PNG.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // canvas width in pixels
    pub height: usize,     // canvas height in pixels
    pub pixels: Vec<u32>,  // length = width * height
}

impl FrameBuffer {
    /// Fully transparent canvas of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0; width * height] }
    }

    /// Visual: everything disappears (transparent).
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Throw away the contents and take a new size (like assigning canvas.width).
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Color(self.pixels[y * self.width + x]))
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let pixels = img.pixels().map(|p| Color::from_rgba8(p.0).0).collect();
        Self { width: w as usize, height: h as usize, pixels }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Rgba(Color(self.pixels[y as usize * self.width + x as usize]).to_rgba8())
        })
    }
}

/// A straight-alpha colour, packed 0xAARRGGBB like the frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x00_00_00_00);
    pub const BLACK: Color = Color(0xFF_00_00_00);
    pub const WHITE: Color = Color(0xFF_FF_FF_FF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }

    #[inline] pub fn a(self) -> u8 { (self.0 >> 24) as u8 }
    #[inline] pub fn r(self) -> u8 { (self.0 >> 16) as u8 }
    #[inline] pub fn g(self) -> u8 { (self.0 >> 8) as u8 }
    #[inline] pub fn b(self) -> u8 { self.0 as u8 }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }

    /// Parse a CSS-ish colour: `#rgb`, `#rrggbb`, `#rrggbbaa`, or a few names.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "black" => return Ok(Color::BLACK),
            "white" => return Ok(Color::WHITE),
            "transparent" => return Ok(Color::TRANSPARENT),
            _ => {}
        }

        let invalid = || Error::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                // #abc == #aabbcc
                let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17).map_err(|_| invalid());
                Ok(Color::rgb(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl std::str::FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

/// Source-over blend of `src` onto `dst`, both straight alpha.
/// Visual: opaque paint replaces; translucent paint tints what's underneath.
#[inline]
pub fn blend_over(dst: Color, src: Color) -> Color {
    let sa = src.a() as u32;
    if sa == 255 { return src; }
    if sa == 0 { return dst; }

    let da = dst.a() as u32;
    // out_a = sa + da * (1 - sa), everything scaled by 255
    let inv = 255 - sa;
    let out_a = sa * 255 + da * inv; // scaled by 255*255
    if out_a == 0 { return Color::TRANSPARENT; }

    let mix = |s: u8, d: u8| -> u8 {
        let num = s as u32 * sa * 255 + d as u32 * da * inv;
        ((num + out_a / 2) / out_a).min(255) as u8
    };
    Color::rgba(
        mix(src.r(), dst.r()),
        mix(src.g(), dst.g()),
        mix(src.b(), dst.b()),
        ((out_a + 127) / 255) as u8,
    )
}
