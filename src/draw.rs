// Software drawing into a FrameBuffer.
// Visual effects provided here:
// 1) The 2D-canvas style primitives backgrounds are made of (rects, paths, strokes, stripes).
// 2) A checkerboard so transparent areas are visible in the window.
// 3) A tiny 5x7 bitmap font for the HUD and the preview labels.
//
// Coverage rule everywhere: a pixel is painted when its centre (x+0.5, y+0.5)
// is inside the shape. No anti-aliasing.

use crate::path::Path;
use crate::types::{blend_over, Color, FrameBuffer};

/// Blend a colour onto the pixel at (x,y) if it's inside bounds.
/// Visual: the exact pixel at (x,y) takes the paint (source-over).
#[inline]
pub fn blend_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = blend_over(Color(fb.pixels[idx]), color).0;
}

/// Overwrite the pixel at (x,y), no blending (used for the HUD).
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    fb.pixels[y * fb.width + x] = color.0;
}

/// Pixel indices whose centres fall in [lo, hi), clamped to [0, limit).
#[inline]
fn center_span(lo: f32, hi: f32, limit: usize) -> std::ops::Range<usize> {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let start = (lo - 0.5).ceil().max(0.0);
    let end = (hi - 0.5).ceil().max(0.0).min(limit as f32);
    if !(start < end) {
        return 0..0;
    }
    start as usize..end as usize
}

/// Fill an axis-aligned rectangle (negative sizes grow left/up, like the canvas API).
/// Visual: a solid block of `color` over whatever was there.
pub fn fill_rect(fb: &mut FrameBuffer, x: f32, y: f32, w: f32, h: f32, color: Color) {
    let xs = center_span(x, x + w, fb.width);
    for py in center_span(y, y + h, fb.height) {
        let row = py * fb.width;
        for px in xs.clone() {
            fb.pixels[row + px] = blend_over(Color(fb.pixels[row + px]), color).0;
        }
    }
}

/// Make a rectangle fully transparent.
/// Visual: the checkerboard shows through there.
pub fn clear_rect(fb: &mut FrameBuffer, x: f32, y: f32, w: f32, h: f32) {
    let xs = center_span(x, x + w, fb.width);
    for py in center_span(y, y + h, fb.height) {
        let row = py * fb.width;
        fb.pixels[row + xs.start..row + xs.end].fill(0);
    }
}

/// Fill every sub-path of `path` (implicitly closed) with the non-zero winding rule.
/// Visual: the polygon/ellipse appears as a solid shape.
pub fn fill_path(fb: &mut FrameBuffer, path: &Path, color: Color) {
    let edges: Vec<_> = path.fill_edges().filter(|(a, b)| a.1 != b.1).collect();
    if edges.is_empty() {
        return;
    }

    let min_y = edges.iter().map(|(a, b)| a.1.min(b.1)).fold(f32::INFINITY, f32::min);
    let max_y = edges.iter().map(|(a, b)| a.1.max(b.1)).fold(f32::NEG_INFINITY, f32::max);

    let mut crossings: Vec<(f32, i32)> = Vec::new();
    for py in center_span(min_y, max_y + 1.0, fb.height) {
        let yc = py as f32 + 0.5;

        // Where does this scanline cross each edge, and which way does the edge go?
        crossings.clear();
        for &((x0, y0), (x1, y1)) in &edges {
            let (dir, lo, hi) = if y0 < y1 { (1, y0, y1) } else { (-1, y1, y0) };
            if yc < lo || yc >= hi {
                continue;
            }
            let t = (yc - y0) / (y1 - y0);
            crossings.push((x0 + t * (x1 - x0), dir));
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Walk left to right; inside wherever the winding number is non-zero.
        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].1;
            if winding == 0 {
                continue;
            }
            let row = py * fb.width;
            for px in center_span(pair[0].0, pair[1].0, fb.width) {
                fb.pixels[row + px] = blend_over(Color(fb.pixels[row + px]), color).0;
            }
        }
    }
}

/// Stroke the drawn segments of `path` with a round-capped pen `width` pixels wide.
/// Each pixel is painted at most once, so translucent strokes don't darken at joints.
pub fn stroke_path(fb: &mut FrameBuffer, path: &Path, width: f32, color: Color) {
    if width <= 0.0 || fb.pixels.is_empty() {
        return;
    }
    let half = width * 0.5;
    let r2 = half * half;
    let mut covered = vec![false; fb.pixels.len()];

    for ((x0, y0), (x1, y1)) in path.stroke_edges() {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let len2 = dx * dx + dy * dy;

        // Scan just the bounding box of the fat segment
        let xs = center_span(x0.min(x1) - half, x0.max(x1) + half, fb.width);
        for py in center_span(y0.min(y1) - half, y0.max(y1) + half, fb.height) {
            let yc = py as f32 + 0.5;
            for px in xs.clone() {
                let xc = px as f32 + 0.5;
                // Distance from the pixel centre to the closest point on the segment
                let t = if len2 > 0.0 { (((xc - x0) * dx + (yc - y0) * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
                let (ex, ey) = (x0 + t * dx - xc, y0 + t * dy - yc);
                if ex * ex + ey * ey <= r2 {
                    covered[py * fb.width + px] = true;
                }
            }
        }
    }

    for (px, hit) in fb.pixels.iter_mut().zip(covered) {
        if hit {
            *px = blend_over(Color(*px), color).0;
        }
    }
}

/// Equal horizontal stripes, top to bottom, in the order given.
/// Stripe i covers rows [floor(i*h/n), floor((i+1)*h/n)), so the bands tile the canvas
/// exactly with no seams.
pub fn draw_stripes(fb: &mut FrameBuffer, colors: &[Color]) {
    if colors.is_empty() {
        return;
    }
    let stripe_height = fb.height as f32 / colors.len() as f32;
    for (i, &color) in colors.iter().enumerate() {
        let top = (stripe_height * i as f32).floor();
        let bottom = if i + 1 == colors.len() {
            fb.height as f32
        } else {
            (stripe_height * (i + 1) as f32).floor()
        };
        fill_rect(fb, 0.0, top, fb.width as f32, bottom - top, color);
    }
}

/// Composite the canvas over a grey checkerboard and drop alpha (0x00RRGGBB for minifb).
/// Visual: transparent areas look like the usual "nothing here" pattern.
pub fn over_checkerboard(fb: &FrameBuffer, cell: usize) -> FrameBuffer {
    let cell = cell.max(1);
    let mut out = FrameBuffer::new(fb.width, fb.height);
    for y in 0..fb.height {
        for x in 0..fb.width {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let base = if light { Color::rgb(0xCC, 0xCC, 0xCC) } else { Color::rgb(0x99, 0x99, 0x99) };
            let idx = y * fb.width + x;
            out.pixels[idx] = blend_over(base, Color(fb.pixels[idx])).0 & 0x00_FF_FF_FF;
        }
    }
    out
}

/// Nearest-neighbour downscale for showing big canvases in a small window.
pub fn scale_nearest(fb: &FrameBuffer, width: usize, height: usize) -> FrameBuffer {
    if width == fb.width && height == fb.height {
        return fb.clone();
    }
    let mut out = FrameBuffer::new(width, height);
    if fb.width == 0 || fb.height == 0 {
        return out;
    }
    for y in 0..height {
        let sy = (y * fb.height / height.max(1)).min(fb.height - 1);
        for x in 0..width {
            let sx = (x * fb.width / width.max(1)).min(fb.width - 1);
            out.pixels[y * width + x] = fb.pixels[sy * fb.width + sx];
        }
    }
    out
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
/// Visual: a straight 1-pixel line appears on top of the canvas.
fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Draw a small crosshair centred at (cx,cy).
/// Visual: a "+" marks the image centre while you drag it.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: Color) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/* ---------- 5x7 bitmap font (upper-case, digits, the punctuation our names use) ---------- */

pub const GLYPH_ADVANCE: i32 = 6; // 5 pixels glyph width + 1 pixel spacing
pub const GLYPH_HEIGHT: i32 = 7;

/// Return a 5x7 glyph bitmap. Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00110,0b00100,0b01000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y).
/// Visual: a tiny glyph appears with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: Color) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass first, offset by (1,1)
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx + 1, y + ry as i32 + 1, Color::BLACK);
                }
            }
        }
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx, y + ry as i32, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs. Unknown characters leave a gap.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: Color) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += GLYPH_ADVANCE;
    }
}

/// Width in pixels `draw_text_5x7` will use for `text`.
pub fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    fn count(fb: &FrameBuffer, color: Color) -> usize {
        fb.pixels.iter().filter(|&&p| p == color.0).count()
    }

    #[test]
    fn fill_rect_uses_pixel_centres_and_clips() {
        let mut fb = FrameBuffer::new(10, 10);
        fill_rect(&mut fb, 2.0, 3.0, 4.0, 2.0, RED);
        assert_eq!(count(&fb, RED), 8);
        assert_eq!(fb.get(2, 3), Some(RED));
        assert_eq!(fb.get(6, 3), Some(Color::TRANSPARENT));

        let mut fb = FrameBuffer::new(4, 4);
        fill_rect(&mut fb, -10.0, -10.0, 100.0, 100.0, RED);
        assert_eq!(count(&fb, RED), 16);

        // negative width grows to the left
        let mut fb = FrameBuffer::new(4, 1);
        fill_rect(&mut fb, 4.0, 0.0, -2.0, 1.0, RED);
        assert_eq!(fb.pixels, vec![0, 0, RED.0, RED.0]);
    }

    #[test]
    fn clear_rect_makes_pixels_transparent() {
        let mut fb = FrameBuffer::new(4, 4);
        fill_rect(&mut fb, 0.0, 0.0, 4.0, 4.0, RED);
        clear_rect(&mut fb, 0.0, 0.0, 2.0, 4.0);
        assert_eq!(count(&fb, RED), 8);
        assert_eq!(fb.get(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn stripes_tile_the_canvas_without_seams() {
        let colors = [RED, Color::BLACK, Color::WHITE];
        let mut fb = FrameBuffer::new(3, 10);
        draw_stripes(&mut fb, &colors);
        assert!(fb.pixels.iter().all(|&p| p != 0));
        assert_eq!(fb.get(0, 0), Some(RED));
        assert_eq!(fb.get(0, 2), Some(RED));
        assert_eq!(fb.get(0, 3), Some(Color::BLACK));
        assert_eq!(fb.get(0, 9), Some(Color::WHITE));
    }

    #[test]
    fn fill_path_triangle_and_nonzero_overlap() {
        let mut fb = FrameBuffer::new(10, 10);
        let mut p = Path::new();
        p.move_to(0.0, 0.0).line_to(10.0, 0.0).line_to(0.0, 10.0);
        fill_path(&mut fb, &p, RED);
        assert_eq!(fb.get(1, 1), Some(RED));
        assert_eq!(fb.get(9, 9), Some(Color::TRANSPARENT));
        // Half the square, give or take the diagonal.
        let n = count(&fb, RED);
        assert!((40..=55).contains(&n), "{n}");

        // Two overlapping squares wound the same way: the overlap stays filled.
        let mut fb = FrameBuffer::new(10, 10);
        let mut p = Path::new();
        p.move_to(0.0, 0.0).line_to(6.0, 0.0).line_to(6.0, 6.0).line_to(0.0, 6.0);
        p.move_to(4.0, 4.0).line_to(10.0, 4.0).line_to(10.0, 10.0).line_to(4.0, 10.0);
        fill_path(&mut fb, &p, RED);
        assert_eq!(fb.get(5, 5), Some(RED));
        assert_eq!(count(&fb, RED), 36 + 36 - 4);
    }

    #[test]
    fn circle_fill_is_roughly_pi_r_squared() {
        let mut fb = FrameBuffer::new(100, 100);
        let mut p = Path::new();
        p.circle(50.0, 50.0, 30.0);
        fill_path(&mut fb, &p, RED);
        let area = count(&fb, RED) as f32;
        let expected = std::f32::consts::PI * 900.0;
        assert!((area - expected).abs() / expected < 0.02, "{area}");
        assert_eq!(fb.get(50, 50), Some(RED));
        assert_eq!(fb.get(5, 5), Some(Color::TRANSPARENT));
    }

    #[test]
    fn stroke_paints_overlaps_once() {
        let mut fb = FrameBuffer::new(20, 20);
        let mut p = Path::new();
        p.move_to(2.0, 10.0).line_to(18.0, 10.0).line_to(2.0, 10.0);
        let half_black = Color::rgba(0, 0, 0, 128);
        stroke_path(&mut fb, &p, 4.0, half_black);
        assert_eq!(fb.get(10, 10), Some(half_black));
        assert_eq!(fb.get(10, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn checkerboard_drops_alpha() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.pixels[0] = RED.0;
        let shown = over_checkerboard(&fb, 2);
        assert_eq!(shown.pixels[0], 0x00_FF_00_00);
        assert_eq!(shown.pixels[1], 0x00_CC_CC_CC);
        assert_eq!(shown.pixels[2], 0x00_99_99_99);
    }

    #[test]
    fn text_draws_something_and_reports_width() {
        let mut fb = FrameBuffer::new(40, 10);
        draw_text_5x7(&mut fb, 1, 1, "Hi 7", Color::WHITE);
        assert!(count(&fb, Color::WHITE) > 10);
        assert_eq!(text_width("Hi 7"), 24);
    }
}
