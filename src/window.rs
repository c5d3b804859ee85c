// Interactive mode: a window showing the composited canvas.
// What you SEE:
// • The canvas over a checkerboard (so transparency is obvious), scaled down if it's big.
// • A small HUD: selected background, its extra controls, key hints.
// • N / P: next / previous background.     Arrows: move the image.
// • Q / E: rotate left / right.             R: reset position + rotation.
// • Hold Left Mouse: drag the image centre. S: save PNG.   ESC quits.

use crate::compositor::Compositor;
use crate::config::Config;
use crate::draw::{draw_crosshair, draw_text_5x7, over_checkerboard, scale_nearest, GLYPH_HEIGHT};
use crate::error::Error;
use crate::export::{random_file_name, save_png};
use crate::types::{Color, FrameBuffer};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use tracing::{error, info};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Visual: the window immediately displays the new image.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in window pixels, or None when it's outside.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// True on the first press and then on key-repeat while held.
    pub fn pressed_repeating(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::Yes)
    }
}

/// What the user asked for this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Input {
    pub cycle: isize,                  // +1 next background, -1 previous
    pub nudge: (f32, f32),             // in key steps
    pub rotate: f32,                   // in key steps, clockwise positive
    pub reset: bool,
    pub drag_to: Option<(f32, f32)>,   // normalized canvas position
    pub save: bool,
}

impl Input {
    fn read(drawer: &Drawer, view: (usize, usize)) -> Self {
        let mut input = Input::default();
        if drawer.pressed_once(Key::N) { input.cycle += 1; }
        if drawer.pressed_once(Key::P) { input.cycle -= 1; }

        if drawer.pressed_repeating(Key::Left) { input.nudge.0 -= 1.0; }
        if drawer.pressed_repeating(Key::Right) { input.nudge.0 += 1.0; }
        if drawer.pressed_repeating(Key::Up) { input.nudge.1 -= 1.0; }
        if drawer.pressed_repeating(Key::Down) { input.nudge.1 += 1.0; }
        if drawer.pressed_repeating(Key::Q) { input.rotate -= 1.0; }
        if drawer.pressed_repeating(Key::E) { input.rotate += 1.0; }

        input.reset = drawer.pressed_once(Key::R);
        input.save = drawer.pressed_once(Key::S);

        if drawer.left_mouse_down() {
            if let Some((mx, my)) = drawer.mouse_pos() {
                input.drag_to = Some((mx / view.0.max(1) as f32, my / view.1.max(1) as f32));
            }
        }
        input
    }
}

/// What one frame of input changed.
#[derive(Debug, Default)]
pub struct Applied {
    pub switched: bool,       // a different background is selected (already redrawn)
    pub moved: bool,          // the image transform changed; canvas needs a redraw
    pub error: Option<Error>, // drawing the newly selected background failed
}

/// Apply one frame of input. A background that fails to draw doesn't stop the
/// same frame's move/turn keys from landing.
pub fn apply_input(compositor: &mut Compositor, input: &Input, config: &Config) -> Applied {
    let mut applied = Applied::default();

    if input.cycle != 0 {
        let before = compositor.selected().to_string();
        if let Err(e) = compositor.cycle_background(input.cycle) {
            applied.error = Some(e);
        }
        applied.switched = compositor.selected() != before;
    }

    if let Some(img) = compositor.user_image_mut() {
        let step = config.controls.move_step;
        if input.nudge != (0.0, 0.0) {
            img.nudge(input.nudge.0 * step, input.nudge.1 * step);
            applied.moved = true;
        }
        if input.rotate != 0.0 {
            img.rotate_by(input.rotate * config.controls.rotate_step);
            applied.moved = true;
        }
        if input.reset {
            img.reset_transform();
            applied.moved = true;
        }
        if let Some((x, y)) = input.drag_to {
            if img.position() != (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)) {
                img.set_position(x, y);
                applied.moved = true;
            }
        }
    }

    applied
}

/// Window size for a canvas, keeping aspect ratio and fitting the configured max.
pub fn fit_view(canvas: (usize, usize), max: (usize, usize)) -> (usize, usize) {
    let (w, h) = (canvas.0.max(1) as f32, canvas.1.max(1) as f32);
    let scale = (max.0.max(1) as f32 / w).min(max.1.max(1) as f32 / h).min(1.0);
    (((w * scale).round() as usize).max(1), ((h * scale).round() as usize).max(1))
}

/// Checkerboard + canvas + HUD, at window size. None of this ends up in a saved PNG.
fn build_display(compositor: &Compositor, view: (usize, usize), dragging: bool, status: &str) -> FrameBuffer {
    let canvas = compositor.canvas();
    let mut screen = scale_nearest(&over_checkerboard(canvas, 16), view.0, view.1);

    if dragging {
        if let Some(img) = compositor.user_image() {
            let (px, py) = img.position();
            draw_crosshair(&mut screen, (px * view.0 as f32) as i32, (py * view.1 as f32) as i32, 12, Color::rgb(0xFF, 0xCC, 0x33));
        }
    }

    let line_h = GLYPH_HEIGHT + 3;
    let mut y = 8;
    draw_text_5x7(&mut screen, 8, y, compositor.selected_name(), Color::WHITE);
    for line in compositor.controls().lines() {
        y += line_h;
        draw_text_5x7(&mut screen, 8, y, &line, Color::rgb(0xDD, 0xDD, 0xDD));
    }

    let hints = if compositor.user_image().is_some() {
        "N/P: BG  ARROWS: MOVE  Q/E: ROTATE  R: RESET  S: SAVE"
    } else {
        "N/P: BG  S: SAVE  (PASS AN IMAGE PATH TO LOAD ONE)"
    };
    let bottom = view.1 as i32 - 8 - GLYPH_HEIGHT;
    draw_text_5x7(&mut screen, 8, bottom, hints, Color::WHITE);
    if !status.is_empty() {
        draw_text_5x7(&mut screen, 8, bottom - line_h, status, Color::rgb(0xFF, 0xCC, 0x33));
    }
    screen
}

/// Open the window and run until it's closed or ESC is pressed.
pub fn run(compositor: &mut Compositor, config: &Config) -> Result<(), Error> {
    let canvas = (compositor.canvas().width, compositor.canvas().height);
    let view = fit_view(canvas, (config.window.max_width, config.window.max_height));
    let mut drawer = Drawer::new(&config.window.title, view.0, view.1)?;
    info!(width = view.0, height = view.1, "window open");

    let mut status = String::new();
    let mut screen = build_display(compositor, view, false, &status);
    let mut was_dragging = false;

    while drawer.is_open() && !drawer.esc_pressed() {
        let input = Input::read(&drawer, view);
        let applied = apply_input(compositor, &input, config);
        let mut dirty = applied.switched || applied.moved;

        if applied.switched {
            status.clear();
        }
        if let Some(e) = &applied.error {
            // A broken script shouldn't take the window down; show it and carry on.
            error!(error = %e, "background draw failed");
            status = e.to_string();
            dirty = true;
        }

        // Switching already redrew; only a moved image needs another pass.
        if applied.moved {
            if let Err(e) = compositor.redraw() {
                error!(error = %e, "redraw failed");
                status = e.to_string();
            }
        }

        if input.save {
            let path = config.export.directory.join(random_file_name(&config.export.file_prefix));
            status = match save_png(compositor.canvas(), &path) {
                Ok(()) => format!("SAVED {}", path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()),
                Err(e) => {
                    error!(error = %e, "save failed");
                    e.to_string()
                }
            };
            dirty = true;
        }

        let dragging = input.drag_to.is_some();
        if dirty || dragging != was_dragging {
            screen = build_display(compositor, view, dragging, &status);
        }
        was_dragging = dragging;

        drawer.present(&screen)?;
    }
    Ok(())
}
