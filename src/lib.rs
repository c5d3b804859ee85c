// Backgrounder: put a picture on top of a pride flag (or a picture, or your
// own drawing script) and save the result as a PNG.
//
// The canvas is always drawn in the same order:
// background, then the user's image (moved/rotated), then whatever overlay the
// background asked for. See `compositor::Compositor`.

pub mod background;
pub mod compositor;
pub mod config;
pub mod custom;
pub mod draw;
pub mod error;
pub mod export;
pub mod flags;
pub mod loader;
pub mod logging;
pub mod path;
pub mod script;
pub mod types;
pub mod user_image;
pub mod window;

pub use error::{Error, Result};
