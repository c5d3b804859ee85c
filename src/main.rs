// What you SEE:
// • `backgrounder photo.png` opens a window: your photo over a flag.
//   N / P flips through backgrounds, arrows + Q/E + mouse place the photo, S saves.
// • `backgrounder photo.png -b trans -o out.png` does the same without a window.
// • `--previews sheet.png` renders every background side by side; `--list` names them.

use backgrounder::compositor::Compositor;
use backgrounder::config::Config;
use backgrounder::error::Error;
use backgrounder::export::{render_previews, save_png};
use backgrounder::flags::default_registry;
use backgrounder::loader::load_image;
use backgrounder::logging::init_logging;
use backgrounder::window;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

/// Config picked up from the working directory when `--config` isn't given.
const DEFAULT_CONFIG: &str = "backgrounder.toml";

/// Put a picture in front of a pride flag background
#[derive(Parser, Debug)]
#[command(name = "backgrounder")]
#[command(version)]
struct Args {
    /// Picture to place on the background
    image: Option<PathBuf>,

    /// Background id to start on (see --list)
    #[arg(short, long)]
    background: Option<String>,

    /// Picture for the "Custom Image" background
    #[arg(long)]
    background_image: Option<PathBuf>,

    /// Rhai script for the "Custom Script" background
    #[arg(long)]
    script: Option<PathBuf>,

    /// Horizontal position of the picture's centre, 0..1
    #[arg(long)]
    x: Option<f32>,

    /// Vertical position of the picture's centre, 0..1
    #[arg(long)]
    y: Option<f32>,

    /// Clockwise rotation of the picture, in degrees
    #[arg(long, allow_negative_numbers = true)]
    rotation: Option<f32>,

    /// Render once and write a PNG here instead of opening a window
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a sheet with a preview of every background
    #[arg(long)]
    previews: Option<PathBuf>,

    /// Preview tile size in pixels
    #[arg(long, default_value = "96")]
    tile: usize,

    /// Print the background ids and names, then exit
    #[arg(long)]
    list: bool,

    /// Config file (defaults to ./backgrounder.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Canvas size used when no picture is loaded (overrides the config)
    #[arg(long)]
    size: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<Config, Error> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(Path::new(DEFAULT_CONFIG))?,
        None => Config::default(),
    };
    if let Some(size) = args.size {
        config.canvas.default_size = size;
    }
    Ok(config)
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let registry = default_registry(config.script.max_operations)?;

    if args.list {
        for bg in registry.iter() {
            println!("{:<22} {}", bg.id(), bg.name());
        }
        return Ok(());
    }

    if let Some(path) = &args.previews {
        let sheet = render_previews(&registry, args.tile);
        save_png(&sheet, path)?;
        if args.output.is_none() && args.image.is_none() {
            return Ok(());
        }
    }

    /* --- Build the canvas stack ---
       Visual: placeholder square with no background, until the flags below change it. */
    let mut compositor = Compositor::new(registry, config.canvas.default_size)?;

    if let Some(path) = &args.background_image {
        compositor.load_background_source("custom-image", path)?;
    }
    if let Some(path) = &args.script {
        compositor.load_background_source("custom-script", path)?;
    }

    if let Some(path) = &args.image {
        compositor.load_image(load_image(path)?)?;
    }

    if let Some(id) = &args.background {
        compositor.select_background(id)?;
    }

    if let Some(img) = compositor.user_image_mut() {
        let (x, y) = img.position();
        img.set_position(args.x.unwrap_or(x), args.y.unwrap_or(y));
        if let Some(degrees) = args.rotation {
            img.set_rotation(degrees);
        }
        compositor.redraw()?;
    }

    match &args.output {
        Some(path) => {
            // Headless: one frame, straight to disk.
            save_png(compositor.canvas(), path)?;
            info!(background = compositor.selected(), "done");
            Ok(())
        }
        None => window::run(&mut compositor, &config),
    }
}
