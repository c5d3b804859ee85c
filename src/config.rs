// Backgrounder configuration file handling (backgrounder.toml).
//
// Every field has a default, so an empty file (or no file) is a valid config.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub window: WindowConfig,
    pub controls: ControlsConfig,
    pub export: ExportConfig,
    pub script: ScriptConfig,
}

/// Canvas used while no image is loaded
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    /// Side of the square placeholder, in pixels
    pub default_size: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { default_size: 512 }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Bigger canvases are shown scaled down to fit
    pub max_width: usize,
    pub max_height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: "Backgrounder".to_string(), max_width: 960, max_height: 960 }
    }
}

/// How far one key press moves/turns the image
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Fraction of the canvas per arrow key press
    pub move_step: f32,
    /// Degrees per Q/E press
    pub rotate_step: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self { move_step: 0.01, rotate_step: 5.0 }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Where the window's save key writes files
    pub directory: PathBuf,
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { directory: PathBuf::from("."), file_prefix: crate::export::DEFAULT_PREFIX.to_string() }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScriptConfig {
    /// Rhai operation cap per draw (0 = unlimited)
    pub max_operations: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self { max_operations: 50_000_000 }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config { path: path.to_path_buf(), reason: e.to_string() })?;
        Self::parse(&content).map_err(|reason| Error::Config { path: path.to_path_buf(), reason })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::parse(
            r#"
            [canvas]
            default_size = 256

            [controls]
            rotate_step = 15.0

            [export]
            directory = "out"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.canvas.default_size, 256);
        assert_eq!(cfg.controls.rotate_step, 15.0);
        assert_eq!(cfg.controls.move_step, 0.01);
        assert_eq!(cfg.export.directory, PathBuf::from("out"));
        assert_eq!(cfg.export.file_prefix, "backgrounder");
        assert_eq!(cfg.window.title, "Backgrounder");
        assert_eq!(cfg.script.max_operations, 50_000_000);
    }

    #[test]
    fn bad_files_report_their_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backgrounder.toml");
        fs::write(&path, "[canvas]\ndefault_size = \"big\"\n").unwrap();
        match Config::load(&path) {
            Err(Error::Config { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected config error, got {other:?}"),
        }
        assert!(matches!(Config::load(&dir.path().join("nope.toml")), Err(Error::Config { .. })));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = Config::default();
        let text = toml::to_string(&cfg).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), cfg);
    }
}
