// One error type for the whole crate.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Image load error ({}): {reason}", .path.display())]
    ImageLoad { path: PathBuf, reason: String }, // Reading/decoding an upload failed

    #[error("Image save error ({}): {reason}", .path.display())]
    ImageSave { path: PathBuf, reason: String }, // Encoding/writing the PNG failed

    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed

    #[error("Unknown background: {0}")]
    UnknownBackground(String), // Selecting/loading an id nobody registered

    #[error("Background registered twice: {0}")]
    DuplicateBackground(String),

    #[error("No backgrounds registered")]
    EmptyRegistry,

    #[error("Invalid color: {0:?}")]
    InvalidColor(String), // A fill/stroke style we can't parse

    #[error("Script error{}: {message}", .line.map(|l| format!(" on line {l}")).unwrap_or_default())]
    Script { message: String, line: Option<usize> }, // Compiling/running a custom script failed

    #[error("Config error ({}): {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_error_mentions_line_when_known() {
        let with_line = Error::Script { message: "boom".into(), line: Some(3) };
        assert_eq!(with_line.to_string(), "Script error on line 3: boom");

        let without = Error::Script { message: "boom".into(), line: None };
        assert_eq!(without.to_string(), "Script error: boom");
    }
}
