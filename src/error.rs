//! Error type shared by every stage of sheet generation.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Exit code for a successful run, including the "no icons found" case.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for failures while reading, converting or writing.
pub const EXIT_ERROR: u8 = 1;
/// Exit code for bad user input.
pub const EXIT_INVALID_ARGS: u8 = 2;

/// The command-line option a color token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Foreground,
    Background,
}

impl ColorRole {
    /// The option name as typed on the command line.
    pub fn option(&self) -> &'static str {
        match self {
            Self::Foreground => "--foreground",
            Self::Background => "--background",
        }
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option())
    }
}

/// Errors that can occur while building a token sheet.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("invalid color '{token}' for {role}: expected a CSS color name or 3/6 digit hex")]
    InvalidColor { token: String, role: ColorRole },

    #[error("invalid value for {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("input directory does not exist or is not a directory: {path}")]
    InputNotFound { path: PathBuf },

    #[error("no icons found under {path}")]
    NoIconsFound { path: PathBuf },

    #[error(
        "--cell-size-in {} ({cell_size}pt) does not fit on a {page_width}x{page_height}pt page",
        .cell_size / crate::layout::POINTS_PER_INCH
    )]
    PageTooSmall {
        cell_size: f32,
        page_width: f32,
        page_height: f32,
    },

    #[error("failed to parse icon {path}: {reason}")]
    IconParse { path: PathBuf, reason: String },

    #[error("failed to walk directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load profile {path}: {source}")]
    Profile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to convert {path} to PDF: {reason}")]
    Pdf { path: PathBuf, reason: String },

    #[error("drawing requested with no open page")]
    NoOpenPage,

    #[error("failed to rasterize preview: {0}")]
    Raster(String),

    #[error("failed to write preview {path}: {source}")]
    Preview {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl SheetError {
    /// Builds an [`SheetError::InvalidArgument`].
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Returns true for errors that skip a single icon instead of aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::IconParse { .. })
    }

    /// Maps the error to the process exit code reported by the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NoIconsFound { .. } => EXIT_SUCCESS,
            Self::InvalidColor { .. }
            | Self::InvalidArgument { .. }
            | Self::InputNotFound { .. }
            | Self::PageTooSmall { .. } => EXIT_INVALID_ARGS,
            _ => EXIT_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_color_names_token_and_option() {
        let err = SheetError::InvalidColor {
            token: "notacolor".into(),
            role: ColorRole::Foreground,
        };
        let message = err.to_string();
        assert!(message.contains("notacolor"));
        assert!(message.contains("--foreground"));
        assert_eq!(err.exit_code(), EXIT_INVALID_ARGS);
    }

    #[test]
    fn no_icons_found_exits_cleanly() {
        let err = SheetError::NoIconsFound {
            path: PathBuf::from("icons"),
        };
        assert_eq!(err.exit_code(), EXIT_SUCCESS);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn only_parse_errors_are_recoverable() {
        let parse = SheetError::IconParse {
            path: PathBuf::from("a.svg"),
            reason: "bad".into(),
        };
        assert!(parse.is_recoverable());
        assert_eq!(parse.exit_code(), EXIT_ERROR);
        assert!(!SheetError::invalid_argument("--grid-gray", "out of range").is_recoverable());
    }

    #[test]
    fn page_too_small_names_the_inch_option() {
        let err = SheetError::PageTooSmall {
            cell_size: 720.0,
            page_width: 595.0,
            page_height: 842.0,
        };
        assert_eq!(
            err.to_string(),
            "--cell-size-in 10 (720pt) does not fit on a 595x842pt page"
        );
    }
}
