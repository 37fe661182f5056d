//! Icon types for discovered and prepared vector icons.
//!
//! An [`IconFile`] is what discovery finds on disk. Preparing it reads the
//! file, recolors it and measures it, producing a [`PreparedIcon`] that the
//! renderer can place.

use std::path::{Path, PathBuf};

use resvg::usvg::{Options, Tree};

use crate::color::Color;
use crate::document::SvgDocument;
use crate::error::SheetError;
use crate::recolor::recolor;

/// A discovered icon file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IconFile {
    /// Path relative to the input directory, used for ordering and labels.
    pub relative_path: PathBuf,
    /// Absolute (or input-rooted) path used for reading.
    pub path: PathBuf,
}

impl IconFile {
    /// Creates an icon file from its full path and its path under `root`.
    pub fn new(path: impl Into<PathBuf>, relative_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
        }
    }

    /// The relative path with forward slashes, as shown in labels.
    pub fn label(&self) -> String {
        self.relative_path.to_string_lossy().replace('\\', "/")
    }

    /// Reads, recolors and measures the icon.
    pub fn prepare(&self, foreground: &Color) -> Result<PreparedIcon, SheetError> {
        let bytes = std::fs::read(&self.path).map_err(|e| self.parse_error(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| self.parse_error(e.to_string()))?;
        PreparedIcon::from_markup(self.clone(), &text, foreground)
    }

    fn parse_error(&self, reason: String) -> SheetError {
        SheetError::IconParse {
            path: self.path.clone(),
            reason,
        }
    }
}

/// An icon ready to be drawn: recolored markup plus its intrinsic size.
#[derive(Debug, Clone)]
pub struct PreparedIcon {
    pub file: IconFile,
    /// Recolored SVG markup.
    pub svg: String,
    /// Intrinsic width in SVG user units.
    pub width: f32,
    /// Intrinsic height in SVG user units.
    pub height: f32,
    /// Number of white paints replaced with the foreground color.
    pub recolored: usize,
}

impl PreparedIcon {
    /// Builds a prepared icon from markup.
    ///
    /// The recolored markup is parsed with usvg once here; malformed icons
    /// fail before they take a cell.
    pub fn from_markup(file: IconFile, markup: &str, foreground: &Color) -> Result<Self, SheetError> {
        let mut doc = SvgDocument::parse(markup).map_err(|e| file.parse_error(e.to_string()))?;
        let recolored = recolor(&mut doc, foreground);
        let svg = doc.to_svg_string();

        let tree = Tree::from_str(&svg, &Options::default())
            .map_err(|e| file.parse_error(e.to_string()))?;
        let size = tree.size();

        Ok(Self {
            file,
            svg,
            width: size.width(),
            height: size.height(),
            recolored,
        })
    }

    /// Path of the source file.
    pub fn path(&self) -> &Path {
        &self.file.path
    }
}
