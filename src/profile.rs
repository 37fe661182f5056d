//! Serializable sheet profile.
//!
//! A [`SheetProfile`] carries option values as they appear on the command
//! line, every one optional, so a profile file and explicit flags can be
//! layered with [`SheetProfile::merge`]. [`SheetProfile::resolve`] fills in
//! defaults and validates the result into [`SheetSettings`].
//!
//! # Example
//!
//! ```
//! use icon_tokens::{PageSize, SheetProfile};
//!
//! let file = SheetProfile::from_json(r#"{ "page": "A4landscape", "background": "navy" }"#).unwrap();
//! let flags = SheetProfile {
//!     background: Some("teal".into()),
//!     ..SheetProfile::default()
//! };
//!
//! let settings = file.merge(flags).resolve().unwrap();
//! assert_eq!(settings.page, PageSize::A4Landscape);
//! assert_eq!(settings.background.to_hex(), "#008080");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{ColorRole, SheetError};
use crate::layout::{CellSpec, PageSize, PageSpec, POINTS_PER_INCH};

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_CELL_SIZE_IN: f32 = 1.0;
pub const DEFAULT_CIRCLE_DIAMETER_IN: f32 = 0.9;
pub const DEFAULT_GRID_HAIRLINE_PT: f32 = 0.25;
pub const DEFAULT_GRID_GRAY: f32 = 0.2;
pub const DEFAULT_FOREGROUND: &str = "fff";
pub const DEFAULT_BACKGROUND: &str = "000";

// ============================================================================
// Profile
// ============================================================================

/// Option values for one sheet, as read from JSON or the command line.
///
/// Serializes with camelCase keys and omits unset fields:
///
/// ```json
/// { "page": "A4", "cellSizeIn": 1.0, "foreground": "fff", "annotate": true }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SheetProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageSize>,

    /// Cell side length in inches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_size_in: Option<f32>,

    /// Token circle diameter in inches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_diameter_in: Option<f32>,

    /// Cut-guide stroke width in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_hairline_pt: Option<f32>,

    /// Cut-guide gray level in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_gray: Option<f32>,

    /// Color token replacing white icon paint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,

    /// Color token for the circle fill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    /// Attach a path label to each cell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotate: Option<bool>,
}

impl SheetProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// A profile with every field set to its default value.
    pub fn defaults() -> Self {
        Self {
            page: Some(PageSize::default()),
            cell_size_in: Some(DEFAULT_CELL_SIZE_IN),
            circle_diameter_in: Some(DEFAULT_CIRCLE_DIAMETER_IN),
            grid_hairline_pt: Some(DEFAULT_GRID_HAIRLINE_PT),
            grid_gray: Some(DEFAULT_GRID_GRAY),
            foreground: Some(DEFAULT_FOREGROUND.to_string()),
            background: Some(DEFAULT_BACKGROUND.to_string()),
            annotate: Some(false),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reads a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let json = std::fs::read_to_string(path).map_err(|e| SheetError::Io {
            path: path.to_owned(),
            source: e,
        })?;
        Self::from_json(&json).map_err(|e| SheetError::Profile {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Layers `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: SheetProfile) -> Self {
        Self {
            page: overrides.page.or(self.page),
            cell_size_in: overrides.cell_size_in.or(self.cell_size_in),
            circle_diameter_in: overrides.circle_diameter_in.or(self.circle_diameter_in),
            grid_hairline_pt: overrides.grid_hairline_pt.or(self.grid_hairline_pt),
            grid_gray: overrides.grid_gray.or(self.grid_gray),
            foreground: overrides.foreground.or(self.foreground),
            background: overrides.background.or(self.background),
            annotate: overrides.annotate.or(self.annotate),
        }
    }

    /// Applies defaults and validates every value.
    pub fn resolve(&self) -> Result<SheetSettings, SheetError> {
        let full = Self::defaults().merge(self.clone());
        let page = full.page.unwrap_or_default();
        let inches = |value: Option<f32>, default: f32| value.unwrap_or(default) * POINTS_PER_INCH;

        let cell = CellSpec::new(
            inches(full.cell_size_in, DEFAULT_CELL_SIZE_IN),
            inches(full.circle_diameter_in, DEFAULT_CIRCLE_DIAMETER_IN),
            full.grid_hairline_pt.unwrap_or(DEFAULT_GRID_HAIRLINE_PT),
            full.grid_gray.unwrap_or(DEFAULT_GRID_GRAY),
        )?;
        let foreground = Color::resolve(
            full.foreground.as_deref().unwrap_or(DEFAULT_FOREGROUND),
            ColorRole::Foreground,
        )?;
        let background = Color::resolve(
            full.background.as_deref().unwrap_or(DEFAULT_BACKGROUND),
            ColorRole::Background,
        )?;

        Ok(SheetSettings {
            page,
            page_spec: page.spec(),
            cell,
            foreground,
            background,
            annotate: full.annotate.unwrap_or(false),
        })
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Validated, unit-converted settings for one run.
#[derive(Debug, Clone)]
pub struct SheetSettings {
    pub page: PageSize,
    pub page_spec: PageSpec,
    /// Cell dimensions in points.
    pub cell: CellSpec,
    pub foreground: Color,
    pub background: Color,
    pub annotate: bool,
}
