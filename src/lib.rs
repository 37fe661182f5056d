//! icon-tokens: lay out vector icons as circular tokens on a printable grid
//!
//! The crate scans a directory for `.svg` icons, recolors their white paint,
//! and draws each one inside a filled circle on a grid of cut-guide cells.
//! Output is a PDF, with an optional raster preview of the first page.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use icon_tokens::{build_sheet, SheetProfile};
//!
//! let settings = SheetProfile {
//!     foreground: Some("gold".into()),
//!     background: Some("#202040".into()),
//!     ..SheetProfile::default()
//! }
//! .resolve()?;
//!
//! let summary = build_sheet(Path::new("icons"), Path::new("out/tokens.pdf"), &settings, None)?;
//! println!("{summary}");
//! # Ok::<(), icon_tokens::SheetError>(())
//! ```
//!
//! # Pipeline
//!
//! - [`discover_icons`] walks the input tree in a stable order
//! - [`IconFile::prepare`] parses an icon into an [`SvgDocument`], applies
//!   [`recolor`] and measures it
//! - [`GridPlacement`] fixes the cell grid once per run
//! - [`PageRenderer`] streams icons into cells, paging as needed, and drives
//!   a [`Surface`]

pub mod color;
pub mod discovery;
pub mod document;
pub mod error;
pub mod icon;
pub mod layout;
pub mod profile;
pub mod recolor;
pub mod renderer;
pub mod scale;
pub mod sheet;
pub mod surface;

#[cfg(feature = "cli")]
pub mod cli;

pub use color::Color;
pub use discovery::discover_icons;
pub use document::{PaintAttributes, PaintProperty, SvgDocument, SvgElement, SvgNode};
pub use error::{ColorRole, SheetError};
pub use icon::{IconFile, PreparedIcon};
pub use layout::{CellSlot, CellSpec, GridPlacement, PageSize, PageSpec};
pub use profile::{SheetProfile, SheetSettings};
pub use recolor::recolor;
pub use renderer::{PageRenderer, RenderState};
pub use scale::{fit_icon, IconPlacement};
pub use sheet::{build_sheet, PreviewOptions, SheetSummary};
pub use surface::{PdfSurface, RasterSurface, Surface, Token, TokenStyle};
