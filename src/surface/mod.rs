//! Drawing back ends for token sheets.
//!
//! The renderer decides *where* each token goes; a [`Surface`] decides how
//! to put it on paper. Two surfaces ship with the crate:
//!
//! - [`PdfSurface`]: the printable output document
//! - [`RasterSurface`]: a PNG-style preview rendered with resvg
//!
//! Surfaces compose: `(A, B)` draws to both, and `Option<S>` draws only when
//! present, so the renderer can feed a PDF and an optional preview in one
//! pass.

pub mod pdf;
pub mod raster;

pub use pdf::PdfSurface;
pub use raster::RasterSurface;

use crate::color::Color;
use crate::error::SheetError;
use crate::icon::PreparedIcon;
use crate::layout::{CellSlot, CellSpec};
use crate::scale::IconPlacement;

// ============================================================================
// Token
// ============================================================================

/// Run-wide drawing style shared by every token.
#[derive(Debug, Clone)]
pub struct TokenStyle {
    pub cell: CellSpec,
    pub background: Color,
    /// Attach a label with the icon's relative path to each cell.
    pub annotate: bool,
}

/// One token to draw: a cell, the icon in it, and how the icon is scaled.
///
/// All coordinates are page points with the origin at the top-left.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub slot: CellSlot,
    pub icon: &'a PreparedIcon,
    pub placement: IconPlacement,
    pub style: &'a TokenStyle,
}

impl Token<'_> {
    /// Center of the token circle.
    pub fn circle_center(&self) -> (f32, f32) {
        let half = self.style.cell.cell_size / 2.0;
        (self.slot.x + half, self.slot.y + half)
    }

    /// Radius of the token circle.
    pub fn circle_radius(&self) -> f32 {
        self.style.cell.circle_diameter / 2.0
    }

    /// Top-left corner of the scaled icon box.
    pub fn icon_origin(&self) -> (f32, f32) {
        let inset = self.style.cell.circle_inset();
        (
            self.slot.x + inset + self.placement.offset_x,
            self.slot.y + inset + self.placement.offset_y,
        )
    }
}

// ============================================================================
// Surface
// ============================================================================

/// A paginated drawing target.
///
/// The renderer calls `begin_page`, then `draw_token` for each cell, then
/// `end_page`, repeating per page, and finally `finish` exactly once.
pub trait Surface {
    /// What the surface produces when finished.
    type Output;

    /// Starts page `number` (1-based).
    fn begin_page(&mut self, number: usize) -> Result<(), SheetError>;

    /// Draws one token on the current page.
    fn draw_token(&mut self, token: &Token<'_>) -> Result<(), SheetError>;

    /// Completes the current page.
    fn end_page(&mut self) -> Result<(), SheetError>;

    /// Completes the document.
    fn finish(self) -> Result<Self::Output, SheetError>;
}

impl<A: Surface, B: Surface> Surface for (A, B) {
    type Output = (A::Output, B::Output);

    fn begin_page(&mut self, number: usize) -> Result<(), SheetError> {
        self.0.begin_page(number)?;
        self.1.begin_page(number)
    }

    fn draw_token(&mut self, token: &Token<'_>) -> Result<(), SheetError> {
        self.0.draw_token(token)?;
        self.1.draw_token(token)
    }

    fn end_page(&mut self) -> Result<(), SheetError> {
        self.0.end_page()?;
        self.1.end_page()
    }

    fn finish(self) -> Result<Self::Output, SheetError> {
        Ok((self.0.finish()?, self.1.finish()?))
    }
}

impl<S: Surface> Surface for Option<S> {
    type Output = Option<S::Output>;

    fn begin_page(&mut self, number: usize) -> Result<(), SheetError> {
        match self {
            Some(surface) => surface.begin_page(number),
            None => Ok(()),
        }
    }

    fn draw_token(&mut self, token: &Token<'_>) -> Result<(), SheetError> {
        match self {
            Some(surface) => surface.draw_token(token),
            None => Ok(()),
        }
    }

    fn end_page(&mut self) -> Result<(), SheetError> {
        match self {
            Some(surface) => surface.end_page(),
            None => Ok(()),
        }
    }

    fn finish(self) -> Result<Self::Output, SheetError> {
        self.map(S::finish).transpose()
    }
}

/// Four cubic Bézier segments approximating a circle, as
/// `(start, [(c1, c2, end); 4])` in the caller's coordinate system.
pub(crate) fn circle_segments(cx: f32, cy: f32, r: f32) -> ((f32, f32), [[(f32, f32); 3]; 4]) {
    const KAPPA: f32 = 0.552_284_8;
    let k = KAPPA * r;
    (
        (cx + r, cy),
        [
            [(cx + r, cy + k), (cx + k, cy + r), (cx, cy + r)],
            [(cx - k, cy + r), (cx - r, cy + k), (cx - r, cy)],
            [(cx - r, cy - k), (cx - k, cy - r), (cx, cy - r)],
            [(cx + k, cy - r), (cx + r, cy - k), (cx + r, cy)],
        ],
    )
}
