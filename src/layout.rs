//! Page geometry and grid placement.
//!
//! All lengths are in PDF points (1/72 inch). Page coordinates have their
//! origin at the top-left corner with y growing downwards; surfaces that use
//! a different convention convert when drawing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SheetError;

/// Points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Smallest accepted cell side, in points.
pub const MIN_CELL_SIZE_PT: f32 = 1.0;

const A4_WIDTH_PT: f32 = 595.2756;
const A4_HEIGHT_PT: f32 = 841.8898;

// ============================================================================
// Page
// ============================================================================

/// Named page sizes accepted by `--page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    #[serde(rename = "A4landscape")]
    A4Landscape,
}

impl PageSize {
    /// Every accepted page size.
    pub const ALL: [PageSize; 2] = [PageSize::A4, PageSize::A4Landscape];

    /// The name used on the command line and in profiles.
    pub fn name(&self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::A4Landscape => "A4landscape",
        }
    }

    /// Page dimensions in points.
    pub fn spec(&self) -> PageSpec {
        match self {
            Self::A4 => PageSpec::new(A4_WIDTH_PT, A4_HEIGHT_PT),
            Self::A4Landscape => PageSpec::new(A4_HEIGHT_PT, A4_WIDTH_PT),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageSize {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.name() == s)
            .ok_or_else(|| {
                SheetError::invalid_argument(
                    "--page",
                    format!("unknown page size '{s}', expected A4 or A4landscape"),
                )
            })
    }
}

/// Page width and height in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width: f32,
    pub height: f32,
}

impl PageSpec {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

// ============================================================================
// Cell
// ============================================================================

/// Per-cell drawing dimensions, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSpec {
    /// Cell side length in points.
    pub cell_size: f32,
    /// Token circle diameter in points.
    pub circle_diameter: f32,
    /// Cut-guide stroke width in points.
    pub hairline_width: f32,
    /// Cut-guide gray level, 0 is black and 1 is white.
    pub grid_gray: f32,
}

impl CellSpec {
    /// Validates and creates a cell spec.
    ///
    /// A circle wider than its cell is accepted with a warning; it overlaps
    /// neighbouring cells.
    pub fn new(
        cell_size: f32,
        circle_diameter: f32,
        hairline_width: f32,
        grid_gray: f32,
    ) -> Result<Self, SheetError> {
        check_cell_size(cell_size)?;
        positive_inches("--circle-diameter-in", circle_diameter)?;
        if !hairline_width.is_finite() || hairline_width < 0.0 {
            return Err(SheetError::invalid_argument(
                "--grid-hairline-pt",
                format!("{hairline_width} must be zero or greater"),
            ));
        }
        if !(0.0..=1.0).contains(&grid_gray) {
            return Err(SheetError::invalid_argument(
                "--grid-gray",
                format!("{grid_gray} must be between 0 and 1"),
            ));
        }
        if circle_diameter > cell_size {
            log::warn!(
                "circle diameter {circle_diameter}pt exceeds cell size {cell_size}pt; tokens will overlap"
            );
        }
        Ok(Self {
            cell_size,
            circle_diameter,
            hairline_width,
            grid_gray,
        })
    }

    /// Distance from a cell edge to the circle's bounding square.
    pub fn circle_inset(&self) -> f32 {
        (self.cell_size - self.circle_diameter) / 2.0
    }
}

/// Checks a length given in points and reports it in inches, the unit of
/// the `*-in` options.
fn positive_inches(name: &'static str, points: f32) -> Result<(), SheetError> {
    if points.is_finite() && points > 0.0 {
        Ok(())
    } else {
        Err(SheetError::invalid_argument(
            name,
            format!("{} must be greater than zero", points / POINTS_PER_INCH),
        ))
    }
}

fn check_cell_size(points: f32) -> Result<(), SheetError> {
    positive_inches("--cell-size-in", points)?;
    if points < MIN_CELL_SIZE_PT {
        return Err(SheetError::invalid_argument(
            "--cell-size-in",
            format!(
                "{} is below the minimum of {} ({MIN_CELL_SIZE_PT}pt)",
                points / POINTS_PER_INCH,
                MIN_CELL_SIZE_PT / POINTS_PER_INCH
            ),
        ));
    }
    Ok(())
}

// ============================================================================
// Grid
// ============================================================================

/// A grid of equal square cells centered on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPlacement {
    pub columns: usize,
    pub rows: usize,
    pub origin_x: f32,
    pub origin_y: f32,
    pub cell_size: f32,
}

/// The position of one icon on the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSlot {
    /// 1-based page number.
    pub page: usize,
    /// Index of the cell on its page, row-major.
    pub index: usize,
    pub row: usize,
    pub column: usize,
    /// Left edge of the cell.
    pub x: f32,
    /// Top edge of the cell.
    pub y: f32,
}

impl GridPlacement {
    /// Computes how many cells of `cell_size` fit on `page` and where the
    /// grid starts so that the leftover space is split evenly.
    pub fn compute(page: PageSpec, cell_size: f32) -> Result<Self, SheetError> {
        check_cell_size(cell_size)?;
        let columns = (page.width / cell_size).floor() as usize;
        let rows = (page.height / cell_size).floor() as usize;
        if columns == 0 || rows == 0 {
            return Err(SheetError::PageTooSmall {
                cell_size,
                page_width: page.width,
                page_height: page.height,
            });
        }
        if columns.checked_mul(rows).is_none() {
            return Err(SheetError::invalid_argument(
                "--cell-size-in",
                format!("{columns}x{rows} cells per page is too many"),
            ));
        }

        Ok(Self {
            columns,
            rows,
            origin_x: (page.width - columns as f32 * cell_size) / 2.0,
            origin_y: (page.height - rows as f32 * cell_size) / 2.0,
            cell_size,
        })
    }

    /// Cells per page.
    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }

    /// Pages needed for `count` icons.
    pub fn page_count(&self, count: usize) -> usize {
        count.div_ceil(self.capacity())
    }

    /// The cell that the `index`-th icon (0-based, across pages) occupies.
    pub fn slot(&self, index: usize) -> CellSlot {
        let capacity = self.capacity();
        let on_page = index % capacity;
        let row = on_page / self.columns;
        let column = on_page % self.columns;
        CellSlot {
            page: index / capacity + 1,
            index: on_page,
            row,
            column,
            x: self.origin_x + column as f32 * self.cell_size,
            y: self.origin_y + row as f32 * self.cell_size,
        }
    }
}
