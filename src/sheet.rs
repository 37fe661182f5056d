//! One end-to-end run: discover, prepare, render, write.

use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::discovery::discover_icons;
use crate::error::SheetError;
use crate::layout::GridPlacement;
use crate::profile::SheetSettings;
use crate::renderer::PageRenderer;
use crate::surface::{PdfSurface, RasterSurface, TokenStyle};

/// Default preview resolution.
pub const DEFAULT_PREVIEW_DPI: f32 = 96.0;

/// Where and how to rasterize the first page.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub path: PathBuf,
    pub dpi: f32,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSummary {
    pub discovered: usize,
    pub placed: usize,
    pub skipped: usize,
    pub pages: usize,
    pub columns: usize,
    pub rows: usize,
    pub output: PathBuf,
    pub preview: Option<PathBuf>,
}

impl fmt::Display for SheetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "placed {} icons on {} page(s) ({}x{} grid) -> {}",
            self.placed,
            self.pages,
            self.columns,
            self.rows,
            self.output.display()
        )?;
        if self.skipped > 0 {
            write!(f, ", skipped {}", self.skipped)?;
        }
        if let Some(preview) = &self.preview {
            write!(f, ", preview {}", preview.display())?;
        }
        Ok(())
    }
}

/// Builds a token sheet from every icon under `input` and writes it to
/// `output`.
///
/// Icons that cannot be read or parsed are skipped with a warning. Nothing
/// is written unless at least one icon was placed, and a failed preview
/// write removes the PDF again.
pub fn build_sheet(
    input: &Path,
    output: &Path,
    settings: &SheetSettings,
    preview: Option<&PreviewOptions>,
) -> Result<SheetSummary, SheetError> {
    let grid = GridPlacement::compute(settings.page_spec, settings.cell.cell_size)?;
    let icons = discover_icons(input)?;
    if icons.is_empty() {
        return Err(SheetError::NoIconsFound {
            path: input.to_owned(),
        });
    }

    log::info!(
        "{} icons, {}x{} grid ({} per page) on {}",
        icons.len(),
        grid.columns,
        grid.rows,
        grid.capacity(),
        settings.page
    );

    let raster = preview
        .map(|options| RasterSurface::new(settings.page_spec, options.dpi, 1))
        .transpose()?;
    let style = TokenStyle {
        cell: settings.cell,
        background: settings.background.clone(),
        annotate: settings.annotate,
    };
    let mut renderer = PageRenderer::new((PdfSurface::new(settings.page_spec), raster), grid, style);

    let mut skipped = 0;
    for icon in &icons {
        let prepared = match icon.prepare(&settings.foreground) {
            Ok(prepared) => prepared,
            Err(e) if e.is_recoverable() => {
                log::warn!("skipping icon: {e}");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        log::debug!(
            "{}: {}x{}, {} paints recolored",
            icon.label(),
            prepared.width,
            prepared.height,
            prepared.recolored
        );
        renderer.place(&prepared)?;
    }

    let placed = renderer.placed();
    let pages = renderer.pages();
    let (pdf, previews) = renderer.finish(input)?;

    let png = match (preview, previews) {
        (Some(options), Some(images)) => encode_preview(&options.path, &images)?
            .map(|bytes| (options.path.clone(), bytes)),
        _ => None,
    };

    write_output(output, &pdf)?;
    if let Some((path, bytes)) = &png {
        if let Err(e) = write_output(path, bytes) {
            if let Err(cleanup) = fs::remove_file(output) {
                log::warn!("could not remove {}: {cleanup}", output.display());
            }
            return Err(e);
        }
    }
    let preview = png.map(|(path, _)| path);

    let summary = SheetSummary {
        discovered: icons.len(),
        placed,
        skipped,
        pages,
        columns: grid.columns,
        rows: grid.rows,
        output: output.to_owned(),
        preview,
    };
    log::info!("{summary}");
    Ok(summary)
}

fn create_parent(path: &Path) -> Result<(), SheetError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| SheetError::Io {
                path: parent.to_owned(),
                source: e,
            })
        }
        _ => Ok(()),
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), SheetError> {
    create_parent(path)?;
    fs::write(path, bytes).map_err(|e| SheetError::Io {
        path: path.to_owned(),
        source: e,
    })
}

/// Encodes the first rendered page as PNG.
fn encode_preview(path: &Path, pages: &[image::RgbaImage]) -> Result<Option<Vec<u8>>, SheetError> {
    let Some(first) = pages.first() else {
        return Ok(None);
    };
    let mut bytes = Vec::new();
    first
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| SheetError::Preview {
            path: path.to_owned(),
            source: e,
        })?;
    Ok(Some(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_mentions_skips_and_preview() {
        let mut summary = SheetSummary {
            discovered: 4,
            placed: 3,
            skipped: 0,
            pages: 1,
            columns: 8,
            rows: 11,
            output: PathBuf::from("out/sheet.pdf"),
            preview: None,
        };
        assert_eq!(
            summary.to_string(),
            "placed 3 icons on 1 page(s) (8x11 grid) -> out/sheet.pdf"
        );

        summary.skipped = 1;
        summary.preview = Some(PathBuf::from("out/sheet.png"));
        let line = summary.to_string();
        assert!(line.ends_with(", skipped 1, preview out/sheet.png"));
    }

    #[test]
    fn parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deeper/out.pdf");
        write_output(&target, b"%PDF-").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"%PDF-");
    }

    #[test]
    fn preview_encodes_first_page_only() {
        let pages = vec![image::RgbaImage::new(3, 2), image::RgbaImage::new(5, 5)];
        let bytes = encode_preview(Path::new("p.png"), &pages).unwrap().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        assert!(encode_preview(Path::new("p.png"), &[]).unwrap().is_none());
    }
}
