//! Raster previews rendered with resvg/tiny-skia.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{
    self, FillRule, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};
use resvg::usvg::{Options, Tree};

use super::{Surface, Token};
use crate::error::SheetError;
use crate::layout::{PageSpec, POINTS_PER_INCH};

/// Renders pages to RGBA images at a fixed resolution.
///
/// Pages past `max_pages` are laid out but not drawn, which keeps a
/// first-page preview cheap on large icon sets.
pub struct RasterSurface {
    page: PageSpec,
    /// Pixels per point.
    scale: f32,
    max_pages: usize,
    pages: Vec<RgbaImage>,
    current: Option<Pixmap>,
}

impl RasterSurface {
    /// Creates a surface rendering at `dpi`, keeping at most `max_pages`.
    pub fn new(page: PageSpec, dpi: f32, max_pages: usize) -> Result<Self, SheetError> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(SheetError::invalid_argument(
                "--preview-dpi",
                format!("{dpi} must be greater than zero"),
            ));
        }
        Ok(Self {
            page,
            scale: dpi / POINTS_PER_INCH,
            max_pages,
            pages: Vec::new(),
            current: None,
        })
    }

    /// Pixel dimensions of a rendered page.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.page.width * self.scale).round() as u32,
            (self.page.height * self.scale).round() as u32,
        )
    }

    fn draw(&self, pixmap: &mut Pixmap, token: &Token<'_>) -> Result<(), SheetError> {
        let k = self.scale;
        let to_pixels = Transform::from_scale(k, k);
        let cell = &token.style.cell;
        let (cx, cy) = token.circle_center();
        let r = token.circle_radius();

        let circle = PathBuilder::from_circle(cx, cy, r)
            .ok_or_else(|| SheetError::Raster(format!("invalid circle radius {r}")))?;
        let (red, green, blue) = token.style.background.rgb8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(red, green, blue, 255);
        paint.anti_alias = true;
        pixmap.fill_path(&circle, &paint, FillRule::Winding, to_pixels, None);

        let clipped = self.render_clipped_icon(token)?;
        let (left, top) = circle_box_origin(token, k);
        pixmap.draw_pixmap(
            left,
            top,
            clipped.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        let size = cell.cell_size;
        let outline = tiny_skia::Rect::from_xywh(token.slot.x, token.slot.y, size, size)
            .map(PathBuilder::from_rect)
            .ok_or_else(|| SheetError::Raster(format!("invalid cell size {size}")))?;
        let gray = (cell.grid_gray * 255.0).round() as u8;
        let mut guide = Paint::default();
        guide.set_color_rgba8(gray, gray, gray, 255);
        let stroke = Stroke {
            width: cell.hairline_width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&outline, &guide, &stroke, to_pixels, None);
        Ok(())
    }

    /// Renders the icon into a pixmap covering the circle's bounding box,
    /// masked to the circle.
    fn render_clipped_icon(&self, token: &Token<'_>) -> Result<Pixmap, SheetError> {
        let k = self.scale;
        let (left, top) = circle_box_origin(token, k);
        let side = (token.style.cell.circle_diameter * k).ceil() as u32 + 2;
        let mut pixmap = Pixmap::new(side, side)
            .ok_or_else(|| SheetError::Raster(format!("cannot allocate {side}x{side} pixmap")))?;

        let tree = Tree::from_str(&token.icon.svg, &Options::default())
            .map_err(|e| SheetError::Raster(format!("{}: {e}", token.icon.path().display())))?;
        let (icon_x, icon_y) = token.icon_origin();
        let s = token.placement.scale * k;
        let transform = Transform::from_row(
            s,
            0.0,
            0.0,
            s,
            icon_x * k - left as f32,
            icon_y * k - top as f32,
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let (cx, cy) = token.circle_center();
        let circle = PathBuilder::from_circle(
            cx * k - left as f32,
            cy * k - top as f32,
            token.circle_radius() * k,
        )
        .ok_or_else(|| SheetError::Raster("invalid clip circle".into()))?;
        let mut mask = Mask::new(side, side)
            .ok_or_else(|| SheetError::Raster(format!("cannot allocate {side}x{side} mask")))?;
        mask.fill_path(&circle, FillRule::Winding, true, Transform::identity());
        pixmap.apply_mask(&mask);
        Ok(pixmap)
    }
}

/// Top-left pixel of the circle's bounding box, rounded down.
fn circle_box_origin(token: &Token<'_>, k: f32) -> (i32, i32) {
    let inset = token.style.cell.circle_inset();
    (
        ((token.slot.x + inset) * k).floor() as i32,
        ((token.slot.y + inset) * k).floor() as i32,
    )
}

impl Surface for RasterSurface {
    type Output = Vec<RgbaImage>;

    fn begin_page(&mut self, number: usize) -> Result<(), SheetError> {
        if number > self.max_pages {
            self.current = None;
            return Ok(());
        }
        let (width, height) = self.pixel_size();
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            SheetError::Raster(format!("cannot allocate {width}x{height} page"))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        self.current = Some(pixmap);
        Ok(())
    }

    fn draw_token(&mut self, token: &Token<'_>) -> Result<(), SheetError> {
        let Some(mut pixmap) = self.current.take() else {
            return Ok(());
        };
        let result = self.draw(&mut pixmap, token);
        self.current = Some(pixmap);
        result
    }

    fn end_page(&mut self) -> Result<(), SheetError> {
        if let Some(pixmap) = self.current.take() {
            self.pages.push(pixmap_to_rgba_image(&pixmap));
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Self::Output, SheetError> {
        self.end_page()?;
        Ok(self.pages)
    }
}

/// Converts a premultiplied tiny-skia pixmap to a straight-alpha image.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let pixels = pixmap.pixels();
    RgbaImage::from_fn(width, pixmap.height(), |x, y| {
        let color = pixels[(y * width + x) as usize].demultiply();
        Rgba([color.red(), color.green(), color.blue(), color.alpha()])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::icon::{IconFile, PreparedIcon};
    use crate::layout::{CellSlot, CellSpec, PageSize};
    use crate::scale::fit_icon;
    use crate::surface::TokenStyle;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path fill="#0000ff" d="M0 0h10v10H0z"/></svg>"##;

    fn render(max_pages: usize) -> Vec<RgbaImage> {
        let icon = PreparedIcon {
            file: IconFile::new("square.svg", "square.svg"),
            svg: SQUARE.to_string(),
            width: 10.0,
            height: 10.0,
            recolored: 0,
        };
        let style = TokenStyle {
            cell: CellSpec::new(72.0, 64.8, 1.0, 0.0).unwrap(),
            background: Color::from_rgb8(255, 0, 0),
            annotate: false,
        };
        let token = Token {
            slot: CellSlot {
                page: 1,
                index: 0,
                row: 0,
                column: 0,
                x: 0.0,
                y: 0.0,
            },
            icon: &icon,
            placement: fit_icon(10.0, 10.0, 64.8),
            style: &style,
        };

        let mut surface = RasterSurface::new(PageSize::A4.spec(), 72.0, max_pages).unwrap();
        for page in 1..=2 {
            surface.begin_page(page).unwrap();
            surface.draw_token(&token).unwrap();
            surface.end_page().unwrap();
        }
        surface.finish().unwrap()
    }

    #[test]
    fn draws_background_icon_and_outside() {
        let pages = render(1);
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.dimensions(), (595, 842));

        // Icon covers the inscribed square around the center.
        assert_eq!(page.get_pixel(36, 36).0, [0, 0, 255, 255]);
        // Inside the circle but outside the inscribed square.
        assert_eq!(page.get_pixel(36, 8).0, [255, 0, 0, 255]);
        // Near the cell corner, outside the circle.
        assert_eq!(page.get_pixel(5, 5).0, [255, 255, 255, 255]);
        // Far from any token.
        assert_eq!(page.get_pixel(300, 400).0, [255, 255, 255, 255]);
    }

    #[test]
    fn pages_past_limit_are_not_rendered() {
        assert_eq!(render(1).len(), 1);
        assert_eq!(render(2).len(), 2);
        assert_eq!(render(0).len(), 0);
    }

    #[test]
    fn rejects_non_positive_dpi() {
        assert!(RasterSurface::new(PageSize::A4.spec(), 0.0, 1).is_err());
        assert!(RasterSurface::new(PageSize::A4.spec(), f32::NAN, 1).is_err());
    }
}
