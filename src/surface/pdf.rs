//! PDF output via pdf-writer, with icons embedded by svg2pdf.
//!
//! Each icon becomes a Form XObject. svg2pdf normalizes XObjects to the unit
//! square, so placing one is a single `cm` with the scaled width and height.
//! PDF user space has its origin at the bottom-left; y values from the
//! layout are flipped against the page height here.

use std::collections::HashMap;

use pdf_writer::types::{AnnotationFlags, AnnotationType};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, TextStr};
use svg2pdf::usvg;

use super::{circle_segments, Surface, Token};
use crate::error::SheetError;
use crate::layout::PageSpec;

struct OpenPage {
    content: Content,
    x_objects: Vec<(String, Ref)>,
    annotations: Vec<Ref>,
}

/// Builds a PDF document in memory.
pub struct PdfSurface {
    page: PageSpec,
    pdf: Pdf,
    alloc: Ref,
    catalog_id: Ref,
    page_tree_id: Ref,
    page_ids: Vec<Ref>,
    current: Option<OpenPage>,
}

impl PdfSurface {
    /// Creates an empty document whose pages are all `page` sized.
    pub fn new(page: PageSpec) -> Self {
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let page_tree_id = alloc.bump();
        Self {
            page,
            pdf: Pdf::new(),
            alloc,
            catalog_id,
            page_tree_id,
            page_ids: Vec::new(),
            current: None,
        }
    }

    /// Converts an icon to a Form XObject and copies it into the document.
    fn embed_icon(&mut self, token: &Token<'_>) -> Result<Ref, SheetError> {
        let pdf_error = |reason: String| SheetError::Pdf {
            path: token.icon.path().to_owned(),
            reason,
        };

        let tree = usvg::Tree::from_str(&token.icon.svg, &usvg::Options::default())
            .map_err(|e| pdf_error(e.to_string()))?;
        let (chunk, svg_ref) = svg2pdf::to_chunk(&tree, svg2pdf::ConversionOptions::default())
            .map_err(|e| pdf_error(format!("{e:?}")))?;

        let alloc = &mut self.alloc;
        let mut renumbered = HashMap::new();
        let chunk = chunk.renumber(|old| *renumbered.entry(old).or_insert_with(|| alloc.bump()));
        let id = renumbered
            .get(&svg_ref)
            .copied()
            .ok_or_else(|| pdf_error("converted icon has no XObject".into()))?;

        self.pdf.extend(&chunk);
        Ok(id)
    }

    /// Writes a locked, non-printing square annotation carrying the label.
    fn write_label(&mut self, token: &Token<'_>) -> Ref {
        let id = self.alloc.bump();
        let size = token.style.cell.cell_size;
        let bottom = self.page.height - token.slot.y - size;
        let label = token.icon.file.label();

        let mut annotation = self.pdf.annotation(id);
        annotation.subtype(AnnotationType::Square);
        annotation.rect(Rect::new(
            token.slot.x,
            bottom,
            token.slot.x + size,
            bottom + size,
        ));
        annotation.contents(TextStr(&label));
        annotation.flags(AnnotationFlags::READ_ONLY | AnnotationFlags::LOCKED);
        annotation.border_style().width(0.0);
        annotation.finish();
        id
    }
}

impl Surface for PdfSurface {
    type Output = Vec<u8>;

    fn begin_page(&mut self, number: usize) -> Result<(), SheetError> {
        log::debug!("pdf: starting page {number}");
        self.current = Some(OpenPage {
            content: Content::new(),
            x_objects: Vec::new(),
            annotations: Vec::new(),
        });
        Ok(())
    }

    fn draw_token(&mut self, token: &Token<'_>) -> Result<(), SheetError> {
        if self.current.is_none() {
            return Err(SheetError::NoOpenPage);
        }

        let icon_id = self.embed_icon(token)?;
        let label_id = token.style.annotate.then(|| self.write_label(token));

        let height = self.page.height;
        let cell = &token.style.cell;
        let (cx, cy) = token.circle_center();
        let cy = height - cy;
        let r = token.circle_radius();
        let (icon_x, icon_top) = token.icon_origin();
        let icon_bottom = height - icon_top - token.placement.height;
        let (red, green, blue) = token.style.background.to_rgb_f32();

        let Some(page) = self.current.as_mut() else {
            return Err(SheetError::NoOpenPage);
        };
        let name = format!("Ic{}", page.x_objects.len() + 1);
        let content = &mut page.content;

        content.save_state();
        content.set_fill_rgb(red, green, blue);
        circle_path(content, cx, cy, r);
        content.fill_nonzero();
        content.restore_state();

        content.save_state();
        circle_path(content, cx, cy, r);
        content.clip_nonzero();
        content.end_path();
        content.save_state();
        content.transform([
            token.placement.width,
            0.0,
            0.0,
            token.placement.height,
            icon_x,
            icon_bottom,
        ]);
        content.x_object(Name(name.as_bytes()));
        content.restore_state();
        content.restore_state();

        content.save_state();
        content.set_line_width(cell.hairline_width);
        content.set_stroke_gray(cell.grid_gray);
        content.rect(
            token.slot.x,
            height - token.slot.y - cell.cell_size,
            cell.cell_size,
            cell.cell_size,
        );
        content.stroke();
        content.restore_state();

        page.x_objects.push((name, icon_id));
        page.annotations.extend(label_id);
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), SheetError> {
        let page = self.current.take().ok_or(SheetError::NoOpenPage)?;
        let page_id = self.alloc.bump();
        let content_id = self.alloc.bump();

        let mut writer = self.pdf.page(page_id);
        writer.media_box(Rect::new(0.0, 0.0, self.page.width, self.page.height));
        writer.parent(self.page_tree_id);
        writer.contents(content_id);
        {
            let mut resources = writer.resources();
            let mut x_objects = resources.x_objects();
            for (name, id) in &page.x_objects {
                x_objects.pair(Name(name.as_bytes()), *id);
            }
        }
        if !page.annotations.is_empty() {
            writer.annotations(page.annotations.iter().copied());
        }
        writer.finish();

        self.pdf.stream(content_id, &page.content.finish());
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finish(mut self) -> Result<Self::Output, SheetError> {
        if self.current.is_some() {
            self.end_page()?;
        }

        let info_id = self.alloc.bump();
        self.pdf.document_info(info_id).producer(TextStr("icon-tokens"));
        self.pdf.catalog(self.catalog_id).pages(self.page_tree_id);
        self.pdf
            .pages(self.page_tree_id)
            .kids(self.page_ids.iter().copied())
            .count(self.page_ids.len() as i32);

        log::debug!("pdf: wrote {} pages", self.page_ids.len());
        Ok(self.pdf.finish())
    }
}

fn circle_path(content: &mut Content, cx: f32, cy: f32, r: f32) {
    let ((x, y), segments) = circle_segments(cx, cy, r);
    content.move_to(x, y);
    for [(x1, y1), (x2, y2), (x3, y3)] in segments {
        content.cubic_to(x1, y1, x2, y2, x3, y3);
    }
    content.close_path();
}
