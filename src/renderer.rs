//! Streams prepared icons into grid cells across pages.

use std::path::Path;

use crate::error::SheetError;
use crate::icon::PreparedIcon;
use crate::layout::GridPlacement;
use crate::scale::fit_icon;
use crate::surface::{Surface, Token, TokenStyle};

/// Where the renderer is in its page cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// No page is open; the next icon starts one.
    EmptyPage,
    /// A page is open with free cells left.
    DrawingCells,
    /// Every cell on the open page is used.
    PageFull,
    /// The document has been completed.
    Finalized,
}

/// Places icons one at a time, opening a new page whenever the current one
/// is full.
///
/// Icons land in row-major order, in the order [`place`](Self::place) is
/// called. Each page uses the same grid.
pub struct PageRenderer<S: Surface> {
    /// Taken when the sheet is finished.
    surface: Option<S>,
    grid: GridPlacement,
    style: TokenStyle,
    state: RenderState,
    placed: usize,
    pages: usize,
}

impl<S: Surface> PageRenderer<S> {
    pub fn new(surface: S, grid: GridPlacement, style: TokenStyle) -> Self {
        Self {
            surface: Some(surface),
            grid,
            style,
            state: RenderState::EmptyPage,
            placed: 0,
            pages: 0,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Icons placed so far.
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Pages started so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Draws `icon` into the next free cell.
    ///
    /// Fails with [`SheetError::NoOpenPage`] once the sheet is finished.
    pub fn place(&mut self, icon: &PreparedIcon) -> Result<(), SheetError> {
        match self.state {
            RenderState::EmptyPage => self.begin_page()?,
            RenderState::PageFull => {
                self.surface()?.end_page()?;
                self.begin_page()?;
            }
            RenderState::DrawingCells => {}
            RenderState::Finalized => return Err(SheetError::NoOpenPage),
        }

        let slot = self.grid.slot(self.placed);
        let placement = fit_icon(icon.width, icon.height, self.style.cell.circle_diameter);
        log::debug!(
            "placing {} on page {} at row {}, column {} (scale {:.3})",
            icon.file.label(),
            slot.page,
            slot.row,
            slot.column,
            placement.scale
        );
        let token = Token {
            slot,
            icon,
            placement,
            style: &self.style,
        };
        self.surface
            .as_mut()
            .ok_or(SheetError::NoOpenPage)?
            .draw_token(&token)?;

        self.placed += 1;
        self.state = if slot.index + 1 == self.grid.capacity() {
            RenderState::PageFull
        } else {
            RenderState::DrawingCells
        };
        Ok(())
    }

    /// Completes the open page and the document, moving to
    /// [`RenderState::Finalized`].
    ///
    /// Fails with [`SheetError::NoIconsFound`] when nothing was placed, in
    /// which case the surface is dropped without producing output. A second
    /// call fails with [`SheetError::NoOpenPage`].
    pub fn finish(&mut self, input: &Path) -> Result<S::Output, SheetError> {
        let open = matches!(self.state, RenderState::DrawingCells | RenderState::PageFull);
        let mut surface = self.surface.take().ok_or(SheetError::NoOpenPage)?;
        self.state = RenderState::Finalized;
        if self.placed == 0 {
            return Err(SheetError::NoIconsFound {
                path: input.to_owned(),
            });
        }
        if open {
            surface.end_page()?;
        }
        log::info!("finished {} icons on {} pages", self.placed, self.pages);
        surface.finish()
    }

    fn surface(&mut self) -> Result<&mut S, SheetError> {
        self.surface.as_mut().ok_or(SheetError::NoOpenPage)
    }

    fn begin_page(&mut self) -> Result<(), SheetError> {
        self.pages += 1;
        log::info!("starting page {}", self.pages);
        let number = self.pages;
        self.surface()?.begin_page(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::icon::IconFile;
    use crate::layout::{CellSlot, CellSpec, PageSize, POINTS_PER_INCH};

    #[derive(Debug, PartialEq)]
    enum Event {
        Begin(usize),
        Draw(CellSlot, String),
        End,
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl Surface for Recorder {
        type Output = Vec<Event>;

        fn begin_page(&mut self, number: usize) -> Result<(), SheetError> {
            self.events.push(Event::Begin(number));
            Ok(())
        }

        fn draw_token(&mut self, token: &Token<'_>) -> Result<(), SheetError> {
            self.events.push(Event::Draw(token.slot, token.icon.file.label()));
            Ok(())
        }

        fn end_page(&mut self) -> Result<(), SheetError> {
            self.events.push(Event::End);
            Ok(())
        }

        fn finish(self) -> Result<Self::Output, SheetError> {
            Ok(self.events)
        }
    }

    fn icon(name: &str) -> PreparedIcon {
        PreparedIcon {
            file: IconFile::new(name, name),
            svg: String::new(),
            width: 24.0,
            height: 24.0,
            recolored: 0,
        }
    }

    fn renderer() -> PageRenderer<Recorder> {
        let grid = GridPlacement::compute(PageSize::A4.spec(), POINTS_PER_INCH).unwrap();
        let style = TokenStyle {
            cell: CellSpec::new(72.0, 64.8, 0.25, 0.2).unwrap(),
            background: Color::from_rgb8(0, 0, 0),
            annotate: false,
        };
        PageRenderer::new(Recorder::default(), grid, style)
    }

    fn render(count: usize) -> (Vec<Event>, usize) {
        let mut renderer = renderer();
        for i in 0..count {
            renderer.place(&icon(&format!("{i:03}.svg"))).unwrap();
        }
        let pages = renderer.pages();
        (renderer.finish(Path::new("icons")).unwrap(), pages)
    }

    #[test]
    fn three_icons_on_one_a4_page() {
        let (events, pages) = render(3);
        assert_eq!(pages, 1);
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], Event::Begin(1));
        assert_eq!(events[4], Event::End);

        let grid = GridPlacement::compute(PageSize::A4.spec(), POINTS_PER_INCH).unwrap();
        for (i, event) in events[1..4].iter().enumerate() {
            let Event::Draw(slot, label) = event else {
                panic!("expected draw, got {event:?}");
            };
            assert_eq!(label, &format!("{i:03}.svg"));
            assert_eq!((slot.row, slot.column), (0, i));
            assert!((slot.x - (grid.origin_x + 72.0 * i as f32)).abs() < 1e-3);
            assert!((slot.y - grid.origin_y).abs() < 1e-3);
        }
    }

    #[test]
    fn cells_equal_icons_and_pages_round_up() {
        for (count, expected_pages) in [(1, 1), (88, 1), (89, 2), (176, 2), (177, 3)] {
            let (events, pages) = render(count);
            let draws = events.iter().filter(|e| matches!(e, Event::Draw(..))).count();
            let begins = events.iter().filter(|e| matches!(e, Event::Begin(_))).count();
            let ends = events.iter().filter(|e| matches!(e, Event::End)).count();
            assert_eq!(draws, count);
            assert_eq!(pages, expected_pages);
            assert_eq!(begins, expected_pages);
            assert_eq!(ends, expected_pages);
        }
    }

    #[test]
    fn new_page_starts_at_first_cell() {
        let (events, _) = render(89);
        assert_eq!(events[89], Event::End);
        assert_eq!(events[90], Event::Begin(2));
        let Event::Draw(slot, _) = &events[91] else {
            panic!("expected draw");
        };
        assert_eq!((slot.page, slot.index, slot.row, slot.column), (2, 0, 0, 0));
    }

    #[test]
    fn state_follows_page_cycle() {
        let mut renderer = renderer();
        assert_eq!(renderer.state(), RenderState::EmptyPage);
        renderer.place(&icon("a.svg")).unwrap();
        assert_eq!(renderer.state(), RenderState::DrawingCells);
        for _ in 1..88 {
            renderer.place(&icon("a.svg")).unwrap();
        }
        assert_eq!(renderer.state(), RenderState::PageFull);
        assert_eq!(renderer.pages(), 1);
        renderer.place(&icon("a.svg")).unwrap();
        assert_eq!(renderer.state(), RenderState::DrawingCells);
        assert_eq!(renderer.pages(), 2);
    }

    #[test]
    fn finishing_empty_sheet_is_no_icons_found() {
        let mut renderer = renderer();
        let err = renderer.finish(Path::new("icons")).unwrap_err();
        assert!(matches!(err, SheetError::NoIconsFound { .. }));
        assert_eq!(renderer.state(), RenderState::Finalized);
    }

    #[test]
    fn finished_renderer_rejects_more_work() {
        let mut renderer = renderer();
        renderer.place(&icon("a.svg")).unwrap();
        let events = renderer.finish(Path::new("icons")).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(renderer.state(), RenderState::Finalized);

        assert!(matches!(
            renderer.place(&icon("b.svg")),
            Err(SheetError::NoOpenPage)
        ));
        assert!(matches!(
            renderer.finish(Path::new("icons")),
            Err(SheetError::NoOpenPage)
        ));
        assert_eq!(renderer.placed(), 1);
    }
}
