//! Foreground recoloring of icon documents.
//!
//! Icons are expected to draw their linework in white. Every fill or stroke
//! that is exactly white is rewritten to the foreground color; any other
//! paint (including near-white shades, `none` and gradients) is left alone.

use crate::color::Color;
use crate::document::{PaintAttributes, SvgDocument};

/// Returns true if a paint value is exactly white.
///
/// Accepts `#fff`, `#ffffff` and `white` in any case, ignoring surrounding
/// whitespace.
pub fn is_white(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("#fff")
        || value.eq_ignore_ascii_case("#ffffff")
        || value.eq_ignore_ascii_case("white")
}

/// Rewrites every white fill and stroke in `doc` to `foreground`.
///
/// Returns the number of values replaced.
pub fn recolor(doc: &mut SvgDocument, foreground: &Color) -> usize {
    let hex = foreground.to_hex();
    doc.rewrite_paints(&mut |_, value| is_white(value).then(|| hex.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PaintProperty;
    use crate::error::ColorRole;

    fn color(token: &str) -> Color {
        Color::resolve(token, ColorRole::Foreground).unwrap()
    }

    #[test]
    fn white_variants() {
        for value in ["#fff", "#FFF", "#ffffff", "#FfFfFf", "white", "WHITE", " white "] {
            assert!(is_white(value), "{value}");
        }
        for value in ["#fffffe", "#eee", "none", "transparent", "url(#g)", "whitesmoke", ""] {
            assert!(!is_white(value), "{value}");
        }
    }

    #[test]
    fn all_white_icon_is_fully_recolored() {
        let mut doc = SvgDocument::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path fill="#fff" d="M0 0h5v5z"/><path style="fill:white;stroke:#FFFFFF" d="M5 5h5v5z"/><circle stroke="White" r="2"/></svg>"##,
        )
        .unwrap();

        let replaced = recolor(&mut doc, &color("lightblue"));
        assert_eq!(replaced, 4);

        let paints = doc.paints();
        assert_eq!(paints.len(), 4);
        assert!(paints.iter().all(|(_, value)| value == "#add8e6"));
        assert!(paints.iter().all(|(_, value)| !is_white(value)));
    }

    #[test]
    fn other_paints_are_preserved() {
        let mut doc = SvgDocument::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg"><path fill="#000"/><path fill="none" stroke="#fff"/><path style="fill:#fefefe;opacity:1"/></svg>"##,
        )
        .unwrap();

        assert_eq!(recolor(&mut doc, &color("f00")), 1);
        assert_eq!(
            doc.paints(),
            vec![
                (PaintProperty::Fill, "#000".to_string()),
                (PaintProperty::Fill, "none".to_string()),
                (PaintProperty::Stroke, "#ff0000".to_string()),
                (PaintProperty::Fill, "#fefefe".to_string()),
            ]
        );
    }

    #[test]
    fn geometry_is_untouched() {
        let source = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 4 4"><path fill="#fff" d="M0 0h4v4z"/></svg>"##;
        let mut doc = SvgDocument::parse(source).unwrap();
        recolor(&mut doc, &color("000"));
        let path = doc.root.child_elements().next().unwrap();
        assert_eq!(path.attribute("d"), Some("M0 0h4v4z"));
        assert_eq!(doc.root.attribute("viewBox"), Some("0 0 4 4"));
    }
}
