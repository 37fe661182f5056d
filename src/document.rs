//! Typed SVG document model.
//!
//! Icons are parsed into a small owned tree of [`SvgNode`]s so that paint
//! attributes can be inspected and rewritten before the markup is handed to
//! usvg. Only elements and text survive parsing; comments and processing
//! instructions are dropped.

use std::fmt::Write as _;

use thiserror::Error;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

// ============================================================================
// Errors
// ============================================================================

/// Errors produced while parsing icon markup.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),
}

// ============================================================================
// Tree
// ============================================================================

/// One `name="value"` pair on an element, kept in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgNode {
    Element(SvgElement),
    Text(String),
}

/// An element: qualified name, ordered attributes, ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SvgElement {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<SvgNode>,
}

impl SvgElement {
    /// Creates an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Iterates over child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &SvgElement> {
        self.children.iter().filter_map(|child| match child {
            SvgNode::Element(element) => Some(element),
            SvgNode::Text(_) => None,
        })
    }

    /// Serializes this element and its subtree.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", attr.name, escape(&attr.value, true));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                SvgNode::Element(element) => element.write_to(out),
                SvgNode::Text(text) => out.push_str(&escape(text, false)),
            }
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

/// A parsed SVG icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgDocument {
    pub root: SvgElement,
}

impl SvgDocument {
    /// Parses SVG markup. The root element must be `<svg>`.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(DocumentError::NotSvg(root.tag_name().name().to_string()));
        }
        Ok(Self {
            root: convert_element(root),
        })
    }

    /// Serializes the document back to markup.
    pub fn to_svg_string(&self) -> String {
        self.root.to_svg_string()
    }
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> SvgElement {
    let tag = node.tag_name();
    let mut element = SvgElement::new(qualified_name(node, tag.namespace(), tag.name()));

    let mut declarations: Vec<Attribute> = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml") && !inherited(node, ns))
        .map(|ns| Attribute {
            name: match ns.name() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            },
            value: ns.uri().to_string(),
        })
        .collect();
    declarations.sort_by(|a, b| a.name.cmp(&b.name));
    element.attributes.extend(declarations);

    for attr in node.attributes() {
        element.attributes.push(Attribute {
            name: qualified_name(node, attr.namespace(), attr.name()),
            value: attr.value().to_string(),
        });
    }

    for child in node.children() {
        if child.is_element() {
            element.children.push(SvgNode::Element(convert_element(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                element.children.push(SvgNode::Text(text.to_string()));
            }
        }
    }

    element
}

/// True when the parent element already has `ns` in scope.
fn inherited(node: roxmltree::Node<'_, '_>, ns: &roxmltree::Namespace<'_>) -> bool {
    node.parent_element().is_some_and(|parent| {
        parent
            .namespaces()
            .any(|p| p.name() == ns.name() && p.uri() == ns.uri())
    })
}

fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(XML_NAMESPACE) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn escape(value: &str, in_attribute: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

// ============================================================================
// Paint Attributes
// ============================================================================

/// The paint properties an icon can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintProperty {
    Fill,
    Stroke,
}

impl PaintProperty {
    fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("fill") {
            Some(Self::Fill)
        } else if name.eq_ignore_ascii_case("stroke") {
            Some(Self::Stroke)
        } else {
            None
        }
    }
}

/// Access to the paint values of a tree, both presentation attributes
/// (`fill="..."`) and declarations inside `style="..."`.
pub trait PaintAttributes {
    /// Visits every paint value in document order. When `visit` returns
    /// `Some`, the value is replaced. Returns the number of replacements.
    fn rewrite_paints<F>(&mut self, visit: &mut F) -> usize
    where
        F: FnMut(PaintProperty, &str) -> Option<String>;

    /// Collects every paint value in document order.
    fn paints(&self) -> Vec<(PaintProperty, String)>;
}

impl PaintAttributes for SvgElement {
    fn rewrite_paints<F>(&mut self, visit: &mut F) -> usize
    where
        F: FnMut(PaintProperty, &str) -> Option<String>,
    {
        let mut rewritten = 0;

        for attr in &mut self.attributes {
            if let Some(property) = PaintProperty::from_name(&attr.name) {
                if let Some(value) = visit(property, &attr.value) {
                    attr.value = value;
                    rewritten += 1;
                }
            } else if attr.name == "style" {
                let (style, count) = rewrite_style(&attr.value, visit);
                if count > 0 {
                    attr.value = style;
                    rewritten += count;
                }
            }
        }

        for child in &mut self.children {
            if let SvgNode::Element(element) = child {
                rewritten += element.rewrite_paints(visit);
            }
        }

        rewritten
    }

    fn paints(&self) -> Vec<(PaintProperty, String)> {
        let mut found = Vec::new();
        collect_paints(self, &mut found);
        found
    }
}

impl PaintAttributes for SvgDocument {
    fn rewrite_paints<F>(&mut self, visit: &mut F) -> usize
    where
        F: FnMut(PaintProperty, &str) -> Option<String>,
    {
        self.root.rewrite_paints(visit)
    }

    fn paints(&self) -> Vec<(PaintProperty, String)> {
        self.root.paints()
    }
}

fn collect_paints(element: &SvgElement, found: &mut Vec<(PaintProperty, String)>) {
    for attr in &element.attributes {
        if let Some(property) = PaintProperty::from_name(&attr.name) {
            found.push((property, attr.value.clone()));
        } else if attr.name == "style" {
            for declaration in attr.value.split(';') {
                if let Some((name, value)) = declaration.split_once(':') {
                    if let Some(property) = PaintProperty::from_name(name.trim()) {
                        found.push((property, value.trim().to_string()));
                    }
                }
            }
        }
    }
    for child in element.child_elements() {
        collect_paints(child, found);
    }
}

/// Rewrites fill/stroke declarations in a `style` attribute. Declarations
/// that are not replaced keep their original text.
fn rewrite_style<F>(style: &str, visit: &mut F) -> (String, usize)
where
    F: FnMut(PaintProperty, &str) -> Option<String>,
{
    let mut rewritten = 0;
    let declarations: Vec<String> = style
        .split(';')
        .map(|declaration| {
            let Some((name, value)) = declaration.split_once(':') else {
                return declaration.to_string();
            };
            let Some(property) = PaintProperty::from_name(name.trim()) else {
                return declaration.to_string();
            };
            match visit(property, value.trim()) {
                Some(replacement) => {
                    rewritten += 1;
                    format!("{}:{}", name.trim(), replacement)
                }
                None => declaration.to_string(),
            }
        })
        .collect();
    (declarations.join(";"), rewritten)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 512 512"><!-- note --><path d="M0 0h512v512H0z"/><g style="fill: #fff; opacity:0.5"><path fill="#FFF" stroke="none" d="M1 1z"/><use xlink:href="#a"/></g><text>a &amp; b</text></svg>"##;

    #[test]
    fn parses_elements_and_attributes_in_order() {
        let doc = SvgDocument::parse(ICON).unwrap();
        assert_eq!(doc.root.name, "svg");
        assert_eq!(doc.root.attribute("viewBox"), Some("0 0 512 512"));

        let children: Vec<_> = doc.root.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(children, ["path", "g", "text"]);

        let group = doc.root.child_elements().nth(1).unwrap();
        let path = group.child_elements().next().unwrap();
        let names: Vec<_> = path.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["fill", "stroke", "d"]);
    }

    #[test]
    fn keeps_namespace_prefixes() {
        let doc = SvgDocument::parse(ICON).unwrap();
        let markup = doc.to_svg_string();
        assert!(markup.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(markup.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
        assert!(markup.contains(r##"xlink:href="#a""##));
        assert!(!markup.contains("note"));
        assert!(markup.contains("a &amp; b"));
    }

    #[test]
    fn serialized_markup_parses_to_same_tree() {
        let doc = SvgDocument::parse(ICON).unwrap();
        let reparsed = SvgDocument::parse(&doc.to_svg_string()).unwrap();
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn rejects_non_svg_root() {
        let err = SvgDocument::parse("<html/>").unwrap_err();
        assert!(matches!(err, DocumentError::NotSvg(name) if name == "html"));
        assert!(matches!(
            SvgDocument::parse("<svg><g></svg>"),
            Err(DocumentError::Xml(_))
        ));
    }

    #[test]
    fn enumerates_attribute_and_style_paints() {
        let doc = SvgDocument::parse(ICON).unwrap();
        let paints = doc.paints();
        assert_eq!(
            paints,
            vec![
                (PaintProperty::Fill, "#fff".to_string()),
                (PaintProperty::Fill, "#FFF".to_string()),
                (PaintProperty::Stroke, "none".to_string()),
            ]
        );
    }

    #[test]
    fn rewrites_style_declarations_in_place() {
        let mut doc = SvgDocument::parse(ICON).unwrap();
        let count = doc.rewrite_paints(&mut |property, value| {
            (property == PaintProperty::Fill && value.eq_ignore_ascii_case("#fff"))
                .then(|| "#123456".to_string())
        });
        assert_eq!(count, 2);

        let group = doc.root.child_elements().nth(1).unwrap();
        assert_eq!(group.attribute("style"), Some("fill:#123456; opacity:0.5"));
        let path = group.child_elements().next().unwrap();
        assert_eq!(path.attribute("fill"), Some("#123456"));
        assert_eq!(path.attribute("stroke"), Some("none"));
    }

    #[test]
    fn set_attribute_replaces_or_appends() {
        let mut element = SvgElement::new("rect");
        element.set_attribute("fill", "red");
        element.set_attribute("fill", "blue");
        element.set_attribute("x", "1");
        assert_eq!(element.attributes.len(), 2);
        assert_eq!(element.attribute("fill"), Some("blue"));
        assert_eq!(element.to_svg_string(), r#"<rect fill="blue" x="1"/>"#);
    }
}
