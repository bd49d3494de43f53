//! Intermediate markup tree and its text serialization

use std::fmt;

/// SVG attributes whose names are case-sensitive and must not be hyphenated
const CASE_SENSITIVE_ATTRS: &[&str] = &[
    "viewBox",
    "preserveAspectRatio",
    "clipPathUnits",
    "gradientTransform",
    "gradientUnits",
    "patternContentUnits",
    "patternTransform",
    "patternUnits",
    "maskContentUnits",
    "maskUnits",
    "markerHeight",
    "markerUnits",
    "markerWidth",
    "refX",
    "refY",
    "pathLength",
    "spreadMethod",
    "startOffset",
    "stdDeviation",
    "textLength",
    "lengthAdjust",
];

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Number(f64),
    /// Rendered bare when true, omitted when false
    Bool(bool),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
}

/// A markup element. Elements without a tag are transparent: only their
/// children are serialized, at the parent's depth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: Option<String>,
    attrs: Vec<(String, AttrValue)>,
    children: Vec<Content>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn transparent(children: Vec<Element>) -> Self {
        Self {
            tag: None,
            attrs: Vec::new(),
            children: children.into_iter().map(Content::Element).collect(),
        }
    }

    /// Add or replace an attribute, keeping first-insertion order
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Content::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Content::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Content::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Content::Element(child));
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_transparent(&self) -> bool {
        self.tag.is_none()
    }

    pub fn get_attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn attrs(&self) -> &[(String, AttrValue)] {
        &self.attrs
    }

    pub fn content(&self) -> &[Content] {
        &self.children
    }

    /// Elements below this one, looking through transparent wrappers
    pub fn visible_children(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        for child in &self.children {
            if let Content::Element(element) = child {
                if element.is_transparent() {
                    out.extend(element.visible_children());
                } else {
                    out.push(element);
                }
            }
        }
        out
    }

    /// Serialize with `tab_width` spaces per nesting level
    pub fn to_string_with(&self, tab_width: usize) -> String {
        let mut lines = Vec::new();
        self.write_lines(0, tab_width, &mut lines);
        lines.join("\n")
    }

    fn write_lines(&self, depth: usize, tab_width: usize, lines: &mut Vec<String>) {
        let Some(tag) = &self.tag else {
            for child in &self.children {
                match child {
                    Content::Element(element) => element.write_lines(depth, tab_width, lines),
                    Content::Text(text) => push_text(text, depth, tab_width, lines),
                }
            }
            return;
        };

        let indent = " ".repeat(depth * tab_width);
        let mut open = format!("<{}", tag);
        for attr in self.attrs.iter().filter_map(format_attr) {
            open.push(' ');
            open.push_str(&attr);
        }

        let only_text = !self.children.is_empty()
            && self
                .children
                .iter()
                .all(|child| matches!(child, Content::Text(_)));
        if only_text {
            let text: String = self
                .children
                .iter()
                .filter_map(|child| match child {
                    Content::Text(text) => Some(escape_xml(text)),
                    Content::Element(_) => None,
                })
                .collect();
            if !text.is_empty() {
                lines.push(format!("{}{}>{}</{}>", indent, open, text, tag));
                return;
            }
        }

        let mut inner = Vec::new();
        for child in &self.children {
            match child {
                Content::Element(element) => element.write_lines(depth + 1, tab_width, &mut inner),
                Content::Text(text) => push_text(text, depth + 1, tab_width, &mut inner),
            }
        }

        if inner.is_empty() {
            lines.push(format!("{}{} />", indent, open));
        } else {
            lines.push(format!("{}{}>", indent, open));
            lines.extend(inner);
            lines.push(format!("{}</{}>", indent, tag));
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(2))
    }
}

fn push_text(text: &str, depth: usize, tab_width: usize, lines: &mut Vec<String>) {
    if !text.is_empty() {
        lines.push(format!("{}{}", " ".repeat(depth * tab_width), escape_xml(text)));
    }
}

fn format_attr((name, value): &(String, AttrValue)) -> Option<String> {
    let name = attr_name(name);
    match value {
        AttrValue::Bool(true) => Some(name),
        AttrValue::Bool(false) => None,
        other => Some(format!("{}=\"{}\"", name, escape_xml(&other.to_string()))),
    }
}

/// Hyphenate a camelCase attribute name unless SVG treats it case-sensitively
pub fn attr_name(name: &str) -> String {
    if CASE_SENSITIVE_ATTRS.contains(&name) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape special XML characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b"), "a &lt; b");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
    }

    #[test]
    fn test_attr_names() {
        assert_eq!(attr_name("strokeWidth"), "stroke-width");
        assert_eq!(attr_name("mixBlendMode"), "mix-blend-mode");
        assert_eq!(attr_name("viewBox"), "viewBox");
        assert_eq!(attr_name("clipPathUnits"), "clipPathUnits");
        assert_eq!(attr_name("d"), "d");
    }

    #[test]
    fn test_nested_serialization() {
        let svg = Element::new("svg")
            .attr("width", 10.0)
            .child(
                Element::new("g")
                    .attr("clipPath", "url(#clip1)")
                    .child(Element::new("rect").attr("x", 0.5)),
            )
            .child(Element::new("text").text("a < b"));

        assert_eq!(
            svg.to_string_with(2),
            "<svg width=\"10\">\n  <g clip-path=\"url(#clip1)\">\n    <rect x=\"0.5\" />\n  </g>\n  <text>a &lt; b</text>\n</svg>"
        );
    }

    #[test]
    fn test_transparent_elements_splice_children() {
        let root = Element::new("g").child(Element::transparent(vec![
            Element::new("path").attr("d", "M0 0"),
            Element::transparent(vec![Element::new("path").attr("d", "M1 1")]),
        ]));

        assert_eq!(
            root.to_string_with(4),
            "<g>\n    <path d=\"M0 0\" />\n    <path d=\"M1 1\" />\n</g>"
        );
        assert_eq!(root.visible_children().len(), 2);
    }

    #[test]
    fn test_empty_transparent_child_self_closes_parent() {
        let root = Element::new("g").child(Element::transparent(vec![]));
        assert_eq!(root.to_string_with(2), "<g />");
    }

    #[test]
    fn test_boolean_attributes() {
        let el = Element::new("input")
            .attr("disabled", true)
            .attr("hidden", false)
            .attr("name", "x\"y");
        assert_eq!(el.to_string_with(2), "<input disabled name=\"x&quot;y\" />");
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut el = Element::new("path").attr("d", "M0 0").attr("fill", "red");
        el.set_attr("d", "M1 1");
        assert_eq!(el.attrs()[0], ("d".to_string(), AttrValue::from("M1 1")));
        assert_eq!(el.get_attr("fill"), Some(&AttrValue::from("red")));
    }
}
