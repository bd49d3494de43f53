//! SVG generation from a document subtree

use log::{debug, trace};

use crate::paint::Paint;
use crate::tree::{Node, NodeId, NodePayload, TextProps, Tree, VectorProps, WindingRule};
use crate::variables::{default_css_name, Variable};

use super::bounds::Bounds;
use super::element::Element;
use super::path::translate_path;
use super::{RenderError, SvgConfig};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Fill,
    Stroke,
}

/// Renders nodes of a [`Tree`] into a markup tree
pub struct SvgRenderer<'a> {
    tree: &'a Tree,
    config: &'a SvgConfig,
    resolve_name: Box<dyn Fn(&Variable) -> String + 'a>,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(tree: &'a Tree, config: &'a SvgConfig) -> Self {
        Self {
            tree,
            config,
            resolve_name: Box::new(default_css_name),
        }
    }

    /// Override how variables are named in `var(...)` references
    pub fn with_name_resolver<F>(mut self, resolve_name: F) -> Self
    where
        F: Fn(&Variable) -> String + 'a,
    {
        self.resolve_name = Box::new(resolve_name);
        self
    }

    /// Render `root` and its subtree wrapped in an `svg` element
    pub fn render(&self, root: NodeId) -> Result<Element, RenderError> {
        let mut cumulative = Bounds::EMPTY;
        let (content, current) = self.render_node(root, Bounds::EMPTY, &mut cumulative)?;

        let viewport = if current.is_empty() { cumulative } else { current };
        let (width, height) = (viewport.width(), viewport.height());
        debug!(root = self.tree[root].id, width, height; "SVG document rendered");

        Ok(Element::new("svg")
            .attr("xmlns", SVG_NAMESPACE)
            .attr("viewBox", format!("0 0 {} {}", width, height))
            .attr("width", width)
            .attr("height", height)
            .child(content))
    }

    pub fn render_to_string(&self, root: NodeId) -> Result<String, RenderError> {
        Ok(self.render(root)?.to_string_with(self.config.tab_width))
    }

    /// Render one node. Returns the element and the node's current bounds.
    fn render_node(
        &self,
        id: NodeId,
        parent: Bounds,
        cumulative: &mut Bounds,
    ) -> Result<(Element, Bounds), RenderError> {
        let node = &self.tree[id];
        let rect = node.absolute_bounding_box();
        let current = parent.expanded(rect);
        if let Some(rect) = rect {
            cumulative.expand(rect);
        }

        let mut children = Vec::new();
        for child in self.tree.children(id) {
            let (element, _) = self.render_node(child, current, cumulative)?;
            children.push(element);
        }

        let (left, top) = current.origin();
        let offset = rect.map_or((0.0, 0.0), |rect| (rect.x - left, rect.y - top));

        let element = match &node.payload {
            NodePayload::Text(text) => {
                let mut elements = vec![render_text(text, &current, children)];
                elements.extend(self.render_paths(node, &text.shape, Channel::Fill, offset)?);
                elements.extend(self.render_paths(node, &text.shape, Channel::Stroke, offset)?);
                Element::transparent(elements)
            }
            NodePayload::Frame(frame) if frame.clips_content => {
                render_clip(node, &current, offset, children)
            }
            NodePayload::Vector(shape) => {
                children.extend(self.render_paths(node, shape, Channel::Fill, offset)?);
                children.extend(self.render_paths(node, shape, Channel::Stroke, offset)?);
                Element::transparent(children)
            }
            _ => Element::transparent(children),
        };

        Ok((element, current))
    }

    fn render_paths(
        &self,
        node: &Node,
        shape: &VectorProps,
        channel: Channel,
        (dx, dy): (f64, f64),
    ) -> Result<Vec<Element>, RenderError> {
        let (geometry, paints) = match channel {
            Channel::Fill => (&shape.fill_geometry, &shape.fills),
            Channel::Stroke => (&shape.stroke_geometry, &shape.strokes),
        };

        let mut paths = Vec::with_capacity(geometry.len());
        for entry in geometry {
            let paint = match entry.override_id {
                Some(override_id) => shape
                    .fill_override_table
                    .get(&override_id)
                    .and_then(|fills| fills.first()),
                None => paints.first(),
            };

            if paint.is_none() && self.config.skip_unpainted_geometry {
                trace!(node = node.id, channel:? = channel; "Skipping unpainted geometry");
                continue;
            }

            let d = translate_path(&entry.path, dx, dy, self.config.path_precision).map_err(
                |err| RenderError::InvalidPath {
                    node: node.id.clone(),
                    message: err.to_string(),
                },
            )?;

            let mut path = Element::new("path").attr("d", d);
            if let Some(weight) = shape.stroke_weight.filter(|weight| *weight != 0.0) {
                path = path.attr("strokeWidth", weight);
            }
            for (name, value) in [
                ("strokeAlign", &shape.stroke_align),
                ("strokeCap", &shape.stroke_cap),
                ("strokeJoin", &shape.stroke_join),
            ] {
                if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
                    path = path.attr(name, value);
                }
            }
            match entry.winding_rule {
                Some(WindingRule::Evenodd) => {
                    path = path.attr("fillRule", "evenodd").attr("clipRule", "evenodd");
                }
                Some(WindingRule::Nonzero) => {
                    path = path.attr("fillRule", "nonzero").attr("clipRule", "nonzero");
                }
                Some(WindingRule::Other) | None => {}
            }
            if !node.visible {
                path = path.attr("visibility", "hidden");
            }
            if let Some(mode) = shape.blend_mode.as_deref() {
                path = path.attr("mixBlendMode", css_blend_mode(mode));
            }
            if let Some(opacity) = shape.opacity {
                path = path.attr("opacity", opacity);
            }
            if !node.id.is_empty() {
                path = path.attr("id", node.id.as_str());
            }

            paths.push(self.apply_paint(path, paint)?);
        }
        Ok(paths)
    }

    fn apply_paint(&self, path: Element, paint: Option<&Paint>) -> Result<Element, RenderError> {
        match paint {
            None => Ok(path.attr("fill", "none")),
            Some(Paint::Solid(solid)) => match &solid.bound_color {
                Some(alias) if self.config.reference_variables => {
                    let variable = alias.resolve_sync()?;
                    Ok(path.attr(
                        "style",
                        format!(
                            "fill: var({}, {})",
                            (self.resolve_name)(&variable),
                            solid.color
                        ),
                    ))
                }
                _ => Ok(path.attr("fill", solid.color.to_string())),
            },
            Some(Paint::Gradient(gradient)) => Err(RenderError::UnsupportedPaint {
                kind: gradient.kind.as_str().to_string(),
            }),
            Some(Paint::Image(_)) => Ok(path),
        }
    }
}

/// Render `root` of `tree` to SVG text
pub fn render_svg(tree: &Tree, root: NodeId, config: &SvgConfig) -> Result<String, RenderError> {
    SvgRenderer::new(tree, config).render_to_string(root)
}

fn render_text(text: &TextProps, current: &Bounds, children: Vec<Element>) -> Element {
    let (x, y) = current.origin();
    Element::new("text")
        .attr("x", x)
        .attr("y", y)
        .attr("width", current.width())
        .attr("height", current.height())
        .children(children)
        .text(text.characters.as_str())
}

fn render_clip(
    node: &Node,
    current: &Bounds,
    (x, y): (f64, f64),
    children: Vec<Element>,
) -> Element {
    let clip_id = format!("clip{}", sanitize_id(&node.id));
    Element::transparent(vec![
        Element::new("g")
            .attr("clipPath", format!("url(#{})", clip_id))
            .children(children),
        Element::new("clipPath").attr("id", clip_id).child(
            Element::new("rect")
                .attr("x", x)
                .attr("y", y)
                .attr("width", current.width())
                .attr("height", current.height()),
        ),
    ])
}

/// Node ids like `12:34` are not valid in `url(#...)` references
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// `PASS_THROUGH` is `normal`; other modes become lowercase-hyphenated
fn css_blend_mode(mode: &str) -> String {
    match mode {
        "PASS_THROUGH" => "normal".to_string(),
        other => other.to_ascii_lowercase().replace('_', "-"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;
    use crate::tree::{BoundingBox, FrameProps, Geometry, NodeKind};

    fn rect_node(id: &str, rect: BoundingBox, fill: Option<Paint>) -> Node {
        let shape = VectorProps {
            absolute_bounding_box: Some(rect),
            fills: fill.into_iter().collect(),
            fill_geometry: vec![Geometry {
                path: format!("M0 0L{w} 0L{w} {h}L0 {h}Z", w = rect.width, h = rect.height),
                winding_rule: Some(WindingRule::Nonzero),
                override_id: None,
            }],
            ..VectorProps::default()
        };
        Node::new(id, "rect", NodeKind::Rectangle).with_payload(NodePayload::Vector(shape))
    }

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("12:34;5"), "12-34-5");
    }

    #[test]
    fn test_css_blend_mode() {
        assert_eq!(css_blend_mode("PASS_THROUGH"), "normal");
        assert_eq!(css_blend_mode("COLOR_DODGE"), "color-dodge");
    }

    #[test]
    fn test_render_single_rect() {
        let mut tree = Tree::new();
        let red = Paint::solid(Color::rgba(1.0, 0.0, 0.0, 1.0));
        let root = tree.create(rect_node("1:2", BoundingBox::new(0.0, 0.0, 10.0, 10.0), Some(red)));

        let config = SvgConfig::default();
        let svg = render_svg(&tree, root, &config).unwrap();

        assert!(svg.contains(r#"viewBox="0 0 10 10""#));
        assert!(svg.contains(r#"width="10" height="10""#));
        assert!(svg.contains(r#"d="M0 0 L10 0 L10 10 L0 10 Z""#));
        assert!(svg.contains(r#"fill="rgba(255, 0, 0, 1)""#));
        assert!(svg.contains(r#"fill-rule="nonzero" clip-rule="nonzero""#));
        assert_eq!(svg.matches("<path").count(), 1);
    }

    #[test]
    fn test_unpainted_geometry_policy() {
        let mut tree = Tree::new();
        let root = tree.create(rect_node("1:2", BoundingBox::new(0.0, 0.0, 4.0, 4.0), None));

        let skipped = render_svg(&tree, root, &SvgConfig::default()).unwrap();
        assert!(!skipped.contains("<path"));

        let config = SvgConfig::new().with_skip_unpainted_geometry(false);
        let kept = render_svg(&tree, root, &config).unwrap();
        assert!(kept.contains(r#"fill="none""#));
    }

    #[test]
    fn test_override_miss_leaves_geometry_unpainted() {
        let mut tree = Tree::new();
        let red = Paint::solid(Color::rgba(1.0, 0.0, 0.0, 1.0));
        let mut node = rect_node("1:2", BoundingBox::new(0.0, 0.0, 4.0, 4.0), Some(red));
        if let NodePayload::Vector(shape) = &mut node.payload {
            shape.fill_geometry[0].override_id = Some(9);
        }
        let root = tree.create(node);

        let skipped = render_svg(&tree, root, &SvgConfig::default()).unwrap();
        assert_eq!(skipped.matches("<path").count(), 0);

        let config = SvgConfig::new().with_skip_unpainted_geometry(false);
        let kept = render_svg(&tree, root, &config).unwrap();
        assert!(kept.contains(r#"fill="none""#));
        assert!(!kept.contains("rgba(255, 0, 0, 1)"));
    }

    #[test]
    fn test_sibling_bounds_are_independent() {
        let mut tree = Tree::new();
        let frame = tree.create(
            Node::new("1:1", "frame", NodeKind::Frame).with_payload(NodePayload::Frame(FrameProps {
                absolute_bounding_box: Some(BoundingBox::new(10.0, 10.0, 100.0, 100.0)),
                ..FrameProps::default()
            })),
        );
        let red = Paint::solid(Color::rgba(1.0, 0.0, 0.0, 1.0));
        let a = tree.create(rect_node("1:2", BoundingBox::new(0.0, 0.0, 5.0, 5.0), Some(red.clone())));
        let b = tree.create(rect_node("1:3", BoundingBox::new(20.0, 20.0, 5.0, 5.0), Some(red)));
        tree.append_child(frame, a);
        tree.append_child(frame, b);

        let svg = render_svg(&tree, frame, &SvgConfig::default()).unwrap();
        // a widens its own bounds to the origin, b only sees the frame's
        assert!(svg.contains(r#"d="M0 0 L5 0 L5 5 L0 5 Z""#));
        assert!(svg.contains(r#"d="M10 10 L15 10 L15 15 L10 15 Z""#));
        // the viewport comes from the root's box
        assert!(svg.contains(r#"viewBox="0 0 100 100""#));
    }
}
