//! Node records stored in the document tree
//!
//! Every node carries a shared base (id, name, visibility, kind) and a
//! kind-specific payload. Payloads are shared between related kinds: all
//! frame-like kinds use [`FrameProps`], all shape kinds use [`VectorProps`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::paint::{Color, Paint};

/// A box in absolute document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Structural kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Canvas,
    Frame,
    Group,
    Component,
    ComponentSet,
    Instance,
    Vector,
    Boolean,
    BooleanOperation,
    Star,
    Line,
    Ellipse,
    RegularPolygon,
    Rectangle,
    Text,
    Slice,
}

/// Families of node kinds that share a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindCategory {
    /// Frame, group, component, component set and instance nodes
    FrameLike,
    /// Every node carrying fill and stroke geometry, including text
    VectorLike,
}

impl NodeKind {
    /// Look up a kind by its wire name (e.g. `"FRAME"`)
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "DOCUMENT" => Self::Document,
            "CANVAS" => Self::Canvas,
            "FRAME" => Self::Frame,
            "GROUP" => Self::Group,
            "COMPONENT" => Self::Component,
            "COMPONENT_SET" => Self::ComponentSet,
            "INSTANCE" => Self::Instance,
            "VECTOR" => Self::Vector,
            "BOOLEAN" => Self::Boolean,
            "BOOLEAN_OPERATION" => Self::BooleanOperation,
            "STAR" => Self::Star,
            "LINE" => Self::Line,
            "ELLIPSE" => Self::Ellipse,
            "REGULAR_POLYGON" => Self::RegularPolygon,
            "RECTANGLE" => Self::Rectangle,
            "TEXT" => Self::Text,
            "SLICE" => Self::Slice,
            _ => return None,
        };
        Some(kind)
    }

    /// The wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "DOCUMENT",
            Self::Canvas => "CANVAS",
            Self::Frame => "FRAME",
            Self::Group => "GROUP",
            Self::Component => "COMPONENT",
            Self::ComponentSet => "COMPONENT_SET",
            Self::Instance => "INSTANCE",
            Self::Vector => "VECTOR",
            Self::Boolean => "BOOLEAN",
            Self::BooleanOperation => "BOOLEAN_OPERATION",
            Self::Star => "STAR",
            Self::Line => "LINE",
            Self::Ellipse => "ELLIPSE",
            Self::RegularPolygon => "REGULAR_POLYGON",
            Self::Rectangle => "RECTANGLE",
            Self::Text => "TEXT",
            Self::Slice => "SLICE",
        }
    }

    pub fn category(&self) -> Option<KindCategory> {
        match self {
            Self::Frame | Self::Group | Self::Component | Self::ComponentSet | Self::Instance => {
                Some(KindCategory::FrameLike)
            }
            Self::Vector
            | Self::Boolean
            | Self::BooleanOperation
            | Self::Star
            | Self::Line
            | Self::Ellipse
            | Self::RegularPolygon
            | Self::Rectangle
            | Self::Text => Some(KindCategory::VectorLike),
            Self::Document | Self::Canvas | Self::Slice => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Winding rule of a geometry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindingRule {
    Evenodd,
    Nonzero,
    #[serde(other)]
    Other,
}

/// One outline of a fill or stroke, in node-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// SVG path data
    pub path: String,
    pub winding_rule: Option<WindingRule>,
    /// Key into the node's fill override table
    pub override_id: Option<u64>,
}

/// Payload shared by frame, group, component, component set and instance nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameProps {
    pub absolute_bounding_box: Option<BoundingBox>,
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub background: Vec<Paint>,
    pub background_color: Option<Color>,
    pub stroke_weight: Option<f64>,
    pub stroke_align: Option<String>,
    pub corner_radius: Option<f64>,
    pub opacity: Option<f64>,
    pub blend_mode: Option<String>,
    pub clips_content: bool,
    pub layout_mode: Option<String>,
}

/// Payload shared by every shape node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorProps {
    pub absolute_bounding_box: Option<BoundingBox>,
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub fill_geometry: Vec<Geometry>,
    pub stroke_geometry: Vec<Geometry>,
    pub fill_override_table: BTreeMap<u64, Vec<Paint>>,
    pub stroke_weight: Option<f64>,
    pub stroke_align: Option<String>,
    pub stroke_cap: Option<String>,
    pub stroke_join: Option<String>,
    pub stroke_dashes: Vec<f64>,
    pub corner_radius: Option<f64>,
    pub opacity: Option<f64>,
    pub blend_mode: Option<String>,
    pub boolean_operation: Option<String>,
}

/// Character formatting of a text node
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<f64>,
    #[serde(default)]
    pub italic: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextProps {
    pub shape: VectorProps,
    pub characters: String,
    pub style: Option<TypeStyle>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasProps {
    pub background_color: Option<Color>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceProps {
    pub absolute_bounding_box: Option<BoundingBox>,
}

/// Kind-specific node data
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Document,
    Canvas(CanvasProps),
    Frame(FrameProps),
    Vector(VectorProps),
    Text(TextProps),
    Slice(SliceProps),
}

/// A single document node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub kind: NodeKind,
    pub payload: NodePayload,
}

/// The value of a node field as seen by selectors
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Str(Cow<'a, str>),
    Number(f64),
    Bool(bool),
}

impl FieldValue<'_> {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&'static str> for FieldValue<'static> {
    fn from(value: &'static str) -> Self {
        FieldValue::Str(Cow::Borrowed(value))
    }
}

impl From<String> for FieldValue<'static> {
    fn from(value: String) -> Self {
        FieldValue::Str(Cow::Owned(value))
    }
}

impl From<f64> for FieldValue<'static> {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue<'static> {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl Node {
    /// Create a node with the default (empty) payload for its kind
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        let payload = match kind {
            NodeKind::Document => NodePayload::Document,
            NodeKind::Canvas => NodePayload::Canvas(CanvasProps::default()),
            NodeKind::Text => NodePayload::Text(TextProps::default()),
            NodeKind::Slice => NodePayload::Slice(SliceProps::default()),
            other => match other.category() {
                Some(KindCategory::FrameLike) => NodePayload::Frame(FrameProps::default()),
                _ => NodePayload::Vector(VectorProps::default()),
            },
        };
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            kind,
            payload,
        }
    }

    pub fn with_payload(mut self, payload: NodePayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn is_kind(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    /// Absolute box of this node, if its kind carries one
    pub fn absolute_bounding_box(&self) -> Option<&BoundingBox> {
        match &self.payload {
            NodePayload::Frame(frame) => frame.absolute_bounding_box.as_ref(),
            NodePayload::Vector(shape) => shape.absolute_bounding_box.as_ref(),
            NodePayload::Text(text) => text.shape.absolute_bounding_box.as_ref(),
            NodePayload::Slice(slice) => slice.absolute_bounding_box.as_ref(),
            NodePayload::Document | NodePayload::Canvas(_) => None,
        }
    }

    /// Shape payload of vector-like nodes (text included)
    pub fn shape(&self) -> Option<&VectorProps> {
        match &self.payload {
            NodePayload::Vector(shape) => Some(shape),
            NodePayload::Text(text) => Some(&text.shape),
            _ => None,
        }
    }

    pub fn frame(&self) -> Option<&FrameProps> {
        match &self.payload {
            NodePayload::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    /// Read a field by its document name.
    ///
    /// Returns `None` when the node's kind does not carry the field or the
    /// optional field is unset.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => return str_field(self.id.as_str()),
            "name" => return str_field(self.name.as_str()),
            "visible" => return Some(FieldValue::Bool(self.visible)),
            "type" => return str_field(self.kind.as_str()),
            _ => {}
        }

        match &self.payload {
            NodePayload::Frame(frame) => match name {
                "clipsContent" => Some(FieldValue::Bool(frame.clips_content)),
                "opacity" => frame.opacity.map(FieldValue::Number),
                "blendMode" => frame.blend_mode.as_deref().and_then(str_field),
                "strokeWeight" => frame.stroke_weight.map(FieldValue::Number),
                "strokeAlign" => frame.stroke_align.as_deref().and_then(str_field),
                "cornerRadius" => frame.corner_radius.map(FieldValue::Number),
                "layoutMode" => frame.layout_mode.as_deref().and_then(str_field),
                _ => None,
            },
            NodePayload::Vector(shape) => shape_field(shape, name),
            NodePayload::Text(text) => match name {
                "characters" => str_field(text.characters.as_str()),
                "fontFamily" => text
                    .style
                    .as_ref()
                    .and_then(|s| s.font_family.as_deref())
                    .and_then(str_field),
                "fontSize" => text
                    .style
                    .as_ref()
                    .and_then(|s| s.font_size)
                    .map(FieldValue::Number),
                _ => shape_field(&text.shape, name),
            },
            NodePayload::Document | NodePayload::Canvas(_) | NodePayload::Slice(_) => None,
        }
    }
}

fn str_field(value: &str) -> Option<FieldValue<'_>> {
    Some(FieldValue::Str(Cow::Borrowed(value)))
}

fn shape_field<'a>(shape: &'a VectorProps, name: &str) -> Option<FieldValue<'a>> {
    match name {
        "opacity" => shape.opacity.map(FieldValue::Number),
        "blendMode" => shape.blend_mode.as_deref().and_then(str_field),
        "strokeWeight" => shape.stroke_weight.map(FieldValue::Number),
        "strokeAlign" => shape.stroke_align.as_deref().and_then(str_field),
        "strokeCap" => shape.stroke_cap.as_deref().and_then(str_field),
        "strokeJoin" => shape.stroke_join.as_deref().and_then(str_field),
        "cornerRadius" => shape.corner_radius.map(FieldValue::Number),
        "booleanOperation" => shape.boolean_operation.as_deref().and_then(str_field),
        _ => None,
    }
}
