//! Parsed design documents
//!
//! A [`Document`] owns the node tree built from a file response together with
//! the document's variable library. Documents loaded through a
//! [`DocumentSource`] can switch to one of their branches.

pub mod raw;

use std::collections::BTreeMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use log::{debug, warn};
use thiserror::Error;

use crate::error::ParseError;
use crate::paint::Paint;
use crate::renderer::{render_svg, RenderError, SvgConfig, SvgRenderer};
use crate::tree::query::QueryIter;
use crate::tree::{
    CanvasProps, FrameProps, Geometry, KindCategory, Node, NodeId, NodeKind, NodeList,
    NodePayload, Selector, SliceProps, TextProps, Tree, VectorProps,
};
use crate::variables::{RawVariableLibrary, VariableError, VariableLibrary};
pub use raw::Branch;
use raw::{RawFile, RawGeometry, RawNode, RawPaint};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Variable(#[from] VariableError),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("branches can only be loaded for a document fetched from a source")]
    MissingContext,

    #[error("branch \"{0}\" not found")]
    BranchNotFound(String),
}

/// Where documents and their variables come from.
///
/// Implementations own transport, authentication and caching. Both methods
/// return the raw JSON response body.
pub trait DocumentSource {
    /// Fetch the file response for a file or branch key
    fn fetch_file<'a>(&'a self, key: &'a str) -> LocalBoxFuture<'a, Result<String, DocumentError>>;

    /// Fetch the local variables response for a file or branch key
    fn fetch_variables<'a>(
        &'a self,
        key: &'a str,
    ) -> LocalBoxFuture<'a, Result<String, DocumentError>>;
}

pub struct Document {
    tree: Tree,
    root: NodeId,
    name: Option<String>,
    library: VariableLibrary,
    branches: Vec<Branch>,
    source: Option<Rc<dyn DocumentSource>>,
}

impl Document {
    /// Parse a file response, or a bare node object
    pub fn parse(json: &str, library: VariableLibrary) -> Result<Self, ParseError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let raw = if value.get("document").is_some() {
            serde_json::from_value(value)?
        } else {
            RawFile {
                document: serde_json::from_value(value)?,
                name: None,
                branches: Vec::new(),
            }
        };
        Self::from_raw(raw, library)
    }

    pub fn from_raw(raw: RawFile, library: VariableLibrary) -> Result<Self, ParseError> {
        let mut tree = Tree::new();
        let root = build_subtree(&mut tree, raw.document, &library)?;
        debug!(nodes = tree.len(), branches = raw.branches.len(); "Document parsed");

        Ok(Self {
            tree,
            root,
            name: raw.name,
            library,
            branches: raw.branches,
            source: None,
        })
    }

    /// Fetch and parse a file; its variables are fetched on first resolution
    pub async fn load(source: Rc<dyn DocumentSource>, key: &str) -> Result<Self, DocumentError> {
        debug!(key; "Loading document");
        let json = source.fetch_file(key).await?;
        let library = deferred_library(Rc::clone(&source), key.to_string());
        let mut document = Self::parse(&json, library)?;
        document.source = Some(source);
        Ok(document)
    }

    /// Load the branch called `name` from the same source
    pub async fn branch(&self, name: &str) -> Result<Self, DocumentError> {
        let source = self.source.as_ref().ok_or(DocumentError::MissingContext)?;
        let branch = self
            .branches
            .iter()
            .find(|branch| branch.name == name)
            .ok_or_else(|| DocumentError::BranchNotFound(name.to_string()))?;
        Self::load(Rc::clone(source), &branch.key).await
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn library(&self) -> &VariableLibrary {
        &self.library
    }

    /// Render `node` and its subtree.
    ///
    /// Resolve the library first when `config.reference_variables` is set.
    /// Variables are named with
    /// [`default_css_name`](crate::variables::default_css_name); use [`Document::renderer`]
    /// to supply another naming scheme.
    pub fn render_svg(&self, node: NodeId, config: &SvgConfig) -> Result<String, RenderError> {
        render_svg(&self.tree, node, config)
    }

    /// A renderer over this document's tree, for custom variable naming
    pub fn renderer<'a>(&'a self, config: &'a SvgConfig) -> SvgRenderer<'a> {
        SvgRenderer::new(&self.tree, config)
    }

    pub fn query_selector_all<'t, 's>(
        &'t self,
        selector: &'s Selector,
    ) -> NodeList<QueryIter<'t, 's>>
    where
        't: 's,
    {
        self.tree.query_selector_all(self.root, selector)
    }

    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.tree.query_selector(self.root, selector)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("nodes", &self.tree.len())
            .field("branches", &self.branches)
            .field("library", &self.library)
            .finish_non_exhaustive()
    }
}

fn deferred_library(source: Rc<dyn DocumentSource>, key: String) -> VariableLibrary {
    VariableLibrary::deferred(move || async move {
        let json = source
            .fetch_variables(&key)
            .await
            .map_err(|err| VariableError::Fetch(err.to_string()))?;
        RawVariableLibrary::from_json(&json).map_err(|err| VariableError::Fetch(err.to_string()))
    })
}

fn build_subtree(
    tree: &mut Tree,
    mut raw: RawNode,
    library: &VariableLibrary,
) -> Result<NodeId, ParseError> {
    let children = std::mem::take(&mut raw.children);
    let id = tree.create(parse_node(&raw, library)?);
    for child in children {
        let child = build_subtree(tree, child, library)?;
        tree.append_child(id, child);
    }
    Ok(id)
}

/// Convert one raw node, without its children
pub fn parse_node(raw: &RawNode, library: &VariableLibrary) -> Result<Node, ParseError> {
    let kind = NodeKind::from_type_name(&raw.kind).ok_or_else(|| ParseError::UnknownNodeKind {
        id: raw.id.clone(),
        kind: raw.kind.clone(),
    })?;

    let payload = match kind {
        NodeKind::Document => NodePayload::Document,
        NodeKind::Canvas => NodePayload::Canvas(CanvasProps {
            background_color: raw.background_color,
        }),
        NodeKind::Slice => NodePayload::Slice(SliceProps {
            absolute_bounding_box: raw.absolute_bounding_box,
        }),
        NodeKind::Text => NodePayload::Text(TextProps {
            shape: vector_props(raw, library)?,
            characters: raw.characters.clone().unwrap_or_default(),
            style: raw.style.clone(),
        }),
        _ if kind.category() == Some(KindCategory::FrameLike) => {
            NodePayload::Frame(frame_props(raw, library)?)
        }
        _ => NodePayload::Vector(vector_props(raw, library)?),
    };

    Ok(Node {
        id: raw.id.clone(),
        name: raw.name.clone(),
        visible: raw.visible,
        kind,
        payload,
    })
}

fn paints(raw: &[RawPaint], library: &VariableLibrary) -> Result<Vec<Paint>, ParseError> {
    raw.iter()
        .map(|paint| Paint::from_raw(paint, library))
        .collect()
}

fn geometry(raw: &[RawGeometry]) -> Vec<Geometry> {
    raw.iter()
        .map(|geometry| Geometry {
            path: geometry.path.clone(),
            winding_rule: geometry.winding_rule,
            override_id: geometry.override_id,
        })
        .collect()
}

fn frame_props(raw: &RawNode, library: &VariableLibrary) -> Result<FrameProps, ParseError> {
    Ok(FrameProps {
        absolute_bounding_box: raw.absolute_bounding_box,
        fills: paints(&raw.fills, library)?,
        strokes: paints(&raw.strokes, library)?,
        background: paints(&raw.background, library)?,
        background_color: raw.background_color,
        stroke_weight: raw.stroke_weight,
        stroke_align: raw.stroke_align.clone(),
        corner_radius: raw.corner_radius,
        opacity: raw.opacity,
        blend_mode: raw.blend_mode.clone(),
        clips_content: raw.clips_content,
        layout_mode: raw.layout_mode.clone(),
    })
}

fn vector_props(raw: &RawNode, library: &VariableLibrary) -> Result<VectorProps, ParseError> {
    let mut fill_override_table = BTreeMap::new();
    for (key, entry) in &raw.fill_override_table {
        let Some(entry) = entry else {
            continue;
        };
        match key.parse::<u64>() {
            Ok(override_id) => {
                fill_override_table.insert(override_id, paints(&entry.fills, library)?);
            }
            Err(_) => warn!(node = raw.id, key; "Ignoring non-numeric fill override id"),
        }
    }

    Ok(VectorProps {
        absolute_bounding_box: raw.absolute_bounding_box,
        fills: paints(&raw.fills, library)?,
        strokes: paints(&raw.strokes, library)?,
        fill_geometry: geometry(&raw.fill_geometry),
        stroke_geometry: geometry(&raw.stroke_geometry),
        fill_override_table,
        stroke_weight: raw.stroke_weight,
        stroke_align: raw.stroke_align.clone(),
        stroke_cap: raw.stroke_cap.clone(),
        stroke_join: raw.stroke_join.clone(),
        stroke_dashes: raw.stroke_dashes.clone(),
        corner_radius: raw.corner_radius,
        opacity: raw.opacity,
        blend_mode: raw.blend_mode.clone(),
        boolean_operation: raw.boolean_operation.clone(),
    })
}
