//! figdom - a queryable tree and SVG renderer for design documents
//!
//! This library parses design-document JSON (nodes, paints and design-token
//! variables) into an arena-backed tree that can be queried and edited, and
//! renders any subtree to SVG.
//!
//! # Example
//!
//! ```rust
//! use figdom::render;
//!
//! let svg = render(r#"{
//!     "id": "1:2", "type": "RECTANGLE", "name": "box",
//!     "absoluteBoundingBox": {"x": 0, "y": 0, "width": 10, "height": 10},
//!     "fills": [{"type": "SOLID", "color": {"r": 1, "g": 0, "b": 0, "a": 1}}],
//!     "fillGeometry": [{"path": "M0 0L10 0L10 10L0 10Z", "windingRule": "NONZERO"}]
//! }"#).unwrap();
//!
//! assert!(svg.contains("<svg"));
//! assert!(svg.contains(r#"fill="rgba(255, 0, 0, 1)""#));
//! ```

pub mod document;
pub mod error;
pub mod paint;
pub mod renderer;
pub mod tree;
pub mod variables;

pub use document::{Document, DocumentError, DocumentSource};
pub use error::ParseError;
pub use paint::{Color, Paint};
pub use renderer::{render_svg, ConfigError, RenderError, SvgConfig, SvgRenderer};
pub use tree::{Node, NodeId, NodeKind, NodeList, Selector, Tree};
pub use variables::{RawVariableLibrary, Variable, VariableError, VariableLibrary};

use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Error while parsing the document or its variables
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error while resolving variables
    #[error("variable error: {0}")]
    Variable(#[from] VariableError),

    /// Error while generating SVG
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Render a document's root node to SVG with default configuration
pub fn render(json: &str) -> Result<String, Error> {
    render_with_config(json, &SvgConfig::default())
}

/// Render a document's root node to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use figdom::{render_with_config, SvgConfig};
///
/// let config = SvgConfig::new().with_tab_width(4);
/// let svg = render_with_config(r#"{"id": "0:0", "type": "DOCUMENT"}"#, &config).unwrap();
/// assert!(svg.contains(r#"viewBox="0 0 0 0""#));
/// ```
pub fn render_with_config(json: &str, config: &SvgConfig) -> Result<String, Error> {
    let document = Document::parse(json, VariableLibrary::empty())?;
    Ok(document.render_svg(document.root(), config)?)
}

/// Render a document whose paints may be bound to variables from `variables_json`
pub fn render_with_variables(
    json: &str,
    variables_json: &str,
    config: &SvgConfig,
) -> Result<String, Error> {
    let raw = RawVariableLibrary::from_json(variables_json).map_err(ParseError::from)?;
    let library = VariableLibrary::resolved(raw)?;
    let document = Document::parse(json, library)?;
    Ok(document.render_svg(document.root(), config)?)
}
