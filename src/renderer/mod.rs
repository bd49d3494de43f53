//! SVG renderer for document subtrees
//!
//! Rendering builds an [`Element`] tree first and serializes it afterwards.
//! Geometry is placed relative to the union of the rendered root's box and
//! the boxes on the path down to each node.

pub mod bounds;
pub mod config;
pub mod element;
pub mod path;
pub mod svg;

use thiserror::Error;

use crate::variables::VariableError;

pub use bounds::Bounds;
pub use config::{ConfigError, SvgConfig};
pub use element::{AttrValue, Content, Element};
pub use svg::{render_svg, SvgRenderer};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{kind} paints are not supported")]
    UnsupportedPaint { kind: String },

    #[error("node {node} has invalid path data: {message}")]
    InvalidPath { node: String, message: String },

    #[error(transparent)]
    Variable(#[from] VariableError),
}
