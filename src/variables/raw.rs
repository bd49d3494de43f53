//! Wire form of the variables response

use std::collections::BTreeMap;

use serde::Deserialize;

use super::types::{VariableCollection, VariableType};
use crate::paint::Color;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariableLibrary {
    #[serde(default)]
    pub variables: BTreeMap<String, RawVariable>,
    #[serde(default)]
    pub variable_collections: BTreeMap<String, VariableCollection>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Wrapped { meta: RawVariableLibrary },
    Bare(RawVariableLibrary),
}

impl RawVariableLibrary {
    /// Parse either the full response (`{"meta": {...}}`) or a bare library
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let library = match serde_json::from_str(json)? {
            Envelope::Wrapped { meta } => meta,
            Envelope::Bare(library) => library,
        };
        Ok(library)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub description: String,
    pub variable_collection_id: String,
    pub resolved_type: VariableType,
    #[serde(default)]
    pub values_by_mode: BTreeMap<String, RawModeValue>,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub hidden_from_publishing: bool,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub code_syntax: BTreeMap<String, String>,
}

/// A reference to another variable
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawAlias {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// A mode slot before its type has been checked
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawModeValue {
    Alias(RawAlias),
    Color(Color),
    Boolean(bool),
    Float(f64),
    String(String),
}
