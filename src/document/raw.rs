//! Wire form of the file response
//!
//! Field names follow the document service's camelCase JSON. Only the
//! attributes the tree, queries and renderer use are mapped; anything else in
//! the input is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::paint::{Color, ColorStop, Vector};
use crate::tree::{BoundingBox, TypeStyle, WindingRule};
use crate::variables::raw::RawAlias;

fn default_true() -> bool {
    true
}

/// A full file response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
    pub document: RawNode,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "branch_list")]
    pub branches: Vec<Branch>,
}

/// A named branch of a file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// Branches arrive either as a list or keyed by branch key
fn branch_list<'de, D>(deserializer: D) -> Result<Vec<Branch>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Branches {
        List(Vec<Branch>),
        Map(BTreeMap<String, Branch>),
    }

    Ok(match Option::<Branches>::deserialize(deserializer)? {
        Some(Branches::List(list)) => list,
        Some(Branches::Map(map)) => map.into_values().collect(),
        None => Vec::new(),
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub children: Vec<RawNode>,

    pub absolute_bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub fills: Vec<RawPaint>,
    #[serde(default)]
    pub strokes: Vec<RawPaint>,
    #[serde(default)]
    pub background: Vec<RawPaint>,
    pub background_color: Option<Color>,
    #[serde(default)]
    pub fill_geometry: Vec<RawGeometry>,
    #[serde(default)]
    pub stroke_geometry: Vec<RawGeometry>,
    #[serde(default, alias = "fillsOverrideTable")]
    pub fill_override_table: BTreeMap<String, Option<RawPaintOverride>>,

    pub stroke_weight: Option<f64>,
    pub stroke_align: Option<String>,
    pub stroke_cap: Option<String>,
    pub stroke_join: Option<String>,
    #[serde(default)]
    pub stroke_dashes: Vec<f64>,
    pub corner_radius: Option<f64>,
    pub opacity: Option<f64>,
    pub blend_mode: Option<String>,
    #[serde(default)]
    pub clips_content: bool,
    pub layout_mode: Option<String>,
    pub boolean_operation: Option<String>,

    pub characters: Option<String>,
    pub style: Option<TypeStyle>,
}

/// Paints that replace a node's fills for geometry with a matching override id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPaintOverride {
    #[serde(default)]
    pub fills: Vec<RawPaint>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGeometry {
    pub path: String,
    pub winding_rule: Option<WindingRule>,
    #[serde(rename = "overrideID")]
    pub override_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPaint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    pub opacity: Option<f64>,
    pub color: Option<Color>,
    pub blend_mode: Option<String>,
    #[serde(default)]
    pub gradient_handle_positions: Vec<Vector>,
    #[serde(default)]
    pub gradient_stops: Vec<ColorStop>,
    pub scale_mode: Option<String>,
    pub image_ref: Option<String>,
    pub image_transform: Option<Vec<Vec<f64>>>,
    pub scaling_factor: Option<f64>,
    pub rotation: Option<f64>,
    pub gif_ref: Option<String>,
    pub bound_variables: Option<RawBoundVariables>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBoundVariables {
    pub color: Option<RawAlias>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branches_as_list_or_map() {
        let list: RawFile = serde_json::from_str(
            r#"{"document": {"id": "0:0", "type": "DOCUMENT"},
                "branches": [{"key": "b1", "name": "feature"}]}"#,
        )
        .unwrap();
        assert_eq!(list.branches[0].name, "feature");

        let map: RawFile = serde_json::from_str(
            r#"{"document": {"id": "0:0", "type": "DOCUMENT"},
                "branches": {"b1": {"key": "b1", "name": "feature"}}}"#,
        )
        .unwrap();
        assert_eq!(map.branches, list.branches);

        let none: RawFile =
            serde_json::from_str(r#"{"document": {"id": "0:0", "type": "DOCUMENT"}}"#).unwrap();
        assert!(none.branches.is_empty());
    }

    #[test]
    fn test_override_table_accepts_both_spellings() {
        for key in ["fillOverrideTable", "fillsOverrideTable"] {
            let json = format!(
                r#"{{"id": "1:1", "type": "VECTOR", "{key}": {{"7": {{"fills": [{{"type": "SOLID", "color": {{"r": 0, "g": 0, "b": 1}}}}]}}, "8": null}}}}"#
            );
            let node: RawNode = serde_json::from_str(&json).unwrap();
            assert_eq!(node.fill_override_table.len(), 2);
            assert_eq!(node.fill_override_table["7"].as_ref().unwrap().fills.len(), 1);
        }
    }

    #[test]
    fn test_geometry_override_id() {
        let geometry: RawGeometry = serde_json::from_str(
            r#"{"path": "M0 0L1 1Z", "windingRule": "EVENODD", "overrideID": 7}"#,
        )
        .unwrap();
        assert_eq!(geometry.winding_rule, Some(WindingRule::Evenodd));
        assert_eq!(geometry.override_id, Some(7));
    }
}
