//! Variables, collections and alias references

use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use log::trace;
use serde::Deserialize;

use super::error::VariableError;
use super::library::{LibraryInner, VariableLibrary};
use crate::paint::Color;

/// Payload kind of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    Boolean,
    Float,
    String,
    Color,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VariableType::Boolean => "BOOLEAN",
            VariableType::Float => "FLOAT",
            VariableType::String => "STRING",
            VariableType::Color => "COLOR",
        })
    }
}

/// A concrete variable value
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    Boolean(bool),
    Float(f64),
    String(String),
    Color(Color),
}

impl VariableValue {
    pub fn variable_type(&self) -> VariableType {
        match self {
            VariableValue::Boolean(_) => VariableType::Boolean,
            VariableValue::Float(_) => VariableType::Float,
            VariableValue::String(_) => VariableType::String,
            VariableValue::Color(_) => VariableType::Color,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            VariableValue::Color(color) => Some(*color),
            _ => None,
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Boolean(value) => write!(f, "{}", value),
            VariableValue::Float(value) => write!(f, "{}", value),
            VariableValue::String(value) => f.write_str(value),
            VariableValue::Color(color) => write!(f, "{}", color),
        }
    }
}

/// Contents of one mode slot
#[derive(Debug, Clone, PartialEq)]
pub enum ModeValue {
    Value(VariableValue),
    Alias(VariableAlias),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    pub mode_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCollection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub key: String,
    pub modes: Vec<Mode>,
    pub default_mode_id: String,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub hidden_from_publishing: bool,
    #[serde(default)]
    pub variable_ids: Vec<String>,
}

impl VariableCollection {
    pub fn has_mode(&self, mode_id: &str) -> bool {
        self.modes.iter().any(|mode| mode.mode_id == mode_id)
    }

    pub fn default_mode(&self) -> Option<&Mode> {
        self.modes
            .iter()
            .find(|mode| mode.mode_id == self.default_mode_id)
    }
}

/// A typed design token with one slot per mode
#[derive(Debug)]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub key: String,
    pub description: String,
    pub variable_collection_id: String,
    pub resolved_type: VariableType,
    pub values_by_mode: BTreeMap<String, ModeValue>,
    pub remote: bool,
    pub hidden_from_publishing: bool,
    pub scopes: Vec<String>,
    pub code_syntax: BTreeMap<String, String>,
    pub(super) library: Weak<LibraryInner>,
}

impl Variable {
    /// The library this variable belongs to
    pub fn library(&self) -> Result<VariableLibrary, VariableError> {
        VariableLibrary::upgrade(&self.library)
    }

    pub fn collection(&self) -> Result<Rc<VariableCollection>, VariableError> {
        self.library()?
            .collection(&self.variable_collection_id)?
            .ok_or_else(|| VariableError::UnknownCollection {
                id: self.variable_collection_id.clone(),
            })
    }

    /// Slot for the owning collection's default mode
    pub fn value(&self) -> Result<&ModeValue, VariableError> {
        let collection = self.collection()?;
        self.value_for_mode(&collection.default_mode_id)
            .ok_or_else(|| VariableError::MissingModeValue {
                variable: self.id.clone(),
                mode: collection.default_mode_id.clone(),
            })
    }

    pub fn value_for_mode(&self, mode_id: &str) -> Option<&ModeValue> {
        self.values_by_mode.get(mode_id)
    }

    /// Follow aliases from the default mode until a concrete value.
    ///
    /// Each hop uses the target's own default mode. Revisiting a variable
    /// fails with [`VariableError::AliasCycle`].
    pub fn resolved_value(&self) -> Result<VariableValue, VariableError> {
        let mut chain = vec![self.id.clone()];
        let mut slot = self.value()?.clone();

        loop {
            let alias = match slot {
                ModeValue::Value(value) => return Ok(value),
                ModeValue::Alias(alias) => alias,
            };

            if chain.iter().any(|id| *id == alias.id) {
                chain.push(alias.id);
                return Err(VariableError::AliasCycle { chain });
            }

            let target = alias.resolve_sync()?;
            if target.resolved_type != self.resolved_type {
                return Err(VariableError::AliasTypeMismatch {
                    variable: chain.last().cloned().unwrap_or_default(),
                    target: target.id.clone(),
                    expected: self.resolved_type,
                    found: target.resolved_type,
                });
            }

            trace!(target_id = target.id; "Following variable alias");
            chain.push(target.id.clone());
            slot = target.value()?.clone();
        }
    }
}

/// Reference from a mode slot (or a paint) to a variable by id.
///
/// Holds the library weakly; the alias never keeps the library alive.
#[derive(Clone)]
pub struct VariableAlias {
    id: String,
    library: Weak<LibraryInner>,
}

impl VariableAlias {
    pub fn new(id: impl Into<String>, library: &VariableLibrary) -> Self {
        Self {
            id: id.into(),
            library: library.downgrade(),
        }
    }

    pub(super) fn with_weak(id: String, library: Weak<LibraryInner>) -> Self {
        Self { id, library }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resolve the owning library if needed, then look up the target
    pub async fn resolve(&self) -> Result<Rc<Variable>, VariableError> {
        let library = VariableLibrary::upgrade(&self.library)?;
        library
            .resolve(&self.id)
            .await?
            .ok_or_else(|| VariableError::UnresolvedAlias {
                id: self.id.clone(),
            })
    }

    /// Look up the target in an already resolved library
    pub fn resolve_sync(&self) -> Result<Rc<Variable>, VariableError> {
        VariableLibrary::upgrade(&self.library)?
            .get(&self.id)?
            .ok_or_else(|| VariableError::UnresolvedAlias {
                id: self.id.clone(),
            })
    }
}

impl fmt::Debug for VariableAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableAlias")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl PartialEq for VariableAlias {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
