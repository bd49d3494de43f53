use thiserror::Error;

use super::types::VariableType;

/// Errors raised while resolving a variable library or dereferencing aliases.
///
/// `Clone` so every caller waiting on the same resolution receives the error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariableError {
    #[error("variable library is not resolved")]
    NotResolved,

    #[error("variable {id} could not be resolved")]
    UnresolvedAlias { id: String },

    #[error("variable alias cycle: {}", chain.join(" -> "))]
    AliasCycle { chain: Vec<String> },

    #[error("variable {variable} is {expected} but aliases {target} which is {found}")]
    AliasTypeMismatch {
        variable: String,
        target: String,
        expected: VariableType,
        found: VariableType,
    },

    #[error("unknown variable collection {id}")]
    UnknownCollection { id: String },

    #[error("variable {variable} has no value for mode {mode}")]
    MissingModeValue { variable: String, mode: String },

    #[error("collection {id} has default mode {mode} which is not one of its modes")]
    InvalidCollection { id: String, mode: String },

    #[error("variable library is no longer available")]
    MissingContext,

    #[error("failed to fetch variables: {0}")]
    Fetch(String),
}
