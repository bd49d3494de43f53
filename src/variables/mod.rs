//! Design-token variables
//!
//! A [`VariableLibrary`] owns every variable and collection of a document.
//! It can be built from already fetched data or from an async resolver that
//! is invoked on first use. Variables may alias other variables of the same
//! type; [`Variable::resolved_value`] follows those aliases.

mod error;
mod library;
pub mod raw;
mod types;

pub use error::VariableError;
pub use library::{LibraryResolver, VariableLibrary};
pub use raw::RawVariableLibrary;
pub use types::{
    Mode, ModeValue, Variable, VariableAlias, VariableCollection, VariableType, VariableValue,
};

/// Default CSS custom property name for a variable.
///
/// `"Brand/Primary Light"` becomes `--Brand--Primary--Light`.
pub fn default_css_name(variable: &Variable) -> String {
    let parts: Vec<&str> = variable.name.split([' ', '/']).collect();
    format!("--{}", parts.join("--"))
}
