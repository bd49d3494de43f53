//! The variable library and its resolution state machine

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use log::{debug, warn};

use super::error::VariableError;
use super::raw::{RawModeValue, RawVariable, RawVariableLibrary};
use super::types::{
    ModeValue, Variable, VariableAlias, VariableCollection, VariableType, VariableValue,
};

/// Produces the raw library description on first resolution
pub type LibraryResolver =
    Box<dyn FnOnce() -> LocalBoxFuture<'static, Result<RawVariableLibrary, VariableError>>>;

type PendingResolution = Shared<LocalBoxFuture<'static, Result<Rc<LibraryData>, VariableError>>>;

/// Parsed, id-indexed library contents
#[derive(Debug, Default)]
pub(super) struct LibraryData {
    variables: BTreeMap<String, Rc<Variable>>,
    collections: BTreeMap<String, Rc<VariableCollection>>,
}

enum LibraryState {
    Unresolved,
    Resolving(PendingResolution),
    Resolved(Rc<LibraryData>),
    Failed(VariableError),
}

pub struct LibraryInner {
    state: RefCell<LibraryState>,
    resolver: RefCell<Option<LibraryResolver>>,
}

/// Shared handle to a set of variables and collections.
///
/// Cloning is cheap and every clone observes the same resolution state.
/// Variables and aliases refer back to the library weakly.
#[derive(Clone)]
pub struct VariableLibrary {
    inner: Rc<LibraryInner>,
}

impl VariableLibrary {
    fn with_state(state: LibraryState, resolver: Option<LibraryResolver>) -> Self {
        Self {
            inner: Rc::new(LibraryInner {
                state: RefCell::new(state),
                resolver: RefCell::new(resolver),
            }),
        }
    }

    /// A resolved library with no variables
    pub fn empty() -> Self {
        Self::with_state(LibraryState::Resolved(Rc::default()), None)
    }

    /// Parse an already fetched library
    pub fn resolved(raw: RawVariableLibrary) -> Result<Self, VariableError> {
        let library = Self::with_state(LibraryState::Unresolved, None);
        let data = LibraryData::from_raw(raw, &library.downgrade())?;
        *library.inner.state.borrow_mut() = LibraryState::Resolved(Rc::new(data));
        Ok(library)
    }

    /// A library fetched on first use
    pub fn deferred<F, Fut>(resolver: F) -> Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<RawVariableLibrary, VariableError>> + 'static,
    {
        let resolver: LibraryResolver = Box::new(move || resolver().boxed_local());
        Self::with_state(LibraryState::Unresolved, Some(resolver))
    }

    pub(super) fn downgrade(&self) -> Weak<LibraryInner> {
        Rc::downgrade(&self.inner)
    }

    pub(super) fn upgrade(inner: &Weak<LibraryInner>) -> Result<Self, VariableError> {
        inner
            .upgrade()
            .map(|inner| Self { inner })
            .ok_or(VariableError::MissingContext)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.inner.state.borrow(), LibraryState::Resolved(_))
    }

    /// Resolve the library, once.
    ///
    /// Concurrent callers share the in-flight resolution, so the resolver runs
    /// at most once. A failure is kept and returned to every later caller.
    pub async fn resolve_all(&self) -> Result<(), VariableError> {
        let pending = {
            let mut state = self.inner.state.borrow_mut();
            let pending = match &*state {
                LibraryState::Resolved(_) => return Ok(()),
                LibraryState::Failed(err) => return Err(err.clone()),
                LibraryState::Resolving(pending) => pending.clone(),
                LibraryState::Unresolved => self.start_resolution(),
            };
            if matches!(*state, LibraryState::Unresolved) {
                *state = LibraryState::Resolving(pending.clone());
            }
            pending
        };

        let outcome = pending.await;
        let mut state = self.inner.state.borrow_mut();
        match outcome {
            Ok(data) => {
                if !matches!(*state, LibraryState::Resolved(_)) {
                    *state = LibraryState::Resolved(data);
                }
                Ok(())
            }
            Err(err) => {
                *state = LibraryState::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn start_resolution(&self) -> PendingResolution {
        debug!("Resolving variable library");
        let resolver = self.inner.resolver.borrow_mut().take();
        let library = self.downgrade();
        async move {
            let raw = match resolver {
                Some(resolver) => resolver().await?,
                None => RawVariableLibrary::default(),
            };
            LibraryData::from_raw(raw, &library).map(Rc::new)
        }
        .boxed_local()
        .shared()
    }

    fn data(&self) -> Result<Rc<LibraryData>, VariableError> {
        match &*self.inner.state.borrow() {
            LibraryState::Resolved(data) => Ok(Rc::clone(data)),
            _ => Err(VariableError::NotResolved),
        }
    }

    /// Look up a variable by id.
    ///
    /// Fails only when the library is not resolved; unknown ids are `None`.
    pub fn get(&self, id: &str) -> Result<Option<Rc<Variable>>, VariableError> {
        Ok(self.data()?.variables.get(id).cloned())
    }

    /// Resolve the library if needed, then look up a variable
    pub async fn resolve(&self, id: &str) -> Result<Option<Rc<Variable>>, VariableError> {
        self.resolve_all().await?;
        self.get(id)
    }

    pub fn collection(&self, id: &str) -> Result<Option<Rc<VariableCollection>>, VariableError> {
        Ok(self.data()?.collections.get(id).cloned())
    }

    /// All variables, ordered by id
    pub fn variables(&self) -> Result<Vec<Rc<Variable>>, VariableError> {
        Ok(self.data()?.variables.values().cloned().collect())
    }

    pub fn collections(&self) -> Result<Vec<Rc<VariableCollection>>, VariableError> {
        Ok(self.data()?.collections.values().cloned().collect())
    }

    /// Render every colour variable as a CSS custom property on `:root`.
    ///
    /// Each value is the variable's resolved default-mode colour.
    pub fn css_custom_properties<F>(&self, name_resolver: F) -> Result<String, VariableError>
    where
        F: Fn(&Variable) -> String,
    {
        let mut css = String::from(":root {\n");
        for variable in self.variables()? {
            if variable.resolved_type != VariableType::Color {
                continue;
            }
            let value = variable.resolved_value()?;
            css.push_str(&format!("  {}: {};\n", name_resolver(&variable), value));
        }
        css.push('}');
        Ok(css)
    }
}

impl fmt::Debug for VariableLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.inner.state.borrow() {
            LibraryState::Unresolved => "unresolved",
            LibraryState::Resolving(_) => "resolving",
            LibraryState::Resolved(_) => "resolved",
            LibraryState::Failed(_) => "failed",
        };
        f.debug_struct("VariableLibrary")
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LibraryInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryInner").finish_non_exhaustive()
    }
}

impl LibraryData {
    fn from_raw(raw: RawVariableLibrary, library: &Weak<LibraryInner>) -> Result<Self, VariableError> {
        let mut collections = BTreeMap::new();
        for collection in raw.variable_collections.into_values() {
            if !collection.has_mode(&collection.default_mode_id) {
                return Err(VariableError::InvalidCollection {
                    id: collection.id,
                    mode: collection.default_mode_id,
                });
            }
            collections.insert(collection.id.clone(), Rc::new(collection));
        }

        let variables: BTreeMap<_, _> = raw
            .variables
            .into_values()
            .map(|variable| {
                let variable = parse_variable(variable, library);
                (variable.id.clone(), Rc::new(variable))
            })
            .collect();

        debug!(
            variables = variables.len(),
            collections = collections.len();
            "Variable library resolved",
        );

        Ok(Self {
            variables,
            collections,
        })
    }
}

fn parse_variable(raw: RawVariable, library: &Weak<LibraryInner>) -> Variable {
    let mut values_by_mode = BTreeMap::new();
    for (mode, value) in raw.values_by_mode {
        let slot = match value {
            RawModeValue::Alias(alias) => {
                ModeValue::Alias(VariableAlias::with_weak(alias.id, library.clone()))
            }
            RawModeValue::Boolean(value) => ModeValue::Value(VariableValue::Boolean(value)),
            RawModeValue::Float(value) => ModeValue::Value(VariableValue::Float(value)),
            RawModeValue::String(value) => ModeValue::Value(VariableValue::String(value)),
            RawModeValue::Color(value) => ModeValue::Value(VariableValue::Color(value)),
        };

        if let ModeValue::Value(value) = &slot {
            if value.variable_type() != raw.resolved_type {
                warn!(
                    variable = raw.id, mode, expected:% = raw.resolved_type, found:% = value.variable_type();
                    "Dropping mode value of the wrong type",
                );
                continue;
            }
        }
        values_by_mode.insert(mode, slot);
    }

    Variable {
        id: raw.id,
        name: raw.name,
        key: raw.key,
        description: raw.description,
        variable_collection_id: raw.variable_collection_id,
        resolved_type: raw.resolved_type,
        values_by_mode,
        remote: raw.remote,
        hidden_from_publishing: raw.hidden_from_publishing,
        scopes: raw.scopes,
        code_syntax: raw.code_syntax,
        library: library.clone(),
    }
}
