//! # Test Context
//!
//! Shared, mutable variable store for a single test run.
//!
//! ## Overview
//!
//! Every action of a test run executes against the same [`TestContext`].
//! The handle is cheap to clone and all clones share one concurrent map, so a
//! variable set inside a nested container or a parallel branch is visible to
//! everything that runs afterwards. The map is internally synchronised, but
//! there is no atomicity across several variable updates.
//!
//! String values may embed `${name}` references and `prefix:function(args)`
//! calls, resolved by [`TestContext::resolve_dynamic_value`].
//!
//! ## Usage
//!
//! ```rust
//! use testflow::TestContext;
//!
//! let context = TestContext::new();
//! context.set_variable("user", "alice");
//! let greeting = context.resolve_dynamic_value("hello ${user}").unwrap();
//! assert_eq!(greeting, "hello alice");
//! ```

pub mod boolean_expression;
pub mod expression;
pub mod functions;

use crate::error::{ActionFailure, ActionResult};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub use functions::{ExpressionFunction, FunctionLibrary};

/// Thread-safe variable context shared by every action of a test run
#[derive(Clone)]
pub struct TestContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    id: Uuid,
    variables: DashMap<String, Value>,
    libraries: RwLock<HashMap<String, FunctionLibrary>>,
}

impl TestContext {
    /// Create a context with the built-in `core:` function library
    pub fn new() -> Self {
        let mut libraries = HashMap::new();
        let core = FunctionLibrary::core();
        libraries.insert(core.prefix().to_string(), core);

        Self {
            inner: Arc::new(ContextInner {
                id: Uuid::new_v4(),
                variables: DashMap::new(),
                libraries: RwLock::new(libraries),
            }),
        }
    }

    /// Unique id of this context, shared by all clones
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn set_variable(&self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        debug!(variable = %name, value = %value, "Setting variable");
        self.inner.variables.insert(name, value);
    }

    /// Variable rendered as a string; unknown variables fail
    pub fn get_variable(&self, name: &str) -> ActionResult<String> {
        self.get_variable_value(name)
            .map(|value| value_to_string(&value))
            .ok_or_else(|| ActionFailure::execution(format!("Unknown variable '{name}'")))
    }

    /// Raw variable value, `None` when undefined
    pub fn get_variable_value(&self, name: &str) -> Option<Value> {
        self.inner.variables.get(name).map(|entry| entry.value().clone())
    }

    /// Variable deserialised into a typed value
    pub fn get_variable_as<T: DeserializeOwned>(&self, name: &str) -> ActionResult<T> {
        let value = self
            .get_variable_value(name)
            .ok_or_else(|| ActionFailure::execution(format!("Unknown variable '{name}'")))?;
        serde_json::from_value(value).map_err(|e| {
            ActionFailure::execution(format!("Variable '{name}' has unexpected type: {e}"))
        })
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.inner.variables.contains_key(name)
    }

    pub fn remove_variable(&self, name: &str) -> Option<Value> {
        self.inner.variables.remove(name).map(|(_, value)| value)
    }

    /// Sorted variable names
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .variables
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Point-in-time copy of all variables
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.inner
            .variables
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Drop every variable; `TestRunner::start` calls this on a context it owns
    pub fn clear(&self) {
        self.inner.variables.clear();
    }

    /// Define variables in declaration order
    ///
    /// String values are resolved before they are stored, so a definition may
    /// reference any variable defined earlier in the same list.
    pub fn create_variables<I, K>(&self, definitions: I) -> ActionResult<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (name, value) in definitions {
            let resolved = match value {
                Value::String(raw) => Value::String(self.resolve_dynamic_value(&raw)?),
                other => other,
            };
            self.set_variable(name, resolved);
        }
        Ok(())
    }

    /// Replace `${...}` references and function calls in `raw`
    pub fn resolve_dynamic_value(&self, raw: &str) -> ActionResult<String> {
        let with_variables = expression::replace_variables(raw, self)?;
        expression::replace_functions(&with_variables, self)
    }

    /// Resolve dynamic content, then evaluate as a boolean expression
    pub fn evaluate_condition(&self, expression: &str) -> ActionResult<bool> {
        let resolved = self.resolve_dynamic_value(expression)?;
        boolean_expression::evaluate(&resolved)
    }

    /// Add or replace a function library
    pub fn register_library(&self, library: FunctionLibrary) {
        self.inner
            .libraries
            .write()
            .insert(library.prefix().to_string(), library);
    }

    /// Add a single function to a library, creating the library if needed
    pub fn register_function(
        &self,
        prefix: &str,
        name: &str,
        function: Arc<dyn ExpressionFunction>,
    ) {
        let mut libraries = self.inner.libraries.write();
        libraries
            .entry(prefix.to_string())
            .or_insert_with(|| FunctionLibrary::new(prefix))
            .register(name, function);
    }

    pub(crate) fn has_library(&self, prefix: &str) -> bool {
        self.inner.libraries.read().contains_key(prefix)
    }

    pub(crate) fn lookup_function(
        &self,
        prefix: &str,
        name: &str,
    ) -> Option<Arc<dyn ExpressionFunction>> {
        self.inner
            .libraries
            .read()
            .get(prefix)
            .and_then(|library| library.get(name))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("id", &self.inner.id)
            .field("variables", &self.inner.variables.len())
            .finish()
    }
}

/// String form used when a variable is embedded into text
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
