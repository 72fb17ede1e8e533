use indexmap::IndexMap;

use crate::{
    diagnostics::{RuntimeError, RuntimeErrorKind},
    position::SourceSpan,
    value::Value,
};

/// Global variable table for one program run, kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    bindings: IndexMap<String, Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any previous value in place.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn lookup(&self, name: &str, span: SourceSpan) -> Result<&Value, RuntimeError> {
        self.bindings.get(name).ok_or_else(|| {
            RuntimeError::new(
                RuntimeErrorKind::UndefinedVariable,
                format!("undefined variable `{name}`"),
            )
            .with_span(span)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }
}
