//! Custom predicate registry.
//!
//! A registered builder takes over the full compilation of any comparison
//! using its operator: the engine resolves the path and coerces arguments
//! to the builder's declared target type, then delegates without applying
//! any default semantics.

use crate::error::CompileError;
use crate::navigator::ResolvedPath;
use crate::schema::{AttributeDescriptor, ScalarType};
use sieveql_ir::{Node, Operator, Predicate, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Everything a custom builder sees about the comparison it compiles.
pub struct CustomPredicateInput<'a> {
    /// The resolved selector path.
    pub path: &'a ResolvedPath,
    /// Descriptor of the terminal attribute.
    pub attribute: &'a AttributeDescriptor,
    /// Arguments coerced to the builder's declared target type.
    pub arguments: &'a [Value],
    /// Root of the whole AST being compiled.
    pub root: &'a Node,
}

/// Builder function for a custom operator.
pub type CustomPredicateFn =
    Arc<dyn Fn(CustomPredicateInput<'_>) -> Result<Predicate, CompileError> + Send + Sync>;

/// One registered custom predicate.
#[derive(Clone)]
pub struct CustomPredicate {
    /// Type the raw arguments are coerced to before delegation.
    pub target: ScalarType,
    /// The builder function.
    pub builder: CustomPredicateFn,
}

/// Operator → builder table, populated at configuration time.
#[derive(Clone, Default)]
pub struct CustomPredicateRegistry {
    entries: HashMap<Operator, CustomPredicate>,
}

impl CustomPredicateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder for an operator, replacing any previous entry.
    pub fn register<F>(&mut self, operator: Operator, target: ScalarType, builder: F)
    where
        F: Fn(CustomPredicateInput<'_>) -> Result<Predicate, CompileError>
            + Send
            + Sync
            + 'static,
    {
        self.entries.insert(
            operator,
            CustomPredicate {
                target,
                builder: Arc::new(builder),
            },
        );
    }

    /// Look up the entry for an operator.
    pub fn get(&self, operator: &Operator) -> Option<&CustomPredicate> {
        self.entries.get(operator)
    }

    /// Whether any builder is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CustomPredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicateRegistry")
            .field("operators", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
