//! Filter-query compilation against a mapped entity schema.
//!
//! The engine takes an already-parsed filter tree ([`Node`]) and turns it
//! into a backend-neutral [`Predicate`] plus the joins its paths require.
//! Selector resolution walks an explicit [`schema::SchemaRegistry`];
//! literals are coerced best-effort, operator semantics include wildcard
//! and case markers, JSON columns compile to document path-tests, and
//! every hop passes field-level access control. A sort compiler reuses
//! the same path resolution.
//!
//! ```
//! use sieveql::{CompileConfig, QueryEngine};
//! use sieveql::schema::{AttributeDescriptor, EntitySchema, ScalarType, SchemaRegistry};
//! use sieveql_ir::{Node, Operator};
//! use std::sync::Arc;
//!
//! let registry = SchemaRegistry::new();
//! registry.register(
//!     EntitySchema::new("User", "id")
//!         .with_attribute(AttributeDescriptor::scalar("id", ScalarType::Int64))
//!         .with_attribute(AttributeDescriptor::scalar("name", ScalarType::String)),
//! );
//! let engine = QueryEngine::new(Arc::new(registry));
//!
//! let ast = Node::comparison("name", Operator::Equal, ["*Inc*"]);
//! let compiled = engine.compile("User", &ast, &CompileConfig::new()).unwrap();
//! assert!(compiled.joins.is_empty());
//! ```

pub mod acl;
pub mod coerce;
pub mod config;
pub mod custom;
pub mod engine;
pub mod error;
pub mod eval;
pub mod json;
pub mod navigator;
pub mod schema;
pub mod sort;

pub use acl::{AccessDecision, AccessTables};
pub use coerce::{ConvertError, ConverterRegistry};
pub use config::CompileConfig;
pub use custom::{CustomPredicate, CustomPredicateInput, CustomPredicateRegistry};
pub use engine::QueryEngine;
pub use error::{CompileError, DenyReason};
pub use eval::{evaluate, EvalError};
pub use navigator::{Navigator, PathHop, ResolvedPath, Terminal};

pub use sieveql_ir::{
    CompiledQuery, CompiledSort, Node, Operator, Predicate, Value,
};
