//! sieveql IR - AST, values, and predicate types.
//!
//! This crate holds the backend-neutral types shared between the sieveql
//! compiler and its query-builder adapters:
//!
//! - [`Node`]/[`ComparisonSpec`]/[`Operator`]: the AST shape handed over by
//!   an external grammar parser;
//! - [`Value`]: typed literals produced by coercion;
//! - [`Predicate`]/[`PathRef`]/[`JoinSpec`]: the compiled predicate tree and
//!   the join list it references;
//! - [`CompiledQuery`]/[`CompiledSort`]: the compiler's outputs.
//!
//! Nothing here touches a schema or a database; see the `sieveql` crate for
//! the compiler itself.

pub mod ast;
pub mod predicate;
pub mod value;

pub use ast::{Arity, ComparisonSpec, Node, Operator};
pub use predicate::{
    CmpOp, CompiledQuery, CompiledSort, JoinId, JoinKind, JoinSpec, OrderDirection, OrderSpec,
    PathRef, Predicate,
};
pub use value::Value;
