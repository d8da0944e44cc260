//! Backend-neutral predicate IR and the path/join handles it references.
//!
//! A compiled query is a predicate tree plus the ordered list of joins the
//! tree's paths require. Adapters translate both into a concrete query
//! builder; nothing here generates SQL text.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a join created during compilation, indexing into
/// [`CompiledQuery::joins`].
pub type JoinId = usize;

/// Join kind requested for an association hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    /// Inner join.
    Inner,
    /// Left outer join (the default for association hops).
    Left,
}

impl Default for JoinKind {
    fn default() -> Self {
        JoinKind::Left
    }
}

/// One join required by the compiled predicate.
///
/// At most one join exists per `(owner, attribute)` pair within a single
/// compile, no matter how many branches of the tree reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    /// This join's handle.
    pub id: JoinId,
    /// Join this one hangs off, or the query root when `None`.
    pub parent: Option<JoinId>,
    /// Entity type owning the association attribute.
    pub owner: String,
    /// Association attribute being joined.
    pub attribute: String,
    /// Entity or element type reached by the join.
    pub target: String,
    /// Requested join kind.
    pub kind: JoinKind,
}

/// A resolved column reference.
///
/// `join` anchors the reference (query root when `None`); `column` is the
/// chain of attribute names navigated from that anchor without further
/// joins (embedded prefixes plus the terminal attribute). An empty chain
/// refers to the joined element value itself. `segments` is the canonical
/// root-relative selector after alias and remap expansion, kept for
/// diagnostics and in-memory evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRef {
    /// Anchoring join, or the query root.
    pub join: Option<JoinId>,
    /// Attribute chain navigated from the anchor.
    pub column: Vec<String>,
    /// Canonical root-relative attribute path.
    pub segments: Vec<String>,
}

impl PathRef {
    /// The canonical dotted selector this path resolves.
    pub fn selector(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for PathRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector())
    }
}

/// Ordering comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{s}")
    }
}

/// A backend-neutral boolean predicate.
///
/// Negated operator families compile to `Not` around the positive form, so
/// adapters only implement positive templates plus logical NOT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Path equals value.
    Eq {
        /// Compared column.
        path: PathRef,
        /// Comparison operand.
        value: Value,
        /// Case-fold both sides before comparing.
        ignore_case: bool,
    },
    /// Path matches a pattern with `%`/`_` wildcards.
    Like {
        /// Compared column.
        path: PathRef,
        /// Pattern with `%` (any sequence) and `_` (single char).
        pattern: String,
        /// Case-fold both sides before matching.
        ignore_case: bool,
    },
    /// Ordering comparison against a single bound.
    Cmp {
        /// Compared column.
        path: PathRef,
        /// Comparison operator.
        op: CmpOp,
        /// Bound operand.
        value: Value,
    },
    /// Inclusive range test.
    Between {
        /// Compared column.
        path: PathRef,
        /// Lower bound (inclusive).
        low: Value,
        /// Upper bound (inclusive).
        high: Value,
    },
    /// Set membership.
    In {
        /// Compared column.
        path: PathRef,
        /// Candidate values.
        values: Vec<Value>,
    },
    /// Null test.
    IsNull {
        /// Tested column.
        path: PathRef,
    },
    /// Document path-test against a JSON column, expressed as a generic
    /// named-function call by adapters (e.g. a jsonpath-exists test).
    JsonTest {
        /// The JSON column.
        path: PathRef,
        /// The path-test expression string.
        expression: String,
    },
    /// All children must hold.
    And(Vec<Predicate>),
    /// At least one child must hold.
    Or(Vec<Predicate>),
    /// Logical negation.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Create an equality predicate.
    pub fn eq(path: PathRef, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            path,
            value: value.into(),
            ignore_case: false,
        }
    }

    /// Create a null-test predicate.
    pub fn is_null(path: PathRef) -> Self {
        Predicate::IsNull { path }
    }

    /// Wrap a predicate in logical NOT.
    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// One compiled ordering term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// Ordered column.
    pub path: PathRef,
    /// Sort direction.
    pub direction: OrderDirection,
    /// Case-insensitive ordering for textual columns.
    pub ignore_case: bool,
}

/// The result of compiling one filter query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    /// Root entity type the query filters.
    pub root: String,
    /// Joins required by the predicate, in creation order.
    pub joins: Vec<JoinSpec>,
    /// The compiled predicate tree.
    pub predicate: Predicate,
    /// Whether the caller requested distinct results.
    pub distinct: bool,
}

/// The result of compiling one sort specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledSort {
    /// Root entity type the ordering applies to.
    pub root: String,
    /// Joins required by the ordering paths, in creation order.
    pub joins: Vec<JoinSpec>,
    /// Ordering terms, in specification order.
    pub orders: Vec<OrderSpec>,
}
