//! AST types produced by an external grammar parser.
//!
//! The compiler never parses query text itself; it consumes this tree shape
//! from whichever parser the embedding service uses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed filter expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// All children must match.
    And(Vec<Node>),
    /// At least one child must match.
    Or(Vec<Node>),
    /// A single `selector operator arguments` comparison.
    Comparison(ComparisonSpec),
}

impl Node {
    /// Create a comparison node.
    pub fn comparison<S, A>(selector: S, operator: Operator, arguments: A) -> Self
    where
        S: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Node::Comparison(ComparisonSpec {
            selector: selector.into(),
            operator,
            arguments: arguments.into_iter().map(Into::into).collect(),
        })
    }

    /// Create an AND node over children.
    pub fn and(children: Vec<Node>) -> Self {
        Node::And(children)
    }

    /// Create an OR node over children.
    pub fn or(children: Vec<Node>) -> Self {
        Node::Or(children)
    }
}

/// One comparison from the query text: dotted selector, operator, raw
/// string arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSpec {
    /// Dotted attribute path naming the target field or association chain.
    pub selector: String,
    /// The comparison operator.
    pub operator: Operator,
    /// Raw (uncoerced) argument literals.
    pub arguments: Vec<String>,
}

/// The closed operator set of the filter grammar.
///
/// `Custom` carries the symbol of an operator registered through the custom
/// predicate registry; every other variant has default semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equality, with wildcard/case markers on string operands.
    Equal,
    /// Negated equality.
    NotEqual,
    /// Strictly greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterThanOrEqual,
    /// Strictly less than.
    LessThan,
    /// Less than or equal.
    LessThanOrEqual,
    /// Set membership.
    In,
    /// Negated set membership.
    NotIn,
    /// Null test.
    IsNull,
    /// Negated null test.
    NotNull,
    /// Contains-style pattern match.
    Like,
    /// Negated pattern match.
    NotLike,
    /// Case-insensitive equality.
    IgnoreCaseEqual,
    /// Case-insensitive pattern match.
    IgnoreCaseLike,
    /// Negated case-insensitive pattern match.
    IgnoreCaseNotLike,
    /// Inclusive range test over two bounds.
    Between,
    /// Negated range test.
    NotBetween,
    /// An operator symbol handled by a registered custom predicate builder.
    Custom(String),
}

/// Argument count a given operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No arguments (null tests).
    Zero,
    /// Exactly one argument.
    One,
    /// Exactly two arguments (range bounds).
    Two,
    /// One or more arguments (set membership).
    AtLeastOne,
    /// No fixed rule; the registered builder decides.
    Any,
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Arity::Zero => "no",
            Arity::One => "exactly one",
            Arity::Two => "exactly two",
            Arity::AtLeastOne => "at least one",
            Arity::Any => "any number of",
        };
        write!(f, "{s}")
    }
}

impl Operator {
    /// The argument count this operator accepts.
    pub fn arity(&self) -> Arity {
        match self {
            Operator::IsNull | Operator::NotNull => Arity::Zero,
            Operator::Between | Operator::NotBetween => Arity::Two,
            Operator::In | Operator::NotIn => Arity::AtLeastOne,
            Operator::Custom(_) => Arity::Any,
            _ => Arity::One,
        }
    }

    /// Whether this operator is the negated member of its family.
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Operator::NotEqual
                | Operator::NotIn
                | Operator::IsNull
                | Operator::NotLike
                | Operator::IgnoreCaseNotLike
                | Operator::NotBetween
        )
    }

    /// The positive counterpart of a negated operator.
    ///
    /// `IsNull` pairs with `NotNull`: the positive template is the
    /// exists-and-not-null test, which negation inverts.
    pub fn positive(&self) -> Operator {
        match self {
            Operator::NotEqual => Operator::Equal,
            Operator::NotIn => Operator::In,
            Operator::IsNull => Operator::NotNull,
            Operator::NotLike => Operator::Like,
            Operator::IgnoreCaseNotLike => Operator::IgnoreCaseLike,
            Operator::NotBetween => Operator::Between,
            other => other.clone(),
        }
    }

    /// Whether this operator compares magnitudes and therefore needs an
    /// ordered operand type.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThan
                | Operator::LessThanOrEqual
                | Operator::Between
                | Operator::NotBetween
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => "=gt=",
            Operator::GreaterThanOrEqual => "=ge=",
            Operator::LessThan => "=lt=",
            Operator::LessThanOrEqual => "=le=",
            Operator::In => "=in=",
            Operator::NotIn => "=out=",
            Operator::IsNull => "=isnull=",
            Operator::NotNull => "=notnull=",
            Operator::Like => "=like=",
            Operator::NotLike => "=notlike=",
            Operator::IgnoreCaseEqual => "=icase=",
            Operator::IgnoreCaseLike => "=ilike=",
            Operator::IgnoreCaseNotLike => "=inotlike=",
            Operator::Between => "=bt=",
            Operator::NotBetween => "=nb=",
            Operator::Custom(symbol) => symbol,
        };
        write!(f, "{s}")
    }
}
