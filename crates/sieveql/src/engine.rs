//! The query-compilation engine.
//!
//! Recursive descent over the parsed filter tree: logical nodes combine
//! child predicates, comparison nodes go through path resolution, argument
//! coercion and operator semantics. Negated operators compile as logical
//! NOT around their positive counterpart, so backends only need positive
//! templates.

use crate::coerce::ConverterRegistry;
use crate::config::CompileConfig;
use crate::custom::CustomPredicateInput;
use crate::error::CompileError;
use crate::json;
use crate::navigator::{Navigator, ResolvedPath, Terminal};
use crate::schema::{ScalarType, SchemaRegistry};
use crate::sort;
use sieveql_ir::{
    CmpOp, ComparisonSpec, CompiledQuery, CompiledSort, Node, Operator, Predicate, Value,
};
use std::sync::Arc;
use tracing::debug;

/// Compiles filter ASTs and sort specifications against a schema registry.
///
/// The engine itself is immutable and shared across request threads; all
/// per-call knobs travel in the [`CompileConfig`] argument and all
/// per-call state lives in a fresh [`Navigator`].
pub struct QueryEngine {
    registry: Arc<SchemaRegistry>,
    converters: Arc<ConverterRegistry>,
}

impl QueryEngine {
    /// Create an engine with the built-in converters.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            converters: Arc::new(ConverterRegistry::new()),
        }
    }

    /// Create an engine with a caller-supplied converter table.
    pub fn with_converters(
        registry: Arc<SchemaRegistry>,
        converters: Arc<ConverterRegistry>,
    ) -> Self {
        Self {
            registry,
            converters,
        }
    }

    /// Compile a filter AST against the root entity type.
    pub fn compile(
        &self,
        root: &str,
        ast: &Node,
        config: &CompileConfig,
    ) -> Result<CompiledQuery, CompileError> {
        debug!(root, "compiling filter");
        let mut navigator = Navigator::new(&self.registry, config);
        let predicate = self.compile_node(&mut navigator, root, ast, ast, config)?;
        Ok(CompiledQuery {
            root: root.to_string(),
            joins: navigator.into_joins(),
            predicate,
            distinct: config.distinct,
        })
    }

    /// Compile a sort specification against the root entity type.
    pub fn compile_sort(
        &self,
        root: &str,
        spec: &str,
        config: &CompileConfig,
    ) -> Result<CompiledSort, CompileError> {
        debug!(root, spec, "compiling sort");
        let mut navigator = Navigator::new(&self.registry, config);
        let orders = sort::compile(&mut navigator, root, spec)?;
        Ok(CompiledSort {
            root: root.to_string(),
            joins: navigator.into_joins(),
            orders,
        })
    }

    fn compile_node(
        &self,
        navigator: &mut Navigator<'_>,
        root: &str,
        node: &Node,
        ast_root: &Node,
        config: &CompileConfig,
    ) -> Result<Predicate, CompileError> {
        match node {
            Node::And(children) => {
                let compiled = children
                    .iter()
                    .map(|c| self.compile_node(navigator, root, c, ast_root, config))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Predicate::And(compiled))
            }
            Node::Or(children) => {
                let compiled = children
                    .iter()
                    .map(|c| self.compile_node(navigator, root, c, ast_root, config))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Predicate::Or(compiled))
            }
            Node::Comparison(spec) => {
                self.compile_comparison(navigator, root, spec, ast_root, config)
            }
        }
    }

    fn compile_comparison(
        &self,
        navigator: &mut Navigator<'_>,
        root: &str,
        spec: &ComparisonSpec,
        ast_root: &Node,
        config: &CompileConfig,
    ) -> Result<Predicate, CompileError> {
        let resolved = navigator.resolve(root, &spec.selector)?;
        match resolved.terminal.clone() {
            Terminal::Document { keys } => {
                let (expression, inverted) =
                    json::compile_json_test(&spec.operator, &keys, &spec.arguments)?;
                let test = Predicate::JsonTest {
                    path: resolved.path.clone(),
                    expression,
                };
                Ok(if inverted { Predicate::not(test) } else { test })
            }
            Terminal::Scalar(scalar) => {
                if let Some(custom) = config.custom_predicates.get(&spec.operator) {
                    let arguments: Vec<Value> = spec
                        .arguments
                        .iter()
                        .map(|a| self.converters.coerce(a, &custom.target))
                        .collect();
                    let input = CustomPredicateInput {
                        path: &resolved,
                        attribute: resolved.terminal_attribute(),
                        arguments: &arguments,
                        root: ast_root,
                    };
                    return (custom.builder)(input);
                }
                self.default_semantics(&spec.operator, &resolved, &scalar, &spec.arguments, config)
            }
        }
    }

    fn default_semantics(
        &self,
        operator: &Operator,
        resolved: &ResolvedPath,
        scalar: &ScalarType,
        arguments: &[String],
        config: &CompileConfig,
    ) -> Result<Predicate, CompileError> {
        let path = resolved.path.clone();
        match operator {
            Operator::IsNull | Operator::NotNull => {
                if !arguments.is_empty() {
                    return Err(CompileError::arity(operator, arguments.len()));
                }
                let test = Predicate::is_null(path);
                Ok(if *operator == Operator::NotNull {
                    Predicate::not(test)
                } else {
                    test
                })
            }
            Operator::Equal | Operator::NotEqual | Operator::IgnoreCaseEqual => {
                if arguments.is_empty() {
                    return Err(CompileError::arity(operator, 0));
                }
                if arguments.len() > 1 {
                    // Multi-argument equality degrades to membership.
                    let membership = Predicate::In {
                        path,
                        values: self.coerce_all(arguments, scalar),
                    };
                    return Ok(if *operator == Operator::NotEqual {
                        Predicate::not(membership)
                    } else {
                        membership
                    });
                }
                let base_ignore_case = *operator == Operator::IgnoreCaseEqual;
                let equality = self.textual_equality(
                    path,
                    scalar,
                    &arguments[0],
                    base_ignore_case,
                    *operator != Operator::IgnoreCaseEqual && !config.strict_equality,
                );
                Ok(if *operator == Operator::NotEqual {
                    Predicate::not(equality)
                } else {
                    equality
                })
            }
            Operator::GreaterThan
            | Operator::GreaterThanOrEqual
            | Operator::LessThan
            | Operator::LessThanOrEqual => {
                if arguments.len() != 1 {
                    return Err(CompileError::arity(operator, arguments.len()));
                }
                self.require_ordered(operator, scalar)?;
                let op = match operator {
                    Operator::GreaterThan => CmpOp::Gt,
                    Operator::GreaterThanOrEqual => CmpOp::Ge,
                    Operator::LessThan => CmpOp::Lt,
                    _ => CmpOp::Le,
                };
                Ok(Predicate::Cmp {
                    path,
                    op,
                    value: self.converters.coerce(&arguments[0], scalar),
                })
            }
            Operator::In | Operator::NotIn => {
                if arguments.is_empty() {
                    return Err(CompileError::arity(operator, 0));
                }
                let membership = Predicate::In {
                    path,
                    values: self.coerce_all(arguments, scalar),
                };
                Ok(if *operator == Operator::NotIn {
                    Predicate::not(membership)
                } else {
                    membership
                })
            }
            Operator::Between | Operator::NotBetween => {
                if arguments.len() != 2 {
                    return Err(CompileError::arity(operator, arguments.len()));
                }
                self.require_ordered(operator, scalar)?;
                let range = Predicate::Between {
                    path,
                    low: self.converters.coerce(&arguments[0], scalar),
                    high: self.converters.coerce(&arguments[1], scalar),
                };
                Ok(if *operator == Operator::NotBetween {
                    Predicate::not(range)
                } else {
                    range
                })
            }
            Operator::Like
            | Operator::NotLike
            | Operator::IgnoreCaseLike
            | Operator::IgnoreCaseNotLike => {
                if arguments.len() != 1 {
                    return Err(CompileError::arity(operator, arguments.len()));
                }
                let ignore_case = matches!(
                    operator,
                    Operator::IgnoreCaseLike | Operator::IgnoreCaseNotLike
                );
                let like = Predicate::Like {
                    path,
                    pattern: like_pattern(&arguments[0]),
                    ignore_case,
                };
                Ok(if operator.is_negated() {
                    Predicate::not(like)
                } else {
                    like
                })
            }
            Operator::Custom(_) => Err(CompileError::UnsupportedOperator(operator.clone())),
        }
    }

    /// Equality over a single argument, honoring `*` and `^` markers on
    /// string attributes unless disabled.
    fn textual_equality(
        &self,
        path: sieveql_ir::PathRef,
        scalar: &ScalarType,
        raw: &str,
        base_ignore_case: bool,
        markers: bool,
    ) -> Predicate {
        if markers && *scalar == ScalarType::String {
            let has_wildcard = raw.contains('*');
            let has_caret = raw.contains('^');
            if has_wildcard {
                let stripped: String = raw.chars().filter(|c| *c != '^').collect();
                return Predicate::Like {
                    path,
                    pattern: stripped.replace('*', "%"),
                    ignore_case: has_caret || base_ignore_case,
                };
            }
            if has_caret {
                let stripped: String = raw.chars().filter(|c| *c != '^').collect();
                return Predicate::Eq {
                    path,
                    value: Value::String(stripped),
                    ignore_case: true,
                };
            }
        }
        Predicate::Eq {
            path,
            value: self.converters.coerce(raw, scalar),
            ignore_case: base_ignore_case,
        }
    }

    fn coerce_all(&self, arguments: &[String], scalar: &ScalarType) -> Vec<Value> {
        arguments
            .iter()
            .map(|a| self.converters.coerce(a, scalar))
            .collect()
    }

    fn require_ordered(
        &self,
        operator: &Operator,
        scalar: &ScalarType,
    ) -> Result<(), CompileError> {
        if scalar.is_ordered() {
            Ok(())
        } else {
            Err(CompileError::TypeMismatch {
                operator: operator.clone(),
                type_name: scalar.type_name(),
            })
        }
    }
}

/// Wrap a LIKE argument as a contains pattern unless it carries explicit
/// wildcards.
fn like_pattern(raw: &str) -> String {
    if raw.contains('*') {
        raw.replace('*', "%")
    } else {
        format!("%{raw}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeDescriptor, Cardinality, EntitySchema};
    use sieveql_ir::Arity;

    fn engine() -> QueryEngine {
        let registry = SchemaRegistry::new();
        registry.register(
            EntitySchema::new("User", "id")
                .with_attribute(AttributeDescriptor::scalar("id", ScalarType::Uuid))
                .with_attribute(AttributeDescriptor::scalar("name", ScalarType::String))
                .with_attribute(AttributeDescriptor::scalar("age", ScalarType::Int32))
                .with_attribute(AttributeDescriptor::scalar("active", ScalarType::Bool))
                .with_attribute(AttributeDescriptor::association(
                    "company",
                    "Company",
                    Cardinality::ToOne,
                )),
        );
        registry.register(
            EntitySchema::new("Company", "id")
                .with_attribute(AttributeDescriptor::scalar("id", ScalarType::Int64))
                .with_attribute(AttributeDescriptor::scalar("name", ScalarType::String)),
        );
        QueryEngine::new(Arc::new(registry))
    }

    fn compile_one(node: Node) -> Result<CompiledQuery, CompileError> {
        engine().compile("User", &node, &CompileConfig::new())
    }

    #[test]
    fn test_plain_equality() {
        let compiled =
            compile_one(Node::comparison("name", Operator::Equal, ["acme"])).unwrap();
        assert_eq!(
            compiled.predicate,
            Predicate::Eq {
                path: sieveql_ir::PathRef {
                    join: None,
                    column: vec!["name".into()],
                    segments: vec!["name".into()],
                },
                value: Value::String("acme".into()),
                ignore_case: false,
            }
        );
        assert!(compiled.joins.is_empty());
        assert!(!compiled.distinct);
    }

    #[test]
    fn test_wildcard_marker_becomes_like() {
        let compiled =
            compile_one(Node::comparison("name", Operator::Equal, ["*Inc*"])).unwrap();
        assert!(matches!(
            compiled.predicate,
            Predicate::Like { ref pattern, ignore_case: false, .. } if pattern == "%Inc%"
        ));
    }

    #[test]
    fn test_caret_marker_becomes_ignore_case() {
        let compiled =
            compile_one(Node::comparison("name", Operator::Equal, ["^abc"])).unwrap();
        assert!(matches!(
            compiled.predicate,
            Predicate::Eq { ref value, ignore_case: true, .. }
                if *value == Value::String("abc".into())
        ));
    }

    #[test]
    fn test_both_markers() {
        let compiled =
            compile_one(Node::comparison("name", Operator::Equal, ["^*Inc*"])).unwrap();
        assert!(matches!(
            compiled.predicate,
            Predicate::Like { ref pattern, ignore_case: true, .. } if pattern == "%Inc%"
        ));
    }

    #[test]
    fn test_strict_equality_disables_markers() {
        let compiled = engine()
            .compile(
                "User",
                &Node::comparison("name", Operator::Equal, ["*Inc*"]),
                &CompileConfig::new().strict_equality(true),
            )
            .unwrap();
        assert!(matches!(
            compiled.predicate,
            Predicate::Eq { ref value, .. } if *value == Value::String("*Inc*".into())
        ));
    }

    #[test]
    fn test_markers_ignored_on_non_string() {
        let compiled = compile_one(Node::comparison("age", Operator::Equal, ["*1*"])).unwrap();
        // Not a string attribute: the marker is not interpreted and the
        // literal fails numeric coercion.
        assert!(matches!(
            compiled.predicate,
            Predicate::Eq { ref value, .. } if *value == Value::Null
        ));
    }

    #[test]
    fn test_multi_argument_equality_degrades_to_in() {
        let compiled =
            compile_one(Node::comparison("age", Operator::Equal, ["1", "2"])).unwrap();
        assert!(matches!(
            compiled.predicate,
            Predicate::In { ref values, .. }
                if *values == vec![Value::Int32(1), Value::Int32(2)]
        ));

        let compiled =
            compile_one(Node::comparison("age", Operator::NotEqual, ["1", "2"])).unwrap();
        assert!(matches!(compiled.predicate, Predicate::Not(_)));
    }

    #[test]
    fn test_ordering_requires_ordered_type() {
        let err = compile_one(Node::comparison("active", Operator::GreaterThan, ["true"]))
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::TypeMismatch {
                operator: Operator::GreaterThan,
                type_name: "bool".into(),
            }
        );
    }

    #[test]
    fn test_arity_violations() {
        let err = compile_one(Node::comparison("age", Operator::Between, ["1"])).unwrap_err();
        assert_eq!(
            err,
            CompileError::ArityMismatch {
                operator: Operator::Between,
                expected: Arity::Two,
                got: 1,
            }
        );

        let err =
            compile_one(Node::comparison("age", Operator::IsNull, ["x"])).unwrap_err();
        assert!(matches!(err, CompileError::ArityMismatch { .. }));

        let err =
            compile_one(Node::comparison("age", Operator::GreaterThan, ["1", "2"])).unwrap_err();
        assert!(matches!(err, CompileError::ArityMismatch { .. }));

        let err = compile_one(Node::comparison("age", Operator::In, Vec::<String>::new()))
            .unwrap_err();
        assert!(matches!(err, CompileError::ArityMismatch { .. }));
    }

    #[test]
    fn test_null_tests() {
        let compiled =
            compile_one(Node::comparison("name", Operator::IsNull, Vec::<String>::new()))
                .unwrap();
        assert!(matches!(compiled.predicate, Predicate::IsNull { .. }));

        let compiled =
            compile_one(Node::comparison("name", Operator::NotNull, Vec::<String>::new()))
                .unwrap();
        assert!(matches!(compiled.predicate, Predicate::Not(_)));
    }

    #[test]
    fn test_like_wraps_contains() {
        let compiled = compile_one(Node::comparison("name", Operator::Like, ["Inc"])).unwrap();
        assert!(matches!(
            compiled.predicate,
            Predicate::Like { ref pattern, .. } if pattern == "%Inc%"
        ));

        let compiled =
            compile_one(Node::comparison("name", Operator::Like, ["Inc*"])).unwrap();
        assert!(matches!(
            compiled.predicate,
            Predicate::Like { ref pattern, .. } if pattern == "Inc%"
        ));
    }

    #[test]
    fn test_logical_nodes_combine_children() {
        let ast = Node::and(vec![
            Node::comparison("name", Operator::Equal, ["acme"]),
            Node::or(vec![
                Node::comparison("age", Operator::GreaterThan, ["18"]),
                Node::comparison("age", Operator::IsNull, Vec::<String>::new()),
            ]),
        ]);
        let compiled = compile_one(ast).unwrap();
        if let Predicate::And(children) = &compiled.predicate {
            assert_eq!(children.len(), 2);
            assert!(matches!(children[1], Predicate::Or(_)));
        } else {
            panic!("expected And");
        }
    }

    #[test]
    fn test_unregistered_custom_operator() {
        let err = compile_one(Node::comparison(
            "age",
            Operator::Custom("=near=".into()),
            ["5"],
        ))
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedOperator(Operator::Custom("=near=".into()))
        );
    }

    #[test]
    fn test_joins_shared_across_branches() {
        let ast = Node::and(vec![
            Node::comparison("company.name", Operator::Equal, ["acme"]),
            Node::comparison("company.name", Operator::NotEqual, ["other"]),
        ]);
        let compiled = compile_one(ast).unwrap();
        assert_eq!(compiled.joins.len(), 1);
    }
}
