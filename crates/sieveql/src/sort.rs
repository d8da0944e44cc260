//! Sort specification compilation.
//!
//! Grammar: segments separated by `;`, each `path[,direction[,ic]]`.
//! Direction matches "asc"/"desc" case-insensitively and defaults to
//! ascending for any other token. The `ic` token requests case-insensitive
//! ordering, honored only when the resolved type is textual. Paths go
//! through the same navigator as filters, so aliases, remaps and access
//! control apply identically.

use crate::error::CompileError;
use crate::navigator::{Navigator, Terminal};
use sieveql_ir::{OrderDirection, OrderSpec};

/// Compile a sort specification into ordering terms.
pub fn compile(
    navigator: &mut Navigator<'_>,
    root: &str,
    spec: &str,
) -> Result<Vec<OrderSpec>, CompileError> {
    let mut orders = Vec::new();
    for segment in spec.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let mut tokens = segment.split(',').map(str::trim);
        let selector = tokens.next().unwrap_or("");
        if selector.is_empty() {
            return Err(CompileError::InvalidSort(format!(
                "missing path in segment '{segment}'"
            )));
        }
        let direction = match tokens.next() {
            Some(token) if token.eq_ignore_ascii_case("desc") => OrderDirection::Desc,
            _ => OrderDirection::Asc,
        };
        let ic_requested = tokens.next().is_some_and(|t| t.eq_ignore_ascii_case("ic"));

        let resolved = navigator.resolve(root, selector)?;
        let ignore_case = match &resolved.terminal {
            Terminal::Scalar(scalar) => ic_requested && scalar.is_textual(),
            Terminal::Document { .. } => {
                return Err(CompileError::InvalidSort(format!(
                    "cannot order by document path '{selector}'"
                )))
            }
        };
        orders.push(OrderSpec {
            path: resolved.path,
            direction,
            ignore_case,
        });
    }
    if orders.is_empty() {
        return Err(CompileError::InvalidSort("empty specification".to_string()));
    }
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileConfig;
    use crate::schema::{
        AttributeDescriptor, Cardinality, EntitySchema, ScalarType, SchemaRegistry,
    };

    fn registry() -> SchemaRegistry {
        let registry = SchemaRegistry::new();
        registry.register(
            EntitySchema::new("User", "id")
                .with_attribute(AttributeDescriptor::scalar("id", ScalarType::Uuid))
                .with_attribute(AttributeDescriptor::scalar("name", ScalarType::String))
                .with_attribute(AttributeDescriptor::scalar("age", ScalarType::Int32))
                .with_attribute(AttributeDescriptor::association(
                    "company",
                    "Company",
                    Cardinality::ToOne,
                ))
                .with_attribute(AttributeDescriptor::json("payload")),
        );
        registry.register(
            EntitySchema::new("Company", "id")
                .with_attribute(AttributeDescriptor::scalar("id", ScalarType::Int64))
                .with_attribute(AttributeDescriptor::scalar("name", ScalarType::String)),
        );
        registry
    }

    #[test]
    fn test_multi_segment_spec() {
        let registry = registry();
        let config = CompileConfig::new();
        let mut nav = Navigator::new(&registry, &config);

        let orders = compile(&mut nav, "User", "name,desc;age").unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].direction, OrderDirection::Desc);
        assert_eq!(orders[1].direction, OrderDirection::Asc);
        assert_eq!(orders[1].path.column, vec!["age"]);
    }

    #[test]
    fn test_direction_defaults_to_ascending() {
        let registry = registry();
        let config = CompileConfig::new();
        let mut nav = Navigator::new(&registry, &config);

        let orders = compile(&mut nav, "User", "name,sideways").unwrap();
        assert_eq!(orders[0].direction, OrderDirection::Asc);
        let orders = compile(&mut nav, "User", "name,DESC").unwrap();
        assert_eq!(orders[0].direction, OrderDirection::Desc);
    }

    #[test]
    fn test_ignore_case_only_on_textual() {
        let registry = registry();
        let config = CompileConfig::new();
        let mut nav = Navigator::new(&registry, &config);

        let orders = compile(&mut nav, "User", "name,asc,ic;age,asc,ic").unwrap();
        assert!(orders[0].ignore_case);
        assert!(!orders[1].ignore_case);
    }

    #[test]
    fn test_association_path_joins() {
        let registry = registry();
        let config = CompileConfig::new();
        let mut nav = Navigator::new(&registry, &config);

        let orders = compile(&mut nav, "User", "company.name,desc").unwrap();
        assert_eq!(orders[0].path.join, Some(0));
        assert_eq!(nav.joins().len(), 1);
    }

    #[test]
    fn test_rejects_empty_and_document_paths() {
        let registry = registry();
        let config = CompileConfig::new();
        let mut nav = Navigator::new(&registry, &config);

        assert!(matches!(
            compile(&mut nav, "User", ""),
            Err(CompileError::InvalidSort(_))
        ));
        assert!(matches!(
            compile(&mut nav, "User", ",desc"),
            Err(CompileError::InvalidSort(_))
        ));
        assert!(matches!(
            compile(&mut nav, "User", "payload.theme"),
            Err(CompileError::InvalidSort(_))
        ));
    }
}
