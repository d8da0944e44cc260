//! Per-compile configuration.
//!
//! Everything that shapes a single compilation is carried here explicitly
//! instead of living in process-wide mutable state: path aliases, selector
//! remaps, join kind hints, type overrides, access tables, and custom
//! predicate builders. A config is cheap to clone and is not mutated by
//! the engine.

use crate::acl::AccessTables;
use crate::custom::CustomPredicateRegistry;
use crate::schema::ScalarType;
use sieveql_ir::JoinKind;
use std::collections::HashMap;

/// Configuration for one compile call.
#[derive(Debug, Clone, Default)]
pub struct CompileConfig {
    /// Selector rewrites applied before navigation. A key matching the
    /// whole remaining path, or a single leading segment, is replaced by
    /// its (possibly dotted) expansion.
    pub path_aliases: HashMap<String, String>,
    /// Per-type attribute renames, keyed by owner type name then by the
    /// incoming attribute name.
    pub selector_remaps: HashMap<String, HashMap<String, String>>,
    /// Join kind overrides keyed `"OwnerType.attribute"`. Associations
    /// without a hint join as [`JoinKind::Left`].
    pub join_hints: HashMap<String, JoinKind>,
    /// Attribute type overrides keyed `"OwnerType.attribute"`, applied
    /// after navigation and before coercion.
    pub type_overrides: HashMap<String, ScalarType>,
    /// Field-level whitelist and blacklist tables.
    pub access: AccessTables,
    /// Builders that take over compilation of specific operators.
    pub custom_predicates: CustomPredicateRegistry,
    /// Request duplicate elimination on the compiled query.
    pub distinct: bool,
    /// Disable `*` and `^` marker interpretation on textual equality.
    pub strict_equality: bool,
}

impl CompileConfig {
    /// Create a default configuration: no aliases, no access restrictions,
    /// left joins, markers enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path alias.
    pub fn with_alias(mut self, alias: impl Into<String>, path: impl Into<String>) -> Self {
        self.path_aliases.insert(alias.into(), path.into());
        self
    }

    /// Add a per-type attribute rename.
    pub fn with_selector_remap(
        mut self,
        entity: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.selector_remaps
            .entry(entity.into())
            .or_default()
            .insert(from.into(), to.into());
        self
    }

    /// Override the join kind for an association, keyed
    /// `"OwnerType.attribute"`.
    pub fn with_join_hint(mut self, association: impl Into<String>, kind: JoinKind) -> Self {
        self.join_hints.insert(association.into(), kind);
        self
    }

    /// Override the declared type of an attribute, keyed
    /// `"OwnerType.attribute"`.
    pub fn with_type_override(
        mut self,
        attribute: impl Into<String>,
        scalar: ScalarType,
    ) -> Self {
        self.type_overrides.insert(attribute.into(), scalar);
        self
    }

    /// Whitelist attributes on a type.
    pub fn whitelist<I>(mut self, entity: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.access.whitelist(entity, attributes);
        self
    }

    /// Blacklist attributes on a type.
    pub fn blacklist<I>(mut self, entity: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.access.blacklist(entity, attributes);
        self
    }

    /// Request duplicate elimination.
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Treat `*` and `^` in textual equality arguments as plain characters.
    pub fn strict_equality(mut self, strict: bool) -> Self {
        self.strict_equality = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = CompileConfig::new()
            .with_alias("n", "name")
            .with_selector_remap("User", "login", "username")
            .with_join_hint("User.company", JoinKind::Inner)
            .with_type_override("User.code", ScalarType::Int64)
            .whitelist("User", ["id", "name"])
            .distinct(true)
            .strict_equality(true);

        assert_eq!(config.path_aliases.get("n").unwrap(), "name");
        assert_eq!(
            config.selector_remaps.get("User").unwrap().get("login").unwrap(),
            "username"
        );
        assert_eq!(
            config.join_hints.get("User.company"),
            Some(&JoinKind::Inner)
        );
        assert_eq!(
            config.type_overrides.get("User.code"),
            Some(&ScalarType::Int64)
        );
        assert!(config.distinct);
        assert!(config.strict_equality);
    }
}
