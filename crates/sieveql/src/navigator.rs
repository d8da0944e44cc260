//! Selector navigation against the entity schema graph.
//!
//! A navigator lives for exactly one compile call. It walks each dotted
//! selector hop by hop, applying aliases and remaps, checking access at
//! every hop, and materializing joins as it crosses associations. Joins
//! are deduplicated per `(parent join, attribute)` so that every branch of
//! the predicate tree referencing the same association shares one join.

use crate::acl::AccessDecision;
use crate::config::CompileConfig;
use crate::error::CompileError;
use crate::schema::{
    AttributeDescriptor, AttributeKind, Cardinality, CollectionElement, EntitySchema, ScalarType,
    SchemaRegistry,
};
use sieveql_ir::{JoinId, JoinSpec, PathRef};
use std::collections::HashMap;
use tracing::trace;

/// What a fully-resolved selector terminates at.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    /// A typed scalar column.
    Scalar(ScalarType),
    /// A JSON document column plus the key path below it, handed to the
    /// JSON sub-compiler.
    Document {
        /// Keys navigated below the document column.
        keys: Vec<String>,
    },
}

/// One hop taken while resolving a selector.
#[derive(Debug, Clone, PartialEq)]
pub struct PathHop {
    /// Entity type the hop was resolved against.
    pub entity: String,
    /// The attribute crossed.
    pub attribute: AttributeDescriptor,
    /// Join materialized for this hop, if any.
    pub join: Option<JoinId>,
}

/// A selector resolved to a column reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// Hops taken, in order.
    pub hops: Vec<PathHop>,
    /// The resolved column reference.
    pub path: PathRef,
    /// What the path terminates at.
    pub terminal: Terminal,
}

impl ResolvedPath {
    /// Descriptor of the attribute the path terminates at.
    pub fn terminal_attribute(&self) -> &AttributeDescriptor {
        &self.hops[self.hops.len() - 1].attribute
    }

    /// Whether any hop fans out to multiple rows.
    pub fn fans_out(&self) -> bool {
        self.hops.iter().any(|h| h.attribute.is_collection())
    }
}

/// Per-compile selector resolver and join builder.
pub struct Navigator<'a> {
    registry: &'a SchemaRegistry,
    config: &'a CompileConfig,
    joins: Vec<JoinSpec>,
    cache: HashMap<(Option<JoinId>, String), JoinId>,
}

impl<'a> Navigator<'a> {
    /// Create a navigator for one compile call.
    pub fn new(registry: &'a SchemaRegistry, config: &'a CompileConfig) -> Self {
        Self {
            registry,
            config,
            joins: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Joins materialized so far, in creation order.
    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    /// Consume the navigator, yielding its joins.
    pub fn into_joins(self) -> Vec<JoinSpec> {
        self.joins
    }

    /// Resolve a dotted selector against the root entity type.
    pub fn resolve(&mut self, root: &str, selector: &str) -> Result<ResolvedPath, CompileError> {
        trace!(root, selector, "resolving selector");
        let mut schema = self.registry.entity(root)?;
        let mut remaining: Vec<String> = selector
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if remaining.is_empty() {
            return Err(CompileError::unknown_property(root, selector));
        }

        let mut anchor: Option<JoinId> = None;
        let mut column: Vec<String> = Vec::new();
        let mut canonical: Vec<String> = Vec::new();
        let mut hops: Vec<PathHop> = Vec::new();
        let mut expanded = false;

        while !remaining.is_empty() {
            if !expanded {
                if let Some(path) = self.config.path_aliases.get(&remaining.join(".")) {
                    remaining = path.split('.').map(str::to_string).collect();
                    expanded = true;
                    continue;
                }
                if let Some(path) = self.config.path_aliases.get(&remaining[0]) {
                    let mut spliced: Vec<String> =
                        path.split('.').map(str::to_string).collect();
                    spliced.extend(remaining.drain(1..));
                    remaining = spliced;
                    expanded = true;
                    continue;
                }
            }
            expanded = false;
            let mut segment = remaining.remove(0);
            if let Some(remap) = self.config.selector_remaps.get(&schema.name) {
                if let Some(renamed) = remap.get(&segment) {
                    segment = renamed.clone();
                }
            }

            let attribute = schema
                .get_attribute(&segment)
                .ok_or_else(|| CompileError::unknown_property(&schema.name, &segment))?
                .clone();
            if let AccessDecision::Deny(reason) =
                self.config.access.check(&schema.name, &attribute.name)
            {
                return Err(CompileError::denied(&schema.name, &attribute.name, reason));
            }
            canonical.push(attribute.name.clone());

            let kind = attribute.kind.clone();
            match &kind {
                AttributeKind::Scalar(scalar) => {
                    if !remaining.is_empty() {
                        return Err(CompileError::unknown_property(
                            scalar.type_name(),
                            remaining.remove(0),
                        ));
                    }
                    let terminal = Terminal::Scalar(self.effective_type(
                        &schema.name,
                        &attribute.name,
                        scalar.clone(),
                    ));
                    column.push(attribute.name.clone());
                    hops.push(PathHop {
                        entity: schema.name.clone(),
                        attribute,
                        join: anchor,
                    });
                    return Ok(ResolvedPath {
                        hops,
                        path: PathRef {
                            join: anchor,
                            column,
                            segments: canonical,
                        },
                        terminal,
                    });
                }
                AttributeKind::Association {
                    target,
                    cardinality,
                } => {
                    let target_schema = self.registry.entity(target)?;
                    let shortcut = remaining.len() == 1
                        && remaining[0] == target_schema.identity
                        && *cardinality != Cardinality::ManyToMany;
                    if remaining.is_empty() || shortcut {
                        return self.finish_on_identity(
                            &schema,
                            attribute,
                            &target_schema,
                            shortcut,
                            selector,
                            anchor,
                            column,
                            canonical,
                            hops,
                        );
                    }
                    let join = self.join_to(
                        anchor,
                        &schema.name,
                        &attribute.name,
                        &target_schema.name,
                    );
                    hops.push(PathHop {
                        entity: schema.name.clone(),
                        attribute,
                        join: Some(join),
                    });
                    anchor = Some(join);
                    schema = target_schema;
                    column.clear();
                }
                AttributeKind::Embedded { target } => {
                    if remaining.is_empty() {
                        return Err(CompileError::NonTerminalSelector(selector.to_string()));
                    }
                    column.push(attribute.name.clone());
                    hops.push(PathHop {
                        entity: schema.name.clone(),
                        attribute,
                        join: anchor,
                    });
                    schema = self.registry.entity(target)?;
                }
                AttributeKind::ElementCollection { element } => match element {
                    CollectionElement::Scalar(scalar) => {
                        if !remaining.is_empty() {
                            return Err(CompileError::unknown_property(
                                scalar.type_name(),
                                remaining.remove(0),
                            ));
                        }
                        let target = format!("{}.{}", schema.name, attribute.name);
                        let join =
                            self.join_to(anchor, &schema.name, &attribute.name, &target);
                        let terminal = Terminal::Scalar(self.effective_type(
                            &schema.name,
                            &attribute.name,
                            scalar.clone(),
                        ));
                        hops.push(PathHop {
                            entity: schema.name.clone(),
                            attribute,
                            join: Some(join),
                        });
                        // An empty chain is the joined element value itself.
                        return Ok(ResolvedPath {
                            hops,
                            path: PathRef {
                                join: Some(join),
                                column: Vec::new(),
                                segments: canonical,
                            },
                            terminal,
                        });
                    }
                    CollectionElement::Structured(target) => {
                        let target_schema = self.registry.entity(target)?;
                        if remaining.is_empty() {
                            return Err(CompileError::NonTerminalSelector(
                                selector.to_string(),
                            ));
                        }
                        let join = self.join_to(
                            anchor,
                            &schema.name,
                            &attribute.name,
                            &target_schema.name,
                        );
                        hops.push(PathHop {
                            entity: schema.name.clone(),
                            attribute,
                            join: Some(join),
                        });
                        anchor = Some(join);
                        schema = target_schema;
                        column.clear();
                    }
                },
                AttributeKind::Json => {
                    let keys: Vec<String> = remaining.drain(..).collect();
                    canonical.extend(keys.iter().cloned());
                    column.push(attribute.name.clone());
                    hops.push(PathHop {
                        entity: schema.name.clone(),
                        attribute,
                        join: anchor,
                    });
                    return Ok(ResolvedPath {
                        hops,
                        path: PathRef {
                            join: anchor,
                            column,
                            segments: canonical,
                        },
                        terminal: Terminal::Document { keys },
                    });
                }
            }
        }
        Err(CompileError::NonTerminalSelector(selector.to_string()))
    }

    /// Terminate a selector on an association without joining: the local
    /// foreign key column stands in for the target identity. Covers both a
    /// bare association terminal and an explicit `.identity` suffix.
    #[allow(clippy::too_many_arguments)]
    fn finish_on_identity(
        &mut self,
        schema: &EntitySchema,
        attribute: AttributeDescriptor,
        target_schema: &EntitySchema,
        explicit: bool,
        selector: &str,
        anchor: Option<JoinId>,
        mut column: Vec<String>,
        mut canonical: Vec<String>,
        mut hops: Vec<PathHop>,
    ) -> Result<ResolvedPath, CompileError> {
        let identity = target_schema
            .identity_attribute()
            .ok_or_else(|| {
                CompileError::unknown_property(&target_schema.name, &target_schema.identity)
            })?
            .clone();
        let AttributeKind::Scalar(scalar) = &identity.kind else {
            return Err(CompileError::NonTerminalSelector(selector.to_string()));
        };
        if explicit {
            if let AccessDecision::Deny(reason) =
                self.config.access.check(&target_schema.name, &identity.name)
            {
                return Err(CompileError::denied(
                    &target_schema.name,
                    &identity.name,
                    reason,
                ));
            }
            canonical.push(identity.name.clone());
        }
        let terminal = Terminal::Scalar(self.effective_type(
            &target_schema.name,
            &identity.name,
            scalar.clone(),
        ));
        column.push(attribute.name.clone());
        hops.push(PathHop {
            entity: schema.name.clone(),
            attribute,
            join: anchor,
        });
        hops.push(PathHop {
            entity: target_schema.name.clone(),
            attribute: identity,
            join: anchor,
        });
        Ok(ResolvedPath {
            hops,
            path: PathRef {
                join: anchor,
                column,
                segments: canonical,
            },
            terminal,
        })
    }

    fn join_to(
        &mut self,
        parent: Option<JoinId>,
        owner: &str,
        attribute: &str,
        target: &str,
    ) -> JoinId {
        let key = (parent, attribute.to_string());
        if let Some(id) = self.cache.get(&key) {
            return *id;
        }
        let kind = self
            .config
            .join_hints
            .get(&format!("{owner}.{attribute}"))
            .copied()
            .unwrap_or_default();
        let id = self.joins.len();
        self.joins.push(JoinSpec {
            id,
            parent,
            owner: owner.to_string(),
            attribute: attribute.to_string(),
            target: target.to_string(),
            kind,
        });
        self.cache.insert(key, id);
        id
    }

    fn effective_type(&self, entity: &str, attribute: &str, declared: ScalarType) -> ScalarType {
        self.config
            .type_overrides
            .get(&format!("{entity}.{attribute}"))
            .cloned()
            .unwrap_or(declared)
    }
}

/// Convenience accessor for a resolved scalar terminal.
impl Terminal {
    /// The scalar type, if this terminal is typed.
    pub fn scalar(&self) -> Option<&ScalarType> {
        match self {
            Terminal::Scalar(scalar) => Some(scalar),
            Terminal::Document { .. } => None,
        }
    }
}
