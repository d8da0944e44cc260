//! Process-lifetime schema registry.
//!
//! Entity schemas are registered manually at startup or pulled lazily from
//! a [`SchemaProvider`] and cached for the life of the process. Lookups
//! happen on every compile from many request threads, so the cache is a
//! concurrent map; writes only occur on first sight of a type.

use super::attribute::EntitySchema;
use crate::error::CompileError;
use dashmap::DashMap;
use std::sync::Arc;

/// External source of schema metadata.
pub trait SchemaProvider: Send + Sync {
    /// Describe a mapped type, or fail with
    /// [`CompileError::NotManaged`] if the type is unknown.
    fn describe(&self, entity: &str) -> Result<EntitySchema, CompileError>;
}

/// Cache of entity schemas keyed by type name.
pub struct SchemaRegistry {
    cache: DashMap<String, Arc<EntitySchema>>,
    provider: Option<Box<dyn SchemaProvider>>,
}

impl SchemaRegistry {
    /// Create an empty registry populated only by [`register`].
    ///
    /// [`register`]: SchemaRegistry::register
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
            provider: None,
        }
    }

    /// Create a registry that resolves unseen types through a provider.
    pub fn with_provider(provider: Box<dyn SchemaProvider>) -> Self {
        Self {
            cache: DashMap::new(),
            provider: Some(provider),
        }
    }

    /// Register a schema, replacing any cached entry of the same name.
    pub fn register(&self, schema: EntitySchema) {
        self.cache.insert(schema.name.clone(), Arc::new(schema));
    }

    /// Look up a type, loading it through the provider on first sight.
    pub fn entity(&self, name: &str) -> Result<Arc<EntitySchema>, CompileError> {
        if let Some(entry) = self.cache.get(name) {
            return Ok(Arc::clone(entry.value()));
        }
        match &self.provider {
            Some(provider) => {
                let schema = Arc::new(provider.describe(name)?);
                self.cache.insert(name.to_string(), Arc::clone(&schema));
                Ok(schema)
            }
            None => Err(CompileError::NotManaged(name.to_string())),
        }
    }

    /// Whether a type is already cached.
    pub fn contains(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
