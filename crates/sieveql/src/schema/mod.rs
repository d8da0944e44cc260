//! Entity schema model and registry.

mod attribute;
mod registry;

pub use attribute::{
    AttributeDescriptor, AttributeKind, Cardinality, CollectionElement, EntitySchema, ScalarType,
};
pub use registry::{SchemaProvider, SchemaRegistry};
