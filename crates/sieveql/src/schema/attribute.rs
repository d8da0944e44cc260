//! Attribute and entity schema definitions.

/// Scalar data types an attribute can resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Single character.
    Char,
    /// UUID (128-bit identifier).
    Uuid,
    /// Calendar date.
    Date,
    /// Wall-clock time.
    Time,
    /// Timestamp with offset.
    DateTime,
    /// An enumeration compared by variant name.
    Enum {
        /// Name of the enum type.
        name: String,
        /// Allowed variant values.
        variants: Vec<String>,
    },
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32 | ScalarType::Int64 | ScalarType::Float32 | ScalarType::Float64
        )
    }

    /// Check if this type is a date/time type.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ScalarType::Date | ScalarType::Time | ScalarType::DateTime
        )
    }

    /// Check if this type is textual (candidate for case-insensitive
    /// comparison and ordering).
    pub fn is_textual(&self) -> bool {
        matches!(self, ScalarType::String | ScalarType::Char)
    }

    /// Check if values of this type have a total order usable by range
    /// and magnitude operators.
    pub fn is_ordered(&self) -> bool {
        self.is_numeric() || self.is_temporal() || self.is_textual() || *self == ScalarType::Uuid
    }

    /// Name of the type, for error messages.
    pub fn type_name(&self) -> String {
        match self {
            ScalarType::Bool => "bool".into(),
            ScalarType::Int32 => "int32".into(),
            ScalarType::Int64 => "int64".into(),
            ScalarType::Float32 => "float32".into(),
            ScalarType::Float64 => "float64".into(),
            ScalarType::String => "string".into(),
            ScalarType::Char => "char".into(),
            ScalarType::Uuid => "uuid".into(),
            ScalarType::Date => "date".into(),
            ScalarType::Time => "time".into(),
            ScalarType::DateTime => "datetime".into(),
            ScalarType::Enum { name, .. } => format!("enum {name}"),
        }
    }
}

/// Cardinality of an association attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Single related entity, foreign key on the owning side.
    ToOne,
    /// Many related entities, foreign key on the far side.
    ToMany,
    /// Many-to-many through an edge table.
    ManyToMany,
}

/// Element type of an element collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionElement {
    /// Collection of scalar values.
    Scalar(ScalarType),
    /// Collection of structured values described by their own schema.
    Structured(String),
}

/// How an attribute participates in path resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    /// Terminal scalar leaf.
    Scalar(ScalarType),
    /// Relationship requiring a join to a related schema.
    Association {
        /// Target entity type.
        target: String,
        /// Relationship cardinality.
        cardinality: Cardinality,
    },
    /// Attribute group stored inline on the owning schema; no join.
    Embedded {
        /// Embedded type name.
        target: String,
    },
    /// Multi-valued attribute requiring a join to per-element storage.
    ElementCollection {
        /// Element type.
        element: CollectionElement,
    },
    /// Opaque JSON document column; traversal below it is delegated to
    /// the JSON path sub-compiler.
    Json,
}

/// One attribute of an entity schema.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    /// Attribute name.
    pub name: String,
    /// Attribute kind.
    pub kind: AttributeKind,
}

impl AttributeDescriptor {
    /// Create a scalar attribute.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Scalar(scalar),
        }
    }

    /// Create an association attribute.
    pub fn association(
        name: impl Into<String>,
        target: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Association {
                target: target.into(),
                cardinality,
            },
        }
    }

    /// Create an embedded attribute.
    pub fn embedded(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Embedded {
                target: target.into(),
            },
        }
    }

    /// Create a collection of scalars.
    pub fn collection_of(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::ElementCollection {
                element: CollectionElement::Scalar(scalar),
            },
        }
    }

    /// Create a collection of structured elements.
    pub fn collection_of_entity(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::ElementCollection {
                element: CollectionElement::Structured(target.into()),
            },
        }
    }

    /// Create a JSON document attribute.
    pub fn json(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Json,
        }
    }

    /// Whether resolving through this attribute fans out to many values.
    pub fn is_collection(&self) -> bool {
        match &self.kind {
            AttributeKind::Association { cardinality, .. } => {
                matches!(cardinality, Cardinality::ToMany | Cardinality::ManyToMany)
            }
            AttributeKind::ElementCollection { .. } => true,
            _ => false,
        }
    }
}

/// Schema of one mapped type: its identity attribute and ordered
/// attribute list.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    /// Type name (unique within the registry).
    pub name: String,
    /// Name of the identity attribute.
    pub identity: String,
    /// Attribute descriptors, in declaration order.
    pub attributes: Vec<AttributeDescriptor>,
}

impl EntitySchema {
    /// Create a new entity schema.
    pub fn new(name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity: identity.into(),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add multiple attributes.
    pub fn with_attributes(
        mut self,
        attributes: impl IntoIterator<Item = AttributeDescriptor>,
    ) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Get an attribute by name.
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Get the identity attribute descriptor.
    pub fn identity_attribute(&self) -> Option<&AttributeDescriptor> {
        self.get_attribute(&self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder() {
        let schema = EntitySchema::new("User", "id")
            .with_attribute(AttributeDescriptor::scalar("id", ScalarType::Uuid))
            .with_attribute(AttributeDescriptor::scalar("name", ScalarType::String))
            .with_attribute(AttributeDescriptor::association(
                "company",
                "Company",
                Cardinality::ToOne,
            ));

        assert_eq!(schema.attributes.len(), 3);
        assert!(schema.get_attribute("company").is_some());
        assert!(schema.get_attribute("missing").is_none());
        assert_eq!(schema.identity_attribute().unwrap().name, "id");
    }

    #[test]
    fn test_collection_detection() {
        let to_one = AttributeDescriptor::association("company", "Company", Cardinality::ToOne);
        let to_many = AttributeDescriptor::association("sites", "Site", Cardinality::ToMany);
        let tags = AttributeDescriptor::collection_of("tags", ScalarType::String);

        assert!(!to_one.is_collection());
        assert!(to_many.is_collection());
        assert!(tags.is_collection());
    }

    #[test]
    fn test_scalar_type_checks() {
        assert!(ScalarType::Int64.is_numeric());
        assert!(ScalarType::Date.is_temporal());
        assert!(ScalarType::String.is_textual());
        assert!(ScalarType::Uuid.is_ordered());
        assert!(!ScalarType::Bool.is_ordered());
        let status = ScalarType::Enum {
            name: "Status".into(),
            variants: vec!["Active".into(), "Inactive".into()],
        };
        assert!(!status.is_ordered());
        assert_eq!(status.type_name(), "enum Status");
    }
}
