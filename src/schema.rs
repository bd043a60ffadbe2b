//! Portable schema type system
//!
//! Maps engine column types to the portable types emitted to the downstream
//! pipeline. The mapping is an exhaustive match over the closed
//! [`NativeType`] set, so an unhandled engine type is a compile error here
//! rather than a silent gap in the emitted schema.

use crate::engine::{NativeType, TableDefinition};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Portable schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Boolean,
    String,
    Timestamp,
    Integer,
    Number,
}

impl FieldType {
    /// Map an engine type to its portable type. Total over [`NativeType`].
    pub fn from_native(native: NativeType) -> Self {
        match native {
            NativeType::Bool => FieldType::Boolean,
            NativeType::Text => FieldType::String,
            NativeType::Timestamp => FieldType::Timestamp,
            NativeType::BigInt | NativeType::Int => FieldType::Integer,
            NativeType::Double | NativeType::Float => FieldType::Number,
        }
    }

    /// JSON-schema rendering of this type
    fn json_schema(self) -> JsonValue {
        match self {
            FieldType::Boolean => serde_json::json!({ "type": ["boolean", "null"] }),
            FieldType::String => serde_json::json!({ "type": ["string", "null"] }),
            FieldType::Timestamp => {
                serde_json::json!({ "type": ["string", "null"], "format": "date-time" })
            }
            FieldType::Integer => serde_json::json!({ "type": ["integer", "null"] }),
            FieldType::Number => serde_json::json!({ "type": ["number", "null"] }),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::String => write!(f, "string"),
            FieldType::Timestamp => write!(f, "timestamp"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Number => write!(f, "number"),
        }
    }
}

/// One schema field: unescaped column name plus portable type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Ordered schema of one table, one entry per column
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<Field>,
}

impl TableSchema {
    /// Derive the schema from a table definition.
    ///
    /// Pure function of the definition: no I/O beyond what discovery already
    /// performed. Column order and unescaped names are preserved.
    pub fn from_definition(definition: &TableDefinition) -> Self {
        let fields = definition
            .columns
            .iter()
            .map(|column| Field {
                name: column.name.clone(),
                field_type: FieldType::from_native(column.native_type),
            })
            .collect();
        Self { fields }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field's type by name
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.field_type)
    }

    /// Render as a JSON-schema object, properties in field order.
    pub fn to_json_schema(&self) -> JsonValue {
        let mut properties = serde_json::Map::new();
        for field in &self.fields {
            properties.insert(field.name.clone(), field.field_type.json_schema());
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false
        })
    }
}
