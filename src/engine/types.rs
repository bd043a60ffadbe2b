//! Engine-side table metadata types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Native column type of the embedded analytic engine.
///
/// This is a closed set: every type the tap can extract is enumerated here,
/// and the portable mapping over it is an exhaustive match. An engine type
/// outside this set fails at parse time instead of silently producing an
/// untyped schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeType {
    Bool,
    Text,
    Timestamp,
    BigInt,
    Double,
    Float,
    Int,
}

impl NativeType {
    /// Parse an `information_schema` data type string.
    pub fn parse(column: &str, data_type: &str) -> Result<Self> {
        match data_type.to_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => Ok(NativeType::Bool),
            "VARCHAR" | "TEXT" => Ok(NativeType::Text),
            "TIMESTAMP" | "TIMESTAMP WITH TIME ZONE" | "TIMESTAMPTZ" => Ok(NativeType::Timestamp),
            "BIGINT" | "INT8" => Ok(NativeType::BigInt),
            "DOUBLE" | "FLOAT8" => Ok(NativeType::Double),
            "FLOAT" | "REAL" | "FLOAT4" => Ok(NativeType::Float),
            "INTEGER" | "INT" | "INT4" => Ok(NativeType::Int),
            other => Err(Error::unsupported_type(column, other)),
        }
    }
}

impl std::fmt::Display for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeType::Bool => write!(f, "BOOLEAN"),
            NativeType::Text => write!(f, "VARCHAR"),
            NativeType::Timestamp => write!(f, "TIMESTAMP"),
            NativeType::BigInt => write!(f, "BIGINT"),
            NativeType::Double => write!(f, "DOUBLE"),
            NativeType::Float => write!(f, "FLOAT"),
            NativeType::Int => write!(f, "INTEGER"),
        }
    }
}

/// One column of a table definition: unescaped name plus declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Unescaped column name, the externally visible field name
    pub name: String,

    /// Declared engine type
    pub native_type: NativeType,
}

/// Metadata describing one table inside an extract file.
///
/// Owned by the engine; the tap holds it read-only for one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Fully-qualified quoted name: `"catalog"."schema"."table"`
    pub qualified_name: String,

    /// Raw (unquoted) table segment of the qualified name
    pub table: String,

    /// Ordered column list
    pub columns: Vec<ColumnDef>,
}

impl TableDefinition {
    /// Unescaped column names, in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether the definition declares a column with the given name
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("BOOLEAN", NativeType::Bool)]
    #[test_case("VARCHAR", NativeType::Text)]
    #[test_case("TIMESTAMP", NativeType::Timestamp)]
    #[test_case("TIMESTAMP WITH TIME ZONE", NativeType::Timestamp)]
    #[test_case("BIGINT", NativeType::BigInt)]
    #[test_case("DOUBLE", NativeType::Double)]
    #[test_case("FLOAT", NativeType::Float)]
    #[test_case("INTEGER", NativeType::Int)]
    fn test_parse_native_type(input: &str, expected: NativeType) {
        assert_eq!(NativeType::parse("c", input).unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        let err = NativeType::parse("payload", "BLOB").unwrap_err();
        assert!(err.to_string().contains("payload"));
        assert!(err.to_string().contains("BLOB"));
    }

    #[test]
    fn test_column_names_preserve_order() {
        let def = TableDefinition {
            qualified_name: "\"db\".\"Extract\".\"t\"".to_string(),
            table: "t".to_string(),
            columns: vec![
                ColumnDef {
                    name: "_id".to_string(),
                    native_type: NativeType::BigInt,
                },
                ColumnDef {
                    name: "name".to_string(),
                    native_type: NativeType::Text,
                },
            ],
        };
        assert_eq!(def.column_names(), vec!["_id", "name"]);
        assert!(def.has_column("name"));
        assert!(!def.has_column("missing"));
    }
}
