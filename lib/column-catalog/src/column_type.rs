use histogram_synthesis::{CharDomain, ColumnDomain, DateDomain, DecimalDomain, IntegerDomain, StringDomain};
use serde::{Deserialize, Serialize};

/// SQL type descriptor of a column, as reported by the catalog.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ColumnType {
    /// Name of the SQL type, such as `INTEGER` or `VARCHAR2`.
    pub type_name: String,

    /// Declared length of the type.
    #[serde(default)]
    pub length: u32,

    /// Declared scale of the type.
    #[serde(default)]
    pub scale: u32,
}

impl ColumnType {
    /// Creates a new `ColumnType`.
    pub fn new(type_name: impl Into<String>, length: u32, scale: u32) -> Self {
        Self {
            type_name: type_name.into(),
            length,
            scale,
        }
    }

    /// Returns a copy of this descriptor with a different type name, keeping length and scale.
    pub fn with_type_name(&self, type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..self.clone()
        }
    }

    /// Resolves the value domain of the type.
    ///
    /// Returns `None` if the type is not supported.
    pub fn resolve(&self) -> Option<ColumnDomain> {
        let domain = match self.type_name.trim().to_ascii_uppercase().as_str() {
            "SMALLINT" | "INTEGER" | "INT" | "BIGINT" => ColumnDomain::Integer(IntegerDomain),
            "NUMBER" if self.scale == 0 => ColumnDomain::Integer(IntegerDomain),
            "DECIMAL" | "NUMERIC" | "NUMBER" => ColumnDomain::Decimal(DecimalDomain::new(self.scale)),
            "DATE" => ColumnDomain::Date(DateDomain),
            "CHAR" | "CHARACTER" if self.length == 1 => ColumnDomain::Char(CharDomain),
            "CHAR" | "CHARACTER" | "VARCHAR" | "VARCHAR2" | "NVARCHAR2" | "CHARACTER VARYING" => {
                ColumnDomain::String(StringDomain)
            }
            _ => return None,
        };

        Some(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_supported_types() {
        let cases = [
            (ColumnType::new("INTEGER", 4, 0), ColumnDomain::Integer(IntegerDomain)),
            (ColumnType::new("bigint", 8, 0), ColumnDomain::Integer(IntegerDomain)),
            (ColumnType::new("NUMBER", 22, 0), ColumnDomain::Integer(IntegerDomain)),
            (ColumnType::new("NUMBER", 22, 2), ColumnDomain::Decimal(DecimalDomain::new(2))),
            (ColumnType::new("DECIMAL", 9, 3), ColumnDomain::Decimal(DecimalDomain::new(3))),
            (ColumnType::new("DATE", 4, 0), ColumnDomain::Date(DateDomain)),
            (ColumnType::new("CHAR", 1, 0), ColumnDomain::Char(CharDomain)),
            (ColumnType::new("CHAR", 10, 0), ColumnDomain::String(StringDomain)),
            (ColumnType::new(" varchar2 ", 40, 0), ColumnDomain::String(StringDomain)),
        ];

        for (column_type, expected) in cases {
            assert_eq!(column_type.resolve(), Some(expected), "type {:?}", column_type);
        }
    }

    #[test]
    fn rejects_unsupported_types() {
        assert_eq!(ColumnType::new("BLOB", 0, 0).resolve(), None);
        assert_eq!(ColumnType::new("TIMESTAMP", 10, 6).resolve(), None);
    }

    #[test]
    fn override_keeps_length_and_scale() {
        let original = ColumnType::new("CHAR", 1, 0);
        let overridden = original.with_type_name("VARCHAR");
        assert_eq!(overridden, ColumnType::new("VARCHAR", 1, 0));
        assert_eq!(overridden.resolve(), Some(ColumnDomain::String(StringDomain)));
    }
}
