use std::{collections::HashMap, fmt};

use histogram_synthesis::ColumnDomain;
use tracing::debug;

use crate::{
    error::{CatalogError, UnknownColumn, UnsupportedType},
    ColumnType,
};

/// Fully qualified name of a column.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QualifiedColumn {
    schema: String,
    table: String,
    column: String,
}

impl QualifiedColumn {
    /// Creates a new `QualifiedColumn`.
    pub fn new(schema: impl Into<String>, table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
        }
    }

    /// Returns the schema name.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the column name.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl fmt::Display for QualifiedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.schema, self.table, self.column)
    }
}

/// Resolved value domains, keyed by column.
///
/// Each column's domain is resolved once, when it is registered, and then looked up for every profiling step that needs
/// it. Type overrides, keyed by the qualified column name (`schema.table.column`), replace the catalog's type name for
/// that column before resolution.
#[derive(Clone, Debug, Default)]
pub struct DomainRegistry {
    overrides: HashMap<String, String>,
    domains: HashMap<QualifiedColumn, ColumnDomain>,
}

impl DomainRegistry {
    /// Creates an empty `DomainRegistry`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty `DomainRegistry` with the given type overrides.
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        Self {
            overrides,
            domains: HashMap::new(),
        }
    }

    /// Resolves and registers the domain of a column.
    ///
    /// # Errors
    ///
    /// If the column's type, after applying any override, has no supported domain, an error is returned and the column
    /// is left unregistered.
    pub fn register(
        &mut self, column: QualifiedColumn, column_type: &ColumnType,
    ) -> Result<ColumnDomain, CatalogError> {
        let qualified_name = column.to_string();
        let column_type = match self.overrides.get(&qualified_name) {
            Some(type_name) => {
                debug!(
                    column = %qualified_name,
                    from = %column_type.type_name,
                    to = %type_name,
                    "Overriding column type."
                );
                column_type.with_type_name(type_name.as_str())
            }
            None => column_type.clone(),
        };

        let Some(domain) = column_type.resolve() else {
            return UnsupportedType {
                column: qualified_name,
                type_name: column_type.type_name,
            }
            .fail();
        };

        self.domains.insert(column, domain);
        Ok(domain)
    }

    /// Returns the domain registered for a column.
    ///
    /// # Errors
    ///
    /// If the column has not been registered, an error is returned.
    pub fn resolve(&self, column: &QualifiedColumn) -> Result<ColumnDomain, CatalogError> {
        match self.domains.get(column) {
            Some(domain) => Ok(*domain),
            None => UnknownColumn {
                column: column.to_string(),
            }
            .fail(),
        }
    }

    /// Returns the number of registered columns.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns `true` if no columns are registered.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
