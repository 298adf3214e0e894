use serde::{Deserialize, Serialize};

use crate::{ColumnType, QualifiedColumn};

/// A quantile row in its textual catalog form.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct QuantileValueRow {
    /// Inclusive upper bound of the quantile.
    pub boundary: String,

    /// Number of non-null values less than or equal to `boundary`.
    pub cumulative_count: u64,
}

/// A frequent value row in its textual catalog form.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FrequentValueRow {
    /// The value.
    pub value: String,

    /// Exact number of occurrences of the value.
    pub count: u64,
}

/// Catalog statistics for a single column.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CatalogColumn {
    /// Schema of the table.
    pub schema: String,

    /// Name of the table.
    pub table: String,

    /// Name of the column.
    pub column: String,

    /// SQL type of the column.
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Minimum value of the column.
    ///
    /// Columns without quantile statistics may omit this.
    #[serde(default)]
    pub reported_min: Option<String>,

    /// Number of distinct values in the column.
    #[serde(default)]
    pub cardinality: u64,

    /// Number of null values in the column.
    #[serde(default)]
    pub num_nulls: u64,

    /// Quantile rows, in ascending boundary order.
    #[serde(default)]
    pub quantiles: Vec<QuantileValueRow>,

    /// Frequent value rows, in any order.
    #[serde(default)]
    pub frequent_values: Vec<FrequentValueRow>,
}

impl CatalogColumn {
    /// Returns the qualified name of the column.
    pub fn qualified_name(&self) -> QualifiedColumn {
        QualifiedColumn::new(&self.schema, &self.table, &self.column)
    }
}

/// Catalog statistics for a set of columns, as exported from a database.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CatalogSnapshot {
    /// The columns.
    #[serde(default)]
    pub columns: Vec<CatalogColumn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"
columns:
  - schema: SALES
    table: ORDERS
    column: STATUS
    type: { type_name: CHAR, length: 1 }
    cardinality: 3
    frequent_values:
      - { value: "'O'", count: 70 }
      - { value: "'F'", count: 25 }
      - { value: "'P'", count: 5 }
  - schema: SALES
    table: ORDERS
    column: AMOUNT
    type: { type_name: DECIMAL, length: 9, scale: 2 }
    reported_min: "0.01"
    cardinality: 5000
    num_nulls: 12
    quantiles:
      - { boundary: "10.00", cumulative_count: 400 }
      - { boundary: "99.99", cumulative_count: 1000 }
"#;

    #[test]
    fn deserializes_yaml() {
        let snapshot: CatalogSnapshot = serde_yaml::from_str(SNAPSHOT).unwrap();
        assert_eq!(snapshot.columns.len(), 2);

        let status = &snapshot.columns[0];
        assert_eq!(status.qualified_name().to_string(), "SALES.ORDERS.STATUS");
        assert_eq!(status.column_type, ColumnType::new("CHAR", 1, 0));
        assert_eq!(status.reported_min, None);
        assert!(status.quantiles.is_empty());
        assert_eq!(status.frequent_values.len(), 3);

        let amount = &snapshot.columns[1];
        assert_eq!(amount.reported_min.as_deref(), Some("0.01"));
        assert_eq!(amount.num_nulls, 12);
        assert_eq!(amount.quantiles[1].cumulative_count, 1000);
    }
}
