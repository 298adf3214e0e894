use histogram_synthesis::{exact_histogram, ingest, synthesize, ColumnDomain, QuantileRow, QuantileStatistics};
use snafu::{OptionExt as _, ResultExt as _};
use tracing::debug;

use crate::{
    error::{CatalogError, MissingMinimum, Parse, ParseError, Synthesis},
    CatalogColumn, QualifiedColumn, ValueParser,
};

/// A bucket of a column profile, with its bounds rendered as text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProfileBucket {
    /// Inclusive lower bound.
    pub lower: String,

    /// Inclusive upper bound.
    pub upper: String,

    /// Number of values in the bucket.
    pub frequency: u64,

    /// Whether the bucket holds the exact count of a single value.
    pub exact: bool,
}

/// The synthesized frequency distribution of a column.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnProfile {
    /// Qualified name of the column.
    pub column: QualifiedColumn,

    /// Name of the value domain the column was profiled in.
    pub domain: &'static str,

    /// Number of distinct values, as reported by the catalog.
    pub cardinality: u64,

    /// Number of null values.
    pub num_nulls: u64,

    /// Number of non-null values covered by the buckets.
    pub total_count: u64,

    /// The buckets, in ascending order.
    pub buckets: Vec<ProfileBucket>,
}

impl ColumnProfile {
    /// Returns the exact buckets.
    pub fn exact_buckets(&self) -> impl Iterator<Item = &ProfileBucket> {
        self.buckets.iter().filter(|b| b.exact)
    }

    /// Returns the range buckets.
    pub fn range_buckets(&self) -> impl Iterator<Item = &ProfileBucket> {
        self.buckets.iter().filter(|b| !b.exact)
    }

    /// Returns `true` if every distinct value of the column has its own exact bucket.
    pub fn is_fully_enumerated(&self) -> bool {
        let exact = self.exact_buckets().count() as u64;
        exact > 0 && exact == self.cardinality
    }

    /// Returns the number of rows represented, null or not.
    pub fn row_count(&self) -> u64 {
        self.total_count.saturating_add(self.num_nulls)
    }

    /// Returns the probability of a row being null.
    pub fn null_probability(&self) -> f64 {
        self.probability(self.num_nulls)
    }

    /// Returns the probability of a row falling within the given bucket.
    pub fn bucket_probability(&self, bucket: &ProfileBucket) -> f64 {
        self.probability(bucket.frequency)
    }

    fn probability(&self, frequency: u64) -> f64 {
        match self.row_count() {
            0 => 0.0,
            rows => frequency as f64 / rows as f64,
        }
    }
}

/// Profiles a single column in the given domain.
///
/// The column's frequent values are folded into the histogram built from its quantile rows. Columns without quantile
/// rows are profiled from their frequent values alone, each becoming an exact bucket.
///
/// # Errors
///
/// If any statistic cannot be parsed in the column's domain, or the statistics are inconsistent, an error is returned.
pub fn profile_column(column: &CatalogColumn, domain: ColumnDomain) -> Result<ColumnProfile, CatalogError> {
    match domain {
        ColumnDomain::Integer(d) => profile_with(d, column),
        ColumnDomain::Decimal(d) => profile_with(d, column),
        ColumnDomain::Date(d) => profile_with(d, column),
        ColumnDomain::Char(d) => profile_with(d, column),
        ColumnDomain::String(d) => profile_with(d, column),
    }
}

fn profile_with<D: ValueParser>(domain: D, column: &CatalogColumn) -> Result<ColumnProfile, CatalogError> {
    let name = column.qualified_name();
    let column_name = name.to_string();

    let frequent = column
        .frequent_values
        .iter()
        .map(|row| domain.parse(&row.value).map(|value| (value, row.count)))
        .collect::<Result<Vec<_>, ParseError>>()
        .context(Parse {
            column: &column_name,
            field: "frequent values",
        })?;

    let histogram = if column.quantiles.is_empty() {
        exact_histogram(domain.clone(), &frequent).context(Synthesis { column: &column_name })?
    } else {
        let stats = quantile_statistics(&domain, column, &column_name)?;
        let histogram = ingest(domain.clone(), &stats).context(Synthesis { column: &column_name })?;
        synthesize(&histogram, &frequent).context(Synthesis { column: &column_name })?
    };

    let buckets = histogram
        .buckets()
        .iter()
        .map(|b| ProfileBucket {
            lower: domain.render(b.lower()),
            upper: domain.render(b.upper()),
            frequency: b.frequency(),
            exact: b.is_exact(&domain),
        })
        .collect::<Vec<_>>();

    debug!(
        column = %column_name,
        domain = domain.name(),
        buckets = buckets.len(),
        total = histogram.total_count(),
        "Profiled column."
    );

    Ok(ColumnProfile {
        column: name,
        domain: domain.name(),
        cardinality: column.cardinality,
        num_nulls: column.num_nulls,
        total_count: histogram.total_count(),
        buckets,
    })
}

fn quantile_statistics<D: ValueParser>(
    domain: &D, column: &CatalogColumn, column_name: &str,
) -> Result<QuantileStatistics<D::Value>, CatalogError> {
    let reported_min = column
        .reported_min
        .as_deref()
        .context(MissingMinimum { column: column_name })?;
    let reported_min = domain.parse(reported_min).context(Parse {
        column: column_name,
        field: "reported minimum",
    })?;

    let rows = column
        .quantiles
        .iter()
        .map(|row| {
            domain
                .parse(&row.boundary)
                .map(|boundary| QuantileRow::new(boundary, row.cumulative_count))
        })
        .collect::<Result<Vec<_>, ParseError>>()
        .context(Parse {
            column: column_name,
            field: "quantile boundaries",
        })?;

    Ok(QuantileStatistics {
        reported_min,
        cardinality: column.cardinality,
        num_nulls: column.num_nulls,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use histogram_synthesis::{CharDomain, DateDomain, DecimalDomain, ErrorKind, IntegerDomain, StringDomain};

    use super::*;
    use crate::{ColumnType, FrequentValueRow, QuantileValueRow};

    fn column(
        type_name: &str, scale: u32, min: Option<&str>, quantiles: &[(&str, u64)], frequent: &[(&str, u64)],
    ) -> CatalogColumn {
        CatalogColumn {
            schema: "S".to_string(),
            table: "T".to_string(),
            column: "C".to_string(),
            column_type: ColumnType::new(type_name, 8, scale),
            reported_min: min.map(str::to_string),
            cardinality: 0,
            num_nulls: 0,
            quantiles: quantiles
                .iter()
                .map(|(boundary, cumulative_count)| QuantileValueRow {
                    boundary: boundary.to_string(),
                    cumulative_count: *cumulative_count,
                })
                .collect(),
            frequent_values: frequent
                .iter()
                .map(|(value, count)| FrequentValueRow {
                    value: value.to_string(),
                    count: *count,
                })
                .collect(),
        }
    }

    fn bucket(lower: &str, upper: &str, frequency: u64) -> ProfileBucket {
        ProfileBucket {
            lower: lower.to_string(),
            upper: upper.to_string(),
            frequency,
            exact: lower == upper,
        }
    }

    #[test]
    fn integer_column() {
        let c = column("INTEGER", 0, Some("1"), &[("10", 100)], &[("5", 20)]);
        let profile = profile_column(&c, ColumnDomain::Integer(IntegerDomain)).unwrap();

        assert_eq!(profile.domain, "integer");
        assert_eq!(profile.total_count, 100);
        assert_eq!(
            profile.buckets,
            vec![bucket("1", "4", 36), bucket("5", "5", 20), bucket("6", "10", 44)]
        );
        assert_eq!(profile.exact_buckets().count(), 1);
        assert_eq!(profile.range_buckets().count(), 2);
    }

    #[test]
    fn decimal_column() {
        let c = column("DECIMAL", 2, Some("0.01"), &[("1.00", 100)], &[("0.50", 10)]);
        let profile = profile_column(&c, ColumnDomain::Decimal(DecimalDomain::new(2))).unwrap();

        assert_eq!(profile.buckets[0].lower, "0.01");
        assert_eq!(profile.buckets[0].upper, "0.49");
        assert_eq!(profile.buckets[1], bucket("0.50", "0.50", 10));
        assert_eq!(profile.buckets[2].lower, "0.51");
        assert_eq!(profile.buckets[2].upper, "1.00");
        assert_eq!(profile.total_count, 100);
    }

    #[test]
    fn date_column() {
        let c = column(
            "DATE",
            0,
            Some("'2023-12-01'"),
            &[("'2024-01-01'", 30), ("'2024-01-10'", 50)],
            &[],
        );
        let profile = profile_column(&c, ColumnDomain::Date(DateDomain)).unwrap();

        assert_eq!(profile.buckets[1], bucket("2024-01-02", "2024-01-10", 20));
    }

    #[test]
    fn enumerated_char_column() {
        let mut c = column("CHAR", 0, None, &[], &[("'P'", 5), ("'O'", 70), ("'F'", 25)]);
        c.cardinality = 3;
        c.num_nulls = 100;

        let profile = profile_column(&c, ColumnDomain::Char(CharDomain)).unwrap();
        assert_eq!(
            profile.buckets,
            vec![bucket("F", "F", 25), bucket("O", "O", 70), bucket("P", "P", 5)]
        );
        assert!(profile.is_fully_enumerated());
        assert_eq!(profile.row_count(), 200);
        assert!((profile.null_probability() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn string_column_not_enumerated() {
        let mut c = column("VARCHAR", 0, Some("'a'"), &[("'m'", 100)], &[("'c'", 40)]);
        c.cardinality = 50;

        let profile = profile_column(&c, ColumnDomain::String(StringDomain)).unwrap();
        assert!(!profile.is_fully_enumerated());
        assert_eq!(profile.total_count, 100);
    }

    #[test]
    fn parse_failure() {
        let c = column("INTEGER", 0, Some("1"), &[("ten", 100)], &[]);
        let err = profile_column(&c, ColumnDomain::Integer(IntegerDomain)).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { field: "quantile boundaries", .. }));
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn duplicate_frequent_value_without_quantiles() {
        let c = column("CHAR", 0, None, &[], &[("'O'", 70), ("'F'", 25), ("O", 5)]);
        let err = profile_column(&c, ColumnDomain::Char(CharDomain)).unwrap_err();
        assert!(matches!(err, CatalogError::Synthesis { .. }));
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn missing_minimum() {
        let c = column("INTEGER", 0, None, &[("10", 100)], &[]);
        let err = profile_column(&c, ColumnDomain::Integer(IntegerDomain)).unwrap_err();
        assert!(matches!(err, CatalogError::MissingMinimum { .. }));
    }

    #[test]
    fn inconsistent_statistics() {
        let c = column("INTEGER", 0, Some("1"), &[("10", 100)], &[("5", 120)]);
        let err = profile_column(&c, ColumnDomain::Integer(IntegerDomain)).unwrap_err();
        assert!(matches!(err, CatalogError::Synthesis { .. }));
        assert_eq!(err.kind(), ErrorKind::Consistency);
    }

    #[test]
    fn probabilities_without_rows() {
        let c = column("INTEGER", 0, None, &[], &[]);
        let profile = profile_column(&c, ColumnDomain::Integer(IntegerDomain)).unwrap();
        assert!(profile.buckets.is_empty());
        assert_eq!(profile.null_probability(), 0.0);
        assert!(!profile.is_fully_enumerated());
    }
}
