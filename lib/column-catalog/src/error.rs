use histogram_synthesis::{ErrorKind, HistogramError};
use snafu::Snafu;

/// A value parsing error.
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum ParseError {
    /// The text is not a valid value of the domain.
    #[snafu(display("'{}' is not a valid {} value: {}", text, domain, reason))]
    InvalidValue {
        /// Name of the domain.
        domain: &'static str,

        /// The text that failed to parse.
        text: String,

        /// Why the text was rejected.
        reason: String,
    },
}

/// A column profiling error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum CatalogError {
    /// The column's SQL type has no supported value domain.
    #[snafu(display("Column '{}' has unsupported type '{}'.", column, type_name))]
    UnsupportedType {
        /// Qualified name of the column.
        column: String,

        /// Name of the SQL type.
        type_name: String,
    },

    /// The column is not known to the registry.
    #[snafu(display("Column '{}' has no registered domain.", column))]
    UnknownColumn {
        /// Qualified name of the column.
        column: String,
    },

    /// The column has quantile statistics but no reported minimum.
    #[snafu(display("Column '{}' has quantile statistics but no reported minimum.", column))]
    MissingMinimum {
        /// Qualified name of the column.
        column: String,
    },

    /// A statistics value could not be parsed.
    #[snafu(display("Failed to parse {} of column '{}'.", field, column))]
    Parse {
        /// Qualified name of the column.
        column: String,

        /// Which statistic held the value.
        field: &'static str,

        /// Error source.
        source: ParseError,
    },

    /// The statistics could not be turned into a histogram.
    #[snafu(display("Failed to build histogram for column '{}'.", column))]
    Synthesis {
        /// Qualified name of the column.
        column: String,

        /// Error source.
        source: HistogramError,
    },
}

impl CatalogError {
    /// Returns the class of failure behind this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedType { .. }
            | Self::UnknownColumn { .. }
            | Self::MissingMinimum { .. }
            | Self::Parse { .. } => ErrorKind::Input,
            Self::Synthesis { source, .. } => source.kind(),
        }
    }
}
