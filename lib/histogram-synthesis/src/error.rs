//! Error types.

use snafu::Snafu;

/// The class of failure behind an error.
///
/// Callers profiling many columns typically decide whether to skip a column, warn, or abort based on this alone.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A successor or predecessor fell outside the representable range of a value type.
    Domain,

    /// Bucket invariants were violated, either by the catalog statistics or by the histogram being built.
    Consistency,

    /// The input rows themselves were malformed.
    Input,
}

/// A domain error.
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum DomainError {
    /// The successor of a value is not representable.
    #[snafu(display("Value '{}' has no successor in the {} domain.", value, domain))]
    NoSuccessor {
        /// Name of the domain.
        domain: &'static str,

        /// The value, rendered as text.
        value: String,
    },

    /// The predecessor of a value is not representable.
    #[snafu(display("Value '{}' has no predecessor in the {} domain.", value, domain))]
    NoPredecessor {
        /// Name of the domain.
        domain: &'static str,

        /// The value, rendered as text.
        value: String,
    },
}

/// A histogram error.
///
/// Values are carried in their textual form so that the error type does not depend on the domain it came from.
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum HistogramError {
    /// A successor or predecessor could not be computed.
    #[snafu(display("Domain error while splitting buckets."))]
    Domain {
        /// Error source.
        source: DomainError,
    },

    /// A bucket's lower bound is greater than its upper bound.
    #[snafu(display("Bucket {} has lower bound '{}' above upper bound '{}'.", index, lower, upper))]
    InvertedBucket {
        /// Position of the bucket.
        index: usize,

        /// Lower bound of the bucket.
        lower: String,

        /// Upper bound of the bucket.
        upper: String,
    },

    /// A bucket starts at or before the end of the previous bucket.
    #[snafu(display(
        "Bucket {} starts at '{}', which does not follow the previous upper bound '{}'.",
        index,
        lower,
        previous_upper
    ))]
    OverlappingBucket {
        /// Position of the bucket.
        index: usize,

        /// Lower bound of the bucket.
        lower: String,

        /// Upper bound of the preceding bucket.
        previous_upper: String,
    },

    /// Exact counts removed from a bucket exceed the bucket's frequency.
    #[snafu(display(
        "Bucket ['{}', '{}'] holds {} but exact counts of {} were attributed to it.",
        lower,
        upper,
        frequency,
        removed
    ))]
    NegativeFrequency {
        /// Lower bound of the bucket.
        lower: String,

        /// Upper bound of the bucket.
        upper: String,

        /// Frequency of the bucket.
        frequency: u64,

        /// Sum of the exact counts attributed to the bucket.
        removed: u64,
    },

    /// A bucket has frequency left over after every one of its values became an exact bucket.
    #[snafu(display(
        "Bucket ['{}', '{}'] has {} unattributed after all of its values were given exact counts.",
        lower,
        upper,
        residual
    ))]
    UnallocatedFrequency {
        /// Lower bound of the bucket.
        lower: String,

        /// Upper bound of the bucket.
        upper: String,

        /// Frequency that could not be placed.
        residual: u64,
    },

    /// Cumulative counts decreased between two boundaries.
    #[snafu(display(
        "Cumulative count at boundary '{}' is {}, below the previous cumulative count {}.",
        boundary,
        cumulative,
        previous
    ))]
    DecreasingCumulativeCount {
        /// The boundary value.
        boundary: String,

        /// Cumulative count at the boundary.
        cumulative: u64,

        /// Cumulative count at the previous boundary.
        previous: u64,
    },

    /// The sum of bucket frequencies does not match the expected total.
    #[snafu(display("Histogram holds {} in total, expected {}.", actual, expected))]
    TotalMismatch {
        /// Expected total.
        expected: u64,

        /// Actual total.
        actual: u64,
    },

    /// Frequencies summed up to a bucket do not fit in a 64-bit count.
    #[snafu(display("Frequencies summed at bucket ['{}', '{}'] overflow a 64-bit count.", lower, upper))]
    CountOverflow {
        /// Lower bound of the bucket.
        lower: String,

        /// Upper bound of the bucket.
        upper: String,
    },

    /// Quantile boundaries were not strictly increasing.
    #[snafu(display(
        "Quantile boundary {} ('{}') does not follow previous boundary '{}'.",
        index,
        boundary,
        previous
    ))]
    NonIncreasingBoundary {
        /// Position of the row.
        index: usize,

        /// The boundary value.
        boundary: String,

        /// The previous boundary value.
        previous: String,
    },

    /// The first quantile boundary lies below the reported minimum.
    #[snafu(display("First quantile boundary '{}' is below the reported minimum '{}'.", boundary, min))]
    BoundaryBelowMinimum {
        /// The boundary value.
        boundary: String,

        /// The reported minimum.
        min: String,
    },

    /// A frequent value falls outside the histogram.
    #[snafu(display("Frequent value '{}' is outside the histogram range ['{}', '{}'].", key, min, max))]
    KeyOutOfRange {
        /// The frequent value.
        key: String,

        /// Minimum of the histogram.
        min: String,

        /// Maximum of the histogram.
        max: String,
    },

    /// A frequent value falls into a gap between buckets.
    #[snafu(display("Frequent value '{}' is not covered by any bucket.", key))]
    KeyNotCovered {
        /// The frequent value.
        key: String,
    },

    /// A frequent value was listed more than once.
    #[snafu(display("Frequent value '{}' is listed more than once.", key))]
    DuplicateKey {
        /// The frequent value.
        key: String,
    },
}

impl HistogramError {
    /// Returns the class of failure behind this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain { .. } => ErrorKind::Domain,
            Self::InvertedBucket { .. }
            | Self::OverlappingBucket { .. }
            | Self::NegativeFrequency { .. }
            | Self::UnallocatedFrequency { .. }
            | Self::DecreasingCumulativeCount { .. }
            | Self::TotalMismatch { .. }
            | Self::CountOverflow { .. } => ErrorKind::Consistency,
            Self::NonIncreasingBoundary { .. }
            | Self::BoundaryBelowMinimum { .. }
            | Self::KeyOutOfRange { .. }
            | Self::KeyNotCovered { .. }
            | Self::DuplicateKey { .. } => ErrorKind::Input,
        }
    }
}

impl From<DomainError> for HistogramError {
    fn from(source: DomainError) -> Self {
        Self::Domain { source }
    }
}
