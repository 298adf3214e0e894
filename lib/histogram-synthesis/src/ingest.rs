//! Quantile ingestion.

use std::cmp::Ordering;

use snafu::ensure;
use tracing::debug;

use crate::{
    domain::Domain,
    error::{BoundaryBelowMinimum, DecreasingCumulativeCount, HistogramError, NonIncreasingBoundary},
    histogram::{Histogram, HistogramBuilder},
};

/// A single quantile row, as reported by a database catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuantileRow<V> {
    /// Inclusive upper bound of the quantile.
    pub boundary: V,

    /// Number of non-null values less than or equal to `boundary`.
    pub cumulative_count: u64,
}

impl<V> QuantileRow<V> {
    /// Creates a new `QuantileRow`.
    pub fn new(boundary: V, cumulative_count: u64) -> Self {
        Self {
            boundary,
            cumulative_count,
        }
    }
}

/// Quantile statistics for a single column.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuantileStatistics<V> {
    /// Minimum value of the column.
    pub reported_min: V,

    /// Number of distinct values in the column.
    pub cardinality: u64,

    /// Number of null values in the column.
    pub num_nulls: u64,

    /// Quantile rows, in ascending boundary order.
    pub rows: Vec<QuantileRow<V>>,
}

/// Builds a bucketed histogram from cumulative quantile statistics.
///
/// Every row becomes one bucket whose frequency is the difference between its cumulative count and the previous one.
/// The first bucket starts at the reported minimum, and every later bucket starts just after the previous boundary.
///
/// Boundaries are inclusive upper bounds, so when the first boundary is the reported minimum itself, the minimum is
/// moved down by one domain step to keep the first bucket from collapsing into a single point.
///
/// In domains whose successor does not preserve order between neighbouring boundaries, a boundary whose predecessor's
/// successor lies past it is folded into the previous bucket, which keeps both frequencies.
///
/// # Errors
///
/// If the boundaries are not strictly increasing, or the first boundary is below the reported minimum, an input error
/// is returned. If cumulative counts decrease, a consistency error is returned. If the minimum cannot be moved down, or
/// a boundary has no successor, a domain error is returned.
pub fn ingest<D: Domain>(domain: D, stats: &QuantileStatistics<D::Value>) -> Result<Histogram<D>, HistogramError> {
    let Some(first) = stats.rows.first() else {
        return Ok(Histogram::empty(domain));
    };

    let mut min = stats.reported_min.clone();
    match domain.compare(&first.boundary, &min) {
        Ordering::Less => {
            return BoundaryBelowMinimum {
                boundary: first.boundary.to_string(),
                min: min.to_string(),
            }
            .fail()
        }
        Ordering::Equal => min = domain.decrement(&min)?,
        Ordering::Greater => {}
    }

    let mut builder = HistogramBuilder::with_capacity(domain.clone(), stats.rows.len());
    let mut previous: Option<&QuantileRow<D::Value>> = None;

    for (index, row) in stats.rows.iter().enumerate() {
        let (lower, previous_count) = match previous {
            None => (min.clone(), 0),
            Some(previous) => {
                ensure!(
                    domain.compare(&previous.boundary, &row.boundary) == Ordering::Less,
                    NonIncreasingBoundary {
                        index,
                        boundary: row.boundary.to_string(),
                        previous: previous.boundary.to_string(),
                    }
                );
                (domain.increment(&previous.boundary)?, previous.cumulative_count)
            }
        };

        ensure!(
            row.cumulative_count >= previous_count,
            DecreasingCumulativeCount {
                boundary: row.boundary.to_string(),
                cumulative: row.cumulative_count,
                previous: previous_count,
            }
        );

        let frequency = row.cumulative_count - previous_count;
        match builder.last_mut() {
            // The successor of the previous boundary can sort past this one when they share a prefix, as with "smith"
            // and "smithson" in the string domain. No value is left to start a bucket at, so the previous bucket
            // stretches to this boundary instead. Both frequencies are deltas of the same cumulative count, so the sum
            // cannot overflow.
            Some(last) if domain.compare(&lower, &row.boundary) == Ordering::Greater => {
                debug!(
                    boundary = %row.boundary,
                    successor = %lower,
                    frequency,
                    "Successor of previous boundary passes this boundary. Merging into previous bucket."
                );
                last.extend_to(row.boundary.clone(), frequency);
            }
            _ => {
                builder.add(lower, row.boundary.clone(), frequency);
            }
        }
        previous = Some(row);
    }

    let histogram = builder.build()?;
    debug!(
        domain = domain.name(),
        buckets = histogram.len(),
        total = histogram.total_count(),
        "Ingested quantile histogram."
    );

    Ok(histogram)
}
